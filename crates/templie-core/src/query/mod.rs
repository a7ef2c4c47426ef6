/*
 * mod.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! The join-expression language and its execution.
//!
//! - [`token`] and [`parser`] compile a query string into a [`CompiledQuery`]
//! - [`executor`] runs a compiled query over concrete tables
//! - [`namespace`] maps joined rows onto template variable names

pub mod executor;
pub mod namespace;
pub mod parser;
pub mod token;

pub use executor::{JoinResult, JoinedRow, execute, execute_named};
pub use namespace::{FlattenedRow, Namespace, Resolution};
pub use parser::{CompiledQuery, JoinSpec, KeyPart};
