/*
 * lib.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Section-based text generation.
//!
//! An input file is split into `[sections]`:
//!
//! - a configuration section naming the other sections
//! - a template with `$name`, `${name}` and `$table.column` placeholders
//! - global `name = value` parameters
//! - one or more tables, combined by a join expression such as
//!   `orders join customers on orders.cust = customers.cid`
//!
//! The template is rendered once per joined row. All checks run up front in
//! the [`Validator`]; rendering a [`ValidatedInput`] cannot fail on user
//! input.
//!
//! # Example
//!
//! ```
//! let input = "\
//! [CONFIG]
//! template = tpl
//! global_parameters = globals
//! repeater_parameters = \"orders join customers on orders.cust = customers.cid\"
//! [tpl]
//! $greeting $name, order $id
//! [globals]
//! greeting = Hello
//! [orders]
//! id, cust
//! 7, 1
//! [customers]
//! cid, name
//! 1, Ann
//! ";
//! let output = templie_core::generate_string(input).unwrap();
//! assert_eq!(output, "Hello Ann, order 7\n");
//! ```

pub mod error;
pub mod generator;
pub mod parameters;
pub mod query;
pub mod sections;
pub mod settings;
pub mod syntax;
pub mod table;
pub mod template;
pub mod text;
pub mod validator;

pub use error::{AmbiguousName, ConflictScope, QuerySyntaxError, Result, TemplieError};
pub use generator::{Generator, generate_file, generate_string};
pub use parameters::Parameters;
pub use query::{
    CompiledQuery, FlattenedRow, JoinResult, JoinSpec, JoinedRow, KeyPart, Namespace, Resolution,
    execute, execute_named,
};
pub use sections::Sections;
pub use settings::{ConfigKeys, Settings};
pub use syntax::LineSyntax;
pub use table::{Table, parse_table};
pub use template::{Segment, Template, VariableSource};
pub use validator::{InputConfig, ValidatedInput, Validator};
