/*
 * mod.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Command implementations for the templie CLI.
//!
//! Each command module handles the CLI interface and delegates to
//! templie-core for the actual work.

use templie_core::TemplieError;
use templie_error_reporting::DiagnosticMessage;

pub mod check;
pub mod generate;
pub mod plan;

/// Print a diagnostic for `err`: JSON on stdout, or text on stderr.
pub fn report(err: &TemplieError, json: bool) {
    let diagnostic: DiagnosticMessage = err.to_diagnostic();
    if json {
        println!("{}", diagnostic.to_json());
    } else {
        eprintln!("{}", diagnostic.to_text());
    }
}
