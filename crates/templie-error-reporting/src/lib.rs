//! Error reporting and diagnostic messages for templie.
//!
//! This crate provides a structured approach to error reporting, following
//! the tidyverse style guide for error message content:
//!
//! - [`DiagnosticMessage`]: The main error message structure
//! - [`MessageContent`]: Content representation (Plain or Markdown)
//! - [`DetailItem`]: Individual detail bullets with error or info kinds
//! - [`DiagnosticKind`]: the kind of diagnostic
//! - [`SourceSnippet`]: A piece of input text with a highlighted span,
//!   rendered through ariadne
//!
//! Every diagnostic produced by templie carries a stable error code
//! (`T-<subsystem>-<number>`) that is looked up in the embedded
//! [`ERROR_CATALOG`].
//!
//! # Example
//!
//! ```
//! use templie_error_reporting::DiagnosticMessageBuilder;
//!
//! let error = DiagnosticMessageBuilder::error("Missing Section")
//!     .with_code("T-2-1")
//!     .problem("Section `[orders]` is not present in the input file")
//!     .add_hint("Did you misspell the section header?")
//!     .build();
//!
//! assert!(error.to_text().contains("[T-2-1]"));
//! ```

pub mod builder;
pub mod catalog;
pub mod diagnostic;

// Re-export main types for convenience
pub use builder::DiagnosticMessageBuilder;
pub use catalog::{ERROR_CATALOG, ErrorCodeInfo, get_error_info, get_subsystem};
pub use diagnostic::{
    DetailItem, DetailKind, DiagnosticKind, DiagnosticMessage, MessageContent, SourceSnippet,
};
