/*
 * error.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Error types for templie input processing.
//!
//! Every variant is fatal for the input file being processed. Variants map
//! to stable diagnostic codes through [`TemplieError::to_diagnostic`].

use std::fmt;
use std::ops::Range;
use std::path::PathBuf;
use templie_error_reporting::{DiagnosticMessage, DiagnosticMessageBuilder, SourceSnippet};
use thiserror::Error;

/// A join expression that does not match the query grammar.
///
/// Carries the full query text and the byte span of the offending fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuerySyntaxError {
    pub query: String,
    pub span: Range<usize>,
    pub message: String,
}

impl QuerySyntaxError {
    pub fn new(query: &str, span: Range<usize>, message: impl Into<String>) -> Self {
        Self {
            query: query.to_string(),
            span,
            message: message.into(),
        }
    }

    /// The offending substring of the query.
    pub fn fragment(&self) -> &str {
        self.query.get(self.span.clone()).unwrap_or("")
    }
}

impl fmt::Display for QuerySyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.span.is_empty() {
            write!(f, "invalid query: {} (at end of `{}`)", self.message, self.query)
        } else {
            write!(f, "invalid query: {} in `{}`", self.message, self.fragment())
        }
    }
}

impl std::error::Error for QuerySyntaxError {}

/// Where a name conflict was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConflictScope {
    /// Global parameter keys overlap unqualified table column names.
    GlobalsAndColumns { globals: String },
    /// A table header repeats a column name.
    TableHeader { table: String },
}

impl fmt::Display for ConflictScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictScope::GlobalsAndColumns { globals } => {
                write!(f, "global parameters [{}] and table columns", globals)
            }
            ConflictScope::TableHeader { table } => write!(f, "header of table [{}]", table),
        }
    }
}

/// An unqualified template variable owned by several tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmbiguousName {
    pub name: String,
    /// Qualified `table.column` forms, in query order.
    pub alternatives: Vec<String>,
}

/// Errors that can occur while validating or generating from an input file.
#[derive(Debug, Error)]
pub enum TemplieError {
    #[error("Missing section: [{section}]")]
    MissingSection { section: String },

    #[error("Missing {} parameter(s) in [{section}] section", .parameters.join(", "))]
    MissingParameter {
        section: String,
        parameters: Vec<String>,
    },

    #[error("Wrong value for `{parameter}`: expected {expected}, found `{found}`")]
    WrongValue {
        parameter: String,
        expected: String,
        found: String,
    },

    #[error("{0}")]
    QuerySyntax(#[from] QuerySyntaxError),

    #[error("invalid line in [{section}]: {line}")]
    RowSyntax { section: String, line: String },

    #[error("Table section [{section}] is empty")]
    EmptyTable { section: String },

    #[error("Invalid delimiter in template [{section}] at line {line}: `{fragment}`")]
    DelimiterMisuse {
        section: String,
        line: usize,
        fragment: String,
    },

    #[error("Name conflicts in {scope}: {}", .names.join(", "))]
    NameConflict {
        scope: ConflictScope,
        names: Vec<String>,
    },

    #[error("Undefined variables in the template: {}", .names.join(", "))]
    UndefinedVariable { template: String, names: Vec<String> },

    #[error("Ambiguous variables in the template: {}", format_ambiguous(.names))]
    AmbiguousVariable {
        template: String,
        names: Vec<AmbiguousName>,
    },

    #[error("Table [{table}] named by the query was not supplied")]
    MissingTable { table: String },

    #[error("Table [{table}] has no column `{column}`")]
    UnknownColumn { table: String, column: String },

    #[error("Failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

fn format_ambiguous(names: &[AmbiguousName]) -> String {
    names
        .iter()
        .map(|n| format!("{} ({})", n.name, n.alternatives.join(" or ")))
        .collect::<Vec<_>>()
        .join(", ")
}

fn backticked(names: &[String]) -> String {
    names
        .iter()
        .map(|n| format!("`{}`", n))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result type for templie operations.
pub type Result<T> = std::result::Result<T, TemplieError>;

impl TemplieError {
    pub fn internal(message: impl Into<String>) -> Self {
        TemplieError::Internal {
            message: message.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        TemplieError::Io {
            path: path.into(),
            source,
        }
    }

    /// The diagnostic code of this error kind.
    pub fn code(&self) -> &'static str {
        match self {
            TemplieError::Internal { .. } => "T-0-1",
            TemplieError::Io { .. } => "T-1-1",
            TemplieError::MissingSection { .. } => "T-2-1",
            TemplieError::MissingParameter { .. } => "T-2-2",
            TemplieError::WrongValue { .. } => "T-2-3",
            TemplieError::RowSyntax { .. } => "T-3-1",
            TemplieError::EmptyTable { .. } => "T-3-2",
            TemplieError::DelimiterMisuse { .. } => "T-3-3",
            TemplieError::QuerySyntax(_) => "T-4-1",
            TemplieError::MissingTable { .. } => "T-4-2",
            TemplieError::UnknownColumn { .. } => "T-4-3",
            TemplieError::NameConflict { .. } => "T-5-1",
            TemplieError::UndefinedVariable { .. } => "T-5-2",
            TemplieError::AmbiguousVariable { .. } => "T-5-3",
        }
    }

    /// Convert this error to a DiagnosticMessage with the appropriate error code.
    pub fn to_diagnostic(&self) -> DiagnosticMessage {
        let code = self.code();
        match self {
            TemplieError::Internal { message } => DiagnosticMessageBuilder::error("Internal Error")
                .with_code(code)
                .problem(message.clone())
                .add_info("This is a bug in templie, not a problem with the input file")
                .build(),

            TemplieError::Io { path, source } => DiagnosticMessageBuilder::error("File Error")
                .with_code(code)
                .problem(format!("Can't access `{}`", path.display()))
                .add_detail(source.to_string())
                .build(),

            TemplieError::MissingSection { section } => {
                DiagnosticMessageBuilder::error("Missing Section")
                    .with_code(code)
                    .problem(format!(
                        "Section `[{}]` is missing or has no lines",
                        section
                    ))
                    .add_hint(format!("Add a `[{}]` section to the input file?", section))
                    .build()
            }

            TemplieError::MissingParameter {
                section,
                parameters,
            } => DiagnosticMessageBuilder::error("Missing Parameter")
                .with_code(code)
                .problem(format!(
                    "Section `[{}]` must declare {}",
                    section,
                    backticked(parameters)
                ))
                .build(),

            TemplieError::WrongValue {
                parameter,
                expected,
                found,
            } => DiagnosticMessageBuilder::error("Wrong Value")
                .with_code(code)
                .problem(format!("`{}` must be {}", parameter, expected))
                .add_detail(format!("Found `{}`", found))
                .build(),

            TemplieError::QuerySyntax(err) => {
                let mut builder = DiagnosticMessageBuilder::error("Query Syntax Error")
                    .with_code(code)
                    .problem(err.message.clone());
                if !err.query.trim().is_empty() {
                    builder = builder.with_snippet(SourceSnippet::new(
                        "repeater_parameters",
                        err.query.clone(),
                        err.span.clone(),
                    ));
                }
                builder
                    .add_info(
                        "Queries look like `base join other on base.key = other.key join ...`",
                    )
                    .build()
            }

            TemplieError::RowSyntax { section, line } => {
                DiagnosticMessageBuilder::error("Invalid Line")
                    .with_code(code)
                    .problem(format!("Line in `[{}]` does not have the expected shape", section))
                    .add_detail(format!("`{}`", line))
                    .add_info("Values containing spaces or separators must be quoted")
                    .build()
            }

            TemplieError::EmptyTable { section } => DiagnosticMessageBuilder::error("Empty Table")
                .with_code(code)
                .problem(format!(
                    "Table section `[{}]` must contain a header and at least one row",
                    section
                ))
                .build(),

            TemplieError::DelimiterMisuse {
                section,
                line,
                fragment,
            } => DiagnosticMessageBuilder::error("Invalid Template Delimiter")
                .with_code(code)
                .problem(format!(
                    "Template `[{}]` contains a `$` that does not start a placeholder",
                    section
                ))
                .add_detail(format!("Line {}: `{}`", line, fragment))
                .add_hint("Use `$$` if you want a dollar sign in your template?")
                .build(),

            TemplieError::NameConflict { scope, names } => {
                let builder = DiagnosticMessageBuilder::error("Name Conflict")
                    .with_code(code)
                    .problem(format!("Names must be unique in the {}", scope))
                    .add_detail(format!("Defined more than once: {}", backticked(names)));
                match scope {
                    ConflictScope::GlobalsAndColumns { .. } => builder
                        .add_hint("Rename the global parameter, or the column?")
                        .build(),
                    ConflictScope::TableHeader { .. } => builder.build(),
                }
            }

            TemplieError::UndefinedVariable { template, names } => {
                DiagnosticMessageBuilder::error("Undefined Variable")
                    .with_code(code)
                    .problem(format!(
                        "Template `[{}]` uses variables that no parameter defines",
                        template
                    ))
                    .add_detail(format!("Undefined: {}", backticked(names)))
                    .build()
            }

            TemplieError::AmbiguousVariable { template, names } => {
                let mut builder = DiagnosticMessageBuilder::error("Ambiguous Variable")
                    .with_code(code)
                    .problem(format!(
                        "Template `[{}]` uses unqualified names that several tables define",
                        template
                    ));
                for name in names {
                    builder = builder.add_detail(format!(
                        "`{}` could be {}",
                        name.name,
                        backticked(&name.alternatives)
                    ));
                }
                builder
                    .add_hint("Prefix the name with its table, as in `table.column`?")
                    .build()
            }

            TemplieError::MissingTable { table } => DiagnosticMessageBuilder::error("Missing Table")
                .with_code(code)
                .problem(format!("No table was supplied for `{}`", table))
                .build(),

            TemplieError::UnknownColumn { table, column } => {
                DiagnosticMessageBuilder::error("Unknown Column")
                    .with_code(code)
                    .problem(format!("Table `[{}]` has no column `{}`", table, column))
                    .add_info("Join keys must name columns from the table headers")
                    .build()
            }
        }
    }
}
