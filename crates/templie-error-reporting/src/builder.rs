//! Builder API for diagnostic messages.
//!
//! This module provides a builder pattern that encodes tidyverse-style error message
//! guidelines directly in the API, making it easy to construct well-structured error messages.

use crate::diagnostic::{
    DetailItem, DetailKind, DiagnosticKind, DiagnosticMessage, MessageContent, SourceSnippet,
};

/// Builder for creating diagnostic messages following tidyverse guidelines.
///
/// The builder API naturally encourages the tidyverse four-part error structure:
/// 1. **Title**: Brief error message (via `.error()`)
/// 2. **Problem**: What went wrong - the "must" or "can't" statement (via `.problem()`)
/// 3. **Details**: Specific information - max 5 bulleted items (via `.add_detail()`, `.add_info()`)
/// 4. **Hints**: Optional guidance (via `.add_hint()`)
///
/// # Example
///
/// ```
/// use templie_error_reporting::DiagnosticMessageBuilder;
///
/// let error = DiagnosticMessageBuilder::error("Name Conflict")
///     .with_code("T-5-1")
///     .problem("Global parameters and table columns must not share names")
///     .add_detail("`status` is defined in `[globals]` and in `[orders]`")
///     .add_hint("Rename the global parameter?")
///     .build();
///
/// assert_eq!(error.title, "Name Conflict");
/// assert_eq!(error.code, Some("T-5-1".to_string()));
/// assert_eq!(error.details.len(), 1);
/// assert_eq!(error.hints.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct DiagnosticMessageBuilder {
    kind: DiagnosticKind,
    title: String,
    code: Option<String>,
    problem: Option<MessageContent>,
    details: Vec<DetailItem>,
    hints: Vec<MessageContent>,
    snippet: Option<SourceSnippet>,
}

impl DiagnosticMessageBuilder {
    /// Create a new builder with the specified kind and title.
    ///
    /// Most code should use the convenience method `.error()`
    /// instead of calling this directly.
    pub fn new(kind: DiagnosticKind, title: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            code: None,
            problem: None,
            details: Vec::new(),
            hints: Vec::new(),
            snippet: None,
        }
    }

    /// Create an error diagnostic builder.
    pub fn error(title: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Error, title)
    }

    /// Set the error code (`T-<subsystem>-<number>`).
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Attach the source text and the span the diagnostic points at.
    pub fn with_snippet(mut self, snippet: SourceSnippet) -> Self {
        self.snippet = Some(snippet);
        self
    }

    /// Set the problem statement.
    ///
    /// Following tidyverse guidelines, the problem statement should:
    /// - Start with a general, concise statement
    /// - Use "must" for requirements or "can't" for impossibilities
    /// - Be specific about types/expectations
    pub fn problem(mut self, stmt: impl Into<MessageContent>) -> Self {
        self.problem = Some(stmt.into());
        self
    }

    /// Add an error detail (displayed with error/cross bullet).
    ///
    /// Error details provide specific information about what went wrong:
    /// the location, name, or content of the problematic input.
    pub fn add_detail(mut self, detail: impl Into<MessageContent>) -> Self {
        self.details.push(DetailItem {
            kind: DetailKind::Error,
            content: detail.into(),
        });
        self
    }

    /// Add an info detail (displayed with info bullet).
    pub fn add_info(mut self, info: impl Into<MessageContent>) -> Self {
        self.details.push(DetailItem {
            kind: DetailKind::Info,
            content: info.into(),
        });
        self
    }

    /// Add a hint for fixing the error.
    ///
    /// Hints should only be included when the problem source is clear and
    /// common, and end with a question mark if suggesting action.
    pub fn add_hint(mut self, hint: impl Into<MessageContent>) -> Self {
        self.hints.push(hint.into());
        self
    }

    /// Build the diagnostic message.
    pub fn build(self) -> DiagnosticMessage {
        DiagnosticMessage {
            code: self.code,
            title: self.title,
            kind: self.kind,
            problem: self.problem,
            details: self.details,
            hints: self.hints,
            snippet: self.snippet,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_kinds() {
        assert_eq!(
            DiagnosticMessageBuilder::error("e").build().kind,
            DiagnosticKind::Error
        );
    }

    #[test]
    fn test_builder_problem() {
        let msg = DiagnosticMessageBuilder::error("Test")
            .problem("Something went wrong")
            .build();
        assert_eq!(msg.problem.unwrap().as_str(), "Something went wrong");
    }

    #[test]
    fn test_builder_details() {
        let msg = DiagnosticMessageBuilder::error("Test")
            .add_detail("Detail 1")
            .add_info("Info 1")
            .build();

        assert_eq!(msg.details.len(), 2);
        assert_eq!(msg.details[0].kind, DetailKind::Error);
        assert_eq!(msg.details[1].kind, DetailKind::Info);
    }

    #[test]
    fn test_builder_snippet() {
        let msg = DiagnosticMessageBuilder::error("Test")
            .with_snippet(SourceSnippet::new("query", "a join", 2..6))
            .build();
        assert_eq!(msg.snippet.unwrap().fragment(), "join");
    }
}
