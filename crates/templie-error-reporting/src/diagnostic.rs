//! Core diagnostic message types.
//!
//! This module defines the fundamental structures for representing diagnostic messages
//! following tidyverse-style guidelines.

use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::ops::Range;

/// The kind of diagnostic message.
///
/// Every templie diagnostic stops the run, so errors are the only kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiagnosticKind {
    /// An error that prevents completion
    Error,
}

impl DiagnosticKind {
    fn label(self) -> &'static str {
        match self {
            DiagnosticKind::Error => "Error",
        }
    }

    fn as_json_str(self) -> &'static str {
        match self {
            DiagnosticKind::Error => "error",
        }
    }
}

/// How detail items should be presented (tidyverse x/i bullet style).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DetailKind {
    /// Error detail (✖ bullet in tidyverse style)
    Error,
    /// Info detail (i bullet in tidyverse style)
    Info,
}

impl DetailKind {
    fn bullet(self) -> &'static str {
        match self {
            DetailKind::Error => "✖",
            DetailKind::Info => "ℹ",
        }
    }

    fn as_json_str(self) -> &'static str {
        match self {
            DetailKind::Error => "error",
            DetailKind::Info => "info",
        }
    }
}

/// The content of a message or detail item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageContent {
    /// Plain text content
    Plain(String),
    /// Markdown content (backticks mark identifiers and input fragments)
    Markdown(String),
}

impl MessageContent {
    /// Get the raw string content for display
    pub fn as_str(&self) -> &str {
        match self {
            MessageContent::Plain(s) => s,
            MessageContent::Markdown(s) => s,
        }
    }

    /// Convert to JSON value with type information
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::json;
        match self {
            MessageContent::Plain(s) => json!({
                "type": "plain",
                "content": s
            }),
            MessageContent::Markdown(s) => json!({
                "type": "markdown",
                "content": s
            }),
        }
    }
}

impl From<String> for MessageContent {
    fn from(s: String) -> Self {
        MessageContent::Markdown(s)
    }
}

impl From<&str> for MessageContent {
    fn from(s: &str) -> Self {
        MessageContent::Markdown(s.to_string())
    }
}

/// A detail item in a diagnostic message.
///
/// Following tidyverse guidelines, details provide specific information about
/// the error (what went wrong, where, with what values).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailItem {
    /// The kind of detail (error or info)
    pub kind: DetailKind,
    /// The content of the detail
    pub content: MessageContent,
}

/// A piece of input text with the span a diagnostic points at.
///
/// Offsets are byte offsets into `source`. The snippet owns its text so a
/// diagnostic can be rendered long after the input it was produced from
/// has been dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSnippet {
    /// Display name of the source (e.g. `repeater_parameters`)
    pub name: String,
    /// The full source text
    pub source: String,
    /// Byte range of the highlighted span
    pub span: Range<usize>,
}

impl SourceSnippet {
    pub fn new(name: impl Into<String>, source: impl Into<String>, span: Range<usize>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
            span,
        }
    }

    /// The highlighted text.
    pub fn fragment(&self) -> &str {
        self.source.get(self.span.clone()).unwrap_or("")
    }

    /// Ariadne counts characters, not bytes.
    fn char_span(&self) -> Range<usize> {
        let to_chars = |offset: usize| {
            let offset = offset.min(self.source.len());
            self.source
                .char_indices()
                .take_while(|(i, _)| *i < offset)
                .count()
        };
        to_chars(self.span.start)..to_chars(self.span.end)
    }
}

/// A diagnostic message following tidyverse-style structure.
///
/// Structure:
/// 1. **Code**: Optional error code (e.g., "T-2-1") for searchability
/// 2. **Title**: Brief error message
/// 3. **Kind**: Error
/// 4. **Problem**: What went wrong (the "must" or "can't" statement)
/// 5. **Details**: Specific information (bulleted, max 5 per tidyverse)
/// 6. **Hints**: Optional guidance for fixing (ends with ?)
/// 7. **Snippet**: Optional source text with the offending span
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticMessage {
    /// Optional error code (e.g., "T-2-1")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    /// Brief title for the error
    pub title: String,

    /// The kind of diagnostic
    pub kind: DiagnosticKind,

    /// The problem statement (the "what" - using "must" or "can't")
    pub problem: Option<MessageContent>,

    /// Specific error details (the "where/why" - max 5 per tidyverse)
    pub details: Vec<DetailItem>,

    /// Optional hints for fixing (ends with ?)
    pub hints: Vec<MessageContent>,

    /// Source text this diagnostic points into
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snippet: Option<SourceSnippet>,
}

impl DiagnosticMessage {
    /// Create a new diagnostic message with just a title and kind.
    ///
    /// Note: Consider using [`DiagnosticMessageBuilder`](crate::DiagnosticMessageBuilder)
    /// instead for better structure.
    pub fn new(kind: DiagnosticKind, title: impl Into<String>) -> Self {
        Self {
            code: None,
            title: title.into(),
            kind,
            problem: None,
            details: Vec::new(),
            hints: Vec::new(),
            snippet: None,
        }
    }

    /// Create an error diagnostic.
    pub fn error(title: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Error, title)
    }

    /// Set the error code.
    ///
    /// Error codes follow the format `T-<subsystem>-<number>` (e.g., "T-4-1").
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Subsystem of this diagnostic's error code, from the catalog.
    pub fn subsystem(&self) -> Option<&str> {
        self.code
            .as_ref()
            .and_then(|code| crate::catalog::get_subsystem(code))
    }

    /// Render this diagnostic message as text following tidyverse style.
    ///
    /// Format:
    /// ```text
    /// Error [T-5-3]: title
    /// Problem statement here
    /// ✖ Error detail 1
    /// ℹ Info detail
    /// ? Hint 1
    /// ```
    ///
    /// When the diagnostic carries a [`SourceSnippet`], the title and problem
    /// are rendered by ariadne around the highlighted source instead.
    ///
    /// # Example
    ///
    /// ```
    /// use templie_error_reporting::DiagnosticMessageBuilder;
    ///
    /// let msg = DiagnosticMessageBuilder::error("Invalid input")
    ///     .problem("Values must be quoted")
    ///     .add_detail("Found a bare `\"` in line 3")
    ///     .add_hint("Escape the quote with a backslash?")
    ///     .build();
    /// let text = msg.to_text();
    /// assert!(text.contains("Error: Invalid input"));
    /// assert!(text.contains("Values must be quoted"));
    /// ```
    pub fn to_text(&self) -> String {
        let mut result = String::new();

        let ariadne_output = self
            .snippet
            .as_ref()
            .and_then(|snippet| self.render_ariadne_source_context(snippet));

        match ariadne_output {
            Some(output) => result.push_str(&output),
            None => {
                match &self.code {
                    Some(code) => {
                        let _ = writeln!(
                            result,
                            "{} [{}]: {}",
                            self.kind.label(),
                            code,
                            self.title
                        );
                    }
                    None => {
                        let _ = writeln!(result, "{}: {}", self.kind.label(), self.title);
                    }
                }
                if let Some(problem) = &self.problem {
                    let _ = writeln!(result, "{}", problem.as_str());
                }
            }
        }

        for detail in &self.details {
            let _ = writeln!(result, "{} {}", detail.kind.bullet(), detail.content.as_str());
        }

        for hint in &self.hints {
            let _ = writeln!(result, "? {}", hint.as_str());
        }

        result.trim_end().to_string()
    }

    /// Render this diagnostic message as a JSON value.
    ///
    /// ```json
    /// {
    ///   "kind": "error",
    ///   "title": "Ambiguous Variable",
    ///   "code": "T-5-3",
    ///   "problem": {"type": "markdown", "content": "..."},
    ///   "details": [{"kind": "error", "content": {...}}],
    ///   "hints": [{"type": "markdown", "content": "..."}]
    /// }
    /// ```
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::json;

        let mut obj = json!({
            "kind": self.kind.as_json_str(),
            "title": self.title,
        });

        if let Some(code) = &self.code {
            obj["code"] = json!(code);
        }

        if let Some(problem) = &self.problem {
            obj["problem"] = problem.to_json();
        }

        if !self.details.is_empty() {
            let details: Vec<_> = self
                .details
                .iter()
                .map(|d| {
                    json!({
                        "kind": d.kind.as_json_str(),
                        "content": d.content.to_json()
                    })
                })
                .collect();
            obj["details"] = json!(details);
        }

        if !self.hints.is_empty() {
            let hints: Vec<_> = self.hints.iter().map(|h| h.to_json()).collect();
            obj["hints"] = json!(hints);
        }

        if let Some(snippet) = &self.snippet {
            obj["snippet"] = json!({
                "name": snippet.name,
                "start": snippet.span.start,
                "end": snippet.span.end,
                "fragment": snippet.fragment(),
            });
        }

        obj
    }

    /// Render the snippet with ariadne (private helper for to_text).
    ///
    /// Produces the title line, the source excerpt and a label under the
    /// highlighted span carrying the problem statement.
    fn render_ariadne_source_context(&self, snippet: &SourceSnippet) -> Option<String> {
        use ariadne::{Color, Config, Label, Report, ReportKind, Source};

        let report_kind = match self.kind {
            DiagnosticKind::Error => ReportKind::Error,
        };

        let span = snippet.char_span();
        let mut report = Report::build(report_kind, snippet.name.clone(), span.start)
            .with_config(Config::default().with_color(false));

        report = match &self.code {
            Some(code) => report.with_message(format!("[{}] {}", code, self.title)),
            None => report.with_message(&self.title),
        };

        let label_message = match &self.problem {
            Some(problem) => problem.as_str(),
            None => &self.title,
        };
        report = report.with_label(
            Label::new((snippet.name.clone(), span))
                .with_message(label_message)
                .with_color(Color::Red),
        );

        let mut output = Vec::new();
        report
            .finish()
            .write(
                (snippet.name.clone(), Source::from(snippet.source.as_str())),
                &mut output,
            )
            .ok()?;

        String::from_utf8(output).ok()
    }
}
