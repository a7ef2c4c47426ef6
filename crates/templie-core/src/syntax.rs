/*
 * syntax.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Compiled line grammar of the input format.
//!
//! A [`LineSyntax`] is built once per [`Validator`](crate::Validator) and
//! owned by it. Nothing here is global, so validators built from different
//! [`Settings`] never share state.

use crate::error::{Result, TemplieError};
use crate::settings::Settings;
use crate::text::unescape;
use regex::Regex;

/// Identifier shape shared by section keys, column names and table names.
pub const IDENTIFIER: &str = r"[_a-zA-Z][_a-zA-Z0-9]*";

/// A single table value: a bare token or a quoted string.
const VALUE_UNIT: &str = r#"\s*(?:([^,;" ]+)|"((?:\\.|[^"])*)")\s*"#;

/// Separator between header names or row values.
const UNIT_SEPARATOR: &str = "[,; ]";

#[derive(Debug, Clone)]
pub struct LineSyntax {
    section_header: Regex,
    parameter: Regex,
    header_split: Regex,
    flat_marker: Regex,
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern)
        .map_err(|e| TemplieError::internal(format!("invalid line pattern `{}`: {}", pattern, e)))
}

impl LineSyntax {
    pub fn new(settings: &Settings) -> Result<Self> {
        Ok(Self {
            section_header: compile(r"^\s*\[(.+)\]\s*$")?,
            parameter: compile(&format!(
                r#"^\s*({})\s*=\s*(?:([^" ]+)|"((?:\\.|[^"])*)")\s*$"#,
                IDENTIFIER
            ))?,
            header_split: compile(r"\s*,\s*|\s*;\s*|\s+")?,
            flat_marker: compile(&format!(r"^\s*{}\s*$", regex::escape(&settings.flat_marker)))?,
        })
    }

    /// The section name if `line` (already comment-stripped) is a header.
    pub fn section_name<'a>(&self, line: &'a str) -> Option<&'a str> {
        self.section_header
            .captures(line.trim())
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }

    /// Split a `name = value` line. Quoted values are unescaped.
    pub fn parameter(&self, line: &str) -> Option<(String, String)> {
        let caps = self.parameter.captures(line)?;
        let name = caps.get(1)?.as_str().to_string();
        let value = match (caps.get(2), caps.get(3)) {
            (Some(bare), _) => bare.as_str().to_string(),
            (None, Some(quoted)) => unescape(quoted.as_str()),
            (None, None) => return None,
        };
        Some((name, value))
    }

    pub fn is_flat_marker(&self, line: &str) -> bool {
        self.flat_marker.is_match(line)
    }

    /// Number of columns a header line declares.
    pub fn column_count(&self, header: &str) -> usize {
        self.header_split.split(header.trim()).count()
    }

    /// Pattern matching a header of exactly `columns` identifiers.
    pub fn header_pattern(&self, columns: usize) -> Result<Regex> {
        compound(&format!(r"\s*({})\s*", IDENTIFIER), columns)
    }

    /// Pattern matching a row of exactly `columns` values.
    ///
    /// Each value contributes two groups: bare, then quoted.
    pub fn row_pattern(&self, columns: usize) -> Result<Regex> {
        compound(VALUE_UNIT, columns)
    }
}

fn compound(unit: &str, count: usize) -> Result<Regex> {
    let body = vec![unit; count].join(UNIT_SEPARATOR);
    compile(&format!("^{}$", body))
}
