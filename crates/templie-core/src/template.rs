/*
 * template.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Template sections.
//!
//! Placeholders are `$name` or `${name}`, where `name` is an identifier or a
//! qualified `table.column` pair. `$$` produces a literal dollar sign. Any
//! other `$` is a delimiter misuse, recorded at parse time and reported by
//! [`Template::validate_delimiters`].

use crate::error::{Result, TemplieError};
use std::collections::{BTreeMap, BTreeSet};
use std::iter::Peekable;
use std::str::CharIndices;

/// Something a template can read placeholder values from.
pub trait VariableSource {
    fn lookup(&self, name: &str) -> Option<&str>;
}

impl VariableSource for BTreeMap<String, String> {
    fn lookup(&self, name: &str) -> Option<&str> {
        self.get(name).map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Placeholder(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Misuse {
    line: usize,
    fragment: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    section: String,
    segments: Vec<Segment>,
    misuse: Option<Misuse>,
}

impl Template {
    /// Build a template from the raw lines of `section`, joined verbatim.
    pub fn from_lines(section: &str, lines: &[String]) -> Self {
        Self::parse(section, &lines.concat())
    }

    pub fn parse(section: &str, content: &str) -> Self {
        let mut scanner = Scanner::new(content);
        scanner.run();
        Self {
            section: section.to_string(),
            segments: scanner.segments,
            misuse: scanner.misuse,
        }
    }

    pub fn section(&self) -> &str {
        &self.section
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Every distinct placeholder name, sorted.
    pub fn placeholder_names(&self) -> BTreeSet<&str> {
        self.segments
            .iter()
            .filter_map(|segment| match segment {
                Segment::Placeholder(name) => Some(name.as_str()),
                Segment::Literal(_) => None,
            })
            .collect()
    }

    /// Fail on the first `$` that neither starts a placeholder nor is doubled.
    pub fn validate_delimiters(&self) -> Result<()> {
        match &self.misuse {
            Some(misuse) => Err(TemplieError::DelimiterMisuse {
                section: self.section.clone(),
                line: misuse.line,
                fragment: misuse.fragment.clone(),
            }),
            None => Ok(()),
        }
    }

    /// Render the template against `values`.
    ///
    /// Validation guarantees every placeholder is bound, so a missing value
    /// is reported as an internal error.
    pub fn substitute(&self, values: &impl VariableSource) -> Result<String> {
        let mut output = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => output.push_str(text),
                Segment::Placeholder(name) => {
                    let value = values.lookup(name).ok_or_else(|| {
                        TemplieError::internal(format!(
                            "placeholder `{}` of template [{}] has no value",
                            name, self.section
                        ))
                    })?;
                    output.push_str(value);
                }
            }
        }
        Ok(output)
    }
}

fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

struct Scanner<'a> {
    content: &'a str,
    chars: Peekable<CharIndices<'a>>,
    literal: String,
    segments: Vec<Segment>,
    misuse: Option<Misuse>,
}

impl<'a> Scanner<'a> {
    fn new(content: &'a str) -> Self {
        Self {
            content,
            chars: content.char_indices().peekable(),
            literal: String::new(),
            segments: Vec::new(),
            misuse: None,
        }
    }

    fn run(&mut self) {
        while let Some((pos, c)) = self.chars.next() {
            if c != '$' {
                self.literal.push(c);
                continue;
            }
            match self.chars.peek().map(|&(_, next)| next) {
                Some('$') => {
                    self.chars.next();
                    self.literal.push('$');
                }
                Some('{') => {
                    self.chars.next();
                    match self.braced() {
                        Some(name) => self.placeholder(name),
                        None => self.record_misuse(pos),
                    }
                }
                Some(next) if is_identifier_start(next) => {
                    let name = self.compound_name();
                    self.placeholder(name);
                }
                _ => self.record_misuse(pos),
            }
        }
        self.flush();
    }

    fn flush(&mut self) {
        if !self.literal.is_empty() {
            self.segments
                .push(Segment::Literal(std::mem::take(&mut self.literal)));
        }
    }

    fn placeholder(&mut self, name: String) {
        self.flush();
        self.segments.push(Segment::Placeholder(name));
    }

    fn identifier(&mut self) -> String {
        let mut name = String::new();
        while let Some(&(_, c)) = self.chars.peek() {
            if !is_identifier_char(c) {
                break;
            }
            name.push(c);
            self.chars.next();
        }
        name
    }

    /// `ident` or `ident.ident`. A dot not followed by an identifier is left
    /// in the text.
    fn compound_name(&mut self) -> String {
        let mut name = self.identifier();
        let mut lookahead = self.chars.clone();
        match (lookahead.next(), lookahead.next()) {
            (Some((_, '.')), Some((_, next))) if is_identifier_start(next) => {
                self.chars.next();
                name.push('.');
                name.push_str(&self.identifier());
            }
            _ => {}
        }
        name
    }

    /// The name inside `${...}`; `None` when the braces do not hold one.
    fn braced(&mut self) -> Option<String> {
        match self.chars.peek() {
            Some(&(_, c)) if is_identifier_start(c) => {}
            _ => return None,
        }
        let name = self.compound_name();
        match self.chars.peek() {
            Some(&(_, '}')) => {
                self.chars.next();
                Some(name)
            }
            _ => None,
        }
    }

    /// Keep the first misuse and carry on scanning, treating the `$` as text.
    fn record_misuse(&mut self, pos: usize) {
        self.literal.push('$');
        if self.misuse.is_some() {
            return;
        }
        let line_start = self.content[..pos].rfind('\n').map_or(0, |i| i + 1);
        let line_end = self.content[pos..]
            .find('\n')
            .map_or(self.content.len(), |i| pos + i);
        self.misuse = Some(Misuse {
            line: self.content[..pos].matches('\n').count() + 1,
            fragment: self.content[line_start..line_end].trim_end().to_string(),
        });
    }
}
