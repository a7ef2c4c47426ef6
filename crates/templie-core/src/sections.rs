/*
 * sections.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Splitting an input file into named sections.
//!
//! A section starts at a `[name]` header line and runs until the next header.
//! Lines before the first header belong to no section and are dropped. Lines
//! are kept raw, terminators included, because template sections are
//! rendered verbatim.

use crate::syntax::LineSyntax;
use crate::text::strip_comment;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sections {
    sections: BTreeMap<String, Vec<String>>,
}

impl Sections {
    pub fn scan(input: &str, syntax: &LineSyntax) -> Self {
        let mut sections: BTreeMap<String, Vec<String>> = BTreeMap::new();
        let mut current: Option<String> = None;

        for line in input.split_inclusive('\n') {
            if let Some(name) = syntax.section_name(strip_comment(line)) {
                current = Some(name.to_string());
                continue;
            }
            if let Some(name) = &current {
                // A repeated header keeps appending to the same section.
                sections.entry(name.clone()).or_default().push(line.to_string());
            }
        }

        tracing::trace!(count = sections.len(), "scanned sections");
        Self { sections }
    }

    /// The raw lines of a section.
    ///
    /// A header followed by no lines at all is reported as absent.
    pub fn lines(&self, name: &str) -> Option<&[String]> {
        self.sections
            .get(name)
            .map(Vec::as_slice)
            .filter(|lines| !lines.is_empty())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lines(name).is_some()
    }

    /// Section names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}
