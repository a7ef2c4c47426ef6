/*
 * parameters.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! `name = value` parameter sections.
//!
//! Used for both the configuration section and the global parameters.

use crate::error::{Result, TemplieError};
use crate::syntax::LineSyntax;
use crate::text::clean_lines;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parameters {
    values: BTreeMap<String, String>,
}

impl Parameters {
    /// Parse the raw lines of `section`.
    ///
    /// Comments and blank lines are skipped. When a name repeats, the later
    /// value wins.
    pub fn parse(section: &str, lines: &[String], syntax: &LineSyntax) -> Result<Self> {
        let mut values = BTreeMap::new();
        for line in clean_lines(lines.iter().map(String::as_str)) {
            let (name, value) = syntax.parameter(line).ok_or_else(|| TemplieError::RowSyntax {
                section: section.to_string(),
                line: line.to_string(),
            })?;
            values.insert(name, value);
        }
        Ok(Self { values })
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Parameters {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
