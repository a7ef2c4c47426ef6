/*
 * table.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Tabular parameter sections.
//!
//! A [`Table`] is a fixed-shape record set: one shared column list and rows
//! stored as value arrays of exactly that width. Tables are immutable once
//! built.

use crate::error::{ConflictScope, Result, TemplieError};
use crate::syntax::LineSyntax;
use crate::text::{clean_lines, unescape};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    name: String,
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Build a table, checking that column names are unique and that every
    /// row has one value per column.
    pub fn new(
        name: impl Into<String>,
        columns: Vec<String>,
        rows: Vec<Vec<String>>,
    ) -> Result<Self> {
        let name = name.into();

        let mut seen = BTreeSet::new();
        let duplicates: BTreeSet<&String> =
            columns.iter().filter(|c| !seen.insert(c.as_str())).collect();
        if !duplicates.is_empty() {
            return Err(TemplieError::NameConflict {
                scope: ConflictScope::TableHeader { table: name },
                names: duplicates.into_iter().cloned().collect(),
            });
        }

        if let Some(bad) = rows.iter().find(|row| row.len() != columns.len()) {
            return Err(TemplieError::RowSyntax {
                section: name,
                line: bad.join(", "),
            });
        }

        Ok(Self {
            name,
            columns,
            rows,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&[String]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    /// Value of `column` in row `row`.
    pub fn value(&self, row: usize, column: &str) -> Option<&str> {
        let index = self.column_index(column)?;
        self.rows.get(row).map(|values| values[index].as_str())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Parse the raw lines of a table section.
///
/// The first meaningful line is the header. When it is the flat marker, or
/// when `force_flat` is set, the body is in flat layout: one value per line,
/// consecutive groups of column-count lines forming a row.
pub fn parse_table(
    name: &str,
    lines: &[String],
    syntax: &LineSyntax,
    force_flat: bool,
) -> Result<Table> {
    let mut cleaned = clean_lines(lines.iter().map(String::as_str)).into_iter();
    let empty = || TemplieError::EmptyTable {
        section: name.to_string(),
    };

    let mut first = cleaned.next().ok_or_else(empty)?;
    let mut flat = force_flat;
    if syntax.is_flat_marker(first) {
        flat = true;
        first = cleaned.next().ok_or_else(empty)?;
    }
    let body: Vec<&str> = cleaned.collect();

    let columns = parse_header(name, first, syntax)?;
    let rows = if flat {
        flat_rows(name, &body, columns.len())?
    } else {
        let pattern = syntax.row_pattern(columns.len())?;
        body.iter()
            .map(|line| parse_row(name, line, &pattern))
            .collect::<Result<Vec<_>>>()?
    };

    tracing::debug!(table = name, columns = columns.len(), rows = rows.len(), flat, "parsed table");
    Table::new(name, columns, rows)
}

fn row_syntax(section: &str, line: &str) -> TemplieError {
    TemplieError::RowSyntax {
        section: section.to_string(),
        line: line.to_string(),
    }
}

fn parse_header(name: &str, header: &str, syntax: &LineSyntax) -> Result<Vec<String>> {
    let pattern = syntax.header_pattern(syntax.column_count(header))?;
    let caps = pattern
        .captures(header)
        .ok_or_else(|| row_syntax(name, header))?;
    Ok(caps
        .iter()
        .skip(1)
        .flatten()
        .map(|m| m.as_str().to_string())
        .collect())
}

fn parse_row(name: &str, line: &str, pattern: &regex::Regex) -> Result<Vec<String>> {
    let caps = pattern.captures(line).ok_or_else(|| row_syntax(name, line))?;
    let groups: Vec<Option<regex::Match<'_>>> = caps.iter().skip(1).collect();
    Ok(groups
        .chunks(2)
        .map(|pair| match pair {
            [Some(bare), _] => bare.as_str().to_string(),
            [None, Some(quoted)] => unescape(quoted.as_str()),
            _ => String::new(),
        })
        .collect())
}

fn flat_rows(name: &str, body: &[&str], width: usize) -> Result<Vec<Vec<String>>> {
    body.chunks(width)
        .map(|group| {
            if group.len() < width {
                let last = group.last().copied().unwrap_or_default();
                return Err(row_syntax(name, last));
            }
            Ok(group.iter().map(|line| flat_value(line)).collect())
        })
        .collect()
}

/// A quoted flat line is unescaped; anything else is taken literally.
fn flat_value(line: &str) -> String {
    match line.strip_prefix('"').and_then(|l| l.strip_suffix('"')) {
        Some(inner) => unescape(inner),
        None => line.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use pretty_assertions::assert_eq;

    fn lines(raw: &str) -> Vec<String> {
        raw.split_inclusive('\n').map(str::to_string).collect()
    }

    fn parse(raw: &str) -> Result<Table> {
        let syntax = LineSyntax::new(&Settings::default()).unwrap();
        parse_table("orders", &lines(raw), &syntax, false)
    }

    fn row(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_parse_table() {
        let table = parse("id, cust; note\n1, 10, first\n2 20 \"second one\"  # c\n\n").unwrap();
        assert_eq!(table.name(), "orders");
        assert_eq!(table.columns(), &row(&["id", "cust", "note"]));
        assert_eq!(
            table.rows(),
            &[row(&["1", "10", "first"]), row(&["2", "20", "second one"])]
        );
        assert_eq!(table.value(1, "note"), Some("second one"));
        assert_eq!(table.value(1, "missing"), None);
        assert_eq!(table.value(5, "id"), None);
    }

    #[test]
    fn test_quoted_values_unescape() {
        let table = parse("a, b\n\"x, \\\"y\\\"\", \"\"\n").unwrap();
        assert_eq!(table.rows(), &[row(&["x, \"y\"", ""])]);
    }

    #[test]
    fn test_header_only_table_has_no_rows() {
        let table = parse("id, name\n").unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_flat_layout() {
        let table = parse("*flat*\nid name\n1\nAnn Lee\n2\n\"Bo\"\n").unwrap();
        assert_eq!(table.rows(), &[row(&["1", "Ann Lee"]), row(&["2", "Bo"])]);
    }

    #[test]
    fn test_forced_flat_layout() {
        let syntax = LineSyntax::new(&Settings::default()).unwrap();
        let table = parse_table("t", &lines("a b\n1\n2\n"), &syntax, true).unwrap();
        assert_eq!(table.rows(), &[row(&["1", "2"])]);
    }

    #[test]
    fn test_flat_incomplete_row() {
        let err = parse("*flat*\na b\n1\n2\n3\n").unwrap_err();
        assert!(matches!(err, TemplieError::RowSyntax { ref line, .. } if line == "3"));
    }

    #[test]
    fn test_empty_sections() {
        assert!(matches!(parse("\n# only a comment\n"), Err(TemplieError::EmptyTable { .. })));
        assert!(matches!(parse("*flat*\n"), Err(TemplieError::EmptyTable { .. })));
    }

    #[test]
    fn test_row_arity_mismatch() {
        let err = parse("a, b\n1, 2, 3\n").unwrap_err();
        assert!(matches!(err, TemplieError::RowSyntax { ref line, .. } if line == "1, 2, 3"));
    }

    #[test]
    fn test_bad_header() {
        let err = parse("id, 2nd\n1, 2\n").unwrap_err();
        assert!(matches!(err, TemplieError::RowSyntax { ref line, .. } if line == "id, 2nd"));
    }

    #[test]
    fn test_duplicate_header_names() {
        let err = parse("id, name, id\n1, a, 2\n").unwrap_err();
        match err {
            TemplieError::NameConflict { scope, names } => {
                assert_eq!(
                    scope,
                    ConflictScope::TableHeader {
                        table: "orders".to_string()
                    }
                );
                assert_eq!(names, vec!["id".to_string()]);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_new_checks_row_width() {
        let err = Table::new("t", row(&["a", "b"]), vec![row(&["1"])]).unwrap_err();
        assert!(matches!(err, TemplieError::RowSyntax { .. }));
    }
}
