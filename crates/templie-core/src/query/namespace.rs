/*
 * namespace.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Variable names available to a template for each joined row.
//!
//! Every column is reachable as `table.column`. A bare `column` is only
//! available when exactly one table of the query defines it; otherwise the
//! bare name is ambiguous and must be qualified.

use super::executor::JoinedRow;
use crate::parameters::Parameters;
use crate::table::Table;
use crate::template::VariableSource;
use std::collections::BTreeMap;

/// How a template variable name maps onto the joined tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// A bare column name owned by a single table.
    Unqualified { table: usize, column: usize },
    /// A `table.column` name.
    Qualified { table: usize, column: usize },
    /// A bare column name owned by several tables.
    Ambiguous { alternatives: Vec<String> },
    Undefined,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespace {
    tables: Vec<String>,
    columns: Vec<Vec<String>>,
    /// Column name to the positions of the tables that define it.
    owners: BTreeMap<String, Vec<usize>>,
}

impl Namespace {
    /// Tables in [`CompiledQuery::names`](crate::CompiledQuery::names) order.
    pub fn new(tables: &[&Table]) -> Self {
        let mut owners: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        for (position, table) in tables.iter().enumerate() {
            for column in table.columns() {
                owners.entry(column.clone()).or_default().push(position);
            }
        }
        Self {
            tables: tables.iter().map(|t| t.name().to_string()).collect(),
            columns: tables.iter().map(|t| t.columns().to_vec()).collect(),
            owners,
        }
    }

    pub fn is_ambiguous(&self, column: &str) -> bool {
        self.owners.get(column).is_some_and(|o| o.len() > 1)
    }

    /// Bare column names owned by exactly one table, sorted.
    pub fn unqualified_names(&self) -> impl Iterator<Item = &str> {
        self.owners
            .iter()
            .filter(|(_, owners)| owners.len() == 1)
            .map(|(column, _)| column.as_str())
    }

    /// Qualified forms of a bare column name, in table order.
    pub fn qualified_alternatives(&self, column: &str) -> Vec<String> {
        self.owners
            .get(column)
            .map(|owners| {
                owners
                    .iter()
                    .map(|&t| format!("{}.{}", self.tables[t], column))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn resolve(&self, name: &str) -> Resolution {
        if let Some((table, column)) = name.split_once('.') {
            return self
                .locate(table, column)
                .map_or(Resolution::Undefined, |(table, column)| {
                    Resolution::Qualified { table, column }
                });
        }
        match self.owners.get(name).map(Vec::as_slice) {
            Some(&[table]) => match self.columns[table].iter().position(|c| c == name) {
                Some(column) => Resolution::Unqualified { table, column },
                None => Resolution::Undefined,
            },
            Some([_, _, ..]) => Resolution::Ambiguous {
                alternatives: self.qualified_alternatives(name),
            },
            _ => Resolution::Undefined,
        }
    }

    fn locate(&self, table: &str, column: &str) -> Option<(usize, usize)> {
        let t = self.tables.iter().position(|name| name == table)?;
        let c = self.columns[t].iter().position(|name| name == column)?;
        Some((t, c))
    }

    /// Build the render-ready variables of one joined row.
    ///
    /// `tables` must be the tables the row was joined from, in the order the
    /// namespace was built with.
    pub fn flatten(&self, tables: &[&Table], row: &JoinedRow) -> FlattenedRow {
        let mut values = BTreeMap::new();
        for (position, table) in tables.iter().enumerate() {
            let Some(record) = row.row_index(position).and_then(|i| table.row(i)) else {
                continue;
            };
            for (column, value) in table.columns().iter().zip(record) {
                values.insert(format!("{}.{}", table.name(), column), value.clone());
                if !self.is_ambiguous(column) {
                    values.insert(column.clone(), value.clone());
                }
            }
        }
        FlattenedRow { values }
    }
}

/// Variable name to value for one output row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlattenedRow {
    values: BTreeMap<String, String>,
}

impl FlattenedRow {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Add the global parameters. Their names were checked against the
    /// row's bare names beforehand, so nothing is overwritten.
    pub fn with_globals(mut self, globals: &Parameters) -> Self {
        for (name, value) in globals.iter() {
            self.values.insert(name.to_string(), value.to_string());
        }
        self
    }
}

impl VariableSource for FlattenedRow {
    fn lookup(&self, name: &str) -> Option<&str> {
        self.get(name)
    }
}
