/*
 * executor.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Left-deep hash equi-join over [`Table`]s.
//!
//! Every join step builds a hash index over the incoming table, keyed by the
//! tuple of its local key columns, then probes it once per accumulated row.
//! Matches are emitted in bucket order, which is the incoming table's row
//! order, so the output is ordered by base row first and by source order of
//! each joined table after that.

use super::parser::CompiledQuery;
use crate::error::{Result, TemplieError};
use crate::table::Table;
use std::collections::{BTreeMap, HashMap};

/// One output row of a join: a row index per participating table, in
/// [`CompiledQuery::names`] order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinedRow {
    rows: Vec<usize>,
}

impl JoinedRow {
    /// Row index into the table at `table` position.
    pub fn row_index(&self, table: usize) -> Option<usize> {
        self.rows.get(table).copied()
    }

    pub fn indices(&self) -> &[usize] {
        &self.rows
    }

    fn extended(&self, row: usize) -> Self {
        let mut rows = Vec::with_capacity(self.rows.len() + 1);
        rows.extend_from_slice(&self.rows);
        rows.push(row);
        Self { rows }
    }
}

/// The tables a join ran over, together with the rows it produced.
#[derive(Debug, Clone)]
pub struct JoinResult<'t> {
    tables: Vec<&'t Table>,
    rows: Vec<JoinedRow>,
}

impl<'t> JoinResult<'t> {
    pub fn tables(&self) -> &[&'t Table] {
        &self.tables
    }

    pub fn rows(&self) -> &[JoinedRow] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<JoinedRow> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of the table called `name`.
    pub fn table_position(&self, name: &str) -> Option<usize> {
        self.tables.iter().position(|t| t.name() == name)
    }

    /// Read `column` of the `table` row that `row` was built from.
    pub fn value(&self, row: &JoinedRow, table: &str, column: &str) -> Option<&'t str> {
        let position = self.table_position(table)?;
        self.tables[position].value(row.row_index(position)?, column)
    }
}

/// A join step with key columns resolved to indices.
struct BoundJoin<'t> {
    table: &'t Table,
    local: Vec<usize>,
    /// `(table position, column index)` per key part.
    foreign: Vec<(usize, usize)>,
}

fn column_index(table: &Table, column: &str) -> Result<usize> {
    table
        .column_index(column)
        .ok_or_else(|| TemplieError::UnknownColumn {
            table: table.name().to_string(),
            column: column.to_string(),
        })
}

/// Check that a table is supplied for every name and that every key column
/// exists, before any index is built.
fn bind<'t>(query: &CompiledQuery, tables: &[&'t Table]) -> Result<Vec<BoundJoin<'t>>> {
    for (position, name) in query.names().into_iter().enumerate() {
        match tables.get(position) {
            Some(table) if table.name() == name => {}
            _ => {
                return Err(TemplieError::MissingTable {
                    table: name.to_string(),
                });
            }
        }
    }

    query
        .joins()
        .iter()
        .enumerate()
        .map(|(step, join)| -> Result<BoundJoin<'t>> {
            let table = tables[step + 1];
            let mut local = Vec::with_capacity(join.keys.len());
            let mut foreign = Vec::with_capacity(join.keys.len());
            for key in &join.keys {
                // Only tables joined before this step can supply key values.
                if key.foreign_table > step {
                    return Err(TemplieError::internal(format!(
                        "key of join `{}` refers to table position {}, which is not joined yet",
                        join.table, key.foreign_table
                    )));
                }
                let foreign_table = tables[key.foreign_table];
                foreign.push((
                    key.foreign_table,
                    column_index(foreign_table, &key.foreign_column)?,
                ));
                local.push(column_index(table, &key.local_column)?);
            }
            Ok(BoundJoin {
                table,
                local,
                foreign,
            })
        })
        .collect()
}

/// Run `query` over `tables`, supplied in [`CompiledQuery::names`] order.
pub fn execute<'t>(query: &CompiledQuery, tables: &[&'t Table]) -> Result<JoinResult<'t>> {
    let steps = bind(query, tables)?;
    let tables: Vec<&'t Table> = tables[..query.names().len()].to_vec();

    let mut rows: Vec<JoinedRow> = (0..tables[0].len())
        .map(|row| JoinedRow { rows: vec![row] })
        .collect();

    for step in &steps {
        let mut index: HashMap<Vec<&str>, Vec<usize>> = HashMap::new();
        for (row, values) in step.table.rows().iter().enumerate() {
            let key = step.local.iter().map(|&c| values[c].as_str()).collect();
            index.entry(key).or_default().push(row);
        }

        let mut joined = Vec::new();
        for row in &rows {
            let probe: Vec<&str> = step
                .foreign
                .iter()
                .map(|&(table, column)| tables[table].rows()[row.rows[table]][column].as_str())
                .collect();
            if let Some(bucket) = index.get(&probe) {
                joined.extend(bucket.iter().map(|&matched| row.extended(matched)));
            }
        }

        tracing::debug!(
            table = step.table.name(),
            keys = index.len(),
            rows_in = rows.len(),
            rows_out = joined.len(),
            "join step"
        );
        rows = joined;
    }

    Ok(JoinResult { tables, rows })
}

/// Run `query` over tables looked up by name.
pub fn execute_named<'t>(
    query: &CompiledQuery,
    tables: &'t BTreeMap<String, Table>,
) -> Result<JoinResult<'t>> {
    let ordered = query
        .names()
        .into_iter()
        .map(|name| {
            tables.get(name).ok_or_else(|| TemplieError::MissingTable {
                table: name.to_string(),
            })
        })
        .collect::<Result<Vec<_>>>()?;
    execute(query, &ordered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn table(name: &str, columns: &[&str], rows: &[&[&str]]) -> Table {
        Table::new(
            name,
            columns.iter().map(|c| c.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|v| v.to_string()).collect())
                .collect(),
        )
        .unwrap()
    }

    fn compile(query: &str) -> CompiledQuery {
        CompiledQuery::compile(query).unwrap()
    }

    /// `(table.column)` values of every output row.
    fn project(result: &JoinResult<'_>, columns: &[(&str, &str)]) -> Vec<Vec<String>> {
        result
            .rows()
            .iter()
            .map(|row| {
                columns
                    .iter()
                    .map(|(t, c)| result.value(row, t, c).unwrap().to_string())
                    .collect()
            })
            .collect()
    }

    fn orders() -> Table {
        table("orders", &["id", "cust"], &[&["1", "1"], &["2", "2"]])
    }

    #[test]
    fn test_base_only_query() {
        let orders = orders();
        let result = execute(&compile("orders"), &[&orders]).unwrap();
        assert_eq!(
            result.rows().iter().map(|r| r.indices().to_vec()).collect::<Vec<_>>(),
            vec![vec![0], vec![1]]
        );
    }

    #[test]
    fn test_one_to_one() {
        let orders = orders();
        let customers = table("customers", &["cid", "name"], &[&["1", "Ann"], &["2", "Bo"]]);
        let query = compile("orders join customers on orders.cust = customers.cid");
        let result = execute(&query, &[&orders, &customers]).unwrap();
        assert_eq!(
            project(&result, &[("orders", "id"), ("customers", "name")]),
            vec![vec!["1", "Ann"], vec!["2", "Bo"]]
        );
    }

    #[test]
    fn test_fan_out_keeps_source_order() {
        let orders = orders();
        let customers = table(
            "customers",
            &["cid", "name"],
            &[&["1", "Ann"], &["2", "Bo"], &["1", "Cy"]],
        );
        let query = compile("orders join customers on orders.cust = customers.cid");
        let result = execute(&query, &[&orders, &customers]).unwrap();
        assert_eq!(
            project(&result, &[("orders", "id"), ("customers", "name")]),
            vec![vec!["1", "Ann"], vec!["1", "Cy"], vec!["2", "Bo"]]
        );
    }

    #[test]
    fn test_no_match_yields_no_rows() {
        let orders = orders();
        let customers = table("customers", &["cid", "name"], &[&["9", "Zed"]]);
        let query = compile("orders join customers on orders.cust = customers.cid");
        let result = execute(&query, &[&orders, &customers]).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_empty_tables() {
        let empty_orders = table("orders", &["id", "cust"], &[]);
        let customers = table("customers", &["cid"], &[&["1"]]);
        let query = compile("orders join customers on orders.cust = customers.cid");
        assert!(execute(&query, &[&empty_orders, &customers]).unwrap().is_empty());

        let orders = orders();
        let empty_customers = table("customers", &["cid"], &[]);
        assert!(execute(&query, &[&orders, &empty_customers]).unwrap().is_empty());
    }

    #[test]
    fn test_third_join_keys_off_base_table() {
        let a = table("a", &["x"], &[&["1"], &["2"]]);
        let b = table("b", &["y", "x"], &[&["1", "other"], &["2", "other"]]);
        let c = table("c", &["z", "label"], &[&["2", "two"], &["1", "one"]]);
        let query = compile("a join b on a.x = b.y join c on a.x = c.z");
        let result = execute(&query, &[&a, &b, &c]).unwrap();
        assert_eq!(
            project(&result, &[("a", "x"), ("c", "label")]),
            vec![vec!["1", "one"], vec!["2", "two"]]
        );
    }

    #[test]
    fn test_composite_key_parts_from_different_tables() {
        let a = table("a", &["id", "region"], &[&["1", "eu"], &["2", "us"]]);
        let b = table("b", &["aid", "year"], &[&["1", "2024"], &["2", "2025"]]);
        let c = table(
            "c",
            &["region", "year", "rate"],
            &[
                &["eu", "2024", "0.2"],
                &["us", "2024", "0.1"],
                &["us", "2025", "0.3"],
            ],
        );
        let query =
            compile("a join b on a.id = b.aid join c on a.region, b.year = c.region, c.year");
        let result = execute(&query, &[&a, &b, &c]).unwrap();
        assert_eq!(
            project(&result, &[("a", "id"), ("c", "rate")]),
            vec![vec!["1", "0.2"], vec!["2", "0.3"]]
        );
    }

    #[test]
    fn test_composite_key_is_a_tuple() {
        // ("1", "12") and ("11", "2") must not collide.
        let a = table("a", &["p", "q"], &[&["1", "12"], &["11", "2"]]);
        let b = table(
            "b",
            &["p", "q", "v"],
            &[&["11", "2", "hit"], &["1", "12", "also"]],
        );
        let query = compile("a join b on a.p, a.q = b.p, b.q");
        let result = execute(&query, &[&a, &b]).unwrap();
        assert_eq!(
            project(&result, &[("a", "p"), ("b", "v")]),
            vec![vec!["1", "also"], vec!["11", "hit"]]
        );
    }

    #[test]
    fn test_permuting_equal_rows_keeps_row_set() {
        let a = table("a", &["k"], &[&["1"]]);
        let forward = table("b", &["k", "v"], &[&["1", "x"], &["2", "y"], &["1", "z"]]);
        let backward = table("b", &["k", "v"], &[&["1", "z"], &["2", "y"], &["1", "x"]]);
        let query = compile("a join b on a.k = b.k");

        let first = project(&execute(&query, &[&a, &forward]).unwrap(), &[("b", "v")]);
        let second = project(&execute(&query, &[&a, &backward]).unwrap(), &[("b", "v")]);
        assert_eq!(first, vec![vec!["x"], vec!["z"]]);
        assert_eq!(second, vec![vec!["z"], vec!["x"]]);
    }

    #[test]
    fn test_missing_table() {
        let orders = orders();
        let query = compile("orders join customers on orders.cust = customers.cid");
        let err = execute(&query, &[&orders]).unwrap_err();
        assert!(matches!(err, TemplieError::MissingTable { ref table } if table == "customers"));

        let wrong = table("clients", &["cid"], &[]);
        let err = execute(&query, &[&orders, &wrong]).unwrap_err();
        assert!(matches!(err, TemplieError::MissingTable { ref table } if table == "customers"));
    }

    #[test]
    fn test_unknown_column() {
        let orders = orders();
        let customers = table("customers", &["cid"], &[]);

        let query = compile("orders join customers on orders.customer = customers.cid");
        let err = execute(&query, &[&orders, &customers]).unwrap_err();
        assert!(matches!(
            err,
            TemplieError::UnknownColumn { ref table, ref column }
                if table == "orders" && column == "customer"
        ));

        let query = compile("orders join customers on orders.cust = customers.id");
        let err = execute(&query, &[&orders, &customers]).unwrap_err();
        assert!(matches!(
            err,
            TemplieError::UnknownColumn { ref table, ref column }
                if table == "customers" && column == "id"
        ));
    }

    #[test]
    fn test_execute_named() {
        let mut tables = BTreeMap::new();
        tables.insert(
            "customers".to_string(),
            table("customers", &["cid", "name"], &[&["2", "Bo"]]),
        );
        tables.insert("orders".to_string(), orders());
        let query = compile("orders join customers on orders.cust = customers.cid");
        let result = execute_named(&query, &tables).unwrap();
        assert_eq!(
            project(&result, &[("orders", "id"), ("customers", "name")]),
            vec![vec!["2", "Bo"]]
        );

        tables.remove("customers");
        assert!(matches!(
            execute_named(&query, &tables),
            Err(TemplieError::MissingTable { .. })
        ));
    }

    #[test]
    fn test_plan_keyed_on_later_table_is_rejected() {
        let a = table("a", &["x"], &[&["1"]]);
        let b = table("b", &["y"], &[&["1"]]);
        let c = table("c", &["z"], &[&["1"]]);
        let query: CompiledQuery = serde_json::from_str(
            r#"{
                "base": "a",
                "joins": [
                    {"table": "b", "keys": [
                        {"foreign_table": 2, "foreign_column": "z", "local_column": "y"}
                    ]},
                    {"table": "c", "keys": [
                        {"foreign_table": 0, "foreign_column": "x", "local_column": "z"}
                    ]}
                ]
            }"#,
        )
        .unwrap();
        let err = execute(&query, &[&a, &b, &c]).unwrap_err();
        assert!(matches!(err, TemplieError::Internal { .. }));
        assert_eq!(err.code(), "T-0-1");
    }
}
