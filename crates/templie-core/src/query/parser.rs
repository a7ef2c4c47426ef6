/*
 * parser.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Recursive-descent parser for join expressions.
//!
//! ```text
//! query           := identifier join*
//! join            := "join" identifier "on" column_ref_list "=" column_ref_list
//! column_ref_list := column_ref ("," column_ref)*
//! column_ref      := identifier "." identifier
//! ```
//!
//! Each join clause introduces one table. At every key position exactly one
//! side names that table (the local side); the other side names a table
//! introduced earlier (the foreign side), which is resolved to its position
//! in [`CompiledQuery::names`].

use super::token::{Token, TokenKind, tokenize};
use crate::error::QuerySyntaxError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;

/// One component of a (possibly composite) join key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyPart {
    /// Position of the supplying table in [`CompiledQuery::names`].
    pub foreign_table: usize,
    pub foreign_column: String,
    /// Column of the table introduced by the join.
    pub local_column: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinSpec {
    pub table: String,
    pub keys: Vec<KeyPart>,
}

/// A parsed join expression: a base table and the joins applied to it, in
/// order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompiledQuery {
    base: String,
    joins: Vec<JoinSpec>,
}

impl CompiledQuery {
    pub fn compile(query: &str) -> Result<Self, QuerySyntaxError> {
        let tokens = tokenize(query)?;
        let compiled = QueryParser::new(tokens, query).parse()?;
        tracing::debug!(
            query,
            tables = compiled.names().len(),
            "compiled join expression"
        );
        Ok(compiled)
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn joins(&self) -> &[JoinSpec] {
        &self.joins
    }

    /// Every table of the query in the order its [`Table`](crate::Table)
    /// must be supplied: base first, then each joined table.
    pub fn names(&self) -> Vec<&str> {
        std::iter::once(self.base.as_str())
            .chain(self.joins.iter().map(|join| join.table.as_str()))
            .collect()
    }

    /// Name of the table at `position` in [`names`](Self::names).
    pub fn table_name(&self, position: usize) -> Option<&str> {
        match position {
            0 => Some(&self.base),
            n => self.joins.get(n - 1).map(|join| join.table.as_str()),
        }
    }
}

/// Canonical text of the query: foreign columns on the left of `=`.
impl fmt::Display for CompiledQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.base)?;
        for join in &self.joins {
            let foreign: Vec<String> = join
                .keys
                .iter()
                .map(|key| {
                    format!(
                        "{}.{}",
                        self.table_name(key.foreign_table).unwrap_or("?"),
                        key.foreign_column
                    )
                })
                .collect();
            let local: Vec<String> = join
                .keys
                .iter()
                .map(|key| format!("{}.{}", join.table, key.local_column))
                .collect();
            write!(
                f,
                " join {} on {} = {}",
                join.table,
                foreign.join(", "),
                local.join(", ")
            )?;
        }
        Ok(())
    }
}

#[derive(Debug)]
struct ColumnRef {
    table: String,
    column: String,
    span: Range<usize>,
}

struct QueryParser<'a> {
    tokens: Vec<Token>,
    current: usize,
    query: &'a str,
    /// Tables introduced so far, in order.
    introduced: Vec<String>,
}

impl<'a> QueryParser<'a> {
    fn new(tokens: Vec<Token>, query: &'a str) -> Self {
        Self {
            tokens,
            current: 0,
            query,
            introduced: Vec::new(),
        }
    }

    fn error(&self, span: Range<usize>, message: impl Into<String>) -> QuerySyntaxError {
        QuerySyntaxError::new(self.query, span, message)
    }

    /// Current token; the tokenizer guarantees a trailing `Eof`.
    fn current_token(&self) -> &Token {
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[self.current.min(last)]
    }

    fn advance(&mut self) {
        if self.current + 1 < self.tokens.len() {
            self.current += 1;
        }
    }

    fn unexpected(&self, expected: &str) -> QuerySyntaxError {
        let token = self.current_token();
        let (span, found) = match token.kind {
            // Point at the last real token rather than past the end.
            TokenKind::Eof if self.current > 0 => (
                self.tokens[self.current - 1].span.clone(),
                "end of query".to_string(),
            ),
            TokenKind::Eof => (token.span.clone(), "end of query".to_string()),
            _ => (token.span.clone(), format!("`{}`", token.text)),
        };
        self.error(span, format!("expected {}, found {}", expected, found))
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, QuerySyntaxError> {
        let token = self.current_token().clone();
        if token.kind == kind {
            self.advance();
            Ok(token)
        } else {
            Err(self.unexpected(kind.describe()))
        }
    }

    fn expect_identifier(&mut self, what: &str) -> Result<Token, QuerySyntaxError> {
        if self.current_token().kind == TokenKind::Identifier {
            let token = self.current_token().clone();
            self.advance();
            Ok(token)
        } else {
            Err(self.unexpected(what))
        }
    }

    fn parse(mut self) -> Result<CompiledQuery, QuerySyntaxError> {
        if self.tokens.len() == 1 {
            return Err(self.error(0..self.query.len(), "query is empty"));
        }
        let base = self.expect_identifier("a table name")?;
        self.introduced.push(base.text.clone());

        let mut joins = Vec::new();
        while self.current_token().kind == TokenKind::Join {
            self.advance();
            joins.push(self.parse_join()?);
        }

        if self.current_token().kind != TokenKind::Eof {
            return Err(self.unexpected("`join` or end of query"));
        }

        Ok(CompiledQuery {
            base: base.text,
            joins,
        })
    }

    fn parse_join(&mut self) -> Result<JoinSpec, QuerySyntaxError> {
        let table = self.expect_identifier("a table name after `join`")?;
        if self.introduced.contains(&table.text) {
            return Err(self.error(
                table.span,
                format!("table `{}` is already part of the query", table.text),
            ));
        }
        self.expect(TokenKind::On)?;
        let left = self.parse_column_refs()?;
        self.expect(TokenKind::Equals)?;
        let right = self.parse_column_refs()?;

        if left.len() != right.len() {
            let span = left[0].span.start..right[right.len() - 1].span.end;
            return Err(self.error(
                span,
                format!(
                    "left side lists {} column(s) but right side lists {}",
                    left.len(),
                    right.len()
                ),
            ));
        }

        let keys = left
            .into_iter()
            .zip(right)
            .map(|(l, r)| self.key_part(&table.text, l, r))
            .collect::<Result<Vec<_>, _>>()?;

        self.introduced.push(table.text.clone());
        Ok(JoinSpec {
            table: table.text,
            keys,
        })
    }

    /// Decide which side of one key position is local to `table`.
    fn key_part(
        &self,
        table: &str,
        left: ColumnRef,
        right: ColumnRef,
    ) -> Result<KeyPart, QuerySyntaxError> {
        let pair_span = left.span.start..right.span.end;
        let (foreign, local) = match (left.table == table, right.table == table) {
            (false, true) => (left, right),
            (true, false) => (right, left),
            (true, true) => {
                return Err(self.error(
                    pair_span,
                    format!("both sides name the joined table `{}`", table),
                ));
            }
            (false, false) => {
                return Err(self.error(
                    pair_span,
                    format!("neither side names the joined table `{}`", table),
                ));
            }
        };

        let position = self
            .introduced
            .iter()
            .position(|name| *name == foreign.table)
            .ok_or_else(|| {
                self.error(
                    foreign.span.clone(),
                    format!(
                        "table `{}` is not introduced before `{}`",
                        foreign.table, table
                    ),
                )
            })?;

        Ok(KeyPart {
            foreign_table: position,
            foreign_column: foreign.column,
            local_column: local.column,
        })
    }

    fn parse_column_refs(&mut self) -> Result<Vec<ColumnRef>, QuerySyntaxError> {
        let mut refs = vec![self.parse_column_ref()?];
        while self.current_token().kind == TokenKind::Comma {
            self.advance();
            refs.push(self.parse_column_ref()?);
        }
        Ok(refs)
    }

    fn parse_column_ref(&mut self) -> Result<ColumnRef, QuerySyntaxError> {
        let table = self.expect_identifier("a `table.column` reference")?;
        self.expect(TokenKind::Dot)?;
        let column = self.expect_identifier("a column name after `.`")?;
        Ok(ColumnRef {
            table: table.text,
            column: column.text,
            span: table.span.start..column.span.end,
        })
    }
}
