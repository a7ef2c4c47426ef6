/*
 * token.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Tokenizer for join expressions.

use crate::error::QuerySyntaxError;
use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Identifier,
    /// The `join` keyword.
    Join,
    /// The `on` keyword.
    On,
    Dot,
    Comma,
    Equals,
    Eof,
}

impl TokenKind {
    /// How the token kind is named in error messages.
    pub fn describe(self) -> &'static str {
        match self {
            TokenKind::Identifier => "a name",
            TokenKind::Join => "`join`",
            TokenKind::On => "`on`",
            TokenKind::Dot => "`.`",
            TokenKind::Comma => "`,`",
            TokenKind::Equals => "`=`",
            TokenKind::Eof => "end of query",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    /// Byte range in the query text.
    pub span: Range<usize>,
}

fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Split a query into tokens. The last token is always [`TokenKind::Eof`].
pub fn tokenize(query: &str) -> Result<Vec<Token>, QuerySyntaxError> {
    let mut tokens = Vec::new();
    let mut chars = query.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        let kind = match c {
            c if c.is_whitespace() => continue,
            '.' => TokenKind::Dot,
            ',' => TokenKind::Comma,
            '=' => TokenKind::Equals,
            c if is_identifier_start(c) => {
                let mut end = start + c.len_utf8();
                while let Some(&(i, next)) = chars.peek() {
                    if !is_identifier_char(next) {
                        break;
                    }
                    end = i + next.len_utf8();
                    chars.next();
                }
                let kind = match &query[start..end] {
                    "join" => TokenKind::Join,
                    "on" => TokenKind::On,
                    _ => TokenKind::Identifier,
                };
                tokens.push(Token {
                    kind,
                    text: query[start..end].to_string(),
                    span: start..end,
                });
                continue;
            }
            other => {
                return Err(QuerySyntaxError::new(
                    query,
                    start..start + other.len_utf8(),
                    format!("unexpected character `{}`", other),
                ));
            }
        };
        tokens.push(Token {
            kind,
            text: c.to_string(),
            span: start..start + 1,
        });
    }

    tokens.push(Token {
        kind: TokenKind::Eof,
        text: String::new(),
        span: query.len()..query.len(),
    });
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(query: &str) -> Vec<TokenKind> {
        tokenize(query).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_tokenize_join() {
        use TokenKind::*;
        assert_eq!(
            kinds("a join b on a.x=b.y"),
            vec![
                Identifier, Join, Identifier, On, Identifier, Dot, Identifier, Equals, Identifier,
                Dot, Identifier, Eof
            ]
        );
    }

    #[test]
    fn test_spans_are_byte_offsets() {
        let tokens = tokenize("  orders  join customers").unwrap();
        assert_eq!(tokens[0].span, 2..8);
        assert_eq!(tokens[1].span, 10..14);
        assert_eq!(tokens[2].text, "customers");
        assert_eq!(tokens[3].span, 24..24);
    }

    #[test]
    fn test_keywords_are_case_sensitive() {
        assert_eq!(
            kinds("JOIN On"),
            vec![TokenKind::Identifier, TokenKind::Identifier, TokenKind::Eof]
        );
        assert_eq!(kinds("joined"), vec![TokenKind::Identifier, TokenKind::Eof]);
    }

    #[test]
    fn test_unexpected_character() {
        let err = tokenize("a join b on a.x == b.y;").unwrap_err();
        assert_eq!(err.span, 22..23);
        assert_eq!(err.fragment(), ";");
    }

    #[test]
    fn test_identifier_cannot_start_with_digit() {
        let err = tokenize("1abc").unwrap_err();
        assert_eq!(err.fragment(), "1");
    }
}
