/*
 * text.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Low-level line cleanup shared by the section scanner and the parsers.

/// Remove a `#` comment from a line.
///
/// A `#` inside a double-quoted value does not start a comment. Inside
/// quotes a backslash escapes the following character, so `"a\"#b"` is one
/// value.
pub fn strip_comment(line: &str) -> &str {
    let mut in_quotes = false;
    let mut escaped = false;
    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_quotes => escaped = true,
            '"' => in_quotes = !in_quotes,
            '#' if !in_quotes => return &line[..i],
            _ => {}
        }
    }
    line
}

/// Strip comments, trim, and drop lines left empty.
pub fn clean_lines<'a, I>(lines: I) -> Vec<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    lines
        .into_iter()
        .map(|line| strip_comment(line).trim())
        .filter(|line| !line.is_empty())
        .collect()
}

/// Remove backslash escapes: `\x` becomes `x`.
///
/// A trailing lone backslash is kept.
pub fn unescape(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some(next) => result.push(next),
                None => result.push('\\'),
            }
        } else {
            result.push(c);
        }
    }
    result
}
