//! Placeholder and statement scanning.
//!
//! A lightweight state machine skips quoted strings, quoted identifiers, comments and
//! dollar-quoted bodies. It classifies characters only; it never parses SQL grammar.

use std::borrow::Cow;

mod scanner;

use scanner::{Token, scan};

/// Placeholder syntax a driver expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderStyle {
    /// `?` and `?N`, as understood by `SQLite`.
    Qmark,
    /// `$N`, as understood by `PostgreSQL`.
    Dollar,
}

/// Rewrite placeholders into `target` style.
///
/// Returns a borrowed `Cow` when no changes are needed.
#[must_use]
pub fn translate_placeholders(sql: &str, target: PlaceholderStyle) -> Cow<'_, str> {
    let mut out: Option<String> = None;
    let mut copied_to = 0;
    let mut highest = 0;

    scan(sql, |token| {
        let Token::Placeholder { start, end, number } = token else {
            return;
        };
        let n = number.unwrap_or(highest + 1);
        highest = highest.max(n);
        let replacement = match target {
            PlaceholderStyle::Qmark if sql.as_bytes()[start] == b'?' => return,
            PlaceholderStyle::Dollar if sql.as_bytes()[start] == b'$' => return,
            PlaceholderStyle::Qmark => format!("?{n}"),
            PlaceholderStyle::Dollar => format!("${n}"),
        };
        let buf = out.get_or_insert_with(|| String::with_capacity(sql.len() + 8));
        buf.push_str(&sql[copied_to..start]);
        buf.push_str(&replacement);
        copied_to = end;
    });

    match out {
        Some(mut buf) => {
            buf.push_str(&sql[copied_to..]);
            Cow::Owned(buf)
        }
        None => Cow::Borrowed(sql),
    }
}

/// Split a script into statements on `;` outside quotes and comments.
///
/// Statements are trimmed and returned without their terminating `;`; pieces that hold only
/// whitespace or comments are dropped.
#[must_use]
pub fn split_statements(sql: &str) -> Vec<&str> {
    let mut statements = Vec::new();
    let mut start = 0;
    let mut has_content = false;

    scan(sql, |token| match token {
        Token::Separator(idx) => {
            if has_content {
                statements.push(sql[start..idx].trim());
            }
            start = idx + 1;
            has_content = false;
        }
        Token::Placeholder { .. } | Token::Content(_) => has_content = true,
    });
    if has_content {
        statements.push(sql[start..].trim());
    }
    statements
}
