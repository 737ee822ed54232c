#[derive(Clone)]
enum State {
    Normal,
    SingleQuoted,
    DoubleQuoted,
    LineComment,
    BlockComment(u32),
    DollarQuoted(String),
}

/// What the scanner found at a position outside quotes and comments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Token {
    /// A `?`, `?N` or `$N` marker spanning `start..end`.
    Placeholder {
        start: usize,
        end: usize,
        number: Option<usize>,
    },
    /// A `;` ending a statement.
    Separator(usize),
    /// Any other non-whitespace byte that is not inside a comment.
    Content(usize),
}

fn starts_with_at(bytes: &[u8], idx: usize, pat: &[u8]) -> bool {
    bytes.get(idx..idx + pat.len()) == Some(pat)
}

fn scan_digits(bytes: &[u8], start: usize) -> Option<(usize, usize)> {
    let mut idx = start;
    while idx < bytes.len() && bytes[idx].is_ascii_digit() {
        idx += 1;
    }
    if idx == start {
        return None;
    }
    std::str::from_utf8(&bytes[start..idx])
        .ok()
        .and_then(|digits| digits.parse().ok())
        .map(|n| (idx, n))
}

/// `$tag$` opener at `start`; returns the tag and the index of the closing `$`.
fn dollar_quote_tag(bytes: &[u8], start: usize) -> Option<(String, usize)> {
    let mut idx = start + 1;
    while idx < bytes.len() && bytes[idx] != b'$' {
        let b = bytes[idx];
        if !(b.is_ascii_alphanumeric() || b == b'_') || (idx == start + 1 && b.is_ascii_digit()) {
            return None;
        }
        idx += 1;
    }
    if idx < bytes.len() {
        let tag = String::from_utf8(bytes[start + 1..idx].to_vec()).ok()?;
        Some((tag, idx))
    } else {
        None
    }
}

/// Walk `sql`, skipping quoted text and comments, reporting placeholders, statement
/// separators and content bytes to `visit` in order.
pub(super) fn scan(sql: &str, mut visit: impl FnMut(Token)) {
    let bytes = sql.as_bytes();
    let mut state = State::Normal;
    let mut idx = 0;

    while idx < bytes.len() {
        let b = bytes[idx];
        match state {
            State::Normal => match b {
                b'\'' => {
                    visit(Token::Content(idx));
                    state = State::SingleQuoted;
                }
                b'"' => {
                    visit(Token::Content(idx));
                    state = State::DoubleQuoted;
                }
                b';' => visit(Token::Separator(idx)),
                _ if starts_with_at(bytes, idx, b"--") => state = State::LineComment,
                _ if starts_with_at(bytes, idx, b"/*") => {
                    state = State::BlockComment(1);
                    idx += 1;
                }
                b'?' => {
                    let (end, number) = match scan_digits(bytes, idx + 1) {
                        Some((end, n)) => (end, Some(n)),
                        None => (idx + 1, None),
                    };
                    visit(Token::Placeholder {
                        start: idx,
                        end,
                        number,
                    });
                    idx = end - 1;
                }
                b'$' => {
                    visit(Token::Content(idx));
                    if let Some((end, n)) = scan_digits(bytes, idx + 1) {
                        visit(Token::Placeholder {
                            start: idx,
                            end,
                            number: Some(n),
                        });
                        idx = end - 1;
                    } else if let Some((tag, close)) = dollar_quote_tag(bytes, idx) {
                        state = State::DollarQuoted(tag);
                        idx = close;
                    }
                }
                _ if b.is_ascii_whitespace() => {}
                _ => visit(Token::Content(idx)),
            },
            State::SingleQuoted => {
                if b == b'\'' {
                    if bytes.get(idx + 1) == Some(&b'\'') {
                        idx += 1; // escaped quote
                    } else {
                        state = State::Normal;
                    }
                }
            }
            State::DoubleQuoted => {
                if b == b'"' {
                    if bytes.get(idx + 1) == Some(&b'"') {
                        idx += 1;
                    } else {
                        state = State::Normal;
                    }
                }
            }
            State::LineComment => {
                if b == b'\n' {
                    state = State::Normal;
                }
            }
            State::BlockComment(depth) => {
                if starts_with_at(bytes, idx, b"/*") {
                    state = State::BlockComment(depth + 1);
                    idx += 1;
                } else if starts_with_at(bytes, idx, b"*/") {
                    state = if depth == 1 {
                        State::Normal
                    } else {
                        State::BlockComment(depth - 1)
                    };
                    idx += 1;
                }
            }
            State::DollarQuoted(ref tag) => {
                if b == b'$'
                    && starts_with_at(bytes, idx + 1, tag.as_bytes())
                    && bytes.get(idx + 1 + tag.len()) == Some(&b'$')
                {
                    idx += tag.len() + 1;
                    state = State::Normal;
                }
            }
        }
        idx += 1;
    }
}
