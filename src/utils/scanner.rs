//! Byte-level scanning of SQL text.
//!
//! Nothing here tokenizes. The scanner only knows enough to step over
//! quoted text and comments, so that rewrites never land inside a string
//! literal, and to track parenthesis depth for argument capture.

/// Classification of a run of statement text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    Code,
    /// `'...'`, `"..."` or `` `...` `` including the quotes.
    Literal,
    Comment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment<'a> {
    pub kind: SegmentKind,
    pub text: &'a str,
}

/// A function call found by [`find_calls`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSpan {
    /// Upper-cased function name.
    pub name: String,
    pub start: usize,
    /// Index of the opening parenthesis.
    pub open: usize,
    /// Index one past the matching closing parenthesis.
    pub end: usize,
}

impl CallSpan {
    pub fn inner<'a>(&self, sql: &'a str) -> &'a str {
        &sql[self.open + 1..self.end - 1]
    }
}

fn quoted_end(bytes: &[u8], start: usize) -> usize {
    let quote = bytes[start];
    let mut i = start + 1;
    while i < bytes.len() {
        let b = bytes[i];
        if b == b'\\' && quote != b'`' {
            i += 2;
            continue;
        }
        if b == quote {
            if bytes.get(i + 1) == Some(&quote) {
                i += 2;
                continue;
            }
            return i + 1;
        }
        i += 1;
    }
    bytes.len()
}

fn line_end(bytes: &[u8], start: usize) -> usize {
    bytes[start..]
        .iter()
        .position(|&b| b == b'\n')
        .map_or(bytes.len(), |p| start + p)
}

fn comment_end(bytes: &[u8], start: usize) -> Option<usize> {
    match bytes[start] {
        b'#' => Some(line_end(bytes, start)),
        b'-' if bytes.get(start + 1) == Some(&b'-')
            && bytes
                .get(start + 2)
                .map_or(true, |b| b.is_ascii_whitespace()) =>
        {
            Some(line_end(bytes, start))
        }
        b'/' if bytes.get(start + 1) == Some(&b'*') => {
            let body = start + 2;
            Some(
                bytes[body..]
                    .windows(2)
                    .position(|w| w == b"*/")
                    .map_or(bytes.len(), |p| body + p + 2),
            )
        }
        _ => None,
    }
}

/// End of the literal or comment starting at `i`, if one starts there.
fn skip_at(bytes: &[u8], i: usize) -> Option<(SegmentKind, usize)> {
    match bytes[i] {
        b'\'' | b'"' | b'`' => Some((SegmentKind::Literal, quoted_end(bytes, i))),
        _ => comment_end(bytes, i).map(|end| (SegmentKind::Comment, end)),
    }
}

pub fn segments(sql: &str) -> Vec<Segment<'_>> {
    let bytes = sql.as_bytes();
    let mut out = Vec::new();
    let mut code_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        match skip_at(bytes, i) {
            Some((kind, end)) => {
                if code_start < i {
                    out.push(Segment {
                        kind: SegmentKind::Code,
                        text: &sql[code_start..i],
                    });
                }
                out.push(Segment {
                    kind,
                    text: &sql[i..end],
                });
                i = end;
                code_start = end;
            }
            None => i += 1,
        }
    }

    if code_start < bytes.len() {
        out.push(Segment {
            kind: SegmentKind::Code,
            text: &sql[code_start..],
        });
    }

    out
}

/// Rebuild `sql`, passing every code segment through `f` and copying
/// literals and comments unchanged.
pub fn map_code<F>(sql: &str, mut f: F) -> String
where
    F: FnMut(&str) -> String,
{
    let mut result = String::with_capacity(sql.len());
    for segment in segments(sql) {
        match segment.kind {
            SegmentKind::Code => result.push_str(&f(segment.text)),
            _ => result.push_str(segment.text),
        }
    }
    result
}

/// Split off the comments and whitespace that precede the first code.
pub fn split_leading_comments(sql: &str) -> (&str, &str) {
    let mut offset = 0;
    for segment in segments(sql) {
        match segment.kind {
            SegmentKind::Comment => offset += segment.text.len(),
            SegmentKind::Code => {
                let trimmed = segment.text.trim_start();
                offset += segment.text.len() - trimmed.len();
                if !trimmed.is_empty() {
                    break;
                }
            }
            SegmentKind::Literal => break,
        }
    }
    sql.split_at(offset)
}

/// Index of the parenthesis closing the one at `open`.
pub fn matching_paren(sql: &str, open: usize) -> Option<usize> {
    let bytes = sql.as_bytes();
    let mut depth = 0usize;
    let mut i = open;

    while i < bytes.len() {
        if let Some((_, end)) = skip_at(bytes, i) {
            i = end;
            continue;
        }
        match bytes[i] {
            b'(' => depth += 1,
            b')' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
        i += 1;
    }

    None
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}

/// Find calls to any of `names` (matched case-insensitively), outermost
/// first. Calls nested inside a match are not reported separately.
/// A name whose parenthesis never closes is skipped.
pub fn find_calls(sql: &str, names: &[&str]) -> Vec<CallSpan> {
    let bytes = sql.as_bytes();
    let mut calls = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        if let Some((_, end)) = skip_at(bytes, i) {
            i = end;
            continue;
        }

        let b = bytes[i];
        let boundary = i == 0 || !(is_ident_byte(bytes[i - 1]) || bytes[i - 1] == b'.');
        if !(b.is_ascii_alphabetic() || b == b'_') || !boundary {
            i += 1;
            continue;
        }

        let start = i;
        while i < bytes.len() && is_ident_byte(bytes[i]) {
            i += 1;
        }
        let name = sql[start..i].to_ascii_uppercase();
        if !names.iter().any(|n| n.eq_ignore_ascii_case(&name)) {
            continue;
        }

        let mut open = i;
        while open < bytes.len() && (bytes[open] == b' ' || bytes[open] == b'\t') {
            open += 1;
        }
        if bytes.get(open) != Some(&b'(') {
            continue;
        }

        if let Some(close) = matching_paren(sql, open) {
            calls.push(CallSpan {
                name,
                start,
                open,
                end: close + 1,
            });
            i = close + 1;
        }
    }

    calls
}

/// Split on `separator` where it appears at parenthesis depth zero and
/// outside literals and comments. Pieces are trimmed; blank input gives
/// no pieces.
pub fn split_top_level(sql: &str, separator: u8) -> Vec<&str> {
    if sql.trim().is_empty() {
        return Vec::new();
    }

    let bytes = sql.as_bytes();
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut piece_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        if let Some((_, end)) = skip_at(bytes, i) {
            i = end;
            continue;
        }
        match bytes[i] {
            b'(' => depth += 1,
            b')' => depth = depth.saturating_sub(1),
            b if b == separator && depth == 0 => {
                parts.push(sql[piece_start..i].trim());
                piece_start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }
    parts.push(sql[piece_start..].trim());

    parts
}

/// Collapse whitespace outside literals. With `keep_newlines` only runs of
/// spaces and tabs shrink to one space; otherwise every run, newlines
/// included, does.
pub fn collapse_whitespace(sql: &str, keep_newlines: bool) -> String {
    map_code(sql, |code| {
        let mut out = String::with_capacity(code.len());
        let mut pending_space = false;
        for c in code.chars() {
            let collapsible = if keep_newlines {
                c == ' ' || c == '\t'
            } else {
                c.is_whitespace()
            };
            if collapsible {
                pending_space = true;
                continue;
            }
            if pending_space {
                out.push(' ');
                pending_space = false;
            }
            out.push(c);
        }
        if pending_space {
            out.push(' ');
        }
        out
    })
}
