use regex::Regex;
use std::sync::LazyLock;

use super::FormatOptions;
use crate::utils::scanner::{self, SegmentKind};

static NEEDS_LAYOUT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bCASE\b|\bGROUP\s+BY\b").unwrap_or_else(|e| panic!("layout regex: {}", e))
});

static SELECT_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^SELECT\b").unwrap_or_else(|e| panic!("select regex: {}", e)));

static CLAUSE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:FROM|WHERE|GROUP\s+BY|HAVING|ORDER\s+BY|LIMIT)\b")
        .unwrap_or_else(|e| panic!("clause regex: {}", e))
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IndentState {
    Base,
    SelectBody,
}

/// Compact a simple one-liner, otherwise re-indent line by line.
pub fn format_plain(sql: &str, options: &FormatOptions) -> String {
    let sql = sql.trim();
    if !sql.contains('\n') && !NEEDS_LAYOUT.is_match(sql) {
        return scanner::collapse_whitespace(sql, false);
    }
    reindent(sql, options)
}

/// Lines that start in code. A newline inside a literal or block comment
/// does not start a line, so that text is carried through untouched.
fn code_lines(sql: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for segment in scanner::segments(sql) {
        if segment.kind != SegmentKind::Code {
            current.push_str(segment.text);
            continue;
        }
        let mut parts = segment.text.split('\n');
        if let Some(first) = parts.next() {
            current.push_str(first);
        }
        for part in parts {
            lines.push(std::mem::take(&mut current));
            current.push_str(part);
        }
    }
    lines.push(current);

    lines
}

fn reindent(sql: &str, options: &FormatOptions) -> String {
    let indent = options.indent();
    let mut state = IndentState::Base;
    let mut lines = Vec::new();

    for line in code_lines(sql) {
        let line = line.trim();
        if line.is_empty() {
            lines.push(String::new());
            continue;
        }

        if SELECT_LINE.is_match(line) {
            state = IndentState::SelectBody;
            lines.push(line.to_string());
        } else if CLAUSE_LINE.is_match(line) {
            state = IndentState::Base;
            lines.push(line.to_string());
        } else {
            match state {
                IndentState::SelectBody => lines.push(format!("{}{}", indent, line)),
                IndentState::Base => lines.push(line.to_string()),
            }
        }
    }

    lines.join("\n")
}
