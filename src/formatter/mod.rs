//! Layout of a rewritten statement.
//!
//! Dispatch is on a sniffed [`Shape`]; nothing is parsed. Each strategy
//! takes the rewritten text and only moves whitespace, except that line
//! comments inside a table definition or a `GROUP_CONCAT` argument list
//! become block comments so that joining lines cannot comment out code.

pub mod plain;

use log::trace;
use regex::Regex;
use std::sync::LazyLock;

use crate::utils::scanner::{self, SegmentKind};

static DEFINITION_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)^\s*(CREATE\s+(?:TEMP(?:ORARY)?\s+)?TABLE\s+(?:IF\s+NOT\s+EXISTS\s+)?[^\s(]+)\s*\(")
        .unwrap_or_else(|e| panic!("definition regex: {}", e))
});

static DOT_SPACING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\.\s*").unwrap_or_else(|e| panic!("dot regex: {}", e)));

static LEADING_DISTINCT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^distinct\b").unwrap_or_else(|e| panic!("distinct regex: {}", e))
});

/// Statement layout class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// `CREATE TABLE name (...)`
    Definition,
    /// Contains a `GROUP_CONCAT(` call.
    AggregateQuery,
    PlainQuery,
}

impl Shape {
    pub fn detect(sql: &str) -> Self {
        if DEFINITION_HEADER.is_match(sql) {
            Shape::Definition
        } else if !scanner::find_calls(sql, &["GROUP_CONCAT"]).is_empty() {
            Shape::AggregateQuery
        } else {
            Shape::PlainQuery
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatOptions {
    pub indent_width: usize,
}

impl FormatOptions {
    pub fn new(indent_width: usize) -> Self {
        Self { indent_width }
    }

    pub(crate) fn indent(&self) -> String {
        " ".repeat(self.indent_width)
    }
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self { indent_width: 4 }
    }
}

/// Leading comments are kept on their own lines above the statement.
pub fn format_statement(sql: &str, options: &FormatOptions) -> String {
    let (comments, body) = scanner::split_leading_comments(sql);
    if comments.trim().is_empty() {
        return format_body(body, options);
    }
    if body.is_empty() {
        return comments.trim().to_string();
    }
    format!("{}\n{}", comments.trim(), format_body(body, options))
}

fn format_body(sql: &str, options: &FormatOptions) -> String {
    let shape = Shape::detect(sql);
    trace!("Formatting statement as {:?}", shape);

    match shape {
        Shape::Definition => format_definition(sql, options).unwrap_or_else(|| sql.to_string()),
        Shape::AggregateQuery => normalize_aggregates(sql),
        Shape::PlainQuery => plain::format_plain(sql, options),
    }
}

/// One line per column or constraint. `None` when the body never closes.
fn format_definition(sql: &str, options: &FormatOptions) -> Option<String> {
    let caps = DEFINITION_HEADER.captures(sql)?;
    let header = scanner::collapse_whitespace(caps.get(1)?.as_str(), false);
    let open = caps.get(0)?.end() - 1;
    let close = scanner::matching_paren(sql, open)?;

    let body = block_comments(&sql[open + 1..close]);
    let indent = options.indent();
    let items: Vec<String> = scanner::split_top_level(&body, b',')
        .into_iter()
        .filter(|item| !item.is_empty())
        .map(|item| format!("{}{}", indent, scanner::collapse_whitespace(item, false).trim()))
        .collect();

    let rest = sql[close + 1..].trim().trim_end_matches(';').trim_end();
    let mut out = format!("{} (\n{}\n)", header, items.join(",\n"));
    if !rest.is_empty() {
        out.push(' ');
        out.push_str(rest);
    }
    out.push(';');

    Some(out)
}

/// Turn `-- note` and `# note` into `/* note */`.
fn block_comments(sql: &str) -> String {
    scanner::segments(sql)
        .into_iter()
        .map(|segment| {
            let text = segment.text;
            if segment.kind != SegmentKind::Comment || text.starts_with("/*") {
                return text.to_string();
            }
            let note = text.trim_start_matches('#').trim_start_matches("--").trim();
            format!("/* {} */", note.replace("*/", "* /"))
        })
        .collect()
}

/// Tidy the argument list of every `GROUP_CONCAT` call and leave the rest
/// of the statement as it is.
fn normalize_aggregates(sql: &str) -> String {
    let calls = scanner::find_calls(sql, &["GROUP_CONCAT"]);

    let mut out = String::with_capacity(sql.len());
    let mut last = 0;
    for call in calls {
        out.push_str(&sql[last..call.start]);
        out.push_str(sql[call.start..call.open].trim_end());
        out.push('(');
        out.push_str(&normalize_aggregate_args(call.inner(sql)));
        out.push(')');
        last = call.end;
    }
    out.push_str(&sql[last..]);

    out
}

fn normalize_aggregate_args(args: &str) -> String {
    // A line comment must not swallow what follows once newlines collapse
    let collapsed = scanner::collapse_whitespace(&block_comments(args), false);
    let dotted = scanner::map_code(&collapsed, |code| DOT_SPACING.replace_all(code, ".").into_owned());
    let trimmed = dotted.trim();

    LEADING_DISTINCT.replace(trimmed, "DISTINCT").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_detect_shape() {
        assert_eq!(Shape::detect("CREATE TABLE t (a INTEGER)"), Shape::Definition);
        assert_eq!(
            Shape::detect("create temporary table if not exists t(a INTEGER)"),
            Shape::Definition
        );
        assert_eq!(
            Shape::detect("SELECT GROUP_CONCAT(a) FROM t"),
            Shape::AggregateQuery
        );
        assert_eq!(Shape::detect("SELECT 'GROUP_CONCAT(a)'"), Shape::PlainQuery);
        assert_eq!(Shape::detect("CREATE TABLE t AS SELECT 1"), Shape::PlainQuery);
    }

    #[test]
    fn test_definition_layout() {
        let sql = "CREATE TABLE  users (id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT NOT NULL, price REAL DEFAULT 0, UNIQUE (name, price))";
        assert_eq!(
            format_statement(sql, &FormatOptions::default()),
            "CREATE TABLE users (\n    id INTEGER PRIMARY KEY AUTOINCREMENT,\n    name TEXT NOT NULL,\n    price REAL DEFAULT 0,\n    UNIQUE (name, price)\n);"
        );
    }

    #[test]
    fn test_definition_keeps_trailing_text() {
        let sql = "CREATE TABLE t (a INTEGER) WITHOUT ROWID;";
        assert_eq!(
            format_statement(sql, &FormatOptions::new(2)),
            "CREATE TABLE t (\n  a INTEGER\n) WITHOUT ROWID;"
        );
    }

    #[test]
    fn test_definition_line_comments() {
        let sql = "CREATE TABLE t (\n  a INTEGER, -- first\n  b TEXT\n)";
        assert_eq!(
            format_statement(sql, &FormatOptions::default()),
            "CREATE TABLE t (\n    a INTEGER,\n    /* first */ b TEXT\n);"
        );
    }

    #[test]
    fn test_leading_comments_kept_above() {
        let sql = "-- users\nCREATE TABLE t (a INTEGER)";
        assert_eq!(
            format_statement(sql, &FormatOptions::default()),
            "-- users\nCREATE TABLE t (\n    a INTEGER\n);"
        );
    }

    #[test]
    fn test_unbalanced_definition_unchanged() {
        let sql = "CREATE TABLE t (a INTEGER, b TEXT";
        assert_eq!(format_statement(sql, &FormatOptions::default()), sql);
    }

    #[test]
    fn test_aggregate_normalization() {
        let sql = "SELECT u.id,\n  GROUP_CONCAT( distinct  r . name , '; ')\nFROM users u";
        assert_eq!(
            format_statement(sql, &FormatOptions::default()),
            "SELECT u.id,\n  GROUP_CONCAT(DISTINCT r.name , '; ')\nFROM users u"
        );
    }

    #[test]
    fn test_aggregate_line_comment_closed() {
        let sql = "SELECT GROUP_CONCAT(a -- note\n ORDER BY a) FROM t";
        assert_eq!(
            format_statement(sql, &FormatOptions::default()),
            "SELECT GROUP_CONCAT(a /* note */ ORDER BY a) FROM t"
        );
    }
}
