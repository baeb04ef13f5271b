use regex::{Captures, Regex};
use std::sync::LazyLock;

use crate::error::Diagnostic;
use crate::utils::scanner::{self, SegmentKind};

/// Prefix of every inline marker.
pub const NOT_SUPPORTED: &str = "NOT SUPPORTED";

/// Calls the rule table declines: date arithmetic with a unit that has no
/// date modifier, and formats with a specifier `strftime` lacks.
const UNTRANSLATED_CALLS: &[&str] = &["DATE_ADD", "DATE_SUB", "ADDDATE", "SUBDATE", "DATE_FORMAT"];

/// After these, `comment = '...'` is a predicate or assignment on a column.
const EXPRESSION_KEYWORDS: &[&str] = &[
    "WHERE", "AND", "OR", "NOT", "SET", "ON", "SELECT", "WHEN", "THEN", "ELSE", "BY", "HAVING",
    "CHECK", "RETURNING", "VALUES",
];

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("Invalid regex pattern '{}': {}", pattern, e))
}

static WITH_ROLLUP: LazyLock<Regex> = LazyLock::new(|| compile(r"(?i)\bWITH\s+ROLLUP\b"));

static ON_UPDATE_TIMESTAMP: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"(?i)\bON\s+UPDATE\s+CURRENT_TIMESTAMP\b(?:\s*\(\s*\d*\s*\))?")
});

static TABLE_OPTIONS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)[ \t]*\bENGINE\s*=\s*\w+",
        r"(?i)[ \t]*\b(?:DEFAULT\s+)?(?:CHARSET|CHARACTER\s+SET)\s*=?\s*\w+",
        r"(?i)[ \t]*\b(?:DEFAULT\s+)?COLLATE\s*=?\s*\w+",
        r"(?i)[ \t]*\bAUTO_INCREMENT\s*=\s*\d+",
        r"(?i)[ \t]*\bROW_FORMAT\s*=\s*\w+",
    ]
    .into_iter()
    .map(compile)
    .collect()
});

static TABLE_STATEMENT: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?i)^(?:CREATE\s+(?:TEMP(?:ORARY)?\s+)?|ALTER\s+)TABLE\b"));

// Matched at the end of a code segment; the text itself is the next segment.
static COMMENT_KEYWORD: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?i)[ \t]*\bCOMMENT\s*=?\s*$"));

static BLANK_LINES: LazyLock<Regex> = LazyLock::new(|| compile(r"\n[ \t]*\n(?:[ \t]*\n)+"));

/// Render an inline marker. The note never closes the comment early.
pub fn marker(note: &str) -> String {
    format!("/* {}: {} */", NOT_SUPPORTED, note.replace("*/", "* /"))
}

/// Runs after the rule table: marks what cannot be translated, then strips
/// table options and normalizes whitespace.
pub struct PostProcessor;

impl PostProcessor {
    pub fn new() -> Self {
        Self
    }

    pub fn process(&self, sql: &str) -> (String, Vec<Diagnostic>) {
        let (marked, diagnostics) = self.mark_unsupported(sql);
        (self.cleanup(&marked), diagnostics)
    }

    /// Replace constructs with no target equivalent by a marker comment.
    pub fn mark_unsupported(&self, sql: &str) -> (String, Vec<Diagnostic>) {
        let mut diagnostics = Vec::new();

        let result = scanner::map_code(sql, |code| {
            let code = WITH_ROLLUP.replace_all(code, |caps: &Captures| {
                diagnostics.push(Diagnostic::medium(
                    &caps[0],
                    "ROLLUP modifier has no equivalent; super-aggregate rows are not produced",
                ));
                marker("ROLLUP modifier")
            });
            ON_UPDATE_TIMESTAMP
                .replace_all(&code, |caps: &Captures| {
                    diagnostics.push(Diagnostic::medium(
                        &caps[0],
                        "automatic timestamp refresh needs a trigger",
                    ));
                    marker("ON UPDATE timestamp refresh")
                })
                .into_owned()
        });

        let calls = scanner::find_calls(&result, UNTRANSLATED_CALLS);
        if calls.is_empty() {
            return (result, diagnostics);
        }

        let mut out = String::with_capacity(result.len());
        let mut last = 0;
        for call in calls {
            let fragment = &result[call.start..call.end];
            let note = match call.name.as_str() {
                "DATE_FORMAT" => "format specifier has no strftime equivalent",
                _ => "only DAY intervals map to date modifiers",
            };
            diagnostics.push(Diagnostic::medium(fragment, note));
            out.push_str(&result[last..call.start]);
            out.push_str(&marker(fragment));
            last = call.end;
        }
        out.push_str(&result[last..]);

        (out, diagnostics)
    }

    /// Remove table options and normalize whitespace.
    pub fn cleanup(&self, sql: &str) -> String {
        let result = scanner::map_code(sql, |code| {
            TABLE_OPTIONS
                .iter()
                .fold(code.to_string(), |acc, regex| regex.replace_all(&acc, "").into_owned())
        });
        let result = strip_comment_options(&result);
        let result = scanner::collapse_whitespace(&result, true);
        let result = scanner::map_code(&result, |code| BLANK_LINES.replace_all(code, "\n\n").into_owned());

        result.trim().to_string()
    }
}

/// Drop `COMMENT 'text'` column options and the `COMMENT='text'` table
/// option. Only table statements are touched, and only where `COMMENT`
/// directly precedes a string literal in option position.
fn strip_comment_options(sql: &str) -> String {
    let (_, body) = scanner::split_leading_comments(sql);
    if !TABLE_STATEMENT.is_match(body) {
        return sql.to_string();
    }

    let segments = scanner::segments(sql);
    let mut out = String::with_capacity(sql.len());
    let mut drop_literal = false;

    for (i, segment) in segments.iter().enumerate() {
        match segment.kind {
            SegmentKind::Code => {
                let before_string = segments
                    .get(i + 1)
                    .is_some_and(|next| next.kind == SegmentKind::Literal && next.text.starts_with('\''));
                let option = COMMENT_KEYWORD
                    .find(segment.text)
                    .filter(|m| before_string && is_option_position(&segment.text[..m.start()]));
                match option {
                    Some(m) => {
                        out.push_str(&segment.text[..m.start()]);
                        drop_literal = true;
                    }
                    None => out.push_str(segment.text),
                }
            }
            SegmentKind::Literal if drop_literal => drop_literal = false,
            _ => out.push_str(segment.text),
        }
    }

    out
}

/// False after `(`, `,`, an operator or an expression keyword.
fn is_option_position(before: &str) -> bool {
    let before = before.trim_end();
    if before.ends_with(['(', ',', '.', '=', '<', '>', '!', '+', '-', '*', '/', '|']) {
        return false;
    }
    let word = before
        .rsplit(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .next()
        .unwrap_or_default();
    !EXPRESSION_KEYWORDS.iter().any(|k| k.eq_ignore_ascii_case(word))
}

impl Default for PostProcessor {
    fn default() -> Self {
        Self::new()
    }
}
