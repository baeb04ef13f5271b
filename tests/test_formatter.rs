mod common;

use myt::{format_statement, FormatOptions, Shape, Translator};
use pretty_assertions::assert_eq;

#[test]
fn test_definition_has_one_line_per_item() {
    for n in 1..=6 {
        let columns: Vec<String> = (1..=n).map(|i| format!("c{} INTEGER", i)).collect();
        let sql = format!("CREATE TABLE t ({})", columns.join(", "));
        let formatted = format_statement(&sql, &FormatOptions::default());

        let lines: Vec<&str> = formatted.lines().collect();
        assert_eq!(lines.first(), Some(&"CREATE TABLE t ("));
        assert_eq!(lines.last(), Some(&");"));

        let body = &lines[1..lines.len() - 1];
        assert_eq!(body.len(), n);
        for (i, line) in body.iter().enumerate() {
            assert!(line.starts_with("    c"));
            assert_eq!(line.ends_with(','), i + 1 < n, "line {:?}", line);
        }
    }
}

#[test]
fn test_definition_nested_parentheses_stay_in_one_item() {
    let sql = "CREATE TABLE IF NOT EXISTS prices (amount REAL CHECK (amount > 0 AND amount < 100), label TEXT DEFAULT 'a, b')";
    assert_eq!(
        format_statement(sql, &FormatOptions::default()),
        "CREATE TABLE IF NOT EXISTS prices (\n    amount REAL CHECK (amount > 0 AND amount < 100),\n    label TEXT DEFAULT 'a, b'\n);"
    );
}

#[test]
fn test_definition_drops_trailing_comma() {
    assert_eq!(
        format_statement("CREATE TABLE t (a INTEGER, )", &FormatOptions::default()),
        "CREATE TABLE t (\n    a INTEGER\n);"
    );
}

#[test]
fn test_plain_state_machine() {
    let sql = "SELECT\nu.id,\nCASE WHEN u.active THEN 'y' ELSE 'n' END AS active\nFROM users u\nLEFT JOIN orders o ON o.user_id = u.id\nGROUP BY u.id\nHAVING COUNT(*) > 1\nORDER BY u.id\nLIMIT 10";
    assert_eq!(
        format_statement(sql, &FormatOptions::new(2)),
        "SELECT\n  u.id,\n  CASE WHEN u.active THEN 'y' ELSE 'n' END AS active\nFROM users u\nLEFT JOIN orders o ON o.user_id = u.id\nGROUP BY u.id\nHAVING COUNT(*) > 1\nORDER BY u.id\nLIMIT 10"
    );
}

#[test]
fn test_subquery_select_reenters_select_body() {
    let sql = "SELECT a\nFROM t\nWHERE a IN (\nSELECT b\nFROM u)";
    assert_eq!(
        format_statement(sql, &FormatOptions::default()),
        "SELECT a\nFROM t\nWHERE a IN (\nSELECT b\nFROM u)"
    );
}

#[test]
fn test_shape_detection_is_keyword_sniffing() {
    assert_eq!(Shape::detect("  CREATE TABLE t (a INTEGER)"), Shape::Definition);
    assert_eq!(Shape::detect("CREATE INDEX i ON t (a)"), Shape::PlainQuery);
    assert_eq!(
        Shape::detect("SELECT group_concat (a) FROM t"),
        Shape::AggregateQuery
    );
}

#[test]
fn test_indent_width_from_config() {
    let translator = Translator::builder().with_indent_width(2).build().unwrap();
    assert_eq!(
        translator.translate("CREATE TABLE t (a INT, b VARCHAR(10))").sql,
        "CREATE TABLE t (\n  a INTEGER,\n  b TEXT\n);"
    );
}
