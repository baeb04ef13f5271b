use regex::{Captures, Regex};
use std::sync::LazyLock;

use super::{CallSite, Rule, RuleGroup, RuleTable, Scope};
use crate::utils::scanner::{self, SegmentKind};

static SEPARATOR_CLAUSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)^(.*?)\s+SEPARATOR\s+('(?:[^'\\]|\\.|'')*')$")
        .unwrap_or_else(|e| panic!("separator regex: {}", e))
});

static ORDER_BY_CLAUSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)^(.*?)\s+(ORDER\s+BY\s+.*)$").unwrap_or_else(|e| panic!("order by regex: {}", e))
});

static DISTINCT_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^DISTINCT\s+").unwrap_or_else(|e| panic!("distinct regex: {}", e))
});

static IDENTIFIER_CHAIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^(?:[A-Za-z_][\w$]*|`[^`]*`|"[^"]*")(?:\.(?:[A-Za-z_][\w$]*|`[^`]*`|"[^"]*"))*$"#)
        .unwrap_or_else(|e| panic!("identifier regex: {}", e))
});

static NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d+(?:\.\d*)?(?:[eE][+-]?\d+)?$").unwrap_or_else(|e| panic!("number regex: {}", e))
});

static CALL_HEAD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][\w$]*\s*\(").unwrap_or_else(|e| panic!("call regex: {}", e))
});

static INTERVAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)^INTERVAL\s+(.+?)\s+([A-Z_]+)$").unwrap_or_else(|e| panic!("interval regex: {}", e))
});

/// The default rule sequence.
pub fn standard_rules() -> RuleTable {
    let mut table = RuleTable::new();

    // String functions
    table.add_rule(Rule::call_with(
        "concat",
        RuleGroup::String,
        &["CONCAT"],
        concat,
        "CONCAT(a, b, ...) becomes a || b || ...",
    ));
    table.add_rule(Rule::call_with(
        "concat_ws",
        RuleGroup::String,
        &["CONCAT_WS"],
        concat_ws,
        "CONCAT_WS(sep, a, b) becomes a || sep || b",
    ));
    table.add_rule(Rule::call_with(
        "group_concat",
        RuleGroup::String,
        &["GROUP_CONCAT"],
        group_concat,
        "SEPARATOR clause becomes the second argument",
    ));
    table.add_rule(Rule::call_with(
        "substring",
        RuleGroup::String,
        &["SUBSTRING", "MID"],
        |site| (site.args.len() >= 2).then(|| rename(site, "SUBSTR")),
        "SUBSTRING(s, p[, n]) becomes SUBSTR",
    ));
    table.add_rule(Rule::call(
        "locate",
        RuleGroup::String,
        &["LOCATE"],
        "INSTR($2, $1)",
        "LOCATE(sub, s) becomes INSTR(s, sub)",
    ));
    table.add_rule(Rule::call_with(
        "lcase",
        RuleGroup::String,
        &["LCASE"],
        |site| Some(rename(site, "LOWER")),
        "LCASE becomes LOWER",
    ));
    table.add_rule(Rule::call_with(
        "ucase",
        RuleGroup::String,
        &["UCASE"],
        |site| Some(rename(site, "UPPER")),
        "UCASE becomes UPPER",
    ));
    table.add_rule(Rule::call_with(
        "char_length",
        RuleGroup::String,
        &["CHAR_LENGTH", "CHARACTER_LENGTH"],
        |site| Some(rename(site, "LENGTH")),
        "CHAR_LENGTH becomes LENGTH",
    ));

    // Date and time functions
    table.add_rule(Rule::call_with(
        "date_add",
        RuleGroup::DateTime,
        &["DATE_ADD", "ADDDATE"],
        shift_days,
        "DATE_ADD(d, INTERVAL n DAY) becomes date(d, '+n days')",
    ));
    table.add_rule(Rule::call_with(
        "date_sub",
        RuleGroup::DateTime,
        &["DATE_SUB", "SUBDATE"],
        shift_days,
        "DATE_SUB(d, INTERVAL n DAY) becomes date(d, '-n days')",
    ));
    table.add_rule(Rule::call(
        "datediff",
        RuleGroup::DateTime,
        &["DATEDIFF"],
        "CAST(julianday($1) - julianday($2) AS INTEGER)",
        "DATEDIFF(a, b) becomes a julianday difference",
    ));
    table.add_rule(Rule::call_with(
        "date_part",
        RuleGroup::DateTime,
        &["YEAR", "MONTH", "DAY", "DAYOFMONTH", "HOUR", "MINUTE", "SECOND"],
        date_part,
        "YEAR(x) and friends become CAST(strftime(...) AS INTEGER)",
    ));
    table.add_rule(Rule::call_with(
        "current_time",
        RuleGroup::DateTime,
        &[
            "NOW",
            "SYSDATE",
            "CURRENT_TIMESTAMP",
            "LOCALTIME",
            "LOCALTIMESTAMP",
            "CURDATE",
            "CURRENT_DATE",
            "CURTIME",
            "CURRENT_TIME",
        ],
        current_time,
        "NOW() becomes datetime('now')",
    ));
    table.add_rule(Rule::call_with(
        "unix_timestamp",
        RuleGroup::DateTime,
        &["UNIX_TIMESTAMP"],
        |site| match site.args {
            [] => Some("CAST(strftime('%s', 'now') AS INTEGER)".to_string()),
            [value] => Some(format!("CAST(strftime('%s', {}) AS INTEGER)", value)),
            _ => None,
        },
        "UNIX_TIMESTAMP([x]) becomes strftime('%s', ...)",
    ));
    table.add_rule(Rule::call(
        "from_unixtime",
        RuleGroup::DateTime,
        &["FROM_UNIXTIME"],
        "datetime($1, 'unixepoch')",
        "FROM_UNIXTIME(x) becomes datetime(x, 'unixepoch')",
    ));
    table.add_rule(Rule::call_with(
        "date_format",
        RuleGroup::DateTime,
        &["DATE_FORMAT"],
        date_format,
        "DATE_FORMAT(d, fmt) becomes strftime(fmt, d)",
    ));

    // Numeric functions
    table.add_rule(Rule::call(
        "ceil",
        RuleGroup::Numeric,
        &["CEIL", "CEILING"],
        "(CAST($1 AS INTEGER) + ($1 > CAST($1 AS INTEGER)))",
        "CEIL(x) rounds toward positive infinity",
    ));
    table.add_rule(Rule::call(
        "floor",
        RuleGroup::Numeric,
        &["FLOOR"],
        "(CAST($1 AS INTEGER) - ($1 < CAST($1 AS INTEGER)))",
        "FLOOR(x) rounds toward negative infinity",
    ));
    table.add_rule(Rule::call_with(
        "mod",
        RuleGroup::Numeric,
        &["MOD"],
        |site| match site.args {
            [a, b] => Some(format!("({} % {})", operand(a), operand(b))),
            _ => None,
        },
        "MOD(a, b) becomes (a % b)",
    ));
    table.add_rule(Rule::call(
        "rand",
        RuleGroup::Numeric,
        &["RAND"],
        "(RANDOM() / 18446744073709551616.0 + 0.5)",
        "RAND() becomes a scaled RANDOM()",
    ));

    // Conditional functions
    table.add_rule(Rule::call(
        "ifnull",
        RuleGroup::Conditional,
        &["IFNULL"],
        "COALESCE($1, $2)",
        "IFNULL(a, b) becomes COALESCE(a, b)",
    ));
    table.add_rule(Rule::call(
        "if",
        RuleGroup::Conditional,
        &["IF"],
        "CASE WHEN $1 THEN $2 ELSE $3 END",
        "IF(c, a, b) becomes a CASE expression",
    ));
    table.add_rule(Rule::call_with(
        "nullif",
        RuleGroup::Conditional,
        &["NULLIF"],
        |site| match site.args {
            [a, b] => Some(format!(
                "CASE WHEN {} = {} THEN NULL ELSE {} END",
                operand(a),
                operand(b),
                a
            )),
            _ => None,
        },
        "NULLIF(a, b) becomes a CASE expression",
    ));

    // Column types
    table.add_rule(Rule::pattern(
        "cast_signed",
        RuleGroup::Types,
        r"(?i)\bAS\s+(?:UN)?SIGNED(?:\s+INT(?:EGER)?)?\b",
        "AS INTEGER",
        "CAST(x AS SIGNED) becomes CAST(x AS INTEGER)",
    ));
    table.add_rule(Rule::pattern(
        "integer_types",
        RuleGroup::Types,
        r"(?i)\b(?:TINYINT|SMALLINT|MEDIUMINT|BIGINT|INTEGER|INT)\b(?:\s*\(\s*\d+\s*\))?(?:\s+UNSIGNED)?(?:\s+ZEROFILL)?",
        "INTEGER",
        "integer declarations become INTEGER",
    ));
    table.add_rule(Rule::pattern(
        "boolean_types",
        RuleGroup::Types,
        r"(?i)\bBOOL(?:EAN)?\b",
        "INTEGER",
        "BOOL and BOOLEAN become INTEGER",
    ));
    table.add_rule(Rule::pattern(
        "text_types",
        RuleGroup::Types,
        r"(?i)\b(?:NVARCHAR|VARCHAR|NCHAR|CHAR|TINYTEXT|MEDIUMTEXT|LONGTEXT|TEXT)\b(?:\s*\(\s*\d+\s*\))?",
        "TEXT",
        "character declarations become TEXT",
    ));
    table.add_rule(Rule::pattern(
        "enum_types",
        RuleGroup::Types,
        r"(?i)\bENUM\s*\([^)]*\)",
        "TEXT",
        "ENUM(...) becomes TEXT",
    ).in_scope(Scope::Text));
    table.add_rule(Rule::pattern(
        "decimal_types",
        RuleGroup::Types,
        r"(?i)\b(?:DECIMAL|NUMERIC|FLOAT|DOUBLE(?:\s+PRECISION)?|REAL)\b(?:\s*\(\s*\d+\s*(?:,\s*\d+\s*)?\))?(?:\s+UNSIGNED)?(?:\s+ZEROFILL)?",
        "REAL",
        "decimal declarations become REAL",
    ));
    table.add_rule(Rule::pattern(
        "timestamp_types",
        RuleGroup::Types,
        r"(?i)\bTIMESTAMP\b(?:\s*\(\s*\d+\s*\))?|\bDATETIME\s*\(\s*\d+\s*\)",
        "DATETIME",
        "TIMESTAMP and DATETIME(p) become DATETIME",
    ));
    table.add_rule(Rule::pattern(
        "binary_types",
        RuleGroup::Types,
        r"(?i)\b(?:VARBINARY|BINARY|TINYBLOB|MEDIUMBLOB|LONGBLOB|BLOB)\b(?:\s*\(\s*\d+\s*\))?",
        "BLOB",
        "binary declarations become BLOB",
    ));

    // Joins
    table.add_rule(Rule::pattern(
        "outer_join",
        RuleGroup::Joins,
        r"(?i)\b(?:LEFT|RIGHT|FULL)(?:\s+OUTER)?\s+JOIN\b",
        "LEFT JOIN",
        "every outer join collapses to LEFT JOIN",
    ));
    table.add_rule(Rule::pattern_with(
        "inner_join",
        RuleGroup::Joins,
        r"(?i)\b(?:(LEFT|INNER|CROSS|NATURAL)\s+)?JOIN\b",
        inner_join,
        "bare JOIN becomes INNER JOIN",
    ));

    // Keys
    table.add_rule(Rule::pattern(
        "auto_increment_primary_key",
        RuleGroup::Keys,
        r"(?i)\bAUTO_INCREMENT\s+PRIMARY\s+KEY\b|\bPRIMARY\s+KEY\s+AUTO_INCREMENT\b",
        "PRIMARY KEY AUTOINCREMENT",
        "AUTO_INCREMENT PRIMARY KEY becomes PRIMARY KEY AUTOINCREMENT",
    ));
    table.add_rule(Rule::pattern_with(
        "auto_increment",
        RuleGroup::Keys,
        r"(?i)[ \t]*\bAUTO_INCREMENT\b(\s*=\s*\d+)?",
        |caps| match caps.get(1) {
            // Table option, removed during cleanup
            Some(_) => caps[0].to_string(),
            None => String::new(),
        },
        "a bare column-level AUTO_INCREMENT is dropped",
    ));
    table.add_rule(Rule::pattern(
        "unique_key",
        RuleGroup::Keys,
        r#"(?i)\bUNIQUE\s+(?:KEY|INDEX)(?:\s+(?:`[^`]+`|"[^"]+"|\w+))?\s*\("#,
        "UNIQUE (",
        "UNIQUE KEY name (cols) becomes UNIQUE (cols)",
    ).in_scope(Scope::Text));

    table
}

fn rename(site: &CallSite<'_>, to: &str) -> String {
    format!("{}({})", to, site.args.join(", "))
}

/// Wrap an argument in parentheses unless it is a single operand already.
/// Pasted next to `||` or `%`, a bare `a + b` would bind differently.
fn operand(arg: &str) -> String {
    let arg = arg.trim();
    if is_atom(arg) {
        arg.to_string()
    } else {
        format!("({})", arg)
    }
}

fn is_atom(arg: &str) -> bool {
    if IDENTIFIER_CHAIN.is_match(arg) || NUMBER.is_match(arg) {
        return true;
    }
    if let [segment] = scanner::segments(arg).as_slice() {
        if segment.kind == SegmentKind::Literal {
            return true;
        }
    }
    let open = if arg.starts_with('(') {
        Some(0)
    } else {
        CALL_HEAD.find(arg).map(|m| m.end() - 1)
    };
    open.and_then(|open| scanner::matching_paren(arg, open))
        .is_some_and(|close| close + 1 == arg.len())
}

fn concatenation(values: &[&str]) -> String {
    values.iter().map(|value| operand(value)).collect::<Vec<_>>().join(" || ")
}

fn concat(site: &CallSite<'_>) -> Option<String> {
    if site.args.is_empty() {
        return None;
    }
    Some(concatenation(site.args))
}

fn concat_ws(site: &CallSite<'_>) -> Option<String> {
    let (separator, values) = site.args.split_first()?;
    if values.is_empty() {
        return None;
    }
    let values: Vec<String> = values.iter().map(|value| operand(value)).collect();
    Some(values.join(&format!(" || {} || ", operand(separator))))
}

fn group_concat(site: &CallSite<'_>) -> Option<String> {
    let (last, leading) = site.args.split_last()?;

    let (last, separator) = match SEPARATOR_CLAUSE.captures(last) {
        Some(caps) => (caps.get(1)?.as_str().trim(), Some(caps.get(2)?.as_str())),
        // GROUP_CONCAT(x, sep) is already the target form
        None if site.args.len() > 2 => (*last, None),
        None => return None,
    };
    let (last, order_by) = match ORDER_BY_CLAUSE.captures(last) {
        Some(order) => (order.get(1)?.as_str(), format!(" {}", order.get(2)?.as_str())),
        None => (last, String::new()),
    };

    let mut values: Vec<&str> = leading.to_vec();
    values.push(last);
    let mut distinct = "";
    if let Some(first) = values.first_mut() {
        let value: &str = *first;
        if let Some(m) = DISTINCT_PREFIX.find(value) {
            distinct = &value[..m.end()];
            *first = &value[m.end()..];
        }
    }

    let expr = match values.as_slice() {
        [single] => single.to_string(),
        _ => concatenation(&values),
    };
    let separator = separator
        .filter(|separator| *separator != "','")
        .map(|separator| format!(", {}", separator))
        .unwrap_or_default();

    Some(format!("GROUP_CONCAT({}{}{}{})", distinct, expr, separator, order_by))
}

fn shift_days(site: &CallSite<'_>) -> Option<String> {
    let [date, amount] = site.args else {
        return None;
    };
    let subtract = matches!(site.name, "DATE_SUB" | "SUBDATE");
    let bare_count_allowed = matches!(site.name, "ADDDATE" | "SUBDATE");

    let count = match INTERVAL.captures(amount) {
        Some(caps) => {
            if !caps.get(2)?.as_str().eq_ignore_ascii_case("DAY") {
                return None;
            }
            caps.get(1)?.as_str().trim()
        }
        None if bare_count_allowed => *amount,
        None => return None,
    };
    let count = unquote(count);

    Some(match count.parse::<i64>() {
        Ok(days) => {
            let days = if subtract { -days } else { days };
            format!("date({}, '{:+} days')", date, days)
        }
        Err(_) if subtract => format!("date({}, (-({})) || ' days')", date, count),
        Err(_) => format!("date({}, ({}) || ' days')", date, count),
    })
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('\'')
        .and_then(|v| v.strip_suffix('\''))
        .unwrap_or(value)
}

fn date_part(site: &CallSite<'_>) -> Option<String> {
    let [value] = site.args else {
        return None;
    };
    // YEAR(4) is a column type, not a call
    if value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let specifier = match site.name {
        "YEAR" => "%Y",
        "MONTH" => "%m",
        "DAY" | "DAYOFMONTH" => "%d",
        "HOUR" => "%H",
        "MINUTE" => "%M",
        "SECOND" => "%S",
        _ => return None,
    };
    Some(format!("CAST(strftime('{}', {}) AS INTEGER)", specifier, value))
}

fn current_time(site: &CallSite<'_>) -> Option<String> {
    // An argument is a fractional-seconds precision
    if site.args.len() > 1 {
        return None;
    }
    let function = match site.name {
        "CURDATE" | "CURRENT_DATE" => "date",
        "CURTIME" | "CURRENT_TIME" => "time",
        _ => "datetime",
    };
    Some(format!("{}('now')", function))
}

fn date_format(site: &CallSite<'_>) -> Option<String> {
    let [date, format] = site.args else {
        return None;
    };
    // A computed format is passed through as written
    let format = if format.starts_with('\'') {
        translate_format(format)?
    } else {
        format.to_string()
    };
    Some(format!("strftime({}, {})", format, date))
}

/// `None` when a specifier has no `strftime` counterpart, such as month
/// and weekday names (`%M`, `%W`, `%b`, `%a`) or day ordinals (`%D`).
fn translate_format(format: &str) -> Option<String> {
    let mut out = String::with_capacity(format.len());
    let mut chars = format.chars();
    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        let Some(specifier) = chars.next() else {
            out.push('%');
            break;
        };
        let mapped = match specifier {
            'Y' | 'm' | 'd' | 'H' | 'j' | 'w' | 'p' | '%' => {
                out.push('%');
                out.push(specifier);
                continue;
            }
            'i' => "%M",
            's' | 'S' => "%S",
            'e' => "%d",
            'c' => "%m",
            'k' => "%H",
            'h' | 'I' => "%I",
            'T' => "%H:%M:%S",
            'r' => "%I:%M:%S %p",
            _ => return None,
        };
        out.push_str(mapped);
    }
    Some(out)
}

fn inner_join(caps: &Captures<'_>) -> String {
    match caps.get(1).map(|m| m.as_str().to_ascii_uppercase()) {
        Some(kind) if kind != "INNER" => caps[0].to_string(),
        _ => "INNER JOIN".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(name: &str, sql: &str) -> String {
        let table = RuleTable::standard();
        let rule = table.get(name).unwrap();
        rule.apply(sql).0
    }

    #[test]
    fn test_rule_names_are_unique() {
        let table = RuleTable::standard();
        let mut names: Vec<_> = table.names().collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), table.len());
    }

    #[test]
    fn test_concat_ws() {
        assert_eq!(
            apply("concat_ws", "CONCAT_WS('-', a, b, c)"),
            "a || '-' || b || '-' || c"
        );
    }

    #[test]
    fn test_group_concat_separator() {
        assert_eq!(
            apply("group_concat", "GROUP_CONCAT(name SEPARATOR '; ')"),
            "GROUP_CONCAT(name, '; ')"
        );
        assert_eq!(
            apply("group_concat", "GROUP_CONCAT(DISTINCT name ORDER BY name SEPARATOR ',')"),
            "GROUP_CONCAT(DISTINCT name ORDER BY name)"
        );
        assert_eq!(
            apply("group_concat", "GROUP_CONCAT(name ORDER BY id DESC SEPARATOR '|')"),
            "GROUP_CONCAT(name, '|' ORDER BY id DESC)"
        );
    }

    #[test]
    fn test_group_concat_leaves_separator_form_alone() {
        assert_eq!(apply("group_concat", "GROUP_CONCAT(a, '|')"), "GROUP_CONCAT(a, '|')");
        assert_eq!(
            apply("group_concat", "GROUP_CONCAT(a, '-', b)"),
            "GROUP_CONCAT(a || '-' || b)"
        );
    }

    #[test]
    fn test_locate_swaps_arguments() {
        assert_eq!(apply("locate", "LOCATE('@', email)"), "INSTR(email, '@')");
        assert_eq!(apply("locate", "LOCATE('@', email, 3)"), "LOCATE('@', email, 3)");
    }

    #[test]
    fn test_date_shift() {
        assert_eq!(
            apply("date_add", "DATE_ADD(created, INTERVAL 7 DAY)"),
            "date(created, '+7 days')"
        );
        assert_eq!(
            apply("date_sub", "DATE_SUB(NOW(), INTERVAL '3' day)"),
            "date(NOW(), '-3 days')"
        );
        assert_eq!(apply("date_add", "ADDDATE(d, 2)"), "date(d, '+2 days')");
        assert_eq!(
            apply("date_add", "DATE_ADD(d, INTERVAL n + 1 DAY)"),
            "date(d, (n + 1) || ' days')"
        );
        assert_eq!(
            apply("date_sub", "SUBDATE(d, n)"),
            "date(d, (-(n)) || ' days')"
        );
    }

    #[test]
    fn test_date_shift_declines_other_units() {
        let sql = "DATE_ADD(d, INTERVAL 1 MONTH)";
        assert_eq!(apply("date_add", sql), sql);
        assert_eq!(apply("date_add", "DATE_ADD(d, 2)"), "DATE_ADD(d, 2)");
    }

    #[test]
    fn test_date_part_skips_column_type() {
        assert_eq!(
            apply("date_part", "YEAR(created_at)"),
            "CAST(strftime('%Y', created_at) AS INTEGER)"
        );
        assert_eq!(apply("date_part", "YEAR(4)"), "YEAR(4)");
    }

    #[test]
    fn test_date_format_specifiers() {
        assert_eq!(
            apply("date_format", "DATE_FORMAT(ts, '%Y-%m-%d %k:%i:%s')"),
            "strftime('%Y-%m-%d %H:%M:%S', ts)"
        );
        assert_eq!(apply("date_format", "DATE_FORMAT(ts, '%T')"), "strftime('%H:%M:%S', ts)");
        assert_eq!(
            apply("date_format", "DATE_FORMAT(d, '%h:%i %p')"),
            "strftime('%I:%M %p', d)"
        );
        assert_eq!(apply("date_format", "DATE_FORMAT(d, '%r')"), "strftime('%I:%M:%S %p', d)");
        assert_eq!(apply("date_format", "DATE_FORMAT(d, fmt)"), "strftime(fmt, d)");
    }

    #[test]
    fn test_date_format_declines_named_parts() {
        for sql in [
            "DATE_FORMAT(d, '%M %Y')",
            "DATE_FORMAT(d, '%W')",
            "DATE_FORMAT(d, '%b %D')",
            "DATE_FORMAT(d, '%a')",
            "DATE_FORMAT(d, '%l')",
        ] {
            assert_eq!(apply("date_format", sql), sql);
        }
    }

    #[test]
    fn test_compound_operands_parenthesized() {
        assert_eq!(apply("concat", "CONCAT(price * 2, ' USD')"), "(price * 2) || ' USD'");
        assert_eq!(
            apply("concat", "CONCAT(u.name, LOWER(x), `t`.`c`, 42, (a))"),
            "u.name || LOWER(x) || `t`.`c` || 42 || (a)"
        );
        assert_eq!(apply("concat_ws", "CONCAT_WS(', ', a + 1, b)"), "(a + 1) || ', ' || b");
        assert_eq!(apply("mod", "MOD(a + b, 3)"), "((a + b) % 3)");
        assert_eq!(
            apply("nullif", "NULLIF(a, b OR c)"),
            "CASE WHEN a = (b OR c) THEN NULL ELSE a END"
        );
        assert_eq!(
            apply("group_concat", "GROUP_CONCAT(a + 1, b ORDER BY b SEPARATOR '|')"),
            "GROUP_CONCAT((a + 1) || b, '|' ORDER BY b)"
        );
    }

    #[test]
    fn test_current_time_functions() {
        assert_eq!(apply("current_time", "NOW()"), "datetime('now')");
        assert_eq!(apply("current_time", "curdate()"), "date('now')");
        assert_eq!(apply("current_time", "CURTIME()"), "time('now')");
        assert_eq!(apply("current_time", "NOW(3)"), "datetime('now')");
    }

    #[test]
    fn test_unix_time() {
        assert_eq!(
            apply("unix_timestamp", "UNIX_TIMESTAMP()"),
            "CAST(strftime('%s', 'now') AS INTEGER)"
        );
        assert_eq!(
            apply("from_unixtime", "FROM_UNIXTIME(ts)"),
            "datetime(ts, 'unixepoch')"
        );
    }

    #[test]
    fn test_type_declarations() {
        assert_eq!(apply("integer_types", "id INT(11) UNSIGNED NOT NULL"), "id INTEGER NOT NULL");
        assert_eq!(apply("text_types", "name VARCHAR(255)"), "name TEXT");
        assert_eq!(apply("decimal_types", "price DECIMAL(10, 2)"), "price REAL");
        assert_eq!(apply("decimal_types", "ratio DOUBLE PRECISION"), "ratio REAL");
        assert_eq!(apply("timestamp_types", "created TIMESTAMP(6)"), "created DATETIME");
        assert_eq!(apply("timestamp_types", "datetime('now')"), "datetime('now')");
        assert_eq!(apply("enum_types", "status ENUM('a', 'b')"), "status TEXT");
        assert_eq!(apply("binary_types", "data LONGBLOB"), "data BLOB");
        assert_eq!(apply("cast_signed", "CAST(x AS UNSIGNED)"), "CAST(x AS INTEGER)");
    }

    #[test]
    fn test_joins() {
        assert_eq!(
            apply("outer_join", "a RIGHT OUTER JOIN b FULL JOIN c"),
            "a LEFT JOIN b LEFT JOIN c"
        );
        assert_eq!(
            apply("inner_join", "a JOIN b LEFT JOIN c CROSS JOIN d inner join e"),
            "a INNER JOIN b LEFT JOIN c CROSS JOIN d INNER JOIN e"
        );
    }

    #[test]
    fn test_bare_auto_increment_dropped() {
        assert_eq!(
            apply("auto_increment", "id INTEGER NOT NULL AUTO_INCREMENT,"),
            "id INTEGER NOT NULL,"
        );
        assert_eq!(apply("auto_increment", ") AUTO_INCREMENT=5"), ") AUTO_INCREMENT=5");
    }

    #[test]
    fn test_unique_key() {
        assert_eq!(
            apply("unique_key", "UNIQUE KEY `uk_email` (`email`)"),
            "UNIQUE (`email`)"
        );
        assert_eq!(apply("unique_key", "UNIQUE INDEX (a, b)"), "UNIQUE (a, b)");
    }
}
