/// Rule table entries
pub mod mappings;

use regex::{Captures, Regex};
use std::sync::LazyLock;

use crate::utils::scanner;

static STANDARD: LazyLock<RuleTable> = LazyLock::new(mappings::standard_rules);

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$(\d+)").unwrap_or_else(|e| panic!("placeholder regex: {}", e)));

/// Documentation grouping. The engine ignores it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleGroup {
    String,
    DateTime,
    Numeric,
    Conditional,
    Types,
    Joins,
    Keys,
}

/// A function call matched by name, with its arguments already split on
/// top-level commas.
#[derive(Debug)]
pub struct CallSite<'a> {
    /// Upper-cased name as written.
    pub name: &'a str,
    pub args: &'a [&'a str],
}

pub type CallTransform = fn(&CallSite<'_>) -> Option<String>;
pub type CapturesTransform = fn(&Captures<'_>) -> String;

pub enum CallRewrite {
    /// `$1`, `$2`, ... refer to arguments. Calls whose argument count differs
    /// from the highest placeholder are left alone.
    Template(&'static str),
    /// Returning `None` leaves the call untouched.
    Compute(CallTransform),
}

pub enum PatternRewrite {
    /// Expanded with `regex` replacement syntax.
    Template(&'static str),
    Compute(CapturesTransform),
}

/// Where a pattern rule is allowed to match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Only outside literals and comments.
    Code,
    /// Anywhere, for patterns that span a quoted identifier.
    Text,
}

pub enum Matcher {
    Call {
        names: &'static [&'static str],
        rewrite: CallRewrite,
    },
    Pattern {
        regex: Regex,
        scope: Scope,
        rewrite: PatternRewrite,
    },
}

pub struct Rule {
    pub name: &'static str,
    pub group: RuleGroup,
    pub description: &'static str,
    matcher: Matcher,
}

impl Rule {
    pub fn call(
        name: &'static str,
        group: RuleGroup,
        names: &'static [&'static str],
        template: &'static str,
        description: &'static str,
    ) -> Self {
        Self {
            name,
            group,
            description,
            matcher: Matcher::Call {
                names,
                rewrite: CallRewrite::Template(template),
            },
        }
    }

    pub fn call_with(
        name: &'static str,
        group: RuleGroup,
        names: &'static [&'static str],
        transform: CallTransform,
        description: &'static str,
    ) -> Self {
        Self {
            name,
            group,
            description,
            matcher: Matcher::Call {
                names,
                rewrite: CallRewrite::Compute(transform),
            },
        }
    }

    pub fn pattern(
        name: &'static str,
        group: RuleGroup,
        pattern: &str,
        template: &'static str,
        description: &'static str,
    ) -> Self {
        Self::with_pattern(name, group, pattern, Scope::Code, PatternRewrite::Template(template), description)
    }

    pub fn pattern_with(
        name: &'static str,
        group: RuleGroup,
        pattern: &str,
        transform: CapturesTransform,
        description: &'static str,
    ) -> Self {
        Self::with_pattern(name, group, pattern, Scope::Code, PatternRewrite::Compute(transform), description)
    }

    pub fn in_scope(mut self, new_scope: Scope) -> Self {
        if let Matcher::Pattern { scope, .. } = &mut self.matcher {
            *scope = new_scope;
        }
        self
    }

    fn with_pattern(
        name: &'static str,
        group: RuleGroup,
        pattern: &str,
        scope: Scope,
        rewrite: PatternRewrite,
        description: &'static str,
    ) -> Self {
        let regex = Regex::new(pattern)
            .unwrap_or_else(|e| panic!("Invalid regex pattern '{}': {}", pattern, e));

        Self {
            name,
            group,
            description,
            matcher: Matcher::Pattern {
                regex,
                scope,
                rewrite,
            },
        }
    }

    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    /// Rewrite every non-overlapping match in `sql`. The flag reports
    /// whether the text changed.
    pub fn apply(&self, sql: &str) -> (String, bool) {
        let result = match &self.matcher {
            Matcher::Call { names, rewrite } => rewrite_calls(sql, names, rewrite),
            Matcher::Pattern {
                regex,
                scope,
                rewrite,
            } => match scope {
                Scope::Code => scanner::map_code(sql, |code| replace_pattern(regex, rewrite, code)),
                Scope::Text => replace_pattern(regex, rewrite, sql),
            },
        };
        let changed = result != sql;
        (result, changed)
    }
}

fn replace_pattern(regex: &Regex, rewrite: &PatternRewrite, text: &str) -> String {
    match rewrite {
        PatternRewrite::Template(template) => regex.replace_all(text, *template).into_owned(),
        PatternRewrite::Compute(transform) => regex.replace_all(text, |caps: &Captures| transform(caps)).into_owned(),
    }
}

/// Calls nested inside a matching call are rewritten first, so the outer
/// rewrite sees finished arguments.
fn rewrite_calls(sql: &str, names: &[&str], rewrite: &CallRewrite) -> String {
    let calls = scanner::find_calls(sql, names);
    if calls.is_empty() {
        return sql.to_string();
    }

    let mut out = String::with_capacity(sql.len());
    let mut last = 0;
    for call in calls {
        out.push_str(&sql[last..call.start]);

        let inner = rewrite_calls(call.inner(sql), names, rewrite);
        let args = scanner::split_top_level(&inner, b',');
        let site = CallSite {
            name: &call.name,
            args: &args,
        };

        match rewrite.apply(&site) {
            Some(replacement) => out.push_str(&replacement),
            None => {
                out.push_str(&sql[call.start..=call.open]);
                out.push_str(&inner);
                out.push(')');
            }
        }
        last = call.end;
    }
    out.push_str(&sql[last..]);

    out
}

impl CallRewrite {
    fn apply(&self, site: &CallSite<'_>) -> Option<String> {
        match self {
            CallRewrite::Template(template) => expand_template(template, site.args),
            CallRewrite::Compute(transform) => transform(site),
        }
    }
}

fn expand_template(template: &str, args: &[&str]) -> Option<String> {
    let arity = PLACEHOLDER
        .captures_iter(template)
        .filter_map(|caps| caps[1].parse::<usize>().ok())
        .max()
        .unwrap_or(0);
    if arity != args.len() {
        return None;
    }

    let expanded = PLACEHOLDER.replace_all(template, |caps: &Captures| {
        caps[1]
            .parse::<usize>()
            .ok()
            .and_then(|n| args.get(n.wrapping_sub(1)))
            .map(|arg| arg.to_string())
            .unwrap_or_default()
    });
    Some(expanded.into_owned())
}

/// Ordered rule sequence. Order is significant: later rules see the output
/// of earlier ones.
pub struct RuleTable {
    rules: Vec<Rule>,
}

impl RuleTable {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Shared default table, built on first use.
    pub fn standard() -> &'static RuleTable {
        &STANDARD
    }

    pub fn add_rule(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.add_rule(rule);
        self
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn get(&self, name: &str) -> Option<&Rule> {
        self.rules.iter().find(|rule| rule.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.rules.iter().map(|rule| rule.name)
    }

    pub fn group(&self, group: RuleGroup) -> impl Iterator<Item = &Rule> + '_ {
        self.rules.iter().filter(move |rule| rule.group == group)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for RuleTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_requires_matching_arity() {
        assert_eq!(
            expand_template("COALESCE($1, $2)", &["x", "0"]),
            Some("COALESCE(x, 0)".to_string())
        );
        assert_eq!(expand_template("COALESCE($1, $2)", &["x"]), None);
        assert_eq!(
            expand_template("datetime('now')", &[]),
            Some("datetime('now')".to_string())
        );
    }

    #[test]
    fn test_call_rule_rewrites_nested_calls_inside_out() {
        let rule = Rule::call("ifnull", RuleGroup::Conditional, &["IFNULL"], "COALESCE($1, $2)", "");
        let (sql, changed) = rule.apply("SELECT ifnull(IFNULL(a, b), c) FROM t");
        assert!(changed);
        assert_eq!(sql, "SELECT COALESCE(COALESCE(a, b), c) FROM t");
    }

    #[test]
    fn test_declined_call_keeps_rewritten_arguments() {
        let rule = Rule::call("ifnull", RuleGroup::Conditional, &["IFNULL"], "COALESCE($1, $2)", "");
        let (sql, _) = rule.apply("IFNULL(IFNULL(a, b))");
        assert_eq!(sql, "IFNULL(COALESCE(a, b))");
    }

    #[test]
    fn test_pattern_rule_skips_literals() {
        let rule = Rule::pattern("int", RuleGroup::Types, r"(?i)\bINT\b", "INTEGER", "");
        let (sql, changed) = rule.apply("CAST(x AS INT), 'INT'");
        assert!(changed);
        assert_eq!(sql, "CAST(x AS INTEGER), 'INT'");
    }

    #[test]
    fn test_unchanged_text_reports_no_change() {
        let rule = Rule::pattern("int", RuleGroup::Types, r"(?i)\bINT\b", "INTEGER", "");
        assert_eq!(rule.apply("SELECT 1"), ("SELECT 1".to_string(), false));
    }

    #[test]
    fn test_table_lookup() {
        let table = RuleTable::new()
            .with_rule(Rule::pattern("a", RuleGroup::Joins, "x", "y", ""))
            .with_rule(Rule::pattern("b", RuleGroup::Keys, "y", "z", ""));
        assert_eq!(table.len(), 2);
        assert!(table.contains("b"));
        assert_eq!(table.names().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(table.group(RuleGroup::Keys).count(), 1);
    }
}
