pub mod post_processor;

use log::debug;
use std::collections::HashSet;

use crate::error::Diagnostic;
use crate::rules::RuleTable;

pub use post_processor::{marker, PostProcessor, NOT_SUPPORTED};

/// Output of one rewrite pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rewritten {
    pub sql: String,
    pub diagnostics: Vec<Diagnostic>,
    /// Names of the rules that changed the text, in table order.
    pub rules_applied: Vec<&'static str>,
}

/// Applies a rule table to one statement, then marks unsupported
/// constructs and cleans up. Never fails.
pub struct RewriteEngine<'t> {
    rules: &'t RuleTable,
    disabled: HashSet<String>,
    post_processor: PostProcessor,
}

impl<'t> RewriteEngine<'t> {
    pub fn new(rules: &'t RuleTable) -> Self {
        Self {
            rules,
            disabled: HashSet::new(),
            post_processor: PostProcessor::new(),
        }
    }

    /// Skip the named rules. The table itself is not modified.
    pub fn with_disabled<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.disabled.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn is_enabled(&self, name: &str) -> bool {
        !self.disabled.contains(name)
    }

    pub fn rewrite(&self, sql: &str) -> Rewritten {
        let mut result = sql.to_string();
        let mut rules_applied = Vec::new();

        for rule in self.rules.rules() {
            if !self.is_enabled(rule.name) {
                continue;
            }
            let (rewritten, changed) = rule.apply(&result);
            if changed {
                rules_applied.push(rule.name);
                result = rewritten;
            }
        }

        if !rules_applied.is_empty() {
            debug!("Applied: {}", rules_applied.join(", "));
        }

        let (sql, diagnostics) = self.post_processor.process(&result);
        for diagnostic in &diagnostics {
            debug!("Marked: {}", diagnostic);
        }

        Rewritten {
            sql,
            diagnostics,
            rules_applied,
        }
    }
}
