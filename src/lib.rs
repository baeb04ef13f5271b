//! # MySQL to SQLite Transpiler
//!
//! Rewrites MySQL statements into SQLite syntax with an ordered table of
//! textual rules, then lays the result out by statement shape. No AST is
//! built: the rewrite works on the statement text, skipping string literals,
//! quoted identifiers and comments.
//!
//! Constructs without a SQLite equivalent are replaced in place by a
//! `/* NOT SUPPORTED: ... */` marker and reported as [`Diagnostic`]s.
//! Translation itself never fails.
//!
//! ## Quick Start
//!
//! ```rust
//! use myt::Translator;
//!
//! let sql = myt::translate("SELECT IFNULL(x, 0) FROM t");
//! assert_eq!(sql, "SELECT COALESCE(x, 0) FROM t");
//!
//! let translator = Translator::builder()
//!     .with_indent_width(2)
//!     .disable_rule("outer_join")
//!     .build()
//!     .unwrap();
//!
//! let result = translator.translate("SELECT a FROM t GROUP BY a WITH ROLLUP");
//! assert_eq!(result.diagnostics.len(), 1);
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod formatter;
pub mod rules;
pub mod utils;

pub use config::{FormattingConfig, RulesConfig, TransformationConfig};
pub use engine::{RewriteEngine, Rewritten};
pub use error::{Diagnostic, TransformationError, TransformationResult, WarningSeverity};
pub use formatter::{format_statement, FormatOptions, Shape};
pub use rules::{Rule, RuleGroup, RuleTable};

use log::debug;
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

use crate::utils::scanner;

static DEFAULT_TRANSLATOR: LazyLock<Translator> = LazyLock::new(Translator::default);

static SESSION_STATEMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:SET|USE|LOCK\s+TABLES?|UNLOCK\s+TABLES?)\b")
        .unwrap_or_else(|e| panic!("session regex: {}", e))
});

/// Translate one statement with the default configuration.
pub fn translate(sql: &str) -> String {
    DEFAULT_TRANSLATOR.translate(sql).sql
}

/// Like [`translate`], with the diagnostics and applied rule names.
pub fn translate_detailed(sql: &str) -> Translation {
    DEFAULT_TRANSLATOR.translate(sql)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Translation {
    pub sql: String,
    pub diagnostics: Vec<Diagnostic>,
    pub rules_applied: Vec<&'static str>,
}

impl Translation {
    pub fn has_diagnostics(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    /// Text, diagnostics and applied rule names as pretty-printed JSON.
    #[cfg(feature = "json_output")]
    pub fn to_json(&self) -> TransformationResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

pub struct Translator {
    config: TransformationConfig,
    engine: RewriteEngine<'static>,
}

impl Translator {
    pub fn new(config: TransformationConfig) -> TransformationResult<Self> {
        config.validate()?;
        Ok(Self::from_valid(config))
    }

    fn from_valid(config: TransformationConfig) -> Self {
        let engine =
            RewriteEngine::new(RuleTable::standard()).with_disabled(config.rules.disabled.iter().cloned());
        Self { config, engine }
    }

    pub fn from_config_file<P: AsRef<std::path::Path>>(path: P) -> TransformationResult<Self> {
        let config = TransformationConfig::from_file(path)?;
        Self::new(config)
    }

    pub fn from_environment() -> TransformationResult<Self> {
        Self::new(TransformationConfig::from_env())
    }

    pub fn builder() -> TranslatorBuilder {
        TranslatorBuilder::new()
    }

    pub fn config(&self) -> &TransformationConfig {
        &self.config
    }

    pub fn format_options(&self) -> FormatOptions {
        FormatOptions::new(self.config.formatting.indent_width)
    }

    /// Rewrite, clean up and format a single statement.
    pub fn translate(&self, sql: &str) -> Translation {
        let rewritten = self.engine.rewrite(sql);

        let sql = if self.config.formatting.enabled {
            format_statement(&rewritten.sql, &self.format_options())
        } else {
            rewritten.sql
        };

        Translation {
            sql,
            diagnostics: rewritten.diagnostics,
            rules_applied: rewritten.rules_applied,
        }
    }

    pub fn translate_batch(&self, sqls: &[&str]) -> Vec<Translation> {
        sqls.iter().map(|sql| self.translate(sql)).collect()
    }

    /// Translate a dump or script. Statements are split on top-level `;`
    /// and re-joined with a blank line between them.
    pub fn translate_script(&self, script: &str) -> Translation {
        let mut statements = Vec::new();
        let mut diagnostics = Vec::new();
        let mut rules_applied: Vec<&'static str> = Vec::new();

        for statement in scanner::split_top_level(script, b';') {
            if statement.is_empty() {
                continue;
            }

            if self.config.rules.drop_session_statements {
                if let Some(reason) = session_statement(statement) {
                    debug!("Dropped: {}", statement);
                    diagnostics.push(Diagnostic::low(statement, reason));
                    continue;
                }
            }

            let translation = self.translate(statement);
            diagnostics.extend(translation.diagnostics);
            for name in translation.rules_applied {
                if !rules_applied.contains(&name) {
                    rules_applied.push(name);
                }
            }
            statements.push(translation.sql);
        }

        let sql = statements
            .iter()
            .map(|statement| format!("{};", statement.trim_end_matches(';').trim_end()))
            .collect::<Vec<_>>()
            .join("\n\n");

        Translation {
            sql,
            diagnostics,
            rules_applied,
        }
    }
}

/// Reason for dropping a statement that only configures the MySQL session.
fn session_statement(statement: &str) -> Option<&'static str> {
    let (comments, body) = scanner::split_leading_comments(statement);
    if body.is_empty() {
        comments
            .trim_start()
            .starts_with("/*!")
            .then_some("version-specific comment has no effect")
    } else {
        SESSION_STATEMENT
            .is_match(body)
            .then_some("session statement has no equivalent")
    }
}

impl Default for Translator {
    fn default() -> Self {
        Self::from_valid(TransformationConfig::default())
    }
}

pub struct TranslatorBuilder {
    config: TransformationConfig,
}

impl TranslatorBuilder {
    fn new() -> Self {
        Self {
            config: TransformationConfig::default(),
        }
    }

    pub fn with_config(mut self, config: TransformationConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_formatting(mut self, enabled: bool) -> Self {
        self.config.formatting.enabled = enabled;
        self
    }

    pub fn with_indent_width(mut self, width: usize) -> Self {
        self.config.formatting.indent_width = width;
        self
    }

    pub fn disable_rule(mut self, name: &str) -> Self {
        self.config.rules.disabled.push(name.to_string());
        self
    }

    pub fn with_session_statements(mut self, keep: bool) -> Self {
        self.config.rules.drop_session_statements = !keep;
        self
    }

    pub fn build(self) -> TransformationResult<Translator> {
        Translator::new(self.config)
    }
}

impl Default for TranslatorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
