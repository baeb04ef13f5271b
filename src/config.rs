use log::warn;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

use crate::error::{TransformationError, TransformationResult};
use crate::rules::RuleTable;

pub const ENV_FORMAT: &str = "MYT_FORMAT";
pub const ENV_INDENT_WIDTH: &str = "MYT_INDENT_WIDTH";
pub const ENV_DISABLED_RULES: &str = "MYT_DISABLED_RULES";

const INDENT_RANGE: std::ops::RangeInclusive<usize> = 1..=8;

// ---------------------------------------------------------------------------
// Data model
// ---------------------------------------------------------------------------

/// Translator settings, usually read from a TOML file:
///
/// ```toml
/// [formatting]
/// enabled = true
/// indent_width = 2
///
/// [rules]
/// disabled = ["outer_join"]
/// drop_session_statements = true
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformationConfig {
    pub formatting: FormattingConfig,
    pub rules: RulesConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormattingConfig {
    pub enabled: bool,
    pub indent_width: usize,
}

impl Default for FormattingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            indent_width: 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Rule names to skip.
    pub disabled: Vec<String>,
    /// Drop `SET`, `USE`, `LOCK TABLES` and version comments from scripts.
    pub drop_session_statements: bool,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            disabled: Vec::new(),
            drop_session_statements: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

impl TransformationConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> TransformationResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> TransformationResult<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults overridden by `MYT_*` variables. Unparseable values are
    /// logged and ignored.
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| env::var(key).ok())
    }

    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_FORMAT) {
            match parse_flag(&value) {
                Some(enabled) => self.formatting.enabled = enabled,
                None => warn!("Ignoring {}={}: expected a boolean", ENV_FORMAT, value),
            }
        }

        if let Some(value) = lookup(ENV_INDENT_WIDTH) {
            match value.trim().parse() {
                Ok(width) => self.formatting.indent_width = width,
                Err(_) => warn!("Ignoring {}={}: expected a number", ENV_INDENT_WIDTH, value),
            }
        }

        if let Some(value) = lookup(ENV_DISABLED_RULES) {
            self.rules.disabled.extend(
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .map(String::from),
            );
        }

        self
    }

    pub fn validate(&self) -> TransformationResult<()> {
        if !INDENT_RANGE.contains(&self.formatting.indent_width) {
            return Err(TransformationError::config(&format!(
                "indent_width must be between {} and {}, got {}",
                INDENT_RANGE.start(),
                INDENT_RANGE.end(),
                self.formatting.indent_width
            )));
        }

        let table = RuleTable::standard();
        if let Some(unknown) = self.rules.disabled.iter().find(|name| !table.contains(name)) {
            return Err(TransformationError::config(&format!(
                "unknown rule '{}'",
                unknown
            )));
        }

        Ok(())
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
