use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransformationError {
    #[error("Parse error: {message} at line {line}, column {column}")]
    ParseError {
        message: String,
        line: usize,
        column: usize,
    },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[cfg(feature = "json_output")]
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

pub type TransformationResult<T> = Result<T, TransformationError>;

impl TransformationError {
    pub fn config(message: &str) -> Self {
        Self::ConfigError {
            message: message.to_string(),
        }
    }

    pub fn parse(message: &str, line: usize, column: usize) -> Self {
        Self::ParseError {
            message: message.to_string(),
            line,
            column,
        }
    }
}

impl From<toml::de::Error> for TransformationError {
    fn from(e: toml::de::Error) -> Self {
        Self::config(&e.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WarningSeverity {
    Low,
    Medium,
}

/// A construct the target dialect cannot express, reported next to the
/// translated text instead of failing the translation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Source text that triggered the warning.
    pub fragment: String,
    pub note: String,
    pub severity: WarningSeverity,
}

impl Diagnostic {
    pub fn new(fragment: &str, note: &str, severity: WarningSeverity) -> Self {
        Self {
            fragment: fragment.trim().to_string(),
            note: note.to_string(),
            severity,
        }
    }

    pub fn low(fragment: &str, note: &str) -> Self {
        Self::new(fragment, note, WarningSeverity::Low)
    }

    pub fn medium(fragment: &str, note: &str) -> Self {
        Self::new(fragment, note, WarningSeverity::Medium)
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}: {}", self.severity, self.note, self.fragment)
    }
}
