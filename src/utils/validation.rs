use regex::Regex;
use sqlparser::dialect::SQLiteDialect;
use sqlparser::parser::Parser;
use std::sync::LazyLock;

use crate::error::{TransformationError, TransformationResult};

static ERROR_POSITION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Line: (\d+), Column: (\d+)").unwrap_or_else(|e| panic!("position regex: {}", e))
});

/// Checks translated output against the target grammar. Translation itself
/// never calls this; it is offered to callers that want an early signal
/// before executing the result.
pub struct SqlValidator {
    dialect: SQLiteDialect,
}

impl SqlValidator {
    pub fn new() -> Self {
        Self {
            dialect: SQLiteDialect {},
        }
    }

    pub fn parse_target(&self, sql: &str) -> TransformationResult<usize> {
        Parser::parse_sql(&self.dialect, sql)
            .map(|statements| statements.len())
            .map_err(|e| {
                let message = e.to_string();
                let (line, column) = position_from_error(&message);
                TransformationError::parse(&message, line, column)
            })
    }

    pub fn validate_target_syntax(&self, sql: &str) -> ValidationResult {
        let mut result = ValidationResult::new();
        if sql.trim().is_empty() {
            result.warnings.push("empty statement".to_string());
            return result;
        }
        if let Err(e) = self.parse_target(sql) {
            result.is_valid = false;
            result.errors.push(e.to_string());
        }
        result
    }
}

impl Default for SqlValidator {
    fn default() -> Self {
        Self::new()
    }
}

fn position_from_error(error: &str) -> (usize, usize) {
    ERROR_POSITION
        .captures(error)
        .map(|captures| {
            let line = captures[1].parse().unwrap_or(0);
            let column = captures[2].parse().unwrap_or(0);
            (line, column)
        })
        .unwrap_or((0, 0))
}

#[derive(Debug, Default)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}
