//! Error types for Promolift.
//!
//! Structured error handling with stable error codes for machine parsing,
//! category classification, and recoverability hints. Only boundary failures
//! are errors; every non-fatal analysis condition travels through the
//! ordered note list instead (see [`crate::note`]).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Result type alias for Promolift operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories for grouping related errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Input table contract violations.
    Schema,
    /// Analysis parameter errors.
    Params,
    /// Engine computation errors.
    Analysis,
    /// Serialization errors.
    Io,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Schema => write!(f, "schema"),
            ErrorCategory::Params => write!(f, "params"),
            ErrorCategory::Analysis => write!(f, "analysis"),
            ErrorCategory::Io => write!(f, "io"),
        }
    }
}

/// Unified error type for Promolift.
#[derive(Error, Debug)]
pub enum Error {
    // Schema errors (10-19)
    #[error("{table} is missing required signal '{column}'")]
    MissingColumn { table: String, column: String },

    #[error("{table} is empty; nothing to analyze")]
    EmptyTable { table: String },

    // Parameter errors (20-29)
    #[error("invalid parameters: {0}")]
    InvalidParams(String),

    // Analysis errors (30-39)
    #[error("analysis failed: {0}")]
    Analysis(String),

    // I/O and serialization errors (60-69)
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns the stable error code for this error type.
    ///
    /// Codes are grouped by category:
    /// - 10-19: Schema errors
    /// - 20-29: Parameter errors
    /// - 30-39: Analysis errors
    /// - 60-69: I/O errors
    pub fn code(&self) -> u32 {
        match self {
            Error::MissingColumn { .. } => 10,
            Error::EmptyTable { .. } => 11,
            Error::InvalidParams(_) => 20,
            Error::Analysis(_) => 30,
            Error::Json(_) => 60,
        }
    }

    /// Returns the error category for grouping and filtering.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::MissingColumn { .. } | Error::EmptyTable { .. } => ErrorCategory::Schema,
            Error::InvalidParams(_) => ErrorCategory::Params,
            Error::Analysis(_) => ErrorCategory::Analysis,
            Error::Json(_) => ErrorCategory::Io,
        }
    }

    /// Returns whether this error is potentially recoverable by the caller.
    pub fn is_recoverable(&self) -> bool {
        match self {
            // Schema: recoverable by supplying the missing signal upstream.
            Error::MissingColumn { .. } => true,
            Error::EmptyTable { .. } => true,
            // Parameters: recoverable by fixing the configuration.
            Error::InvalidParams(_) => true,
            // Analysis failures indicate an internal invariant violation.
            Error::Analysis(_) => false,
            Error::Json(_) => true,
        }
    }
}

/// Structured error response for JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    /// Stable error code.
    pub code: u32,

    /// Error category for grouping.
    pub category: ErrorCategory,

    /// Human-readable error message.
    pub message: String,

    /// Whether the error is potentially recoverable.
    pub recoverable: bool,

    /// Additional structured context (e.g., table and column names).
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub context: HashMap<String, serde_json::Value>,
}

impl From<&Error> for StructuredError {
    fn from(err: &Error) -> Self {
        let mut context = HashMap::new();

        match err {
            Error::MissingColumn { table, column } => {
                context.insert("table".to_string(), serde_json::json!(table));
                context.insert("column".to_string(), serde_json::json!(column));
            }
            Error::EmptyTable { table } => {
                context.insert("table".to_string(), serde_json::json!(table));
            }
            _ => {}
        }

        StructuredError {
            code: err.code(),
            category: err.category(),
            message: err.to_string(),
            recoverable: err.is_recoverable(),
            context,
        }
    }
}

impl StructuredError {
    /// Serialize to JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(r#"{{"code":{},"error":"serialization_failed"}}"#, self.code)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        let err = Error::MissingColumn { table: "panel".into(), column: "discount_pct".into() };
        assert_eq!(err.code(), 10);
        assert_eq!(Error::InvalidParams("x".into()).code(), 20);
        assert_eq!(Error::Analysis("x".into()).code(), 30);
    }

    #[test]
    fn test_error_category() {
        let err = Error::MissingColumn { table: "panel".into(), column: "engagement".into() };
        assert_eq!(err.category(), ErrorCategory::Schema);
        assert_eq!(Error::InvalidParams("x".into()).category(), ErrorCategory::Params);
    }

    #[test]
    fn test_structured_error_context() {
        let err = Error::MissingColumn { table: "panel".into(), column: "engagement".into() };
        let structured = StructuredError::from(&err);

        assert_eq!(structured.code, 10);
        assert!(structured.recoverable);
        assert_eq!(structured.context.get("column"), Some(&serde_json::json!("engagement")));

        let json = structured.to_json();
        assert!(json.contains(r#""category":"schema""#));
    }

    #[test]
    fn test_missing_column_message() {
        let err = Error::MissingColumn { table: "panel".into(), column: "discount_pct".into() };
        assert_eq!(err.to_string(), "panel is missing required signal 'discount_pct'");
    }
}
