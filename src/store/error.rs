//! Error type for data-store operations.

use thiserror::Error;

/// Backend error codes that conventionally signal "relation does not exist".
pub const MISSING_RELATION_CODES: &[&str] = &["42P01", "PGRST205"];

/// Unified error type for store operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Query error{}: {}", fmt_code(.code), .message)]
    Query {
        /// Backend error code, when the client surfaced one.
        code: Option<String>,
        message: String,
    },

    #[error("Row not found: {0}")]
    RowNotFound(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Malformed row: {0}")]
    MalformedRow(String),
}

fn fmt_code(code: &Option<String>) -> String {
    match code {
        Some(code) => format!(" ({code})"),
        None => String::new(),
    }
}

impl StoreError {
    /// Create a query error with a backend code.
    pub fn query(code: impl Into<String>, message: impl Into<String>) -> Self {
        StoreError::Query {
            code: Some(code.into()),
            message: message.into(),
        }
    }

    /// Create a query error with no backend code.
    pub fn message(message: impl Into<String>) -> Self {
        StoreError::Query {
            code: None,
            message: message.into(),
        }
    }

    /// Whether this error signals a missing relation (`42P01` / `PGRST205`),
    /// the one condition the loaders attempt a recovery action for.
    #[must_use]
    pub fn is_missing_relation(&self) -> bool {
        match self {
            StoreError::Query {
                code: Some(code), ..
            } => MISSING_RELATION_CODES.contains(&code.as_str()),
            _ => false,
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::MalformedRow(err.to_string())
    }
}
