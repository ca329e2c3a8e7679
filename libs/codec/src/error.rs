//! Encoding errors for intent construction
//!
//! Every variant names the operation kind and the offending field so a caller can
//! tell which builder input was wrong without re-deriving the schema.

use thiserror::Error;

/// Intent encoding errors with field-level context
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EncodingError {
    /// Schema requires a field the caller did not set
    #[error("Missing required field '{field}' for {kind} intent")]
    MissingField { kind: &'static str, field: String },

    /// Caller set a field the schema does not declare
    #[error("Unknown field '{field}' for {kind} intent (declared: {declared})")]
    UnknownField {
        kind: &'static str,
        field: String,
        declared: String,
    },

    /// Field value has the wrong shape for its declared type
    #[error("Field '{field}' of {kind} intent expects {expected}, got {got}")]
    TypeMismatch {
        kind: &'static str,
        field: String,
        expected: &'static str,
        got: &'static str,
    },

    /// Field value is outside its declared range
    #[error("Field '{field}' value {value} out of range: {constraint}")]
    OutOfRange {
        field: String,
        value: String,
        constraint: String,
    },

    /// Tick bounds are inverted, zero-width, or only one bound was supplied
    #[error("Invalid tick pair for {kind} intent: {detail}")]
    InvalidTickPair { kind: &'static str, detail: String },

    /// Malformed nonce text
    #[error("Invalid nonce: {0}")]
    InvalidNonce(String),
}

impl EncodingError {
    pub fn missing(kind: &'static str, field: impl Into<String>) -> Self {
        Self::MissingField {
            kind,
            field: field.into(),
        }
    }

    pub fn out_of_range(
        field: impl Into<String>,
        value: impl ToString,
        constraint: impl Into<String>,
    ) -> Self {
        Self::OutOfRange {
            field: field.into(),
            value: value.to_string(),
            constraint: constraint.into(),
        }
    }
}

/// Result type for codec operations
pub type EncodingResult<T> = std::result::Result<T, EncodingError>;
