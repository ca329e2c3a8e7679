//! Validation errors for caller-supplied input
//!
//! These are never retried: a request that fails validation fails identically on
//! every attempt, so it is surfaced to the caller immediately.

use thiserror::Error;

/// Malformed caller input
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// Identifier was empty or contained control characters
    #[error("Invalid {kind} identifier: '{value}'")]
    InvalidIdentifier { kind: &'static str, value: String },

    /// Amount must be strictly positive
    #[error("{field} must be greater than zero")]
    NonPositiveAmount { field: &'static str },

    /// Basis-point value exceeds the denominator
    #[error("{field} is {value} bps, maximum is {max}")]
    BpsOutOfRange {
        field: &'static str,
        value: u32,
        max: u32,
    },

    /// Position bounds are inverted or zero-width
    #[error("Invalid tick range: lower {lower} must be below upper {upper}")]
    InvalidTickRange { lower: i32, upper: i32 },

    /// Swap or deposit names an asset the pool does not trade
    #[error("Asset {asset} is not traded by pool {pool_id}")]
    AssetNotInPool { pool_id: String, asset: String },

    /// Input and output asset are the same
    #[error("Input and output asset are both {asset}")]
    SameAsset { asset: String },

    /// Lightning invoice could not be interpreted
    #[error("Invalid invoice: {reason}")]
    InvalidInvoice { reason: String },

    /// Custom validation failure with message
    #[error("Validation failed: {message}")]
    Custom { message: String },
}

impl ValidationError {
    pub fn custom(message: impl Into<String>) -> Self {
        Self::Custom {
            message: message.into(),
        }
    }
}
