//! Error types for gateway access

use codec::EncodingError;
use thiserror::Error;

use crate::wallet::WalletError;

/// Result type alias for raw gateway calls
pub type GatewayResult<T> = std::result::Result<T, GatewayError>;

/// Failures talking to the gateway
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayError {
    /// 401-class response; the session token was rejected
    #[error("Gateway rejected the session token")]
    Unauthorized,

    /// Connection failure, DNS failure, reset, ...
    #[error("Network error: {0}")]
    Network(String),

    #[error("Gateway request timed out after {timeout_ms}ms")]
    Timeout {
        /// Configured request timeout
        timeout_ms: u64,
    },

    #[error("Gateway returned HTTP {status}: {body}")]
    Http {
        /// HTTP status code
        status: u16,
        /// Response body, verbatim
        body: String,
    },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Failed to decode gateway response: {0}")]
    Decode(String),

    /// The request could not be formed (wrong intent kind for the endpoint, bad URL)
    #[error("Invalid gateway request: {0}")]
    InvalidRequest(String),
}

impl GatewayError {
    /// Whether an idempotent read may be retried after this error
    pub fn is_transient(&self) -> bool {
        match self {
            GatewayError::Network(_) | GatewayError::Timeout { .. } => true,
            GatewayError::Http { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

/// Signing failures; always fatal for the operation that asked
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SignerError {
    /// The wallet refused or failed to sign; carries its error verbatim
    #[error("Signing failed: {0}")]
    SigningFailed(WalletError),

    #[error("Wallet identity key unavailable: {0}")]
    IdentityUnavailable(WalletError),
}

/// Failures of an authenticated gateway call
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AuthError {
    /// Challenge-response failed, or the gateway kept rejecting a fresh token
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error(transparent)]
    Signer(#[from] SignerError),

    #[error(transparent)]
    Encoding(#[from] EncodingError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// Classification used by the read-retry policy
pub trait Transient {
    fn is_transient(&self) -> bool;
}

impl Transient for GatewayError {
    fn is_transient(&self) -> bool {
        GatewayError::is_transient(self)
    }
}

impl Transient for AuthError {
    fn is_transient(&self) -> bool {
        matches!(self, AuthError::Gateway(err) if err.is_transient())
    }
}
