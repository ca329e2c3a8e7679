//! Error types for trading operations
//!
//! Gateway rejections (`accepted = false`) are not errors; they come back inside the
//! typed outcome of each operation. Everything here is a failure to carry an
//! operation out at all.

use codec::EncodingError;
use gateway::{AuthError, GatewayError, SignerError, WalletError};
use satswap_amm::PricingError;
use thiserror::Error;
use types::{Amount, AssetId, PoolId, TransferId, ValidationError};

use crate::composite::CompositeReport;
use crate::orchestrator::Reclaim;

/// Result type alias for trading operations
pub type Result<T> = std::result::Result<T, TradeError>;

#[derive(Debug, Error)]
pub enum TradeError {
    /// Malformed caller input; never retried
    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error("Invalid intent: {0}")]
    Encoding(#[from] EncodingError),

    #[error("Pricing error: {0}")]
    Pricing(#[from] PricingError),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error(transparent)]
    Signing(#[from] SignerError),

    #[error("Wallet error: {0}")]
    Wallet(#[from] WalletError),

    /// Transport failure after read retries were exhausted, or during a submission
    #[error("Gateway error: {0}")]
    Network(GatewayError),

    #[error("No liquidity for {asset_in} -> {asset_out}")]
    NoLiquidity { asset_in: AssetId, asset_out: AssetId },

    #[error("Quoted output {quoted} is below the required {required}")]
    InsufficientOutput { quoted: Amount, required: Amount },

    #[error("Timed out after {waited_ms}ms waiting for {what}")]
    Timeout { what: String, waited_ms: u64 },

    /// A submission failed with its outcome unknown: funds were transferred to the
    /// pool first, or the request was lost in transit and may still have executed
    #[error("Submission to pool {pool_id} failed with {} transfer(s) outstanding: {reason}", .transfer_ids.len())]
    Unsettled {
        pool_id: PoolId,
        transfer_ids: Vec<TransferId>,
        reason: String,
    },

    /// A later funding transfer failed; earlier transfers were clawed back
    #[error("Funding pool {pool_id} failed: {reason}")]
    FundingFailed {
        pool_id: PoolId,
        reason: String,
        reclaims: Vec<Reclaim>,
    },

    /// Composite flow stopped after an irreversible step; carries recovery and fund location
    #[error("Lightning payment flow did not complete: {}", .0.summary())]
    PartialFailure(Box<CompositeReport>),

    /// Detached flow task panicked or was aborted
    #[error("Background task failed: {0}")]
    TaskFailed(String),
}

impl From<AuthError> for TradeError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::AuthenticationFailed(reason) => TradeError::AuthenticationFailed(reason),
            AuthError::Signer(err) => TradeError::Signing(err),
            AuthError::Encoding(err) => TradeError::Encoding(err),
            AuthError::Gateway(err) => TradeError::Network(err),
        }
    }
}

impl From<GatewayError> for TradeError {
    fn from(err: GatewayError) -> Self {
        TradeError::Network(err)
    }
}

impl TradeError {
    /// Composite report, when the failure carries one
    pub fn report(&self) -> Option<&CompositeReport> {
        match self {
            TradeError::PartialFailure(report) => Some(report),
            _ => None,
        }
    }
}
