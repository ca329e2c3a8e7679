//! Wallet capability consumed by the client
//!
//! The wallet is a single-owner collaborator: it holds keys and funds, and the client
//! only ever asks it to sign, transfer, report balances or move Lightning payments.
//! Its internals are out of scope; implementations live with the host application
//! (and in test fixtures).

use async_trait::async_trait;
use thiserror::Error;
use types::{Amount, AssetId, LightningPayment, TransferId, WalletBalance};

pub type WalletResult<T> = std::result::Result<T, WalletError>;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WalletError {
    #[error("Insufficient funds: needed {needed}, available {available}")]
    InsufficientFunds { needed: Amount, available: Amount },

    #[error("Signing rejected: {0}")]
    SigningRejected(String),

    #[error("Transfer failed: {0}")]
    TransferFailed(String),

    #[error("Lightning error: {0}")]
    Lightning(String),

    #[error("Wallet unavailable: {0}")]
    Unavailable(String),
}

/// Operations the client needs from a wallet
#[async_trait]
pub trait Wallet: Send + Sync {
    /// Hex-encoded identity public key used for authentication and intent signing
    async fn identity_public_key(&self) -> WalletResult<String>;

    /// Sign a 32-byte message digest with the identity key
    async fn sign(&self, digest: &[u8; 32]) -> WalletResult<Vec<u8>>;

    /// Send bitcoin to `destination` (a pool's custody identity, for instance)
    async fn transfer(&self, amount_sats: Amount, destination: &str) -> WalletResult<TransferId>;

    async fn transfer_tokens(
        &self,
        asset: &AssetId,
        amount: Amount,
        destination: &str,
    ) -> WalletResult<TransferId>;

    async fn get_balance(&self) -> WalletResult<WalletBalance>;

    /// Pay a BOLT11 invoice, spending at most `max_fee_sats` on routing
    async fn pay_lightning_invoice(
        &self,
        invoice: &str,
        max_fee_sats: Amount,
    ) -> WalletResult<LightningPayment>;

    async fn create_lightning_invoice(
        &self,
        amount_sats: Amount,
        memo: Option<&str>,
    ) -> WalletResult<String>;

    /// Routing fee estimate for paying `invoice`; `None` lets the caller use its own estimate
    async fn estimate_lightning_fee(&self, _invoice: &str) -> WalletResult<Option<Amount>> {
        Ok(None)
    }

    /// Send either bitcoin or a token depending on `asset`
    async fn transfer_asset(
        &self,
        asset: &AssetId,
        amount: Amount,
        destination: &str,
    ) -> WalletResult<TransferId> {
        if asset.is_btc() {
            self.transfer(amount, destination).await
        } else {
            self.transfer_tokens(asset, amount, destination).await
        }
    }
}
