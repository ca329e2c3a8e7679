//! # SatSwap Gateway Access
//!
//! ## Purpose
//!
//! Everything between a built intent and the remote gateway: the capabilities the
//! client consumes ([`Wallet`], [`Gateway`]), the HTTPS transport, the signer
//! adapter and the session manager that keeps a bearer token alive.
//!
//! ## Architecture Role
//!
//! ```text
//! codec (IntentMessage) → IntentSigner → SessionManager → Gateway (HttpGateway)
//!                             ↓               ↓
//!                       Wallet::sign     challenge / verify
//! ```
//!
//! ## Failure Model
//!
//! - 401-class responses surface as [`GatewayError::Unauthorized`]; the session
//!   manager re-authenticates once and retries once
//! - Reads may be retried through [`retry_read`]; submissions never are
//! - Wallet signing failures are fatal and carry the wallet error verbatim

pub mod api;
pub mod auth;
pub mod error;
pub mod http;
pub mod retry;
pub mod signer;
pub mod wallet;

pub use api::{Challenge, Gateway, PoolFilter, SessionGrant, SimulateSwapRequest, VerifyRequest};
pub use auth::{AuthState, Session, SessionManager};
pub use error::{AuthError, GatewayError, GatewayResult, SignerError, Transient};
pub use http::HttpGateway;
pub use retry::{retry_read, ReadRetryPolicy};
pub use signer::IntentSigner;
pub use wallet::{Wallet, WalletError, WalletResult};
