//! # SatSwap Intent Codec
//!
//! ## Purpose
//!
//! The "rules" layer for signed intents: which operations exist, which fields each
//! one carries, how those fields become the exact bytes a wallet signs, and the
//! anti-replay nonce that makes every signed intent unique.
//!
//! ## Architecture Role
//!
//! ```text
//! libs/types → [codec] → gateway/signer → gateway transport
//!     ↑           ↓              ↓
//! Pure Data   Schemas +      Digest + wallet
//! Structures  canonical      signature
//!             bytes
//! ```
//!
//! ## What This Crate Contains
//! - [`OperationKind`] registry with static field schemas
//! - [`encode`]: deterministic canonical encoding
//! - [`Nonce`]: 16-byte CSPRNG nonces
//! - Typed builders ([`SwapIntent`], [`AddLiquidityIntent`], ...) and the
//!   [`IntentMessage`] / [`SignedIntent`] envelopes
//!
//! ## What This Crate Does NOT Contain
//! - Hashing or signing (belongs in `gateway::signer`)
//! - Network transport

pub mod encoder;
pub mod error;
pub mod intents;
pub mod kind;
pub mod nonce;
pub mod value;

pub use encoder::{encode, encode_to_string, MAX_TICK, MAX_TICK_SPACING, MIN_TICK};
pub use error::{EncodingError, EncodingResult};
pub use intents::{
    AddLiquidityIntent, ClawbackIntent, CollectFeesIntent, ConfirmInitialDepositIntent,
    CreateConcentratedPoolIntent, CreateConstantProductPoolIntent, CreateSingleSidedPoolIntent,
    IntentMessage, IntentPayload, IntentRequestBody, RegisterHostIntent, RemoveLiquidityIntent,
    SignedIntent, SwapIntent, WithdrawHostFeesIntent, WithdrawIntegratorFeesIntent,
};
pub use kind::{FieldSpec, FieldType, OperationKind};
pub use nonce::{generate_nonce, Nonce, NONCE_LEN};
pub use value::{FieldValue, IntentFields};
