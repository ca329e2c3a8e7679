//! # SatSwap Types
//!
//! Shared domain vocabulary for the SatSwap client workspace.
//!
//! ## Design Philosophy
//!
//! - **No Precision Loss**: every settlement amount is a smallest-unit `u128`
//! - **Clear Boundaries**: `Decimal` only appears in display-oriented fields
//!   (`execution_price`, `price_impact_pct`), never in anything that is signed or submitted
//! - **Type Safety**: pool, asset and transfer identifiers are distinct wrappers so they
//!   cannot be swapped in a function call
//! - **Wire Friendly**: amounts travel as decimal strings so JavaScript-backed gateways
//!   never round them through `f64`
//!
//! ## Integration Points
//!
//! - **codec**: intent field values reference [`PoolId`] and [`AssetId`]
//! - **gateway**: response payloads deserialize into [`Pool`], [`SwapExecution`] and friends
//! - **satswap-trader**: orchestration results are built from these types

pub mod common;
pub mod outcome;
pub mod pool;
pub mod position;
pub mod quote;
pub mod wallet;

pub use common::amount::Amount;
pub use common::errors::ValidationError;
pub use common::identifiers::{AssetId, PoolId, TransferId};
pub use common::{validate_bps, MAX_BPS};
pub use outcome::{
    Acknowledgement, LiquidityExecution, Outcome, PoolCreation, Rejection, RejectionCode,
    SwapExecution, WithdrawalExecution,
};
pub use pool::{CurveType, FeeRates, Pool, PoolStatus};
pub use position::Position;
pub use quote::{Quote, SwapRequest};
pub use wallet::{LightningPayment, WalletBalance};

/// Re-exported so downstream crates agree on one `Decimal`
pub use rust_decimal::Decimal;
