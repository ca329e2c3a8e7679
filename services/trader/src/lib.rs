//! # SatSwap Trader
//!
//! Client-side trading engine for the SatSwap AMM gateway.
//!
//! ## Architecture
//!
//! ```text
//! QuoteSelector ──(best quote)──→ Trader ──(signed intent)──→ Gateway
//!       ↑                           │  ↑                         │
//!   simulate fan-out         transfer│  │outcome                 │
//!                                   ↓  │                         ↓
//!                                Wallet ←──── credit polling ─── pools
//! ```
//!
//! - [`QuoteSelector`]: parallel simulate fan-out with a deterministic winner
//! - [`Trader`]: every simple operation, from transfer through submission to clawback
//! - [`composite`]: invoice payment from a token balance with recovery
//!
//! Gateway rejections come back inside typed outcomes; [`TradeError`] is reserved for
//! operations that could not run at all.

pub mod composite;
pub mod confirm;
pub mod error;
pub mod invoice;
pub mod logging;
pub mod orchestrator;
pub mod quote_selector;

pub use composite::{
    compute_min_amount_out, estimate_routing_fee, CompositeReport, CompositeStage, FundLocation,
    InvoicePayment, PaymentReceipt, RecoveryOutcome,
};
pub use confirm::wait_for_credit;
pub use error::{Result, TradeError};
pub use invoice::invoice_amount_sats;
pub use orchestrator::{
    BondingCurveParams, LiquidityOrder, LiquidityReport, PoolLaunch, PoolSpec, Reclaim,
    RemovalOrder, SwapOrder, SwapReport, Trader,
};
pub use quote_selector::{pick_best, QuoteSelector};
