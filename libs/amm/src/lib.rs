//! # SatSwap AMM Library - Exact Pricing Engine
//!
//! ## Purpose
//!
//! Deterministic, side-effect free pricing math for the SatSwap client:
//! concentrated-liquidity tick math, human to pool price scaling, liquidity sizing,
//! constant-product swap estimates and bonding-curve virtual reserves for
//! single-sided pools.
//!
//! ## Precision Discipline
//!
//! - Every amount that is signed or submitted is an exact integer ([`types::Amount`])
//! - Intermediates that outgrow 128 bits are computed with `num-bigint`
//! - `Decimal` appears only in display values (prices, impact percentages)
//! - No floating point anywhere
//!
//! ## Integration Points
//!
//! - **Input Sources**: pool reserves and ticks reported by the gateway, caller prices
//! - **Output Destinations**: intent builders (ticks, virtual reserves, min outputs),
//!   the trader's quote and recovery logic
//!
//! ## Failure Model
//!
//! No I/O, so nothing here fails transiently: every [`PricingError`] is an input
//! validation failure.

mod big_math;
pub mod bonding_curve;
pub mod constant_product;
pub mod error;
pub mod liquidity;
pub mod pool_traits;
pub mod price_scaling;
pub mod tick_math;

pub use bonding_curve::{BondingCurve, VirtualReserves};
pub use constant_product::{ConstantProductState, SwapEstimate};
pub use error::{PricingError, PricingResult};
pub use liquidity::{price_in_range, LiquidityMath, LiquidityQuote};
pub use pool_traits::{supports_local_estimate, SwapCurve};
pub use price_scaling::{
    human_price_to_pool_price, tick_range_from_prices, PriceScale, TickRange, MAX_DECIMALS,
};
pub use tick_math::{
    PoolPrice, TickMath, TickRounding, MAX_TICK, MAX_TICK_SPACING, MIN_SQRT_RATIO, MIN_TICK,
};

/// Common types for AMM calculations
pub use rust_decimal::Decimal;
