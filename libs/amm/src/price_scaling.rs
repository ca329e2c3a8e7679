//! Human price to pool price conversion and tick ranges
//!
//! A human price is quoted as "units of quote asset per one base asset" (e.g. USD per
//! BTC). The pool price is the ratio of smallest-unit amounts, asset B per asset A.
//! Scaling therefore depends on each asset's decimals and on which asset is the base.

use crate::big_math::{pow10, ratio_to_decimal};
use crate::error::{PricingError, PricingResult};
use crate::tick_math::{PoolPrice, TickMath, TickRounding};
use num_bigint::BigUint;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Largest asset precision the scaling math accepts
pub const MAX_DECIMALS: u32 = 36;

/// How a human-readable price maps onto the pool's assets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceScale {
    pub decimals_base: u32,
    pub decimals_quote: u32,
    /// Whether the base asset of the human price is the pool's asset A
    pub base_is_asset_a: bool,
}

impl PriceScale {
    pub fn new(decimals_base: u32, decimals_quote: u32, base_is_asset_a: bool) -> PricingResult<Self> {
        for decimals in [decimals_base, decimals_quote] {
            if decimals > MAX_DECIMALS {
                return Err(PricingError::InvalidDecimals {
                    decimals,
                    max: MAX_DECIMALS,
                });
            }
        }
        Ok(Self {
            decimals_base,
            decimals_quote,
            base_is_asset_a,
        })
    }

    /// Smallest-unit pool price for a human price
    pub fn to_pool_price(&self, human_price: Decimal) -> PricingResult<PoolPrice> {
        if human_price <= Decimal::ZERO {
            return Err(PricingError::InvalidRange(format!(
                "price must be positive, got {}",
                human_price
            )));
        }
        let mantissa = BigUint::from(human_price.mantissa().unsigned_abs());
        let scale = pow10(human_price.scale());
        let base = pow10(self.decimals_base);
        let quote = pow10(self.decimals_quote);

        // human = mantissa / 10^scale
        let (num, den) = if self.base_is_asset_a {
            // B per A = human * 10^quote / 10^base
            (mantissa * quote, scale * base)
        } else {
            // B per A = (1 / human) * 10^base / 10^quote
            (scale * base, mantissa * quote)
        };
        PoolPrice::from_ratio(&num, &den)
    }

    /// Human display price for a pool price
    pub fn to_human_price(&self, price: &PoolPrice) -> PricingResult<Decimal> {
        let (num, den) = price.as_ratio();
        let base = pow10(self.decimals_base);
        let quote = pow10(self.decimals_quote);
        if self.base_is_asset_a {
            ratio_to_decimal(&(num * base), &(den * quote))
        } else {
            ratio_to_decimal(&(den * base), &(num * quote))
        }
    }
}

/// Shorthand for [`PriceScale::to_pool_price`]
pub fn human_price_to_pool_price(
    human_price: Decimal,
    decimals_base: u32,
    decimals_quote: u32,
    base_is_asset_a: bool,
) -> PricingResult<PoolPrice> {
    PriceScale::new(decimals_base, decimals_quote, base_is_asset_a)?.to_pool_price(human_price)
}

/// Usable tick bounds for a human price interval and the prices they actually represent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickRange {
    pub tick_lower: i32,
    pub tick_upper: i32,
    pub actual_price_lower: Decimal,
    pub actual_price_upper: Decimal,
}

/// Convert `[price_lower, price_upper]` into usable ticks
///
/// The lower pool-price bound rounds down and the upper rounds up, so the range
/// never narrows. A range that still collapses onto one tick fails with
/// [`PricingError::RoundingCollapse`].
pub fn tick_range_from_prices(
    price_lower: Decimal,
    price_upper: Decimal,
    scale: &PriceScale,
    tick_spacing: i32,
) -> PricingResult<TickRange> {
    TickMath::validate_spacing(tick_spacing)?;
    if price_lower <= Decimal::ZERO || price_lower >= price_upper {
        return Err(PricingError::InvalidRange(format!(
            "need 0 < lower < upper, got [{}, {}]",
            price_lower, price_upper
        )));
    }

    let first = scale.to_pool_price(price_lower)?;
    let second = scale.to_pool_price(price_upper)?;
    // quoting in asset B inverts the ordering
    let (pool_low, pool_high) = if first <= second {
        (first, second)
    } else {
        (second, first)
    };

    let tick_lower = TickMath::price_to_tick(&pool_low, tick_spacing, TickRounding::Floor)?;
    let tick_upper = TickMath::price_to_tick(&pool_high, tick_spacing, TickRounding::Ceil)?;
    if tick_lower >= tick_upper {
        return Err(PricingError::RoundingCollapse {
            tick_lower,
            tick_upper,
            tick_spacing,
        });
    }

    let human_at_lower = scale.to_human_price(&PoolPrice::at_tick(tick_lower)?)?;
    let human_at_upper = scale.to_human_price(&PoolPrice::at_tick(tick_upper)?)?;
    let (actual_price_lower, actual_price_upper) = if scale.base_is_asset_a {
        (human_at_lower, human_at_upper)
    } else {
        (human_at_upper, human_at_lower)
    };

    tracing::debug!(
        tick_lower,
        tick_upper,
        %actual_price_lower,
        %actual_price_upper,
        "resolved tick range"
    );

    Ok(TickRange {
        tick_lower,
        tick_upper,
        actual_price_lower,
        actual_price_upper,
    })
}
