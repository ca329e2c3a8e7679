//! Concentrated-liquidity tick mathematics
//!
//! Prices are held exactly as Q64.96 square roots ([`PoolPrice`]) and
//! `sqrt(1.0001^tick)` is computed with the standard bit-decomposition of the tick,
//! so tick to price and back is exact for every valid tick.

use crate::big_math::ratio_to_decimal;
use crate::error::{PricingError, PricingResult};
use num_bigint::BigUint;
use num_traits::{One, Zero};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub const MIN_TICK: i32 = -887272;
pub const MAX_TICK: i32 = 887272;
/// `sqrt_ratio_at_tick(MIN_TICK)`
pub const MIN_SQRT_RATIO: u128 = 4295128739;
/// Largest tick spacing accepted by the gateway
pub const MAX_TICK_SPACING: i32 = 16384;

/// `2^128 / sqrt(1.0001^(2^i))` in Q128 for i = 0..=19
const RATIO_FACTORS: [u128; 20] = [
    0xfffcb933bd6fad37aa2d162d1a594001,
    0xfff97272373d413259a46990580e213a,
    0xfff2e50f5f656932ef12357cf3c7fdcc,
    0xffe5caca7e10e4e61c3624eaa0941cd0,
    0xffcb9843d60f6159c9db58835c926644,
    0xff973b41fa98c081472e6896dfb254c0,
    0xff2ea16466c96a3843ec78b326b52861,
    0xfe5dee046a99a2a811c461f1969c3053,
    0xfcbe86c7900a88aedcffc83b479aa3a4,
    0xf987a7253ac413176f2b074cf7815e54,
    0xf3392b0822b70005940c7a398e4b70f3,
    0xe7159475a2c29b7443b29c7fa6e889d9,
    0xd097f3bdfd2022b8845ad8f792aa5825,
    0xa9f746462d870fdf8a65dc1f90e061e5,
    0x70d869a156d2a1b890bb3df62baf32f7,
    0x31be135f97d08fd981231505542fcfa6,
    0x9aa508b5b7a84e1c677de54f3e99bc9,
    0x5d6af8dedb81196699c329225ee604,
    0x2216e584f5fa1ea926041bedfe98,
    0x48a170391f7dc42444e8fa2,
];

/// Direction used when snapping a raw tick onto the spacing grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TickRounding {
    /// Toward lower prices; used for lower bounds
    Floor,
    /// Toward higher prices; used for upper bounds
    Ceil,
}

/// Exact pool price: `(sqrt_price_x96 / 2^96)^2` units of asset B per unit of asset A
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PoolPrice {
    sqrt_price_x96: BigUint,
}

impl PoolPrice {
    pub fn from_sqrt_x96(sqrt_price_x96: BigUint) -> Self {
        Self { sqrt_price_x96 }
    }

    /// Price `numerator / denominator`, square root rounded down
    pub fn from_ratio(numerator: &BigUint, denominator: &BigUint) -> PricingResult<Self> {
        if numerator.is_zero() || denominator.is_zero() {
            return Err(PricingError::InvalidRange(
                "price must be strictly positive".to_string(),
            ));
        }
        let shifted: BigUint = numerator << 192u32;
        Ok(Self {
            sqrt_price_x96: (shifted / denominator).sqrt(),
        })
    }

    pub fn at_tick(tick: i32) -> PricingResult<Self> {
        Ok(Self {
            sqrt_price_x96: TickMath::sqrt_ratio_at_tick(tick)?,
        })
    }

    pub fn sqrt_price_x96(&self) -> &BigUint {
        &self.sqrt_price_x96
    }

    /// `(numerator, denominator)` of the exact price
    pub fn as_ratio(&self) -> (BigUint, BigUint) {
        (
            &self.sqrt_price_x96 * &self.sqrt_price_x96,
            BigUint::one() << 192u32,
        )
    }

    /// Display value of the raw smallest-unit ratio
    pub fn to_decimal(&self) -> PricingResult<Decimal> {
        let (num, den) = self.as_ratio();
        ratio_to_decimal(&num, &den)
    }
}

/// Tick math functions
pub struct TickMath;

impl TickMath {
    /// `sqrt(1.0001^tick) * 2^96`, rounded up
    pub fn sqrt_ratio_at_tick(tick: i32) -> PricingResult<BigUint> {
        if !(MIN_TICK..=MAX_TICK).contains(&tick) {
            return Err(PricingError::TickOutOfRange {
                tick,
                min: MIN_TICK,
                max: MAX_TICK,
            });
        }

        let abs_tick = tick.unsigned_abs();
        let mut ratio = if abs_tick & 1 != 0 {
            BigUint::from(RATIO_FACTORS[0])
        } else {
            BigUint::one() << 128u32
        };
        for (bit, factor) in RATIO_FACTORS.iter().enumerate().skip(1) {
            if abs_tick & (1u32 << bit) != 0 {
                ratio = (ratio * BigUint::from(*factor)) >> 128u32;
            }
        }

        if tick > 0 {
            let u256_max = (BigUint::one() << 256u32) - BigUint::one();
            ratio = u256_max / ratio;
        }

        // Q128.128 to Q64.96, rounding up so the result never understates the price
        let low_mask = (BigUint::one() << 32u32) - BigUint::one();
        let round_up = !(&ratio & &low_mask).is_zero();
        let mut sqrt = ratio >> 32u32;
        if round_up {
            sqrt += BigUint::one();
        }
        Ok(sqrt)
    }

    /// Largest raw tick whose sqrt price does not exceed `sqrt_price_x96`
    ///
    /// Prices below the `MIN_TICK` price or above the `MAX_TICK` price have no such
    /// tick and fail with [`PricingError::PriceOutOfRange`].
    pub fn tick_at_sqrt_ratio(sqrt_price_x96: &BigUint) -> PricingResult<i32> {
        if *sqrt_price_x96 < BigUint::from(MIN_SQRT_RATIO)
            || *sqrt_price_x96 > Self::sqrt_ratio_at_tick(MAX_TICK)?
        {
            return Err(PricingError::PriceOutOfRange);
        }
        let mut lo = MIN_TICK;
        let mut hi = MAX_TICK;
        while lo < hi {
            let mid = lo + (hi - lo + 1) / 2;
            if Self::sqrt_ratio_at_tick(mid)? <= *sqrt_price_x96 {
                lo = mid;
            } else {
                hi = mid - 1;
            }
        }
        Ok(lo)
    }

    pub fn tick_to_price(tick: i32) -> PricingResult<PoolPrice> {
        PoolPrice::at_tick(tick)
    }

    /// Usable tick for `price`: the raw floor tick snapped to a multiple of
    /// `tick_spacing` in the requested direction
    pub fn price_to_tick(
        price: &PoolPrice,
        tick_spacing: i32,
        rounding: TickRounding,
    ) -> PricingResult<i32> {
        Self::validate_spacing(tick_spacing)?;
        let raw = Self::tick_at_sqrt_ratio(price.sqrt_price_x96())?;
        Self::round_to_spacing(raw, tick_spacing, rounding)
    }

    /// Snap `tick` onto the spacing grid
    ///
    /// Fails with [`PricingError::PriceOutOfRange`] when the snapped tick falls
    /// outside the usable grid.
    pub fn round_to_spacing(tick: i32, tick_spacing: i32, rounding: TickRounding) -> PricingResult<i32> {
        let snapped = match rounding {
            TickRounding::Floor => tick.div_euclid(tick_spacing) * tick_spacing,
            TickRounding::Ceil => {
                if tick.rem_euclid(tick_spacing) == 0 {
                    tick
                } else {
                    (tick.div_euclid(tick_spacing) + 1) * tick_spacing
                }
            }
        };
        let (min_usable, max_usable) = Self::usable_bounds(tick_spacing);
        if !(min_usable..=max_usable).contains(&snapped) {
            return Err(PricingError::PriceOutOfRange);
        }
        Ok(snapped)
    }

    /// Outermost ticks that are multiples of `tick_spacing`
    pub fn usable_bounds(tick_spacing: i32) -> (i32, i32) {
        let max_usable = (MAX_TICK / tick_spacing) * tick_spacing;
        (-max_usable, max_usable)
    }

    pub fn validate_spacing(tick_spacing: i32) -> PricingResult<()> {
        if !(1..=MAX_TICK_SPACING).contains(&tick_spacing) {
            return Err(PricingError::InvalidTickSpacing(tick_spacing));
        }
        Ok(())
    }
}
