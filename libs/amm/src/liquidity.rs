//! Liquidity from deposit amounts and amounts from liquidity
//!
//! Asset A is token0 and asset B is token1: below the range a position holds only A,
//! above it only B. Deposits round against the depositor so the pool never
//! over-draws either asset. Removal previews round down.

use crate::big_math::{big, div_ceil, q96, to_amount};
use crate::error::{PricingError, PricingResult};
use crate::tick_math::{PoolPrice, TickMath};
use num_bigint::BigUint;
use num_traits::Zero;
use serde::{Deserialize, Serialize};
use types::Amount;

/// Outcome of sizing a deposit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidityQuote {
    pub liquidity: u128,
    pub amount_a_used: Amount,
    pub amount_b_used: Amount,
    pub refund_a: Amount,
    pub refund_b: Amount,
}

/// Liquidity math functions
pub struct LiquidityMath;

impl LiquidityMath {
    /// Largest liquidity whose deposit fits within `amount_a` and `amount_b`
    pub fn liquidity_from_amounts(
        current: &PoolPrice,
        tick_lower: i32,
        tick_upper: i32,
        amount_a: Amount,
        amount_b: Amount,
    ) -> PricingResult<LiquidityQuote> {
        let (sqrt_lower, sqrt_upper) = Self::range_bounds(tick_lower, tick_upper)?;
        let sqrt_current = current.sqrt_price_x96();

        let candidate = if *sqrt_current <= sqrt_lower {
            Self::liquidity_for_amount_a(&sqrt_lower, &sqrt_upper, amount_a)
        } else if *sqrt_current < sqrt_upper {
            let from_a = Self::liquidity_for_amount_a(sqrt_current, &sqrt_upper, amount_a);
            let from_b = Self::liquidity_for_amount_b(&sqrt_lower, sqrt_current, amount_b);
            from_a.min(from_b)
        } else {
            Self::liquidity_for_amount_b(&sqrt_lower, &sqrt_upper, amount_b)
        };

        let mut liquidity = to_amount(&candidate, "liquidity")?;
        loop {
            if liquidity == 0 {
                return Err(PricingError::ZeroLiquidity);
            }
            let (used_a, used_b) =
                Self::deposit_amounts(sqrt_current, &sqrt_lower, &sqrt_upper, liquidity)?;
            if used_a <= amount_a && used_b <= amount_b {
                return Ok(LiquidityQuote {
                    liquidity,
                    amount_a_used: used_a,
                    amount_b_used: used_b,
                    refund_a: amount_a - used_a,
                    refund_b: amount_b - used_b,
                });
            }
            // the up-rounded deposit must still fit the desired amounts
            liquidity -= 1;
        }
    }

    /// Amounts returned for burning `liquidity`, rounded down
    pub fn amounts_for_liquidity(
        current: &PoolPrice,
        tick_lower: i32,
        tick_upper: i32,
        liquidity: u128,
    ) -> PricingResult<(Amount, Amount)> {
        let (sqrt_lower, sqrt_upper) = Self::range_bounds(tick_lower, tick_upper)?;
        let sqrt_current = current.sqrt_price_x96();
        let liquidity = big(liquidity);

        let (a, b) = if *sqrt_current <= sqrt_lower {
            (Self::amount_a_delta(&sqrt_lower, &sqrt_upper, &liquidity, false), BigUint::zero())
        } else if *sqrt_current < sqrt_upper {
            (
                Self::amount_a_delta(sqrt_current, &sqrt_upper, &liquidity, false),
                Self::amount_b_delta(&sqrt_lower, sqrt_current, &liquidity, false),
            )
        } else {
            (BigUint::zero(), Self::amount_b_delta(&sqrt_lower, &sqrt_upper, &liquidity, false))
        };
        Ok((to_amount(&a, "amount_a")?, to_amount(&b, "amount_b")?))
    }

    fn range_bounds(tick_lower: i32, tick_upper: i32) -> PricingResult<(BigUint, BigUint)> {
        if tick_lower >= tick_upper {
            return Err(PricingError::InvalidRange(format!(
                "tick_lower {} must be below tick_upper {}",
                tick_lower, tick_upper
            )));
        }
        Ok((
            TickMath::sqrt_ratio_at_tick(tick_lower)?,
            TickMath::sqrt_ratio_at_tick(tick_upper)?,
        ))
    }

    /// `amount * (sa * sb / Q96) / (sb - sa)`
    fn liquidity_for_amount_a(sqrt_a: &BigUint, sqrt_b: &BigUint, amount: Amount) -> BigUint {
        let intermediate = (sqrt_a * sqrt_b) / q96();
        (big(amount) * intermediate) / (sqrt_b - sqrt_a)
    }

    /// `amount * Q96 / (sb - sa)`
    fn liquidity_for_amount_b(sqrt_a: &BigUint, sqrt_b: &BigUint, amount: Amount) -> BigUint {
        (big(amount) * q96()) / (sqrt_b - sqrt_a)
    }

    /// `L * Q96 * (sb - sa) / sb / sa`
    fn amount_a_delta(sqrt_a: &BigUint, sqrt_b: &BigUint, liquidity: &BigUint, round_up: bool) -> BigUint {
        let numerator = (liquidity << 96u32) * (sqrt_b - sqrt_a);
        if round_up {
            div_ceil(&div_ceil(&numerator, sqrt_b), sqrt_a)
        } else {
            numerator / sqrt_b / sqrt_a
        }
    }

    /// `L * (sb - sa) / Q96`
    fn amount_b_delta(sqrt_a: &BigUint, sqrt_b: &BigUint, liquidity: &BigUint, round_up: bool) -> BigUint {
        let numerator = liquidity * (sqrt_b - sqrt_a);
        if round_up {
            div_ceil(&numerator, &q96())
        } else {
            numerator / q96()
        }
    }

    fn deposit_amounts(
        sqrt_current: &BigUint,
        sqrt_lower: &BigUint,
        sqrt_upper: &BigUint,
        liquidity: u128,
    ) -> PricingResult<(Amount, Amount)> {
        let liquidity = big(liquidity);
        let (a, b) = if sqrt_current <= sqrt_lower {
            (Self::amount_a_delta(sqrt_lower, sqrt_upper, &liquidity, true), BigUint::zero())
        } else if sqrt_current < sqrt_upper {
            (
                Self::amount_a_delta(sqrt_current, sqrt_upper, &liquidity, true),
                Self::amount_b_delta(sqrt_lower, sqrt_current, &liquidity, true),
            )
        } else {
            (BigUint::zero(), Self::amount_b_delta(sqrt_lower, sqrt_upper, &liquidity, true))
        };
        Ok((to_amount(&a, "deposit amount_a")?, to_amount(&b, "deposit amount_b")?))
    }
}

/// True when `current` lies inside `[tick_lower, tick_upper)`
pub fn price_in_range(current: &PoolPrice, tick_lower: i32, tick_upper: i32) -> PricingResult<bool> {
    let lower = TickMath::sqrt_ratio_at_tick(tick_lower)?;
    let upper = TickMath::sqrt_ratio_at_tick(tick_upper)?;
    let sqrt = current.sqrt_price_x96();
    Ok(*sqrt >= lower && *sqrt < upper)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(tick: i32) -> PoolPrice {
        PoolPrice::at_tick(tick).unwrap()
    }

    #[test]
    fn test_in_range_deposit_never_overdraws() {
        let quote =
            LiquidityMath::liquidity_from_amounts(&at(0), -600, 600, 1_000_000, 1_000_000).unwrap();
        assert!(quote.liquidity > 0);
        assert!(quote.amount_a_used <= 1_000_000);
        assert!(quote.amount_b_used <= 1_000_000);
        assert_eq!(quote.amount_a_used + quote.refund_a, 1_000_000);
        assert_eq!(quote.amount_b_used + quote.refund_b, 1_000_000);
        // symmetric range at price 1 consumes both sides almost fully
        assert!(quote.refund_a <= 1 && quote.refund_b <= 1);
    }

    #[test]
    fn test_surplus_asset_is_refunded() {
        let quote =
            LiquidityMath::liquidity_from_amounts(&at(0), -600, 600, 1_000_000, 10_000_000).unwrap();
        assert!(quote.refund_b >= 8_999_000);
        assert!(quote.refund_a <= 1);
    }

    #[test]
    fn test_out_of_range_uses_single_asset() {
        let below = LiquidityMath::liquidity_from_amounts(&at(-1200), -600, 600, 5_000, 7_000).unwrap();
        assert_eq!(below.amount_b_used, 0);
        assert_eq!(below.refund_b, 7_000);
        assert!(below.amount_a_used <= 5_000);

        let above = LiquidityMath::liquidity_from_amounts(&at(1200), -600, 600, 5_000, 7_000).unwrap();
        assert_eq!(above.amount_a_used, 0);
        assert_eq!(above.refund_a, 5_000);
    }

    #[test]
    fn test_zero_liquidity_is_an_error() {
        assert_eq!(
            LiquidityMath::liquidity_from_amounts(&at(1200), -600, 600, 5_000, 0),
            Err(PricingError::ZeroLiquidity)
        );
        assert!(LiquidityMath::liquidity_from_amounts(&at(0), 600, -600, 1, 1).is_err());
    }

    #[test]
    fn test_removal_preview_rounds_down() {
        let quote =
            LiquidityMath::liquidity_from_amounts(&at(0), -600, 600, 1_000_000, 1_000_000).unwrap();
        let (a, b) = LiquidityMath::amounts_for_liquidity(&at(0), -600, 600, quote.liquidity).unwrap();
        assert!(a <= quote.amount_a_used && b <= quote.amount_b_used);
        assert!(quote.amount_a_used - a <= 1 && quote.amount_b_used - b <= 1);
    }

    #[test]
    fn test_price_in_range() {
        assert!(price_in_range(&at(0), -60, 60).unwrap());
        assert!(price_in_range(&at(-60), -60, 60).unwrap());
        assert!(!price_in_range(&at(60), -60, 60).unwrap());
    }
}
