//! Bonding-curve math for single-sided pools
//!
//! A single-sided pool is seeded with `initial_supply` of asset A and no real asset
//! B. It trades as a constant-product curve over virtual reserves `(vA, vB)` until
//! `pct`% of the supply has been sold for `target_raise` of B, then graduates.
//!
//! With `x = supply * pct / 100` and `d = 2x - supply`:
//!
//! ```text
//! vA = x^2 / d
//! vB = target_raise * (supply - x) / d
//! ```
//!
//! These satisfy `(vA - x)(vB + raise) = vA * vB`, and the marginal price at the
//! threshold equals `raise / (supply - x)`, the price the graduated pool opens at.
//! The solve needs `d > 0`, i.e. a threshold above 50%.
//!
//! Integer reserves keep the invariant exact rather than approximately: `vB` is
//! snapped to the nearest multiple of `raise / gcd(raise, x)`, and `vA` is then
//! `x * (vB + raise) / raise` with no remainder. Selling exactly `x` of A costs
//! exactly `raise` of B.

use crate::big_math::{big, div_ceil, ratio_to_decimal, to_amount};
use crate::error::{PricingError, PricingResult};
use num_bigint::BigUint;
use num_traits::{One, Zero};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use types::Amount;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VirtualReserves {
    pub virtual_reserve_a: Amount,
    pub virtual_reserve_b: Amount,
    /// Amount of A sold when exactly `target_raise` of B has been paid in
    pub threshold: Amount,
}

impl VirtualReserves {
    pub fn k(&self) -> BigUint {
        big(self.virtual_reserve_a) * big(self.virtual_reserve_b)
    }

    /// A received for paying `amount_b` into a fresh curve, rounded down
    pub fn sale_for_payment(&self, amount_b: Amount) -> PricingResult<Amount> {
        let k = self.k();
        let remaining_a = div_ceil(&k, &(big(self.virtual_reserve_b) + big(amount_b)));
        to_amount(&(big(self.virtual_reserve_a) - remaining_a), "sale amount")
    }

    /// B required to buy `amount_a` from a fresh curve, rounded up
    pub fn payment_for_sale(&self, amount_a: Amount) -> PricingResult<Amount> {
        if amount_a >= self.virtual_reserve_a {
            return Err(PricingError::InsufficientLiquidity(format!(
                "cannot buy {} of {} virtual",
                amount_a, self.virtual_reserve_a
            )));
        }
        let k = self.k();
        let new_b = div_ceil(&k, &big(self.virtual_reserve_a - amount_a));
        to_amount(&(new_b - big(self.virtual_reserve_b)), "payment amount")
    }

    /// Share of the threshold already sold, capped at 100
    pub fn graduation_progress_pct(&self, sold: Amount) -> PricingResult<Decimal> {
        if self.threshold == 0 {
            return Ok(Decimal::ONE_HUNDRED);
        }
        let pct = ratio_to_decimal(&(big(sold) * BigUint::from(100u32)), &big(self.threshold))?;
        Ok(pct.min(Decimal::ONE_HUNDRED))
    }
}

fn gcd(mut a: BigUint, mut b: BigUint) -> BigUint {
    while !b.is_zero() {
        let r = &a % &b;
        a = b;
        b = r;
    }
    a
}

/// Bonding curve functions
pub struct BondingCurve;

impl BondingCurve {
    /// Solve the virtual reserves for a single-sided pool
    pub fn calculate_virtual_reserves(
        initial_supply: Amount,
        graduation_threshold_pct: u32,
        target_raise: Amount,
    ) -> PricingResult<VirtualReserves> {
        if initial_supply == 0 || target_raise == 0 {
            return Err(PricingError::InvalidAmount(
                "initial supply and target raise must be positive".to_string(),
            ));
        }
        if graduation_threshold_pct <= 50 || graduation_threshold_pct >= 100 {
            return Err(PricingError::InvalidRange(format!(
                "graduation threshold must be between 51% and 99%, got {}%",
                graduation_threshold_pct
            )));
        }

        let supply = big(initial_supply);
        let sold: BigUint = &supply * BigUint::from(graduation_threshold_pct) / BigUint::from(100u32);
        let twice_sold = &sold * BigUint::from(2u32);
        if twice_sold <= supply || sold >= supply {
            return Err(PricingError::InvalidRange(format!(
                "supply {} too small for a {}% threshold",
                initial_supply, graduation_threshold_pct
            )));
        }
        let d = twice_sold - &supply;
        let raise = big(target_raise);

        // vA * raise = x * (vB + raise) must hold exactly
        let step = &raise / gcd(raise.clone(), sold.clone());
        let ideal_num = &raise * (&supply - &sold);
        let ideal_den = &d * &step;
        let multiple = (ideal_num * 2u32 + &ideal_den) / (ideal_den * 2u32);
        let virtual_b = step * multiple.max(BigUint::one());
        let virtual_a = &sold * (&virtual_b + &raise) / &raise;
        let threshold = sold;

        let reserves = VirtualReserves {
            virtual_reserve_a: to_amount(&virtual_a, "virtual_reserve_a")?,
            virtual_reserve_b: to_amount(&virtual_b, "virtual_reserve_b")?,
            threshold: to_amount(&threshold, "threshold")?,
        };
        tracing::debug!(
            initial_supply,
            graduation_threshold_pct,
            target_raise,
            virtual_reserve_a = reserves.virtual_reserve_a,
            virtual_reserve_b = reserves.virtual_reserve_b,
            threshold = reserves.threshold,
            "solved bonding curve"
        );
        Ok(reserves)
    }
}
