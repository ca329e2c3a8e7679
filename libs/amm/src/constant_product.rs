//! Constant-product (x*y=k) swap math in exact integers
//!
//! Fees are taken from the input before it reaches the curve. Outputs round down
//! and required inputs round up, so an estimate never promises more than the pool
//! would settle.

use crate::big_math::{big, div_ceil, ratio_to_decimal, to_amount};
use crate::error::{PricingError, PricingResult};
use num_bigint::BigUint;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use types::{Amount, AssetId, Pool, MAX_BPS};

/// Reserves oriented for one swap direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstantProductState {
    pub reserve_in: Amount,
    pub reserve_out: Amount,
    /// Total fee charged on the input, in bps
    pub fee_bps: u32,
}

/// Local estimate of a swap against a [`ConstantProductState`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapEstimate {
    pub amount_in: Amount,
    pub amount_out: Amount,
    pub fee_paid: Amount,
    /// Display only
    pub price_impact_pct: Decimal,
    /// Display only: output per unit input
    pub execution_price: Decimal,
}

impl ConstantProductState {
    pub fn new(reserve_in: Amount, reserve_out: Amount, fee_bps: u32) -> PricingResult<Self> {
        if reserve_in == 0 || reserve_out == 0 {
            return Err(PricingError::InsufficientLiquidity(
                "reserves must be positive".to_string(),
            ));
        }
        if fee_bps >= MAX_BPS {
            return Err(PricingError::InvalidAmount(format!(
                "fee {} bps leaves nothing to swap",
                fee_bps
            )));
        }
        Ok(Self {
            reserve_in,
            reserve_out,
            fee_bps,
        })
    }

    /// State for selling `asset_in` into `pool`, using the pool's reported reserves
    pub fn from_pool(pool: &Pool, asset_in: &AssetId) -> PricingResult<Self> {
        let (reserve_in, reserve_out) = pool.reserves_for(asset_in).ok_or_else(|| {
            PricingError::InvalidAmount(format!("asset {} not traded by pool {}", asset_in, pool.pool_id))
        })?;
        Self::new(reserve_in, reserve_out, pool.fee_rates.total_bps())
    }

    fn input_after_fee(&self, amount_in: Amount) -> BigUint {
        big(amount_in) * BigUint::from(MAX_BPS - self.fee_bps) / BigUint::from(MAX_BPS)
    }

    /// Output for an exact input, rounded down
    pub fn amount_out(&self, amount_in: Amount) -> PricingResult<Amount> {
        if amount_in == 0 {
            return Err(PricingError::InvalidAmount("input must be positive".to_string()));
        }
        let effective = self.input_after_fee(amount_in);
        let numerator = &effective * big(self.reserve_out);
        let denominator = big(self.reserve_in) + effective;
        to_amount(&(numerator / denominator), "amount_out")
    }

    /// Input needed to receive at least `amount_out`, rounded up
    pub fn amount_in_for(&self, amount_out: Amount) -> PricingResult<Amount> {
        if amount_out == 0 {
            return Err(PricingError::InvalidAmount("output must be positive".to_string()));
        }
        if amount_out >= self.reserve_out {
            return Err(PricingError::InsufficientLiquidity(format!(
                "requested {} but pool holds {}",
                amount_out, self.reserve_out
            )));
        }
        let effective = div_ceil(
            &(big(amount_out) * big(self.reserve_in)),
            &big(self.reserve_out - amount_out),
        );
        let gross = div_ceil(
            &(effective * BigUint::from(MAX_BPS)),
            &BigUint::from(MAX_BPS - self.fee_bps),
        );
        to_amount(&gross, "amount_in")
    }

    /// Full estimate including fee and display values
    pub fn quote(&self, amount_in: Amount) -> PricingResult<SwapEstimate> {
        let amount_out = self.amount_out(amount_in)?;
        let effective = self.input_after_fee(amount_in);
        let fee_paid = amount_in - to_amount(&effective, "input after fee")?;
        // impact = effective / (reserve_in + effective)
        let price_impact_pct = ratio_to_decimal(
            &(&effective * BigUint::from(100u32)),
            &(big(self.reserve_in) + &effective),
        )?;
        let execution_price = ratio_to_decimal(&big(amount_out), &big(amount_in))?;
        Ok(SwapEstimate {
            amount_in,
            amount_out,
            fee_paid,
            price_impact_pct,
            execution_price,
        })
    }

    /// Marginal output per unit input before fees
    pub fn spot_price(&self) -> PricingResult<Decimal> {
        ratio_to_decimal(&big(self.reserve_out), &big(self.reserve_in))
    }
}
