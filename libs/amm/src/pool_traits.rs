//! Pool trait definitions for local swap estimation

use crate::constant_product::ConstantProductState;
use crate::error::PricingResult;
use types::{Amount, CurveType, Pool};

/// Unified interface over curves the client can estimate locally
pub trait SwapCurve {
    /// Output for given input, rounded down
    fn get_amount_out(&self, amount_in: Amount) -> PricingResult<Amount>;

    /// Input required for a desired output, rounded up
    fn get_amount_in(&self, amount_out: Amount) -> PricingResult<Amount>;

    /// `(reserve_in, reserve_out)` the estimate runs against
    fn get_reserves(&self) -> (Amount, Amount);

    fn get_fee_bps(&self) -> u32;
}

impl SwapCurve for ConstantProductState {
    fn get_amount_out(&self, amount_in: Amount) -> PricingResult<Amount> {
        self.amount_out(amount_in)
    }

    fn get_amount_in(&self, amount_out: Amount) -> PricingResult<Amount> {
        self.amount_in_for(amount_out)
    }

    fn get_reserves(&self) -> (Amount, Amount) {
        (self.reserve_in, self.reserve_out)
    }

    fn get_fee_bps(&self) -> u32 {
        self.fee_bps
    }
}

/// Whether local reserve math applies to `pool`
///
/// Constant-product pools and single-sided pools (whose reported reserves are the
/// virtual ones) follow x*y=k. Concentrated pools need tick-crossing state the
/// gateway does not expose, so they are always simulated remotely.
pub fn supports_local_estimate(pool: &Pool) -> bool {
    matches!(pool.curve_type, CurveType::ConstantProduct | CurveType::SingleSided)
}
