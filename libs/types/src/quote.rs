//! Swap requests and quotes
//!
//! A [`Quote`] is ephemeral: it describes one simulation against one pool state and
//! is never persisted. Anything that needs a current answer re-simulates.

use crate::common::amount::{self, Amount};
use crate::common::identifiers::{AssetId, PoolId};
use crate::common::MAX_BPS;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Exact-input swap description used for simulation and selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapRequest {
    pub asset_in: AssetId,
    pub asset_out: AssetId,
    #[serde(with = "amount")]
    pub amount_in: Amount,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub pool_id: PoolId,
    #[serde(with = "amount")]
    pub amount_in: Amount,
    /// Output after fees
    #[serde(with = "amount")]
    pub amount_out: Amount,
    #[serde(with = "amount")]
    pub fee_paid: Amount,
    /// Display only
    pub price_impact_pct: Decimal,
    /// Display only: output units per input unit
    pub execution_price: Decimal,
}

impl Quote {
    /// Output floor after applying a slippage tolerance, rounded down
    pub fn slippage_floor(&self, max_slippage_bps: u32) -> Amount {
        let bps = max_slippage_bps.min(MAX_BPS) as Amount;
        // amount_out * (10000 - bps) cannot overflow for amounts below 2^114
        match self.amount_out.checked_mul(MAX_BPS as Amount - bps) {
            Some(scaled) => scaled / MAX_BPS as Amount,
            None => self.amount_out / MAX_BPS as Amount * (MAX_BPS as Amount - bps),
        }
    }
}
