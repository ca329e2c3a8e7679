//! Pool model as reported by the gateway
//!
//! Pools are read-only from the client's side and refreshed on every query.
//! Nothing in the workspace caches a [`Pool`] beyond the operation that fetched it.

use crate::common::amount::{self, Amount};
use crate::common::identifiers::{AssetId, PoolId};
use serde::{Deserialize, Serialize};

/// Pricing curve a pool follows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurveType {
    /// x*y=k over real reserves
    ConstantProduct,
    /// Tick-based concentrated liquidity
    Concentrated,
    /// Bonding curve over virtual reserves until graduation
    SingleSided,
}

/// Lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolStatus {
    /// Created but not yet funded
    Pending,
    Active,
    /// Single-sided pool that crossed its threshold and now trades as constant product
    Graduated,
    Inactive,
}

impl PoolStatus {
    pub fn is_tradable(self) -> bool {
        matches!(self, PoolStatus::Active | PoolStatus::Graduated)
    }
}

/// Fee schedule in basis points
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeRates {
    pub lp_fee_bps: u32,
    #[serde(default)]
    pub host_fee_bps: u32,
}

impl FeeRates {
    /// Combined rate charged on the input side of a swap
    pub fn total_bps(&self) -> u32 {
        self.lp_fee_bps.saturating_add(self.host_fee_bps)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pool {
    pub pool_id: PoolId,
    pub asset_a: AssetId,
    pub asset_b: AssetId,
    pub curve_type: CurveType,
    pub fee_rates: FeeRates,
    pub status: PoolStatus,
    /// Reserves as reported; virtual reserves for un-graduated single-sided pools
    #[serde(with = "amount", default)]
    pub reserve_a: Amount,
    #[serde(with = "amount", default)]
    pub reserve_b: Amount,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tick_spacing: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_tick: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_namespace: Option<String>,
}

impl Pool {
    pub fn is_tradable(&self) -> bool {
        self.status.is_tradable()
    }

    pub fn contains(&self, asset: &AssetId) -> bool {
        &self.asset_a == asset || &self.asset_b == asset
    }

    /// The counter-asset to `asset`, if the pool trades it
    pub fn other_asset(&self, asset: &AssetId) -> Option<&AssetId> {
        if &self.asset_a == asset {
            Some(&self.asset_b)
        } else if &self.asset_b == asset {
            Some(&self.asset_a)
        } else {
            None
        }
    }

    /// `(reserve_in, reserve_out)` for a swap that sells `asset_in`
    pub fn reserves_for(&self, asset_in: &AssetId) -> Option<(Amount, Amount)> {
        if &self.asset_a == asset_in {
            Some((self.reserve_a, self.reserve_b))
        } else if &self.asset_b == asset_in {
            Some((self.reserve_b, self.reserve_a))
        } else {
            None
        }
    }

    /// True when the pool trades exactly the given pair, in either order
    pub fn trades_pair(&self, a: &AssetId, b: &AssetId) -> bool {
        a != b && self.contains(a) && self.contains(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Pool {
        Pool {
            pool_id: PoolId::new("pool-1"),
            asset_a: AssetId::new("tok"),
            asset_b: AssetId::btc(),
            curve_type: CurveType::ConstantProduct,
            fee_rates: FeeRates {
                lp_fee_bps: 30,
                host_fee_bps: 10,
            },
            status: PoolStatus::Active,
            reserve_a: 1_000_000,
            reserve_b: 50_000,
            tick_spacing: None,
            current_tick: None,
            host_namespace: None,
        }
    }

    #[test]
    fn test_reserve_orientation() {
        let pool = sample();
        assert_eq!(pool.reserves_for(&AssetId::new("tok")), Some((1_000_000, 50_000)));
        assert_eq!(pool.reserves_for(&AssetId::btc()), Some((50_000, 1_000_000)));
        assert_eq!(pool.reserves_for(&AssetId::new("other")), None);
        assert_eq!(pool.fee_rates.total_bps(), 40);
    }

    #[test]
    fn test_status_tradability() {
        assert!(PoolStatus::Graduated.is_tradable());
        assert!(!PoolStatus::Pending.is_tradable());
        assert!(!PoolStatus::Inactive.is_tradable());
    }

    #[test]
    fn test_deserialize_gateway_shape() {
        let json = r#"{
            "poolId": "p",
            "assetA": "tok",
            "assetB": "btc",
            "curveType": "concentrated",
            "feeRates": {"lpFeeBps": 30},
            "status": "active",
            "reserveA": "100",
            "reserveB": 200,
            "tickSpacing": 60,
            "currentTick": -120
        }"#;
        let pool: Pool = serde_json::from_str(json).unwrap();
        assert_eq!(pool.curve_type, CurveType::Concentrated);
        assert_eq!(pool.reserve_b, 200);
        assert_eq!(pool.tick_spacing, Some(60));
        assert!(pool.trades_pair(&AssetId::btc(), &AssetId::new("tok")));
    }
}
