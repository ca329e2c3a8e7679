//! Gateway capability and its request/response shapes
//!
//! Every method receives the bearer token explicitly; token lifecycle belongs to
//! [`crate::SessionManager`], not to transports.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use codec::SignedIntent;
use serde::{Deserialize, Serialize};
use types::{
    common::amount, Acknowledgement, Amount, AssetId, CurveType, LiquidityExecution, Pool,
    PoolCreation, PoolId, PoolStatus, Quote, SwapExecution, WithdrawalExecution,
};

use crate::error::GatewayResult;

/// Challenge issued for a public key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Challenge {
    /// Text the wallet must sign
    pub challenge: String,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
    pub public_key: String,
    pub challenge: String,
    /// Hex-encoded signature over the challenge digest
    pub signature: String,
}

/// Session token granted after a successful verify
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionGrant {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Pool listing filter; unset fields do not constrain
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset: Option<AssetId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub curve_type: Option<CurveType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<PoolStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_namespace: Option<String>,
}

impl PoolFilter {
    /// Pools holding `asset` on either side
    pub fn with_asset(asset: AssetId) -> Self {
        Self {
            asset: Some(asset),
            ..Default::default()
        }
    }

    pub fn matches(&self, pool: &Pool) -> bool {
        self.asset.as_ref().map_or(true, |asset| pool.contains(asset))
            && self.curve_type.map_or(true, |curve| pool.curve_type == curve)
            && self.status.map_or(true, |status| pool.status == status)
            && self
                .host_namespace
                .as_ref()
                .map_or(true, |ns| pool.host_namespace.as_ref() == Some(ns))
    }
}

/// Simulate-only swap against one pool; never moves funds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulateSwapRequest {
    pub pool_id: PoolId,
    pub asset_in: AssetId,
    #[serde(with = "amount")]
    pub amount_in: Amount,
}

/// Operations the client needs from the gateway
///
/// Submissions echo `accepted`; a rejection is a successful call returning a result
/// whose `rejection` is set.
#[async_trait]
pub trait Gateway: Send + Sync {
    async fn challenge(&self, public_key: &str) -> GatewayResult<Challenge>;

    async fn verify(&self, request: &VerifyRequest) -> GatewayResult<SessionGrant>;

    async fn list_pools(&self, token: &str, filter: &PoolFilter) -> GatewayResult<Vec<Pool>>;

    async fn get_pool(&self, token: &str, pool_id: &PoolId) -> GatewayResult<Pool>;

    /// Idempotent read: the same request against the same pool state gives the same quote
    async fn simulate_swap(&self, token: &str, request: &SimulateSwapRequest) -> GatewayResult<Quote>;

    async fn swap(&self, token: &str, intent: &SignedIntent) -> GatewayResult<SwapExecution>;

    async fn add_liquidity(&self, token: &str, intent: &SignedIntent) -> GatewayResult<LiquidityExecution>;

    async fn remove_liquidity(&self, token: &str, intent: &SignedIntent) -> GatewayResult<WithdrawalExecution>;

    async fn collect_fees(&self, token: &str, intent: &SignedIntent) -> GatewayResult<WithdrawalExecution>;

    async fn create_constant_product_pool(&self, token: &str, intent: &SignedIntent) -> GatewayResult<PoolCreation>;

    async fn create_single_sided_pool(&self, token: &str, intent: &SignedIntent) -> GatewayResult<PoolCreation>;

    async fn create_concentrated_pool(&self, token: &str, intent: &SignedIntent) -> GatewayResult<PoolCreation>;

    async fn confirm_initial_deposit(&self, token: &str, intent: &SignedIntent) -> GatewayResult<Acknowledgement>;

    async fn register_host(&self, token: &str, intent: &SignedIntent) -> GatewayResult<Acknowledgement>;

    async fn withdraw_host_fees(&self, token: &str, intent: &SignedIntent) -> GatewayResult<WithdrawalExecution>;

    async fn withdraw_integrator_fees(&self, token: &str, intent: &SignedIntent) -> GatewayResult<WithdrawalExecution>;

    /// Recover a transfer sent to a pool whose intent did not execute
    async fn clawback(&self, token: &str, intent: &SignedIntent) -> GatewayResult<Acknowledgement>;
}
