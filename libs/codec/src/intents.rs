//! Typed intent builders and the signable message envelope
//!
//! Builders cover the common case; [`IntentFields`] stays available for callers
//! that need to assemble a field map by hand.

use crate::encoder::encode;
use crate::error::EncodingResult;
use crate::kind::OperationKind;
use crate::nonce::Nonce;
use crate::value::IntentFields;
use serde::Serialize;
use types::{Amount, AssetId, PoolId, TransferId};

/// A typed payload that knows its operation kind
pub trait IntentPayload {
    const KIND: OperationKind;

    fn into_fields(self) -> IntentFields;
}

/// Encoded, nonce-tagged message ready for signing
///
/// Immutable once built. Re-signing after a failed submission means building a new
/// message with a fresh nonce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntentMessage {
    kind: OperationKind,
    nonce: Nonce,
    bytes: Vec<u8>,
}

impl IntentMessage {
    /// Encode `fields` under a freshly generated nonce
    pub fn build(kind: OperationKind, fields: &IntentFields) -> EncodingResult<Self> {
        Self::with_nonce(kind, fields, Nonce::generate())
    }

    pub fn with_nonce(kind: OperationKind, fields: &IntentFields, nonce: Nonce) -> EncodingResult<Self> {
        let bytes = encode(kind, fields, &nonce)?;
        tracing::debug!(kind = %kind, nonce = %nonce, len = bytes.len(), "encoded intent");
        Ok(Self { kind, nonce, bytes })
    }

    pub fn from_payload<P: IntentPayload>(payload: P) -> EncodingResult<Self> {
        Self::build(P::KIND, &payload.into_fields())
    }

    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    pub fn nonce(&self) -> &Nonce {
        &self.nonce
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Attach a signature produced over [`Self::as_bytes`]
    pub fn into_signed(self, public_key: impl Into<String>, signature: Vec<u8>) -> SignedIntent {
        SignedIntent {
            message: self,
            public_key: public_key.into(),
            signature,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedIntent {
    message: IntentMessage,
    public_key: String,
    signature: Vec<u8>,
}

/// JSON body posted to the gateway
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct IntentRequestBody {
    pub kind: OperationKind,
    /// Canonical message text exactly as signed
    pub intent: String,
    pub nonce: String,
    pub public_key: String,
    pub signature: String,
}

impl SignedIntent {
    pub fn kind(&self) -> OperationKind {
        self.message.kind
    }

    pub fn message(&self) -> &IntentMessage {
        &self.message
    }

    pub fn signature(&self) -> &[u8] {
        &self.signature
    }

    pub fn public_key(&self) -> &str {
        &self.public_key
    }

    pub fn to_request_body(&self) -> IntentRequestBody {
        IntentRequestBody {
            kind: self.message.kind,
            intent: String::from_utf8_lossy(&self.message.bytes).into_owned(),
            nonce: self.message.nonce.to_hex(),
            public_key: self.public_key.clone(),
            signature: hex::encode(&self.signature),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapIntent {
    pub pool_id: PoolId,
    pub asset_in: AssetId,
    pub asset_out: AssetId,
    pub amount_in: Amount,
    pub min_amount_out: Amount,
    pub max_slippage_bps: u32,
    pub integrator_fee_bps: u32,
    /// `None` spends from the gateway free balance
    pub input_transfer_id: Option<TransferId>,
}

impl IntentPayload for SwapIntent {
    const KIND: OperationKind = OperationKind::Swap;

    fn into_fields(self) -> IntentFields {
        IntentFields::new()
            .text("poolId", self.pool_id.into_inner())
            .text("assetIn", self.asset_in.into_inner())
            .text("assetOut", self.asset_out.into_inner())
            .amount("amountIn", self.amount_in)
            .amount("minAmountOut", self.min_amount_out)
            .integer("maxSlippageBps", self.max_slippage_bps as i64)
            .integer("integratorFeeBps", self.integrator_fee_bps as i64)
            .text_opt("inputTransferId", self.input_transfer_id.map(TransferId::into_inner))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddLiquidityIntent {
    pub pool_id: PoolId,
    pub amount_a: Amount,
    pub amount_b: Amount,
    pub min_liquidity: Amount,
    /// `(lower, upper)` for concentrated pools
    pub tick_range: Option<(i32, i32)>,
    pub transfer_id_a: Option<TransferId>,
    pub transfer_id_b: Option<TransferId>,
}

impl IntentPayload for AddLiquidityIntent {
    const KIND: OperationKind = OperationKind::AddLiquidity;

    fn into_fields(self) -> IntentFields {
        IntentFields::new()
            .text("poolId", self.pool_id.into_inner())
            .amount("amountA", self.amount_a)
            .amount("amountB", self.amount_b)
            .amount("minLiquidity", self.min_liquidity)
            .integer_opt("tickLower", self.tick_range.map(|(l, _)| l as i64))
            .integer_opt("tickUpper", self.tick_range.map(|(_, u)| u as i64))
            .text_opt("transferIdA", self.transfer_id_a.map(TransferId::into_inner))
            .text_opt("transferIdB", self.transfer_id_b.map(TransferId::into_inner))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveLiquidityIntent {
    pub pool_id: PoolId,
    pub liquidity: Amount,
    pub min_amount_a: Amount,
    pub min_amount_b: Amount,
    pub tick_range: Option<(i32, i32)>,
}

impl IntentPayload for RemoveLiquidityIntent {
    const KIND: OperationKind = OperationKind::RemoveLiquidity;

    fn into_fields(self) -> IntentFields {
        IntentFields::new()
            .text("poolId", self.pool_id.into_inner())
            .amount("liquidity", self.liquidity)
            .amount("minAmountA", self.min_amount_a)
            .amount("minAmountB", self.min_amount_b)
            .integer_opt("tickLower", self.tick_range.map(|(l, _)| l as i64))
            .integer_opt("tickUpper", self.tick_range.map(|(_, u)| u as i64))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateConstantProductPoolIntent {
    pub asset_a: AssetId,
    pub asset_b: AssetId,
    pub lp_fee_bps: u32,
    pub total_host_fee_bps: u32,
    pub host_namespace: Option<String>,
}

impl IntentPayload for CreateConstantProductPoolIntent {
    const KIND: OperationKind = OperationKind::CreateConstantProductPool;

    fn into_fields(self) -> IntentFields {
        IntentFields::new()
            .text("assetA", self.asset_a.into_inner())
            .text("assetB", self.asset_b.into_inner())
            .integer("lpFeeBps", self.lp_fee_bps as i64)
            .integer("totalHostFeeBps", self.total_host_fee_bps as i64)
            .text_opt("hostNamespace", self.host_namespace)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateSingleSidedPoolIntent {
    pub asset_a: AssetId,
    pub asset_b: AssetId,
    pub asset_a_amount: Amount,
    pub graduation_threshold_pct: u32,
    pub target_raise: Amount,
    pub virtual_reserve_a: Amount,
    pub virtual_reserve_b: Amount,
    pub lp_fee_bps: u32,
    pub total_host_fee_bps: u32,
    pub host_namespace: Option<String>,
}

impl IntentPayload for CreateSingleSidedPoolIntent {
    const KIND: OperationKind = OperationKind::CreateSingleSidedPool;

    fn into_fields(self) -> IntentFields {
        IntentFields::new()
            .text("assetA", self.asset_a.into_inner())
            .text("assetB", self.asset_b.into_inner())
            .amount("assetAAmount", self.asset_a_amount)
            .integer("graduationThresholdPct", self.graduation_threshold_pct as i64)
            .amount("targetRaise", self.target_raise)
            .amount("virtualReserveA", self.virtual_reserve_a)
            .amount("virtualReserveB", self.virtual_reserve_b)
            .integer("lpFeeBps", self.lp_fee_bps as i64)
            .integer("totalHostFeeBps", self.total_host_fee_bps as i64)
            .text_opt("hostNamespace", self.host_namespace)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateConcentratedPoolIntent {
    pub asset_a: AssetId,
    pub asset_b: AssetId,
    pub tick_spacing: i32,
    pub initial_tick: i32,
    pub lp_fee_bps: u32,
    pub total_host_fee_bps: u32,
    pub host_namespace: Option<String>,
}

impl IntentPayload for CreateConcentratedPoolIntent {
    const KIND: OperationKind = OperationKind::CreateConcentratedPool;

    fn into_fields(self) -> IntentFields {
        IntentFields::new()
            .text("assetA", self.asset_a.into_inner())
            .text("assetB", self.asset_b.into_inner())
            .integer("tickSpacing", self.tick_spacing as i64)
            .integer("initialTick", self.initial_tick as i64)
            .integer("lpFeeBps", self.lp_fee_bps as i64)
            .integer("totalHostFeeBps", self.total_host_fee_bps as i64)
            .text_opt("hostNamespace", self.host_namespace)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmInitialDepositIntent {
    pub pool_id: PoolId,
    pub asset_id: AssetId,
    pub amount: Amount,
    pub transfer_id: TransferId,
}

impl IntentPayload for ConfirmInitialDepositIntent {
    const KIND: OperationKind = OperationKind::ConfirmInitialDeposit;

    fn into_fields(self) -> IntentFields {
        IntentFields::new()
            .text("poolId", self.pool_id.into_inner())
            .text("assetId", self.asset_id.into_inner())
            .amount("amount", self.amount)
            .text("transferId", self.transfer_id.into_inner())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterHostIntent {
    pub namespace: String,
    pub min_fee_bps: u32,
    pub fee_recipient: Option<String>,
}

impl IntentPayload for RegisterHostIntent {
    const KIND: OperationKind = OperationKind::RegisterHost;

    fn into_fields(self) -> IntentFields {
        IntentFields::new()
            .text("namespace", self.namespace)
            .integer("minFeeBps", self.min_fee_bps as i64)
            .text_opt("feeRecipient", self.fee_recipient)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WithdrawHostFeesIntent {
    pub namespace: String,
    pub pool_id: Option<PoolId>,
    pub asset_a_amount: Amount,
    pub asset_b_amount: Amount,
}

impl IntentPayload for WithdrawHostFeesIntent {
    const KIND: OperationKind = OperationKind::WithdrawHostFees;

    fn into_fields(self) -> IntentFields {
        IntentFields::new()
            .text("namespace", self.namespace)
            .text_opt("poolId", self.pool_id.map(PoolId::into_inner))
            .amount("assetAAmount", self.asset_a_amount)
            .amount("assetBAmount", self.asset_b_amount)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WithdrawIntegratorFeesIntent {
    pub pool_id: Option<PoolId>,
    pub asset_a_amount: Amount,
    pub asset_b_amount: Amount,
}

impl IntentPayload for WithdrawIntegratorFeesIntent {
    const KIND: OperationKind = OperationKind::WithdrawIntegratorFees;

    fn into_fields(self) -> IntentFields {
        IntentFields::new()
            .text_opt("poolId", self.pool_id.map(PoolId::into_inner))
            .amount("assetAAmount", self.asset_a_amount)
            .amount("assetBAmount", self.asset_b_amount)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectFeesIntent {
    pub pool_id: PoolId,
    pub tick_lower: i32,
    pub tick_upper: i32,
}

impl IntentPayload for CollectFeesIntent {
    const KIND: OperationKind = OperationKind::CollectFees;

    fn into_fields(self) -> IntentFields {
        IntentFields::new()
            .text("poolId", self.pool_id.into_inner())
            .integer("tickLower", self.tick_lower as i64)
            .integer("tickUpper", self.tick_upper as i64)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClawbackIntent {
    pub pool_id: PoolId,
    pub transfer_id: TransferId,
}

impl IntentPayload for ClawbackIntent {
    const KIND: OperationKind = OperationKind::Clawback;

    fn into_fields(self) -> IntentFields {
        IntentFields::new()
            .text("poolId", self.pool_id.into_inner())
            .text("transferId", self.transfer_id.into_inner())
    }
}
