//! # Operation Kind Registry
//!
//! ## Purpose
//!
//! Static schema for every signable operation. The schema, not the caller's
//! insertion order, fixes the order fields appear in the canonical encoding, so two
//! clients building the same intent always sign the same bytes.
//!
//! ## Architecture Role
//!
//! ```text
//! Typed builders → [OperationKind::schema()] → encoder → signer
//!   SwapIntent        field order + types        bytes     digest
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Declared type of a schema field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// Non-empty identifier text (pool id, asset id, transfer id, namespace)
    Identifier,
    /// Strictly positive smallest-unit amount
    Amount,
    /// Non-negative smallest-unit amount
    AmountOrZero,
    /// Basis points, `0..=10000`
    Bps,
    /// Percentage, `1..=100`
    Percent,
    /// Tick index within `[-887272, 887272]`
    Tick,
    /// Positive tick spacing, at most 16384
    TickSpacing,
}

impl FieldType {
    pub fn name(self) -> &'static str {
        match self {
            FieldType::Identifier => "identifier",
            FieldType::Amount => "positive amount",
            FieldType::AmountOrZero => "amount",
            FieldType::Bps => "basis points",
            FieldType::Percent => "percentage",
            FieldType::Tick => "tick",
            FieldType::TickSpacing => "tick spacing",
        }
    }
}

/// One field of an operation schema
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub ty: FieldType,
    pub required: bool,
}

const fn req(name: &'static str, ty: FieldType) -> FieldSpec {
    FieldSpec {
        name,
        ty,
        required: true,
    }
}

const fn opt(name: &'static str, ty: FieldType) -> FieldSpec {
    FieldSpec {
        name,
        ty,
        required: false,
    }
}

use FieldType::*;

const SWAP: &[FieldSpec] = &[
    req("poolId", Identifier),
    req("assetIn", Identifier),
    req("assetOut", Identifier),
    req("amountIn", Amount),
    req("minAmountOut", AmountOrZero),
    req("maxSlippageBps", Bps),
    req("integratorFeeBps", Bps),
    // absent means the swap draws from the gateway free balance
    opt("inputTransferId", Identifier),
];

const ADD_LIQUIDITY: &[FieldSpec] = &[
    req("poolId", Identifier),
    req("amountA", AmountOrZero),
    req("amountB", AmountOrZero),
    req("minLiquidity", AmountOrZero),
    opt("tickLower", Tick),
    opt("tickUpper", Tick),
    opt("transferIdA", Identifier),
    opt("transferIdB", Identifier),
];

const REMOVE_LIQUIDITY: &[FieldSpec] = &[
    req("poolId", Identifier),
    req("liquidity", Amount),
    req("minAmountA", AmountOrZero),
    req("minAmountB", AmountOrZero),
    opt("tickLower", Tick),
    opt("tickUpper", Tick),
];

const CREATE_CONSTANT_PRODUCT_POOL: &[FieldSpec] = &[
    req("assetA", Identifier),
    req("assetB", Identifier),
    req("lpFeeBps", Bps),
    req("totalHostFeeBps", Bps),
    opt("hostNamespace", Identifier),
];

const CREATE_SINGLE_SIDED_POOL: &[FieldSpec] = &[
    req("assetA", Identifier),
    req("assetB", Identifier),
    req("assetAAmount", Amount),
    req("graduationThresholdPct", Percent),
    req("targetRaise", Amount),
    req("virtualReserveA", Amount),
    req("virtualReserveB", Amount),
    req("lpFeeBps", Bps),
    req("totalHostFeeBps", Bps),
    opt("hostNamespace", Identifier),
];

const CREATE_CONCENTRATED_POOL: &[FieldSpec] = &[
    req("assetA", Identifier),
    req("assetB", Identifier),
    req("tickSpacing", TickSpacing),
    req("initialTick", Tick),
    req("lpFeeBps", Bps),
    req("totalHostFeeBps", Bps),
    opt("hostNamespace", Identifier),
];

const CONFIRM_INITIAL_DEPOSIT: &[FieldSpec] = &[
    req("poolId", Identifier),
    req("assetId", Identifier),
    req("amount", Amount),
    req("transferId", Identifier),
];

const REGISTER_HOST: &[FieldSpec] = &[
    req("namespace", Identifier),
    req("minFeeBps", Bps),
    opt("feeRecipient", Identifier),
];

const WITHDRAW_HOST_FEES: &[FieldSpec] = &[
    req("namespace", Identifier),
    opt("poolId", Identifier),
    req("assetAAmount", AmountOrZero),
    req("assetBAmount", AmountOrZero),
];

const WITHDRAW_INTEGRATOR_FEES: &[FieldSpec] = &[
    opt("poolId", Identifier),
    req("assetAAmount", AmountOrZero),
    req("assetBAmount", AmountOrZero),
];

const COLLECT_FEES: &[FieldSpec] = &[
    req("poolId", Identifier),
    req("tickLower", Tick),
    req("tickUpper", Tick),
];

const CLAWBACK: &[FieldSpec] = &[req("poolId", Identifier), req("transferId", Identifier)];

/// Every operation the gateway accepts as a signed intent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Swap,
    AddLiquidity,
    RemoveLiquidity,
    CreateConstantProductPool,
    CreateSingleSidedPool,
    CreateConcentratedPool,
    ConfirmInitialDeposit,
    RegisterHost,
    WithdrawHostFees,
    WithdrawIntegratorFees,
    CollectFees,
    Clawback,
}

impl OperationKind {
    pub const ALL: [OperationKind; 12] = [
        OperationKind::Swap,
        OperationKind::AddLiquidity,
        OperationKind::RemoveLiquidity,
        OperationKind::CreateConstantProductPool,
        OperationKind::CreateSingleSidedPool,
        OperationKind::CreateConcentratedPool,
        OperationKind::ConfirmInitialDeposit,
        OperationKind::RegisterHost,
        OperationKind::WithdrawHostFees,
        OperationKind::WithdrawIntegratorFees,
        OperationKind::CollectFees,
        OperationKind::Clawback,
    ];

    /// Wire name, also the first key of the canonical encoding
    pub fn as_str(self) -> &'static str {
        match self {
            OperationKind::Swap => "swap",
            OperationKind::AddLiquidity => "add_liquidity",
            OperationKind::RemoveLiquidity => "remove_liquidity",
            OperationKind::CreateConstantProductPool => "create_constant_product_pool",
            OperationKind::CreateSingleSidedPool => "create_single_sided_pool",
            OperationKind::CreateConcentratedPool => "create_concentrated_pool",
            OperationKind::ConfirmInitialDeposit => "confirm_initial_deposit",
            OperationKind::RegisterHost => "register_host",
            OperationKind::WithdrawHostFees => "withdraw_host_fees",
            OperationKind::WithdrawIntegratorFees => "withdraw_integrator_fees",
            OperationKind::CollectFees => "collect_fees",
            OperationKind::Clawback => "clawback",
        }
    }

    /// Fields in canonical order
    pub fn schema(self) -> &'static [FieldSpec] {
        match self {
            OperationKind::Swap => SWAP,
            OperationKind::AddLiquidity => ADD_LIQUIDITY,
            OperationKind::RemoveLiquidity => REMOVE_LIQUIDITY,
            OperationKind::CreateConstantProductPool => CREATE_CONSTANT_PRODUCT_POOL,
            OperationKind::CreateSingleSidedPool => CREATE_SINGLE_SIDED_POOL,
            OperationKind::CreateConcentratedPool => CREATE_CONCENTRATED_POOL,
            OperationKind::ConfirmInitialDeposit => CONFIRM_INITIAL_DEPOSIT,
            OperationKind::RegisterHost => REGISTER_HOST,
            OperationKind::WithdrawHostFees => WITHDRAW_HOST_FEES,
            OperationKind::WithdrawIntegratorFees => WITHDRAW_INTEGRATOR_FEES,
            OperationKind::CollectFees => COLLECT_FEES,
            OperationKind::Clawback => CLAWBACK,
        }
    }

    pub fn field(self, name: &str) -> Option<&'static FieldSpec> {
        self.schema().iter().find(|spec| spec.name == name)
    }

    /// Gateway path segment the signed intent is posted to
    pub fn endpoint(self) -> &'static str {
        match self {
            OperationKind::Swap => "swap",
            OperationKind::AddLiquidity => "liquidity/add",
            OperationKind::RemoveLiquidity => "liquidity/remove",
            OperationKind::CreateConstantProductPool => "pools/constant-product",
            OperationKind::CreateSingleSidedPool => "pools/single-sided",
            OperationKind::CreateConcentratedPool => "pools/concentrated",
            OperationKind::ConfirmInitialDeposit => "pools/confirm-initial-deposit",
            OperationKind::RegisterHost => "hosts/register",
            OperationKind::WithdrawHostFees => "hosts/withdraw-fees",
            OperationKind::WithdrawIntegratorFees => "integrators/withdraw-fees",
            OperationKind::CollectFees => "liquidity/collect-fees",
            OperationKind::Clawback => "clawback",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_schemas_have_unique_field_names() {
        for kind in OperationKind::ALL {
            let names: HashSet<_> = kind.schema().iter().map(|f| f.name).collect();
            assert_eq!(names.len(), kind.schema().len(), "duplicate field in {}", kind);
            assert!(!names.contains("kind") && !names.contains("nonce"));
        }
    }

    #[test]
    fn test_wire_names_are_distinct() {
        let names: HashSet<_> = OperationKind::ALL.iter().map(|k| k.as_str()).collect();
        assert_eq!(names.len(), OperationKind::ALL.len());
        assert_eq!(
            serde_json::to_string(&OperationKind::CreateSingleSidedPool).unwrap(),
            "\"create_single_sided_pool\""
        );
    }

    #[test]
    fn test_field_lookup() {
        let spec = OperationKind::Swap.field("amountIn").unwrap();
        assert_eq!(spec.ty, FieldType::Amount);
        assert!(spec.required);
        assert!(!OperationKind::Swap.field("inputTransferId").unwrap().required);
        assert!(OperationKind::Swap.field("tickLower").is_none());
    }
}
