//! Typed results of intent submissions
//!
//! A gateway rejection (`accepted = false`) is a normal business result. It travels
//! inside these structs as a [`Rejection`] and is never turned into an error by this
//! crate.

use crate::common::amount::{self, Amount};
use crate::common::identifiers::{PoolId, TransferId};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Machine-readable rejection reason
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RejectionCode {
    SlippageExceeded,
    PoolInactive,
    InsufficientLiquidity,
    InsufficientBalance,
    InvalidNonce,
    InvalidSignature,
    /// Any code this client does not know yet, kept verbatim
    Other(String),
}

impl RejectionCode {
    pub fn as_str(&self) -> &str {
        match self {
            RejectionCode::SlippageExceeded => "SLIPPAGE_EXCEEDED",
            RejectionCode::PoolInactive => "POOL_INACTIVE",
            RejectionCode::InsufficientLiquidity => "INSUFFICIENT_LIQUIDITY",
            RejectionCode::InsufficientBalance => "INSUFFICIENT_BALANCE",
            RejectionCode::InvalidNonce => "INVALID_NONCE",
            RejectionCode::InvalidSignature => "INVALID_SIGNATURE",
            RejectionCode::Other(code) => code,
        }
    }

    pub fn parse(code: &str) -> Self {
        match code.to_ascii_uppercase().as_str() {
            "SLIPPAGE_EXCEEDED" => RejectionCode::SlippageExceeded,
            "POOL_INACTIVE" => RejectionCode::PoolInactive,
            "INSUFFICIENT_LIQUIDITY" => RejectionCode::InsufficientLiquidity,
            "INSUFFICIENT_BALANCE" => RejectionCode::InsufficientBalance,
            "INVALID_NONCE" => RejectionCode::InvalidNonce,
            "INVALID_SIGNATURE" => RejectionCode::InvalidSignature,
            _ => RejectionCode::Other(code.to_string()),
        }
    }
}

impl fmt::Display for RejectionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for RejectionCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RejectionCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = String::deserialize(deserializer)?;
        Ok(RejectionCode::parse(&code))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rejection {
    pub code: RejectionCode,
    #[serde(default)]
    pub message: String,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// Common view over every submission result
pub trait Outcome {
    fn accepted(&self) -> bool;
    fn rejection(&self) -> Option<&Rejection>;

    /// Rejection code, or `None` when accepted
    fn rejection_code(&self) -> Option<&RejectionCode> {
        self.rejection().map(|r| &r.code)
    }
}

macro_rules! impl_outcome {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Outcome for $ty {
                fn accepted(&self) -> bool {
                    self.accepted
                }

                fn rejection(&self) -> Option<&Rejection> {
                    self.rejection.as_ref()
                }
            }
        )*
    };
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapExecution {
    pub accepted: bool,
    #[serde(with = "amount", default)]
    pub amount_in: Amount,
    #[serde(with = "amount", default)]
    pub amount_out: Amount,
    #[serde(with = "amount", default)]
    pub fee_paid: Amount,
    /// Transfer the gateway made to pay out `amount_out`
    #[serde(default)]
    pub outbound_transfer_id: Option<TransferId>,
    #[serde(default)]
    pub rejection: Option<Rejection>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiquidityExecution {
    pub accepted: bool,
    #[serde(with = "amount", default)]
    pub amount_a_used: Amount,
    #[serde(with = "amount", default)]
    pub amount_b_used: Amount,
    #[serde(with = "amount", default)]
    pub refund_a: Amount,
    #[serde(with = "amount", default)]
    pub refund_b: Amount,
    /// Liquidity or LP shares minted
    #[serde(with = "amount", default)]
    pub liquidity: Amount,
    #[serde(default)]
    pub rejection: Option<Rejection>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalExecution {
    pub accepted: bool,
    #[serde(with = "amount", default)]
    pub amount_a: Amount,
    #[serde(with = "amount", default)]
    pub amount_b: Amount,
    #[serde(default)]
    pub outbound_transfer_ids: Vec<TransferId>,
    #[serde(default)]
    pub rejection: Option<Rejection>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolCreation {
    pub accepted: bool,
    #[serde(default)]
    pub pool_id: Option<PoolId>,
    #[serde(default)]
    pub rejection: Option<Rejection>,
}

/// Result of operations that carry no payload beyond acceptance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Acknowledgement {
    pub accepted: bool,
    #[serde(default)]
    pub rejection: Option<Rejection>,
}

impl_outcome!(
    SwapExecution,
    LiquidityExecution,
    WithdrawalExecution,
    PoolCreation,
    Acknowledgement,
);
