//! # Canonical Intent Encoder
//!
//! ## Purpose
//!
//! Turns `(kind, fields, nonce)` into the exact bytes that get hashed and signed.
//! The output is a compact JSON object:
//!
//! ```text
//! {"kind":"swap","poolId":"p1","assetIn":"tok","assetOut":"btc","amountIn":"50000",...,"nonce":"9f0c..."}
//! ```
//!
//! - `kind` is always first and `nonce` always last
//! - remaining keys follow the operation schema, never insertion order
//! - amounts are decimal strings, bps/ticks are bare integers, floats never appear
//! - absent optional fields are omitted rather than written as `null`
//!
//! Identical inputs produce identical bytes on every platform.

use crate::error::{EncodingError, EncodingResult};
use crate::kind::{FieldSpec, FieldType, OperationKind};
use crate::nonce::Nonce;
use crate::value::{FieldValue, IntentFields};
use types::MAX_BPS;

/// Tick bounds shared with the pricing engine
pub const MIN_TICK: i64 = -887_272;
pub const MAX_TICK: i64 = 887_272;
/// Largest tick spacing the gateway accepts
pub const MAX_TICK_SPACING: i64 = 16_384;

/// Canonical bytes for a signable intent
pub fn encode(kind: OperationKind, fields: &IntentFields, nonce: &Nonce) -> EncodingResult<Vec<u8>> {
    encode_to_string(kind, fields, nonce).map(String::into_bytes)
}

/// [`encode`] as text
pub fn encode_to_string(
    kind: OperationKind,
    fields: &IntentFields,
    nonce: &Nonce,
) -> EncodingResult<String> {
    reject_unknown_fields(kind, fields)?;
    check_tick_pair(kind, fields)?;

    let mut out = String::with_capacity(64 + fields.len() * 32);
    out.push_str("{\"kind\":");
    push_json_str(&mut out, kind.as_str());

    for spec in kind.schema() {
        let value = match fields.get(spec.name) {
            Some(value) => value,
            None if spec.required => return Err(EncodingError::missing(kind.as_str(), spec.name)),
            None => continue,
        };
        validate(kind, spec, value)?;

        out.push(',');
        push_json_str(&mut out, spec.name);
        out.push(':');
        match value {
            FieldValue::Text(text) => push_json_str(&mut out, text),
            FieldValue::Amount(amount) => {
                out.push('"');
                out.push_str(&amount.to_string());
                out.push('"');
            }
            FieldValue::Integer(n) => out.push_str(&n.to_string()),
        }
    }

    out.push_str(",\"nonce\":\"");
    out.push_str(&nonce.to_hex());
    out.push_str("\"}");
    Ok(out)
}

fn push_json_str(out: &mut String, text: &str) {
    out.push_str(&serde_json::Value::String(text.to_string()).to_string());
}

fn reject_unknown_fields(kind: OperationKind, fields: &IntentFields) -> EncodingResult<()> {
    if let Some(unknown) = fields.names().find(|name| kind.field(name).is_none()) {
        let declared = kind
            .schema()
            .iter()
            .map(|spec| spec.name)
            .collect::<Vec<_>>()
            .join(", ");
        return Err(EncodingError::UnknownField {
            kind: kind.as_str(),
            field: unknown.to_string(),
            declared,
        });
    }
    Ok(())
}

fn check_tick_pair(kind: OperationKind, fields: &IntentFields) -> EncodingResult<()> {
    let lower = fields.get("tickLower");
    let upper = fields.get("tickUpper");
    match (lower, upper) {
        (None, None) => Ok(()),
        (Some(FieldValue::Integer(lower)), Some(FieldValue::Integer(upper))) => {
            if lower < upper {
                Ok(())
            } else {
                Err(EncodingError::InvalidTickPair {
                    kind: kind.as_str(),
                    detail: format!("tickLower {} must be below tickUpper {}", lower, upper),
                })
            }
        }
        // type mismatches are reported by per-field validation
        (Some(_), Some(_)) => Ok(()),
        _ => Err(EncodingError::InvalidTickPair {
            kind: kind.as_str(),
            detail: "tickLower and tickUpper must be supplied together".to_string(),
        }),
    }
}

fn validate(kind: OperationKind, spec: &FieldSpec, value: &FieldValue) -> EncodingResult<()> {
    let mismatch = || EncodingError::TypeMismatch {
        kind: kind.as_str(),
        field: spec.name.to_string(),
        expected: spec.ty.name(),
        got: value.type_name(),
    };

    match (spec.ty, value) {
        (FieldType::Identifier, FieldValue::Text(text)) => {
            if text.trim().is_empty() || text.chars().any(char::is_control) {
                return Err(EncodingError::out_of_range(
                    spec.name,
                    format!("{:?}", text),
                    "identifiers must be non-empty printable text",
                ));
            }
            Ok(())
        }
        (FieldType::Amount, FieldValue::Amount(amount)) => {
            if *amount == 0 {
                return Err(EncodingError::out_of_range(spec.name, amount, "must be greater than zero"));
            }
            Ok(())
        }
        (FieldType::AmountOrZero, FieldValue::Amount(_)) => Ok(()),
        (FieldType::Bps, FieldValue::Integer(n)) => {
            check_bounds(spec.name, *n, 0, MAX_BPS as i64, "bps")
        }
        (FieldType::Percent, FieldValue::Integer(n)) => check_bounds(spec.name, *n, 1, 100, "percent"),
        (FieldType::Tick, FieldValue::Integer(n)) => {
            check_bounds(spec.name, *n, MIN_TICK, MAX_TICK, "tick")
        }
        (FieldType::TickSpacing, FieldValue::Integer(n)) => {
            check_bounds(spec.name, *n, 1, MAX_TICK_SPACING, "tick spacing")
        }
        _ => Err(mismatch()),
    }
}

fn check_bounds(field: &str, value: i64, min: i64, max: i64, unit: &str) -> EncodingResult<()> {
    if value < min || value > max {
        return Err(EncodingError::out_of_range(
            field,
            value,
            format!("{}..={} {}", min, max, unit),
        ));
    }
    Ok(())
}
