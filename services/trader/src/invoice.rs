//! BOLT11 invoice amount extraction
//!
//! Only the human-readable part is read: `ln` + currency prefix + optional amount
//! with a multiplier. Signature and tagged fields are the wallet's business.

use types::{Amount, ValidationError};

/// Currency prefixes, longest first so `bcrt` wins over `bc`
const CURRENCY_PREFIXES: [&str; 5] = ["bcrt", "bc", "tbs", "tb", "sb"];

const MSAT_PER_SAT: Amount = 1_000;

fn invalid(reason: impl Into<String>) -> ValidationError {
    ValidationError::InvalidInvoice {
        reason: reason.into(),
    }
}

/// Invoice amount in sats, or `None` for a zero-amount invoice
///
/// Sub-satoshi amounts round up to the next whole sat.
pub fn invoice_amount_sats(invoice: &str) -> Result<Option<Amount>, ValidationError> {
    let invoice = invoice.trim().to_ascii_lowercase();
    let invoice = invoice.strip_prefix("lightning:").unwrap_or(&invoice);

    let separator = invoice
        .rfind('1')
        .ok_or_else(|| invalid("missing bech32 separator"))?;
    let hrp = &invoice[..separator];
    let rest = hrp
        .strip_prefix("ln")
        .ok_or_else(|| invalid("human-readable part must start with 'ln'"))?;
    let amount = CURRENCY_PREFIXES
        .iter()
        .find_map(|prefix| rest.strip_prefix(prefix))
        .ok_or_else(|| invalid(format!("unknown currency in '{}'", hrp)))?;

    if amount.is_empty() {
        return Ok(None);
    }

    let (digits, multiplier) = match amount.char_indices().last() {
        Some((idx, c)) if c.is_ascii_alphabetic() => (&amount[..idx], Some(c)),
        _ => (amount, None),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) || digits.starts_with('0') {
        return Err(invalid(format!("malformed amount '{}'", amount)));
    }
    let value: Amount = digits
        .parse()
        .map_err(|_| invalid(format!("amount '{}' out of range", digits)))?;

    let msat = match multiplier {
        None => value.checked_mul(100_000_000_000),
        Some('m') => value.checked_mul(100_000_000),
        Some('u') => value.checked_mul(100_000),
        Some('n') => value.checked_mul(100),
        Some('p') => {
            if value % 10 != 0 {
                return Err(invalid("pico-btc amount must be a multiple of 10"));
            }
            Some(value / 10)
        }
        Some(other) => return Err(invalid(format!("unknown multiplier '{}'", other))),
    }
    .ok_or_else(|| invalid("amount overflows"))?;

    Ok(Some((msat + MSAT_PER_SAT - 1) / MSAT_PER_SAT))
}
