//! Common building blocks: identifiers, amount serialization and validation errors

pub mod amount;
pub mod errors;
pub mod identifiers;

use errors::ValidationError;

/// Basis-point denominator; fee and slippage rates may never exceed it
pub const MAX_BPS: u32 = 10_000;

/// Reject basis-point values above [`MAX_BPS`]
pub fn validate_bps(field: &'static str, value: u32) -> Result<u32, ValidationError> {
    if value > MAX_BPS {
        return Err(ValidationError::BpsOutOfRange {
            field,
            value,
            max: MAX_BPS,
        });
    }
    Ok(value)
}

/// Reject zero where a positive amount is required
pub fn validate_positive(field: &'static str, value: amount::Amount) -> Result<amount::Amount, ValidationError> {
    if value == 0 {
        return Err(ValidationError::NonPositiveAmount { field });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bps_bounds() {
        assert_eq!(validate_bps("fee", 0).unwrap(), 0);
        assert_eq!(validate_bps("fee", MAX_BPS).unwrap(), MAX_BPS);
        assert!(matches!(
            validate_bps("fee", MAX_BPS + 1),
            Err(ValidationError::BpsOutOfRange { value: 10_001, .. })
        ));
    }

    #[test]
    fn test_positive_amount() {
        assert!(validate_positive("amountIn", 0).is_err());
        assert_eq!(validate_positive("amountIn", 7).unwrap(), 7);
    }
}
