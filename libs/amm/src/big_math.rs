//! Arbitrary-precision helpers shared by the pricing modules
//!
//! Intermediate products (`amount * sqrt_price`, `x^2`) routinely exceed 128 bits,
//! so they are computed as [`BigUint`] and narrowed back to [`Amount`] at the end.

use crate::error::{PricingError, PricingResult};
use num_bigint::BigUint;
use num_traits::{One, ToPrimitive, Zero};
use rust_decimal::Decimal;
use types::Amount;

/// Largest scale tried when rendering a ratio as `Decimal`
const DISPLAY_SCALE: u32 = 18;

pub(crate) fn big(value: Amount) -> BigUint {
    BigUint::from(value)
}

/// 2^96
pub(crate) fn q96() -> BigUint {
    BigUint::one() << 96u32
}

pub(crate) fn pow10(exp: u32) -> BigUint {
    BigUint::from(10u32).pow(exp)
}

/// `ceil(n / d)`; `d` must be non-zero
pub(crate) fn div_ceil(n: &BigUint, d: &BigUint) -> BigUint {
    let q = n / d;
    if (&q * d) == *n {
        q
    } else {
        q + BigUint::one()
    }
}

/// Narrow to [`Amount`], failing with `Overflow(context)`
pub(crate) fn to_amount(value: &BigUint, context: &'static str) -> PricingResult<Amount> {
    value.to_u128().ok_or(PricingError::Overflow(context))
}

/// Render `num / den` as a display `Decimal` with as many fractional digits as fit
pub(crate) fn ratio_to_decimal(num: &BigUint, den: &BigUint) -> PricingResult<Decimal> {
    if den.is_zero() {
        return Err(PricingError::InvalidRange("zero denominator".to_string()));
    }
    for scale in (0..=DISPLAY_SCALE).rev() {
        let scaled = (num * pow10(scale)) / den;
        if let Some(mantissa) = scaled.to_i128() {
            if let Ok(value) = Decimal::try_from_i128_with_scale(mantissa, scale) {
                return Ok(value.normalize());
            }
        }
    }
    Err(PricingError::Overflow("decimal display"))
}
