//! Pricing errors
//!
//! The pricing engine performs no I/O, so every failure here is an input problem
//! and retrying with the same arguments fails the same way.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PricingError {
    /// Bounds are non-positive, inverted or otherwise unusable
    #[error("Invalid range: {0}")]
    InvalidRange(String),

    /// Asset precision the scaling math does not support
    #[error("Invalid decimals {decimals}: maximum supported is {max}")]
    InvalidDecimals { decimals: u32, max: u32 },

    /// Lower and upper bound rounded onto the same usable tick
    #[error("Tick range collapsed after rounding to spacing {tick_spacing}: lower {tick_lower} >= upper {tick_upper}")]
    RoundingCollapse {
        tick_lower: i32,
        tick_upper: i32,
        tick_spacing: i32,
    },

    #[error("Invalid tick spacing {0}: must be between 1 and 16384")]
    InvalidTickSpacing(i32),

    #[error("Tick {tick} outside [{min}, {max}]")]
    TickOutOfRange { tick: i32, min: i32, max: i32 },

    /// Price below the smallest or above the largest representable tick price
    #[error("Price outside the representable tick range")]
    PriceOutOfRange,

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Result does not fit the 128-bit amount type or the display type
    #[error("Arithmetic overflow in {0}")]
    Overflow(&'static str),

    #[error("Insufficient liquidity: {0}")]
    InsufficientLiquidity(String),

    /// Desired amounts are too small to mint a single unit of liquidity
    #[error("Liquidity rounds to zero for the supplied amounts")]
    ZeroLiquidity,
}

pub type PricingResult<T> = std::result::Result<T, PricingError>;
