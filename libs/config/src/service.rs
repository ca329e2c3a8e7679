//! Default configuration values
//!
//! Production defaults for every configurable section. A config file only needs to
//! name what it changes.

/// Gateway transport defaults
pub mod gateway {
    pub const BASE_URL: &str = "https://gateway.satswap.example/v1";

    /// Per-request timeout (milliseconds)
    pub const REQUEST_TIMEOUT_MS: u64 = 15_000;

    pub const USER_AGENT: &str = concat!("satswap-client/", env!("CARGO_PKG_VERSION"));
}

/// Session defaults
pub mod auth {
    /// Refresh this long before the gateway-reported expiry (seconds)
    pub const EXPIRY_SKEW_SECS: u64 = 30;
}

/// Quote fan-out and read-retry defaults
pub mod quotes {
    /// Bound on each candidate's simulation (milliseconds)
    pub const TIMEOUT_MS: u64 = 3_000;

    /// Attempts for idempotent reads, including the first
    pub const MAX_READ_ATTEMPTS: u32 = 3;

    pub const BACKOFF_BASE_MS: u64 = 200;
    pub const BACKOFF_MAX_MS: u64 = 2_000;
}

/// Execution defaults
pub mod execution {
    pub const DEFAULT_SLIPPAGE_BPS: u32 = 100;
    pub const INTEGRATOR_FEE_BPS: u32 = 0;

    /// Balance polling cadence while waiting for a credit (milliseconds)
    pub const POLL_INTERVAL_MS: u64 = 1_000;

    /// Give up waiting for a credit after this long (milliseconds)
    pub const CONFIRMATION_DEADLINE_MS: u64 = 60_000;

    /// Lightning routing fee estimate as a share of the invoice
    pub const ROUTING_FEE_BPS: u32 = 50;

    /// Floor for the routing fee estimate (sats)
    pub const MIN_ROUTING_FEE_SATS: u64 = 5;
}
