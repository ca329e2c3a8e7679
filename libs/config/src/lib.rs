//! # SatSwap Configuration
//!
//! Layered configuration for the SatSwap client: a TOML base file, an optional
//! per-environment overlay and `SATSWAP_` environment overrides, with production
//! defaults for every value.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use satswap_config::{load_config, RecoveryPolicy};
//! use std::path::Path;
//!
//! let config = load_config(Some(Path::new("config/satswap.toml")), None)?;
//! if config.execution.recovery_policy == RecoveryPolicy::ReverseSwap {
//!     // ...
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod service;
pub mod service_config;

// Re-export commonly used types
pub use service_config::{
    load_config, resolve_config_path, AuthConfig, ExecutionConfig, GatewayConfig, LoggingConfig,
    QuoteConfig, RecoveryPolicy, TraderConfig, DEFAULT_CONFIG_PATH,
};
