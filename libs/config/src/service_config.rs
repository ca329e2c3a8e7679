//! Trader Configuration Module
//!
//! Loads [`TraderConfig`] from a TOML file, an optional per-environment overlay and
//! `SATSWAP_` environment variables, in that order of precedence (later wins).
//!
//! ```text
//! SATSWAP_GATEWAY__BASE_URL=https://staging.example/v1
//! SATSWAP_EXECUTION__RECOVERY_POLICY=reverse_swap
//! ```

use crate::service;
use anyhow::{ensure, Context, Result};
use config_crate::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};
use types::MAX_BPS;

/// Default location of the base config file
pub const DEFAULT_CONFIG_PATH: &str = "config/satswap.toml";

/// Main trader configuration structure
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct TraderConfig {
    pub gateway: GatewayConfig,
    pub auth: AuthConfig,
    pub quotes: QuoteConfig,
    pub execution: ExecutionConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct GatewayConfig {
    /// May contain `${VAR}` references, expanded at load time
    pub base_url: String,
    pub request_timeout_ms: u64,
    pub user_agent: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct AuthConfig {
    pub expiry_skew_secs: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct QuoteConfig {
    pub timeout_ms: u64,
    pub max_read_attempts: u32,
    pub backoff_base_ms: u64,
    pub backoff_max_ms: u64,
}

/// What to do with swapped BTC when the Lightning payment fails
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryPolicy {
    /// Leave the BTC as spendable wallet balance and report it
    #[default]
    KeepBtc,
    /// Swap the BTC back into the original token
    ReverseSwap,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct ExecutionConfig {
    pub default_slippage_bps: u32,
    pub integrator_fee_bps: u32,
    pub poll_interval_ms: u64,
    pub confirmation_deadline_ms: u64,
    pub routing_fee_bps: u32,
    pub min_routing_fee_sats: u64,
    pub recovery_policy: RecoveryPolicy,
    /// Spend from the gateway free balance instead of transferring on every swap
    pub use_free_balance: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub level: String,
    pub json: bool,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: service::gateway::BASE_URL.to_string(),
            request_timeout_ms: service::gateway::REQUEST_TIMEOUT_MS,
            user_agent: service::gateway::USER_AGENT.to_string(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            expiry_skew_secs: service::auth::EXPIRY_SKEW_SECS,
        }
    }
}

impl Default for QuoteConfig {
    fn default() -> Self {
        Self {
            timeout_ms: service::quotes::TIMEOUT_MS,
            max_read_attempts: service::quotes::MAX_READ_ATTEMPTS,
            backoff_base_ms: service::quotes::BACKOFF_BASE_MS,
            backoff_max_ms: service::quotes::BACKOFF_MAX_MS,
        }
    }
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            default_slippage_bps: service::execution::DEFAULT_SLIPPAGE_BPS,
            integrator_fee_bps: service::execution::INTEGRATOR_FEE_BPS,
            poll_interval_ms: service::execution::POLL_INTERVAL_MS,
            confirmation_deadline_ms: service::execution::CONFIRMATION_DEADLINE_MS,
            routing_fee_bps: service::execution::ROUTING_FEE_BPS,
            min_routing_fee_sats: service::execution::MIN_ROUTING_FEE_SATS,
            recovery_policy: RecoveryPolicy::default(),
            use_free_balance: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl GatewayConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl AuthConfig {
    pub fn expiry_skew(&self) -> Duration {
        Duration::from_secs(self.expiry_skew_secs)
    }
}

impl QuoteConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl ExecutionConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn confirmation_deadline(&self) -> Duration {
        Duration::from_millis(self.confirmation_deadline_ms)
    }
}

impl TraderConfig {
    /// Load configuration from files with environment overrides
    pub fn load(base_path: Option<&Path>, environment: Option<&str>) -> Result<Self> {
        let base = base_path.unwrap_or(Path::new(DEFAULT_CONFIG_PATH));

        let mut builder = Config::builder().add_source(File::from(base).required(true));

        // Add environment-specific overrides if specified
        if let Some(env) = environment {
            let env_file = base
                .parent()
                .unwrap_or(Path::new("."))
                .join("environments")
                .join(format!("{}.toml", env));

            if env_file.exists() {
                info!("Loading environment config: {:?}", env_file);
                builder = builder.add_source(File::from(env_file));
            } else {
                warn!("Environment config not found: {:?}", env_file);
            }
        }

        // Override with environment variables (SATSWAP_ prefix, `__` between levels)
        builder = builder.add_source(
            Environment::with_prefix("SATSWAP")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Parse a TOML document on top of the defaults, without file or env sources
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Config::builder()
            .add_source(File::from_str(content, FileFormat::Toml))
            .build()
            .context("Failed to build configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Expand environment variables in string values
    pub fn expand_env_vars(&mut self) -> Result<()> {
        let expanded = shellexpand::env(&self.gateway.base_url)
            .context("Failed to expand gateway base URL")?;
        self.gateway.base_url = expanded.trim_end_matches('/').to_string();
        Ok(())
    }

    /// Reject values the trader cannot operate with
    pub fn validate(&self) -> Result<()> {
        let url = &self.gateway.base_url;
        ensure!(
            url.starts_with("http://") || url.starts_with("https://"),
            "gateway.base_url must be an http(s) URL, got '{}'",
            url
        );
        ensure!(self.gateway.request_timeout_ms > 0, "gateway.request_timeout_ms must be positive");
        ensure!(self.quotes.timeout_ms > 0, "quotes.timeout_ms must be positive");
        ensure!(self.quotes.max_read_attempts >= 1, "quotes.max_read_attempts must be at least 1");
        ensure!(
            self.quotes.backoff_base_ms <= self.quotes.backoff_max_ms,
            "quotes.backoff_base_ms exceeds quotes.backoff_max_ms"
        );

        let exec = &self.execution;
        for (field, value) in [
            ("execution.default_slippage_bps", exec.default_slippage_bps),
            ("execution.integrator_fee_bps", exec.integrator_fee_bps),
            ("execution.routing_fee_bps", exec.routing_fee_bps),
        ] {
            ensure!(value <= MAX_BPS, "{} is {} bps, maximum is {}", field, value, MAX_BPS);
        }
        ensure!(exec.poll_interval_ms > 0, "execution.poll_interval_ms must be positive");
        ensure!(
            exec.poll_interval_ms <= exec.confirmation_deadline_ms,
            "execution.poll_interval_ms exceeds execution.confirmation_deadline_ms"
        );

        debug!(base_url = %url, "configuration validated");
        Ok(())
    }

    /// Render as TOML, e.g. to seed a new config file
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }
}

/// Convenience function to load, expand and validate configuration
pub fn load_config(path: Option<&Path>, environment: Option<&str>) -> Result<TraderConfig> {
    let mut config = TraderConfig::load(path, environment)?;
    config.expand_env_vars()?;
    config.validate()?;
    Ok(config)
}

/// Resolve the config path from an explicit argument or `SATSWAP_CONFIG`
pub fn resolve_config_path(explicit: Option<PathBuf>) -> PathBuf {
    explicit
        .or_else(|| std::env::var_os("SATSWAP_CONFIG").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
