//! Standardized emoji logging for trader modules

/// Standard emoji set for trader logging
pub struct LogEmoji;

impl LogEmoji {
    // Status indicators
    pub const SUCCESS: &'static str = "✅";
    pub const ERROR: &'static str = "❌";
    pub const WARNING: &'static str = "⚠️";

    // Module-specific
    pub const SEARCH: &'static str = "🔍"; // Quote fan-out and pool discovery
    pub const EXECUTE: &'static str = "⚡"; // Intent submission
    pub const MONEY: &'static str = "💰"; // Transfers and balances
    pub const POOL: &'static str = "🏊"; // Pool creation and liquidity
    pub const LIGHTNING: &'static str = "🌩️"; // Lightning payments
    pub const RECOVERY: &'static str = "🛟"; // Partial-failure recovery
    pub const CLOCK: &'static str = "⏱️"; // Polling and deadlines
}

#[macro_export]
macro_rules! log_success {
    ($($arg:tt)*) => {
        tracing::info!("{} {}", $crate::logging::LogEmoji::SUCCESS, format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        tracing::error!("{} {}", $crate::logging::LogEmoji::ERROR, format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_warning {
    ($($arg:tt)*) => {
        tracing::warn!("{} {}", $crate::logging::LogEmoji::WARNING, format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_search {
    ($($arg:tt)*) => {
        tracing::info!("{} {}", $crate::logging::LogEmoji::SEARCH, format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_execution {
    ($($arg:tt)*) => {
        tracing::info!("{} {}", $crate::logging::LogEmoji::EXECUTE, format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_funds {
    ($($arg:tt)*) => {
        tracing::info!("{} {}", $crate::logging::LogEmoji::MONEY, format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_pool {
    ($($arg:tt)*) => {
        tracing::info!("{} {}", $crate::logging::LogEmoji::POOL, format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_lightning {
    ($($arg:tt)*) => {
        tracing::info!("{} {}", $crate::logging::LogEmoji::LIGHTNING, format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_recovery {
    ($($arg:tt)*) => {
        tracing::warn!("{} {}", $crate::logging::LogEmoji::RECOVERY, format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_timing {
    ($($arg:tt)*) => {
        tracing::debug!("{} {}", $crate::logging::LogEmoji::CLOCK, format!($($arg)*))
    };
}
