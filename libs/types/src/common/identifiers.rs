//! # Typed Identifiers
//!
//! String-backed wrappers for the three identifier families the gateway hands out.
//! Each wrapper is distinct, so a function taking `(PoolId, AssetId)` cannot be
//! called with the arguments swapped.
//!
//! ```rust
//! use types::{AssetId, PoolId};
//!
//! let pool = PoolId::new("02c0ffee");
//! let token = AssetId::new("btkn1qexample");
//! assert!(AssetId::btc().is_btc());
//! assert_ne!(pool.as_str(), token.as_str());
//! ```

use crate::common::errors::ValidationError;
use serde::{Deserialize, Serialize};

/// Generates a transparent string wrapper with validated construction
macro_rules! define_string_id {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap a raw identifier without validation
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Wrap a raw identifier, rejecting empty values and control characters
            pub fn new_validated(id: impl Into<String>) -> Result<Self, ValidationError> {
                let id = id.into();
                if id.trim().is_empty() || id.chars().any(char::is_control) {
                    return Err(ValidationError::InvalidIdentifier {
                        kind: $kind,
                        value: id,
                    });
                }
                Ok(Self(id))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self::new(id)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self::new(id)
            }
        }
    };
}

define_string_id!(
    /// Pool identifier; doubles as the pool's custody identity for transfers
    PoolId, "pool"
);

define_string_id!(
    /// Asset identifier (token address, or [`AssetId::BTC`] for bitcoin)
    AssetId, "asset"
);

define_string_id!(
    /// Reference returned by the wallet for an asset transfer
    TransferId, "transfer"
);

impl AssetId {
    /// Canonical identifier used by the gateway for native bitcoin
    pub const BTC: &'static str = "btc";

    pub fn btc() -> Self {
        Self::new(Self::BTC)
    }

    pub fn is_btc(&self) -> bool {
        self.0.eq_ignore_ascii_case(Self::BTC)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validated_construction() {
        assert!(PoolId::new_validated("02abc").is_ok());
        assert!(matches!(
            PoolId::new_validated("  "),
            Err(ValidationError::InvalidIdentifier { kind: "pool", .. })
        ));
        assert!(AssetId::new_validated("tok\n").is_err());
    }

    #[test]
    fn test_btc_detection_is_case_insensitive() {
        assert!(AssetId::new("BTC").is_btc());
        assert!(!AssetId::new("btkn1xyz").is_btc());
    }

    #[test]
    fn test_transparent_serde() {
        let id: TransferId = serde_json::from_str("\"tx-1\"").unwrap();
        assert_eq!(id.as_str(), "tx-1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"tx-1\"");
    }
}
