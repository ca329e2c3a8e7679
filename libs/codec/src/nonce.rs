//! Anti-replay nonces
//!
//! Uniqueness is a property of the OS random source; nothing is tracked locally.

use crate::error::{EncodingError, EncodingResult};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Nonce width in bytes
pub const NONCE_LEN: usize = 16;

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Nonce([u8; NONCE_LEN]);

impl Nonce {
    /// Fresh nonce from the operating system CSPRNG
    pub fn generate() -> Self {
        let mut bytes = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    pub fn from_bytes(bytes: [u8; NONCE_LEN]) -> Self {
        Self(bytes)
    }

    pub fn from_hex(text: &str) -> EncodingResult<Self> {
        let raw = hex::decode(text).map_err(|e| EncodingError::InvalidNonce(e.to_string()))?;
        let bytes: [u8; NONCE_LEN] = raw.try_into().map_err(|raw: Vec<u8>| {
            EncodingError::InvalidNonce(format!("expected {} bytes, got {}", NONCE_LEN, raw.len()))
        })?;
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; NONCE_LEN] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

/// Shorthand for [`Nonce::generate`]
pub fn generate_nonce() -> Nonce {
    Nonce::generate()
}

impl fmt::Display for Nonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Nonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Nonce({})", self.to_hex())
    }
}

impl Serialize for Nonce {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Nonce {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Nonce::from_hex(&text).map_err(serde::de::Error::custom)
    }
}
