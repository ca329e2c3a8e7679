//! Smallest-unit amounts and their wire representation
//!
//! Gateways send amounts as decimal strings (and occasionally as plain JSON
//! integers). Both forms deserialize into [`Amount`]; serialization always emits
//! the string form.

use serde::{Deserialize, Deserializer, Serializer};

/// Amount in the asset's smallest unit (sats for BTC)
pub type Amount = u128;

#[derive(Deserialize)]
#[serde(untagged)]
enum WireAmount {
    Text(String),
    Number(u64),
}

fn parse(wire: WireAmount) -> Result<Amount, String> {
    match wire {
        WireAmount::Number(n) => Ok(n as Amount),
        WireAmount::Text(s) => s
            .trim()
            .parse::<Amount>()
            .map_err(|e| format!("invalid amount '{}': {}", s, e)),
    }
}

/// Serialize an [`Amount`] as a decimal string
pub fn serialize<S: Serializer>(value: &Amount, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&value.to_string())
}

/// Deserialize an [`Amount`] from a decimal string or JSON integer
pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Amount, D::Error> {
    parse(WireAmount::deserialize(deserializer)?).map_err(serde::de::Error::custom)
}

/// `Option<Amount>` variant of the string codec
pub mod option {
    use super::{parse, Amount, WireAmount};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<Amount>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => serializer.serialize_some(&v.to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Amount>, D::Error> {
        match Option::<WireAmount>::deserialize(deserializer)? {
            Some(wire) => parse(wire).map(Some).map_err(serde::de::Error::custom),
            None => Ok(None),
        }
    }
}
