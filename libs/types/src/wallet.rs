//! Wallet-side views: balances and Lightning payment results

use crate::common::amount::{self, Amount};
use crate::common::identifiers::AssetId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletBalance {
    #[serde(with = "amount")]
    pub btc_sats: Amount,
    #[serde(default)]
    pub token_balances: HashMap<AssetId, Amount>,
}

impl WalletBalance {
    /// Balance of `asset`, treating missing tokens as zero
    pub fn amount_of(&self, asset: &AssetId) -> Amount {
        if asset.is_btc() {
            self.btc_sats
        } else {
            self.token_balances.get(asset).copied().unwrap_or(0)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LightningPayment {
    pub payment_id: String,
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_of() {
        let mut balance = WalletBalance {
            btc_sats: 12_000,
            ..Default::default()
        };
        balance.token_balances.insert(AssetId::new("tok"), 500);
        assert_eq!(balance.amount_of(&AssetId::btc()), 12_000);
        assert_eq!(balance.amount_of(&AssetId::new("tok")), 500);
        assert_eq!(balance.amount_of(&AssetId::new("none")), 0);
    }
}
