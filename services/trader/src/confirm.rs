//! Balance polling with a fixed interval and an explicit deadline

use gateway::Wallet;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;
use types::{Amount, AssetId, WalletBalance};

use crate::error::{Result, TradeError};
use crate::log_timing;

/// Poll until the wallet holds at least `baseline + expected` of `asset`
///
/// Balance read failures are retried on the next tick; only the deadline ends the wait.
pub async fn wait_for_credit(
    wallet: &dyn Wallet,
    asset: &AssetId,
    baseline: Amount,
    expected: Amount,
    interval: Duration,
    deadline: Duration,
) -> Result<WalletBalance> {
    let target = baseline.saturating_add(expected);
    let started = Instant::now();
    let give_up = started + deadline;

    loop {
        match wallet.get_balance().await {
            Ok(balance) if balance.amount_of(asset) >= target => {
                log_timing!(
                    "{} credit of {} observed after {:?}",
                    asset,
                    expected,
                    started.elapsed()
                );
                return Ok(balance);
            }
            Ok(balance) => {
                debug!(
                    asset = %asset,
                    have = balance.amount_of(asset),
                    target,
                    "waiting for credit"
                );
            }
            Err(err) => debug!("balance read failed while polling: {}", err),
        }

        if Instant::now() + interval > give_up {
            return Err(TradeError::Timeout {
                what: format!("{} {} credit", expected, asset),
                waited_ms: started.elapsed().as_millis() as u64,
            });
        }
        tokio::time::sleep(interval).await;
    }
}
