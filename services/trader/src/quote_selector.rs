//! # Quote Selector
//!
//! Fans a simulate-only swap out to every candidate pool at once, waits for each up
//! to a bounded timeout, drops whatever failed, and picks the best surviving quote:
//! highest `amount_out`, then lowest price impact, then lowest pool id.
//!
//! Simulations are idempotent reads and go through the read-retry policy. The
//! timeout bounds each candidate as a whole, retries included.

use futures::future::join_all;
use gateway::{retry_read, Gateway, PoolFilter, ReadRetryPolicy, SessionManager, SimulateSwapRequest};
use satswap_config::QuoteConfig;
use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use types::common::validate_positive;
use types::{Pool, PoolId, Quote, SwapRequest, ValidationError};

use crate::error::{Result, TradeError};
use crate::{log_search, log_warning};

pub struct QuoteSelector {
    gateway: Arc<dyn Gateway>,
    session: Arc<SessionManager>,
    timeout: Duration,
    retry: ReadRetryPolicy,
}

impl QuoteSelector {
    pub fn new(gateway: Arc<dyn Gateway>, session: Arc<SessionManager>, config: &QuoteConfig) -> Self {
        Self {
            gateway,
            session,
            timeout: config.timeout(),
            retry: ReadRetryPolicy::from_config(config),
        }
    }

    /// Tradable pools holding both assets of `request`
    pub async fn discover(&self, request: &SwapRequest) -> Result<Vec<Pool>> {
        let gateway = self.gateway.as_ref();
        let session = self.session.as_ref();
        let filter = PoolFilter::with_asset(request.asset_in.clone());
        let filter = &filter;

        let pools = retry_read(&self.retry, "list pools", move || {
            session.call(move |token| async move { gateway.list_pools(&token, filter).await })
        })
        .await?;

        Ok(pools
            .into_iter()
            .filter(|pool| pool.is_tradable() && pool.trades_pair(&request.asset_in, &request.asset_out))
            .collect())
    }

    /// Simulate `request` against one pool
    pub async fn quote_pool(&self, pool_id: &PoolId, request: &SwapRequest) -> Result<Quote> {
        let gateway = self.gateway.as_ref();
        let session = self.session.as_ref();
        let simulate = SimulateSwapRequest {
            pool_id: pool_id.clone(),
            asset_in: request.asset_in.clone(),
            amount_in: request.amount_in,
        };
        let simulate = &simulate;

        let quote = retry_read(&self.retry, "simulate swap", move || {
            session.call(move |token| async move { gateway.simulate_swap(&token, simulate).await })
        })
        .await?;
        Ok(quote)
    }

    /// Best quote across `candidates`, or across discovered pools when `None`
    pub async fn select_best(&self, request: &SwapRequest, candidates: Option<&[PoolId]>) -> Result<Quote> {
        validate_request(request)?;

        let pool_ids: Vec<PoolId> = match candidates {
            Some(ids) => ids.to_vec(),
            None => self
                .discover(request)
                .await?
                .into_iter()
                .map(|pool| pool.pool_id)
                .collect(),
        };
        if pool_ids.is_empty() {
            return Err(no_liquidity(request));
        }

        log_search!(
            "Quoting {} {} -> {} across {} pools",
            request.amount_in,
            request.asset_in,
            request.asset_out,
            pool_ids.len()
        );

        let attempts = pool_ids.iter().map(|pool_id| async move {
            match tokio::time::timeout(self.timeout, self.quote_pool(pool_id, request)).await {
                Ok(Ok(quote)) => Some(quote),
                Ok(Err(err)) => {
                    debug!(pool = %pool_id, "quote failed: {}", err);
                    None
                }
                Err(_) => {
                    log_warning!("Quote from pool {} timed out after {:?}", pool_id, self.timeout);
                    None
                }
            }
        });
        let quotes: Vec<Quote> = join_all(attempts).await.into_iter().flatten().collect();

        let best = pick_best(quotes).ok_or_else(|| no_liquidity(request))?;
        debug!(
            pool = %best.pool_id,
            amount_out = best.amount_out,
            impact = %best.price_impact_pct,
            "selected quote"
        );
        Ok(best)
    }
}

fn validate_request(request: &SwapRequest) -> std::result::Result<(), ValidationError> {
    validate_positive("amount_in", request.amount_in)?;
    if request.asset_in == request.asset_out {
        return Err(ValidationError::SameAsset {
            asset: request.asset_in.to_string(),
        });
    }
    Ok(())
}

fn no_liquidity(request: &SwapRequest) -> TradeError {
    TradeError::NoLiquidity {
        asset_in: request.asset_in.clone(),
        asset_out: request.asset_out.clone(),
    }
}

/// Selection order: more output, then less impact, then lower pool id
fn compare_quotes(a: &Quote, b: &Quote) -> Ordering {
    b.amount_out
        .cmp(&a.amount_out)
        .then_with(|| a.price_impact_pct.cmp(&b.price_impact_pct))
        .then_with(|| a.pool_id.cmp(&b.pool_id))
}

/// Best usable quote; zero-output quotes never win
pub fn pick_best(quotes: Vec<Quote>) -> Option<Quote> {
    quotes
        .into_iter()
        .filter(|quote| quote.amount_out > 0)
        .min_by(compare_quotes)
}
