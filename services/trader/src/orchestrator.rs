//! # Transaction Orchestrator
//!
//! ## Purpose
//!
//! Drives every simple operation through the same pipeline:
//!
//! ```text
//! ensure_authenticated → [transfer to pool] → build intent → sign → submit → interpret
//!                              ↓ rejected after transfer
//!                           Clawback intent
//! ```
//!
//! A gateway rejection is returned inside the typed outcome. Errors are reserved for
//! operations that could not be carried out at all.
//!
//! ## Fund Safety
//!
//! - Swaps re-simulate just before transferring and stop if the output floor no
//!   longer holds
//! - Intent fields are encoded once before any transfer, so a malformed request
//!   fails without moving funds
//! - A submission whose outcome is in doubt surfaces as [`TradeError::Unsettled`]
//!   naming every transfer; a rejection after a transfer issues a `Clawback`
//! - When a second funding transfer fails, the first is clawed back and the result
//!   comes back in [`TradeError::FundingFailed`]

use codec::{
    AddLiquidityIntent, ClawbackIntent, CollectFeesIntent, ConfirmInitialDepositIntent,
    CreateConcentratedPoolIntent, CreateConstantProductPoolIntent, CreateSingleSidedPoolIntent,
    IntentMessage, IntentPayload, RegisterHostIntent, RemoveLiquidityIntent, SignedIntent,
    SwapIntent, WithdrawHostFeesIntent, WithdrawIntegratorFeesIntent,
};
use gateway::{
    retry_read, Gateway, GatewayResult, HttpGateway, IntentSigner, PoolFilter, ReadRetryPolicy,
    SessionManager, Wallet,
};
use satswap_amm::{
    BondingCurve, ConstantProductState, LiquidityMath, LiquidityQuote, PoolPrice, PriceScale,
    SwapCurve, TickMath, VirtualReserves,
};
use satswap_config::TraderConfig;
use std::future::Future;
use std::sync::Arc;
use tracing::debug;
use types::common::validate_positive;
use types::{
    validate_bps, Acknowledgement, Amount, AssetId, CurveType, Decimal, LiquidityExecution,
    Outcome, Pool, PoolCreation, PoolId, Position, Quote, Rejection, RejectionCode,
    SwapExecution, SwapRequest, TransferId, ValidationError, WithdrawalExecution, MAX_BPS,
};

use crate::error::{Result, TradeError};
use crate::quote_selector::QuoteSelector;
use crate::{log_error, log_execution, log_funds, log_pool, log_success, log_warning};

/// Outcome of a clawback issued for a transfer whose intent did not execute
#[derive(Debug, Clone, PartialEq)]
pub struct Reclaim {
    pub transfer_id: TransferId,
    pub acknowledged: bool,
    /// Rejection or error text when not acknowledged
    pub detail: Option<String>,
}

/// Exact-input swap order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapOrder {
    pub asset_in: AssetId,
    pub asset_out: AssetId,
    pub amount_in: Amount,
    /// Pool to trade against; best quote across discovered pools when `None`
    pub pool_id: Option<PoolId>,
    /// Defaults to the configured slippage
    pub max_slippage_bps: Option<u32>,
    /// Absolute floor enforced on top of the slippage floor
    pub min_amount_out: Option<Amount>,
}

impl SwapOrder {
    pub fn new(asset_in: AssetId, asset_out: AssetId, amount_in: Amount) -> Self {
        Self {
            asset_in,
            asset_out,
            amount_in,
            pool_id: None,
            max_slippage_bps: None,
            min_amount_out: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SwapReport {
    /// Fresh quote the submission was checked against
    pub quote: Quote,
    pub min_amount_out: Amount,
    /// `None` when the swap spent the gateway free balance or never got as far as a transfer
    pub input_transfer_id: Option<TransferId>,
    pub execution: SwapExecution,
    pub reclaim: Option<Reclaim>,
}

impl SwapReport {
    pub fn accepted(&self) -> bool {
        self.execution.accepted
    }

    /// Input was transferred, not executed, and not yet returned
    pub fn funds_at_pool(&self) -> bool {
        !self.execution.accepted
            && self.input_transfer_id.is_some()
            && !self.reclaim.as_ref().map_or(false, |r| r.acknowledged)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiquidityOrder {
    pub pool_id: PoolId,
    pub amount_a: Amount,
    pub amount_b: Amount,
    /// Required for concentrated pools, rejected for the others
    pub tick_range: Option<(i32, i32)>,
    pub max_slippage_bps: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LiquidityReport {
    /// Local deposit sizing for concentrated pools
    pub preview: Option<LiquidityQuote>,
    pub min_liquidity: Amount,
    pub transfers: Vec<TransferId>,
    pub execution: LiquidityExecution,
    pub reclaims: Vec<Reclaim>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovalOrder {
    pub pool_id: PoolId,
    pub liquidity: Amount,
    pub tick_range: Option<(i32, i32)>,
    /// Derived from a local preview (concentrated pools) or zero when `None`
    pub min_amounts: Option<(Amount, Amount)>,
    pub max_slippage_bps: Option<u32>,
}

/// Fee schedule and ownership shared by every pool kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolSpec {
    pub asset_a: AssetId,
    pub asset_b: AssetId,
    pub lp_fee_bps: u32,
    pub total_host_fee_bps: u32,
    pub host_namespace: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BondingCurveParams {
    /// Supply of asset A seeded into the pool
    pub initial_supply: Amount,
    pub graduation_threshold_pct: u32,
    /// Asset B raised when the threshold is sold
    pub target_raise: Amount,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PoolLaunch {
    pub reserves: VirtualReserves,
    pub creation: PoolCreation,
    pub deposit_transfer_id: Option<TransferId>,
    pub confirmation: Option<Acknowledgement>,
}

/// Client-side trading engine bound to one wallet and one gateway
pub struct Trader {
    config: TraderConfig,
    wallet: Arc<dyn Wallet>,
    gateway: Arc<dyn Gateway>,
    session: Arc<SessionManager>,
    selector: QuoteSelector,
    retry: ReadRetryPolicy,
}

impl Trader {
    pub fn new(config: TraderConfig, wallet: Arc<dyn Wallet>, gateway: Arc<dyn Gateway>) -> Self {
        let signer = Arc::new(IntentSigner::new(wallet.clone()));
        let session = Arc::new(SessionManager::new(
            gateway.clone(),
            signer,
            config.auth.expiry_skew(),
        ));
        let selector = QuoteSelector::new(gateway.clone(), session.clone(), &config.quotes);
        let retry = ReadRetryPolicy::from_config(&config.quotes);

        Self {
            config,
            wallet,
            gateway,
            session,
            selector,
            retry,
        }
    }

    /// Trader talking to the configured HTTPS gateway
    pub fn connect(config: TraderConfig, wallet: Arc<dyn Wallet>) -> Result<Self> {
        let gateway: Arc<dyn Gateway> = Arc::new(HttpGateway::new(&config.gateway)?);
        log_success!("Gateway client ready for {}", config.gateway.base_url);
        Ok(Self::new(config, wallet, gateway))
    }

    pub fn config(&self) -> &TraderConfig {
        &self.config
    }

    pub fn wallet(&self) -> &Arc<dyn Wallet> {
        &self.wallet
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    pub fn selector(&self) -> &QuoteSelector {
        &self.selector
    }

    // ---- reads -------------------------------------------------------------

    pub async fn list_pools(&self, filter: &PoolFilter) -> Result<Vec<Pool>> {
        let gateway = self.gateway.as_ref();
        let session = self.session.as_ref();
        let pools = retry_read(&self.retry, "list pools", move || {
            session.call(move |token| async move { gateway.list_pools(&token, filter).await })
        })
        .await?;
        Ok(pools)
    }

    pub async fn get_pool(&self, pool_id: &PoolId) -> Result<Pool> {
        let gateway = self.gateway.as_ref();
        let session = self.session.as_ref();
        let pool = retry_read(&self.retry, "get pool", move || {
            session.call(move |token| async move { gateway.get_pool(&token, pool_id).await })
        })
        .await?;
        Ok(pool)
    }

    /// Best quote for `request` without moving funds
    pub async fn quote(&self, request: &SwapRequest, candidates: Option<&[PoolId]>) -> Result<Quote> {
        self.selector.select_best(request, candidates).await
    }

    // ---- submission plumbing -----------------------------------------------

    fn slippage_or_default(&self, requested: Option<u32>) -> Result<u32> {
        let bps = requested.unwrap_or(self.config.execution.default_slippage_bps);
        Ok(validate_bps("max_slippage_bps", bps)?)
    }

    /// Encode once without signing so bad fields fail before anything is transferred
    fn precheck<P: IntentPayload + Clone>(payload: &P) -> Result<()> {
        IntentMessage::from_payload(payload.clone())?;
        Ok(())
    }

    async fn submit<P, T, F, Fut>(&self, payload: P, submit: F) -> Result<T>
    where
        P: IntentPayload,
        T: Outcome,
        F: FnMut(String, SignedIntent) -> Fut,
        Fut: Future<Output = GatewayResult<T>>,
    {
        let kind = P::KIND;
        let fields = payload.into_fields();
        log_execution!("Submitting {} intent", kind);

        let outcome = self.session.submit_intent(kind, &fields, submit).await?;
        match outcome.rejection() {
            None if outcome.accepted() => log_success!("{} accepted", kind),
            Some(rejection) => log_warning!("{} rejected: {}", kind, rejection),
            None => log_warning!("{} rejected without a reason", kind),
        }
        Ok(outcome)
    }

    async fn transfer_to_pool(&self, pool_id: &PoolId, asset: &AssetId, amount: Amount) -> Result<TransferId> {
        let transfer_id = self
            .wallet
            .transfer_asset(asset, amount, pool_id.as_str())
            .await?;
        log_funds!("Transferred {} {} to pool {} ({})", amount, asset, pool_id, transfer_id);
        Ok(transfer_id)
    }

    /// Ask the gateway to return a transfer whose intent did not execute
    pub async fn clawback(&self, pool_id: &PoolId, transfer_id: &TransferId) -> Result<Acknowledgement> {
        let gateway = self.gateway.as_ref();
        self.submit(
            ClawbackIntent {
                pool_id: pool_id.clone(),
                transfer_id: transfer_id.clone(),
            },
            move |token, intent| async move { gateway.clawback(&token, &intent).await },
        )
        .await
    }

    async fn reclaim(&self, pool_id: &PoolId, transfer_id: &TransferId) -> Reclaim {
        match self.clawback(pool_id, transfer_id).await {
            Ok(ack) if ack.accepted => {
                log_funds!("Clawback of {} from pool {} acknowledged", transfer_id, pool_id);
                Reclaim {
                    transfer_id: transfer_id.clone(),
                    acknowledged: true,
                    detail: None,
                }
            }
            Ok(ack) => Reclaim {
                transfer_id: transfer_id.clone(),
                acknowledged: false,
                detail: ack.rejection.map(|r| r.to_string()),
            },
            Err(err) => {
                log_error!("Clawback of {} from pool {} failed: {}", transfer_id, pool_id, err);
                Reclaim {
                    transfer_id: transfer_id.clone(),
                    acknowledged: false,
                    detail: Some(err.to_string()),
                }
            }
        }
    }

    /// Submission failures whose outcome is in doubt keep every transfer reference
    ///
    /// A transport error may have reached the gateway, so it counts as in doubt even
    /// when the input came from the free balance.
    fn unsettled(pool_id: &PoolId, transfer_ids: &[TransferId], err: TradeError) -> TradeError {
        if transfer_ids.is_empty() && !matches!(err, TradeError::Network(_)) {
            return err;
        }
        log_error!(
            "Submission to pool {} failed with {} transfer(s) outstanding: {}",
            pool_id,
            transfer_ids.len(),
            err
        );
        TradeError::Unsettled {
            pool_id: pool_id.clone(),
            transfer_ids: transfer_ids.to_vec(),
            reason: err.to_string(),
        }
    }

    // ---- swaps -------------------------------------------------------------

    pub async fn swap(&self, order: SwapOrder) -> Result<SwapReport> {
        let slippage = self.slippage_or_default(order.max_slippage_bps)?;
        let request = SwapRequest {
            asset_in: order.asset_in,
            asset_out: order.asset_out,
            amount_in: order.amount_in,
        };

        let quote = match &order.pool_id {
            Some(pool_id) => {
                validate_positive("amount_in", request.amount_in)?;
                self.selector.quote_pool(pool_id, &request).await?
            }
            None => self.selector.select_best(&request, None).await?,
        };
        let min_amount_out = quote
            .slippage_floor(slippage)
            .max(order.min_amount_out.unwrap_or(0));

        self.execute_swap(&request, &quote.pool_id, slippage, min_amount_out)
            .await
    }

    /// Re-simulate, transfer, submit; clawback if rejected after the transfer
    pub(crate) async fn execute_swap(
        &self,
        request: &SwapRequest,
        pool_id: &PoolId,
        max_slippage_bps: u32,
        min_amount_out: Amount,
    ) -> Result<SwapReport> {
        let fresh = self.selector.quote_pool(pool_id, request).await?;
        if fresh.amount_out < min_amount_out {
            log_warning!(
                "Pool {} now quotes {} below the floor {}, not submitting",
                pool_id,
                fresh.amount_out,
                min_amount_out
            );
            let execution = SwapExecution {
                accepted: false,
                amount_in: request.amount_in,
                amount_out: 0,
                fee_paid: 0,
                outbound_transfer_id: None,
                rejection: Some(Rejection {
                    code: RejectionCode::SlippageExceeded,
                    message: format!(
                        "fresh quote {} is below minimum output {}",
                        fresh.amount_out, min_amount_out
                    ),
                }),
            };
            return Ok(SwapReport {
                quote: fresh,
                min_amount_out,
                input_transfer_id: None,
                execution,
                reclaim: None,
            });
        }

        let mut intent = SwapIntent {
            pool_id: pool_id.clone(),
            asset_in: request.asset_in.clone(),
            asset_out: request.asset_out.clone(),
            amount_in: request.amount_in,
            min_amount_out,
            max_slippage_bps,
            integrator_fee_bps: self.config.execution.integrator_fee_bps,
            input_transfer_id: None,
        };
        Self::precheck(&intent)?;

        if !self.config.execution.use_free_balance {
            intent.input_transfer_id = Some(
                self.transfer_to_pool(pool_id, &request.asset_in, request.amount_in)
                    .await?,
            );
        }
        let input_transfer_id = intent.input_transfer_id.clone();

        let gateway = self.gateway.as_ref();
        let execution = self
            .submit(intent, move |token, intent| async move { gateway.swap(&token, &intent).await })
            .await
            .map_err(|err| Self::unsettled(pool_id, input_transfer_id.as_slice(), err))?;

        let reclaim = match (&input_transfer_id, execution.accepted) {
            (Some(transfer_id), false) => Some(self.reclaim(pool_id, transfer_id).await),
            _ => None,
        };
        if execution.accepted {
            log_success!(
                "Swapped {} {} for {} {} in pool {}",
                execution.amount_in,
                request.asset_in,
                execution.amount_out,
                request.asset_out,
                pool_id
            );
        }

        Ok(SwapReport {
            quote: fresh,
            min_amount_out,
            input_transfer_id,
            execution,
            reclaim,
        })
    }

    /// Smallest input expected to produce `amount_out` of `asset_out`, padded by slippage
    ///
    /// Uses local reserve math, so only pools with a local estimate are considered.
    pub async fn estimate_input_for(
        &self,
        asset_in: &AssetId,
        asset_out: &AssetId,
        amount_out: Amount,
        max_slippage_bps: u32,
    ) -> Result<Amount> {
        let probe = SwapRequest {
            asset_in: asset_in.clone(),
            asset_out: asset_out.clone(),
            amount_in: 1,
        };
        let pools = self.selector.discover(&probe).await?;

        let best = pools
            .iter()
            .filter(|pool| satswap_amm::supports_local_estimate(pool))
            .filter_map(|pool| {
                let curve = ConstantProductState::from_pool(pool, asset_in).ok()?;
                curve.get_amount_in(amount_out).ok()
            })
            .min()
            .ok_or_else(|| TradeError::NoLiquidity {
                asset_in: asset_in.clone(),
                asset_out: asset_out.clone(),
            })?;

        let padded = pad_by_bps(best, max_slippage_bps);
        debug!(base = best, padded, "estimated swap input");
        Ok(padded)
    }

    // ---- liquidity ---------------------------------------------------------

    pub async fn add_liquidity(&self, order: LiquidityOrder) -> Result<LiquidityReport> {
        let slippage = self.slippage_or_default(order.max_slippage_bps)?;
        let pool = self.get_pool(&order.pool_id).await?;

        let (preview, amount_a, amount_b, min_liquidity) = match (pool.curve_type, order.tick_range) {
            (CurveType::Concentrated, Some((lower, upper))) => {
                let position = Position::new(pool.pool_id.clone(), lower, upper, 0)?;
                let current = current_price(&pool)?;
                let quote = LiquidityMath::liquidity_from_amounts(
                    &current,
                    position.tick_lower,
                    position.tick_upper,
                    order.amount_a,
                    order.amount_b,
                )?;
                let min_liquidity = apply_slippage(quote.liquidity, slippage);
                (Some(quote), quote.amount_a_used, quote.amount_b_used, min_liquidity)
            }
            (CurveType::Concentrated, None) => {
                return Err(ValidationError::custom("concentrated pools need a tick range").into())
            }
            (_, Some(_)) => {
                return Err(ValidationError::custom(format!(
                    "{:?} pools do not take a tick range",
                    pool.curve_type
                ))
                .into())
            }
            (_, None) => {
                if order.amount_a == 0 && order.amount_b == 0 {
                    return Err(ValidationError::NonPositiveAmount { field: "amount" }.into());
                }
                (None, order.amount_a, order.amount_b, 0)
            }
        };

        let mut intent = AddLiquidityIntent {
            pool_id: pool.pool_id.clone(),
            amount_a,
            amount_b,
            min_liquidity,
            tick_range: order.tick_range,
            transfer_id_a: None,
            transfer_id_b: None,
        };
        Self::precheck(&intent)?;

        let mut transfers = Vec::new();
        if !self.config.execution.use_free_balance {
            if amount_a > 0 {
                let id = self.transfer_to_pool(&pool.pool_id, &pool.asset_a, amount_a).await?;
                intent.transfer_id_a = Some(id.clone());
                transfers.push(id);
            }
            if amount_b > 0 {
                match self.transfer_to_pool(&pool.pool_id, &pool.asset_b, amount_b).await {
                    Ok(id) => {
                        intent.transfer_id_b = Some(id.clone());
                        transfers.push(id);
                    }
                    Err(err) => {
                        let mut reclaims = Vec::new();
                        for transfer_id in &transfers {
                            reclaims.push(self.reclaim(&pool.pool_id, transfer_id).await);
                        }
                        return Err(TradeError::FundingFailed {
                            pool_id: pool.pool_id.clone(),
                            reason: err.to_string(),
                            reclaims,
                        });
                    }
                }
            }
        }

        let gateway = self.gateway.as_ref();
        let execution = self
            .submit(intent, move |token, intent| async move {
                gateway.add_liquidity(&token, &intent).await
            })
            .await
            .map_err(|err| Self::unsettled(&pool.pool_id, &transfers, err))?;

        let mut reclaims = Vec::new();
        if !execution.accepted {
            for transfer_id in &transfers {
                reclaims.push(self.reclaim(&pool.pool_id, transfer_id).await);
            }
        } else {
            log_pool!(
                "Added liquidity {} to pool {} (refund {} / {})",
                execution.liquidity,
                pool.pool_id,
                execution.refund_a,
                execution.refund_b
            );
        }

        Ok(LiquidityReport {
            preview,
            min_liquidity,
            transfers,
            execution,
            reclaims,
        })
    }

    pub async fn remove_liquidity(&self, order: RemovalOrder) -> Result<WithdrawalExecution> {
        validate_positive("liquidity", order.liquidity)?;
        let slippage = self.slippage_or_default(order.max_slippage_bps)?;

        let (min_amount_a, min_amount_b) = match (order.min_amounts, order.tick_range) {
            (Some(mins), _) => mins,
            (None, Some((lower, upper))) => {
                let pool = self.get_pool(&order.pool_id).await?;
                let (a, b) = LiquidityMath::amounts_for_liquidity(
                    &current_price(&pool)?,
                    lower,
                    upper,
                    order.liquidity,
                )?;
                (apply_slippage(a, slippage), apply_slippage(b, slippage))
            }
            (None, None) => (0, 0),
        };

        let gateway = self.gateway.as_ref();
        self.submit(
            RemoveLiquidityIntent {
                pool_id: order.pool_id,
                liquidity: order.liquidity,
                min_amount_a,
                min_amount_b,
                tick_range: order.tick_range,
            },
            move |token, intent| async move { gateway.remove_liquidity(&token, &intent).await },
        )
        .await
    }

    /// Collect accrued fees of a concentrated position
    pub async fn collect_fees(&self, position: &Position) -> Result<WithdrawalExecution> {
        let gateway = self.gateway.as_ref();
        self.submit(
            CollectFeesIntent {
                pool_id: position.pool_id.clone(),
                tick_lower: position.tick_lower,
                tick_upper: position.tick_upper,
            },
            move |token, intent| async move { gateway.collect_fees(&token, &intent).await },
        )
        .await
    }

    // ---- hosts and integrators --------------------------------------------

    pub async fn register_host(
        &self,
        namespace: &str,
        min_fee_bps: u32,
        fee_recipient: Option<String>,
    ) -> Result<Acknowledgement> {
        validate_bps("min_fee_bps", min_fee_bps)?;
        let gateway = self.gateway.as_ref();
        self.submit(
            RegisterHostIntent {
                namespace: namespace.to_string(),
                min_fee_bps,
                fee_recipient,
            },
            move |token, intent| async move { gateway.register_host(&token, &intent).await },
        )
        .await
    }

    pub async fn withdraw_host_fees(
        &self,
        namespace: &str,
        pool_id: Option<PoolId>,
        asset_a_amount: Amount,
        asset_b_amount: Amount,
    ) -> Result<WithdrawalExecution> {
        let gateway = self.gateway.as_ref();
        self.submit(
            WithdrawHostFeesIntent {
                namespace: namespace.to_string(),
                pool_id,
                asset_a_amount,
                asset_b_amount,
            },
            move |token, intent| async move { gateway.withdraw_host_fees(&token, &intent).await },
        )
        .await
    }

    pub async fn withdraw_integrator_fees(
        &self,
        pool_id: Option<PoolId>,
        asset_a_amount: Amount,
        asset_b_amount: Amount,
    ) -> Result<WithdrawalExecution> {
        let gateway = self.gateway.as_ref();
        self.submit(
            WithdrawIntegratorFeesIntent {
                pool_id,
                asset_a_amount,
                asset_b_amount,
            },
            move |token, intent| async move { gateway.withdraw_integrator_fees(&token, &intent).await },
        )
        .await
    }

    // ---- pool creation -----------------------------------------------------

    fn validate_spec(spec: &PoolSpec) -> Result<()> {
        validate_bps("lp_fee_bps", spec.lp_fee_bps)?;
        validate_bps("total_host_fee_bps", spec.total_host_fee_bps)?;
        if spec.asset_a == spec.asset_b {
            return Err(ValidationError::SameAsset {
                asset: spec.asset_a.to_string(),
            }
            .into());
        }
        Ok(())
    }

    pub async fn create_constant_product_pool(&self, spec: PoolSpec) -> Result<PoolCreation> {
        Self::validate_spec(&spec)?;
        let gateway = self.gateway.as_ref();
        let creation = self
            .submit(
                CreateConstantProductPoolIntent {
                    asset_a: spec.asset_a,
                    asset_b: spec.asset_b,
                    lp_fee_bps: spec.lp_fee_bps,
                    total_host_fee_bps: spec.total_host_fee_bps,
                    host_namespace: spec.host_namespace,
                },
                move |token, intent| async move {
                    gateway.create_constant_product_pool(&token, &intent).await
                },
            )
            .await?;
        if let Some(pool_id) = &creation.pool_id {
            log_pool!("Created constant-product pool {}", pool_id);
        }
        Ok(creation)
    }

    /// Create a concentrated pool whose initial tick encodes `initial_price`
    pub async fn create_concentrated_pool(
        &self,
        spec: PoolSpec,
        tick_spacing: i32,
        initial_price: Decimal,
        scale: &PriceScale,
    ) -> Result<PoolCreation> {
        Self::validate_spec(&spec)?;
        TickMath::validate_spacing(tick_spacing)?;
        let price = scale.to_pool_price(initial_price)?;
        let initial_tick = TickMath::tick_at_sqrt_ratio(price.sqrt_price_x96())?;
        debug!(%initial_price, initial_tick, "initial tick for concentrated pool");

        let gateway = self.gateway.as_ref();
        let creation = self
            .submit(
                CreateConcentratedPoolIntent {
                    asset_a: spec.asset_a,
                    asset_b: spec.asset_b,
                    tick_spacing,
                    initial_tick,
                    lp_fee_bps: spec.lp_fee_bps,
                    total_host_fee_bps: spec.total_host_fee_bps,
                    host_namespace: spec.host_namespace,
                },
                move |token, intent| async move { gateway.create_concentrated_pool(&token, &intent).await },
            )
            .await?;
        if let Some(pool_id) = &creation.pool_id {
            log_pool!("Created concentrated pool {} at tick {}", pool_id, initial_tick);
        }
        Ok(creation)
    }

    /// Create a bonding-curve pool, fund it with the initial supply and bind the deposit
    pub async fn create_single_sided_pool(&self, spec: PoolSpec, params: BondingCurveParams) -> Result<PoolLaunch> {
        Self::validate_spec(&spec)?;
        let reserves = BondingCurve::calculate_virtual_reserves(
            params.initial_supply,
            params.graduation_threshold_pct,
            params.target_raise,
        )?;

        let asset_a = spec.asset_a.clone();
        let gateway = self.gateway.as_ref();
        let creation = self
            .submit(
                CreateSingleSidedPoolIntent {
                    asset_a: spec.asset_a,
                    asset_b: spec.asset_b,
                    asset_a_amount: params.initial_supply,
                    graduation_threshold_pct: params.graduation_threshold_pct,
                    target_raise: params.target_raise,
                    virtual_reserve_a: reserves.virtual_reserve_a,
                    virtual_reserve_b: reserves.virtual_reserve_b,
                    lp_fee_bps: spec.lp_fee_bps,
                    total_host_fee_bps: spec.total_host_fee_bps,
                    host_namespace: spec.host_namespace,
                },
                move |token, intent| async move { gateway.create_single_sided_pool(&token, &intent).await },
            )
            .await?;

        let pool_id = match (&creation.pool_id, creation.accepted) {
            (Some(pool_id), true) => pool_id.clone(),
            _ => {
                return Ok(PoolLaunch {
                    reserves,
                    creation,
                    deposit_transfer_id: None,
                    confirmation: None,
                })
            }
        };
        log_pool!(
            "Created single-sided pool {} (virtual reserves {} / {}, threshold {})",
            pool_id,
            reserves.virtual_reserve_a,
            reserves.virtual_reserve_b,
            reserves.threshold
        );

        let transfer_id = self
            .transfer_to_pool(&pool_id, &asset_a, params.initial_supply)
            .await?;
        let confirmation = self
            .submit(
                ConfirmInitialDepositIntent {
                    pool_id: pool_id.clone(),
                    asset_id: asset_a,
                    amount: params.initial_supply,
                    transfer_id: transfer_id.clone(),
                },
                move |token, intent| async move { gateway.confirm_initial_deposit(&token, &intent).await },
            )
            .await
            .map_err(|err| Self::unsettled(&pool_id, std::slice::from_ref(&transfer_id), err))?;

        Ok(PoolLaunch {
            reserves,
            creation,
            deposit_transfer_id: Some(transfer_id),
            confirmation: Some(confirmation),
        })
    }
}

fn current_price(pool: &Pool) -> Result<PoolPrice> {
    let tick = pool.current_tick.ok_or_else(|| {
        ValidationError::custom(format!("pool {} reports no current tick", pool.pool_id))
    })?;
    Ok(PoolPrice::at_tick(tick)?)
}

/// `amount * (10000 - bps) / 10000`, rounded down
pub(crate) fn apply_slippage(amount: Amount, bps: u32) -> Amount {
    let keep = (MAX_BPS - bps.min(MAX_BPS)) as Amount;
    match amount.checked_mul(keep) {
        Some(scaled) => scaled / MAX_BPS as Amount,
        None => amount / MAX_BPS as Amount * keep,
    }
}

/// `amount * (10000 + bps) / 10000`, rounded up
pub(crate) fn pad_by_bps(amount: Amount, bps: u32) -> Amount {
    let scale = MAX_BPS as Amount + bps as Amount;
    match amount.checked_mul(scale) {
        Some(scaled) => (scaled + MAX_BPS as Amount - 1) / MAX_BPS as Amount,
        None => amount.saturating_add(amount / MAX_BPS as Amount * bps as Amount),
    }
}
