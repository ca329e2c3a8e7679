//! # Composite Lightning Payment Flow
//!
//! Pays a Lightning invoice with a token balance by swapping token → BTC on the best
//! pool and then paying the invoice from the wallet. The two legs settle on separate
//! networks with no shared commit, so every terminal state reports where the
//! funds are.
//!
//! ```text
//! NotStarted → SwapSubmitted ─┬─ rejected ───────────────────────────→ Failed
//!                             └─ accepted → SwapConfirmed → SecondaryActionAttempted
//!                                                            ├─ paid ─→ Completed
//!                                                            └─ failed → recovery
//!                                                                ├─ ok ──→ RolledBack
//!                                                                └─ err ─→ Failed
//! ```
//!
//! Everything after the swap submission runs on a detached tokio task. Dropping the
//! caller's future stops the caller waiting, not the recovery.

use satswap_config::RecoveryPolicy;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};
use types::{
    validate_bps, Amount, AssetId, LightningPayment, PoolId, Quote, SwapRequest, TransferId,
    ValidationError, MAX_BPS,
};

use crate::confirm::wait_for_credit;
use crate::error::{Result, TradeError};
use crate::invoice::invoice_amount_sats;
use crate::orchestrator::{SwapReport, Trader};
use crate::{log_error, log_lightning, log_recovery, log_success, log_warning};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositeStage {
    NotStarted,
    SwapSubmitted,
    SwapConfirmed,
    SecondaryActionAttempted,
    Completed,
    RolledBack,
    Failed,
}

impl CompositeStage {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::RolledBack | Self::Failed)
    }
}

impl fmt::Display for CompositeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NotStarted => "not_started",
            Self::SwapSubmitted => "swap_submitted",
            Self::SwapConfirmed => "swap_confirmed",
            Self::SecondaryActionAttempted => "secondary_action_attempted",
            Self::Completed => "completed",
            Self::RolledBack => "rolled_back",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Where the user's funds sit when the flow stops
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FundLocation {
    /// Nothing left the wallet
    Untouched,
    /// Spendable BTC in the wallet, measured as the balance delta since the flow began
    WalletBtc { sats: Amount },
    /// Swapped back into the token
    WalletToken { asset: AssetId, amount: Amount },
    /// Invoice paid
    LightningPaid { payment_id: String, sats: Amount },
    /// Transferred to a pool and not executed; reclaimable with a clawback
    Pool {
        pool_id: PoolId,
        asset: AssetId,
        amount: Amount,
        transfer_id: TransferId,
    },
    /// Drawn from the gateway free balance for a swap whose outcome never came back;
    /// either still in the free balance or already swapped at the pool
    Unconfirmed {
        pool_id: PoolId,
        asset: AssetId,
        amount: Amount,
    },
    /// Swap executed but the BTC credit had not reached the wallet by the deadline
    InTransit {
        pool_id: PoolId,
        sats: Amount,
        transfer_id: Option<TransferId>,
    },
}

impl fmt::Display for FundLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Untouched => write!(f, "untouched in wallet"),
            Self::WalletBtc { sats } => write!(f, "{} sats in wallet", sats),
            Self::WalletToken { asset, amount } => write!(f, "{} {} in wallet", amount, asset),
            Self::LightningPaid { payment_id, sats } => {
                write!(f, "{} sats paid over Lightning ({})", sats, payment_id)
            }
            Self::Pool {
                pool_id,
                asset,
                amount,
                transfer_id,
            } => write!(
                f,
                "{} {} at pool {} (transfer {})",
                amount, asset, pool_id, transfer_id
            ),
            Self::Unconfirmed {
                pool_id,
                asset,
                amount,
            } => write!(
                f,
                "{} {} unconfirmed at pool {} (gateway free balance)",
                amount, asset, pool_id
            ),
            Self::InTransit {
                pool_id,
                sats,
                transfer_id,
            } => match transfer_id {
                Some(id) => write!(f, "{} sats in transit from pool {} ({})", sats, pool_id, id),
                None => write!(f, "{} sats in transit from pool {}", sats, pool_id),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecoveryOutcome {
    pub policy: RecoveryPolicy,
    pub succeeded: bool,
    pub reverse_swap: Option<SwapReport>,
    pub detail: Option<String>,
}

/// Both legs of a completed payment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentReceipt {
    pub pool_id: PoolId,
    pub input_transfer_id: Option<TransferId>,
    pub token_spent: Amount,
    pub sats_received: Amount,
    pub payment_id: String,
    pub invoice_amount_sats: Amount,
}

/// State of one composite flow, returned on every exit path
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeReport {
    pub stage: CompositeStage,
    pub token: AssetId,
    pub invoice_amount_sats: Amount,
    pub routing_fee_sats: Amount,
    pub min_amount_out: Amount,
    pub swap: Option<SwapReport>,
    pub payment: Option<LightningPayment>,
    pub recovery: Option<RecoveryOutcome>,
    pub fund_location: FundLocation,
    pub failure: Option<String>,
}

impl CompositeReport {
    pub fn summary(&self) -> String {
        match &self.failure {
            Some(reason) => format!("{}: {}; funds {}", self.stage, reason, self.fund_location),
            None => format!("{}; funds {}", self.stage, self.fund_location),
        }
    }

    /// Receipt joining both legs, present only once the invoice is paid
    pub fn receipt(&self) -> Option<PaymentReceipt> {
        if self.stage != CompositeStage::Completed {
            return None;
        }
        let swap = self.swap.as_ref()?;
        let payment = self.payment.as_ref()?;
        Some(PaymentReceipt {
            pool_id: swap.quote.pool_id.clone(),
            input_transfer_id: swap.input_transfer_id.clone(),
            token_spent: swap.execution.amount_in,
            sats_received: swap.execution.amount_out,
            payment_id: payment.payment_id.clone(),
            invoice_amount_sats: self.invoice_amount_sats,
        })
    }

    fn advance(&mut self, stage: CompositeStage) {
        info!(from = %self.stage, to = %stage, "composite stage");
        self.stage = stage;
    }
}

/// Request to pay `invoice` by selling `token`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoicePayment {
    pub invoice: String,
    pub token: AssetId,
    /// Token input; estimated from pool reserves when `None`
    pub amount_in: Option<Amount>,
    /// Required for zero-amount invoices, must agree with the invoice otherwise
    pub amount_sats: Option<Amount>,
    pub max_slippage_bps: Option<u32>,
}

impl InvoicePayment {
    pub fn new(invoice: impl Into<String>, token: AssetId) -> Self {
        Self {
            invoice: invoice.into(),
            token,
            amount_in: None,
            amount_sats: None,
            max_slippage_bps: None,
        }
    }
}

/// Output floor: the slippage floor, never below what the invoice needs
pub fn compute_min_amount_out(quote: &Quote, max_slippage_bps: u32, required_sats: Amount) -> Amount {
    quote.slippage_floor(max_slippage_bps).max(required_sats)
}

/// `max(ceil(amount * bps / 10000), min_fee)`
pub fn estimate_routing_fee(amount_sats: Amount, routing_fee_bps: u32, min_fee_sats: u64) -> Amount {
    let bps = routing_fee_bps as Amount;
    let proportional = amount_sats
        .checked_mul(bps)
        .map(|scaled| (scaled + MAX_BPS as Amount - 1) / MAX_BPS as Amount)
        .unwrap_or_else(|| (amount_sats / MAX_BPS as Amount).saturating_mul(bps));
    proportional.max(min_fee_sats as Amount)
}

fn resolve_invoice_amount(payment: &InvoicePayment) -> Result<Amount> {
    let encoded = invoice_amount_sats(&payment.invoice)?;
    let amount = match (encoded, payment.amount_sats) {
        (Some(encoded), Some(explicit)) if encoded != explicit => {
            return Err(ValidationError::InvalidInvoice {
                reason: format!("invoice encodes {} sats but {} were given", encoded, explicit),
            }
            .into())
        }
        (Some(encoded), _) => encoded,
        (None, Some(explicit)) => explicit,
        (None, None) => {
            return Err(ValidationError::InvalidInvoice {
                reason: "zero-amount invoice needs an explicit amount".to_string(),
            }
            .into())
        }
    };
    if amount == 0 {
        return Err(ValidationError::NonPositiveAmount { field: "amount_sats" }.into());
    }
    Ok(amount)
}

/// Where a swap input sits after a submission with no answer
fn unsettled_location(
    pool_id: PoolId,
    asset: AssetId,
    amount: Amount,
    transfer_ids: Vec<TransferId>,
) -> FundLocation {
    match transfer_ids.into_iter().next() {
        Some(transfer_id) => FundLocation::Pool {
            pool_id,
            asset,
            amount,
            transfer_id,
        },
        None => FundLocation::Unconfirmed {
            pool_id,
            asset,
            amount,
        },
    }
}

/// Everything the detached half of the flow needs
struct PreparedPayment {
    invoice: String,
    request: SwapRequest,
    pool_id: PoolId,
    max_slippage_bps: u32,
    baseline_btc: Amount,
    report: CompositeReport,
}

impl Trader {
    /// Pay a Lightning invoice from a token balance
    ///
    /// Returns `Ok` when the invoice was paid or the swap was rejected without
    /// anything changing hands. Any error once the swap has been handed over comes
    /// back as [`TradeError::PartialFailure`] with the fund location.
    pub async fn pay_invoice_with_token(self: &Arc<Self>, payment: InvoicePayment) -> Result<CompositeReport> {
        let execution = &self.config().execution;
        let max_slippage_bps = validate_bps(
            "max_slippage_bps",
            payment.max_slippage_bps.unwrap_or(execution.default_slippage_bps),
        )?;
        let invoice_amount = resolve_invoice_amount(&payment)?;

        let routing_fee = match self.wallet().estimate_lightning_fee(&payment.invoice).await? {
            Some(fee) => fee,
            None => estimate_routing_fee(
                invoice_amount,
                execution.routing_fee_bps,
                execution.min_routing_fee_sats,
            ),
        };
        let required = invoice_amount.saturating_add(routing_fee);

        let btc = AssetId::btc();
        let amount_in = match payment.amount_in {
            Some(amount) => amount,
            None => {
                self.estimate_input_for(&payment.token, &btc, required, max_slippage_bps)
                    .await?
            }
        };
        let request = SwapRequest {
            asset_in: payment.token.clone(),
            asset_out: btc,
            amount_in,
        };

        let quote = self.selector().select_best(&request, None).await?;
        if quote.amount_out < required {
            return Err(TradeError::InsufficientOutput {
                quoted: quote.amount_out,
                required,
            });
        }
        let min_amount_out = compute_min_amount_out(&quote, max_slippage_bps, required);
        log_lightning!(
            "Paying {} sats (+{} routing) with {} {} via pool {}, min out {}",
            invoice_amount,
            routing_fee,
            amount_in,
            payment.token,
            quote.pool_id,
            min_amount_out
        );

        let baseline_btc = self.wallet().get_balance().await?.btc_sats;
        let prepared = PreparedPayment {
            invoice: payment.invoice,
            request,
            pool_id: quote.pool_id.clone(),
            max_slippage_bps,
            baseline_btc,
            report: CompositeReport {
                stage: CompositeStage::NotStarted,
                token: payment.token,
                invoice_amount_sats: invoice_amount,
                routing_fee_sats: routing_fee,
                min_amount_out,
                swap: None,
                payment: None,
                recovery: None,
                fund_location: FundLocation::Untouched,
                failure: None,
            },
        };

        let trader = Arc::clone(self);
        tokio::spawn(async move { trader.run_payment(prepared).await })
            .await
            .map_err(|err| TradeError::TaskFailed(err.to_string()))?
    }

    async fn run_payment(self: Arc<Self>, prepared: PreparedPayment) -> Result<CompositeReport> {
        let PreparedPayment {
            invoice,
            request,
            pool_id,
            max_slippage_bps,
            baseline_btc,
            mut report,
        } = prepared;

        report.advance(CompositeStage::SwapSubmitted);
        let swap = match self
            .execute_swap(&request, &pool_id, max_slippage_bps, report.min_amount_out)
            .await
        {
            Ok(swap) => swap,
            Err(TradeError::Unsettled {
                pool_id,
                transfer_ids,
                reason,
            }) => {
                report.fund_location =
                    unsettled_location(pool_id, request.asset_in.clone(), request.amount_in, transfer_ids);
                return Err(self.fail(report, reason));
            }
            // nothing reached the gateway
            Err(err) => return Err(self.fail(report, err.to_string())),
        };

        if !swap.accepted() {
            let reason = swap
                .execution
                .rejection
                .as_ref()
                .map(|r| r.to_string())
                .unwrap_or_else(|| "swap rejected".to_string());
            report.fund_location = match (&swap.input_transfer_id, swap.funds_at_pool()) {
                (Some(transfer_id), true) => FundLocation::Pool {
                    pool_id: pool_id.clone(),
                    asset: request.asset_in.clone(),
                    amount: request.amount_in,
                    transfer_id: transfer_id.clone(),
                },
                _ => FundLocation::Untouched,
            };
            report.swap = Some(swap);
            report.advance(CompositeStage::Failed);
            log_warning!("Invoice not paid, swap rejected: {}", reason);
            report.failure = Some(reason);
            return Ok(report);
        }

        let received = swap.execution.amount_out;
        let outbound = swap.execution.outbound_transfer_id.clone();
        report.swap = Some(swap);

        let execution = &self.config().execution;
        let credited = wait_for_credit(
            self.wallet().as_ref(),
            &request.asset_out,
            baseline_btc,
            received,
            execution.poll_interval(),
            execution.confirmation_deadline(),
        )
        .await;
        if let Err(err) = credited {
            report.fund_location = FundLocation::InTransit {
                pool_id,
                sats: received,
                transfer_id: outbound,
            };
            return Err(self.fail(report, err.to_string()));
        }
        report.advance(CompositeStage::SwapConfirmed);

        let required = report.invoice_amount_sats.saturating_add(report.routing_fee_sats);
        let payment_error = if received < required {
            Some(format!("swap produced {} sats, invoice needs {}", received, required))
        } else {
            report.advance(CompositeStage::SecondaryActionAttempted);
            match self
                .wallet()
                .pay_lightning_invoice(&invoice, report.routing_fee_sats)
                .await
            {
                Ok(payment) if payment.success => {
                    report.fund_location = FundLocation::LightningPaid {
                        payment_id: payment.payment_id.clone(),
                        sats: report.invoice_amount_sats,
                    };
                    log_success!("Invoice paid ({})", payment.payment_id);
                    report.payment = Some(payment);
                    report.advance(CompositeStage::Completed);
                    return Ok(report);
                }
                Ok(payment) => {
                    let reason = payment
                        .error
                        .clone()
                        .unwrap_or_else(|| "payment failed".to_string());
                    report.payment = Some(payment);
                    Some(reason)
                }
                Err(err) => Some(err.to_string()),
            }
        };

        let reason = payment_error.unwrap_or_default();
        log_error!("Lightning payment failed after swap: {}", reason);
        report.failure = Some(reason);
        self.recover(&mut report, &request, &pool_id, max_slippage_bps, baseline_btc)
            .await;
        Err(TradeError::PartialFailure(Box::new(report)))
    }

    fn fail(&self, mut report: CompositeReport, reason: String) -> TradeError {
        report.advance(CompositeStage::Failed);
        log_error!("Composite flow failed: {}; funds {}", reason, report.fund_location);
        report.failure = Some(reason);
        TradeError::PartialFailure(Box::new(report))
    }

    /// BTC the flow added to the wallet, measured rather than assumed
    async fn btc_delta(&self, baseline_btc: Amount) -> Result<Amount> {
        let balance = self.wallet().get_balance().await?;
        Ok(balance.btc_sats.saturating_sub(baseline_btc))
    }

    async fn recover(
        &self,
        report: &mut CompositeReport,
        request: &SwapRequest,
        pool_id: &PoolId,
        max_slippage_bps: u32,
        baseline_btc: Amount,
    ) {
        let policy = self.config().execution.recovery_policy;
        log_recovery!("Recovering swapped BTC with policy {:?}", policy);

        let delta = match self.btc_delta(baseline_btc).await {
            Ok(delta) => delta,
            Err(err) => {
                let received = report.swap.as_ref().map_or(0, |s| s.execution.amount_out);
                report.fund_location = FundLocation::WalletBtc { sats: received };
                report.recovery = Some(RecoveryOutcome {
                    policy,
                    succeeded: false,
                    reverse_swap: None,
                    detail: Some(format!("balance unavailable: {}", err)),
                });
                report.advance(CompositeStage::Failed);
                return;
            }
        };
        debug!(delta, "btc balance delta since flow start");

        let outcome = match policy {
            RecoveryPolicy::KeepBtc => {
                report.fund_location = FundLocation::WalletBtc { sats: delta };
                RecoveryOutcome {
                    policy,
                    succeeded: true,
                    reverse_swap: None,
                    detail: None,
                }
            }
            RecoveryPolicy::ReverseSwap => {
                self.reverse_swap(report, request, pool_id, max_slippage_bps, delta, baseline_btc)
                    .await
            }
        };

        let stage = if outcome.succeeded {
            CompositeStage::RolledBack
        } else {
            CompositeStage::Failed
        };
        log_recovery!(
            "Recovery {}; funds {}",
            if outcome.succeeded { "succeeded" } else { "failed" },
            report.fund_location
        );
        report.recovery = Some(outcome);
        report.advance(stage);
    }

    async fn reverse_swap(
        &self,
        report: &mut CompositeReport,
        request: &SwapRequest,
        pool_id: &PoolId,
        max_slippage_bps: u32,
        delta: Amount,
        baseline_btc: Amount,
    ) -> RecoveryOutcome {
        let policy = RecoveryPolicy::ReverseSwap;
        report.fund_location = FundLocation::WalletBtc { sats: delta };
        if delta == 0 {
            return RecoveryOutcome {
                policy,
                succeeded: false,
                reverse_swap: None,
                detail: Some("no BTC credit to reverse".to_string()),
            };
        }

        let reverse = SwapRequest {
            asset_in: request.asset_out.clone(),
            asset_out: request.asset_in.clone(),
            amount_in: delta,
        };
        let attempt = match self.selector().quote_pool(pool_id, &reverse).await {
            Ok(quote) => {
                let floor = quote.slippage_floor(max_slippage_bps);
                self.execute_swap(&reverse, pool_id, max_slippage_bps, floor)
                    .await
            }
            Err(err) => Err(err),
        };

        match attempt {
            Ok(swap) if swap.accepted() => {
                report.fund_location = FundLocation::WalletToken {
                    asset: reverse.asset_out.clone(),
                    amount: swap.execution.amount_out,
                };
                RecoveryOutcome {
                    policy,
                    succeeded: true,
                    reverse_swap: Some(swap),
                    detail: None,
                }
            }
            Ok(swap) => {
                if let (Some(transfer_id), true) = (&swap.input_transfer_id, swap.funds_at_pool()) {
                    report.fund_location = FundLocation::Pool {
                        pool_id: pool_id.clone(),
                        asset: reverse.asset_in.clone(),
                        amount: delta,
                        transfer_id: transfer_id.clone(),
                    };
                } else if let Ok(now) = self.btc_delta(baseline_btc).await {
                    report.fund_location = FundLocation::WalletBtc { sats: now };
                }
                let detail = swap.execution.rejection.as_ref().map(|r| r.to_string());
                RecoveryOutcome {
                    policy,
                    succeeded: false,
                    reverse_swap: Some(swap),
                    detail,
                }
            }
            Err(TradeError::Unsettled {
                pool_id,
                transfer_ids,
                reason,
            }) => {
                report.fund_location =
                    unsettled_location(pool_id, reverse.asset_in.clone(), delta, transfer_ids);
                RecoveryOutcome {
                    policy,
                    succeeded: false,
                    reverse_swap: None,
                    detail: Some(reason),
                }
            }
            Err(err) => RecoveryOutcome {
                policy,
                succeeded: false,
                reverse_swap: None,
                detail: Some(err.to_string()),
            },
        }
    }
}
