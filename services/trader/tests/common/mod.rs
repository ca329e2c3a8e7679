//! In-memory wallet and gateway sharing one ledger
//!
//! The gateway settles swaps against the same balances the wallet reports, so flows
//! that poll for credits or measure balance deltas observe real movement.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use codec::{OperationKind, SignedIntent};
use gateway::{
    Challenge, Gateway, GatewayError, GatewayResult, PoolFilter, SessionGrant,
    SimulateSwapRequest, VerifyRequest, Wallet, WalletError, WalletResult,
};
use parking_lot::Mutex;
use satswap_amm::ConstantProductState;
use satswap_config::TraderConfig;
use satswap_trader::Trader;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use types::{
    Acknowledgement, Amount, AssetId, CurveType, Decimal, FeeRates, LightningPayment,
    LiquidityExecution, Pool, PoolCreation, PoolId, PoolStatus, Quote, Rejection, RejectionCode,
    SwapExecution, TransferId, WalletBalance, WithdrawalExecution,
};

pub fn token() -> AssetId {
    AssetId::new("tok")
}

#[derive(Debug, Clone)]
pub struct Transfer {
    pub id: TransferId,
    pub asset: AssetId,
    pub amount: Amount,
    pub destination: String,
}

#[derive(Debug, Default)]
pub struct Ledger {
    pub btc: Amount,
    pub tokens: HashMap<AssetId, Amount>,
    pub transfers: Vec<Transfer>,
    pub paid_invoices: Vec<String>,
    next_id: u32,
}

impl Ledger {
    fn credit(&mut self, asset: &AssetId, amount: Amount) {
        if asset.is_btc() {
            self.btc += amount;
        } else {
            *self.tokens.entry(asset.clone()).or_default() += amount;
        }
    }

    fn debit(&mut self, asset: &AssetId, amount: Amount) -> WalletResult<()> {
        let available = if asset.is_btc() {
            self.btc
        } else {
            self.tokens.get(asset).copied().unwrap_or(0)
        };
        if available < amount {
            return Err(WalletError::InsufficientFunds {
                needed: amount,
                available,
            });
        }
        if asset.is_btc() {
            self.btc -= amount;
        } else {
            *self.tokens.entry(asset.clone()).or_default() -= amount;
        }
        Ok(())
    }

    pub fn balance_of(&self, asset: &AssetId) -> Amount {
        if asset.is_btc() {
            self.btc
        } else {
            self.tokens.get(asset).copied().unwrap_or(0)
        }
    }
}

pub type SharedLedger = Arc<Mutex<Ledger>>;

pub fn ledger(btc: Amount, tokens: Amount) -> SharedLedger {
    let mut ledger = Ledger {
        btc,
        ..Ledger::default()
    };
    ledger.tokens.insert(token(), tokens);
    Arc::new(Mutex::new(ledger))
}

pub struct MockWallet {
    pub ledger: SharedLedger,
    pub fee_estimate: Mutex<Option<Amount>>,
    pub fail_payments: Mutex<Option<String>>,
    pub payment_delay: Mutex<Option<Duration>>,
}

impl MockWallet {
    pub fn new(ledger: SharedLedger) -> Self {
        Self {
            ledger,
            fee_estimate: Mutex::new(None),
            fail_payments: Mutex::new(None),
            payment_delay: Mutex::new(None),
        }
    }

    fn record_transfer(&self, asset: &AssetId, amount: Amount, destination: &str) -> WalletResult<TransferId> {
        let mut ledger = self.ledger.lock();
        ledger.debit(asset, amount)?;
        ledger.next_id += 1;
        let id = TransferId::new(format!("xfer-{}", ledger.next_id));
        ledger.transfers.push(Transfer {
            id: id.clone(),
            asset: asset.clone(),
            amount,
            destination: destination.to_string(),
        });
        Ok(id)
    }
}

#[async_trait]
impl Wallet for MockWallet {
    async fn identity_public_key(&self) -> WalletResult<String> {
        Ok("02c0ffee".to_string())
    }

    async fn sign(&self, digest: &[u8; 32]) -> WalletResult<Vec<u8>> {
        Ok(digest.to_vec())
    }

    async fn transfer(&self, amount_sats: Amount, destination: &str) -> WalletResult<TransferId> {
        self.record_transfer(&AssetId::btc(), amount_sats, destination)
    }

    async fn transfer_tokens(&self, asset: &AssetId, amount: Amount, destination: &str) -> WalletResult<TransferId> {
        self.record_transfer(asset, amount, destination)
    }

    async fn get_balance(&self) -> WalletResult<WalletBalance> {
        let ledger = self.ledger.lock();
        Ok(WalletBalance {
            btc_sats: ledger.btc,
            token_balances: ledger.tokens.clone(),
        })
    }

    async fn pay_lightning_invoice(&self, invoice: &str, _max_fee_sats: Amount) -> WalletResult<LightningPayment> {
        let delay = *self.payment_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(reason) = self.fail_payments.lock().clone() {
            return Ok(LightningPayment {
                payment_id: "pay-failed".to_string(),
                success: false,
                error: Some(reason),
            });
        }
        let amount = satswap_trader::invoice_amount_sats(invoice)
            .map_err(|err| WalletError::Lightning(err.to_string()))?
            .unwrap_or(0);
        let mut ledger = self.ledger.lock();
        ledger.debit(&AssetId::btc(), amount)?;
        ledger.paid_invoices.push(invoice.to_string());
        Ok(LightningPayment {
            payment_id: format!("pay-{}", ledger.paid_invoices.len()),
            success: true,
            error: None,
        })
    }

    async fn create_lightning_invoice(&self, amount_sats: Amount, _memo: Option<&str>) -> WalletResult<String> {
        Ok(format!("lnbc{}n1mock", amount_sats * 10))
    }

    async fn estimate_lightning_fee(&self, _invoice: &str) -> WalletResult<Option<Amount>> {
        Ok(*self.fee_estimate.lock())
    }
}

/// Canned simulate behaviour for one `(pool, asset_in)` direction
#[derive(Debug, Clone)]
pub enum Simulation {
    Output(Amount),
    Fail(GatewayError),
    Delay(Duration, Amount),
}

/// What the gateway does with a submitted swap
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwapMode {
    Settle,
    /// Accept without crediting the wallet
    AcceptWithoutCredit,
    Reject(RejectionCode),
    Fail,
}

pub struct MockGateway {
    pub ledger: SharedLedger,
    pub pools: Mutex<Vec<Pool>>,
    pub simulations: Mutex<HashMap<(PoolId, AssetId), Simulation>>,
    pub swap_mode: Mutex<SwapMode>,
    pub reject_liquidity: Mutex<bool>,
    pub fail_liquidity: Mutex<bool>,
    pub submitted: Mutex<Vec<(OperationKind, Value)>>,
    pub simulate_calls: Mutex<u32>,
    pub logins: Mutex<u32>,
}

impl MockGateway {
    pub fn new(ledger: SharedLedger) -> Self {
        Self {
            ledger,
            pools: Mutex::new(Vec::new()),
            simulations: Mutex::new(HashMap::new()),
            swap_mode: Mutex::new(SwapMode::Settle),
            reject_liquidity: Mutex::new(false),
            fail_liquidity: Mutex::new(false),
            submitted: Mutex::new(Vec::new()),
            simulate_calls: Mutex::new(0),
            logins: Mutex::new(0),
        }
    }

    pub fn add_pool(&self, pool: Pool) {
        self.pools.lock().push(pool);
    }

    pub fn simulate_as(&self, pool_id: &str, asset_in: &AssetId, simulation: Simulation) {
        self.simulations
            .lock()
            .insert((PoolId::new(pool_id), asset_in.clone()), simulation);
    }

    pub fn submissions(&self, kind: OperationKind) -> Vec<Value> {
        self.submitted
            .lock()
            .iter()
            .filter(|(k, _)| *k == kind)
            .map(|(_, fields)| fields.clone())
            .collect()
    }

    fn record(&self, intent: &SignedIntent) -> Value {
        let fields: Value = serde_json::from_slice(intent.message().as_bytes()).unwrap();
        self.submitted.lock().push((intent.kind(), fields.clone()));
        fields
    }

    fn pool(&self, pool_id: &PoolId) -> GatewayResult<Pool> {
        self.pools
            .lock()
            .iter()
            .find(|p| &p.pool_id == pool_id)
            .cloned()
            .ok_or_else(|| GatewayError::NotFound(pool_id.to_string()))
    }

    fn output_for(&self, pool_id: &PoolId, asset_in: &AssetId, amount_in: Amount) -> GatewayResult<Quote> {
        let canned = self.simulations.lock().get(&(pool_id.clone(), asset_in.clone())).cloned();
        let amount_out = match canned {
            Some(Simulation::Output(out)) | Some(Simulation::Delay(_, out)) => out,
            Some(Simulation::Fail(err)) => return Err(err),
            None => {
                let pool = self.pool(pool_id)?;
                let estimate = ConstantProductState::from_pool(&pool, asset_in)
                    .and_then(|curve| curve.quote(amount_in))
                    .map_err(|err| GatewayError::InvalidRequest(err.to_string()))?;
                return Ok(Quote {
                    pool_id: pool_id.clone(),
                    amount_in,
                    amount_out: estimate.amount_out,
                    fee_paid: estimate.fee_paid,
                    price_impact_pct: estimate.price_impact_pct,
                    execution_price: estimate.execution_price,
                });
            }
        };
        Ok(Quote {
            pool_id: pool_id.clone(),
            amount_in,
            amount_out,
            fee_paid: amount_in * 30 / 10_000,
            price_impact_pct: Decimal::new(5, 1),
            execution_price: Decimal::from(amount_out as u64) / Decimal::from(amount_in.max(1) as u64),
        })
    }

    fn accepted_ack() -> Acknowledgement {
        Acknowledgement {
            accepted: true,
            rejection: None,
        }
    }
}

pub fn amount(fields: &Value, name: &str) -> Amount {
    fields[name].as_str().unwrap().parse().unwrap()
}

fn rejection(code: RejectionCode, message: &str) -> Option<Rejection> {
    Some(Rejection {
        code,
        message: message.to_string(),
    })
}

#[async_trait]
impl Gateway for MockGateway {
    async fn challenge(&self, public_key: &str) -> GatewayResult<Challenge> {
        Ok(Challenge {
            challenge: format!("login:{}", public_key),
            expires_at: None,
        })
    }

    async fn verify(&self, _request: &VerifyRequest) -> GatewayResult<SessionGrant> {
        let mut logins = self.logins.lock();
        *logins += 1;
        Ok(SessionGrant {
            token: format!("token-{}", *logins),
            expires_at: Utc::now() + ChronoDuration::hours(1),
        })
    }

    async fn list_pools(&self, _token: &str, filter: &PoolFilter) -> GatewayResult<Vec<Pool>> {
        Ok(self
            .pools
            .lock()
            .iter()
            .filter(|pool| filter.matches(pool))
            .cloned()
            .collect())
    }

    async fn get_pool(&self, _token: &str, pool_id: &PoolId) -> GatewayResult<Pool> {
        self.pool(pool_id)
    }

    async fn simulate_swap(&self, _token: &str, request: &SimulateSwapRequest) -> GatewayResult<Quote> {
        *self.simulate_calls.lock() += 1;
        let canned = self
            .simulations
            .lock()
            .get(&(request.pool_id.clone(), request.asset_in.clone()))
            .cloned();
        if let Some(Simulation::Delay(delay, _)) = canned {
            tokio::time::sleep(delay).await;
        }
        self.output_for(&request.pool_id, &request.asset_in, request.amount_in)
    }

    async fn swap(&self, _token: &str, intent: &SignedIntent) -> GatewayResult<SwapExecution> {
        let fields = self.record(intent);
        let pool_id = PoolId::new(fields["poolId"].as_str().unwrap());
        let asset_in = AssetId::new(fields["assetIn"].as_str().unwrap());
        let asset_out = AssetId::new(fields["assetOut"].as_str().unwrap());
        let amount_in = amount(&fields, "amountIn");
        let min_out = amount(&fields, "minAmountOut");

        let mode = self.swap_mode.lock().clone();
        let quote = self.output_for(&pool_id, &asset_in, amount_in)?;
        let rejected = |code: RejectionCode, message: &str| SwapExecution {
            accepted: false,
            amount_in,
            amount_out: 0,
            fee_paid: 0,
            outbound_transfer_id: None,
            rejection: rejection(code, message),
        };

        match &mode {
            SwapMode::Fail => Err(GatewayError::Network("connection reset".to_string())),
            SwapMode::Reject(code) => Ok(rejected(code.clone(), "rejected by pool")),
            _ if quote.amount_out < min_out => Ok(rejected(RejectionCode::SlippageExceeded, "below minimum")),
            SwapMode::Settle | SwapMode::AcceptWithoutCredit => {
                if mode == SwapMode::Settle {
                    self.ledger.lock().credit(&asset_out, quote.amount_out);
                }
                Ok(SwapExecution {
                    accepted: true,
                    amount_in,
                    amount_out: quote.amount_out,
                    fee_paid: quote.fee_paid,
                    outbound_transfer_id: Some(TransferId::new(format!("out-{}", pool_id))),
                    rejection: None,
                })
            }
        }
    }

    async fn add_liquidity(&self, _token: &str, intent: &SignedIntent) -> GatewayResult<LiquidityExecution> {
        let fields = self.record(intent);
        if *self.fail_liquidity.lock() {
            return Err(GatewayError::Timeout { timeout_ms: 5_000 });
        }
        if *self.reject_liquidity.lock() {
            return Ok(LiquidityExecution {
                accepted: false,
                amount_a_used: 0,
                amount_b_used: 0,
                refund_a: 0,
                refund_b: 0,
                liquidity: 0,
                rejection: rejection(RejectionCode::PoolInactive, "pool paused"),
            });
        }
        Ok(LiquidityExecution {
            accepted: true,
            amount_a_used: amount(&fields, "amountA"),
            amount_b_used: amount(&fields, "amountB"),
            refund_a: 0,
            refund_b: 0,
            liquidity: amount(&fields, "minLiquidity") + 1,
            rejection: None,
        })
    }

    async fn remove_liquidity(&self, _token: &str, intent: &SignedIntent) -> GatewayResult<WithdrawalExecution> {
        let fields = self.record(intent);
        Ok(WithdrawalExecution {
            accepted: true,
            amount_a: amount(&fields, "minAmountA"),
            amount_b: amount(&fields, "minAmountB"),
            outbound_transfer_ids: vec![TransferId::new("out-remove")],
            rejection: None,
        })
    }

    async fn collect_fees(&self, _token: &str, intent: &SignedIntent) -> GatewayResult<WithdrawalExecution> {
        self.record(intent);
        Ok(WithdrawalExecution {
            accepted: true,
            amount_a: 12,
            amount_b: 7,
            outbound_transfer_ids: Vec::new(),
            rejection: None,
        })
    }

    async fn create_constant_product_pool(&self, _token: &str, intent: &SignedIntent) -> GatewayResult<PoolCreation> {
        self.record(intent);
        Ok(PoolCreation {
            accepted: true,
            pool_id: Some(PoolId::new("pool-cp")),
            rejection: None,
        })
    }

    async fn create_single_sided_pool(&self, _token: &str, intent: &SignedIntent) -> GatewayResult<PoolCreation> {
        self.record(intent);
        Ok(PoolCreation {
            accepted: true,
            pool_id: Some(PoolId::new("pool-launch")),
            rejection: None,
        })
    }

    async fn create_concentrated_pool(&self, _token: &str, intent: &SignedIntent) -> GatewayResult<PoolCreation> {
        self.record(intent);
        Ok(PoolCreation {
            accepted: true,
            pool_id: Some(PoolId::new("pool-cl")),
            rejection: None,
        })
    }

    async fn confirm_initial_deposit(&self, _token: &str, intent: &SignedIntent) -> GatewayResult<Acknowledgement> {
        self.record(intent);
        Ok(Self::accepted_ack())
    }

    async fn register_host(&self, _token: &str, intent: &SignedIntent) -> GatewayResult<Acknowledgement> {
        self.record(intent);
        Ok(Self::accepted_ack())
    }

    async fn withdraw_host_fees(&self, _token: &str, intent: &SignedIntent) -> GatewayResult<WithdrawalExecution> {
        let fields = self.record(intent);
        Ok(WithdrawalExecution {
            accepted: true,
            amount_a: amount(&fields, "assetAAmount"),
            amount_b: amount(&fields, "assetBAmount"),
            outbound_transfer_ids: Vec::new(),
            rejection: None,
        })
    }

    async fn withdraw_integrator_fees(&self, _token: &str, intent: &SignedIntent) -> GatewayResult<WithdrawalExecution> {
        let fields = self.record(intent);
        Ok(WithdrawalExecution {
            accepted: true,
            amount_a: amount(&fields, "assetAAmount"),
            amount_b: amount(&fields, "assetBAmount"),
            outbound_transfer_ids: Vec::new(),
            rejection: None,
        })
    }

    async fn clawback(&self, _token: &str, intent: &SignedIntent) -> GatewayResult<Acknowledgement> {
        let fields = self.record(intent);
        let transfer_id = fields["transferId"].as_str().unwrap();
        let mut ledger = self.ledger.lock();
        let returned = ledger
            .transfers
            .iter()
            .find(|t| t.id.as_str() == transfer_id)
            .map(|t| (t.asset.clone(), t.amount));
        match returned {
            Some((asset, amount)) => {
                ledger.credit(&asset, amount);
                Ok(Self::accepted_ack())
            }
            None => Ok(Acknowledgement {
                accepted: false,
                rejection: rejection(RejectionCode::Other("unknown_transfer".to_string()), "no such transfer"),
            }),
        }
    }
}

pub fn pool(id: &str, curve_type: CurveType, reserve_a: Amount, reserve_b: Amount) -> Pool {
    Pool {
        pool_id: PoolId::new(id),
        asset_a: token(),
        asset_b: AssetId::btc(),
        curve_type,
        fee_rates: FeeRates {
            lp_fee_bps: 30,
            host_fee_bps: 0,
        },
        status: PoolStatus::Active,
        reserve_a,
        reserve_b,
        tick_spacing: match curve_type {
            CurveType::Concentrated => Some(60),
            _ => None,
        },
        current_tick: match curve_type {
            CurveType::Concentrated => Some(0),
            _ => None,
        },
        host_namespace: None,
    }
}

/// Fast polling so flows settle in milliseconds
pub fn test_config() -> TraderConfig {
    let mut config = TraderConfig::default();
    config.quotes.timeout_ms = 500;
    config.quotes.max_read_attempts = 2;
    config.quotes.backoff_base_ms = 1;
    config.quotes.backoff_max_ms = 5;
    config.execution.poll_interval_ms = 5;
    config.execution.confirmation_deadline_ms = 200;
    config
}

pub struct Harness {
    pub ledger: SharedLedger,
    pub wallet: Arc<MockWallet>,
    pub gateway: Arc<MockGateway>,
    pub trader: Arc<Trader>,
}

pub fn harness(config: TraderConfig, gateway: MockGateway) -> Harness {
    let ledger = gateway.ledger.clone();
    let wallet = Arc::new(MockWallet::new(ledger.clone()));
    let gateway = Arc::new(gateway);
    let trader = Arc::new(Trader::new(config, wallet.clone(), gateway.clone()));
    Harness {
        ledger,
        wallet,
        gateway,
        trader,
    }
}
