//! Session manager behaviour under concurrency, expiry, 401s and cancellation

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use codec::SignedIntent;
use futures::future::join_all;
use gateway::{
    retry_read, AuthError, AuthState, Challenge, Gateway, GatewayError, GatewayResult,
    IntentSigner, PoolFilter, ReadRetryPolicy, SessionGrant, SessionManager, SimulateSwapRequest,
    Transient, VerifyRequest, Wallet, WalletResult,
};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use types::{
    Acknowledgement, Amount, AssetId, LightningPayment, LiquidityExecution, Pool, PoolCreation,
    PoolId, Quote, SwapExecution, TransferId, WalletBalance, WithdrawalExecution,
};

struct KeyWallet;

#[async_trait]
impl Wallet for KeyWallet {
    async fn identity_public_key(&self) -> WalletResult<String> {
        Ok("02feedface".to_string())
    }

    async fn sign(&self, digest: &[u8; 32]) -> WalletResult<Vec<u8>> {
        Ok(digest.to_vec())
    }

    async fn transfer(&self, _: Amount, _: &str) -> WalletResult<TransferId> {
        unimplemented!()
    }

    async fn transfer_tokens(&self, _: &AssetId, _: Amount, _: &str) -> WalletResult<TransferId> {
        unimplemented!()
    }

    async fn get_balance(&self) -> WalletResult<WalletBalance> {
        Ok(WalletBalance::default())
    }

    async fn pay_lightning_invoice(&self, _: &str, _: Amount) -> WalletResult<LightningPayment> {
        unimplemented!()
    }

    async fn create_lightning_invoice(&self, _: Amount, _: Option<&str>) -> WalletResult<String> {
        unimplemented!()
    }
}

/// Auth-only gateway; tokens are numbered by verify call
struct AuthGateway {
    challenges: AtomicU32,
    verifies: AtomicU32,
    challenge_delay: Duration,
    /// Delay applied to the first challenge only
    first_challenge_delay: Duration,
    reject_verify: bool,
    /// Challenges answered with a network error before the gateway recovers
    failing_challenges: u32,
    token_lifetime: ChronoDuration,
}

impl AuthGateway {
    fn new() -> Self {
        Self {
            challenges: AtomicU32::new(0),
            verifies: AtomicU32::new(0),
            challenge_delay: Duration::from_millis(20),
            first_challenge_delay: Duration::from_millis(20),
            reject_verify: false,
            failing_challenges: 0,
            token_lifetime: ChronoDuration::hours(1),
        }
    }
}

#[async_trait]
impl Gateway for AuthGateway {
    async fn challenge(&self, public_key: &str) -> GatewayResult<Challenge> {
        let n = self.challenges.fetch_add(1, Ordering::SeqCst);
        let delay = if n == 0 { self.first_challenge_delay } else { self.challenge_delay };
        tokio::time::sleep(delay).await;
        if n < self.failing_challenges {
            return Err(GatewayError::Network("connection reset".to_string()));
        }
        Ok(Challenge {
            challenge: format!("login:{}:{}", public_key, n),
            expires_at: None,
        })
    }

    async fn verify(&self, request: &VerifyRequest) -> GatewayResult<SessionGrant> {
        let n = self.verifies.fetch_add(1, Ordering::SeqCst) + 1;
        if self.reject_verify || request.signature.is_empty() {
            return Err(GatewayError::Unauthorized);
        }
        Ok(SessionGrant {
            token: format!("token-{}", n),
            expires_at: Utc::now() + self.token_lifetime,
        })
    }

    async fn list_pools(&self, _: &str, _: &PoolFilter) -> GatewayResult<Vec<Pool>> {
        Ok(Vec::new())
    }

    async fn get_pool(&self, _: &str, pool_id: &PoolId) -> GatewayResult<Pool> {
        Err(GatewayError::NotFound(pool_id.to_string()))
    }

    async fn simulate_swap(&self, _: &str, request: &SimulateSwapRequest) -> GatewayResult<Quote> {
        Err(GatewayError::NotFound(request.pool_id.to_string()))
    }

    async fn swap(&self, _: &str, _: &SignedIntent) -> GatewayResult<SwapExecution> {
        unimplemented!()
    }

    async fn add_liquidity(&self, _: &str, _: &SignedIntent) -> GatewayResult<LiquidityExecution> {
        unimplemented!()
    }

    async fn remove_liquidity(&self, _: &str, _: &SignedIntent) -> GatewayResult<WithdrawalExecution> {
        unimplemented!()
    }

    async fn collect_fees(&self, _: &str, _: &SignedIntent) -> GatewayResult<WithdrawalExecution> {
        unimplemented!()
    }

    async fn create_constant_product_pool(&self, _: &str, _: &SignedIntent) -> GatewayResult<PoolCreation> {
        unimplemented!()
    }

    async fn create_single_sided_pool(&self, _: &str, _: &SignedIntent) -> GatewayResult<PoolCreation> {
        unimplemented!()
    }

    async fn create_concentrated_pool(&self, _: &str, _: &SignedIntent) -> GatewayResult<PoolCreation> {
        unimplemented!()
    }

    async fn confirm_initial_deposit(&self, _: &str, _: &SignedIntent) -> GatewayResult<Acknowledgement> {
        unimplemented!()
    }

    async fn register_host(&self, _: &str, _: &SignedIntent) -> GatewayResult<Acknowledgement> {
        unimplemented!()
    }

    async fn withdraw_host_fees(&self, _: &str, _: &SignedIntent) -> GatewayResult<WithdrawalExecution> {
        unimplemented!()
    }

    async fn withdraw_integrator_fees(&self, _: &str, _: &SignedIntent) -> GatewayResult<WithdrawalExecution> {
        unimplemented!()
    }

    async fn clawback(&self, _: &str, _: &SignedIntent) -> GatewayResult<Acknowledgement> {
        unimplemented!()
    }
}

fn manager(gateway: Arc<AuthGateway>) -> Arc<SessionManager> {
    let signer = Arc::new(IntentSigner::new(Arc::new(KeyWallet)));
    Arc::new(SessionManager::new(gateway, signer, Duration::from_secs(30)))
}

#[tokio::test]
async fn test_fifty_concurrent_callers_share_one_challenge() {
    let gateway = Arc::new(AuthGateway::new());
    let auth = manager(gateway.clone());

    let tasks: Vec<_> = (0..50)
        .map(|_| {
            let auth = auth.clone();
            tokio::spawn(async move { auth.ensure_authenticated().await })
        })
        .collect();

    let sessions: Vec<_> = join_all(tasks)
        .await
        .into_iter()
        .map(|joined| joined.unwrap().unwrap())
        .collect();

    assert_eq!(gateway.challenges.load(Ordering::SeqCst), 1);
    assert_eq!(gateway.verifies.load(Ordering::SeqCst), 1);
    assert!(sessions.iter().all(|s| s.token == "token-1"));
    assert_eq!(auth.state(), AuthState::Authenticated);
    assert_eq!(auth.authentication_count(), 1);
}

#[tokio::test]
async fn test_fast_path_skips_gateway() {
    let gateway = Arc::new(AuthGateway::new());
    let auth = manager(gateway.clone());

    assert_eq!(auth.state(), AuthState::Unauthenticated);
    auth.ensure_authenticated().await.unwrap();
    auth.ensure_authenticated().await.unwrap();
    assert_eq!(gateway.challenges.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_token_inside_skew_window_is_refreshed() {
    let gateway = Arc::new(AuthGateway {
        token_lifetime: ChronoDuration::seconds(10),
        ..AuthGateway::new()
    });
    let auth = manager(gateway.clone());

    let first = auth.ensure_authenticated().await.unwrap();
    assert_eq!(auth.state(), AuthState::Expired);

    let second = auth.ensure_authenticated().await.unwrap();
    assert_ne!(first.token, second.token);
    assert_eq!(gateway.challenges.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_concurrent_failure_is_shared() {
    let gateway = Arc::new(AuthGateway {
        reject_verify: true,
        ..AuthGateway::new()
    });
    let auth = manager(gateway.clone());

    let results = join_all((0..10).map(|_| auth.ensure_authenticated())).await;

    assert!(results
        .iter()
        .all(|r| matches!(r, Err(AuthError::AuthenticationFailed(_)))));
    assert_eq!(gateway.verifies.load(Ordering::SeqCst), 1);
    assert_eq!(auth.state(), AuthState::Unauthenticated);
}

#[tokio::test]
async fn test_network_blip_during_login_stays_retryable() {
    let gateway = Arc::new(AuthGateway {
        failing_challenges: 1,
        ..AuthGateway::new()
    });
    let auth = manager(gateway.clone());
    let policy = ReadRetryPolicy::new(3, Duration::from_millis(1), Duration::from_millis(5));
    let auth = &auth;

    let pools = retry_read(&policy, "list pools", || {
        let gw = gateway.clone();
        async move {
            auth.call(move |token| {
                let gw = gw.clone();
                async move { gw.list_pools(&token, &PoolFilter::default()).await }
            })
            .await
        }
    })
    .await;

    assert!(pools.unwrap().is_empty());
    assert_eq!(gateway.challenges.load(Ordering::SeqCst), 2);
    assert_eq!(auth.authentication_count(), 2);
    assert_eq!(auth.state(), AuthState::Authenticated);
}

#[tokio::test]
async fn test_login_network_error_is_not_an_auth_failure() {
    let gateway = Arc::new(AuthGateway {
        failing_challenges: 1,
        ..AuthGateway::new()
    });
    let auth = manager(gateway);

    let err = auth.ensure_authenticated().await.unwrap_err();
    assert_eq!(err, AuthError::Gateway(GatewayError::Network("connection reset".into())));
    assert!(Transient::is_transient(&err));
}

#[tokio::test]
async fn test_unauthorized_triggers_one_reauth_and_one_retry() {
    let gateway = Arc::new(AuthGateway::new());
    let auth = manager(gateway.clone());
    let calls = AtomicU32::new(0);
    let calls = &calls;

    let result = auth
        .call(move |token| async move {
            calls.fetch_add(1, Ordering::SeqCst);
            if token == "token-1" {
                Err(GatewayError::Unauthorized)
            } else {
                Ok(token)
            }
        })
        .await;

    assert_eq!(result.unwrap(), "token-2");
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(gateway.challenges.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_second_unauthorized_is_fatal() {
    let gateway = Arc::new(AuthGateway::new());
    let auth = manager(gateway.clone());
    let calls = AtomicU32::new(0);
    let calls = &calls;

    let result: Result<(), AuthError> = auth
        .call(move |_| async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(GatewayError::Unauthorized)
        })
        .await;

    assert!(matches!(result, Err(AuthError::AuthenticationFailed(_))));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(gateway.challenges.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_other_gateway_errors_pass_through() {
    let gateway = Arc::new(AuthGateway::new());
    let auth = manager(gateway.clone());
    let gw = gateway.clone();

    let result = auth
        .call(move |token| {
            let gw = gw.clone();
            async move { gw.get_pool(&token, &PoolId::new("p404")).await }
        })
        .await;

    assert_eq!(
        result.unwrap_err(),
        AuthError::Gateway(GatewayError::NotFound("p404".into()))
    );
    assert_eq!(gateway.challenges.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_stale_invalidation_keeps_newer_session() {
    let gateway = Arc::new(AuthGateway::new());
    let auth = manager(gateway.clone());

    let first = auth.ensure_authenticated().await.unwrap();
    auth.invalidate(&first.token);
    let second = auth.ensure_authenticated().await.unwrap();
    assert_eq!(second.token, "token-2");

    // A late 401 for the first token must not discard the second
    auth.invalidate(&first.token);
    assert_eq!(auth.state(), AuthState::Authenticated);
    assert_eq!(auth.ensure_authenticated().await.unwrap().token, "token-2");
    assert_eq!(gateway.challenges.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_cancelled_authentication_does_not_wedge() {
    let gateway = Arc::new(AuthGateway {
        first_challenge_delay: Duration::from_secs(5),
        ..AuthGateway::new()
    });
    let auth = manager(gateway.clone());

    let cancelled =
        tokio::time::timeout(Duration::from_millis(20), auth.ensure_authenticated()).await;
    assert!(cancelled.is_err());
    assert_eq!(auth.state(), AuthState::Unauthenticated);

    let session = auth.ensure_authenticated().await.unwrap();
    assert_eq!(session.token, "token-1");
    assert_eq!(auth.state(), AuthState::Authenticated);
}
