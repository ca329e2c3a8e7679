//! JSON-over-HTTPS gateway client

use async_trait::async_trait;
use codec::{OperationKind, SignedIntent};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use satswap_config::GatewayConfig;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use types::{
    Acknowledgement, LiquidityExecution, Pool, PoolCreation, PoolId, Quote, SwapExecution,
    WithdrawalExecution,
};

use crate::api::{Challenge, Gateway, PoolFilter, SessionGrant, SimulateSwapRequest, VerifyRequest};
use crate::error::{GatewayError, GatewayResult};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ChallengeRequest<'a> {
    public_key: &'a str,
}

#[derive(Deserialize)]
struct PoolList {
    pools: Vec<Pool>,
}

/// Gateway reached over HTTPS with bearer-token auth
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl HttpGateway {
    pub fn new(config: &GatewayConfig) -> GatewayResult<Self> {
        let timeout = Duration::from_millis(config.request_timeout_ms);
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| GatewayError::InvalidRequest(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn transport_error(&self, err: reqwest::Error) -> GatewayError {
        if err.is_timeout() {
            GatewayError::Timeout {
                timeout_ms: self.timeout.as_millis() as u64,
            }
        } else {
            GatewayError::Network(err.to_string())
        }
    }

    async fn send(&self, request: RequestBuilder) -> GatewayResult<(StatusCode, String)> {
        let response: Response = request.send().await.map_err(|e| self.transport_error(e))?;
        let status = response.status();
        let body = response.text().await.map_err(|e| self.transport_error(e))?;
        Ok((status, body))
    }

    fn decode<T: DeserializeOwned>(path: &str, status: StatusCode, body: &str) -> GatewayResult<T> {
        if status == StatusCode::UNAUTHORIZED {
            return Err(GatewayError::Unauthorized);
        }
        if status == StatusCode::NOT_FOUND {
            return Err(GatewayError::NotFound(path.to_string()));
        }
        if !status.is_success() {
            return Err(GatewayError::Http {
                status: status.as_u16(),
                body: body.to_string(),
            });
        }
        serde_json::from_str(body).map_err(|e| GatewayError::Decode(format!("{}: {}", path, e)))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, token: &str) -> GatewayResult<T> {
        let request = self.client.get(self.url(path)).bearer_auth(token);
        let (status, body) = self.send(request).await?;
        Self::decode(path, status, &body)
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&str>,
        body: &B,
    ) -> GatewayResult<T> {
        let mut request = self.client.post(self.url(path)).json(body);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        let (status, text) = self.send(request).await?;
        Self::decode(path, status, &text)
    }

    /// Post a signed intent to its kind's endpoint
    ///
    /// A 4xx whose body is a well-formed outcome is a rejection, not a transport error.
    async fn submit<T: DeserializeOwned>(
        &self,
        expected: OperationKind,
        token: &str,
        intent: &SignedIntent,
    ) -> GatewayResult<T> {
        if intent.kind() != expected {
            return Err(GatewayError::InvalidRequest(format!(
                "{} intent posted to the {} endpoint",
                intent.kind(),
                expected
            )));
        }

        let path = expected.endpoint();
        let request = self
            .client
            .post(self.url(path))
            .bearer_auth(token)
            .json(&intent.to_request_body());
        let (status, body) = self.send(request).await?;
        debug!(kind = %expected, status = status.as_u16(), "intent submitted");

        if status.is_client_error()
            && status != StatusCode::UNAUTHORIZED
            && status != StatusCode::NOT_FOUND
        {
            if let Ok(outcome) = serde_json::from_str::<T>(&body) {
                return Ok(outcome);
            }
        }
        Self::decode(path, status, &body)
    }
}

#[async_trait]
impl Gateway for HttpGateway {
    async fn challenge(&self, public_key: &str) -> GatewayResult<Challenge> {
        self.post("auth/challenge", None, &ChallengeRequest { public_key }).await
    }

    async fn verify(&self, request: &VerifyRequest) -> GatewayResult<SessionGrant> {
        self.post("auth/verify", None, request).await
    }

    async fn list_pools(&self, token: &str, filter: &PoolFilter) -> GatewayResult<Vec<Pool>> {
        let request = self.client.get(self.url("pools")).bearer_auth(token).query(filter);
        let (status, body) = self.send(request).await?;
        let list: PoolList = Self::decode("pools", status, &body)?;
        Ok(list.pools)
    }

    async fn get_pool(&self, token: &str, pool_id: &PoolId) -> GatewayResult<Pool> {
        self.get(&format!("pools/{}", pool_id), token).await
    }

    async fn simulate_swap(&self, token: &str, request: &SimulateSwapRequest) -> GatewayResult<Quote> {
        self.post("swap/simulate", Some(token), request).await
    }

    async fn swap(&self, token: &str, intent: &SignedIntent) -> GatewayResult<SwapExecution> {
        self.submit(OperationKind::Swap, token, intent).await
    }

    async fn add_liquidity(&self, token: &str, intent: &SignedIntent) -> GatewayResult<LiquidityExecution> {
        self.submit(OperationKind::AddLiquidity, token, intent).await
    }

    async fn remove_liquidity(&self, token: &str, intent: &SignedIntent) -> GatewayResult<WithdrawalExecution> {
        self.submit(OperationKind::RemoveLiquidity, token, intent).await
    }

    async fn collect_fees(&self, token: &str, intent: &SignedIntent) -> GatewayResult<WithdrawalExecution> {
        self.submit(OperationKind::CollectFees, token, intent).await
    }

    async fn create_constant_product_pool(&self, token: &str, intent: &SignedIntent) -> GatewayResult<PoolCreation> {
        self.submit(OperationKind::CreateConstantProductPool, token, intent).await
    }

    async fn create_single_sided_pool(&self, token: &str, intent: &SignedIntent) -> GatewayResult<PoolCreation> {
        self.submit(OperationKind::CreateSingleSidedPool, token, intent).await
    }

    async fn create_concentrated_pool(&self, token: &str, intent: &SignedIntent) -> GatewayResult<PoolCreation> {
        self.submit(OperationKind::CreateConcentratedPool, token, intent).await
    }

    async fn confirm_initial_deposit(&self, token: &str, intent: &SignedIntent) -> GatewayResult<Acknowledgement> {
        self.submit(OperationKind::ConfirmInitialDeposit, token, intent).await
    }

    async fn register_host(&self, token: &str, intent: &SignedIntent) -> GatewayResult<Acknowledgement> {
        self.submit(OperationKind::RegisterHost, token, intent).await
    }

    async fn withdraw_host_fees(&self, token: &str, intent: &SignedIntent) -> GatewayResult<WithdrawalExecution> {
        self.submit(OperationKind::WithdrawHostFees, token, intent).await
    }

    async fn withdraw_integrator_fees(&self, token: &str, intent: &SignedIntent) -> GatewayResult<WithdrawalExecution> {
        self.submit(OperationKind::WithdrawIntegratorFees, token, intent).await
    }

    async fn clawback(&self, token: &str, intent: &SignedIntent) -> GatewayResult<Acknowledgement> {
        self.submit(OperationKind::Clawback, token, intent).await
    }
}
