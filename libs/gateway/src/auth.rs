//! Session/auth manager
//!
//! ```text
//! Unauthenticated ──ensure──▶ Authenticating ──ok──▶ Authenticated
//!        ▲                        │                      │
//!        └────────failure─────────┘        expiry / 401  ▼
//!        └──────────────────────────────────────────── Expired
//! ```
//!
//! At most one challenge-response runs at a time. Callers arriving while one is in
//! flight wait for it and share its outcome instead of starting their own.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use codec::{IntentFields, IntentMessage, OperationKind, SignedIntent};
use parking_lot::{Mutex as SyncMutex, RwLock};
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::api::{Gateway, VerifyRequest};
use crate::error::{AuthError, GatewayError, GatewayResult};
use crate::signer::IntentSigner;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Unauthenticated,
    Authenticating,
    Authenticated,
    Expired,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub public_key: String,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    fn is_fresh(&self, now: DateTime<Utc>, skew: ChronoDuration) -> bool {
        now < self.expires_at - skew
    }
}

/// Clears the authenticating flag however the attempt ends, cancellation included
struct AuthenticatingFlag<'a>(&'a AtomicBool);

impl<'a> AuthenticatingFlag<'a> {
    fn raise(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(flag)
    }
}

impl Drop for AuthenticatingFlag<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct SessionManager {
    gateway: Arc<dyn Gateway>,
    signer: Arc<IntentSigner>,
    skew: ChronoDuration,
    session: RwLock<Option<Session>>,
    refresh: Mutex<()>,
    authenticating: AtomicBool,
    /// Completed challenge-response attempts, successful or not
    attempts: AtomicU64,
    last_failure: SyncMutex<Option<AuthError>>,
}

impl SessionManager {
    pub fn new(gateway: Arc<dyn Gateway>, signer: Arc<IntentSigner>, expiry_skew: Duration) -> Self {
        let skew = ChronoDuration::from_std(expiry_skew).unwrap_or_else(|_| ChronoDuration::zero());
        Self {
            gateway,
            signer,
            skew,
            session: RwLock::new(None),
            refresh: Mutex::new(()),
            authenticating: AtomicBool::new(false),
            attempts: AtomicU64::new(0),
            last_failure: SyncMutex::new(None),
        }
    }

    pub fn signer(&self) -> &Arc<IntentSigner> {
        &self.signer
    }

    pub fn state(&self) -> AuthState {
        if self.authenticating.load(Ordering::SeqCst) {
            return AuthState::Authenticating;
        }
        match self.session.read().as_ref() {
            None => AuthState::Unauthenticated,
            Some(session) if session.is_fresh(Utc::now(), self.skew) => AuthState::Authenticated,
            Some(_) => AuthState::Expired,
        }
    }

    /// Number of challenge-response round trips completed so far
    pub fn authentication_count(&self) -> u64 {
        self.attempts.load(Ordering::SeqCst)
    }

    fn fresh_session(&self) -> Option<Session> {
        self.session
            .read()
            .as_ref()
            .filter(|session| session.is_fresh(Utc::now(), self.skew))
            .cloned()
    }

    /// Return a fresh session, authenticating if needed
    pub async fn ensure_authenticated(&self) -> Result<Session, AuthError> {
        if let Some(session) = self.fresh_session() {
            return Ok(session);
        }

        let seen_attempts = self.attempts.load(Ordering::SeqCst);
        let _refresh = self.refresh.lock().await;

        // Another caller finished while we waited
        if let Some(session) = self.fresh_session() {
            return Ok(session);
        }
        if self.attempts.load(Ordering::SeqCst) != seen_attempts {
            if let Some(err) = self.last_failure.lock().clone() {
                return Err(err);
            }
        }

        let _flag = AuthenticatingFlag::raise(&self.authenticating);
        let result = self.challenge_response().await;
        self.attempts.fetch_add(1, Ordering::SeqCst);

        match result {
            Ok(session) => {
                info!(expires_at = %session.expires_at, "🔐 Authenticated with gateway");
                *self.last_failure.lock() = None;
                *self.session.write() = Some(session.clone());
                Ok(session)
            }
            Err(err) => {
                warn!("Authentication failed: {}", err);
                // transient gateway failures stay retryable
                let keep = match &err {
                    AuthError::AuthenticationFailed(_) => true,
                    AuthError::Gateway(gateway_err) => gateway_err.is_transient(),
                    _ => false,
                };
                let err = if keep {
                    err
                } else {
                    AuthError::AuthenticationFailed(err.to_string())
                };
                *self.last_failure.lock() = Some(err.clone());
                *self.session.write() = None;
                Err(err)
            }
        }
    }

    async fn challenge_response(&self) -> Result<Session, AuthError> {
        let public_key = self.signer.public_key().await?;
        debug!(public_key = %public_key, "requesting auth challenge");
        let challenge = self.gateway.challenge(&public_key).await?;

        let signature = self.signer.sign(challenge.challenge.as_bytes()).await?;
        let grant = self
            .gateway
            .verify(&VerifyRequest {
                public_key: public_key.clone(),
                challenge: challenge.challenge,
                signature: hex::encode(signature),
            })
            .await
            .map_err(|err| match err {
                GatewayError::Unauthorized => {
                    AuthError::AuthenticationFailed("challenge signature rejected".to_string())
                }
                other => AuthError::Gateway(other),
            })?;

        if grant.token.is_empty() {
            return Err(AuthError::AuthenticationFailed("empty session token".to_string()));
        }
        Ok(Session {
            public_key,
            token: grant.token,
            expires_at: grant.expires_at,
        })
    }

    /// Drop the session if it still holds `token`
    ///
    /// A stale 401 from an old token leaves a session refreshed by another caller intact.
    pub fn invalidate(&self, token: &str) {
        let mut session = self.session.write();
        if session.as_ref().map_or(false, |s| s.token == token) {
            debug!("invalidating rejected session token");
            *session = None;
        }
    }

    /// Run an authenticated gateway call, re-authenticating once on a 401
    pub async fn call<T, F, Fut>(&self, mut op: F) -> Result<T, AuthError>
    where
        F: FnMut(String) -> Fut,
        Fut: Future<Output = GatewayResult<T>>,
    {
        let mut session = self.ensure_authenticated().await?;
        let mut retried = false;
        loop {
            match op(session.token.clone()).await {
                Err(GatewayError::Unauthorized) => {
                    session = self.after_unauthorized(&session.token, &mut retried).await?;
                }
                other => return other.map_err(AuthError::Gateway),
            }
        }
    }

    /// Build, sign and submit an intent, with a fresh nonce on every attempt
    pub async fn submit_intent<T, F, Fut>(
        &self,
        kind: OperationKind,
        fields: &IntentFields,
        mut submit: F,
    ) -> Result<T, AuthError>
    where
        F: FnMut(String, SignedIntent) -> Fut,
        Fut: Future<Output = GatewayResult<T>>,
    {
        let mut session = self.ensure_authenticated().await?;
        let mut retried = false;
        loop {
            let message = IntentMessage::build(kind, fields)?;
            let signed = self.signer.sign_intent(message).await?;
            debug!(kind = %kind, nonce = %signed.message().nonce(), "submitting intent");

            match submit(session.token.clone(), signed).await {
                Err(GatewayError::Unauthorized) => {
                    session = self.after_unauthorized(&session.token, &mut retried).await?;
                }
                other => return other.map_err(AuthError::Gateway),
            }
        }
    }

    async fn after_unauthorized(&self, token: &str, retried: &mut bool) -> Result<Session, AuthError> {
        self.invalidate(token);
        if std::mem::replace(retried, true) {
            return Err(AuthError::AuthenticationFailed(
                "token rejected after re-authentication".to_string(),
            ));
        }
        warn!("Gateway rejected session token, re-authenticating once");
        self.ensure_authenticated().await
    }
}
