//! Signer adapter: SHA-256 digest, then the wallet's signing capability

use codec::{IntentMessage, SignedIntent};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell};
use tracing::debug;

use crate::error::SignerError;
use crate::wallet::{Wallet, WalletError};

/// Signs challenges and intents with the wallet identity key
///
/// Wallet access is sequential: concurrent `sign` calls queue on an async mutex.
pub struct IntentSigner {
    wallet: Arc<dyn Wallet>,
    serialize: Mutex<()>,
    public_key: OnceCell<String>,
}

impl IntentSigner {
    pub fn new(wallet: Arc<dyn Wallet>) -> Self {
        Self {
            wallet,
            serialize: Mutex::new(()),
            public_key: OnceCell::new(),
        }
    }

    pub fn digest(message: &[u8]) -> [u8; 32] {
        Sha256::digest(message).into()
    }

    /// Identity public key, fetched once per signer
    pub async fn public_key(&self) -> Result<String, SignerError> {
        self.public_key
            .get_or_try_init(|| async {
                self.wallet
                    .identity_public_key()
                    .await
                    .map_err(SignerError::IdentityUnavailable)
            })
            .await
            .cloned()
    }

    pub async fn sign(&self, message: &[u8]) -> Result<Vec<u8>, SignerError> {
        let digest = Self::digest(message);
        let _turn = self.serialize.lock().await;

        let signature = self
            .wallet
            .sign(&digest)
            .await
            .map_err(SignerError::SigningFailed)?;
        if signature.is_empty() {
            return Err(SignerError::SigningFailed(WalletError::SigningRejected(
                "wallet returned an empty signature".to_string(),
            )));
        }

        debug!(digest = %hex::encode(digest), sig_len = signature.len(), "signed message");
        Ok(signature)
    }

    pub async fn sign_intent(&self, message: IntentMessage) -> Result<SignedIntent, SignerError> {
        let public_key = self.public_key().await?;
        let signature = self.sign(message.as_bytes()).await?;
        Ok(message.into_signed(public_key, signature))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use codec::{IntentFields, OperationKind};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use types::{Amount, AssetId, LightningPayment, TransferId, WalletBalance};

    use crate::wallet::WalletResult;

    /// Echoes the digest back as its signature and tracks overlapping calls
    struct EchoWallet {
        refuse: bool,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl EchoWallet {
        fn new(refuse: bool) -> Self {
            Self {
                refuse,
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Wallet for EchoWallet {
        async fn identity_public_key(&self) -> WalletResult<String> {
            Ok("02aa".to_string())
        }

        async fn sign(&self, digest: &[u8; 32]) -> WalletResult<Vec<u8>> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            tokio::task::yield_now().await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            if self.refuse {
                return Err(WalletError::SigningRejected("locked".into()));
            }
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

    #[tokio::test]
    async fn test_signs_sha256_digest() {
        let signer = IntentSigner::new(Arc::new(EchoWallet::new(false)));
        let signature = signer.sign(b"abc").await.unwrap();
        assert_eq!(
            hex::encode(signature),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[tokio::test]
    async fn test_wallet_error_is_carried_verbatim() {
        let signer = IntentSigner::new(Arc::new(EchoWallet::new(true)));
        let err = signer.sign(b"abc").await.unwrap_err();
        assert_eq!(
            err,
            SignerError::SigningFailed(WalletError::SigningRejected("locked".into()))
        );
    }

    #[tokio::test]
    async fn test_concurrent_signing_is_serialized() {
        let wallet = Arc::new(EchoWallet::new(false));
        let signer = Arc::new(IntentSigner::new(wallet.clone()));

        let tasks: Vec<_> = (0..8)
            .map(|i| {
                let signer = signer.clone();
                tokio::spawn(async move { signer.sign(&[i as u8]).await })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }
        assert_eq!(wallet.max_in_flight.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_sign_intent_attaches_key_and_signature() {
        let signer = IntentSigner::new(Arc::new(EchoWallet::new(false)));
        let fields = IntentFields::new()
            .text("poolId", "p1")
            .amount("liquidity", 10)
            .amount("minAmountA", 1)
            .amount("minAmountB", 1);
        let message = IntentMessage::build(OperationKind::RemoveLiquidity, &fields).unwrap();
        let expected = IntentSigner::digest(message.as_bytes()).to_vec();

        let signed = signer.sign_intent(message).await.unwrap();
        assert_eq!(signed.public_key(), "02aa");
        assert_eq!(signed.signature(), expected.as_slice());
    }
}
