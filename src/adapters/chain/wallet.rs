//! Local Wallet - Private-Key Session Signer
//!
//! Implements the `Wallet` port with an in-process private key: the
//! CLI counterpart of a browser wallet connection. One key per
//! session; `disconnect` drops it.
//!
//! Every signing or sending operation takes the prompt lock first, so
//! two workflow steps can never race for the same signer.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use alloy::network::{EthereumWallet, ReceiptResponse};
use alloy::primitives::{Address, TxHash};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::Signer;
use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::config::ChainConfig;
use crate::errors::MonitorError;
use crate::ports::wallet::{ClaimCall, ClaimReceipt, Wallet};

use super::contracts::encode_claim;

/// A connected signer plus the provider that submits its transactions.
struct Session {
    signer: PrivateKeySigner,
    provider: Arc<dyn Provider + Send + Sync>,
}

/// Private-key wallet for one network.
pub struct LocalWallet {
    /// RPC endpoint used for submitting transactions.
    rpc_url: String,
    /// Chain id the signer is bound to.
    chain_id: u64,
    /// Claim contract the wallet sends to.
    contract: Address,
    /// Receipt polling interval.
    poll_interval: Duration,
    /// Give up waiting for a receipt after this long.
    confirmation_timeout: Duration,
    /// Connected session, `None` when disconnected.
    session: RwLock<Option<Arc<Session>>>,
    /// Serialises signing prompts and submissions.
    prompt: Mutex<()>,
}

impl LocalWallet {
    /// Create a disconnected wallet for the given chain.
    pub fn new(config: &ChainConfig) -> Self {
        Self {
            rpc_url: config.rpc_url.clone(),
            chain_id: config.chain_id,
            contract: config.claim_contract,
            poll_interval: Duration::from_millis(config.receipt_poll_ms),
            confirmation_timeout: Duration::from_secs(config.confirmation_timeout_seconds),
            session: RwLock::new(None),
            prompt: Mutex::new(()),
        }
    }

    /// Connect with a hex-encoded private key; returns the address.
    #[instrument(skip_all)]
    pub async fn connect(&self, private_key: &str) -> Result<Address> {
        let signer: PrivateKeySigner = private_key
            .trim()
            .parse()
            .context("Invalid private key")?;
        let signer = signer.with_chain_id(Some(self.chain_id));
        let address = signer.address();

        let provider = ProviderBuilder::new()
            .with_recommended_fillers()
            .wallet(EthereumWallet::from(signer.clone()))
            .on_builtin(&self.rpc_url)
            .await
            .context("Failed to connect signing provider")?;
        let provider: Arc<dyn Provider + Send + Sync> = Arc::new(provider);

        let mut slot = self
            .session
            .write()
            .map_err(|_| anyhow::anyhow!("wallet session lock poisoned"))?;
        *slot = Some(Arc::new(Session { signer, provider }));

        info!(address = %address, chain_id = self.chain_id, "Wallet connected");
        Ok(address)
    }

    /// Drop the connected key.
    pub fn disconnect(&self) {
        if let Ok(mut slot) = self.session.write() {
            if slot.take().is_some() {
                info!("Wallet disconnected");
            }
        }
    }

    fn session(&self) -> Result<Arc<Session>, MonitorError> {
        self.session
            .read()
            .ok()
            .and_then(|slot| slot.clone())
            .ok_or(MonitorError::WalletNotConnected)
    }
}

#[async_trait]
impl Wallet for LocalWallet {
    fn address(&self) -> Option<Address> {
        self.session().ok().map(|s| s.signer.address())
    }

    #[instrument(skip_all)]
    async fn sign_message(&self, message: &str) -> Result<String, MonitorError> {
        let _prompt = self.prompt.lock().await;
        let session = self.session()?;

        let signature = session
            .signer
            .sign_message(message.as_bytes())
            .await
            .map_err(|e| MonitorError::SignatureRejected(e.to_string()))?;

        debug!(bytes = message.len(), "Message signed");
        Ok(alloy::hex::encode_prefixed(signature.as_bytes()))
    }

    #[instrument(skip_all, fields(account = %call.account))]
    async fn send_claim(&self, call: &ClaimCall) -> Result<TxHash, MonitorError> {
        let _prompt = self.prompt.lock().await;
        let session = self.session()?;

        let tx = TransactionRequest::default()
            .from(session.signer.address())
            .to(self.contract)
            .input(encode_claim(call).into());

        let pending = session
            .provider
            .send_transaction(tx)
            .await
            .map_err(|e| MonitorError::ChainWrite(e.to_string()))?;

        let tx_hash = *pending.tx_hash();
        info!(tx_hash = %tx_hash, "Claim transaction submitted");
        Ok(tx_hash)
    }

    #[instrument(skip(self))]
    async fn wait_for_confirmation(&self, tx_hash: TxHash) -> Result<ClaimReceipt, MonitorError> {
        let session = self.session()?;
        let mut ticker = tokio::time::interval(self.poll_interval);

        let wait = async {
            loop {
                ticker.tick().await;
                match session.provider.get_transaction_receipt(tx_hash).await {
                    Ok(Some(receipt)) => return receipt,
                    Ok(None) => continue,
                    Err(e) => warn!(error = %e, "Receipt lookup failed, polling again"),
                }
            }
        };

        let receipt = tokio::time::timeout(self.confirmation_timeout, wait)
            .await
            .map_err(|_| MonitorError::ChainWrite("timed out waiting for confirmation".into()))?;

        if !receipt.status() {
            warn!(tx_hash = %tx_hash, "Claim transaction reverted");
            return Err(MonitorError::ChainWrite("transaction reverted".into()));
        }

        info!(tx_hash = %tx_hash, block = ?receipt.block_number(), "Claim transaction confirmed");
        Ok(ClaimReceipt {
            tx_hash,
            block_number: receipt.block_number(),
        })
    }
}
