//! Read Provider - alloy-rs 0.9 Connection Management
//!
//! Manages the read-only JSON-RPC connection for one network.
//! Validates the chain id at startup so a mainnet contract address
//! is never read through a testnet endpoint (or the reverse).
//!
//! The provider is stored type-erased as `dyn Provider`; alloy's
//! builder returns a deeply nested filler type otherwise.

use std::sync::Arc;

use alloy::providers::{Provider, ProviderBuilder};
use anyhow::{bail, Context, Result};
use tracing::{info, instrument};

use crate::config::ChainConfig;

/// Shared read-only RPC provider backed by alloy-rs 0.9.
pub struct ReadProvider {
    /// The alloy provider (type-erased).
    provider: Arc<dyn Provider + Send + Sync>,
    /// Chain id reported by the endpoint at connect time.
    chain_id: u64,
}

impl ReadProvider {
    /// Connect to the configured RPC endpoint and validate its chain id.
    #[instrument(skip_all, fields(network = %config.network))]
    pub async fn connect(config: &ChainConfig) -> Result<Self> {
        let provider = ProviderBuilder::new()
            .on_builtin(&config.rpc_url)
            .await
            .context("Failed to connect to RPC endpoint")?;

        let provider: Arc<dyn Provider + Send + Sync> = Arc::new(provider);

        let chain_id = provider
            .get_chain_id()
            .await
            .context("Failed to query chain ID")?;

        if chain_id != config.chain_id {
            bail!(
                "RPC endpoint for {} reports chain_id={chain_id}, expected {}",
                config.network,
                config.chain_id
            );
        }

        info!(chain_id, "Connected to RPC");

        Ok(Self { provider, chain_id })
    }

    /// Get a shared reference to the alloy provider (type-erased).
    pub fn inner(&self) -> Arc<dyn Provider + Send + Sync> {
        Arc::clone(&self.provider)
    }

    /// Chain id validated at connect time.
    pub const fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Check if the RPC connection is healthy via a lightweight call.
    pub async fn is_healthy(&self) -> bool {
        self.provider.get_block_number().await.is_ok()
    }
}
