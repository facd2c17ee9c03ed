//! Claim Contract - Cumulative Merkle Drop Bindings
//!
//! Implements the `ChainClient` port against the rewards claim
//! contract: the cumulative amount already claimed per account, and
//! code-presence checks used to detect Safe multisig owners.

use std::sync::Arc;

use alloy::primitives::{Address, Bytes, B256, U256};
use alloy::providers::Provider;
use alloy::rpc::types::TransactionRequest;
use alloy::sol;
use alloy::sol_types::SolCall;
use async_trait::async_trait;
use tracing::{debug, instrument, warn};

use crate::errors::MonitorError;
use crate::ports::chain_client::ChainClient;
use crate::ports::wallet::ClaimCall;

use super::provider::ReadProvider;

sol! {
    /// Cumulative Merkle drop: each account claims the difference
    /// between its published cumulative amount and what it claimed.
    interface ICumulativeMerkleDrop {
        function merkleRoot() external view returns (bytes32);
        function cumulativeClaimed(address account) external view returns (uint256);
        function claim(
            address account,
            uint256 cumulativeAmount,
            bytes32 expectedMerkleRoot,
            bytes32[] merkleProof
        ) external;
    }
}

/// ABI-encoded calldata for `claim`.
pub fn encode_claim(call: &ClaimCall) -> Bytes {
    ICumulativeMerkleDrop::claimCall {
        account: call.account,
        cumulativeAmount: call.cumulative_amount,
        expectedMerkleRoot: call.merkle_root,
        merkleProof: call.merkle_proof.clone(),
    }
    .abi_encode()
    .into()
}

/// Read-only view of the claim contract.
pub struct ClaimContractReader {
    /// Shared read provider.
    provider: Arc<ReadProvider>,
    /// Claim contract address from config.
    contract: Address,
}

impl ClaimContractReader {
    pub fn new(provider: Arc<ReadProvider>, contract: Address) -> Self {
        Self { provider, contract }
    }

    /// Claim contract address.
    pub const fn contract(&self) -> Address {
        self.contract
    }

    async fn eth_call(&self, data: Vec<u8>) -> Result<Bytes, MonitorError> {
        let tx = TransactionRequest::default()
            .to(self.contract)
            .input(Bytes::from(data).into());

        self.provider
            .inner()
            .call(&tx)
            .await
            .map_err(|e| MonitorError::ChainRead(e.to_string()))
    }

    /// Merkle root currently accepted by the contract.
    #[instrument(skip(self))]
    pub async fn merkle_root(&self) -> Result<B256, MonitorError> {
        let output = self
            .eth_call(ICumulativeMerkleDrop::merkleRootCall {}.abi_encode())
            .await?;
        let decoded = ICumulativeMerkleDrop::merkleRootCall::abi_decode_returns(&output, true)
            .map_err(|e| MonitorError::ChainRead(format!("undecodable merkleRoot: {e}")))?;
        Ok(decoded._0)
    }
}

#[async_trait]
impl ChainClient for ClaimContractReader {
    #[instrument(skip(self))]
    async fn claimed_amount(&self, account: Address) -> Result<U256, MonitorError> {
        let output = self
            .eth_call(ICumulativeMerkleDrop::cumulativeClaimedCall { account }.abi_encode())
            .await?;
        let decoded = ICumulativeMerkleDrop::cumulativeClaimedCall::abi_decode_returns(&output, true)
            .map_err(|e| MonitorError::ChainRead(format!("undecodable cumulativeClaimed: {e}")))?;

        debug!(claimed = %decoded._0, "Claimed amount read");
        Ok(decoded._0)
    }

    #[instrument(skip(self))]
    async fn is_contract_account(&self, address: Address) -> bool {
        match self.provider.inner().get_code_at(address).await {
            Ok(code) => !code.is_empty(),
            Err(e) => {
                // an unknown account type is treated as a plain EOA
                warn!(error = %e, "Code lookup failed, assuming externally owned account");
                false
            }
        }
    }

    async fn is_healthy(&self) -> bool {
        self.provider.is_healthy().await
    }
}
