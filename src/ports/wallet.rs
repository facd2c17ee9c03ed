//! Wallet Port - Session Signer Interface
//!
//! The connected signer used for ownership proofs and claim
//! transactions. One session, one address; implementations serialise
//! signing and sending so only one prompt is ever in flight.

use alloy::primitives::{Address, TxHash, B256, U256};
use async_trait::async_trait;

use crate::errors::MonitorError;

/// Arguments of the claim contract's `claim` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimCall {
  pub account: Address,
  pub cumulative_amount: U256,
  pub merkle_root: B256,
  pub merkle_proof: Vec<B256>,
}

/// Outcome of a mined transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClaimReceipt {
  pub tx_hash: TxHash,
  pub block_number: Option<u64>,
}

#[async_trait]
pub trait Wallet: Send + Sync + 'static {
  /// Connected address, `None` when no wallet is connected.
  fn address(&self) -> Option<Address>;

  /// EIP-191 personal-sign of `message`; 0x-prefixed hex signature.
  ///
  /// Fails with `WalletNotConnected` or `SignatureRejected`.
  async fn sign_message(&self, message: &str) -> Result<String, MonitorError>;

  /// Submit the claim transaction and return its hash.
  ///
  /// Fails with `WalletNotConnected` or `ChainWrite`.
  async fn send_claim(&self, call: &ClaimCall) -> Result<TxHash, MonitorError>;

  /// Await the receipt of `tx_hash`; a reverted receipt is a
  /// `ChainWrite` error.
  async fn wait_for_confirmation(&self, tx_hash: TxHash) -> Result<ClaimReceipt, MonitorError>;
}
