//! Chain Client Port - Read-only Ledger Interface
//!
//! Reads the claim contract and inspects account code over a public
//! RPC endpoint. Never signs. Uses alloy-rs.

use alloy::primitives::{Address, U256};
use async_trait::async_trait;

use crate::errors::MonitorError;

/// Trait for read-only chain access.
#[async_trait]
pub trait ChainClient: Send + Sync + 'static {
  /// Cumulative amount already claimed by `account`.
  ///
  /// Fails with [`MonitorError::ChainRead`]; callers must treat the
  /// value as unknown rather than zero.
  async fn claimed_amount(&self, account: Address) -> Result<U256, MonitorError>;

  /// Whether `address` has deployed code (a Safe multisig).
  ///
  /// A failed lookup answers `false`.
  async fn is_contract_account(&self, address: Address) -> bool;

  /// Check if the RPC connection is healthy.
  async fn is_healthy(&self) -> bool;
}
