//! Signed Requests - Fresh Ownership Proofs per Backend Call
//!
//! Every owner-scoped read or write carries its own signature over the
//! block the backend issued most recently, and for writes over the
//! exact payload bytes as well. Nothing is cached: two calls mean two
//! wallet prompts.

use std::sync::Arc;

use alloy::primitives::Address;
use tracing::debug;

use crate::domain::ownership::{ownership_message, OwnershipProof};
use crate::errors::MonitorError;
use crate::ports::wallet::Wallet;

/// Builds ownership proofs with the session wallet.
pub struct SignedRequestBuilder<W: Wallet> {
  wallet: Arc<W>,
}

impl<W: Wallet> SignedRequestBuilder<W> {
  pub fn new(wallet: Arc<W>) -> Self {
    Self { wallet }
  }

  /// Address proofs would be signed by, if a wallet is connected.
  pub fn signer(&self) -> Option<Address> {
    self.wallet.address()
  }

  /// Sign the ownership message for `block`, bound to `payload` when
  /// one accompanies the request.
  ///
  /// # Errors
  /// `WalletNotConnected` without a session, or whatever the wallet
  /// reports when it refuses to sign.
  pub async fn prove(&self, block: u64, payload: Option<&str>) -> Result<OwnershipProof, MonitorError> {
    let owner = self.wallet.address().ok_or(MonitorError::WalletNotConnected)?;
    let message = ownership_message(block, payload);
    let signature = self.wallet.sign_message(&message).await?;

    debug!(
      owner = %owner,
      block,
      bound_to_payload = payload.is_some(),
      "Ownership proof signed"
    );

    Ok(OwnershipProof {
      owner,
      block,
      signature,
    })
  }
}
