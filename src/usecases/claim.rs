//! Claim Use Case - Cumulative Reward Search and Claim
//!
//! Drives the rewards page: look up what an account is entitled to,
//! compare with what the claim contract already paid out, and submit
//! the claim for the difference.
//!
//! Claim flow:
//! 1. `search` fetches the entitlement and reads the claimed amount
//! 2. `claim` checks whether the signer is a Safe multisig
//! 3a. Safe: submit in the background, wait the grace period, link the queue
//! 3b. Direct: submit, await the receipt, settle the snapshot locally
//!
//! Background failures land on the error channel unless the workflow
//! has moved on (new search or dispose) since the attempt started.
//! `settle_background` waits for a pending proposal before exit.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::{Address, TxHash, U256};
use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::config::ChainConfig;
use crate::domain::rewards::{RewardSnapshot, format_token_amount};
use crate::errors::MonitorError;
use crate::ports::chain_client::ChainClient;
use crate::ports::gateway::MonitorApi;
use crate::ports::wallet::{ClaimCall, Wallet};

/// How long a Safe proposal is given to propagate before the queue
/// link is shown.
pub const SAFE_PROPOSAL_GRACE: Duration = Duration::from_secs(5);

/// Link targets for claim outcomes on one network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimLinks {
  /// Block explorer base URL.
  pub explorer_url: String,
  /// Safe web app base URL.
  pub safe_app_url: String,
  /// Chain prefix the Safe app expects (`eth`, `hol`).
  pub safe_chain_prefix: String,
}

impl ClaimLinks {
  pub fn from_chain(config: &ChainConfig) -> Self {
    Self {
      explorer_url: config.explorer_url.clone(),
      safe_app_url: config.safe_app_url.clone(),
      safe_chain_prefix: config.safe_chain_prefix.clone(),
    }
  }

  /// Explorer page of a transaction.
  pub fn tx_link(&self, tx_hash: TxHash) -> String {
    format!("{}/tx/{tx_hash}", self.explorer_url.trim_end_matches('/'))
  }

  /// Pending-transaction queue of a Safe.
  pub fn safe_queue_link(&self, safe: Address) -> String {
    format!(
      "{}/transactions/queue?safe={}:{safe}",
      self.safe_app_url.trim_end_matches('/'),
      self.safe_chain_prefix
    )
  }
}

/// Where the claim page stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimState {
  /// Nothing searched yet, or the last search failed.
  Idle,
  /// Entitlement or claimed amount in flight.
  Searching,
  /// Snapshot available; claim may be attempted.
  Ready,
  /// Claim transaction being submitted.
  Claiming,
  /// Direct claim mined successfully.
  Confirmed {
    tx_hash: TxHash,
    explorer_link: String,
    confirmed_at: DateTime<Utc>,
  },
  /// Claim proposed to the signer's Safe; co-signers must execute it.
  ProposedToMultisig {
    safe_link: String,
    proposed_at: DateTime<Utc>,
  },
  /// Claim failed before confirmation. The snapshot is kept so the
  /// user may retry.
  Failed { message: String },
}

/// Rewards claim workflow for one page session.
pub struct ClaimWorkflow<A: MonitorApi, C: ChainClient, W: Wallet> {
  api: Arc<A>,
  chain: Arc<C>,
  wallet: Arc<W>,
  links: ClaimLinks,
  state: ClaimState,
  /// Result of the last successful search.
  snapshot: Option<RewardSnapshot>,
  /// Bumped by `search` and `dispose`; background tasks compare it
  /// before publishing.
  epoch: Arc<AtomicU64>,
  /// Latest user-facing error, `None` when cleared.
  errors: Arc<watch::Sender<Option<String>>>,
  /// Safe proposal still running in the background.
  proposal: Option<JoinHandle<()>>,
  disposed: bool,
}

impl<A: MonitorApi, C: ChainClient, W: Wallet> ClaimWorkflow<A, C, W> {
  /// Create a workflow in `Idle`.
  pub fn new(api: Arc<A>, chain: Arc<C>, wallet: Arc<W>, links: ClaimLinks) -> Self {
    let (errors, _rx) = watch::channel(None);
    Self {
      api,
      chain,
      wallet,
      links,
      state: ClaimState::Idle,
      snapshot: None,
      epoch: Arc::new(AtomicU64::new(0)),
      errors: Arc::new(errors),
      proposal: None,
      disposed: false,
    }
  }

  pub const fn state(&self) -> &ClaimState {
    &self.state
  }

  /// Snapshot of the last successful search.
  pub const fn snapshot(&self) -> Option<&RewardSnapshot> {
    self.snapshot.as_ref()
  }

  /// Receiver observing every published error.
  pub fn subscribe_errors(&self) -> watch::Receiver<Option<String>> {
    self.errors.subscribe()
  }

  /// Most recently published error.
  pub fn last_error(&self) -> Option<String> {
    self.errors.borrow().clone()
  }

  /// Look up the entitlement of `account` and how much of it is
  /// still claimable.
  ///
  /// An account that was never allocated anything skips the chain
  /// read. A failed chain read leaves no snapshot, so claiming stays
  /// blocked instead of assuming nothing was claimed.
  #[instrument(skip(self))]
  pub async fn search(&mut self, account: Address) -> Result<RewardSnapshot, MonitorError> {
    if self.disposed {
      return Err(MonitorError::InvalidState("workflow disposed"));
    }

    self.epoch.fetch_add(1, Ordering::SeqCst);
    self.snapshot = None;
    self.errors.send_replace(None);
    self.state = ClaimState::Searching;

    let entitlement = match self.api.reward_entitlement(account).await {
      Ok(entitlement) => entitlement,
      Err(e) => return Err(self.search_failed(e)),
    };

    let claimed = if entitlement.is_empty() {
      U256::ZERO
    } else {
      match self.chain.claimed_amount(entitlement.account).await {
        Ok(claimed) => claimed,
        Err(e) => return Err(self.search_failed(e)),
      }
    };

    let snapshot = RewardSnapshot::new(entitlement, claimed);
    info!(
      account = %account,
      eligible = %format_token_amount(snapshot.eligible()),
      claimed = %format_token_amount(snapshot.claimed),
      claimable = %format_token_amount(snapshot.claimable),
      "Rewards found"
    );

    self.snapshot = Some(snapshot.clone());
    self.state = ClaimState::Ready;
    Ok(snapshot)
  }

  fn search_failed(&mut self, error: MonitorError) -> MonitorError {
    warn!(error = %error, "Reward search failed");
    self.state = ClaimState::Idle;
    self.errors.send_replace(Some(error.display_message()));
    error
  }

  /// Claim the current delta with the connected wallet.
  ///
  /// # Errors
  /// - `InvalidState` unless a snapshot is ready (or a previous claim failed)
  /// - `NothingToClaim` when the delta is zero
  /// - `WalletNotConnected` without a session; nothing is touched
  /// - the wallet or chain error of a failed direct claim
  pub async fn claim(&mut self) -> Result<ClaimState, MonitorError> {
    if self.disposed {
      return Err(MonitorError::InvalidState("workflow disposed"));
    }
    if !matches!(self.state, ClaimState::Ready | ClaimState::Failed { .. }) {
      return Err(MonitorError::InvalidState("claim requires a completed search"));
    }
    let Some(snapshot) = self.snapshot.as_ref() else {
      return Err(MonitorError::InvalidState("claim requires a completed search"));
    };
    if !snapshot.has_claimable() {
      return Err(MonitorError::NothingToClaim);
    }
    let Some(signer) = self.wallet.address() else {
      self.errors.send_replace(Some(MonitorError::WalletNotConnected.display_message()));
      return Err(MonitorError::WalletNotConnected);
    };

    let call = ClaimCall {
      account: snapshot.entitlement.account,
      cumulative_amount: snapshot.entitlement.cumulative_amount,
      merkle_root: snapshot.entitlement.merkle_root,
      merkle_proof: snapshot.entitlement.merkle_proof.clone(),
    };
    let attempt = Uuid::new_v4();

    self.state = ClaimState::Claiming;
    self.errors.send_replace(None);

    if self.chain.is_contract_account(signer).await {
      info!(attempt = %attempt, signer = %signer, "Signer is a Safe, proposing claim");
      self.propose_to_multisig(attempt, signer, call).await;
    } else {
      info!(attempt = %attempt, signer = %signer, "Submitting direct claim");
      self.claim_directly(attempt, call).await?;
    }
    Ok(self.state.clone())
  }

  /// Fire the proposal in the background, then show the queue link
  /// after the grace period whatever the proposal's fate.
  async fn propose_to_multisig(&mut self, attempt: Uuid, safe: Address, call: ClaimCall) {
    let wallet = Arc::clone(&self.wallet);
    let errors = Arc::clone(&self.errors);
    let epoch = Arc::clone(&self.epoch);
    let started_at = epoch.load(Ordering::SeqCst);

    self.proposal = Some(tokio::spawn(async move {
      match wallet.send_claim(&call).await {
        Ok(tx_hash) => info!(attempt = %attempt, tx_hash = %tx_hash, "Safe proposal submitted"),
        Err(e) if epoch.load(Ordering::SeqCst) == started_at => {
          warn!(attempt = %attempt, error = %e, "Safe proposal failed");
          errors.send_replace(Some(e.display_message()));
        }
        Err(e) => debug!(attempt = %attempt, error = %e, "Dropping late proposal failure"),
      }
    }));

    tokio::time::sleep(SAFE_PROPOSAL_GRACE).await;

    self.state = ClaimState::ProposedToMultisig {
      safe_link: self.links.safe_queue_link(safe),
      proposed_at: Utc::now(),
    };
  }

  async fn claim_directly(&mut self, attempt: Uuid, call: ClaimCall) -> Result<(), MonitorError> {
    let outcome = match self.wallet.send_claim(&call).await {
      Ok(tx_hash) => self.wallet.wait_for_confirmation(tx_hash).await,
      Err(e) => Err(e),
    };

    match outcome {
      Ok(receipt) => {
        self.apply_confirmed_result();
        info!(
          attempt = %attempt,
          tx_hash = %receipt.tx_hash,
          block = ?receipt.block_number,
          "Claim confirmed"
        );
        self.state = ClaimState::Confirmed {
          tx_hash: receipt.tx_hash,
          explorer_link: self.links.tx_link(receipt.tx_hash),
          confirmed_at: Utc::now(),
        };
        Ok(())
      }
      Err(e) => {
        warn!(attempt = %attempt, error = %e, "Claim failed");
        let message = e.display_message();
        self.errors.send_replace(Some(message.clone()));
        self.state = ClaimState::Failed { message };
        Err(e)
      }
    }
  }

  /// Mark the snapshot fully claimed after a confirmed claim.
  ///
  /// No re-fetch: a confirmed claim transaction pays out exactly the
  /// cumulative amount it was built from.
  pub fn apply_confirmed_result(&mut self) {
    if let Some(snapshot) = self.snapshot.as_mut() {
      snapshot.settle();
    }
  }

  /// Wait for a background Safe proposal to finish, so its outcome is
  /// published before the caller moves on. Returns the latest error.
  pub async fn settle_background(&mut self) -> Option<String> {
    if let Some(handle) = self.proposal.take() {
      if let Err(e) = handle.await {
        warn!(error = %e, "Safe proposal task aborted");
      }
    }
    self.last_error()
  }

  /// Stop publishing results; background work still in flight is
  /// left to finish silently.
  pub fn dispose(&mut self) {
    self.disposed = true;
    self.epoch.fetch_add(1, Ordering::SeqCst);
  }
}
