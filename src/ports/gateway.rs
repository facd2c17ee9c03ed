//! Monitor API Port - Workflow-Facing Backend Interface
//!
//! One operation per backend resource the claim and monitor workflows
//! consume. Each call issues exactly one request: non-success status,
//! error envelope or transport failure all surface as
//! [`MonitorError::RemoteFetch`] naming the resource. Nothing retries.

use alloy::primitives::Address;
use async_trait::async_trait;

use crate::domain::monitor::{AlertChannel, MonitorConfigPayload};
use crate::domain::ownership::OwnershipProof;
use crate::domain::rewards::RewardEntitlement;
use crate::errors::MonitorError;

/// Cluster-ownership summary for an address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorSummary {
  /// Clusters ever registered by the address.
  pub total_clusters: u64,
  /// Clusters currently active (not liquidated).
  pub total_active_clusters: u64,
  /// Whether a monitor configuration is stored.
  pub is_monitoring: bool,
  /// Latest block the backend processed; the next proof signs over it.
  pub block: u64,
}

impl MonitorSummary {
  /// Only owners of at least one active cluster may store a new
  /// configuration.
  pub const fn is_owner(&self) -> bool {
    self.total_active_clusters > 0
  }

  /// Whether the address ever registered a cluster. Owners whose
  /// clusters were all liquidated may still view and delete a stored
  /// configuration.
  pub const fn has_clusters(&self) -> bool {
    self.total_clusters > 0
  }
}

/// Stored configuration plus a fresh server-issued block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorConfigEnvelope {
  /// Configuration as stored (threshold already in days).
  pub config: MonitorConfigPayload,
  /// Block to sign the next proof over.
  pub block: u64,
}

/// Signed save request: the proof covers exactly `payload_json`.
#[derive(Clone, PartialEq, Eq)]
pub struct SaveConfigRequest {
  pub proof: OwnershipProof,
  pub payload_json: String,
}

impl std::fmt::Debug for SaveConfigRequest {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    // payload carries the alert channel secret
    f.debug_struct("SaveConfigRequest")
      .field("proof", &self.proof)
      .field("payload_len", &self.payload_json.len())
      .finish()
  }
}

/// Backend operations used by the claim and monitor workflows.
#[async_trait]
pub trait MonitorApi: Send + Sync + 'static {
  /// Reward entitlement published for `account`.
  async fn reward_entitlement(&self, account: Address) -> Result<RewardEntitlement, MonitorError>;

  /// Ownership summary for `owner`.
  async fn monitor_summary(&self, owner: Address) -> Result<MonitorSummary, MonitorError>;

  /// Stored configuration, gated by a fresh ownership proof.
  async fn monitor_config(&self, proof: &OwnershipProof) -> Result<MonitorConfigEnvelope, MonitorError>;

  /// Create or replace the owner's configuration.
  async fn save_monitor_config(
    &self,
    request: &SaveConfigRequest,
  ) -> Result<MonitorConfigEnvelope, MonitorError>;

  /// Remove the owner's configuration.
  async fn delete_monitor_config(&self, proof: &OwnershipProof) -> Result<(), MonitorError>;

  /// Send a test alert through `channel`. Unauthenticated.
  async fn test_alert_channel(&self, channel: &AlertChannel) -> Result<(), MonitorError>;
}
