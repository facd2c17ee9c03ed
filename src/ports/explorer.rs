//! Explorer API Port - List and Detail Reads
//!
//! Read-only backend resources behind the explorer pages.

use async_trait::async_trait;

use crate::domain::explorer::{
  Cluster, ClusterDetails, ClusterPosStats, Dashboard, Event, IndexerStatus, Operator, Page,
  PageQuery, ProposedBlock, Validator,
};
use crate::errors::MonitorError;

#[async_trait]
pub trait ExplorerApi: Send + Sync + 'static {
  /// How far the backend's indexers have progressed.
  async fn indexer_status(&self) -> Result<IndexerStatus, MonitorError>;

  async fn dashboard(&self) -> Result<Dashboard, MonitorError>;

  async fn operators(&self, query: &PageQuery) -> Result<Page<Operator>, MonitorError>;

  async fn clusters(&self, query: &PageQuery) -> Result<Page<Cluster>, MonitorError>;

  async fn validators(&self, query: &PageQuery) -> Result<Page<Validator>, MonitorError>;

  /// Contract events; `query.search` selects an account or a cluster id.
  async fn events(&self, query: &PageQuery) -> Result<Page<Event>, MonitorError>;

  /// Blocks proposed by validators of `cluster_id`.
  async fn cluster_blocks(
    &self,
    cluster_id: &str,
    query: &PageQuery,
  ) -> Result<Page<ProposedBlock>, MonitorError>;

  async fn cluster_details(&self, cluster_id: &str) -> Result<ClusterDetails, MonitorError>;

  async fn cluster_pos_stats(&self, cluster_id: &str) -> Result<ClusterPosStats, MonitorError>;

  /// Clusters projected to liquidate within 30 days, soonest first.
  async fn liquidation_ranking(&self, query: &PageQuery) -> Result<Page<ClusterDetails>, MonitorError>;
}
