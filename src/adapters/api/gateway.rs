//! HTTP Gateway - Backend Ports over the REST API
//!
//! Implements `MonitorApi` and `ExplorerApi` on top of [`ApiClient`].
//! Addresses go over the wire EIP-55 checksummed, the form the
//! backend compares recovered signers against.

use std::sync::Arc;

use alloy::primitives::Address;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument};

use super::client::ApiClient;
use super::types::{
  decode_page, ClusterDetailsResponse, DashboardResponse, DeleteConfigBody, ErrorEnvelope,
  MonitorConfigResponse, MonitorInfoResponse, PosDataResponse, RewardInfoResponse, SaveConfigBody,
  TestAlarmBody,
};
use crate::domain::explorer::{
  Cluster, ClusterDetails, ClusterPosStats, Dashboard, Event, IndexerStatus, Operator, Page,
  PageQuery, ProposedBlock, Validator,
};
use crate::domain::monitor::AlertChannel;
use crate::domain::ownership::OwnershipProof;
use crate::domain::rewards::RewardEntitlement;
use crate::errors::MonitorError;
use crate::ports::explorer::ExplorerApi;
use crate::ports::gateway::{MonitorApi, MonitorConfigEnvelope, MonitorSummary, SaveConfigRequest};

/// Backend gateway shared by every workflow and page.
pub struct HttpGateway {
  client: Arc<ApiClient>,
}

impl HttpGateway {
  pub fn new(client: Arc<ApiClient>) -> Self {
    Self { client }
  }

  /// Fetch one page of a listing whose rows sit under `items_key`.
  async fn page<T: DeserializeOwned>(
    &self,
    resource: &'static str,
    items_key: &str,
    mut params: Vec<(&'static str, String)>,
    query: &PageQuery,
  ) -> Result<Page<T>, MonitorError> {
    params.push(("page", query.page.to_string()));
    params.push(("limit", query.limit.to_string()));

    let body: Value = self.client.get(resource, &params).await?;
    let page = decode_page(body, items_key)
      .map_err(|e| MonitorError::remote(resource, format!("malformed response: {e}")))?;

    debug!(resource, rows = page.items.len(), page = page.current_page, "Page fetched");
    Ok(page)
  }
}

fn search_param(query: &PageQuery) -> Vec<(&'static str, String)> {
  query
    .search
    .as_ref()
    .filter(|s| !s.trim().is_empty())
    .map(|s| vec![("search", s.trim().to_string())])
    .unwrap_or_default()
}

#[async_trait]
impl MonitorApi for HttpGateway {
  #[instrument(skip(self))]
  async fn reward_entitlement(&self, account: Address) -> Result<RewardEntitlement, MonitorError> {
    let response: RewardInfoResponse = self
      .client
      .get("claim", &[("account", account.to_string())])
      .await?;

    response
      .reward_info
      .into_entitlement()
      .map_err(|reason| MonitorError::remote("claim", reason))
  }

  #[instrument(skip(self))]
  async fn monitor_summary(&self, owner: Address) -> Result<MonitorSummary, MonitorError> {
    let response: MonitorInfoResponse = self
      .client
      .get("clusterMonitorInfo", &[("owner", owner.to_string())])
      .await?;
    Ok(response.into())
  }

  #[instrument(skip(self, proof), fields(owner = %proof.owner, block = proof.block))]
  async fn monitor_config(&self, proof: &OwnershipProof) -> Result<MonitorConfigEnvelope, MonitorError> {
    let response: MonitorConfigResponse = self
      .client
      .get(
        "clusterMonitorConfig",
        &[
          ("owner", proof.owner.to_string()),
          ("block", proof.block.to_string()),
          ("signature", proof.signature.clone()),
        ],
      )
      .await?;
    Ok(response.into())
  }

  #[instrument(skip(self, request), fields(owner = %request.proof.owner, block = request.proof.block))]
  async fn save_monitor_config(
    &self,
    request: &SaveConfigRequest,
  ) -> Result<MonitorConfigEnvelope, MonitorError> {
    let body = SaveConfigBody {
      monitor_config: &request.payload_json,
      owner: request.proof.owner.to_string(),
      signature: &request.proof.signature,
      block: request.proof.block,
    };
    let response: MonitorConfigResponse = self.client.post("saveClusterMonitorConfig", &body).await?;
    Ok(response.into())
  }

  #[instrument(skip(self, proof), fields(owner = %proof.owner, block = proof.block))]
  async fn delete_monitor_config(&self, proof: &OwnershipProof) -> Result<(), MonitorError> {
    let body = DeleteConfigBody {
      owner: proof.owner.to_string(),
      signature: &proof.signature,
      block: proof.block,
    };
    let _ack: ErrorEnvelope = self.client.post("deleteClusterMonitorConfig", &body).await?;
    Ok(())
  }

  #[instrument(skip(self, channel), fields(method = %channel.method()))]
  async fn test_alert_channel(&self, channel: &AlertChannel) -> Result<(), MonitorError> {
    let body = TestAlarmBody {
      alarm_type: channel.method().wire_code(),
      alarm_channel: channel.wire_address(),
    };
    let _ack: ErrorEnvelope = self.client.post("testAlarm", &body).await?;
    Ok(())
  }
}

#[async_trait]
impl ExplorerApi for HttpGateway {
  async fn indexer_status(&self) -> Result<IndexerStatus, MonitorError> {
    self.client.get("status", &[]).await
  }

  async fn dashboard(&self) -> Result<Dashboard, MonitorError> {
    let dashboard: DashboardResponse = self.client.get("dashboard", &[]).await?;
    Ok(dashboard)
  }

  async fn operators(&self, query: &PageQuery) -> Result<Page<Operator>, MonitorError> {
    self.page("operators", "operators", search_param(query), query).await
  }

  async fn clusters(&self, query: &PageQuery) -> Result<Page<Cluster>, MonitorError> {
    self.page("clusters", "clusters", search_param(query), query).await
  }

  async fn validators(&self, query: &PageQuery) -> Result<Page<Validator>, MonitorError> {
    self.page("validators", "validators", search_param(query), query).await
  }

  async fn events(&self, query: &PageQuery) -> Result<Page<Event>, MonitorError> {
    self.page("events", "history", search_param(query), query).await
  }

  async fn cluster_blocks(
    &self,
    cluster_id: &str,
    query: &PageQuery,
  ) -> Result<Page<ProposedBlock>, MonitorError> {
    let params = vec![("clusterId", cluster_id.to_string())];
    self.page("blocks", "blocks", params, query).await
  }

  async fn cluster_details(&self, cluster_id: &str) -> Result<ClusterDetails, MonitorError> {
    let response: ClusterDetailsResponse = self
      .client
      .get("clusterDetails", &[("clusterId", cluster_id.to_string())])
      .await?;
    Ok(response.cluster_details)
  }

  async fn cluster_pos_stats(&self, cluster_id: &str) -> Result<ClusterPosStats, MonitorError> {
    let response: PosDataResponse = self
      .client
      .get("posData", &[("clusterId", cluster_id.to_string())])
      .await?;
    Ok(response.pos_data)
  }

  async fn liquidation_ranking(&self, query: &PageQuery) -> Result<Page<ClusterDetails>, MonitorError> {
    self
      .page("get30DayLiquidationRankingClusters", "clusters", Vec::new(), query)
      .await
  }
}
