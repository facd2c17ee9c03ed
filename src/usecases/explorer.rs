//! Explorer Use Case - Read-through Pages over the Backend
//!
//! Listings never fail a page: an unavailable listing renders as an
//! empty page and the failure is logged. Detail reads (one cluster,
//! the dashboard) surface their error so the caller can say so.

use std::sync::Arc;

use serde::Serialize;
use tracing::{instrument, warn};

use crate::domain::explorer::{
  Cluster, ClusterDetails, ClusterPosStats, Dashboard, Event, IndexerStatus, Operator, Page,
  PageQuery, ProposedBlock, Validator,
};
use crate::errors::MonitorError;
use crate::ports::explorer::ExplorerApi;

/// Everything the cluster page shows.
#[derive(Debug, Clone, Serialize)]
pub struct ClusterOverview {
  pub details: ClusterDetails,
  /// `None` when the stats are unavailable (no beacon telemetry).
  pub pos_stats: Option<ClusterPosStats>,
  pub blocks: Page<ProposedBlock>,
  pub events: Page<Event>,
}

/// Everything the account page shows.
#[derive(Debug, Clone, Serialize)]
pub struct AccountOverview {
  pub clusters: Page<Cluster>,
  pub validators: Page<Validator>,
  pub events: Page<Event>,
}

/// Explorer page loader.
pub struct ExplorerPages<E: ExplorerApi> {
  api: Arc<E>,
}

impl<E: ExplorerApi> ExplorerPages<E> {
  pub fn new(api: Arc<E>) -> Self {
    Self { api }
  }

  pub async fn indexer_status(&self) -> Result<IndexerStatus, MonitorError> {
    self.api.indexer_status().await
  }

  pub async fn dashboard(&self) -> Result<Dashboard, MonitorError> {
    self.api.dashboard().await
  }

  pub async fn operators(&self, query: &PageQuery) -> Page<Operator> {
    or_empty("operators", query, self.api.operators(query).await)
  }

  pub async fn clusters(&self, query: &PageQuery) -> Page<Cluster> {
    or_empty("clusters", query, self.api.clusters(query).await)
  }

  pub async fn validators(&self, query: &PageQuery) -> Page<Validator> {
    or_empty("validators", query, self.api.validators(query).await)
  }

  /// Event history of an account or a cluster, selected by `query.search`.
  pub async fn events(&self, query: &PageQuery) -> Page<Event> {
    or_empty("events", query, self.api.events(query).await)
  }

  pub async fn cluster_blocks(&self, cluster_id: &str, query: &PageQuery) -> Page<ProposedBlock> {
    or_empty("blocks", query, self.api.cluster_blocks(cluster_id, query).await)
  }

  pub async fn cluster_details(&self, cluster_id: &str) -> Result<ClusterDetails, MonitorError> {
    self.api.cluster_details(cluster_id).await
  }

  pub async fn cluster_pos_stats(&self, cluster_id: &str) -> Result<ClusterPosStats, MonitorError> {
    self.api.cluster_pos_stats(cluster_id).await
  }

  /// Clusters closest to liquidation within the next 30 days.
  pub async fn liquidation_ranking(&self, query: &PageQuery) -> Page<ClusterDetails> {
    or_empty(
      "get30DayLiquidationRankingClusters",
      query,
      self.api.liquidation_ranking(query).await,
    )
  }

  /// Load the cluster page. Only the details are mandatory.
  #[instrument(skip(self))]
  pub async fn cluster_overview(&self, cluster_id: &str) -> Result<ClusterOverview, MonitorError> {
    let query = PageQuery::default();
    let history = PageQuery {
      search: Some(cluster_id.to_string()),
      ..PageQuery::default()
    };

    let (details, pos_stats, blocks, events) = tokio::join!(
      self.api.cluster_details(cluster_id),
      self.api.cluster_pos_stats(cluster_id),
      self.cluster_blocks(cluster_id, &query),
      self.events(&history),
    );

    let pos_stats = pos_stats
      .inspect_err(|e| warn!(cluster_id, error = %e, "Cluster stats unavailable"))
      .ok();

    Ok(ClusterOverview {
      details: details?,
      pos_stats,
      blocks,
      events,
    })
  }

  /// Load the account page: the account's clusters, validators and history.
  #[instrument(skip(self))]
  pub async fn account_overview(&self, account: &str) -> AccountOverview {
    let query = PageQuery {
      search: Some(account.to_string()),
      ..PageQuery::default()
    };

    let (clusters, validators, events) = tokio::join!(
      self.clusters(&query),
      self.validators(&query),
      self.events(&query),
    );

    AccountOverview {
      clusters,
      validators,
      events,
    }
  }
}

fn or_empty<T>(resource: &'static str, query: &PageQuery, result: Result<Page<T>, MonitorError>) -> Page<T> {
  result.unwrap_or_else(|e| {
    warn!(resource, page = query.page, error = %e, "Listing unavailable, showing empty page");
    Page::empty(query.page)
  })
}
