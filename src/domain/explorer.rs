//! Explorer read models.
//!
//! Rows shown by the list and detail pages (operators, clusters,
//! validators, account history, proposed blocks, dashboard) exactly as
//! the backend serialises them. Amounts the backend already formats
//! as decimal strings stay strings.

use serde::{Deserialize, Deserializer, Serialize};

/// Execution-layer blocks per day (12 s slots).
pub const BLOCKS_PER_DAY: u64 = 7_200;

/// Seconds per execution-layer block.
pub const SECONDS_PER_BLOCK: u64 = 12;

/// Render a runway measured in blocks as `"{days}d {hours}h"`.
pub fn format_runway(blocks: u64) -> String {
    let days = blocks / BLOCKS_PER_DAY;
    let hours = (blocks % BLOCKS_PER_DAY) * SECONDS_PER_BLOCK / 3_600;
    format!("{days}d {hours}h")
}

/// Decode a JSON array that may be `null` (an empty slice on the
/// backend side) into a `Vec`.
pub(crate) fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// One page of a paginated listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_items: u64,
    pub total_pages: u64,
    pub current_page: u64,
}

impl<T> Page<T> {
    /// Empty page, used when a listing degrades after a failed fetch.
    pub const fn empty(current_page: u64) -> Self {
        Self {
            items: Vec::new(),
            total_items: 0,
            total_pages: 0,
            current_page,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Paging and search parameters shared by every listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageQuery {
    /// 1-based page number.
    pub page: u64,
    /// Rows per page.
    pub limit: u64,
    /// Free-text search (id, owner, public key... depending on listing).
    pub search: Option<String>,
}

impl Default for PageQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 10,
            search: None,
        }
    }
}

/// Short operator reference embedded in clusters and validators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorIntro {
    pub name: String,
    pub id: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operator {
    pub id: u64,
    pub name: String,
    pub owner: String,
    pub validators: u32,
    pub operator_fee: String,
    pub operator_earnings: String,
    pub privacy: bool,
    pub removed: bool,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub whitelisted_address: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cluster {
    pub id: String,
    pub owner: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub operators: Vec<OperatorIntro>,
    pub validators: u32,
    /// Whether the cluster is active (not liquidated).
    pub status: bool,
}

/// Cluster detail view, also used by the liquidation ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterDetails {
    pub id: String,
    pub owner: String,
    pub fee_recipient_address: String,
    pub active: bool,
    pub on_chain_balance: String,
    pub burn_fee: String,
    /// Blocks until liquidation.
    pub operational_runaway: u64,
    pub validator_count: u32,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub operators: Vec<OperatorIntro>,
}

impl ClusterDetails {
    /// Runway formatted as days and hours.
    pub fn runway(&self) -> String {
        format_runway(self.operational_runaway)
    }
}

/// Proof-of-stake statistics for one cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterPosStats {
    pub total_proposed_blocks: i64,
    pub total_missed_blocks: i64,
    pub total_offline_count: i64,
    pub pending_removal_count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Validator {
    pub public_key: String,
    pub owner: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub operators: Vec<OperatorIntro>,
    pub cluster_id: String,
    pub status: String,
    pub online: bool,
}

/// Contract event touching an account or cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub block: u64,
    pub transaction_hash: String,
    pub action: String,
}

/// Beacon block proposed by a cluster's validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposedBlock {
    pub proposer: u64,
    pub epoch: u64,
    pub slot: u64,
    pub block_number: u64,
}

/// Point of the network growth chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub name: String,
    pub validators: i64,
    pub operators: i64,
}

/// Indexer progress, as reported by the backend's status endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IndexerStatus {
    /// Last execution-layer block scanned for contract events.
    pub el_last_monitoring_block: u64,
    /// Last beacon epoch scanned for proposals.
    pub cl_last_proposal_monitoring_epoch: u64,
    /// Last beacon epoch scanned for validator balances.
    pub cl_last_validator_monitoring_epoch: u64,
}

/// Network-wide overview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub active_operators: i64,
    pub active_validators: i64,
    pub active_clusters: i64,
    #[serde(rename = "stakedETH")]
    pub staked_eth: i64,
    pub proposed_blocks: i64,
    pub network_fee: String,
    pub operator_validator_limit: i64,
    pub liquidation_threshold: i64,
    pub minimum_collateral: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub events: Vec<Event>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub blocks: Vec<ProposedBlock>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub validators: Vec<Validator>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub charts: Vec<ChartPoint>,
}
