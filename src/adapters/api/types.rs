//! Backend API Request/Response Types
//!
//! Serialization types for the monitoring backend's JSON API, and
//! their conversion into domain types. Field names follow the wire
//! format exactly; domain code never sees these structs.

use alloy::primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::explorer::{ClusterDetails, ClusterPosStats, Dashboard, Page};
use crate::domain::monitor::MonitorConfigPayload;
use crate::domain::rewards::RewardEntitlement;
use crate::ports::gateway::{MonitorConfigEnvelope, MonitorSummary};

/// `{code, message}` body the backend uses for acks and errors.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorEnvelope {
  /// 200 on success, otherwise an HTTP-like error code.
  pub code: i64,
  /// Human-readable reason.
  #[serde(default)]
  pub message: String,
}

impl std::fmt::Display for ErrorEnvelope {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "code {}: {}", self.code, self.message)
  }
}

/// Response of `GET /api/claim`.
#[derive(Debug, Clone, Deserialize)]
pub struct RewardInfoResponse {
  #[serde(rename = "ssvRewardInfo")]
  pub reward_info: RewardInfoDto,
}

/// Reward entitlement as serialised by the backend.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardInfoDto {
  pub account: String,
  /// Decimal string (wei).
  pub cumulative_amount: String,
  /// 0x-prefixed hash, empty when no root was published yet.
  #[serde(default)]
  pub expected_merkle_root: String,
  /// Proof hashes; the backend splits an empty string into `[""]`.
  #[serde(default)]
  pub merkle_proof: Option<Vec<String>>,
}

impl RewardInfoDto {
  /// Convert into a domain entitlement, rejecting malformed values.
  pub fn into_entitlement(self) -> Result<RewardEntitlement, String> {
    let account: Address = self
      .account
      .parse()
      .map_err(|e| format!("invalid account {:?}: {e}", self.account))?;

    let cumulative_amount = if self.cumulative_amount.trim().is_empty() {
      U256::ZERO
    } else {
      U256::from_str_radix(self.cumulative_amount.trim(), 10)
        .map_err(|e| format!("invalid cumulativeAmount {:?}: {e}", self.cumulative_amount))?
    };

    let merkle_root = parse_hash_or_zero(&self.expected_merkle_root)?;

    let merkle_proof = self
      .merkle_proof
      .unwrap_or_default()
      .iter()
      .map(|h| h.trim())
      .filter(|h| !h.is_empty())
      .map(|h| h.parse::<B256>().map_err(|e| format!("invalid proof element {h:?}: {e}")))
      .collect::<Result<Vec<_>, _>>()?;

    Ok(RewardEntitlement {
      account,
      cumulative_amount,
      merkle_root,
      merkle_proof,
    })
  }
}

fn parse_hash_or_zero(raw: &str) -> Result<B256, String> {
  let raw = raw.trim();
  if raw.is_empty() {
    return Ok(B256::ZERO);
  }
  raw.parse().map_err(|e| format!("invalid merkle root {raw:?}: {e}"))
}

/// Response of `GET /api/clusterMonitorInfo`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorInfoResponse {
  pub total_clusters: u64,
  pub total_active_cluster: u64,
  pub is_monitoring: bool,
  pub block: u64,
}

impl From<MonitorInfoResponse> for MonitorSummary {
  fn from(r: MonitorInfoResponse) -> Self {
    Self {
      total_clusters: r.total_clusters,
      total_active_clusters: r.total_active_cluster,
      is_monitoring: r.is_monitoring,
      block: r.block,
    }
  }
}

/// Response of the config view and save endpoints.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorConfigResponse {
  pub monitor_config: MonitorConfigPayload,
  pub block: u64,
}

impl From<MonitorConfigResponse> for MonitorConfigEnvelope {
  fn from(r: MonitorConfigResponse) -> Self {
    Self {
      config: r.monitor_config,
      block: r.block,
    }
  }
}

/// Body of `POST /api/saveClusterMonitorConfig`.
///
/// `monitor_config` is the JSON text the signature covers, sent as a
/// string so the backend verifies the exact signed bytes.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveConfigBody<'a> {
  pub monitor_config: &'a str,
  pub owner: String,
  pub signature: &'a str,
  pub block: u64,
}

/// Body of `POST /api/deleteClusterMonitorConfig`.
#[derive(Serialize)]
pub struct DeleteConfigBody<'a> {
  pub owner: String,
  pub signature: &'a str,
  pub block: u64,
}

/// Body of `POST /api/testAlarm`.
#[derive(Serialize)]
pub struct TestAlarmBody {
  pub alarm_type: u8,
  pub alarm_channel: String,
}

/// Response of `GET /api/clusterDetails`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterDetailsResponse {
  pub cluster_details: ClusterDetails,
}

/// Response of `GET /api/posData`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PosDataResponse {
  pub pos_data: ClusterPosStats,
}

/// Response of `GET /api/dashboard`.
pub type DashboardResponse = Dashboard;

/// Paging fields shared by every listing response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageMeta {
  #[serde(default)]
  total_items: u64,
  #[serde(default)]
  total_pages: u64,
  #[serde(default)]
  current_page: u64,
}

/// Decode a listing whose rows sit under `items_key`.
///
/// A missing or `null` items array decodes to an empty page.
pub fn decode_page<T: serde::de::DeserializeOwned>(
  mut body: Value,
  items_key: &str,
) -> Result<Page<T>, serde_json::Error> {
  let items = match body.get_mut(items_key).map(Value::take) {
    Some(Value::Null) | None => Vec::new(),
    Some(rows) => serde_json::from_value(rows)?,
  };
  let meta: PageMeta = serde_json::from_value(body)?;

  Ok(Page {
    items,
    total_items: meta.total_items,
    total_pages: meta.total_pages,
    current_page: meta.current_page,
  })
}
