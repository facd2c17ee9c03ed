//! Configuration Module - TOML-based Client Configuration
//!
//! Loads and validates configuration from `config.toml`.
//! Backend endpoints, RPC endpoints and contract addresses are
//! externalized here - nothing is hardcoded in the domain layer.
//! The backend runs one deployment per network, so its URL lives in
//! each `[[chains]]` entry next to the RPC endpoint.
//! The signer key never lives in the file: only the name of the
//! environment variable holding it.

pub mod loader;

use alloy::primitives::Address;
use serde::Deserialize;

use crate::domain::network::Network;

/// Top-level client configuration.
///
/// Loaded from `config.toml` at startup. All fields are validated
/// before any workflow runs.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
  /// Client identity and presentation.
  #[serde(default)]
  pub app: AppSection,
  /// Backend client tuning, shared by every network.
  #[serde(default)]
  pub api: ApiConfig,
  /// Network selected at startup.
  #[serde(default)]
  pub network: NetworkSection,
  /// Per-network chain endpoints and contracts.
  pub chains: Vec<ChainConfig>,
  /// Signer configuration.
  #[serde(default)]
  pub wallet: WalletConfig,
}

impl AppConfig {
  /// Chain entry for `network`, if configured.
  pub fn chain(&self, network: Network) -> Option<&ChainConfig> {
    self.chains.iter().find(|c| c.network == network)
  }

  /// Chain entry for the active network.
  pub fn active_chain(&self) -> Option<&ChainConfig> {
    self.chain(self.network.active)
  }

  /// Backend deployment serving `network`.
  pub fn api_url(&self, network: Network) -> Option<&str> {
    self.chain(network).map(|c| c.api_url.as_str())
  }
}

/// Client identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppSection {
  /// Human-readable client name.
  #[serde(default = "default_name")]
  pub name: String,
  /// Log level (trace, debug, info, warn, error).
  #[serde(default = "default_log_level")]
  pub log_level: String,
  /// Dark theme preference.
  #[serde(default = "default_true")]
  pub dark_mode: bool,
}

impl Default for AppSection {
  fn default() -> Self {
    Self {
      name: default_name(),
      log_level: default_log_level(),
      dark_mode: true,
    }
  }
}

/// Backend API client configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
  /// Request timeout in seconds.
  #[serde(default = "default_timeout")]
  pub timeout_seconds: u64,
  /// Maximum concurrent requests.
  #[serde(default = "default_max_concurrent")]
  pub max_concurrent: usize,
  /// Client-side request rate cap.
  #[serde(default = "default_requests_per_second")]
  pub requests_per_second: u32,
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self {
      timeout_seconds: default_timeout(),
      max_concurrent: default_max_concurrent(),
      requests_per_second: default_requests_per_second(),
    }
  }
}

/// Network selection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NetworkSection {
  /// Network used at startup (`mainnet` or `holesky`).
  #[serde(default)]
  pub active: Network,
}

/// Endpoints and contracts for one network.
#[derive(Debug, Clone, Deserialize)]
pub struct ChainConfig {
  /// Network this entry describes.
  pub network: Network,
  /// Expected chain id (validated against the RPC at connect time).
  pub chain_id: u64,
  /// Backend base URL for this network (the client appends `/api/...`).
  pub api_url: String,
  /// JSON-RPC endpoint.
  pub rpc_url: String,
  /// Rewards claim contract.
  pub claim_contract: Address,
  /// Block explorer base URL (transaction links).
  pub explorer_url: String,
  /// Safe web app base URL (proposal queue links).
  pub safe_app_url: String,
  /// Safe app chain prefix (`eth`, `hol`...).
  pub safe_chain_prefix: String,
  /// Receipt polling interval in milliseconds.
  #[serde(default = "default_receipt_poll_ms")]
  pub receipt_poll_ms: u64,
  /// Give up waiting for a claim receipt after this many seconds.
  #[serde(default = "default_confirmation_timeout")]
  pub confirmation_timeout_seconds: u64,
}

/// Signer configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct WalletConfig {
  /// Environment variable holding the hex private key.
  #[serde(default = "default_private_key_env")]
  pub private_key_env: String,
}

impl Default for WalletConfig {
  fn default() -> Self {
    Self {
      private_key_env: default_private_key_env(),
    }
  }
}

// Default value functions for serde

fn default_name() -> String {
  "monitorssv".to_string()
}

fn default_log_level() -> String {
  "info".to_string()
}

fn default_true() -> bool {
  true
}

fn default_timeout() -> u64 {
  30
}

fn default_max_concurrent() -> usize {
  4
}

fn default_requests_per_second() -> u32 {
  10
}

fn default_receipt_poll_ms() -> u64 {
  2_000
}

fn default_confirmation_timeout() -> u64 {
  600
}

fn default_private_key_env() -> String {
  "MONITORSSV_PRIVATE_KEY".to_string()
}
