//! Configuration Loader - File Loading and Validation
//!
//! Handles loading `config.toml`, validating all parameters,
//! and providing clear error messages for misconfiguration.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use super::AppConfig;

/// Load and validate configuration from a TOML file.
///
/// # Errors
/// Returns detailed error if:
/// - File doesn't exist or can't be read
/// - TOML parsing fails
/// - Validation rules are violated
pub fn load_config(path: &str) -> Result<AppConfig> {
  let path = Path::new(path);

  let content = std::fs::read_to_string(path)
    .with_context(|| format!("Failed to read config file: {}", path.display()))?;

  let config = parse_config(&content)?;

  info!(
    network = %config.network.active,
    chains = config.chains.len(),
    api = config.api_url(config.network.active).unwrap_or_default(),
    "Configuration loaded successfully"
  );

  Ok(config)
}

/// Parse and validate configuration text.
pub fn parse_config(content: &str) -> Result<AppConfig> {
  let config: AppConfig = toml::from_str(content).with_context(|| "Failed to parse config.toml")?;
  validate_config(&config)?;
  Ok(config)
}

/// Validate all configuration parameters.
fn validate_config(config: &AppConfig) -> Result<()> {
  // API validation
  anyhow::ensure!(
    config.api.requests_per_second > 0,
    "requests_per_second must be positive"
  );
  anyhow::ensure!(
    config.api.max_concurrent > 0,
    "max_concurrent must be positive"
  );
  anyhow::ensure!(
    config.api.timeout_seconds > 0,
    "timeout_seconds must be positive"
  );

  // Chain validation
  anyhow::ensure!(
    config.active_chain().is_some(),
    "No [[chains]] entry for active network {}",
    config.network.active
  );

  for (i, chain) in config.chains.iter().enumerate() {
    anyhow::ensure!(
      chain.chain_id == chain.network.chain_id(),
      "Chain {} ({}) has chain_id {}, expected {}",
      i,
      chain.network,
      chain.chain_id,
      chain.network.chain_id()
    );
    anyhow::ensure!(
      !chain.api_url.trim().is_empty(),
      "Chain {} ({}) has empty api_url",
      i,
      chain.network
    );
    anyhow::ensure!(
      !chain.rpc_url.trim().is_empty(),
      "Chain {} ({}) has empty rpc_url",
      i,
      chain.network
    );
    anyhow::ensure!(
      !chain.explorer_url.trim().is_empty(),
      "Chain {} ({}) has empty explorer_url",
      i,
      chain.network
    );
    anyhow::ensure!(
      !chain.safe_app_url.trim().is_empty() && !chain.safe_chain_prefix.trim().is_empty(),
      "Chain {} ({}) needs safe_app_url and safe_chain_prefix",
      i,
      chain.network
    );
    anyhow::ensure!(
      chain.receipt_poll_ms > 0,
      "Chain {} ({}) receipt_poll_ms must be positive",
      i,
      chain.network
    );
    anyhow::ensure!(
      chain.confirmation_timeout_seconds > 0,
      "Chain {} ({}) confirmation_timeout_seconds must be positive",
      i,
      chain.network
    );
  }

  let mut seen = Vec::with_capacity(config.chains.len());
  for chain in &config.chains {
    anyhow::ensure!(
      !seen.contains(&chain.network),
      "Duplicate [[chains]] entry for {}",
      chain.network
    );
    seen.push(chain.network);
  }

  // Wallet validation
  anyhow::ensure!(
    !config.wallet.private_key_env.trim().is_empty(),
    "wallet.private_key_env must not be empty"
  );

  Ok(())
}
