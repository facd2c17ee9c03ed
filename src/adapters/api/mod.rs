//! Monitoring Backend API Adapter
//!
//! Implements the HTTP side of the backend ports: reward entitlements,
//! cluster monitor configuration, test alerts, and the explorer
//! listings.
//!
//! Sub-modules:
//! - `client`: HTTP client with concurrency cap and rate limiting
//! - `gateway`: `MonitorApi` + `ExplorerApi` implementation
//! - `types`: API request/response type definitions

pub mod client;
pub mod gateway;
pub mod types;

pub use client::{ApiClient, ApiClientConfig};
pub use gateway::HttpGateway;
