//! Adapters Layer - Hexagonal Architecture Outer Ring
//!
//! Implements the port traits defined in `crate::ports` with concrete
//! external dependencies (HTTP client, blockchain RPC, local signer).
//! Each sub-module groups adapters by infrastructure concern.
//!
//! Adapter categories:
//! - `api`: Monitoring backend REST API client and gateway
//! - `chain`: Claim contract reads and wallet via alloy-rs

pub mod api;
pub mod chain;
