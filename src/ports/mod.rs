//! Ports Layer - Hexagonal Architecture Boundaries
//!
//! Defines the interfaces (traits) that the usecases layer requires
//! from the outside world. Adapters implement these traits.
//!
//! Port categories:
//! - `MonitorApi`: Backend resources behind the claim and monitor workflows
//! - `ExplorerApi`: Backend list/detail reads behind the explorer pages
//! - `ChainClient`: Read-only claim contract and code lookups
//! - `Wallet`: Session signer for ownership proofs and claim transactions

pub mod chain_client;
pub mod explorer;
pub mod gateway;
pub mod wallet;
