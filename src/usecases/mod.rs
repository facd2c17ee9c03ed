//! Use Cases Layer - Application Workflows
//!
//! Orchestrates domain logic with port interfaces to implement the
//! client's workflows. Each use case owns its own state machine and
//! talks to the outside world only through ports.
//!
//! Use cases:
//! - `ClaimWorkflow`: Reward search and claim (direct or via Safe)
//! - `MonitorConfigWorkflow`: Cluster alert configuration for owners
//! - `SignedRequestBuilder`: Fresh ownership proofs per backend call
//! - `ExplorerPages`: Read-through explorer listings and details

pub mod claim;
pub mod explorer;
pub mod monitor;
pub mod signed_request;

pub use claim::{ClaimLinks, ClaimState, ClaimWorkflow};
pub use explorer::ExplorerPages;
pub use monitor::{MonitorConfigWorkflow, MonitorDraft, MonitorState};
pub use signed_request::SignedRequestBuilder;
