//! Domain layer - Core rules and read models.
//!
//! Pure types for the rewards claim and cluster monitor workflows,
//! plus the explorer rows. No I/O here (hexagonal architecture inner
//! ring); everything is testable in isolation.

pub mod explorer;
pub mod monitor;
pub mod network;
pub mod ownership;
pub mod rewards;

// Re-export core types for convenience
pub use explorer::{format_runway, Page, PageQuery};
pub use monitor::{
    coerce_threshold_days, AlertChannel, AlertMethod, MonitorConfig, MonitorConfigPayload,
    ReportFlag, ReportFlags,
};
pub use network::Network;
pub use ownership::{ownership_message, OwnershipProof};
pub use rewards::{claimable_delta, format_token_amount, RewardEntitlement, RewardSnapshot};
