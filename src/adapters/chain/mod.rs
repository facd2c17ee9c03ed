//! Chain Adapters - Ledger Interaction Layer
//!
//! Provides on-chain access via alloy-rs 0.9 for:
//! - Read-only RPC provider with chain-id validation
//! - Claim contract reads and Safe (contract account) detection
//! - Private-key wallet for ownership signatures and claim transactions

pub mod contracts;
pub mod provider;
pub mod wallet;

pub use contracts::ClaimContractReader;
pub use provider::ReadProvider;
pub use wallet::LocalWallet;
