//! Ownership proofs for owner-scoped backend mutations.
//!
//! The backend authenticates monitor-config reads and writes by
//! recovering the signer of a fixed message that embeds a block
//! number it issued recently, optionally followed by the exact
//! payload being written.

use alloy::primitives::Address;
use serde::Serialize;

/// Fixed prefix of every ownership message.
pub const OWNERSHIP_MESSAGE_PREFIX: &str = "Signature required for cluster ownership. Block: ";

/// Message a wallet signs to prove ownership at `block`.
///
/// With a payload the message becomes `"{prefix}{block}\n{payload}"`,
/// tying the signature to those exact bytes.
pub fn ownership_message(block: u64, payload: Option<&str>) -> String {
    match payload {
        Some(payload) => format!("{OWNERSHIP_MESSAGE_PREFIX}{block}\n{payload}"),
        None => format!("{OWNERSHIP_MESSAGE_PREFIX}{block}"),
    }
}

/// Single-use proof that `owner` signed an ownership message.
///
/// Freshness and signer recovery are checked by the backend.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct OwnershipProof {
    /// Address the signature should recover to.
    pub owner: Address,
    /// Server-issued block the message embeds.
    pub block: u64,
    /// 0x-prefixed 65-byte signature.
    pub signature: String,
}

impl std::fmt::Debug for OwnershipProof {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OwnershipProof")
            .field("owner", &self.owner)
            .field("block", &self.block)
            .finish_non_exhaustive()
    }
}
