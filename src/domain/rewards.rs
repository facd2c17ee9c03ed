//! Reward entitlement and claimable-delta arithmetic.
//!
//! The backend publishes, per account, the cumulative amount ever
//! allocated together with the Merkle proof binding it to a root.
//! The claim contract tracks how much of that cumulative amount was
//! already paid out. What the user can claim now is the difference,
//! clamped at zero.

use alloy::primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};

/// Decimals of the reward token.
pub const TOKEN_DECIMALS: u8 = 18;

/// Symbol shown next to formatted amounts.
pub const TOKEN_SYMBOL: &str = "SSV";

/// Digits kept after the decimal point when displaying amounts.
const DISPLAY_DECIMALS: u8 = 3;

/// Reward entitlement for one account, as published by the backend.
///
/// Immutable per query. The root must match the contract's current
/// root at claim time or the claim transaction reverts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardEntitlement {
    /// Account the entitlement belongs to.
    pub account: Address,
    /// Total rewards ever allocated to the account (wei).
    pub cumulative_amount: U256,
    /// Merkle root the proof verifies against.
    pub merkle_root: B256,
    /// Ordered sibling hashes from leaf to root.
    pub merkle_proof: Vec<B256>,
}

impl RewardEntitlement {
    /// Whether the account was never allocated anything.
    pub fn is_empty(&self) -> bool {
        self.cumulative_amount.is_zero()
    }
}

/// Amount still claimable: `max(0, cumulative - claimed)`.
///
/// A claimed amount above the cumulative one can only come from a
/// stale backend view; it clamps to zero instead of underflowing.
pub fn claimable_delta(cumulative: U256, claimed: U256) -> U256 {
    cumulative.saturating_sub(claimed)
}

/// Result of a successful reward search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewardSnapshot {
    /// Entitlement as returned by the backend.
    pub entitlement: RewardEntitlement,
    /// Amount already claimed on-chain.
    pub claimed: U256,
    /// Amount claimable now.
    pub claimable: U256,
}

impl RewardSnapshot {
    /// Build a snapshot, deriving the claimable delta.
    pub fn new(entitlement: RewardEntitlement, claimed: U256) -> Self {
        let claimable = claimable_delta(entitlement.cumulative_amount, claimed);
        Self {
            entitlement,
            claimed,
            claimable,
        }
    }

    /// Eligible (cumulative) rewards.
    pub const fn eligible(&self) -> U256 {
        self.entitlement.cumulative_amount
    }

    /// Whether anything can be claimed.
    pub fn has_claimable(&self) -> bool {
        !self.claimable.is_zero()
    }

    /// Record a confirmed on-chain claim without re-fetching.
    ///
    /// Assumes the read model cannot disagree with the chain once the
    /// claim transaction is confirmed.
    pub fn settle(&mut self) {
        self.claimed = self.entitlement.cumulative_amount;
        self.claimable = U256::ZERO;
    }
}

/// Format a wei amount in whole tokens with three decimals, rounding
/// half up (`3_000000000000000000` → `"3.000"`).
pub fn format_token_amount(amount: U256) -> String {
    let unit = U256::from(10u64).pow(U256::from(TOKEN_DECIMALS - DISPLAY_DECIMALS));
    let half = unit / U256::from(2u64);
    let thousandths = amount.saturating_add(half) / unit;

    let scale = U256::from(10u64).pow(U256::from(DISPLAY_DECIMALS));
    let whole = thousandths / scale;
    let frac = (thousandths % scale).as_limbs()[0];

    format!("{whole}.{frac:0width$}", width = usize::from(DISPLAY_DECIMALS))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ether(n: u64) -> U256 {
        U256::from(n) * U256::from(10u64).pow(U256::from(18u64))
    }

    #[test]
    fn test_delta_is_difference() {
        assert_eq!(claimable_delta(ether(5), ether(2)), ether(3));
    }

    #[test]
    fn test_delta_clamps_to_zero() {
        assert_eq!(claimable_delta(ether(1), ether(4)), U256::ZERO);
    }

    #[test]
    fn test_format_whole_tokens() {
        assert_eq!(format_token_amount(ether(3)), "3.000");
        assert_eq!(format_token_amount(U256::ZERO), "0.000");
    }

    #[test]
    fn test_format_rounds_half_up() {
        // 1.2345 tokens
        let amount = U256::from(1_234_500_000_000_000_000u128);
        assert_eq!(format_token_amount(amount), "1.235");
        // 0.0004 tokens
        let dust = U256::from(400_000_000_000_000u128);
        assert_eq!(format_token_amount(dust), "0.000");
    }

    #[test]
    fn test_snapshot_settle() {
        let entitlement = RewardEntitlement {
            account: Address::ZERO,
            cumulative_amount: ether(5),
            merkle_root: B256::ZERO,
            merkle_proof: vec![],
        };
        let mut snapshot = RewardSnapshot::new(entitlement, ether(2));
        assert_eq!(snapshot.claimable, ether(3));
        assert!(snapshot.has_claimable());

        snapshot.settle();
        assert_eq!(snapshot.claimed, ether(5));
        assert_eq!(snapshot.claimable, U256::ZERO);
    }
}
