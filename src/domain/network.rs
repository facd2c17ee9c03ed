//! Supported staking networks.
//!
//! Mainnet is the primary network. Holesky is the secondary network:
//! the backend has no beacon-chain telemetry for it, so proposal,
//! missed-block and balance reports are unavailable there.

use serde::{Deserialize, Serialize};

/// Network the client operates against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    /// Ethereum mainnet (chain id 1).
    #[default]
    Mainnet,
    /// Holesky testnet (chain id 17000).
    Holesky,
}

impl Network {
    /// Canonical chain id for this network.
    pub const fn chain_id(self) -> u64 {
        match self {
            Self::Mainnet => 1,
            Self::Holesky => 17_000,
        }
    }

    /// Whether the primary network is selected.
    pub const fn is_primary(self) -> bool {
        matches!(self, Self::Mainnet)
    }

    /// Whether validator-level telemetry (proposals, missed blocks,
    /// balance changes) is collected for this network.
    pub const fn has_beacon_telemetry(self) -> bool {
        self.is_primary()
    }
}

impl std::fmt::Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mainnet => write!(f, "mainnet"),
            Self::Holesky => write!(f, "holesky"),
        }
    }
}

impl std::str::FromStr for Network {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mainnet" => Ok(Self::Mainnet),
            "holesky" => Ok(Self::Holesky),
            other => Err(format!("unknown network: {other}")),
        }
    }
}
