//! Error Taxonomy - Failures Surfaced by Ports and Workflows
//!
//! Every failure is terminal for the attempt that produced it: nothing
//! in this crate retries on its own. The variants map onto what the
//! caller should do next (retry prompt, re-prompt the wallet, or show
//! the chain error verbatim).

use thiserror::Error;

/// Maximum characters of an error message shown to the user.
pub const MAX_ERROR_DISPLAY_CHARS: usize = 100;

/// Errors produced by the gateway, chain, wallet and workflow layers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MonitorError {
    /// Non-2xx status, error envelope, network failure or undecodable
    /// body from the backend API. Always recoverable.
    #[error("failed to fetch {resource}: {reason}")]
    RemoteFetch {
        /// Backend resource that failed (e.g. `clusterMonitorInfo`).
        resource: &'static str,
        /// Underlying cause.
        reason: String,
    },

    /// Read-only contract call failed; the value is unknown.
    #[error("chain read failed: {0}")]
    ChainRead(String),

    /// An operation needing the signer ran without a connected wallet.
    #[error("wallet not connected")]
    WalletNotConnected,

    /// The signer refused (or failed) to sign the message.
    #[error("signature rejected: {0}")]
    SignatureRejected(String),

    /// Transaction rejected by the wallet or reverted on-chain.
    #[error("{0}")]
    ChainWrite(String),

    /// Workflow method invoked from a state that does not allow it.
    #[error("invalid workflow state: {0}")]
    InvalidState(&'static str),

    /// Claim requested while the claimable delta is zero.
    #[error("no rewards to claim")]
    NothingToClaim,

    /// Monitor mutation requested by an address without active clusters.
    #[error("connected address is not an active cluster owner")]
    NotClusterOwner,

    /// No server-issued block number is available to sign against.
    #[error("no block number available from the backend yet")]
    MissingBlock,

    /// User-supplied value could not be interpreted.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl MonitorError {
    /// Build a [`MonitorError::RemoteFetch`] for the given resource.
    pub fn remote(resource: &'static str, reason: impl std::fmt::Display) -> Self {
        Self::RemoteFetch {
            resource,
            reason: reason.to_string(),
        }
    }

    /// Message bounded to [`MAX_ERROR_DISPLAY_CHARS`] for display.
    pub fn display_message(&self) -> String {
        truncate_for_display(&self.to_string())
    }

    /// Whether the user can resolve this by acting in the wallet.
    pub const fn is_wallet_related(&self) -> bool {
        matches!(self, Self::WalletNotConnected | Self::SignatureRejected(_))
    }
}

/// Truncate a message on a char boundary, appending `...` when cut.
pub fn truncate_for_display(message: &str) -> String {
    match message.char_indices().nth(MAX_ERROR_DISPLAY_CHARS) {
        Some((cut, _)) => format!("{}...", &message[..cut]),
        None => message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_message_untouched() {
        assert_eq!(truncate_for_display("user rejected"), "user rejected");
    }

    #[test]
    fn test_long_message_truncated() {
        let long = "x".repeat(250);
        let shown = truncate_for_display(&long);
        assert_eq!(shown.len(), MAX_ERROR_DISPLAY_CHARS + 3);
        assert!(shown.ends_with("..."));
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        let long = "é".repeat(150);
        let shown = truncate_for_display(&long);
        assert_eq!(shown.chars().count(), MAX_ERROR_DISPLAY_CHARS + 3);
    }

    #[test]
    fn test_remote_error_names_resource() {
        let err = MonitorError::remote("claim", "HTTP 500");
        assert_eq!(err.to_string(), "failed to fetch claim: HTTP 500");
        assert!(!err.is_wallet_related());
        assert!(MonitorError::WalletNotConnected.is_wallet_related());
    }
}
