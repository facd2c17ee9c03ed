//! Cluster monitor configuration.
//!
//! A cluster owner stores at most one alert configuration: where to
//! send alerts (Discord webhook or Telegram bot), how many days of
//! liquidation runway trigger an alert, and which event reports are
//! enabled.
//!
//! Two invariants are enforced here rather than in the workflow so no
//! caller can bypass them:
//! - the liquidation threshold never drops below
//!   [`MIN_LIQUIDATION_THRESHOLD_DAYS`];
//! - reports backed by beacon telemetry are always off on networks
//!   without that telemetry, both when loading and when serialising.

use serde::{Deserialize, Serialize};

use super::explorer::BLOCKS_PER_DAY;
use super::network::Network;

/// Hard floor for the liquidation runway threshold.
pub const MIN_LIQUIDATION_THRESHOLD_DAYS: u64 = 10;

/// Largest threshold whose block count (`days * BLOCKS_PER_DAY`) still
/// fits in a `u64` on the backend.
pub const MAX_LIQUIDATION_THRESHOLD_DAYS: u64 = u64::MAX / BLOCKS_PER_DAY;

/// Threshold used for a fresh (or deleted) configuration.
pub const DEFAULT_LIQUIDATION_THRESHOLD_DAYS: u64 = 30;

/// Alert delivery method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertMethod {
    /// Discord webhook.
    #[default]
    Discord,
    /// Telegram bot token + chat id.
    Telegram,
}

impl AlertMethod {
    /// Numeric `alarm_type` used on the wire.
    pub const fn wire_code(self) -> u8 {
        match self {
            Self::Discord => 0,
            Self::Telegram => 1,
        }
    }

    /// Decode a wire `alarm_type`. Anything but 0 is Telegram.
    pub const fn from_wire_code(code: u8) -> Self {
        if code == 0 {
            Self::Discord
        } else {
            Self::Telegram
        }
    }
}

impl std::fmt::Display for AlertMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Discord => write!(f, "discord"),
            Self::Telegram => write!(f, "telegram"),
        }
    }
}

impl std::str::FromStr for AlertMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "discord" => Ok(Self::Discord),
            "telegram" => Ok(Self::Telegram),
            other => Err(format!("unknown alert method: {other}")),
        }
    }
}

/// Destination for alerts.
///
/// `Debug` is hand-written so webhook URLs and bot tokens never end
/// up in logs.
#[derive(Clone, PartialEq, Eq)]
pub enum AlertChannel {
    /// Discord webhook URL.
    Discord {
        /// Webhook URL.
        webhook: String,
    },
    /// Telegram bot.
    Telegram {
        /// Bot access token.
        access_token: String,
        /// Target chat id.
        chat_id: String,
    },
}

impl AlertChannel {
    /// Delivery method of this channel.
    pub const fn method(&self) -> AlertMethod {
        match self {
            Self::Discord { .. } => AlertMethod::Discord,
            Self::Telegram { .. } => AlertMethod::Telegram,
        }
    }

    /// Whether every field of the channel is filled in.
    pub fn is_complete(&self) -> bool {
        match self {
            Self::Discord { webhook } => !webhook.trim().is_empty(),
            Self::Telegram {
                access_token,
                chat_id,
            } => !access_token.trim().is_empty() && !chat_id.trim().is_empty(),
        }
    }

    /// `alarm_channel` wire value: the webhook, or `"token,chatId"`.
    pub fn wire_address(&self) -> String {
        match self {
            Self::Discord { webhook } => webhook.clone(),
            Self::Telegram {
                access_token,
                chat_id,
            } => format!("{access_token},{chat_id}"),
        }
    }

    /// Decode a wire channel for the given method.
    pub fn from_wire(method: AlertMethod, address: &str) -> Self {
        match method {
            AlertMethod::Discord => Self::Discord {
                webhook: address.to_string(),
            },
            AlertMethod::Telegram => {
                let (token, chat) = address.split_once(',').unwrap_or((address, ""));
                Self::Telegram {
                    access_token: token.to_string(),
                    chat_id: chat.to_string(),
                }
            }
        }
    }
}

impl std::fmt::Debug for AlertChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Discord { .. } => f.write_str("AlertChannel::Discord(<redacted>)"),
            Self::Telegram { .. } => f.write_str("AlertChannel::Telegram(<redacted>)"),
        }
    }
}

/// Individual event report a cluster owner can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportFlag {
    /// Operator fee changes on any operator of the owner's clusters.
    OperatorFeeChange,
    /// Network fee changes.
    NetworkFeeChange,
    /// Blocks proposed by the owner's validators.
    BlockProposals,
    /// Blocks missed by the owner's validators.
    MissedBlocks,
    /// Validator balance decreases.
    BalanceDecrease,
    /// Validators exited on the beacon chain but still registered.
    ExitedNotRemoved,
    /// Weekly summary report.
    WeeklyReport,
}

impl ReportFlag {
    /// All flags in display order.
    pub const ALL: [Self; 7] = [
        Self::OperatorFeeChange,
        Self::NetworkFeeChange,
        Self::BlockProposals,
        Self::MissedBlocks,
        Self::BalanceDecrease,
        Self::ExitedNotRemoved,
        Self::WeeklyReport,
    ];

    /// Whether the report relies on beacon-chain telemetry.
    pub const fn needs_beacon_telemetry(self) -> bool {
        matches!(
            self,
            Self::BlockProposals | Self::MissedBlocks | Self::BalanceDecrease
        )
    }

    /// Whether the report can be offered on the given network.
    pub const fn available_on(self, network: Network) -> bool {
        !self.needs_beacon_telemetry() || network.has_beacon_telemetry()
    }

    /// Human-readable label.
    pub const fn label(self) -> &'static str {
        match self {
            Self::OperatorFeeChange => "Report operator fee changes",
            Self::NetworkFeeChange => "Report network fee changes",
            Self::BlockProposals => "Report block proposals",
            Self::MissedBlocks => "Report missed blocks",
            Self::BalanceDecrease => "Report balance decrease",
            Self::ExitedNotRemoved => "Report exited but not removed validators",
            Self::WeeklyReport => "Weekly report",
        }
    }
}

impl std::str::FromStr for ReportFlag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "operator-fee-change" => Ok(Self::OperatorFeeChange),
            "network-fee-change" => Ok(Self::NetworkFeeChange),
            "block-proposals" => Ok(Self::BlockProposals),
            "missed-blocks" => Ok(Self::MissedBlocks),
            "balance-decrease" => Ok(Self::BalanceDecrease),
            "exited-not-removed" => Ok(Self::ExitedNotRemoved),
            "weekly-report" => Ok(Self::WeeklyReport),
            other => Err(format!("unknown report flag: {other}")),
        }
    }
}

/// Set of enabled reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReportFlags {
    pub operator_fee_change: bool,
    pub network_fee_change: bool,
    pub block_proposals: bool,
    pub missed_blocks: bool,
    pub balance_decrease: bool,
    pub exited_not_removed: bool,
    pub weekly_report: bool,
}

impl ReportFlags {
    /// Whether a flag is enabled.
    pub const fn get(&self, flag: ReportFlag) -> bool {
        match flag {
            ReportFlag::OperatorFeeChange => self.operator_fee_change,
            ReportFlag::NetworkFeeChange => self.network_fee_change,
            ReportFlag::BlockProposals => self.block_proposals,
            ReportFlag::MissedBlocks => self.missed_blocks,
            ReportFlag::BalanceDecrease => self.balance_decrease,
            ReportFlag::ExitedNotRemoved => self.exited_not_removed,
            ReportFlag::WeeklyReport => self.weekly_report,
        }
    }

    /// Enable or disable a flag.
    pub fn set(&mut self, flag: ReportFlag, enabled: bool) {
        let slot = match flag {
            ReportFlag::OperatorFeeChange => &mut self.operator_fee_change,
            ReportFlag::NetworkFeeChange => &mut self.network_fee_change,
            ReportFlag::BlockProposals => &mut self.block_proposals,
            ReportFlag::MissedBlocks => &mut self.missed_blocks,
            ReportFlag::BalanceDecrease => &mut self.balance_decrease,
            ReportFlag::ExitedNotRemoved => &mut self.exited_not_removed,
            ReportFlag::WeeklyReport => &mut self.weekly_report,
        };
        *slot = enabled;
    }

    /// Flip a flag.
    pub fn toggle(&mut self, flag: ReportFlag) {
        self.set(flag, !self.get(flag));
    }

    /// Copy with every report unavailable on `network` forced off.
    pub fn for_network(mut self, network: Network) -> Self {
        for flag in ReportFlag::ALL {
            if !flag.available_on(network) {
                self.set(flag, false);
            }
        }
        self
    }
}

/// Clamp a threshold between the floor and the largest storable value.
pub fn floor_threshold_days(days: u64) -> u64 {
    days.clamp(MIN_LIQUIDATION_THRESHOLD_DAYS, MAX_LIQUIDATION_THRESHOLD_DAYS)
}

/// Coerce raw threshold input to a valid day count.
///
/// Reads the leading integer (optional sign, then digits) the way a
/// numeric form field does; non-numeric or below-floor input yields
/// the floor, oversized input the ceiling.
pub fn coerce_threshold_days(input: &str) -> u64 {
    let trimmed = input.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());

    match digits[..end].parse::<u64>() {
        Ok(_) if negative => MIN_LIQUIDATION_THRESHOLD_DAYS,
        Ok(days) => floor_threshold_days(days),
        // too large for u64
        Err(_) if end > 0 => MAX_LIQUIDATION_THRESHOLD_DAYS,
        Err(_) => MIN_LIQUIDATION_THRESHOLD_DAYS,
    }
}

/// A cluster owner's alert configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorConfig {
    /// Where alerts are delivered.
    pub channel: AlertChannel,
    /// Alert when runway falls below this many days.
    pub liquidation_threshold_days: u64,
    /// Enabled reports.
    pub reports: ReportFlags,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            channel: AlertChannel::Discord {
                webhook: String::new(),
            },
            liquidation_threshold_days: DEFAULT_LIQUIDATION_THRESHOLD_DAYS,
            reports: ReportFlags::default(),
        }
    }
}

impl MonitorConfig {
    /// Load a stored configuration into draft form for `network`.
    pub fn from_payload(payload: &MonitorConfigPayload, network: Network) -> Self {
        let method = AlertMethod::from_wire_code(payload.alarm_type);
        let reports = ReportFlags {
            operator_fee_change: payload.report_operator_fee_change,
            network_fee_change: payload.report_network_fee_change,
            block_proposals: payload.report_propose_block,
            missed_blocks: payload.report_missed_block,
            balance_decrease: payload.report_balance_decrease,
            exited_not_removed: payload.report_exited_but_not_removed,
            weekly_report: payload.report_weekly,
        };

        Self {
            channel: AlertChannel::from_wire(method, &payload.alarm_channel),
            liquidation_threshold_days: floor_threshold_days(payload.report_liquidation_threshold),
            reports: reports.for_network(network),
        }
    }

    /// Wire payload for `network`, with both invariants re-applied.
    pub fn to_payload(&self, network: Network) -> MonitorConfigPayload {
        let reports = self.reports.for_network(network);
        MonitorConfigPayload {
            alarm_type: self.channel.method().wire_code(),
            alarm_channel: self.channel.wire_address(),
            report_liquidation_threshold: floor_threshold_days(self.liquidation_threshold_days),
            report_operator_fee_change: reports.operator_fee_change,
            report_network_fee_change: reports.network_fee_change,
            report_propose_block: reports.block_proposals,
            report_missed_block: reports.missed_blocks,
            report_balance_decrease: reports.balance_decrease,
            report_exited_but_not_removed: reports.exited_not_removed,
            report_weekly: reports.weekly_report,
        }
    }
}

/// Monitor configuration as exchanged with the backend.
///
/// Field order is the serialisation order, and the serialised string
/// is what gets signed on save.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorConfigPayload {
    pub alarm_type: u8,
    pub alarm_channel: String,
    pub report_liquidation_threshold: u64,
    pub report_operator_fee_change: bool,
    pub report_network_fee_change: bool,
    pub report_propose_block: bool,
    pub report_missed_block: bool,
    pub report_balance_decrease: bool,
    pub report_exited_but_not_removed: bool,
    pub report_weekly: bool,
}

impl MonitorConfigPayload {
    /// Compact JSON form, used both as request body and signed text.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl std::fmt::Debug for MonitorConfigPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MonitorConfigPayload")
            .field("alarm_type", &self.alarm_type)
            .field("alarm_channel", &"<redacted>")
            .field("report_liquidation_threshold", &self.report_liquidation_threshold)
            .field("report_operator_fee_change", &self.report_operator_fee_change)
            .field("report_network_fee_change", &self.report_network_fee_change)
            .field("report_propose_block", &self.report_propose_block)
            .field("report_missed_block", &self.report_missed_block)
            .field("report_balance_decrease", &self.report_balance_decrease)
            .field("report_exited_but_not_removed", &self.report_exited_but_not_removed)
            .field("report_weekly", &self.report_weekly)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_on() -> ReportFlags {
        let mut flags = ReportFlags::default();
        for flag in ReportFlag::ALL {
            flags.set(flag, true);
        }
        flags
    }

    #[test]
    fn test_coerce_threshold() {
        assert_eq!(coerce_threshold_days("45"), 45);
        assert_eq!(coerce_threshold_days("3"), 10);
        assert_eq!(coerce_threshold_days(""), 10);
        assert_eq!(coerce_threshold_days("abc"), 10);
        assert_eq!(coerce_threshold_days("-20"), 10);
        assert_eq!(coerce_threshold_days(" 12days"), 12);
    }

    #[test]
    fn test_threshold_ceiling_fits_block_count() {
        let huge = "9".repeat(40);
        assert_eq!(coerce_threshold_days(&huge), MAX_LIQUIDATION_THRESHOLD_DAYS);
        assert_eq!(coerce_threshold_days(&u64::MAX.to_string()), MAX_LIQUIDATION_THRESHOLD_DAYS);
        assert!(MAX_LIQUIDATION_THRESHOLD_DAYS.checked_mul(BLOCKS_PER_DAY).is_some());
        assert_eq!(floor_threshold_days(u64::MAX), MAX_LIQUIDATION_THRESHOLD_DAYS);
    }

    #[test]
    fn test_telegram_channel_round_trip() {
        let channel = AlertChannel::from_wire(AlertMethod::Telegram, "123:abc,-1001");
        assert_eq!(
            channel,
            AlertChannel::Telegram {
                access_token: "123:abc".into(),
                chat_id: "-1001".into(),
            }
        );
        assert_eq!(channel.wire_address(), "123:abc,-1001");
    }

    #[test]
    fn test_telegram_without_chat_id() {
        let channel = AlertChannel::from_wire(AlertMethod::Telegram, "token-only");
        assert_eq!(channel.wire_address(), "token-only,");
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let channel = AlertChannel::Discord {
            webhook: "https://discord.com/api/webhooks/secret".into(),
        };
        assert!(!format!("{channel:?}").contains("secret"));
    }

    #[test]
    fn test_payload_field_order() {
        let config = MonitorConfig::default();
        let json = config.to_payload(Network::Mainnet).to_json().unwrap();
        assert_eq!(
            json,
            r#"{"alarm_type":0,"alarm_channel":"","report_liquidation_threshold":30,"report_operator_fee_change":false,"report_network_fee_change":false,"report_propose_block":false,"report_missed_block":false,"report_balance_decrease":false,"report_exited_but_not_removed":false,"report_weekly":false}"#
        );
    }

    #[test]
    fn test_secondary_network_suppresses_on_save() {
        let config = MonitorConfig {
            reports: all_on(),
            ..MonitorConfig::default()
        };
        let payload = config.to_payload(Network::Holesky);
        assert!(!payload.report_propose_block);
        assert!(!payload.report_missed_block);
        assert!(!payload.report_balance_decrease);
        assert!(payload.report_operator_fee_change);
        assert!(payload.report_weekly);

        let mainnet = config.to_payload(Network::Mainnet);
        assert!(mainnet.report_propose_block);
    }

    #[test]
    fn test_secondary_network_suppresses_on_load() {
        let payload = MonitorConfig {
            reports: all_on(),
            ..MonitorConfig::default()
        }
        .to_payload(Network::Mainnet);

        let loaded = MonitorConfig::from_payload(&payload, Network::Holesky);
        assert!(!loaded.reports.block_proposals);
        assert!(!loaded.reports.missed_blocks);
        assert!(!loaded.reports.balance_decrease);
        assert!(loaded.reports.exited_not_removed);
    }

    #[test]
    fn test_threshold_floor_on_save() {
        let config = MonitorConfig {
            liquidation_threshold_days: 3,
            ..MonitorConfig::default()
        };
        assert_eq!(
            config.to_payload(Network::Mainnet).report_liquidation_threshold,
            MIN_LIQUIDATION_THRESHOLD_DAYS
        );
    }

    #[test]
    fn test_unknown_alarm_type_is_telegram() {
        assert_eq!(AlertMethod::from_wire_code(7), AlertMethod::Telegram);
        assert_eq!(AlertMethod::from_wire_code(0), AlertMethod::Discord);
    }
}
