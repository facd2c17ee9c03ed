//! Monitor Use Case - Cluster Alert Configuration
//!
//! Lets a cluster owner view, edit, save and delete their alert
//! configuration, and send a test alert before committing to a channel.
//! Saving needs at least one active cluster; an owner whose clusters
//! were all liquidated can still view and delete what is stored.
//!
//! Every view, save and delete signs a fresh ownership proof over the
//! block the backend returned last; saves additionally bind the exact
//! payload. There is no session token.

use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::Address;
use tokio::time::Instant;
use tracing::{info, instrument, warn};

use crate::context::AppContext;
use crate::domain::monitor::{
  coerce_threshold_days, AlertChannel, AlertMethod, MonitorConfig, ReportFlag, ReportFlags,
  DEFAULT_LIQUIDATION_THRESHOLD_DAYS,
};
use crate::domain::network::Network;
use crate::domain::ownership::OwnershipProof;
use crate::errors::MonitorError;
use crate::ports::gateway::{MonitorApi, MonitorSummary, SaveConfigRequest};
use crate::ports::wallet::Wallet;

use super::signed_request::SignedRequestBuilder;

/// How long a notice stays visible.
pub const NOTICE_TTL: Duration = Duration::from_secs(5);

/// Settled ownership and configuration state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
  /// No wallet connected yet.
  Unknown,
  /// Connected address never registered a cluster.
  NotOwner,
  /// Owner without a stored configuration; `editing` once the form
  /// was opened.
  OwnerNoConfig { editing: bool },
  /// A configuration is stored but not fetched yet.
  OwnerConfigHidden,
  /// The stored configuration is loaded into the draft.
  OwnerConfigVisible,
}

impl MonitorState {
  pub const fn is_owner(self) -> bool {
    matches!(
      self,
      Self::OwnerNoConfig { .. } | Self::OwnerConfigHidden | Self::OwnerConfigVisible
    )
  }

  pub const fn has_stored_config(self) -> bool {
    matches!(self, Self::OwnerConfigHidden | Self::OwnerConfigVisible)
  }

  /// Whether the configuration form is shown.
  pub const fn form_open(self) -> bool {
    matches!(
      self,
      Self::OwnerNoConfig { editing: true } | Self::OwnerConfigVisible
    )
  }
}

/// Backend round-trip in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorAction {
  Viewing,
  Saving,
  Deleting,
  Testing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
  Success,
  Error,
}

/// Transient message shown after an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
  pub kind: NoticeKind,
  pub text: String,
  raised_at: Instant,
}

impl Notice {
  fn new(kind: NoticeKind, text: impl Into<String>) -> Self {
    Self {
      kind,
      text: text.into(),
      raised_at: Instant::now(),
    }
  }

  pub fn is_expired(&self) -> bool {
    self.raised_at.elapsed() >= NOTICE_TTL
  }
}

/// Form state. Both channel kinds keep their fields so switching
/// method back and forth loses nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorDraft {
  pub method: AlertMethod,
  pub discord_webhook: String,
  pub telegram_token: String,
  pub telegram_chat_id: String,
  /// Committed threshold.
  pub liquidation_threshold_days: u64,
  /// Raw text while the user types; committed on blur.
  pub threshold_input: String,
  pub reports: ReportFlags,
}

impl Default for MonitorDraft {
  fn default() -> Self {
    Self {
      method: AlertMethod::Discord,
      discord_webhook: String::new(),
      telegram_token: String::new(),
      telegram_chat_id: String::new(),
      liquidation_threshold_days: DEFAULT_LIQUIDATION_THRESHOLD_DAYS,
      threshold_input: DEFAULT_LIQUIDATION_THRESHOLD_DAYS.to_string(),
      reports: ReportFlags::default(),
    }
  }
}

impl MonitorDraft {
  /// Draft populated from a stored configuration.
  pub fn load(config: &MonitorConfig) -> Self {
    let mut draft = Self {
      method: config.channel.method(),
      liquidation_threshold_days: config.liquidation_threshold_days,
      threshold_input: config.liquidation_threshold_days.to_string(),
      reports: config.reports,
      ..Self::default()
    };
    match &config.channel {
      AlertChannel::Discord { webhook } => draft.discord_webhook.clone_from(webhook),
      AlertChannel::Telegram {
        access_token,
        chat_id,
      } => {
        draft.telegram_token.clone_from(access_token);
        draft.telegram_chat_id.clone_from(chat_id);
      }
    }
    draft
  }

  /// Channel for the selected method.
  pub fn channel(&self) -> AlertChannel {
    match self.method {
      AlertMethod::Discord => AlertChannel::Discord {
        webhook: self.discord_webhook.trim().to_string(),
      },
      AlertMethod::Telegram => AlertChannel::Telegram {
        access_token: self.telegram_token.trim().to_string(),
        chat_id: self.telegram_chat_id.trim().to_string(),
      },
    }
  }

  /// Whether the selected channel has every field filled in.
  pub fn channel_complete(&self) -> bool {
    self.channel().is_complete()
  }

  pub fn to_config(&self) -> MonitorConfig {
    MonitorConfig {
      channel: self.channel(),
      liquidation_threshold_days: self.liquidation_threshold_days,
      reports: self.reports,
    }
  }

  /// Coerce the typed threshold and make it the committed value.
  pub fn commit_threshold(&mut self) -> u64 {
    let days = coerce_threshold_days(&self.threshold_input);
    self.liquidation_threshold_days = days;
    self.threshold_input = days.to_string();
    days
  }
}

/// Alert configuration workflow for the connected owner.
pub struct MonitorConfigWorkflow<A: MonitorApi, W: Wallet> {
  api: Arc<A>,
  signer: SignedRequestBuilder<W>,
  context: AppContext,
  owner: Option<Address>,
  summary: Option<MonitorSummary>,
  state: MonitorState,
  action: Option<MonitorAction>,
  /// Block the next proof signs over; always server-issued.
  block: Option<u64>,
  draft: MonitorDraft,
  notice: Option<Notice>,
}

impl<A: MonitorApi, W: Wallet> MonitorConfigWorkflow<A, W> {
  pub fn new(api: Arc<A>, wallet: Arc<W>, context: AppContext) -> Self {
    Self {
      api,
      signer: SignedRequestBuilder::new(wallet),
      context,
      owner: None,
      summary: None,
      state: MonitorState::Unknown,
      action: None,
      block: None,
      draft: MonitorDraft::default(),
      notice: None,
    }
  }

  pub const fn state(&self) -> MonitorState {
    self.state
  }

  pub const fn action(&self) -> Option<MonitorAction> {
    self.action
  }

  pub const fn summary(&self) -> Option<&MonitorSummary> {
    self.summary.as_ref()
  }

  pub const fn draft(&self) -> &MonitorDraft {
    &self.draft
  }

  pub const fn block(&self) -> Option<u64> {
    self.block
  }

  /// Current notice, hidden once it expired.
  pub fn notice(&self) -> Option<&Notice> {
    self.notice.as_ref().filter(|n| !n.is_expired())
  }

  fn network(&self) -> Network {
    self.context.network()
  }

  fn raise(&mut self, kind: NoticeKind, text: impl Into<String>) {
    self.notice = Some(Notice::new(kind, text));
  }

  fn raise_error(&mut self, error: &MonitorError) {
    self.raise(NoticeKind::Error, error.display_message());
  }

  /// Load the ownership summary for `owner`.
  #[instrument(skip(self))]
  pub async fn connect(&mut self, owner: Address) -> Result<MonitorSummary, MonitorError> {
    self.disconnect();

    let summary = match self.api.monitor_summary(owner).await {
      Ok(summary) => summary,
      Err(e) => {
        warn!(error = %e, "Monitor summary unavailable");
        self.raise_error(&e);
        return Err(e);
      }
    };

    self.owner = Some(owner);
    self.block = Some(summary.block);
    self.state = if !summary.has_clusters() {
      MonitorState::NotOwner
    } else if summary.is_monitoring {
      MonitorState::OwnerConfigHidden
    } else {
      MonitorState::OwnerNoConfig { editing: false }
    };
    self.summary = Some(summary);

    info!(
      owner = %owner,
      clusters = summary.total_clusters,
      active = summary.total_active_clusters,
      monitoring = summary.is_monitoring,
      state = ?self.state,
      "Monitor summary loaded"
    );
    Ok(summary)
  }

  /// Forget the connected owner and everything derived from it.
  pub fn disconnect(&mut self) {
    self.owner = None;
    self.summary = None;
    self.state = MonitorState::Unknown;
    self.action = None;
    self.block = None;
    self.draft = MonitorDraft::default();
    self.notice = None;
  }

  fn require_owner(&self) -> Result<Address, MonitorError> {
    let owner = self.owner.ok_or(MonitorError::WalletNotConnected)?;
    if !self.state.is_owner() {
      return Err(MonitorError::NotClusterOwner);
    }
    Ok(owner)
  }

  fn require_form(&self) -> Result<Address, MonitorError> {
    let owner = self.require_owner()?;
    if !self.state.form_open() {
      return Err(MonitorError::InvalidState("configuration form is not open"));
    }
    Ok(owner)
  }

  /// Storing a configuration needs an active cluster.
  fn require_active_clusters(&self) -> Result<(), MonitorError> {
    match self.summary {
      Some(summary) if summary.is_owner() => Ok(()),
      _ => Err(MonitorError::NotClusterOwner),
    }
  }

  fn require_stored_config(&self) -> Result<Address, MonitorError> {
    let owner = self.require_owner()?;
    if !self.state.has_stored_config() {
      return Err(MonitorError::InvalidState("no stored configuration"));
    }
    Ok(owner)
  }

  /// Fresh proof over the latest block, signed by the connected owner.
  async fn prove(&self, owner: Address, payload: Option<&str>) -> Result<OwnershipProof, MonitorError> {
    let block = self.block.ok_or(MonitorError::MissingBlock)?;
    let proof = self.signer.prove(block, payload).await?;
    if proof.owner != owner {
      return Err(MonitorError::InvalidInput(format!(
        "wallet {} is not the connected owner {owner}",
        proof.owner
      )));
    }
    Ok(proof)
  }

  /// Open an empty form for an owner without a stored configuration.
  pub fn start_configuration(&mut self) -> Result<(), MonitorError> {
    self.require_owner()?;
    self.require_active_clusters()?;
    match self.state {
      MonitorState::OwnerNoConfig { .. } => {
        self.state = MonitorState::OwnerNoConfig { editing: true };
        Ok(())
      }
      _ => Err(MonitorError::InvalidState("a configuration is already stored")),
    }
  }

  /// Fetch the stored configuration into the draft.
  pub async fn view(&mut self) -> Result<(), MonitorError> {
    let owner = self.require_stored_config()?;
    self.action = Some(MonitorAction::Viewing);
    let result = self.fetch_config(owner).await;
    self.action = None;

    if let Err(e) = &result {
      warn!(error = %e, "Viewing monitor configuration failed");
      self.raise_error(e);
    }
    result
  }

  async fn fetch_config(&mut self, owner: Address) -> Result<(), MonitorError> {
    let proof = self.prove(owner, None).await?;
    let envelope = self.api.monitor_config(&proof).await?;

    let network = self.network();
    self.draft = MonitorDraft::load(&MonitorConfig::from_payload(&envelope.config, network));
    self.block = Some(envelope.block);
    self.state = MonitorState::OwnerConfigVisible;

    info!(owner = %owner, network = %network, "Monitor configuration loaded");
    Ok(())
  }

  /// Store the draft as the owner's configuration.
  pub async fn save(&mut self) -> Result<(), MonitorError> {
    let owner = self.require_form()?;
    if let Err(e) = self.require_active_clusters() {
      self.raise_error(&e);
      return Err(e);
    }
    self.draft.commit_threshold();
    if !self.draft.channel_complete() {
      let e = MonitorError::InvalidInput("alert channel is incomplete".into());
      self.raise_error(&e);
      return Err(e);
    }

    self.action = Some(MonitorAction::Saving);
    let result = self.store_config(owner).await;
    self.action = None;

    match &result {
      Ok(()) => self.raise(NoticeKind::Success, "Monitor configuration saved"),
      Err(e) => {
        warn!(error = %e, "Saving monitor configuration failed");
        self.raise_error(e);
      }
    }
    result
  }

  async fn store_config(&mut self, owner: Address) -> Result<(), MonitorError> {
    let network = self.network();
    let payload = self.draft.to_config().to_payload(network);
    let payload_json = payload
      .to_json()
      .map_err(|e| MonitorError::InvalidInput(e.to_string()))?;

    let proof = self.prove(owner, Some(&payload_json)).await?;
    let envelope = self
      .api
      .save_monitor_config(&SaveConfigRequest {
        proof,
        payload_json,
      })
      .await?;

    self.block = Some(envelope.block);
    if let Some(summary) = self.summary.as_mut() {
      summary.is_monitoring = true;
    }
    self.state = MonitorState::OwnerConfigVisible;

    info!(
      owner = %owner,
      network = %network,
      threshold_days = payload.report_liquidation_threshold,
      "Monitor configuration saved"
    );
    Ok(())
  }

  /// Remove the owner's configuration and reset the draft.
  pub async fn delete(&mut self) -> Result<(), MonitorError> {
    let owner = self.require_stored_config()?;

    self.action = Some(MonitorAction::Deleting);
    let result = match self.prove(owner, None).await {
      Ok(proof) => self.api.delete_monitor_config(&proof).await,
      Err(e) => Err(e),
    };
    self.action = None;

    match &result {
      Ok(()) => {
        self.draft = MonitorDraft::default();
        if let Some(summary) = self.summary.as_mut() {
          summary.is_monitoring = false;
        }
        self.state = MonitorState::OwnerNoConfig { editing: false };
        self.raise(NoticeKind::Success, "Monitor configuration deleted");
        info!(owner = %owner, "Monitor configuration deleted");
      }
      Err(e) => {
        warn!(error = %e, "Deleting monitor configuration failed");
        self.raise_error(e);
      }
    }
    result
  }

  /// Send a test alert through `channel`. Unsigned: works without
  /// opening the form and never changes the stored configuration or
  /// the draft.
  pub async fn test_alert_channel(&mut self, channel: &AlertChannel) -> Result<(), MonitorError> {
    self.require_owner()?;
    if !channel.is_complete() {
      let e = MonitorError::InvalidInput("alert channel is incomplete".into());
      self.raise_error(&e);
      return Err(e);
    }

    self.action = Some(MonitorAction::Testing);
    let result = self.api.test_alert_channel(channel).await;
    self.action = None;

    match &result {
      Ok(()) => self.raise(NoticeKind::Success, "Test alert sent"),
      Err(e) => {
        warn!(method = %channel.method(), error = %e, "Test alert failed");
        self.raise_error(e);
      }
    }
    result
  }

  /// Test the channel currently drafted in the form.
  pub async fn test_drafted_channel(&mut self) -> Result<(), MonitorError> {
    let channel = self.draft.channel();
    self.test_alert_channel(&channel).await
  }

  pub fn set_alert_method(&mut self, method: AlertMethod) -> Result<(), MonitorError> {
    self.require_form()?;
    self.draft.method = method;
    Ok(())
  }

  pub fn set_discord_webhook(&mut self, webhook: impl Into<String>) -> Result<(), MonitorError> {
    self.require_form()?;
    self.draft.discord_webhook = webhook.into();
    Ok(())
  }

  pub fn set_telegram_token(&mut self, token: impl Into<String>) -> Result<(), MonitorError> {
    self.require_form()?;
    self.draft.telegram_token = token.into();
    Ok(())
  }

  pub fn set_telegram_chat_id(&mut self, chat_id: impl Into<String>) -> Result<(), MonitorError> {
    self.require_form()?;
    self.draft.telegram_chat_id = chat_id.into();
    Ok(())
  }

  /// Flip a report. Reports without telemetry on the active network
  /// cannot be enabled.
  pub fn toggle_report(&mut self, flag: ReportFlag) -> Result<bool, MonitorError> {
    self.require_form()?;
    let network = self.network();
    if !flag.available_on(network) {
      return Err(MonitorError::InvalidInput(format!(
        "{} reports are not available on {network}",
        flag.label()
      )));
    }
    self.draft.reports.toggle(flag);
    Ok(self.draft.reports.get(flag))
  }

  /// Keystroke update of the threshold field; not validated yet.
  pub fn set_threshold_input(&mut self, text: impl Into<String>) -> Result<(), MonitorError> {
    self.require_form()?;
    self.draft.threshold_input = text.into();
    Ok(())
  }

  /// Blur of the threshold field: coerce and commit.
  pub fn commit_threshold(&mut self) -> Result<u64, MonitorError> {
    self.require_form()?;
    Ok(self.draft.commit_threshold())
  }
}
