//! MonitorSSV Client - Entry Point
//!
//! Command-line front-end for the rewards claim, the cluster monitor
//! configuration and the explorer pages.
//!
//! Wiring sequence:
//! 1. Parse CLI arguments
//! 2. Load config.toml + validate
//! 3. Init tracing (JSON structured logging on stderr)
//! 4. Build the application context (network, theme)
//! 5. Create the backend client + gateway (MonitorApi, ExplorerApi)
//! 6. Connect the read provider + claim contract reader (ChainClient)
//! 7. Create the session wallet, connecting the key from env if present
//! 8. Run the requested workflow and print its outcome

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::Address;
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::{info, warn};

use monitorssv_client::adapters::api::{ApiClient, ApiClientConfig, HttpGateway};
use monitorssv_client::adapters::chain::{ClaimContractReader, LocalWallet, ReadProvider};
use monitorssv_client::config::{self, AppConfig, ChainConfig};
use monitorssv_client::context::{AppContext, AppSettings};
use monitorssv_client::domain::explorer::PageQuery;
use monitorssv_client::domain::monitor::{AlertChannel, AlertMethod, ReportFlag, ReportFlags};
use monitorssv_client::domain::network::Network;
use monitorssv_client::domain::rewards::{format_token_amount, TOKEN_SYMBOL};
use monitorssv_client::ports::chain_client::ChainClient;
use monitorssv_client::ports::wallet::Wallet;
use monitorssv_client::usecases::monitor::MonitorState;
use monitorssv_client::usecases::{
  ClaimLinks, ClaimState, ClaimWorkflow, ExplorerPages, MonitorConfigWorkflow,
};

/// MonitorSSV client.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
  /// Path to the configuration file.
  #[arg(long, default_value = "config.toml", env = "MONITORSSV_CONFIG")]
  config: String,

  /// Override the configured network.
  #[arg(long)]
  network: Option<Network>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
  /// Look up (and optionally claim) cumulative rewards.
  Claim {
    /// Account whose entitlement to look up.
    account: Address,
    /// Submit the claim with the connected wallet.
    #[arg(long)]
    submit: bool,
  },
  /// Cluster alert configuration of the connected wallet.
  #[command(subcommand)]
  Monitor(MonitorCommand),
  /// Read-only explorer pages.
  #[command(subcommand)]
  Explore(ExploreCommand),
}

#[derive(Debug, Subcommand)]
enum MonitorCommand {
  /// Ownership summary.
  Info {
    /// Address to inspect; defaults to the connected wallet.
    #[arg(long)]
    owner: Option<Address>,
  },
  /// Show the stored configuration (signs an ownership proof).
  View,
  /// Create or replace the configuration.
  Save(ChannelArgs),
  /// Delete the stored configuration.
  Delete,
  /// Send a test alert through a channel.
  Test(ChannelArgs),
}

#[derive(Debug, Args)]
struct ChannelArgs {
  /// Alert method (discord or telegram).
  #[arg(long)]
  method: Option<AlertMethod>,
  /// Discord webhook URL.
  #[arg(long)]
  webhook: Option<String>,
  /// Telegram bot token.
  #[arg(long)]
  telegram_token: Option<String>,
  /// Telegram chat id.
  #[arg(long)]
  chat_id: Option<String>,
  /// Liquidation runway threshold in days (minimum 10).
  #[arg(long)]
  threshold: Option<String>,
  /// Report to enable, repeatable (e.g. block-proposals).
  #[arg(long = "report")]
  reports: Vec<ReportFlag>,
}

impl ChannelArgs {
  /// Channel named by the flags. Without `--method`, Telegram is picked
  /// when any Telegram field is given.
  fn alert_channel(&self) -> AlertChannel {
    let telegram_given = self.telegram_token.is_some() || self.chat_id.is_some();
    let method = self.method.unwrap_or(if telegram_given {
      AlertMethod::Telegram
    } else {
      AlertMethod::Discord
    });
    match method {
      AlertMethod::Discord => AlertChannel::Discord {
        webhook: self.webhook.clone().unwrap_or_default(),
      },
      AlertMethod::Telegram => AlertChannel::Telegram {
        access_token: self.telegram_token.clone().unwrap_or_default(),
        chat_id: self.chat_id.clone().unwrap_or_default(),
      },
    }
  }
}

#[derive(Debug, Args)]
struct PageArgs {
  #[arg(long, default_value_t = 1)]
  page: u64,
  #[arg(long, default_value_t = 10)]
  limit: u64,
  #[arg(long)]
  search: Option<String>,
}

impl From<PageArgs> for PageQuery {
  fn from(args: PageArgs) -> Self {
    Self {
      page: args.page.max(1),
      limit: args.limit,
      search: args.search,
    }
  }
}

#[derive(Debug, Subcommand)]
enum ExploreCommand {
  /// Indexer progress.
  Status,
  /// Network-wide overview.
  Dashboard,
  Operators(PageArgs),
  Clusters(PageArgs),
  Validators(PageArgs),
  /// Contract events for an account or cluster (--search).
  Events(PageArgs),
  /// One cluster with its stats, blocks and history.
  Cluster { id: String },
  /// One account with its clusters, validators and history.
  Account { address: Address },
  /// Clusters liquidating within 30 days.
  Ranking(PageArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
  // ── 1. Parse CLI arguments ──────────────────────────────
  let cli = Cli::parse();

  // ── 2. Load configuration from config.toml ──────────────
  let config = config::loader::load_config(&cli.config).context("Failed to load configuration")?;

  // ── 3. Initialize structured JSON logging ───────────────
  tracing_subscriber::fmt()
    .with_env_filter(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.app.log_level)),
    )
    .with_writer(std::io::stderr)
    .json()
    .init();

  // ── 4. Application context ──────────────────────────────
  let context = AppContext::new(AppSettings {
    network: cli.network.unwrap_or(config.network.active),
    dark_mode: config.app.dark_mode,
  });
  let network = context.network();

  info!(
    name = %config.app.name,
    version = env!("CARGO_PKG_VERSION"),
    network = %network,
    "Starting MonitorSSV client"
  );

  // ── 5. Backend client + gateway for the selected network ─
  let chain = config
    .chain(network)
    .with_context(|| format!("No [[chains]] entry for {network}"))?;
  let api_config = ApiClientConfig {
    base_url: chain.api_url.clone(),
    timeout: Duration::from_secs(config.api.timeout_seconds),
    max_concurrent: config.api.max_concurrent,
    requests_per_second: config.api.requests_per_second,
  };
  let client = Arc::new(ApiClient::new(api_config).context("Failed to create API client")?);
  let gateway = Arc::new(HttpGateway::new(client));

  match cli.command {
    Command::Explore(command) => explore(ExplorerPages::new(gateway), command).await,
    Command::Claim { account, submit } => {
      // ── 6. Read provider + claim contract reader ────────
      let provider = Arc::new(ReadProvider::connect(chain).await?);
      let chain_id = provider.chain_id();
      let reader = Arc::new(ClaimContractReader::new(provider, chain.claim_contract));
      info!(
        chain_id,
        contract = %reader.contract(),
        "Claim contract ready"
      );

      // ── 7. Session wallet ───────────────────────────────
      let wallet = Arc::new(connect_wallet(&config, chain).await?);

      // ── 8. Run the claim workflow ───────────────────────
      let mut workflow = ClaimWorkflow::new(
        gateway,
        Arc::clone(&reader),
        wallet,
        ClaimLinks::from_chain(chain),
      );
      claim(&mut workflow, &reader, account, submit).await
    }
    Command::Monitor(command) => {
      let wallet = Arc::new(connect_wallet(&config, chain).await?);
      let mut workflow = MonitorConfigWorkflow::new(gateway, Arc::clone(&wallet), context);
      monitor(&mut workflow, wallet.address(), command).await
    }
  }
}

/// Create the wallet for `chain`, connecting the key held in the
/// configured environment variable when it is set.
async fn connect_wallet(config: &AppConfig, chain: &ChainConfig) -> Result<LocalWallet> {
  let wallet = LocalWallet::new(chain);

  match std::env::var(&config.wallet.private_key_env) {
    Ok(key) if !key.trim().is_empty() => {
      wallet.connect(&key).await?;
    }
    _ => warn!(
      env = %config.wallet.private_key_env,
      "No private key in environment, wallet not connected"
    ),
  }
  Ok(wallet)
}

async fn claim<A, W>(
  workflow: &mut ClaimWorkflow<A, ClaimContractReader, W>,
  reader: &ClaimContractReader,
  account: Address,
  submit: bool,
) -> Result<()>
where
  A: monitorssv_client::ports::gateway::MonitorApi,
  W: Wallet,
{
  if !reader.is_healthy().await {
    warn!("RPC endpoint is not answering, the claimed amount may be unavailable");
  }

  let snapshot = workflow.search(account).await?;
  println!("Account:   {account}");
  println!("Eligible:  {} {TOKEN_SYMBOL}", format_token_amount(snapshot.eligible()));
  println!("Claimed:   {} {TOKEN_SYMBOL}", format_token_amount(snapshot.claimed));
  println!("Claimable: {} {TOKEN_SYMBOL}", format_token_amount(snapshot.claimable));

  if !submit {
    return Ok(());
  }

  // a stale root makes the contract revert the claim
  let root = reader.merkle_root().await?;
  anyhow::ensure!(
    root == snapshot.entitlement.merkle_root,
    "Published merkle root {} does not match the contract root {root}, try again after the next distribution",
    snapshot.entitlement.merkle_root
  );

  let outcome = workflow.claim().await;
  // a Safe proposal keeps running after the grace period
  if let Some(error) = workflow.settle_background().await {
    eprintln!("Error: {error}");
  }
  match outcome? {
    ClaimState::Confirmed { explorer_link, .. } => println!("Claim confirmed: {explorer_link}"),
    ClaimState::ProposedToMultisig { safe_link, .. } => {
      println!("Claim proposed to your Safe, awaiting co-signers: {safe_link}");
    }
    other => println!("Claim state: {other:?}"),
  }
  workflow.dispose();
  Ok(())
}

async fn monitor<A, W>(
  workflow: &mut MonitorConfigWorkflow<A, W>,
  connected: Option<Address>,
  command: MonitorCommand,
) -> Result<()>
where
  A: monitorssv_client::ports::gateway::MonitorApi,
  W: Wallet,
{
  if let MonitorCommand::Info { owner } = &command {
    let owner = owner
      .or(connected)
      .context("Pass --owner or connect a wallet")?;
    let summary = workflow.connect(owner).await?;
    println!("Owner:           {owner}");
    println!("Clusters:        {}", summary.total_clusters);
    println!("Active clusters: {}", summary.total_active_clusters);
    println!("Monitoring:      {}", summary.is_monitoring);
    println!("Latest block:    {}", summary.block);
    return Ok(());
  }

  let owner = connected.context("Monitor configuration needs a connected wallet")?;
  workflow.connect(owner).await?;

  match command {
    MonitorCommand::Info { .. } => {}
    MonitorCommand::View => {
      workflow.view().await?;
      print_draft(workflow.draft());
    }
    MonitorCommand::Save(args) => {
      open_form(workflow).await?;
      apply_channel_args(workflow, args)?;
      workflow.save().await?;
      print_draft(workflow.draft());
      print_notice(workflow);
    }
    MonitorCommand::Delete => {
      workflow.delete().await?;
      print_notice(workflow);
    }
    MonitorCommand::Test(args) => {
      // unsigned: the stored configuration is never fetched for a test
      workflow.test_alert_channel(&args.alert_channel()).await?;
      print_notice(workflow);
    }
  }
  Ok(())
}

/// Load the stored configuration into the form, or open an empty one.
async fn open_form<A, W>(workflow: &mut MonitorConfigWorkflow<A, W>) -> Result<()>
where
  A: monitorssv_client::ports::gateway::MonitorApi,
  W: Wallet,
{
  match workflow.state() {
    MonitorState::OwnerConfigHidden => workflow.view().await?,
    MonitorState::OwnerNoConfig { .. } => workflow.start_configuration()?,
    MonitorState::NotOwner => anyhow::bail!("Connected wallet owns no cluster"),
    MonitorState::Unknown | MonitorState::OwnerConfigVisible => {}
  }
  Ok(())
}

fn apply_channel_args<A, W>(workflow: &mut MonitorConfigWorkflow<A, W>, args: ChannelArgs) -> Result<()>
where
  A: monitorssv_client::ports::gateway::MonitorApi,
  W: Wallet,
{
  if let Some(method) = args.method {
    workflow.set_alert_method(method)?;
  }
  if let Some(webhook) = args.webhook {
    workflow.set_discord_webhook(webhook)?;
  }
  if let Some(token) = args.telegram_token {
    workflow.set_telegram_token(token)?;
  }
  if let Some(chat_id) = args.chat_id {
    workflow.set_telegram_chat_id(chat_id)?;
  }
  if let Some(threshold) = args.threshold {
    workflow.set_threshold_input(threshold)?;
    workflow.commit_threshold()?;
  }
  for flag in args.reports {
    if !workflow.draft().reports.get(flag) {
      workflow.toggle_report(flag)?;
    }
  }
  Ok(())
}

fn print_draft(draft: &monitorssv_client::usecases::MonitorDraft) {
  println!("Method:      {}", draft.method);
  println!("Threshold:   {} days", draft.liquidation_threshold_days);
  for flag in ReportFlag::ALL {
    let mark = if draft.reports.get(flag) { "x" } else { " " };
    println!("[{mark}] {}", flag.label());
  }
  if draft.reports == ReportFlags::default() {
    println!("(no reports enabled)");
  }
}

fn print_notice<A, W>(workflow: &MonitorConfigWorkflow<A, W>)
where
  A: monitorssv_client::ports::gateway::MonitorApi,
  W: Wallet,
{
  if let Some(notice) = workflow.notice() {
    println!("{}", notice.text);
  }
}

async fn explore<E>(pages: ExplorerPages<E>, command: ExploreCommand) -> Result<()>
where
  E: monitorssv_client::ports::explorer::ExplorerApi,
{
  match command {
    ExploreCommand::Status => print_json(&pages.indexer_status().await?),
    ExploreCommand::Dashboard => print_json(&pages.dashboard().await?),
    ExploreCommand::Operators(args) => print_json(&pages.operators(&args.into()).await),
    ExploreCommand::Clusters(args) => print_json(&pages.clusters(&args.into()).await),
    ExploreCommand::Validators(args) => print_json(&pages.validators(&args.into()).await),
    ExploreCommand::Events(args) => print_json(&pages.events(&args.into()).await),
    ExploreCommand::Cluster { id } => print_json(&pages.cluster_overview(&id).await?),
    ExploreCommand::Account { address } => {
      print_json(&pages.account_overview(&address.to_string()).await)
    }
    ExploreCommand::Ranking(args) => {
      let ranking = pages.liquidation_ranking(&args.into()).await;
      for cluster in &ranking.items {
        println!("{}  runway {}  owner {}", cluster.id, cluster.runway(), cluster.owner);
      }
      Ok(())
    }
  }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
  println!("{}", serde_json::to_string_pretty(value)?);
  Ok(())
}
