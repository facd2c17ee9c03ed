//! Integration Tests - Workflows against Mocked Ports
//!
//! Drives the claim, monitor and explorer use cases through mocked
//! backend, chain and wallet ports. Uses mockall for trait mocking and
//! tokio::test (paused clock where the grace period or notices matter).

use std::sync::{Arc, Mutex};
use std::time::Duration;

use alloy::primitives::{Address, TxHash, B256, U256};
use async_trait::async_trait;
use mockall::mock;
use mockall::predicate::*;
use tokio::sync::Semaphore;
use tokio_test::{assert_err, assert_ok};

use monitorssv_client::context::{AppContext, AppSettings};
use monitorssv_client::domain::explorer::{
    Cluster, ClusterDetails, ClusterPosStats, Dashboard, Event, IndexerStatus, Operator, Page,
    PageQuery, ProposedBlock, Validator,
};
use monitorssv_client::domain::monitor::{AlertChannel, AlertMethod, MonitorConfigPayload, ReportFlag};
use monitorssv_client::domain::network::Network;
use monitorssv_client::domain::ownership::{ownership_message, OwnershipProof};
use monitorssv_client::domain::rewards::{format_token_amount, RewardEntitlement};
use monitorssv_client::errors::MonitorError;
use monitorssv_client::ports::chain_client::ChainClient;
use monitorssv_client::ports::explorer::ExplorerApi;
use monitorssv_client::ports::gateway::{
    MonitorApi, MonitorConfigEnvelope, MonitorSummary, SaveConfigRequest,
};
use monitorssv_client::ports::wallet::{ClaimCall, ClaimReceipt, Wallet};
use monitorssv_client::usecases::monitor::{MonitorState, NoticeKind, NOTICE_TTL};
use monitorssv_client::usecases::{
    ClaimLinks, ClaimState, ClaimWorkflow, ExplorerPages, MonitorConfigWorkflow,
};

// ---- Mock Definitions ----

mock! {
    pub Api {}

    #[async_trait]
    impl MonitorApi for Api {
        async fn reward_entitlement(&self, account: Address) -> Result<RewardEntitlement, MonitorError>;
        async fn monitor_summary(&self, owner: Address) -> Result<MonitorSummary, MonitorError>;
        async fn monitor_config(&self, proof: &OwnershipProof) -> Result<MonitorConfigEnvelope, MonitorError>;
        async fn save_monitor_config(
            &self,
            request: &SaveConfigRequest,
        ) -> Result<MonitorConfigEnvelope, MonitorError>;
        async fn delete_monitor_config(&self, proof: &OwnershipProof) -> Result<(), MonitorError>;
        async fn test_alert_channel(&self, channel: &AlertChannel) -> Result<(), MonitorError>;
    }
}

mock! {
    pub Chain {}

    #[async_trait]
    impl ChainClient for Chain {
        async fn claimed_amount(&self, account: Address) -> Result<U256, MonitorError>;
        async fn is_contract_account(&self, address: Address) -> bool;
        async fn is_healthy(&self) -> bool;
    }
}

mock! {
    pub Signer {}

    #[async_trait]
    impl Wallet for Signer {
        fn address(&self) -> Option<Address>;
        async fn sign_message(&self, message: &str) -> Result<String, MonitorError>;
        async fn send_claim(&self, call: &ClaimCall) -> Result<TxHash, MonitorError>;
        async fn wait_for_confirmation(&self, tx_hash: TxHash) -> Result<ClaimReceipt, MonitorError>;
    }
}

mock! {
    pub Explorer {}

    #[async_trait]
    impl ExplorerApi for Explorer {
        async fn indexer_status(&self) -> Result<IndexerStatus, MonitorError>;
        async fn dashboard(&self) -> Result<Dashboard, MonitorError>;
        async fn operators(&self, query: &PageQuery) -> Result<Page<Operator>, MonitorError>;
        async fn clusters(&self, query: &PageQuery) -> Result<Page<Cluster>, MonitorError>;
        async fn validators(&self, query: &PageQuery) -> Result<Page<Validator>, MonitorError>;
        async fn events(&self, query: &PageQuery) -> Result<Page<Event>, MonitorError>;
        async fn cluster_blocks(
            &self,
            cluster_id: &str,
            query: &PageQuery,
        ) -> Result<Page<ProposedBlock>, MonitorError>;
        async fn cluster_details(&self, cluster_id: &str) -> Result<ClusterDetails, MonitorError>;
        async fn cluster_pos_stats(&self, cluster_id: &str) -> Result<ClusterPosStats, MonitorError>;
        async fn liquidation_ranking(&self, query: &PageQuery) -> Result<Page<ClusterDetails>, MonitorError>;
    }
}

// ---- Fixtures ----

const ACCOUNT: Address = Address::repeat_byte(0xaa);
const SIGNER: Address = Address::repeat_byte(0xbb);
const TX: TxHash = TxHash::repeat_byte(0xcc);

fn ether(n: u64) -> U256 {
    U256::from(n) * U256::from(10u64).pow(U256::from(18u64))
}

fn entitlement(cumulative: U256) -> RewardEntitlement {
    RewardEntitlement {
        account: ACCOUNT,
        cumulative_amount: cumulative,
        merkle_root: B256::repeat_byte(0x11),
        merkle_proof: vec![B256::repeat_byte(0x22), B256::repeat_byte(0x23)],
    }
}

fn links() -> ClaimLinks {
    ClaimLinks {
        explorer_url: "https://etherscan.io".into(),
        safe_app_url: "https://app.safe.global".into(),
        safe_chain_prefix: "eth".into(),
    }
}

fn api_with_entitlement(cumulative: U256) -> MockApi {
    let mut api = MockApi::new();
    api.expect_reward_entitlement()
        .with(eq(ACCOUNT))
        .times(1)
        .returning(move |_| Ok(entitlement(cumulative)));
    api
}

fn chain_with_claimed(claimed: U256) -> MockChain {
    let mut chain = MockChain::new();
    chain
        .expect_claimed_amount()
        .with(eq(ACCOUNT))
        .returning(move |_| Ok(claimed));
    chain
}

fn connected_signer() -> MockSigner {
    let mut wallet = MockSigner::new();
    wallet.expect_address().return_const(Some(SIGNER));
    wallet
}

fn summary(total: u64, active: u64, monitoring: bool, block: u64) -> MonitorSummary {
    MonitorSummary {
        total_clusters: total,
        total_active_clusters: active,
        is_monitoring: monitoring,
        block,
    }
}

fn stored_payload() -> MonitorConfigPayload {
    MonitorConfigPayload {
        alarm_type: 0,
        alarm_channel: "https://discord.example/hook".into(),
        report_liquidation_threshold: 21,
        report_operator_fee_change: true,
        report_network_fee_change: false,
        report_propose_block: true,
        report_missed_block: true,
        report_balance_decrease: true,
        report_exited_but_not_removed: false,
        report_weekly: true,
    }
}

fn context(network: Network) -> AppContext {
    AppContext::new(AppSettings {
        network,
        dark_mode: true,
    })
}

// ---- Claim Workflow ----

#[tokio::test]
async fn test_search_without_entitlement_skips_chain_read() {
    let api = api_with_entitlement(U256::ZERO);
    let mut chain = MockChain::new();
    chain.expect_claimed_amount().never();

    let mut workflow = ClaimWorkflow::new(
        Arc::new(api),
        Arc::new(chain),
        Arc::new(connected_signer()),
        links(),
    );

    let snapshot = workflow.search(ACCOUNT).await.unwrap();
    assert_eq!(snapshot.claimed, U256::ZERO);
    assert_eq!(snapshot.claimable, U256::ZERO);
    assert_eq!(workflow.state(), &ClaimState::Ready);

    let err = workflow.claim().await.unwrap_err();
    assert_eq!(err, MonitorError::NothingToClaim);
}

#[tokio::test]
async fn test_search_computes_claimable_delta() {
    let mut workflow = ClaimWorkflow::new(
        Arc::new(api_with_entitlement(ether(5))),
        Arc::new(chain_with_claimed(ether(2))),
        Arc::new(connected_signer()),
        links(),
    );

    let snapshot = workflow.search(ACCOUNT).await.unwrap();
    assert_eq!(snapshot.claimable, ether(3));
    assert_eq!(format_token_amount(snapshot.claimable), "3.000");
    assert_eq!(format_token_amount(snapshot.eligible()), "5.000");
}

#[tokio::test]
async fn test_chain_read_failure_blocks_claim() {
    let mut chain = MockChain::new();
    chain
        .expect_claimed_amount()
        .returning(|_| Err(MonitorError::ChainRead("execution reverted".into())));

    let mut workflow = ClaimWorkflow::new(
        Arc::new(api_with_entitlement(ether(5))),
        Arc::new(chain),
        Arc::new(connected_signer()),
        links(),
    );

    let err = workflow.search(ACCOUNT).await.unwrap_err();
    assert!(matches!(err, MonitorError::ChainRead(_)));
    assert_eq!(workflow.state(), &ClaimState::Idle);
    assert!(workflow.snapshot().is_none());
    assert!(workflow.last_error().unwrap().contains("execution reverted"));

    let err = workflow.claim().await.unwrap_err();
    assert!(matches!(err, MonitorError::InvalidState(_)));
}

#[tokio::test]
async fn test_entitlement_fetch_failure_is_published() {
    let mut api = MockApi::new();
    api.expect_reward_entitlement()
        .returning(|_| Err(MonitorError::remote("claim", "HTTP 502 Bad Gateway")));
    let mut chain = MockChain::new();
    chain.expect_claimed_amount().never();

    let mut workflow = ClaimWorkflow::new(
        Arc::new(api),
        Arc::new(chain),
        Arc::new(connected_signer()),
        links(),
    );
    let mut errors = workflow.subscribe_errors();

    assert_err!(workflow.search(ACCOUNT).await);
    assert!(errors.has_changed().unwrap());
    assert_eq!(
        errors.borrow_and_update().as_deref(),
        Some("failed to fetch claim: HTTP 502 Bad Gateway")
    );
}

#[tokio::test]
async fn test_claim_without_wallet_never_touches_chain() {
    let mut chain = chain_with_claimed(ether(1));
    chain.expect_is_contract_account().never();

    let mut wallet = MockSigner::new();
    wallet.expect_address().return_const(None);
    wallet.expect_send_claim().never();

    let mut workflow = ClaimWorkflow::new(
        Arc::new(api_with_entitlement(ether(5))),
        Arc::new(chain),
        Arc::new(wallet),
        links(),
    );
    assert_ok!(workflow.search(ACCOUNT).await);

    let err = workflow.claim().await.unwrap_err();
    assert_eq!(err, MonitorError::WalletNotConnected);
    assert_eq!(workflow.state(), &ClaimState::Ready);
}

#[tokio::test(start_paused = true)]
async fn test_safe_signer_routes_through_proposal() {
    let mut chain = chain_with_claimed(ether(2));
    chain
        .expect_is_contract_account()
        .with(eq(SIGNER))
        .returning(|_| true);

    let mut wallet = connected_signer();
    wallet
        .expect_send_claim()
        .withf(|call| {
            call.account == ACCOUNT
                && call.cumulative_amount == ether(5)
                && call.merkle_proof.len() == 2
        })
        .times(1)
        .returning(|_| Ok(TX));
    wallet.expect_wait_for_confirmation().never();

    let mut workflow = ClaimWorkflow::new(
        Arc::new(api_with_entitlement(ether(5))),
        Arc::new(chain),
        Arc::new(wallet),
        links(),
    );
    assert_ok!(workflow.search(ACCOUNT).await);

    let started = tokio::time::Instant::now();
    let state = workflow.claim().await.unwrap();
    assert!(started.elapsed() >= Duration::from_secs(5));

    match state {
        ClaimState::ProposedToMultisig { safe_link, .. } => {
            assert_eq!(
                safe_link,
                format!("https://app.safe.global/transactions/queue?safe=eth:{SIGNER}")
            );
        }
        other => panic!("expected ProposedToMultisig, got {other:?}"),
    }
    assert!(workflow.last_error().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_safe_proposal_failure_reported_alongside_proposed_state() {
    let mut chain = chain_with_claimed(ether(2));
    chain.expect_is_contract_account().returning(|_| true);

    let mut wallet = connected_signer();
    wallet
        .expect_send_claim()
        .returning(|_| Err(MonitorError::ChainWrite("user rejected transaction".into())));

    let mut workflow = ClaimWorkflow::new(
        Arc::new(api_with_entitlement(ether(5))),
        Arc::new(chain),
        Arc::new(wallet),
        links(),
    );
    assert_ok!(workflow.search(ACCOUNT).await);

    let state = workflow.claim().await.unwrap();
    assert!(matches!(state, ClaimState::ProposedToMultisig { .. }));
    assert_eq!(workflow.last_error().as_deref(), Some("user rejected transaction"));
}

#[tokio::test]
async fn test_direct_claim_settles_without_refetch() {
    let mut chain = chain_with_claimed(ether(2));
    chain.expect_is_contract_account().returning(|_| false);

    let mut wallet = connected_signer();
    wallet.expect_send_claim().times(1).returning(|_| Ok(TX));
    wallet
        .expect_wait_for_confirmation()
        .with(eq(TX))
        .times(1)
        .returning(|tx_hash| {
            Ok(ClaimReceipt {
                tx_hash,
                block_number: Some(21_000_000),
            })
        });

    // times(1) on the entitlement: a second fetch would fail the test
    let mut workflow = ClaimWorkflow::new(
        Arc::new(api_with_entitlement(ether(5))),
        Arc::new(chain),
        Arc::new(wallet),
        links(),
    );
    assert_ok!(workflow.search(ACCOUNT).await);

    let state = workflow.claim().await.unwrap();
    match state {
        ClaimState::Confirmed {
            tx_hash,
            explorer_link,
            ..
        } => {
            assert_eq!(tx_hash, TX);
            assert_eq!(explorer_link, format!("https://etherscan.io/tx/{TX}"));
        }
        other => panic!("expected Confirmed, got {other:?}"),
    }

    let snapshot = workflow.snapshot().unwrap();
    assert_eq!(snapshot.claimed, ether(5));
    assert_eq!(snapshot.claimable, U256::ZERO);
}

#[tokio::test]
async fn test_reverted_claim_fails_and_can_be_retried() {
    let mut chain = chain_with_claimed(ether(2));
    chain.expect_is_contract_account().returning(|_| false);

    let mut wallet = connected_signer();
    wallet.expect_send_claim().times(2).returning(|_| Ok(TX));
    let mut attempts = 0;
    wallet.expect_wait_for_confirmation().times(2).returning(move |tx_hash| {
        attempts += 1;
        if attempts == 1 {
            Err(MonitorError::ChainWrite("transaction reverted".into()))
        } else {
            Ok(ClaimReceipt {
                tx_hash,
                block_number: Some(1),
            })
        }
    });

    let mut workflow = ClaimWorkflow::new(
        Arc::new(api_with_entitlement(ether(5))),
        Arc::new(chain),
        Arc::new(wallet),
        links(),
    );
    assert_ok!(workflow.search(ACCOUNT).await);

    let err = workflow.claim().await.unwrap_err();
    assert_eq!(err, MonitorError::ChainWrite("transaction reverted".into()));
    assert_eq!(
        workflow.state(),
        &ClaimState::Failed {
            message: "transaction reverted".into()
        }
    );
    assert_eq!(workflow.snapshot().unwrap().claimable, ether(3));

    let state = workflow.claim().await.unwrap();
    assert!(matches!(state, ClaimState::Confirmed { .. }));
}

/// Safe wallet whose proposal only fails once the test releases it.
struct GatedSafeWallet {
    gate: Semaphore,
}

#[async_trait]
impl Wallet for GatedSafeWallet {
    fn address(&self) -> Option<Address> {
        Some(SIGNER)
    }

    async fn sign_message(&self, _message: &str) -> Result<String, MonitorError> {
        Ok("0x".into())
    }

    async fn send_claim(&self, _call: &ClaimCall) -> Result<TxHash, MonitorError> {
        let _permit = self.gate.acquire().await;
        Err(MonitorError::ChainWrite("proposal rejected".into()))
    }

    async fn wait_for_confirmation(&self, _tx_hash: TxHash) -> Result<ClaimReceipt, MonitorError> {
        Err(MonitorError::ChainWrite("not used".into()))
    }
}

#[tokio::test(start_paused = true)]
async fn test_late_proposal_failure_dropped_after_dispose() {
    let mut chain = chain_with_claimed(ether(2));
    chain.expect_is_contract_account().returning(|_| true);

    let wallet = Arc::new(GatedSafeWallet {
        gate: Semaphore::new(0),
    });
    let mut workflow = ClaimWorkflow::new(
        Arc::new(api_with_entitlement(ether(5))),
        Arc::new(chain),
        Arc::clone(&wallet),
        links(),
    );
    assert_ok!(workflow.search(ACCOUNT).await);

    let state = workflow.claim().await.unwrap();
    assert!(matches!(state, ClaimState::ProposedToMultisig { .. }));
    assert!(workflow.last_error().is_none());

    workflow.dispose();
    wallet.gate.add_permits(1);
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert!(workflow.last_error().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_settle_background_reports_pending_proposal() {
    let mut chain = chain_with_claimed(ether(2));
    chain.expect_is_contract_account().returning(|_| true);

    let wallet = Arc::new(GatedSafeWallet {
        gate: Semaphore::new(0),
    });
    let mut workflow = ClaimWorkflow::new(
        Arc::new(api_with_entitlement(ether(5))),
        Arc::new(chain),
        Arc::clone(&wallet),
        links(),
    );
    assert_ok!(workflow.search(ACCOUNT).await);

    let state = workflow.claim().await.unwrap();
    assert!(matches!(state, ClaimState::ProposedToMultisig { .. }));
    assert!(workflow.last_error().is_none());

    wallet.gate.add_permits(1);
    assert_eq!(
        workflow.settle_background().await.as_deref(),
        Some("proposal rejected")
    );
    // nothing left to wait for
    assert_eq!(
        workflow.settle_background().await.as_deref(),
        Some("proposal rejected")
    );
}

// ---- Monitor Config Workflow ----

#[tokio::test]
async fn test_connect_resolves_ownership_state() {
    let cases = [
        (summary(0, 0, false, 10), MonitorState::NotOwner),
        (summary(3, 0, false, 10), MonitorState::OwnerNoConfig { editing: false }),
        (summary(3, 0, true, 10), MonitorState::OwnerConfigHidden),
        (summary(2, 1, false, 10), MonitorState::OwnerNoConfig { editing: false }),
        (summary(2, 2, true, 10), MonitorState::OwnerConfigHidden),
    ];

    for (info, expected) in cases {
        let mut api = MockApi::new();
        api.expect_monitor_summary()
            .with(eq(SIGNER))
            .returning(move |_| Ok(info));

        let mut workflow = MonitorConfigWorkflow::new(
            Arc::new(api),
            Arc::new(connected_signer()),
            context(Network::Mainnet),
        );
        assert_ok!(workflow.connect(SIGNER).await);
        assert_eq!(workflow.state(), expected);
        assert_eq!(workflow.block(), Some(10));
    }
}

#[tokio::test]
async fn test_non_owner_cannot_configure() {
    let mut api = MockApi::new();
    api.expect_monitor_summary()
        .returning(|_| Ok(summary(0, 0, false, 10)));
    api.expect_test_alert_channel().never();

    let mut workflow = MonitorConfigWorkflow::new(
        Arc::new(api),
        Arc::new(connected_signer()),
        context(Network::Mainnet),
    );
    assert_ok!(workflow.connect(SIGNER).await);

    assert_eq!(
        workflow.start_configuration().unwrap_err(),
        MonitorError::NotClusterOwner
    );
    assert_eq!(
        workflow.test_drafted_channel().await.unwrap_err(),
        MonitorError::NotClusterOwner
    );
}

#[tokio::test]
async fn test_liquidated_owner_can_delete_but_not_save() {
    let mut api = MockApi::new();
    api.expect_monitor_summary()
        .returning(|_| Ok(summary(3, 0, true, 500)));
    api.expect_monitor_config().returning(|_| {
        Ok(MonitorConfigEnvelope {
            config: stored_payload(),
            block: 501,
        })
    });
    api.expect_save_monitor_config().never();
    api.expect_delete_monitor_config()
        .withf(|proof| proof.block == 501 && proof.owner == SIGNER)
        .times(1)
        .returning(|_| Ok(()));

    let mut wallet = connected_signer();
    wallet.expect_sign_message().returning(|_| Ok("0xsig".into()));

    let mut workflow =
        MonitorConfigWorkflow::new(Arc::new(api), Arc::new(wallet), context(Network::Mainnet));
    assert_ok!(workflow.connect(SIGNER).await);
    assert_eq!(workflow.state(), MonitorState::OwnerConfigHidden);

    workflow.view().await.unwrap();
    assert_eq!(workflow.save().await.unwrap_err(), MonitorError::NotClusterOwner);
    assert_eq!(workflow.notice().unwrap().kind, NoticeKind::Error);

    workflow.delete().await.unwrap();
    assert_eq!(workflow.state(), MonitorState::OwnerNoConfig { editing: false });
    assert!(!workflow.summary().unwrap().is_monitoring);
    assert_eq!(
        workflow.start_configuration().unwrap_err(),
        MonitorError::NotClusterOwner
    );
}

#[tokio::test]
async fn test_save_floors_threshold_and_binds_payload() {
    let mut api = MockApi::new();
    api.expect_monitor_summary()
        .returning(|_| Ok(summary(1, 1, false, 100)));
    api.expect_save_monitor_config()
        .withf(|request| {
            request.proof.owner == SIGNER
                && request.proof.block == 100
                && request.payload_json.contains("\"report_liquidation_threshold\":10")
                && request.payload_json.contains("\"alarm_channel\":\"https://discord.example/hook\"")
        })
        .times(1)
        .returning(|request| {
            Ok(MonitorConfigEnvelope {
                config: serde_json::from_str(&request.payload_json).unwrap(),
                block: 105,
            })
        });

    let signed = Arc::new(Mutex::new(Vec::new()));
    let mut wallet = connected_signer();
    let log = Arc::clone(&signed);
    wallet.expect_sign_message().returning(move |message| {
        log.lock().unwrap().push(message.to_string());
        Ok("0xsig".into())
    });

    let mut workflow =
        MonitorConfigWorkflow::new(Arc::new(api), Arc::new(wallet), context(Network::Mainnet));
    assert_ok!(workflow.connect(SIGNER).await);
    workflow.start_configuration().unwrap();
    workflow.set_discord_webhook("https://discord.example/hook").unwrap();
    workflow.set_threshold_input("3").unwrap();

    workflow.save().await.unwrap();

    assert_eq!(workflow.draft().liquidation_threshold_days, 10);
    assert_eq!(workflow.state(), MonitorState::OwnerConfigVisible);
    assert!(workflow.summary().unwrap().is_monitoring);
    assert_eq!(workflow.block(), Some(105));
    assert_eq!(workflow.notice().unwrap().kind, NoticeKind::Success);

    let signed = signed.lock().unwrap();
    assert_eq!(signed.len(), 1);
    let (header, payload) = signed[0].split_once('\n').unwrap();
    assert_eq!(header, ownership_message(100, None));
    assert!(payload.contains("\"report_liquidation_threshold\":10"));
}

#[tokio::test]
async fn test_secondary_network_suppresses_telemetry_reports() {
    let ctx = context(Network::Mainnet);

    let mut api = MockApi::new();
    api.expect_monitor_summary()
        .returning(|_| Ok(summary(1, 1, true, 200)));
    api.expect_monitor_config()
        .returning(|_| {
            Ok(MonitorConfigEnvelope {
                config: stored_payload(),
                block: 201,
            })
        });
    api.expect_save_monitor_config()
        .withf(|request| {
            request.payload_json.contains("\"report_propose_block\":false")
                && request.payload_json.contains("\"report_missed_block\":false")
                && request.payload_json.contains("\"report_balance_decrease\":false")
                && request.payload_json.contains("\"report_weekly\":true")
        })
        .times(1)
        .returning(|_| {
            Ok(MonitorConfigEnvelope {
                config: stored_payload(),
                block: 202,
            })
        });

    let mut wallet = connected_signer();
    wallet.expect_sign_message().returning(|_| Ok("0xsig".into()));

    let mut workflow = MonitorConfigWorkflow::new(Arc::new(api), Arc::new(wallet), ctx.clone());
    assert_ok!(workflow.connect(SIGNER).await);
    workflow.view().await.unwrap();

    // loaded on mainnet: telemetry reports kept
    assert!(workflow.draft().reports.block_proposals);
    assert_eq!(workflow.draft().liquidation_threshold_days, 21);

    // switched at the root after loading: the draft still holds the flag
    ctx.set_network(Network::Holesky);
    assert!(workflow.draft().reports.block_proposals);
    assert!(matches!(
        workflow.toggle_report(ReportFlag::MissedBlocks),
        Err(MonitorError::InvalidInput(_))
    ));

    workflow.save().await.unwrap();
}

#[tokio::test]
async fn test_loading_on_secondary_network_clears_telemetry_flags() {
    let mut api = MockApi::new();
    api.expect_monitor_summary()
        .returning(|_| Ok(summary(1, 1, true, 300)));
    api.expect_monitor_config()
        .returning(|_| {
            Ok(MonitorConfigEnvelope {
                config: stored_payload(),
                block: 301,
            })
        });

    let mut wallet = connected_signer();
    wallet.expect_sign_message().returning(|_| Ok("0xsig".into()));

    let mut workflow = MonitorConfigWorkflow::new(
        Arc::new(api),
        Arc::new(wallet),
        context(Network::Holesky),
    );
    assert_ok!(workflow.connect(SIGNER).await);
    workflow.view().await.unwrap();

    let reports = workflow.draft().reports;
    assert!(!reports.block_proposals);
    assert!(!reports.missed_blocks);
    assert!(!reports.balance_decrease);
    assert!(reports.operator_fee_change);
    assert!(reports.weekly_report);
}

#[tokio::test]
async fn test_view_and_delete_sign_distinct_blocks() {
    let mut api = MockApi::new();
    api.expect_monitor_summary()
        .returning(|_| Ok(summary(1, 1, true, 400)));
    api.expect_monitor_config()
        .withf(|proof| proof.block == 400)
        .returning(|_| {
            Ok(MonitorConfigEnvelope {
                config: stored_payload(),
                block: 412,
            })
        });
    api.expect_delete_monitor_config()
        .withf(|proof| proof.block == 412 && proof.owner == SIGNER)
        .times(1)
        .returning(|_| Ok(()));

    let signed = Arc::new(Mutex::new(Vec::new()));
    let mut wallet = connected_signer();
    let log = Arc::clone(&signed);
    wallet.expect_sign_message().returning(move |message| {
        log.lock().unwrap().push(message.to_string());
        Ok("0xsig".into())
    });

    let mut workflow =
        MonitorConfigWorkflow::new(Arc::new(api), Arc::new(wallet), context(Network::Mainnet));
    assert_ok!(workflow.connect(SIGNER).await);
    workflow.view().await.unwrap();
    workflow.delete().await.unwrap();

    let signed = signed.lock().unwrap();
    assert_eq!(
        signed.as_slice(),
        [ownership_message(400, None), ownership_message(412, None)]
    );
    assert_ne!(signed[0], signed[1]);
}

#[tokio::test]
async fn test_delete_resets_draft() {
    let mut api = MockApi::new();
    api.expect_monitor_summary()
        .returning(|_| Ok(summary(1, 1, true, 500)));
    api.expect_monitor_config().returning(|_| {
        Ok(MonitorConfigEnvelope {
            config: stored_payload(),
            block: 501,
        })
    });
    api.expect_delete_monitor_config().returning(|_| Ok(()));

    let mut wallet = connected_signer();
    wallet.expect_sign_message().returning(|_| Ok("0xsig".into()));

    let mut workflow =
        MonitorConfigWorkflow::new(Arc::new(api), Arc::new(wallet), context(Network::Mainnet));
    assert_ok!(workflow.connect(SIGNER).await);
    workflow.view().await.unwrap();
    assert_eq!(workflow.draft().discord_webhook, "https://discord.example/hook");

    workflow.delete().await.unwrap();

    let draft = workflow.draft();
    assert_eq!(draft.method, AlertMethod::Discord);
    assert!(draft.discord_webhook.is_empty());
    assert_eq!(draft.liquidation_threshold_days, 30);
    assert_eq!(draft.threshold_input, "30");
    assert_eq!(draft.reports, Default::default());
    assert!(!workflow.summary().unwrap().is_monitoring);
    assert_eq!(workflow.state(), MonitorState::OwnerNoConfig { editing: false });
}

#[tokio::test]
async fn test_alert_is_unsigned() {
    let mut api = MockApi::new();
    api.expect_monitor_summary()
        .returning(|_| Ok(summary(1, 1, false, 600)));
    api.expect_test_alert_channel()
        .withf(|channel| channel.method() == AlertMethod::Telegram && channel.wire_address() == "bot:token,-1001")
        .times(1)
        .returning(|_| Ok(()));
    api.expect_save_monitor_config().never();

    let mut wallet = connected_signer();
    wallet.expect_sign_message().never();

    let mut workflow =
        MonitorConfigWorkflow::new(Arc::new(api), Arc::new(wallet), context(Network::Mainnet));
    assert_ok!(workflow.connect(SIGNER).await);
    workflow.start_configuration().unwrap();
    workflow.set_alert_method(AlertMethod::Telegram).unwrap();
    workflow.set_telegram_token("bot:token").unwrap();
    workflow.set_telegram_chat_id("-1001").unwrap();

    workflow.test_drafted_channel().await.unwrap();
    assert_eq!(workflow.notice().unwrap().kind, NoticeKind::Success);
    assert!(!workflow.summary().unwrap().is_monitoring);
}

#[tokio::test]
async fn test_alert_with_stored_config_skips_signed_fetch() {
    let mut api = MockApi::new();
    api.expect_monitor_summary()
        .returning(|_| Ok(summary(2, 2, true, 650)));
    api.expect_monitor_config().never();
    api.expect_test_alert_channel()
        .withf(|channel| channel.wire_address() == "https://discord.example/other")
        .times(1)
        .returning(|_| Ok(()));

    let mut wallet = connected_signer();
    wallet.expect_sign_message().never();

    let mut workflow =
        MonitorConfigWorkflow::new(Arc::new(api), Arc::new(wallet), context(Network::Mainnet));
    assert_ok!(workflow.connect(SIGNER).await);

    let channel = AlertChannel::Discord {
        webhook: "https://discord.example/other".into(),
    };
    workflow.test_alert_channel(&channel).await.unwrap();

    assert_eq!(workflow.state(), MonitorState::OwnerConfigHidden);
    assert_eq!(workflow.notice().unwrap().kind, NoticeKind::Success);
    assert!(workflow.draft().discord_webhook.is_empty());
}

#[tokio::test]
async fn test_incomplete_channel_rejected_before_test_alert() {
    let mut api = MockApi::new();
    api.expect_monitor_summary()
        .returning(|_| Ok(summary(1, 1, false, 600)));
    api.expect_test_alert_channel().never();

    let mut workflow = MonitorConfigWorkflow::new(
        Arc::new(api),
        Arc::new(connected_signer()),
        context(Network::Mainnet),
    );
    assert_ok!(workflow.connect(SIGNER).await);
    workflow.start_configuration().unwrap();

    assert!(matches!(
        workflow.test_drafted_channel().await,
        Err(MonitorError::InvalidInput(_))
    ));
    assert_eq!(workflow.notice().unwrap().kind, NoticeKind::Error);
}

#[tokio::test]
async fn test_proof_from_other_wallet_rejected() {
    let mut api = MockApi::new();
    api.expect_monitor_summary()
        .returning(|_| Ok(summary(1, 1, true, 700)));
    api.expect_monitor_config().never();

    let mut wallet = connected_signer();
    wallet.expect_sign_message().returning(|_| Ok("0xsig".into()));

    let mut workflow =
        MonitorConfigWorkflow::new(Arc::new(api), Arc::new(wallet), context(Network::Mainnet));
    workflow.connect(ACCOUNT).await.unwrap();

    assert!(matches!(
        workflow.view().await,
        Err(MonitorError::InvalidInput(_))
    ));
    assert_eq!(workflow.state(), MonitorState::OwnerConfigHidden);
}

#[tokio::test(start_paused = true)]
async fn test_notice_auto_clears() {
    let mut api = MockApi::new();
    api.expect_monitor_summary()
        .returning(|_| Ok(summary(1, 1, true, 800)));
    api.expect_delete_monitor_config().returning(|_| Ok(()));

    let mut wallet = connected_signer();
    wallet.expect_sign_message().returning(|_| Ok("0xsig".into()));

    let mut workflow =
        MonitorConfigWorkflow::new(Arc::new(api), Arc::new(wallet), context(Network::Mainnet));
    assert_ok!(workflow.connect(SIGNER).await);
    workflow.delete().await.unwrap();
    assert!(workflow.notice().is_some());

    tokio::time::advance(NOTICE_TTL).await;
    assert!(workflow.notice().is_none());
}

// ---- Explorer Pages ----

fn details(id: &str) -> ClusterDetails {
    ClusterDetails {
        id: id.into(),
        owner: "0xowner".into(),
        fee_recipient_address: "0xfee".into(),
        active: true,
        on_chain_balance: "12.5".into(),
        burn_fee: "0.01".into(),
        operational_runaway: 7_200 * 3 + 600,
        validator_count: 4,
        operators: vec![],
    }
}

#[tokio::test]
async fn test_listing_failure_degrades_to_empty_page() {
    let mut api = MockExplorer::new();
    api.expect_operators()
        .returning(|_| Err(MonitorError::remote("operators", "HTTP 500")));

    let pages = ExplorerPages::new(Arc::new(api));
    let query = PageQuery {
        page: 3,
        ..PageQuery::default()
    };

    let page = pages.operators(&query).await;
    assert!(page.is_empty());
    assert_eq!(page.current_page, 3);
}

#[tokio::test]
async fn test_cluster_overview_tolerates_missing_stats() {
    let mut api = MockExplorer::new();
    api.expect_cluster_details()
        .withf(|id| id.to_string() == "c1")
        .returning(|id| Ok(details(id)));
    api.expect_cluster_pos_stats()
        .returning(|_| Err(MonitorError::remote("posData", "code 500: no data")));
    api.expect_cluster_blocks()
        .returning(|_, query| Ok(Page::empty(query.page)));
    api.expect_events()
        .withf(|query| query.search.as_deref() == Some("c1"))
        .returning(|_| Err(MonitorError::remote("events", "timeout")));

    let pages = ExplorerPages::new(Arc::new(api));
    let overview = pages.cluster_overview("c1").await.unwrap();

    assert_eq!(overview.details.runway(), "3d 2h");
    assert!(overview.pos_stats.is_none());
    assert!(overview.events.is_empty());
}

#[tokio::test]
async fn test_cluster_overview_requires_details() {
    let mut api = MockExplorer::new();
    api.expect_cluster_details()
        .returning(|_| Err(MonitorError::remote("clusterDetails", "code 404: not found")));
    api.expect_cluster_pos_stats()
        .returning(|_| Ok(ClusterPosStats::default()));
    api.expect_cluster_blocks()
        .returning(|_, query| Ok(Page::empty(query.page)));
    api.expect_events()
        .returning(|query| Ok(Page::empty(query.page)));

    let pages = ExplorerPages::new(Arc::new(api));
    let err = pages.cluster_overview("missing").await.unwrap_err();
    assert_eq!(
        err,
        MonitorError::remote("clusterDetails", "code 404: not found")
    );
}
