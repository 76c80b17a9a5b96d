//! Dashboard facade.
//!
//! [`GaugeDashboard`] wires the caches, the pin store, the bribe drafts and
//! the transaction coordinator together and exposes the operations a
//! presentation layer calls.

use crate::drafts::BribeDrafts;
use crate::notice::{Notifier, TracingNotifier};
use crate::transaction::{TransactionCoordinator, TxReceipt, TxRequest};
use gauge_data::pins::PinStore;
use gauge_data::positions::{Earned, PositionBook};
use gauge_data::registry::PoolRegistry;
use gauge_domain::address::normalize;
use gauge_domain::bribe::{BribeDraft, ValidBribe};
use gauge_domain::classifier;
use gauge_domain::entities::{Pool, PoolKey, PoolMeta, Position, PositionToken};
use gauge_domain::enums::{ActionKind, PoolType};
use gauge_domain::error::DraftField;
use gauge_domain::{GaugeError, GaugeResult};
use gauge_protocols::chain::ChainReader;
use gauge_protocols::config::GaugeConfig;
use gauge_protocols::payload;
use gauge_protocols::store::KeyValueStore;
use gauge_protocols::wallet::WalletSigner;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

/// One row of the pool list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolView {
    /// Pool key.
    pub key: PoolKey,
    /// Whether the pool is pinned.
    pub pinned: bool,
    /// Whether the registry currently lists the pool.
    pub registered: bool,
    /// Classified pool type.
    pub pool_type: PoolType,
    /// The connected account's positions in this pool.
    pub positions: Vec<Position>,
}

/// Everything the dashboard needs, behind one handle.
pub struct GaugeDashboard {
    config: Arc<GaugeConfig>,
    wallet: Arc<dyn WalletSigner>,
    registry: Arc<PoolRegistry>,
    positions: Arc<PositionBook>,
    pins: RwLock<PinStore>,
    drafts: RwLock<BribeDrafts>,
    coordinator: TransactionCoordinator,
}

impl GaugeDashboard {
    /// Creates a dashboard that reports notices through `tracing`.
    pub fn new(
        config: GaugeConfig,
        chain: Arc<dyn ChainReader>,
        wallet: Arc<dyn WalletSigner>,
        store: Arc<dyn KeyValueStore>,
    ) -> Self {
        Self::with_notifier(config, chain, wallet, store, Arc::new(TracingNotifier))
    }

    /// Creates a dashboard with a custom notifier.
    pub fn with_notifier(
        config: GaugeConfig,
        chain: Arc<dyn ChainReader>,
        wallet: Arc<dyn WalletSigner>,
        store: Arc<dyn KeyValueStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let config = Arc::new(config);
        let registry = Arc::new(PoolRegistry::new(chain.clone(), config.clone()));
        let positions = Arc::new(PositionBook::new(chain.clone(), config.clone()));
        let coordinator = TransactionCoordinator::new(wallet.clone(), chain, notifier)
            .invalidating(registry.clone())
            .invalidating(positions.clone());

        Self {
            config,
            wallet,
            registry,
            positions,
            pins: RwLock::new(PinStore::load(store)),
            drafts: RwLock::new(BribeDrafts::new()),
            coordinator,
        }
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &GaugeConfig {
        &self.config
    }

    /// Transaction coordinator, for phase and history queries.
    #[must_use]
    pub fn coordinator(&self) -> &TransactionCoordinator {
        &self.coordinator
    }

    // Reads

    /// Registered pools in registry order.
    ///
    /// A failed refresh falls back to the last fetched list.
    ///
    /// # Errors
    /// [`GaugeError::Unconfigured`] without a voter address;
    /// [`GaugeError::FetchFailed`] if the fetch fails and nothing was cached.
    pub async fn list_pools(&self) -> GaugeResult<Vec<Pool>> {
        self.registry.list_pools_or_stale().await
    }

    /// Tokens among `tokens` that belong to `pool`.
    #[must_use]
    pub fn reconcile_positions(&self, tokens: &[PositionToken], pool: &str) -> Vec<Position> {
        self.positions.reconcile(tokens, pool)
    }

    /// Pool type from raw metadata.
    #[must_use]
    pub fn classify(&self, meta: Option<&PoolMeta>) -> PoolType {
        classifier::classify(meta)
    }

    /// Position tokens owned by `account`.
    ///
    /// # Errors
    /// [`GaugeError::Unconfigured`], [`GaugeError::InvalidAddress`] or
    /// [`GaugeError::FetchFailed`].
    pub async fn user_positions(&self, account: &str) -> GaugeResult<Vec<PositionToken>> {
        self.positions.owned_tokens(account).await
    }

    /// Positions committed to the gauge of `pool`.
    ///
    /// # Errors
    /// Same as [`Self::user_positions`].
    pub async fn committed_positions(&self, pool: &str) -> GaugeResult<Vec<Position>> {
        self.positions.committed_positions(pool).await
    }

    /// Rewards earned by a committed position, [`Earned::Unknown`] on failure.
    pub async fn earned(&self, position: &Position) -> Earned {
        self.positions.earned(position).await
    }

    /// Pools joined with pin state, type and the connected account's
    /// positions, in display order.
    ///
    /// `metadata` maps pool keys to raw type metadata; missing entries
    /// classify as AMM. Position read failures leave the position lists
    /// empty.
    ///
    /// # Errors
    /// Same as [`Self::list_pools`].
    pub async fn pool_views(&self, metadata: &HashMap<PoolKey, PoolMeta>) -> GaugeResult<Vec<PoolView>> {
        let pools = self.list_pools().await?;
        let registered: HashSet<PoolKey> = pools.iter().map(Pool::key).collect();
        let keys: Vec<PoolKey> = pools.iter().map(Pool::key).collect();

        let tokens = match self.wallet.account() {
            Some(account) => match self.positions.owned_tokens(&account).await {
                Ok(tokens) => tokens,
                Err(e) => {
                    warn!(account = %account, error = %e, "Position read failed, showing none");
                    Vec::new()
                }
            },
            None => Vec::new(),
        };

        let pins = self.pins.read().await;
        let views = pins
            .order(&keys)
            .into_iter()
            .map(|key| PoolView {
                pinned: pins.is_pinned(&key),
                registered: registered.contains(&key),
                pool_type: classifier::classify(metadata.get(&key)),
                positions: self.positions.reconcile(&tokens, key.as_str()),
                key,
            })
            .collect();
        Ok(views)
    }

    // Pins

    /// Pinned pools first, then the rest of `pools`.
    pub async fn order(&self, pools: &[PoolKey]) -> Vec<PoolKey> {
        self.pins.read().await.order(pools)
    }

    /// Flips the pin of `pool`. Returns whether it is pinned afterwards.
    pub async fn toggle(&self, pool: PoolKey) -> bool {
        let pinned = self.pins.write().await.toggle(pool.clone());
        info!(pool = %pool, pinned, "Pin toggled");
        pinned
    }

    /// Pinned keys in pin order.
    pub async fn pins(&self) -> Vec<PoolKey> {
        self.pins.read().await.pins().to_vec()
    }

    // Drafts

    /// Bribe draft of `pool`.
    pub async fn draft(&self, pool: &PoolKey) -> BribeDraft {
        self.drafts.read().await.get(pool)
    }

    /// Updates one field of the bribe draft of `pool`.
    pub async fn set_draft_field(&self, pool: PoolKey, field: DraftField, value: impl Into<String>) {
        self.drafts.write().await.set_field(pool, field, value);
    }

    /// Validates the bribe draft of `pool`.
    ///
    /// # Errors
    /// [`GaugeError::ValidationFailed`].
    pub async fn validate_draft(&self, pool: &PoolKey) -> GaugeResult<ValidBribe> {
        self.drafts.read().await.validate(pool)
    }

    // Actions

    /// Withdraws a committed position from its gauge.
    ///
    /// # Errors
    /// See [`TransactionCoordinator::execute`].
    pub async fn uncommit(&self, position: &Position) -> GaugeResult<TxReceipt> {
        let request = TxRequest::new(ActionKind::Uncommit, position.pool_address.clone())
            .with_position(position.token_id.clone());
        let config = &self.config;

        self.coordinator
            .execute(request, || {
                let gauge = config.gauge()?;
                Ok(payload::uncommit(
                    gauge,
                    &position.pool_address,
                    &position.token_id,
                ))
            })
            .await
    }

    /// Distributes the validated bribe draft of `pool`.
    ///
    /// On success the draft keeps its token address and loses its amount.
    ///
    /// # Errors
    /// [`GaugeError::ValidationFailed`] for an invalid draft, otherwise see
    /// [`TransactionCoordinator::execute`].
    pub async fn distribute_bribes(&self, pool: &PoolKey) -> GaugeResult<TxReceipt> {
        let draft = self.draft(pool).await;
        let config = &self.config;
        let mut submitted: Option<ValidBribe> = None;

        let receipt = self
            .coordinator
            .execute(TxRequest::new(ActionKind::DistributeBribes, pool.as_str()), || {
                let voter = config.voter()?;
                config.amm()?;
                let pool_address = normalize(pool.as_str())?;
                let bribe = draft.validate().map_err(GaugeError::ValidationFailed)?;
                let payload = payload::distribute_bribes(voter, &pool_address, &bribe);
                submitted = Some(bribe);
                Ok(payload)
            })
            .await?;

        if let Some(bribe) = submitted {
            self.drafts.write().await.settle(pool, &bribe);
        }
        Ok(receipt)
    }

    /// Swaps through `pool`.
    ///
    /// # Errors
    /// See [`TransactionCoordinator::execute`].
    pub async fn swap_pool(&self, pool: &PoolKey) -> GaugeResult<TxReceipt> {
        self.pool_action(ActionKind::SwapPool, pool, payload::swap_pool)
            .await
    }

    /// Adds liquidity to `pool`.
    ///
    /// # Errors
    /// See [`TransactionCoordinator::execute`].
    pub async fn add_liquidity(&self, pool: &PoolKey) -> GaugeResult<TxReceipt> {
        self.pool_action(ActionKind::AddLiquidity, pool, payload::add_liquidity)
            .await
    }

    /// Runs an AMM router action that needs both the AMM and voter addresses.
    async fn pool_action(
        &self,
        kind: ActionKind,
        pool: &PoolKey,
        build: fn(&str, &str) -> payload::EntryFunctionPayload,
    ) -> GaugeResult<TxReceipt> {
        let config = &self.config;
        self.coordinator
            .execute(TxRequest::new(kind, pool.as_str()), || {
                let amm = config.amm()?;
                config.voter()?;
                let pool_address = normalize(pool.as_str())?;
                Ok(build(amm, &pool_address))
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notice::{NoticeLevel, QueueNotifier};
    use crate::transaction::TxPhase;
    use gauge_domain::enums::PositionIndex;
    use gauge_domain::error::{DraftIssue, IssueKind};
    use gauge_protocols::store::MemoryStore;
    use gauge_protocols::testing::{FakeChain, FakeWallet, WalletMode};
    use serde_json::json;

    const ACCOUNT: &str = "0xa11ce";

    struct Harness {
        chain: Arc<FakeChain>,
        wallet: Arc<FakeWallet>,
        notices: Arc<QueueNotifier>,
        dashboard: GaugeDashboard,
    }

    fn full_config() -> GaugeConfig {
        GaugeConfig {
            voter_address: Some("0xee".to_string()),
            amm_address: Some("0xa3".to_string()),
            positions_address: Some("0x7a99".to_string()),
            ..Default::default()
        }
    }

    fn harness_with(config: GaugeConfig, store: Arc<MemoryStore>) -> Harness {
        let chain = Arc::new(FakeChain::with_pools(&["0xaa11", "0xbb22", "0xcc33"]));
        chain.set_tokens(
            ACCOUNT,
            vec![
                PositionToken::new("0xt1", "P0xaa11_0"),
                PositionToken::new("0xt2", "P0xcc33_x"),
            ],
        );
        chain.set_tokens("0xaa11", vec![PositionToken::new("0xc1", "P0xaa11_4")]);
        let wallet = Arc::new(FakeWallet::connected(ACCOUNT));
        let notices = Arc::new(QueueNotifier::new());
        let dashboard = GaugeDashboard::with_notifier(
            config,
            chain.clone(),
            wallet.clone(),
            store,
            notices.clone(),
        );
        Harness {
            chain,
            wallet,
            notices,
            dashboard,
        }
    }

    fn harness() -> Harness {
        harness_with(full_config(), Arc::new(MemoryStore::new()))
    }

    fn key(value: &str) -> PoolKey {
        PoolKey::new(value)
    }

    #[tokio::test]
    async fn test_pool_views_order_and_classify() {
        let h = harness();
        h.dashboard.toggle(key("0xcc33")).await;
        h.dashboard.toggle(key("0xdd44")).await;

        let mut metadata = HashMap::new();
        metadata.insert(
            key("0xcc33"),
            PoolMeta {
                hook_type: Some(4),
                hook_type_label: Some("V3".to_string()),
            },
        );
        metadata.insert(
            key("0xbb22"),
            PoolMeta {
                hook_type: Some(3),
                hook_type_label: None,
            },
        );

        let views = h.dashboard.pool_views(&metadata).await.unwrap();
        let order: Vec<&str> = views.iter().map(|v| v.key.as_str()).collect();
        assert_eq!(order, vec!["0xcc33", "0xdd44", "0xaa11", "0xbb22"]);

        assert!(views[0].pinned && views[0].registered);
        assert_eq!(views[0].pool_type, PoolType::Stable);
        assert_eq!(views[0].positions[0].index, PositionIndex::Unknown);
        assert!(views[1].pinned && !views[1].registered);
        assert_eq!(views[2].pool_type, PoolType::Amm);
        assert_eq!(views[2].positions.len(), 1);
        assert_eq!(views[3].pool_type, PoolType::Clmm);
        assert!(views[3].positions.is_empty());
    }

    #[tokio::test]
    async fn test_pins_survive_a_new_session() {
        let store = Arc::new(MemoryStore::new());
        let first = harness_with(full_config(), store.clone());
        first.dashboard.toggle(key("0xbb22")).await;

        let second = harness_with(full_config(), store);
        assert_eq!(second.dashboard.pins().await, vec![key("0xbb22")]);
        assert_eq!(
            second
                .dashboard
                .order(&[key("0xaa11"), key("0xbb22")])
                .await,
            vec![key("0xbb22"), key("0xaa11")]
        );
    }

    #[tokio::test]
    async fn test_uncommit_refreshes_positions_and_registry() {
        let h = harness();
        h.dashboard.list_pools().await.unwrap();
        let committed = h.dashboard.committed_positions("0xaa11").await.unwrap();
        assert_eq!(h.chain.view_calls(), 1);
        assert_eq!(h.chain.token_calls(), 1);

        let receipt = h.dashboard.uncommit(&committed[0]).await.unwrap();
        assert_eq!(receipt.request.kind, ActionKind::Uncommit);

        let submitted = h.wallet.submitted();
        assert_eq!(submitted[0].function, "0xee::gauge::uncommit");
        assert_eq!(submitted[0].function_arguments, vec![json!("0xaa11"), json!("0xc1")]);

        h.dashboard.list_pools().await.unwrap();
        h.dashboard.committed_positions("0xaa11").await.unwrap();
        assert_eq!(h.chain.view_calls(), 2);
        assert_eq!(h.chain.token_calls(), 2);
    }

    #[tokio::test]
    async fn test_uncommit_uses_gauge_address_when_set() {
        let config = GaugeConfig {
            gauge_address: Some("0x9a".to_string()),
            ..full_config()
        };
        let h = harness_with(config, Arc::new(MemoryStore::new()));
        let position = Position {
            token_id: "0xc1".to_string(),
            pool_address: "0xaa11".to_string(),
            index: PositionIndex::Known(4),
        };

        h.dashboard.uncommit(&position).await.unwrap();
        assert_eq!(h.wallet.submitted()[0].function, "0x9a::gauge::uncommit");
    }

    #[tokio::test]
    async fn test_distribute_bribes_settles_draft() {
        let h = harness();
        let pool = key("0xAA11");
        h.dashboard
            .set_draft_field(pool.clone(), DraftField::TokenAddress, " 0xabc123 ")
            .await;
        h.dashboard
            .set_draft_field(pool.clone(), DraftField::Amount, "500")
            .await;

        h.dashboard.distribute_bribes(&pool).await.unwrap();

        let submitted = h.wallet.submitted();
        assert_eq!(submitted[0].function, "0xee::voter::distribute_bribes");
        assert_eq!(
            submitted[0].function_arguments,
            vec![json!(["0xaa11"]), json!(["0xabc123"]), json!(["500"])]
        );

        let draft = h.dashboard.draft(&pool).await;
        assert_eq!(draft.token_address, "0xabc123");
        assert!(draft.amount.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_draft_never_reaches_wallet() {
        let h = harness();
        let pool = key("0xaa11");
        h.dashboard
            .set_draft_field(pool.clone(), DraftField::TokenAddress, "0xabc123")
            .await;
        h.dashboard
            .set_draft_field(pool.clone(), DraftField::Amount, "12.5")
            .await;

        let result = h.dashboard.distribute_bribes(&pool).await;
        assert_eq!(
            result,
            Err(GaugeError::ValidationFailed(DraftIssue::malformed(DraftField::Amount)))
        );
        assert!(h.wallet.submitted().is_empty());
        assert_eq!(h.dashboard.draft(&pool).await.amount, "12.5");

        let notices = h.notices.drain();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].level, NoticeLevel::Failure);
        assert_eq!(notices[0].action, ActionKind::DistributeBribes);
    }

    #[tokio::test]
    async fn test_failed_bribe_keeps_draft() {
        let h = harness();
        let pool = key("0xaa11");
        h.dashboard
            .set_draft_field(pool.clone(), DraftField::TokenAddress, "0xabc123")
            .await;
        h.dashboard
            .set_draft_field(pool.clone(), DraftField::Amount, "500")
            .await;
        h.wallet.set_mode(WalletMode::Decline);

        assert!(h.dashboard.distribute_bribes(&pool).await.is_err());
        assert_eq!(h.dashboard.draft(&pool).await.amount, "500");
    }

    #[tokio::test]
    async fn test_validate_draft_distinguishes_missing() {
        let h = harness();
        let pool = key("0xaa11");
        h.dashboard
            .set_draft_field(pool.clone(), DraftField::TokenAddress, "0xabc123")
            .await;

        let Err(GaugeError::ValidationFailed(issue)) = h.dashboard.validate_draft(&pool).await
        else {
            panic!("expected a validation failure");
        };
        assert_eq!(issue.field, DraftField::Amount);
        assert_eq!(issue.kind, IssueKind::Missing);
    }

    #[tokio::test]
    async fn test_router_actions_need_amm_and_voter() {
        let config = GaugeConfig {
            amm_address: None,
            ..full_config()
        };
        let h = harness_with(config, Arc::new(MemoryStore::new()));

        assert_eq!(
            h.dashboard.swap_pool(&key("0xaa11")).await,
            Err(GaugeError::Unconfigured("AMM"))
        );
        assert_eq!(
            h.dashboard.add_liquidity(&key("0xaa11")).await,
            Err(GaugeError::Unconfigured("AMM"))
        );
        assert!(h.wallet.submitted().is_empty());
        assert_eq!(h.notices.drain().len(), 2);
        assert_eq!(h.dashboard.coordinator().phase(), TxPhase::Idle);
    }

    #[tokio::test]
    async fn test_router_actions_build_payloads() {
        let h = harness();
        h.dashboard.swap_pool(&key("0xBB22")).await.unwrap();
        h.dashboard.add_liquidity(&key("0xbb22")).await.unwrap();

        let submitted = h.wallet.submitted();
        assert_eq!(submitted[0].function, "0xa3::router::swap_pool");
        assert_eq!(submitted[0].function_arguments, vec![json!("0xbb22")]);
        assert_eq!(submitted[1].function, "0xa3::router::add_liquidity");
    }

    #[tokio::test]
    async fn test_list_pools_serves_stale_on_failure() {
        let h = harness();
        assert_eq!(h.dashboard.list_pools().await.unwrap().len(), 3);

        h.dashboard.swap_pool(&key("0xaa11")).await.unwrap();
        h.chain.fail_views(true);

        assert_eq!(h.dashboard.list_pools().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_earned_for_committed_position() {
        let h = harness();
        h.chain.set_earned("0xaa11", 4, json!("77"));
        let committed = h.dashboard.committed_positions("0xaa11").await.unwrap();

        assert_eq!(h.dashboard.earned(&committed[0]).await, Earned::Amount(77));
    }
}
