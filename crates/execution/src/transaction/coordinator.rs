//! Transaction coordinator.

use super::{TxPhase, TxReceipt, TxRecord, TxRequest};
use crate::notice::{Notice, Notifier};
use gauge_data::cache::Invalidate;
use gauge_domain::{GaugeError, GaugeResult};
use gauge_protocols::chain::{ChainReader, FinalizedReceipt};
use gauge_protocols::payload::EntryFunctionPayload;
use gauge_protocols::wallet::{SignerError, WalletSigner};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

fn lock(phase: &Mutex<TxPhase>) -> MutexGuard<'_, TxPhase> {
    phase.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Holds the coordinator out of `Idle` for the duration of one action.
///
/// Dropping it returns the machine to `Idle`, including when the action
/// future is dropped mid-flight.
struct InFlight<'a> {
    phase: &'a Mutex<TxPhase>,
}

impl InFlight<'_> {
    fn set(&self, next: TxPhase) {
        let mut phase = lock(self.phase);
        debug!(from = ?*phase, to = ?next, "Transaction phase change");
        *phase = next;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        *lock(self.phase) = TxPhase::Idle;
    }
}

/// A failed action, with the hash if one was obtained.
struct Failure {
    error: GaugeError,
    hash: Option<String>,
}

impl Failure {
    fn new(error: GaugeError) -> Self {
        Self { error, hash: None }
    }

    fn with_hash(error: GaugeError, hash: &str) -> Self {
        Self {
            error,
            hash: Some(hash.to_string()),
        }
    }
}

fn signer_error(error: SignerError) -> GaugeError {
    match error {
        SignerError::Rejected(reason) => GaugeError::SigningRejected(reason),
        SignerError::Broadcast(reason) => GaugeError::SubmissionFailed(reason),
    }
}

/// Drives mutating actions through submit, finality, invalidation and
/// notification, one at a time.
pub struct TransactionCoordinator {
    /// Signs and broadcasts payloads.
    wallet: Arc<dyn WalletSigner>,
    /// Reports finality.
    chain: Arc<dyn ChainReader>,
    /// Receives one notice per terminal outcome.
    notifier: Arc<dyn Notifier>,
    /// Caches invalidated after every successful action.
    dependents: Vec<Arc<dyn Invalidate>>,
    /// Current phase.
    phase: Mutex<TxPhase>,
    /// Terminated actions, oldest first.
    history: RwLock<Vec<TxRecord>>,
}

impl TransactionCoordinator {
    /// Creates a coordinator with no dependent caches.
    pub fn new(
        wallet: Arc<dyn WalletSigner>,
        chain: Arc<dyn ChainReader>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            wallet,
            chain,
            notifier,
            dependents: Vec::new(),
            phase: Mutex::new(TxPhase::Idle),
            history: RwLock::new(Vec::new()),
        }
    }

    /// Registers a cache to invalidate after successful actions.
    #[must_use]
    pub fn invalidating(mut self, dependent: Arc<dyn Invalidate>) -> Self {
        self.dependents.push(dependent);
        self
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> TxPhase {
        *lock(&self.phase)
    }

    /// Terminated actions, oldest first.
    pub async fn history(&self) -> Vec<TxRecord> {
        self.history.read().await.clone()
    }

    /// Runs one mutating action.
    ///
    /// `build` produces the payload once the entry guards passed. On success
    /// every dependent cache is invalidated before this returns.
    ///
    /// There is one phase per coordinator and a new action starts only from
    /// `Idle`. An action finishing in `Succeeded` or `Failed` still holds the
    /// phase while caches are invalidated and its notice is delivered, so a
    /// second action started in that window is refused as well.
    ///
    /// # Errors
    /// - [`GaugeError::Busy`] if the coordinator is not `Idle`. The wallet is
    ///   not contacted and no notice is emitted.
    /// - [`GaugeError::SigningRejected`] without a connected account or when
    ///   the wallet declines.
    /// - Whatever `build` returns, typically [`GaugeError::Unconfigured`] or
    ///   [`GaugeError::ValidationFailed`].
    /// - [`GaugeError::SubmissionFailed`] if broadcasting fails.
    /// - [`GaugeError::FinalityFailed`] if the transaction does not finalize
    ///   successfully.
    pub async fn execute<F>(&self, request: TxRequest, build: F) -> GaugeResult<TxReceipt>
    where
        F: FnOnce() -> GaugeResult<EntryFunctionPayload>,
    {
        let Some(in_flight) = self.begin() else {
            warn!(
                action = %request.kind,
                pool = %request.pool,
                "Transaction already in flight, refusing"
            );
            return Err(GaugeError::Busy);
        };

        let id = uuid::Uuid::new_v4().to_string();
        let started_at = chrono::Utc::now();
        info!(id = %id, action = %request.kind, pool = %request.pool, "Starting transaction");

        match self.drive(&in_flight, build).await {
            Ok(finalized) => {
                in_flight.set(TxPhase::Succeeded);
                for dependent in &self.dependents {
                    dependent.invalidate().await;
                }

                let receipt = TxReceipt {
                    id,
                    request,
                    hash: finalized.hash,
                    version: finalized.version,
                    started_at,
                    finalized_at: chrono::Utc::now(),
                };
                info!(
                    id = %receipt.id,
                    action = %receipt.request.kind,
                    hash = %receipt.hash,
                    version = ?receipt.version,
                    "Transaction succeeded"
                );

                self.notifier
                    .notify(Notice::success(receipt.request.kind, &receipt.hash))
                    .await;
                self.record(TxRecord {
                    id: receipt.id.clone(),
                    request: receipt.request.clone(),
                    phase: TxPhase::Succeeded,
                    hash: Some(receipt.hash.clone()),
                    error: None,
                    started_at,
                    finished_at: receipt.finalized_at,
                })
                .await;
                Ok(receipt)
            }
            Err(failure) => {
                in_flight.set(TxPhase::Failed);
                error!(
                    id = %id,
                    action = %request.kind,
                    pool = %request.pool,
                    error = %failure.error,
                    "Transaction failed"
                );

                self.notifier
                    .notify(Notice::failure(request.kind, &failure.error))
                    .await;
                self.record(TxRecord {
                    id,
                    request,
                    phase: TxPhase::Failed,
                    hash: failure.hash,
                    error: Some(failure.error.to_string()),
                    started_at,
                    finished_at: chrono::Utc::now(),
                })
                .await;
                Err(failure.error)
            }
        }
    }

    /// Leaves `Idle` for `Submitting`, or `None` if any other phase holds.
    fn begin(&self) -> Option<InFlight<'_>> {
        let mut phase = lock(&self.phase);
        if *phase != TxPhase::Idle {
            return None;
        }
        *phase = TxPhase::Submitting;
        Some(InFlight { phase: &self.phase })
    }

    async fn drive<F>(&self, in_flight: &InFlight<'_>, build: F) -> Result<FinalizedReceipt, Failure>
    where
        F: FnOnce() -> GaugeResult<EntryFunctionPayload>,
    {
        if self.wallet.account().is_none() {
            return Err(Failure::new(GaugeError::SigningRejected(
                "no wallet account connected".to_string(),
            )));
        }
        let payload = build().map_err(Failure::new)?;

        debug!(function = %payload.function, "Handing payload to wallet");
        let handle = self
            .wallet
            .sign_and_submit(&payload)
            .await
            .map_err(|e| Failure::new(signer_error(e)))?;

        in_flight.set(TxPhase::AwaitingFinality);
        info!(hash = %handle.hash, "Awaiting finality");

        let receipt = self
            .chain
            .wait_for_finality(&handle)
            .await
            .map_err(|e| Failure::with_hash(GaugeError::FinalityFailed(e.to_string()), &handle.hash))?;

        if !receipt.success {
            return Err(Failure::with_hash(
                GaugeError::FinalityFailed(receipt.vm_status),
                &handle.hash,
            ));
        }
        Ok(receipt)
    }

    async fn record(&self, record: TxRecord) {
        self.history.write().await.push(record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notice::{NoticeLevel, QueueNotifier};
    use gauge_data::positions::PositionBook;
    use gauge_data::registry::PoolRegistry;
    use gauge_domain::enums::ActionKind;
    use gauge_domain::entities::PositionToken;
    use gauge_protocols::config::GaugeConfig;
    use gauge_protocols::payload;
    use gauge_protocols::testing::{FakeChain, FakeWallet, FinalityMode, WalletMode};
    use tokio::sync::Notify;

    /// Notifier that parks inside `notify` until the test opens the gate.
    #[derive(Default)]
    struct GatedNotifier {
        entered: Notify,
        gate: Notify,
        delivered: QueueNotifier,
    }

    #[async_trait::async_trait]
    impl Notifier for GatedNotifier {
        async fn notify(&self, notice: Notice) {
            self.entered.notify_one();
            self.gate.notified().await;
            self.delivered.notify(notice).await;
        }
    }

    struct Harness {
        chain: Arc<FakeChain>,
        wallet: Arc<FakeWallet>,
        notices: Arc<QueueNotifier>,
        registry: Arc<PoolRegistry>,
        book: Arc<PositionBook>,
        coordinator: TransactionCoordinator,
    }

    fn harness(wallet: FakeWallet) -> Harness {
        let config = Arc::new(GaugeConfig {
            voter_address: Some("0xee".to_string()),
            positions_address: Some("0x7a99".to_string()),
            ..Default::default()
        });
        let chain = Arc::new(FakeChain::with_pools(&["0xaa11", "0xbb22"]));
        chain.set_tokens("0xa11ce", vec![PositionToken::new("0xt1", "P0xaa11_0")]);
        let wallet = Arc::new(wallet);
        let notices = Arc::new(QueueNotifier::new());
        let registry = Arc::new(PoolRegistry::new(chain.clone(), config.clone()));
        let book = Arc::new(PositionBook::new(chain.clone(), config));

        let coordinator = TransactionCoordinator::new(wallet.clone(), chain.clone(), notices.clone())
            .invalidating(registry.clone())
            .invalidating(book.clone());

        Harness {
            chain,
            wallet,
            notices,
            registry,
            book,
            coordinator,
        }
    }

    fn uncommit() -> TxRequest {
        TxRequest::new(ActionKind::Uncommit, "0xaa11").with_position("0xt1")
    }

    fn uncommit_payload() -> GaugeResult<EntryFunctionPayload> {
        Ok(payload::uncommit("0xee", "0xaa11", "0xt1"))
    }

    async fn prime(h: &Harness) {
        h.registry.list_pools().await.unwrap();
        h.book.owned_tokens("0xa11ce").await.unwrap();
        assert_eq!(h.chain.view_calls(), 1);
        assert_eq!(h.chain.token_calls(), 1);
    }

    #[tokio::test]
    async fn test_success_invalidates_dependents() {
        let h = harness(FakeWallet::connected("0xa11ce"));
        prime(&h).await;

        let receipt = h.coordinator.execute(uncommit(), uncommit_payload).await.unwrap();
        assert_eq!(receipt.hash, "0xhash1");
        assert_eq!(receipt.request.position.as_deref(), Some("0xt1"));
        assert_eq!(h.coordinator.phase(), TxPhase::Idle);

        h.registry.list_pools().await.unwrap();
        h.book.owned_tokens("0xa11ce").await.unwrap();
        assert_eq!(h.chain.view_calls(), 2);
        assert_eq!(h.chain.token_calls(), 2);
    }

    #[tokio::test]
    async fn test_success_emits_one_notice_with_hash() {
        let h = harness(FakeWallet::connected("0xa11ce"));
        h.coordinator.execute(uncommit(), uncommit_payload).await.unwrap();

        let notices = h.notices.drain();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].level, NoticeLevel::Success);
        assert_eq!(notices[0].action, ActionKind::Uncommit);
        assert_eq!(notices[0].reference.as_deref(), Some("0xhash1"));

        let history = h.coordinator.history().await;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].phase, TxPhase::Succeeded);
    }

    #[tokio::test]
    async fn test_failure_leaves_caches_intact() {
        let h = harness(FakeWallet::connected("0xa11ce"));
        prime(&h).await;
        h.wallet.set_mode(WalletMode::Decline);

        let result = h.coordinator.execute(uncommit(), uncommit_payload).await;
        assert_eq!(
            result,
            Err(GaugeError::SigningRejected("user declined".to_string()))
        );

        h.registry.list_pools().await.unwrap();
        h.book.owned_tokens("0xa11ce").await.unwrap();
        assert_eq!(h.chain.view_calls(), 1);
        assert_eq!(h.chain.token_calls(), 1);

        let notices = h.notices.drain();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].level, NoticeLevel::Failure);
        assert_eq!(h.coordinator.phase(), TxPhase::Idle);
    }

    #[tokio::test]
    async fn test_broadcast_failure_is_submission_failed() {
        let h = harness(FakeWallet::connected("0xa11ce"));
        h.wallet.set_mode(WalletMode::BroadcastError);

        let result = h.coordinator.execute(uncommit(), uncommit_payload).await;
        assert!(matches!(result, Err(GaugeError::SubmissionFailed(_))));
        assert_eq!(h.chain.finality_calls(), 0);
    }

    #[tokio::test]
    async fn test_aborted_transaction_is_finality_failed() {
        let h = harness(FakeWallet::connected("0xa11ce"));
        prime(&h).await;
        h.chain
            .set_finality(FinalityMode::Aborted("Move abort: E_NOT_OWNER".to_string()));

        let result = h.coordinator.execute(uncommit(), uncommit_payload).await;
        assert_eq!(
            result,
            Err(GaugeError::FinalityFailed("Move abort: E_NOT_OWNER".to_string()))
        );

        let history = h.coordinator.history().await;
        assert_eq!(history[0].phase, TxPhase::Failed);
        assert_eq!(history[0].hash.as_deref(), Some("0xhash1"));

        h.registry.list_pools().await.unwrap();
        assert_eq!(h.chain.view_calls(), 1);
    }

    #[tokio::test]
    async fn test_unreachable_node_is_finality_failed() {
        let h = harness(FakeWallet::connected("0xa11ce"));
        h.chain.set_finality(FinalityMode::Unreachable);

        let result = h.coordinator.execute(uncommit(), uncommit_payload).await;
        assert!(matches!(result, Err(GaugeError::FinalityFailed(_))));
        assert_eq!(h.notices.drain().len(), 1);
    }

    #[tokio::test]
    async fn test_no_account_does_not_reach_wallet() {
        let h = harness(FakeWallet::disconnected());

        let result = h.coordinator.execute(uncommit(), uncommit_payload).await;
        assert!(matches!(result, Err(GaugeError::SigningRejected(_))));
        assert!(h.wallet.submitted().is_empty());
        assert_eq!(h.notices.drain().len(), 1);
    }

    #[tokio::test]
    async fn test_build_error_does_not_reach_wallet() {
        let h = harness(FakeWallet::connected("0xa11ce"));

        let result = h
            .coordinator
            .execute(uncommit(), || Err(GaugeError::Unconfigured("AMM")))
            .await;
        assert_eq!(result, Err(GaugeError::Unconfigured("AMM")));
        assert!(h.wallet.submitted().is_empty());

        let notices = h.notices.drain();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].message, "Failed to uncommit position: AMM address not configured");
    }

    #[tokio::test]
    async fn test_second_action_while_submitting_is_refused() {
        let h = harness(FakeWallet::connected("0xa11ce"));
        h.wallet.hold();

        let first = h.coordinator.execute(uncommit(), uncommit_payload);
        let second = async {
            assert_eq!(h.coordinator.phase(), TxPhase::Submitting);
            let result = h
                .coordinator
                .execute(TxRequest::new(ActionKind::SwapPool, "0xbb22"), || {
                    Ok(payload::swap_pool("0xaa", "0xbb22"))
                })
                .await;
            h.wallet.release();
            result
        };

        let (first, second) = tokio::join!(first, second);
        assert!(first.is_ok());
        assert_eq!(second, Err(GaugeError::Busy));
        assert_eq!(h.wallet.submitted().len(), 1);

        let notices = h.notices.drain();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].action, ActionKind::Uncommit);
    }

    #[tokio::test]
    async fn test_coordinator_is_reusable_after_failure() {
        let h = harness(FakeWallet::connected("0xa11ce"));
        h.wallet.set_mode(WalletMode::Decline);
        assert!(h.coordinator.execute(uncommit(), uncommit_payload).await.is_err());

        h.wallet.set_mode(WalletMode::Accept);
        let receipt = h.coordinator.execute(uncommit(), uncommit_payload).await.unwrap();
        assert_eq!(receipt.hash, "0xhash2");
        assert_eq!(h.coordinator.history().await.len(), 2);
    }

    #[tokio::test]
    async fn test_action_is_refused_while_previous_one_notifies() {
        let chain = Arc::new(FakeChain::with_pools(&["0xaa11"]));
        let wallet = Arc::new(FakeWallet::connected("0xa11ce"));
        let notifier = Arc::new(GatedNotifier::default());
        let coordinator = TransactionCoordinator::new(wallet.clone(), chain, notifier.clone());

        let first = coordinator.execute(uncommit(), uncommit_payload);
        let second = async {
            notifier.entered.notified().await;
            assert_eq!(coordinator.phase(), TxPhase::Succeeded);
            let result = coordinator
                .execute(TxRequest::new(ActionKind::SwapPool, "0xaa11"), || {
                    Ok(payload::swap_pool("0xaa", "0xaa11"))
                })
                .await;
            notifier.gate.notify_one();
            result
        };

        let (first, second) = tokio::join!(first, second);
        assert!(first.is_ok());
        assert_eq!(second, Err(GaugeError::Busy));
        assert_eq!(wallet.submitted().len(), 1);
        assert_eq!(coordinator.phase(), TxPhase::Idle);
        assert_eq!(notifier.delivered.drain().len(), 1);
    }
}
