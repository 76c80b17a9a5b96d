//! In-memory collaborators for tests.

use crate::chain::{ChainError, ChainReader, FinalizedReceipt};
use crate::payload::EntryFunctionPayload;
use crate::store::{KeyValueStore, StoreError};
use crate::wallet::{SignerError, TransactionHandle, WalletSigner};
use async_trait::async_trait;
use gauge_domain::address::normalize;
use gauge_domain::entities::PositionToken;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Mutex, PoisonError};
use tokio::sync::Notify;

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// How [`FakeChain::wait_for_finality`] resolves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinalityMode {
    /// Committed and executed successfully.
    Success,
    /// Committed but aborted with the given VM status.
    Aborted(String),
    /// The node could not be reached.
    Unreachable,
}

/// Scripted chain reader.
pub struct FakeChain {
    pools: Mutex<Vec<String>>,
    tokens: Mutex<HashMap<String, Vec<PositionToken>>>,
    earned: Mutex<HashMap<(String, u64), Value>>,
    finality: Mutex<FinalityMode>,
    fail_views: AtomicBool,
    fail_tokens: AtomicBool,
    view_calls: AtomicU32,
    token_calls: AtomicU32,
    finality_calls: AtomicU32,
}

impl FakeChain {
    /// Creates a chain whose voter reports `pools`.
    #[must_use]
    pub fn with_pools(pools: &[&str]) -> Self {
        Self {
            pools: Mutex::new(pools.iter().map(|p| p.to_string()).collect()),
            tokens: Mutex::new(HashMap::new()),
            earned: Mutex::new(HashMap::new()),
            finality: Mutex::new(FinalityMode::Success),
            fail_views: AtomicBool::new(false),
            fail_tokens: AtomicBool::new(false),
            view_calls: AtomicU32::new(0),
            token_calls: AtomicU32::new(0),
            finality_calls: AtomicU32::new(0),
        }
    }

    /// Replaces the registered pools.
    pub fn set_pools(&self, pools: &[&str]) {
        *lock(&self.pools) = pools.iter().map(|p| p.to_string()).collect();
    }

    /// Sets the tokens owned by `account` (any collection).
    pub fn set_tokens(&self, account: &str, tokens: Vec<PositionToken>) {
        let key = normalize(account).unwrap_or_else(|_| account.to_string());
        lock(&self.tokens).insert(key, tokens);
    }

    /// Sets the earned amount for one position.
    pub fn set_earned(&self, pool: &str, index: u64, amount: Value) {
        lock(&self.earned).insert((pool.to_string(), index), amount);
    }

    /// Sets how finality resolves.
    pub fn set_finality(&self, mode: FinalityMode) {
        *lock(&self.finality) = mode;
    }

    /// Makes every view call fail.
    pub fn fail_views(&self, fail: bool) {
        self.fail_views.store(fail, Ordering::SeqCst);
    }

    /// Makes every owned-token query fail.
    pub fn fail_tokens(&self, fail: bool) {
        self.fail_tokens.store(fail, Ordering::SeqCst);
    }

    /// Number of view calls made.
    #[must_use]
    pub fn view_calls(&self) -> u32 {
        self.view_calls.load(Ordering::SeqCst)
    }

    /// Number of owned-token queries made.
    #[must_use]
    pub fn token_calls(&self) -> u32 {
        self.token_calls.load(Ordering::SeqCst)
    }

    /// Number of finality waits made.
    #[must_use]
    pub fn finality_calls(&self) -> u32 {
        self.finality_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChainReader for FakeChain {
    async fn view(&self, payload: &EntryFunctionPayload) -> Result<Vec<Value>, ChainError> {
        self.view_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_views.load(Ordering::SeqCst) {
            return Err(ChainError::Transport("connection refused".to_string()));
        }

        if payload.function.ends_with("::voter::gauges") {
            return Ok(vec![json!(*lock(&self.pools))]);
        }
        if payload.function.ends_with("::gauge::earned") {
            let pool = payload.function_arguments[0].as_str().unwrap_or_default();
            let index = payload.function_arguments[1]
                .as_str()
                .and_then(|s| s.parse().ok())
                .unwrap_or_default();
            return lock(&self.earned)
                .get(&(pool.to_string(), index))
                .map(|value| vec![value.clone()])
                .ok_or_else(|| ChainError::Node {
                    status: 400,
                    message: "position not found".to_string(),
                });
        }

        Err(ChainError::Node {
            status: 404,
            message: format!("unknown function {}", payload.function),
        })
    }

    async fn wait_for_finality(
        &self,
        handle: &TransactionHandle,
    ) -> Result<FinalizedReceipt, ChainError> {
        self.finality_calls.fetch_add(1, Ordering::SeqCst);
        match lock(&self.finality).clone() {
            FinalityMode::Success => Ok(FinalizedReceipt {
                hash: handle.hash.clone(),
                version: Some(1),
                success: true,
                vm_status: "Executed successfully".to_string(),
            }),
            FinalityMode::Aborted(status) => Ok(FinalizedReceipt {
                hash: handle.hash.clone(),
                version: Some(1),
                success: false,
                vm_status: status,
            }),
            FinalityMode::Unreachable => {
                Err(ChainError::Transport("connection reset".to_string()))
            }
        }
    }

    async fn owned_tokens_in_collection(
        &self,
        account: &str,
        _collection: &str,
        limit: u32,
    ) -> Result<Vec<PositionToken>, ChainError> {
        self.token_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_tokens.load(Ordering::SeqCst) {
            return Err(ChainError::Transport("indexer unavailable".to_string()));
        }
        let key = normalize(account).unwrap_or_else(|_| account.to_string());
        let mut tokens = lock(&self.tokens).get(&key).cloned().unwrap_or_default();
        tokens.truncate(limit as usize);
        Ok(tokens)
    }
}

/// How [`FakeWallet::sign_and_submit`] resolves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletMode {
    /// Returns a handle.
    Accept,
    /// The user declines.
    Decline,
    /// Broadcast fails.
    BroadcastError,
}

/// Scripted wallet.
pub struct FakeWallet {
    account: Option<String>,
    mode: Mutex<WalletMode>,
    submitted: Mutex<Vec<EntryFunctionPayload>>,
    hold: AtomicBool,
    gate: Notify,
}

impl FakeWallet {
    /// Creates a wallet connected as `account`.
    #[must_use]
    pub fn connected(account: &str) -> Self {
        Self::new(Some(account.to_string()))
    }

    /// Creates a wallet with no connected account.
    #[must_use]
    pub fn disconnected() -> Self {
        Self::new(None)
    }

    fn new(account: Option<String>) -> Self {
        Self {
            account,
            mode: Mutex::new(WalletMode::Accept),
            submitted: Mutex::new(Vec::new()),
            hold: AtomicBool::new(false),
            gate: Notify::new(),
        }
    }

    /// Sets how submissions resolve.
    pub fn set_mode(&self, mode: WalletMode) {
        *lock(&self.mode) = mode;
    }

    /// Makes the next submissions wait until [`Self::release`].
    pub fn hold(&self) {
        self.hold.store(true, Ordering::SeqCst);
    }

    /// Releases one held submission.
    pub fn release(&self) {
        self.gate.notify_one();
    }

    /// Payloads submitted so far.
    #[must_use]
    pub fn submitted(&self) -> Vec<EntryFunctionPayload> {
        lock(&self.submitted).clone()
    }
}

#[async_trait]
impl WalletSigner for FakeWallet {
    fn account(&self) -> Option<String> {
        self.account.clone()
    }

    async fn sign_and_submit(
        &self,
        payload: &EntryFunctionPayload,
    ) -> Result<TransactionHandle, SignerError> {
        let count = {
            let mut submitted = lock(&self.submitted);
            submitted.push(payload.clone());
            submitted.len()
        };

        if self.hold.load(Ordering::SeqCst) {
            self.gate.notified().await;
        }

        match lock(&self.mode).clone() {
            WalletMode::Accept => Ok(TransactionHandle::new(format!("0xhash{count}"))),
            WalletMode::Decline => Err(SignerError::Rejected("user declined".to_string())),
            WalletMode::BroadcastError => {
                Err(SignerError::Broadcast("mempool unreachable".to_string()))
            }
        }
    }
}

/// Store whose every operation fails.
#[derive(Debug, Default)]
pub struct BrokenStore;

impl KeyValueStore for BrokenStore {
    fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
        Err(StoreError::Io(std::io::Error::other("storage unavailable")))
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
        Err(StoreError::Io(std::io::Error::other("storage unavailable")))
    }
}
