//! Transaction phases, requests and terminal records.

use gauge_domain::enums::ActionKind;
use serde::{Deserialize, Serialize};

/// Phase of the transaction state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxPhase {
    /// Nothing in flight.
    Idle,
    /// Payload handed to the wallet.
    Submitting,
    /// Broadcast, waiting for the chain to finalize.
    AwaitingFinality,
    /// Finalized successfully.
    Succeeded,
    /// Failed at some stage.
    Failed,
}

/// What a mutating action targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxRequest {
    /// Action kind.
    pub kind: ActionKind,
    /// Target pool.
    pub pool: String,
    /// Target position token, for position-level actions.
    pub position: Option<String>,
}

impl TxRequest {
    /// Creates a pool-level request.
    pub fn new(kind: ActionKind, pool: impl Into<String>) -> Self {
        Self {
            kind,
            pool: pool.into(),
            position: None,
        }
    }

    /// Sets the target position token.
    #[must_use]
    pub fn with_position(mut self, position: impl Into<String>) -> Self {
        self.position = Some(position.into());
        self
    }
}

/// Receipt of a finalized action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxReceipt {
    /// Local id of the action.
    pub id: String,
    /// What was executed.
    pub request: TxRequest,
    /// Transaction hash.
    pub hash: String,
    /// Ledger version, when the node reports one.
    pub version: Option<u64>,
    /// When the action started.
    pub started_at: chrono::DateTime<chrono::Utc>,
    /// When finality was observed.
    pub finalized_at: chrono::DateTime<chrono::Utc>,
}

/// History entry for one terminated action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxRecord {
    /// Local id of the action.
    pub id: String,
    /// What was requested.
    pub request: TxRequest,
    /// `Succeeded` or `Failed`.
    pub phase: TxPhase,
    /// Transaction hash, if the wallet returned one.
    pub hash: Option<String>,
    /// Failure reason.
    pub error: Option<String>,
    /// When the action started.
    pub started_at: chrono::DateTime<chrono::Utc>,
    /// When it terminated.
    pub finished_at: chrono::DateTime<chrono::Utc>,
}
