//! Chain read collaborator.

use crate::payload::EntryFunctionPayload;
use crate::wallet::TransactionHandle;
use async_trait::async_trait;
use gauge_domain::entities::PositionToken;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Errors raised by the chain reader.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    /// Network or HTTP-level failure.
    #[error("transport error: {0}")]
    Transport(String),
    /// The node answered with something we could not decode.
    #[error("unexpected response: {0}")]
    Decode(String),
    /// The node rejected the request.
    #[error("node error {status}: {message}")]
    Node {
        /// HTTP status code.
        status: u16,
        /// Error message from the node.
        message: String,
    },
    /// The transaction did not leave the mempool before the finality deadline.
    #[error("transaction {hash} not finalized within {seconds}s")]
    Timeout {
        /// Transaction hash.
        hash: String,
        /// Deadline that expired, in seconds.
        seconds: u64,
    },
}

/// Receipt of a transaction that left the mempool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalizedReceipt {
    /// Transaction hash.
    pub hash: String,
    /// Ledger version the transaction was committed at.
    pub version: Option<u64>,
    /// Whether execution succeeded.
    pub success: bool,
    /// VM status string.
    pub vm_status: String,
}

/// Read access to the chain.
#[async_trait]
pub trait ChainReader: Send + Sync {
    /// Calls a view function and returns its result tuple.
    async fn view(&self, payload: &EntryFunctionPayload) -> Result<Vec<Value>, ChainError>;

    /// Waits until the transaction is committed and returns its receipt.
    async fn wait_for_finality(
        &self,
        handle: &TransactionHandle,
    ) -> Result<FinalizedReceipt, ChainError>;

    /// Lists tokens owned by `account` in `collection`.
    async fn owned_tokens_in_collection(
        &self,
        account: &str,
        collection: &str,
        limit: u32,
    ) -> Result<Vec<PositionToken>, ChainError>;
}
