//! Wallet / signing collaborator.

use crate::payload::EntryFunctionPayload;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Handle of a submitted transaction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionHandle {
    /// Transaction hash.
    pub hash: String,
}

impl TransactionHandle {
    /// Creates a handle from a hash.
    pub fn new(hash: impl Into<String>) -> Self {
        Self { hash: hash.into() }
    }
}

/// Errors raised by the wallet.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignerError {
    /// The user declined, or the wallet is not available.
    #[error("rejected: {0}")]
    Rejected(String),
    /// Signing succeeded but broadcasting failed.
    #[error("broadcast failed: {0}")]
    Broadcast(String),
}

/// A connected wallet able to sign and broadcast entry function calls.
#[async_trait]
pub trait WalletSigner: Send + Sync {
    /// Connected account address, if any.
    fn account(&self) -> Option<String>;

    /// Signs and submits the payload.
    async fn sign_and_submit(
        &self,
        payload: &EntryFunctionPayload,
    ) -> Result<TransactionHandle, SignerError>;
}
