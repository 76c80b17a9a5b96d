//! HTTP chain reader for a fullnode REST API and its GraphQL indexer.

use crate::chain::{ChainError, ChainReader, FinalizedReceipt};
use crate::payload::EntryFunctionPayload;
use crate::wallet::TransactionHandle;
use async_trait::async_trait;
use gauge_domain::address::long_form;
use gauge_domain::entities::PositionToken;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, warn};

/// Owned tokens of an account restricted to one collection.
const OWNED_TOKENS_QUERY: &str = r#"
query OwnedTokensInCollection($owner: String!, $collection: String!, $limit: Int) {
  current_token_ownerships_v2(
    where: {
      owner_address: { _eq: $owner }
      current_token_data: { collection_id: { _eq: $collection } }
      amount: { _gt: 0 }
    }
    limit: $limit
  ) {
    token_data_id
    current_token_data { token_name }
  }
}
"#;

/// Configuration for the HTTP reader.
#[derive(Debug, Clone)]
pub struct RpcConfig {
    /// Fullnode REST base URL, including the `/v1` segment.
    pub node_url: String,
    /// Indexer GraphQL URL.
    pub indexer_url: String,
    /// Per-request timeout.
    pub request_timeout: Duration,
    /// Delay between finality polls while a transaction is pending.
    pub poll_interval: Duration,
    /// Deadline for a submitted transaction to leave the mempool.
    pub finality_timeout: Duration,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            node_url: crate::config::DEFAULT_NODE_URL.to_string(),
            indexer_url: crate::config::DEFAULT_INDEXER_URL.to_string(),
            request_timeout: Duration::from_secs(30),
            poll_interval: Duration::from_secs(1),
            finality_timeout: Duration::from_secs(20),
        }
    }
}

#[derive(Debug, Serialize)]
struct ViewRequest<'a> {
    function: &'a str,
    type_arguments: &'a [String],
    arguments: &'a [Value],
}

#[derive(Debug, Deserialize)]
struct TransactionResponse {
    #[serde(rename = "type")]
    kind: String,
    hash: String,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    vm_status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    #[serde(default)]
    data: Option<OwnedTokensData>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct OwnedTokensData {
    current_token_ownerships_v2: Vec<PositionToken>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

/// Chain reader over HTTP.
pub struct RpcProvider {
    client: reqwest::Client,
    config: RpcConfig,
}

impl RpcProvider {
    /// Creates a new provider.
    ///
    /// # Errors
    /// Returns [`ChainError::Transport`] if the HTTP client cannot be built.
    pub fn new(config: RpcConfig) -> Result<Self, ChainError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ChainError::Transport(e.to_string()))?;
        Ok(Self { client, config })
    }

    /// Provider configuration.
    #[must_use]
    pub fn config(&self) -> &RpcConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.node_url.trim_end_matches('/'), path)
    }

    async fn fetch_transaction(
        &self,
        hash: &str,
    ) -> Result<Option<TransactionResponse>, ChainError> {
        let response = self
            .client
            .get(self.url(&format!("transactions/wait_by_hash/{hash}")))
            .send()
            .await
            .map_err(transport)?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = check_status(response).await?;
        let tx = response
            .json::<TransactionResponse>()
            .await
            .map_err(|e| ChainError::Decode(e.to_string()))?;
        Ok(Some(tx))
    }

    /// Polls until the node reports the transaction as committed.
    async fn poll_finality(&self, hash: &str) -> Result<FinalizedReceipt, ChainError> {
        loop {
            match self.fetch_transaction(hash).await? {
                Some(tx) if tx.kind != "pending_transaction" => {
                    let version = tx.version.as_deref().and_then(|v| v.parse().ok());
                    return Ok(FinalizedReceipt {
                        hash: tx.hash,
                        version,
                        success: tx.success.unwrap_or(false),
                        vm_status: tx.vm_status.unwrap_or_default(),
                    });
                }
                _ => {
                    debug!(hash, "Transaction pending");
                    tokio::time::sleep(self.config.poll_interval).await;
                }
            }
        }
    }
}

#[async_trait]
impl ChainReader for RpcProvider {
    async fn view(&self, payload: &EntryFunctionPayload) -> Result<Vec<Value>, ChainError> {
        debug!(function = %payload.function, "View call");

        let body = ViewRequest {
            function: &payload.function,
            type_arguments: &payload.type_arguments,
            arguments: &payload.function_arguments,
        };
        let response = self
            .client
            .post(self.url("view"))
            .json(&body)
            .send()
            .await
            .map_err(transport)?;

        check_status(response)
            .await?
            .json::<Vec<Value>>()
            .await
            .map_err(|e| ChainError::Decode(e.to_string()))
    }

    async fn wait_for_finality(
        &self,
        handle: &TransactionHandle,
    ) -> Result<FinalizedReceipt, ChainError> {
        let deadline = self.config.finality_timeout;
        match tokio::time::timeout(deadline, self.poll_finality(&handle.hash)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(hash = %handle.hash, seconds = deadline.as_secs(), "Finality deadline expired");
                Err(ChainError::Timeout {
                    hash: handle.hash.clone(),
                    seconds: deadline.as_secs(),
                })
            }
        }
    }

    async fn owned_tokens_in_collection(
        &self,
        account: &str,
        collection: &str,
        limit: u32,
    ) -> Result<Vec<PositionToken>, ChainError> {
        let owner = long_form(account).map_err(|e| ChainError::Decode(e.to_string()))?;
        let collection = long_form(collection).map_err(|e| ChainError::Decode(e.to_string()))?;

        let body = json!({
            "query": OWNED_TOKENS_QUERY,
            "variables": { "owner": owner, "collection": collection, "limit": limit },
        });
        let response = self
            .client
            .post(&self.config.indexer_url)
            .json(&body)
            .send()
            .await
            .map_err(transport)?;

        let parsed = check_status(response)
            .await?
            .json::<GraphQlResponse>()
            .await
            .map_err(|e| ChainError::Decode(e.to_string()))?;

        if let Some(error) = parsed.errors.first() {
            warn!(error = %error.message, "Indexer query failed");
            return Err(ChainError::Node {
                status: StatusCode::OK.as_u16(),
                message: error.message.clone(),
            });
        }

        parsed
            .data
            .map(|data| data.current_token_ownerships_v2)
            .ok_or_else(|| ChainError::Decode("indexer response has no data".to_string()))
    }
}

fn transport(error: reqwest::Error) -> ChainError {
    ChainError::Transport(error.to_string())
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ChainError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(ChainError::Node {
        status: status.as_u16(),
        message,
    })
}
