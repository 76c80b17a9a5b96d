//! Position token queries and per-position earned amounts.

use crate::cache::{Invalidate, TtlCache};
use async_trait::async_trait;
use gauge_domain::address::{derive_address, normalize};
use gauge_domain::entities::{Position, PositionToken};
use gauge_domain::position_name::{PositionNameCodec, PrefixedNameCodec, reconcile};
use gauge_domain::{GaugeError, GaugeResult};
use gauge_protocols::chain::ChainReader;
use gauge_protocols::config::GaugeConfig;
use gauge_protocols::payload;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Seed of the position vault, derived from the positions account.
pub const VAULT_SEED: &[u8] = b"VAULT";
/// Seed of the position collection, derived from the vault.
pub const COLLECTION_SEED: &[u8] = b"TAPP";

/// Rewards earned by a committed position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Earned {
    /// Amount in base units.
    Amount(u128),
    /// Not available: unknown index, gauge unconfigured, or read failure.
    Unknown,
}

impl fmt::Display for Earned {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Earned::Amount(amount) => write!(f, "{amount}"),
            Earned::Unknown => write!(f, "unknown"),
        }
    }
}

/// Derives the position collection address from the positions account.
///
/// # Errors
/// [`GaugeError::InvalidAddress`] if `positions_account` is malformed.
pub fn collection_address(positions_account: &str) -> GaugeResult<String> {
    let vault = derive_address(positions_account, VAULT_SEED)?;
    Ok(derive_address(&vault, COLLECTION_SEED)?)
}

/// Cached position token lists and earned amounts.
pub struct PositionBook {
    chain: Arc<dyn ChainReader>,
    config: Arc<GaugeConfig>,
    codec: Arc<dyn PositionNameCodec>,
    owned: TtlCache<String, Vec<PositionToken>>,
    earned: TtlCache<(String, u64), u128>,
}

impl PositionBook {
    /// Creates a book using the `P<pool>_<index>` naming scheme.
    pub fn new(chain: Arc<dyn ChainReader>, config: Arc<GaugeConfig>) -> Self {
        Self::with_codec(chain, config, Arc::new(PrefixedNameCodec))
    }

    /// Creates a book with a custom name codec.
    pub fn with_codec(
        chain: Arc<dyn ChainReader>,
        config: Arc<GaugeConfig>,
        codec: Arc<dyn PositionNameCodec>,
    ) -> Self {
        let positions_ttl = config.cache.positions_ttl();
        let earned_ttl = config.cache.earned_ttl();
        Self {
            chain,
            config,
            codec,
            owned: TtlCache::new("owned_positions", positions_ttl),
            earned: TtlCache::new("earned", earned_ttl),
        }
    }

    /// Position collection address.
    ///
    /// # Errors
    /// [`GaugeError::Unconfigured`] without a positions account.
    pub fn collection(&self) -> GaugeResult<String> {
        collection_address(self.config.positions()?)
    }

    /// Position tokens owned by `account`.
    ///
    /// The wallet holds its uncommitted positions; a pool account holds the
    /// positions committed to its gauge.
    ///
    /// # Errors
    /// [`GaugeError::Unconfigured`], [`GaugeError::InvalidAddress`] or
    /// [`GaugeError::FetchFailed`].
    pub async fn owned_tokens(&self, account: &str) -> GaugeResult<Vec<PositionToken>> {
        let account = normalize(account)?;
        let collection = self.collection()?;
        let limit = self.config.cache.owned_token_limit;
        let chain = &self.chain;

        let key = account.clone();
        self.owned
            .get_or_fetch(key, move || async move {
                let tokens = chain
                    .owned_tokens_in_collection(&account, &collection, limit)
                    .await
                    .map_err(|e| GaugeError::FetchFailed(e.to_string()))?;
                debug!(account = %account, count = tokens.len(), "Fetched position tokens");
                Ok::<_, GaugeError>(tokens)
            })
            .await
    }

    /// Positions of `account` that belong to `pool`.
    ///
    /// # Errors
    /// Same as [`Self::owned_tokens`].
    pub async fn positions_in_pool(&self, account: &str, pool: &str) -> GaugeResult<Vec<Position>> {
        let tokens = self.owned_tokens(account).await?;
        Ok(self.reconcile(&tokens, pool))
    }

    /// Positions committed to the gauge of `pool`.
    ///
    /// # Errors
    /// Same as [`Self::owned_tokens`].
    pub async fn committed_positions(&self, pool: &str) -> GaugeResult<Vec<Position>> {
        self.positions_in_pool(pool, pool).await
    }

    /// Filters `tokens` down to the positions of `pool`.
    #[must_use]
    pub fn reconcile(&self, tokens: &[PositionToken], pool: &str) -> Vec<Position> {
        reconcile(self.codec.as_ref(), tokens, pool)
    }

    /// Rewards earned by a committed position.
    ///
    /// Never fails: anything that prevents a lookup degrades to
    /// [`Earned::Unknown`].
    pub async fn earned(&self, position: &Position) -> Earned {
        let Some(index) = position.index.known() else {
            return Earned::Unknown;
        };
        let Ok(gauge) = self.config.gauge() else {
            return Earned::Unknown;
        };
        let chain = &self.chain;
        let pool = position.pool_address.clone();

        let result = self
            .earned
            .get_or_fetch((pool.clone(), index), move || async move {
                let result = chain
                    .view(&payload::earned(gauge, &pool, index))
                    .await
                    .map_err(|e| GaugeError::FetchFailed(e.to_string()))?;
                result
                    .first()
                    .and_then(parse_amount)
                    .ok_or_else(|| GaugeError::FetchFailed("malformed earned result".to_string()))
            })
            .await;

        match result {
            Ok(amount) => Earned::Amount(amount),
            Err(e) => {
                warn!(pool = %position.pool_address, index, error = %e, "Earned lookup failed");
                Earned::Unknown
            }
        }
    }
}

#[async_trait]
impl Invalidate for PositionBook {
    async fn invalidate(&self) {
        self.owned.invalidate_all().await;
        self.earned.invalidate_all().await;
    }
}

/// Reads a `u64`/`u128` view result, encoded as a string or a number.
fn parse_amount(value: &Value) -> Option<u128> {
    match value {
        Value::String(s) => s.parse().ok(),
        Value::Number(n) => n.to_string().parse().ok(),
        _ => None,
    }
}
