//! Pool registry cache.

use crate::cache::{Invalidate, TtlCache};
use async_trait::async_trait;
use gauge_domain::entities::Pool;
use gauge_domain::{GaugeError, GaugeResult};
use gauge_protocols::chain::ChainReader;
use gauge_protocols::config::GaugeConfig;
use gauge_protocols::payload;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Cached list of pools exposed by the voter contract.
pub struct PoolRegistry {
    chain: Arc<dyn ChainReader>,
    config: Arc<GaugeConfig>,
    cache: TtlCache<(), Vec<Pool>>,
}

impl PoolRegistry {
    /// Creates a registry.
    pub fn new(chain: Arc<dyn ChainReader>, config: Arc<GaugeConfig>) -> Self {
        let ttl = config.cache.registry_ttl();
        Self {
            chain,
            config,
            cache: TtlCache::new("pool_registry", ttl),
        }
    }

    /// Lists registered pools, in voter order.
    ///
    /// Served from cache inside the staleness window.
    ///
    /// # Errors
    /// [`GaugeError::Unconfigured`] without a voter address;
    /// [`GaugeError::FetchFailed`] on transport errors, with the previous
    /// cached list left in place.
    pub async fn list_pools(&self) -> GaugeResult<Vec<Pool>> {
        let voter = self.config.voter()?;
        let chain = &self.chain;

        self.cache
            .get_or_fetch((), move || async move {
                let result = chain
                    .view(&payload::gauges(voter))
                    .await
                    .map_err(|e| GaugeError::FetchFailed(e.to_string()))?;
                let pools = parse_pools(&result);
                info!(count = pools.len(), "Fetched gauge pools");
                Ok::<_, GaugeError>(pools)
            })
            .await
    }

    /// Lists pools, falling back to the last cached list on fetch failure.
    ///
    /// # Errors
    /// Same as [`Self::list_pools`] when nothing was ever cached.
    pub async fn list_pools_or_stale(&self) -> GaugeResult<Vec<Pool>> {
        match self.list_pools().await {
            Ok(pools) => Ok(pools),
            Err(GaugeError::FetchFailed(reason)) => match self.cache.get_any(&()).await {
                Some(pools) => {
                    warn!(error = %reason, "Pool fetch failed, serving stale list");
                    Ok(pools)
                }
                None => Err(GaugeError::FetchFailed(reason)),
            },
            Err(e) => Err(e),
        }
    }

    /// Last fetched list, regardless of age.
    pub async fn cached(&self) -> Option<Vec<Pool>> {
        self.cache.get_any(&()).await
    }
}

#[async_trait]
impl Invalidate for PoolRegistry {
    async fn invalidate(&self) {
        self.cache.invalidate_all().await;
    }
}

/// Extracts pools from the `voter::gauges` result `[[address, ...]]`.
fn parse_pools(result: &[Value]) -> Vec<Pool> {
    let Some(Value::Array(addresses)) = result.first() else {
        return Vec::new();
    };

    addresses
        .iter()
        .filter_map(|value| {
            let raw = value.as_str()?;
            match Pool::new(raw) {
                Ok(pool) => Some(pool),
                Err(e) => {
                    debug!(address = raw, error = %e, "Skipping malformed pool address");
                    None
                }
            }
        })
        .collect()
}
