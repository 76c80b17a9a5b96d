//! Staleness-window cache with request tickets.
//!
//! Every fetch takes a [`Ticket`] before suspending. On resolution the value
//! is stored only if no newer request for the same key has already stored
//! and no invalidation happened since the ticket was issued. Discarded
//! responses are still returned to their own caller.

use async_trait::async_trait;
use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;

/// Something whose cached data can be marked stale.
#[async_trait]
pub trait Invalidate: Send + Sync {
    /// Marks all cached data stale. Values stay available as fallback.
    async fn invalidate(&self);
}

/// Proof of when a fetch was issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    seq: u64,
    generation: u64,
}

#[derive(Debug, Clone)]
struct Entry<V> {
    value: V,
    fetched_at: Instant,
    seq: u64,
    stale: bool,
}

#[derive(Debug)]
struct Inner<K, V> {
    entries: HashMap<K, Entry<V>>,
    next_seq: u64,
    generation: u64,
}

/// Keyed cache with a fixed time-to-live.
#[derive(Debug)]
pub struct TtlCache<K, V> {
    name: &'static str,
    ttl: Duration,
    inner: RwLock<Inner<K, V>>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone + Send + Sync,
    V: Clone + Send + Sync,
{
    /// Creates an empty cache. `name` is used in log fields.
    #[must_use]
    pub fn new(name: &'static str, ttl: Duration) -> Self {
        Self {
            name,
            ttl,
            inner: RwLock::new(Inner {
                entries: HashMap::new(),
                next_seq: 0,
                generation: 0,
            }),
        }
    }

    /// Returns the value if it is inside the staleness window.
    pub async fn get_fresh(&self, key: &K) -> Option<V> {
        let inner = self.inner.read().await;
        inner
            .entries
            .get(key)
            .filter(|entry| !entry.stale && entry.fetched_at.elapsed() < self.ttl)
            .map(|entry| entry.value.clone())
    }

    /// Returns the last stored value regardless of age.
    pub async fn get_any(&self, key: &K) -> Option<V> {
        let inner = self.inner.read().await;
        inner.entries.get(key).map(|entry| entry.value.clone())
    }

    /// Issues a ticket for a fetch about to start.
    pub async fn begin(&self) -> Ticket {
        let mut inner = self.inner.write().await;
        inner.next_seq += 1;
        Ticket {
            seq: inner.next_seq,
            generation: inner.generation,
        }
    }

    /// Stores a fetched value. Returns `false` if the ticket was superseded.
    pub async fn store(&self, key: K, value: V, ticket: Ticket) -> bool {
        let mut inner = self.inner.write().await;
        if ticket.generation != inner.generation {
            debug!(cache = self.name, "Discarding response issued before invalidation");
            return false;
        }
        if let Some(existing) = inner.entries.get(&key) {
            if existing.seq > ticket.seq {
                debug!(cache = self.name, "Discarding response superseded by newer request");
                return false;
            }
        }
        inner.entries.insert(
            key,
            Entry {
                value,
                fetched_at: Instant::now(),
                seq: ticket.seq,
                stale: false,
            },
        );
        true
    }

    /// Returns the fresh value or runs `fetch` and stores its result.
    ///
    /// # Errors
    /// Propagates the fetch error; the cached value is left untouched.
    pub async fn get_or_fetch<F, Fut, E>(&self, key: K, fetch: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get_fresh(&key).await {
            debug!(cache = self.name, "Cache hit");
            return Ok(value);
        }

        let ticket = self.begin().await;
        let value = fetch().await?;
        self.store(key, value.clone(), ticket).await;
        Ok(value)
    }

    /// Marks every entry stale and voids outstanding tickets.
    pub async fn invalidate_all(&self) {
        let mut inner = self.inner.write().await;
        inner.generation += 1;
        for entry in inner.entries.values_mut() {
            entry.stale = true;
        }
        debug!(cache = self.name, generation = inner.generation, "Cache invalidated");
    }
}
