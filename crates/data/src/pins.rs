//! Pinned pools.
//!
//! Pins are an ordered, duplicate-free list of pool keys. Each toggle writes
//! the whole list through to the key-value store. Storage failures are
//! logged and swallowed; unreadable or corrupt data loads as no pins.

use gauge_domain::entities::PoolKey;
use gauge_protocols::store::KeyValueStore;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

/// Storage key of the pin list.
pub const PIN_STORAGE_KEY: &str = "pinned-gauges";

/// User-ordered set of pinned pools.
pub struct PinStore {
    store: Arc<dyn KeyValueStore>,
    pins: Vec<PoolKey>,
}

impl PinStore {
    /// Loads pins from `store`.
    pub fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let pins = match store.get(PIN_STORAGE_KEY) {
            Ok(Some(raw)) => decode(&raw),
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, "Failed to read pins, starting empty");
                Vec::new()
            }
        };
        debug!(count = pins.len(), "Loaded pins");
        Self { store, pins }
    }

    /// Pinned keys in pin order.
    #[must_use]
    pub fn pins(&self) -> &[PoolKey] {
        &self.pins
    }

    /// Whether `key` is pinned.
    #[must_use]
    pub fn is_pinned(&self, key: &PoolKey) -> bool {
        self.pins.contains(key)
    }

    /// Unpins `key` if pinned, otherwise pins it at the end.
    ///
    /// Returns whether the key is pinned afterwards.
    pub fn toggle(&mut self, key: PoolKey) -> bool {
        let pinned = if let Some(pos) = self.pins.iter().position(|p| *p == key) {
            self.pins.remove(pos);
            false
        } else {
            self.pins.push(key);
            true
        };
        self.persist();
        pinned
    }

    /// Pinned keys first, in pin order, then the remaining `pools` in order.
    ///
    /// Pins absent from `pools` are kept in their pinned slot. Every key
    /// appears once.
    #[must_use]
    pub fn order(&self, pools: &[PoolKey]) -> Vec<PoolKey> {
        let pinned: HashSet<&PoolKey> = self.pins.iter().collect();
        let mut seen: HashSet<&PoolKey> = HashSet::with_capacity(pools.len());

        self.pins
            .iter()
            .chain(pools.iter().filter(|key| !pinned.contains(key)))
            .filter(|key| seen.insert(key))
            .cloned()
            .collect()
    }

    fn persist(&self) {
        let encoded = match serde_json::to_string(&self.pins) {
            Ok(encoded) => encoded,
            Err(e) => {
                warn!(error = %e, "Failed to encode pins");
                return;
            }
        };
        if let Err(e) = self.store.set(PIN_STORAGE_KEY, &encoded) {
            warn!(error = %e, "Failed to persist pins");
        }
    }
}

/// Decodes the stored list, keeping string entries only and dropping repeats.
fn decode(raw: &str) -> Vec<PoolKey> {
    let Ok(Value::Array(items)) = serde_json::from_str::<Value>(raw) else {
        warn!("Stored pins are corrupt, starting empty");
        return Vec::new();
    };

    let mut seen = HashSet::new();
    items
        .iter()
        .filter_map(Value::as_str)
        .map(PoolKey::new)
        .filter(|key| !key.as_str().is_empty() && seen.insert(key.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use gauge_protocols::store::{JsonFileStore, MemoryStore};
    use gauge_protocols::testing::BrokenStore;

    fn keys(values: &[&str]) -> Vec<PoolKey> {
        values.iter().map(|v| PoolKey::new(v)).collect()
    }

    fn store_with(raw: &str) -> Arc<MemoryStore> {
        let store = MemoryStore::new();
        store.set(PIN_STORAGE_KEY, raw).unwrap();
        Arc::new(store)
    }

    #[test]
    fn test_order_pins_first() {
        let pins = PinStore::load(store_with(r#"["b","a"]"#));
        assert_eq!(pins.order(&keys(&["a", "b", "c"])), keys(&["b", "a", "c"]));
    }

    #[test]
    fn test_unpinned_pool_returns_to_registry_slot() {
        let mut pins = PinStore::load(store_with(r#"["b","a"]"#));
        let registry = keys(&["a", "b", "c"]);

        assert!(!pins.toggle(PoolKey::new("a")));
        assert_eq!(pins.pins(), keys(&["b"]).as_slice());
        assert_eq!(pins.order(&registry), keys(&["b", "a", "c"]));
    }

    #[test]
    fn test_pin_absent_from_registry_appears_once() {
        let mut pins = PinStore::load(store_with(r#"["b","a"]"#));
        let registry = keys(&["a", "b", "c"]);

        pins.toggle(PoolKey::new("a"));
        assert!(pins.toggle(PoolKey::new("d")));
        assert_eq!(pins.order(&registry), keys(&["b", "d", "a", "c"]));
    }

    #[test]
    fn test_order_has_no_duplicates() {
        let pins = PinStore::load(store_with(r#"["a"]"#));
        assert_eq!(pins.order(&keys(&["a", "b", "b"])), keys(&["a", "b"]));
    }

    #[test]
    fn test_toggle_writes_through() {
        let store = Arc::new(MemoryStore::new());
        let mut pins = PinStore::load(store.clone());
        pins.toggle(PoolKey::new("0xAA"));
        pins.toggle(PoolKey::new("0xbb"));

        assert_eq!(
            store.get(PIN_STORAGE_KEY).unwrap().as_deref(),
            Some(r#"["0xaa","0xbb"]"#)
        );

        let reloaded = PinStore::load(store);
        assert_eq!(reloaded.pins(), keys(&["0xaa", "0xbb"]).as_slice());
        assert!(reloaded.is_pinned(&PoolKey::new("0xAA")));
    }

    #[test]
    fn test_corrupt_data_loads_empty() {
        assert!(PinStore::load(store_with("{not json")).pins().is_empty());
        assert!(PinStore::load(store_with(r#"{"a":1}"#)).pins().is_empty());
    }

    #[test]
    fn test_non_string_entries_are_dropped() {
        let pins = PinStore::load(store_with(r#"["a", 1, null, "A", "b"]"#));
        assert_eq!(pins.pins(), keys(&["a", "b"]).as_slice());
    }

    #[test]
    fn test_storage_failures_are_swallowed() {
        let mut pins = PinStore::load(Arc::new(BrokenStore));
        assert!(pins.pins().is_empty());
        assert!(pins.toggle(PoolKey::new("a")));
        assert!(pins.is_pinned(&PoolKey::new("a")));
    }

    #[test]
    fn test_file_backed_pins_survive_sessions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pins.json");

        let mut first = PinStore::load(Arc::new(JsonFileStore::new(&path)));
        first.toggle(PoolKey::new("0xc"));
        first.toggle(PoolKey::new("0xa"));

        let second = PinStore::load(Arc::new(JsonFileStore::new(&path)));
        assert_eq!(second.order(&keys(&["0xa", "0xb", "0xc"])), keys(&["0xc", "0xa", "0xb"]));
    }
}
