use crate::address::normalize;
use crate::error::AddressError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lookup key for a pool: the trimmed, lowercased address string.
///
/// Pins and bribe drafts are keyed by this value. It is not required to be
/// valid hex, so stale or foreign keys loaded from storage stay inert instead
/// of failing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PoolKey(String);

impl PoolKey {
    /// Builds a key from any address-like string.
    #[must_use]
    pub fn new(value: &str) -> Self {
        Self(value.trim().to_lowercase())
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PoolKey {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for PoolKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A pool registered with the gauge voter.
///
/// Created wholesale on every registry fetch and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pool {
    /// Canonical lowercase `0x` address.
    pub address: String,
}

impl Pool {
    /// Creates a pool from a raw address, normalizing it.
    ///
    /// # Errors
    /// Returns [`AddressError`] for malformed addresses.
    pub fn new(address: &str) -> Result<Self, AddressError> {
        Ok(Self {
            address: normalize(address)?,
        })
    }

    /// Returns the pin/draft key of this pool.
    #[must_use]
    pub fn key(&self) -> PoolKey {
        PoolKey::new(&self.address)
    }
}

/// Raw pool metadata as served by the pool index.
///
/// Either field may be missing depending on the source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolMeta {
    /// Numeric hook type code.
    #[serde(default)]
    pub hook_type: Option<i64>,
    /// Hook type label, e.g. `"V3"` or `"STABLE"`.
    #[serde(default)]
    pub hook_type_label: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_key_lowercases() {
        assert_eq!(PoolKey::new(" 0xAB ").as_str(), "0xab");
        let pool = Pool::new("0xABCD").unwrap();
        assert_eq!(pool.key(), PoolKey::from("0xabcd"));
    }

    #[test]
    fn test_pool_meta_tolerates_partial_fields() {
        let meta: PoolMeta = serde_json::from_str(r#"{"hook_type_label":"V3"}"#).unwrap();
        assert_eq!(meta.hook_type, None);
        assert_eq!(meta.hook_type_label.as_deref(), Some("V3"));

        let meta: PoolMeta = serde_json::from_str(r#"{"hook_type":4}"#).unwrap();
        assert_eq!(meta.hook_type, Some(4));
    }
}
