//! Runtime configuration.
//!
//! Contract addresses are optional at load time. Operations that need a
//! missing address report [`GaugeError::Unconfigured`] when they run.

use gauge_domain::GaugeError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Default fullnode REST endpoint.
pub const DEFAULT_NODE_URL: &str = "https://fullnode.mainnet.aptoslabs.com/v1";
/// Default indexer GraphQL endpoint.
pub const DEFAULT_INDEXER_URL: &str = "https://api.mainnet.aptoslabs.com/v1/graphql";
/// Default pin storage file.
pub const DEFAULT_PIN_FILE: &str = "pinned-gauges.json";

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Read {
        /// File path.
        path: PathBuf,
        /// I/O error.
        source: std::io::Error,
    },
    /// The config file is not valid TOML for [`GaugeConfig`].
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Staleness windows for cached reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Pool registry TTL in seconds.
    pub registry_ttl_secs: u64,
    /// Position token list TTL in seconds.
    pub positions_ttl_secs: u64,
    /// Earned amount TTL in seconds.
    pub earned_ttl_secs: u64,
    /// Page size for owned-token queries.
    pub owned_token_limit: u32,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            registry_ttl_secs: 60,
            positions_ttl_secs: 60,
            earned_ttl_secs: 30,
            owned_token_limit: 200,
        }
    }
}

impl CacheConfig {
    /// Registry TTL.
    #[must_use]
    pub fn registry_ttl(&self) -> Duration {
        Duration::from_secs(self.registry_ttl_secs)
    }

    /// Positions TTL.
    #[must_use]
    pub fn positions_ttl(&self) -> Duration {
        Duration::from_secs(self.positions_ttl_secs)
    }

    /// Earned amounts TTL.
    #[must_use]
    pub fn earned_ttl(&self) -> Duration {
        Duration::from_secs(self.earned_ttl_secs)
    }
}

/// Dashboard configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GaugeConfig {
    /// Voter contract account (`VETAPP_ACCOUNT_ADDRESS`).
    pub voter_address: Option<String>,
    /// AMM contract account (`AMM_ACCOUNT_ADDRESS`).
    pub amm_address: Option<String>,
    /// Positions origin account the vault is derived from (`TAPP_ACCOUNT_ADDRESS`).
    pub positions_address: Option<String>,
    /// Gauge module account (`GAUGE_ACCOUNT_ADDRESS`), defaults to the voter.
    pub gauge_address: Option<String>,
    /// Fullnode REST endpoint.
    pub node_url: String,
    /// Indexer GraphQL endpoint.
    pub indexer_url: String,
    /// Pin storage file.
    pub pin_file: PathBuf,
    /// Cache windows.
    pub cache: CacheConfig,
}

impl Default for GaugeConfig {
    fn default() -> Self {
        Self {
            voter_address: None,
            amm_address: None,
            positions_address: None,
            gauge_address: None,
            node_url: DEFAULT_NODE_URL.to_string(),
            indexer_url: DEFAULT_INDEXER_URL.to_string(),
            pin_file: PathBuf::from(DEFAULT_PIN_FILE),
            cache: CacheConfig::default(),
        }
    }
}

impl GaugeConfig {
    /// Loads configuration from the environment, reading `.env` first.
    #[must_use]
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Builds configuration from a variable lookup.
    pub fn from_vars<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let defaults = Self::default();

        Self {
            voter_address: non_empty("VETAPP_ACCOUNT_ADDRESS"),
            amm_address: non_empty("AMM_ACCOUNT_ADDRESS"),
            positions_address: non_empty("TAPP_ACCOUNT_ADDRESS"),
            gauge_address: non_empty("GAUGE_ACCOUNT_ADDRESS"),
            node_url: non_empty("APTOS_NODE_URL").unwrap_or(defaults.node_url),
            indexer_url: non_empty("APTOS_INDEXER_URL").unwrap_or(defaults.indexer_url),
            pin_file: non_empty("GAUGE_PIN_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.pin_file),
            cache: defaults.cache,
        }
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses configuration from TOML text.
    ///
    /// # Errors
    /// Returns [`ConfigError::Parse`] on invalid input.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Voter contract address.
    ///
    /// # Errors
    /// [`GaugeError::Unconfigured`] if unset.
    pub fn voter(&self) -> Result<&str, GaugeError> {
        self.voter_address
            .as_deref()
            .ok_or(GaugeError::Unconfigured("voter"))
    }

    /// AMM contract address.
    ///
    /// # Errors
    /// [`GaugeError::Unconfigured`] if unset.
    pub fn amm(&self) -> Result<&str, GaugeError> {
        self.amm_address
            .as_deref()
            .ok_or(GaugeError::Unconfigured("AMM"))
    }

    /// Positions origin address.
    ///
    /// # Errors
    /// [`GaugeError::Unconfigured`] if unset.
    pub fn positions(&self) -> Result<&str, GaugeError> {
        self.positions_address
            .as_deref()
            .ok_or(GaugeError::Unconfigured("positions"))
    }

    /// Gauge module address, falling back to the voter.
    ///
    /// # Errors
    /// [`GaugeError::Unconfigured`] if neither is set.
    pub fn gauge(&self) -> Result<&str, GaugeError> {
        match self.gauge_address.as_deref() {
            Some(address) => Ok(address),
            None => self.voter().map_err(|_| GaugeError::Unconfigured("gauge")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_from_vars() {
        let vars: HashMap<&str, &str> = [
            ("VETAPP_ACCOUNT_ADDRESS", "0xv"),
            ("AMM_ACCOUNT_ADDRESS", ""),
            ("TAPP_ACCOUNT_ADDRESS", "0xt"),
        ]
        .into_iter()
        .collect();

        let config = GaugeConfig::from_vars(|key| vars.get(key).map(|v| v.to_string()));
        assert_eq!(config.voter().unwrap(), "0xv");
        assert_eq!(config.amm(), Err(GaugeError::Unconfigured("AMM")));
        assert_eq!(config.positions().unwrap(), "0xt");
        assert_eq!(config.gauge().unwrap(), "0xv");
        assert_eq!(config.node_url, DEFAULT_NODE_URL);
    }

    #[test]
    fn test_gauge_unconfigured_without_voter() {
        let config = GaugeConfig::default();
        assert_eq!(config.gauge(), Err(GaugeError::Unconfigured("gauge")));
    }

    #[test]
    fn test_from_toml() {
        let config = GaugeConfig::from_toml_str(
            r#"
            voter_address = "0x1"
            gauge_address = "0x2"

            [cache]
            registry_ttl_secs = 10
            "#,
        )
        .unwrap();

        assert_eq!(config.voter().unwrap(), "0x1");
        assert_eq!(config.gauge().unwrap(), "0x2");
        assert_eq!(config.cache.registry_ttl(), Duration::from_secs(10));
        assert_eq!(config.cache.owned_token_limit, 200);
    }

    #[test]
    fn test_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gauge.toml");
        std::fs::write(&path, "amm_address = \"0xa\"\n").unwrap();

        let config = GaugeConfig::from_toml_file(&path).unwrap();
        assert_eq!(config.amm().unwrap(), "0xa");

        assert!(GaugeConfig::from_toml_file(&dir.path().join("missing.toml")).is_err());
    }
}
