//! Prelude module for convenient imports.
//!
//! ```rust
//! use gauge_protocols::prelude::*;
//! ```

pub use crate::chain::{ChainError, ChainReader, FinalizedReceipt};
pub use crate::config::{CacheConfig, ConfigError, GaugeConfig};
pub use crate::payload::EntryFunctionPayload;
pub use crate::rpc::{RpcConfig, RpcProvider};
pub use crate::store::{JsonFileStore, KeyValueStore, MemoryStore, StoreError};
pub use crate::wallet::{SignerError, TransactionHandle, WalletSigner};
