//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types from the crate.
//!
//! # Example
//!
//! ```rust
//! use gauge_execution::prelude::*;
//! ```

// Dashboard
pub use crate::dashboard::{GaugeDashboard, PoolView};

// Drafts
pub use crate::drafts::BribeDrafts;

// Notices
pub use crate::notice::{Notice, NoticeLevel, Notifier, QueueNotifier, TracingNotifier};

// Transaction
pub use crate::transaction::{TransactionCoordinator, TxPhase, TxReceipt, TxRecord, TxRequest};
