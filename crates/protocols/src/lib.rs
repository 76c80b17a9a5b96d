//! Collaborator contracts and chain access for the gauge dashboard.
//!
//! - Wallet signing and chain read traits
//! - Local key-value persistence
//! - Entry/view function payloads
//! - Runtime configuration
//! - HTTP chain reader

/// Prelude module for convenient imports.
pub mod prelude;

/// Chain read collaborator.
pub mod chain;
/// Runtime configuration.
pub mod config;
/// Function payloads.
pub mod payload;
/// HTTP chain reader.
pub mod rpc;
/// Key-value persistence.
pub mod store;
/// Wallet collaborator.
pub mod wallet;

/// In-memory collaborators for tests.
#[cfg(any(test, feature = "testing"))]
pub mod testing;
