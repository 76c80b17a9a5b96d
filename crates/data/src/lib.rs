//! Cached chain reads and local dashboard state.
//!
//! This crate provides:
//! - A staleness-window cache that refuses out-of-date responses
//! - The pool registry read from the voter contract
//! - Position token queries and earned amounts
//! - Persistent pin ordering

/// Prelude module for convenient imports.
pub mod prelude;

/// Staleness-window cache.
pub mod cache;
/// Pinned pools.
pub mod pins;
/// Position token queries.
pub mod positions;
/// Pool registry.
pub mod registry;
