//! Transaction orchestration and the dashboard facade.
//!
//! This crate provides:
//! - The transaction coordinator state machine
//! - Per-pool bribe drafts
//! - User-facing notices
//! - [`dashboard::GaugeDashboard`], the surface a presentation layer uses

/// Prelude module for convenient imports.
pub mod prelude;

/// Dashboard facade.
pub mod dashboard;
/// Bribe drafts.
pub mod drafts;
/// Transaction notices.
pub mod notice;
/// Transaction coordination.
pub mod transaction;
