//! Core domain types for the gauge dashboard.
//!
//! Pure logic only: address codec, position name decoding, pool
//! classification and bribe draft validation. Nothing here performs I/O.

/// Address normalization and derivation.
pub mod address;
/// Bribe drafts and validation.
pub mod bribe;
/// Pool type classification.
pub mod classifier;
/// Domain entities.
pub mod entities;
/// Domain enums.
pub mod enums;
/// Error taxonomy.
pub mod error;
/// Position token name decoding.
pub mod position_name;

pub use error::{GaugeError, GaugeResult};
