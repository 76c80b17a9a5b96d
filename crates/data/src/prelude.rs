//! Prelude module for convenient imports.
//!
//! ```rust
//! use gauge_data::prelude::*;
//! ```

pub use crate::cache::{Invalidate, Ticket, TtlCache};
pub use crate::pins::{PIN_STORAGE_KEY, PinStore};
pub use crate::positions::{Earned, PositionBook, collection_address};
pub use crate::registry::PoolRegistry;
