use crate::enums::PositionIndex;
use serde::{Deserialize, Serialize};

/// A position token reconciled against its pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    /// Token identifier, passed back to the gauge on uncommit.
    pub token_id: String,
    /// Normalized address of the owning pool.
    pub pool_address: String,
    /// Index of the position inside the pool.
    pub index: PositionIndex,
}

impl Position {
    /// Whether per-position lookups (earned amounts) can be made.
    #[must_use]
    pub fn is_classified(&self) -> bool {
        matches!(self.index, PositionIndex::Known(_))
    }
}
