//! Per-pool bribe drafts.

use gauge_domain::bribe::{BribeDraft, ValidBribe};
use gauge_domain::entities::PoolKey;
use gauge_domain::error::DraftField;
use gauge_domain::{GaugeError, GaugeResult};
use std::collections::HashMap;
use tracing::debug;

/// Editable bribe input, one draft per pool. Not persisted.
#[derive(Debug, Default)]
pub struct BribeDrafts {
    drafts: HashMap<PoolKey, BribeDraft>,
}

impl BribeDrafts {
    /// Creates an empty set of drafts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current draft of `pool`, empty if never edited.
    #[must_use]
    pub fn get(&self, pool: &PoolKey) -> BribeDraft {
        self.drafts.get(pool).cloned().unwrap_or_default()
    }

    /// Replaces one field of one pool's draft, creating the draft on first use.
    pub fn set_field(&mut self, pool: PoolKey, field: DraftField, value: impl Into<String>) {
        let draft = self.drafts.entry(pool).or_default();
        *draft = std::mem::take(draft).with_field(field, value);
    }

    /// Validates the draft of `pool`.
    ///
    /// # Errors
    /// [`GaugeError::ValidationFailed`] with the first issue found.
    pub fn validate(&self, pool: &PoolKey) -> GaugeResult<ValidBribe> {
        self.get(pool).validate().map_err(GaugeError::ValidationFailed)
    }

    /// Resets a draft after a successful distribution: the trimmed token
    /// address stays, the amount is cleared.
    pub fn settle(&mut self, pool: &PoolKey, submitted: &ValidBribe) {
        debug!(pool = %pool, "Clearing bribe amount");
        self.drafts.insert(
            pool.clone(),
            BribeDraft {
                token_address: submitted.token_address.clone(),
                amount: String::new(),
            },
        );
    }
}
