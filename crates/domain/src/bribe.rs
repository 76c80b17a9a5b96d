//! Bribe drafts and their validation.

use crate::error::{DraftField, DraftIssue};
use serde::{Deserialize, Serialize};

/// Raw, unvalidated bribe input for one pool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BribeDraft {
    /// Token address as typed by the user.
    pub token_address: String,
    /// Amount in base units as typed by the user.
    pub amount: String,
}

impl BribeDraft {
    /// Returns a copy with `field` replaced by `value`.
    #[must_use]
    pub fn with_field(mut self, field: DraftField, value: impl Into<String>) -> Self {
        match field {
            DraftField::TokenAddress => self.token_address = value.into(),
            DraftField::Amount => self.amount = value.into(),
        }
        self
    }

    /// Validates the draft.
    ///
    /// Both fields are trimmed first. Missing fields are reported before
    /// malformed ones, token address before amount.
    ///
    /// # Errors
    /// Returns the first [`DraftIssue`] found.
    pub fn validate(&self) -> Result<ValidBribe, DraftIssue> {
        let token_address = self.token_address.trim();
        let amount = self.amount.trim();

        if token_address.is_empty() {
            return Err(DraftIssue::missing(DraftField::TokenAddress));
        }
        if amount.is_empty() {
            return Err(DraftIssue::missing(DraftField::Amount));
        }
        if !is_hex_address(token_address) {
            return Err(DraftIssue::malformed(DraftField::TokenAddress));
        }
        if !amount.chars().all(|c| c.is_ascii_digit()) {
            return Err(DraftIssue::malformed(DraftField::Amount));
        }

        Ok(ValidBribe {
            token_address: token_address.to_string(),
            amount: amount.to_string(),
        })
    }
}

/// A draft that passed validation, ready to become a payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidBribe {
    /// Token address, `0x` followed by hex digits.
    pub token_address: String,
    /// Amount, decimal digits only.
    pub amount: String,
}

/// `0x` followed by one or more hex digits.
fn is_hex_address(value: &str) -> bool {
    value
        .strip_prefix("0x")
        .is_some_and(|digits| !digits.is_empty() && digits.chars().all(|c| c.is_ascii_hexdigit()))
}
