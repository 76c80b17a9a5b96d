//! Error taxonomy shared by every layer of the dashboard core.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors raised by the address codec.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    /// The input was empty (or only a `0x` prefix).
    #[error("address is empty")]
    Empty,
    /// The input contained a non-hex character.
    #[error("address contains non-hex characters: {0}")]
    NonHex(String),
    /// The input does not fit into a 32-byte account address.
    #[error("address is longer than 32 bytes: {0}")]
    TooLong(String),
}

/// Draft field a validation issue refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DraftField {
    /// Bribe token address.
    TokenAddress,
    /// Bribe amount in base units.
    Amount,
}

impl fmt::Display for DraftField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DraftField::TokenAddress => write!(f, "token address"),
            DraftField::Amount => write!(f, "amount"),
        }
    }
}

/// Why a draft field was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IssueKind {
    /// The field is empty.
    Missing,
    /// The field is present but does not match the expected pattern.
    Malformed,
}

/// A single validation issue on a bribe draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftIssue {
    /// Offending field.
    pub field: DraftField,
    /// Kind of problem.
    pub kind: IssueKind,
}

impl DraftIssue {
    /// Creates a "missing" issue for `field`.
    #[must_use]
    pub fn missing(field: DraftField) -> Self {
        Self {
            field,
            kind: IssueKind::Missing,
        }
    }

    /// Creates a "malformed" issue for `field`.
    #[must_use]
    pub fn malformed(field: DraftField) -> Self {
        Self {
            field,
            kind: IssueKind::Malformed,
        }
    }
}

impl fmt::Display for DraftIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            IssueKind::Missing => write!(f, "{} is required", self.field),
            IssueKind::Malformed => write!(f, "{} is invalid", self.field),
        }
    }
}

/// Top-level error returned by dashboard operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GaugeError {
    /// Malformed address input.
    #[error("invalid address: {0}")]
    InvalidAddress(#[from] AddressError),
    /// Transport error while reading from the chain.
    #[error("fetch failed: {0}")]
    FetchFailed(String),
    /// A required contract address is not configured.
    #[error("{0} address not configured")]
    Unconfigured(&'static str),
    /// A bribe draft did not pass validation.
    #[error("validation failed: {0}")]
    ValidationFailed(DraftIssue),
    /// The wallet declined or is unavailable.
    #[error("signing rejected: {0}")]
    SigningRejected(String),
    /// Broadcast failed after signing.
    #[error("submission failed: {0}")]
    SubmissionFailed(String),
    /// The transaction was broadcast but did not finalize successfully.
    #[error("transaction not finalized: {0}")]
    FinalityFailed(String),
    /// Another mutating action is still in flight.
    #[error("another transaction is in flight")]
    Busy,
}

/// Convenience alias for dashboard results.
pub type GaugeResult<T> = Result<T, GaugeError>;
