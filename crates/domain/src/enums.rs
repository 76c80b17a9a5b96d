use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed taxonomy of gauge pool types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PoolType {
    /// Constant-product pool. Default when metadata is absent.
    Amm,
    /// Concentrated-liquidity pool.
    Clmm,
    /// Stable-swap pool.
    Stable,
}

impl fmt::Display for PoolType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoolType::Amm => write!(f, "AMM"),
            PoolType::Clmm => write!(f, "CLMM"),
            PoolType::Stable => write!(f, "STABLE"),
        }
    }
}

/// Position index decoded from a position token name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PositionIndex {
    /// Index parsed successfully.
    Known(u64),
    /// Trailing segment was missing or not an integer.
    Unknown,
}

impl PositionIndex {
    /// Returns the index if known.
    #[must_use]
    pub fn known(self) -> Option<u64> {
        match self {
            PositionIndex::Known(idx) => Some(idx),
            PositionIndex::Unknown => None,
        }
    }
}

impl fmt::Display for PositionIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PositionIndex::Known(idx) => write!(f, "{idx}"),
            PositionIndex::Unknown => write!(f, "unknown"),
        }
    }
}

/// Mutating actions routed through the transaction coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    /// Withdraw a committed position from a gauge.
    Uncommit,
    /// Distribute a bribe to a pool's voters.
    DistributeBribes,
    /// Swap through a pool.
    SwapPool,
    /// Add liquidity to a pool.
    AddLiquidity,
}

impl ActionKind {
    /// Human-readable verb phrase used in notices.
    #[must_use]
    pub fn describe(self) -> &'static str {
        match self {
            ActionKind::Uncommit => "uncommit position",
            ActionKind::DistributeBribes => "distribute bribes",
            ActionKind::SwapPool => "swap pool",
            ActionKind::AddLiquidity => "add liquidity",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}
