//! Entry and view function payloads.
//!
//! Function ids follow `<account>::<module>::<function>`. Integer arguments
//! are encoded as decimal strings, which is how the node's JSON interface
//! expects `u64` values.

use gauge_domain::bribe::ValidBribe;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Payload handed to the wallet for signing, or to the node for a view call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryFunctionPayload {
    /// Fully qualified function id.
    pub function: String,
    /// Generic type arguments.
    #[serde(default)]
    pub type_arguments: Vec<String>,
    /// Positional arguments.
    #[serde(default)]
    pub function_arguments: Vec<Value>,
}

impl EntryFunctionPayload {
    /// Creates a payload without type arguments.
    pub fn new(function: impl Into<String>, function_arguments: Vec<Value>) -> Self {
        Self {
            function: function.into(),
            type_arguments: Vec::new(),
            function_arguments,
        }
    }
}

/// Builds a function id.
#[must_use]
pub fn function_id(account: &str, module: &str, function: &str) -> String {
    format!("{account}::{module}::{function}")
}

/// `voter::gauges()`: pools registered with the voter.
#[must_use]
pub fn gauges(voter: &str) -> EntryFunctionPayload {
    EntryFunctionPayload::new(function_id(voter, "voter", "gauges"), Vec::new())
}

/// `gauge::earned(pool, index)`: rewards earned by one committed position.
#[must_use]
pub fn earned(gauge: &str, pool: &str, index: u64) -> EntryFunctionPayload {
    EntryFunctionPayload::new(
        function_id(gauge, "gauge", "earned"),
        vec![json!(pool), json!(index.to_string())],
    )
}

/// `gauge::uncommit(pool, position)`.
#[must_use]
pub fn uncommit(gauge: &str, pool: &str, position: &str) -> EntryFunctionPayload {
    EntryFunctionPayload::new(
        function_id(gauge, "gauge", "uncommit"),
        vec![json!(pool), json!(position)],
    )
}

/// `voter::distribute_bribes([pool], [token], [amount])`.
#[must_use]
pub fn distribute_bribes(voter: &str, pool: &str, bribe: &ValidBribe) -> EntryFunctionPayload {
    EntryFunctionPayload::new(
        function_id(voter, "voter", "distribute_bribes"),
        vec![
            json!([pool]),
            json!([bribe.token_address]),
            json!([bribe.amount]),
        ],
    )
}

/// `router::swap_pool(pool)`.
#[must_use]
pub fn swap_pool(amm: &str, pool: &str) -> EntryFunctionPayload {
    EntryFunctionPayload::new(function_id(amm, "router", "swap_pool"), vec![json!(pool)])
}

/// `router::add_liquidity(pool)`.
#[must_use]
pub fn add_liquidity(amm: &str, pool: &str) -> EntryFunctionPayload {
    EntryFunctionPayload::new(
        function_id(amm, "router", "add_liquidity"),
        vec![json!(pool)],
    )
}
