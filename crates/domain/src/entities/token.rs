use serde::{Deserialize, Serialize};

/// Display data attached to a position token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenData {
    /// Encoded token name, `P<poolFragment>_<index>`.
    pub token_name: String,
}

/// A position token owned by an account, as returned by the indexer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionToken {
    /// Opaque token identifier (the token object address).
    pub token_data_id: String,
    /// Token display data, absent for tokens the indexer has not resolved.
    #[serde(default)]
    pub current_token_data: Option<TokenData>,
}

impl PositionToken {
    /// Creates a token with an encoded name.
    pub fn new(token_data_id: impl Into<String>, token_name: impl Into<String>) -> Self {
        Self {
            token_data_id: token_data_id.into(),
            current_token_data: Some(TokenData {
                token_name: token_name.into(),
            }),
        }
    }

    /// Returns the encoded name, falling back to the token id.
    #[must_use]
    pub fn encoded_name(&self) -> &str {
        self.current_token_data
            .as_ref()
            .map(|data| data.token_name.as_str())
            .unwrap_or(&self.token_data_id)
    }
}
