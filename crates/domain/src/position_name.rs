//! Position token name decoding.
//!
//! A position token is tied to its pool only through its name:
//! `P<poolAddressFragment>_<positionIndex>`. All knowledge of that layout
//! lives behind [`PositionNameCodec`], so callers never split names
//! themselves.

use crate::address::normalize;
use crate::entities::{Position, PositionToken};
use crate::enums::PositionIndex;
use crate::error::AddressError;
use thiserror::Error;

/// Result of decoding a position token name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedName {
    /// Normalized pool address.
    pub pool_address: String,
    /// Position index inside the pool.
    pub index: PositionIndex,
}

/// Errors raised when a name cannot be tied to any pool.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PositionNameError {
    /// The name has no pool fragment after the type tag.
    #[error("position name has no pool fragment: {0:?}")]
    MissingPool(String),
    /// The pool fragment is not an address.
    #[error("position name {name:?} has an invalid pool fragment: {source}")]
    InvalidPool {
        /// Full name being decoded.
        name: String,
        /// Underlying codec error.
        source: AddressError,
    },
}

/// Decodes position token names into pool address and index.
pub trait PositionNameCodec: Send + Sync {
    /// Decodes one encoded name.
    ///
    /// # Errors
    /// Returns [`PositionNameError`] when no pool address can be recovered.
    /// An unparseable index is not an error; it decodes to
    /// [`PositionIndex::Unknown`].
    fn decode(&self, name: &str) -> Result<DecodedName, PositionNameError>;
}

/// The `P<pool>_<index>` naming scheme used by the position collection.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrefixedNameCodec;

impl PositionNameCodec for PrefixedNameCodec {
    fn decode(&self, name: &str) -> Result<DecodedName, PositionNameError> {
        let (leading, trailing) = match name.split_once('_') {
            Some((leading, trailing)) => (leading, Some(trailing)),
            None => (name, None),
        };

        // The first character is a fixed type tag.
        let mut chars = leading.chars();
        chars.next();
        let fragment = chars.as_str();
        if fragment.is_empty() {
            return Err(PositionNameError::MissingPool(name.to_string()));
        }

        let pool_address = normalize(fragment).map_err(|source| PositionNameError::InvalidPool {
            name: name.to_string(),
            source,
        })?;

        let index = trailing
            .and_then(|segment| segment.parse::<u64>().ok())
            .map_or(PositionIndex::Unknown, PositionIndex::Known);

        Ok(DecodedName {
            pool_address,
            index,
        })
    }
}

/// Decodes a single token with the given codec.
///
/// # Errors
/// Propagates the codec's [`PositionNameError`].
pub fn decode_token<C: PositionNameCodec + ?Sized>(
    codec: &C,
    token: &PositionToken,
) -> Result<Position, PositionNameError> {
    let decoded = codec.decode(token.encoded_name())?;
    Ok(Position {
        token_id: token.token_data_id.clone(),
        pool_address: decoded.pool_address,
        index: decoded.index,
    })
}

/// Returns the tokens belonging to `pool_address`, in input order.
///
/// Comparison happens on normalized addresses. Tokens whose names cannot be
/// tied to a pool are skipped; tokens with an unknown index are kept.
pub fn reconcile<C: PositionNameCodec + ?Sized>(
    codec: &C,
    tokens: &[PositionToken],
    pool_address: &str,
) -> Vec<Position> {
    let Ok(target) = normalize(pool_address) else {
        return Vec::new();
    };

    tokens
        .iter()
        .filter_map(|token| decode_token(codec, token).ok())
        .filter(|position| position.pool_address == target)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens() -> Vec<PositionToken> {
        vec![
            PositionToken::new("0xt1", "P0xaa11_0"),
            PositionToken::new("0xt2", "P0xaa11_3"),
            PositionToken::new("0xt3", "Pbb22_1"),
        ]
    }

    #[test]
    fn test_reconcile_by_pool() {
        let codec = PrefixedNameCodec;
        let tokens = tokens();

        let aa = reconcile(&codec, &tokens, "0xaa11");
        assert_eq!(aa.len(), 2);
        assert_eq!(aa[0].token_id, "0xt1");
        assert_eq!(aa[0].index, PositionIndex::Known(0));
        assert_eq!(aa[1].token_id, "0xt2");
        assert_eq!(aa[1].index, PositionIndex::Known(3));

        let bb = reconcile(&codec, &tokens, "0xbb22");
        assert_eq!(bb.len(), 1);
        assert_eq!(bb[0].token_id, "0xt3");
        assert_eq!(bb[0].index, PositionIndex::Known(1));
    }

    #[test]
    fn test_reconcile_is_case_insensitive() {
        let tokens = vec![PositionToken::new("0xt1", "P0xAA11_2")];
        let found = reconcile(&PrefixedNameCodec, &tokens, "0XAa11");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].pool_address, "0xaa11");
    }

    #[test]
    fn test_unparseable_index_is_unknown() {
        let decoded = PrefixedNameCodec.decode("P0xaa11_x").unwrap();
        assert_eq!(decoded.pool_address, "0xaa11");
        assert_eq!(decoded.index, PositionIndex::Unknown);

        let tokens = vec![PositionToken::new("0xt9", "P0xaa11_x")];
        let found = reconcile(&PrefixedNameCodec, &tokens, "0xaa11");
        assert_eq!(found.len(), 1);
        assert!(!found[0].is_classified());
    }

    #[test]
    fn test_missing_separator_is_unknown_index() {
        let decoded = PrefixedNameCodec.decode("P0xaa11").unwrap();
        assert_eq!(decoded.index, PositionIndex::Unknown);
    }

    #[test]
    fn test_split_on_first_separator_only() {
        let decoded = PrefixedNameCodec.decode("P0xaa11_1_2").unwrap();
        assert_eq!(decoded.index, PositionIndex::Unknown);
    }

    #[test]
    fn test_undecodable_names() {
        assert!(matches!(
            PrefixedNameCodec.decode("P"),
            Err(PositionNameError::MissingPool(_))
        ));
        assert!(matches!(
            PrefixedNameCodec.decode("Pzz_1"),
            Err(PositionNameError::InvalidPool { .. })
        ));
    }

    #[test]
    fn test_name_falls_back_to_token_id() {
        let token = PositionToken {
            token_data_id: "P0xcc33_4".to_string(),
            current_token_data: None,
        };
        let position = decode_token(&PrefixedNameCodec, &token).unwrap();
        assert_eq!(position.pool_address, "0xcc33");
        assert_eq!(position.index, PositionIndex::Known(4));
    }

    #[test]
    fn test_reconcile_invalid_target_is_empty() {
        assert!(reconcile(&PrefixedNameCodec, &tokens(), "not-an-address").is_empty());
    }
}
