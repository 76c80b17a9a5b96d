//! Address codec.
//!
//! Addresses travel as `0x`-prefixed lowercase hex strings. Normalization
//! never pads, so `0xABC` and `abc` both become `0xabc`. Derivation works on
//! the 32-byte account form and always yields a full-width address.

use crate::error::AddressError;
use sha3::{Digest, Sha3_256};

/// Width of an account address in bytes.
pub const ACCOUNT_BYTES: usize = 32;

/// Domain separator appended when deriving an object address from a seed.
const OBJECT_FROM_SEED_SCHEME: u8 = 0xFE;

/// Normalizes an address to lowercase `0x`-prefixed hex.
///
/// Idempotent: `normalize(normalize(x)) == normalize(x)`.
///
/// # Errors
/// Returns [`AddressError`] when the input is empty, contains non-hex
/// characters, or is wider than 32 bytes.
pub fn normalize(address: &str) -> Result<String, AddressError> {
    let trimmed = address.trim();
    let digits = strip_prefix(trimmed);

    if digits.is_empty() {
        return Err(AddressError::Empty);
    }
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(AddressError::NonHex(trimmed.to_string()));
    }
    if digits.len() > ACCOUNT_BYTES * 2 {
        return Err(AddressError::TooLong(trimmed.to_string()));
    }

    Ok(format!("0x{}", digits.to_ascii_lowercase()))
}

/// Decodes an address into its 32-byte account form, left-padding with zeros.
///
/// # Errors
/// Same conditions as [`normalize`].
pub fn account_bytes(address: &str) -> Result<[u8; ACCOUNT_BYTES], AddressError> {
    let normalized = normalize(address)?;
    let padded = format!("{:0>width$}", &normalized[2..], width = ACCOUNT_BYTES * 2);

    let mut out = [0u8; ACCOUNT_BYTES];
    hex::decode_to_slice(&padded, &mut out)
        .map_err(|_| AddressError::NonHex(address.to_string()))?;
    Ok(out)
}

/// Renders an address in full 32-byte width, as the indexer stores it.
///
/// # Errors
/// Same conditions as [`normalize`].
pub fn long_form(address: &str) -> Result<String, AddressError> {
    Ok(format!("0x{}", hex::encode(account_bytes(address)?)))
}

/// Derives an object address from a creator account and a seed.
///
/// `SHA3-256(account || seed || 0xFE)`, rendered as full-width hex. Used to
/// locate the position vault from the positions account and the position
/// collection from the vault without a round trip.
///
/// # Errors
/// Returns [`AddressError`] if `seed_account` is malformed.
pub fn derive_address(seed_account: &str, salt: &[u8]) -> Result<String, AddressError> {
    let account = account_bytes(seed_account)?;

    let mut hasher = Sha3_256::new();
    hasher.update(account);
    hasher.update(salt);
    hasher.update([OBJECT_FROM_SEED_SCHEME]);

    Ok(format!("0x{}", hex::encode(hasher.finalize())))
}

/// Shortens an address for display: first six characters, `...`, last four.
#[must_use]
pub fn shorten(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= 10 {
        return value.to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

fn strip_prefix(value: &str) -> &str {
    value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value)
}
