//! Request-shape validation for values that enter the core from outside.

use crate::error::ValidationError;
use alloy_primitives::{Address, Bytes, B256};

fn is_hex_of_len(s: &str, len: usize) -> bool {
    s.len() == len && s.chars().all(|c| c.is_ascii_hexdigit())
}

/// A transaction hash: `0x` followed by exactly 64 hex characters.
pub fn tx_hash(s: &str) -> Result<B256, ValidationError> {
    let hex = s
        .strip_prefix("0x")
        .filter(|h| is_hex_of_len(h, 64))
        .ok_or_else(|| ValidationError::InvalidTxHash(s.to_string()))?;
    let bytes = hex::decode(hex).map_err(|_| ValidationError::InvalidTxHash(s.to_string()))?;
    Ok(B256::from_slice(&bytes))
}

/// A contract address: `0x` followed by exactly 40 hex characters.
/// Checksum casing is not enforced.
pub fn address(s: &str) -> Result<Address, ValidationError> {
    let hex = s
        .strip_prefix("0x")
        .filter(|h| is_hex_of_len(h, 40))
        .ok_or_else(|| ValidationError::InvalidAddress(s.to_string()))?;
    let bytes = hex::decode(hex).map_err(|_| ValidationError::InvalidAddress(s.to_string()))?;
    Ok(Address::from_slice(&bytes))
}

/// Arbitrary hex data, `0x` prefix optional.
pub fn hex_data(field: &str, s: &str) -> Result<Bytes, ValidationError> {
    let hex = s.strip_prefix("0x").unwrap_or(s);
    hex::decode(hex)
        .map(Bytes::from)
        .map_err(|e| ValidationError::InvalidHex {
            field: field.to_string(),
            reason: e.to_string(),
        })
}

/// A 32-byte log topic, `0x` prefix optional.
pub fn topic(field: &str, s: &str) -> Result<B256, ValidationError> {
    let bytes = hex_data(field, s)?;
    if bytes.len() != 32 {
        return Err(ValidationError::InvalidHex {
            field: field.to_string(),
            reason: format!("expected 32 bytes, got {}", bytes.len()),
        });
    }
    Ok(B256::from_slice(&bytes))
}
