//! Chain id encodings.
//!
//! Wallets report chain ids three ways: decimal strings from `net_version`,
//! hex strings from `eth_chainId`, and raw bytes once a `chainChanged` payload
//! has been converted. Everything is normalised to a `u64` here so observers
//! never see two encodings of the same chain.

use alloy::hex;
use thiserror::Error;

/// Chain id decoding failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChainIdError {
    #[error("empty chain id payload")]
    Empty,

    #[error("chain id needs {0} bytes, at most 8 are supported")]
    Overflow(usize),

    #[error("invalid chain id '{0}'")]
    Invalid(String),
}

/// Decode a big-endian chain id. Leading zero bytes are ignored.
pub fn decode_chain_id(bytes: &[u8]) -> Result<u64, ChainIdError> {
    if bytes.is_empty() {
        return Err(ChainIdError::Empty);
    }
    let significant = match bytes.iter().position(|b| *b != 0) {
        Some(start) => &bytes[start..],
        None => return Ok(0),
    };
    if significant.len() > 8 {
        return Err(ChainIdError::Overflow(significant.len()));
    }
    Ok(significant
        .iter()
        .fold(0u64, |acc, byte| (acc << 8) | u64::from(*byte)))
}

/// Convert a `0x` hex string to bytes, left-padding odd-length input.
pub fn hex_to_bytes(value: &str) -> Result<Vec<u8>, ChainIdError> {
    let digits = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value);
    if digits.is_empty() {
        return Err(ChainIdError::Empty);
    }
    let padded = if digits.len() % 2 == 1 {
        format!("0{}", digits)
    } else {
        digits.to_string()
    };
    hex::decode(&padded).map_err(|_| ChainIdError::Invalid(value.to_string()))
}

/// Parse a chain id reported as text, either `0x` hex or decimal.
pub fn parse_chain_id(value: &str) -> Result<u64, ChainIdError> {
    let trimmed = value.trim();
    if trimmed.starts_with("0x") || trimmed.starts_with("0X") {
        decode_chain_id(&hex_to_bytes(trimmed)?)
    } else {
        trimmed
            .parse::<u64>()
            .map_err(|_| ChainIdError::Invalid(value.to_string()))
    }
}

/// `0x`-prefixed lower-case hex, as wallets expect in `chainId` fields.
pub fn encode_chain_id_hex(chain_id: u64) -> String {
    format!("0x{:x}", chain_id)
}
