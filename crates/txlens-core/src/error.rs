//! Error types for the txlens decode pipeline.

use thiserror::Error;

/// Errors raised while decoding or encoding a single ABI value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("data too short: need {needed} bytes at offset {offset}, have {available}")]
    OutOfBounds {
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("offset or length word does not fit in memory: {word}")]
    InvalidOffset { word: String },

    #[error("decoded output out of proportion to {input} bytes of input")]
    OutputTooLarge { input: usize },

    #[error("invalid UTF-8 in string: {reason}")]
    InvalidUtf8 { reason: String },

    #[error("unsupported ABI type '{ty}'")]
    InvalidType { ty: String },

    #[error("invalid signature '{signature}': {reason}")]
    InvalidSignature { signature: String, reason: String },

    #[error("invalid {ty} input '{input}': {reason}")]
    InvalidInput {
        ty: String,
        input: String,
        reason: String,
    },

    #[error("value {value} out of range for {ty}")]
    OutOfRange { value: String, ty: String },

    #[error("type mismatch: expected {expected}, got {got}")]
    TypeMismatch { expected: String, got: String },

    #[error("length mismatch: expected {expected} values, got {got}")]
    LengthMismatch { expected: usize, got: usize },

    #[error("missing topic for indexed parameter '{name}'")]
    MissingTopic { name: String },

    #[error("all {count} data parameters failed to decode")]
    AllFieldsFailed { count: usize },

    #[error("argument '{name}': {reason}")]
    InvalidArgument { name: String, reason: String },
}

/// A decode failure scoped to one named field.
///
/// Siblings decoded before or after the failing field are unaffected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("field '{field}' ({ty}): {source}")]
pub struct FieldError {
    pub field: String,
    pub ty: String,
    #[source]
    pub source: DecodeError,
}

impl FieldError {
    pub fn new(field: impl Into<String>, ty: impl Into<String>, source: DecodeError) -> Self {
        Self {
            field: field.into(),
            ty: ty.into(),
            source,
        }
    }
}

/// Malformed request shapes, rejected before any decode or RPC work starts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid transaction hash '{0}': expected 0x followed by 64 hex characters")]
    InvalidTxHash(String),

    #[error("invalid address '{0}': expected 0x followed by 40 hex characters")]
    InvalidAddress(String),

    #[error("invalid hex in '{field}': {reason}")]
    InvalidHex { field: String, reason: String },

    #[error("invalid network '{0}': expected 'mainnet' or 'testnet'")]
    InvalidNetwork(String),

    #[error("invalid ABI: {0}")]
    InvalidAbi(String),
}
