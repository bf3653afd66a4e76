//! # txlens-core
//!
//! Core types shared across all txlens crates: the ABI type model, ingested
//! ABI items, decoded values and events, signature hashing, and the error
//! taxonomy. The codec, registry, RPC client and receipt parser are all built
//! on the definitions here.

pub mod abi;
pub mod error;
pub mod event;
pub mod fingerprint;
pub mod network;
pub mod signature;
pub mod types;
pub mod validate;

pub use abi::{AbiItem, AbiParam, AbiType, ArrayLen, ConstructorDef, EventDef, FunctionDef, StateMutability};
pub use error::{DecodeError, FieldError, ValidationError};
pub use event::{DecodedEvent, DecodedParam, Log, MatchedEvent, RawLog};
pub use fingerprint::{keccak256, selector, topic_hash};
pub use network::Network;
pub use signature::{canonicalize, EventSignatureDef, SignatureLookup};
pub use types::Value;

/// Lowercase `0x`-prefixed hex rendering used for every byte string txlens emits.
pub fn to_hex(bytes: impl AsRef<[u8]>) -> String {
    format!("0x{}", hex::encode(bytes.as_ref()))
}
