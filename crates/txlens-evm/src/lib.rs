//! # txlens-evm
//!
//! EVM ABI codec and event decoder.
//!
//! ## Layout
//! - `codec`: head/tail encoding and decoding of [`txlens_core::Value`]s
//! - `input`: user text to typed values
//! - `decoder`: `topics[0]` → signature, `topics[1..]` → indexed params,
//!   `data` → non-indexed params
//! - `call`: calldata for functions and decoding of their return data

pub mod call;
pub mod codec;
pub mod decoder;
pub mod input;

pub use call::{decode_output, encode_call, encode_call_values, find_function};
pub use codec::{decode_params, encode, encode_params};
pub use decoder::EventDecoder;
pub use input::parse_input;
