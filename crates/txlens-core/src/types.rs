//! Decoded ABI values.
//!
//! Integers are kept at full 256-bit precision and rendered as decimal
//! strings on output, so downstream consumers never lose digits.

use crate::to_hex;
use alloy_primitives::{Address, I256, U256};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use std::fmt;

/// A value of some [`crate::AbiType`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Uint(U256),
    Int(I256),
    Address(Address),
    Bool(bool),
    /// `bytesN`: exactly N bytes.
    FixedBytes(Vec<u8>),
    Bytes(Vec<u8>),
    String(String),
    /// Elements of a fixed or dynamic array.
    Array(Vec<Value>),
    /// Tuple components in declaration order; unnamed components have an
    /// empty name.
    Tuple(Vec<(String, Value)>),
}

impl Value {
    /// Short name of the variant, used in type-mismatch errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Uint(_) => "uint",
            Value::Int(_) => "int",
            Value::Address(_) => "address",
            Value::Bool(_) => "bool",
            Value::FixedBytes(_) => "fixed bytes",
            Value::Bytes(_) => "bytes",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Tuple(_) => "tuple",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Uint(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Address(a) => write!(f, "{}", a.to_checksum(None)),
            Value::Bool(b) => write!(f, "{b}"),
            Value::FixedBytes(b) | Value::Bytes(b) => write!(f, "{}", to_hex(b)),
            Value::String(s) => write!(f, "{s}"),
            Value::Array(items) => {
                let parts: Vec<_> = items.iter().map(|x| x.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
            Value::Tuple(fields) => {
                let parts: Vec<_> = fields
                    .iter()
                    .enumerate()
                    .map(|(i, (k, v))| {
                        if k.is_empty() {
                            format!("{i}: {v}")
                        } else {
                            format!("{k}: {v}")
                        }
                    })
                    .collect();
                write!(f, "{{{}}}", parts.join(", "))
            }
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Uint(v) => serializer.serialize_str(&v.to_string()),
            Value::Int(v) => serializer.serialize_str(&v.to_string()),
            Value::Address(a) => serializer.serialize_str(&a.to_checksum(None)),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::FixedBytes(b) | Value::Bytes(b) => serializer.serialize_str(&to_hex(b)),
            Value::String(s) => serializer.serialize_str(s),
            Value::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Tuple(fields) => {
                // emitted in declaration order
                let mut map = serializer.serialize_map(Some(fields.len()))?;
                for (i, (name, value)) in fields.iter().enumerate() {
                    if name.is_empty() {
                        map.serialize_entry(&i.to_string(), value)?;
                    } else {
                        map.serialize_entry(name, value)?;
                    }
                }
                map.end()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_serialize_as_decimal_strings() {
        let big = U256::MAX;
        let json = serde_json::to_string(&Value::Uint(big)).unwrap();
        assert_eq!(
            json,
            "\"115792089237316195423570985008687907853269984665640564039457584007913129639935\""
        );
        let neg = Value::Int(I256::try_from(-5i128).unwrap());
        assert_eq!(serde_json::to_string(&neg).unwrap(), "\"-5\"");
    }

    #[test]
    fn tuple_keeps_declaration_order() {
        let v = Value::Tuple(vec![
            ("zeta".into(), Value::Bool(true)),
            ("alpha".into(), Value::String("x".into())),
            (String::new(), Value::Bytes(vec![0xab])),
        ]);
        assert_eq!(
            serde_json::to_string(&v).unwrap(),
            r#"{"zeta":true,"alpha":"x","2":"0xab"}"#
        );
    }

    #[test]
    fn address_renders_checksummed() {
        let addr: Address = "0xd8da6bf26964af9d7eed9e03e53415d37aa96045".parse().unwrap();
        assert_eq!(
            Value::Address(addr).to_string(),
            "0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045"
        );
    }
}
