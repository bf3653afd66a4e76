//! Text input to typed values.
//!
//! Used for function arguments typed by a user: `"1000"`, `"0xabc…"`,
//! `"[1,2,3]"`, `"a,b,c"`, `{"to":"0x…","amount":"5"}`.

use crate::codec::{check_int, check_uint};
use alloy_primitives::{Address, Sign, I256, U256};
use txlens_core::{AbiType, ArrayLen, DecodeError, Value};

fn invalid(ty: &AbiType, input: &str, reason: impl Into<String>) -> DecodeError {
    DecodeError::InvalidInput {
        ty: ty.to_string(),
        input: input.to_string(),
        reason: reason.into(),
    }
}

/// Parse `text` as a value of `ty`.
pub fn parse_input(ty: &AbiType, text: &str) -> Result<Value, DecodeError> {
    let text = text.trim();
    match ty {
        AbiType::Uint(bits) => {
            let v = parse_magnitude(ty, text)?;
            check_uint(v, *bits)?;
            Ok(Value::Uint(v))
        }
        AbiType::Int(bits) => {
            let (sign, digits) = match text.strip_prefix('-') {
                Some(rest) => (Sign::Negative, rest.trim_start()),
                None => (Sign::Positive, text),
            };
            let abs = parse_magnitude(ty, digits)?;
            let v = I256::checked_from_sign_and_abs(sign, abs).ok_or_else(|| {
                DecodeError::OutOfRange {
                    value: text.to_string(),
                    ty: ty.to_string(),
                }
            })?;
            check_int(v, *bits)?;
            Ok(Value::Int(v))
        }
        AbiType::Address => {
            let bytes = parse_hex(ty, text)?;
            if bytes.len() != 20 {
                return Err(invalid(ty, text, format!("expected 20 bytes, got {}", bytes.len())));
            }
            Ok(Value::Address(Address::from_slice(&bytes)))
        }
        AbiType::FixedBytes(n) => {
            let bytes = parse_hex(ty, text)?;
            if bytes.len() != *n as usize {
                return Err(invalid(ty, text, format!("expected {n} bytes, got {}", bytes.len())));
            }
            Ok(Value::FixedBytes(bytes))
        }
        AbiType::Bytes => parse_hex(ty, text).map(Value::Bytes),
        AbiType::Bool => {
            let lower = text.to_ascii_lowercase();
            Ok(Value::Bool(lower == "true" || lower == "1"))
        }
        AbiType::String => Ok(Value::String(text.to_string())),
        AbiType::Array { elem, len } => {
            let items = split_array(ty, text)?;
            if let ArrayLen::Fixed(n) = len {
                if items.len() != *n {
                    return Err(DecodeError::LengthMismatch {
                        expected: *n,
                        got: items.len(),
                    });
                }
            }
            items
                .iter()
                .map(|item| parse_input(elem, item))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array)
        }
        AbiType::Tuple(fields) => parse_tuple(ty, fields, text),
    }
}

/// Decimal or `0x`-hex magnitude, no sign.
fn parse_magnitude(ty: &AbiType, text: &str) -> Result<U256, DecodeError> {
    if text.starts_with('-') {
        return Err(DecodeError::OutOfRange {
            value: text.to_string(),
            ty: ty.to_string(),
        });
    }
    let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) if !hex.is_empty() => U256::from_str_radix(hex, 16),
        Some(_) => return Err(invalid(ty, text, "empty hex literal")),
        None if !text.is_empty() => U256::from_str_radix(text, 10),
        None => return Err(invalid(ty, text, "empty input")),
    };
    parsed.map_err(|e| invalid(ty, text, e.to_string()))
}

/// Hex with `0x` optional.
fn parse_hex(ty: &AbiType, text: &str) -> Result<Vec<u8>, DecodeError> {
    let digits = text.strip_prefix("0x").unwrap_or(text);
    hex::decode(digits).map_err(|e| invalid(ty, text, e.to_string()))
}

/// Render a JSON element as the text the element parser expects.
fn json_to_text(v: &serde_json::Value) -> String {
    match v {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Array elements from a JSON array literal or comma-separated text.
fn split_array(ty: &AbiType, text: &str) -> Result<Vec<String>, DecodeError> {
    if text.starts_with('[') {
        let parsed: serde_json::Value =
            serde_json::from_str(text).map_err(|e| invalid(ty, text, e.to_string()))?;
        return match parsed {
            serde_json::Value::Array(items) => Ok(items.iter().map(json_to_text).collect()),
            _ => Err(invalid(ty, text, "expected a JSON array")),
        };
    }
    if text.is_empty() {
        return Ok(Vec::new());
    }
    Ok(text.split(',').map(|s| s.trim().to_string()).collect())
}

fn parse_tuple(
    ty: &AbiType,
    fields: &[(String, AbiType)],
    text: &str,
) -> Result<Value, DecodeError> {
    let parsed: serde_json::Value =
        serde_json::from_str(text).map_err(|e| invalid(ty, text, e.to_string()))?;
    let texts: Vec<String> = match &parsed {
        serde_json::Value::Object(map) => fields
            .iter()
            .map(|(name, _)| {
                map.get(name)
                    .map(json_to_text)
                    .ok_or_else(|| invalid(ty, text, format!("missing component '{name}'")))
            })
            .collect::<Result<_, _>>()?,
        serde_json::Value::Array(items) => {
            if items.len() != fields.len() {
                return Err(DecodeError::LengthMismatch {
                    expected: fields.len(),
                    got: items.len(),
                });
            }
            items.iter().map(json_to_text).collect()
        }
        _ => return Err(invalid(ty, text, "expected a JSON object or array")),
    };
    fields
        .iter()
        .zip(texts)
        .map(|((name, t), s)| Ok((name.clone(), parse_input(t, &s)?)))
        .collect::<Result<Vec<_>, DecodeError>>()
        .map(Value::Tuple)
}
