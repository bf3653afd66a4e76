//! ABI head/tail codec.
//!
//! Values are laid out as a sequence of 32-byte words. Static members of a
//! tuple are stored in place in the head; dynamic members store an offset
//! (relative to the start of the tuple) in the head and their body in the
//! tail. Every offset and length read from the buffer is checked before it
//! is used to slice.

use alloy_primitives::{Address, I256, U256};
use txlens_core::{AbiParam, AbiType, ArrayLen, DecodeError, FieldError, Value};

/// Size of one ABI word.
pub const WORD: usize = 32;

// ─── Decoding ────────────────────────────────────────────────────────────────

fn word_at(data: &[u8], offset: usize) -> Result<&[u8], DecodeError> {
    let end = offset.checked_add(WORD).ok_or_else(|| DecodeError::OutOfBounds {
        offset,
        needed: WORD,
        available: data.len(),
    })?;
    data.get(offset..end).ok_or(DecodeError::OutOfBounds {
        offset,
        needed: WORD,
        available: data.len(),
    })
}

/// Read an offset or length word. Anything that does not fit in a `usize`
/// is rejected.
fn read_usize(data: &[u8], offset: usize) -> Result<usize, DecodeError> {
    let word = word_at(data, offset)?;
    let invalid = || DecodeError::InvalidOffset {
        word: hex::encode(word),
    };
    if word[..24].iter().any(|b| *b != 0) {
        return Err(invalid());
    }
    let mut low = [0u8; 8];
    low.copy_from_slice(&word[24..]);
    usize::try_from(u64::from_be_bytes(low)).map_err(|_| invalid())
}

fn checked_pos(base: usize, rel: usize, available: usize) -> Result<usize, DecodeError> {
    base.checked_add(rel).ok_or(DecodeError::OutOfBounds {
        offset: base,
        needed: rel,
        available,
    })
}

/// Decode a static scalar from the word at `offset`.
///
/// Returns the value and the number of bytes consumed (always one word).
/// Integers are read from the whole word regardless of declared width.
pub fn decode_word(ty: &AbiType, data: &[u8], offset: usize) -> Result<(Value, usize), DecodeError> {
    let word = word_at(data, offset)?;
    let mut buf = [0u8; WORD];
    buf.copy_from_slice(word);
    let value = match ty {
        AbiType::Uint(_) => Value::Uint(U256::from_be_bytes(buf)),
        AbiType::Int(_) => Value::Int(I256::from_raw(U256::from_be_bytes(buf))),
        AbiType::Address => Value::Address(Address::from_slice(&buf[12..])),
        AbiType::Bool => Value::Bool(buf.iter().any(|b| *b != 0)),
        AbiType::FixedBytes(n) => Value::FixedBytes(buf[..*n as usize].to_vec()),
        other => {
            return Err(DecodeError::TypeMismatch {
                expected: "static scalar type".into(),
                got: other.to_string(),
            })
        }
    };
    Ok((value, WORD))
}

/// Output words granted per input word before a decode is abandoned.
const BUDGET_PER_WORD: usize = 4;
/// Flat allowance on top, so short payloads (empty arrays, short strings)
/// are never refused.
const BUDGET_FLOOR: usize = 64;

/// Decode state over one input buffer.
///
/// Offsets may point several heads at the same body, so the decoded output
/// is not bounded by the input size on its own. Each decoded element or
/// field, plus each copied byte-string word, is charged against a budget
/// proportional to the input length.
struct Reader<'a> {
    data: &'a [u8],
    budget: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        let budget = (data.len() / WORD)
            .saturating_mul(BUDGET_PER_WORD)
            .saturating_add(BUDGET_FLOOR);
        Self { data, budget }
    }

    fn charge(&mut self, words: usize) -> Result<(), DecodeError> {
        self.budget = self
            .budget
            .checked_sub(words)
            .ok_or(DecodeError::OutputTooLarge {
                input: self.data.len(),
            })?;
        Ok(())
    }

    /// Fail unless `count` elements of `elem` fit between `pos` and the end
    /// of the buffer. Every element takes at least one head word.
    fn check_room(&self, pos: usize, count: usize, elem: &AbiType) -> Result<(), DecodeError> {
        let needed = count.saturating_mul(elem.head_size().max(WORD));
        let available = self.data.len().saturating_sub(pos);
        if needed > available {
            return Err(DecodeError::OutOfBounds {
                offset: pos,
                needed,
                available,
            });
        }
        Ok(())
    }

    /// Decode a dynamic value whose body begins at `offset`.
    fn dynamic(&mut self, ty: &AbiType, offset: usize) -> Result<Value, DecodeError> {
        match ty {
            AbiType::Bytes => self.byte_string(offset).map(|b| Value::Bytes(b.to_vec())),
            AbiType::String => {
                let bytes = self.byte_string(offset)?;
                String::from_utf8(bytes.to_vec())
                    .map(Value::String)
                    .map_err(|e| DecodeError::InvalidUtf8 {
                        reason: e.to_string(),
                    })
            }
            AbiType::Array {
                elem,
                len: ArrayLen::Dynamic,
            } => {
                let count = read_usize(self.data, offset)?;
                let body = checked_pos(offset, WORD, self.data.len())?;
                self.check_room(body, count, elem)?;
                self.sequence(std::iter::repeat(elem.as_ref()).take(count), count, body)
                    .map(Value::Array)
            }
            _ => self.at(ty, offset),
        }
    }

    /// Length-prefixed byte string: one length word then `ceil(len/32)` words.
    fn byte_string(&mut self, offset: usize) -> Result<&'a [u8], DecodeError> {
        let data = self.data;
        let len = read_usize(data, offset)?;
        let start = checked_pos(offset, WORD, data.len())?;
        let end = checked_pos(start, len, data.len())?;
        let bytes = data.get(start..end).ok_or(DecodeError::OutOfBounds {
            offset: start,
            needed: len,
            available: data.len(),
        })?;
        self.charge(1 + len / WORD)?;
        Ok(bytes)
    }

    /// Decode the body of `ty` located at `pos`.
    fn at(&mut self, ty: &AbiType, pos: usize) -> Result<Value, DecodeError> {
        match ty {
            AbiType::Bytes | AbiType::String | AbiType::Array { len: ArrayLen::Dynamic, .. } => {
                self.dynamic(ty, pos)
            }
            AbiType::Array {
                elem,
                len: ArrayLen::Fixed(n),
            } => {
                self.check_room(pos, *n, elem)?;
                self.sequence(std::iter::repeat(elem.as_ref()).take(*n), *n, pos)
                    .map(Value::Array)
            }
            AbiType::Tuple(fields) => {
                let values = self.sequence(fields.iter().map(|(_, t)| t), fields.len(), pos)?;
                Ok(Value::Tuple(
                    fields
                        .iter()
                        .map(|(name, _)| name.clone())
                        .zip(values)
                        .collect(),
                ))
            }
            scalar => decode_word(scalar, self.data, pos).map(|(v, _)| v),
        }
    }

    /// Decode one head slot at `head`: in place for static types, through
    /// the offset word (relative to `base`) for dynamic ones.
    fn slot(&mut self, ty: &AbiType, base: usize, head: usize) -> Result<Value, DecodeError> {
        if ty.is_dynamic() {
            let rel = read_usize(self.data, head)?;
            let pos = checked_pos(base, rel, self.data.len())?;
            self.dynamic(ty, pos)
        } else {
            self.at(ty, head)
        }
    }

    /// Decode a tuple body of `count` members starting at `base`. Stops at
    /// the first error.
    fn sequence<'t>(
        &mut self,
        types: impl Iterator<Item = &'t AbiType>,
        count: usize,
        base: usize,
    ) -> Result<Vec<Value>, DecodeError> {
        self.charge(count)?;
        let mut out = Vec::new();
        let mut head = base;
        for ty in types {
            out.push(self.slot(ty, base, head)?);
            head = head.saturating_add(ty.head_size());
        }
        Ok(out)
    }
}

/// Decode a dynamic value whose body begins at `offset` (the position the
/// head offset points to).
pub fn decode_dynamic(ty: &AbiType, data: &[u8], offset: usize) -> Result<Value, DecodeError> {
    Reader::new(data).dynamic(ty, offset)
}

/// Decode a parameter list as a tuple body starting at offset 0.
///
/// Each field is decoded independently: a failing field yields a
/// [`FieldError`] and the cursor still advances past its head slot, so the
/// fields around it are unaffected. The output budget is shared by all
/// fields.
pub fn decode_params(params: &[AbiParam], data: &[u8]) -> Vec<Result<Value, FieldError>> {
    let mut reader = Reader::new(data);
    let mut head = 0usize;
    params
        .iter()
        .map(|p| {
            let result = reader
                .slot(&p.ty, 0, head)
                .map_err(|e| FieldError::new(&p.name, p.ty.to_string(), e));
            head = head.saturating_add(p.ty.head_size());
            result
        })
        .collect()
}

/// Decode a tuple body into values, failing on the first bad field.
pub fn decode_types(types: &[AbiType], data: &[u8]) -> Result<Vec<Value>, DecodeError> {
    Reader::new(data).sequence(types.iter(), types.len(), 0)
}

// ─── Encoding ────────────────────────────────────────────────────────────────

/// Reject unsigned values that do not fit in `bits`.
pub fn check_uint(value: U256, bits: u16) -> Result<(), DecodeError> {
    if value.bit_len() > bits as usize {
        return Err(DecodeError::OutOfRange {
            value: value.to_string(),
            ty: format!("uint{bits}"),
        });
    }
    Ok(())
}

/// Reject signed values outside `[-2^(bits-1), 2^(bits-1) - 1]`.
pub fn check_int(value: I256, bits: u16) -> Result<(), DecodeError> {
    if bits >= 256 {
        return Ok(());
    }
    let bound = U256::from(1u8) << (bits as usize - 1);
    let abs = value.unsigned_abs();
    let fits = if value.is_negative() {
        abs <= bound
    } else {
        abs < bound
    };
    if !fits {
        return Err(DecodeError::OutOfRange {
            value: value.to_string(),
            ty: format!("int{bits}"),
        });
    }
    Ok(())
}

fn usize_word(n: usize) -> [u8; WORD] {
    U256::from(n).to_be_bytes::<WORD>()
}

fn mismatch(ty: &AbiType, value: &Value) -> DecodeError {
    DecodeError::TypeMismatch {
        expected: ty.to_string(),
        got: value.kind().to_string(),
    }
}

fn pad_right(out: &mut Vec<u8>, bytes: &[u8]) {
    out.extend_from_slice(bytes);
    let rem = bytes.len() % WORD;
    if rem != 0 {
        out.resize(out.len() + WORD - rem, 0);
    }
}

fn encode_scalar(ty: &AbiType, value: &Value) -> Result<[u8; WORD], DecodeError> {
    let mut word = [0u8; WORD];
    match (ty, value) {
        (AbiType::Uint(bits), Value::Uint(v)) => {
            check_uint(*v, *bits)?;
            word = v.to_be_bytes::<WORD>();
        }
        (AbiType::Int(bits), Value::Int(v)) => {
            check_int(*v, *bits)?;
            // two's complement over the whole word sign-extends narrow types
            word = v.into_raw().to_be_bytes::<WORD>();
        }
        (AbiType::Address, Value::Address(a)) => word[12..].copy_from_slice(a.as_slice()),
        (AbiType::Bool, Value::Bool(b)) => word[WORD - 1] = u8::from(*b),
        (AbiType::FixedBytes(n), Value::FixedBytes(b)) => {
            if b.len() != *n as usize {
                return Err(DecodeError::LengthMismatch {
                    expected: *n as usize,
                    got: b.len(),
                });
            }
            word[..b.len()].copy_from_slice(b);
        }
        _ => return Err(mismatch(ty, value)),
    }
    Ok(word)
}

/// Encode the body of one value.
fn encode_body(ty: &AbiType, value: &Value, out: &mut Vec<u8>) -> Result<(), DecodeError> {
    match (ty, value) {
        (AbiType::Bytes, Value::Bytes(b)) => {
            out.extend_from_slice(&usize_word(b.len()));
            pad_right(out, b);
        }
        (AbiType::String, Value::String(s)) => {
            out.extend_from_slice(&usize_word(s.len()));
            pad_right(out, s.as_bytes());
        }
        (AbiType::Array { elem, len }, Value::Array(items)) => {
            match len {
                ArrayLen::Dynamic => out.extend_from_slice(&usize_word(items.len())),
                ArrayLen::Fixed(n) if *n != items.len() => {
                    return Err(DecodeError::LengthMismatch {
                        expected: *n,
                        got: items.len(),
                    })
                }
                ArrayLen::Fixed(_) => {}
            }
            let types: Vec<&AbiType> = std::iter::repeat(elem.as_ref()).take(items.len()).collect();
            out.extend(encode_sequence(&types, items)?);
        }
        (AbiType::Tuple(fields), Value::Tuple(values)) => {
            if fields.len() != values.len() {
                return Err(DecodeError::LengthMismatch {
                    expected: fields.len(),
                    got: values.len(),
                });
            }
            let types: Vec<&AbiType> = fields.iter().map(|(_, t)| t).collect();
            let values: Vec<Value> = values.iter().map(|(_, v)| v.clone()).collect();
            out.extend(encode_sequence(&types, &values)?);
        }
        (AbiType::Bytes | AbiType::String | AbiType::Array { .. } | AbiType::Tuple(_), _) => {
            return Err(mismatch(ty, value))
        }
        (scalar, _) => out.extend_from_slice(&encode_scalar(scalar, value)?),
    }
    Ok(())
}

fn encode_sequence(types: &[&AbiType], values: &[Value]) -> Result<Vec<u8>, DecodeError> {
    if types.len() != values.len() {
        return Err(DecodeError::LengthMismatch {
            expected: types.len(),
            got: values.len(),
        });
    }
    let head_len = types
        .iter()
        .fold(0usize, |acc, t| acc.saturating_add(t.head_size()));
    let mut head = Vec::with_capacity(head_len);
    let mut tail = Vec::new();
    for (ty, value) in types.iter().zip(values) {
        if ty.is_dynamic() {
            head.extend_from_slice(&usize_word(head_len + tail.len()));
            encode_body(ty, value, &mut tail)?;
        } else {
            encode_body(ty, value, &mut head)?;
        }
    }
    head.extend(tail);
    Ok(head)
}

/// Standard head/tail encoding of `values` as a tuple body of `types`.
pub fn encode_params(types: &[AbiType], values: &[Value]) -> Result<Vec<u8>, DecodeError> {
    let types: Vec<&AbiType> = types.iter().collect();
    encode_sequence(&types, values)
}

/// Encode values whose types are implied by the values themselves:
/// integers as 256-bit, arrays as dynamic arrays of their first element's
/// type.
pub fn encode(values: &[Value]) -> Result<Vec<u8>, DecodeError> {
    let types = values.iter().map(infer_type).collect::<Result<Vec<_>, _>>()?;
    encode_params(&types, values)
}

fn infer_type(value: &Value) -> Result<AbiType, DecodeError> {
    Ok(match value {
        Value::Uint(_) => AbiType::Uint(256),
        Value::Int(_) => AbiType::Int(256),
        Value::Address(_) => AbiType::Address,
        Value::Bool(_) => AbiType::Bool,
        Value::FixedBytes(b) => match u8::try_from(b.len()) {
            Ok(n) if (1..=32).contains(&n) => AbiType::FixedBytes(n),
            _ => {
                return Err(DecodeError::InvalidType {
                    ty: format!("bytes{}", b.len()),
                })
            }
        },
        Value::Bytes(_) => AbiType::Bytes,
        Value::String(_) => AbiType::String,
        Value::Array(items) => AbiType::Array {
            elem: Box::new(match items.first() {
                Some(first) => infer_type(first)?,
                None => AbiType::Uint(256),
            }),
            len: ArrayLen::Dynamic,
        },
        Value::Tuple(fields) => AbiType::Tuple(
            fields
                .iter()
                .map(|(name, v)| Ok((name.clone(), infer_type(v)?)))
                .collect::<Result<_, DecodeError>>()?,
        ),
    })
}
