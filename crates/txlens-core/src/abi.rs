//! ABI type model and ABI item ingestion.
//!
//! JSON ABI arrays are resolved once into [`AbiItem`] values. Parameter type
//! strings (`uint256`, `tuple[]` + `components`, `(address,bytes)[2]`, ...)
//! become [`AbiType`] trees at the same time, so downstream code never
//! re-parses a type string.

use crate::error::DecodeError;
use crate::fingerprint;
use alloy_primitives::B256;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Length of an array type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArrayLen {
    Fixed(usize),
    Dynamic,
}

/// A Solidity ABI type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AbiType {
    /// Unsigned integer; width in bits (8..=256, multiple of 8).
    Uint(u16),
    /// Signed two's-complement integer; width in bits.
    Int(u16),
    Address,
    Bool,
    /// `bytes1` .. `bytes32`; length in bytes.
    FixedBytes(u8),
    /// Dynamic `bytes`.
    Bytes,
    String,
    Array { elem: Box<AbiType>, len: ArrayLen },
    /// Ordered, optionally named components.
    Tuple(Vec<(String, AbiType)>),
}

/// Deepest array and tuple nesting accepted when resolving a type.
pub const MAX_TYPE_DEPTH: usize = 32;

impl AbiType {
    /// A type is dynamic if its encoding lives in the tail section.
    pub fn is_dynamic(&self) -> bool {
        match self {
            AbiType::Bytes | AbiType::String => true,
            AbiType::Array { len: ArrayLen::Dynamic, .. } => true,
            AbiType::Array { elem, len: ArrayLen::Fixed(_) } => elem.is_dynamic(),
            AbiType::Tuple(fields) => fields.iter().any(|(_, t)| t.is_dynamic()),
            _ => false,
        }
    }

    /// Number of bytes this type occupies in the head section of a tuple.
    pub fn head_size(&self) -> usize {
        if self.is_dynamic() {
            return 32;
        }
        match self {
            AbiType::Array { elem, len: ArrayLen::Fixed(n) } => n.saturating_mul(elem.head_size()),
            AbiType::Tuple(fields) => fields
                .iter()
                .fold(0usize, |acc, (_, t)| acc.saturating_add(t.head_size())),
            _ => 32,
        }
    }

    /// Levels of array and tuple nesting; scalars are 0.
    pub fn nesting(&self) -> usize {
        match self {
            AbiType::Array { elem, .. } => 1 + elem.nesting(),
            AbiType::Tuple(fields) => {
                1 + fields.iter().map(|(_, t)| t.nesting()).max().unwrap_or(0)
            }
            _ => 0,
        }
    }

    /// Reference types are stored as `keccak256(value)` when indexed, so the
    /// topic carries a hash rather than the value.
    pub fn is_hashed_when_indexed(&self) -> bool {
        matches!(
            self,
            AbiType::Bytes | AbiType::String | AbiType::Array { .. } | AbiType::Tuple(_)
        )
    }

    /// Resolve a JSON ABI `type` string, expanding `tuple` with `components`.
    pub fn from_json_parts(ty: &str, components: &[AbiParam]) -> Result<Self, DecodeError> {
        let ty = ty.trim();
        match ty.strip_prefix("tuple") {
            Some(suffix) => {
                // an empty tuple has no encoding; `tuple[N]` of it would be free to claim
                if components.is_empty() {
                    return Err(DecodeError::InvalidType { ty: ty.to_string() });
                }
                let base = AbiType::Tuple(
                    components
                        .iter()
                        .map(|c| (c.name.clone(), c.ty.clone()))
                        .collect(),
                );
                apply_array_suffix(base, suffix, ty)
            }
            None => ty.parse(),
        }
    }
}

impl fmt::Display for AbiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbiType::Uint(bits) => write!(f, "uint{bits}"),
            AbiType::Int(bits) => write!(f, "int{bits}"),
            AbiType::Address => write!(f, "address"),
            AbiType::Bool => write!(f, "bool"),
            AbiType::FixedBytes(n) => write!(f, "bytes{n}"),
            AbiType::Bytes => write!(f, "bytes"),
            AbiType::String => write!(f, "string"),
            AbiType::Array { elem, len: ArrayLen::Fixed(n) } => write!(f, "{elem}[{n}]"),
            AbiType::Array { elem, len: ArrayLen::Dynamic } => write!(f, "{elem}[]"),
            AbiType::Tuple(fields) => {
                let parts: Vec<_> = fields.iter().map(|(_, t)| t.to_string()).collect();
                write!(f, "({})", parts.join(","))
            }
        }
    }
}

impl FromStr for AbiType {
    type Err = DecodeError;

    /// Parse a canonical or human-readable type string. Tuple components may
    /// carry names: `(address to, uint256 amount)[]`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_type(s, 0)
    }
}

/// Parse `s` found `depth` levels below the outermost type.
fn parse_type(s: &str, depth: usize) -> Result<AbiType, DecodeError> {
    let s = s.trim();
    let invalid = || DecodeError::InvalidType { ty: s.to_string() };
    if depth > MAX_TYPE_DEPTH {
        return Err(too_deep(s));
    }

    if s.ends_with(']') {
        let open = s.rfind('[').ok_or_else(invalid)?;
        let elem = parse_type(&s[..open], depth + 1)?;
        let len = parse_array_len(&s[open + 1..s.len() - 1]).ok_or_else(invalid)?;
        return Ok(AbiType::Array {
            elem: Box::new(elem),
            len,
        });
    }

    if let Some(inner) = s.strip_prefix('(').and_then(|r| r.strip_suffix(')')) {
        let parts = split_top_level(inner);
        if parts.is_empty() {
            return Err(invalid());
        }
        let mut fields = Vec::new();
        for part in parts {
            let decl = parse_param_decl_at(part, depth + 1)?;
            fields.push((decl.name, decl.ty));
        }
        return Ok(AbiType::Tuple(fields));
    }

    match s {
        "address" => return Ok(AbiType::Address),
        "bool" => return Ok(AbiType::Bool),
        "string" => return Ok(AbiType::String),
        "bytes" => return Ok(AbiType::Bytes),
        "uint" => return Ok(AbiType::Uint(256)),
        "int" => return Ok(AbiType::Int(256)),
        _ => {}
    }

    if let Some(bits) = s.strip_prefix("uint") {
        return parse_int_bits(bits).map(AbiType::Uint).ok_or_else(invalid);
    }
    if let Some(bits) = s.strip_prefix("int") {
        return parse_int_bits(bits).map(AbiType::Int).ok_or_else(invalid);
    }
    if let Some(n) = s.strip_prefix("bytes") {
        return match n.parse::<u8>() {
            Ok(n) if (1..=32).contains(&n) => Ok(AbiType::FixedBytes(n)),
            _ => Err(invalid()),
        };
    }
    Err(invalid())
}

fn too_deep(s: &str) -> DecodeError {
    let head: String = s.chars().take(64).collect();
    DecodeError::InvalidType {
        ty: format!("{head}... (nested deeper than {MAX_TYPE_DEPTH} levels)"),
    }
}

fn parse_int_bits(bits: &str) -> Option<u16> {
    let bits: u16 = bits.parse().ok()?;
    (bits % 8 == 0 && (8..=256).contains(&bits)).then_some(bits)
}

fn parse_array_len(dim: &str) -> Option<ArrayLen> {
    if dim.is_empty() {
        return Some(ArrayLen::Dynamic);
    }
    dim.parse::<usize>().ok().map(ArrayLen::Fixed)
}

/// Wrap `base` in the array dimensions of `suffix`, left to right:
/// `[2][]` on `T` yields `T[2][]`.
fn apply_array_suffix(base: AbiType, suffix: &str, full: &str) -> Result<AbiType, DecodeError> {
    let invalid = || DecodeError::InvalidType { ty: full.to_string() };
    let mut depth = base.nesting();
    let mut ty = base;
    let mut rest = suffix;
    loop {
        if depth > MAX_TYPE_DEPTH {
            return Err(too_deep(full));
        }
        if rest.is_empty() {
            return Ok(ty);
        }
        depth += 1;
        let inner = rest.strip_prefix('[').ok_or_else(invalid)?;
        let close = inner.find(']').ok_or_else(invalid)?;
        let len = parse_array_len(&inner[..close]).ok_or_else(invalid)?;
        ty = AbiType::Array {
            elem: Box::new(ty),
            len,
        };
        rest = &inner[close + 1..];
    }
}

/// Split on commas that are not nested inside parentheses or brackets.
pub(crate) fn split_top_level(s: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (i, c) in s.char_indices() {
        match c {
            '(' | '[' => depth += 1,
            ')' | ']' => depth -= 1,
            ',' if depth == 0 => {
                parts.push(s[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    let last = s[start..].trim();
    if !last.is_empty() || !parts.is_empty() {
        parts.push(last);
    }
    parts
}

/// A parameter declaration inside a human-readable signature:
/// `type [indexed] [name]`.
pub(crate) struct ParamDecl {
    pub ty: AbiType,
    pub indexed: bool,
    pub name: String,
}

pub(crate) fn parse_param_decl(decl: &str) -> Result<ParamDecl, DecodeError> {
    parse_param_decl_at(decl, 0)
}

fn parse_param_decl_at(decl: &str, depth: usize) -> Result<ParamDecl, DecodeError> {
    let decl = decl.trim();
    let type_end = if decl.starts_with('(') {
        let mut depth = 0i32;
        let mut close = None;
        for (i, c) in decl.char_indices() {
            match c {
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth == 0 {
                        close = Some(i);
                        break;
                    }
                }
                _ => {}
            }
        }
        let close = close.ok_or_else(|| DecodeError::InvalidType { ty: decl.to_string() })?;
        // array suffixes directly after the closing paren belong to the type
        let after = &decl[close + 1..];
        let suffix_len = after
            .find(|c: char| c.is_whitespace())
            .unwrap_or(after.len());
        close + 1 + suffix_len
    } else {
        decl.find(char::is_whitespace).unwrap_or(decl.len())
    };

    let ty = parse_type(&decl[..type_end], depth)?;
    let mut indexed = false;
    let mut name = String::new();
    for word in decl[type_end..].split_whitespace() {
        match word {
            "indexed" => indexed = true,
            "memory" | "calldata" | "storage" | "payable" => {}
            other => name = other.to_string(),
        }
    }
    Ok(ParamDecl { ty, indexed, name })
}

// ─── JSON ABI items ──────────────────────────────────────────────────────────

/// A single input/output/event parameter.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawParam")]
pub struct AbiParam {
    pub name: String,
    pub ty: AbiType,
    /// Only meaningful for event inputs.
    pub indexed: bool,
    pub internal_type: Option<String>,
}

impl AbiParam {
    pub fn new(name: impl Into<String>, ty: AbiType, indexed: bool) -> Self {
        Self {
            name: name.into(),
            ty,
            indexed,
            internal_type: None,
        }
    }
}

impl Serialize for AbiParam {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;
        let mut st = serializer.serialize_struct("AbiParam", 3)?;
        st.serialize_field("name", &self.name)?;
        st.serialize_field("type", &self.ty.to_string())?;
        st.serialize_field("indexed", &self.indexed)?;
        st.end()
    }
}

#[derive(Deserialize)]
struct RawParam {
    #[serde(default)]
    name: String,
    #[serde(rename = "type")]
    ty: String,
    #[serde(default)]
    indexed: bool,
    #[serde(default)]
    components: Vec<AbiParam>,
    #[serde(rename = "internalType", default)]
    internal_type: Option<String>,
}

impl TryFrom<RawParam> for AbiParam {
    type Error = DecodeError;

    fn try_from(raw: RawParam) -> Result<Self, Self::Error> {
        Ok(AbiParam {
            ty: AbiType::from_json_parts(&raw.ty, &raw.components)?,
            name: raw.name,
            indexed: raw.indexed,
            internal_type: raw.internal_type,
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateMutability {
    Pure,
    View,
    #[default]
    Nonpayable,
    Payable,
}

/// A `function` ABI entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionDef {
    pub name: String,
    #[serde(default)]
    pub inputs: Vec<AbiParam>,
    #[serde(default)]
    pub outputs: Vec<AbiParam>,
    #[serde(default)]
    pub state_mutability: StateMutability,
    /// Pre-0.5 ABIs mark read functions with `constant: true`.
    #[serde(default, skip_serializing)]
    pub constant: bool,
}

impl FunctionDef {
    /// `name(type1,type2,...)`
    pub fn signature(&self) -> String {
        canonical_signature(&self.name, &self.inputs)
    }

    pub fn selector(&self) -> [u8; 4] {
        fingerprint::selector(&self.signature())
    }

    /// View and pure functions can be served by `eth_call` alone.
    pub fn is_read(&self) -> bool {
        self.constant
            || matches!(
                self.state_mutability,
                StateMutability::View | StateMutability::Pure
            )
    }
}

/// An `event` ABI entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDef {
    pub name: String,
    #[serde(default)]
    pub inputs: Vec<AbiParam>,
    #[serde(default)]
    pub anonymous: bool,
}

impl EventDef {
    pub fn signature(&self) -> String {
        canonical_signature(&self.name, &self.inputs)
    }

    pub fn topic_hash(&self) -> B256 {
        fingerprint::topic_hash(&self.signature())
    }
}

/// A `constructor` ABI entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstructorDef {
    #[serde(default)]
    pub inputs: Vec<AbiParam>,
}

/// One entry of a JSON ABI array, resolved by its `type` tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AbiItem {
    Function(FunctionDef),
    Event(EventDef),
    Constructor(ConstructorDef),
    /// `fallback`, `receive`, `error` and anything newer.
    #[serde(other)]
    Other,
}

impl AbiItem {
    /// Parse a JSON ABI array, skipping (and logging) entries that do not
    /// resolve. A single bad entry never rejects the whole ABI.
    pub fn parse_lenient(abi: &serde_json::Value) -> Vec<AbiItem> {
        let Some(entries) = abi.as_array() else {
            tracing::warn!("ABI is not a JSON array; ignoring");
            return Vec::new();
        };
        entries
            .iter()
            .enumerate()
            .filter_map(|(idx, entry)| match serde_json::from_value::<AbiItem>(entry.clone()) {
                Ok(item) => Some(item),
                Err(e) => {
                    tracing::warn!(index = idx, error = %e, "skipping unresolvable ABI entry");
                    None
                }
            })
            .collect()
    }

    pub fn as_function(&self) -> Option<&FunctionDef> {
        match self {
            AbiItem::Function(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_event(&self) -> Option<&EventDef> {
        match self {
            AbiItem::Event(e) => Some(e),
            _ => None,
        }
    }
}

/// Functions of an ABI sorted by name, then events sorted by name.
pub fn split_items(items: &[AbiItem]) -> (Vec<&FunctionDef>, Vec<&EventDef>) {
    let mut functions: Vec<_> = items.iter().filter_map(AbiItem::as_function).collect();
    let mut events: Vec<_> = items.iter().filter_map(AbiItem::as_event).collect();
    functions.sort_by(|a, b| a.name.cmp(&b.name));
    events.sort_by(|a, b| a.name.cmp(&b.name));
    (functions, events)
}

fn canonical_signature(name: &str, params: &[AbiParam]) -> String {
    let types: Vec<_> = params.iter().map(|p| p.ty.to_string()).collect();
    format!("{name}({})", types.join(","))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_elementary_types() {
        assert_eq!("uint256".parse::<AbiType>().unwrap(), AbiType::Uint(256));
        assert_eq!("uint".parse::<AbiType>().unwrap(), AbiType::Uint(256));
        assert_eq!("int24".parse::<AbiType>().unwrap(), AbiType::Int(24));
        assert_eq!("bytes32".parse::<AbiType>().unwrap(), AbiType::FixedBytes(32));
        assert_eq!("bytes".parse::<AbiType>().unwrap(), AbiType::Bytes);
        assert!("uint7".parse::<AbiType>().is_err());
        assert!("uint264".parse::<AbiType>().is_err());
        assert!("bytes33".parse::<AbiType>().is_err());
        assert!("bytes0".parse::<AbiType>().is_err());
        assert!("float".parse::<AbiType>().is_err());
    }

    #[test]
    fn parse_nested_arrays_and_tuples() {
        let ty: AbiType = "(address,uint256[2])[]".parse().unwrap();
        assert_eq!(ty.to_string(), "(address,uint256[2])[]");
        assert!(ty.is_dynamic());

        let ty: AbiType = "uint8[2][3]".parse().unwrap();
        match &ty {
            AbiType::Array { elem, len: ArrayLen::Fixed(3) } => {
                assert_eq!(**elem, "uint8[2]".parse::<AbiType>().unwrap());
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(ty.head_size(), 6 * 32);
    }

    #[test]
    fn dynamic_ness_is_recursive() {
        assert!(!"(uint256,address)".parse::<AbiType>().unwrap().is_dynamic());
        assert!("(uint256,string)".parse::<AbiType>().unwrap().is_dynamic());
        assert!("string[2]".parse::<AbiType>().unwrap().is_dynamic());
        assert!(!"bytes32[2]".parse::<AbiType>().unwrap().is_dynamic());
        assert_eq!("(uint256,address)".parse::<AbiType>().unwrap().head_size(), 64);
    }

    #[test]
    fn param_decl_with_name_and_indexed() {
        let d = parse_param_decl("address indexed from").unwrap();
        assert_eq!(d.ty, AbiType::Address);
        assert!(d.indexed);
        assert_eq!(d.name, "from");

        let d = parse_param_decl("(address to, uint256 amount)[] orders").unwrap();
        assert_eq!(d.ty.to_string(), "(address,uint256)[]");
        assert_eq!(d.name, "orders");
    }

    #[test]
    fn json_tuple_components() {
        let json = serde_json::json!({
            "name": "order",
            "type": "tuple[]",
            "components": [
                {"name": "maker", "type": "address"},
                {"name": "amounts", "type": "uint256[2]"}
            ]
        });
        let p: AbiParam = serde_json::from_value(json).unwrap();
        assert_eq!(p.ty.to_string(), "(address,uint256[2])[]");
        match p.ty {
            AbiType::Array { elem, .. } => match *elem {
                AbiType::Tuple(fields) => assert_eq!(fields[0].0, "maker"),
                other => panic!("unexpected {other:?}"),
            },
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn deep_nesting_is_rejected() {
        let huge = format!("uint256{}", "[]".repeat(200_000));
        let err = huge.parse::<AbiType>().unwrap_err();
        assert!(matches!(err, DecodeError::InvalidType { .. }));
        assert!(err.to_string().len() < 200);

        let limit = format!("uint256{}", "[]".repeat(MAX_TYPE_DEPTH));
        assert_eq!(limit.parse::<AbiType>().unwrap().nesting(), MAX_TYPE_DEPTH);
        let over = format!("uint256{}", "[]".repeat(MAX_TYPE_DEPTH + 1));
        assert!(over.parse::<AbiType>().is_err());

        let tuples = format!("{}uint256{}", "(".repeat(40), ")".repeat(40));
        assert!(tuples.parse::<AbiType>().is_err());
        assert!(parse_param_decl(&format!("{tuples} deep")).is_err());

        let json = serde_json::json!({
            "name": "x",
            "type": format!("tuple{}", "[]".repeat(200_000)),
            "components": [{"name": "a", "type": "uint256"}]
        });
        assert!(serde_json::from_value::<AbiParam>(json).is_err());

        let abi = serde_json::json!([
            {"type": "event", "name": "Deep", "inputs": [{"name": "x", "type": huge}]},
            {"type": "event", "name": "Ping", "inputs": []}
        ]);
        let items = AbiItem::parse_lenient(&abi);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].as_event().unwrap().name, "Ping");
    }

    #[test]
    fn empty_tuples_are_rejected() {
        assert!("()".parse::<AbiType>().is_err());
        assert!("()[4]".parse::<AbiType>().is_err());
        let json = serde_json::json!({
            "name": "x",
            "type": "tuple[50000000]",
            "components": []
        });
        assert!(serde_json::from_value::<AbiParam>(json).is_err());
    }

    #[test]
    fn abi_items_resolve_by_kind() {
        let abi = serde_json::json!([
            {"type": "function", "name": "balanceOf", "stateMutability": "view",
             "inputs": [{"name": "owner", "type": "address"}],
             "outputs": [{"name": "", "type": "uint256"}]},
            {"type": "event", "name": "Transfer", "anonymous": false, "inputs": [
                {"name": "from", "type": "address", "indexed": true},
                {"name": "to", "type": "address", "indexed": true},
                {"name": "value", "type": "uint256", "indexed": false}
            ]},
            {"type": "constructor", "inputs": []},
            {"type": "error", "name": "Unauthorized", "inputs": []},
            {"type": "receive", "stateMutability": "payable"},
            {"type": "event", "name": "Broken", "inputs": [{"name": "x", "type": "uint7"}]}
        ]);
        let items = AbiItem::parse_lenient(&abi);
        assert_eq!(items.len(), 5);

        let f = items[0].as_function().unwrap();
        assert!(f.is_read());
        assert_eq!(f.signature(), "balanceOf(address)");
        assert_eq!(f.selector(), [0x70, 0xa0, 0x82, 0x31]);

        let e = items[1].as_event().unwrap();
        assert_eq!(e.signature(), "Transfer(address,address,uint256)");
        assert!(e.inputs[0].indexed && !e.inputs[2].indexed);

        assert!(matches!(items[2], AbiItem::Constructor(_)));
        assert_eq!(items[3], AbiItem::Other);
        assert_eq!(items[4], AbiItem::Other);
    }

    #[test]
    fn split_sorts_by_name() {
        let abi = serde_json::json!([
            {"type": "function", "name": "transfer", "inputs": []},
            {"type": "function", "name": "approve", "inputs": []},
        ]);
        let items = AbiItem::parse_lenient(&abi);
        let (functions, events) = split_items(&items);
        assert_eq!(functions[0].name, "approve");
        assert!(!functions[0].is_read());
        assert!(events.is_empty());
    }
}
