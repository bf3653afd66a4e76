//! Event signature definitions and the lookup trait the decoder consumes.

use crate::abi::{parse_param_decl, split_top_level, AbiParam, EventDef};
use crate::error::DecodeError;
use crate::fingerprint;
use alloy_primitives::B256;
use std::sync::Arc;

/// A resolved event signature: name, canonical form, topic hash and the
/// ordered parameter list.
///
/// Invariant: `topic_hash == keccak256(canonical_signature)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventSignatureDef {
    pub name: String,
    pub canonical_signature: String,
    pub topic_hash: B256,
    pub parameters: Vec<AbiParam>,
}

impl EventSignatureDef {
    /// Build from a JSON ABI event entry.
    pub fn from_event(def: &EventDef) -> Self {
        let canonical_signature = def.signature();
        Self {
            name: def.name.clone(),
            topic_hash: fingerprint::topic_hash(&canonical_signature),
            canonical_signature,
            parameters: def.inputs.clone(),
        }
    }

    /// Parse a signature string.
    ///
    /// Accepts both the canonical form `Transfer(address,address,uint256)`
    /// and the human-readable form
    /// `event Transfer(address indexed from, address indexed to, uint256 value)`.
    /// Parameters without a name are called `arg0`, `arg1`, ...
    pub fn parse(signature: &str) -> Result<Self, DecodeError> {
        let invalid = |reason: &str| DecodeError::InvalidSignature {
            signature: signature.to_string(),
            reason: reason.to_string(),
        };

        let sig = signature.trim();
        let sig = sig.strip_prefix("event ").unwrap_or(sig).trim();
        let open = sig.find('(').ok_or_else(|| invalid("missing '('"))?;
        let close = sig.rfind(')').ok_or_else(|| invalid("missing ')'"))?;
        if close < open {
            return Err(invalid("unbalanced parentheses"));
        }

        let name = sig[..open].trim();
        if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$') {
            return Err(invalid("invalid event name"));
        }

        let mut parameters = Vec::new();
        for (i, part) in split_top_level(&sig[open + 1..close]).into_iter().enumerate() {
            let decl = parse_param_decl(part).map_err(|e| invalid(&e.to_string()))?;
            let name = if decl.name.is_empty() {
                format!("arg{i}")
            } else {
                decl.name
            };
            parameters.push(AbiParam::new(name, decl.ty, decl.indexed));
        }

        let types: Vec<_> = parameters.iter().map(|p| p.ty.to_string()).collect();
        let canonical_signature = format!("{name}({})", types.join(","));
        Ok(Self {
            name: name.to_string(),
            topic_hash: fingerprint::topic_hash(&canonical_signature),
            canonical_signature,
            parameters,
        })
    }

    /// Parameters carried in `topics[1..]`, in declaration order.
    pub fn indexed_params(&self) -> impl Iterator<Item = &AbiParam> {
        self.parameters.iter().filter(|p| p.indexed)
    }

    /// Parameters carried in the `data` payload, in declaration order.
    pub fn data_params(&self) -> impl Iterator<Item = &AbiParam> {
        self.parameters.iter().filter(|p| !p.indexed)
    }
}

/// Canonical form of an event or function signature.
///
/// `function transfer(address to, uint256 amount) external returns (bool)`
/// becomes `transfer(address,uint256)`; an already canonical string comes
/// back unchanged.
pub fn canonicalize(signature: &str) -> Result<String, DecodeError> {
    let sig = signature.trim();
    let sig = sig.strip_prefix("function ").unwrap_or(sig);
    let sig = match sig.find(" returns") {
        Some(idx) => &sig[..idx],
        None => sig,
    };
    EventSignatureDef::parse(sig).map(|def| def.canonical_signature)
}

/// A thread-safe, read-only view of registered event signatures.
/// Concrete implementations live in `txlens-registry`.
pub trait SignatureLookup: Send + Sync {
    /// Look up a definition by its topic hash (`topics[0]`).
    fn lookup(&self, topic_hash: &B256) -> Option<Arc<EventSignatureDef>>;
}
