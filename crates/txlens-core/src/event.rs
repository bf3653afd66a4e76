//! Raw logs and decoded events.

use crate::to_hex;
use crate::types::Value;
use alloy_primitives::{Bytes, B256};
use serde::{Deserialize, Serialize};

/// A log entry as emitted during contract execution.
///
/// `topics[0]`, when present, is the event's topic hash; `topics[1..]` hold
/// indexed parameters. Extra fields in RPC payloads (`blockNumber`,
/// `logIndex`, ...) are ignored on ingestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Log {
    pub address: String,
    #[serde(default)]
    pub topics: Vec<B256>,
    #[serde(default)]
    pub data: Bytes,
}

/// One decoded event parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecodedParam {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    /// `None` when the field failed to decode; see `error`.
    pub value: Option<Value>,
    /// The value is `keccak256` of the emitted value (indexed reference type),
    /// carried as the raw 32-byte topic.
    pub is_hash_only: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DecodedParam {
    pub fn ok(name: impl Into<String>, ty: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            value: Some(value),
            is_hash_only: false,
            error: None,
        }
    }

    pub fn hash_only(name: impl Into<String>, ty: impl Into<String>, topic: &B256) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            value: Some(Value::FixedBytes(topic.to_vec())),
            is_hash_only: true,
            error: None,
        }
    }

    pub fn failed(name: impl Into<String>, ty: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            value: None,
            is_hash_only: false,
            error: Some(error.into()),
        }
    }
}

/// An event whose `topics[0]` matched a registered signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchedEvent {
    pub name: String,
    pub address: String,
    /// Canonical signature the event matched, e.g. `Transfer(address,address,uint256)`.
    pub signature: String,
    pub parameters: Vec<DecodedParam>,
}

impl MatchedEvent {
    /// Get a decoded parameter by name.
    pub fn param(&self, name: &str) -> Option<&DecodedParam> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// Returns `true` if any parameter failed to decode.
    pub fn has_errors(&self) -> bool {
        self.parameters.iter().any(|p| p.error.is_some())
    }
}

/// A log that could not be matched, passed through verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawLog {
    /// `topics[0]` as hex, or `"Unknown"` when the log has no topics.
    pub name: String,
    pub address: String,
    pub topics: Vec<B256>,
    pub data: Bytes,
}

/// The decoder's output for one log: either matched and decoded, or the raw
/// log with a best-effort name. Callers must handle both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum DecodedEvent {
    Matched(MatchedEvent),
    Unmatched(RawLog),
}

impl DecodedEvent {
    /// Build the raw fallback for `log`.
    pub fn unmatched(log: &Log) -> Self {
        let name = log
            .topics
            .first()
            .map(to_hex)
            .unwrap_or_else(|| "Unknown".to_string());
        DecodedEvent::Unmatched(RawLog {
            name,
            address: log.address.clone(),
            topics: log.topics.clone(),
            data: log.data.clone(),
        })
    }

    pub fn name(&self) -> &str {
        match self {
            DecodedEvent::Matched(m) => &m.name,
            DecodedEvent::Unmatched(r) => &r.name,
        }
    }

    pub fn is_matched(&self) -> bool {
        matches!(self, DecodedEvent::Matched(_))
    }

    pub fn as_matched(&self) -> Option<&MatchedEvent> {
        match self {
            DecodedEvent::Matched(m) => Some(m),
            DecodedEvent::Unmatched(_) => None,
        }
    }
}
