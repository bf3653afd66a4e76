//! Transport and client error types.

use thiserror::Error;
use txlens_core::Network;

use crate::request::JsonRpcError;

/// Errors that can occur while talking to a node.
#[derive(Debug, Error)]
pub enum TransportError {
    /// HTTP request failed (connection refused, non-2xx status, bad body).
    #[error("HTTP error: {0}")]
    Http(String),

    /// JSON-RPC protocol-level error returned by the node.
    #[error("RPC error {}: {}", .0.code, .0.message)]
    Rpc(JsonRpcError),

    /// The call did not finish within its budget.
    #[error("Request timed out after {ms}ms")]
    Timeout { ms: u64 },

    /// Response could not be deserialized.
    #[error("Deserialization error: {0}")]
    Deserialization(#[from] serde_json::Error),
}

impl TransportError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// Errors surfaced by [`crate::RpcClient`].
///
/// `NotFound` is an expected outcome (e.g. a block the node does not have);
/// `Upstream` means the node could not give an answer at all.
#[derive(Debug, Error)]
pub enum RpcError {
    #[error("{network} node error: {source}")]
    Upstream {
        network: Network,
        #[source]
        source: TransportError,
    },

    #[error("not found: {0}")]
    NotFound(String),
}

impl RpcError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Upstream { source, .. } if source.is_timeout())
    }
}

/// Invalid RPC configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {network} endpoint '{url}': {reason}")]
    InvalidUrl {
        network: Network,
        url: String,
        reason: String,
    },

    #[error("invalid value '{value}' for {var}")]
    InvalidEnv { var: String, value: String },

    #[error("timeout_ms must be greater than zero")]
    ZeroTimeout,

    #[error("cannot build HTTP client: {0}")]
    Client(String),
}
