//! The `RpcTransport` trait: how a request reaches a node.

use async_trait::async_trait;

use crate::error::TransportError;
use crate::request::{JsonRpcRequest, JsonRpcResponse};

/// One JSON-RPC endpoint.
///
/// Implementations must be `Send + Sync` so a client can hold them as
/// `Arc<dyn RpcTransport>` and share them across tasks. Tests substitute an
/// in-memory implementation.
#[async_trait]
pub trait RpcTransport: Send + Sync + 'static {
    /// Send a single JSON-RPC request and return the response.
    async fn send(&self, req: JsonRpcRequest) -> Result<JsonRpcResponse, TransportError>;

    /// Return the transport's identifier (URL or name).
    fn url(&self) -> &str;
}
