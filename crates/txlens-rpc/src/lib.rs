//! # txlens-rpc
//!
//! JSON-RPC access to the mainnet and testnet nodes.
//!
//! - [`RpcTransport`]: object-safe trait over one endpoint
//! - [`HttpTransport`]: `reqwest` implementation
//! - [`RpcClient`]: picks the transport by [`txlens_core::Network`], applies a
//!   per-call timeout, separates not-found from upstream failure

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod request;
pub mod transport;
pub mod types;

pub use client::RpcClient;
pub use config::RpcConfig;
pub use error::{ConfigError, RpcError, TransportError};
pub use http::HttpTransport;
pub use request::{JsonRpcError, JsonRpcRequest, JsonRpcResponse};
pub use transport::RpcTransport;
pub use types::{RawBlock, RawReceipt, RawTransaction};
