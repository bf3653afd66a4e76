//! Network-keyed JSON-RPC client.

use alloy_primitives::{Address, Bytes, B256};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use txlens_core::{to_hex, Network};

use crate::config::RpcConfig;
use crate::error::{ConfigError, RpcError, TransportError};
use crate::http::HttpTransport;
use crate::request::JsonRpcRequest;
use crate::transport::RpcTransport;
use crate::types::{RawBlock, RawReceipt, RawTransaction};

/// One transport per network. Every call gets its own timeout and is
/// attempted exactly once.
pub struct RpcClient {
    mainnet: Arc<dyn RpcTransport>,
    testnet: Arc<dyn RpcTransport>,
    timeout: Duration,
    next_id: AtomicU64,
}

impl RpcClient {
    pub fn new(
        mainnet: Arc<dyn RpcTransport>,
        testnet: Arc<dyn RpcTransport>,
        timeout: Duration,
    ) -> Self {
        Self {
            mainnet,
            testnet,
            timeout,
            next_id: AtomicU64::new(1),
        }
    }

    /// HTTP transports for both configured endpoints.
    pub fn from_config(config: &RpcConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let build = |network: Network| -> Result<Arc<dyn RpcTransport>, ConfigError> {
            let transport = HttpTransport::new(config.url_for(network), config.timeout())
                .map_err(|e| ConfigError::Client(e.to_string()))?;
            Ok(Arc::new(transport))
        };
        Ok(Self::new(
            build(Network::Mainnet)?,
            build(Network::Testnet)?,
            config.timeout(),
        ))
    }

    fn transport(&self, network: Network) -> &Arc<dyn RpcTransport> {
        match network {
            Network::Mainnet => &self.mainnet,
            Network::Testnet => &self.testnet,
        }
    }

    /// Send one request and deserialize its result.
    pub async fn request<T: DeserializeOwned>(
        &self,
        network: Network,
        method: &str,
        params: Vec<Value>,
    ) -> Result<T, RpcError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let transport = self.transport(network);
        let started = Instant::now();

        let outcome = match tokio::time::timeout(
            self.timeout,
            transport.send(JsonRpcRequest::new(id, method, params)),
        )
        .await
        {
            Ok(sent) => sent,
            Err(_) => Err(TransportError::Timeout {
                ms: self.timeout.as_millis() as u64,
            }),
        }
        .and_then(|resp| resp.into_result().map_err(TransportError::Rpc))
        .and_then(|value| serde_json::from_value::<T>(value).map_err(TransportError::from));

        let elapsed_ms = started.elapsed().as_millis() as u64;
        match outcome {
            Ok(value) => {
                tracing::info!(method, network = %network, elapsed_ms, "rpc call");
                Ok(value)
            }
            Err(e) => {
                tracing::warn!(
                    method,
                    network = %network,
                    elapsed_ms,
                    url = transport.url(),
                    error = %e,
                    "rpc call failed"
                );
                Err(RpcError::Upstream { network, source: e })
            }
        }
    }

    /// `None` when the node has no receipt yet (pending or unknown hash).
    pub async fn get_transaction_receipt(
        &self,
        tx_hash: &B256,
        network: Network,
    ) -> Result<Option<RawReceipt>, RpcError> {
        self.request(network, "eth_getTransactionReceipt", vec![json!(to_hex(tx_hash))])
            .await
    }

    pub async fn get_transaction(
        &self,
        tx_hash: &B256,
        network: Network,
    ) -> Result<Option<RawTransaction>, RpcError> {
        self.request(network, "eth_getTransactionByHash", vec![json!(to_hex(tx_hash))])
            .await
    }

    /// Block timestamp in seconds since the epoch.
    pub async fn get_block_timestamp(
        &self,
        block_number: u64,
        network: Network,
    ) -> Result<u64, RpcError> {
        let block: Option<RawBlock> = self
            .request(
                network,
                "eth_getBlockByNumber",
                vec![json!(format!("0x{block_number:x}")), json!(false)],
            )
            .await?;
        block
            .map(|b| b.timestamp)
            .ok_or_else(|| RpcError::NotFound(format!("block {block_number} on {network}")))
    }

    /// `eth_call` against the latest block.
    pub async fn call(&self, to: &Address, data: &[u8], network: Network) -> Result<Bytes, RpcError> {
        self.request(
            network,
            "eth_call",
            vec![json!({ "to": to_hex(to), "data": to_hex(data) }), json!("latest")],
        )
        .await
    }

    /// Deployed bytecode at `address`; empty for accounts without code.
    pub async fn get_code(&self, address: &Address, network: Network) -> Result<Bytes, RpcError> {
        self.request(network, "eth_getCode", vec![json!(to_hex(address)), json!("latest")])
            .await
    }
}
