//! `txlens receipt`: fetch a transaction receipt and print it normalized,
//! events decoded.

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use txlens_core::{validate, Network};
use txlens_receipt::ReceiptService;
use txlens_rpc::RpcClient;

use crate::cmd_abi;
use crate::config::AppConfig;

pub async fn run(
    config: &AppConfig,
    tx_hash: &str,
    network: Network,
    abi_path: Option<&Path>,
) -> Result<()> {
    let hash = validate::tx_hash(tx_hash)?;
    let abi = cmd_abi::load_optional(abi_path)?;
    let rpc = Arc::new(RpcClient::from_config(&config.rpc)?);
    let service = ReceiptService::new(rpc);

    // ReceiptError is returned as-is so main can map not-found to its exit code
    let receipt = service
        .fetch(&hash, network, (!abi.is_empty()).then_some(abi.as_slice()))
        .await?;
    crate::print_json(&receipt)
}
