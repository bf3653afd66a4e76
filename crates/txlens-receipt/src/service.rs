//! Receipt lookup: RPC fetch plus normalization.

use alloy_primitives::B256;
use std::sync::Arc;
use txlens_core::{to_hex, AbiItem, Network};
use txlens_rpc::RpcClient;

use crate::error::ReceiptError;
use crate::parser::{NormalizedReceipt, ReceiptParser};

pub struct ReceiptService {
    rpc: Arc<RpcClient>,
    parser: ReceiptParser,
}

impl ReceiptService {
    pub fn new(rpc: Arc<RpcClient>) -> Self {
        Self::with_parser(rpc, ReceiptParser::default())
    }

    pub fn with_parser(rpc: Arc<RpcClient>, parser: ReceiptParser) -> Self {
        Self { rpc, parser }
    }

    /// Fetch and normalize the receipt of `tx_hash`.
    ///
    /// Receipt and transaction are requested concurrently; the block
    /// timestamp follows once the receipt names its block.
    pub async fn fetch(
        &self,
        tx_hash: &B256,
        network: Network,
        abi: Option<&[AbiItem]>,
    ) -> Result<NormalizedReceipt, ReceiptError> {
        let (receipt, tx) = futures::join!(
            self.rpc.get_transaction_receipt(tx_hash, network),
            self.rpc.get_transaction(tx_hash, network),
        );

        let receipt = receipt?.ok_or_else(|| ReceiptError::NotYetMined {
            tx_hash: to_hex(tx_hash),
        })?;
        let tx = tx?.ok_or_else(|| ReceiptError::TransactionNotFound {
            tx_hash: to_hex(tx_hash),
        })?;
        let timestamp = self
            .rpc
            .get_block_timestamp(receipt.block_number, network)
            .await?;

        tracing::debug!(
            tx_hash = %tx_hash,
            network = %network,
            logs = receipt.logs.len(),
            "normalizing receipt"
        );
        Ok(self.parser.normalize(&receipt, &tx, timestamp, abi))
    }
}
