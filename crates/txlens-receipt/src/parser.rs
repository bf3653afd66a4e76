//! Receipt normalization.

use alloy_primitives::U256;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use std::sync::Arc;
use txlens_core::{AbiItem, DecodedEvent, Log};
use txlens_evm::EventDecoder;
use txlens_registry::SignatureRegistry;
use txlens_rpc::{RawReceipt, RawTransaction};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReceiptStatus {
    Success,
    Failed,
}

/// The stable output shape for a mined transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedReceipt {
    pub transaction_hash: String,
    /// Decimal string.
    pub block_number: String,
    pub block_hash: String,
    pub transaction_index: u64,
    pub from: String,
    pub to: Option<String>,
    pub gas_used: String,
    pub effective_gas_price: String,
    pub status: ReceiptStatus,
    /// ISO-8601 UTC, second precision.
    pub timestamp: String,
    pub events: Vec<DecodedEvent>,
    pub logs: Vec<Log>,
}

/// Decimal gas units, no unit conversion.
pub fn format_gas_used(gas: U256) -> String {
    gas.to_string()
}

/// Decimal wei, no unit conversion.
pub fn format_gas_price(price: U256) -> String {
    price.to_string()
}

/// `YYYY-MM-DDTHH:MM:SSZ`. Seconds beyond chrono's range are returned as
/// the bare number.
pub fn format_timestamp(epoch_seconds: u64) -> String {
    i64::try_from(epoch_seconds)
        .ok()
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_else(|| epoch_seconds.to_string())
}

/// `1` is success; `0`, any other code, or no status at all is failure.
pub fn map_status(code: Option<u64>) -> ReceiptStatus {
    match code {
        Some(1) => ReceiptStatus::Success,
        _ => ReceiptStatus::Failed,
    }
}

/// Turns raw receipts into [`NormalizedReceipt`]s, decoding their logs
/// against a base registry plus the request's ABI.
#[derive(Debug, Clone)]
pub struct ReceiptParser {
    registry: Arc<SignatureRegistry>,
    decoder: EventDecoder,
}

impl Default for ReceiptParser {
    fn default() -> Self {
        Self::new(SignatureRegistry::global())
    }
}

impl ReceiptParser {
    pub fn new(registry: Arc<SignatureRegistry>) -> Self {
        Self {
            registry,
            decoder: EventDecoder::new(),
        }
    }

    /// Decode `logs` in order. ABI events are visible to this call only.
    pub fn parse_events(&self, logs: &[Log], abi: Option<&[AbiItem]>) -> Vec<DecodedEvent> {
        let mut snapshot = self.registry.snapshot();
        if let Some(items) = abi {
            let added = snapshot.register_abi(items);
            tracing::debug!(added, "request ABI events registered");
        }
        self.decoder.decode_batch(logs, &snapshot)
    }

    pub fn normalize(
        &self,
        receipt: &RawReceipt,
        tx: &RawTransaction,
        timestamp: u64,
        abi: Option<&[AbiItem]>,
    ) -> NormalizedReceipt {
        // legacy receipts carry no effectiveGasPrice; the tx gasPrice is what was paid
        let gas_price = receipt
            .effective_gas_price
            .or(tx.gas_price)
            .unwrap_or_default();
        NormalizedReceipt {
            transaction_hash: receipt.transaction_hash.clone(),
            block_number: receipt.block_number.to_string(),
            block_hash: receipt.block_hash.clone(),
            transaction_index: receipt.transaction_index,
            from: receipt.from.clone(),
            to: receipt.to.clone(),
            gas_used: format_gas_used(receipt.gas_used),
            effective_gas_price: format_gas_price(gas_price),
            status: map_status(receipt.status),
            timestamp: format_timestamp(timestamp),
            events: self.parse_events(&receipt.logs, abi),
            logs: receipt.logs.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{Bytes, B256};
    use txlens_core::topic_hash;

    fn receipt(status: Option<u64>, logs: Vec<Log>) -> RawReceipt {
        RawReceipt {
            transaction_hash: format!("0x{}", "ab".repeat(32)),
            block_number: 5_000_000,
            block_hash: format!("0x{}", "cd".repeat(32)),
            transaction_index: 3,
            from: "0x1111111111111111111111111111111111111111".into(),
            to: Some("0x2222222222222222222222222222222222222222".into()),
            contract_address: None,
            gas_used: U256::from(21_000u32),
            cumulative_gas_used: None,
            effective_gas_price: None,
            status,
            logs,
        }
    }

    fn tx() -> RawTransaction {
        RawTransaction {
            hash: format!("0x{}", "ab".repeat(32)),
            from: "0x1111111111111111111111111111111111111111".into(),
            to: Some("0x2222222222222222222222222222222222222222".into()),
            nonce: 0,
            value: U256::ZERO,
            gas: U256::from(21_000u32),
            gas_price: Some(U256::from(60_000_000u64)),
            input: Bytes::new(),
            block_number: Some(5_000_000),
        }
    }

    #[test]
    fn formatting() {
        assert_eq!(format_gas_used(U256::from(21_000u32)), "21000");
        assert_eq!(format_gas_price(U256::from(1_000_000_000u64)), "1000000000");
        assert_eq!(format_timestamp(0), "1970-01-01T00:00:00Z");
        assert_eq!(format_timestamp(1_700_000_000), "2023-11-14T22:13:20Z");
        assert_eq!(format_timestamp(u64::MAX), u64::MAX.to_string());
        assert_eq!(map_status(Some(1)), ReceiptStatus::Success);
        assert_eq!(map_status(Some(0)), ReceiptStatus::Failed);
        assert_eq!(map_status(Some(2)), ReceiptStatus::Failed);
        assert_eq!(map_status(None), ReceiptStatus::Failed);
    }

    #[test]
    fn simple_transfer_receipt() {
        let parser = ReceiptParser::default();
        let out = parser.normalize(&receipt(Some(1), vec![]), &tx(), 0, None);
        assert_eq!(out.status, ReceiptStatus::Success);
        assert_eq!(out.gas_used, "21000");
        assert_eq!(out.timestamp, "1970-01-01T00:00:00Z");
        assert_eq!(out.block_number, "5000000");
        assert_eq!(out.effective_gas_price, "60000000");
        assert!(out.events.is_empty());

        let json = serde_json::to_value(&out).unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["transactionIndex"], 3);
        assert_eq!(json["gasUsed"], "21000");
        assert!(json.get("effectiveGasPrice").is_some());
    }

    #[test]
    fn request_abi_applies_to_one_call_only() {
        let ping = topic_hash("Ping(uint256)");
        let mut data = vec![0u8; 32];
        data[31] = 9;
        let log = Log {
            address: "0x01".into(),
            topics: vec![ping],
            data: Bytes::from(data),
        };
        let abi = AbiItem::parse_lenient(&serde_json::json!([
            {"type": "event", "name": "Ping", "inputs": [{"name": "n", "type": "uint256"}]}
        ]));

        let parser = ReceiptParser::new(Arc::new(SignatureRegistry::seeded()));
        let with_abi = parser.parse_events(std::slice::from_ref(&log), Some(&abi));
        assert_eq!(with_abi[0].name(), "Ping");
        let without = parser.parse_events(std::slice::from_ref(&log), None);
        assert!(!without[0].is_matched());
        assert_eq!(without[0].name(), txlens_core::to_hex(ping));
        assert_ne!(ping, B256::ZERO);
    }
}
