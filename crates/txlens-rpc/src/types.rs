//! Receipt, transaction and block shapes as returned by `eth_*` methods.
//!
//! Only the fields the receipt pipeline reads are modelled; everything
//! else in the node's payload is ignored.

use alloy_primitives::{Bytes, U256};
use serde::Deserialize;
use txlens_core::Log;

/// `eth_getTransactionReceipt` result.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawReceipt {
    pub transaction_hash: String,
    #[serde(with = "quantity")]
    pub block_number: u64,
    pub block_hash: String,
    #[serde(with = "quantity")]
    pub transaction_index: u64,
    pub from: String,
    /// `None` for contract creations.
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub contract_address: Option<String>,
    #[serde(with = "quantity")]
    pub gas_used: U256,
    #[serde(default, with = "quantity::option")]
    pub cumulative_gas_used: Option<U256>,
    /// Absent on nodes that predate EIP-1559 receipts.
    #[serde(default, with = "quantity::option")]
    pub effective_gas_price: Option<U256>,
    /// `0x1` success, `0x0` failure; absent on pre-Byzantium receipts.
    #[serde(default, with = "quantity::option")]
    pub status: Option<u64>,
    #[serde(default)]
    pub logs: Vec<Log>,
}

/// `eth_getTransactionByHash` result.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTransaction {
    pub hash: String,
    pub from: String,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(with = "quantity")]
    pub nonce: u64,
    #[serde(with = "quantity")]
    pub value: U256,
    #[serde(with = "quantity")]
    pub gas: U256,
    #[serde(default, with = "quantity::option")]
    pub gas_price: Option<U256>,
    #[serde(default)]
    pub input: Bytes,
    /// `None` while pending.
    #[serde(default, with = "quantity::option")]
    pub block_number: Option<u64>,
}

/// The subset of `eth_getBlockByNumber` the pipeline reads.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawBlock {
    #[serde(with = "quantity")]
    pub number: u64,
    #[serde(default)]
    pub hash: Option<String>,
    #[serde(with = "quantity")]
    pub timestamp: u64,
}

/// `0x`-prefixed hex quantities (`"0x5208"`).
pub mod quantity {
    use alloy_primitives::U256;
    use serde::{Deserialize, Deserializer};

    pub trait Quantity: Sized {
        fn from_hex(digits: &str) -> Result<Self, String>;
    }

    impl Quantity for u64 {
        fn from_hex(digits: &str) -> Result<Self, String> {
            u64::from_str_radix(digits, 16).map_err(|e| e.to_string())
        }
    }

    impl Quantity for U256 {
        fn from_hex(digits: &str) -> Result<Self, String> {
            U256::from_str_radix(digits, 16).map_err(|e| e.to_string())
        }
    }

    pub fn parse<T: Quantity>(s: &str) -> Result<T, String> {
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .ok_or_else(|| format!("quantity '{s}' is missing the 0x prefix"))?;
        if digits.is_empty() {
            return Err(format!("empty quantity '{s}'"));
        }
        T::from_hex(digits).map_err(|e| format!("invalid quantity '{s}': {e}"))
    }

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: Quantity,
    {
        let s = String::deserialize(deserializer)?;
        parse(&s).map_err(serde::de::Error::custom)
    }

    pub mod option {
        use super::{parse, Quantity};
        use serde::{Deserialize, Deserializer};

        pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
        where
            D: Deserializer<'de>,
            T: Quantity,
        {
            match Option::<String>::deserialize(deserializer)? {
                Some(s) => parse(&s).map(Some).map_err(serde::de::Error::custom),
                None => Ok(None),
            }
        }
    }
}
