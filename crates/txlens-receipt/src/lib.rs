//! # txlens-receipt
//!
//! Raw receipt + transaction + block timestamp → [`NormalizedReceipt`].

pub mod error;
pub mod parser;
pub mod service;

pub use error::ReceiptError;
pub use parser::{
    format_gas_price, format_gas_used, format_timestamp, map_status, NormalizedReceipt,
    ReceiptParser, ReceiptStatus,
};
pub use service::ReceiptService;
