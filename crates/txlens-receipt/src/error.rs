use thiserror::Error;
use txlens_rpc::RpcError;

#[derive(Debug, Error)]
pub enum ReceiptError {
    #[error("transaction receipt not found for {tx_hash}; the transaction may not be fully mined yet")]
    NotYetMined { tx_hash: String },

    #[error("transaction {tx_hash} not found")]
    TransactionNotFound { tx_hash: String },

    #[error(transparent)]
    Rpc(#[from] RpcError),
}

impl ReceiptError {
    /// Not-found outcomes, as opposed to upstream failures.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotYetMined { .. } | Self::TransactionNotFound { .. } => true,
            Self::Rpc(e) => e.is_not_found(),
        }
    }
}
