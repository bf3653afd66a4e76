use thiserror::Error;
use txlens_core::DecodeError;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("invalid signature: {0}")]
    InvalidSignature(#[from] DecodeError),

    #[error("event '{name}' is anonymous and has no topic-0 signature")]
    Anonymous { name: String },
}
