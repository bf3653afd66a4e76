//! # txlens-registry
//!
//! Event signature registry: topic hash → [`txlens_core::EventSignatureDef`].
//!
//! - [`SignatureRegistry`]: plain map, with a seeded process-wide instance
//! - [`RegistrySnapshot`]: the shared instance plus request-local signatures

pub mod error;
pub mod memory;
pub mod seed;
pub mod snapshot;

pub use error::RegistryError;
pub use memory::SignatureRegistry;
pub use snapshot::RegistrySnapshot;
