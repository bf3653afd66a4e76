//! Copy-on-extend registry views.

use crate::error::RegistryError;
use crate::memory::SignatureRegistry;
use alloy_primitives::B256;
use std::sync::Arc;
use txlens_core::{AbiItem, EventDef, EventSignatureDef, SignatureLookup};

/// A shared base registry plus request-local additions.
///
/// Lookups check the local additions first, so a request ABI overrides the
/// seed for colliding topics. The base is never modified; snapshots taken
/// from the same base never see each other's additions.
#[derive(Debug, Clone)]
pub struct RegistrySnapshot {
    base: Arc<SignatureRegistry>,
    overrides: SignatureRegistry,
}

impl RegistrySnapshot {
    pub fn new(base: Arc<SignatureRegistry>) -> Self {
        Self {
            base,
            overrides: SignatureRegistry::new(),
        }
    }

    pub fn register(&mut self, signature: &str) -> Result<B256, RegistryError> {
        self.overrides.register(signature)
    }

    pub fn register_event(&mut self, event: &EventDef) -> Result<B256, RegistryError> {
        self.overrides.register_event(event)
    }

    /// Register every event of an ABI. Entries that cannot be registered
    /// are logged and skipped. Returns the number registered.
    pub fn register_abi(&mut self, items: &[AbiItem]) -> usize {
        let mut count = 0;
        for event in items.iter().filter_map(AbiItem::as_event) {
            match self.register_event(event) {
                Ok(_) => count += 1,
                Err(e) => tracing::warn!(event = %event.name, error = %e, "skipping ABI event"),
            }
        }
        count
    }

    /// Number of request-local signatures.
    pub fn local_len(&self) -> usize {
        self.overrides.len()
    }
}

impl SignatureLookup for RegistrySnapshot {
    fn lookup(&self, topic_hash: &B256) -> Option<Arc<EventSignatureDef>> {
        self.overrides
            .get(topic_hash)
            .or_else(|| self.base.get(topic_hash))
    }
}
