//! The process-wide signature registry.
//!
//! Built once, then only read. Request-specific signatures go into a
//! [`RegistrySnapshot`] layered on top.

use crate::error::RegistryError;
use crate::seed::SEED_SIGNATURES;
use crate::snapshot::RegistrySnapshot;
use alloy_primitives::B256;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};
use txlens_core::{EventDef, EventSignatureDef, SignatureLookup};

static GLOBAL: OnceLock<Arc<SignatureRegistry>> = OnceLock::new();

/// Topic hash → event definition.
#[derive(Debug, Default, Clone)]
pub struct SignatureRegistry {
    by_topic: HashMap<B256, Arc<EventSignatureDef>>,
}

impl SignatureRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the well-known seed signatures.
    pub fn seeded() -> Self {
        let mut registry = Self::new();
        for sig in SEED_SIGNATURES {
            if let Err(e) = registry.register(sig) {
                tracing::warn!(signature = sig, error = %e, "skipping seed signature");
            }
        }
        tracing::debug!(count = registry.len(), "seed signature registry built");
        registry
    }

    /// The shared seeded registry, built on first use.
    pub fn global() -> Arc<SignatureRegistry> {
        GLOBAL.get_or_init(|| Arc::new(Self::seeded())).clone()
    }

    /// Register a signature string (canonical or human-readable).
    ///
    /// Re-registering the same topic replaces the previous entry.
    pub fn register(&mut self, signature: &str) -> Result<B256, RegistryError> {
        let def = EventSignatureDef::parse(signature)?;
        Ok(self.insert(def))
    }

    /// Register a JSON ABI event entry.
    pub fn register_event(&mut self, event: &EventDef) -> Result<B256, RegistryError> {
        if event.anonymous {
            return Err(RegistryError::Anonymous {
                name: event.name.clone(),
            });
        }
        Ok(self.insert(EventSignatureDef::from_event(event)))
    }

    pub(crate) fn insert(&mut self, def: EventSignatureDef) -> B256 {
        let topic = def.topic_hash;
        if let Some(prev) = self.by_topic.insert(topic, Arc::new(def)) {
            tracing::trace!(topic = %topic, replaced = %prev.canonical_signature, "signature replaced");
        }
        topic
    }

    pub fn get(&self, topic_hash: &B256) -> Option<Arc<EventSignatureDef>> {
        self.by_topic.get(topic_hash).cloned()
    }

    /// Returns the number of registered signatures.
    pub fn len(&self) -> usize {
        self.by_topic.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_topic.is_empty()
    }

    /// A copy-on-extend view over this registry.
    pub fn snapshot(self: &Arc<Self>) -> RegistrySnapshot {
        RegistrySnapshot::new(Arc::clone(self))
    }
}

impl SignatureLookup for SignatureRegistry {
    fn lookup(&self, topic_hash: &B256) -> Option<Arc<EventSignatureDef>> {
        self.get(topic_hash)
    }
}
