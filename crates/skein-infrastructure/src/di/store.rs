//! Service Descriptor Store
//!
//! Keyed by service type only. The qualifier is stored on the descriptor and
//! compared at resolve time, so registering a type again under another
//! qualifier replaces the earlier binding.

use dashmap::DashMap;
use skein_domain::value_objects::ServiceKey;
use std::sync::Arc;
use tracing::{debug, warn};

use super::descriptor::ServiceDescriptor;

/// Concurrent key → descriptor map
#[derive(Default)]
pub struct DescriptorStore {
    descriptors: DashMap<ServiceKey, Arc<ServiceDescriptor>>,
}

impl DescriptorStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `descriptor`, returning the one it replaced
    pub fn insert(&self, descriptor: ServiceDescriptor) -> Option<Arc<ServiceDescriptor>> {
        let key = *descriptor.key();
        let qualifier = descriptor.qualifier().to_string();
        let replaced = self.descriptors.insert(key, Arc::new(descriptor));

        if let Some(previous) = &replaced {
            if previous.qualifier() == qualifier {
                debug!(service = %key, "Replaced service descriptor");
            } else {
                warn!(
                    service = %key,
                    previous = previous.qualifier(),
                    current = %qualifier,
                    "Replaced service descriptor under a different qualifier; the previous binding is gone"
                );
            }
        }

        replaced
    }

    /// Descriptor for `key`
    pub fn get(&self, key: &ServiceKey) -> Option<Arc<ServiceDescriptor>> {
        self.descriptors.get(key).map(|entry| Arc::clone(entry.value()))
    }

    /// Whether a descriptor exists for `key`
    pub fn contains(&self, key: &ServiceKey) -> bool {
        self.descriptors.contains_key(key)
    }

    /// Registered keys, sorted by type name
    pub fn keys(&self) -> Vec<ServiceKey> {
        let mut keys: Vec<ServiceKey> = self.descriptors.iter().map(|e| *e.key()).collect();
        keys.sort();
        keys
    }

    /// Number of descriptors
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Whether the store is empty
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}
