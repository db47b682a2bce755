//! Spawn registry: handle to request, in spawn order

use super::PlacementRequest;
use crate::foundation::collections::InstanceHandle;
use std::collections::HashMap;

#[derive(Debug, Clone)]
struct RegistryEntry {
    sequence: u64,
    request: PlacementRequest,
}

/// Handles created by one composer and the requests that produced them
///
/// Process-local and unsynchronized. Iteration helpers return entries in the
/// order they were registered.
#[derive(Debug, Clone, Default)]
pub struct SpawnRegistry {
    entries: HashMap<InstanceHandle, RegistryEntry>,
    next_sequence: u64,
}

impl SpawnRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a created instance
    ///
    /// Re-registering a handle replaces its request but keeps it in place in
    /// the spawn order.
    pub fn insert(&mut self, handle: InstanceHandle, request: PlacementRequest) {
        if let Some(entry) = self.entries.get_mut(&handle) {
            log::warn!("Handle {} registered twice; replacing its request", handle);
            entry.request = request;
            return;
        }

        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.entries.insert(handle, RegistryEntry { sequence, request });
    }

    /// Forget a handle, returning its request
    pub fn remove(&mut self, handle: InstanceHandle) -> Option<PlacementRequest> {
        self.entries.remove(&handle).map(|entry| entry.request)
    }

    /// Request that produced `handle`
    pub fn get(&self, handle: InstanceHandle) -> Option<&PlacementRequest> {
        self.entries.get(&handle).map(|entry| &entry.request)
    }

    /// Whether `handle` is registered
    pub fn contains(&self, handle: InstanceHandle) -> bool {
        self.entries.contains_key(&handle)
    }

    /// Number of registered handles
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is registered
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in spawn order
    pub fn iter_in_spawn_order(&self) -> Vec<(InstanceHandle, &PlacementRequest)> {
        let mut ordered: Vec<_> = self.entries.iter().collect();
        ordered.sort_by_key(|(_, entry)| entry.sequence);
        ordered.into_iter().map(|(handle, entry)| (*handle, &entry.request)).collect()
    }

    /// Handles in spawn order
    pub fn handles(&self) -> Vec<InstanceHandle> {
        self.iter_in_spawn_order().into_iter().map(|(handle, _)| handle).collect()
    }

    /// Remove every entry, returning them in spawn order
    pub fn drain(&mut self) -> Vec<(InstanceHandle, PlacementRequest)> {
        let mut drained: Vec<_> = self.entries.drain().collect();
        drained.sort_by_key(|(_, entry)| entry.sequence);
        drained.into_iter().map(|(handle, entry)| (handle, entry.request)).collect()
    }
}
