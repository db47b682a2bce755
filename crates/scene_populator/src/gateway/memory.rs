//! In-memory world used for dry runs and tests

use super::{GatewayError, InstantiationGateway};
use crate::foundation::collections::{HandleMap, InstanceHandle};
use crate::foundation::math::Pose;
use std::collections::HashSet;

/// One instance living in an [`InMemoryWorld`]
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedInstance {
    /// Asset the instance was created from
    pub asset_reference: String,
    /// Where it was placed
    pub pose: Pose,
}

/// Slot-map backed world that records what was placed
///
/// Handles are slot map keys, so a destroyed handle never aliases a later
/// instance. Asset references registered with [`fail_on`](Self::fail_on)
/// are refused, which lets tests exercise per-item failure handling.
#[derive(Debug, Default)]
pub struct InMemoryWorld {
    instances: HandleMap<PlacedInstance>,
    failing_assets: HashSet<String>,
    created_total: usize,
    destroyed_total: usize,
}

impl InMemoryWorld {
    /// Create an empty world
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse every future instantiation of `asset_reference`
    pub fn fail_on(&mut self, asset_reference: impl Into<String>) {
        self.failing_assets.insert(asset_reference.into());
    }

    /// Builder form of [`fail_on`](Self::fail_on)
    #[must_use]
    pub fn with_failing_asset(mut self, asset_reference: impl Into<String>) -> Self {
        self.fail_on(asset_reference);
        self
    }

    /// Look up a live instance
    pub fn get(&self, handle: InstanceHandle) -> Option<&PlacedInstance> {
        self.instances.get(handle.to_key())
    }

    /// Whether the handle names a live instance
    pub fn contains(&self, handle: InstanceHandle) -> bool {
        self.instances.contains_key(handle.to_key())
    }

    /// Live instances
    pub fn instances(&self) -> impl Iterator<Item = (InstanceHandle, &PlacedInstance)> {
        self.instances.iter().map(|(key, instance)| (InstanceHandle::from_key(key), instance))
    }

    /// Number of live instances
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// Whether the world holds no instances
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Instances created over the world's lifetime
    pub const fn created_total(&self) -> usize {
        self.created_total
    }

    /// Instances destroyed over the world's lifetime
    pub const fn destroyed_total(&self) -> usize {
        self.destroyed_total
    }
}

impl InstantiationGateway for InMemoryWorld {
    fn instantiate(&mut self, asset_reference: &str, pose: &Pose) -> Result<InstanceHandle, GatewayError> {
        if asset_reference.is_empty() {
            return Err(GatewayError::InstantiationFailed {
                asset_reference: String::new(),
                reason: "empty asset reference".to_string(),
            });
        }
        if self.failing_assets.contains(asset_reference) {
            return Err(GatewayError::InstantiationFailed {
                asset_reference: asset_reference.to_string(),
                reason: "asset refused by world".to_string(),
            });
        }

        let key = self.instances.insert(PlacedInstance {
            asset_reference: asset_reference.to_string(),
            pose: *pose,
        });
        self.created_total += 1;
        Ok(InstanceHandle::from_key(key))
    }

    fn destroy(&mut self, handle: InstanceHandle) -> Result<(), GatewayError> {
        if self.instances.remove(handle.to_key()).is_none() {
            return Err(GatewayError::UnknownHandle(handle));
        }
        self.destroyed_total += 1;
        Ok(())
    }
}
