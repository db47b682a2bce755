//! Specialized collection types

use serde::{Deserialize, Serialize};
use slotmap::{DefaultKey, Key, KeyData};
use std::fmt;

pub use slotmap::SlotMap;

/// Handle-based map using slot map for stable references
pub type HandleMap<T> = SlotMap<DefaultKey, T>;

/// Opaque handle to an instance created in the world
///
/// Handles are issued by an [`InstantiationGateway`](crate::gateway::InstantiationGateway)
/// and are only meaningful to the gateway that produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InstanceHandle(u64);

impl InstanceHandle {
    /// Wrap a raw gateway identifier
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw gateway identifier
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Build a handle from a slot map key
    pub fn from_key(key: DefaultKey) -> Self {
        Self(key.data().as_ffi())
    }

    /// Recover the slot map key this handle was built from
    pub fn to_key(self) -> DefaultKey {
        KeyData::from_ffi(self.0).into()
    }
}

impl fmt::Display for InstanceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:016x}", self.0)
    }
}
