//! World instantiation boundary
//!
//! The populator never touches a live world directly. Everything it places
//! goes through an [`InstantiationGateway`], which a host engine implements
//! and which [`InMemoryWorld`] implements for tests and dry runs.

mod memory;

pub use memory::{InMemoryWorld, PlacedInstance};

use crate::foundation::collections::InstanceHandle;
use crate::foundation::math::Pose;
use thiserror::Error;

/// Gateway errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// The world refused to create the instance
    #[error("Failed to instantiate '{asset_reference}': {reason}")]
    InstantiationFailed {
        /// Asset that was requested
        asset_reference: String,
        /// Reason reported by the world
        reason: String,
    },

    /// The handle does not name a live instance
    #[error("Unknown instance handle {0}")]
    UnknownHandle(InstanceHandle),
}

/// Creates and destroys in-world objects
///
/// Calls are blocking and a gateway is not expected to be shared between
/// threads; run independent composers against independent gateways instead.
pub trait InstantiationGateway {
    /// Create one instance of `asset_reference` at `pose`
    fn instantiate(&mut self, asset_reference: &str, pose: &Pose) -> Result<InstanceHandle, GatewayError>;

    /// Destroy a previously created instance
    fn destroy(&mut self, handle: InstanceHandle) -> Result<(), GatewayError>;
}

impl<G: InstantiationGateway + ?Sized> InstantiationGateway for &mut G {
    fn instantiate(&mut self, asset_reference: &str, pose: &Pose) -> Result<InstanceHandle, GatewayError> {
        (**self).instantiate(asset_reference, pose)
    }

    fn destroy(&mut self, handle: InstanceHandle) -> Result<(), GatewayError> {
        (**self).destroy(handle)
    }
}

impl<G: InstantiationGateway + ?Sized> InstantiationGateway for Box<G> {
    fn instantiate(&mut self, asset_reference: &str, pose: &Pose) -> Result<InstanceHandle, GatewayError> {
        (**self).instantiate(asset_reference, pose)
    }

    fn destroy(&mut self, handle: InstanceHandle) -> Result<(), GatewayError> {
        (**self).destroy(handle)
    }
}
