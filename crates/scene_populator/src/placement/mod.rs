//! Bounded-area placement rules
//!
//! Rooms are treated as flat rectangles at a fixed elevation. Every rule maps
//! a [`Bounds2D`] footprint to a list of 2D points; the composer lifts them to
//! the room's floor height.

mod bounds;
mod rules;

pub use bounds::Bounds2D;
pub use rules::{along_walls, centered, grid_in_bounds, random_in_bounds, PlacementRule};

use thiserror::Error;

/// Placement errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlacementError {
    /// Bounds whose max does not exceed min on some axis
    #[error("Invalid bounds: min ({min_x}, {min_y}) must be below max ({max_x}, {max_y})")]
    InvalidBounds {
        /// Minimum x
        min_x: f64,
        /// Minimum y
        min_y: f64,
        /// Maximum x
        max_x: f64,
        /// Maximum y
        max_y: f64,
    },
}
