//! Position-generating patterns
//!
//! Pure functions mapping a pattern name, a count and numeric parameters to an
//! ordered list of 3D positions. Grid, orbit (without jitter), spiral and line
//! are deterministic; everything that samples takes an explicit random source
//! so results are reproducible from a seed.

mod generator;
mod params;

pub use generator::{
    belt, cluster, cluster_group_sizes, generate, grid, line, orbit, random_sphere, spiral, waypoints,
    MAX_PATTERN_COUNT,
};
pub use params::{ParamValue, PatternParams, PatternSpec};

pub(crate) use generator::{is_jitter_amount, lattice_side, symmetric_jitter};

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Pattern errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PatternError {
    /// The pattern name is not recognized
    #[error("Unknown pattern: {0}")]
    UnknownPattern(String),

    /// A parameter has the wrong shape or an unusable value
    #[error("Invalid parameter '{name}' for pattern '{pattern}': {reason}")]
    InvalidParameter {
        /// Pattern being evaluated
        pattern: String,
        /// Parameter name
        name: String,
        /// What is wrong with it
        reason: String,
    },
}

impl PatternError {
    pub(crate) fn invalid(pattern: &str, name: &str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            pattern: pattern.to_string(),
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

/// The recognized pattern families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatternKind {
    /// Square lattice centered on the center point
    Grid,
    /// Uniform points inside a sphere
    RandomSphere,
    /// Groups of random spheres around random cluster centers
    Cluster,
    /// Evenly spaced ring with optional vertical jitter
    Orbit,
    /// Outward and upward growing spiral
    Spiral,
    /// Evenly spaced points along a direction
    Line,
    /// Uniform ring between an inner and outer radius
    Belt,
}

impl PatternKind {
    /// All pattern kinds
    pub const ALL: [Self; 7] = [
        Self::Grid,
        Self::RandomSphere,
        Self::Cluster,
        Self::Orbit,
        Self::Spiral,
        Self::Line,
        Self::Belt,
    ];

    /// Canonical pattern name
    pub const fn name(self) -> &'static str {
        match self {
            Self::Grid => "grid",
            Self::RandomSphere => "random_sphere",
            Self::Cluster => "cluster",
            Self::Orbit => "orbit",
            Self::Spiral => "spiral",
            Self::Line => "line",
            Self::Belt => "belt",
        }
    }
}

impl FromStr for PatternKind {
    type Err = PatternError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.trim().to_ascii_lowercase().as_str() {
            "grid" => Ok(Self::Grid),
            "random_sphere" | "random" => Ok(Self::RandomSphere),
            "cluster" => Ok(Self::Cluster),
            "orbit" => Ok(Self::Orbit),
            "spiral" => Ok(Self::Spiral),
            "line" => Ok(Self::Line),
            "belt" => Ok(Self::Belt),
            _ => Err(PatternError::UnknownPattern(name.to_string())),
        }
    }
}

impl fmt::Display for PatternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
