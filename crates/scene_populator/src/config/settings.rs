//! # Populator Settings
//!
//! Ambient configuration for a population run: random seed, log level, the
//! defaults substituted for missing optional fields in declarative configs,
//! and the prop-type to asset-reference table.

use super::{Config, ConfigError};
use crate::catalog::PropAssetTable;
use serde::{Deserialize, Serialize};

/// Defaults applied to `rooms[]` entries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomDefaults {
    /// Room center when none is given
    pub center: [f64; 3],
    /// Room size (width, length, height) when none is given
    pub size: [f64; 3],
    /// Prop density multiplier when none is given
    pub prop_density: f64,
}

impl Default for RoomDefaults {
    fn default() -> Self {
        Self {
            center: [0.0, 0.0, 0.0],
            size: [1000.0, 1000.0, 300.0],
            prop_density: 1.0,
        }
    }
}

/// Defaults applied to `corridors[]` entries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorridorDefaults {
    /// Corridor start point
    pub start: [f64; 3],
    /// Corridor end point
    pub end: [f64; 3],
    /// Corridor width
    pub width: f64,
    /// Corridor height
    pub height: f64,
}

impl Default for CorridorDefaults {
    fn default() -> Self {
        Self {
            start: [0.0, 0.0, 0.0],
            end: [1000.0, 0.0, 0.0],
            width: 300.0,
            height: 300.0,
        }
    }
}

/// Top-level settings for the scene populator
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulatorSettings {
    /// Seed for the composer's random source; `None` seeds from entropy
    pub seed: Option<u64>,
    /// Log level used when `RUST_LOG` is not set
    pub log_level: String,
    /// Distance between props sampled along a corridor
    pub corridor_segment_length: f64,
    /// Theme used when an entry names none
    pub default_theme: String,
    /// Defaults for room entries
    pub room_defaults: RoomDefaults,
    /// Defaults for corridor entries
    pub corridor_defaults: CorridorDefaults,
    /// Prop type to asset reference mapping
    pub prop_assets: PropAssetTable,
}

impl PopulatorSettings {
    /// Create settings with the stock defaults
    pub fn new() -> Self {
        Self {
            seed: None,
            log_level: "info".to_string(),
            corridor_segment_length: 500.0,
            default_theme: "military".to_string(),
            room_defaults: RoomDefaults::default(),
            corridor_defaults: CorridorDefaults::default(),
            prop_assets: PropAssetTable::builtin(),
        }
    }

    /// Set a fixed seed
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set log level
    #[must_use]
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Replace the prop asset table
    #[must_use]
    pub fn with_prop_assets(mut self, prop_assets: PropAssetTable) -> Self {
        self.prop_assets = prop_assets;
        self
    }

    /// Validate the settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.corridor_segment_length.is_finite() && self.corridor_segment_length > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "corridor_segment_length must be positive, got {}",
                self.corridor_segment_length
            )));
        }

        let [width, length, _] = self.room_defaults.size;
        if width <= 0.0 || length <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "room_defaults.size must have positive width and length, got {:?}",
                self.room_defaults.size
            )));
        }

        if self.room_defaults.prop_density < 0.0 {
            return Err(ConfigError::Invalid("room_defaults.prop_density cannot be negative".to_string()));
        }

        if self.default_theme.is_empty() {
            return Err(ConfigError::Invalid("default_theme cannot be empty".to_string()));
        }

        Ok(())
    }
}

impl Default for PopulatorSettings {
    fn default() -> Self {
        Self::new()
    }
}

impl Config for PopulatorSettings {}
