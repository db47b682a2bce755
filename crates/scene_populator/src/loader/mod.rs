//! Declarative population configs
//!
//! [`ConfigLoader`] turns a file into a [`ParsedConfig`]: spawn groups, rooms
//! and corridors from a nested document (YAML, TOML or RON), or one placed
//! instance per row from a CSV table.
//!
//! Only a document that cannot be parsed at all is fatal. Entries that lack a
//! required field or carry an unusable value are dropped into
//! [`ParsedConfig::skipped`] with a warning and loading carries on.

mod document;
mod tabular;

pub use tabular::{write_instances, CellValue, CSV_HEADER};

use crate::config::{ConfigError, CorridorDefaults, FileFormat, PopulatorSettings, RoomDefaults};
use crate::foundation::math::{Pose, Vec3};
use crate::patterns::PatternSpec;
use std::io::Read;
use std::path::Path;

/// A group of identical assets laid out by one pattern
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnGroup {
    /// Asset to instantiate at every position
    pub asset_reference: String,
    /// Pattern, count, parameters and center
    pub spec: PatternSpec,
    /// Maximum per-axis rotation jitter in degrees
    pub rotation_randomness: f64,
    /// Maximum relative uniform scale jitter (0..1)
    pub scale_randomness: f64,
}

/// A room to furnish from its template
#[derive(Debug, Clone, PartialEq)]
pub struct RoomRequest {
    /// Room template name
    pub room_type: String,
    /// Floor center
    pub center: Vec3,
    /// Width, length and height
    pub size: Vec3,
    /// Theme name
    pub theme: String,
    /// Multiplier on the template's prop count
    pub prop_density: f64,
}

/// A straight corridor between two points
#[derive(Debug, Clone, PartialEq)]
pub struct CorridorRequest {
    /// Start point
    pub start: Vec3,
    /// End point
    pub end: Vec3,
    /// Corridor width
    pub width: f64,
    /// Corridor height
    pub height: f64,
    /// Theme name
    pub theme: String,
}

/// One explicitly positioned instance (a CSV row)
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceRecord {
    /// Asset to instantiate
    pub asset_reference: String,
    /// Exact pose
    pub pose: Pose,
}

/// Everything extracted from one config file
#[derive(Debug, Default)]
pub struct ParsedConfig {
    /// Pattern-driven spawn groups
    pub spawn_groups: Vec<SpawnGroup>,
    /// Rooms to furnish
    pub rooms: Vec<RoomRequest>,
    /// Corridors to line with props
    pub corridors: Vec<CorridorRequest>,
    /// Explicit instances
    pub instances: Vec<InstanceRecord>,
    /// Entries that were dropped, with the reason
    pub skipped: Vec<ConfigError>,
}

impl ParsedConfig {
    /// Number of usable entries
    pub fn entry_count(&self) -> usize {
        self.spawn_groups.len() + self.rooms.len() + self.corridors.len() + self.instances.len()
    }

    /// Whether no usable entry was found
    pub fn is_empty(&self) -> bool {
        self.entry_count() == 0
    }

    fn skip(&mut self, error: ConfigError) {
        log::warn!("Skipping config entry: {}", error);
        self.skipped.push(error);
    }
}

/// Reads population configs, filling in defaults for optional fields
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    room_defaults: RoomDefaults,
    corridor_defaults: CorridorDefaults,
    default_theme: String,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::from_settings(&PopulatorSettings::default())
    }
}

impl ConfigLoader {
    /// Loader with the stock defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Loader taking its defaults from `settings`
    pub fn from_settings(settings: &PopulatorSettings) -> Self {
        Self {
            room_defaults: settings.room_defaults.clone(),
            corridor_defaults: settings.corridor_defaults.clone(),
            default_theme: settings.default_theme.clone(),
        }
    }

    /// Load a config file, choosing the format from its extension
    pub fn load(&self, path: impl AsRef<Path>) -> Result<ParsedConfig, ConfigError> {
        let path = path.as_ref();
        let format = FileFormat::from_path(path)?;
        log::info!("Loading population config {} ({:?})", path.display(), format);

        let parsed = match format {
            FileFormat::Csv => self.load_csv(std::fs::File::open(path)?)?,
            _ => self.load_str(&std::fs::read_to_string(path)?, format)?,
        };

        log::info!(
            "Loaded {} entries from {} ({} skipped)",
            parsed.entry_count(),
            path.display(),
            parsed.skipped.len()
        );
        Ok(parsed)
    }

    /// Parse an in-memory document
    pub fn load_str(&self, contents: &str, format: FileFormat) -> Result<ParsedConfig, ConfigError> {
        match format {
            FileFormat::Csv => self.load_csv(contents.as_bytes()),
            _ => document::parse(self, contents, format),
        }
    }

    /// Parse CSV rows from any reader
    pub fn load_csv<R: Read>(&self, reader: R) -> Result<ParsedConfig, ConfigError> {
        tabular::parse(reader)
    }
}
