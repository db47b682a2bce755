//! Configuration system
//!
//! Settings, catalogs and asset tables all load through the [`Config`] trait,
//! which picks the file format from the extension.

pub use serde::{Deserialize, Serialize};

mod settings;

pub use settings::{CorridorDefaults, PopulatorSettings, RoomDefaults};

use std::path::Path;

/// Supported structured file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// TOML document
    Toml,
    /// RON document
    Ron,
    /// YAML document
    Yaml,
    /// Comma separated rows
    Csv,
}

impl FileFormat {
    /// Detect the format from a path's extension (case-insensitive)
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "toml" => Ok(Self::Toml),
            "ron" => Ok(Self::Ron),
            "yaml" | "yml" => Ok(Self::Yaml),
            "csv" => Ok(Self::Csv),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        Self::load_from_str(&contents, FileFormat::from_path(path)?)
    }

    /// Parse configuration from an in-memory document
    fn load_from_str(contents: &str, format: FileFormat) -> Result<Self, ConfigError> {
        match format {
            FileFormat::Toml => toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string())),
            FileFormat::Ron => ron::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string())),
            FileFormat::Yaml => serde_yaml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string())),
            FileFormat::Csv => Err(ConfigError::UnsupportedFormat("csv".to_string())),
        }
    }

    /// Save configuration to file
    fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let contents = match FileFormat::from_path(path)? {
            FileFormat::Toml => {
                toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
            }
            FileFormat::Ron => ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?,
            FileFormat::Yaml => {
                serde_yaml::to_string(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
            }
            FileFormat::Csv => return Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The document could not be parsed at all
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// An entry lacks a field it cannot do without
    #[error("{entry} is missing required field '{field}'")]
    MissingRequiredField {
        /// Where the entry came from (e.g. `spawn_groups[2]`, `row 5`)
        entry: String,
        /// Name of the missing field
        field: String,
    },

    /// A field is present but unusable
    #[error("{entry}: field '{field}' is invalid: {reason}")]
    InvalidField {
        /// Where the entry came from
        entry: String,
        /// Name of the offending field
        field: String,
        /// What is wrong with it
        reason: String,
    },

    /// Settings failed validation
    #[error("Invalid settings: {0}")]
    Invalid(String),
}
