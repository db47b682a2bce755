//! Room templates, themes and the prop asset table
//!
//! All three are plain lookup tables: loaded once (from the stock contents or
//! a hand-authored TOML/RON file through [`Config`](crate::config::Config))
//! and read-only afterwards.

mod assets;
mod templates;
mod themes;

pub use assets::PropAssetTable;
pub use templates::{DensityClass, RoomTemplate, RoomTemplateCatalog};
pub use themes::{Theme, ThemeCatalog};

use thiserror::Error;

/// Catalog errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// No entry with this name
    #[error("{kind} not found: {name}")]
    NotFound {
        /// What was looked up (`room type`, `theme`)
        kind: &'static str,
        /// The name that was asked for
        name: String,
    },

    /// A prop type has no asset reference
    #[error("No asset mapping for prop type: {0}")]
    MissingAssetMapping(String),
}
