//! Prop type to asset reference mapping

use super::CatalogError;
use crate::config::Config;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Maps prop types (`console`, `bed`) to asset references
///
/// Serialized as a flat table so a settings file can carry it inline:
///
/// ```toml
/// [prop_assets]
/// console = "/Game/Props/Tech/SM_Console"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropAssetTable(BTreeMap<String, String>);

impl PropAssetTable {
    /// Empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// The stock prop library
    pub fn builtin() -> Self {
        const STOCK: [(&str, &str); 19] = [
            ("wall_panel", "/Game/Props/Architecture/SM_WallPanel"),
            ("light", "/Game/Props/Lighting/SM_CeilingLight"),
            ("door", "/Game/Props/Architecture/SM_Door"),
            ("vent", "/Game/Props/Architecture/SM_Vent"),
            ("command_chair", "/Game/Props/Furniture/SM_CommandChair"),
            ("console", "/Game/Props/Tech/SM_Console"),
            ("holotable", "/Game/Props/Tech/SM_HoloTable"),
            ("screen", "/Game/Props/Tech/SM_Screen"),
            ("terminal", "/Game/Props/Tech/SM_Terminal"),
            ("cargo_container", "/Game/Props/Storage/SM_CargoContainer"),
            ("crane", "/Game/Props/Industrial/SM_Crane"),
            ("crate", "/Game/Props/Storage/SM_Crate"),
            ("barrel", "/Game/Props/Storage/SM_Barrel"),
            ("bed", "/Game/Props/Furniture/SM_Bed"),
            ("desk", "/Game/Props/Furniture/SM_Desk"),
            ("chair", "/Game/Props/Furniture/SM_Chair"),
            ("locker", "/Game/Props/Storage/SM_Locker"),
            ("table", "/Game/Props/Furniture/SM_Table"),
            ("lamp", "/Game/Props/Lighting/SM_Lamp"),
        ];

        STOCK.iter().fold(Self::new(), |table, (prop, asset)| table.with(prop, asset))
    }

    /// Add or replace a mapping (builder style)
    pub fn with(mut self, prop_type: &str, asset_reference: &str) -> Self {
        self.insert(prop_type, asset_reference);
        self
    }

    /// Add or replace a mapping
    pub fn insert(&mut self, prop_type: &str, asset_reference: &str) {
        self.0.insert(prop_type.to_string(), asset_reference.to_string());
    }

    /// Asset reference for a prop type
    pub fn resolve(&self, prop_type: &str) -> Result<&str, CatalogError> {
        self.0
            .get(prop_type)
            .map(String::as_str)
            .ok_or_else(|| CatalogError::MissingAssetMapping(prop_type.to_string()))
    }

    /// Overlay another table; its entries win
    pub fn merge(&mut self, other: &Self) {
        for (prop, asset) in &other.0 {
            self.0.insert(prop.clone(), asset.clone());
        }
    }

    /// Number of mappings
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Config for PropAssetTable {}
