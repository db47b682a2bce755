//! Room template catalog

use super::CatalogError;
use crate::config::Config;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How densely a room type is furnished
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DensityClass {
    /// Sparse furnishing
    Low,
    /// Typical furnishing
    #[default]
    Medium,
    /// Crowded furnishing
    High,
}

impl DensityClass {
    /// Multiplier applied when sizing prop counts from room area
    pub const fn multiplier(self) -> f64 {
        match self {
            Self::Low => 0.5,
            Self::Medium => 1.0,
            Self::High => 1.5,
        }
    }
}

/// Static description of a room category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomTemplate {
    /// Room category name
    pub room_type: String,
    /// Prop types that belong in this room, in catalog order
    pub prop_types: Vec<String>,
    /// Furnishing density
    #[serde(default)]
    pub density_class: DensityClass,
    /// Ceiling height
    pub height: f64,
    /// Human readable summary
    #[serde(default)]
    pub description: String,
}

impl RoomTemplate {
    fn stock(room_type: &str, props: &[&str], density_class: DensityClass, height: f64, description: &str) -> Self {
        Self {
            room_type: room_type.to_string(),
            prop_types: props.iter().map(|p| (*p).to_string()).collect(),
            density_class,
            height,
            description: description.to_string(),
        }
    }
}

/// Lookup from room type to template
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoomTemplateCatalog {
    /// Templates keyed by room type
    #[serde(default)]
    pub rooms: BTreeMap<String, RoomTemplate>,
}

impl RoomTemplateCatalog {
    /// Build a catalog from templates; later duplicates replace earlier ones
    pub fn from_templates(templates: impl IntoIterator<Item = RoomTemplate>) -> Self {
        Self {
            rooms: templates.into_iter().map(|t| (t.room_type.clone(), t)).collect(),
        }
    }

    /// The stock station/ship interior catalog
    pub fn builtin() -> Self {
        use DensityClass::{High, Low, Medium};

        Self::from_templates([
            RoomTemplate::stock("corridor", &["wall_panel", "light", "door", "vent"], Low, 300.0,
                "Standard corridor connecting rooms"),
            RoomTemplate::stock("bridge", &["command_chair", "console", "holotable", "screen", "terminal"], High, 400.0,
                "Ship/station command center"),
            RoomTemplate::stock("cargo_bay", &["cargo_container", "crane", "forklift", "crate", "barrel"], Medium, 600.0,
                "Storage and cargo handling area"),
            RoomTemplate::stock("living_quarters", &["bed", "desk", "chair", "locker", "table", "lamp"], Medium, 300.0,
                "Crew living space"),
            RoomTemplate::stock("mess_hall", &["table", "chair", "bench", "counter", "food_dispenser"], High, 350.0,
                "Dining and recreation area"),
            RoomTemplate::stock("engineering", &["reactor_core", "control_panel", "pipe", "generator", "tool_bench"], High, 500.0,
                "Engineering and maintenance"),
            RoomTemplate::stock("medbay", &["med_bed", "medical_scanner", "cabinet", "screen", "table"], Medium, 350.0,
                "Medical facility"),
            RoomTemplate::stock("hangar", &["landing_pad", "fuel_pump", "tool_rack", "repair_station"], Low, 800.0,
                "Vehicle bay and maintenance"),
            RoomTemplate::stock("armory", &["weapon_rack", "ammo_crate", "armor_stand", "workbench"], Medium, 350.0,
                "Weapons and equipment storage"),
            RoomTemplate::stock("laboratory", &["lab_table", "microscope", "computer", "specimen_container", "storage_unit"], High, 350.0,
                "Research and analysis facility"),
        ])
    }

    /// Look up a room type
    pub fn lookup(&self, room_type: &str) -> Result<&RoomTemplate, CatalogError> {
        self.rooms.get(room_type).ok_or_else(|| CatalogError::NotFound {
            kind: "room type",
            name: room_type.to_string(),
        })
    }

    /// Known room types in sorted order
    pub fn room_types(&self) -> impl Iterator<Item = &str> {
        self.rooms.keys().map(String::as_str)
    }

    /// Number of templates
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    /// Whether the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}

impl Config for RoomTemplateCatalog {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FileFormat;

    #[test]
    fn test_builtin_lookup() {
        let catalog = RoomTemplateCatalog::builtin();
        let bridge = catalog.lookup("bridge").unwrap();

        assert_eq!(bridge.density_class, DensityClass::High);
        assert_eq!(bridge.prop_types[0], "command_chair");
        assert_eq!(catalog.len(), 10);
    }

    #[test]
    fn test_missing_room_type() {
        let catalog = RoomTemplateCatalog::builtin();
        assert_eq!(
            catalog.lookup("ballroom"),
            Err(CatalogError::NotFound { kind: "room type", name: "ballroom".to_string() })
        );
    }

    #[test]
    fn test_density_multipliers() {
        assert_eq!(DensityClass::Low.multiplier(), 0.5);
        assert_eq!(DensityClass::Medium.multiplier(), 1.0);
        assert_eq!(DensityClass::High.multiplier(), 1.5);
    }

    #[test]
    fn test_catalog_from_toml() {
        let doc = r#"
            [rooms.greenhouse]
            room_type = "greenhouse"
            prop_types = ["planter", "sprinkler"]
            density_class = "low"
            height = 450.0
        "#;
        let catalog = RoomTemplateCatalog::load_from_str(doc, FileFormat::Toml).unwrap();
        let greenhouse = catalog.lookup("greenhouse").unwrap();

        assert_eq!(greenhouse.prop_types, vec!["planter".to_string(), "sprinkler".to_string()]);
        assert_eq!(greenhouse.density_class, DensityClass::Low);
        assert!(greenhouse.description.is_empty());
    }
}
