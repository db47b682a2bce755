//! # Scene Populator
//!
//! Procedural placement for virtual environments: ships, stations and
//! asteroids in open space, or props inside rooms and corridors.
//!
//! ## Features
//!
//! - **Patterns**: grid, random sphere, cluster, orbit, spiral, line and belt
//!   position generators driven by an explicit, seedable random source
//! - **Placement rules**: along-walls, grid-in-bounds, random-in-bounds with
//!   minimum spacing, and centered placement over a room footprint
//! - **Catalogs**: room templates, themes and a prop-type to asset table,
//!   hand-authored in TOML/RON or taken from the stock contents
//! - **Config loading**: YAML/TOML/RON spawn groups, rooms and corridors, or
//!   one instance per CSV row
//! - **Bookkeeping**: every created instance is registered for bulk teardown
//!   and CSV export
//!
//! The world itself is an external collaborator reached through
//! [`InstantiationGateway`](gateway::InstantiationGateway).
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scene_populator::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut composer = SceneComposer::new(InMemoryWorld::new()).with_seed(42);
//!
//!     let config = ConfigLoader::new().load("station_interior.yaml")?;
//!     composer.populate_from_config(&config);
//!     composer.populate_room("bridge", Vec3::zeros(), Vec3::new(2000.0, 1500.0, 400.0), "military", 1.0);
//!
//!     println!("{}", composer.report());
//!     composer.export_csv("spawned.csv")?;
//!     composer.clear_all();
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod catalog;
pub mod composer;
pub mod config;
pub mod foundation;
pub mod gateway;
pub mod loader;
pub mod patterns;
pub mod placement;

/// Common imports for populator users
pub mod prelude {
    pub use crate::{
        catalog::{PropAssetTable, RoomTemplateCatalog, ThemeCatalog},
        composer::{
            BatchReport, EffectKind, FactionAssets, PlacementRequest, PopulateError, SceneComposer, SectorAssets,
        },
        config::{Config, ConfigError, PopulatorSettings},
        foundation::{
            collections::InstanceHandle,
            math::{Pose, Rotator, Vec2, Vec3},
        },
        gateway::{GatewayError, InMemoryWorld, InstantiationGateway},
        loader::{ConfigLoader, ParsedConfig},
        patterns::{PatternKind, PatternSpec},
        placement::{Bounds2D, PlacementRule},
    };
}
