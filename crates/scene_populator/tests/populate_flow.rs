//! End-to-end population: config file to composer to world and back out

use approx::assert_relative_eq;
use scene_populator::prelude::*;
use std::fs;

const STATION_INTERIOR: &str = r#"
spawn_groups:
  - asset_path: /Game/Ships/SM_Fighter
    pattern: orbit
    count: 8
    pattern_params:
      radius: 3000
      center: [0, 0, 1000]
  - asset_path: /Game/Props/SM_Crate
    pattern: grid
    count: 9
    pattern_params:
      spacing: 250
    rotation_randomness: 15
  - asset_path: /Game/Props/SM_Barrel
    pattern: vortex
    count: 4
rooms:
  - type: bridge
    center: [0, 0, 0]
    size: [2000, 1500, 400]
    theme: military
  - type: ballroom
    center: [5000, 0, 0]
    size: [1000, 1000, 300]
corridors:
  - start: [0, 0, 0]
    end: [2000, 0, 0]
    theme: industrial
"#;

fn composer() -> SceneComposer<InMemoryWorld> {
    SceneComposer::with_settings(InMemoryWorld::new(), PopulatorSettings::default().with_seed(2024))
}

#[test]
fn test_yaml_config_to_world() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("station_interior.yaml");
    fs::write(&path, STATION_INTERIOR).unwrap();

    let config = ConfigLoader::new().load(&path).unwrap();
    assert_eq!(config.spawn_groups.len(), 3);
    assert_eq!(config.rooms.len(), 2);
    assert_eq!(config.corridors.len(), 1);

    let mut composer = composer();
    let placed = composer.populate_from_config(&config);
    let report = *composer.report();

    // vortex pattern and ballroom room type are both skipped
    assert_eq!(report.skipped, 2);
    assert_eq!(report.errored, 0);
    assert_eq!(report.created, placed.len());
    assert_eq!(composer.gateway().len(), placed.len());
    assert_eq!(composer.registry().len(), placed.len());

    let fighters: Vec<_> = placed.iter().filter(|r| r.asset_reference == "/Game/Ships/SM_Fighter").collect();
    assert_eq!(fighters.len(), 8);
    for fighter in fighters {
        assert_relative_eq!(fighter.pose.position.z, 1000.0, epsilon = 1e-9);
        assert_relative_eq!(fighter.pose.position.xy().norm(), 3000.0, epsilon = 1e-6);
    }

    assert!(placed.iter().any(|r| r.has_tag("room:bridge")));
    assert!(placed.iter().any(|r| r.has_tag("theme:industrial")));
}

#[test]
fn test_same_seed_same_layout() {
    let config = ConfigLoader::new().load_str(STATION_INTERIOR, scene_populator::config::FileFormat::Yaml).unwrap();

    let first = composer().populate_from_config(&config);
    let second = composer().populate_from_config(&config);

    assert_eq!(first.len(), second.len());
    for (a, b) in first.iter().zip(&second) {
        assert_eq!(a.asset_reference, b.asset_reference);
        assert_relative_eq!(a.pose.position, b.pose.position);
        assert_relative_eq!(a.pose.rotation.yaw, b.pose.rotation.yaw);
    }
}

#[test]
fn test_rooms_then_clear_all() {
    let mut composer = composer();
    let size = Vec3::new(2000.0, 1500.0, 400.0);

    let medbay = composer.populate_room("medbay", Vec3::zeros(), size, "civilian", 1.0);
    let bridge = composer.populate_room("bridge", Vec3::new(4000.0, 0.0, 0.0), size, "military", 1.0);
    assert!(!medbay.is_empty());
    assert!(!bridge.is_empty());

    let total = medbay.len() + bridge.len();
    assert_eq!(composer.gateway().len(), total);

    assert_eq!(composer.clear_all(), total);
    assert!(composer.registry().is_empty());
    assert!(composer.gateway().is_empty());
    assert_eq!(composer.gateway().destroyed_total(), total);

    assert_eq!(composer.clear_all(), 0);
}

#[test]
fn test_refused_assets_do_not_stop_the_batch() {
    let world = InMemoryWorld::new().with_failing_asset("/Game/Props/SM_Crate");
    let mut composer = SceneComposer::new(world).with_seed(7);

    let crates = composer.spawn_pattern("/Game/Props/SM_Crate", &PatternSpec::new("grid", 4), 0.0, 0.0).unwrap();
    let barrels = composer.spawn_pattern("/Game/Props/SM_Barrel", &PatternSpec::new("line", 3), 0.0, 0.0).unwrap();

    assert!(crates.is_empty());
    assert_eq!(barrels.len(), 3);
    assert_eq!(composer.report().errored, 4);
    assert_eq!(composer.report().created, 3);
    assert_eq!(composer.registry().len(), 3);
}

#[test]
fn test_space_layouts_share_one_registry() {
    let mut composer = composer();

    let station = composer.spawn_station_with_modules(
        "/Game/Stations/SM_Hub",
        &["/Game/Stations/SM_Habitat", "/Game/Stations/SM_Dock"],
        6,
        1500.0,
        Vec3::zeros(),
    );
    let belt = composer
        .create_asteroid_belt(&["/Game/Asteroids/SM_Rock"], Vec3::zeros(), 8000.0, 12000.0, 40)
        .unwrap();
    let route = composer.create_trading_route(Vec3::zeros(), Vec3::new(50000.0, 0.0, 0.0), 4, "/Game/Navigation/WaypointMarker");

    assert_eq!(station.len(), 7);
    assert_eq!(belt.len(), 40);
    assert_eq!(route.len(), 4);
    assert_eq!(composer.registry().len(), 51);
    assert_eq!(composer.clear_all(), 51);
}

#[test]
fn test_sector_assets_file_to_sector() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sector.ron");
    let assets = SectorAssets {
        hub_station: "/Game/Stations/SM_Citadel".to_string(),
        ..SectorAssets::default()
    };
    assets.save_to_file(&path).unwrap();

    let loaded = SectorAssets::load_from_file(&path).unwrap();
    assert_eq!(loaded, assets);

    let mut first = composer();
    let mut second = composer();
    let a = first.populate_complete_sector(&loaded);
    let b = second.populate_complete_sector(&loaded);

    assert_eq!(a.total(), first.gateway().len());
    assert_eq!(a.hub[0].asset_reference, "/Game/Stations/SM_Citadel");
    assert_eq!(a, b);
}

#[test]
fn test_hub_interior_and_effects_share_one_registry() {
    let mut composer = composer();

    let interior = composer.populate_station_interior("hub", "industrial").unwrap();
    let effects = composer.create_environment_effects(Vec3::new(0.0, 0.0, 5000.0), EffectKind::Nebula, 4000.0, 6).unwrap();

    assert!(interior.iter().any(|r| r.has_tag("room:cargo_bay")));
    assert_eq!(effects.len(), 6);
    assert_eq!(composer.registry().len(), interior.len() + 6);
    assert!(composer.populate_station_interior("derelict", "industrial").is_err());
    assert_eq!(composer.clear_all(), interior.len() + 6);
}
