//! Open-space layouts: stations, asteroid belts, trade routes, faction
//! territories, jump gates, combat zones, environment effects and whole sectors

use super::{PlacementRequest, PopulateError, SceneComposer};
use crate::config::Config;
use crate::foundation::math::{constants::TAU, utils, Pose, Rotator, Vec3};
use crate::gateway::InstantiationGateway;
use crate::patterns::{self, symmetric_jitter, PatternSpec, MAX_PATTERN_COUNT};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const MODULE_Z_JITTER: f64 = 100.0;
const BELT_Z_VARIATION: f64 = 500.0;
const ASTEROID_SCALE_MIN: f64 = 0.2;
const ASTEROID_SCALE_MAX: f64 = 2.0;
const ROUTE_JITTER_XY: f64 = 500.0;
const ROUTE_JITTER_Z: f64 = 200.0;

const STATION_CLUSTER_RADIUS: f64 = 2000.0;
/// Station spread and patrol orbit as fractions of the territory radius
const STATION_SPREAD_FRACTION: f64 = 0.7;
const PATROL_RADIUS_FRACTION: f64 = 0.8;
const TERRITORY_ROUTE_WAYPOINTS: usize = 5;

const GATE_SCALE: [f64; 3] = [20.0, 20.0, 5.0];
const GATE_ROUTE_WAYPOINTS: usize = 3;

/// Combat ships sit between these fractions of the zone radius
const COMBAT_MIN_FRACTION: f64 = 0.3;
const COMBAT_MAX_FRACTION: f64 = 0.8;
const COMBAT_Z_JITTER: f64 = 200.0;

const EFFECT_Z_JITTER: f64 = 1000.0;

const SECTOR_HUB_MODULES: usize = 12;
const SECTOR_HUB_SPACING: f64 = 1500.0;
const SECTOR_FACTION_CENTERS: [[f64; 3]; 4] = [
    [15000.0, 0.0, 0.0],
    [-15000.0, 0.0, 0.0],
    [0.0, 15000.0, 0.0],
    [0.0, -15000.0, 0.0],
];
const SECTOR_FACTION_RADIUS: f64 = 8000.0;
const SECTOR_FACTION_STATIONS: usize = 3;
const SECTOR_FACTION_SHIPS: usize = 6;
/// center, inner radius, outer radius, asteroid count
const SECTOR_BELTS: [([f64; 3], f64, f64, usize); 3] = [
    ([5000.0, 5000.0, 0.0], 3000.0, 6000.0, 150),
    ([-5000.0, -5000.0, 0.0], 4000.0, 7000.0, 120),
    ([0.0, 8000.0, 0.0], 2000.0, 5000.0, 100),
];
const SECTOR_GATES: [[f64; 3]; 6] = [
    [20000.0, 0.0, 0.0],
    [-20000.0, 0.0, 0.0],
    [0.0, 20000.0, 0.0],
    [0.0, -20000.0, 0.0],
    [14142.0, 14142.0, 0.0],
    [-14142.0, -14142.0, 0.0],
];
/// center, kind, radius, count
const SECTOR_EFFECTS: [([f64; 3], EffectKind, f64, usize); 2] = [
    ([10000.0, 10000.0, 0.0], EffectKind::Nebula, 8000.0, 15),
    ([-10000.0, -10000.0, 0.0], EffectKind::Dust, 6000.0, 25),
];
/// center, radius, ships per side
const SECTOR_COMBAT_ZONES: [([f64; 3], f64, usize, usize); 2] = [
    ([8000.0, 8000.0, 0.0], 3000.0, 4, 4),
    ([-8000.0, -8000.0, 0.0], 2500.0, 3, 3),
];

const DEFAULT_WAYPOINT_ASSET: &str = "/Game/Navigation/WaypointMarker";

/// Asset references for one faction's territory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactionAssets {
    /// Station asset
    pub station: String,
    /// Patrol ship asset
    pub ship: String,
    /// Waypoint marker on routes between stations
    pub waypoint: String,
}

impl FactionAssets {
    /// Stock asset paths derived from a faction name
    pub fn named(faction: &str) -> Self {
        Self {
            station: format!("/Game/Stations/{faction}_Station"),
            ship: format!("/Game/Ships/{faction}_Fighter"),
            waypoint: DEFAULT_WAYPOINT_ASSET.to_string(),
        }
    }
}

/// What a faction territory placed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TerritoryLayout {
    /// Stations
    pub stations: Vec<PlacementRequest>,
    /// Patrol ships
    pub ships: Vec<PlacementRequest>,
    /// Route waypoints between consecutive stations
    pub waypoints: Vec<PlacementRequest>,
}

impl TerritoryLayout {
    /// Total instances placed
    pub fn total(&self) -> usize {
        self.stations.len() + self.ships.len() + self.waypoints.len()
    }
}

/// Jump gates and the routes joining them
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JumpGateNetwork {
    /// Gates, in the order given
    pub gates: Vec<PlacementRequest>,
    /// Route waypoints between consecutive gates
    pub waypoints: Vec<PlacementRequest>,
}

impl JumpGateNetwork {
    /// Total instances placed
    pub fn total(&self) -> usize {
        self.gates.len() + self.waypoints.len()
    }
}

/// Ships on the two sides of a combat zone
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CombatLayout {
    /// Side facing +x
    pub faction_a: Vec<PlacementRequest>,
    /// Side facing -x
    pub faction_b: Vec<PlacementRequest>,
}

impl CombatLayout {
    /// Total instances placed
    pub fn total(&self) -> usize {
        self.faction_a.len() + self.faction_b.len()
    }
}

/// Kinds of environment effect volumes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    /// Large gas clouds
    Nebula,
    /// Mid-sized dust clouds
    Dust,
    /// Small energy fields
    Energy,
}

impl EffectKind {
    /// Canonical effect name
    pub const fn name(self) -> &'static str {
        match self {
            Self::Nebula => "nebula",
            Self::Dust => "dust",
            Self::Energy => "energy",
        }
    }

    /// Placeholder volume asset
    pub const fn asset(self) -> &'static str {
        match self {
            Self::Nebula => "/Engine/BasicShapes/Sphere",
            Self::Dust => "/Engine/BasicShapes/Cube",
            Self::Energy => "/Engine/BasicShapes/Cylinder",
        }
    }

    /// Uniform scale range
    pub const fn scale_range(self) -> (f64, f64) {
        match self {
            Self::Nebula => (5.0, 15.0),
            Self::Dust => (2.0, 8.0),
            Self::Energy => (1.0, 5.0),
        }
    }
}

impl FromStr for EffectKind {
    type Err = PopulateError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.trim().to_ascii_lowercase().as_str() {
            "nebula" => Ok(Self::Nebula),
            "dust" => Ok(Self::Dust),
            "energy" | "energy_field" => Ok(Self::Energy),
            _ => Err(PopulateError::invalid_argument("effect_type", format!("unknown effect '{name}'"))),
        }
    }
}

impl fmt::Display for EffectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Assets used by [`SceneComposer::populate_complete_sector`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SectorAssets {
    /// Central hub station
    pub hub_station: String,
    /// Module assets drawn for the hub ring
    pub hub_modules: Vec<String>,
    /// One entry per faction territory, up to four
    pub factions: Vec<FactionAssets>,
    /// Asteroid assets
    pub asteroids: Vec<String>,
    /// Jump gate asset
    pub jump_gate: String,
    /// Waypoint marker for gate routes
    pub waypoint: String,
    /// Combat ship for side A
    pub combat_ship_a: String,
    /// Combat ship for side B
    pub combat_ship_b: String,
}

impl Default for SectorAssets {
    fn default() -> Self {
        Self {
            hub_station: "/Game/Stations/TradingHub".to_string(),
            hub_modules: (1..=5).map(|i| format!("/Game/Stations/Modules/StationModule_{i}")).collect(),
            factions: (1..=4).map(|i| FactionAssets::named(&format!("Faction_{i}"))).collect(),
            asteroids: vec![
                "/Engine/BasicShapes/Sphere".to_string(),
                "/Engine/BasicShapes/Cube".to_string(),
                "/Engine/BasicShapes/Cylinder".to_string(),
            ],
            jump_gate: "/Engine/BasicShapes/Torus".to_string(),
            waypoint: DEFAULT_WAYPOINT_ASSET.to_string(),
            combat_ship_a: "/Game/Ships/Fighter_A".to_string(),
            combat_ship_b: "/Game/Ships/Fighter_B".to_string(),
        }
    }
}

impl Config for SectorAssets {}

/// Everything a complete sector placed, by category
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SectorLayout {
    /// Hub station and its modules
    pub hub: Vec<PlacementRequest>,
    /// Faction territories
    pub territories: Vec<TerritoryLayout>,
    /// Asteroids from every belt
    pub asteroids: Vec<PlacementRequest>,
    /// Jump gate network
    pub jump_gates: JumpGateNetwork,
    /// Environment effect volumes
    pub effects: Vec<PlacementRequest>,
    /// Combat zones
    pub combat_zones: Vec<CombatLayout>,
}

impl SectorLayout {
    /// Total instances placed
    pub fn total(&self) -> usize {
        self.hub.len()
            + self.territories.iter().map(TerritoryLayout::total).sum::<usize>()
            + self.asteroids.len()
            + self.jump_gates.total()
            + self.effects.len()
            + self.combat_zones.iter().map(CombatLayout::total).sum::<usize>()
    }
}

impl<G: InstantiationGateway> SceneComposer<G> {
    /// A station at `center` with `module_count` modules on a ring around it
    ///
    /// Modules sit `module_spacing` from the center, face inward and get a
    /// small vertical offset; each module asset is drawn from `module_assets`.
    /// If the station itself cannot be created nothing else is placed.
    pub fn spawn_station_with_modules(
        &mut self,
        station_asset: &str,
        module_assets: &[&str],
        module_count: usize,
        module_spacing: f64,
        center: Vec3,
    ) -> Vec<PlacementRequest> {
        let station = PlacementRequest::new(station_asset, Pose::from_position(center))
            .with_tags(["layout:station", "station:core"]);
        if self.place(station.clone()).is_none() {
            log::warn!("Station {} could not be created; skipping its modules", station_asset);
            return Vec::new();
        }

        let mut modules = Vec::new();
        for i in 0..module_count {
            let Some(asset) = module_assets.choose(&mut self.rng) else {
                log::warn!("No module assets given; station {} placed without modules", station_asset);
                self.report.skipped += module_count;
                break;
            };

            let angle = TAU * i as f64 / module_count as f64;
            let position = Vec3::new(
                center.x + angle.cos() * module_spacing,
                center.y + angle.sin() * module_spacing,
                center.z + symmetric_jitter(&mut self.rng, MODULE_Z_JITTER),
            );
            let rotation = Rotator::from_yaw(utils::rad_to_deg(angle) + 180.0);
            modules.push(
                PlacementRequest::new(*asset, Pose::from_position(position).with_rotation(rotation))
                    .with_tags(["layout:station", "station:module"]),
            );
        }

        let mut placed = vec![station];
        placed.extend(self.place_all(modules));
        log::info!("Spawned station {} with {} modules", station_asset, placed.len() - 1);
        placed
    }

    /// Scatter `count` asteroids in a ring between `inner_radius` and `outer_radius`
    ///
    /// Every asteroid gets a random asset from `asteroid_assets`, a random
    /// rotation on all three axes and a uniform scale in `[0.2, 2.0]`.
    pub fn create_asteroid_belt(
        &mut self,
        asteroid_assets: &[&str],
        center: Vec3,
        inner_radius: f64,
        outer_radius: f64,
        count: usize,
    ) -> Result<Vec<PlacementRequest>, PopulateError> {
        if asteroid_assets.is_empty() {
            return Err(PopulateError::invalid_argument("asteroid_assets", "at least one asset is required"));
        }

        let spec = PatternSpec::new("belt", count)
            .with_param("inner_radius", inner_radius)
            .with_param("outer_radius", outer_radius)
            .with_param("z_variation", BELT_Z_VARIATION)
            .with_center(center);
        let positions = patterns::generate(&spec, &mut self.rng)?;

        let mut requests = Vec::with_capacity(positions.len());
        for position in positions {
            let rotation = Rotator::new(
                self.rng.gen_range(-180.0..=180.0),
                self.rng.gen_range(-180.0..=180.0),
                self.rng.gen_range(-180.0..=180.0),
            );
            let scale = self.rng.gen_range(ASTEROID_SCALE_MIN..=ASTEROID_SCALE_MAX);
            let asset = asteroid_assets.choose(&mut self.rng).copied().unwrap_or_default();
            requests.push(
                PlacementRequest::new(asset, Pose::from_position(position).with_rotation(rotation).with_uniform_scale(scale))
                    .with_tag("layout:asteroid_belt"),
            );
        }

        let placed = self.place_all(requests);
        log::info!("Created asteroid belt with {}/{} asteroids", placed.len(), count);
        Ok(placed)
    }

    /// Waypoint markers strictly between two points
    ///
    /// Waypoint `i` of `n` sits at `t = (i + 1) / (n + 1)` along the line,
    /// jittered by up to 500 units horizontally and 200 vertically.
    pub fn create_trading_route(
        &mut self,
        start: Vec3,
        end: Vec3,
        waypoint_count: usize,
        waypoint_asset: &str,
    ) -> Vec<PlacementRequest> {
        if waypoint_count > MAX_PATTERN_COUNT {
            log::error!("Cannot create trading route: {} waypoints exceeds {}", waypoint_count, MAX_PATTERN_COUNT);
            self.report.skipped += 1;
            return Vec::new();
        }

        let jitter = Vec3::new(ROUTE_JITTER_XY, ROUTE_JITTER_XY, ROUTE_JITTER_Z);
        let requests = patterns::waypoints(start, end, waypoint_count, jitter, &mut self.rng)
            .into_iter()
            .map(|position| {
                PlacementRequest::new(waypoint_asset, Pose::from_position(position)).with_tag("layout:trading_route")
            })
            .collect();

        let placed = self.place_all(requests);
        log::info!("Created trading route with {}/{} waypoints", placed.len(), waypoint_count);
        placed
    }

    /// Stations, patrol ships and trade routes for one faction
    ///
    /// Stations are clustered one per cluster within `0.7 * radius` of
    /// `center`, ships orbit at `0.8 * radius`, and each pair of consecutive
    /// stations that were created gets a five waypoint route.
    pub fn populate_faction_territory(
        &mut self,
        assets: &FactionAssets,
        center: Vec3,
        radius: f64,
        station_count: usize,
        ship_count: usize,
    ) -> Result<TerritoryLayout, PopulateError> {
        if !(radius.is_finite() && radius > 0.0) {
            return Err(PopulateError::invalid_argument("radius", format!("must be positive, got {radius}")));
        }

        let station_spec = PatternSpec::new("cluster", station_count)
            .with_param("cluster_count", station_count.max(1) as f64)
            .with_param("cluster_radius", STATION_CLUSTER_RADIUS)
            .with_param("spread", radius * STATION_SPREAD_FRACTION)
            .with_center(center);
        let ship_spec = PatternSpec::new("orbit", ship_count)
            .with_param("radius", radius * PATROL_RADIUS_FRACTION)
            .with_center(center);
        let station_positions = patterns::generate(&station_spec, &mut self.rng)?;
        let ship_positions = patterns::generate(&ship_spec, &mut self.rng)?;

        let stations = self.place_all(tagged(&assets.station, station_positions, ["layout:faction_territory", "role:station"]));
        let ships = self.place_all(tagged(&assets.ship, ship_positions, ["layout:faction_territory", "role:patrol"]));

        let mut waypoints = Vec::new();
        for pair in stations.windows(2) {
            let (from, to) = (pair[0].pose.position, pair[1].pose.position);
            waypoints.extend(self.create_trading_route(from, to, TERRITORY_ROUTE_WAYPOINTS, &assets.waypoint));
        }

        let layout = TerritoryLayout { stations, ships, waypoints };
        log::info!(
            "Populated faction territory with {} stations, {} ships, {} waypoints",
            layout.stations.len(),
            layout.ships.len(),
            layout.waypoints.len()
        );
        Ok(layout)
    }

    /// Jump gates at the given positions, joined in order by three waypoint routes
    ///
    /// Gates are scaled to (20, 20, 5). Routes only join gates that were
    /// actually created.
    pub fn create_jump_gate_network(&mut self, gate_positions: &[Vec3], gate_asset: &str, waypoint_asset: &str) -> JumpGateNetwork {
        let scale = Vec3::from(GATE_SCALE);
        let requests = gate_positions
            .iter()
            .map(|position| {
                PlacementRequest::new(gate_asset, Pose::from_position(*position).with_scale(scale))
                    .with_tag("layout:jump_gate")
            })
            .collect();
        let gates = self.place_all(requests);

        let mut waypoints = Vec::new();
        for pair in gates.windows(2) {
            let (from, to) = (pair[0].pose.position, pair[1].pose.position);
            waypoints.extend(self.create_trading_route(from, to, GATE_ROUTE_WAYPOINTS, waypoint_asset));
        }

        log::info!("Created jump gate network with {} gates, {} waypoints", gates.len(), waypoints.len());
        JumpGateNetwork { gates, waypoints }
    }

    /// Two opposing groups of ships on either side of `center`
    ///
    /// Side A sits within 45 degrees of +x and side B within 45 degrees of -x,
    /// each between `0.3 * radius` and `0.8 * radius` from the center with up
    /// to 200 units of vertical jitter.
    pub fn populate_combat_zone(
        &mut self,
        center: Vec3,
        radius: f64,
        faction_a: (&str, usize),
        faction_b: (&str, usize),
    ) -> Result<CombatLayout, PopulateError> {
        if !(radius.is_finite() && radius > 0.0) {
            return Err(PopulateError::invalid_argument("radius", format!("must be positive, got {radius}")));
        }
        if faction_a.1.max(faction_b.1) > MAX_PATTERN_COUNT {
            return Err(PopulateError::invalid_argument(
                "ship_count",
                format!("at most {MAX_PATTERN_COUNT} ships per side"),
            ));
        }

        let quarter = TAU / 8.0;
        let side_a = self.combat_side(faction_a, center, radius, 0.0, quarter, "side:a");
        let side_b = self.combat_side(faction_b, center, radius, TAU / 2.0, quarter, "side:b");

        let layout = CombatLayout {
            faction_a: self.place_all(side_a),
            faction_b: self.place_all(side_b),
        };
        log::info!("Created combat zone with {} vs {} ships", layout.faction_a.len(), layout.faction_b.len());
        Ok(layout)
    }

    fn combat_side(
        &mut self,
        (asset, count): (&str, usize),
        center: Vec3,
        radius: f64,
        heading: f64,
        spread: f64,
        side_tag: &str,
    ) -> Vec<PlacementRequest> {
        (0..count)
            .map(|_| {
                let angle = heading + symmetric_jitter(&mut self.rng, spread);
                let distance = self.rng.gen_range(COMBAT_MIN_FRACTION * radius..=COMBAT_MAX_FRACTION * radius);
                let position = Vec3::new(
                    center.x + angle.cos() * distance,
                    center.y + angle.sin() * distance,
                    center.z + symmetric_jitter(&mut self.rng, COMBAT_Z_JITTER),
                );
                PlacementRequest::new(asset, Pose::from_position(position)).with_tags(["layout:combat_zone", side_tag])
            })
            .collect()
    }

    /// Scatter `count` effect volumes of one kind within `radius` of `center`
    ///
    /// Distance from the center is uniform in `[0, radius]`, so volumes
    /// gather toward the middle. Each gets a random rotation on all axes, up
    /// to 1000 units of vertical jitter and a uniform scale from the kind's range.
    pub fn create_environment_effects(
        &mut self,
        center: Vec3,
        kind: EffectKind,
        radius: f64,
        count: usize,
    ) -> Result<Vec<PlacementRequest>, PopulateError> {
        if !(radius.is_finite() && radius >= 0.0) {
            return Err(PopulateError::invalid_argument("radius", format!("must be non-negative, got {radius}")));
        }
        if count > MAX_PATTERN_COUNT {
            return Err(PopulateError::invalid_argument("count", format!("at most {MAX_PATTERN_COUNT} effects")));
        }

        let (scale_min, scale_max) = kind.scale_range();
        let effect_tag = format!("effect:{kind}");
        let requests = (0..count)
            .map(|_| {
                let angle = self.rng.gen_range(0.0..TAU);
                let distance = self.rng.gen_range(0.0..=radius);
                let position = Vec3::new(
                    center.x + angle.cos() * distance,
                    center.y + angle.sin() * distance,
                    center.z + symmetric_jitter(&mut self.rng, EFFECT_Z_JITTER),
                );
                let rotation = Rotator::new(
                    self.rng.gen_range(-180.0..=180.0),
                    self.rng.gen_range(-180.0..=180.0),
                    self.rng.gen_range(-180.0..=180.0),
                );
                let scale = self.rng.gen_range(scale_min..=scale_max);
                PlacementRequest::new(kind.asset(), Pose::from_position(position).with_rotation(rotation).with_uniform_scale(scale))
                    .with_tags(["layout:environment".to_string(), effect_tag.clone()])
            })
            .collect();

        let placed = self.place_all(requests);
        log::info!("Created {}/{} {} effects", placed.len(), count, kind);
        Ok(placed)
    }

    /// Populate a whole sector around the origin
    ///
    /// Places a twelve module hub station, up to four faction territories,
    /// three asteroid belts, a six gate network, nebula and dust effects, and
    /// two combat zones. A layout that fails is logged and skipped; the rest
    /// of the sector is still placed.
    pub fn populate_complete_sector(&mut self, assets: &SectorAssets) -> SectorLayout {
        let before = self.report;
        let mut layout = SectorLayout::default();

        let modules: Vec<&str> = assets.hub_modules.iter().map(String::as_str).collect();
        layout.hub = self.spawn_station_with_modules(
            &assets.hub_station,
            &modules,
            SECTOR_HUB_MODULES,
            SECTOR_HUB_SPACING,
            Vec3::zeros(),
        );

        if assets.factions.len() > SECTOR_FACTION_CENTERS.len() {
            log::warn!(
                "Sector has room for {} factions; ignoring {} more",
                SECTOR_FACTION_CENTERS.len(),
                assets.factions.len() - SECTOR_FACTION_CENTERS.len()
            );
        }
        for (faction, center) in assets.factions.iter().zip(SECTOR_FACTION_CENTERS) {
            let territory = self.populate_faction_territory(
                faction,
                Vec3::from(center),
                SECTOR_FACTION_RADIUS,
                SECTOR_FACTION_STATIONS,
                SECTOR_FACTION_SHIPS,
            );
            if let Some(territory) = self.keep_layout("faction territory", territory) {
                layout.territories.push(territory);
            }
        }

        let asteroid_assets: Vec<&str> = assets.asteroids.iter().map(String::as_str).collect();
        for (center, inner, outer, count) in SECTOR_BELTS {
            let belt = self.create_asteroid_belt(&asteroid_assets, Vec3::from(center), inner, outer, count);
            if let Some(belt) = self.keep_layout("asteroid belt", belt) {
                layout.asteroids.extend(belt);
            }
        }

        let gates: Vec<Vec3> = SECTOR_GATES.into_iter().map(Vec3::from).collect();
        layout.jump_gates = self.create_jump_gate_network(&gates, &assets.jump_gate, &assets.waypoint);

        for (center, kind, radius, count) in SECTOR_EFFECTS {
            let effects = self.create_environment_effects(Vec3::from(center), kind, radius, count);
            if let Some(effects) = self.keep_layout("environment effects", effects) {
                layout.effects.extend(effects);
            }
        }

        for (center, radius, ships_a, ships_b) in SECTOR_COMBAT_ZONES {
            let zone = self.populate_combat_zone(
                Vec3::from(center),
                radius,
                (&assets.combat_ship_a, ships_a),
                (&assets.combat_ship_b, ships_b),
            );
            if let Some(zone) = self.keep_layout("combat zone", zone) {
                layout.combat_zones.push(zone);
            }
        }

        log::info!("Populated complete sector with {} instances ({})", layout.total(), self.report.since(&before));
        layout
    }

    fn keep_layout<T>(&mut self, what: &str, result: Result<T, PopulateError>) -> Option<T> {
        match result {
            Ok(layout) => Some(layout),
            Err(e) => {
                log::error!("Cannot create {}: {}", what, e);
                self.report.skipped += 1;
                None
            }
        }
    }
}

fn tagged<const N: usize>(asset: &str, positions: Vec<Vec3>, tags: [&str; N]) -> Vec<PlacementRequest> {
    positions
        .into_iter()
        .map(|position| PlacementRequest::new(asset, Pose::from_position(position)).with_tags(tags))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::InMemoryWorld;
    use approx::assert_relative_eq;

    fn composer() -> SceneComposer<InMemoryWorld> {
        SceneComposer::new(InMemoryWorld::new()).with_seed(5)
    }

    #[test]
    fn test_station_modules_face_center() {
        let mut composer = composer();
        let center = Vec3::new(1000.0, 2000.0, 0.0);
        let placed = composer.spawn_station_with_modules("/Game/SM_Station", &["/Game/SM_ModA", "/Game/SM_ModB"], 4, 1000.0, center);

        assert_eq!(placed.len(), 5);
        assert!(placed[0].has_tag("station:core"));
        assert_relative_eq!(placed[0].pose.position, center);

        for (i, module) in placed[1..].iter().enumerate() {
            let offset = module.pose.position - center;
            assert_relative_eq!(offset.xy().norm(), 1000.0, epsilon = 1e-9);
            assert!(offset.z.abs() <= 100.0);
            assert_relative_eq!(module.pose.rotation.yaw, 90.0 * i as f64 + 180.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_failed_station_places_nothing() {
        let world = InMemoryWorld::new().with_failing_asset("/Game/SM_Station");
        let mut composer = SceneComposer::new(world).with_seed(5);
        let placed = composer.spawn_station_with_modules("/Game/SM_Station", &["/Game/SM_ModA"], 6, 800.0, Vec3::zeros());

        assert!(placed.is_empty());
        assert!(composer.gateway().is_empty());
        assert_eq!(composer.report().errored, 1);
    }

    #[test]
    fn test_asteroid_belt_ring() {
        let mut composer = composer();
        let assets = ["/Engine/BasicShapes/Sphere", "/Engine/BasicShapes/Cube"];
        let placed = composer.create_asteroid_belt(&assets, Vec3::zeros(), 4000.0, 6000.0, 60).unwrap();

        assert_eq!(placed.len(), 60);
        for asteroid in &placed {
            let ring = asteroid.pose.position.xy().norm();
            assert!((4000.0 - 1e-6..=6000.0 + 1e-6).contains(&ring));
            assert!(asteroid.pose.position.z.abs() <= 500.0);
            assert!((0.2..=2.0).contains(&asteroid.pose.scale.x));
            assert!(assets.contains(&asteroid.asset_reference.as_str()));
        }
    }

    #[test]
    fn test_asteroid_belt_rejects_inverted_radii() {
        let mut composer = composer();
        let result = composer.create_asteroid_belt(&["/Game/A"], Vec3::zeros(), 9000.0, 1000.0, 10);
        assert!(matches!(result, Err(PopulateError::Pattern(_))));
    }

    #[test]
    fn test_trading_route_waypoints() {
        let mut composer = composer();
        let end = Vec3::new(60000.0, 0.0, 0.0);
        let placed = composer.create_trading_route(Vec3::zeros(), end, 5, "/Game/Navigation/WaypointMarker");

        assert_eq!(placed.len(), 5);
        for (i, waypoint) in placed.iter().enumerate() {
            let expected_x = 60000.0 * (i + 1) as f64 / 6.0;
            assert!((waypoint.pose.position.x - expected_x).abs() <= 500.0);
            assert!(waypoint.pose.position.y.abs() <= 500.0);
            assert!(waypoint.pose.position.z.abs() <= 200.0);
        }
    }

    #[test]
    fn test_faction_territory_layout() {
        let mut composer = composer();
        let center = Vec3::new(15000.0, 0.0, 0.0);
        let territory = composer
            .populate_faction_territory(&FactionAssets::named("Faction_1"), center, 8000.0, 3, 6)
            .unwrap();

        assert_eq!(territory.stations.len(), 3);
        assert_eq!(territory.ships.len(), 6);
        assert_eq!(territory.waypoints.len(), 10);
        assert_eq!(territory.total(), 19);
        assert_eq!(composer.registry().len(), 19);

        for station in &territory.stations {
            assert_eq!(station.asset_reference, "/Game/Stations/Faction_1_Station");
            assert!((station.pose.position - center).norm() <= 8000.0 * 0.7 + 2000.0 + 1e-6);
        }
        for ship in &territory.ships {
            assert_eq!(ship.asset_reference, "/Game/Ships/Faction_1_Fighter");
            assert_relative_eq!((ship.pose.position - center).norm(), 6400.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_faction_territory_single_station_has_no_routes() {
        let mut composer = composer();
        let territory = composer
            .populate_faction_territory(&FactionAssets::named("Lone"), Vec3::zeros(), 3000.0, 1, 2)
            .unwrap();

        assert_eq!(territory.stations.len(), 1);
        assert!(territory.waypoints.is_empty());
        assert!(composer.populate_faction_territory(&FactionAssets::named("Lone"), Vec3::zeros(), 0.0, 1, 2).is_err());
    }

    #[test]
    fn test_jump_gate_network() {
        let mut composer = composer();
        let positions = [Vec3::new(20000.0, 0.0, 0.0), Vec3::new(0.0, 20000.0, 0.0), Vec3::new(-20000.0, 0.0, 0.0)];
        let network = composer.create_jump_gate_network(&positions, "/Engine/BasicShapes/Torus", "/Game/Navigation/WaypointMarker");

        assert_eq!(network.gates.len(), 3);
        assert_eq!(network.waypoints.len(), 6);
        for (gate, position) in network.gates.iter().zip(&positions) {
            assert_relative_eq!(gate.pose.position, *position);
            assert_eq!(gate.pose.scale, Vec3::new(20.0, 20.0, 5.0));
            assert!(gate.has_tag("layout:jump_gate"));
        }
    }

    #[test]
    fn test_refused_gate_breaks_the_chain() {
        let world = InMemoryWorld::new().with_failing_asset("/Game/SM_Gate");
        let mut composer = SceneComposer::new(world).with_seed(5);
        let network = composer.create_jump_gate_network(&[Vec3::zeros(), Vec3::x() * 1000.0], "/Game/SM_Gate", "/Game/SM_Marker");

        assert_eq!(network.total(), 0);
        assert_eq!(composer.report().errored, 2);
    }

    #[test]
    fn test_combat_zone_sides() {
        let mut composer = composer();
        let center = Vec3::new(8000.0, 8000.0, 0.0);
        let zone = composer
            .populate_combat_zone(center, 3000.0, ("/Game/Ships/Fighter_A", 4), ("/Game/Ships/Fighter_B", 5))
            .unwrap();

        assert_eq!(zone.faction_a.len(), 4);
        assert_eq!(zone.faction_b.len(), 5);
        let half_width = std::f64::consts::FRAC_PI_4 + 1e-9;
        for (ships, facing) in [(&zone.faction_a, Vec3::x()), (&zone.faction_b, -Vec3::x())] {
            for ship in ships {
                let offset = ship.pose.position - center;
                let planar = offset.xy().norm();
                assert!((900.0 - 1e-6..=2400.0 + 1e-6).contains(&planar));
                assert!(offset.z.abs() <= 200.0);
                let angle = (offset.xy().dot(&facing.xy()) / planar).clamp(-1.0, 1.0).acos();
                assert!(angle <= half_width);
                assert_eq!(ship.pose.rotation, Rotator::default());
            }
        }
        assert!(zone.faction_a.iter().all(|s| s.has_tag("side:a")));
    }

    #[test]
    fn test_environment_effects_by_kind() {
        let mut composer = composer();
        let center = Vec3::new(-10000.0, -10000.0, 0.0);
        let dust = composer.create_environment_effects(center, EffectKind::Dust, 6000.0, 25).unwrap();

        assert_eq!(dust.len(), 25);
        for cloud in &dust {
            let offset = cloud.pose.position - center;
            assert!(offset.xy().norm() <= 6000.0 + 1e-6);
            assert!(offset.z.abs() <= 1000.0);
            assert!((2.0..=8.0).contains(&cloud.pose.scale.x));
            assert_eq!(cloud.asset_reference, "/Engine/BasicShapes/Cube");
            assert!(cloud.has_tag("effect:dust"));
            for angle in [cloud.pose.rotation.pitch, cloud.pose.rotation.yaw, cloud.pose.rotation.roll] {
                assert!((-180.0..=180.0).contains(&angle));
            }
        }
    }

    #[test]
    fn test_effect_kind_names() {
        assert_eq!("Nebula".parse::<EffectKind>().unwrap(), EffectKind::Nebula);
        assert_eq!("energy_field".parse::<EffectKind>().unwrap(), EffectKind::Energy);
        assert!(matches!("plasma".parse::<EffectKind>(), Err(PopulateError::InvalidArgument { .. })));
        assert_eq!(EffectKind::Nebula.scale_range(), (5.0, 15.0));
    }

    #[test]
    fn test_complete_sector_totals() {
        let mut composer = composer();
        let sector = composer.populate_complete_sector(&SectorAssets::default());

        assert_eq!(sector.hub.len(), 13);
        assert_eq!(sector.territories.len(), 4);
        assert_eq!(sector.territories.iter().map(TerritoryLayout::total).sum::<usize>(), 76);
        assert_eq!(sector.asteroids.len(), 370);
        assert_eq!(sector.jump_gates.gates.len(), 6);
        assert_eq!(sector.jump_gates.waypoints.len(), 15);
        assert_eq!(sector.effects.len(), 40);
        assert_eq!(sector.combat_zones.iter().map(CombatLayout::total).sum::<usize>(), 14);

        assert_eq!(sector.total(), 534);
        assert_eq!(composer.registry().len(), 534);
        assert_eq!(composer.report().skipped, 0);
        assert_eq!(composer.clear_all(), 534);
    }

    #[test]
    fn test_sector_without_asteroid_assets_skips_belts() {
        let mut composer = composer();
        let assets = SectorAssets { asteroids: Vec::new(), factions: vec![FactionAssets::named("Solo")], ..SectorAssets::default() };
        let sector = composer.populate_complete_sector(&assets);

        assert!(sector.asteroids.is_empty());
        assert_eq!(sector.territories.len(), 1);
        assert_eq!(composer.report().skipped, 3);
        assert_eq!(sector.total(), 13 + 19 + 21 + 40 + 14);
    }

    #[test]
    fn test_sector_assets_from_toml() {
        let toml = "hub_station = \"/Game/SM_Hub\"\njump_gate = \"/Game/SM_Gate\"\n";
        let assets = SectorAssets::load_from_str(toml, crate::config::FileFormat::Toml).unwrap();

        assert_eq!(assets.hub_station, "/Game/SM_Hub");
        assert_eq!(assets.jump_gate, "/Game/SM_Gate");
        assert_eq!(assets.factions.len(), 4);
    }
}
