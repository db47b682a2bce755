//! Room and corridor furnishing

use super::{PlacementRequest, PopulateError, SceneComposer};
use crate::foundation::math::{utils, Pose, Rotator, Vec2, Vec3};
use crate::gateway::InstantiationGateway;
use crate::placement::{Bounds2D, PlacementRule};
use rand::seq::SliceRandom;
use rand::Rng;

/// Floor area (1000 x 1000) that holds `PROPS_PER_AREA_UNIT` props at density 1
const AREA_UNIT: f64 = 1_000_000.0;
const PROPS_PER_AREA_UNIT: f64 = 10.0;

const BRIDGE_CONSOLES: usize = 8;
const BRIDGE_CONSOLE_OFFSET: f64 = 300.0;
const MIN_CARGO_CONTAINERS: usize = 5;
const CARGO_MARGIN: f64 = 500.0;
const BED_WALL_OFFSET: f64 = 200.0;
const QUARTERS_FURNITURE: [&str; 3] = ["desk", "chair", "locker"];
const QUARTERS_SPACING: f64 = 300.0;
const MIN_GENERIC_PROPS: usize = 3;
const GENERIC_MARGIN: f64 = 200.0;
const GENERIC_SPACING: f64 = 200.0;

/// Upper bound on a room's computed prop budget
pub const MAX_ROOM_PROPS: usize = 1_000;
/// Upper bound on the number of segments in one corridor
pub const MAX_CORRIDOR_SEGMENTS: usize = 10_000;

/// Rooms of the hub station: type, center, size
const HUB_ROOMS: [(&str, [f64; 3], [f64; 3]); 3] = [
    ("bridge", [0.0, 0.0, 100.0], [3000.0, 3000.0, 400.0]),
    ("cargo_bay", [5000.0, 0.0, 100.0], [4000.0, 4000.0, 600.0]),
    ("living_quarters", [-5000.0, 0.0, 100.0], [2000.0, 2000.0, 300.0]),
];
/// Corridors joining the hub bridge to its side rooms
const HUB_CORRIDORS: [([f64; 3], [f64; 3]); 2] = [
    ([1500.0, 0.0, 100.0], [5000.0, 0.0, 100.0]),
    ([-1500.0, 0.0, 100.0], [-5000.0, 0.0, 100.0]),
];

impl<G: InstantiationGateway> SceneComposer<G> {
    /// Furnish a room from its template and instantiate the props
    ///
    /// The prop budget is `area / 1e6 * 10 * density_class * density_multiplier`.
    /// Bridges get a centered command chair and eight wall consoles, cargo bays
    /// a container grid, living quarters a bed plus scattered furniture, and
    /// every other room type random template props.
    ///
    /// An unknown room type or unusable size is logged as an error and yields
    /// an empty list; it never aborts the caller's batch.
    pub fn populate_room(
        &mut self,
        room_type: &str,
        center: Vec3,
        size: Vec3,
        theme: &str,
        density_multiplier: f64,
    ) -> Vec<PlacementRequest> {
        let before = self.report;
        match self.plan_room(room_type, center, size, theme, density_multiplier) {
            Ok(plan) => {
                let placed = self.place_all(plan);
                log::info!("Created {} with {} props ({})", room_type, placed.len(), self.report.since(&before));
                placed
            }
            Err(e) => {
                log::error!("Cannot populate room '{}': {}", room_type, e);
                self.report.skipped += 1;
                Vec::new()
            }
        }
    }

    /// Compute a room's placement requests without instantiating anything
    ///
    /// Props whose type has no asset mapping are dropped with a warning, and
    /// random placements that run out of attempts are counted as under-filled.
    pub fn plan_room(
        &mut self,
        room_type: &str,
        center: Vec3,
        size: Vec3,
        theme: &str,
        density_multiplier: f64,
    ) -> Result<Vec<PlacementRequest>, PopulateError> {
        if !(density_multiplier.is_finite() && density_multiplier >= 0.0) {
            return Err(PopulateError::invalid_argument(
                "density_multiplier",
                format!("must be non-negative, got {density_multiplier}"),
            ));
        }

        let template = self.rooms.lookup(room_type)?.clone();
        let bounds = Bounds2D::from_center_size(center, size.x, size.y)?;
        let budget = bounds.area() / AREA_UNIT
            * PROPS_PER_AREA_UNIT
            * template.density_class.multiplier()
            * density_multiplier;
        let base_count = if budget > MAX_ROOM_PROPS as f64 {
            log::warn!("Room '{}' asks for {:.0} props; capping at {}", room_type, budget, MAX_ROOM_PROPS);
            MAX_ROOM_PROPS
        } else {
            budget as usize
        };

        let slots: Vec<(&str, Vec2)> = match room_type {
            "bridge" => {
                let mut slots = vec![("command_chair", bounds.center())];
                let consoles = self.apply_rule(
                    PlacementRule::AlongWalls { count: BRIDGE_CONSOLES, offset: BRIDGE_CONSOLE_OFFSET },
                    &bounds,
                );
                slots.extend(consoles.into_iter().map(|p| ("console", p)));
                slots
            }
            "cargo_bay" => {
                let count = MIN_CARGO_CONTAINERS.max(base_count / 2);
                self.apply_rule(PlacementRule::GridInBounds { count, margin: CARGO_MARGIN }, &bounds)
                    .into_iter()
                    .map(|p| ("cargo_container", p))
                    .collect()
            }
            "living_quarters" => {
                let mut slots: Vec<(&str, Vec2)> = self
                    .apply_rule(PlacementRule::AlongWalls { count: 1, offset: BED_WALL_OFFSET }, &bounds)
                    .into_iter()
                    .map(|p| ("bed", p))
                    .collect();
                let furniture = self.apply_rule(
                    PlacementRule::RandomInBounds {
                        count: QUARTERS_FURNITURE.len(),
                        margin: GENERIC_MARGIN,
                        min_spacing: QUARTERS_SPACING,
                    },
                    &bounds,
                );
                slots.extend(QUARTERS_FURNITURE.into_iter().zip(furniture));
                slots
            }
            _ => {
                let count = MIN_GENERIC_PROPS.max(base_count);
                let positions = self.apply_rule(
                    PlacementRule::RandomInBounds { count, margin: GENERIC_MARGIN, min_spacing: GENERIC_SPACING },
                    &bounds,
                );
                positions
                    .into_iter()
                    .filter_map(|p| template.prop_types.choose(&mut self.rng).map(|prop| (prop.as_str(), p)))
                    .collect()
            }
        };

        let context_tags = self.context_tags(&format!("room:{room_type}"), theme);
        let mut requests = Vec::with_capacity(slots.len());
        for (prop_type, point) in slots {
            let yaw = self.rng.gen_range(0.0..360.0);
            let pose = Pose::from_position(Vec3::new(point.x, point.y, center.z)).with_rotation(Rotator::from_yaw(yaw));
            if let Some(request) = self.prop_request(prop_type, pose, &context_tags) {
                requests.push(request);
            }
        }

        log::debug!(
            "Planned {} props for {} ({}x{}, base count {})",
            requests.len(),
            room_type,
            size.x,
            size.y,
            base_count
        );
        Ok(requests)
    }

    /// Line a corridor with alternating lights and wall panels
    ///
    /// One prop is placed every `corridor_segment_length` units (500 by
    /// default) of horizontal run from `start` to `end` inclusive. Props sit
    /// at `start.z` with a random yaw.
    pub fn create_corridor(&mut self, start: Vec3, end: Vec3, width: f64, height: f64, theme: &str) -> Vec<PlacementRequest> {
        let before = self.report;
        match self.plan_corridor(start, end, width, height, theme) {
            Ok(plan) => {
                let placed = self.place_all(plan);
                log::info!("Created corridor with {} props ({})", placed.len(), self.report.since(&before));
                placed
            }
            Err(e) => {
                log::error!("Cannot create corridor: {}", e);
                self.report.skipped += 1;
                Vec::new()
            }
        }
    }

    /// Compute a corridor's placement requests without instantiating anything
    pub fn plan_corridor(
        &mut self,
        start: Vec3,
        end: Vec3,
        width: f64,
        height: f64,
        theme: &str,
    ) -> Result<Vec<PlacementRequest>, PopulateError> {
        for (name, value) in [("width", width), ("height", height)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(PopulateError::invalid_argument(name, format!("must be positive, got {value}")));
            }
        }

        if !(start.iter().chain(end.iter()).all(|v| v.is_finite())) {
            return Err(PopulateError::invalid_argument(
                "end",
                format!("corridor endpoints must be finite, got {start:?} to {end:?}"),
            ));
        }

        let run = (end.xy() - start.xy()).norm() / self.settings.corridor_segment_length;
        if !(run <= MAX_CORRIDOR_SEGMENTS as f64) {
            return Err(PopulateError::invalid_argument(
                "end",
                format!("corridor needs {run:.0} segments, at most {MAX_CORRIDOR_SEGMENTS} are allowed"),
            ));
        }
        let segments = (run as usize).max(1);
        let context_tags = self.context_tags("corridor", theme);

        let mut requests = Vec::new();
        for i in 0..=segments {
            let t = i as f64 / segments as f64;
            let prop_type = if i % 2 == 0 { "light" } else { "wall_panel" };
            let position = Vec3::new(utils::lerp(start.x, end.x, t), utils::lerp(start.y, end.y, t), start.z);
            let yaw = self.rng.gen_range(0.0..360.0);
            let pose = Pose::from_position(position).with_rotation(Rotator::from_yaw(yaw));
            if let Some(request) = self.prop_request(prop_type, pose, &context_tags) {
                requests.push(request);
            }
        }

        log::debug!("Planned {} corridor props over {} segments", requests.len(), segments);
        Ok(requests)
    }

    /// Build a complete station interior of rooms joined by corridors
    ///
    /// Only the `"hub"` layout exists: a bridge at the origin with a cargo bay
    /// and living quarters on either side. Corridors use the configured
    /// default width and height. Any other station type is an error and
    /// places nothing.
    pub fn populate_station_interior(
        &mut self,
        station_type: &str,
        theme: &str,
    ) -> Result<Vec<PlacementRequest>, PopulateError> {
        if station_type != "hub" {
            return Err(PopulateError::invalid_argument(
                "station_type",
                format!("unknown station layout '{station_type}'"),
            ));
        }

        let before = self.report;
        let (width, height) = (self.settings.corridor_defaults.width, self.settings.corridor_defaults.height);
        let [bridge, cargo_bay, quarters] = HUB_ROOMS;

        let mut placed = self.populate_hub_room(bridge, theme);
        for (start, end) in HUB_CORRIDORS {
            placed.extend(self.create_corridor(Vec3::from(start), Vec3::from(end), width, height, theme));
        }
        placed.extend(self.populate_hub_room(cargo_bay, theme));
        placed.extend(self.populate_hub_room(quarters, theme));

        log::info!("Built {} station interior ({})", station_type, self.report.since(&before));
        Ok(placed)
    }

    fn populate_hub_room(&mut self, (room_type, center, size): (&str, [f64; 3], [f64; 3]), theme: &str) -> Vec<PlacementRequest> {
        self.populate_room(room_type, Vec3::from(center), Vec3::from(size), theme, 1.0)
    }

    fn apply_rule(&mut self, rule: PlacementRule, bounds: &Bounds2D) -> Vec<Vec2> {
        let points = rule.apply(bounds, &mut self.rng);
        let missing = rule.requested().saturating_sub(points.len());
        if missing > 0 {
            log::warn!("Placement filled {}/{} slots", points.len(), rule.requested());
            self.report.underfilled += missing;
        }
        points
    }

    fn context_tags(&self, scope_tag: &str, theme: &str) -> Vec<String> {
        let mut tags = vec![scope_tag.to_string()];
        match self.themes.lookup(theme) {
            Ok(theme) => tags.extend(theme.tags()),
            Err(e) => log::warn!("{}; placing without theme tags", e),
        }
        tags
    }

    fn prop_request(&mut self, prop_type: &str, pose: Pose, context_tags: &[String]) -> Option<PlacementRequest> {
        match self.settings.prop_assets.resolve(prop_type) {
            Ok(asset_reference) => Some(
                PlacementRequest::new(asset_reference, pose)
                    .with_tag(format!("prop:{prop_type}"))
                    .with_tags(context_tags.iter().cloned()),
            ),
            Err(e) => {
                log::warn!("{}; skipping prop", e);
                self.report.skipped += 1;
                None
            }
        }
    }
}
