//! The scene composer

use super::{BatchReport, PlacementRequest, PopulateError, SpawnRegistry};
use crate::catalog::{PropAssetTable, RoomTemplateCatalog, ThemeCatalog};
use crate::config::{ConfigError, PopulatorSettings};
use crate::foundation::collections::InstanceHandle;
use crate::foundation::math::{Pose, Rotator};
use crate::gateway::InstantiationGateway;
use crate::loader::{write_instances, ParsedConfig};
use crate::patterns::{self, is_jitter_amount, symmetric_jitter, PatternKind, PatternSpec};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Orchestrates placement against one gateway
///
/// A composer exclusively owns its random source, spawn registry and batch
/// report. Independent population jobs should use independent composers.
pub struct SceneComposer<G: InstantiationGateway> {
    pub(super) gateway: G,
    pub(super) settings: PopulatorSettings,
    pub(super) rooms: RoomTemplateCatalog,
    pub(super) themes: ThemeCatalog,
    pub(super) rng: StdRng,
    pub(super) registry: SpawnRegistry,
    pub(super) report: BatchReport,
}

impl<G: InstantiationGateway> SceneComposer<G> {
    /// Composer with the stock settings and catalogs
    pub fn new(gateway: G) -> Self {
        Self::with_settings(gateway, PopulatorSettings::default())
    }

    /// Composer with explicit settings; seeded from `settings.seed` if set
    pub fn with_settings(gateway: G, settings: PopulatorSettings) -> Self {
        let rng = settings.seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);

        Self {
            gateway,
            settings,
            rooms: RoomTemplateCatalog::builtin(),
            themes: ThemeCatalog::builtin(),
            rng,
            registry: SpawnRegistry::new(),
            report: BatchReport::default(),
        }
    }

    /// Builder pattern: reseed the random source
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.settings.seed = Some(seed);
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Builder pattern: replace the room template catalog
    #[must_use]
    pub fn with_room_catalog(mut self, rooms: RoomTemplateCatalog) -> Self {
        self.rooms = rooms;
        self
    }

    /// Builder pattern: replace the theme catalog
    #[must_use]
    pub fn with_theme_catalog(mut self, themes: ThemeCatalog) -> Self {
        self.themes = themes;
        self
    }

    /// Builder pattern: replace the prop asset table
    #[must_use]
    pub fn with_prop_assets(mut self, prop_assets: PropAssetTable) -> Self {
        self.settings.prop_assets = prop_assets;
        self
    }

    /// Settings in effect
    pub const fn settings(&self) -> &PopulatorSettings {
        &self.settings
    }

    /// Room template catalog in use
    pub const fn room_catalog(&self) -> &RoomTemplateCatalog {
        &self.rooms
    }

    /// Theme catalog in use
    pub const fn theme_catalog(&self) -> &ThemeCatalog {
        &self.themes
    }

    /// The gateway
    pub const fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Mutable access to the gateway
    pub fn gateway_mut(&mut self) -> &mut G {
        &mut self.gateway
    }

    /// Give up the composer, returning its gateway
    ///
    /// Registered instances stay in the world.
    pub fn into_gateway(self) -> G {
        self.gateway
    }

    /// Handles created so far and their requests
    pub const fn registry(&self) -> &SpawnRegistry {
        &self.registry
    }

    /// Counts accumulated since construction or the last [`take_report`](Self::take_report)
    pub const fn report(&self) -> &BatchReport {
        &self.report
    }

    /// Return the accumulated counts and reset them
    pub fn take_report(&mut self) -> BatchReport {
        std::mem::take(&mut self.report)
    }

    /// Instantiate one request and register its handle
    ///
    /// A refused instantiation is logged and counted; it never aborts the
    /// caller's batch.
    pub fn place(&mut self, request: PlacementRequest) -> Option<InstanceHandle> {
        match self.gateway.instantiate(&request.asset_reference, &request.pose) {
            Ok(handle) => {
                log::debug!(
                    "Placed {} at ({:.1}, {:.1}, {:.1}) as {}",
                    request.asset_reference,
                    request.pose.position.x,
                    request.pose.position.y,
                    request.pose.position.z,
                    handle
                );
                self.registry.insert(handle, request);
                self.report.created += 1;
                Some(handle)
            }
            Err(e) => {
                log::warn!("{}", e);
                self.report.errored += 1;
                None
            }
        }
    }

    /// Instantiate every request, returning the ones the gateway accepted
    pub fn place_all(&mut self, requests: Vec<PlacementRequest>) -> Vec<PlacementRequest> {
        let mut placed = Vec::with_capacity(requests.len());
        for request in requests {
            if self.place(request.clone()).is_some() {
                placed.push(request);
            }
        }
        placed
    }

    /// Lay out `spec.count` copies of `asset_reference` with a pattern
    ///
    /// Each copy gets an independent rotation in `±rotation_randomness`
    /// degrees per axis and a uniform scale of `1 ± scale_randomness`.
    pub fn spawn_pattern(
        &mut self,
        asset_reference: &str,
        spec: &PatternSpec,
        rotation_randomness: f64,
        scale_randomness: f64,
    ) -> Result<Vec<PlacementRequest>, PopulateError> {
        if asset_reference.trim().is_empty() {
            return Err(PopulateError::invalid_argument("asset_reference", "cannot be empty"));
        }
        if !(0.0..1.0).contains(&scale_randomness) {
            return Err(PopulateError::invalid_argument(
                "scale_randomness",
                format!("must be in [0, 1), got {scale_randomness}"),
            ));
        }
        if !is_jitter_amount(rotation_randomness) {
            return Err(PopulateError::invalid_argument(
                "rotation_randomness",
                format!("must be a non-negative angle with a finite span, got {rotation_randomness}"),
            ));
        }

        let kind: PatternKind = spec.pattern_name.parse()?;
        let positions = patterns::generate(spec, &mut self.rng)?;
        let pattern_tag = format!("pattern:{kind}");

        let requests: Vec<_> = positions
            .into_iter()
            .map(|position| {
                let rotation = Rotator::new(
                    symmetric_jitter(&mut self.rng, rotation_randomness),
                    symmetric_jitter(&mut self.rng, rotation_randomness),
                    symmetric_jitter(&mut self.rng, rotation_randomness),
                );
                let scale = 1.0 + symmetric_jitter(&mut self.rng, scale_randomness);
                let pose = Pose::from_position(position).with_rotation(rotation).with_uniform_scale(scale);
                PlacementRequest::new(asset_reference, pose).with_tag(pattern_tag.clone())
            })
            .collect();

        let placed = self.place_all(requests);
        log::info!(
            "Spawned {}/{} instances of {} using {} pattern",
            placed.len(),
            spec.count,
            asset_reference,
            kind
        );
        Ok(placed)
    }

    /// Place one instance at an exact pose
    pub fn place_instance(&mut self, asset_reference: &str, pose: Pose) -> Option<InstanceHandle> {
        self.place(PlacementRequest::new(asset_reference, pose).with_tag("source:explicit"))
    }

    /// Run every entry of a parsed config
    ///
    /// Entries the loader already rejected count as skipped. Spawn groups with
    /// an unknown pattern or bad parameters are skipped with a warning; rooms,
    /// corridors and instances follow their own failure rules. Returns every
    /// request the gateway accepted.
    pub fn populate_from_config(&mut self, config: &ParsedConfig) -> Vec<PlacementRequest> {
        let before = self.report;
        let mut placed = Vec::new();
        self.report.skipped += config.skipped.len();

        for group in &config.spawn_groups {
            match self.spawn_pattern(
                &group.asset_reference,
                &group.spec,
                group.rotation_randomness,
                group.scale_randomness,
            ) {
                Ok(requests) => placed.extend(requests),
                Err(e) => {
                    log::warn!("Skipping spawn group for {}: {}", group.asset_reference, e);
                    self.report.skipped += 1;
                }
            }
        }

        for room in &config.rooms {
            placed.extend(self.populate_room(&room.room_type, room.center, room.size, &room.theme, room.prop_density));
        }

        for corridor in &config.corridors {
            placed.extend(self.create_corridor(
                corridor.start,
                corridor.end,
                corridor.width,
                corridor.height,
                &corridor.theme,
            ));
        }

        for instance in &config.instances {
            let request = PlacementRequest::new(instance.asset_reference.clone(), instance.pose).with_tag("source:explicit");
            if self.place(request.clone()).is_some() {
                placed.push(request);
            }
        }

        log::info!(
            "Populated {} spawn groups, {} rooms, {} corridors and {} instances: {}",
            config.spawn_groups.len(),
            config.rooms.len(),
            config.corridors.len(),
            config.instances.len(),
            self.report.since(&before)
        );
        placed
    }

    /// Destroy every registered instance and empty the registry
    ///
    /// Destroy failures are logged; the handle is forgotten either way.
    /// Calling this again on an empty registry does nothing. Returns the
    /// number of instances actually destroyed.
    pub fn clear_all(&mut self) -> usize {
        let entries = self.registry.drain();
        let total = entries.len();
        let mut destroyed = 0;

        for (handle, request) in entries {
            match self.gateway.destroy(handle) {
                Ok(()) => destroyed += 1,
                Err(e) => log::warn!("Error destroying {} ({}): {}", handle, request.asset_reference, e),
            }
        }

        if total > 0 {
            log::info!("Cleared {}/{} spawned instances", destroyed, total);
        }
        destroyed
    }

    /// Write the registry as CSV rows, in spawn order
    pub fn export_csv_to<W: Write>(&self, writer: W) -> Result<usize, ConfigError> {
        let ordered = self.registry.iter_in_spawn_order();
        write_instances(
            writer,
            ordered.iter().map(|(_, request)| (request.asset_reference.as_str(), &request.pose)),
        )
    }

    /// Write the registry to a CSV file
    pub fn export_csv(&self, path: impl AsRef<Path>) -> Result<usize, ConfigError> {
        let path = path.as_ref();
        let written = self.export_csv_to(BufWriter::new(File::create(path)?))?;
        log::info!("Exported {} instances to {}", written, path.display());
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FileFormat;
    use crate::foundation::math::Vec3;
    use crate::gateway::InMemoryWorld;
    use crate::loader::ConfigLoader;
    use approx::assert_relative_eq;

    fn composer() -> SceneComposer<InMemoryWorld> {
        SceneComposer::new(InMemoryWorld::new()).with_seed(42)
    }

    #[test]
    fn test_spawn_pattern_registers_every_instance() {
        let mut composer = composer();
        let spec = PatternSpec::new("grid", 9).with_param("spacing", 1000.0);
        let placed = composer.spawn_pattern("/Game/SM_Buoy", &spec, 0.0, 0.0).unwrap();

        assert_eq!(placed.len(), 9);
        assert_eq!(composer.registry().len(), 9);
        assert_eq!(composer.gateway().len(), 9);
        assert!(placed.iter().all(|r| r.has_tag("pattern:grid") && r.pose.scale == Vec3::new(1.0, 1.0, 1.0)));
        assert_eq!(composer.report().created, 9);
    }

    #[test]
    fn test_spawn_pattern_randomness_bounds() {
        let mut composer = composer();
        let spec = PatternSpec::new("random", 50).with_param("radius", 500.0);
        let placed = composer.spawn_pattern("/Game/SM_Rock", &spec, 30.0, 0.25).unwrap();

        for request in &placed {
            let rotation = request.pose.rotation;
            for angle in [rotation.roll, rotation.pitch, rotation.yaw] {
                assert!((-30.0..=30.0).contains(&angle));
            }
            assert!((0.75..=1.25).contains(&request.pose.scale.x));
            assert_relative_eq!(request.pose.scale.x, request.pose.scale.z);
            assert!(request.pose.position.norm() <= 500.0 + 1e-9);
        }
    }

    #[test]
    fn test_unknown_pattern_is_an_error() {
        let mut composer = composer();
        let result = composer.spawn_pattern("/Game/A", &PatternSpec::new("hexagon", 3), 0.0, 0.0);

        assert!(matches!(result, Err(PopulateError::Pattern(_))));
        assert!(composer.registry().is_empty());
    }

    #[test]
    fn test_unsampleable_rotation_is_an_error() {
        let mut composer = composer();
        let spec = PatternSpec::new("grid", 4);

        for rotation in [1.0e308, f64::INFINITY, -5.0] {
            let result = composer.spawn_pattern("/Game/A", &spec, rotation, 0.0);
            assert!(matches!(result, Err(PopulateError::InvalidArgument { name: "rotation_randomness", .. })));
        }
        assert!(composer.registry().is_empty());
    }

    #[test]
    fn test_gateway_failures_are_counted_not_fatal() {
        let world = InMemoryWorld::new().with_failing_asset("/Game/SM_Broken");
        let mut composer = SceneComposer::new(world).with_seed(1);

        let config = ConfigLoader::new()
            .load_str(
                "spawn_groups:\n  - asset_path: /Game/SM_Broken\n    count: 3\n  - asset_path: /Game/SM_Fine\n    count: 2\n",
                FileFormat::Yaml,
            )
            .unwrap();
        let placed = composer.populate_from_config(&config);

        assert_eq!(placed.len(), 2);
        assert_eq!(composer.report().errored, 3);
        assert_eq!(composer.report().created, 2);
    }

    #[test]
    fn test_bad_group_is_skipped() {
        let mut composer = composer();
        let config = ConfigLoader::new()
            .load_str(
                "spawn_groups:\n  - asset_path: /Game/A\n    pattern: hexagon\n  - asset_path: /Game/B\n    pattern: line\n    count: 2\n",
                FileFormat::Yaml,
            )
            .unwrap();
        let placed = composer.populate_from_config(&config);

        assert_eq!(placed.len(), 2);
        assert_eq!(composer.report().skipped, 1);
    }

    #[test]
    fn test_clear_all_is_idempotent() {
        let mut composer = composer();
        composer.spawn_pattern("/Game/A", &PatternSpec::new("line", 4), 0.0, 0.0).unwrap();

        assert_eq!(composer.clear_all(), 4);
        assert!(composer.registry().is_empty());
        assert!(composer.gateway().is_empty());
        assert_eq!(composer.clear_all(), 0);
    }

    #[test]
    fn test_seeded_composers_agree() {
        let spec = PatternSpec::new("cluster", 12);
        let mut a = composer();
        let mut b = composer();

        let first = a.spawn_pattern("/Game/A", &spec, 10.0, 0.1).unwrap();
        let second = b.spawn_pattern("/Game/A", &spec, 10.0, 0.1).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_take_report_resets() {
        let mut composer = composer();
        composer.place_instance("/Game/A", Pose::identity());

        assert_eq!(composer.take_report().created, 1);
        assert_eq!(composer.report(), &BatchReport::default());
    }
}
