//! Nested `spawn_groups` / `rooms` / `corridors` documents

use super::{ConfigLoader, CorridorRequest, ParsedConfig, RoomRequest, SpawnGroup};
use crate::config::{ConfigError, FileFormat};
use crate::foundation::math::Vec3;
use crate::patterns::{is_jitter_amount, PatternParams, PatternSpec};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawDocument {
    spawn_groups: Vec<RawSpawnGroup>,
    rooms: Vec<RawRoom>,
    corridors: Vec<RawCorridor>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawSpawnGroup {
    asset_path: Option<String>,
    asset_reference: Option<String>,
    pattern: Option<String>,
    count: Option<usize>,
    pattern_params: PatternParams,
    rotation_randomness: Option<f64>,
    scale_randomness: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawRoom {
    #[serde(rename = "type", alias = "room_type")]
    room_type: Option<String>,
    center: Option<Vec<f64>>,
    size: Option<Vec<f64>>,
    theme: Option<String>,
    prop_density: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawCorridor {
    start: Option<Vec<f64>>,
    end: Option<Vec<f64>>,
    width: Option<f64>,
    height: Option<f64>,
    theme: Option<String>,
}

pub(super) fn parse(loader: &ConfigLoader, contents: &str, format: FileFormat) -> Result<ParsedConfig, ConfigError> {
    if contents.trim().is_empty() {
        log::warn!("Population config is empty");
        return Ok(ParsedConfig::default());
    }

    let raw: RawDocument = match format {
        FileFormat::Yaml => serde_yaml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))?,
        FileFormat::Toml => toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))?,
        FileFormat::Ron => ron::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))?,
        FileFormat::Csv => return Err(ConfigError::UnsupportedFormat("csv as nested document".to_string())),
    };

    if raw.spawn_groups.is_empty() && raw.rooms.is_empty() && raw.corridors.is_empty() {
        log::warn!("Population config has no spawn_groups, rooms or corridors");
    }

    let mut parsed = ParsedConfig::default();

    for (index, group) in raw.spawn_groups.into_iter().enumerate() {
        match spawn_group(&format!("spawn_groups[{index}]"), group) {
            Ok(group) => parsed.spawn_groups.push(group),
            Err(error) => parsed.skip(error),
        }
    }

    for (index, room) in raw.rooms.into_iter().enumerate() {
        match loader.room(&format!("rooms[{index}]"), room) {
            Ok(room) => parsed.rooms.push(room),
            Err(error) => parsed.skip(error),
        }
    }

    for (index, corridor) in raw.corridors.into_iter().enumerate() {
        match loader.corridor(&format!("corridors[{index}]"), corridor) {
            Ok(corridor) => parsed.corridors.push(corridor),
            Err(error) => parsed.skip(error),
        }
    }

    Ok(parsed)
}

fn spawn_group(entry: &str, raw: RawSpawnGroup) -> Result<SpawnGroup, ConfigError> {
    let asset_reference = raw
        .asset_path
        .or(raw.asset_reference)
        .filter(|asset| !asset.trim().is_empty())
        .ok_or_else(|| missing(entry, "asset_path"))?;

    let pattern = raw.pattern.unwrap_or_else(|| "grid".to_string());
    let mut parameters = raw.pattern_params;
    let center = parameters
        .vector(&pattern, "center", Vec3::zeros())
        .map_err(|e| invalid(entry, "pattern_params.center", e.to_string()))?;
    parameters.remove("center");

    let rotation_randomness = raw.rotation_randomness.unwrap_or(0.0);
    if !is_jitter_amount(rotation_randomness) {
        return Err(invalid(
            entry,
            "rotation_randomness",
            format!("must be a non-negative angle with a finite span, got {rotation_randomness}"),
        ));
    }

    let scale_randomness = raw.scale_randomness.unwrap_or(0.0);
    if !(0.0..1.0).contains(&scale_randomness) {
        return Err(invalid(entry, "scale_randomness", format!("must be in [0, 1), got {scale_randomness}")));
    }

    let mut spec = PatternSpec::new(pattern, raw.count.unwrap_or(1)).with_center(center);
    spec.parameters = parameters;

    Ok(SpawnGroup {
        asset_reference,
        spec,
        rotation_randomness,
        scale_randomness,
    })
}

impl ConfigLoader {
    fn room(&self, entry: &str, raw: RawRoom) -> Result<RoomRequest, ConfigError> {
        let room_type = raw
            .room_type
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| missing(entry, "type"))?;

        let center = triple(entry, "center", raw.center.as_deref(), self.room_defaults.center)?;
        let size = triple(entry, "size", raw.size.as_deref(), self.room_defaults.size)?;
        if size.x <= 0.0 || size.y <= 0.0 {
            return Err(invalid(entry, "size", format!("width and length must be positive, got {:?}", [size.x, size.y])));
        }

        let prop_density = raw.prop_density.unwrap_or(self.room_defaults.prop_density);
        if !(prop_density.is_finite() && prop_density >= 0.0) {
            return Err(invalid(entry, "prop_density", format!("must be non-negative, got {prop_density}")));
        }

        Ok(RoomRequest {
            room_type,
            center,
            size,
            theme: raw.theme.unwrap_or_else(|| self.default_theme.clone()),
            prop_density,
        })
    }

    fn corridor(&self, entry: &str, raw: RawCorridor) -> Result<CorridorRequest, ConfigError> {
        let defaults = &self.corridor_defaults;
        let width = raw.width.unwrap_or(defaults.width);
        let height = raw.height.unwrap_or(defaults.height);
        for (field, value) in [("width", width), ("height", height)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(invalid(entry, field, format!("must be positive, got {value}")));
            }
        }

        Ok(CorridorRequest {
            start: triple(entry, "start", raw.start.as_deref(), defaults.start)?,
            end: triple(entry, "end", raw.end.as_deref(), defaults.end)?,
            width,
            height,
            theme: raw.theme.unwrap_or_else(|| self.default_theme.clone()),
        })
    }
}

fn triple(entry: &str, field: &str, value: Option<&[f64]>, default: [f64; 3]) -> Result<Vec3, ConfigError> {
    match value {
        None => Ok(Vec3::from(default)),
        Some([x, y, z]) if [x, y, z].iter().all(|v| v.is_finite()) => Ok(Vec3::new(*x, *y, *z)),
        Some(other) => Err(invalid(entry, field, format!("expected [x, y, z], got {other:?}"))),
    }
}

fn missing(entry: &str, field: &str) -> ConfigError {
    ConfigError::MissingRequiredField {
        entry: entry.to_string(),
        field: field.to_string(),
    }
}

fn invalid(entry: &str, field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidField {
        entry: entry.to_string(),
        field: field.to_string(),
        reason: reason.into(),
    }
}
