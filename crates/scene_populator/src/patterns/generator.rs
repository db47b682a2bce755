//! Pattern evaluation
//!
//! [`generate`] resolves a [`PatternSpec`] by name, fills in defaults for
//! absent parameters, validates them, and dispatches to the typed functions
//! below. The typed functions do no validation of their own.

use super::{PatternError, PatternKind, PatternSpec};
use crate::foundation::math::{constants::TAU, utils, Vec3};
use rand::Rng;

/// Default lattice/line spacing
pub const DEFAULT_SPACING: f64 = 5000.0;
/// Default radius for sphere, orbit and spiral patterns
pub const DEFAULT_RADIUS: f64 = 10000.0;
/// Default number of clusters
pub const DEFAULT_CLUSTER_COUNT: f64 = 3.0;
/// Default radius of a single cluster
pub const DEFAULT_CLUSTER_RADIUS: f64 = 2000.0;
/// Default radius within which cluster centers are scattered
pub const DEFAULT_SPREAD: f64 = 10000.0;
/// Default spiral height
pub const DEFAULT_SPIRAL_HEIGHT: f64 = 5000.0;
/// Default number of spiral turns
pub const DEFAULT_SPIRAL_TURNS: f64 = 3.0;
/// Default belt inner radius
pub const DEFAULT_BELT_INNER: f64 = 3000.0;
/// Default belt outer radius
pub const DEFAULT_BELT_OUTER: f64 = 6000.0;
/// Default belt vertical jitter
pub const DEFAULT_BELT_Z_VARIATION: f64 = 500.0;
/// Largest `count` (and `cluster_count`) [`generate`] accepts
pub const MAX_PATTERN_COUNT: usize = 1_000_000;

/// Generate positions for a named pattern
///
/// `count == 0` yields an empty list. Unknown names and unusable parameters
/// are reported as [`PatternError`]s; sampling radii must be positive so that
/// rejection sampling terminates, and every numeric parameter must be finite.
pub fn generate<R: Rng + ?Sized>(spec: &PatternSpec, rng: &mut R) -> Result<Vec<Vec3>, PatternError> {
    let kind: PatternKind = spec.pattern_name.parse()?;
    let name = kind.name();
    let params = &spec.parameters;
    let center = spec.center;
    let count = spec.count;

    if count > MAX_PATTERN_COUNT {
        return Err(PatternError::invalid(
            name,
            "count",
            format!("at most {MAX_PATTERN_COUNT} positions per pattern, got {count}"),
        ));
    }

    let positions = match kind {
        PatternKind::Grid => {
            let spacing = non_negative(name, "spacing", params.number(name, "spacing", DEFAULT_SPACING)?)?;
            grid(count, spacing, center)
        }
        PatternKind::RandomSphere => {
            let radius = positive(name, "radius", params.number(name, "radius", DEFAULT_RADIUS)?)?;
            random_sphere(count, radius, center, rng)
        }
        PatternKind::Cluster => {
            let cluster_count = params.number(name, "cluster_count", DEFAULT_CLUSTER_COUNT)?;
            if !(1.0..=MAX_PATTERN_COUNT as f64).contains(&cluster_count) || cluster_count.fract() != 0.0 {
                return Err(PatternError::invalid(
                    name,
                    "cluster_count",
                    format!("must be a whole number from 1 to {MAX_PATTERN_COUNT}, got {cluster_count}"),
                ));
            }
            let cluster_radius = positive(
                name,
                "cluster_radius",
                params.number(name, "cluster_radius", DEFAULT_CLUSTER_RADIUS)?,
            )?;
            let spread = positive(name, "spread", params.number(name, "spread", DEFAULT_SPREAD)?)?;
            cluster(count, cluster_count as usize, cluster_radius, spread, center, rng)
        }
        PatternKind::Orbit => {
            let radius = non_negative(name, "radius", params.number(name, "radius", DEFAULT_RADIUS)?)?;
            let z_variation = jitter(name, "z_variation", params.number(name, "z_variation", 0.0)?)?;
            orbit(count, radius, z_variation, center, rng)
        }
        PatternKind::Spiral => {
            let radius = finite(name, "radius", params.number(name, "radius", DEFAULT_RADIUS)?)?;
            let height = finite(name, "height", params.number(name, "height", DEFAULT_SPIRAL_HEIGHT)?)?;
            let turns = finite(name, "turns", params.number(name, "turns", DEFAULT_SPIRAL_TURNS)?)?;
            spiral(count, radius, height, turns, center)
        }
        PatternKind::Line => {
            let spacing = finite(name, "spacing", params.number(name, "spacing", DEFAULT_SPACING)?)?;
            let start = params.vector(name, "start", center)?;
            let direction = params.vector(name, "direction", Vec3::x())?;
            line(count, spacing, start, direction)
        }
        PatternKind::Belt => {
            let inner = non_negative(name, "inner_radius", params.number(name, "inner_radius", DEFAULT_BELT_INNER)?)?;
            let outer = positive(name, "outer_radius", params.number(name, "outer_radius", DEFAULT_BELT_OUTER)?)?;
            if inner > outer {
                return Err(PatternError::invalid(
                    name,
                    "inner_radius",
                    format!("{inner} exceeds outer_radius {outer}"),
                ));
            }
            let z_variation = jitter(name, "z_variation", params.number(name, "z_variation", DEFAULT_BELT_Z_VARIATION)?)?;
            belt(count, inner, outer, z_variation, center, rng)
        }
    };

    log::trace!("Pattern '{}' produced {} of {} positions", name, positions.len(), count);
    Ok(positions)
}

fn finite(pattern: &str, name: &str, value: f64) -> Result<f64, PatternError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(PatternError::invalid(pattern, name, format!("must be finite, got {value}")))
    }
}

fn positive(pattern: &str, name: &str, value: f64) -> Result<f64, PatternError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(PatternError::invalid(pattern, name, format!("must be greater than zero, got {value}")))
    }
}

fn non_negative(pattern: &str, name: &str, value: f64) -> Result<f64, PatternError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(PatternError::invalid(pattern, name, format!("cannot be negative, got {value}")))
    }
}

fn jitter(pattern: &str, name: &str, value: f64) -> Result<f64, PatternError> {
    if is_jitter_amount(value) {
        Ok(value)
    } else {
        Err(PatternError::invalid(
            pattern,
            name,
            format!("must be non-negative with a finite span, got {value}"),
        ))
    }
}

/// Whether `[-amount, amount]` is a usable sampling interval
pub(crate) fn is_jitter_amount(amount: f64) -> bool {
    amount >= 0.0 && (2.0 * amount).is_finite()
}

/// Uniform sample in `[-amount, amount]`; zero when `amount` is not positive
pub(crate) fn symmetric_jitter<R: Rng + ?Sized>(rng: &mut R, amount: f64) -> f64 {
    if amount > 0.0 {
        rng.gen_range(-1.0..=1.0_f64) * amount
    } else {
        0.0
    }
}

/// Side length of the smallest square lattice holding `count` cells
pub(crate) fn lattice_side(count: usize) -> usize {
    let mut side = (count as f64).sqrt().ceil().max(1.0) as usize;
    while side * side < count {
        side += 1;
    }
    side
}

/// Square lattice of `ceil(sqrt(count))` columns centered on `center`
///
/// Rows fill left to right; a partial last row stops early. A single
/// position sits exactly on `center`.
pub fn grid(count: usize, spacing: f64, center: Vec3) -> Vec<Vec3> {
    if count == 0 {
        return Vec::new();
    }

    let side = lattice_side(count);
    let half = (side - 1) as f64 / 2.0;

    (0..count)
        .map(|i| {
            let row = (i / side) as f64;
            let col = (i % side) as f64;
            Vec3::new(
                center.x + (col - half) * spacing,
                center.y + (row - half) * spacing,
                center.z,
            )
        })
        .collect()
}

/// Uniform points inside a sphere by rejection sampling
///
/// There is no attempt cap: `radius` must be positive and finite.
pub fn random_sphere<R: Rng + ?Sized>(count: usize, radius: f64, center: Vec3, rng: &mut R) -> Vec<Vec3> {
    let radius_sq = radius * radius;
    let mut positions = Vec::with_capacity(count);

    while positions.len() < count {
        let offset = Vec3::new(
            rng.gen_range(-1.0..=1.0),
            rng.gen_range(-1.0..=1.0),
            rng.gen_range(-1.0..=1.0),
        ) * radius;

        if offset.norm_squared() <= radius_sq {
            positions.push(center + offset);
        }
    }

    positions
}

/// Split `count` into `cluster_count` groups, remainder to the lowest indices
pub fn cluster_group_sizes(count: usize, cluster_count: usize) -> Vec<usize> {
    if cluster_count == 0 {
        return Vec::new();
    }

    let base = count / cluster_count;
    let remainder = count % cluster_count;
    (0..cluster_count).map(|i| base + usize::from(i < remainder)).collect()
}

/// Groups of random spheres around randomly scattered cluster centers
///
/// Positions are ordered cluster by cluster.
pub fn cluster<R: Rng + ?Sized>(
    count: usize,
    cluster_count: usize,
    cluster_radius: f64,
    spread: f64,
    center: Vec3,
    rng: &mut R,
) -> Vec<Vec3> {
    if count == 0 || cluster_count == 0 {
        return Vec::new();
    }

    let centers = random_sphere(cluster_count, spread, center, rng);
    let mut positions = Vec::with_capacity(count);

    for (size, cluster_center) in cluster_group_sizes(count, cluster_count).into_iter().zip(centers) {
        positions.extend(random_sphere(size, cluster_radius, cluster_center, rng));
    }

    positions
}

/// Ring of `count` points spaced `360 / count` degrees apart
///
/// Each point gets an independent vertical offset in `[-z_variation, z_variation]`.
pub fn orbit<R: Rng + ?Sized>(count: usize, radius: f64, z_variation: f64, center: Vec3, rng: &mut R) -> Vec<Vec3> {
    if count == 0 {
        return Vec::new();
    }

    let step = 360.0 / count as f64;
    (0..count)
        .map(|i| {
            let angle = utils::deg_to_rad(i as f64 * step);
            Vec3::new(
                center.x + radius * angle.cos(),
                center.y + radius * angle.sin(),
                center.z + symmetric_jitter(rng, z_variation),
            )
        })
        .collect()
}

/// Spiral whose radius and height both grow linearly with `t = i / (count - 1)`
pub fn spiral(count: usize, radius: f64, height: f64, turns: f64, center: Vec3) -> Vec<Vec3> {
    let denominator = count.saturating_sub(1).max(1) as f64;

    (0..count)
        .map(|i| {
            let t = i as f64 / denominator;
            let angle = t * turns * TAU;
            let r = t * radius;
            Vec3::new(center.x + r * angle.cos(), center.y + r * angle.sin(), center.z + t * height)
        })
        .collect()
}

/// Evenly spaced points from `start` along `direction`
///
/// A zero-length direction falls back to +X.
pub fn line(count: usize, spacing: f64, start: Vec3, direction: Vec3) -> Vec<Vec3> {
    let unit = direction.try_normalize(f64::EPSILON).unwrap_or_else(Vec3::x);
    (0..count).map(|i| start + unit * (i as f64 * spacing)).collect()
}

/// Uniform ring between `inner` and `outer` radius with vertical jitter
pub fn belt<R: Rng + ?Sized>(
    count: usize,
    inner: f64,
    outer: f64,
    z_variation: f64,
    center: Vec3,
    rng: &mut R,
) -> Vec<Vec3> {
    (0..count)
        .map(|_| {
            let radius = if outer > inner { rng.gen_range(inner..=outer) } else { inner };
            let angle = rng.gen_range(0.0..TAU);
            Vec3::new(
                center.x + radius * angle.cos(),
                center.y + radius * angle.sin(),
                center.z + symmetric_jitter(rng, z_variation),
            )
        })
        .collect()
}

/// Intermediate points strictly between `start` and `end`
///
/// Waypoint `i` sits at `t = (i + 1) / (count + 1)`, offset per axis by a
/// uniform sample in `[-jitter, jitter]`.
pub fn waypoints<R: Rng + ?Sized>(start: Vec3, end: Vec3, count: usize, jitter: Vec3, rng: &mut R) -> Vec<Vec3> {
    let denominator = (count + 1) as f64;

    (0..count)
        .map(|i| {
            let t = (i + 1) as f64 / denominator;
            utils::lerp_vec3(&start, &end, t)
                + Vec3::new(
                    symmetric_jitter(rng, jitter.x),
                    symmetric_jitter(rng, jitter.y),
                    symmetric_jitter(rng, jitter.z),
                )
        })
        .collect()
}
