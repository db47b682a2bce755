//! Placement strategies over a rectangular footprint

use super::Bounds2D;
use crate::foundation::math::{utils, Vec2};
use crate::patterns::lattice_side;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// A bounded-area placement strategy with its parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum PlacementRule {
    /// Distribute along the walls by perimeter fraction
    AlongWalls {
        /// Number of points
        count: usize,
        /// Inset from the wall
        offset: f64,
    },
    /// Lattice inside the shrunk bounds
    GridInBounds {
        /// Number of points
        count: usize,
        /// Margin from the walls
        margin: f64,
    },
    /// Greedy random placement with a minimum spacing
    RandomInBounds {
        /// Number of points wanted (may under-fill)
        count: usize,
        /// Margin from the walls
        margin: f64,
        /// Minimum distance between accepted points
        min_spacing: f64,
    },
    /// A single point at the midpoint
    Centered,
}

impl PlacementRule {
    /// Number of points the rule asks for
    pub const fn requested(&self) -> usize {
        match *self {
            Self::AlongWalls { count, .. } | Self::GridInBounds { count, .. } | Self::RandomInBounds { count, .. } => {
                count
            }
            Self::Centered => 1,
        }
    }

    /// Evaluate the rule over `bounds`
    pub fn apply<R: Rng + ?Sized>(&self, bounds: &Bounds2D, rng: &mut R) -> Vec<Vec2> {
        match *self {
            Self::AlongWalls { count, offset } => along_walls(bounds, count, offset),
            Self::GridInBounds { count, margin } => grid_in_bounds(bounds, count, margin),
            Self::RandomInBounds { count, margin, min_spacing } => {
                random_in_bounds(bounds, count, margin, min_spacing, rng)
            }
            Self::Centered => vec![centered(bounds)],
        }
    }
}

/// Points walked along the perimeter at `perimeter / count` steps
///
/// The walk goes bottom, right, top, left; each point is inset by `offset`
/// from the wall it sits on.
pub fn along_walls(bounds: &Bounds2D, count: usize, offset: f64) -> Vec<Vec2> {
    if count == 0 {
        return Vec::new();
    }

    let (min_x, min_y, max_x, max_y) = (bounds.min_x(), bounds.min_y(), bounds.max_x(), bounds.max_y());
    let width = bounds.width();
    let length = bounds.length();
    let step = bounds.perimeter() / count as f64;

    (0..count)
        .map(|i| {
            let distance = i as f64 * step;
            if distance < width {
                Vec2::new(min_x + distance, min_y + offset)
            } else if distance < width + length {
                Vec2::new(max_x - offset, min_y + (distance - width))
            } else if distance < 2.0 * width + length {
                Vec2::new(max_x - (distance - width - length), max_y - offset)
            } else {
                Vec2::new(min_x + offset, max_y - (distance - 2.0 * width - length))
            }
        })
        .collect()
}

/// Lattice of `ceil(sqrt(count))` columns inside the bounds shrunk by `margin`
///
/// Points sit at cell centers. A margin that swallows the room collapses the
/// lattice onto the midline.
pub fn grid_in_bounds(bounds: &Bounds2D, count: usize, margin: f64) -> Vec<Vec2> {
    if count == 0 {
        return Vec::new();
    }

    let side = lattice_side(count);
    let usable_x = (bounds.width() - 2.0 * margin).max(0.0);
    let usable_y = (bounds.length() - 2.0 * margin).max(0.0);
    let spacing_x = usable_x / side as f64;
    let spacing_y = usable_y / side as f64;
    let origin_x = bounds.center().x - usable_x / 2.0;
    let origin_y = bounds.center().y - usable_y / 2.0;

    (0..count)
        .map(|i| {
            let row = (i / side) as f64;
            let col = (i % side) as f64;
            Vec2::new(
                origin_x + col * spacing_x + spacing_x / 2.0,
                origin_y + row * spacing_y + spacing_y / 2.0,
            )
        })
        .collect()
}

/// Greedy rejection placement honoring `min_spacing`
///
/// Candidates are drawn uniformly from the bounds shrunk by `margin` and kept
/// only if they are at least `min_spacing` from every accepted point. At most
/// `count * 10` candidates are drawn, so the result may hold fewer than
/// `count` points.
pub fn random_in_bounds<R: Rng + ?Sized>(
    bounds: &Bounds2D,
    count: usize,
    margin: f64,
    min_spacing: f64,
    rng: &mut R,
) -> Vec<Vec2> {
    let max_attempts = count.saturating_mul(10);
    let min_spacing_sq = min_spacing * min_spacing;
    let mut positions: Vec<Vec2> = Vec::new();
    let mut attempts = 0;

    while positions.len() < count && attempts < max_attempts {
        let candidate = Vec2::new(
            sample_axis(rng, bounds.min_x() + margin, bounds.max_x() - margin),
            sample_axis(rng, bounds.min_y() + margin, bounds.max_y() - margin),
        );

        if positions.iter().all(|p| (p - candidate).norm_squared() >= min_spacing_sq) {
            positions.push(candidate);
        }
        attempts += 1;
    }

    if positions.len() < count {
        log::debug!(
            "random_in_bounds placed {}/{} points after {} attempts",
            positions.len(),
            count,
            attempts
        );
    }

    positions
}

fn sample_axis<R: Rng + ?Sized>(rng: &mut R, low: f64, high: f64) -> f64 {
    if high > low {
        utils::lerp(low, high, rng.gen::<f64>())
    } else {
        (low + high) / 2.0
    }
}

/// The midpoint of the bounds
pub fn centered(bounds: &Bounds2D) -> Vec2 {
    bounds.center()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn room() -> Bounds2D {
        Bounds2D::new(0.0, 0.0, 1000.0, 500.0).unwrap()
    }

    #[test]
    fn test_along_walls_walks_each_side() {
        // perimeter 3000, step 750: two on the bottom, two on the top
        let points = along_walls(&room(), 4, 50.0);

        assert_eq!(points.len(), 4);
        assert_eq!(points[0], Vec2::new(0.0, 50.0));
        assert_eq!(points[1], Vec2::new(750.0, 50.0));
        assert_eq!(points[2], Vec2::new(1000.0, 450.0));
        assert_eq!(points[3], Vec2::new(250.0, 450.0));

        let right = along_walls(&room(), 6, 50.0);
        // step 500: distance 1000 is the first point on the right wall
        assert_eq!(right[2], Vec2::new(950.0, 0.0));
    }

    #[test]
    fn test_along_walls_reaches_left_wall() {
        let points = along_walls(&room(), 8, 10.0);

        // step 375: the last point lands at distance 2625 on the left wall
        let last = points[7];
        assert_relative_eq!(last.x, 10.0);
        assert_relative_eq!(last.y, 500.0 - (2625.0 - 2500.0));
    }

    #[test]
    fn test_along_walls_zero_count() {
        assert!(along_walls(&room(), 0, 100.0).is_empty());
    }

    #[test]
    fn test_grid_in_bounds_respects_margin() {
        let points = grid_in_bounds(&room(), 9, 100.0);

        assert_eq!(points.len(), 9);
        for p in &points {
            assert!(p.x >= 100.0 && p.x <= 900.0);
            assert!(p.y >= 100.0 && p.y <= 400.0);
        }
        // center cell of a 3x3 lattice is the room center
        assert_relative_eq!(points[4], Vec2::new(500.0, 250.0), epsilon = 1e-9);
    }

    #[test]
    fn test_grid_in_bounds_oversized_margin_collapses() {
        let points = grid_in_bounds(&room(), 4, 400.0);

        assert_eq!(points.len(), 4);
        for p in &points {
            assert_relative_eq!(p.y, 250.0);
        }
    }

    #[test]
    fn test_random_in_bounds_spacing_and_cap() {
        let bounds = room();
        let mut rng = StdRng::seed_from_u64(11);
        let points = random_in_bounds(&bounds, 10, 20.0, 50.0, &mut rng);

        assert!(points.len() <= 10);
        for (i, a) in points.iter().enumerate() {
            assert!(a.x >= 20.0 && a.x <= 980.0);
            assert!(a.y >= 20.0 && a.y <= 480.0);
            for b in &points[i + 1..] {
                assert!((a - b).norm() >= 50.0);
            }
        }
    }

    #[test]
    fn test_random_in_bounds_underfills_silently() {
        let tiny = Bounds2D::new(0.0, 0.0, 100.0, 100.0).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let points = random_in_bounds(&tiny, 20, 0.0, 90.0, &mut rng);

        assert!(!points.is_empty());
        assert!(points.len() < 20);
    }

    #[test]
    fn test_centered_rule() {
        let mut rng = StdRng::seed_from_u64(0);
        let points = PlacementRule::Centered.apply(&room(), &mut rng);

        assert_eq!(points, vec![Vec2::new(500.0, 250.0)]);
        assert_eq!(PlacementRule::Centered.requested(), 1);
    }
}
