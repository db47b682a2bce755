//! Axis-aligned 2D footprint

use super::PlacementError;
use crate::foundation::math::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle; `max > min` on both axes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds2D {
    min_x: f64,
    min_y: f64,
    max_x: f64,
    max_y: f64,
}

impl Bounds2D {
    /// Create bounds from corners
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Result<Self, PlacementError> {
        let valid = [min_x, min_y, max_x, max_y].iter().all(|v| v.is_finite()) && max_x > min_x && max_y > min_y;
        if !valid {
            return Err(PlacementError::InvalidBounds { min_x, min_y, max_x, max_y });
        }
        Ok(Self { min_x, min_y, max_x, max_y })
    }

    /// Create bounds from a center point and (width, length)
    pub fn from_center_size(center: Vec3, width: f64, length: f64) -> Result<Self, PlacementError> {
        let half_w = width / 2.0;
        let half_l = length / 2.0;
        Self::new(center.x - half_w, center.y - half_l, center.x + half_w, center.y + half_l)
    }

    /// Minimum x
    pub const fn min_x(&self) -> f64 {
        self.min_x
    }

    /// Minimum y
    pub const fn min_y(&self) -> f64 {
        self.min_y
    }

    /// Maximum x
    pub const fn max_x(&self) -> f64 {
        self.max_x
    }

    /// Maximum y
    pub const fn max_y(&self) -> f64 {
        self.max_y
    }

    /// Extent along x
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Extent along y
    pub fn length(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Footprint area
    pub fn area(&self) -> f64 {
        self.width() * self.length()
    }

    /// Length of the boundary
    pub fn perimeter(&self) -> f64 {
        2.0 * (self.width() + self.length())
    }

    /// Midpoint
    pub fn center(&self) -> Vec2 {
        Vec2::new((self.min_x + self.max_x) / 2.0, (self.min_y + self.max_y) / 2.0)
    }

    /// Whether a point lies inside or on the boundary
    pub fn contains(&self, point: &Vec2) -> bool {
        (self.min_x..=self.max_x).contains(&point.x) && (self.min_y..=self.max_y).contains(&point.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_require_positive_extent() {
        assert!(Bounds2D::new(0.0, 0.0, 10.0, 5.0).is_ok());
        assert!(Bounds2D::new(0.0, 0.0, 0.0, 5.0).is_err());
        assert!(Bounds2D::new(0.0, 5.0, 10.0, 1.0).is_err());
        assert!(Bounds2D::new(f64::NAN, 0.0, 10.0, 5.0).is_err());
    }

    #[test]
    fn test_bounds_from_center_size() {
        let bounds = Bounds2D::from_center_size(Vec3::new(100.0, 50.0, 7.0), 200.0, 40.0).unwrap();

        assert_eq!(bounds.min_x(), 0.0);
        assert_eq!(bounds.max_y(), 70.0);
        assert_eq!(bounds.area(), 8000.0);
        assert_eq!(bounds.perimeter(), 480.0);
        assert_eq!(bounds.center(), Vec2::new(100.0, 50.0));
    }
}
