//! Math utilities and types
//!
//! Placement works in world units at `f64` precision. Rotations are kept as
//! Euler angles in degrees because that is what level editors and the CSV
//! interchange format speak.

use serde::{Deserialize, Serialize};

pub use nalgebra::{Vector2, Vector3};

/// 2D vector type
pub type Vec2 = Vector2<f64>;

/// 3D vector type
pub type Vec3 = Vector3<f64>;

/// Euler rotation in degrees
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rotator {
    /// Rotation around the forward axis
    pub roll: f64,

    /// Rotation around the right axis
    pub pitch: f64,

    /// Rotation around the up axis
    pub yaw: f64,
}

impl Rotator {
    /// Create a rotator from roll, pitch and yaw in degrees
    pub const fn new(roll: f64, pitch: f64, yaw: f64) -> Self {
        Self { roll, pitch, yaw }
    }

    /// Rotation around the up axis only
    pub const fn from_yaw(yaw: f64) -> Self {
        Self { roll: 0.0, pitch: 0.0, yaw }
    }
}

/// Placement pose: position, rotation and scale of one instance
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    /// World position
    pub position: Vec3,

    /// Rotation in degrees
    pub rotation: Rotator,

    /// Scale factors
    pub scale: Vec3,
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Rotator::default(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Pose {
    /// Create an identity pose
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create a pose with only position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Builder pattern: set rotation
    #[must_use]
    pub const fn with_rotation(mut self, rotation: Rotator) -> Self {
        self.rotation = rotation;
        self
    }

    /// Builder pattern: set uniform scale
    #[must_use]
    pub fn with_uniform_scale(mut self, scale: f64) -> Self {
        self.scale = Vec3::new(scale, scale, scale);
        self
    }

    /// Builder pattern: set non-uniform scale
    #[must_use]
    pub const fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }
}

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f64 = std::f64::consts::PI;

    /// 2 * Pi
    pub const TAU: f64 = 2.0 * PI;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f64 = PI / 180.0;

    /// Radians to degrees conversion factor
    pub const RAD_TO_DEG: f64 = 180.0 / PI;
}

/// Math utility functions
pub mod utils {
    use super::{constants, Vec3};

    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f64) -> f64 {
        degrees * constants::DEG_TO_RAD
    }

    /// Convert radians to degrees
    pub fn rad_to_deg(radians: f64) -> f64 {
        radians * constants::RAD_TO_DEG
    }

    /// Linear interpolation
    pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
        a + (b - a) * t
    }

    /// Linear interpolation between two points
    pub fn lerp_vec3(a: &Vec3, b: &Vec3, t: f64) -> Vec3 {
        a + (b - a) * t
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_pose_identity() {
        let pose = Pose::identity();

        assert_eq!(pose.position, Vec3::zeros());
        assert_eq!(pose.rotation, Rotator::default());
        assert_eq!(pose.scale, Vec3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn test_pose_builders() {
        let pose = Pose::from_position(Vec3::new(1.0, 2.0, 3.0))
            .with_rotation(Rotator::from_yaw(90.0))
            .with_uniform_scale(2.0);

        assert_eq!(pose.position, Vec3::new(1.0, 2.0, 3.0));
        assert_relative_eq!(pose.rotation.yaw, 90.0);
        assert_eq!(pose.scale, Vec3::new(2.0, 2.0, 2.0));
    }

    #[test]
    fn test_angle_conversion() {
        assert_relative_eq!(utils::deg_to_rad(180.0), constants::PI, epsilon = 1e-12);
        assert_relative_eq!(utils::rad_to_deg(constants::PI / 2.0), 90.0, epsilon = 1e-12);
    }

    #[test]
    fn test_lerp_endpoints() {
        assert_relative_eq!(utils::lerp(-2.0, 6.0, 0.0), -2.0);
        assert_relative_eq!(utils::lerp(-2.0, 6.0, 0.25), 0.0);
        assert_relative_eq!(utils::lerp(-2.0, 6.0, 1.0), 6.0);
    }
}
