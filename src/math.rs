//! Shared math value types and conventions
//!
//! The engine is right-handed with -Z forward and +Y up. All hand data is in
//! meters.

use glam::{Quat, Vec3};

/// Forward direction in local space
pub const FORWARD: Vec3 = Vec3::NEG_Z;
/// Up direction in local space
pub const UP: Vec3 = Vec3::Y;
/// Right direction in local space
pub const RIGHT: Vec3 = Vec3::X;

/// A position and orientation pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub orientation: Quat,
}

impl Pose {
    pub const IDENTITY: Pose = Pose {
        position: Vec3::ZERO,
        orientation: Quat::IDENTITY,
    };

    pub fn new(position: Vec3, orientation: Quat) -> Self {
        Self {
            position,
            orientation,
        }
    }

    /// The direction this pose is facing
    pub fn forward(&self) -> Vec3 {
        self.orientation * FORWARD
    }

    /// Transforms a point from this pose's local space into parent space
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.orientation * point + self.position
    }

    /// Transforms a point from parent space into this pose's local space
    pub fn inverse_transform_point(&self, point: Vec3) -> Vec3 {
        self.orientation.inverse() * (point - self.position)
    }

    /// Blends two poses: linear on position, spherical on orientation
    pub fn blend(&self, other: &Pose, t: f32) -> Pose {
        Pose {
            position: self.position.lerp(other.position, t),
            orientation: self.orientation.slerp(other.orientation, t),
        }
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// A ray with an origin and a (normalized) direction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub position: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(position: Vec3, direction: Vec3) -> Self {
        Self {
            position,
            direction,
        }
    }

    pub fn point_at(&self, distance: f32) -> Vec3 {
        self.position + self.direction * distance
    }
}

/// Builds a rotation from XYZ euler angles given in degrees
pub fn quat_from_degrees(x: f32, y: f32, z: f32) -> Quat {
    Quat::from_euler(
        glam::EulerRot::XYZ,
        x.to_radians(),
        y.to_radians(),
        z.to_radians(),
    )
}

/// Orientation that looks from `from` toward `at`, with +Y as the up hint
pub fn quat_lookat(from: Vec3, at: Vec3) -> Quat {
    let dir = at - from;
    if dir.length_squared() < 1e-12 {
        return Quat::IDENTITY;
    }
    let fwd = dir.normalize();
    let right = UP.cross(fwd);
    let right = if right.length_squared() < 1e-8 {
        RIGHT
    } else {
        right.normalize()
    };
    let up = fwd.cross(right);
    // Columns map local axes onto the target frame; local forward is -Z.
    Quat::from_mat3(&glam::Mat3::from_cols(right, up, -fwd))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pose_transform_round_trip() {
        let pose = Pose::new(Vec3::new(1.0, 2.0, 3.0), quat_from_degrees(30.0, 45.0, 0.0));
        let p = Vec3::new(0.2, -0.4, 0.6);
        let there = pose.transform_point(p);
        let back = pose.inverse_transform_point(there);
        assert!((back - p).length() < 1e-5);
    }

    #[test]
    fn test_pose_blend_endpoints() {
        let a = Pose::new(Vec3::ZERO, Quat::IDENTITY);
        let b = Pose::new(Vec3::ONE, quat_from_degrees(0.0, 90.0, 0.0));
        let at_a = a.blend(&b, 0.0);
        let at_b = a.blend(&b, 1.0);
        assert!((at_a.position - a.position).length() < 1e-6);
        assert!((at_b.position - b.position).length() < 1e-6);
        assert!(at_b.orientation.angle_between(b.orientation) < 1e-4);
    }

    #[test]
    fn test_quat_lookat_faces_target() {
        let from = Vec3::new(0.0, 1.0, 0.0);
        let at = Vec3::new(0.0, 1.0, -5.0);
        let rot = quat_lookat(from, at);
        let fwd = rot * FORWARD;
        assert!((fwd - Vec3::NEG_Z).length() < 1e-5);
    }

    #[test]
    fn test_ray_point_at() {
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
        assert!((ray.point_at(2.0) - Vec3::new(0.0, 0.0, -2.0)).length() < 1e-6);
    }
}
