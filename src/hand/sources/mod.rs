//! The built-in hand sources, one module per device family

use glam::Vec3;

use crate::math::{Pose, UP, quat_lookat};
use super::model::{Finger, FingerJoint, HandState, Handedness, simulated_joint_radius};

pub mod articulated;
pub mod controller;
pub mod mouse;
pub mod none;
pub mod override_hand;

pub use articulated::ArticulatedSource;
pub use controller::ControllerSource;
pub use mouse::MouseSource;
pub use none::NoneSource;
pub use override_hand::OverrideSource;

/// Vertical drop from the head pivot to the shoulder line, meters
const SHOULDER_DROP: f32 = 0.2;
/// Lateral distance from the body center to a shoulder, meters
const SHOULDER_HALF_WIDTH: f32 = 0.08;

/// Fills a hand's joint radii with the canned simulated-hand values
pub(crate) fn seed_simulated_radii(hand: &mut HandState) {
    for finger in Finger::ALL {
        for joint in FingerJoint::ALL {
            hand.joints.get_mut(finger, joint).radius = simulated_joint_radius(finger, joint);
        }
    }
}

/// Estimates where a shoulder sits from the head pose
///
/// The head's facing is flattened to the horizontal plane so looking up or
/// down doesn't swing the shoulders.
pub(crate) fn estimate_shoulder(head: &Pose, handedness: Handedness) -> Vec3 {
    let fwd = head.forward();
    let flat = Vec3::new(fwd.x, 0.0, fwd.z);
    let flat = if flat.length_squared() < 1e-8 {
        crate::math::FORWARD
    } else {
        flat.normalize()
    };
    let side = match handedness {
        Handedness::Left => -1.0,
        Handedness::Right => 1.0,
    };
    head.position - UP * SHOULDER_DROP + flat.cross(UP) * (side * SHOULDER_HALF_WIDTH)
}

/// Aim pose anchored at a knuckle, oriented away from the shoulder
///
/// Pointing rays that originate at the shoulder feel steadier than rays
/// along the finger itself.
pub(crate) fn shoulder_aim(head: &Pose, knuckle: Vec3, handedness: Handedness) -> Pose {
    let shoulder = estimate_shoulder(head, handedness);
    Pose::new(knuckle, quat_lookat(shoulder, knuckle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::default_head;
    use crate::math::FORWARD;

    #[test]
    fn test_shoulders_sit_below_and_beside_head() {
        let head = default_head();
        let left = estimate_shoulder(&head, Handedness::Left);
        let right = estimate_shoulder(&head, Handedness::Right);
        assert!(left.y < head.position.y);
        assert!((left.y - right.y).abs() < 1e-6);
        // Facing -Z, the right shoulder is at greater x than the left.
        assert!(right.x > left.x);
    }

    #[test]
    fn test_shoulder_aim_points_outward() {
        let head = default_head();
        let knuckle = head.position + FORWARD * 0.4 - UP * 0.2;
        let aim = shoulder_aim(&head, knuckle, Handedness::Right);
        let dir = aim.forward();
        let expected = (knuckle - estimate_shoulder(&head, Handedness::Right)).normalize();
        assert!((dir - expected).length() < 1e-4);
    }
}
