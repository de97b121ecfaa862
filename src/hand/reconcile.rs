//! Coordinate reconciliation for simulated hands
//!
//! Templates are authored palm-relative for the left hand. This module
//! places them in world space at a source-provided root pose, mirrors them
//! for the right hand, and derives the palm and wrist poses every consumer
//! expects. Pure and stateless, so the high-frequency pose path can re-run
//! it without touching the rest of the frame update.

use glam::{Quat, Vec3};

use crate::math::{FORWARD, Pose, quat_from_degrees};
use super::model::{Finger, FingerJoint, HAND_JOINT_COUNT, HandPose, Handedness};

/// Distance from the wrist anchor midpoint back toward the forearm, meters
const WRIST_BACK_OFFSET: f32 = -0.03;

/// Palm and wrist poses derived alongside the world joints
#[derive(Debug, Clone, Copy)]
pub struct ReconciledFrame {
    pub palm: Pose,
    pub wrist: Pose,
}

/// Mirrors a left-authored local position across the YZ plane
fn mirror_position(handedness: Handedness, p: Vec3) -> Vec3 {
    match handedness {
        Handedness::Left => p,
        Handedness::Right => Vec3::new(-p.x, p.y, p.z),
    }
}

/// Mirrors a left-authored local orientation across the YZ plane
fn mirror_orientation(handedness: Handedness, q: Quat) -> Quat {
    match handedness {
        Handedness::Left => q,
        Handedness::Right => Quat::from_xyzw(q.x, -q.y, -q.z, q.w),
    }
}

/// The palm orientation for a source-provided pointing orientation
///
/// Sources hand over a "pointing" orientation (a controller grip, a mouse
/// ray); the palm frame is that orientation swung so fingers run along its
/// forward axis with the palm facing inward.
pub fn palm_orientation(handedness: Handedness, orientation: Quat) -> Quat {
    let swing = match handedness {
        Handedness::Left => quat_from_degrees(0.0, -90.0, 90.0),
        Handedness::Right => quat_from_degrees(0.0, 90.0, -90.0),
    };
    orientation * swing
}

/// Places palm-relative joints in world space and derives palm/wrist
///
/// `hand_pose` anchors the hand: its position is where the palm-relative
/// origin lands, its orientation is the source's pointing orientation. With
/// `center_on_fingertip` the whole hand is shifted so the index fingertip,
/// not the origin, lands on `hand_pose.position` (mouse hands point with
/// the fingertip). Joint radii in `out` are left untouched.
pub fn reconcile(
    handedness: Handedness,
    palm_relative: &[Pose; HAND_JOINT_COUNT],
    hand_pose: &Pose,
    center_on_fingertip: bool,
    out: &mut HandPose,
) -> ReconciledFrame {
    let rot = palm_orientation(handedness, hand_pose.orientation);

    let offset = if center_on_fingertip {
        let tip_local = palm_relative[Finger::Index as usize * 5 + FingerJoint::Tip as usize];
        -(rot * mirror_position(handedness, tip_local.position))
    } else {
        Vec3::ZERO
    };

    let joints = out.as_mut_slice();
    for (joint, local) in joints.iter_mut().zip(palm_relative.iter()) {
        joint.position =
            rot * mirror_position(handedness, local.position) + hand_pose.position + offset;
        joint.orientation = rot * mirror_orientation(handedness, local.orientation);
    }

    let middle_root = out[(Finger::Middle, FingerJoint::Root)];
    let middle_knuckle = out[(Finger::Middle, FingerJoint::KnuckleMajor)];
    let palm = Pose::new(
        (middle_root.position + middle_knuckle.position) * 0.5,
        rot,
    );

    let index_root = out[(Finger::Index, FingerJoint::Root)];
    let pinky_root = out[(Finger::Pinky, FingerJoint::Root)];
    let wrist_orientation = middle_root.orientation;
    let wrist = Pose::new(
        (index_root.position + pinky_root.position) * 0.5
            + wrist_orientation * FORWARD * WRIST_BACK_OFFSET,
        wrist_orientation,
    );

    ReconciledFrame { palm, wrist }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hand::sim::PoseSimulator;

    fn neutral() -> [Pose; HAND_JOINT_COUNT] {
        PoseSimulator::new(0.1).neutral_joints()
    }

    #[test]
    fn test_reconcile_is_deterministic() {
        let local = neutral();
        let anchor = Pose::new(Vec3::new(0.1, 1.2, -0.5), quat_from_degrees(10.0, 20.0, 0.0));
        let mut a = HandPose::default();
        let mut b = HandPose::default();
        let fa = reconcile(Handedness::Left, &local, &anchor, false, &mut a);
        let fb = reconcile(Handedness::Left, &local, &anchor, false, &mut b);
        assert_eq!(a, b);
        assert!((fa.palm.position - fb.palm.position).length() < 1e-7);
        assert!((fa.wrist.position - fb.wrist.position).length() < 1e-7);
    }

    #[test]
    fn test_right_hand_mirrors_across_x() {
        // With an identity anchor at the origin, the right hand is the left
        // hand reflected across the YZ plane.
        let local = neutral();
        let anchor = Pose::IDENTITY;
        let mut left = HandPose::default();
        let mut right = HandPose::default();
        reconcile(Handedness::Left, &local, &anchor, false, &mut left);
        reconcile(Handedness::Right, &local, &anchor, false, &mut right);

        for (l, r) in left.as_slice().iter().zip(right.as_slice()) {
            assert!((l.position.x + r.position.x).abs() < 1e-5);
            assert!((l.position.y - r.position.y).abs() < 1e-5);
            assert!((l.position.z - r.position.z).abs() < 1e-5);
        }
    }

    #[test]
    fn test_palm_swing_convention_per_hand() {
        // The right hand swings the pointing frame by euler(0, 90, -90),
        // the left by its mirror.
        let right = palm_orientation(Handedness::Right, Quat::IDENTITY);
        assert!(right.dot(quat_from_degrees(0.0, 90.0, -90.0)).abs() > 1.0 - 1e-6);
        let left = palm_orientation(Handedness::Left, Quat::IDENTITY);
        assert!(left.dot(quat_from_degrees(0.0, -90.0, 90.0)).abs() > 1.0 - 1e-6);
    }

    #[test]
    fn test_palm_sits_between_middle_root_and_knuckle() {
        let local = neutral();
        let anchor = Pose::new(Vec3::new(0.3, 1.0, -0.4), quat_from_degrees(0.0, 30.0, 0.0));
        let mut out = HandPose::default();
        let frame = reconcile(Handedness::Left, &local, &anchor, false, &mut out);
        let expected = (out[(Finger::Middle, FingerJoint::Root)].position
            + out[(Finger::Middle, FingerJoint::KnuckleMajor)].position)
            * 0.5;
        assert!((frame.palm.position - expected).length() < 1e-6);
    }

    #[test]
    fn test_wrist_sits_behind_root_midpoint() {
        let local = neutral();
        let anchor = Pose::IDENTITY;
        let mut out = HandPose::default();
        let frame = reconcile(Handedness::Left, &local, &anchor, false, &mut out);
        let midpoint = (out[(Finger::Index, FingerJoint::Root)].position
            + out[(Finger::Pinky, FingerJoint::Root)].position)
            * 0.5;
        assert!(((frame.wrist.position - midpoint).length() - 0.03).abs() < 1e-5);
    }

    #[test]
    fn test_fingertip_centering_lands_tip_on_anchor() {
        let local = neutral();
        let anchor = Pose::new(Vec3::new(0.2, 1.4, -0.6), quat_from_degrees(15.0, -40.0, 5.0));
        for handedness in Handedness::BOTH {
            let mut out = HandPose::default();
            reconcile(handedness, &local, &anchor, true, &mut out);
            let tip = out[(Finger::Index, FingerJoint::Tip)].position;
            assert!(
                (tip - anchor.position).length() < 1e-5,
                "{:?} fingertip off anchor by {}",
                handedness,
                (tip - anchor.position).length()
            );
        }
    }

    #[test]
    fn test_reconcile_preserves_radii() {
        let local = neutral();
        let mut out = HandPose::default();
        out.get_mut(Finger::Thumb, FingerJoint::Tip).radius = 0.123;
        reconcile(Handedness::Left, &local, &Pose::IDENTITY, false, &mut out);
        assert_eq!(out[(Finger::Thumb, FingerJoint::Tip)].radius, 0.123);
    }
}
