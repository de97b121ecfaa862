//! Hand data model: joints, the 25-joint pose, button bits, and the
//! canonical per-hand state read by the rest of the engine

use bitflags::bitflags;
use glam::{Quat, Vec3};

use crate::math::Pose;

/// Number of fingers per hand
pub const FINGER_COUNT: usize = 5;
/// Number of joints per finger
pub const JOINT_COUNT: usize = 5;
/// Total joints in a [`HandPose`]
pub const HAND_JOINT_COUNT: usize = FINGER_COUNT * JOINT_COUNT;
/// Joints in an override buffer: the 25 finger joints plus palm and wrist
pub const OVERRIDE_JOINT_COUNT: usize = HAND_JOINT_COUNT + 2;

/// Left or right hand selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handedness {
    Left,
    Right,
}

impl Handedness {
    pub const BOTH: [Handedness; 2] = [Handedness::Left, Handedness::Right];

    pub fn index(self) -> usize {
        match self {
            Handedness::Left => 0,
            Handedness::Right => 1,
        }
    }
}

/// Finger identifier, thumb first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Finger {
    Thumb,
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Finger {
    pub const ALL: [Finger; FINGER_COUNT] = [
        Finger::Thumb,
        Finger::Index,
        Finger::Middle,
        Finger::Ring,
        Finger::Pinky,
    ];
}

/// Joint identifier along a finger, root (metacarpal) to tip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FingerJoint {
    Root,
    KnuckleMajor,
    KnuckleMid,
    KnuckleMinor,
    Tip,
}

impl FingerJoint {
    pub const ALL: [FingerJoint; JOINT_COUNT] = [
        FingerJoint::Root,
        FingerJoint::KnuckleMajor,
        FingerJoint::KnuckleMid,
        FingerJoint::KnuckleMinor,
        FingerJoint::Tip,
    ];
}

/// A single tracked joint
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Joint {
    pub position: Vec3,
    pub orientation: Quat,
    pub radius: f32,
}

impl Joint {
    pub fn new(position: Vec3, orientation: Quat, radius: f32) -> Self {
        Self {
            position,
            orientation,
            radius,
        }
    }

    pub fn pose(&self) -> Pose {
        Pose::new(self.position, self.orientation)
    }
}

impl Default for Joint {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            orientation: Quat::IDENTITY,
            radius: 0.01,
        }
    }
}

/// A full 25-joint hand pose, stored contiguously
///
/// Indexed `[finger][joint]` with finger order thumb..pinky and joint order
/// root..tip. The thumb has no distinct knuckle-major in some sources, so its
/// `Root` entry duplicates the thumb metacarpal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandPose {
    joints: [Joint; HAND_JOINT_COUNT],
}

impl HandPose {
    pub fn new(joints: [Joint; HAND_JOINT_COUNT]) -> Self {
        Self { joints }
    }

    pub fn get(&self, finger: Finger, joint: FingerJoint) -> &Joint {
        &self.joints[finger as usize * JOINT_COUNT + joint as usize]
    }

    pub fn get_mut(&mut self, finger: Finger, joint: FingerJoint) -> &mut Joint {
        &mut self.joints[finger as usize * JOINT_COUNT + joint as usize]
    }

    /// The contiguous 25-joint buffer, required at the reconciliation and
    /// mesh boundaries
    pub fn as_slice(&self) -> &[Joint] {
        &self.joints
    }

    pub fn as_mut_slice(&mut self) -> &mut [Joint] {
        &mut self.joints
    }
}

impl Default for HandPose {
    fn default() -> Self {
        Self {
            joints: [Joint::default(); HAND_JOINT_COUNT],
        }
    }
}

impl std::ops::Index<(Finger, FingerJoint)> for HandPose {
    type Output = Joint;

    fn index(&self, (finger, joint): (Finger, FingerJoint)) -> &Joint {
        self.get(finger, joint)
    }
}

bitflags! {
    /// Button-style state with edge detection; the empty set is "inactive"
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ButtonBits: u32 {
        /// Currently held
        const ACTIVE = 1 << 0;
        /// Transitioned to held this frame
        const JUST_ACTIVE = 1 << 1;
        /// Transitioned to released this frame
        const JUST_INACTIVE = 1 << 2;
    }
}

impl ButtonBits {
    /// Derives the full state from a was/is transition pair
    pub fn make(was_active: bool, is_active: bool) -> ButtonBits {
        let mut state = ButtonBits::empty();
        if is_active {
            state |= ButtonBits::ACTIVE;
        }
        if is_active && !was_active {
            state |= ButtonBits::JUST_ACTIVE;
        }
        if !is_active && was_active {
            state |= ButtonBits::JUST_INACTIVE;
        }
        state
    }

    pub fn is_active(self) -> bool {
        self.contains(ButtonBits::ACTIVE)
    }

    pub fn is_just_active(self) -> bool {
        self.contains(ButtonBits::JUST_ACTIVE)
    }

    pub fn is_just_inactive(self) -> bool {
        self.contains(ButtonBits::JUST_INACTIVE)
    }
}

/// Canonical per-hand aggregate, persisting across frames
///
/// Mutated only by the hand subsystem during its update; everything else in
/// the engine reads it as a snapshot. When `tracked_state` is inactive the
/// joints keep their last values, stale rather than invalidated —
/// `tracked_state` alone governs whether the pose should be trusted.
#[derive(Debug, Clone)]
pub struct HandState {
    pub joints: HandPose,
    pub palm: Pose,
    pub wrist: Pose,
    /// Where the hand is pointing, for ray-based interaction
    pub aim: Pose,
    /// Anchor point for pointer logic, between index and thumb tips
    pub pinch_pt: Vec3,
    pub tracked_state: ButtonBits,
    pub pinch_state: ButtonBits,
    pub grip_state: ButtonBits,
    pub pinch_activation: f32,
    pub grip_activation: f32,
    /// Sum of middle-finger bone lengths plus root/tip radii
    pub size: f32,
    pub handedness: Handedness,
}

impl HandState {
    pub fn new(handedness: Handedness) -> Self {
        Self {
            joints: HandPose::default(),
            palm: Pose::IDENTITY,
            wrist: Pose::IDENTITY,
            aim: Pose::IDENTITY,
            pinch_pt: Vec3::ZERO,
            tracked_state: ButtonBits::empty(),
            pinch_state: ButtonBits::empty(),
            grip_state: ButtonBits::empty(),
            pinch_activation: 0.0,
            grip_activation: 0.0,
            size: 0.0,
            handedness,
        }
    }

    pub fn is_tracked(&self) -> bool {
        self.tracked_state.is_active()
    }
}

/// Base radius multiplier per finger, thumb..pinky
pub const FINGER_SIZE: [f32; FINGER_COUNT] = [1.15, 1.0, 1.06, 1.0, 0.84];
/// Base joint radius in meters per joint, root..tip
pub const JOINT_SIZE: [f32; JOINT_COUNT] = [0.034, 0.032, 0.029, 0.026, 0.023];
/// Scale applied to the finger/joint size product for simulated hands
pub const JOINT_RADIUS_SCALE: f32 = 0.35;

/// Radius a simulated hand uses for the given finger/joint pair
pub fn simulated_joint_radius(finger: Finger, joint: FingerJoint) -> f32 {
    FINGER_SIZE[finger as usize] * JOINT_SIZE[joint as usize] * JOINT_RADIUS_SCALE
}
