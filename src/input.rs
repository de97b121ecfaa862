//! Per-frame raw input snapshot
//!
//! The platform layer (windowing, OpenXR, device polling) is out of scope;
//! it hands this subsystem a [`FrameInput`] each simulation step. Hand
//! sources only ever read from the snapshot, never from devices directly.

use glam::{Vec2, Vec3};

use crate::hand::model::{ButtonBits, Joint};
use crate::math::{Pose, Ray};

/// Keys and mouse buttons the simulated hand sources care about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    MouseLeft,
    MouseRight,
    Shift,
    Ctrl,
    Alt,
}

impl Key {
    pub const COUNT: usize = 5;

    const ALL: [Key; Key::COUNT] = [
        Key::MouseLeft,
        Key::MouseRight,
        Key::Shift,
        Key::Ctrl,
        Key::Alt,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

/// A single key's state plus its analog amount
///
/// Digital keys report an amount of 1.0 while held.
#[derive(Debug, Clone, Copy, Default)]
struct KeyState {
    state: ButtonBits,
    amount: f32,
}

/// Edge-detected keyboard/mouse-button state
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyboardState {
    keys: [KeyState; Key::COUNT],
}

impl KeyboardState {
    pub fn key(&self, key: Key) -> ButtonBits {
        self.keys[key.index()].state
    }

    pub fn amount(&self, key: Key) -> f32 {
        self.keys[key.index()].amount
    }

    /// Updates a key from its current held state, deriving edge bits from
    /// the previous frame's state
    pub fn set_held(&mut self, key: Key, held: bool) {
        self.set_analog(key, held, if held { 1.0 } else { 0.0 });
    }

    /// Analog variant of [`set_held`](Self::set_held) for pressure-sensitive
    /// inputs
    pub fn set_analog(&mut self, key: Key, held: bool, amount: f32) {
        let slot = &mut self.keys[key.index()];
        slot.state = ButtonBits::make(slot.state.is_active(), held);
        slot.amount = amount.clamp(0.0, 1.0);
    }
}

/// Mouse state for the flatscreen-simulated hand
#[derive(Debug, Clone, Copy)]
pub struct MouseSnapshot {
    /// Whether a mouse is present and inside the window
    pub available: bool,
    /// Cursor position in window pixels
    pub position: Vec2,
    /// Accumulated scroll, in scroll-wheel units
    pub scroll: f32,
    /// World-space pick ray through the cursor, from the platform camera
    pub ray: Option<Ray>,
}

impl Default for MouseSnapshot {
    fn default() -> Self {
        Self {
            available: false,
            position: Vec2::ZERO,
            scroll: 0.0,
            ray: None,
        }
    }
}

/// Analog controller inputs that gate simulated pose templates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerButton {
    Trigger,
    Grip,
}

/// One motion controller's per-frame state, as reported by the XR backend
#[derive(Debug, Clone, Copy)]
pub struct ControllerSnapshot {
    pub tracked: bool,
    /// Where the palm of a hand holding this controller sits
    pub palm: Pose,
    /// Pointing pose for ray interaction
    pub aim: Pose,
    pub trigger: f32,
    pub grip: f32,
}

impl ControllerSnapshot {
    pub fn amount(&self, button: ControllerButton) -> f32 {
        match button {
            ControllerButton::Trigger => self.trigger,
            ControllerButton::Grip => self.grip,
        }
    }
}

/// Number of joints in a native articulated-tracking sample (XR layout)
pub const TRACKER_JOINT_COUNT: usize = 26;
/// Index of the palm joint in a tracker sample
pub const TRACKER_PALM: usize = 0;
/// Index of the wrist joint in a tracker sample
pub const TRACKER_WRIST: usize = 1;
/// Index of the thumb metacarpal, the first finger joint in a sample
pub const TRACKER_THUMB_METACARPAL: usize = 2;
/// Index of the index-finger proximal joint, used for the aim pose
pub const TRACKER_INDEX_PROXIMAL: usize = 7;

/// One hand's raw articulated-tracking sample
///
/// Joints follow the XR hand layout: palm, wrist, then five fingers of roots
/// through tips, 26 in total, already in app space. The backend is expected
/// to pre-validate joints before reporting `tracked`.
#[derive(Debug, Clone, Copy)]
pub struct ArticulatedSample {
    pub tracked: bool,
    pub joints: [Joint; TRACKER_JOINT_COUNT],
}

/// Frame timing, scaled and unscaled
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameClock {
    /// Scaled simulation step in seconds
    pub step: f32,
    /// Wall-clock step in seconds, unaffected by time scaling
    pub step_unscaled: f32,
    /// Monotonic total time in seconds
    pub total: f64,
}

/// Everything the hand subsystem consumes for one simulation step
#[derive(Debug, Clone, Default)]
pub struct FrameInput {
    pub clock: FrameClock,
    pub keys: KeyboardState,
    pub mouse: MouseSnapshot,
    /// Head pose, used to estimate shoulders for articulated aim rays
    pub head: Pose,
    /// Motion controllers, left then right
    pub controllers: [Option<ControllerSnapshot>; 2],
    /// Articulated tracker samples, left then right
    pub hand_trackers: [Option<ArticulatedSample>; 2],
}

impl FrameInput {
    /// Advances the clock by one step, keeping edges out of the key states
    pub fn tick(&mut self, step: f32) {
        self.tick_scaled(step, step);
    }

    pub fn tick_scaled(&mut self, step: f32, step_unscaled: f32) {
        self.clock.step = step;
        self.clock.step_unscaled = step_unscaled;
        self.clock.total += step_unscaled as f64;
        // Re-derive edges: a key that stays held loses its JUST_ACTIVE bit
        for key in Key::ALL {
            let held = self.keys.key(key).is_active();
            let amount = self.keys.amount(key);
            self.keys.set_analog(key, held, amount);
        }
    }
}

/// A default head pose standing at the origin looking down -Z
pub fn default_head() -> Pose {
    Pose::new(Vec3::new(0.0, 1.6, 0.0), glam::Quat::IDENTITY)
}
