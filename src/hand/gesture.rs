//! Hysteresis-based gesture trigger detection
//!
//! A gesture activates when the surface distance between two joints drops
//! under its activation distance, and only releases once it passes the
//! looser deactivation distance. The asymmetry keeps tracking jitter near
//! the boundary from flickering the state.

use serde::{Deserialize, Serialize};

use super::model::{ButtonBits, Joint};

/// Distances, in meters, defining one gesture's hysteresis band
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GestureThresholds {
    /// Surface distance at or under which the gesture turns on
    pub activation: f32,
    /// Surface distance the gesture must exceed before it turns off
    pub deactivation: f32,
    /// Distance at which the activation amount reaches zero
    pub max: f32,
}

impl GestureThresholds {
    /// Index-tip to thumb-tip "select" gesture
    pub const PINCH: GestureThresholds = GestureThresholds {
        activation: 0.01,
        deactivation: 0.02,
        max: 0.08,
    };

    /// Ring-tip to ring-root "grab" gesture
    pub const GRIP: GestureThresholds = GestureThresholds {
        activation: 0.05,
        deactivation: 0.06,
        max: 0.11,
    };
}

/// Computes the new gesture state and continuous activation amount
///
/// Total over finite floats: degenerate inputs (radii larger than the joint
/// distance, thresholds past `max`) saturate the amount rather than failing.
pub fn detect(
    prev_state: ButtonBits,
    a: &Joint,
    b: &Joint,
    thresholds: &GestureThresholds,
) -> (ButtonBits, f32) {
    let was_active = prev_state.is_active();
    let threshold = if was_active {
        thresholds.deactivation
    } else {
        thresholds.activation
    };

    let surface_dist = a.position.distance(b.position) - (a.radius + b.radius);
    let is_active = surface_dist <= threshold;
    let amount = (1.0 - (surface_dist - threshold) / (thresholds.max - threshold)).clamp(0.0, 1.0);

    (ButtonBits::make(was_active, is_active), amount)
}
