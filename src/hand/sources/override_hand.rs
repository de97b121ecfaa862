//! Developer-supplied hand joints
//!
//! The highest-priority source: when an application pushes explicit joint
//! buffers through [`crate::hand::HandInputContext::override_hand`], those
//! buffers drive the hands verbatim. Useful for replaying captures and for
//! bridging trackers this crate doesn't know about.

use crate::input::FrameInput;
use crate::hand::model::{ButtonBits, HAND_JOINT_COUNT, Handedness};
use crate::hand::source::{HandSource, HandSourceKind, SourceCtx, SourceShared};
use crate::hand::sources::shoulder_aim;

/// Index of the palm entry in an override buffer
pub const OVERRIDE_PALM: usize = HAND_JOINT_COUNT;
/// Index of the wrist entry in an override buffer
pub const OVERRIDE_WRIST: usize = HAND_JOINT_COUNT + 1;

#[derive(Debug, Default)]
pub struct OverrideSource;

impl HandSource for OverrideSource {
    fn kind(&self) -> HandSourceKind {
        HandSourceKind::Overridden
    }

    fn pinch_blend(&self) -> f32 {
        0.2
    }

    fn available(&self, _input: &FrameInput, shared: &SourceShared) -> bool {
        shared.override_joints.iter().any(Option::is_some)
    }

    fn init(&mut self, _ctx: &mut SourceCtx) {}

    fn shutdown(&mut self, _ctx: &mut SourceCtx) {}

    fn update_frame(&mut self, ctx: &mut SourceCtx) {
        for handedness in Handedness::BOTH {
            let buffer = ctx.shared.override_joints[handedness.index()];
            let hand = ctx.shared.hand_mut(handedness);
            let was_tracked = hand.tracked_state.is_active();

            let Some(buffer) = buffer else {
                hand.tracked_state = ButtonBits::make(was_tracked, false);
                continue;
            };

            hand.joints
                .as_mut_slice()
                .copy_from_slice(&buffer[..HAND_JOINT_COUNT]);
            hand.palm = buffer[OVERRIDE_PALM].pose();
            hand.wrist = buffer[OVERRIDE_WRIST].pose();
            hand.tracked_state = ButtonBits::make(was_tracked, true);

            let knuckle = hand.joints.as_slice()[6].position;
            hand.aim = shoulder_aim(&ctx.input.head, knuckle, handedness);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use crate::config::HandInputConfig;
    use crate::hand::model::{Joint, OVERRIDE_JOINT_COUNT};

    fn buffer_at(x: f32) -> [Joint; OVERRIDE_JOINT_COUNT] {
        let mut joints = [Joint::default(); OVERRIDE_JOINT_COUNT];
        for (i, joint) in joints.iter_mut().enumerate() {
            joint.position = Vec3::new(x, i as f32 * 0.01, 0.0);
        }
        joints
    }

    #[test]
    fn test_unavailable_without_buffers() {
        let shared = SourceShared::new(HandInputConfig::default());
        let input = FrameInput::default();
        assert!(!OverrideSource.available(&input, &shared));
    }

    #[test]
    fn test_buffer_drives_joints_and_palm() {
        let mut shared = SourceShared::new(HandInputConfig::default());
        shared.override_joints[Handedness::Right.index()] = Some(buffer_at(0.5));
        let input = FrameInput::default();
        assert!(OverrideSource.available(&input, &shared));

        let mut source = OverrideSource;
        source.update_frame(&mut SourceCtx {
            input: &input,
            shared: &mut shared,
        });

        let hand = shared.hand(Handedness::Right);
        assert!(hand.tracked_state.is_just_active());
        assert_eq!(hand.joints.as_slice()[0].position.x, 0.5);
        assert!((hand.palm.position.y - OVERRIDE_PALM as f32 * 0.01).abs() < 1e-6);
        // The other hand stays untracked.
        assert!(!shared.hand(Handedness::Left).is_tracked());
    }
}
