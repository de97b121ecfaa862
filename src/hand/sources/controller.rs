//! Simulated hands wrapped around motion controllers
//!
//! Anchors the template-simulated hand at each controller's palm pose and
//! gates the template table with the analog trigger and grip. The trigger
//! and grip also publish pinch/grip semantically, so pulling the trigger is
//! a pinch even when the simulated fingertips never quite touch.

use crate::input::FrameInput;
use crate::hand::model::{ButtonBits, Handedness};
use crate::hand::reconcile::reconcile;
use crate::hand::source::{HandSource, HandSourceKind, SourceCtx, SourceShared};
use crate::hand::sources::seed_simulated_radii;

/// Analog amount above which a semantic gesture counts as held
const GESTURE_PRESS_POINT: f32 = 0.5;

#[derive(Debug, Default)]
pub struct ControllerSource {
    was_available: bool,
}

impl HandSource for ControllerSource {
    fn kind(&self) -> HandSourceKind {
        HandSourceKind::Simulated
    }

    fn pinch_blend(&self) -> f32 {
        0.6
    }

    fn available(&self, input: &FrameInput, _shared: &SourceShared) -> bool {
        input.controllers.iter().any(Option::is_some)
    }

    fn init(&mut self, ctx: &mut SourceCtx) {
        for handedness in Handedness::BOTH {
            seed_simulated_radii(ctx.shared.hand_mut(handedness));
        }
    }

    fn shutdown(&mut self, _ctx: &mut SourceCtx) {}

    fn update_frame(&mut self, ctx: &mut SourceCtx) {
        for handedness in Handedness::BOTH {
            let index = handedness.index();
            let Some(snapshot) = ctx.input.controllers[index].filter(|c| c.tracked) else {
                let hand = ctx.shared.hand_mut(handedness);
                hand.tracked_state = ButtonBits::make(hand.tracked_state.is_active(), false);
                continue;
            };

            let palm_relative = ctx.shared.sim.update(
                index,
                &ctx.input.keys,
                Some(&snapshot),
                ctx.input.clock.total,
            );

            let hand = ctx.shared.hand_mut(handedness);
            let frame = reconcile(handedness, &palm_relative, &snapshot.palm, false, &mut hand.joints);
            hand.palm = frame.palm;
            hand.wrist = frame.wrist;
            hand.aim = snapshot.aim;
            hand.tracked_state = ButtonBits::make(hand.tracked_state.is_active(), true);

            // Trigger and grip are the gestures; distances don't get a vote.
            hand.pinch_state = ButtonBits::make(
                hand.pinch_state.is_active(),
                snapshot.trigger > GESTURE_PRESS_POINT,
            );
            hand.pinch_activation = snapshot.trigger.clamp(0.0, 1.0);
            hand.grip_state = ButtonBits::make(
                hand.grip_state.is_active(),
                snapshot.grip > GESTURE_PRESS_POINT,
            );
            hand.grip_activation = snapshot.grip.clamp(0.0, 1.0);
            ctx.shared.semantic_gestures[index] = true;
        }
    }

    fn update_poses(&mut self, ctx: &mut SourceCtx) {
        for handedness in Handedness::BOTH {
            let index = handedness.index();
            if !ctx.shared.hand(handedness).is_tracked() {
                continue;
            }
            // Re-anchor on the controller's live palm pose.
            let Some(snapshot) = ctx.input.controllers[index].filter(|c| c.tracked) else {
                continue;
            };
            let palm_relative = *ctx.shared.sim.current(index);
            let hand = ctx.shared.hand_mut(handedness);
            let frame = reconcile(handedness, &palm_relative, &snapshot.palm, false, &mut hand.joints);
            hand.palm = frame.palm;
            hand.wrist = frame.wrist;
            hand.aim = snapshot.aim;
        }
    }

    fn update_inactive(&mut self, input: &FrameInput, shared: &SourceShared) -> bool {
        let now = self.available(input, shared);
        let became = now && !self.was_available;
        self.was_available = now;
        became
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use crate::config::HandInputConfig;
    use crate::input::ControllerSnapshot;
    use crate::math::Pose;

    fn controller_at(pos: Vec3, trigger: f32, grip: f32) -> ControllerSnapshot {
        ControllerSnapshot {
            tracked: true,
            palm: Pose::new(pos, glam::Quat::IDENTITY),
            aim: Pose::new(pos, glam::Quat::IDENTITY),
            trigger,
            grip,
        }
    }

    fn frame_with(right: Option<ControllerSnapshot>) -> FrameInput {
        let mut input = FrameInput::default();
        input.controllers[1] = right;
        input.clock.step = 1.0 / 60.0;
        input.clock.step_unscaled = 1.0 / 60.0;
        input
    }

    #[test]
    fn test_trigger_publishes_semantic_pinch() {
        let mut shared = SourceShared::new(HandInputConfig::default());
        let input = frame_with(Some(controller_at(Vec3::new(0.2, 1.0, -0.4), 0.8, 0.0)));
        let mut source = ControllerSource::default();
        source.init(&mut SourceCtx {
            input: &input,
            shared: &mut shared,
        });
        source.update_frame(&mut SourceCtx {
            input: &input,
            shared: &mut shared,
        });

        let hand = shared.hand(Handedness::Right);
        assert!(hand.is_tracked());
        assert!(hand.pinch_state.is_just_active());
        assert!((hand.pinch_activation - 0.8).abs() < 1e-6);
        assert!(!hand.grip_state.is_active());
        assert!(shared.semantic_gestures[1]);
        assert!(!shared.semantic_gestures[0]);
    }

    #[test]
    fn test_untracked_controller_edges_tracking_off() {
        let mut shared = SourceShared::new(HandInputConfig::default());
        let mut source = ControllerSource::default();

        let input = frame_with(Some(controller_at(Vec3::ZERO, 0.0, 0.0)));
        source.update_frame(&mut SourceCtx {
            input: &input,
            shared: &mut shared,
        });
        assert!(shared.hand(Handedness::Right).is_tracked());

        let mut lost = controller_at(Vec3::ZERO, 0.0, 0.0);
        lost.tracked = false;
        let input = frame_with(Some(lost));
        source.update_frame(&mut SourceCtx {
            input: &input,
            shared: &mut shared,
        });
        assert!(shared.hand(Handedness::Right).tracked_state.is_just_inactive());
    }

    #[test]
    fn test_pose_updates_follow_the_live_palm() {
        let mut shared = SourceShared::new(HandInputConfig::default());
        let p1 = Vec3::new(0.2, 1.0, -0.4);
        let input = frame_with(Some(controller_at(p1, 0.0, 0.0)));
        let mut source = ControllerSource::default();
        source.update_frame(&mut SourceCtx {
            input: &input,
            shared: &mut shared,
        });
        let before = shared.hand(Handedness::Right).palm.position;

        // The controller moves between simulation steps; the pose pass
        // alone carries the hand by the same translation.
        let p2 = p1 + Vec3::new(0.05, 0.02, -0.03);
        let input = frame_with(Some(controller_at(p2, 0.0, 0.0)));
        source.update_poses(&mut SourceCtx {
            input: &input,
            shared: &mut shared,
        });
        let after = shared.hand(Handedness::Right).palm.position;
        assert!((after - before - (p2 - p1)).length() < 1e-5);
    }

    #[test]
    fn test_hand_follows_controller_palm() {
        let mut shared = SourceShared::new(HandInputConfig::default());
        let pos = Vec3::new(0.3, 1.1, -0.5);
        let input = frame_with(Some(controller_at(pos, 0.0, 0.0)));
        let mut source = ControllerSource::default();
        source.update_frame(&mut SourceCtx {
            input: &input,
            shared: &mut shared,
        });

        let hand = shared.hand(Handedness::Right);
        // The derived palm stays within a hand's reach of the anchor.
        assert!((hand.palm.position - pos).length() < 0.15);
    }
}
