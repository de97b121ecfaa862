//! Flatscreen hand simulation from the mouse
//!
//! Projects a simulated hand along the cursor's pick ray, fingertip on the
//! cursor, pose picked from the template table by the held mouse buttons.
//! Ctrl+Shift cycles which hand the mouse drives: right, neither, left,
//! neither. The scroll wheel moves the hand along the ray.

use glam::Quat;
use tracing::debug;

use crate::input::{FrameInput, Key};
use crate::math::{Pose, quat_from_degrees, quat_lookat};
use crate::hand::model::{ButtonBits, Finger, FingerJoint, Handedness};
use crate::hand::reconcile::reconcile;
use crate::hand::source::{HandSource, HandSourceKind, SourceCtx, SourceShared};
use crate::hand::sources::seed_simulated_radii;

/// The hand the mouse drives at each Ctrl+Shift step
const HAND_CYCLE: [Option<Handedness>; 4] = [
    Some(Handedness::Right),
    None,
    Some(Handedness::Left),
    None,
];

#[derive(Debug, Default)]
pub struct MouseSource {
    cycle: usize,
    /// Low-passed scroll accumulator, in scroll-wheel units
    scroll: f32,
    was_available: bool,
}

impl MouseSource {
    fn driven_hand(&self) -> Option<Handedness> {
        HAND_CYCLE[self.cycle]
    }

    /// Ctrl+Shift together advances the hand cycle
    fn cycle_pressed(input: &FrameInput) -> bool {
        let ctrl = input.keys.key(Key::Ctrl);
        let shift = input.keys.key(Key::Shift);
        ctrl.is_active()
            && shift.is_active()
            && (ctrl.is_just_active() || shift.is_just_active())
    }

    /// World anchor on the cursor ray for the current scroll depth, plus
    /// the bare pointer orientation for the aim pose
    fn anchor_at(&self, ctx: &SourceCtx, handedness: Handedness) -> Option<(Pose, Quat)> {
        let ray = ctx.input.mouse.ray?;
        let sim_config = ctx.shared.config.sim;
        let distance = sim_config.mouse_hand_distance + self.scroll * sim_config.mouse_scroll_depth;
        let tip = ray.point_at(distance);
        let pointer_rot = quat_lookat(ray.position, tip);

        let wrist_swing = match handedness {
            Handedness::Left => quat_from_degrees(40.0, -30.0, -90.0),
            Handedness::Right => quat_from_degrees(40.0, 30.0, 90.0),
        };
        Some((Pose::new(tip, pointer_rot * wrist_swing), pointer_rot))
    }

    fn simulate(&mut self, ctx: &mut SourceCtx, handedness: Handedness) {
        let Some((anchor, pointer_rot)) = self.anchor_at(ctx, handedness) else {
            let hand = ctx.shared.hand_mut(handedness);
            hand.tracked_state = ButtonBits::make(hand.tracked_state.is_active(), false);
            return;
        };

        let palm_relative = ctx.shared.sim.update(
            handedness.index(),
            &ctx.input.keys,
            None,
            ctx.input.clock.total,
        );

        let hand = ctx.shared.hand_mut(handedness);
        let frame = reconcile(handedness, &palm_relative, &anchor, true, &mut hand.joints);
        hand.palm = frame.palm;
        hand.wrist = frame.wrist;
        hand.aim = Pose::new(
            hand.joints[(Finger::Index, FingerJoint::Tip)].position,
            pointer_rot,
        );
        hand.tracked_state = ButtonBits::make(hand.tracked_state.is_active(), true);
    }
}

impl HandSource for MouseSource {
    fn kind(&self) -> HandSourceKind {
        HandSourceKind::Simulated
    }

    fn pinch_blend(&self) -> f32 {
        1.0
    }

    fn available(&self, input: &FrameInput, _shared: &SourceShared) -> bool {
        input.mouse.available
    }

    fn init(&mut self, ctx: &mut SourceCtx) {
        self.cycle = 0;
        // Match the accumulator to the current wheel so the hand doesn't lurch
        self.scroll = ctx.input.mouse.scroll;
        for handedness in Handedness::BOTH {
            seed_simulated_radii(ctx.shared.hand_mut(handedness));
        }
    }

    fn shutdown(&mut self, _ctx: &mut SourceCtx) {}

    fn update_frame(&mut self, ctx: &mut SourceCtx) {
        if Self::cycle_pressed(ctx.input) {
            self.cycle = (self.cycle + 1) % HAND_CYCLE.len();
            debug!(hand = ?self.driven_hand(), "mouse hand cycled");
        }

        let alpha = (ctx.input.clock.step_unscaled * 8.0).min(1.0);
        self.scroll += (ctx.input.mouse.scroll - self.scroll) * alpha;

        let driven = self.driven_hand();
        for handedness in Handedness::BOTH {
            if driven == Some(handedness) {
                self.simulate(ctx, handedness);
            } else {
                let hand = ctx.shared.hand_mut(handedness);
                hand.tracked_state = ButtonBits::make(hand.tracked_state.is_active(), false);
            }
        }
    }

    fn update_poses(&mut self, ctx: &mut SourceCtx) {
        let Some(handedness) = self.driven_hand() else {
            return;
        };
        if !ctx.shared.hand(handedness).is_tracked() {
            return;
        }
        // Re-anchor on the live cursor ray so this path actually lowers
        // pointing latency.
        let Some((anchor, pointer_rot)) = self.anchor_at(ctx, handedness) else {
            return;
        };
        let palm_relative = *ctx.shared.sim.current(handedness.index());
        let hand = ctx.shared.hand_mut(handedness);
        let frame = reconcile(handedness, &palm_relative, &anchor, true, &mut hand.joints);
        hand.palm = frame.palm;
        hand.wrist = frame.wrist;
        hand.aim = Pose::new(
            hand.joints[(Finger::Index, FingerJoint::Tip)].position,
            pointer_rot,
        );
    }

    fn update_inactive(&mut self, input: &FrameInput, shared: &SourceShared) -> bool {
        let now = self.available(input, shared);
        let became = now && !self.was_available;
        self.was_available = now;
        became
    }
}
