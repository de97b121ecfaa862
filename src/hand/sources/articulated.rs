//! Native articulated hand tracking
//!
//! Consumes per-hand 26-joint tracker samples in the XR layout (palm,
//! wrist, then fingers root to tip) and maps them onto the 25-joint hand
//! pose. Samples with degenerate joint orientations are rejected for the
//! frame and the hand reported untracked.

use tracing::warn;

use crate::input::{
    ArticulatedSample, FrameInput, TRACKER_PALM, TRACKER_THUMB_METACARPAL, TRACKER_WRIST,
};
use crate::math::quat_from_degrees;
use crate::hand::model::{ButtonBits, HAND_JOINT_COUNT, Handedness};
use crate::hand::source::{HandSource, HandSourceKind, SourceCtx, SourceShared};
use crate::hand::sources::shoulder_aim;

/// Flat index of the index-finger knuckle the aim pose anchors on
const AIM_KNUCKLE: usize = 6;

#[derive(Debug, Default)]
pub struct ArticulatedSource {
    was_available: bool,
}

/// A sample is unusable when any joint orientation has collapsed to
/// (near) zero norm; backends emit those mid-initialization
fn sample_degenerate(sample: &ArticulatedSample) -> bool {
    sample
        .joints
        .iter()
        .any(|j| j.orientation.length_squared() < 1e-4)
}

impl ArticulatedSource {
    /// Copies a usable sample's poses onto the hand. Tracking edges belong
    /// to the per-frame update; this never touches them.
    fn write_pose(ctx: &mut SourceCtx, handedness: Handedness, sample: &ArticulatedSample) {
        let hand = ctx.shared.hand_mut(handedness);
        let joints = hand.joints.as_mut_slice();
        // The 25-joint layout duplicates the thumb metacarpal at the thumb
        // root; everything after shifts by one.
        joints[0] = sample.joints[TRACKER_THUMB_METACARPAL];
        for k in 1..HAND_JOINT_COUNT {
            joints[k] = sample.joints[k + 1];
        }

        let palm_sample = sample.joints[TRACKER_PALM];
        hand.palm.position = palm_sample.position;
        hand.palm.orientation = palm_sample.orientation * quat_from_degrees(-90.0, 0.0, 0.0);
        hand.wrist = sample.joints[TRACKER_WRIST].pose();

        let knuckle = hand.joints.as_slice()[AIM_KNUCKLE].position;
        hand.aim = shoulder_aim(&ctx.input.head, knuckle, handedness);
    }

    fn apply(ctx: &mut SourceCtx, handedness: Handedness) {
        let index = handedness.index();
        let sample = ctx.input.hand_trackers[index].filter(|s| s.tracked);

        let sample = match sample {
            Some(sample) if sample_degenerate(&sample) => {
                warn!(hand = ?handedness, "rejecting articulated sample with degenerate orientation");
                None
            }
            other => other,
        };

        let Some(sample) = sample else {
            let hand = ctx.shared.hand_mut(handedness);
            hand.tracked_state = ButtonBits::make(hand.tracked_state.is_active(), false);
            return;
        };

        Self::write_pose(ctx, handedness, &sample);
        let hand = ctx.shared.hand_mut(handedness);
        hand.tracked_state = ButtonBits::make(hand.tracked_state.is_active(), true);
    }
}

impl HandSource for ArticulatedSource {
    fn kind(&self) -> HandSourceKind {
        HandSourceKind::Articulated
    }

    fn pinch_blend(&self) -> f32 {
        0.2
    }

    fn available(&self, input: &FrameInput, _shared: &SourceShared) -> bool {
        // Availability means actively tracking, not merely present: a
        // tracker that lost both hands yields to the next source.
        input.hand_trackers.iter().flatten().any(|s| s.tracked)
    }

    fn init(&mut self, _ctx: &mut SourceCtx) {}

    fn shutdown(&mut self, _ctx: &mut SourceCtx) {}

    fn update_frame(&mut self, ctx: &mut SourceCtx) {
        for handedness in Handedness::BOTH {
            Self::apply(ctx, handedness);
        }
    }

    fn update_poses(&mut self, ctx: &mut SourceCtx) {
        for handedness in Handedness::BOTH {
            let sample = ctx.input.hand_trackers[handedness.index()]
                .filter(|s| s.tracked && !sample_degenerate(s));
            if let Some(sample) = sample {
                Self::write_pose(ctx, handedness, &sample);
            }
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
    use glam::{Quat, Vec3};
    use crate::config::HandInputConfig;
    use crate::input::TRACKER_JOINT_COUNT;
    use crate::hand::model::Joint;

    fn sample() -> ArticulatedSample {
        let mut joints = [Joint::default(); TRACKER_JOINT_COUNT];
        for (i, joint) in joints.iter_mut().enumerate() {
            joint.position = Vec3::new(i as f32 * 0.01, 1.0, -0.4);
            joint.radius = 0.008;
        }
        ArticulatedSample {
            tracked: true,
            joints,
        }
    }

    fn frame_with(right: Option<ArticulatedSample>) -> FrameInput {
        let mut input = FrameInput::default();
        input.hand_trackers[1] = right;
        input.head = crate::input::default_head();
        input
    }

    #[test]
    fn test_xr_layout_maps_with_thumb_duplication() {
        let mut shared = SourceShared::new(HandInputConfig::default());
        let input = frame_with(Some(sample()));
        ArticulatedSource::default().update_frame(&mut SourceCtx {
            input: &input,
            shared: &mut shared,
        });

        let hand = shared.hand(Handedness::Right);
        assert!(hand.is_tracked());
        let joints = hand.joints.as_slice();
        // Thumb root and knuckle-major both come from sample joint 2.
        assert_eq!(joints[0].position.x, 0.02);
        assert_eq!(joints[1].position.x, 0.02);
        // Last joint (pinky tip) comes from the last sample joint.
        assert_eq!(joints[24].position.x, 0.25);
        // Palm and wrist map from the first two sample joints.
        assert_eq!(hand.palm.position.x, 0.0);
        assert_eq!(hand.wrist.position.x, 0.01);
    }

    #[test]
    fn test_degenerate_orientation_rejects_sample() {
        let mut shared = SourceShared::new(HandInputConfig::default());
        let mut bad = sample();
        bad.joints[5].orientation = Quat::from_xyzw(0.0, 0.0, 0.0, 0.0);
        let input = frame_with(Some(bad));
        ArticulatedSource::default().update_frame(&mut SourceCtx {
            input: &input,
            shared: &mut shared,
        });
        assert!(!shared.hand(Handedness::Right).is_tracked());
    }

    #[test]
    fn test_pose_updates_keep_tracking_edges() {
        let mut shared = SourceShared::new(HandInputConfig::default());
        let mut source = ArticulatedSource::default();
        let mut input = frame_with(Some(sample()));
        source.update_frame(&mut SourceCtx {
            input: &input,
            shared: &mut shared,
        });
        assert!(shared.hand(Handedness::Right).tracked_state.is_just_active());

        // A high-frequency pose pass between two frame updates moves the
        // joints but leaves the tracking edge for consumers to see.
        let mut moved = sample();
        for joint in &mut moved.joints {
            joint.position.y += 0.1;
        }
        input.hand_trackers[1] = Some(moved);
        source.update_poses(&mut SourceCtx {
            input: &input,
            shared: &mut shared,
        });
        let hand = shared.hand(Handedness::Right);
        assert!(hand.tracked_state.is_just_active());
        assert!((hand.wrist.position.y - 1.1).abs() < 1e-6);
    }

    #[test]
    fn test_untracked_sample_reports_untracked() {
        let mut shared = SourceShared::new(HandInputConfig::default());
        let mut lost = sample();
        lost.tracked = false;
        let input = frame_with(Some(lost));
        ArticulatedSource::default().update_frame(&mut SourceCtx {
            input: &input,
            shared: &mut shared,
        });
        assert!(!shared.hand(Handedness::Right).is_tracked());
        // And no longer available for arbitration either.
        assert!(!ArticulatedSource::default().available(&input, &shared));
    }
}
