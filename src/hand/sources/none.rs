//! The terminal fallback source
//!
//! Always available, lowest priority. Leaves the last joint data in place
//! and simply reports both hands untracked.

use crate::input::FrameInput;
use crate::hand::model::{ButtonBits, Handedness};
use crate::hand::source::{HandSource, HandSourceKind, SourceCtx, SourceShared};

#[derive(Debug, Default)]
pub struct NoneSource;

impl HandSource for NoneSource {
    fn kind(&self) -> HandSourceKind {
        HandSourceKind::None
    }

    fn pinch_blend(&self) -> f32 {
        0.2
    }

    fn available(&self, _input: &FrameInput, _shared: &SourceShared) -> bool {
        true
    }

    fn init(&mut self, _ctx: &mut SourceCtx) {}

    fn shutdown(&mut self, _ctx: &mut SourceCtx) {}

    fn update_frame(&mut self, ctx: &mut SourceCtx) {
        for handedness in Handedness::BOTH {
            let hand = ctx.shared.hand_mut(handedness);
            hand.tracked_state = ButtonBits::make(hand.tracked_state.is_active(), false);
        }
    }
}
