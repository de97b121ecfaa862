//! The hand source abstraction
//!
//! Each way of producing hand data (developer override, articulated
//! tracking, motion controllers, mouse simulation, the terminal "none")
//! implements [`HandSource`]. Sources are held by the context in a fixed
//! descending-priority list; exactly one is active at a time.

use crate::config::HandInputConfig;
use crate::input::FrameInput;
use super::model::{HandState, Handedness, Joint, OVERRIDE_JOINT_COUNT};
use super::sim::PoseSimulator;

/// What family of source currently drives the hands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandSourceKind {
    /// The terminal fallback; hands are untracked
    None,
    /// Pose-simulated from mouse or controller input
    Simulated,
    /// Driven by native articulated tracking
    Articulated,
    /// Driven by developer-supplied joint buffers
    Overridden,
}

/// State shared between the context and whichever source is running
///
/// Sources never touch the context directly; everything they may read or
/// write crosses through here.
#[derive(Debug)]
pub struct SourceShared {
    pub hands: [HandState; 2],
    pub sim: PoseSimulator,
    pub config: HandInputConfig,
    /// Developer-supplied joint buffers, consumed by the override source
    pub override_joints: [Option<[Joint; OVERRIDE_JOINT_COUNT]>; 2],
    /// Set when source arbitration should re-run this update
    pub refresh_requested: bool,
    /// Per hand: the active source published semantic pinch/grip values this
    /// frame, so the distance detector must not overwrite them
    pub semantic_gestures: [bool; 2],
}

impl SourceShared {
    pub fn new(config: HandInputConfig) -> Self {
        Self {
            hands: [
                HandState::new(Handedness::Left),
                HandState::new(Handedness::Right),
            ],
            sim: PoseSimulator::new(config.sim.blend_window),
            config,
            override_joints: [None, None],
            refresh_requested: false,
            semantic_gestures: [false, false],
        }
    }

    pub fn hand(&self, handedness: Handedness) -> &HandState {
        &self.hands[handedness.index()]
    }

    pub fn hand_mut(&mut self, handedness: Handedness) -> &mut HandState {
        &mut self.hands[handedness.index()]
    }
}

/// Per-update working set handed to source callbacks
pub struct SourceCtx<'a> {
    pub input: &'a FrameInput,
    pub shared: &'a mut SourceShared,
}

/// One producer of hand data
///
/// Lifecycle: `init` runs when the source becomes active (lazily, never
/// before), `update_frame` once per simulation step while active,
/// `update_poses` on the high-frequency pose path, `shutdown` when
/// arbitration moves away. `update_inactive` is polled cheaply on sources
/// that are present but not active.
pub trait HandSource {
    fn kind(&self) -> HandSourceKind;

    /// Where the pinch point sits between index tip (0.0) and thumb tip (1.0)
    fn pinch_blend(&self) -> f32;

    /// Whether this source could drive the hands right now
    fn available(&self, input: &FrameInput, shared: &SourceShared) -> bool;

    fn init(&mut self, ctx: &mut SourceCtx);

    fn shutdown(&mut self, ctx: &mut SourceCtx);

    fn update_frame(&mut self, ctx: &mut SourceCtx);

    /// High-frequency pose refresh; only reconciliation-grade work belongs
    /// here
    fn update_poses(&mut self, _ctx: &mut SourceCtx) {}

    /// Cheap per-frame poll while some other source is active; returns true
    /// to request re-arbitration. Inactive sources get no mutable access to
    /// the shared hand state, only the active source writes.
    fn update_inactive(&mut self, _input: &FrameInput, _shared: &SourceShared) -> bool {
        false
    }
}
