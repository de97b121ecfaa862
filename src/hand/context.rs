//! The hand input context: source arbitration and the per-frame update
//!
//! Owns the source registry, the shared hand state, and the synthesized
//! meshes. Applications call [`HandInputContext::update_frame`] once per
//! simulation step and may call [`HandInputContext::update_poses`] more
//! often for lower-latency joints.

use glam::Vec3;
use tracing::{debug, info, warn};

use crate::config::HandInputConfig;
use crate::input::FrameInput;
use crate::math::Pose;
use super::gesture::detect;
use super::mesh::{HandMesh, MaterialHandle};
use super::model::{
    ButtonBits, Finger, FingerJoint, HandState, Handedness, Joint, OVERRIDE_JOINT_COUNT,
};
use super::reconcile::reconcile;
use super::sim::{PoseTemplate, PoseTemplateId};
use super::source::{HandSource, HandSourceKind, SourceCtx, SourceShared};
use super::sources::{
    ArticulatedSource, ControllerSource, MouseSource, NoneSource, OverrideSource,
    seed_simulated_radii,
};

pub struct HandInputContext {
    /// Descending priority; the terminal fallback sits last
    sources: Vec<Box<dyn HandSource>>,
    active: Option<usize>,
    shared: SourceShared,
    /// Pinch point captured relative to the index root, per hand
    pinch_anchor: [Option<Vec3>; 2],
    last_size_update: f64,
    size_dirty: bool,
    meshes: [HandMesh; 2],
    visible: [bool; 2],
    materials: [Option<MaterialHandle>; 2],
}

impl HandInputContext {
    pub fn new(config: HandInputConfig) -> Self {
        let mut shared = SourceShared::new(config);

        // Seed both hands from the neutral template so nothing reads a
        // degenerate all-origin pose (or a spurious pinch) before the first
        // update.
        let neutral = shared.sim.neutral_joints();
        for handedness in Handedness::BOTH {
            let hand = shared.hand_mut(handedness);
            seed_simulated_radii(hand);
            let frame = reconcile(handedness, &neutral, &Pose::IDENTITY, false, &mut hand.joints);
            hand.palm = frame.palm;
            hand.wrist = frame.wrist;
            hand.size = hand_size(hand);
        }

        let sources: Vec<Box<dyn HandSource>> = vec![
            Box::new(OverrideSource),
            Box::new(ArticulatedSource::default()),
            Box::new(ControllerSource::default()),
            Box::new(MouseSource::default()),
            Box::new(NoneSource),
        ];

        Self {
            sources,
            active: None,
            shared,
            pinch_anchor: [None, None],
            last_size_update: 0.0,
            size_dirty: true,
            meshes: [HandMesh::new(), HandMesh::new()],
            visible: [true, true],
            materials: [None, None],
        }
    }

    /// The canonical state for one hand
    pub fn hand(&self, handedness: Handedness) -> &HandState {
        self.shared.hand(handedness)
    }

    /// What family of source currently drives the hands
    pub fn source_kind(&self) -> HandSourceKind {
        self.active
            .map(|i| self.sources[i].kind())
            .unwrap_or(HandSourceKind::None)
    }

    /// Installs or clears a developer joint override for one hand
    ///
    /// The buffer is the 25 finger joints followed by palm and wrist. A
    /// buffer of any other length is ignored with a warning.
    pub fn override_hand(&mut self, handedness: Handedness, joints: Option<&[Joint]>) {
        let slot = &mut self.shared.override_joints[handedness.index()];
        match joints {
            None => {
                if slot.take().is_some() {
                    self.shared.refresh_requested = true;
                }
            }
            Some(buffer) => {
                if buffer.len() != OVERRIDE_JOINT_COUNT {
                    warn!(
                        len = buffer.len(),
                        expected = OVERRIDE_JOINT_COUNT,
                        "ignoring hand override with wrong joint count"
                    );
                    return;
                }
                let mut fixed = [Joint::default(); OVERRIDE_JOINT_COUNT];
                fixed.copy_from_slice(buffer);
                *slot = Some(fixed);
                self.shared.refresh_requested = true;
            }
        }
    }

    pub fn add_template(&mut self, template: PoseTemplate) {
        self.shared.sim.add_template(template);
    }

    pub fn remove_template(&mut self, id: PoseTemplateId) {
        self.shared.sim.remove_template(id);
    }

    pub fn set_hand_visible(&mut self, handedness: Handedness, visible: bool) {
        self.visible[handedness.index()] = visible;
    }

    pub fn set_hand_material(&mut self, handedness: Handedness, material: Option<MaterialHandle>) {
        self.materials[handedness.index()] = material;
    }

    pub fn hand_material(&self, handedness: Handedness) -> Option<MaterialHandle> {
        self.materials[handedness.index()]
    }

    /// The synthesized mesh for one hand
    pub fn hand_mesh(&self, handedness: Handedness) -> &HandMesh {
        &self.meshes[handedness.index()]
    }

    /// Re-runs source arbitration: the highest-priority available source
    /// wins, with shutdown/init across a switch
    fn refresh(&mut self, input: &FrameInput) {
        let winner = self
            .sources
            .iter()
            .position(|s| s.available(input, &self.shared))
            .unwrap_or(self.sources.len() - 1);
        if Some(winner) == self.active {
            return;
        }

        let mut ctx = SourceCtx {
            input,
            shared: &mut self.shared,
        };
        if let Some(prev) = self.active {
            debug!(kind = ?self.sources[prev].kind(), "shutting down hand source");
            self.sources[prev].shutdown(&mut ctx);
        }
        self.sources[winner].init(&mut ctx);
        info!(kind = ?self.sources[winner].kind(), "hand source active");

        self.active = Some(winner);
        self.pinch_anchor = [None, None];
        self.size_dirty = true;
    }

    /// One full hand update: arbitration, the active source, gestures,
    /// hand size, and visuals
    pub fn update_frame(&mut self, input: &FrameInput) {
        self.shared.semantic_gestures = [false, false];

        // Arbitration is event-driven: it runs on the first update and when
        // something requested it (an override toggle, an inactive source
        // coming online), not as a per-frame scan.
        if self.active.is_none() || self.shared.refresh_requested {
            self.shared.refresh_requested = false;
            self.refresh(input);
        }
        self.run_sources(input);

        // The active source may have lost its device this frame; fall back
        // and let the replacement produce data within the same update
        // rather than leaving a stale frame.
        let active = self.active.unwrap_or(self.sources.len() - 1);
        if !self.sources[active].available(input, &self.shared) {
            self.shared.refresh_requested = true;
        }
        if self.shared.refresh_requested {
            self.shared.refresh_requested = false;
            let prev = self.active;
            self.refresh(input);
            if self.active != prev {
                self.run_sources(input);
            }
        }

        for handedness in Handedness::BOTH {
            self.update_hand_state(handedness);
        }
        self.update_size(input.clock.total);
        self.update_visuals();
    }

    /// High-frequency pose refresh between simulation steps
    pub fn update_poses(&mut self, input: &FrameInput, update_visuals: bool) {
        let Some(active) = self.active else {
            return;
        };
        let mut ctx = SourceCtx {
            input,
            shared: &mut self.shared,
        };
        self.sources[active].update_poses(&mut ctx);
        if update_visuals {
            self.update_visuals();
        }
    }

    fn run_sources(&mut self, input: &FrameInput) {
        let Some(active) = self.active else {
            return;
        };
        for (i, source) in self.sources.iter_mut().enumerate() {
            if i == active {
                let mut ctx = SourceCtx {
                    input,
                    shared: &mut self.shared,
                };
                source.update_frame(&mut ctx);
            } else if source.update_inactive(input, &self.shared) {
                self.shared.refresh_requested = true;
            }
        }
    }

    /// Gesture states, activation amounts, and the pinch point for one hand
    fn update_hand_state(&mut self, handedness: Handedness) {
        let i = handedness.index();
        let active = match self.active {
            Some(active) => active,
            None => return,
        };
        let pinch_blend = self.sources[active].pinch_blend();
        let stabilize = self.sources[active].kind() == HandSourceKind::Articulated;
        let semantic = self.shared.semantic_gestures[i];
        let thresholds = self.shared.config.gesture;

        let hand = self.shared.hand_mut(handedness);
        let tracked = hand.is_tracked();

        if !semantic {
            if tracked {
                let index_tip = *hand.joints.get(Finger::Index, FingerJoint::Tip);
                let thumb_tip = *hand.joints.get(Finger::Thumb, FingerJoint::Tip);
                let (state, amount) =
                    detect(hand.pinch_state, &index_tip, &thumb_tip, &thresholds.pinch);
                hand.pinch_state = state;
                hand.pinch_activation = amount;

                let ring_tip = *hand.joints.get(Finger::Ring, FingerJoint::Tip);
                let ring_root = *hand.joints.get(Finger::Ring, FingerJoint::Root);
                let (state, amount) =
                    detect(hand.grip_state, &ring_tip, &ring_root, &thresholds.grip);
                hand.grip_state = state;
                hand.grip_activation = amount;
            } else {
                hand.pinch_state = ButtonBits::make(hand.pinch_state.is_active(), false);
                hand.grip_state = ButtonBits::make(hand.grip_state.is_active(), false);
                hand.pinch_activation = 0.0;
                hand.grip_activation = 0.0;
            }
        }

        // Pinch point: between the index and thumb tips, with the exact
        // spot depending on how trustworthy the source's fingertips are
        let index_tip = hand.joints[(Finger::Index, FingerJoint::Tip)].position;
        let thumb_tip = hand.joints[(Finger::Thumb, FingerJoint::Tip)].position;
        let raw_pt = index_tip.lerp(thumb_tip, pinch_blend);

        if stabilize && tracked {
            // Articulated fingertips wobble mid-pinch; pin the point to the
            // index root for the duration of the gesture.
            let root = hand.joints.get(Finger::Index, FingerJoint::Root).pose();
            let state = hand.pinch_state;
            if state.is_just_active() {
                self.pinch_anchor[i] = Some(root.inverse_transform_point(raw_pt));
            }
            if state.is_active() || state.is_just_inactive() {
                hand.pinch_pt = match self.pinch_anchor[i] {
                    Some(anchor) => root.transform_point(anchor),
                    None => raw_pt,
                };
                if state.is_just_inactive() {
                    self.pinch_anchor[i] = None;
                }
            } else {
                self.pinch_anchor[i] = None;
                hand.pinch_pt = raw_pt;
            }
        } else {
            self.pinch_anchor[i] = None;
            hand.pinch_pt = raw_pt;
        }
    }

    /// Hand size is cheap but noisy; recompute on a throttle, and always
    /// right after a source switch
    fn update_size(&mut self, now: f64) {
        let due = self.size_dirty
            || now - self.last_size_update
                >= self.shared.config.size_update_interval as f64;
        if !due {
            return;
        }
        for handedness in Handedness::BOTH {
            let hand = self.shared.hand_mut(handedness);
            if hand.is_tracked() || self.size_dirty {
                hand.size = hand_size(hand);
            }
        }
        self.last_size_update = now;
        self.size_dirty = false;
    }

    fn update_visuals(&mut self) {
        for handedness in Handedness::BOTH {
            let i = handedness.index();
            let hand = self.shared.hand(handedness);
            if self.visible[i] && hand.is_tracked() {
                self.meshes[i].update(hand);
            }
        }
    }
}

/// Middle-finger length plus end-joint radii; the conventional scalar for
/// scaling UI to a user's hand
fn hand_size(hand: &HandState) -> f32 {
    let joints = FingerJoint::ALL;
    let mut size = 0.0;
    for pair in joints.windows(2) {
        let a = hand.joints.get(Finger::Middle, pair[0]);
        let b = hand.joints.get(Finger::Middle, pair[1]);
        size += a.position.distance(b.position);
    }
    size += hand.joints.get(Finger::Middle, FingerJoint::Root).radius;
    size += hand.joints.get(Finger::Middle, FingerJoint::Tip).radius;
    size
}
