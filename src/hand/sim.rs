//! Pose simulation for sources without articulated tracking
//!
//! Mouse and controller hands have no per-joint data, so they pick a canned
//! palm-relative hand shape from a template table based on the buttons
//! currently held, and blend from the previous shape to the new one over a
//! short window. Templates are authored for the left hand; mirroring happens
//! later, in coordinate reconciliation.

use glam::{Quat, Vec3};
use tracing::debug;

use crate::input::{ControllerButton, ControllerSnapshot, Key, KeyboardState};
use crate::math::{FORWARD, Pose};
use crate::hand::model::HAND_JOINT_COUNT;

/// Identifier for a registered pose template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PoseTemplateId(pub u32);

/// Built-in template ids
impl PoseTemplateId {
    pub const NEUTRAL: PoseTemplateId = PoseTemplateId(0);
    pub const PINCH: PoseTemplateId = PoseTemplateId(1);
    pub const POINT: PoseTemplateId = PoseTemplateId(2);
    pub const FIST: PoseTemplateId = PoseTemplateId(3);
}

/// What activates a template
///
/// A template can be gated by analog controller buttons, by digital hotkeys,
/// or both; either gate satisfies it. A template with neither gate is the
/// neutral fallback, used when nothing else matches.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateTrigger {
    pub buttons: Option<(ControllerButton, Option<ControllerButton>)>,
    pub hotkeys: Option<(Key, Option<Key>)>,
}

impl TemplateTrigger {
    pub const NEUTRAL: TemplateTrigger = TemplateTrigger {
        buttons: None,
        hotkeys: None,
    };

    pub fn is_neutral(&self) -> bool {
        self.buttons.is_none() && self.hotkeys.is_none()
    }
}

/// A canned palm-relative hand shape
#[derive(Debug, Clone, Copy)]
pub struct PoseTemplate {
    pub id: PoseTemplateId,
    /// Palm-relative, left-handed joint poses, `[finger * 5 + joint]`
    pub joints: [Pose; HAND_JOINT_COUNT],
    pub trigger: TemplateTrigger,
}

/// How strongly a matched template is gated this frame
#[derive(Debug, Clone, Copy)]
struct TemplateMatch {
    index: usize,
    /// Analog gate amount; `None` for digital gates, which instead use the
    /// time-eased blend
    amount: Option<f32>,
}

/// Per-hand blend bookkeeping between template switches
#[derive(Debug, Clone, Copy)]
struct BlendBuffer {
    prev: [Pose; HAND_JOINT_COUNT],
    current: [Pose; HAND_JOINT_COUNT],
    prev_template: PoseTemplateId,
    switch_time: f64,
}

/// The pose simulation state machine
#[derive(Debug, Clone)]
pub struct PoseSimulator {
    templates: Vec<PoseTemplate>,
    blend: [BlendBuffer; 2],
    blend_window: f32,
}

impl PoseSimulator {
    /// Creates a simulator seeded with the built-in template table
    pub fn new(blend_window: f32) -> Self {
        let templates = builtin_templates();
        let neutral = templates
            .iter()
            .find(|t| t.trigger.is_neutral())
            .map(|t| t.joints)
            .unwrap_or([Pose::IDENTITY; HAND_JOINT_COUNT]);
        let buffer = BlendBuffer {
            prev: neutral,
            current: neutral,
            prev_template: PoseTemplateId::NEUTRAL,
            switch_time: 0.0,
        };
        Self {
            templates,
            blend: [buffer; 2],
            blend_window,
        }
    }

    /// The neutral template's joints, used to seed hands at startup
    pub fn neutral_joints(&self) -> [Pose; HAND_JOINT_COUNT] {
        self.templates
            .iter()
            .find(|t| t.trigger.is_neutral())
            .map(|t| t.joints)
            .unwrap_or([Pose::IDENTITY; HAND_JOINT_COUNT])
    }

    /// Registers a template at the end of the scan order
    pub fn add_template(&mut self, template: PoseTemplate) {
        debug!(id = template.id.0, "registering hand pose template");
        self.templates.push(template);
    }

    /// Removes a template by id; removing an unknown id is a no-op
    pub fn remove_template(&mut self, id: PoseTemplateId) {
        if let Some(pos) = self.templates.iter().position(|t| t.id == id) {
            debug!(id = id.0, "removing hand pose template");
            self.templates.remove(pos);
        }
    }

    pub fn template_count(&self) -> usize {
        self.templates.len()
    }

    /// Selects the active template and produces the blended palm-relative
    /// pose for one hand
    ///
    /// `hand` is 0 for left, 1 for right. `now` is the monotonic total-time
    /// clock; the same clock must be used across frames for the eased blend
    /// to be continuous.
    pub fn update(
        &mut self,
        hand: usize,
        keys: &KeyboardState,
        controller: Option<&ControllerSnapshot>,
        now: f64,
    ) -> [Pose; HAND_JOINT_COUNT] {
        let selected = self.select(keys, controller);
        let template = &self.templates[selected.index];
        let buffer = &mut self.blend[hand];

        if template.id != buffer.prev_template {
            buffer.prev = buffer.current;
            buffer.prev_template = template.id;
            buffer.switch_time = now;
        }

        let blend = match selected.amount {
            Some(amount) => amount,
            None => {
                // Ease-out over the blend window: fast start, slow finish
                let elapsed = (now - buffer.switch_time) as f32;
                let t = 1.0 - (elapsed / self.blend_window).min(1.0);
                1.0 - t * t
            }
        };

        for j in 0..HAND_JOINT_COUNT {
            buffer.current[j] = buffer.prev[j].blend(&template.joints[j], blend);
        }
        buffer.current
    }

    /// The most recently blended pose for a hand, without advancing state
    pub fn current(&self, hand: usize) -> &[Pose; HAND_JOINT_COUNT] {
        &self.blend[hand].current
    }

    /// Scans templates in registration order; the first satisfied
    /// non-neutral match wins, otherwise the neutral entry
    fn select(&self, keys: &KeyboardState, controller: Option<&ControllerSnapshot>) -> TemplateMatch {
        let mut neutral = TemplateMatch {
            index: 0,
            amount: None,
        };
        for (index, template) in self.templates.iter().enumerate() {
            if template.trigger.is_neutral() {
                neutral = TemplateMatch {
                    index,
                    amount: None,
                };
                continue;
            }
            if let Some(matched) = Self::gate(&template.trigger, keys, controller) {
                return TemplateMatch {
                    index,
                    amount: matched,
                };
            }
        }
        neutral
    }

    /// Checks one template's gates. Returns `Some(amount)` when satisfied;
    /// the inner amount is `None` for digital gates.
    fn gate(
        trigger: &TemplateTrigger,
        keys: &KeyboardState,
        controller: Option<&ControllerSnapshot>,
    ) -> Option<Option<f32>> {
        if let (Some((first, second)), Some(snapshot)) = (trigger.buttons, controller) {
            let a = snapshot.amount(first);
            let b = second.map(|b| snapshot.amount(b)).unwrap_or(1.0);
            // Two analog gates blend by the weaker of the pair
            if a > 0.5 && b > 0.5 {
                return Some(Some(a.min(b)));
            }
        }
        if let Some((first, second)) = trigger.hotkeys {
            let held = keys.key(first).is_active()
                && second.map(|k| keys.key(k).is_active()).unwrap_or(true);
            if held {
                return Some(None);
            }
        }
        None
    }
}

/// Flat joint index for `[finger][joint]`
const fn flat(finger: usize, joint: usize) -> usize {
    finger * 5 + joint
}

/// Builds one finger's joint chain
///
/// `root` anchors the metacarpal; `splay_deg` rotates the whole finger in
/// the palm plane; `lengths` are the four bone lengths root→tip; `curls_deg`
/// are per-bone curl angles, accumulated toward the palm.
fn finger_chain(root: Vec3, splay_deg: f32, lengths: [f32; 4], curls_deg: [f32; 4]) -> [Pose; 5] {
    let splay = Quat::from_rotation_y(splay_deg.to_radians());
    let mut joints = [Pose::IDENTITY; 5];
    let mut position = root;
    let mut curl = 0.0_f32;
    for bone in 0..4 {
        curl += curls_deg[bone];
        let orientation = splay * Quat::from_rotation_x(-curl.to_radians());
        joints[bone] = Pose::new(position, orientation);
        position += orientation * FORWARD * lengths[bone];
    }
    joints[4] = Pose::new(position, joints[3].orientation);
    joints
}

/// Four bone lengths per finger, thumb..pinky, meters
const BONE_LENGTHS: [[f32; 4]; 5] = [
    [0.0, 0.05, 0.035, 0.03],
    [0.06, 0.042, 0.025, 0.022],
    [0.058, 0.047, 0.029, 0.023],
    [0.054, 0.042, 0.027, 0.022],
    [0.05, 0.032, 0.021, 0.019],
];

/// Metacarpal anchor per finger, thumb..pinky
const FINGER_ROOTS: [Vec3; 5] = [
    Vec3::new(0.025, -0.01, 0.01),
    Vec3::new(0.02, 0.0, 0.02),
    Vec3::new(0.0, 0.0, 0.02),
    Vec3::new(-0.02, 0.0, 0.02),
    Vec3::new(-0.038, 0.0, 0.025),
];

/// In-palm-plane splay per finger, thumb..pinky, degrees
const FINGER_SPLAY: [f32; 5] = [-55.0, -5.0, 0.0, 5.0, 10.0];

/// Builds a full 25-joint shape from per-finger curl sets
fn hand_shape(curls: [[f32; 4]; 5]) -> [Pose; HAND_JOINT_COUNT] {
    let mut joints = [Pose::IDENTITY; HAND_JOINT_COUNT];
    for f in 0..5 {
        let chain = finger_chain(FINGER_ROOTS[f], FINGER_SPLAY[f], BONE_LENGTHS[f], curls[f]);
        for j in 0..5 {
            joints[flat(f, j)] = chain[j];
        }
    }
    joints
}

/// Moves every thumb joint so the thumb tip lands `gap` meters from the
/// index tip, for shapes where the two are meant to touch
fn snap_thumb_to_index(joints: &mut [Pose; HAND_JOINT_COUNT], gap: f32) {
    let index_tip = joints[flat(1, 4)].position;
    let thumb_tip = joints[flat(0, 4)].position;
    let offset = (index_tip - thumb_tip) + Vec3::new(0.0, -gap, 0.0);
    for j in 0..5 {
        joints[flat(0, j)].position += offset;
    }
}

/// The four standard shapes: neutral, pinch, point, fist
///
/// Registration order matters: fist is scanned before pinch and point so a
/// combined trigger+grip press doesn't stop at the single-button matches.
pub fn builtin_templates() -> Vec<PoseTemplate> {
    let neutral_curls = [
        [0.0, 5.0, 10.0, 5.0],
        [0.0, 15.0, 20.0, 10.0],
        [0.0, 15.0, 20.0, 10.0],
        [0.0, 15.0, 20.0, 10.0],
        [0.0, 15.0, 20.0, 10.0],
    ];
    let pinch_curls = [
        [0.0, 10.0, 15.0, 10.0],
        [0.0, 35.0, 40.0, 30.0],
        [0.0, 30.0, 35.0, 25.0],
        [0.0, 30.0, 35.0, 25.0],
        [0.0, 30.0, 35.0, 25.0],
    ];
    let point_curls = [
        [0.0, 20.0, 30.0, 20.0],
        [0.0, 0.0, 5.0, 5.0],
        [0.0, 85.0, 95.0, 60.0],
        [0.0, 85.0, 95.0, 60.0],
        [0.0, 85.0, 95.0, 60.0],
    ];
    let fist_curls = [
        [0.0, 30.0, 40.0, 30.0],
        [0.0, 85.0, 95.0, 60.0],
        [0.0, 85.0, 95.0, 60.0],
        [0.0, 85.0, 95.0, 60.0],
        [0.0, 85.0, 95.0, 60.0],
    ];

    let mut pinch = hand_shape(pinch_curls);
    snap_thumb_to_index(&mut pinch, 0.001);
    let mut fist = hand_shape(fist_curls);
    snap_thumb_to_index(&mut fist, 0.004);

    vec![
        PoseTemplate {
            id: PoseTemplateId::FIST,
            joints: fist,
            trigger: TemplateTrigger {
                buttons: Some((ControllerButton::Trigger, Some(ControllerButton::Grip))),
                hotkeys: Some((Key::MouseLeft, Some(Key::MouseRight))),
            },
        },
        PoseTemplate {
            id: PoseTemplateId::PINCH,
            joints: pinch,
            trigger: TemplateTrigger {
                buttons: Some((ControllerButton::Trigger, None)),
                hotkeys: Some((Key::MouseLeft, None)),
            },
        },
        PoseTemplate {
            id: PoseTemplateId::POINT,
            joints: hand_shape(point_curls),
            trigger: TemplateTrigger {
                buttons: Some((ControllerButton::Grip, None)),
                hotkeys: Some((Key::MouseRight, None)),
            },
        },
        PoseTemplate {
            id: PoseTemplateId::NEUTRAL,
            joints: hand_shape(neutral_curls),
            trigger: TemplateTrigger::NEUTRAL,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEFT: usize = 0;

    fn keys_with(key: Key) -> KeyboardState {
        let mut keys = KeyboardState::default();
        keys.set_held(key, true);
        keys
    }

    #[test]
    fn test_neutral_selected_without_input() {
        let mut sim = PoseSimulator::new(0.1);
        let keys = KeyboardState::default();
        sim.update(LEFT, &keys, None, 0.0);
        assert_eq!(sim.blend[LEFT].prev_template, PoseTemplateId::NEUTRAL);
    }

    #[test]
    fn test_mouse_left_selects_pinch() {
        let mut sim = PoseSimulator::new(0.1);
        sim.update(LEFT, &keys_with(Key::MouseLeft), None, 0.0);
        assert_eq!(sim.blend[LEFT].prev_template, PoseTemplateId::PINCH);
    }

    #[test]
    fn test_both_mouse_buttons_select_fist() {
        let mut sim = PoseSimulator::new(0.1);
        let mut keys = keys_with(Key::MouseLeft);
        keys.set_held(Key::MouseRight, true);
        sim.update(LEFT, &keys, None, 0.0);
        assert_eq!(sim.blend[LEFT].prev_template, PoseTemplateId::FIST);
    }

    #[test]
    fn test_ease_out_blend_midpoint() {
        // Switch at t=0, sample at half the window: 1 - (1-0.5)^2 = 0.75
        let mut sim = PoseSimulator::new(0.1);
        sim.update(LEFT, &KeyboardState::default(), None, 0.0);
        let neutral = sim.neutral_joints();

        sim.update(LEFT, &keys_with(Key::MouseLeft), None, 1.0);
        let pose = sim.update(LEFT, &keys_with(Key::MouseLeft), None, 1.05);

        let target = builtin_templates()
            .into_iter()
            .find(|t| t.id == PoseTemplateId::PINCH)
            .unwrap()
            .joints;
        let tip = flat(1, 4);
        let expected = neutral[tip].position.lerp(target[tip].position, 0.75);
        assert!(
            (pose[tip].position - expected).length() < 1e-5,
            "expected {:?}, got {:?}",
            expected,
            pose[tip].position
        );
    }

    #[test]
    fn test_blend_completes_after_window() {
        let mut sim = PoseSimulator::new(0.1);
        sim.update(LEFT, &KeyboardState::default(), None, 0.0);
        sim.update(LEFT, &keys_with(Key::MouseLeft), None, 1.0);
        let pose = sim.update(LEFT, &keys_with(Key::MouseLeft), None, 1.2);

        let target = builtin_templates()
            .into_iter()
            .find(|t| t.id == PoseTemplateId::PINCH)
            .unwrap()
            .joints;
        let tip = flat(1, 4);
        assert!((pose[tip].position - target[tip].position).length() < 1e-5);
    }

    #[test]
    fn test_analog_trigger_blends_by_amount() {
        let mut sim = PoseSimulator::new(0.1);
        sim.update(LEFT, &KeyboardState::default(), None, 0.0);
        let neutral = sim.neutral_joints();

        let controller = ControllerSnapshot {
            tracked: true,
            palm: Pose::IDENTITY,
            aim: Pose::IDENTITY,
            trigger: 0.6,
            grip: 0.0,
        };
        let keys = KeyboardState::default();
        let pose = sim.update(LEFT, &keys, Some(&controller), 1.0);

        let target = builtin_templates()
            .into_iter()
            .find(|t| t.id == PoseTemplateId::PINCH)
            .unwrap()
            .joints;
        let tip = flat(1, 4);
        let expected = neutral[tip].position.lerp(target[tip].position, 0.6);
        assert!((pose[tip].position - expected).length() < 1e-5);
    }

    #[test]
    fn test_remove_unknown_template_is_noop() {
        let mut sim = PoseSimulator::new(0.1);
        let count = sim.template_count();
        sim.remove_template(PoseTemplateId(999));
        assert_eq!(sim.template_count(), count);
    }

    #[test]
    fn test_add_and_remove_template() {
        let mut sim = PoseSimulator::new(0.1);
        let count = sim.template_count();
        let custom = PoseTemplate {
            id: PoseTemplateId(42),
            joints: [Pose::IDENTITY; HAND_JOINT_COUNT],
            trigger: TemplateTrigger {
                buttons: None,
                hotkeys: Some((Key::Alt, None)),
            },
        };
        sim.add_template(custom);
        assert_eq!(sim.template_count(), count + 1);
        sim.remove_template(PoseTemplateId(42));
        assert_eq!(sim.template_count(), count);
    }

    #[test]
    fn test_pinch_template_tips_touch() {
        let templates = builtin_templates();
        let pinch = templates.iter().find(|t| t.id == PoseTemplateId::PINCH).unwrap();
        let dist = pinch.joints[flat(0, 4)]
            .position
            .distance(pinch.joints[flat(1, 4)].position);
        assert!(dist < 0.005, "pinch tips {}m apart", dist);
    }

    #[test]
    fn test_neutral_template_tips_apart() {
        let templates = builtin_templates();
        let neutral = templates.iter().find(|t| t.trigger.is_neutral()).unwrap();
        let dist = neutral.joints[flat(0, 4)]
            .position
            .distance(neutral.joints[flat(1, 4)].position);
        assert!(dist > 0.05, "neutral tips only {}m apart", dist);
    }
}
