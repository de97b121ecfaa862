//! Procedural hand mesh
//!
//! Each finger is a tube of seven-point rings, one ring per joint, closed
//! by a fingertip apex. The topology is fixed, so the index buffer is built
//! once; only vertices are rewritten as joints move. The vertex layout is
//! plain-old-data so a GPU layer can upload the buffers directly.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use crate::math::{FORWARD, UP};
use super::model::{
    FINGER_COUNT, Finger, FingerJoint, HandState, JOINT_COUNT,
};

/// Opaque handle to a render-layer material
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaterialHandle(pub u64);

/// One hand-mesh vertex, tightly packed for direct GPU upload
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
#[repr(C)]
pub struct HandMeshVertex {
    pub pos: [f32; 3],
    pub norm: [f32; 3],
    pub uv: [f32; 2],
    pub color: [u8; 4],
}

/// Points per ring; the ring is open, with seam vertices duplicated so the
/// texture can wrap without bleeding
const RING_POINTS: usize = 7;
/// Vertices per finger: one ring per joint plus the apex
const FINGER_VERTS: usize = RING_POINTS * JOINT_COUNT + 1;
/// Total vertices in a hand mesh
pub const VERTEX_COUNT: usize = FINGER_VERTS * FINGER_COUNT;

/// Ring vertex angles, degrees; 18 and 162 repeat to split the seam
const RING_ANGLES: [f32; RING_POINTS] = [162.0, 90.0, 18.0, 18.0, 306.0, 234.0, 162.0];
/// Normal angles, averaged between neighboring faces
const NORMAL_ANGLES: [f32; RING_POINTS] = [126.0, 90.0, 54.0, 18.0, 306.0, 234.0, 162.0];
/// Texture v per ring, root to tip
const TEXCOORD_V: [f32; JOINT_COUNT] = [1.0, 0.56, 0.31, 0.15, 0.04];

/// Largest bend angle the skew compensation handles, radians
const MAX_BEND: f32 = std::f32::consts::PI / 2.5;
/// Normals lean outward along the tube, so their in-plane part is scaled up
const NORMAL_SCALE: f32 = std::f32::consts::SQRT_2;

/// Vertex and index buffers for one hand
#[derive(Debug, Clone)]
pub struct HandMesh {
    vertices: Vec<HandMeshVertex>,
    indices: Vec<u32>,
}

impl HandMesh {
    pub fn new() -> Self {
        let mut mesh = Self {
            vertices: vec![HandMeshVertex::zeroed(); VERTEX_COUNT],
            indices: build_indices(),
        };
        mesh.write_static_attributes();
        mesh
    }

    pub fn vertices(&self) -> &[HandMeshVertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// UVs and colors never change; write them once
    fn write_static_attributes(&mut self) {
        for finger in Finger::ALL {
            let f = finger as usize;
            let base = f * FINGER_VERTS;
            for j in 0..JOINT_COUNT {
                // The thumb's duplicated root reuses the first knuckle's row
                let v_row = if finger == Finger::Thumb {
                    j.saturating_sub(1)
                } else {
                    j
                };
                // Each finger samples one column of the gradient texture;
                // ring shading comes from the color attribute.
                let u = (f as f32 + 0.5) / FINGER_COUNT as f32;
                for c in 0..RING_POINTS {
                    let vert = &mut self.vertices[base + j * RING_POINTS + c];
                    vert.uv = [u, TEXCOORD_V[v_row]];
                    // Knuckle side is lit a touch darker than the back
                    let shade = if RING_ANGLES[c].to_radians().sin() < 0.0 {
                        200
                    } else {
                        255
                    };
                    vert.color = [shade, shade, shade, 255];
                }
            }
            let apex = &mut self.vertices[base + FINGER_VERTS - 1];
            apex.uv = [(f as f32 + 0.5) / FINGER_COUNT as f32, 0.0];
            apex.color = [255, 255, 255, 255];
        }
    }

    /// Rewrites vertex positions and normals from the hand's current joints
    pub fn update(&mut self, hand: &HandState) {
        for finger in Finger::ALL {
            let f = finger as usize;
            let base = f * FINGER_VERTS;

            for j in 0..JOINT_COUNT {
                let joint = *hand.joints.get(finger, FingerJoint::ALL[j]);
                // Smooth the ring frame across the bend at interior joints
                let orientation = if j == 0 {
                    joint.orientation
                } else {
                    let parent = hand.joints.get(finger, FingerJoint::ALL[j - 1]);
                    parent.orientation.slerp(joint.orientation, 0.5)
                };

                // Widen the ring on the outside of a bend so the tube keeps
                // its silhouette when the finger curls
                let up_scale = if j > 0 && j < JOINT_COUNT - 1 {
                    let parent = hand.joints.get(finger, FingerJoint::ALL[j - 1]);
                    let bend = (parent.orientation * FORWARD)
                        .angle_between(joint.orientation * FORWARD)
                        .min(MAX_BEND);
                    1.0 / (bend * 0.5).cos()
                } else {
                    1.0
                };

                let mut radius = joint.radius;
                if finger == Finger::Thumb && j < 2 {
                    radius *= 0.5;
                }

                let is_tip = j == JOINT_COUNT - 1;
                let ring_scale = if is_tip { 0.75 } else { 1.0 };
                let center = if is_tip {
                    joint.position + orientation * FORWARD * (radius * 0.5)
                } else {
                    joint.position
                };

                for c in 0..RING_POINTS {
                    let (sin_p, cos_p) = RING_ANGLES[c].to_radians().sin_cos();
                    let (sin_n, cos_n) = NORMAL_ANGLES[c].to_radians().sin_cos();
                    let local = Vec3::new(cos_p, sin_p * up_scale, 0.0) * (radius * ring_scale);
                    let normal = orientation * (Vec3::new(cos_n, sin_n, 0.0) * NORMAL_SCALE);

                    let vert = &mut self.vertices[base + j * RING_POINTS + c];
                    vert.pos = (center + orientation * local).to_array();
                    vert.norm = normal.to_array();
                }

                if is_tip {
                    let apex = &mut self.vertices[base + FINGER_VERTS - 1];
                    apex.pos = (joint.position + orientation * FORWARD * radius).to_array();
                    apex.norm = (orientation * ((FORWARD + UP) * 0.5)).to_array();
                }
            }
        }
    }
}

impl Default for HandMesh {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds the fixed index buffer: a three-triangle root cap, quads between
/// ring pairs skipping the duplicated-seam segment, and a five-triangle
/// fan onto the apex
fn build_indices() -> Vec<u32> {
    let mut indices = Vec::with_capacity(FINGER_COUNT * 144);
    for f in 0..FINGER_COUNT {
        let base = (f * FINGER_VERTS) as u32;
        let ring = |r: usize, c: usize| base + (r * RING_POINTS + c) as u32;

        // Root cap; the seam duplicates (0/6 and 2/3) mean a plain fan
        // would leave a hole, so the three triangles are spelled out
        for [a, b, c] in [[2, 1, 0], [4, 3, 6], [5, 4, 6]] {
            indices.extend([ring(0, a), ring(0, b), ring(0, c)]);
        }

        // Tube
        for r in 0..JOINT_COUNT - 1 {
            for c in 0..RING_POINTS - 1 {
                if c == 2 {
                    continue;
                }
                let (a, b) = (ring(r, c), ring(r, c + 1));
                let (d, e) = (ring(r + 1, c), ring(r + 1, c + 1));
                indices.extend([a, b, e, a, e, d]);
            }
        }

        // Tip fan
        let apex = base + (FINGER_VERTS - 1) as u32;
        for c in 0..RING_POINTS - 1 {
            if c == 2 {
                continue;
            }
            indices.extend([apex, ring(JOINT_COUNT - 1, c), ring(JOINT_COUNT - 1, c + 1)]);
        }
    }
    indices
}
