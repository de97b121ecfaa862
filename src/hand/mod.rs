//! Hand input: source fusion, gesture detection, pose simulation, and the
//! procedural hand mesh

pub mod context;
pub mod gesture;
pub mod mesh;
pub mod model;
pub mod reconcile;
pub mod sim;
pub mod source;
pub mod sources;

pub use context::HandInputContext;
pub use gesture::{GestureThresholds, detect};
pub use mesh::{HandMesh, HandMeshVertex, MaterialHandle};
pub use model::{
    ButtonBits, Finger, FingerJoint, HandPose, HandState, Handedness, Joint,
    HAND_JOINT_COUNT, OVERRIDE_JOINT_COUNT,
};
pub use sim::{PoseSimulator, PoseTemplate, PoseTemplateId, TemplateTrigger};
pub use source::{HandSource, HandSourceKind};
