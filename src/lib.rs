//! Hand-input fusion and simulation
//!
//! Turns whatever hand-shaped input a platform has — articulated trackers,
//! motion controllers, a mouse, or developer-supplied joints — into one
//! canonical per-hand representation: a 25-joint pose, palm/wrist/aim
//! poses, pinch and grip gesture states, hand size, and a procedurally
//! synthesized mesh.
//!
//! The platform layer feeds a [`FrameInput`] snapshot into a
//! [`HandInputContext`] once per simulation step; everything downstream
//! reads the resulting [`hand::HandState`]s.
//!
//! ```no_run
//! use hand_input::{FrameInput, HandInputConfig, HandInputContext};
//! use hand_input::hand::Handedness;
//!
//! let config = HandInputConfig::load_from_env().unwrap_or_default();
//! let mut hands = HandInputContext::new(config);
//! let mut input = FrameInput::default();
//!
//! loop {
//!     // platform fills `input` here
//!     input.tick(1.0 / 60.0);
//!     hands.update_frame(&input);
//!     let right = hands.hand(Handedness::Right);
//!     if right.pinch_state.is_just_active() {
//!         // grab whatever is at right.pinch_pt
//!     }
//! }
//! ```

pub mod config;
pub mod hand;
pub mod input;
pub mod math;

pub use config::{ConfigLoadError, HandInputConfig};
pub use hand::HandInputContext;
pub use input::FrameInput;
