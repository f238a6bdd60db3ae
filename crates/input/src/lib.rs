//! Camera input: pointer gestures mapped to damped orbit motion.
//!
//! # Invariants
//! - Raw window events never reach the controller; they are turned into
//!   [`PointerAction`]s first, so any windowing backend can drive it.
//! - Input only sets goals. The camera moves in [`OrbitControls::update`],
//!   which the frame driver calls once per frame.

pub mod action;
pub mod orbit;

pub use action::{PointerAction, PointerButton, PointerState};
pub use orbit::{OrbitControls, Spherical};
