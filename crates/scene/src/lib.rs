//! Scene graph and scene assembly.
//!
//! # Invariants
//! - The graph is append-only: nodes can be edited in place but never removed.
//! - Iteration follows insertion order.
//! - Assembly runs once and cannot fail for a validated config.

pub mod assemble;
pub mod camera;
pub mod config;
pub mod scene;

pub use assemble::{SceneHandles, assemble};
pub use camera::PerspectiveCamera;
pub use config::{ConfigError, SceneConfig};
pub use scene::{BasicMaterial, BoxGeometry, Node, NodeKind, Scene};
