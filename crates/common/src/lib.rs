//! Shared types for the boxscene workspace.
//!
//! Everything here is plain data: identifiers, spatial transforms and colours
//! that the scene graph, renderers and tools pass between each other.

pub mod color;
pub mod types;

pub use color::{Color, ColorParseError};
pub use types::{NodeId, Transform};
