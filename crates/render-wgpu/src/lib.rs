//! wgpu render backend.
//!
//! Draws the scene's render list: unlit instanced boxes, then grid and axes
//! helper lines in render order. Helpers with depth testing off draw over
//! everything before them.
//!
//! # Invariants
//! - Renderer never mutates the scene.
//! - The depth and MSAA targets always match the configured surface size.

mod error;
mod geometry;
mod gpu;
mod shaders;
mod surface;

pub use error::GpuError;
pub use gpu::WgpuRenderer;
pub use surface::{PendingFrame, SurfaceRenderer};
