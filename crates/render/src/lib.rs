//! Rendering shell: everything between the scene graph and a concrete backend.
//!
//! # Invariants
//! - Renderers read the scene and camera; they never add or remove nodes.
//! - Within one frame the camera controller runs before the renderer.
//! - After every viewport sync, camera aspect equals drawable width / height.
//!
//! The [`Renderer`] trait is the seam between this crate and a backend. The
//! wgpu backend lives in its own crate; [`DebugTextRenderer`] covers headless
//! runs and tests.

pub mod clock;
pub mod error;
pub mod frame;
pub mod render_list;
pub mod renderer;
pub mod viewport;

pub use clock::{Clock, FixedStepClock, MonotonicClock};
pub use error::{FrameError, ShellError};
pub use frame::{CameraController, FrameDriver, FrameReport, FrameScheduler, FrameState};
pub use render_list::{DrawItem, RenderList};
pub use renderer::{DebugTextRenderer, Renderer};
pub use viewport::{HostSurface, RenderSurface, SyncOutcome, ViewportSize, ViewportSync, sync};
