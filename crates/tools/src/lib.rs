//! Developer tooling: the debug control panel model and a scene inspector.
//!
//! # Invariants
//! - Panel controls hold node ids, never references, and edit the scene in
//!   place; they cannot add or remove nodes.
//! - Numeric writes are clamped to the control's bounds and snapped to its step.

pub mod inspector;
pub mod panel;

pub use inspector::{NodeInfo, SceneInspector, SceneSummary};
pub use panel::{Binding, Control, ControlValue, DebugPanel, Folder, NumberBounds, PanelError, demo_panel};
