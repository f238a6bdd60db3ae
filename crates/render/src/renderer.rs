use crate::render_list::RenderList;
use boxscene_scene::{PerspectiveCamera, Scene};
use std::convert::Infallible;
use std::fmt::Write;

/// Renderer-agnostic interface. All backends implement this trait.
///
/// A renderer reads the scene and camera and produces output. It never changes
/// scene membership.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Render one frame of `scene` as seen through `camera`.
    fn render(&mut self, scene: &Scene, camera: &PerspectiveCamera) -> Result<Self::Output, Self::Error>;
}

/// Text renderer for headless runs.
///
/// Produces a human-readable description of what a frame would draw.
#[derive(Debug, Default)]
pub struct DebugTextRenderer {
    frames: u64,
}

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of frames rendered so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;
    type Error = Infallible;

    fn render(&mut self, scene: &Scene, camera: &PerspectiveCamera) -> Result<String, Infallible> {
        self.frames += 1;
        let list = RenderList::collect(scene);

        let mut out = String::new();
        let _ = writeln!(
            out,
            "=== Frame {} (nodes={}, drawn={}) ===",
            self.frames,
            scene.len(),
            list.len()
        );
        let (p, t) = (camera.position, camera.target);
        let _ = writeln!(
            out,
            "Camera: pos=({:.2}, {:.2}, {:.2}) target=({:.2}, {:.2}, {:.2}) fov={:.0} aspect={:.3}",
            p.x, p.y, p.z, t.x, t.y, t.z, camera.fov_degrees, camera.aspect
        );

        for item in list.items() {
            let name = scene.get(item.node).map(|n| n.name.as_str()).unwrap_or("?");
            let pos = item.model.w_axis;
            let _ = writeln!(
                out,
                "  [{}] {} {:?} pos=({:.2}, {:.2}, {:.2}) order={}",
                item.node,
                item.kind.type_name(),
                name,
                pos.x,
                pos.y,
                pos.z,
                item.render_order
            );
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boxscene_scene::{SceneConfig, assemble};

    #[test]
    fn debug_renderer_empty_scene() {
        let mut renderer = DebugTextRenderer::new();
        let output = renderer.render(&Scene::new(), &PerspectiveCamera::default()).unwrap();

        assert!(output.contains("Frame 1"));
        assert!(output.contains("nodes=0, drawn=0"));
    }

    #[test]
    fn debug_renderer_lists_drawables() {
        let (scene, camera, _) = assemble(&SceneConfig::default());
        let mut renderer = DebugTextRenderer::new();
        let output = renderer.render(&scene, &camera).unwrap();

        assert!(output.contains("nodes=7, drawn=4"));
        assert!(output.contains("\"Box 2\" pos=(1.50, 0.00, 0.00)"));
        assert!(output.contains("fov=75"));
        assert!(!output.contains("Light"));
    }

    #[test]
    fn frame_counter_advances() {
        let (scene, camera, _) = assemble(&SceneConfig::default());
        let mut renderer = DebugTextRenderer::new();
        renderer.render(&scene, &camera).unwrap();
        let second = renderer.render(&scene, &camera).unwrap();
        assert_eq!(renderer.frames(), 2);
        assert!(second.starts_with("=== Frame 2"));
    }
}
