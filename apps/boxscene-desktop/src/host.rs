use boxscene_render::{FrameScheduler, HostSurface};
use std::sync::Arc;
use winit::window::Window;

/// The OS window as the shell sees it: a live client size and a way to ask
/// for the next frame.
#[derive(Clone)]
pub struct WindowHost(Arc<Window>);

impl WindowHost {
    pub fn new(window: Arc<Window>) -> Self {
        Self(window)
    }

    pub fn window(&self) -> &Window {
        &self.0
    }
}

impl HostSurface for WindowHost {
    fn client_size(&self) -> (u32, u32) {
        let size = self.0.inner_size();
        (size.width, size.height)
    }
}

impl FrameScheduler for WindowHost {
    /// Redraws coalesce, so one request per frame keeps the loop going
    /// without spinning.
    fn request_frame(&mut self) {
        self.0.request_redraw();
    }
}
