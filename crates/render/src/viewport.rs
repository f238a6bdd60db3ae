use boxscene_scene::PerspectiveCamera;

/// Pixel dimensions of the render target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewportSize {
    pub width: u32,
    pub height: u32,
}

impl ViewportSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

impl std::fmt::Display for ViewportSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// The host's display surface: the window (or page element) frames appear in.
pub trait HostSurface {
    /// Current client-area size in physical pixels, read live.
    fn client_size(&self) -> (u32, u32);
}

/// The drawable the renderer writes to.
pub trait RenderSurface {
    /// Resize the drawable. Must not change the host surface's own layout.
    fn set_drawable_size(&mut self, width: u32, height: u32);
    fn drawable_size(&self) -> (u32, u32);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    Synced(ViewportSize),
    /// The host reported a zero dimension (minimised or not laid out yet);
    /// nothing was changed.
    Deferred,
}

/// Match the render surface and camera projection to the host surface.
///
/// Always reads the host's live size. Resize notifications carry no trusted
/// payload; whatever the host reports right now wins.
pub fn sync(
    camera: &mut PerspectiveCamera,
    surface: &mut impl RenderSurface,
    host: &impl HostSurface,
) -> SyncOutcome {
    let (width, height) = host.client_size();
    if width == 0 || height == 0 {
        tracing::debug!(width, height, "viewport sync deferred");
        return SyncOutcome::Deferred;
    }

    surface.set_drawable_size(width, height);
    let size = ViewportSize::new(width, height);
    camera.aspect = size.aspect();
    camera.update_projection_matrix();
    tracing::debug!(%size, aspect = camera.aspect, "viewport synced");
    SyncOutcome::Synced(size)
}

/// Tracks the viewport size across syncs.
#[derive(Debug, Clone, Default)]
pub struct ViewportSync {
    size: Option<ViewportSize>,
    sync_count: u64,
}

impl ViewportSync {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run [`sync`] and remember the result. A deferred sync keeps the
    /// previous size.
    pub fn sync(
        &mut self,
        camera: &mut PerspectiveCamera,
        surface: &mut impl RenderSurface,
        host: &impl HostSurface,
    ) -> SyncOutcome {
        let outcome = sync(camera, surface, host);
        if let SyncOutcome::Synced(size) = outcome {
            self.size = Some(size);
            self.sync_count += 1;
        }
        outcome
    }

    /// Size after the last successful sync.
    pub fn size(&self) -> Option<ViewportSize> {
        self.size
    }

    pub fn sync_count(&self) -> u64 {
        self.sync_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct FakeHost {
        size: Cell<(u32, u32)>,
    }

    impl FakeHost {
        fn new(w: u32, h: u32) -> Self {
            Self {
                size: Cell::new((w, h)),
            }
        }

        fn resize(&self, w: u32, h: u32) {
            self.size.set((w, h));
        }
    }

    impl HostSurface for FakeHost {
        fn client_size(&self) -> (u32, u32) {
            self.size.get()
        }
    }

    #[derive(Default)]
    struct FakeSurface {
        size: (u32, u32),
        resizes: u32,
    }

    impl RenderSurface for FakeSurface {
        fn set_drawable_size(&mut self, width: u32, height: u32) {
            self.size = (width, height);
            self.resizes += 1;
        }

        fn drawable_size(&self) -> (u32, u32) {
            self.size
        }
    }

    fn assert_consistent(camera: &PerspectiveCamera, surface: &FakeSurface, host: &FakeHost) {
        let (w, h) = surface.drawable_size();
        assert_eq!((w, h), host.client_size());
        assert!((camera.aspect - w as f32 / h as f32).abs() < 1e-6);
        assert_eq!(
            camera.projection_matrix(),
            glam::Mat4::perspective_rh(
                camera.fov_degrees.to_radians(),
                camera.aspect,
                camera.near,
                camera.far
            )
        );
    }

    #[test]
    fn startup_then_resize_scenario() {
        let host = FakeHost::new(800, 600);
        let mut surface = FakeSurface::default();
        let mut camera = PerspectiveCamera::new(75.0, 1.0);
        let mut viewport = ViewportSync::new();

        let outcome = viewport.sync(&mut camera, &mut surface, &host);
        assert_eq!(outcome, SyncOutcome::Synced(ViewportSize::new(800, 600)));
        assert!((camera.aspect - 800.0 / 600.0).abs() < 1e-6);
        assert_consistent(&camera, &surface, &host);

        host.resize(400, 300);
        viewport.sync(&mut camera, &mut surface, &host);
        assert!((camera.aspect - 400.0 / 300.0).abs() < 1e-6);
        assert_eq!(surface.drawable_size(), (400, 300));
        assert_eq!(viewport.size(), Some(ViewportSize::new(400, 300)));
        assert_eq!(viewport.sync_count(), 2);
    }

    #[test]
    fn every_resize_keeps_aspect_consistent() {
        let host = FakeHost::new(1, 1);
        let mut surface = FakeSurface::default();
        let mut camera = PerspectiveCamera::default();
        for (w, h) in [(1280, 720), (720, 1280), (1, 1), (3840, 2160), (333, 777)] {
            host.resize(w, h);
            sync(&mut camera, &mut surface, &host);
            assert_consistent(&camera, &surface, &host);
        }
        assert_eq!(surface.resizes, 5);
    }

    #[test]
    fn zero_height_is_deferred() {
        let host = FakeHost::new(800, 600);
        let mut surface = FakeSurface::default();
        let mut camera = PerspectiveCamera::default();
        let mut viewport = ViewportSync::new();
        viewport.sync(&mut camera, &mut surface, &host);
        let aspect = camera.aspect;

        host.resize(800, 0);
        assert_eq!(viewport.sync(&mut camera, &mut surface, &host), SyncOutcome::Deferred);
        assert_eq!(camera.aspect, aspect);
        assert!(camera.aspect.is_finite());
        assert_eq!(surface.drawable_size(), (800, 600));
        assert_eq!(viewport.size(), Some(ViewportSize::new(800, 600)));

        host.resize(0, 600);
        assert_eq!(sync(&mut camera, &mut surface, &host), SyncOutcome::Deferred);
        assert_eq!(surface.resizes, 1);
    }

    #[test]
    fn size_display() {
        assert_eq!(ViewportSize::new(400, 300).to_string(), "400x300");
    }
}
