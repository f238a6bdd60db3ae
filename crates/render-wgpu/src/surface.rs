use crate::error::GpuError;
use crate::gpu::WgpuRenderer;
use boxscene_render::{RenderSurface, Renderer};
use boxscene_scene::{PerspectiveCamera, Scene};

/// Requested multisample count; falls back to 1 when the format can't do it.
const MSAA_SAMPLES: u32 = 4;

/// A surface texture with the scene already drawn into it.
///
/// Overlays (the debug UI) draw into [`PendingFrame::view`] before
/// [`PendingFrame::present`].
pub struct PendingFrame {
    texture: wgpu::SurfaceTexture,
    view: wgpu::TextureView,
    drawn: usize,
}

impl PendingFrame {
    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    /// Render-list items drawn this frame.
    pub fn drawn(&self) -> usize {
        self.drawn
    }

    pub fn present(self) {
        self.texture.present();
    }
}

/// The window's drawing buffer: surface, device and scene renderer.
pub struct SurfaceRenderer {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    renderer: WgpuRenderer,
    backend: wgpu::Backend,
}

impl SurfaceRenderer {
    /// Bring up the GPU for `target` at the given physical size.
    pub fn new(
        target: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
    ) -> Result<Self, GpuError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance.create_surface(target)?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .ok_or(GpuError::NoAdapter)?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("boxscene_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or(GpuError::NoSurfaceFormat)?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let sample_count = if adapter
            .get_texture_format_features(surface_format)
            .flags
            .sample_count_supported(MSAA_SAMPLES)
        {
            MSAA_SAMPLES
        } else {
            1
        };
        let renderer = WgpuRenderer::new(&device, surface_format, config.width, config.height, sample_count);

        let backend = adapter.get_info().backend;
        tracing::info!(
            backend = backend.to_str(),
            format = ?surface_format,
            sample_count,
            "GPU initialized"
        );

        Ok(Self {
            surface,
            device,
            queue,
            config,
            renderer,
            backend,
        })
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    pub fn backend(&self) -> wgpu::Backend {
        self.backend
    }

    pub fn sample_count(&self) -> u32 {
        self.renderer.sample_count()
    }

    fn reconfigure(&self) {
        self.surface.configure(&self.device, &self.config);
    }
}

impl RenderSurface for SurfaceRenderer {
    fn set_drawable_size(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.reconfigure();
        self.renderer.resize(&self.device, width, height);
        tracing::debug!(width, height, "surface reconfigured");
    }

    fn drawable_size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }
}

impl Renderer for SurfaceRenderer {
    /// `None` when the surface had to be reconfigured and the frame skipped.
    type Output = Option<PendingFrame>;
    type Error = GpuError;

    fn render(&mut self, scene: &Scene, camera: &PerspectiveCamera) -> Result<Self::Output, Self::Error> {
        let texture = match self.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.reconfigure();
                return Ok(None);
            }
            Err(wgpu::SurfaceError::Timeout) => {
                tracing::warn!("surface timeout, skipping frame");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let view = texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let drawn = self
            .renderer
            .render(&self.device, &self.queue, &view, scene, camera);

        Ok(Some(PendingFrame {
            texture,
            view,
            drawn,
        }))
    }
}
