mod host;
mod ui;

use anyhow::{Context as _, Result};
use boxscene_input::{OrbitControls, PointerButton, PointerState};
use boxscene_render::{FrameDriver, MonotonicClock, RenderSurface, ShellError, SyncOutcome, ViewportSync};
use boxscene_render_wgpu::{PendingFrame, SurfaceRenderer};
use boxscene_scene::{PerspectiveCamera, Scene, SceneConfig, SceneHandles, assemble};
use boxscene_tools::{DebugPanel, demo_panel};
use clap::Parser;
use egui::Context as EguiContext;
use host::WindowHost;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

/// Pixel scroll distance treated as one wheel notch.
const PIXELS_PER_WHEEL_STEP: f32 = 50.0;

#[derive(Parser)]
#[command(name = "boxscene-desktop", about = "Box scene viewer with orbit camera and debug panel")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Scene config JSON; defaults are used when omitted
    #[arg(long)]
    scene_config: Option<PathBuf>,

    /// Initial window width in physical pixels
    #[arg(long)]
    width: Option<u32>,

    /// Initial window height in physical pixels
    #[arg(long)]
    height: Option<u32>,

    /// Window title
    #[arg(long, default_value = "boxscene")]
    title: String,
}

/// Everything the frame loop and the UI touch.
pub(crate) struct AppState {
    pub scene: Scene,
    pub camera: PerspectiveCamera,
    pub handles: SceneHandles,
    pub panel: DebugPanel,
    pub viewport: ViewportSync,
    pub driver: FrameDriver<MonotonicClock, OrbitControls>,
    pub pointer: PointerState,
    pub show_panel: bool,
}

impl AppState {
    fn new(config: &SceneConfig) -> Result<Self> {
        let (scene, camera, handles) = assemble(config);
        let panel = demo_panel(&handles);
        panel.validate(&scene).context("debug panel bound to a missing node")?;

        let controls = OrbitControls::from_camera(&camera);
        Ok(Self {
            scene,
            camera,
            handles,
            panel,
            viewport: ViewportSync::new(),
            driver: FrameDriver::new(MonotonicClock::new(), controls),
            pointer: PointerState::new(),
            show_panel: true,
        })
    }

    /// Re-read the host size and push it to the surface, camera and controls.
    fn sync_viewport(&mut self, surface: &mut impl RenderSurface, host: &WindowHost) {
        if let SyncOutcome::Synced(size) = self.viewport.sync(&mut self.camera, surface, host) {
            self.driver.controller_mut().set_viewport_height(size.height);
        }
    }

    fn handle_pointer_button(&mut self, button: MouseButton, pressed: bool) {
        let button = match button {
            MouseButton::Left => PointerButton::Primary,
            MouseButton::Right => PointerButton::Secondary,
            MouseButton::Middle => PointerButton::Middle,
            _ => return,
        };
        self.pointer.button(button, pressed);
        let dragging = self.pointer.is_dragging();
        self.driver.controller_mut().set_dragging(dragging);
    }

    fn handle_cursor(&mut self, x: f64, y: f64) {
        if let Some(action) = self.pointer.moved(x, y) {
            self.driver.controller_mut().apply(action);
        }
    }

    fn handle_wheel(&mut self, delta: MouseScrollDelta) {
        let steps = match delta {
            MouseScrollDelta::LineDelta(_, y) => y,
            MouseScrollDelta::PixelDelta(p) => p.y as f32 / PIXELS_PER_WHEEL_STEP,
        };
        if let Some(action) = self.pointer.wheel(steps) {
            self.driver.controller_mut().apply(action);
        }
    }

    fn handle_key(&mut self, key: KeyCode, pressed: bool) {
        if pressed && key == KeyCode::F1 {
            self.show_panel = !self.show_panel;
        }
    }
}

struct GpuApp {
    state: AppState,
    title: String,
    initial_size: PhysicalSize<u32>,
    host: Option<WindowHost>,
    gpu: Option<SurfaceRenderer>,
    egui_ctx: EguiContext,
    egui_winit: Option<egui_winit::State>,
    egui_renderer: Option<egui_wgpu::Renderer>,
    fatal: Option<anyhow::Error>,
}

impl GpuApp {
    fn new(state: AppState, title: String, initial_size: PhysicalSize<u32>) -> Self {
        Self {
            state,
            title,
            initial_size,
            host: None,
            gpu: None,
            egui_ctx: EguiContext::default(),
            egui_winit: None,
            egui_renderer: None,
            fatal: None,
        }
    }

    /// Window, surface and UI renderer. Any failure here means there is
    /// nothing to draw into.
    fn init_window(&mut self, event_loop: &ActiveEventLoop) -> Result<(), ShellError> {
        let attrs = Window::default_attributes()
            .with_title(self.title.as_str())
            .with_inner_size(self.initial_size);
        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .map_err(|e| ShellError::RenderTargetMissing(format!("window: {e}")))?,
        );

        let size = window.inner_size();
        let gpu = SurfaceRenderer::new(window.clone(), size.width, size.height)
            .map_err(|e| ShellError::RenderTargetMissing(format!("surface: {e}")))?;

        let egui_winit = egui_winit::State::new(
            self.egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(gpu.device(), gpu.format(), None, 1, false);

        self.host = Some(WindowHost::new(window));
        self.gpu = Some(gpu);
        self.egui_winit = Some(egui_winit);
        self.egui_renderer = Some(egui_renderer);
        Ok(())
    }

    /// Draw the debug UI over the scene, then present.
    fn finish_frame(&mut self, frame: PendingFrame) {
        let (Some(host), Some(gpu), Some(egui_winit), Some(egui_renderer)) = (
            &self.host,
            &self.gpu,
            &mut self.egui_winit,
            &mut self.egui_renderer,
        ) else {
            frame.present();
            return;
        };
        let (device, queue) = (gpu.device(), gpu.queue());

        let raw_input = egui_winit.take_egui_input(host.window());
        let state = &mut self.state;
        let full_output = self.egui_ctx.run(raw_input, |ctx| ui::draw(ctx, state));
        egui_winit.handle_platform_output(host.window(), full_output.platform_output);

        let paint_jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);
        let (width, height) = gpu.drawable_size();
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [width, height],
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            egui_renderer.update_texture(device, queue, *id, image_delta);
        }
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("egui_encoder"),
        });
        egui_renderer.update_buffers(device, queue, &mut encoder, &paint_jobs, &screen_descriptor);
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: frame.view(),
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();
            egui_renderer.render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            egui_renderer.free_texture(id);
        }

        frame.present();
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(host), Some(gpu)) = (&self.host, &mut self.gpu) else {
            return;
        };
        let mut scheduler = host.clone();
        let report = match self.state.driver.cycle(
            &self.state.scene,
            &mut self.state.camera,
            gpu,
            &mut scheduler,
        ) {
            Ok(Some(report)) => report,
            Ok(None) => return,
            Err(e) => {
                self.fatal = Some(anyhow::Error::new(e).context("render failed"));
                event_loop.exit();
                return;
            }
        };

        if let Some(frame) = report.output {
            self.finish_frame(frame);
        }
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.host.is_some() {
            return;
        }

        if let Err(e) = self.init_window(event_loop) {
            tracing::error!(error = %e, "startup failed");
            self.fatal = Some(e.into());
            event_loop.exit();
            return;
        }

        let (Some(host), Some(gpu)) = (&self.host, &mut self.gpu) else {
            return;
        };
        self.state.sync_viewport(gpu, host);
        let mut scheduler = host.clone();
        if let Err(e) = self.state.driver.start(&mut scheduler) {
            tracing::warn!(error = %e, "frame loop already running");
        }
        tracing::info!(backend = gpu.backend().to_str(), msaa = gpu.sample_count(), "scene ready");
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        if let (Some(egui_winit), Some(host)) = (&mut self.egui_winit, &self.host) {
            let response = egui_winit.on_window_event(host.window(), &event);
            if response.consumed {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                self.state.driver.stop();
                event_loop.exit();
            }
            // The payload is not trusted; the live size is re-read instead.
            WindowEvent::Resized(_) | WindowEvent::ScaleFactorChanged { .. } => {
                if let (Some(host), Some(gpu)) = (&self.host, &mut self.gpu) {
                    self.state.sync_viewport(gpu, host);
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: key_state,
                        ..
                    },
                ..
            } => {
                self.state.handle_key(key, key_state == ElementState::Pressed);
            }
            WindowEvent::MouseInput { button, state, .. } => {
                self.state
                    .handle_pointer_button(button, state == ElementState::Pressed);
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.state.handle_cursor(position.x, position.y);
            }
            WindowEvent::CursorLeft { .. } => {
                self.state.pointer.left();
            }
            WindowEvent::MouseWheel { delta, .. } => {
                self.state.handle_wheel(delta);
            }
            WindowEvent::RedrawRequested => {
                self.redraw(event_loop);
            }
            _ => {}
        }
    }
}

fn load_config(cli: &Cli) -> Result<SceneConfig> {
    let mut config = match &cli.scene_config {
        Some(path) => SceneConfig::load(path)
            .with_context(|| format!("loading scene config {}", path.display()))?,
        None => SceneConfig::default(),
    };
    if let Some(width) = cli.width {
        config.initial_width = width;
    }
    if let Some(height) = cli.height {
        config.initial_height = height;
    }
    config.validate()?;
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("boxscene-desktop starting");

    let config = load_config(&cli)?;
    let state = AppState::new(&config)?;
    tracing::info!(
        nodes = state.scene.len(),
        box1 = %state.handles.box1,
        box2 = %state.handles.box2,
        "scene assembled"
    );

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let initial_size = PhysicalSize::new(config.initial_width, config.initial_height);
    let mut app = GpuApp::new(state, cli.title, initial_size);
    event_loop.run_app(&mut app)?;

    match app.fatal.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
