use anyhow::{Context, Result, bail};
use boxscene_input::{OrbitControls, PointerAction};
use boxscene_render::{
    DebugTextRenderer, FixedStepClock, FrameDriver, FrameScheduler, HostSurface, RenderSurface,
    SyncOutcome, ViewportSize, ViewportSync,
};
use boxscene_scene::{SceneConfig, assemble};
use boxscene_tools::{ControlValue, SceneInspector, demo_panel};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "boxscene-cli", about = "Headless runner for the box scene")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Scene config JSON; defaults are used when omitted
    #[arg(long, global = true)]
    scene_config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and scene summary
    Info,
    /// List scene nodes, debug panel controls and one rendered frame
    Describe,
    /// Drive the frame loop against an in-memory surface
    Simulate {
        /// Number of frames to run
        #[arg(short, long, default_value = "3")]
        frames: u64,
        /// Initial host width
        #[arg(long)]
        width: Option<u32>,
        /// Initial host height
        #[arg(long)]
        height: Option<u32>,
        /// Resize the host to WxH halfway through
        #[arg(long, value_parser = parse_size)]
        resize: Option<ViewportSize>,
        /// Hide box 1 through the debug panel before the first frame
        #[arg(long)]
        hide_box1: bool,
        /// Horizontal drag in pixels applied to the orbit controls up front
        #[arg(long, default_value = "0")]
        orbit: f32,
        /// Clock step in seconds
        #[arg(long, default_value = "0.016")]
        step: f32,
        /// Print each frame's description
        #[arg(long)]
        print_frames: bool,
    },
}

fn parse_size(s: &str) -> Result<ViewportSize, String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WxH, got {s:?}"))?;
    let width = w.trim().parse::<u32>().map_err(|e| format!("width: {e}"))?;
    let height = h.trim().parse::<u32>().map_err(|e| format!("height: {e}"))?;
    Ok(ViewportSize::new(width, height))
}

/// Host whose client size the caller sets directly.
#[derive(Debug, Clone, Copy)]
struct FakeHost {
    size: (u32, u32),
}

impl HostSurface for FakeHost {
    fn client_size(&self) -> (u32, u32) {
        self.size
    }
}

/// Drawing buffer that only remembers its size.
#[derive(Debug, Default)]
struct MemorySurface {
    size: (u32, u32),
    resizes: u32,
}

impl RenderSurface for MemorySurface {
    fn set_drawable_size(&mut self, width: u32, height: u32) {
        self.size = (width, height);
        self.resizes += 1;
    }

    fn drawable_size(&self) -> (u32, u32) {
        self.size
    }
}

/// Scheduler that counts requests instead of waiting for a display.
#[derive(Debug, Default)]
struct CountingScheduler {
    requests: u64,
}

impl FrameScheduler for CountingScheduler {
    fn request_frame(&mut self) {
        self.requests += 1;
    }
}

struct SimulateOptions {
    frames: u64,
    resize: Option<ViewportSize>,
    hide_box1: bool,
    orbit: f32,
    step: f32,
    print_frames: bool,
}

#[derive(Debug)]
struct SimulationSummary {
    frames: u64,
    frame_requests: u64,
    viewport: Option<ViewportSize>,
    drawable: (u32, u32),
    aspect: f32,
    syncs: u64,
    last_frame: String,
}

fn load_config(path: Option<&PathBuf>) -> Result<SceneConfig> {
    let config = match path {
        Some(path) => SceneConfig::load(path)
            .with_context(|| format!("loading scene config {}", path.display()))?,
        None => SceneConfig::default(),
    };
    config.validate()?;
    Ok(config)
}

fn simulate(config: &SceneConfig, opts: &SimulateOptions) -> Result<SimulationSummary> {
    let (mut scene, mut camera, handles) = assemble(config);
    let panel = demo_panel(&handles);
    panel.validate(&scene)?;

    if opts.hide_box1 {
        let toggle = panel
            .find("Debug", "Toggle visibility.")
            .context("visibility control missing from the debug panel")?;
        toggle.write(&mut scene, ControlValue::Bool(false))?;
    }

    let mut host = FakeHost {
        size: (config.initial_width, config.initial_height),
    };
    let mut surface = MemorySurface::default();
    let mut scheduler = CountingScheduler::default();
    let mut viewport = ViewportSync::new();

    let mut controls = OrbitControls::from_camera(&camera);
    if let SyncOutcome::Synced(size) = viewport.sync(&mut camera, &mut surface, &host) {
        controls.set_viewport_height(size.height);
    }
    if opts.orbit != 0.0 {
        controls.apply(PointerAction::Rotate { dx: opts.orbit, dy: 0.0 });
    }

    let mut driver = FrameDriver::new(FixedStepClock::new(opts.step), controls);
    let mut renderer = DebugTextRenderer::new();
    driver.start(&mut scheduler)?;

    let resize_at = opts.frames / 2;
    let mut last_frame = String::new();
    for frame in 0..opts.frames {
        if frame == resize_at {
            if let Some(size) = opts.resize {
                host.size = (size.width, size.height);
                tracing::info!(%size, "host resized");
                if let SyncOutcome::Synced(size) = viewport.sync(&mut camera, &mut surface, &host) {
                    driver.controller_mut().set_viewport_height(size.height);
                }
            }
        }

        let Some(report) = driver.cycle(&scene, &mut camera, &mut renderer, &mut scheduler)? else {
            break;
        };
        if opts.print_frames {
            print!("{}", report.output);
        }
        last_frame = report.output;
    }
    driver.stop();

    Ok(SimulationSummary {
        frames: driver.frame_count(),
        frame_requests: scheduler.requests,
        viewport: viewport.size(),
        drawable: surface.drawable_size(),
        aspect: camera.aspect,
        syncs: viewport.sync_count(),
        last_frame,
    })
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let mut config = load_config(cli.scene_config.as_ref())?;

    match cli.command {
        Commands::Info => {
            let (scene, camera, handles) = assemble(&config);
            let panel = demo_panel(&handles);
            println!("boxscene-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("{}", SceneInspector::summary(&scene));
            println!(
                "camera: fov={:.0} near={} far={} distance={:.2}",
                camera.fov_degrees,
                camera.near,
                camera.far,
                camera.distance_to_target()
            );
            println!("panel: {} controls", panel.controls().len());
        }
        Commands::Describe => {
            let (scene, camera, handles) = assemble(&config);
            let panel = demo_panel(&handles);

            println!("{}", SceneInspector::summary(&scene));
            for info in SceneInspector::list_nodes(&scene) {
                println!("  {info}");
            }

            println!("Panel \"{}\":", panel.title());
            for (path, control) in panel.controls() {
                let value = control.read(&scene)?;
                let range = match control.bounds() {
                    Some(b) => format!(" min={:?} max={:?} step={:?}", b.min, b.max, b.step),
                    None => String::new(),
                };
                println!("  {path} / {}: {value:?}{range}", control.label);
            }

            let mut renderer = DebugTextRenderer::new();
            let Ok(frame) = boxscene_render::Renderer::render(&mut renderer, &scene, &camera);
            print!("{frame}");
        }
        Commands::Simulate {
            frames,
            width,
            height,
            resize,
            hide_box1,
            orbit,
            step,
            print_frames,
        } => {
            if let Some(width) = width {
                config.initial_width = width;
            }
            if let Some(height) = height {
                config.initial_height = height;
            }
            if frames == 0 {
                bail!("--frames must be at least 1");
            }

            let summary = simulate(
                &config,
                &SimulateOptions {
                    frames,
                    resize,
                    hide_box1,
                    orbit,
                    step,
                    print_frames,
                },
            )?;

            if !print_frames {
                print!("{}", summary.last_frame);
            }
            println!(
                "frames={} requests={} syncs={} viewport={} drawable={}x{} aspect={:.4}",
                summary.frames,
                summary.frame_requests,
                summary.syncs,
                summary
                    .viewport
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "none".into()),
                summary.drawable.0,
                summary.drawable.1,
                summary.aspect,
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts(frames: u64) -> SimulateOptions {
        SimulateOptions {
            frames,
            resize: None,
            hide_box1: false,
            orbit: 0.0,
            step: 0.016,
            print_frames: false,
        }
    }

    #[test]
    fn parse_size_accepts_wxh() {
        assert_eq!(parse_size("400x300").unwrap(), ViewportSize::new(400, 300));
        assert_eq!(parse_size("1280X720").unwrap(), ViewportSize::new(1280, 720));
        assert!(parse_size("400").is_err());
        assert!(parse_size("ax300").is_err());
    }

    #[test]
    fn simulate_runs_requested_frames() {
        let summary = simulate(&SceneConfig::default(), &opts(5)).unwrap();
        assert_eq!(summary.frames, 5);
        // start + one per completed frame
        assert_eq!(summary.frame_requests, 6);
        assert_eq!(summary.drawable, (800, 600));
        assert_eq!(summary.syncs, 1);
        assert!((summary.aspect - 800.0 / 600.0).abs() < 1e-6);
        assert!(summary.last_frame.contains("Frame 5"));
    }

    #[test]
    fn simulate_resize_updates_aspect() {
        let mut o = opts(4);
        o.resize = Some(ViewportSize::new(400, 300));
        let summary = simulate(&SceneConfig::default(), &o).unwrap();
        assert_eq!(summary.viewport, Some(ViewportSize::new(400, 300)));
        assert_eq!(summary.drawable, (400, 300));
        assert_eq!(summary.syncs, 2);
        assert!((summary.aspect - 4.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn simulate_zero_resize_keeps_previous_size() {
        let mut o = opts(2);
        o.resize = Some(ViewportSize::new(0, 300));
        let summary = simulate(&SceneConfig::default(), &o).unwrap();
        assert_eq!(summary.drawable, (800, 600));
        assert_eq!(summary.syncs, 1);
    }

    #[test]
    fn simulate_hide_box1_drops_it_from_frames() {
        let mut o = opts(1);
        o.hide_box1 = true;
        let summary = simulate(&SceneConfig::default(), &o).unwrap();
        assert!(summary.last_frame.contains("drawn=3"));
        assert!(!summary.last_frame.contains("\"Box 1\""));
    }
}
