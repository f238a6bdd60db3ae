use crate::clock::Clock;
use crate::error::FrameError;
use crate::renderer::Renderer;
use boxscene_scene::{PerspectiveCamera, Scene};

/// Asks the host to run another frame at its next refresh opportunity.
pub trait FrameScheduler {
    fn request_frame(&mut self);
}

/// Moves the camera from accumulated input and elapsed time.
pub trait CameraController {
    /// Advance by `delta` seconds. Returns true if the camera changed.
    fn update(&mut self, camera: &mut PerspectiveCamera, delta: f32) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameState {
    Idle,
    Running,
}

/// Result of one frame cycle.
#[derive(Debug, Clone)]
pub struct FrameReport<O> {
    /// 1-based index of this frame since the driver was created.
    pub frame: u64,
    pub delta: f32,
    pub camera_moved: bool,
    pub output: O,
}

/// Owns the update/render loop.
///
/// The host calls [`FrameDriver::cycle`] whenever it honours a frame request.
/// Each cycle reads the clock, updates the camera controller, renders, then
/// requests the next frame, in that order. A render error ends the loop: the
/// next frame is not requested and the error is returned to the host.
#[derive(Debug)]
pub struct FrameDriver<C, K> {
    clock: C,
    controller: K,
    state: FrameState,
    frame: u64,
}

impl<C: Clock, K: CameraController> FrameDriver<C, K> {
    pub fn new(clock: C, controller: K) -> Self {
        Self {
            clock,
            controller,
            state: FrameState::Idle,
            frame: 0,
        }
    }

    pub fn state(&self) -> FrameState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == FrameState::Running
    }

    /// Frames completed so far.
    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    pub fn controller(&self) -> &K {
        &self.controller
    }

    /// Input handlers feed the controller through this between frames.
    pub fn controller_mut(&mut self) -> &mut K {
        &mut self.controller
    }

    /// Idle -> Running, and request the first frame.
    pub fn start(&mut self, scheduler: &mut impl FrameScheduler) -> Result<(), FrameError> {
        if self.state == FrameState::Running {
            return Err(FrameError::AlreadyRunning);
        }
        self.state = FrameState::Running;
        tracing::debug!("frame driver started");
        scheduler.request_frame();
        Ok(())
    }

    /// Running -> Idle. Returns false if the driver was already idle.
    pub fn stop(&mut self) -> bool {
        let was_running = self.is_running();
        self.state = FrameState::Idle;
        if was_running {
            tracing::debug!(frames = self.frame, "frame driver stopped");
        }
        was_running
    }

    /// Run one update/render cycle. Returns `Ok(None)` while idle.
    pub fn cycle<R: Renderer>(
        &mut self,
        scene: &Scene,
        camera: &mut PerspectiveCamera,
        renderer: &mut R,
        scheduler: &mut impl FrameScheduler,
    ) -> Result<Option<FrameReport<R::Output>>, R::Error> {
        if self.state != FrameState::Running {
            return Ok(None);
        }

        let delta = self.clock.delta();
        let camera_moved = self.controller.update(camera, delta);
        let output = match renderer.render(scene, camera) {
            Ok(output) => output,
            Err(e) => {
                self.state = FrameState::Idle;
                tracing::error!(frame = self.frame + 1, "render failed, frame loop halted");
                return Err(e);
            }
        };
        self.frame += 1;
        scheduler.request_frame();

        tracing::trace!(frame = self.frame, delta, camera_moved, "frame");
        Ok(Some(FrameReport {
            frame: self.frame,
            delta,
            camera_moved,
            output,
        }))
    }
}
