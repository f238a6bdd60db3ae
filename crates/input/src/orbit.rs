use crate::action::PointerAction;
use boxscene_render::CameraController;
use boxscene_scene::PerspectiveCamera;
use glam::Vec3;
use std::f32::consts::{PI, TAU};

/// Below this the current state snaps to the goal.
const SETTLE_EPSILON: f32 = 1e-5;

/// Smaller changes are not reported as camera motion.
const MOVE_EPSILON: f32 = 1e-6;

/// Damping factors are tuned per 1/60 s frame.
const REFERENCE_FPS: f32 = 60.0;

/// Spherical coordinates around a target, Y up.
///
/// `phi` is the polar angle from +Y, `theta` the azimuth from +Z towards +X.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spherical {
    pub radius: f32,
    pub phi: f32,
    pub theta: f32,
}

impl Spherical {
    pub fn from_offset(offset: Vec3) -> Self {
        let radius = offset.length();
        if radius == 0.0 {
            return Self {
                radius,
                phi: 0.0,
                theta: 0.0,
            };
        }
        Self {
            radius,
            phi: (offset.y / radius).clamp(-1.0, 1.0).acos(),
            theta: offset.x.atan2(offset.z),
        }
    }

    pub fn to_offset(&self) -> Vec3 {
        let sin_phi = self.phi.sin();
        Vec3::new(
            self.radius * sin_phi * self.theta.sin(),
            self.radius * self.phi.cos(),
            self.radius * sin_phi * self.theta.cos(),
        )
    }

    fn lerp(&self, other: &Self, t: f32) -> Self {
        Self {
            radius: self.radius + (other.radius - self.radius) * t,
            phi: self.phi + (other.phi - self.phi) * t,
            theta: self.theta + (other.theta - self.theta) * t,
        }
    }

    fn settled(&self, other: &Self) -> bool {
        (self.radius - other.radius).abs() < SETTLE_EPSILON
            && (self.phi - other.phi).abs() < SETTLE_EPSILON
            && (self.theta - other.theta).abs() < SETTLE_EPSILON
    }
}

/// Damped orbit controller.
///
/// Input moves a goal state (`*_end`); each [`update`] closes a fraction
/// `1 - exp(-factor * delta * 60)` of the remaining gap, so motion eases out
/// at the same rate regardless of frame rate. While a pointer button is held
/// the stiffer `dragging_damping_factor` applies.
///
/// [`update`]: CameraController::update
#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub enabled: bool,
    pub damping_factor: f32,
    pub dragging_damping_factor: f32,
    pub azimuth_rotate_speed: f32,
    pub polar_rotate_speed: f32,
    pub dolly_speed: f32,
    pub truck_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub min_polar_angle: f32,
    pub max_polar_angle: f32,
    spherical: Spherical,
    spherical_end: Spherical,
    target: Vec3,
    target_end: Vec3,
    dragging: bool,
    viewport_height: f32,
    fov_degrees: f32,
}

impl OrbitControls {
    /// Controls orbiting `camera.target` from the camera's current position.
    pub fn from_camera(camera: &PerspectiveCamera) -> Self {
        let spherical = Spherical::from_offset(camera.position - camera.target);
        Self {
            enabled: true,
            damping_factor: 0.05,
            dragging_damping_factor: 0.25,
            azimuth_rotate_speed: 1.0,
            polar_rotate_speed: 1.0,
            dolly_speed: 1.0,
            truck_speed: 2.0,
            min_distance: f32::EPSILON,
            max_distance: f32::INFINITY,
            min_polar_angle: 0.0,
            max_polar_angle: PI,
            spherical,
            spherical_end: spherical,
            target: camera.target,
            target_end: camera.target,
            dragging: false,
            viewport_height: 1.0,
            fov_degrees: camera.fov_degrees,
        }
    }

    /// Height of the element receiving pointer input; pixel deltas are
    /// relative to it. Zero is ignored.
    pub fn set_viewport_height(&mut self, height: u32) {
        if height > 0 {
            self.viewport_height = height as f32;
            tracing::debug!(height, "orbit viewport height");
        }
    }

    pub fn set_dragging(&mut self, dragging: bool) {
        self.dragging = dragging;
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn distance(&self) -> f32 {
        self.spherical.radius
    }

    /// Goal distance the camera is easing towards.
    pub fn goal_distance(&self) -> f32 {
        self.spherical_end.radius
    }

    /// True when the current state has reached the goal.
    pub fn is_settled(&self) -> bool {
        self.spherical.settled(&self.spherical_end) && self.target.distance(self.target_end) < SETTLE_EPSILON
    }

    /// Orbit the goal by the given angles in radians.
    pub fn rotate(&mut self, azimuth: f32, polar: f32) {
        self.spherical_end.theta += azimuth;
        self.spherical_end.phi = self.clamp_polar(self.spherical_end.phi + polar);
    }

    /// Scale the goal distance: positive steps move closer.
    pub fn dolly(&mut self, steps: f32) {
        let scale = 0.95_f32.powf(steps * self.dolly_speed);
        self.spherical_end.radius = (self.spherical_end.radius * scale).clamp(self.min_distance, self.max_distance);
    }

    /// Shift the goal target in the view plane by world units.
    pub fn truck(&mut self, x: f32, y: f32) {
        let forward = (-self.spherical_end.to_offset()).normalize_or(Vec3::NEG_Z);
        let right = forward.cross(Vec3::Y).normalize_or(Vec3::X);
        let up = right.cross(forward);
        self.target_end += right * x + up * y;
    }

    /// Jump straight to a new pose without easing.
    pub fn set_look_at(&mut self, position: Vec3, target: Vec3) {
        let mut spherical = Spherical::from_offset(position - target);
        spherical.phi = self.clamp_polar(spherical.phi);
        spherical.radius = spherical.radius.clamp(self.min_distance, self.max_distance);
        self.spherical = spherical;
        self.spherical_end = spherical;
        self.target = target;
        self.target_end = target;
        tracing::debug!(?position, ?target, "orbit pose set");
    }

    /// Feed one pointer gesture. Ignored while disabled.
    pub fn apply(&mut self, action: PointerAction) {
        if !self.enabled {
            return;
        }
        tracing::trace!(?action, "orbit input");
        match action {
            PointerAction::Rotate { dx, dy } => {
                let azimuth = TAU * self.azimuth_rotate_speed * dx / self.viewport_height;
                let polar = TAU * self.polar_rotate_speed * dy / self.viewport_height;
                self.rotate(-azimuth, -polar);
            }
            PointerAction::Truck { dx, dy } => {
                let half_fov = (self.fov_degrees * 0.5).to_radians();
                let world_per_pixel = self.spherical_end.radius * half_fov.tan() / self.viewport_height;
                self.truck(
                    -self.truck_speed * dx * world_per_pixel,
                    self.truck_speed * dy * world_per_pixel,
                );
            }
            PointerAction::Dolly(steps) => self.dolly(steps),
        }
    }

    fn clamp_polar(&self, phi: f32) -> f32 {
        // Keep clear of the poles where the view basis degenerates.
        let min = self.min_polar_angle.max(SETTLE_EPSILON);
        let max = self.max_polar_angle.min(PI - SETTLE_EPSILON);
        phi.clamp(min, max)
    }
}

impl CameraController for OrbitControls {
    fn update(&mut self, camera: &mut PerspectiveCamera, delta: f32) -> bool {
        self.fov_degrees = camera.fov_degrees;

        let factor = if self.dragging {
            self.dragging_damping_factor
        } else {
            self.damping_factor
        };
        let t = 1.0 - (-factor * delta.max(0.0) * REFERENCE_FPS).exp();

        self.spherical = self.spherical.lerp(&self.spherical_end, t);
        self.target = self.target.lerp(self.target_end, t);
        if self.is_settled() {
            self.spherical = self.spherical_end;
            self.target = self.target_end;
        }

        let position = self.target + self.spherical.to_offset();
        let moved = position.distance(camera.position) > MOVE_EPSILON
            || self.target.distance(camera.target) > MOVE_EPSILON;
        camera.position = position;
        camera.target = self.target;
        moved
    }
}
