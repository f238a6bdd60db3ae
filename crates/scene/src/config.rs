use boxscene_common::Color;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Errors from loading or validating a [`SceneConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config: {field} {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

/// Static parameters of the demo scene.
///
/// Every field has a default, so a config file only needs the values it
/// changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Size assumed before the first viewport sync.
    pub initial_width: u32,
    pub initial_height: u32,
    pub box_size: f32,
    pub box1_color: Color,
    pub box2_color: Color,
    /// Offset of the second box along +X.
    pub box2_offset_x: f32,
    pub camera_fov_degrees: f32,
    /// Camera distance from the origin along +Z.
    pub camera_distance: f32,
    pub camera_near: f32,
    pub camera_far: f32,
    pub axes_size: f32,
    pub grid_size: f32,
    pub grid_divisions: u32,
    pub light_color: Color,
    pub light_intensity: f32,
    pub sky_color: Color,
    pub ground_color: Color,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            initial_width: 800,
            initial_height: 600,
            box_size: 0.5,
            box1_color: Color::from_hex(0xffa500),
            box2_color: Color::from_hex(0x0000ff),
            box2_offset_x: 1.5,
            camera_fov_degrees: 75.0,
            camera_distance: 3.0,
            camera_near: 0.1,
            camera_far: 2000.0,
            axes_size: 1.0,
            grid_size: 10.0,
            grid_divisions: 10,
            light_color: Color::from_hex(0xffffff),
            light_intensity: 1.0,
            sky_color: Color::from_hex(0xb1e1ff),
            ground_color: Color::from_hex(0xb97a20),
        }
    }
}

impl SceneConfig {
    /// Parse from JSON and validate.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_json(&data)?;
        tracing::info!("scene config loaded from {}", path.as_ref().display());
        Ok(config)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        serde_json::to_writer_pretty(std::fs::File::create(path)?, self)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field, reason| Err(ConfigError::Invalid { field, reason });
        if !(self.box_size > 0.0) {
            return invalid("box_size", "must be positive");
        }
        if !(self.camera_fov_degrees > 0.0 && self.camera_fov_degrees < 180.0) {
            return invalid("camera_fov_degrees", "must be within (0, 180)");
        }
        if !(self.camera_distance > 0.0) {
            return invalid("camera_distance", "must be positive");
        }
        if !(self.camera_near > 0.0) {
            return invalid("camera_near", "must be positive");
        }
        if !(self.camera_far > self.camera_near) {
            return invalid("camera_far", "must exceed camera_near");
        }
        if self.grid_divisions == 0 {
            return invalid("grid_divisions", "must be at least 1");
        }
        Ok(())
    }

    /// Aspect ratio used before the first viewport sync. Zero height is
    /// treated as one pixel.
    pub fn initial_aspect(&self) -> f32 {
        self.initial_width as f32 / self.initial_height.max(1) as f32
    }
}
