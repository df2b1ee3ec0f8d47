//! Arena and robot parameters for the exploration simulation.

use serde::{Deserialize, Serialize};

/// Configuration for the exploration world the candidate controllers run in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldConfig {
    /// Arena width in pixels.
    #[serde(default = "default_world_side")]
    pub width: f64,
    /// Arena height in pixels.
    #[serde(default = "default_world_side")]
    pub height: f64,
    /// Control ticks per evaluation.
    #[serde(default = "default_eval_timesteps")]
    pub eval_timesteps: usize,
    /// Side length of the occupancy grid cells used for fitness.
    #[serde(default = "default_grid_cell_size")]
    pub grid_cell_size: f64,
    /// Wheel velocity clamp.
    #[serde(default = "default_max_speed")]
    pub max_speed: f64,
    /// Turn rate clamp in degrees per tick.
    #[serde(default = "default_max_turn_rate")]
    pub max_turn_rate: f64,
    /// Base forward velocity for the avoidance rules.
    #[serde(default = "default_velocity")]
    pub default_velocity: f64,
    /// Base turn velocity for the avoidance rules, degrees per tick.
    #[serde(default = "default_angle_velocity")]
    pub default_angle_velocity: f64,
    /// Differential-drive turn constant.
    #[serde(default = "default_turn_constant")]
    pub turn_constant: f64,
    /// Proximity sensor range as a fraction of arena width.
    #[serde(default = "default_sensor_range_fraction")]
    pub sensor_range_fraction: f64,
    /// Start x; defaults to width / 4.
    #[serde(default)]
    pub start_x: Option<f64>,
    /// Start y; defaults to height / 4.
    #[serde(default)]
    pub start_y: Option<f64>,
    /// Start heading in degrees.
    #[serde(default = "default_start_angle")]
    pub start_angle: f64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: default_world_side(),
            height: default_world_side(),
            eval_timesteps: default_eval_timesteps(),
            grid_cell_size: default_grid_cell_size(),
            max_speed: default_max_speed(),
            max_turn_rate: default_max_turn_rate(),
            default_velocity: default_velocity(),
            default_angle_velocity: default_angle_velocity(),
            turn_constant: default_turn_constant(),
            sensor_range_fraction: default_sensor_range_fraction(),
            start_x: None,
            start_y: None,
            start_angle: default_start_angle(),
        }
    }
}

fn default_world_side() -> f64 {
    500.0
}
fn default_eval_timesteps() -> usize {
    1000
}
fn default_grid_cell_size() -> f64 {
    20.0
}
fn default_max_speed() -> f64 {
    5.0
}
fn default_max_turn_rate() -> f64 {
    5.0
}
fn default_velocity() -> f64 {
    2.0
}
fn default_angle_velocity() -> f64 {
    3.0
}
fn default_turn_constant() -> f64 {
    0.5
}
fn default_sensor_range_fraction() -> f64 {
    0.15
}
fn default_start_angle() -> f64 {
    45.0
}

impl WorldConfig {
    /// Deterministic evaluation start pose `(x, y, heading)`.
    pub fn start_pose(&self) -> (f64, f64, f64) {
        let x = self.start_x.unwrap_or(self.width / 4.0);
        let y = self.start_y.unwrap_or(self.height / 4.0);
        (x, y, self.start_angle)
    }

    /// Proximity sensor range in pixels.
    #[inline]
    pub fn sensor_range(&self) -> f64 {
        self.sensor_range_fraction * self.width
    }

    /// Validate world configuration.
    pub fn validate(&self) -> Result<(), WorldConfigError> {
        if !self.width.is_finite() || !self.height.is_finite() || self.width <= 0.0
            || self.height <= 0.0
        {
            return Err(WorldConfigError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        if !self.grid_cell_size.is_finite() || self.grid_cell_size <= 0.0 {
            return Err(WorldConfigError::InvalidGridCell(self.grid_cell_size));
        }
        if !self.max_speed.is_finite() || self.max_speed <= 0.0 {
            return Err(WorldConfigError::InvalidSpeed(self.max_speed));
        }
        if !self.max_turn_rate.is_finite() || self.max_turn_rate <= 0.0 {
            return Err(WorldConfigError::InvalidSpeed(self.max_turn_rate));
        }
        if !self.sensor_range_fraction.is_finite()
            || self.sensor_range_fraction <= 0.0
            || self.sensor_range_fraction > 1.0
        {
            return Err(WorldConfigError::InvalidSensorRange(
                self.sensor_range_fraction,
            ));
        }
        Ok(())
    }
}

/// World configuration validation errors.
#[derive(Debug, thiserror::Error)]
pub enum WorldConfigError {
    #[error("Arena dimensions ({width} x {height}) must be positive")]
    InvalidDimensions { width: f64, height: f64 },
    #[error("Grid cell size {0} must be positive")]
    InvalidGridCell(f64),
    #[error("Speed limit {0} must be positive")]
    InvalidSpeed(f64),
    #[error("Sensor range fraction {0} must be within (0, 1]")]
    InvalidSensorRange(f64),
}
