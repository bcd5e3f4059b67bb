//! Twin configuration parameters
//!
//! All tunable constants for the greenhouse twin: growth-stage thresholds,
//! motion speeds, display timeouts and registry capacity.
//! Values can be overridden from a JSON file (see
//! [`JsonConfigFile`](crate::adapters::config_file::JsonConfigFile)).

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::control::pose::Vec3;
use crate::error::ConfigError;

/// Upper bound on the plant registry size (fixed-capacity storage).
/// Power of two, required by the registry's index map.
pub const MAX_PLANTS: usize = 128;

/// Core twin configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TwinConfig {
    // --- Growth stages ---
    /// Plants younger than this are seedlings (days)
    pub seedling_age_days: u32,
    /// Plants younger than this (and not seedlings) are mature (days)
    pub mature_age_days: u32,
    /// Plants younger than this (and not mature) are fruiting; older are ripe (days)
    pub fruit_age_days: u32,

    // --- Registry ---
    /// Highest plant id accepted from the feed
    pub plant_capacity: u16,

    // --- Motion ---
    /// Robot travel progress per second (1.0 = whole trip in one second)
    pub move_speed: f32,
    /// Arm rotation progress per second
    pub rotation_speed: f32,

    // --- Timing ---
    /// How long the action indicator stays up after arrival (seconds)
    pub action_display_secs: f32,
    /// Delay before plant visuals follow a freshly accepted command (seconds)
    pub plant_refresh_delay_secs: f32,
    /// Host tick loop period (milliseconds)
    pub tick_interval_ms: u32,

    // --- Geometry ---
    /// Robot position at startup
    pub robot_home: Vec3,
    /// Arm base position relative to the robot origin
    pub arm_mount_offset: Vec3,
}

impl Default for TwinConfig {
    fn default() -> Self {
        Self {
            // Growth stages
            seedling_age_days: 4 * 7,
            mature_age_days: 10 * 7,
            fruit_age_days: 15 * 7,

            // Registry
            plant_capacity: 100,

            // Motion
            move_speed: 0.4,
            rotation_speed: 1.0,

            // Timing
            action_display_secs: 10.0,
            plant_refresh_delay_secs: 5.0,
            tick_interval_ms: 50, // 20 Hz

            // Geometry
            robot_home: Vec3::ZERO,
            arm_mount_offset: Vec3::new(0.0, 0.6, 0.0),
        }
    }
}

impl TwinConfig {
    /// Range-check every field. Rejects rather than clamps.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.seedling_age_days == 0 {
            return Err(ConfigError::ValidationFailed("seedling_age_days must be > 0"));
        }
        if self.seedling_age_days >= self.mature_age_days
            || self.mature_age_days >= self.fruit_age_days
        {
            return Err(ConfigError::ValidationFailed(
                "stage thresholds must be strictly ascending",
            ));
        }
        if self.plant_capacity == 0 || self.plant_capacity as usize > MAX_PLANTS {
            return Err(ConfigError::ValidationFailed(
                "plant_capacity must be within 1..=128",
            ));
        }
        if !(self.move_speed.is_finite() && self.move_speed > 0.0) {
            return Err(ConfigError::ValidationFailed("move_speed must be positive"));
        }
        if !(self.rotation_speed.is_finite() && self.rotation_speed > 0.0) {
            return Err(ConfigError::ValidationFailed("rotation_speed must be positive"));
        }
        if !(self.action_display_secs.is_finite() && self.action_display_secs >= 0.0) {
            return Err(ConfigError::ValidationFailed(
                "action_display_secs must be non-negative",
            ));
        }
        if !(self.plant_refresh_delay_secs.is_finite() && self.plant_refresh_delay_secs >= 0.0) {
            return Err(ConfigError::ValidationFailed(
                "plant_refresh_delay_secs must be non-negative",
            ));
        }
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::ValidationFailed("tick_interval_ms must be > 0"));
        }
        if !(self.robot_home.is_finite() && self.arm_mount_offset.is_finite()) {
            return Err(ConfigError::ValidationFailed("geometry must be finite"));
        }
        Ok(())
    }

    pub fn seedling_bound(&self) -> Duration {
        Duration::days(i64::from(self.seedling_age_days))
    }

    pub fn mature_bound(&self) -> Duration {
        Duration::days(i64::from(self.mature_age_days))
    }

    pub fn fruit_bound(&self) -> Duration {
        Duration::days(i64::from(self.fruit_age_days))
    }

    /// Seconds per host tick.
    pub fn tick_secs(&self) -> f32 {
        self.tick_interval_ms as f32 / 1000.0
    }
}
