//! Lane settings
//!
//! Loaded from a JSON file next to the binary; anything missing or broken
//! falls back to the built-in defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Per-level lane configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaneSettings {
    // === Frame ===
    /// Pins racked at level load
    pub pin_count: u32,
    /// Rolls the player gets per frame
    pub shots_per_frame: u32,
    /// Wait after the ball stops before counting pins (seconds)
    pub settle_delay_secs: f32,

    // === Pins ===
    /// Degrees of tilt from upright before a pin counts as down
    pub fall_angle_threshold_deg: f32,

    // === Throw ===
    /// Launch impulse (unit-mass ball, so also the launch speed)
    pub throw_force: f32,
    /// Follow the pointer to move the spawn point left/right
    pub aim_with_mouse: bool,
    /// Maximum left/right spawn offset when aiming
    pub max_horizontal_offset: f32,
}

impl Default for LaneSettings {
    fn default() -> Self {
        Self {
            pin_count: DEFAULT_PIN_COUNT,
            shots_per_frame: DEFAULT_SHOTS_PER_FRAME,
            settle_delay_secs: SETTLE_DELAY_SECS,

            fall_angle_threshold_deg: FALL_ANGLE_THRESHOLD_DEG,

            throw_force: THROW_FORCE,
            aim_with_mouse: true,
            max_horizontal_offset: MAX_HORIZONTAL_OFFSET,
        }
    }
}

impl LaneSettings {
    /// Parse settings from JSON (missing fields use defaults)
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let settings: Self = serde_json::from_str(json)?;
        Ok(settings.sanitized())
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Clamp values into ranges the controller can work with
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();

        self.pin_count = self.pin_count.max(1);
        self.shots_per_frame = self.shots_per_frame.max(1);
        if !self.settle_delay_secs.is_finite() || self.settle_delay_secs < 0.0 {
            self.settle_delay_secs = defaults.settle_delay_secs;
        }
        if !(self.fall_angle_threshold_deg > 0.0 && self.fall_angle_threshold_deg < 180.0) {
            self.fall_angle_threshold_deg = defaults.fall_angle_threshold_deg;
        }
        if !self.throw_force.is_finite() || self.throw_force <= 0.0 {
            self.throw_force = defaults.throw_force;
        }
        if !self.max_horizontal_offset.is_finite() || self.max_horizontal_offset < 0.0 {
            self.max_horizontal_offset = defaults.max_horizontal_offset;
        }
        self
    }

    /// Settle delay expressed in simulation ticks
    pub fn settle_delay_ticks(&self) -> u32 {
        (self.settle_delay_secs.max(0.0) / SIM_DT).round() as u32
    }

    /// Load settings from a JSON file, falling back to defaults
    pub fn load_from(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(settings) => {
                    log::info!("Loaded lane settings from {}", path.display());
                    settings
                }
                Err(e) => {
                    log::warn!("Invalid lane settings in {}: {} - using defaults", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("Could not read {}: {} - using defaults", path.display(), e);
                Self::default()
            }
        }
    }
}
