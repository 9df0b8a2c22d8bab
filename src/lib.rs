//! Lane Bowl - A single-lane bowling mini-game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (pins, ball, frame/roll controller, tick loop)
//! - `hud`: Presentation sink contract and a text HUD
//! - `settings`: Data-driven lane configuration

pub mod hud;
pub mod settings;
pub mod sim;

pub use hud::{Hud, HudAction, PresentationSink};
pub use settings::LaneSettings;

use glam::Vec3;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz for smooth physics)
    pub const SIM_DT: f32 = 1.0 / 120.0;

    /// Wait after the ball stops before pins are counted (seconds).
    ///
    /// Carried over from the first playable build; pins normally come to rest
    /// within 1-2 seconds, so this is likely a placeholder. Override it through
    /// `LaneSettings::settle_delay_secs` rather than editing it here.
    pub const SETTLE_DELAY_SECS: f32 = 10.0;

    /// Frame defaults
    pub const DEFAULT_SHOTS_PER_FRAME: u32 = 2;
    pub const DEFAULT_PIN_COUNT: u32 = 10;
    /// Tilt (degrees away from the racked "up") at which a pin counts as down
    pub const FALL_ANGLE_THRESHOLD_DEG: f32 = 15.0;

    /// Lane geometry (lane units, +Z runs from the foul line to the pit)
    pub const HEAD_PIN_Z: f32 = 20.0;
    pub const PIN_SPACING: f32 = 1.0;
    pub const PIN_RADIUS: f32 = 0.25;
    pub const PIN_HEIGHT: f32 = 1.5;
    /// End-of-lane sensor plane, past the back row
    pub const LANE_END_Z: f32 = 26.0;

    /// Ball defaults
    pub const BALL_RADIUS: f32 = 0.45;
    pub const THROW_FORCE: f32 = 20.0;
    pub const MAX_HORIZONTAL_OFFSET: f32 = 2.0;
    /// Rolling friction (fraction of speed lost per second)
    pub const BALL_ROLL_FRICTION: f32 = 0.05;
    /// Speed kept after plowing through a pin (multiplicative)
    pub const BALL_HIT_DAMPING: f32 = 0.92;
    /// Below this speed the ball is considered stopped on the lane
    pub const BALL_STALL_SPEED: f32 = 0.5;

    /// Pin toppling
    pub const PIN_TOPPLE_SPIN: f32 = 8.0; // rad/s
    pub const PIN_PUSH_FACTOR: f32 = 0.3;
    pub const PIN_LINEAR_DAMPING: f32 = 0.96;
    /// Chance that a falling pin takes a standing neighbour with it
    pub const NEIGHBOUR_TOPPLE_CHANCE: f64 = 0.35;
}

/// Angle in degrees between two directions
#[inline]
pub fn tilt_degrees(from: Vec3, to: Vec3) -> f32 {
    from.angle_between(to).to_degrees()
}
