//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by pin ID)
//! - No rendering or platform dependencies

pub mod collision;
pub mod frame;
pub mod pin;
pub mod state;
pub mod tick;

pub use collision::{EndTrigger, ball_pin_contact};
pub use frame::{FrameController, FramePhase, FrameResult, RollReport, RollResult};
pub use pin::{Pin, PinId};
pub use state::{Ball, BodyTag, LaneState, Thrower, rack_positions};
pub use tick::{TickInput, tick};
