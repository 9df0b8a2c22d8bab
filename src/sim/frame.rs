//! Frame/roll controller
//!
//! Owns the roll state machine for a single frame:
//!
//! ```text
//! WaitingForRoll --shot--> BallRolling --ball stopped--> EvaluatingRoll
//!       ^                                                     |
//!       |  pins remain, rolls remain                          | settle delay
//!       +-----------------------------------------------------+
//!                                                             |
//!          restart / next level          all down | no rolls  v
//! WaitingForRoll <---------------------------------- FrameFinished
//! ```
//!
//! Pins are borrowed per call; the level setup owns them. Event handlers whose
//! guard fails return without doing anything.

use serde::{Deserialize, Serialize};

use super::pin::Pin;
use crate::hud::{Hud, PresentationSink};
use crate::settings::LaneSettings;

pub const MSG_PROMPT: &str = "Aim and press SPACE to roll.";
pub const MSG_ROLL_AGAIN: &str = "Roll again!";
pub const MSG_WIN: &str = "All pins down! Level complete.";
pub const MSG_FAIL: &str = "Try again! Not all pins were knocked down.";

/// How a finished frame ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FrameResult {
    /// Every pin knocked down
    Won,
    /// Out of rolls with pins still standing
    Failed,
}

/// Current phase of the frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FramePhase {
    /// Waiting for the player to roll the ball
    WaitingForRoll,
    /// The ball has been thrown and is still moving
    BallRolling,
    /// Ball stopped; pins get counted once the settle delay runs out
    EvaluatingRoll { ticks_remaining: u32 },
    /// Frame over (won or failed) until restart / next level
    FrameFinished(FrameResult),
}

/// What an evaluation decided
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RollResult {
    FrameWon,
    RollAgain,
    FrameFailed,
}

/// Summary of one pin evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RollReport {
    /// Roll that was evaluated (1-based)
    pub roll: u32,
    /// Pins knocked down by this roll
    pub down_now: u32,
    pub pins_standing: u32,
    pub result: RollResult,
}

/// Roll/frame state machine for one lane
#[derive(Debug, Clone)]
pub struct FrameController<S = Hud> {
    phase: FramePhase,
    current_roll: u32,
    shots_per_frame: u32,
    total_pins: u32,
    pins_down_total: u32,
    settle_delay_ticks: u32,
    /// Optional; with no sink attached notifications are skipped
    sink: Option<S>,
}

impl<S: PresentationSink> FrameController<S> {
    /// Create a controller for a lane racked with `total_pins` pins.
    ///
    /// Call [`FrameController::reset_frame`] with the pins before the first roll.
    pub fn new(settings: &LaneSettings, total_pins: u32, sink: Option<S>) -> Self {
        Self {
            phase: FramePhase::WaitingForRoll,
            current_roll: 1,
            shots_per_frame: settings.shots_per_frame.max(1),
            total_pins,
            pins_down_total: 0,
            settle_delay_ticks: settings.settle_delay_ticks(),
            sink,
        }
    }

    pub fn phase(&self) -> FramePhase {
        self.phase
    }

    pub fn current_roll(&self) -> u32 {
        self.current_roll
    }

    pub fn shots_per_frame(&self) -> u32 {
        self.shots_per_frame
    }

    pub fn total_pins(&self) -> u32 {
        self.total_pins
    }

    pub fn pins_down_total(&self) -> u32 {
        self.pins_down_total
    }

    pub fn pins_standing(&self) -> u32 {
        self.total_pins - self.pins_down_total
    }

    pub fn settle_delay_ticks(&self) -> u32 {
        self.settle_delay_ticks
    }

    pub fn sink(&self) -> Option<&S> {
        self.sink.as_ref()
    }

    /// Attach (or replace) the presentation sink and bring it up to date
    pub fn attach_sink(&mut self, sink: S) {
        self.sink = Some(sink);
        self.update_ui();
    }

    pub fn detach_sink(&mut self) -> Option<S> {
        self.sink.take()
    }

    fn notify(&mut self, f: impl FnOnce(&mut S)) {
        if let Some(sink) = self.sink.as_mut() {
            f(sink);
        }
    }

    /// Push pin and roll counters to the sink
    fn update_ui(&mut self) {
        let pins_standing = self.pins_standing();
        let (roll, shots) = (self.current_roll, self.shots_per_frame);
        self.notify(|sink| {
            sink.update_pins(pins_standing);
            sink.update_roll(roll, shots);
        });
    }

    /// True if the player is currently allowed to shoot
    pub fn can_shoot(&self) -> bool {
        self.phase == FramePhase::WaitingForRoll && self.current_roll <= self.shots_per_frame
    }

    /// Ball thrown
    pub fn on_player_shot(&mut self) {
        if !self.can_shoot() {
            log::trace!("Shot ignored in {:?}", self.phase);
            return;
        }

        self.phase = FramePhase::BallRolling;
        log::debug!("Roll {}/{} under way", self.current_roll, self.shots_per_frame);
        self.notify(|sink| sink.clear_message());
    }

    /// Ball reached the end of the lane or stopped moving; start the settle delay
    pub fn on_ball_stopped(&mut self) {
        if self.phase != FramePhase::BallRolling {
            log::trace!("Ball stop ignored in {:?}", self.phase);
            return;
        }

        self.phase = FramePhase::EvaluatingRoll {
            ticks_remaining: self.settle_delay_ticks,
        };
        log::debug!("Ball stopped, counting pins in {} ticks", self.settle_delay_ticks);
    }

    /// Advance the settle delay by one tick; evaluates the pins when it runs out
    pub fn tick(&mut self, pins: &mut [Pin]) -> Option<RollReport> {
        let FramePhase::EvaluatingRoll { ticks_remaining } = &mut self.phase else {
            return None;
        };
        *ticks_remaining = ticks_remaining.saturating_sub(1);
        if *ticks_remaining > 0 {
            return None;
        }
        self.evaluate_pins(pins)
    }

    /// Count newly fallen pins, clear them off the lane and decide the outcome.
    ///
    /// Only runs while evaluating a roll.
    pub fn evaluate_pins(&mut self, pins: &mut [Pin]) -> Option<RollReport> {
        if !matches!(self.phase, FramePhase::EvaluatingRoll { .. }) {
            return None;
        }

        let mut down_now = 0;
        for pin in pins.iter_mut().filter(|p| p.is_down() && !p.removed_this_frame()) {
            pin.remove_from_lane();
            down_now += 1;
        }

        self.pins_down_total = (self.pins_down_total + down_now).min(self.total_pins);
        let pins_standing = self.pins_standing();
        let roll = self.current_roll;

        self.update_ui();

        let result = if pins_standing == 0 {
            self.on_frame_win();
            RollResult::FrameWon
        } else if self.current_roll < self.shots_per_frame {
            // Next roll in the same frame
            self.current_roll += 1;
            self.phase = FramePhase::WaitingForRoll;
            self.notify(|sink| sink.show_message(MSG_ROLL_AGAIN));
            self.update_ui();
            RollResult::RollAgain
        } else {
            self.on_frame_fail();
            RollResult::FrameFailed
        };

        log::info!(
            "Roll {}: {} down, {} standing -> {:?}",
            roll,
            down_now,
            pins_standing,
            result
        );

        Some(RollReport {
            roll,
            down_now,
            pins_standing,
            result,
        })
    }

    fn on_frame_win(&mut self) {
        self.phase = FramePhase::FrameFinished(FrameResult::Won);
        self.notify(|sink| {
            sink.show_message(MSG_WIN);
            sink.show_next_level_button(true);
        });
    }

    fn on_frame_fail(&mut self) {
        self.phase = FramePhase::FrameFinished(FrameResult::Failed);
        self.notify(|sink| {
            sink.show_message(MSG_FAIL);
            sink.show_restart_button(true);
        });
    }

    /// Start the frame over: counters back to roll 1, every pin re-racked,
    /// both HUD buttons hidden.
    ///
    /// Overwrites the phase, so a pending evaluation is dropped.
    pub fn reset_frame(&mut self, pins: &mut [Pin]) {
        self.current_roll = 1;
        self.pins_down_total = 0;

        for pin in pins.iter_mut() {
            pin.reset_pin();
        }

        self.phase = FramePhase::WaitingForRoll;
        self.update_ui();
        self.notify(|sink| {
            sink.show_restart_button(false);
            sink.show_next_level_button(false);
            sink.show_message(MSG_PROMPT);
        });
    }

    /// Replay the level after a failed (or finished) frame
    pub fn restart_level(&mut self, pins: &mut [Pin]) {
        if !matches!(self.phase, FramePhase::FrameFinished(_)) {
            log::trace!("Restart ignored in {:?}", self.phase);
            return;
        }

        self.notify(|sink| sink.show_restart_button(false));
        self.reset_frame(pins);
        log::info!("Level restarted");
    }

    /// Move on after a won frame. There is only one lane, so this re-racks it.
    pub fn load_next_level(&mut self, pins: &mut [Pin]) {
        if !matches!(self.phase, FramePhase::FrameFinished(_)) {
            log::trace!("Next level ignored in {:?}", self.phase);
            return;
        }

        self.notify(|sink| sink.show_next_level_button(false));
        self.reset_frame(pins);
        log::info!("Next level loaded");
    }
}
