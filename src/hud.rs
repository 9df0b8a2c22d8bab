//! Presentation sink
//!
//! The frame controller reports pin/roll counts, status messages and button
//! visibility through [`PresentationSink`]. [`Hud`] is the text implementation
//! used by the native binary and the tests.

use std::fmt;

/// Receiver for frame state updates
pub trait PresentationSink {
    /// Pins still standing on the lane
    fn update_pins(&mut self, pins_standing: u32);
    /// Current roll out of the rolls allowed this frame
    fn update_roll(&mut self, current_roll: u32, shots_per_frame: u32);
    /// Status/instruction message for the player
    fn show_message(&mut self, text: &str);
    fn clear_message(&mut self) {
        self.show_message("");
    }
    fn show_restart_button(&mut self, visible: bool);
    fn show_next_level_button(&mut self, visible: bool);
}

impl<T: PresentationSink + ?Sized> PresentationSink for Box<T> {
    fn update_pins(&mut self, pins_standing: u32) {
        (**self).update_pins(pins_standing);
    }
    fn update_roll(&mut self, current_roll: u32, shots_per_frame: u32) {
        (**self).update_roll(current_roll, shots_per_frame);
    }
    fn show_message(&mut self, text: &str) {
        (**self).show_message(text);
    }
    fn clear_message(&mut self) {
        (**self).clear_message();
    }
    fn show_restart_button(&mut self, visible: bool) {
        (**self).show_restart_button(visible);
    }
    fn show_next_level_button(&mut self, visible: bool) {
        (**self).show_next_level_button(visible);
    }
}

/// HUD buttons and the action each one requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HudAction {
    Restart,
    NextLevel,
}

/// Text HUD: pins counter, roll counter, message line and two buttons
#[derive(Debug, Clone, Default)]
pub struct Hud {
    pins_text: String,
    roll_text: String,
    message: String,
    /// Buttons start hidden
    restart_visible: bool,
    next_level_visible: bool,
}

impl Hud {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pins_text(&self) -> &str {
        &self.pins_text
    }

    pub fn roll_text(&self) -> &str {
        &self.roll_text
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn restart_visible(&self) -> bool {
        self.restart_visible
    }

    pub fn next_level_visible(&self) -> bool {
        self.next_level_visible
    }

    /// Click a button; hidden buttons don't respond
    pub fn click(&self, button: HudAction) -> Option<HudAction> {
        let visible = match button {
            HudAction::Restart => self.restart_visible,
            HudAction::NextLevel => self.next_level_visible,
        };
        visible.then_some(button)
    }
}

impl PresentationSink for Hud {
    fn update_pins(&mut self, pins_standing: u32) {
        self.pins_text = format!("Pins: {}", pins_standing);
    }

    fn update_roll(&mut self, current_roll: u32, shots_per_frame: u32) {
        self.roll_text = format!("Roll: {}/{}", current_roll, shots_per_frame);
    }

    fn show_message(&mut self, text: &str) {
        self.message.clear();
        self.message.push_str(text);
    }

    fn show_restart_button(&mut self, visible: bool) {
        self.restart_visible = visible;
    }

    fn show_next_level_button(&mut self, visible: bool) {
        self.next_level_visible = visible;
    }
}

impl fmt::Display for Hud {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} | {}", self.pins_text, self.roll_text)?;
        if !self.message.is_empty() {
            write!(f, " | {}", self.message)?;
        }
        if self.restart_visible {
            write!(f, " [Restart]")?;
        }
        if self.next_level_visible {
            write!(f, " [Next Level]")?;
        }
        Ok(())
    }
}
