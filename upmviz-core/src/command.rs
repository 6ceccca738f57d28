//! User-facing control surface.
//!
//! Every button, navigator dot and keyboard shortcut is translated into a
//! [`Command`] and handed to the playback controller.

use serde::{Deserialize, Serialize};

/// A single playback control action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Play,
    Pause,
    Toggle,
    Reset,
    StepNext,
    StepPrev,
    /// Navigator jump to a scene by index
    JumpTo(usize),
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Play => f.write_str("play"),
            Self::Pause => f.write_str("pause"),
            Self::Toggle => f.write_str("toggle"),
            Self::Reset => f.write_str("reset"),
            Self::StepNext => f.write_str("step_next"),
            Self::StepPrev => f.write_str("step_prev"),
            Self::JumpTo(index) => write!(f, "jump_to({index})"),
        }
    }
}

/// Keyboard shortcuts, keyed by the DOM `KeyboardEvent.key` value.
///
/// Matching ignores ASCII case so `"r"` also fires on `Shift+R`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyBindings {
    #[serde(default = "default_toggle_key")]
    pub toggle: String,
    #[serde(default = "default_previous_key")]
    pub previous: String,
    #[serde(default = "default_next_key")]
    pub next: String,
    #[serde(default = "default_reset_key")]
    pub reset: String,
    /// Jump back to the first scene
    #[serde(default = "default_first_key")]
    pub first: String,
}

pub(crate) const DEFAULT_TOGGLE_KEY: &str = " ";
pub(crate) const DEFAULT_PREVIOUS_KEY: &str = "ArrowLeft";
pub(crate) const DEFAULT_NEXT_KEY: &str = "ArrowRight";
pub(crate) const DEFAULT_RESET_KEY: &str = "r";
pub(crate) const DEFAULT_FIRST_KEY: &str = "Home";

fn default_toggle_key() -> String {
    DEFAULT_TOGGLE_KEY.to_string()
}

fn default_previous_key() -> String {
    DEFAULT_PREVIOUS_KEY.to_string()
}

fn default_next_key() -> String {
    DEFAULT_NEXT_KEY.to_string()
}

fn default_reset_key() -> String {
    DEFAULT_RESET_KEY.to_string()
}

fn default_first_key() -> String {
    DEFAULT_FIRST_KEY.to_string()
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            toggle: default_toggle_key(),
            previous: default_previous_key(),
            next: default_next_key(),
            reset: default_reset_key(),
            first: default_first_key(),
        }
    }
}

impl KeyBindings {
    /// Map a pressed key to a command, if it is bound.
    #[must_use]
    pub fn resolve(&self, key: &str) -> Option<Command> {
        let matches = |binding: &str| !binding.is_empty() && binding.eq_ignore_ascii_case(key);

        if matches(&self.toggle) {
            Some(Command::Toggle)
        } else if matches(&self.previous) {
            Some(Command::StepPrev)
        } else if matches(&self.next) {
            Some(Command::StepNext)
        } else if matches(&self.reset) {
            Some(Command::Reset)
        } else if matches(&self.first) {
            Some(Command::JumpTo(0))
        } else {
            None
        }
    }
}
