//! Header banner and action button state.

use derive_getters::Getters;

/// Styling of the header banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum::Display)]
pub enum Tone {
    /// Initial header, no message.
    #[default]
    Neutral,
    /// Informational message (turn prompts, results).
    Message,
    /// Something went wrong.
    Error,
}

/// Text shown in the header region.
#[derive(Debug, Clone, Default, PartialEq, Eq, Getters)]
pub struct Banner {
    text: String,
    tone: Tone,
}

impl Banner {
    /// The reset header.
    pub fn neutral() -> Self {
        Self::default()
    }

    /// An informational message.
    pub fn message(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tone: Tone::Message,
        }
    }

    /// An error message.
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tone: Tone::Error,
        }
    }
}

/// What the action button does when pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum ActionLabel {
    /// Ask the server for a new game.
    #[strum(serialize = "Create game")]
    CreateGame,
    /// Give up the current game.
    #[strum(serialize = "Surrender")]
    Surrender,
    /// Go back to the lobby after a game ended.
    #[strum(serialize = "New game")]
    NewGame,
}

/// The single action control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Getters)]
pub struct ActionButton {
    label: ActionLabel,
    enabled: bool,
}

impl ActionButton {
    /// An enabled button with the given label.
    pub fn new(label: ActionLabel) -> Self {
        Self {
            label,
            enabled: true,
        }
    }

    /// Changes the label; relabeling always re-enables.
    pub fn relabel(&mut self, label: ActionLabel) {
        self.label = label;
        self.enabled = true;
    }

    /// Disables the button until the next relabel or enable.
    pub fn disable(&mut self) {
        self.enabled = false;
    }
}

impl Default for ActionButton {
    fn default() -> Self {
        Self::new(ActionLabel::CreateGame)
    }
}
