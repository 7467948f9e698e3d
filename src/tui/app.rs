//! View-side state that the game machine does not own.

use strictly_xo::{GameMachine, UserAction};
use tracing::debug;

use super::input::{BoardCursor, Intent, move_selection};

/// What the loop should do after a key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Nothing to send, just redraw.
    Redraw,
    /// Forward an action to the driver.
    Act(UserAction),
    /// Leave the client.
    Quit,
}

/// Cursor, lobby selection and the last local notice.
#[derive(Debug, Default)]
pub struct App {
    cursor: BoardCursor,
    selected: usize,
    notice: Option<String>,
}

impl App {
    /// Creates the initial view state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Board cursor.
    pub fn cursor(&self) -> BoardCursor {
        self.cursor
    }

    /// Highlighted row of the lobby list.
    pub fn selected(&self) -> usize {
        self.selected
    }

    /// Why the last key press did nothing, if it was refused.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Records a refused action for the footer.
    pub fn set_notice(&mut self, notice: String) {
        self.notice = Some(notice);
    }

    /// Keeps the lobby selection inside the list as it changes.
    pub fn sync(&mut self, machine: &GameMachine) {
        let len = machine.lobby().len();
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
    }

    /// Turns an intent into a step against the current machine state.
    pub fn on_intent(&mut self, intent: Intent, machine: &GameMachine) -> Step {
        self.notice = None;
        let on_board = machine.battlefield().is_some();
        let step = match intent {
            Intent::Quit => Step::Quit,
            Intent::Move(direction) if on_board => {
                self.cursor = self.cursor.moved(direction);
                Step::Redraw
            }
            Intent::Move(direction) => {
                self.selected = move_selection(self.selected, machine.lobby().len(), direction);
                Step::Redraw
            }
            Intent::Select if on_board => match self.cursor.index() {
                Some(index) => Step::Act(UserAction::ClaimCell { index }),
                None => Step::Redraw,
            },
            Intent::Select => match machine.lobby().entries().get(self.selected) {
                Some(entry) => Step::Act(UserAction::JoinGame {
                    game_id: entry.id().clone(),
                }),
                None => Step::Redraw,
            },
            Intent::PressAction => Step::Act(UserAction::PressAction),
            Intent::Surrender => Step::Act(UserAction::Surrender),
        };
        debug!(?intent, ?step, "Key handled");
        step
    }
}
