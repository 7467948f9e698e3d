//! Key bindings and cursor movement for keyboard navigation.

use crossterm::event::KeyCode;
use strictly_xo::{Battlefield, FIELD_COLS, FIELD_ROWS};

/// What a key press asks for, before it meets the game state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// Leave the client.
    Quit,
    /// Move the lobby selection or board cursor.
    Move(Direction),
    /// Join the selected game or claim the cursor cell.
    Select,
    /// Press the action button.
    PressAction,
    /// Give up the current game.
    Surrender,
}

/// Arrow directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Towards row 0.
    Up,
    /// Towards the last row.
    Down,
    /// Towards column 0.
    Left,
    /// Towards the last column.
    Right,
}

/// Maps a key to an intent; unbound keys map to nothing.
pub fn intent_for(key: KeyCode) -> Option<Intent> {
    match key {
        KeyCode::Char('q') | KeyCode::Esc => Some(Intent::Quit),
        KeyCode::Up => Some(Intent::Move(Direction::Up)),
        KeyCode::Down => Some(Intent::Move(Direction::Down)),
        KeyCode::Left => Some(Intent::Move(Direction::Left)),
        KeyCode::Right => Some(Intent::Move(Direction::Right)),
        KeyCode::Enter => Some(Intent::Select),
        KeyCode::Char('a') | KeyCode::Char(' ') => Some(Intent::PressAction),
        KeyCode::Char('s') => Some(Intent::Surrender),
        _ => None,
    }
}

/// Position of the highlighted board cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BoardCursor {
    row: usize,
    col: usize,
}

impl BoardCursor {
    /// Row of the cursor, from 0.
    pub fn row(&self) -> usize {
        self.row
    }

    /// Column of the cursor, from 0.
    pub fn col(&self) -> usize {
        self.col
    }

    /// Cell index under the cursor.
    pub fn index(&self) -> Option<usize> {
        Battlefield::index_at(self.row, self.col)
    }

    /// Moves one step, stopping at the edges.
    pub fn moved(self, direction: Direction) -> Self {
        match direction {
            Direction::Up => Self {
                row: self.row.saturating_sub(1),
                ..self
            },
            Direction::Down => Self {
                row: (self.row + 1).min(FIELD_ROWS - 1),
                ..self
            },
            Direction::Left => Self {
                col: self.col.saturating_sub(1),
                ..self
            },
            Direction::Right => Self {
                col: (self.col + 1).min(FIELD_COLS - 1),
                ..self
            },
        }
    }
}

/// Moves a list selection, stopping at the ends.
pub fn move_selection(selected: usize, len: usize, direction: Direction) -> usize {
    match direction {
        Direction::Up => selected.saturating_sub(1),
        Direction::Down if len > 0 => (selected + 1).min(len - 1),
        _ => selected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_clamps_at_edges() {
        let origin = BoardCursor::default();
        assert_eq!(origin.moved(Direction::Up), origin);
        assert_eq!(origin.moved(Direction::Left), origin);

        let mut cursor = origin;
        for _ in 0..20 {
            cursor = cursor.moved(Direction::Down).moved(Direction::Right);
        }
        assert_eq!((cursor.row(), cursor.col()), (FIELD_ROWS - 1, FIELD_COLS - 1));
        assert_eq!(cursor.index(), Some(100));
    }

    #[test]
    fn test_cursor_index_is_row_major_from_one() {
        let cursor = BoardCursor::default()
            .moved(Direction::Down)
            .moved(Direction::Right)
            .moved(Direction::Right);
        assert_eq!(cursor.index(), Some(13));
    }

    #[test]
    fn test_selection_stays_in_list() {
        assert_eq!(move_selection(0, 3, Direction::Up), 0);
        assert_eq!(move_selection(2, 3, Direction::Down), 2);
        assert_eq!(move_selection(1, 3, Direction::Down), 2);
        assert_eq!(move_selection(0, 0, Direction::Down), 0);
    }

    #[test]
    fn test_bindings() {
        assert_eq!(intent_for(KeyCode::Esc), Some(Intent::Quit));
        assert_eq!(intent_for(KeyCode::Char(' ')), Some(Intent::PressAction));
        assert_eq!(intent_for(KeyCode::Char('s')), Some(Intent::Surrender));
        assert_eq!(intent_for(KeyCode::Char('z')), None);
    }
}
