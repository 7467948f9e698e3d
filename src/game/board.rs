//! The 10x10 battlefield as seen by this client.

use derive_getters::Getters;
use derive_more::{Display, Error};
use tracing::{debug, instrument};

use super::Side;

/// Rows on the battlefield.
pub const FIELD_ROWS: usize = 10;

/// Columns on the battlefield.
pub const FIELD_COLS: usize = 10;

/// Index of the first cell; the server numbers cells from 1.
pub const FIRST_CELL: usize = 1;

/// One square of the battlefield.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Getters)]
pub struct Cell {
    index: usize,
    owner: Option<Side>,
}

impl Cell {
    /// Whether a side has claimed this cell.
    pub fn is_occupied(&self) -> bool {
        self.owner.is_some()
    }

    /// Whether the cell can still be claimed.
    pub fn is_free(&self) -> bool {
        self.owner.is_none()
    }
}

/// Invalid battlefield operations.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum BoardError {
    /// No cell carries this index.
    #[display("Cell {index} does not exist on the battlefield")]
    CellNotFound {
        /// Requested index.
        index: usize,
    },
    /// The cell was claimed before; claims never change.
    #[display("Cell {index} is already claimed by {owner}")]
    AlreadyClaimed {
        /// Requested index.
        index: usize,
        /// Existing owner.
        owner: Side,
    },
}

/// Row-major grid of cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Battlefield {
    cells: Vec<Cell>,
}

impl Battlefield {
    /// Creates an unclaimed battlefield.
    #[instrument]
    pub fn new() -> Self {
        let cells = (0..FIELD_ROWS * FIELD_COLS)
            .map(|offset| Cell {
                index: FIRST_CELL + offset,
                owner: None,
            })
            .collect();
        Self { cells }
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Iterates the grid one row at a time.
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(FIELD_COLS)
    }

    /// Looks up a cell by its index.
    pub fn cell(&self, index: usize) -> Option<&Cell> {
        index
            .checked_sub(FIRST_CELL)
            .and_then(|offset| self.cells.get(offset))
    }

    /// Index of the cell at `row`, `col`.
    pub fn index_at(row: usize, col: usize) -> Option<usize> {
        (row < FIELD_ROWS && col < FIELD_COLS).then(|| FIRST_CELL + row * FIELD_COLS + col)
    }

    /// Whether `index` names a free cell.
    pub fn is_free(&self, index: usize) -> bool {
        self.cell(index).is_some_and(Cell::is_free)
    }

    /// Number of claimed cells.
    pub fn claimed(&self) -> usize {
        self.cells.iter().filter(|c| c.is_occupied()).count()
    }

    /// Claims a free cell for `side`.
    #[instrument(skip(self))]
    pub fn claim(&mut self, index: usize, side: Side) -> Result<(), BoardError> {
        let cell = index
            .checked_sub(FIRST_CELL)
            .and_then(|offset| self.cells.get_mut(offset))
            .ok_or(BoardError::CellNotFound { index })?;

        if let Some(owner) = cell.owner {
            return Err(BoardError::AlreadyClaimed { index, owner });
        }

        cell.owner = Some(side);
        debug!("Cell claimed");
        Ok(())
    }
}

impl Default for Battlefield {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_battlefield_is_free() {
        let field = Battlefield::new();
        assert_eq!(field.cells().len(), 100);
        assert_eq!(field.claimed(), 0);
        assert_eq!(*field.cells()[0].index(), 1);
        assert_eq!(*field.cells()[99].index(), 100);
        assert!(field.cells().iter().all(Cell::is_free));
    }

    #[test]
    fn test_row_major_indexing() {
        assert_eq!(Battlefield::index_at(0, 0), Some(1));
        assert_eq!(Battlefield::index_at(0, 9), Some(10));
        assert_eq!(Battlefield::index_at(1, 0), Some(11));
        assert_eq!(Battlefield::index_at(9, 9), Some(100));
        assert_eq!(Battlefield::index_at(10, 0), None);

        let field = Battlefield::new();
        let second_row = field.rows().nth(1).expect("second row");
        assert_eq!(*second_row[0].index(), 11);
    }

    #[test]
    fn test_claim_is_monotone() {
        let mut field = Battlefield::new();
        field.claim(5, Side::X).expect("free cell");
        assert_eq!(*field.cell(5).expect("cell 5").owner(), Some(Side::X));
        assert!(!field.is_free(5));

        let err = field.claim(5, Side::O).unwrap_err();
        assert_eq!(
            err,
            BoardError::AlreadyClaimed {
                index: 5,
                owner: Side::X
            }
        );
        assert_eq!(*field.cell(5).expect("cell 5").owner(), Some(Side::X));
        assert_eq!(field.claimed(), 1);
    }

    #[test]
    fn test_claim_out_of_range() {
        let mut field = Battlefield::new();
        assert_eq!(
            field.claim(0, Side::X),
            Err(BoardError::CellNotFound { index: 0 })
        );
        assert_eq!(
            field.claim(101, Side::X),
            Err(BoardError::CellNotFound { index: 101 })
        );
        assert_eq!(field.claimed(), 0);
    }
}
