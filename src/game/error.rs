use super::Side;

/// Reasons a placement is rejected. The board is never mutated when one of
/// these is returned.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum GameError {
    #[error("invalid cell index (expected: 0-{max_expected}, found: {found})")]
    InvalidIndex { max_expected: usize, found: usize },
    #[error("invalid row (expected: 0-{max_expected}, found: {found})")]
    InvalidRow { max_expected: usize, found: usize },
    #[error("invalid column (expected: 0-{max_expected}, found: {found})")]
    InvalidCol { max_expected: usize, found: usize },
    #[error("cell ({row}, {col}) is occupied")]
    CellIsOccupied { row: usize, col: usize },
    #[error("can't place a piece on a finished game")]
    GameIsFinished,
    #[error("other side's turn (expected: {expected:?}, found: {found:?})")]
    NotYourTurn { expected: Side, found: Side },
}

impl GameError {
    pub fn invalid_index(max_expected: usize, found: usize) -> Self {
        Self::InvalidIndex {
            max_expected,
            found,
        }
    }

    pub fn invalid_row(max_expected: usize, found: usize) -> Self {
        Self::InvalidRow {
            max_expected,
            found,
        }
    }

    pub fn invalid_col(max_expected: usize, found: usize) -> Self {
        Self::InvalidCol {
            max_expected,
            found,
        }
    }

    pub fn cell_is_occupied(row: usize, col: usize) -> Self {
        Self::CellIsOccupied { row, col }
    }

    pub fn not_your_turn(expected: Side, found: Side) -> Self {
        Self::NotYourTurn { expected, found }
    }
}
