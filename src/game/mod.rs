pub mod error;
pub mod grid;
pub mod opponent;
pub mod tic_tac_toe;
pub mod win;

use std::fmt::{Display, Formatter};
use std::ops::{Deref, DerefMut};

use generic_array::ArrayLength;
use serde::Serialize;

pub use error::GameError;
pub use grid::{Grid, GridIndex};
pub use opponent::{MoveSelector, OpponentError, Selection};
pub use tic_tac_toe::{Board, Cell, Side, TicTacToe};
pub use win::{DiagonalPolicy, Line, LineCheck};

pub type GameResult<T> = Result<T, GameError>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoardCell<T>(pub Option<T>);

impl<T> Default for BoardCell<T> {
    fn default() -> Self {
        Self(Option::default())
    }
}

impl<T: Display> Display for BoardCell<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.0 {
            Some(val) => write!(f, "[{}]", val),
            None => f.write_str("[ ]"),
        }
    }
}

impl<T> From<T> for BoardCell<T> {
    fn from(value: T) -> Self {
        Self(Option::from(value))
    }
}

impl<T> Deref for BoardCell<T> {
    type Target = Option<T>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T> DerefMut for BoardCell<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<T, R: ArrayLength, C: ArrayLength> Grid<BoardCell<T>, R, C> {
    /// Indexes of the cells without a piece, row by row.
    pub fn empty_cells(&self) -> impl Iterator<Item = GridIndex> + '_ {
        self.all_indexed()
            .filter_map(|(index, cell)| cell.is_none().then_some(index))
    }
}

/// Where a game stands after the latest accepted placement.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    #[default]
    InProgress,
    PlayerWin,
    OpponentWin,
    Stalemate,
}

impl Outcome {
    pub fn win(side: Side) -> Self {
        match side {
            Side::Player => Self::PlayerWin,
            Side::Opponent => Self::OpponentWin,
        }
    }

    pub fn is_finished(&self) -> bool {
        !matches!(self, Self::InProgress)
    }

    pub fn winner(&self) -> Option<Side> {
        match self {
            Self::PlayerWin => Some(Side::Player),
            Self::OpponentWin => Some(Side::Opponent),
            Self::InProgress | Self::Stalemate => None,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use itertools::assert_equal;

    #[test]
    fn test_empty_cells() {
        let mut board = Board::default();
        assert_eq!(board.empty_cells().count(), 9);

        for flat in [0, 2, 4, 5, 8] {
            board[GridIndex::from_flat(flat, 3)] = Side::Player.into();
        }
        assert_equal(
            board.empty_cells(),
            [(0, 1), (1, 0), (2, 0), (2, 1)].map(GridIndex::from),
        );
    }
}
