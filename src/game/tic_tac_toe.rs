use std::fmt::{Display, Formatter};

use generic_array::typenum::U3;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::game::win::{self, DiagonalPolicy, Line};
use crate::game::{
    error::GameError,
    grid::{Grid, GridIndex},
    BoardCell, GameResult, Outcome,
};

pub const BOARD_SIZE: usize = 3;
pub const CELL_COUNT: usize = BOARD_SIZE * BOARD_SIZE;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Player,
    Opponent,
}

impl Side {
    pub fn other(self) -> Self {
        match self {
            Side::Player => Side::Opponent,
            Side::Opponent => Side::Player,
        }
    }

    /// Mark drawn on the board for this side.
    pub fn piece(self) -> char {
        match self {
            Side::Player => 'x',
            Side::Opponent => 'o',
        }
    }
}

impl Display for Side {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.piece())
    }
}

pub type Cell = BoardCell<Side>;
pub type Board = Grid<Cell, U3, U3>;

/// Single game of tic-tac-toe between the player and the opponent.
///
/// Mutated only through [`TicTacToe::place`] and its wrappers; once
/// [`TicTacToe::outcome`] is terminal every further placement is rejected.
#[derive(Clone, Debug)]
pub struct TicTacToe {
    board: Board,
    turn: Side,
    placed: usize,
    outcome: Outcome,
    winning_line: Option<Line>,
    diagonals: DiagonalPolicy,
}

impl Default for TicTacToe {
    fn default() -> Self {
        Self::new(Side::Player)
    }
}

impl Display for TicTacToe {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.board)
    }
}

impl TicTacToe {
    pub fn new(first: Side) -> Self {
        Self::with_policy(first, DiagonalPolicy::default())
    }

    pub fn with_policy(first: Side, diagonals: DiagonalPolicy) -> Self {
        Self {
            board: Board::default(),
            turn: first,
            placed: 0,
            outcome: Outcome::InProgress,
            winning_line: None,
            diagonals,
        }
    }

    /// Places `side`'s piece at the row-major `index` (0-8).
    pub fn place_piece(&mut self, side: Side, index: usize) -> GameResult<Outcome> {
        let position =
            Board::position(index).ok_or(GameError::invalid_index(CELL_COUNT - 1, index))?;
        self.place(side, position)
    }

    /// Places `side`'s piece at `row`, `col` (both 0-2).
    pub fn place_piece_at(&mut self, side: Side, row: usize, col: usize) -> GameResult<Outcome> {
        if row >= BOARD_SIZE {
            return Err(GameError::invalid_row(BOARD_SIZE - 1, row));
        }
        if col >= BOARD_SIZE {
            return Err(GameError::invalid_col(BOARD_SIZE - 1, col));
        }
        self.place(side, GridIndex::new(row, col))
    }

    #[instrument(skip(self, position), fields(position = %position, turn = ?self.turn))]
    pub fn place(&mut self, side: Side, position: GridIndex) -> GameResult<Outcome> {
        if self.outcome.is_finished() {
            return Err(GameError::GameIsFinished);
        }
        if side != self.turn {
            return Err(GameError::not_your_turn(self.turn, side));
        }
        let cell = self
            .board
            .get(position)
            .ok_or(GameError::invalid_index(CELL_COUNT - 1, Board::flat(position)))?;
        if cell.is_some() {
            return Err(GameError::cell_is_occupied(position.row(), position.col()));
        }

        self.board[position] = side.into();
        self.placed += 1;

        Ok(self.update_outcome(side, position))
    }

    fn update_outcome(&mut self, side: Side, origin: GridIndex) -> Outcome {
        if let Some(line) = win::find_winning_line(&self.board, side, origin, self.diagonals) {
            debug!(?side, line = ?line.map(Board::flat), "line completed");
            self.winning_line = Some(line);
            self.outcome = Outcome::win(side);
        } else if self.placed >= CELL_COUNT {
            debug!("board is full");
            self.outcome = Outcome::Stalemate;
        } else {
            self.turn = side.other();
        }
        self.outcome
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Side to move, or the side that made the last move once the game is finished.
    pub fn turn(&self) -> Side {
        self.turn
    }

    pub fn placed(&self) -> usize {
        self.placed
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    pub fn is_finished(&self) -> bool {
        self.outcome.is_finished()
    }

    pub fn winning_line(&self) -> Option<Line> {
        self.winning_line
    }

    pub fn cell(&self, index: usize) -> Option<Cell> {
        Board::position(index).map(|position| self.board[position])
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> [Option<Side>; CELL_COUNT] {
        let mut cells = [None; CELL_COUNT];
        for (index, cell) in self.board.all_indexed() {
            cells[Board::flat(index)] = **cell;
        }
        cells
    }

    pub fn empty_cells(&self) -> impl Iterator<Item = GridIndex> + '_ {
        self.board.empty_cells()
    }
}
