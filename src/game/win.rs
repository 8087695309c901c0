//! Three-in-a-row detection.
//!
//! Every line is described by a starting cell and a row/column increment.
//! Walking a line wraps modulo the board size, so the row or column through
//! any cell is covered by starting at that cell.

use clap::ValueEnum;
use tracing::trace;

use super::grid::{GridIndex, Step};
use super::tic_tac_toe::{Board, Side, BOARD_SIZE};

pub const LINE_LENGTH: usize = BOARD_SIZE;

/// Cells of a completed line, in walk order.
pub type Line = [GridIndex; LINE_LENGTH];

/// Which diagonals are inspected after a placement.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum DiagonalPolicy {
    /// Both full-board diagonals are checked on every move.
    #[default]
    Always,
    /// A diagonal is checked only when the placed cell lies on it.
    ThroughPlacedCell,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LineCheck {
    start: GridIndex,
    step: Step,
}

impl LineCheck {
    pub fn new(start: GridIndex, step: Step) -> Self {
        Self { start, step }
    }

    /// Column through `origin`.
    pub fn column_through(origin: GridIndex) -> Self {
        Self::new(origin, (1, 0))
    }

    /// Row through `origin`.
    pub fn row_through(origin: GridIndex) -> Self {
        Self::new(origin, (0, 1))
    }

    /// Cells 0, 4, 8.
    pub fn main_diagonal() -> Self {
        Self::new(GridIndex::new(0, 0), (1, 1))
    }

    /// Cells 6, 2, 4.
    pub fn anti_diagonal() -> Self {
        Self::new(GridIndex::new(BOARD_SIZE - 1, 0), (1, -1))
    }

    pub fn start(&self) -> GridIndex {
        self.start
    }

    pub fn step(&self) -> Step {
        self.step
    }

    /// Cells visited by this line, in walk order.
    pub fn cells(&self) -> Line {
        let mut line = [self.start; LINE_LENGTH];
        for i in 1..LINE_LENGTH {
            line[i] = line[i - 1].wrapping_step(self.step, BOARD_SIZE, BOARD_SIZE);
        }
        line
    }

    pub fn passes_through(&self, index: GridIndex) -> bool {
        self.cells().contains(&index)
    }

    /// Returns the walked cells when every one of them holds `side`'s piece.
    pub fn matches(&self, board: &Board, side: Side) -> Option<Line> {
        let mut line = [self.start; LINE_LENGTH];
        let mut matched = 0;
        for (slot, (index, cell)) in line
            .iter_mut()
            .zip(board.wrapping_iter(self.start, self.step))
        {
            if **cell != Some(side) {
                break;
            }
            *slot = index;
            matched += 1;
        }
        (matched == LINE_LENGTH).then_some(line)
    }
}

/// Lines inspected after `side` placed a piece at `origin`, in check order:
/// column, row, main diagonal, anti-diagonal.
pub fn candidate_lines(origin: GridIndex, policy: DiagonalPolicy) -> Vec<LineCheck> {
    let mut lines = vec![LineCheck::column_through(origin), LineCheck::row_through(origin)];
    for diagonal in [LineCheck::main_diagonal(), LineCheck::anti_diagonal()] {
        match policy {
            DiagonalPolicy::Always => lines.push(diagonal),
            DiagonalPolicy::ThroughPlacedCell if diagonal.passes_through(origin) => {
                lines.push(diagonal)
            }
            DiagonalPolicy::ThroughPlacedCell => {}
        }
    }
    lines
}

/// First candidate line completed by `side`, if any.
pub fn find_winning_line(
    board: &Board,
    side: Side,
    origin: GridIndex,
    policy: DiagonalPolicy,
) -> Option<Line> {
    candidate_lines(origin, policy).into_iter().find_map(|check| {
        let line = check.matches(board, side);
        trace!(start = %check.start(), step = ?check.step(), matched = line.is_some(), "checked line");
        line
    })
}

#[cfg(test)]
mod test {
    use super::*;

    fn board_with(cells: &[(usize, Side)]) -> Board {
        let mut board = Board::default();
        for &(flat, side) in cells {
            board[Board::position(flat).unwrap()] = side.into();
        }
        board
    }

    fn flat(line: Line) -> Vec<usize> {
        line.iter().map(|index| Board::flat(*index)).collect()
    }

    #[test]
    fn test_fixed_diagonals() {
        assert_eq!(flat(LineCheck::main_diagonal().cells()), vec![0, 4, 8]);
        assert_eq!(flat(LineCheck::anti_diagonal().cells()), vec![6, 2, 4]);
    }

    #[test]
    fn test_row_and_column_wrap_from_origin() {
        let origin = Board::position(5).unwrap();
        assert_eq!(flat(LineCheck::row_through(origin).cells()), vec![5, 3, 4]);
        assert_eq!(flat(LineCheck::column_through(origin).cells()), vec![5, 8, 2]);
    }

    #[test]
    fn test_candidate_lines_policy() {
        let edge = Board::position(1).unwrap();
        assert_eq!(candidate_lines(edge, DiagonalPolicy::Always).len(), 4);
        assert_eq!(
            candidate_lines(edge, DiagonalPolicy::ThroughPlacedCell),
            vec![LineCheck::column_through(edge), LineCheck::row_through(edge)]
        );

        let center = Board::position(4).unwrap();
        assert_eq!(
            candidate_lines(center, DiagonalPolicy::ThroughPlacedCell).len(),
            4
        );

        let corner = Board::position(2).unwrap();
        assert_eq!(
            candidate_lines(corner, DiagonalPolicy::ThroughPlacedCell),
            vec![
                LineCheck::column_through(corner),
                LineCheck::row_through(corner),
                LineCheck::anti_diagonal()
            ]
        );
    }

    #[test]
    fn test_row_win() {
        let board = board_with(&[(0, Side::Player), (1, Side::Player), (2, Side::Player)]);
        let line = find_winning_line(
            &board,
            Side::Player,
            Board::position(2).unwrap(),
            DiagonalPolicy::Always,
        )
        .unwrap();
        assert_eq!(flat(line), vec![2, 0, 1]);
    }

    #[test]
    fn test_column_win_only_for_moving_side() {
        let board = board_with(&[(1, Side::Opponent), (4, Side::Opponent), (7, Side::Opponent)]);
        let origin = Board::position(7).unwrap();
        assert_eq!(
            find_winning_line(&board, Side::Player, origin, DiagonalPolicy::Always),
            None
        );
        let line =
            find_winning_line(&board, Side::Opponent, origin, DiagonalPolicy::Always).unwrap();
        assert_eq!(flat(line), vec![7, 1, 4]);
    }

    #[test]
    fn test_diagonal_off_origin() {
        // the anti-diagonal is complete but the origin is not on it
        let board = board_with(&[
            (2, Side::Player),
            (4, Side::Player),
            (6, Side::Player),
            (1, Side::Player),
        ]);
        let origin = Board::position(1).unwrap();
        let line =
            find_winning_line(&board, Side::Player, origin, DiagonalPolicy::Always).unwrap();
        assert_eq!(flat(line), vec![6, 2, 4]);
        assert_eq!(
            find_winning_line(&board, Side::Player, origin, DiagonalPolicy::ThroughPlacedCell),
            None
        );
    }

    #[test]
    fn test_incomplete_line() {
        let board = board_with(&[(0, Side::Player), (4, Side::Player), (8, Side::Opponent)]);
        assert_eq!(
            find_winning_line(
                &board,
                Side::Player,
                Board::position(4).unwrap(),
                DiagonalPolicy::Always
            ),
            None
        );
    }
}
