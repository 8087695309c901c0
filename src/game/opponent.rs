use rand::Rng;
use tracing::{debug, instrument};

use super::grid::GridIndex;
use super::tic_tac_toe::{Board, CELL_COUNT};

/// Number of random draws before the opponent gives up.
pub const DEFAULT_RETRY_BUDGET: usize = 1000;

/// The opponent could not find an empty cell. Only reachable on a full board,
/// which points at a bug in turn or termination handling.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum OpponentError {
    #[error("no legal move found after {attempts} attempts")]
    NoLegalMove { attempts: usize },
}

/// How the opponent picks among the cells of the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Selection {
    /// Draw a uniform cell index, retry on occupied cells, give up after `budget` draws.
    RejectionSampling { budget: usize },
    /// Pick uniformly among the empty cells.
    UniformEmpty,
}

impl Default for Selection {
    fn default() -> Self {
        Self::RejectionSampling {
            budget: DEFAULT_RETRY_BUDGET,
        }
    }
}

/// Naive computer opponent that plays a random empty cell.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MoveSelector {
    selection: Selection,
}

impl MoveSelector {
    pub fn new(selection: Selection) -> Self {
        Self { selection }
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    #[instrument(skip_all, fields(selection = ?self.selection))]
    pub fn select_move<R: Rng + ?Sized>(
        &self,
        board: &Board,
        rng: &mut R,
    ) -> Result<GridIndex, OpponentError> {
        let position = match self.selection {
            Selection::RejectionSampling { budget } => sample_with_retries(board, rng, budget),
            Selection::UniformEmpty => pick_empty(board, rng),
        }?;
        debug!(%position, "opponent selected a cell");
        Ok(position)
    }
}

fn sample_with_retries<R: Rng + ?Sized>(
    board: &Board,
    rng: &mut R,
    budget: usize,
) -> Result<GridIndex, OpponentError> {
    for _ in 0..budget {
        let position = GridIndex::from_flat(rng.gen_range(0..CELL_COUNT), Board::cols());
        if board[position].is_none() {
            return Ok(position);
        }
    }
    Err(OpponentError::NoLegalMove { attempts: budget })
}

fn pick_empty<R: Rng + ?Sized>(board: &Board, rng: &mut R) -> Result<GridIndex, OpponentError> {
    let empty_cells: Vec<_> = board.empty_cells().collect();
    if empty_cells.is_empty() {
        return Err(OpponentError::NoLegalMove { attempts: 0 });
    }
    let index = rng.gen_range(0..empty_cells.len());
    Ok(empty_cells[index])
}
