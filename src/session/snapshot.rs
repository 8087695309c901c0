use std::fmt::{Display, Formatter};

use serde::Serialize;

use super::controller::OpponentKind;
use crate::game::tic_tac_toe::{BOARD_SIZE, CELL_COUNT};
use crate::game::win::LINE_LENGTH;
use crate::game::{Board, Outcome, Side, TicTacToe};

/// Everything a front end needs to draw the session. Rebuilt after every
/// change, so rendering it twice gives the same picture.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Snapshot {
    pub opponent: OpponentKind,
    /// `None` while no game is in progress.
    pub outcome: Option<Outcome>,
    /// Side to move; `None` when no game is running or it has finished.
    pub turn: Option<Side>,
    pub cells: [Option<Side>; CELL_COUNT],
    pub placed: usize,
    pub winning_line: Option<[usize; LINE_LENGTH]>,
    pub awaiting_opponent: bool,
}

impl Snapshot {
    pub fn idle(opponent: OpponentKind) -> Self {
        Self {
            opponent,
            outcome: None,
            turn: None,
            cells: [None; CELL_COUNT],
            placed: 0,
            winning_line: None,
            awaiting_opponent: false,
        }
    }

    pub fn from_game(game: &TicTacToe, opponent: OpponentKind, awaiting_opponent: bool) -> Self {
        Self {
            opponent,
            outcome: Some(game.outcome()),
            turn: (!game.is_finished()).then_some(game.turn()),
            cells: game.cells(),
            placed: game.placed(),
            winning_line: game.winning_line().map(|line| line.map(Board::flat)),
            awaiting_opponent,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.outcome == Some(Outcome::InProgress)
    }

    /// Reminder of the player's piece, shown while a game is on the board.
    pub fn piece_line(&self) -> Option<String> {
        self.outcome
            .map(|_| format!("The player's piece is [{}]", Side::Player))
    }

    /// One-line description of the turn or the result.
    pub fn status_line(&self) -> String {
        match (self.outcome, self.turn) {
            (None, _) => "No game in progress.".to_string(),
            (Some(Outcome::InProgress), Some(side)) => {
                let owner = match (side, self.opponent) {
                    (Side::Player, _) => "player's",
                    (Side::Opponent, OpponentKind::Computer) => "CPU's",
                    (Side::Opponent, OpponentKind::Human) => "opponent's",
                };
                format!("It's the {} turn. [{}]", owner, side)
            }
            (Some(Outcome::PlayerWin), _) => "Game over, you've won!".to_string(),
            (Some(Outcome::OpponentWin), _) => "Game over, your opponent won!".to_string(),
            (Some(Outcome::Stalemate), _) => "Game over, nobody won!".to_string(),
            (Some(Outcome::InProgress), None) => "Game in progress.".to_string(),
        }
    }
}

impl Display for Snapshot {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (flat, cell) in self.cells.iter().enumerate() {
            let winning = self
                .winning_line
                .is_some_and(|line| line.contains(&flat));
            match (cell, winning) {
                (Some(side), true) => write!(f, "<{}>", side)?,
                (Some(side), false) => write!(f, "[{}]", side)?,
                (None, _) => f.write_str("[ ]")?,
            }
            if flat % BOARD_SIZE == BOARD_SIZE - 1 {
                f.write_str("\n")?;
            }
        }
        if let Some(piece_line) = self.piece_line() {
            writeln!(f, "{}", piece_line)?;
        }
        f.write_str(&self.status_line())
    }
}
