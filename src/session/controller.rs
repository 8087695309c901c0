use std::time::Duration;

use clap::ValueEnum;
use rand::Rng;
use serde::Serialize;
use tracing::{debug, info, instrument};

use super::error::{SessionError, SessionResult};
use super::snapshot::Snapshot;
use crate::game::{DiagonalPolicy, MoveSelector, Outcome, Selection, Side, TicTacToe};

pub const DEFAULT_MIN_DELAY: Duration = Duration::from_millis(500);
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_millis(1000);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum OpponentKind {
    Human,
    #[default]
    Computer,
}

/// Who moves first when a game starts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum StartingSide {
    Player,
    Opponent,
    #[default]
    Random,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SessionSettings {
    pub starting_side: StartingSide,
    pub diagonals: DiagonalPolicy,
    pub selection: Selection,
    pub min_delay: Duration,
    pub max_delay: Duration,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            starting_side: StartingSide::default(),
            diagonals: DiagonalPolicy::default(),
            selection: Selection::default(),
            min_delay: DEFAULT_MIN_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
        }
    }
}

/// Ticket for the computer opponent's deferred move.
///
/// Only the most recently issued ticket is honoured; starting or resetting a
/// game invalidates it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PendingMove {
    generation: u64,
    delay: Duration,
}

impl PendingMove {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Simulated thinking time before the move should be resolved.
    pub fn delay(&self) -> Duration {
        self.delay
    }
}

/// Result of an accepted placement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Placement {
    pub outcome: Outcome,
    pub pending: Option<PendingMove>,
}

/// Owns the game state and decides when the computer opponent moves.
///
/// Every method runs to completion synchronously; the delay of a
/// [`PendingMove`] is left to the caller.
#[derive(Debug)]
pub struct GameSession<R> {
    settings: SessionSettings,
    selector: MoveSelector,
    rng: R,
    game: Option<TicTacToe>,
    kind: OpponentKind,
    generation: u64,
    pending: Option<PendingMove>,
}

impl<R: Rng> GameSession<R> {
    pub fn new(settings: SessionSettings, rng: R) -> Self {
        Self {
            selector: MoveSelector::new(settings.selection),
            settings,
            rng,
            game: None,
            kind: OpponentKind::default(),
            generation: 0,
            pending: None,
        }
    }

    /// Starts a fresh game, dropping the current one.
    ///
    /// Returns the opponent's pending move when the computer goes first.
    #[instrument(skip(self))]
    pub fn start_game(&mut self, kind: OpponentKind) -> Option<PendingMove> {
        self.invalidate();
        let first = match self.settings.starting_side {
            StartingSide::Player => Side::Player,
            StartingSide::Opponent => Side::Opponent,
            StartingSide::Random => {
                if self.rng.gen_bool(0.5) {
                    Side::Player
                } else {
                    Side::Opponent
                }
            }
        };
        self.kind = kind;
        self.game = Some(TicTacToe::with_policy(first, self.settings.diagonals));
        info!(?first, generation = self.generation, "game started");
        self.schedule_opponent()
    }

    /// Drops the current game; no game is in progress afterwards.
    pub fn reset(&mut self) {
        self.invalidate();
        self.game = None;
        info!(generation = self.generation, "session reset");
    }

    /// Places a piece at `row`, `col` on behalf of the local user.
    ///
    /// Against a human opponent the piece belongs to whichever side is to
    /// move. Against the computer it is always the player's piece, so
    /// placements during the computer's turn are rejected.
    #[instrument(skip(self))]
    pub fn place_piece(&mut self, row: usize, col: usize) -> SessionResult<Placement> {
        let game = self.game.as_mut().ok_or(SessionError::NoGameInProgress)?;
        let side = match self.kind {
            OpponentKind::Human => game.turn(),
            OpponentKind::Computer => Side::Player,
        };
        let outcome = game.place_piece_at(side, row, col)?;
        Ok(Placement {
            outcome,
            pending: self.schedule_opponent(),
        })
    }

    /// Plays the computer's move for `ticket`.
    ///
    /// Returns `Ok(None)` without touching the board when the ticket was
    /// invalidated by a newer game or a reset.
    #[instrument(skip(self))]
    pub fn resolve_pending(&mut self, ticket: PendingMove) -> SessionResult<Option<Placement>> {
        if self.pending != Some(ticket) {
            debug!(current = self.generation, "ignoring stale opponent move");
            return Ok(None);
        }
        self.pending = None;
        let Some(game) = self.game.as_mut() else {
            return Ok(None);
        };
        let position = self.selector.select_move(game.board(), &mut self.rng)?;
        let outcome = game.place(Side::Opponent, position)?;
        Ok(Some(Placement {
            outcome,
            pending: None,
        }))
    }

    fn invalidate(&mut self) {
        self.generation += 1;
        self.pending = None;
    }

    fn schedule_opponent(&mut self) -> Option<PendingMove> {
        let game = self.game.as_ref()?;
        if self.kind != OpponentKind::Computer
            || game.is_finished()
            || game.turn() != Side::Opponent
        {
            return None;
        }
        let delay = self.thinking_delay();
        let pending = PendingMove {
            generation: self.generation,
            delay,
        };
        debug!(?delay, generation = self.generation, "opponent is thinking");
        self.pending = Some(pending);
        Some(pending)
    }

    fn thinking_delay(&mut self) -> Duration {
        let SessionSettings {
            min_delay,
            max_delay,
            ..
        } = self.settings;
        if min_delay >= max_delay {
            return min_delay;
        }
        self.rng.gen_range(min_delay..max_delay)
    }
}

impl<R> GameSession<R> {
    pub fn game(&self) -> Option<&TicTacToe> {
        self.game.as_ref()
    }

    pub fn pending(&self) -> Option<PendingMove> {
        self.pending
    }

    pub fn snapshot(&self) -> Snapshot {
        match &self.game {
            Some(game) => Snapshot::from_game(game, self.kind, self.pending.is_some()),
            None => Snapshot::idle(self.kind),
        }
    }
}
