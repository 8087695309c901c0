use crate::game::{GameError, OpponentError};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    #[error("no game in progress")]
    NoGameInProgress,
    #[error("session worker has stopped")]
    WorkerStopped,
    #[error(transparent)]
    Game(#[from] GameError),
    #[error(transparent)]
    Opponent(#[from] OpponentError),
}

impl SessionError {
    /// Rejected placements are reported but leave the session usable.
    pub fn is_illegal_move(&self) -> bool {
        matches!(self, Self::Game(_) | Self::NoGameInProgress)
    }
}

pub type SessionResult<T> = Result<T, SessionError>;
