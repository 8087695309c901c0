//! Game controller: owns the single game, schedules the computer opponent's
//! delayed reply, and publishes render snapshots.

mod controller;
mod error;
mod snapshot;
mod worker;

pub use controller::{
    GameSession, OpponentKind, PendingMove, Placement, SessionSettings, StartingSide,
    DEFAULT_MAX_DELAY, DEFAULT_MIN_DELAY,
};
pub use error::{SessionError, SessionResult};
pub use snapshot::Snapshot;
pub use worker::{spawn, SessionCommand, SessionHandle, SessionWorker};
