use std::future::{Future, IntoFuture};

use rand::Rng;
use tokio::sync::mpsc::{unbounded_channel, UnboundedSender};
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use super::controller::{GameSession, OpponentKind, PendingMove, Placement};
use super::error::{SessionError, SessionResult};
use super::snapshot::Snapshot;

#[derive(Debug)]
pub enum SessionCommand {
    Start {
        kind: OpponentKind,
        reply: oneshot::Sender<Snapshot>,
    },
    Reset {
        reply: oneshot::Sender<Snapshot>,
    },
    Place {
        row: usize,
        col: usize,
        reply: oneshot::Sender<SessionResult<Placement>>,
    },
}

/// Cheap, cloneable front door to a running [`SessionWorker`].
#[derive(Clone, Debug)]
pub struct SessionHandle {
    commands: UnboundedSender<SessionCommand>,
    snapshots: watch::Receiver<Snapshot>,
}

impl SessionHandle {
    /// Starts a new game and returns the state right after the start.
    pub async fn start_game(&self, kind: OpponentKind) -> SessionResult<Snapshot> {
        let (reply, response) = oneshot::channel();
        self.send(SessionCommand::Start { kind, reply })?;
        response.await.map_err(|_| SessionError::WorkerStopped)
    }

    pub async fn reset(&self) -> SessionResult<Snapshot> {
        let (reply, response) = oneshot::channel();
        self.send(SessionCommand::Reset { reply })?;
        response.await.map_err(|_| SessionError::WorkerStopped)
    }

    pub async fn place_piece(&self, row: usize, col: usize) -> SessionResult<Placement> {
        let (reply, response) = oneshot::channel();
        self.send(SessionCommand::Place { row, col, reply })?;
        response.await.map_err(|_| SessionError::WorkerStopped)?
    }

    /// Latest published state.
    pub fn snapshot(&self) -> Snapshot {
        self.snapshots.borrow().clone()
    }

    /// Receiver notified after every processed command and opponent move.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshots.clone()
    }

    fn send(&self, command: SessionCommand) -> SessionResult<()> {
        self.commands
            .send(command)
            .map_err(|_| SessionError::WorkerStopped)
    }
}

/// Task that owns the [`GameSession`] and applies commands one at a time.
///
/// The snapshot is published before a command is answered, so a caller that
/// awaited a command always observes its effect.
///
/// Finishes when every [`SessionHandle`] is dropped, when the shutdown token
/// is cancelled, or with an error when the opponent fails to move.
pub struct SessionWorker(JoinHandle<SessionResult<()>>);

impl IntoFuture for SessionWorker {
    type Output = <JoinHandle<SessionResult<()>> as Future>::Output;
    type IntoFuture = JoinHandle<SessionResult<()>>;

    fn into_future(self) -> Self::IntoFuture {
        self.0.into_future()
    }
}

/// Moves `session` onto a tokio task and returns a handle to drive it.
pub fn spawn<R>(session: GameSession<R>, ct: CancellationToken) -> (SessionHandle, SessionWorker)
where
    R: Rng + Send + 'static,
{
    let (command_sender, mut command_receiver) = unbounded_channel();
    let (snapshot_sender, snapshot_receiver) = watch::channel(session.snapshot());

    let worker = tokio::spawn(async move {
        let mut session = session;
        let (timer_sender, mut timer_receiver) = unbounded_channel::<PendingMove>();
        let mut timers = ct.child_token();

        loop {
            tokio::select! {
                _ = ct.cancelled() => {
                    debug!("session worker cancelled");
                    break;
                }
                command = command_receiver.recv() => {
                    let Some(command) = command else {
                        debug!("session worker: no more commands");
                        break;
                    };
                    match command {
                        SessionCommand::Start { kind, reply } => {
                            timers.cancel();
                            timers = ct.child_token();
                            if let Some(pending) = session.start_game(kind) {
                                spawn_timer(pending, timer_sender.clone(), timers.clone());
                            }
                            let snapshot = session.snapshot();
                            snapshot_sender.send_replace(snapshot.clone());
                            if reply.send(snapshot).is_err() {
                                debug!("start reply dropped");
                            }
                        }
                        SessionCommand::Reset { reply } => {
                            timers.cancel();
                            timers = ct.child_token();
                            session.reset();
                            let snapshot = session.snapshot();
                            snapshot_sender.send_replace(snapshot.clone());
                            if reply.send(snapshot).is_err() {
                                debug!("reset reply dropped");
                            }
                        }
                        SessionCommand::Place { row, col, reply } => {
                            let result = session.place_piece(row, col);
                            match &result {
                                Ok(placement) => {
                                    if let Some(pending) = placement.pending {
                                        spawn_timer(pending, timer_sender.clone(), timers.clone());
                                    }
                                    if placement.outcome.is_finished() {
                                        info!(outcome = ?placement.outcome, "game over");
                                    }
                                }
                                Err(err) => debug!(%err, row, col, "placement rejected"),
                            }
                            snapshot_sender.send_replace(session.snapshot());
                            if reply.send(result).is_err() {
                                debug!("placement reply dropped");
                            }
                        }
                    }
                }
                Some(pending) = timer_receiver.recv() => {
                    let result = session.resolve_pending(pending);
                    snapshot_sender.send_replace(session.snapshot());
                    match result {
                        Ok(Some(placement)) => {
                            debug!(outcome = ?placement.outcome, "opponent moved");
                            if placement.outcome.is_finished() {
                                info!(outcome = ?placement.outcome, "game over");
                            }
                        }
                        Ok(None) => {}
                        Err(err) => {
                            error!(%err, "opponent failed to move");
                            return Err(err);
                        }
                    }
                }
            }
        }
        timers.cancel();
        Ok(())
    });

    let handle = SessionHandle {
        commands: command_sender,
        snapshots: snapshot_receiver,
    };
    (handle, SessionWorker(worker))
}

/// Posts `pending` back to the worker once its delay has elapsed, unless
/// `token` is cancelled first.
fn spawn_timer(pending: PendingMove, sender: UnboundedSender<PendingMove>, token: CancellationToken) {
    tokio::spawn(async move {
        tokio::select! {
            _ = token.cancelled() => {
                debug!(generation = pending.generation(), "opponent move cancelled");
            }
            _ = tokio::time::sleep(pending.delay()) => {
                if sender.send(pending).is_err() {
                    debug!("session worker gone before opponent move");
                }
            }
        }
    });
}
