extern crate tic_tac_toe;

use std::time::Duration;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tokio_util::sync::CancellationToken;

use tic_tac_toe::game::{OpponentError, Outcome, Selection, Side};
use tic_tac_toe::session::{
    self, GameSession, OpponentKind, SessionError, SessionHandle, SessionSettings, SessionWorker,
    StartingSide,
};

fn start_session(settings: SessionSettings) -> (SessionHandle, SessionWorker, CancellationToken) {
    let ct = CancellationToken::new();
    let session = GameSession::new(settings, ChaCha8Rng::seed_from_u64(2024));
    let (handle, worker) = session::spawn(session, ct.clone());
    (handle, worker, ct)
}

fn settings(starting_side: StartingSide) -> SessionSettings {
    SessionSettings {
        starting_side,
        ..Default::default()
    }
}

#[tokio::test(start_paused = true)]
async fn computer_replies_after_thinking() {
    let (handle, worker, ct) = start_session(settings(StartingSide::Player));
    let mut snapshots = handle.subscribe();
    handle.start_game(OpponentKind::Computer).await.unwrap();

    let placement = handle.place_piece(1, 1).await.unwrap();
    assert_eq!(placement.outcome, Outcome::InProgress);
    let pending = placement.pending.unwrap();
    assert!(handle.snapshot().awaiting_opponent);

    // nothing happens before the delay is over
    tokio::time::sleep(pending.delay() / 2).await;
    assert_eq!(handle.snapshot().placed, 1);

    let snapshot = snapshots
        .wait_for(|snapshot| snapshot.placed == 2)
        .await
        .unwrap()
        .clone();
    assert_eq!(snapshot.turn, Some(Side::Player));
    assert!(!snapshot.awaiting_opponent);
    assert_eq!(snapshot.cells[4], Some(Side::Player));
    assert_eq!(
        snapshot
            .cells
            .iter()
            .filter(|cell| **cell == Some(Side::Opponent))
            .count(),
        1
    );

    ct.cancel();
    worker.await.unwrap().unwrap();
}

#[tokio::test(start_paused = true)]
async fn clicks_during_computer_turn_are_rejected() {
    let (handle, worker, ct) = start_session(settings(StartingSide::Opponent));
    handle.start_game(OpponentKind::Computer).await.unwrap();

    let err = handle.place_piece(0, 0).await.unwrap_err();
    assert!(err.is_illegal_move());
    assert_eq!(handle.snapshot().placed, 0);

    ct.cancel();
    worker.await.unwrap().unwrap();
}

#[tokio::test(start_paused = true)]
async fn reset_cancels_pending_computer_move() {
    let (handle, worker, ct) = start_session(settings(StartingSide::Opponent));
    handle.start_game(OpponentKind::Computer).await.unwrap();
    handle.reset().await.unwrap();

    tokio::time::sleep(Duration::from_secs(5)).await;
    // round trip through the worker so every command has been applied
    assert_eq!(
        handle.place_piece(0, 0).await,
        Err(SessionError::NoGameInProgress)
    );
    let snapshot = handle.snapshot();
    assert_eq!(snapshot.outcome, None);
    assert_eq!(snapshot.placed, 0);

    ct.cancel();
    worker.await.unwrap().unwrap();
}

#[tokio::test(start_paused = true)]
async fn restart_ignores_previous_game_move() {
    let (handle, worker, ct) = start_session(settings(StartingSide::Opponent));
    let mut snapshots = handle.subscribe();
    handle.start_game(OpponentKind::Computer).await.unwrap();
    handle.start_game(OpponentKind::Computer).await.unwrap();

    let snapshot = snapshots
        .wait_for(|snapshot| snapshot.placed > 0)
        .await
        .unwrap()
        .clone();
    assert_eq!(snapshot.placed, 1);

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(handle.snapshot().placed, 1);
    assert_eq!(handle.snapshot().turn, Some(Side::Player));

    ct.cancel();
    worker.await.unwrap().unwrap();
}

#[tokio::test(start_paused = true)]
async fn human_game_to_a_win() {
    let (handle, worker, ct) = start_session(settings(StartingSide::Player));
    handle.start_game(OpponentKind::Human).await.unwrap();

    let moves = [(0, 0), (1, 1), (0, 1), (1, 2)];
    for (row, col) in moves {
        let placement = handle.place_piece(row, col).await.unwrap();
        assert_eq!(placement.pending, None);
    }
    let placement = handle.place_piece(0, 2).await.unwrap();
    assert_eq!(placement.outcome, Outcome::PlayerWin);

    let snapshot = handle.snapshot();
    let mut line = snapshot.winning_line.unwrap();
    line.sort();
    assert_eq!(line, [0, 1, 2]);
    assert_eq!(snapshot.status_line(), "Game over, you've won!");
    assert!(handle.place_piece(2, 2).await.unwrap_err().is_illegal_move());

    ct.cancel();
    worker.await.unwrap().unwrap();
}

#[tokio::test(start_paused = true)]
async fn computer_game_finishes() {
    let (handle, worker, ct) = start_session(SessionSettings {
        starting_side: StartingSide::Player,
        selection: Selection::UniformEmpty,
        ..Default::default()
    });
    let mut snapshots = handle.subscribe();
    let started = handle.start_game(OpponentKind::Computer).await.unwrap();
    assert!(started.is_playing());
    assert_eq!(started.turn, Some(Side::Player));

    let mut moves = 0;
    loop {
        let snapshot = snapshots
            .wait_for(|snapshot| !snapshot.awaiting_opponent)
            .await
            .unwrap()
            .clone();
        if !snapshot.is_playing() {
            break;
        }
        let flat = snapshot.cells.iter().position(Option::is_none).unwrap();
        handle.place_piece(flat / 3, flat % 3).await.unwrap();
        moves += 1;
    }
    let snapshot = handle.snapshot();
    assert!(snapshot.outcome.unwrap().is_finished());
    assert!(moves >= 3);
    assert!(snapshot.placed >= 5);

    ct.cancel();
    worker.await.unwrap().unwrap();
}

#[tokio::test(start_paused = true)]
async fn start_and_reset_are_visible_once_answered() {
    let (handle, worker, ct) = start_session(settings(StartingSide::Opponent));
    assert_eq!(handle.snapshot().outcome, None);

    let started = handle.start_game(OpponentKind::Computer).await.unwrap();
    assert_eq!(started, handle.snapshot());
    assert!(started.is_playing());
    assert!(started.awaiting_opponent);

    let reset = handle.reset().await.unwrap();
    assert_eq!(reset, handle.snapshot());
    assert_eq!(reset.outcome, None);
    assert!(!reset.awaiting_opponent);

    ct.cancel();
    worker.await.unwrap().unwrap();
}

#[tokio::test(start_paused = true)]
async fn opponent_failure_stops_the_worker() {
    let (handle, worker, _ct) = start_session(SessionSettings {
        starting_side: StartingSide::Opponent,
        selection: Selection::RejectionSampling { budget: 0 },
        ..Default::default()
    });
    handle.start_game(OpponentKind::Computer).await.unwrap();

    assert_eq!(
        worker.await.unwrap(),
        Err(SessionError::Opponent(OpponentError::NoLegalMove {
            attempts: 0
        }))
    );
    assert_eq!(
        handle.place_piece(0, 0).await,
        Err(SessionError::WorkerStopped)
    );
    assert_eq!(
        handle.start_game(OpponentKind::Human).await,
        Err(SessionError::WorkerStopped)
    );
    // the last published state is still the game the opponent could not play
    assert!(handle.snapshot().is_playing());
    assert_eq!(handle.snapshot().placed, 0);
}

#[tokio::test]
async fn worker_stops_when_handles_drop() {
    let (handle, worker, _ct) = start_session(settings(StartingSide::Player));
    let subscriber = handle.subscribe();
    drop(handle);
    worker.await.unwrap().unwrap();
    // the last snapshot stays readable
    assert_eq!(subscriber.borrow().outcome, None);
}
