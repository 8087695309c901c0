use std::error::Error;
use std::future::IntoFuture;
use std::str::FromStr;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use tic_tac_toe::config::Config;
use tic_tac_toe::session::{
    self, GameSession, OpponentKind, SessionError, SessionHandle, SessionWorker, Snapshot,
};

#[derive(Debug, PartialEq)]
enum Input {
    Place { row: usize, col: usize },
    Start,
    Reset,
    Quit,
}

impl FromStr for Input {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let words: Vec<_> = s.split_whitespace().collect();
        match words.as_slice() {
            ["start"] => Ok(Self::Start),
            ["reset"] => Ok(Self::Reset),
            ["quit"] | ["q"] => Ok(Self::Quit),
            [row, col] => {
                let row = row.parse().map_err(|_| format!("bad row: {}", row))?;
                let col = col.parse().map_err(|_| format!("bad column: {}", col))?;
                Ok(Self::Place { row, col })
            }
            _ => Err(format!("unknown command: {}", s.trim())),
        }
    }
}

async fn render(mut snapshots: watch::Receiver<Snapshot>, json: bool) {
    loop {
        {
            let snapshot = snapshots.borrow_and_update();
            if json {
                match serde_json::to_string(&*snapshot) {
                    Ok(line) => println!("{}", line),
                    Err(err) => debug!(%err, "failed to encode snapshot"),
                }
            } else {
                println!("{}\n", *snapshot);
            }
        }
        if snapshots.changed().await.is_err() {
            break;
        }
    }
}

/// Feeds `input` lines to the session until `quit`, end of input, or the
/// worker stopping on its own. Returns the worker's error if it failed.
async fn drive<In>(
    handle: SessionHandle,
    worker: SessionWorker,
    input: In,
    opponent: OpponentKind,
    ct: CancellationToken,
) -> Result<(), Box<dyn Error>>
where
    In: AsyncBufRead + Unpin,
{
    let mut worker = worker.into_future();
    let mut finished = None;
    let mut lines = input.lines();
    loop {
        let line = tokio::select! {
            result = &mut worker => {
                finished = Some(result);
                break;
            }
            line = lines.next_line() => line?,
        };
        let Some(line) = line else { break };
        if line.trim().is_empty() {
            continue;
        }
        let input = match line.parse::<Input>() {
            Ok(input) => input,
            Err(err) => {
                eprintln!("{} (expected `ROW COL`, `start`, `reset` or `quit`)", err);
                continue;
            }
        };
        let result = match input {
            Input::Place { row, col } => handle.place_piece(row, col).await.map(|_| ()),
            Input::Start => handle.start_game(opponent).await.map(|_| ()),
            Input::Reset => handle.reset().await.map(|_| ()),
            Input::Quit => break,
        };
        match result {
            Ok(()) => {}
            // rejected moves are ignored, the board just doesn't change
            Err(err) if err.is_illegal_move() => debug!(%err, "move ignored"),
            Err(SessionError::WorkerStopped) => break,
            Err(err) => return Err(err.into()),
        }
    }

    ct.cancel();
    drop(handle);
    let result = match finished {
        Some(result) => result,
        None => worker.await,
    };
    result??;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = Config::load();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let settings = config.settings()?;
    info!(opponent = ?config.opponent, ?settings, "starting session");

    let ct = CancellationToken::new();
    let (handle, worker) = session::spawn(GameSession::new(settings, config.rng()), ct.clone());
    let renderer = tokio::spawn(render(handle.subscribe(), config.json));
    handle.start_game(config.opponent).await?;

    let stdin = BufReader::new(tokio::io::stdin());
    let result = drive(handle, worker, stdin, config.opponent, ct).await;
    renderer.await?;
    result
}
