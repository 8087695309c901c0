use std::time::Duration;

use clap::{Parser, ValueEnum};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::game::opponent::DEFAULT_RETRY_BUDGET;
use crate::game::{DiagonalPolicy, Selection};
use crate::session::{OpponentKind, SessionSettings, StartingSide};

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("invalid thinking delay (min: {min_ms}ms, max: {max_ms}ms)")]
    InvalidDelayRange { min_ms: u64, max_ms: u64 },
    #[error("retry budget must be at least 1")]
    ZeroRetryBudget,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum SelectionMode {
    /// Random cell index, retried while occupied.
    #[default]
    Rejection,
    /// Random pick among the empty cells.
    Uniform,
}

/// Terminal tic-tac-toe against a friend or a random computer opponent.
///
/// Every option can also be set through the environment or a `.env` file.
#[derive(Clone, Debug, Parser)]
#[command(name = "tic-tac-toe", version)]
pub struct Config {
    /// Who plays the `o` pieces.
    #[arg(long, env = "TTT_OPPONENT", value_enum, default_value_t = OpponentKind::Computer)]
    pub opponent: OpponentKind,

    /// Who moves first.
    #[arg(long, env = "TTT_FIRST", value_enum, default_value_t = StartingSide::Random)]
    pub first: StartingSide,

    /// Which diagonals are checked after each move.
    #[arg(long, env = "TTT_DIAGONALS", value_enum, default_value_t = DiagonalPolicy::Always)]
    pub diagonals: DiagonalPolicy,

    /// How the computer picks its cell.
    #[arg(long, env = "TTT_SELECTION", value_enum, default_value_t = SelectionMode::Rejection)]
    pub selection: SelectionMode,

    /// Random draws before the computer gives up (rejection mode only).
    #[arg(long, env = "TTT_RETRY_BUDGET", default_value_t = DEFAULT_RETRY_BUDGET)]
    pub retry_budget: usize,

    #[arg(long, env = "TTT_MIN_DELAY_MS", default_value_t = 500)]
    pub min_delay_ms: u64,

    #[arg(long, env = "TTT_MAX_DELAY_MS", default_value_t = 1000)]
    pub max_delay_ms: u64,

    /// Seed for reproducible games.
    #[arg(long, env = "TTT_SEED")]
    pub seed: Option<u64>,

    /// Print state snapshots as JSON lines instead of a drawn board.
    #[arg(long, env = "TTT_JSON")]
    pub json: bool,
}

impl Config {
    /// Loads `.env` (if any) and parses the command line.
    pub fn load() -> Self {
        dotenv::dotenv().ok();
        Self::parse()
    }

    pub fn settings(&self) -> Result<SessionSettings, ConfigError> {
        if self.min_delay_ms > self.max_delay_ms {
            return Err(ConfigError::InvalidDelayRange {
                min_ms: self.min_delay_ms,
                max_ms: self.max_delay_ms,
            });
        }
        let selection = match self.selection {
            SelectionMode::Rejection if self.retry_budget == 0 => {
                return Err(ConfigError::ZeroRetryBudget)
            }
            SelectionMode::Rejection => Selection::RejectionSampling {
                budget: self.retry_budget,
            },
            SelectionMode::Uniform => Selection::UniformEmpty,
        };
        Ok(SessionSettings {
            starting_side: self.first,
            diagonals: self.diagonals,
            selection,
            min_delay: Duration::from_millis(self.min_delay_ms),
            max_delay: Duration::from_millis(self.max_delay_ms),
        })
    }

    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}
