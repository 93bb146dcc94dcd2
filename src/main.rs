//! Goban: a Go rules engine with a heuristic opponent.
//!
//! ## Usage
//!
//! - `goban gtp` - Start a GTP server for GUI integration
//! - `goban validate <log> <x> <y> <color>` - Check a move against a JSON move log
//! - `goban play <log> <x> <y> <color>` - Validate a move and append it to the log
//! - `goban score <log>` - Score the board of a move log
//! - `goban genmove <log> <color>` - Ask the opponent for a move
//! - `goban over <log>` - Report whether the game has ended
//!
//! Results are printed as JSON on stdout; diagnostics go to stderr and are
//! filtered with `RUST_LOG`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use goban::constants::{DEFAULT_KOMI, DEFAULT_SIZE};
use goban::gtp::GtpEngine;
use goban::record::{append_pass, append_placement, append_resign, load_log, save_log};
use goban::rules::{validate_pass, validate_resign};
use goban::{
    Color, MoveRecord, Validation, choose_move_with, compute_score, is_game_over, validate_move,
};

/// Goban: a Go rules engine with a heuristic opponent
#[derive(Parser)]
#[command(name = "goban")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Board size (9, 13 or 19)
    #[arg(long, global = true, default_value_t = DEFAULT_SIZE)]
    size: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the GTP (Go Text Protocol) server for use with GUI applications
    Gtp {
        /// Seed for reproducible move choice
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Check whether a move is legal after the given move log
    Validate {
        log: PathBuf,
        x: i32,
        y: i32,
        color: Side,
    },
    /// Validate a move and append it to the move log file
    ///
    /// A missing log file starts a new game. Use `pass` or `resign` as the
    /// coordinate to record those actions instead.
    Play {
        log: PathBuf,
        #[arg(value_parser = parse_action)]
        action: Action,
        color: Side,
    },
    /// Score the board described by a move log
    Score {
        log: PathBuf,
        #[arg(long, default_value_t = DEFAULT_KOMI)]
        komi: f64,
    },
    /// Choose a move for the given color
    Genmove {
        log: PathBuf,
        color: Side,
        /// Seed for reproducible move choice
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Report whether the game is over
    Over { log: PathBuf },
}

#[derive(Copy, Clone, ValueEnum)]
enum Side {
    Black,
    White,
}

impl From<Side> for Color {
    fn from(side: Side) -> Self {
        match side {
            Side::Black => Color::Black,
            Side::White => Color::White,
        }
    }
}

#[derive(Copy, Clone, Debug)]
enum Action {
    Place(i32, i32),
    Pass,
    Resign,
}

fn parse_action(s: &str) -> Result<Action, String> {
    match s {
        "pass" => Ok(Action::Pass),
        "resign" => Ok(Action::Resign),
        _ => {
            let (x, y) = s
                .split_once(',')
                .ok_or_else(|| format!("expected `x,y`, `pass` or `resign`, got `{s}`"))?;
            let coord = |v: &str| v.trim().parse::<i32>().map_err(|e| format!("`{v}`: {e}"));
            Ok(Action::Place(coord(x)?, coord(y)?))
        }
    }
}

fn read_log(path: &Path) -> Result<Vec<MoveRecord>> {
    load_log(path).with_context(|| format!("reading {}", path.display()))
}

fn rng(seed: Option<u64>) -> fastrand::Rng {
    seed.map_or_else(fastrand::Rng::new, fastrand::Rng::with_seed)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let size = cli.size;

    match cli.command {
        Commands::Gtp { seed } => {
            let mut engine = GtpEngine::with_rng(rng(seed));
            engine.run().context("GTP session failed")?;
        }
        Commands::Validate { log, x, y, color } => {
            let log = read_log(&log)?;
            let validation = Validation::from(validate_move(size, &log, x, y, color.into()));
            println!("{}", serde_json::to_string(&validation)?);
        }
        Commands::Play { log: path, action, color } => {
            let mut log = if path.exists() {
                read_log(&path)?
            } else {
                Vec::new()
            };
            let color = Color::from(color);
            let result = match action {
                Action::Place(x, y) => validate_move(size, &log, x, y, color).inspect(|captures| {
                    append_placement(&mut log, color, x, y, captures);
                }),
                Action::Pass => validate_pass(size, &log, color).map(|()| {
                    append_pass(&mut log, color);
                    Vec::new()
                }),
                Action::Resign => validate_resign(size, &log).map(|()| {
                    append_resign(&mut log, color);
                    Vec::new()
                }),
            };
            let validation = Validation::from(result);
            if validation.legal {
                save_log(&path, &log).with_context(|| format!("writing {}", path.display()))?;
            }
            println!("{}", serde_json::to_string(&validation)?);
        }
        Commands::Score { log, komi } => {
            let log = read_log(&log)?;
            let score = compute_score(size, &log, komi).context("cannot score move log")?;
            println!("{}", serde_json::to_string(&score)?);
        }
        Commands::Genmove { log, color, seed } => {
            let log = read_log(&log)?;
            let mv = choose_move_with(size, &log, color.into(), &mut rng(seed));
            println!("{}", serde_json::to_string(&mv)?);
        }
        Commands::Over { log } => {
            let log = read_log(&log)?;
            println!("{}", is_game_over(&log));
        }
    }
    Ok(())
}
