//! Go Text Protocol (GTP) front end.
//!
//! GTP is a text-based protocol for communicating with Go-playing programs.
//! This module implements the subset of GTP version 2 needed to play a game
//! against the heuristic opponent from a graphical client such as Sabaki or
//! GoGui. The engine keeps nothing but a move log: every command replays it
//! through the same operations any other caller would use.
//!
//! ## Supported Commands
//!
//! - `name`, `version`, `protocol_version`
//! - `list_commands`, `known_command <cmd>`
//! - `quit`
//! - `boardsize <size>` - 9, 13 or 19; clears the board
//! - `clear_board` - Start a new game
//! - `komi <value>` - Set komi used by `final_score`
//! - `play <color> <vertex>` - Play a move (or `pass`)
//! - `genmove <color>` - Generate and play a move for the given color
//! - `final_score` - Territory score of the current board
//! - `showboard` - Print the board
//!
//! GTP lets a client play the same color twice (setup stones, handicap).
//! The move log requires strict alternation, so such a move is preceded by
//! a pass for the side that was due to move.

use std::io::{self, BufRead, Write};

use fastrand::Rng;
use tracing::{debug, info};

use crate::board::Color;
use crate::constants::{DEFAULT_KOMI, DEFAULT_SIZE, SUPPORTED_SIZES};
use crate::oracle::{AiMove, choose_move_with};
use crate::record::{MoveRecord, append_pass, append_placement};
use crate::replay::replay;
use crate::rules::{is_game_over, validate_move};
use crate::score::{Winner, compute_score};

/// The list of known GTP commands.
const KNOWN_COMMANDS: &[&str] = &[
    "boardsize",
    "clear_board",
    "final_score",
    "genmove",
    "known_command",
    "komi",
    "list_commands",
    "name",
    "play",
    "protocol_version",
    "quit",
    "showboard",
    "version",
];

/// Column letters, skipping 'I' (Go convention to avoid confusion with 'J').
const COLUMNS: &[u8] = b"ABCDEFGHJKLMNOPQRST";

/// A parsed GTP vertex.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Vertex {
    Pass,
    Point { x: i32, y: i32 },
}

/// Parse a vertex such as `D4` or `pass` for a board of the given size.
///
/// Row 1 is the bottom line, which is `y = size - 1` in board coordinates.
pub fn parse_vertex(s: &str, size: usize) -> Option<Vertex> {
    if s.eq_ignore_ascii_case("pass") {
        return Some(Vertex::Pass);
    }
    let bytes = s.as_bytes();
    let col_char = bytes.first()?.to_ascii_uppercase();
    let x = COLUMNS.iter().position(|&c| c == col_char)?;
    let row: usize = s.get(1..)?.parse().ok()?;
    if x >= size || row == 0 || row > size {
        return None;
    }
    Some(Vertex::Point {
        x: x as i32,
        y: (size - row) as i32,
    })
}

/// Format board coordinates as a GTP vertex.
pub fn format_vertex(x: usize, y: usize, size: usize) -> String {
    format!("{}{}", COLUMNS[x] as char, size - y)
}

fn parse_color(s: &str) -> Option<Color> {
    match s.to_ascii_lowercase().as_str() {
        "b" | "black" => Some(Color::Black),
        "w" | "white" => Some(Color::White),
        _ => None,
    }
}

/// GTP engine state.
pub struct GtpEngine {
    size: usize,
    komi: f64,
    /// Move log of the current game.
    log: Vec<MoveRecord>,
    rng: Rng,
}

impl Default for GtpEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl GtpEngine {
    /// Create a new GTP engine with an entropy-seeded opponent.
    pub fn new() -> Self {
        Self::with_rng(Rng::new())
    }

    /// Create a new GTP engine whose move choices follow the given generator.
    pub fn with_rng(rng: Rng) -> Self {
        Self {
            size: DEFAULT_SIZE,
            komi: DEFAULT_KOMI,
            log: Vec::new(),
            rng,
        }
    }

    /// Move log of the game in progress.
    pub fn log(&self) -> &[MoveRecord] {
        &self.log
    }

    /// Run the GTP command loop, reading from stdin and writing to stdout.
    pub fn run(&mut self) -> io::Result<()> {
        let stdin = io::stdin();
        let mut stdout = io::stdout();

        for line in stdin.lock().lines() {
            let line = line?;

            // Skip empty lines and comments
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (id, command_line) = Self::parse_id(line);
            let parts: Vec<&str> = command_line.split_whitespace().collect();
            let Some((command, args)) = parts.split_first() else {
                continue;
            };
            let command = command.to_lowercase();
            debug!(%command, ?args, "gtp command");

            let (success, message) = self.execute(&command, args);
            let prefix = if success { '=' } else { '?' };
            let id_str = id.map(|i| i.to_string()).unwrap_or_default();

            write!(stdout, "{prefix}{id_str} {message}\n\n")?;
            stdout.flush()?;

            if command == "quit" {
                break;
            }
        }
        Ok(())
    }

    /// Parse an optional numeric command ID from the beginning of the line.
    fn parse_id(line: &str) -> (Option<u32>, &str) {
        let trimmed = line.trim();
        let end = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(trimmed.len());
        if end > 0 {
            if let Ok(id) = trimmed[..end].parse::<u32>() {
                return (Some(id), trimmed[end..].trim());
            }
        }
        (None, trimmed)
    }

    /// Execute a GTP command and return (success, response).
    fn execute(&mut self, command: &str, args: &[&str]) -> (bool, String) {
        match command {
            "name" => (true, env!("CARGO_PKG_NAME").to_string()),

            "version" => (true, env!("CARGO_PKG_VERSION").to_string()),

            "protocol_version" => (true, "2".to_string()),

            "list_commands" => (true, KNOWN_COMMANDS.join("\n")),

            "known_command" => {
                let Some(arg) = args.first() else {
                    return (false, "missing argument".to_string());
                };
                let known = KNOWN_COMMANDS.contains(&arg.to_lowercase().as_str());
                (true, known.to_string())
            }

            "quit" => (true, String::new()),

            "boardsize" => {
                let Some(arg) = args.first() else {
                    return (false, "missing argument".to_string());
                };
                match arg.parse::<usize>() {
                    Ok(size) if SUPPORTED_SIZES.contains(&size) => {
                        self.size = size;
                        self.log.clear();
                        info!(size, "new board");
                        (true, String::new())
                    }
                    Ok(_) => (false, "unacceptable size".to_string()),
                    Err(_) => (false, "invalid size".to_string()),
                }
            }

            "clear_board" => {
                self.log.clear();
                (true, String::new())
            }

            "komi" => {
                let Some(arg) = args.first() else {
                    return (false, "missing argument".to_string());
                };
                match arg.parse::<f64>() {
                    Ok(komi) => {
                        self.komi = komi;
                        (true, String::new())
                    }
                    Err(_) => (false, "invalid komi".to_string()),
                }
            }

            "play" => {
                let [color, vertex, ..] = args else {
                    return (false, "missing arguments".to_string());
                };
                let Some(color) = parse_color(color) else {
                    return (false, "invalid color".to_string());
                };
                let Some(vertex) = parse_vertex(vertex, self.size) else {
                    return (false, "invalid vertex".to_string());
                };
                match self.play(color, vertex) {
                    Ok(()) => (true, String::new()),
                    Err(msg) => (false, msg),
                }
            }

            "genmove" => {
                let Some(color) = args.first().and_then(|c| parse_color(c)) else {
                    return (false, "invalid color".to_string());
                };
                if is_game_over(&self.log) {
                    return (true, "pass".to_string());
                }
                let len = self.log.len();
                if let Err(msg) = self.align_turn(color) {
                    return (false, msg);
                }
                let mv = choose_move_with(self.size, &self.log, color, &mut self.rng);
                let vertex = match mv {
                    AiMove::Pass => Vertex::Pass,
                    AiMove::Place { x, y } => Vertex::Point {
                        x: x as i32,
                        y: y as i32,
                    },
                };
                match self.play(color, vertex) {
                    Ok(()) => match mv {
                        AiMove::Pass => (true, "pass".to_string()),
                        AiMove::Place { x, y } => (true, format_vertex(x, y, self.size)),
                    },
                    Err(msg) => {
                        self.log.truncate(len);
                        (false, msg)
                    }
                }
            }

            "final_score" => match compute_score(self.size, &self.log, self.komi) {
                Ok(score) => {
                    let margin = (score.black.total - score.white.total).abs();
                    let result = match score.winner {
                        Winner::Black => format!("B+{margin:.1}"),
                        Winner::White => format!("W+{margin:.1}"),
                        Winner::Tie => "0".to_string(),
                    };
                    (true, result)
                }
                Err(err) => (false, err.to_string()),
            },

            "showboard" => match replay(self.size, &self.log) {
                Ok(pos) => (true, format!("\n{}", pos.board)),
                Err(err) => (false, err.to_string()),
            },

            _ => (false, format!("unknown command: {command}")),
        }
    }

    /// Record a pass for the side to move when `color` is out of turn.
    fn align_turn(&mut self, color: Color) -> Result<(), String> {
        if is_game_over(&self.log) {
            return Err("game is already over".to_string());
        }
        let pos = replay(self.size, &self.log).map_err(|e| e.to_string())?;
        if pos.to_move != color {
            append_pass(&mut self.log, pos.to_move);
        }
        Ok(())
    }

    /// Validate a move and append it to the log. A rejected move leaves the
    /// log as it was.
    fn play(&mut self, color: Color, vertex: Vertex) -> Result<(), String> {
        let len = self.log.len();
        let result = self.append_move(color, vertex);
        if result.is_err() {
            self.log.truncate(len);
        }
        result
    }

    fn append_move(&mut self, color: Color, vertex: Vertex) -> Result<(), String> {
        self.align_turn(color)?;
        match vertex {
            Vertex::Pass => {
                append_pass(&mut self.log, color);
            }
            Vertex::Point { x, y } => {
                let captures =
                    validate_move(self.size, &self.log, x, y, color).map_err(|e| e.to_string())?;
                append_placement(&mut self.log, color, x, y, &captures);
            }
        }
        Ok(())
    }
}
