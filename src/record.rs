//! Move log records.
//!
//! The move log is the only source of truth for a game. It is append-only:
//! a placement that removes N stones is followed by N `captured` records,
//! each naming the coordinate and original color of a removed stone.
//! Pass and resign records carry the sentinel coordinate `(-1, -1)`.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::board::Color;
use crate::constants::PASS_COORD;

/// What a record does to the game.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "lowercase")]
pub enum MoveKind {
    #[display("place")]
    Place,
    #[display("pass")]
    Pass,
    #[display("resign")]
    Resign,
    #[display("captured")]
    Captured,
}

/// One immutable entry of the move log.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MoveRecord {
    /// Position in the log, starting at 1 and increasing by one.
    pub sequence: u32,
    /// Mover's color, or the removed stone's color for `captured`.
    pub color: Color,
    pub x: i32,
    pub y: i32,
    pub kind: MoveKind,
    pub timestamp: DateTime<Utc>,
}

impl MoveRecord {
    pub fn place(sequence: u32, color: Color, x: i32, y: i32) -> Self {
        Self::new(sequence, color, x, y, MoveKind::Place)
    }

    pub fn pass(sequence: u32, color: Color) -> Self {
        Self::new(sequence, color, PASS_COORD, PASS_COORD, MoveKind::Pass)
    }

    pub fn resign(sequence: u32, color: Color) -> Self {
        Self::new(sequence, color, PASS_COORD, PASS_COORD, MoveKind::Resign)
    }

    /// Marks the stone of `color` at `(x, y)` as removed.
    pub fn captured(sequence: u32, color: Color, x: i32, y: i32) -> Self {
        Self::new(sequence, color, x, y, MoveKind::Captured)
    }

    fn new(sequence: u32, color: Color, x: i32, y: i32, kind: MoveKind) -> Self {
        Self {
            sequence,
            color,
            x,
            y,
            kind,
            timestamp: Utc::now(),
        }
    }
}

/// Sequence number the next record must carry.
pub fn next_sequence(log: &[MoveRecord]) -> u32 {
    log.last().map_or(1, |r| r.sequence + 1)
}

/// Append a validated placement and one `captured` record per removed stone.
pub fn append_placement(
    log: &mut Vec<MoveRecord>,
    color: Color,
    x: i32,
    y: i32,
    captures: &[(usize, usize)],
) {
    let seq = next_sequence(log);
    log.push(MoveRecord::place(seq, color, x, y));
    let opp = color.opponent();
    for (i, &(cx, cy)) in captures.iter().enumerate() {
        log.push(MoveRecord::captured(seq + 1 + i as u32, opp, cx as i32, cy as i32));
    }
}

pub fn append_pass(log: &mut Vec<MoveRecord>, color: Color) {
    let seq = next_sequence(log);
    log.push(MoveRecord::pass(seq, color));
}

pub fn append_resign(log: &mut Vec<MoveRecord>, color: Color) {
    let seq = next_sequence(log);
    log.push(MoveRecord::resign(seq, color));
}

/// Read a move log stored as a JSON array.
pub fn load_log(path: &Path) -> Result<Vec<MoveRecord>, LogFileError> {
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

/// Write a move log as a pretty-printed JSON array.
pub fn save_log(path: &Path, log: &[MoveRecord]) -> Result<(), LogFileError> {
    let text = serde_json::to_string_pretty(log)?;
    std::fs::write(path, text)?;
    Ok(())
}

/// Failure to read or write a move log file.
#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum LogFileError {
    #[display("move log I/O error: {_0}")]
    Io(std::io::Error),
    #[display("move log is not valid JSON: {_0}")]
    Json(serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_placement_records_captures() {
        let mut log = Vec::new();
        append_placement(&mut log, Color::Black, 4, 4, &[]);
        append_placement(&mut log, Color::White, 3, 4, &[(4, 4), (5, 5)]);

        assert_eq!(log.len(), 4);
        assert_eq!(log[1].kind, MoveKind::Place);
        assert_eq!(log[2].kind, MoveKind::Captured);
        assert_eq!(log[2].color, Color::Black);
        assert_eq!((log[3].x, log[3].y), (5, 5));
        let seqs: Vec<u32> = log.iter().map(|r| r.sequence).collect();
        assert_eq!(seqs, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_pass_uses_sentinel() {
        let mut log = Vec::new();
        append_pass(&mut log, Color::Black);
        append_resign(&mut log, Color::White);
        assert_eq!((log[0].x, log[0].y), (PASS_COORD, PASS_COORD));
        assert_eq!(log[1].kind, MoveKind::Resign);
        assert_eq!(next_sequence(&log), 3);
    }

    #[test]
    fn test_json_shape() {
        let record = MoveRecord::pass(7, Color::White);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["kind"], "pass");
        assert_eq!(json["color"], "white");
        assert_eq!(json["x"], -1);

        let back: MoveRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_log_file_keeps_records() {
        let path = std::env::temp_dir().join(format!("goban-log-{}.json", std::process::id()));
        let mut log = Vec::new();
        append_placement(&mut log, Color::Black, 2, 6, &[]);
        append_pass(&mut log, Color::White);

        save_log(&path, &log).unwrap();
        let loaded = load_log(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(loaded, log);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let path = std::env::temp_dir().join("goban-no-such-log.json");
        assert!(matches!(load_log(&path), Err(LogFileError::Io(_))));
    }
}
