//! Board reconstruction from the move log.
//!
//! A [`Position`] is never stored: it is derived by replaying the log from
//! the first record every time a caller needs one. Each placement resolves
//! its own captures, and the `captured` records that follow it must list
//! exactly the stones it removed. Logs that could not have been produced by
//! legal play are refused.

use tracing::{instrument, warn};

use crate::board::{Board, Color, Point};
use crate::constants::SUPPORTED_SIZES;
use crate::record::{MoveKind, MoveRecord};

/// A move log that no legal game could have produced.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ReplayError {
    #[display("unsupported board size {_0}")]
    BoardSize(#[error(not(source))] usize),
    #[display("record {found} out of order, expected sequence {expected}")]
    SequenceGap { expected: u32, found: u32 },
    #[display("record {_0} places a stone off the board")]
    OffBoard(#[error(not(source))] u32),
    #[display("record {_0} places a stone on an occupied point")]
    Occupied(#[error(not(source))] u32),
    #[display("record {_0} captures a stone its placement did not remove")]
    NothingCaptured(#[error(not(source))] u32),
    #[display("record {_0} is missing captured records for the stones it removed")]
    MissingCapture(#[error(not(source))] u32),
    #[display("record {_0} leaves its own group without liberties")]
    Suicide(#[error(not(source))] u32),
    #[display("record {_0} is a capture without a preceding placement")]
    StrayCapture(#[error(not(source))] u32),
    #[display("record {_0} is played out of turn")]
    OutOfTurn(#[error(not(source))] u32),
    #[display("record {_0} continues a finished game")]
    AfterEnd(#[error(not(source))] u32),
}

impl ReplayError {
    /// Reason code reported to callers.
    pub fn code(&self) -> &'static str {
        match self {
            ReplayError::BoardSize(_) => "invalid-board-size",
            _ => "corrupt-log",
        }
    }
}

/// The game action that most recently advanced the turn.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LastAction {
    None,
    Place,
    Pass,
}

/// Board state derived from a move log, plus what the rules need to judge
/// the next move.
#[derive(Clone, Debug)]
pub struct Position {
    pub board: Board,
    /// Color whose turn it is.
    pub to_move: Color,
    /// Placement records replayed so far.
    pub stones_placed: usize,
    /// Trailing run of passes.
    pub passes: u32,
    pub resigned: Option<Color>,
    pub last_action: LastAction,
    /// Board before the last placement.
    before_last: Option<Board>,
    /// Stones removed by the last placement.
    last_captures: u32,
    /// Removed stones still waiting for their `captured` record, and the
    /// sequence number of the placement that removed them.
    pending: Vec<Point>,
    pending_from: u32,
    /// Stones captured by black and white respectively.
    pub captures: [u32; 2],
}

impl Position {
    /// An empty board of the given size, black to move.
    pub fn new(size: usize) -> Result<Self, ReplayError> {
        if !SUPPORTED_SIZES.contains(&size) {
            return Err(ReplayError::BoardSize(size));
        }
        Ok(Self {
            board: Board::new(size),
            to_move: Color::Black,
            stones_placed: 0,
            passes: 0,
            resigned: None,
            last_action: LastAction::None,
            before_last: None,
            last_captures: 0,
            pending: Vec::new(),
            pending_from: 0,
            captures: [0, 0],
        })
    }

    /// Two consecutive passes or a resignation end the game.
    pub fn is_over(&self) -> bool {
        self.passes >= 2 || self.resigned.is_some()
    }

    /// Board a ko recapture must not recreate: the board before the last
    /// move, when that move was a placement capturing exactly one stone.
    pub fn ko_board(&self) -> Option<&Board> {
        if self.last_action == LastAction::Place && self.last_captures == 1 {
            self.before_last.as_ref()
        } else {
            None
        }
    }

    /// Stones captured by `color`.
    pub fn captures_by(&self, color: Color) -> u32 {
        self.captures[color_index(color)]
    }

    /// Apply one record on top of this position.
    pub fn apply(&mut self, record: &MoveRecord) -> Result<(), ReplayError> {
        let seq = record.sequence;
        if record.kind != MoveKind::Captured {
            self.ensure_settled()?;
        }
        match record.kind {
            MoveKind::Place => {
                self.ensure_turn(record)?;
                let pt = self
                    .board
                    .point(record.x, record.y)
                    .ok_or(ReplayError::OffBoard(seq))?;
                if self.board.get(pt).is_some() {
                    return Err(ReplayError::Occupied(seq));
                }
                let before = self.board.clone();
                let removed = self.board.place(pt, record.color);
                if removed.is_empty() && self.board.liberties(pt) == 0 {
                    self.board.undo(pt, record.color, &removed);
                    return Err(ReplayError::Suicide(seq));
                }
                self.before_last = Some(before);
                self.pending = removed;
                self.pending_from = seq;
                self.stones_placed += 1;
                self.passes = 0;
                self.last_action = LastAction::Place;
                self.last_captures = 0;
                self.to_move = record.color.opponent();
            }
            MoveKind::Captured => {
                if self.last_action != LastAction::Place || self.resigned.is_some() {
                    return Err(ReplayError::StrayCapture(seq));
                }
                let pt = self
                    .board
                    .point(record.x, record.y)
                    .ok_or(ReplayError::NothingCaptured(seq))?;
                // Only the victim of the placement, now to move, can lose stones.
                let idx = self
                    .pending
                    .iter()
                    .position(|&p| p == pt)
                    .filter(|_| record.color == self.to_move)
                    .ok_or(ReplayError::NothingCaptured(seq))?;
                self.pending.swap_remove(idx);
                self.captures[color_index(record.color.opponent())] += 1;
                self.last_captures += 1;
            }
            MoveKind::Pass => {
                self.ensure_turn(record)?;
                self.passes += 1;
                self.last_action = LastAction::Pass;
                self.to_move = record.color.opponent();
            }
            MoveKind::Resign => {
                if self.is_over() {
                    return Err(ReplayError::AfterEnd(seq));
                }
                self.resigned = Some(record.color);
            }
        }
        Ok(())
    }

    /// Fails if the last placement removed stones the log never recorded.
    fn ensure_settled(&self) -> Result<(), ReplayError> {
        if self.pending.is_empty() {
            Ok(())
        } else {
            Err(ReplayError::MissingCapture(self.pending_from))
        }
    }

    fn ensure_turn(&self, record: &MoveRecord) -> Result<(), ReplayError> {
        if self.is_over() {
            return Err(ReplayError::AfterEnd(record.sequence));
        }
        if record.color != self.to_move {
            return Err(ReplayError::OutOfTurn(record.sequence));
        }
        Ok(())
    }
}

fn color_index(color: Color) -> usize {
    match color {
        Color::Black => 0,
        Color::White => 1,
    }
}

/// Replay a move log into the position it describes.
///
/// Sequence numbers must start at 1 and increase by one.
#[instrument(skip(log), fields(records = log.len()))]
pub fn replay(size: usize, log: &[MoveRecord]) -> Result<Position, ReplayError> {
    let mut pos = Position::new(size)?;
    let mut expected = 1;
    for record in log {
        if record.sequence != expected {
            let err = ReplayError::SequenceGap {
                expected,
                found: record.sequence,
            };
            warn!(%err, "rejecting move log");
            return Err(err);
        }
        expected += 1;
        if let Err(err) = pos.apply(record) {
            warn!(%err, "rejecting move log");
            return Err(err);
        }
    }
    if let Err(err) = pos.ensure_settled() {
        warn!(%err, "rejecting move log");
        return Err(err);
    }
    Ok(pos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{append_pass, append_placement, append_resign};

    #[test]
    fn test_empty_log() {
        let pos = replay(9, &[]).unwrap();
        assert_eq!(pos.to_move, Color::Black);
        assert_eq!(pos.stones_placed, 0);
        assert!(!pos.is_over());
        assert!(pos.ko_board().is_none());
    }

    #[test]
    fn test_unsupported_size() {
        let err = replay(10, &[]).unwrap_err();
        assert_eq!(err, ReplayError::BoardSize(10));
        assert_eq!(err.code(), "invalid-board-size");
    }

    #[test]
    fn test_captured_record_clears_point() {
        let mut log = Vec::new();
        append_placement(&mut log, Color::Black, 4, 4, &[]);
        append_placement(&mut log, Color::White, 3, 4, &[]);
        append_pass(&mut log, Color::Black);
        append_placement(&mut log, Color::White, 5, 4, &[]);
        append_pass(&mut log, Color::Black);
        append_placement(&mut log, Color::White, 4, 3, &[]);
        append_pass(&mut log, Color::Black);
        append_placement(&mut log, Color::White, 4, 5, &[(4, 4)]);

        let pos = replay(9, &log).unwrap();
        assert_eq!(pos.board.get(40), None);
        assert_eq!(pos.captures_by(Color::White), 1);
        assert_eq!(pos.captures_by(Color::Black), 0);
        assert_eq!(pos.to_move, Color::Black);
        assert!(pos.ko_board().is_some());
    }

    #[test]
    fn test_replay_is_deterministic() {
        let mut log = Vec::new();
        append_placement(&mut log, Color::Black, 2, 2, &[]);
        append_placement(&mut log, Color::White, 6, 6, &[]);
        append_placement(&mut log, Color::Black, 2, 6, &[]);
        let a = replay(9, &log).unwrap();
        let b = replay(9, &log).unwrap();
        assert_eq!(a.board, b.board);
        assert_eq!(a.to_move, b.to_move);
    }

    #[test]
    fn test_sequence_gap_is_corrupt() {
        let mut log = Vec::new();
        append_placement(&mut log, Color::Black, 2, 2, &[]);
        append_placement(&mut log, Color::White, 6, 6, &[]);
        log[1].sequence = 3;
        let err = replay(9, &log).unwrap_err();
        assert_eq!(err, ReplayError::SequenceGap { expected: 2, found: 3 });
        assert_eq!(err.code(), "corrupt-log");
    }

    #[test]
    fn test_double_occupancy_is_corrupt() {
        let mut log = Vec::new();
        append_placement(&mut log, Color::Black, 2, 2, &[]);
        append_placement(&mut log, Color::White, 2, 2, &[]);
        assert_eq!(replay(9, &log).unwrap_err(), ReplayError::Occupied(2));
    }

    #[test]
    fn test_capture_of_missing_stone_is_corrupt() {
        let mut log = Vec::new();
        append_placement(&mut log, Color::Black, 2, 2, &[(5, 5)]);
        assert_eq!(replay(9, &log).unwrap_err(), ReplayError::NothingCaptured(2));

        let mut log = Vec::new();
        append_pass(&mut log, Color::Black);
        log.push(MoveRecord::captured(2, Color::White, 0, 0));
        assert_eq!(replay(9, &log).unwrap_err(), ReplayError::StrayCapture(2));
    }

    #[test]
    fn test_out_of_turn_is_corrupt() {
        let mut log = Vec::new();
        append_placement(&mut log, Color::Black, 2, 2, &[]);
        append_placement(&mut log, Color::Black, 3, 3, &[]);
        assert_eq!(replay(9, &log).unwrap_err(), ReplayError::OutOfTurn(2));
    }

    #[test]
    fn test_play_after_resign_is_corrupt() {
        let mut log = Vec::new();
        append_placement(&mut log, Color::Black, 2, 2, &[]);
        append_resign(&mut log, Color::White);
        append_placement(&mut log, Color::White, 3, 3, &[]);
        assert_eq!(replay(9, &log).unwrap_err(), ReplayError::AfterEnd(3));
    }

    #[test]
    fn test_pass_clears_ko_snapshot() {
        let mut log = Vec::new();
        append_placement(&mut log, Color::Black, 2, 2, &[]);
        append_pass(&mut log, Color::White);
        let pos = replay(9, &log).unwrap();
        assert_eq!(pos.passes, 1);
        assert_eq!(pos.last_action, LastAction::Pass);
        assert!(pos.ko_board().is_none());
    }

    #[test]
    fn test_unrecorded_capture_is_corrupt() {
        // White (0,0) loses its last liberty to black (0,1) but the log
        // never removes it.
        let mut log = Vec::new();
        append_placement(&mut log, Color::Black, 1, 0, &[]);
        append_placement(&mut log, Color::White, 0, 0, &[]);
        append_placement(&mut log, Color::Black, 0, 1, &[]);
        let err = replay(9, &log).unwrap_err();
        assert_eq!(err, ReplayError::MissingCapture(3));
        assert_eq!(err.code(), "corrupt-log");

        // Later records do not hide the omission.
        append_pass(&mut log, Color::White);
        assert_eq!(replay(9, &log).unwrap_err(), ReplayError::MissingCapture(3));
    }

    #[test]
    fn test_capture_of_live_stone_is_corrupt() {
        let mut log = Vec::new();
        append_placement(&mut log, Color::Black, 4, 4, &[]);
        append_placement(&mut log, Color::White, 8, 8, &[]);
        log.push(MoveRecord::captured(3, Color::Black, 4, 4));
        assert_eq!(replay(9, &log).unwrap_err(), ReplayError::NothingCaptured(3));
    }

    #[test]
    fn test_partial_capture_is_corrupt() {
        // Black (1,0) removes both white stones but only one is recorded.
        let mut log = Vec::new();
        append_placement(&mut log, Color::Black, 0, 1, &[]);
        append_placement(&mut log, Color::White, 0, 0, &[]);
        append_placement(&mut log, Color::Black, 2, 0, &[]);
        append_placement(&mut log, Color::White, 1, 0, &[]);
        append_placement(&mut log, Color::Black, 1, 1, &[(0, 0)]);
        assert_eq!(replay(9, &log).unwrap_err(), ReplayError::MissingCapture(5));
    }

    #[test]
    fn test_suicide_placement_is_corrupt() {
        let mut log = Vec::new();
        append_placement(&mut log, Color::Black, 1, 0, &[]);
        append_placement(&mut log, Color::White, 8, 8, &[]);
        append_placement(&mut log, Color::Black, 0, 1, &[]);
        append_placement(&mut log, Color::White, 0, 0, &[]);
        let err = replay(9, &log).unwrap_err();
        assert_eq!(err, ReplayError::Suicide(4));
        assert_eq!(err.code(), "corrupt-log");
    }
}
