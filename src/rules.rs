//! Move legality: turn order, occupancy, captures, suicide and ko.
//!
//! Captures are resolved before suicide is judged, so a move with no
//! liberties of its own is legal when it takes the last liberty of an
//! adjacent enemy group.

use serde::Serialize;
use tracing::{debug, instrument};

use crate::board::{Board, Color, Point};
use crate::record::{MoveKind, MoveRecord};
use crate::replay::{Position, ReplayError, replay};

/// Why a move was rejected.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum MoveError {
    #[display("Illegal move: not your turn")]
    NotYourTurn,
    #[display("Illegal move: game is already over")]
    GameOver,
    #[display("Illegal move: point is off the board")]
    OutOfBounds,
    #[display("Illegal move: point not empty")]
    Occupied,
    #[display("Illegal move: suicide")]
    Suicide,
    #[display("Illegal move: retakes ko")]
    Ko,
    #[display("Corrupt move log: {_0}")]
    #[from]
    Replay(ReplayError),
}

impl MoveError {
    /// Reason code reported to callers.
    pub fn code(&self) -> &'static str {
        match self {
            MoveError::NotYourTurn => "not-your-turn",
            MoveError::GameOver => "game-over",
            MoveError::OutOfBounds => "out-of-bounds",
            MoveError::Occupied => "occupied",
            MoveError::Suicide => "suicide",
            MoveError::Ko => "ko-violation",
            MoveError::Replay(err) => err.code(),
        }
    }
}

/// Outcome of a legality check in record form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Validation {
    pub legal: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
    pub captures: Vec<(usize, usize)>,
}

impl From<Result<Vec<(usize, usize)>, MoveError>> for Validation {
    fn from(result: Result<Vec<(usize, usize)>, MoveError>) -> Self {
        match result {
            Ok(captures) => Self {
                legal: true,
                reason: None,
                captures,
            },
            Err(err) => Self {
                legal: false,
                reason: Some(err.code()),
                captures: Vec::new(),
            },
        }
    }
}

/// Place a stone, resolve captures, and reject suicide and ko.
///
/// On success the stone stays on the board and the removed points are
/// returned; undo with [`Board::undo`]. On failure the board is unchanged.
pub fn try_place(
    board: &mut Board,
    pt: Point,
    color: Color,
    ko: Option<&Board>,
) -> Result<Vec<Point>, MoveError> {
    if board.get(pt).is_some() {
        return Err(MoveError::Occupied);
    }
    let captured = board.place(pt, color);
    if captured.is_empty() && board.liberties(pt) == 0 {
        board.undo(pt, color, &captured);
        return Err(MoveError::Suicide);
    }
    // Only a single-stone capture can recreate the earlier board.
    if captured.len() == 1 && ko.is_some_and(|prev| prev == board) {
        board.undo(pt, color, &captured);
        return Err(MoveError::Ko);
    }
    Ok(captured)
}

impl Position {
    /// Check a move for `color` at `(x, y)` without changing the position.
    ///
    /// Returns the points the move would capture.
    pub fn check(&mut self, x: i32, y: i32, color: Color) -> Result<Vec<Point>, MoveError> {
        if self.to_move != color {
            return Err(MoveError::NotYourTurn);
        }
        if self.is_over() {
            return Err(MoveError::GameOver);
        }
        let pt = self.board.point(x, y).ok_or(MoveError::OutOfBounds)?;
        let ko = self.ko_board().cloned();
        let captured = try_place(&mut self.board, pt, color, ko.as_ref())?;
        self.board.undo(pt, color, &captured);
        Ok(captured)
    }
}

/// Decide whether `color` may play at `(x, y)` after the given log.
///
/// Returns the `(x, y)` of every stone the move would capture.
#[instrument(skip(log), fields(records = log.len()))]
pub fn validate_move(
    size: usize,
    log: &[MoveRecord],
    x: i32,
    y: i32,
    color: Color,
) -> Result<Vec<(usize, usize)>, MoveError> {
    let mut pos = replay(size, log)?;
    let result = pos.check(x, y, color);
    match &result {
        Ok(captured) => debug!(captures = captured.len(), "legal move"),
        Err(err) => debug!(reason = err.code(), "illegal move"),
    }
    let captured = result?;
    Ok(captured.into_iter().map(|p| pos.board.coords(p)).collect())
}

/// Decide whether `color` may pass after the given log.
pub fn validate_pass(size: usize, log: &[MoveRecord], color: Color) -> Result<(), MoveError> {
    let pos = replay(size, log)?;
    if pos.to_move != color {
        return Err(MoveError::NotYourTurn);
    }
    if pos.is_over() {
        return Err(MoveError::GameOver);
    }
    Ok(())
}

/// Decide whether a resignation may be recorded. Either side may resign
/// at any time until the game is over.
pub fn validate_resign(size: usize, log: &[MoveRecord]) -> Result<(), MoveError> {
    if replay(size, log)?.is_over() {
        return Err(MoveError::GameOver);
    }
    Ok(())
}

/// True iff the last two non-capture records are passes or the last is a resignation.
pub fn is_game_over(log: &[MoveRecord]) -> bool {
    let mut recent = log.iter().rev().filter(|r| r.kind != MoveKind::Captured);
    match (recent.next().map(|r| r.kind), recent.next().map(|r| r.kind)) {
        (Some(MoveKind::Resign), _) => true,
        (Some(MoveKind::Pass), Some(MoveKind::Pass)) => true,
        _ => false,
    }
}

/// Color whose turn it is after the given log.
pub fn current_player(size: usize, log: &[MoveRecord]) -> Result<Color, ReplayError> {
    Ok(replay(size, log)?.to_move)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{append_pass, append_placement, append_resign};

    /// Play moves through the rule engine, appending records as a caller would.
    fn play(log: &mut Vec<MoveRecord>, x: i32, y: i32) -> Result<Vec<(usize, usize)>, MoveError> {
        let color = current_player(9, log).unwrap();
        let captures = validate_move(9, log, x, y, color)?;
        append_placement(log, color, x, y, &captures);
        Ok(captures)
    }

    #[test]
    fn test_basic_move_is_legal() {
        let log: Vec<MoveRecord> = Vec::new();
        assert_eq!(validate_move(9, &log, 4, 4, Color::Black), Ok(vec![]));
    }

    #[test]
    fn test_not_your_turn() {
        let log: Vec<MoveRecord> = Vec::new();
        assert_eq!(
            validate_move(9, &log, 4, 4, Color::White),
            Err(MoveError::NotYourTurn)
        );
    }

    #[test]
    fn test_turn_checked_before_game_over() {
        let mut log = Vec::new();
        append_pass(&mut log, Color::Black);
        append_pass(&mut log, Color::White);
        assert_eq!(
            validate_move(9, &log, 4, 4, Color::White),
            Err(MoveError::NotYourTurn)
        );
        assert_eq!(
            validate_move(9, &log, 4, 4, Color::Black),
            Err(MoveError::GameOver)
        );
    }

    #[test]
    fn test_out_of_bounds_and_occupied() {
        let mut log = Vec::new();
        play(&mut log, 4, 4).unwrap();
        assert_eq!(
            validate_move(9, &log, 9, 0, Color::White),
            Err(MoveError::OutOfBounds)
        );
        assert_eq!(
            validate_move(9, &log, -1, -1, Color::White),
            Err(MoveError::OutOfBounds)
        );
        assert_eq!(
            validate_move(9, &log, 4, 4, Color::White),
            Err(MoveError::Occupied)
        );
    }

    #[test]
    fn test_suicide_in_corner() {
        let mut log = Vec::new();
        play(&mut log, 1, 0).unwrap(); // B
        play(&mut log, 8, 8).unwrap(); // W
        play(&mut log, 0, 1).unwrap(); // B
        let err = validate_move(9, &log, 0, 0, Color::White).unwrap_err();
        assert_eq!(err, MoveError::Suicide);
        assert_eq!(err.code(), "suicide");
    }

    #[test]
    fn test_capture_before_suicide() {
        // White stone at (0,0) held by black at (1,0); black (0,1) fills
        // its own last liberty but captures first.
        let mut log = Vec::new();
        play(&mut log, 1, 0).unwrap(); // B
        play(&mut log, 0, 0).unwrap(); // W
        play(&mut log, 8, 8).unwrap(); // B elsewhere
        play(&mut log, 1, 1).unwrap(); // W
        play(&mut log, 7, 7).unwrap(); // B elsewhere
        play(&mut log, 0, 2).unwrap(); // W
        // Black (0,1) has no liberties of its own but removes (0,0).
        let captures = play(&mut log, 0, 1).unwrap();
        assert_eq!(captures, vec![(0, 0)]);
        let pos = replay(9, &log).unwrap();
        assert_eq!(pos.board.get(0), None);
    }

    /// Black at (1,0),(0,1),(1,2); white at (2,0),(3,1),(2,2). Black plays
    /// (2,1) and white recaptures by playing (1,1), leaving a ko at (2,1).
    fn ko_log() -> Vec<MoveRecord> {
        let mut log = Vec::new();
        play(&mut log, 1, 0).unwrap(); // B
        play(&mut log, 2, 0).unwrap(); // W
        play(&mut log, 0, 1).unwrap(); // B
        play(&mut log, 3, 1).unwrap(); // W
        play(&mut log, 1, 2).unwrap(); // B
        play(&mut log, 2, 2).unwrap(); // W
        play(&mut log, 2, 1).unwrap(); // B
        let captures = play(&mut log, 1, 1).unwrap(); // W takes
        assert_eq!(captures, vec![(2, 1)]);
        log
    }

    #[test]
    fn test_ko_recapture_rejected() {
        let log = ko_log();
        let err = validate_move(9, &log, 2, 1, Color::Black).unwrap_err();
        assert_eq!(err, MoveError::Ko);
        assert_eq!(err.code(), "ko-violation");
    }

    #[test]
    fn test_ko_recapture_legal_after_exchange_elsewhere() {
        let mut log = ko_log();
        play(&mut log, 7, 7).unwrap(); // B elsewhere
        play(&mut log, 6, 6).unwrap(); // W elsewhere
        let captures = validate_move(9, &log, 2, 1, Color::Black).unwrap();
        assert_eq!(captures, vec![(1, 1)]);
    }

    #[test]
    fn test_corrupt_log_reported_distinctly() {
        let mut log = Vec::new();
        append_placement(&mut log, Color::Black, 2, 2, &[]);
        log[0].sequence = 5;
        let err = validate_move(9, &log, 3, 3, Color::White).unwrap_err();
        assert_eq!(err.code(), "corrupt-log");
        let validation = Validation::from(Err(err));
        assert!(!validation.legal);
        assert_eq!(validation.reason, Some("corrupt-log"));
    }

    #[test]
    fn test_is_game_over() {
        let mut log: Vec<MoveRecord> = Vec::new();
        assert!(!is_game_over(&log));
        append_pass(&mut log, Color::Black);
        assert!(!is_game_over(&log));
        append_pass(&mut log, Color::White);
        assert!(is_game_over(&log));

        let mut log = Vec::new();
        append_pass(&mut log, Color::Black);
        append_placement(&mut log, Color::White, 3, 3, &[]);
        append_pass(&mut log, Color::Black);
        assert!(!is_game_over(&log));

        append_resign(&mut log, Color::White);
        assert!(is_game_over(&log));
    }

    #[test]
    fn test_passes_separated_by_capture_records() {
        let mut log = Vec::new();
        append_pass(&mut log, Color::Black);
        append_placement(&mut log, Color::White, 3, 3, &[]);
        // Captured records are skipped when looking for consecutive passes.
        log.push(MoveRecord::captured(3, Color::Black, 0, 0));
        append_pass(&mut log, Color::Black);
        assert!(!is_game_over(&log));
    }

    #[test]
    fn test_validation_shape() {
        let validation = Validation::from(Ok(vec![(4, 4)]));
        let json = serde_json::to_value(&validation).unwrap();
        assert_eq!(json["legal"], true);
        assert!(json.get("reason").is_none());
        assert_eq!(json["captures"][0][0], 4);
    }

    #[test]
    fn test_pass_and_resign_checks() {
        let mut log = Vec::new();
        assert_eq!(validate_pass(9, &log, Color::White), Err(MoveError::NotYourTurn));
        assert_eq!(validate_pass(9, &log, Color::Black), Ok(()));
        assert_eq!(validate_resign(9, &log), Ok(()));

        append_resign(&mut log, Color::White);
        assert_eq!(validate_resign(9, &log), Err(MoveError::GameOver));
        assert_eq!(validate_pass(9, &log, Color::Black), Err(MoveError::GameOver));
    }

    #[test]
    fn test_unrecorded_capture_is_corrupt_log() {
        let mut log = Vec::new();
        append_placement(&mut log, Color::Black, 1, 0, &[]);
        append_placement(&mut log, Color::White, 0, 0, &[]);
        append_placement(&mut log, Color::Black, 0, 1, &[]);
        let err = validate_move(9, &log, 4, 4, Color::White).unwrap_err();
        assert!(matches!(err, MoveError::Replay(ReplayError::MissingCapture(3))));
        assert_eq!(err.code(), "corrupt-log");
        let validation = Validation::from(Err::<Vec<(usize, usize)>, _>(err));
        assert_eq!(validation.reason, Some("corrupt-log"));
    }
}
