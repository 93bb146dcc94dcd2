//! Constants for board geometry, scoring, and the heuristic opponent.
//!
//! Board size is a runtime input to every operation, so this module only
//! lists the sizes the engine accepts. Everything else here tunes the move
//! oracle: the weights are summed per candidate move, so their relative
//! magnitudes matter more than their absolute values.

// =============================================================================
// Board Geometry
// =============================================================================

/// Board sizes the engine accepts (NxN).
pub const SUPPORTED_SIZES: [usize; 3] = [9, 13, 19];

/// Board size used when none is given.
pub const DEFAULT_SIZE: usize = 9;

/// Coordinate recorded for moves that do not occupy the board (pass, resign).
pub const PASS_COORD: i32 = -1;

// =============================================================================
// Scoring
// =============================================================================

/// Komi (compensation points for White). Non-integer so ties cannot happen.
pub const DEFAULT_KOMI: f64 = 6.5;

// =============================================================================
// Move Selection
// =============================================================================

/// Below this many placed stones the oracle consults the opening book.
pub const OPENING_STONES: usize = 6;

/// Best scores below this are weak enough to answer a pass with a pass.
pub const PASS_THRESHOLD: f64 = 10.0;

/// The top move is taken outright when it beats the runner-up by this much.
pub const CLEAR_BEST_MARGIN: f64 = 30.0;

/// Sampling weights for the top three candidates when no move stands out.
pub const TOP_WEIGHTS: [f64; 3] = [0.7, 0.2, 0.1];

/// Upper bound of the uniform jitter added to every candidate.
pub const JITTER: f64 = 3.0;

// =============================================================================
// Tactical Weights
// =============================================================================

/// Base bonus for a capturing move.
pub const CAPTURE_BASE: f64 = 150.0;

/// Bonus per captured stone.
pub const CAPTURE_PER_STONE: f64 = 30.0;

/// Extra bonus when two or more stones come off the board.
pub const CAPTURE_MANY: f64 = 50.0;

/// Base penalty for self-atari.
pub const SELF_ATARI_BASE: f64 = 100.0;

/// Self-atari penalty per stone left in atari.
pub const SELF_ATARI_PER_STONE: f64 = 50.0;

/// Base bonus for rescuing a friendly group from atari.
pub const ESCAPE_BASE: f64 = 120.0;

/// Escape bonus per rescued stone.
pub const ESCAPE_PER_STONE: f64 = 25.0;

/// Penalty for running into a ladder the mover is likely to lose.
pub const LOSING_LADDER: f64 = 50.0;

/// Base bonus for putting an enemy group in atari.
pub const ATARI_BASE: f64 = 70.0;

/// Atari bonus per threatened stone.
pub const ATARI_PER_STONE: f64 = 15.0;

/// Base bonus for an atari that starts a ladder the mover is likely to win.
pub const LADDER_ATTACK_BASE: f64 = 100.0;

/// Ladder attack bonus per threatened stone.
pub const LADDER_ATTACK_PER_STONE: f64 = 20.0;

/// Distance from the edge within which ladders are read as working.
pub const LADDER_EDGE_DISTANCE: usize = 3;

/// How far each ray looks for ladder breakers.
pub const LADDER_SCAN: usize = 4;

// =============================================================================
// Shape Weights
// =============================================================================

/// Base bonus for touching two or more enemy groups.
pub const CUT_BASE: f64 = 60.0;

/// Cut bonus per unit of cut value (two per separated group).
pub const CUT_PER_UNIT: f64 = 10.0;

/// Base bonus for joining two or more friendly groups.
pub const CONNECT_BASE: f64 = 40.0;

/// Connection bonus per unit of connection value (two per joined group).
pub const CONNECT_PER_UNIT: f64 = 8.0;

/// Base bonus for a move touching both colors.
pub const CONTACT_BASE: f64 = 35.0;

/// Base bonus for extending a friendly group.
pub const EXTEND_BASE: f64 = 25.0;

/// Contact and extension bonus per adjacent stone.
pub const NEIGHBOR_STONE: f64 = 5.0;

// =============================================================================
// Positional Weights
// =============================================================================

/// Bonus for a star point while the board is young.
pub const STAR_POINT: f64 = 30.0;

/// Bonus for the 3-3, 3-4 and 4-4 corner points.
pub const CORNER_POINT: f64 = 25.0;

/// Bonus for third-line side extensions.
pub const SIDE_EXTENSION: f64 = 15.0;

/// Penalty for first-line moves.
pub const FIRST_LINE: f64 = 20.0;

/// Penalty for second-line moves.
pub const SECOND_LINE: f64 = 5.0;

/// Opening center pull: the bonus is this minus the Manhattan distance to the center.
pub const CENTER_PULL: f64 = 10.0;

/// Center pull applies while fewer stones than this have been placed.
pub const CENTER_PULL_STONES: usize = 20;

// =============================================================================
// Look-ahead
// =============================================================================

/// Penalty per friendly stone the opponent could capture in reply.
pub const REPLY_CAPTURE_PER_STONE: f64 = 25.0;

/// Penalty per friendly stone the opponent could put in atari in reply.
pub const REPLY_ATARI_PER_STONE: f64 = 10.0;
