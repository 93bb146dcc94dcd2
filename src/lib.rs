//! Goban: a Go rules engine with a heuristic computer opponent.
//!
//! The move log is the single source of truth. Every operation takes the
//! board size and the full log, reconstructs the position, and answers
//! without keeping any state between calls. Callers append the records.
//!
//! ## Modules
//!
//! - [`constants`] - Board sizes, komi and heuristic weights
//! - [`board`] - Flat board with groups, liberties and captures
//! - [`record`] - Move log records and append helpers
//! - [`replay`] - Board reconstruction from the move log
//! - [`rules`] - Move legality (turn, occupancy, suicide, ko)
//! - [`score`] - Territory scoring
//! - [`eval`] - Heuristic move evaluation
//! - [`oracle`] - Move choice for the computer opponent
//! - [`gtp`] - Go Text Protocol front end
//!
//! ## Example
//!
//! ```
//! use goban::board::Color;
//! use goban::oracle::{AiMove, choose_move_with};
//! use goban::record::append_placement;
//! use goban::rules::validate_move;
//!
//! let mut log: Vec<goban::MoveRecord> = Vec::new();
//!
//! // Black plays the center point
//! let captures = validate_move(9, &log, 4, 4, Color::Black).unwrap();
//! append_placement(&mut log, Color::Black, 4, 4, &captures);
//!
//! // Ask the opponent for a reply with a fixed seed
//! let mut rng = fastrand::Rng::with_seed(7);
//! if let AiMove::Place { x, y } = choose_move_with(9, &log, Color::White, &mut rng) {
//!     println!("White answers at ({x}, {y})");
//! }
//! ```

pub mod board;
pub mod constants;
pub mod eval;
pub mod gtp;
pub mod oracle;
pub mod record;
pub mod replay;
pub mod rules;
pub mod score;

pub use board::Color;
pub use oracle::{AiMove, choose_ai_move, choose_move_with};
pub use record::{MoveKind, MoveRecord};
pub use rules::{MoveError, Validation, is_game_over, validate_move};
pub use score::{Score, compute_score};
