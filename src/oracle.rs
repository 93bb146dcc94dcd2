//! Move choice for the computer opponent.
//!
//! The oracle stands in for a second player. It never fails: an illegal
//! turn, a finished game, a corrupt log or a board without legal moves all
//! resolve to a pass. Randomness comes from a caller-supplied
//! [`fastrand::Rng`], so a seeded generator makes every choice reproducible.

use fastrand::Rng;
use serde::Serialize;
use tracing::{debug, instrument, trace, warn};

use crate::board::Color;
use crate::constants::{CLEAR_BEST_MARGIN, OPENING_STONES, PASS_THRESHOLD, TOP_WEIGHTS};
use crate::eval::{Candidate, Evaluator, opening_points};
use crate::record::MoveRecord;
use crate::replay::{LastAction, Position, replay};
use crate::rules::is_game_over;

/// The oracle's answer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AiMove {
    Place { x: usize, y: usize },
    Pass,
}

/// Choose a move for `color`, seeding the generator from system entropy.
pub fn choose_ai_move(size: usize, log: &[MoveRecord], color: Color) -> AiMove {
    let mut rng = Rng::new();
    choose_move_with(size, log, color, &mut rng)
}

/// Choose a move for `color` using the given generator.
#[instrument(skip(log, rng), fields(records = log.len()))]
pub fn choose_move_with(size: usize, log: &[MoveRecord], color: Color, rng: &mut Rng) -> AiMove {
    if is_game_over(log) {
        return AiMove::Pass;
    }
    match replay(size, log) {
        Ok(pos) => choose_from_position(&pos, color, rng),
        Err(err) => {
            warn!(%err, "cannot read move log, passing");
            AiMove::Pass
        }
    }
}

/// Choose a move for `color` on an already reconstructed position.
pub fn choose_from_position(pos: &Position, color: Color, rng: &mut Rng) -> AiMove {
    if pos.is_over() || pos.to_move != color {
        return AiMove::Pass;
    }
    let mut eval = Evaluator::new(pos, color);

    if pos.stones_placed < OPENING_STONES {
        if let Some(mv) = opening_move(&mut eval, rng) {
            debug!(?mv, "opening book");
            return mv;
        }
    }

    let mut candidates = eval.candidates(rng);
    candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
    for c in candidates.iter().take(5) {
        trace!(point = c.point, score = c.score, reason = c.reason, "candidate");
    }

    let opponent_passed = pos.last_action == LastAction::Pass;
    let Some(choice) = select(&candidates, opponent_passed, rng) else {
        debug!(candidates = candidates.len(), "passing");
        return AiMove::Pass;
    };
    let (x, y) = eval.board().coords(choice.point);
    debug!(x, y, score = choice.score, reason = choice.reason, "chosen move");
    AiMove::Place { x, y }
}

/// First free, legal conventional opening point, in random order.
fn opening_move(eval: &mut Evaluator, rng: &mut Rng) -> Option<AiMove> {
    let size = eval.board().size;
    let mut points = opening_points(size).to_vec();
    rng.shuffle(&mut points);
    points.into_iter().find_map(|(x, y)| {
        let pt = y * size + x;
        eval.is_legal(pt).then_some(AiMove::Place { x, y })
    })
}

/// Pick among candidates sorted best first, or `None` to pass.
///
/// A weak best move answers a pass with a pass, and a negative best move
/// is never played. A clear winner is taken outright; otherwise the top
/// three are sampled with decreasing weight.
pub fn select<'a>(
    sorted: &'a [Candidate],
    opponent_passed: bool,
    rng: &mut Rng,
) -> Option<&'a Candidate> {
    let best = sorted.first()?;
    if best.score < 0.0 || (best.score < PASS_THRESHOLD && opponent_passed) {
        return None;
    }
    let top = &sorted[..sorted.len().min(TOP_WEIGHTS.len())];
    if top.len() < 2 || best.score > top[1].score + CLEAR_BEST_MARGIN {
        return Some(best);
    }

    let roll = rng.f64();
    let mut cumulative = 0.0;
    for (candidate, weight) in top.iter().zip(TOP_WEIGHTS) {
        cumulative += weight;
        if roll < cumulative {
            return Some(candidate);
        }
    }
    Some(best)
}
