//! Heuristic move evaluation for the computer opponent.
//!
//! A candidate's score is a sum of weighted terms:
//! - captures, scaled by the number of stones taken
//! - self-atari, a large penalty that ends evaluation early
//! - atari escape, reversed when the escape looks like a lost ladder
//! - atari on an enemy group, boosted when the ladder looks like it works
//! - cut and connection values by the number of distinct adjacent groups
//! - contact and extension by adjacent stone counts
//! - position: star and corner points early, low lines, center pull
//! - one-ply look-ahead: the worst capture or atari the reply can inflict
//! - jitter for variety
//!
//! Group questions about the board before the move are answered from one
//! [`GroupMap`] per turn. Each candidate is placed on a working copy of the
//! board and taken back with [`Board::undo`]; the look-ahead tries replies
//! on the same copy.

use fastrand::Rng;

use crate::board::{Board, Color, GroupMap, Point};
use crate::constants::*;
use crate::replay::Position;
use crate::rules::try_place;

/// A legal move with its heuristic score.
#[derive(Clone, Debug, PartialEq)]
pub struct Candidate {
    pub point: Point,
    pub score: f64,
    /// Dominant term, for logging.
    pub reason: &'static str,
}

/// Evaluation state for one turn of one color.
pub struct Evaluator {
    /// Board before the move. Never modified.
    before: Board,
    groups: GroupMap,
    /// Working copy for tentative placements.
    work: Board,
    ko: Option<Board>,
    color: Color,
    stones_placed: usize,
}

impl Evaluator {
    pub fn new(pos: &Position, color: Color) -> Self {
        Self {
            groups: GroupMap::new(&pos.board),
            before: pos.board.clone(),
            work: pos.board.clone(),
            ko: pos.ko_board().cloned(),
            color,
            stones_placed: pos.stones_placed,
        }
    }

    pub fn board(&self) -> &Board {
        &self.before
    }

    /// True if the move is legal on the current board.
    pub fn is_legal(&mut self, pt: Point) -> bool {
        match try_place(&mut self.work, pt, self.color, self.ko.as_ref()) {
            Ok(captured) => {
                self.work.undo(pt, self.color, &captured);
                true
            }
            Err(_) => false,
        }
    }

    /// Score every legal move on the board.
    pub fn candidates(&mut self, rng: &mut Rng) -> Vec<Candidate> {
        let mut out = Vec::new();
        for pt in 0..self.before.len() {
            if let Some(candidate) = self.evaluate(pt, rng) {
                out.push(candidate);
            }
        }
        out
    }

    /// Score one move, or `None` if it is illegal.
    pub fn evaluate(&mut self, pt: Point, rng: &mut Rng) -> Option<Candidate> {
        let captured = try_place(&mut self.work, pt, self.color, self.ko.as_ref()).ok()?;
        let candidate = self.score_placed(pt, captured.len(), rng);
        self.work.undo(pt, self.color, &captured);
        Some(candidate)
    }

    /// Score a move whose stone is already on the working board.
    fn score_placed(&mut self, pt: Point, captures: usize, rng: &mut Rng) -> Candidate {
        let color = self.color;
        let opp = color.opponent();
        let mut score = 0.0;
        let mut reason = "valid";

        // Tactics
        if captures > 0 {
            score += CAPTURE_BASE + captures as f64 * CAPTURE_PER_STONE;
            if captures >= 2 {
                score += CAPTURE_MANY;
            }
            reason = "capture";
        } else {
            let own = self.work.group(pt);
            if own.liberties.len() == 1 {
                score -= SELF_ATARI_BASE + own.stones.len() as f64 * SELF_ATARI_PER_STONE;
                return Candidate {
                    point: pt,
                    score,
                    reason: "self-atari",
                };
            }
        }

        let rescued = self.stones_in_atari(pt, color);
        if rescued > 0 {
            if likely_ladder(&self.before, pt, color, opp) {
                score -= LOSING_LADDER;
                reason = "ladder-escape";
            } else {
                score += ESCAPE_BASE + rescued as f64 * ESCAPE_PER_STONE;
                reason = "escape";
            }
        }

        let threatened = self.stones_with_two_liberties(pt, opp);
        if threatened > 0 {
            if likely_ladder(&self.before, pt, opp, color) {
                score += LADDER_ATTACK_BASE + threatened as f64 * LADDER_ATTACK_PER_STONE;
                reason = "ladder-attack";
            } else {
                score += ATARI_BASE + threatened as f64 * ATARI_PER_STONE;
                reason = "atari";
            }
        }

        // Shape
        let enemy_groups = self.groups.adjacent(&self.before, pt, opp).len();
        if enemy_groups >= 2 {
            score += CUT_BASE + (enemy_groups * 2) as f64 * CUT_PER_UNIT;
            reason = or_keep(reason, "cut");
        }
        let friendly_groups = self.groups.adjacent(&self.before, pt, color).len();
        if friendly_groups >= 2 {
            score += CONNECT_BASE + (friendly_groups * 2) as f64 * CONNECT_PER_UNIT;
            reason = or_keep(reason, "connect");
        }

        let friends = adjacent_stones(&self.before, pt, color) as f64;
        let enemies = adjacent_stones(&self.before, pt, opp) as f64;
        if friends > 0.0 && enemies > 0.0 {
            score += CONTACT_BASE + (friends + enemies) * NEIGHBOR_STONE;
            reason = or_keep(reason, "contact");
        } else if friends > 0.0 {
            score += EXTEND_BASE + friends * NEIGHBOR_STONE;
            reason = or_keep(reason, "extend");
        }

        // Position
        let size = self.before.size;
        if self.stones_placed < size * 2 {
            let bonus = corner_bonus(size, pt);
            score += bonus;
            if bonus > SIDE_EXTENSION {
                reason = or_keep(reason, "corner/side");
            }
        }
        match self.before.edge_distance(pt) {
            0 => score -= FIRST_LINE,
            1 => score -= SECOND_LINE,
            _ => {}
        }
        if self.stones_placed < CENTER_PULL_STONES {
            let (x, y) = self.before.coords(pt);
            let half = size as f64 / 2.0;
            let dist = (x as f64 - half).abs() + (y as f64 - half).abs();
            score += (CENTER_PULL - dist).max(0.0);
        }

        if score > 0.0 && captures == 0 {
            score -= self.worst_reply(pt);
        }

        score += rng.f64() * JITTER;

        Candidate {
            point: pt,
            score,
            reason,
        }
    }

    /// Stones of `color` next to `pt` whose groups are in atari before the move.
    fn stones_in_atari(&self, pt: Point, color: Color) -> usize {
        self.groups
            .adjacent(&self.before, pt, color)
            .into_iter()
            .map(|id| self.groups.info(id))
            .filter(|g| g.liberties == 1)
            .map(|g| g.stones)
            .sum()
    }

    /// Stones of `color` next to `pt` whose groups have exactly two liberties.
    fn stones_with_two_liberties(&self, pt: Point, color: Color) -> usize {
        self.groups
            .adjacent(&self.before, pt, color)
            .into_iter()
            .map(|id| self.groups.info(id))
            .filter(|g| g.liberties == 2)
            .map(|g| g.stones)
            .sum()
    }

    /// Penalty for the opponent's most damaging reply to the stone at `pt`.
    ///
    /// Only replies on a liberty of a friendly group with at most two
    /// liberties can capture or atari, so those are the only ones tried.
    fn worst_reply(&mut self, pt: Point) -> f64 {
        let color = self.color;
        let opp = color.opponent();
        let after = GroupMap::new(&self.work);
        let mut worst: f64 = 0.0;

        for reply in 0..self.work.len() {
            if self.work.get(reply).is_some() {
                continue;
            }
            let weak = after.adjacent(&self.work, reply, color);
            let weak: Vec<_> = weak
                .into_iter()
                .map(|id| after.info(id))
                .filter(|g| g.liberties <= 2)
                .collect();
            if weak.is_empty() {
                continue;
            }
            // Our move captured nothing, so the reply cannot be a ko recapture.
            let Ok(captured) = try_place(&mut self.work, reply, opp, None) else {
                continue;
            };
            self.work.undo(reply, opp, &captured);

            worst = worst.max(captured.len() as f64 * REPLY_CAPTURE_PER_STONE);
            let atari: usize = weak
                .iter()
                .filter(|g| g.liberties == 2)
                .map(|g| g.stones)
                .sum();
            worst = worst.max(atari as f64 * REPLY_ATARI_PER_STONE);
        }
        debug_assert!(self.work.get(pt) == Some(color));
        worst
    }
}

fn or_keep(current: &'static str, label: &'static str) -> &'static str {
    if current == "valid" { label } else { current }
}

/// Number of orthogonal neighbours holding a stone of `color`.
pub fn adjacent_stones(board: &Board, pt: Point, color: Color) -> usize {
    board
        .neighbors(pt)
        .filter(|&n| board.get(n) == Some(color))
        .count()
}

/// Guess whether a chase at `pt` ends in a ladder the chaser wins.
///
/// Near the edge, fewer than two escaping stones along the eight rays
/// from `pt` means nothing breaks the ladder.
pub fn likely_ladder(board: &Board, pt: Point, escaping: Color, chasing: Color) -> bool {
    if board.edge_distance(pt) > LADDER_EDGE_DISTANCE {
        return false;
    }
    const RAYS: [(i32, i32); 8] = [
        (0, 1),
        (0, -1),
        (1, 0),
        (-1, 0),
        (1, 1),
        (1, -1),
        (-1, 1),
        (-1, -1),
    ];
    let (x, y) = board.coords(pt);
    let mut friendly = 0;
    for (dx, dy) in RAYS {
        for dist in 1..=LADDER_SCAN as i32 {
            let Some(n) = board.point(x as i32 + dx * dist, y as i32 + dy * dist) else {
                break;
            };
            match board.get(n) {
                Some(c) if c == escaping => {
                    friendly += 1;
                    break;
                }
                Some(c) if c == chasing => break,
                _ => {}
            }
        }
    }
    friendly < 2
}

/// Star points (hoshi) for the supported board sizes.
pub fn star_points(size: usize) -> &'static [(usize, usize)] {
    match size {
        9 => &[(2, 2), (2, 6), (6, 2), (6, 6), (4, 4)],
        13 => &[
            (3, 3),
            (3, 9),
            (9, 3),
            (9, 9),
            (6, 6),
            (3, 6),
            (6, 3),
            (6, 9),
            (9, 6),
        ],
        19 => &[
            (3, 3),
            (3, 9),
            (3, 15),
            (9, 3),
            (9, 9),
            (9, 15),
            (15, 3),
            (15, 9),
            (15, 15),
        ],
        _ => &[],
    }
}

/// Conventional opening points, tried in random order by the oracle.
pub fn opening_points(size: usize) -> &'static [(usize, usize)] {
    match size {
        9 => &[(2, 2), (2, 6), (6, 2), (6, 6), (4, 4)],
        13 => &[(3, 3), (3, 9), (9, 3), (9, 9), (6, 6)],
        19 => star_points(19),
        _ => &[],
    }
}

/// Early-game bonus for star points, corner points and third-line extensions.
pub fn corner_bonus(size: usize, pt: Point) -> f64 {
    let (x, y) = (pt % size, pt / size);
    if star_points(size).contains(&(x, y)) {
        return STAR_POINT;
    }
    let edge_x = x.min(size - 1 - x);
    let edge_y = y.min(size - 1 - y);
    if matches!(edge_x, 2 | 3) && matches!(edge_y, 2 | 3) {
        return CORNER_POINT;
    }
    let near_side = (edge_x <= 4 && edge_y >= 4) || (edge_y <= 4 && edge_x >= 4);
    if near_side && (edge_x == 3 || edge_y == 3) {
        return SIDE_EXTENSION;
    }
    0.0
}
