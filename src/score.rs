//! Territory scoring.
//!
//! Each empty region (4-connected) belongs to the single color that borders
//! it, or to nobody when it borders both colors or none. A side's total is
//! its territory plus the stones it captured, plus komi for White.
//!
//! Scores are valid at any point of the game as a live estimate; they are
//! only final once the game is over. Dead stones are not removed.

use serde::Serialize;
use tracing::instrument;

use crate::board::{Board, Color, Point};
use crate::record::MoveRecord;
use crate::replay::{Position, ReplayError, replay};

/// Owner of an empty point.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Owner {
    Black,
    White,
    Neutral,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Winner {
    Black,
    White,
    Tie,
}

/// One side's score.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct SideScore {
    pub territory: u32,
    pub captures: u32,
    pub total: f64,
}

/// Ownership of one empty point.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TerritoryPoint {
    pub x: usize,
    pub y: usize,
    pub owner: Owner,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Score {
    pub black: SideScore,
    pub white: SideScore,
    /// Every empty point with its owner.
    pub territory_map: Vec<TerritoryPoint>,
    pub winner: Winner,
}

/// Assign every empty point of the board to an owner.
///
/// Returns one entry per point; occupied points map to `None`.
pub fn territory(board: &Board) -> Vec<Option<Owner>> {
    let mut owners: Vec<Option<Owner>> = vec![None; board.len()];
    let mut visited = vec![false; board.len()];
    let mut region: Vec<Point> = Vec::new();

    for start in 0..board.len() {
        if visited[start] || board.get(start).is_some() {
            continue;
        }
        region.clear();
        let (mut touches_black, mut touches_white) = (false, false);
        let mut stack = vec![start];
        visited[start] = true;

        while let Some(pt) = stack.pop() {
            region.push(pt);
            for n in board.neighbors(pt) {
                match board.get(n) {
                    Some(Color::Black) => touches_black = true,
                    Some(Color::White) => touches_white = true,
                    None if !visited[n] => {
                        visited[n] = true;
                        stack.push(n);
                    }
                    None => {}
                }
            }
        }

        let owner = match (touches_black, touches_white) {
            (true, false) => Owner::Black,
            (false, true) => Owner::White,
            _ => Owner::Neutral,
        };
        for &pt in &region {
            owners[pt] = Some(owner);
        }
    }
    owners
}

/// Score an already reconstructed position.
pub fn score_position(pos: &Position, komi: f64) -> Score {
    let owners = territory(&pos.board);
    let mut territory_map = Vec::new();
    let (mut black_area, mut white_area) = (0u32, 0u32);
    for (pt, owner) in owners.into_iter().enumerate() {
        let Some(owner) = owner else { continue };
        match owner {
            Owner::Black => black_area += 1,
            Owner::White => white_area += 1,
            Owner::Neutral => {}
        }
        let (x, y) = pos.board.coords(pt);
        territory_map.push(TerritoryPoint { x, y, owner });
    }

    let side = |territory: u32, captures: u32, bonus: f64| SideScore {
        territory,
        captures,
        total: f64::from(territory + captures) + bonus,
    };
    let black = side(black_area, pos.captures_by(Color::Black), 0.0);
    let white = side(white_area, pos.captures_by(Color::White), komi);

    let winner = if black.total > white.total {
        Winner::Black
    } else if white.total > black.total {
        Winner::White
    } else {
        Winner::Tie
    };

    Score {
        black,
        white,
        territory_map,
        winner,
    }
}

/// Score the board described by a move log.
#[instrument(skip(log), fields(records = log.len()))]
pub fn compute_score(size: usize, log: &[MoveRecord], komi: f64) -> Result<Score, ReplayError> {
    let pos = replay(size, log)?;
    Ok(score_position(&pos, komi))
}
