//! Flat NxN board with group, liberty and capture primitives.
//!
//! Points are indices into a `Vec` laid out row by row (`y * size + x`).
//! The board knows nothing about turns, ko or the move log; it only places
//! stones, removes captured groups and undoes both.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A point on the board, represented as an index into the flat cell array.
pub type Point = usize;

/// Stone color.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    #[display("black")]
    Black,
    #[display("white")]
    White,
}

impl Color {
    /// The other color.
    pub fn opponent(self) -> Self {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    pub size: usize,
    cells: Vec<Option<Color>>,
}

impl Board {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            cells: vec![None; size * size],
        }
    }

    /// Number of points on the board.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Index for `(x, y)`, or `None` when the coordinate is off the board.
    pub fn point(&self, x: i32, y: i32) -> Option<Point> {
        let s = self.size as i32;
        if x < 0 || y < 0 || x >= s || y >= s {
            return None;
        }
        Some(y as usize * self.size + x as usize)
    }

    /// `(x, y)` of a point.
    pub fn coords(&self, pt: Point) -> (usize, usize) {
        (pt % self.size, pt / self.size)
    }

    pub fn get(&self, pt: Point) -> Option<Color> {
        self.cells[pt]
    }

    pub fn set(&mut self, pt: Point, stone: Option<Color>) {
        self.cells[pt] = stone;
    }

    /// Orthogonal neighbours of a point that lie on the board.
    pub fn neighbors(&self, pt: Point) -> impl Iterator<Item = Point> + use<> {
        let s = self.size;
        let (x, y) = (pt % s, pt / s);
        [
            (y > 0).then(|| pt - s),
            (x + 1 < s).then(|| pt + 1),
            (y + 1 < s).then(|| pt + s),
            (x > 0).then(|| pt - 1),
        ]
        .into_iter()
        .flatten()
    }

    /// Distance from the nearest edge (0 on the first line).
    pub fn edge_distance(&self, pt: Point) -> usize {
        let (x, y) = self.coords(pt);
        let last = self.size - 1;
        x.min(y).min(last - x).min(last - y)
    }

    /// Collect the stones of the group containing `start` and its liberties.
    ///
    /// Both lists are free of duplicates. An empty start point yields an empty group.
    pub fn group(&self, start: Point) -> Group {
        let mut group = Group::default();
        let Some(color) = self.cells[start] else {
            return group;
        };
        let mut visited = vec![false; self.cells.len()];
        let mut stack = vec![start];
        visited[start] = true;

        while let Some(pt) = stack.pop() {
            group.stones.push(pt);
            for n in self.neighbors(pt) {
                if visited[n] {
                    continue;
                }
                match self.cells[n] {
                    None => {
                        visited[n] = true;
                        group.liberties.push(n);
                    }
                    Some(c) if c == color => {
                        visited[n] = true;
                        stack.push(n);
                    }
                    Some(_) => {}
                }
            }
        }
        group
    }

    /// Count the liberties of the group containing `start`.
    pub fn liberties(&self, start: Point) -> usize {
        self.group(start).liberties.len()
    }

    /// Put a stone of `color` on an empty point and remove every adjacent
    /// enemy group left without liberties.
    ///
    /// Returns the removed points. No legality is checked: the placed group
    /// may end up with zero liberties, which callers treat as suicide.
    pub fn place(&mut self, pt: Point, color: Color) -> Vec<Point> {
        debug_assert!(self.cells[pt].is_none(), "placing on an occupied point");
        self.cells[pt] = Some(color);

        let opp = color.opponent();
        let mut captured = Vec::new();
        for n in self.neighbors(pt) {
            // A group touching the new stone twice is removed on the first visit.
            if self.cells[n] == Some(opp) {
                let group = self.group(n);
                if group.liberties.is_empty() {
                    for &s in &group.stones {
                        self.cells[s] = None;
                    }
                    captured.extend(group.stones);
                }
            }
        }
        captured
    }

    /// Exact inverse of [`Board::place`].
    pub fn undo(&mut self, pt: Point, color: Color, captured: &[Point]) {
        let opp = Some(color.opponent());
        for &c in captured {
            self.cells[c] = opp;
        }
        self.cells[pt] = None;
    }
}

/// The stones of one group and its liberties.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Group {
    pub stones: Vec<Point>,
    pub liberties: Vec<Point>,
}

/// Every group of a board labelled once, so group questions cost O(1).
pub struct GroupMap {
    labels: Vec<Option<usize>>,
    groups: Vec<GroupInfo>,
}

/// Size and liberty count of a labelled group.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct GroupInfo {
    pub color: Color,
    pub stones: usize,
    pub liberties: usize,
}

impl GroupMap {
    pub fn new(board: &Board) -> Self {
        let mut labels = vec![None; board.len()];
        let mut groups = Vec::new();
        for pt in 0..board.len() {
            let Some(color) = board.get(pt) else { continue };
            if labels[pt].is_some() {
                continue;
            }
            let group = board.group(pt);
            let id = groups.len();
            for &s in &group.stones {
                labels[s] = Some(id);
            }
            groups.push(GroupInfo {
                color,
                stones: group.stones.len(),
                liberties: group.liberties.len(),
            });
        }
        Self { labels, groups }
    }

    /// Group id of the stone at `pt`, if any.
    pub fn label(&self, pt: Point) -> Option<usize> {
        self.labels[pt]
    }

    pub fn info(&self, id: usize) -> GroupInfo {
        self.groups[id]
    }

    /// Distinct groups of `color` orthogonally adjacent to `pt`.
    pub fn adjacent(&self, board: &Board, pt: Point, color: Color) -> Vec<usize> {
        let mut ids: Vec<usize> = board
            .neighbors(pt)
            .filter_map(|n| self.labels[n])
            .filter(|&id| self.groups[id].color == color)
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.size {
            for x in 0..self.size {
                let ch = match self.cells[y * self.size + x] {
                    Some(Color::Black) => 'X',
                    Some(Color::White) => 'O',
                    None => '.',
                };
                write!(f, "{ch} ")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
