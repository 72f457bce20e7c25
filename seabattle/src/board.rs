//! Types that make up the game board: cell coordinates and the rectangular grid they
//! live on.

use std::borrow::Borrow;

use serde::{Deserialize, Serialize};

/// The coordinates of a single cell on the board.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct Position {
    /// Horizontal position of the cell.
    pub x: usize,
    /// Vertical position of the cell.
    pub y: usize,
}

impl Position {
    /// Construct a [`Position`] from the given `x` and `y`.
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

impl From<(usize, usize)> for Position {
    /// Construct a [`Position`] from the given `(x, y)` pair.
    fn from((x, y): (usize, usize)) -> Self {
        Self::new(x, y)
    }
}

impl From<Position> for (usize, usize) {
    /// Convert the [`Position`] into an `(x, y)` pair.
    fn from(pos: Position) -> Self {
        (pos.x, pos.y)
    }
}

/// Rectangular board dimensions. Every game is played on the default 10x10 board.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct BoardDimensions {
    /// Width of the board. This cooresponds to the `x` [`Position`].
    width: usize,
    /// Height of the board. This cooresponds to the `y` [`Position`].
    height: usize,
}

impl BoardDimensions {
    /// Get the width of these [`BoardDimensions`].
    pub fn width(&self) -> usize {
        self.width
    }

    /// Get the height of these [`BoardDimensions`].
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns true if the given [`Position`] lies on the board.
    pub fn contains<B: Borrow<Position>>(&self, pos: B) -> bool {
        let p = pos.borrow();
        p.x < self.width && p.y < self.height
    }

    /// Get an iterator over rows of this grid. Each row is an iterator over the
    /// positions of that row.
    pub fn iter_coordinates(&self) -> impl Iterator<Item = impl Iterator<Item = Position>> {
        let width = self.width;
        (0..self.height).map(move |y| (0..width).map(move |x| Position { x, y }))
    }

    /// Get a flat iterator over every cell on the board, row by row.
    pub fn cells(&self) -> impl Iterator<Item = Position> {
        self.iter_coordinates().flatten()
    }

    /// Iterate the 8-neighborhood of the given position (orthogonal and diagonal
    /// neighbors), clipped to the board. Yields nothing if `pos` is itself off the
    /// board.
    pub fn neighbors(&self, pos: Position) -> Neighbors {
        Neighbors {
            dim: *self,
            pos,
            // Skip straight to the end for off-board positions so next() never has to
            // re-check the center.
            step: if self.contains(pos) { 0 } else { OFFSETS.len() },
        }
    }
}

impl Default for BoardDimensions {
    /// Construct the default dimensions, a 10x10 board.
    fn default() -> Self {
        Self {
            width: 10,
            height: 10,
        }
    }
}

/// Offsets of the 8 neighbors, clockwise starting from the cell above.
const OFFSETS: [(isize, isize); 8] = [
    (0, -1),
    (1, -1),
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
];

/// Iterator over the in-bounds 8-neighborhood of a cell.
#[derive(Debug, Clone)]
pub struct Neighbors {
    dim: BoardDimensions,
    pos: Position,
    step: usize,
}

impl Iterator for Neighbors {
    type Item = Position;

    fn next(&mut self) -> Option<Position> {
        while self.step < OFFSETS.len() {
            let (dx, dy) = OFFSETS[self.step];
            self.step += 1;
            let candidate = shift(self.pos.x, dx)
                .and_then(|x| shift(self.pos.y, dy).map(|y| Position::new(x, y)));
            match candidate {
                Some(pos) if self.dim.contains(pos) => return Some(pos),
                _ => {}
            }
        }
        None
    }
}

/// Apply a unit offset to a coordinate, returning `None` on underflow or overflow.
fn shift(v: usize, d: isize) -> Option<usize> {
    match d {
        -1 => v.checked_sub(1),
        1 => v.checked_add(1),
        _ => Some(v),
    }
}
