//! Types used for defining ships, where they sit on the board, and how they take hits.
use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use crate::board::{BoardDimensions, Position};

/// Size class of a ship as reported by clients. Informational only: the cells a ship
/// occupies come from its placement's `length`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShipKind {
    /// Length 1.
    Small,
    /// Length 2.
    Medium,
    /// Length 3.
    Large,
    /// Length 4.
    Huge,
}

/// Where a ship sits on the board, exactly as a client described it.
///
/// A horizontal ship extends from `position` along `+x`, any other ship along `+y`.
/// The flag is named `direction` on the wire.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct ShipPlacement {
    /// First cell of the ship.
    pub position: Position,
    /// Whether the ship extends along `x` rather than `y`.
    #[serde(rename = "direction")]
    pub horizontal: bool,
    /// Number of cells the ship occupies.
    pub length: usize,
    /// Size class of the ship.
    #[serde(rename = "type")]
    pub kind: ShipKind,
}

impl ShipPlacement {
    /// Get an iterator over the cells of this placement that lie on a board of the given
    /// dimensions. Never walks past the edge of the board, however long the ship is.
    pub fn cells_within(&self, dim: &BoardDimensions) -> impl Iterator<Item = Position> {
        let Position { x, y } = self.position;
        let horizontal = self.horizontal;
        let (start, lane, limit, lanes) = if horizontal {
            (x, y, dim.width(), dim.height())
        } else {
            (y, x, dim.height(), dim.width())
        };
        let end = if lane < lanes {
            start.saturating_add(self.length).min(limit)
        } else {
            start
        };
        (start..end).map(move |i| {
            if horizontal {
                Position::new(i, lane)
            } else {
                Position::new(lane, i)
            }
        })
    }

    /// Returns true if this placement covers the given cell.
    pub fn occupies(&self, pos: Position) -> bool {
        let (along, across, start, lane) = if self.horizontal {
            (pos.x, pos.y, self.position.x, self.position.y)
        } else {
            (pos.y, pos.x, self.position.y, self.position.x)
        };
        across == lane && along.checked_sub(start).map_or(false, |d| d < self.length)
    }
}

/// Result of striking a cell that a ship occupies.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum StrikeOutcome {
    /// The cell was struck before; nothing changed.
    AlreadyHit,
    /// The cell was hit and the ship is still afloat.
    Hit,
    /// The cell was hit and every cell of the ship has now been struck.
    Sunk,
}

/// A ship in play: its placement plus the set of its cells that have been struck.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Ship {
    placement: ShipPlacement,
    hits: HashSet<Position>,
}

impl Ship {
    /// Create an undamaged ship at the given placement. No bounds or overlap checks are
    /// made.
    pub fn new(placement: ShipPlacement) -> Self {
        Self {
            placement,
            hits: HashSet::new(),
        }
    }

    /// Get the placement of this ship.
    pub fn placement(&self) -> &ShipPlacement {
        &self.placement
    }

    /// Returns true if the ship covers the given cell.
    pub fn occupies(&self, pos: Position) -> bool {
        self.placement.occupies(pos)
    }

    /// Get an iterator over the cells of this ship that have been struck.
    pub fn hits(&self) -> impl '_ + Iterator<Item = &Position> {
        self.hits.iter()
    }

    /// Returns true if the given cell of this ship has been struck.
    pub fn is_hit(&self, pos: Position) -> bool {
        self.hits.contains(&pos)
    }

    /// Check if this ship has been sunk.
    pub fn sunk(&self) -> bool {
        self.hits.len() == self.placement.length
    }

    /// Strike the given cell. Returns `None` if the ship does not cover the cell.
    /// Repeated strikes on the same cell are reported as [`StrikeOutcome::AlreadyHit`]
    /// and never count twice.
    pub fn resolve_strike(&mut self, pos: Position) -> Option<StrikeOutcome> {
        if !self.occupies(pos) {
            return None;
        }
        if !self.hits.insert(pos) {
            return Some(StrikeOutcome::AlreadyHit);
        }
        Some(if self.sunk() {
            StrikeOutcome::Sunk
        } else {
            StrikeOutcome::Hit
        })
    }

    /// Cells touching this ship, including diagonally, that are not part of the ship
    /// itself. Clipped to the board and free of duplicates.
    pub fn surrounding_miss_cells(&self, dim: &BoardDimensions) -> BTreeSet<Position> {
        self.placement
            .cells_within(dim)
            .flat_map(|cell| dim.neighbors(cell))
            .filter(|&cell| !self.occupies(cell))
            .collect()
    }
}

impl From<ShipPlacement> for Ship {
    fn from(placement: ShipPlacement) -> Self {
        Self::new(placement)
    }
}
