//! Sparse two-layer board.
//!
//! Each occupied coordinate maps to a [`Cell`] with a terrain slot and a
//! piece slot. Cells that become empty are dropped so the board's extent
//! always reflects what is actually on it.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::game::{Coord, PieceId};

/// The two occupancy slots of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    /// Terrain tiles.
    Terrain,
    /// Units standing on terrain.
    Piece,
}

/// One board location.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cell {
    /// Terrain tile occupying this cell, if any.
    pub terrain: Option<PieceId>,
    /// Unit occupying this cell, if any.
    pub piece: Option<PieceId>,
}

impl Cell {
    /// Occupant of the given layer.
    #[must_use]
    pub const fn occupant(&self, layer: Layer) -> Option<&PieceId> {
        match layer {
            Layer::Terrain => self.terrain.as_ref(),
            Layer::Piece => self.piece.as_ref(),
        }
    }

    /// Mutable slot of the given layer.
    fn slot_mut(&mut self, layer: Layer) -> &mut Option<PieceId> {
        match layer {
            Layer::Terrain => &mut self.terrain,
            Layer::Piece => &mut self.piece,
        }
    }

    /// Whether both layers are empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.terrain.is_none() && self.piece.is_none()
    }
}

/// Whether intervening cells matter for a line-of-sight query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinePolicy {
    /// Only collinearity matters.
    Open,
    /// Every intervening cell must carry terrain and no piece.
    Supported,
}

/// Inclusive bounding rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extent {
    /// Top-left corner.
    pub min: Coord,
    /// Bottom-right corner.
    pub max: Coord,
}

impl Extent {
    /// Grow the rectangle by `margin` cells on every side, stopping at the
    /// `i32` range.
    #[must_use]
    pub const fn expand(self, margin: i32) -> Self {
        Self {
            min: self.min.offset(-margin, -margin),
            max: self.max.offset(margin, margin),
        }
    }

    /// Whether `coord` lies inside the rectangle.
    #[must_use]
    pub const fn contains(&self, coord: Coord) -> bool {
        coord.x >= self.min.x
            && coord.x <= self.max.x
            && coord.y >= self.min.y
            && coord.y <= self.max.y
    }

    /// Every coordinate inside the rectangle, row-major.
    pub fn coords(self) -> impl Iterator<Item = Coord> {
        (self.min.y..=self.max.y)
            .flat_map(move |y| (self.min.x..=self.max.x).map(move |x| Coord::new(x, y)))
    }
}

/// The game board.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Board {
    /// Occupied cells.
    cells: BTreeMap<Coord, Cell>,
}

impl Board {
    /// Create an empty board.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the cell at a coordinate, if anything occupies it.
    #[must_use]
    pub fn get(&self, coord: Coord) -> Option<&Cell> {
        self.cells.get(&coord)
    }

    /// Occupant of one layer at a coordinate.
    #[must_use]
    pub fn occupant(&self, coord: Coord, layer: Layer) -> Option<&PieceId> {
        self.get(coord).and_then(|cell| cell.occupant(layer))
    }

    /// Terrain tile at a coordinate.
    #[must_use]
    pub fn terrain_at(&self, coord: Coord) -> Option<&PieceId> {
        self.occupant(coord, Layer::Terrain)
    }

    /// Unit at a coordinate.
    #[must_use]
    pub fn piece_at(&self, coord: Coord) -> Option<&PieceId> {
        self.occupant(coord, Layer::Piece)
    }

    /// Whether a coordinate carries terrain.
    #[must_use]
    pub fn has_terrain(&self, coord: Coord) -> bool {
        self.terrain_at(coord).is_some()
    }

    /// Put a piece into a layer.
    ///
    /// Returns the previous occupant of that layer, if any.
    pub fn set(&mut self, coord: Coord, layer: Layer, id: PieceId) -> Option<PieceId> {
        self.cells
            .entry(coord)
            .or_default()
            .slot_mut(layer)
            .replace(id)
    }

    /// Remove and return the occupant of a layer.
    pub fn take(&mut self, coord: Coord, layer: Layer) -> Option<PieceId> {
        let cell = self.cells.get_mut(&coord)?;
        let taken = cell.slot_mut(layer).take();
        if cell.is_empty() {
            self.cells.remove(&coord);
        }
        taken
    }

    /// Number of occupied cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether nothing is on the board.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Iterate over occupied cells, row-major.
    pub fn iter(&self) -> impl Iterator<Item = (Coord, &Cell)> {
        self.cells.iter().map(|(coord, cell)| (*coord, cell))
    }

    /// Bounding rectangle of all occupied cells.
    #[must_use]
    pub fn extent(&self) -> Option<Extent> {
        let mut coords = self.cells.keys();
        let first = *coords.next()?;
        let mut extent = Extent {
            min: first,
            max: first,
        };
        for coord in coords {
            extent.min.x = extent.min.x.min(coord.x);
            extent.min.y = extent.min.y.min(coord.y);
            extent.max.x = extent.max.x.max(coord.x);
            extent.max.y = extent.max.y.max(coord.y);
        }
        Some(extent)
    }

    /// Check that every cell strictly between two collinear coordinates
    /// satisfies the policy.
    ///
    /// The walk stops at the first offending cell, which it returns, or `Ok(())` when the line is clear.
    /// Non-collinear endpoints are reported as blocked at `to`.
    ///
    /// # Errors
    ///
    /// Returns the first cell that blocks the line.
    pub fn clear_line(&self, from: Coord, to: Coord, policy: LinePolicy) -> Result<(), Coord> {
        let Some(mut path) = from.path_to(to) else {
            return Err(to);
        };
        if policy == LinePolicy::Open {
            return Ok(());
        }
        match path.find(|&c| !self.has_terrain(c) || self.piece_at(c).is_some())
        {
            Some(blocked) => Err(blocked),
            None => Ok(()),
        }
    }

    /// Whether `from` and `to` are collinear with a clear line between them.
    #[must_use]
    pub fn is_clear_line(&self, from: Coord, to: Coord, policy: LinePolicy) -> bool {
        self.clear_line(from, to, policy).is_ok()
    }

    /// Whether every given coordinate lies in one orthogonally connected
    /// component of terrain-bearing cells.
    ///
    /// Vacuously true for zero or one coordinate. A coordinate without
    /// terrain is never connected.
    #[must_use]
    pub fn is_connected(&self, coords: &[Coord]) -> bool {
        let Some((&start, rest)) = coords.split_first() else {
            return true;
        };
        if !coords.iter().all(|&c| self.has_terrain(c)) {
            return false;
        }
        if rest.is_empty() {
            return true;
        }

        let mut remaining: BTreeSet<Coord> = rest.iter().copied().collect();
        remaining.remove(&start);
        let mut seen = BTreeSet::from([start]);
        let mut queue = VecDeque::from([start]);

        while let Some(current) = queue.pop_front() {
            remaining.remove(&current);
            if remaining.is_empty() {
                return true;
            }
            for next in current.orthogonal_neighbors() {
                if self.has_terrain(next) && seen.insert(next) {
                    queue.push_back(next);
                }
            }
        }

        remaining.is_empty()
    }
}
