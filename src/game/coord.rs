//! Board coordinates.
//!
//! The board is unbounded, so coordinates are signed and carry no notion of
//! width or height. Every map keyed by [`Coord`] iterates row-major because
//! the ordering compares `y` before `x`.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use derive_more::{Display, Error};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A coordinate on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Coord {
    /// X coordinate (column).
    pub x: i32,
    /// Y coordinate (row).
    pub y: i32,
}

/// Orthogonal unit offsets: up, down, left, right.
const ORTHOGONAL: [(i32, i32); 4] = [(0, -1), (0, 1), (-1, 0), (1, 0)];

/// Diagonal unit offsets.
const DIAGONAL: [(i32, i32); 4] = [(-1, -1), (1, -1), (-1, 1), (1, 1)];

impl Coord {
    /// Create a new coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Offset this coordinate by `(dx, dy)`, saturating at the `i32` range.
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x.saturating_add(dx), self.y.saturating_add(dy))
    }

    /// The four orthogonal neighbours (up, down, left, right).
    #[must_use]
    pub fn orthogonal_neighbors(self) -> [Coord; 4] {
        ORTHOGONAL.map(|(dx, dy)| self.offset(dx, dy))
    }

    /// The four diagonal neighbours.
    #[must_use]
    pub fn diagonal_neighbors(self) -> [Coord; 4] {
        DIAGONAL.map(|(dx, dy)| self.offset(dx, dy))
    }

    /// All eight neighbours, orthogonal ones first.
    #[must_use]
    pub fn all_neighbors(self) -> [Coord; 8] {
        let [a, b, c, d] = self.orthogonal_neighbors();
        let [e, f, g, h] = self.diagonal_neighbors();
        [a, b, c, d, e, f, g, h]
    }

    /// Whether `other` shares an edge with this coordinate.
    #[must_use]
    pub fn is_orthogonally_adjacent_to(self, other: Coord) -> bool {
        self.manhattan_distance(other) == 1
    }

    /// Whether `other` shares an edge or a corner with this coordinate.
    #[must_use]
    pub fn is_adjacent_to(self, other: Coord) -> bool {
        self != other && self.x.abs_diff(other.x) <= 1 && self.y.abs_diff(other.y) <= 1
    }

    /// Manhattan distance between two coordinates, saturating at `u32::MAX`.
    #[must_use]
    pub fn manhattan_distance(self, other: Coord) -> u32 {
        self.x.abs_diff(other.x).saturating_add(self.y.abs_diff(other.y))
    }

    /// Whether `other` lies on the same row or column (and is not `self`).
    #[must_use]
    pub fn is_collinear_with(self, other: Coord) -> bool {
        self != other && (self.x == other.x || self.y == other.y)
    }

    /// Cells strictly between two collinear coordinates, walking from `self`.
    ///
    /// The walk is lazy, so callers that stop at the first interesting cell
    /// never visit the rest. Returns `None` when the coordinates are not
    /// collinear.
    #[must_use]
    pub fn path_to(self, other: Coord) -> Option<impl Iterator<Item = Coord>> {
        if !self.is_collinear_with(other) {
            return None;
        }

        let dx = step_toward(self.x, other.x);
        let dy = step_toward(self.y, other.y);
        let steps = self.manhattan_distance(other).saturating_sub(1);
        let steps = usize::try_from(steps).unwrap_or(usize::MAX);

        let path = std::iter::successors(Some(self), move |c| Some(c.offset(dx, dy)))
            .skip(1)
            .take(steps);
        Some(path)
    }
}

/// Unit step from `from` toward `to` along one axis.
fn step_toward(from: i32, to: i32) -> i32 {
    match to.cmp(&from) {
        Ordering::Less => -1,
        Ordering::Equal => 0,
        Ordering::Greater => 1,
    }
}

impl Ord for Coord {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.y, self.x).cmp(&(other.y, other.x))
    }
}

impl PartialOrd for Coord {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

/// A string could not be parsed as an `x,y` coordinate.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
#[display("invalid coordinate {input:?}, expected \"x,y\"")]
pub struct ParseCoordError {
    /// The rejected input.
    pub input: String,
}

impl FromStr for Coord {
    type Err = ParseCoordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseCoordError {
            input: s.to_string(),
        };

        let (x, y) = s.split_once(',').ok_or_else(err)?;
        let x = x.trim().parse().map_err(|_| err())?;
        let y = y.trim().parse().map_err(|_| err())?;
        Ok(Self::new(x, y))
    }
}

impl Serialize for Coord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Coord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coord_neighbors() {
        let coord = Coord::new(5, 5);
        let orth = coord.orthogonal_neighbors();
        assert!(orth.contains(&Coord::new(5, 4))); // up
        assert!(orth.contains(&Coord::new(5, 6))); // down
        assert!(orth.contains(&Coord::new(4, 5))); // left
        assert!(orth.contains(&Coord::new(6, 5))); // right

        let all = coord.all_neighbors();
        assert_eq!(all.len(), 8);
        assert!(all.contains(&Coord::new(4, 4)));
        assert!(!all.contains(&coord));
    }

    #[test]
    fn test_coord_negative_neighbors() {
        // No edges: the origin has neighbours on every side
        let orth = Coord::new(0, 0).orthogonal_neighbors();
        assert!(orth.contains(&Coord::new(0, -1)));
        assert!(orth.contains(&Coord::new(-1, 0)));
    }

    #[test]
    fn test_adjacency() {
        let a = Coord::new(1, 1);
        assert!(a.is_adjacent_to(Coord::new(2, 2)));
        assert!(a.is_adjacent_to(Coord::new(1, 0)));
        assert!(!a.is_adjacent_to(a));
        assert!(!a.is_adjacent_to(Coord::new(3, 1)));

        assert!(a.is_orthogonally_adjacent_to(Coord::new(1, 2)));
        assert!(!a.is_orthogonally_adjacent_to(Coord::new(2, 2)));
    }

    #[test]
    fn test_manhattan_distance() {
        assert_eq!(Coord::new(0, 0).manhattan_distance(Coord::new(3, -4)), 7);
        assert_eq!(Coord::new(-2, 1).manhattan_distance(Coord::new(-2, 1)), 0);
    }

    #[test]
    fn test_collinear() {
        let a = Coord::new(0, 0);
        assert!(a.is_collinear_with(Coord::new(0, 5)));
        assert!(a.is_collinear_with(Coord::new(-3, 0)));
        assert!(!a.is_collinear_with(Coord::new(1, 1)));
        assert!(!a.is_collinear_with(a));
    }

    fn path(from: Coord, to: Coord) -> Vec<Coord> {
        from.path_to(to).unwrap().collect()
    }

    #[test]
    fn test_path_to() {
        let walked = path(Coord::new(0, 0), Coord::new(3, 0));
        assert_eq!(walked, vec![Coord::new(1, 0), Coord::new(2, 0)]);

        let walked = path(Coord::new(0, 2), Coord::new(0, -1));
        assert_eq!(walked, vec![Coord::new(0, 1), Coord::new(0, 0)]);

        // Neighbours have nothing in between
        assert!(path(Coord::new(0, 0), Coord::new(0, 1)).is_empty());

        assert!(Coord::new(0, 0).path_to(Coord::new(1, 1)).is_none());
    }

    #[test]
    fn test_path_to_is_lazy() {
        let mut walk = Coord::new(0, 0).path_to(Coord::new(0, 2_000_000_000)).unwrap();
        assert_eq!(walk.next(), Some(Coord::new(0, 1)));
        assert_eq!(walk.nth(9), Some(Coord::new(0, 11)));
    }

    #[test]
    fn test_arithmetic_at_i32_extremes() {
        let edge = Coord::new(i32::MAX, i32::MIN);
        assert_eq!(edge.offset(1, -1), edge);
        assert!(edge.all_neighbors().contains(&Coord::new(i32::MAX - 1, i32::MIN + 1)));

        let far = Coord::new(i32::MIN, i32::MAX);
        assert_eq!(edge.manhattan_distance(far), u32::MAX);
        assert_eq!(Coord::new(i32::MIN, 0).manhattan_distance(Coord::new(i32::MAX, 0)), u32::MAX);

        let mut walk = Coord::new(i32::MIN, 0).path_to(Coord::new(i32::MAX, 0)).unwrap();
        assert_eq!(walk.next(), Some(Coord::new(i32::MIN + 1, 0)));
        let last = Coord::new(i32::MAX - 3, 0).path_to(Coord::new(i32::MAX, 0)).unwrap();
        assert_eq!(last.last(), Some(Coord::new(i32::MAX - 1, 0)));
    }

    #[test]
    fn test_ordering_is_row_major() {
        let mut coords = vec![Coord::new(1, 0), Coord::new(0, 1), Coord::new(0, 0)];
        coords.sort();
        assert_eq!(
            coords,
            vec![Coord::new(0, 0), Coord::new(1, 0), Coord::new(0, 1)]
        );
    }

    #[test]
    fn test_string_key() {
        let coord = Coord::new(-3, 12);
        assert_eq!(coord.to_string(), "-3,12");
        assert_eq!("-3,12".parse::<Coord>().unwrap(), coord);
        assert_eq!(" 4 , 5 ".parse::<Coord>().unwrap(), Coord::new(4, 5));
        assert!("4;5".parse::<Coord>().is_err());
        assert!("a,5".parse::<Coord>().is_err());
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&Coord::new(2, -7)).unwrap();
        assert_eq!(json, "\"2,-7\"");
        let back: Coord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Coord::new(2, -7));
    }
}
