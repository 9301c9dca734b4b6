//! Grid geometry: whole tiles, fractional positions and move directions.
//!
//! # Coordinate convention
//!
//! Tiles are addressed by integer `(x, y)` with the origin in the bottom-left
//! corner: `Up` increases `y`, `Right` increases `x`.  While an agent is
//! mid-move the server reports fractional positions (`10.4` or `10.6`), so
//! every observed position is a [`Position`] and must be turned into a
//! [`Tile`] before it touches the grid.

use std::fmt;

use crate::{CoreError, CoreResult};

// ── Tile ──────────────────────────────────────────────────────────────────────

/// An integer grid cell.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tile {
    pub x: i32,
    pub y: i32,
}

impl Tile {
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The neighbouring tile one step in `dir`.
    #[inline]
    pub fn step(self, dir: Direction) -> Tile {
        let (dx, dy) = dir.delta();
        Tile::new(self.x + dx, self.y + dy)
    }

    /// Manhattan distance, the lower bound of any 4-connected path.
    #[inline]
    pub fn manhattan(self, other: Tile) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Direction of a single step from `self` to the adjacent `other`.
    ///
    /// Returns `None` if the tiles are not 4-neighbours.
    pub fn direction_to(self, other: Tile) -> Option<Direction> {
        Direction::ALL.into_iter().find(|&d| self.step(d) == other)
    }

    /// Strict conversion: fails unless both coordinates are whole numbers.
    pub fn try_from_position(pos: Position) -> CoreResult<Tile> {
        if !pos.is_integral() {
            return Err(CoreError::NonIntegerPosition(pos));
        }
        Ok(Tile::new(pos.x as i32, pos.y as i32))
    }
}

impl From<Tile> for Position {
    fn from(t: Tile) -> Position {
        Position::new(t.x as f64, t.y as f64)
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

// ── Position ──────────────────────────────────────────────────────────────────

/// A reported position, possibly fractional while the subject is moving.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Round to the nearest tile (half away from zero).
    #[inline]
    pub fn tile(self) -> Tile {
        Tile::new(self.x.round() as i32, self.y.round() as i32)
    }

    /// `true` if both coordinates are finite whole numbers.
    #[inline]
    pub fn is_integral(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.x.fract() == 0.0 && self.y.fract() == 0.0
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

// ── Direction ─────────────────────────────────────────────────────────────────

/// One of the four primitive move directions.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Neighbour visit order used by the path search.
    pub const ALL: [Direction; 4] = [Direction::Up, Direction::Down, Direction::Left, Direction::Right];

    #[inline]
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up    => (0, 1),
            Direction::Down  => (0, -1),
            Direction::Left  => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    #[inline]
    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up    => Direction::Down,
            Direction::Down  => Direction::Up,
            Direction::Left  => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// Wire label used by the game server.
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Up    => "up",
            Direction::Down  => "down",
            Direction::Left  => "left",
            Direction::Right => "right",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
