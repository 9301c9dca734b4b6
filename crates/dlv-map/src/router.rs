//! Breadth-first shortest paths with dynamic obstacles.
//!
//! # Search order
//!
//! Neighbours are visited up, down, left, right.  Among several shortest
//! paths the one found first in that order wins.  This is a property of the
//! search, not a contract: callers must not rely on which of two equal
//! paths they get.
//!
//! # Unreachable
//!
//! No path is a normal outcome.  [`GridMap::path_between`] returns `None`;
//! [`GridMap::distance`] returns the [`UNREACHABLE`] sentinel.

use std::collections::VecDeque;

use dlv_core::{Direction, Tile};

use crate::{GridMap, Occupancy};

/// Distance sentinel for "no path".
pub const UNREACHABLE: i64 = -1;

/// A shortest path.
///
/// `tiles[i]` is the tile reached after `directions[i]`; the start tile is
/// not included, so `tiles.len() == directions.len() == distance()`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Route {
    pub tiles:      Vec<Tile>,
    pub directions: Vec<Direction>,
}

impl Route {
    /// Number of moves.
    #[inline]
    pub fn distance(&self) -> u32 {
        self.directions.len() as u32
    }

    /// Replay the directions from `start`; the result is the route's end.
    pub fn replay(&self, start: Tile) -> Tile {
        self.directions.iter().fold(start, |t, &d| t.step(d))
    }

    /// Index of `tile` along the route, if the route steps onto it.
    pub fn position_of(&self, tile: Tile) -> Option<usize> {
        self.tiles.iter().position(|&t| t == tile)
    }
}

impl GridMap {
    /// Shortest 4-connected path from `start` to `end`.
    ///
    /// Only traversable tiles not in `occupied` may be stepped on.  The start
    /// tile itself is never checked (the caller stands there).  Returns an
    /// empty route if `start == end`, and `None` if `end` is outside the
    /// traversable, unoccupied subgraph reachable from `start`.
    pub fn path_between(&self, start: Tile, end: Tile, occupied: &Occupancy) -> Option<Route> {
        if start == end {
            return Some(Route::default());
        }
        let start_idx = self.index(start)?;
        if !self.is_traversable(end) || occupied.contains(end) {
            return None;
        }

        let n = self.cell_count();
        // prev[v] = direction used to first reach v; None for unreached cells.
        let mut prev: Vec<Option<Direction>> = vec![None; n];
        let mut seen = vec![false; n];
        seen[start_idx] = true;

        let mut frontier = VecDeque::from([start]);
        while let Some(cur) = frontier.pop_front() {
            for (dir, next) in self.traversable_neighbours(cur) {
                if occupied.contains(next) {
                    continue;
                }
                let Some(idx) = self.index(next) else { continue };
                if seen[idx] {
                    continue;
                }
                seen[idx] = true;
                prev[idx] = Some(dir);
                if next == end {
                    return Some(self.reconstruct(&prev, start, end));
                }
                frontier.push_back(next);
            }
        }
        None
    }

    /// Path length from `start` to `end`, or [`UNREACHABLE`].
    pub fn distance(&self, start: Tile, end: Tile, occupied: &Occupancy) -> i64 {
        self.path_between(start, end, occupied)
            .map_or(UNREACHABLE, |r| r.distance() as i64)
    }

    fn reconstruct(&self, prev: &[Option<Direction>], start: Tile, end: Tile) -> Route {
        let mut tiles = Vec::new();
        let mut directions = Vec::new();
        let mut cur = end;
        while cur != start {
            let Some(dir) = self.index(cur).and_then(|i| prev[i]) else { break };
            tiles.push(cur);
            directions.push(dir);
            cur = cur.step(dir.opposite());
        }
        tiles.reverse();
        directions.reverse();
        Route { tiles, directions }
    }
}
