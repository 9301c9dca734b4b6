//! Occupancy mask: the tiles currently blocked by other agents.

use rustc_hash::FxHashSet;

use dlv_core::{AgentId, Position, Tile};

/// Set of tiles occupied by observed agents, positions rounded to the
/// nearest tile.
///
/// Built fresh for every query batch.  The querying agent's own id is always
/// left out; whether the teammate counts as an obstacle is the caller's call
/// (pass it in `exclude`).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Occupancy {
    tiles: FxHashSet<Tile>,
}

impl Occupancy {
    /// An empty mask: nothing is blocked.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build the mask from `(id, position)` observations.
    ///
    /// `me` and every id in `exclude` are skipped.
    pub fn from_agents<'a, I>(agents: I, me: Option<&AgentId>, exclude: &[&AgentId]) -> Self
    where
        I: IntoIterator<Item = (&'a AgentId, Position)>,
    {
        let tiles = agents
            .into_iter()
            .filter(|(id, _)| Some(*id) != me && !exclude.contains(id))
            .map(|(_, pos)| pos.tile())
            .collect();
        Self { tiles }
    }

    /// Build a mask directly from tiles.
    pub fn from_tiles(tiles: impl IntoIterator<Item = Tile>) -> Self {
        Self { tiles: tiles.into_iter().collect() }
    }

    #[inline]
    pub fn contains(&self, tile: Tile) -> bool {
        self.tiles.contains(&tile)
    }

    /// Number of blocked tiles (test-only accessor).
    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.tiles.len()
    }
}
