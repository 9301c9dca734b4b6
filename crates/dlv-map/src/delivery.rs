//! Delivery-tile queries built on top of the path search.

use dlv_core::{AgentRng, Tile};

use crate::{GridMap, Occupancy};

impl GridMap {
    /// The reachable delivery tile closest (by path length) to `from`.
    ///
    /// Returns `(distance, tile)`, or `None` if there are no delivery tiles
    /// or every one of them is blocked.  Equal distances keep the tile listed
    /// first in the map description.
    pub fn nearest_delivery(&self, from: Tile, occupied: &Occupancy) -> Option<(u32, Tile)> {
        let mut best: Option<(u32, Tile)> = None;
        for &d in self.deliveries() {
            if let Some(route) = self.path_between(from, d, occupied) {
                let dist = route.distance();
                if best.is_none_or(|(b, _)| dist < b) {
                    best = Some((dist, d));
                }
            }
        }
        best
    }

    /// A uniformly random delivery tile, the idle agent's default destination.
    pub fn random_delivery(&self, rng: &mut AgentRng) -> Option<Tile> {
        rng.choose(self.deliveries()).copied()
    }

    /// The delivery tile with the smallest Manhattan distance to the grid's
    /// centre.  Ties keep the tile listed first.
    pub fn central_delivery(&self) -> Option<Tile> {
        // Doubled coordinates keep the centre integral on even dimensions.
        let (cx2, cy2) = (self.width() as i64 - 1, self.height() as i64 - 1);
        self.deliveries()
            .iter()
            .copied()
            .min_by_key(|t| (2 * t.x as i64 - cx2).abs() + (2 * t.y as i64 - cy2).abs())
    }
}
