//! Static grid representation and its builder.
//!
//! # Data layout
//!
//! Tiles are stored column-major in a single `Vec<TileKind>`:
//!
//! ```text
//! tiles[ x * height + y ]
//! ```
//!
//! The grid is immutable once built.  A new map description from the server
//! replaces the whole `GridMap`; nothing is patched in place.

use dlv_core::{Direction, Tile};

use crate::{MapError, MapResult};

// ── Tile kinds and descriptor ─────────────────────────────────────────────────

/// Kind of a grid cell.  Only `Spawnable` and `Delivery` are traversable.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TileKind {
    /// Not walkable (a wall, or simply not described by the server).
    #[default]
    Empty,
    /// Walkable cell where parcels may appear.
    Spawnable,
    /// Walkable cell where carried parcels are cashed in.
    Delivery,
}

impl TileKind {
    #[inline]
    pub fn is_traversable(self) -> bool {
        !matches!(self, TileKind::Empty)
    }
}

/// One entry of the server's map description.
///
/// The two flags are mutually exclusive.  Every described tile is walkable:
/// a tile with `delivery == false` is recorded as `Spawnable` whatever its
/// `spawnable` flag says, and `delivery` wins if both are set.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TileSpec {
    pub x:         i32,
    pub y:         i32,
    pub delivery:  bool,
    pub spawnable: bool,
}

impl TileSpec {
    pub fn spawnable(x: i32, y: i32) -> Self {
        Self { x, y, delivery: false, spawnable: true }
    }

    pub fn delivery(x: i32, y: i32) -> Self {
        Self { x, y, delivery: true, spawnable: false }
    }

    fn kind(&self) -> TileKind {
        if self.delivery { TileKind::Delivery } else { TileKind::Spawnable }
    }
}

// ── GridMap ───────────────────────────────────────────────────────────────────

/// The static map: dimensions, tile kinds, and the precomputed list of
/// delivery tiles (in description order).
#[derive(Clone, Debug)]
pub struct GridMap {
    width:      u32,
    height:     u32,
    tiles:      Vec<TileKind>,
    deliveries: Vec<Tile>,
}

impl GridMap {
    /// Build a `width × height` grid, all `Empty`, then mark every described
    /// tile.  Fails on the first out-of-bounds coordinate.
    ///
    /// # Example
    ///
    /// ```
    /// use dlv_core::Tile;
    /// use dlv_map::{GridMap, TileSpec};
    ///
    /// let map = GridMap::build(2, 1, &[TileSpec::spawnable(0, 0), TileSpec::delivery(1, 0)]).unwrap();
    /// assert_eq!(map.deliveries(), &[Tile::new(1, 0)]);
    /// ```
    pub fn build(width: u32, height: u32, specs: &[TileSpec]) -> MapResult<GridMap> {
        let mut tiles = vec![TileKind::Empty; width as usize * height as usize];
        let mut deliveries = Vec::new();

        for spec in specs {
            let tile = Tile::new(spec.x, spec.y);
            let idx = index_of(width, height, tile).ok_or(MapError::OutOfBounds {
                x: spec.x,
                y: spec.y,
                width,
                height,
            })?;
            let kind = spec.kind();
            // A tile described twice keeps its last kind; keep the delivery
            // list in sync with that.
            if tiles[idx] == TileKind::Delivery && kind != TileKind::Delivery {
                deliveries.retain(|&d| d != tile);
            }
            if kind == TileKind::Delivery && tiles[idx] != TileKind::Delivery {
                deliveries.push(tile);
            }
            tiles[idx] = kind;
        }

        Ok(GridMap { width, height, tiles, deliveries })
    }

    // ── Dimensions ────────────────────────────────────────────────────────

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    // ── Tile queries ──────────────────────────────────────────────────────

    #[inline]
    pub fn in_bounds(&self, tile: Tile) -> bool {
        index_of(self.width, self.height, tile).is_some()
    }

    /// Kind of `tile`; anything outside the grid is `Empty`.
    #[inline]
    pub fn kind(&self, tile: Tile) -> TileKind {
        index_of(self.width, self.height, tile)
            .map(|i| self.tiles[i])
            .unwrap_or(TileKind::Empty)
    }

    #[inline]
    pub fn is_traversable(&self, tile: Tile) -> bool {
        self.kind(tile).is_traversable()
    }

    #[inline]
    pub fn is_delivery(&self, tile: Tile) -> bool {
        self.kind(tile) == TileKind::Delivery
    }

    /// All delivery tiles, in the order the map description listed them.
    pub fn deliveries(&self) -> &[Tile] {
        &self.deliveries
    }

    /// Traversable 4-neighbours of `tile`, in search order (up, down, left,
    /// right).
    pub fn traversable_neighbours(&self, tile: Tile) -> impl Iterator<Item = (Direction, Tile)> + '_ {
        Direction::ALL
            .into_iter()
            .map(move |d| (d, tile.step(d)))
            .filter(|&(_, t)| self.is_traversable(t))
    }

    /// Column-major index of `tile`, or `None` outside the grid.
    #[inline]
    pub(crate) fn index(&self, tile: Tile) -> Option<usize> {
        index_of(self.width, self.height, tile)
    }

    pub(crate) fn cell_count(&self) -> usize {
        self.tiles.len()
    }
}

#[inline]
fn index_of(width: u32, height: u32, tile: Tile) -> Option<usize> {
    if tile.x < 0 || tile.y < 0 || tile.x as u32 >= width || tile.y as u32 >= height {
        return None;
    }
    Some(tile.x as usize * height as usize + tile.y as usize)
}
