//! `dlv-map` — static tile grid and dynamic-obstacle routing.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                  |
//! |---------------|-----------------------------------------------------------|
//! | [`grid`]      | `GridMap`, `TileKind`, `TileSpec` (map descriptor)        |
//! | [`occupancy`] | `Occupancy` — tiles blocked by observed agents            |
//! | [`router`]    | `Route`, BFS `path_between`, `distance`, `UNREACHABLE`    |
//! | [`delivery`]  | nearest / random / central delivery tile queries          |
//! | [`error`]     | `MapError`, `MapResult<T>`                                |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on public types.           |

pub mod delivery;
pub mod error;
pub mod grid;
pub mod occupancy;
pub mod router;


pub use error::{MapError, MapResult};
pub use grid::{GridMap, TileKind, TileSpec};
pub use occupancy::Occupancy;
pub use router::{Route, UNREACHABLE};
