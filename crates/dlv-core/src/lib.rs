//! `dlv-core` — foundational types for the `dlv` parcel-delivery agent.
//!
//! This crate is a dependency of every other `dlv-*` crate.  It has no
//! `dlv-*` dependencies and minimal external ones (only `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module      | Contents                                                 |
//! |-------------|----------------------------------------------------------|
//! | [`ids`]     | `AgentId`, `ParcelId`                                    |
//! | [`desire`]  | `DesireTag` — goal names shared by every layer           |
//! | [`geo`]     | `Tile`, `Position`, `Direction`                          |
//! | [`rng`]     | `AgentRng` (per-agent, seeded)                           |
//! | [`config`]  | `AgentConfig`                                            |
//! | [`error`]   | `CoreError`, `CoreResult`                                |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod config;
pub mod desire;
pub mod error;
pub mod geo;
pub mod ids;
pub mod rng;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::AgentConfig;
pub use desire::DesireTag;
pub use error::{CoreError, CoreResult};
pub use geo::{Direction, Position, Tile};
pub use ids::{AgentId, ParcelId};
pub use rng::AgentRng;
