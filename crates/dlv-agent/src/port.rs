//! Ports to the outside world: game actions, the teammate channel and the
//! external path solver.
//!
//! The core never talks to a socket.  Whoever embeds the agent implements
//! these traits over the real transport; the tests implement them over an
//! in-memory grid.

use async_trait::async_trait;

use dlv_core::{AgentId, Direction, ParcelId, Tile};
use dlv_map::{GridMap, Occupancy};

use crate::{PortResult, Reply, TeamMessage};

/// A parcel handed back by a successful pickup.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PickedParcel {
    pub id:     ParcelId,
    pub reward: u32,
}

/// Primitive game actions of one agent.
///
/// Every call completes before the agent looks at its stop flags again; the
/// agent never drops an in-flight action future.
#[async_trait]
pub trait ActionPort: Send + Sync {
    /// One step.  `false` if the server refused (wall, occupied tile, lag).
    async fn move_to(&self, direction: Direction) -> bool;

    /// Pick up everything on the current tile.
    async fn pick_up(&self) -> Vec<PickedParcel>;

    /// Drop everything carried on the current tile.
    async fn put_down(&self) -> bool;
}

/// Request/reply and fire-and-forget messaging with the teammate.
///
/// Messages from one sender must arrive in send order.
#[async_trait]
pub trait CoordinationPort: Send + Sync {
    async fn ask(&self, to: &AgentId, message: TeamMessage) -> PortResult<Reply>;

    async fn say(&self, to: &AgentId, message: TeamMessage) -> PortResult<()>;
}

/// Input to an external [`Solver`].
#[derive(Debug, Clone, Copy)]
pub struct SolverProblem<'a> {
    pub map:      &'a GridMap,
    pub from:     Tile,
    pub to:       Tile,
    pub occupied: &'a Occupancy,
}

/// Black-box planner turning a `go_to` goal into a move sequence.
#[async_trait]
pub trait Solver: Send + Sync {
    async fn solve(&self, problem: &SolverProblem<'_>) -> PortResult<Vec<Direction>>;
}
