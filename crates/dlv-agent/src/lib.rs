//! `dlv-agent` — the autonomous delivery agent: decision loop, concrete plan
//! library, and the two-agent coordination protocol.
//!
//! # Crate layout
//!
//! | Module          | Contents                                                        |
//! |-----------------|-----------------------------------------------------------------|
//! | [`agent`]       | `Agent`, `AgentBuilder` — the decision loop                     |
//! | [`context`]     | `AgentContext` — state lent to plans, safe points, actions      |
//! | [`plans`]       | go-to, pickup, delivery, joint delivery, explore, random walk   |
//! | [`team`]        | teammate message handling, parcel contention                    |
//! | [`protocol`]    | `TeamMessage`, `Reply`, `Primitive`                             |
//! | [`perception`]  | `PerceptionEvent`, `PerceptionHandle` — push-based sensing      |
//! | [`port`]        | `ActionPort`, `CoordinationPort`, `Solver` traits               |
//! | [`local`]       | `LocalHub`, `LocalLink` — in-process coordination transport     |
//! | [`telemetry`]   | `init_tracing`                                                  |
//! | [`error`]       | `AgentError`, `PortError`                                       |
//!
//! # Concurrency model
//!
//! Each agent runs as one task.  Perception and teammate messages arrive on
//! an unbounded queue fed through a [`PerceptionHandle`]; the agent applies
//! them only at safe points (between plan steps, at each loop tick, and while
//! it waits on an action-free pause or a teammate reply).  No state is shared
//! between agents: everything crosses the [`CoordinationPort`].
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use dlv_agent::{AgentBuilder, LocalHub};
//!
//! let hub = LocalHub::new();
//! let (mut a, pa) = AgentBuilder::new("a", Arc::new(client_a)).team(Arc::new(hub.link("a")), "b").build()?;
//! let (mut b, pb) = AgentBuilder::new("b", Arc::new(client_b)).team(Arc::new(hub.link("b")), "a").build()?;
//! hub.register(pa.clone());
//! hub.register(pb.clone());
//! tokio::spawn(async move { b.run().await });
//! a.run().await?;
//! ```

pub mod agent;
pub mod context;
pub mod error;
pub mod local;
pub mod perception;
pub mod plans;
pub mod port;
pub mod protocol;
pub mod team;
pub mod telemetry;

#[cfg(test)]
mod tests;

pub use agent::{Agent, AgentBuilder};
pub use context::{AgentContext, Team};
pub use error::{AgentError, AgentResult, PortError, PortResult};
pub use local::{LocalHub, LocalLink};
pub use perception::{PerceptionEvent, PerceptionHandle};
pub use port::{ActionPort, CoordinationPort, PickedParcel, Solver, SolverProblem};
pub use protocol::{Primitive, Reply, TeamMessage};
pub use telemetry::init_tracing;
