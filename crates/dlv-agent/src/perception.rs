//! Push-based perception boundary.
//!
//! The transport calls the `on_*` methods of a [`PerceptionHandle`] from
//! whatever task it runs on.  Events are queued and applied by the agent at
//! its next safe point: between plan steps, at each loop tick, and while it
//! waits.

use tokio::sync::{mpsc, oneshot};

use dlv_belief::{AgentObservation, Parcel};
use dlv_core::{AgentId, Position};
use dlv_map::TileSpec;

use crate::{PortError, PortResult, Reply, TeamMessage};

/// Queued perception event.
#[derive(Debug)]
pub enum PerceptionEvent {
    SelfState { id: AgentId, name: String, position: Position, score: f64 },
    Map { width: u32, height: u32, tiles: Vec<TileSpec> },
    Parcels(Vec<Parcel>),
    Agents(Vec<AgentObservation>),
    Message { from: AgentId, message: TeamMessage, reply: Option<oneshot::Sender<Reply>> },
}

/// Cloneable sender side of an agent's perception queue.
#[derive(Debug, Clone)]
pub struct PerceptionHandle {
    id: AgentId,
    tx: mpsc::UnboundedSender<PerceptionEvent>,
}

impl PerceptionHandle {
    pub(crate) fn new(id: AgentId, tx: mpsc::UnboundedSender<PerceptionEvent>) -> Self {
        Self { id, tx }
    }

    /// Name the agent was built with.
    pub fn agent(&self) -> &AgentId {
        &self.id
    }

    pub fn on_self(&self, id: impl Into<AgentId>, name: impl Into<String>, x: f64, y: f64, score: f64) -> PortResult<()> {
        self.send(PerceptionEvent::SelfState {
            id:       id.into(),
            name:     name.into(),
            position: Position::new(x, y),
            score,
        })
    }

    pub fn on_map(&self, width: u32, height: u32, tiles: Vec<TileSpec>) -> PortResult<()> {
        self.send(PerceptionEvent::Map { width, height, tiles })
    }

    pub fn on_parcels_sensed(&self, parcels: Vec<Parcel>) -> PortResult<()> {
        self.send(PerceptionEvent::Parcels(parcels))
    }

    pub fn on_agents_sensed(&self, agents: Vec<AgentObservation>) -> PortResult<()> {
        self.send(PerceptionEvent::Agents(agents))
    }

    /// Deliver a team message.  Pass `reply` for requests; the agent answers
    /// through it once the message is handled.
    pub fn on_message(
        &self,
        from:    impl Into<AgentId>,
        message: TeamMessage,
        reply:   Option<oneshot::Sender<Reply>>,
    ) -> PortResult<()> {
        self.send(PerceptionEvent::Message { from: from.into(), message, reply })
    }

    /// Deliver a request and hand back the receiver for its reply.
    pub fn request(&self, from: impl Into<AgentId>, message: TeamMessage) -> PortResult<oneshot::Receiver<Reply>> {
        let (tx, rx) = oneshot::channel();
        self.on_message(from, message, Some(tx))?;
        Ok(rx)
    }

    fn send(&self, event: PerceptionEvent) -> PortResult<()> {
        self.tx.send(event).map_err(|_| PortError::Disconnected(self.id.clone()))
    }
}
