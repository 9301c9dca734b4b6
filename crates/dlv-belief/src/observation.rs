//! Perceived entities.

use dlv_core::{AgentId, ParcelId, Position, Tile};

/// A parcel as last sensed.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Parcel {
    pub id:         ParcelId,
    /// Fractional while the parcel rides on a moving carrier.
    pub position:   Position,
    pub reward:     u32,
    pub carried_by: Option<AgentId>,
}

impl Parcel {
    pub fn new(id: impl Into<ParcelId>, x: f64, y: f64, reward: u32) -> Self {
        Self { id: id.into(), position: Position::new(x, y), reward, carried_by: None }
    }

    /// Builder-style: mark the parcel as carried by `agent`.
    pub fn carried(mut self, agent: impl Into<AgentId>) -> Self {
        self.carried_by = Some(agent.into());
        self
    }

    #[inline]
    pub fn tile(&self) -> Tile {
        self.position.tile()
    }

    #[inline]
    pub fn is_free(&self) -> bool {
        self.carried_by.is_none()
    }
}

/// Another agent as last sensed.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AgentObservation {
    pub id:       AgentId,
    pub name:     String,
    /// Fractional while the agent is mid-move; round before grid queries.
    pub position: Position,
    pub score:    f64,
}

impl AgentObservation {
    pub fn new(id: impl Into<AgentId>, x: f64, y: f64) -> Self {
        let id = id.into();
        Self { name: id.to_string(), id, position: Position::new(x, y), score: 0.0 }
    }

    #[inline]
    pub fn tile(&self) -> Tile {
        self.position.tile()
    }
}
