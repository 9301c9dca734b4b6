//! Messages exchanged between the two members of a team.

use dlv_belief::{AgentObservation, Parcel};
use dlv_core::{DesireTag, Direction, ParcelId, Position, Tile};

/// One primitive action a teammate may run on the sender's behalf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Primitive {
    Move(Direction),
    PickUp,
    PutDown,
}

/// Team protocol message.
///
/// `Share*`, `AddInTeammateBlacklist` and `ReleaseAvailability` are sent with
/// `say`; `AskAvailability`, `AskPosition` and `ExecuteAction` with `ask`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TeamMessage {
    SharePosition(Position),
    ShareParcels(Vec<Parcel>),
    ShareAgents(Vec<AgentObservation>),
    ShareDesire(DesireTag),
    /// The sender has claimed this parcel.
    AddInTeammateBlacklist(ParcelId),
    /// Go on standby.  `Some(desires)`: accept if idle or if the running
    /// intention has one of these desires (it is stopped).  `None`: accept
    /// only if idle.
    AskAvailability(Option<Vec<DesireTag>>),
    AskPosition,
    /// Run exactly one primitive; only honoured while on standby.
    ExecuteAction(Primitive),
    ReleaseAvailability,
}

impl TeamMessage {
    /// Wire-style name, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            TeamMessage::SharePosition(_) => "share_position",
            TeamMessage::ShareParcels(_) => "share_parcels",
            TeamMessage::ShareAgents(_) => "share_agents",
            TeamMessage::ShareDesire(_) => "share_desire",
            TeamMessage::AddInTeammateBlacklist(_) => "add_in_teammate_blacklist",
            TeamMessage::AskAvailability(_) => "ask_availability",
            TeamMessage::AskPosition => "ask_position",
            TeamMessage::ExecuteAction(_) => "execute_action",
            TeamMessage::ReleaseAvailability => "release_availability",
        }
    }

    /// `true` for message kinds that expect a reply.
    pub fn is_request(&self) -> bool {
        matches!(
            self,
            TeamMessage::AskAvailability(_) | TeamMessage::AskPosition | TeamMessage::ExecuteAction(_)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Reply {
    Ack(bool),
    Position(Tile),
    /// Reply to a notification, or to a request the receiver cannot serve.
    None,
}
