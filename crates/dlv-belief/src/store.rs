//! The belief store: own state, perceived parcels and agents, the blacklist,
//! the teammate view, and the queue of pending revision signals.

use std::collections::VecDeque;

use tracing::debug;

use dlv_core::{AgentConfig, AgentId, DesireTag, ParcelId, Position, Tile};
use dlv_map::{GridMap, Occupancy};

use crate::{AgentObservation, Blacklist, Parcel, ParcelSelector};

// ── Signals ───────────────────────────────────────────────────────────────────

/// A reason to reconsider the running intention, raised by perception and
/// consumed by the decision loop at its next safe point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Revision {
    /// At least one free, profitable, reachable parcel is in view.
    FreeParcelsFound,
    /// The parcel targeted by the running pickup moved, vanished, or its tile
    /// became occupied.  The parcel is already blacklisted.
    TargetParcelUnavailable(ParcelId),
}

// ── Own state and teammate ────────────────────────────────────────────────────

/// What the server last told us about ourselves.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelfState {
    /// `None` until the first `OnSelf` event.
    pub id:       Option<AgentId>,
    pub name:     String,
    pub position: Position,
    pub score:    f64,
}

/// The paired agent, as far as its messages tell.
#[derive(Debug, Clone, PartialEq)]
pub struct TeammateView {
    pub id:       AgentId,
    /// Last shared position, rounded to a tile.
    pub position: Option<Tile>,
    /// Last shared top-level desire.
    pub desire:   Option<DesireTag>,
}

/// The parcel a running pickup intention is heading for, and where it was
/// when the intention was formed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickupTarget {
    pub parcel: ParcelId,
    pub tile:   Tile,
}

// ── BeliefStore ───────────────────────────────────────────────────────────────

/// Per-agent snapshot of the world.
///
/// Read freely; mutate only from the perception boundary (the `replace_*`
/// and `merge_*` methods) and from the agent's own action bookkeeping.
#[derive(Debug, Clone)]
pub struct BeliefStore {
    me:        SelfState,
    carried:   usize,
    parcels:   Vec<Parcel>,
    agents:    Vec<AgentObservation>,
    blacklist: Blacklist,
    teammate:  Option<TeammateView>,
    target:    Option<PickupTarget>,
    selector:  ParcelSelector,
    revisions: VecDeque<Revision>,
}

impl BeliefStore {
    pub fn new(config: &AgentConfig) -> Self {
        Self {
            me:        SelfState::default(),
            carried:   0,
            parcels:   Vec::new(),
            agents:    Vec::new(),
            blacklist: Blacklist::new(config.blacklist_capacity),
            teammate:  None,
            target:    None,
            selector:  ParcelSelector::from_config(config),
            revisions: VecDeque::new(),
        }
    }

    // ── Read accessors ────────────────────────────────────────────────────

    pub fn me(&self) -> &SelfState {
        &self.me
    }

    pub fn my_id(&self) -> Option<&AgentId> {
        self.me.id.as_ref()
    }

    /// Own position rounded to the nearest tile.
    pub fn my_tile(&self) -> Tile {
        self.me.position.tile()
    }

    pub fn carried(&self) -> usize {
        self.carried
    }

    /// Perceived parcels in insertion order.
    pub fn parcels(&self) -> &[Parcel] {
        &self.parcels
    }

    pub fn parcel(&self, id: &ParcelId) -> Option<&Parcel> {
        self.parcels.iter().find(|p| &p.id == id)
    }

    pub fn agents(&self) -> &[AgentObservation] {
        &self.agents
    }

    pub fn blacklist(&self) -> &Blacklist {
        &self.blacklist
    }

    pub fn teammate(&self) -> Option<&TeammateView> {
        self.teammate.as_ref()
    }

    pub fn teammate_id(&self) -> Option<&AgentId> {
        self.teammate.as_ref().map(|t| &t.id)
    }

    pub fn target(&self) -> Option<&PickupTarget> {
        self.target.as_ref()
    }

    pub fn selector(&self) -> &ParcelSelector {
        &self.selector
    }

    /// Tiles of every other observed agent, teammate included.
    pub fn occupancy(&self) -> Occupancy {
        Occupancy::from_agents(self.agents.iter().map(|a| (&a.id, a.position)), self.my_id(), &[])
    }

    /// Tiles of every other observed agent except the teammate.
    pub fn occupancy_without_teammate(&self) -> Occupancy {
        let exclude: Vec<&AgentId> = self.teammate_id().into_iter().collect();
        Occupancy::from_agents(self.agents.iter().map(|a| (&a.id, a.position)), self.my_id(), &exclude)
    }

    // ── Perception mutators ───────────────────────────────────────────────

    /// Record an `OnSelf` event.
    pub fn update_self(&mut self, id: AgentId, name: String, position: Position, score: f64) {
        self.me = SelfState { id: Some(id), name, position, score };
    }

    /// Swap in a freshly sensed parcel list.
    ///
    /// Afterwards the running pickup target is re-checked, and if `map` is
    /// known and a free profitable parcel now exists,
    /// [`Revision::FreeParcelsFound`] is queued.
    pub fn replace_parcels(&mut self, parcels: Vec<Parcel>, map: Option<&GridMap>) {
        self.parcels = parcels;
        self.check_target(true);
        self.check_free_parcels(map);
    }

    /// Upsert parcels shared by the teammate on top of the local view.
    pub fn merge_parcels(&mut self, parcels: Vec<Parcel>, map: Option<&GridMap>) {
        for parcel in parcels {
            match self.parcels.iter_mut().find(|p| p.id == parcel.id) {
                Some(slot) => *slot = parcel,
                None => self.parcels.push(parcel),
            }
        }
        self.check_target(false);
        self.check_free_parcels(map);
    }

    /// Swap in a freshly sensed agent list.  Our own id is dropped if the
    /// server echoes it.
    pub fn replace_agents(&mut self, agents: Vec<AgentObservation>) {
        let me = self.me.id.clone();
        self.agents = agents.into_iter().filter(|a| Some(&a.id) != me.as_ref()).collect();
        self.check_target(false);
    }

    /// Upsert agents shared by the teammate.
    pub fn merge_agents(&mut self, agents: Vec<AgentObservation>) {
        for agent in agents {
            if Some(&agent.id) == self.me.id.as_ref() {
                continue;
            }
            match self.agents.iter_mut().find(|a| a.id == agent.id) {
                Some(slot) => *slot = agent,
                None => self.agents.push(agent),
            }
        }
        self.check_target(false);
    }

    // ── Own-action bookkeeping ────────────────────────────────────────────

    /// A move succeeded: advance the believed own position.
    pub fn moved_to(&mut self, tile: Tile) {
        self.me.position = tile.into();
    }

    pub fn picked_up(&mut self, count: usize) {
        self.carried += count;
    }

    pub fn put_down(&mut self) {
        self.carried = 0;
    }

    pub fn set_carried(&mut self, count: usize) {
        self.carried = count;
    }

    // ── Blacklist, target, teammate ───────────────────────────────────────

    pub fn blacklist_parcel(&mut self, id: ParcelId) {
        if let Some(evicted) = self.blacklist.push(id) {
            debug!(%evicted, "blacklist full, evicted oldest parcel");
        }
    }

    pub fn set_target(&mut self, target: Option<PickupTarget>) {
        self.target = target;
    }

    pub fn set_teammate(&mut self, id: AgentId) {
        self.teammate = Some(TeammateView { id, position: None, desire: None });
    }

    pub fn set_teammate_position(&mut self, position: Position) {
        if let Some(mate) = self.teammate.as_mut() {
            mate.position = Some(position.tile());
        }
    }

    pub fn set_teammate_desire(&mut self, desire: DesireTag) {
        if let Some(mate) = self.teammate.as_mut() {
            mate.desire = Some(desire);
        }
    }

    /// Move the teammate's believed position (and its entry in the agent
    /// list) after it executed a move on our behalf.
    pub fn teammate_moved_to(&mut self, tile: Tile) {
        let Some(mate) = self.teammate.as_mut() else { return };
        mate.position = Some(tile);
        let id = mate.id.clone();
        if let Some(obs) = self.agents.iter_mut().find(|a| a.id == id) {
            obs.position = tile.into();
        }
    }

    // ── Revisions ─────────────────────────────────────────────────────────

    /// Take every queued signal, oldest first.
    pub fn drain_revisions(&mut self) -> Vec<Revision> {
        self.revisions.drain(..).collect()
    }

    pub fn has_revisions(&self) -> bool {
        !self.revisions.is_empty()
    }

    fn check_free_parcels(&mut self, map: Option<&GridMap>) {
        let Some(map) = map else { return };
        if self.selector.select_best(self, map).best.is_some() {
            self.revisions.push_back(Revision::FreeParcelsFound);
        }
    }

    /// Blacklist and signal the pickup target if it is no longer where the
    /// intention expects it.  `refreshed` means the parcel list was replaced
    /// wholesale, so absence counts as disappearance.
    fn check_target(&mut self, refreshed: bool) {
        let Some(target) = self.target.as_ref() else { return };
        let blocked = self
            .agents
            .iter()
            .any(|a| a.tile() == target.tile && Some(&a.id) != self.me.id.as_ref());
        let unavailable = match self.parcel(&target.parcel) {
            None => refreshed,
            Some(p) => {
                p.tile() != target.tile
                    || p.carried_by.as_ref().is_some_and(|c| Some(c) != self.me.id.as_ref())
                    || blocked
            }
        };
        if unavailable {
            let id = target.parcel.clone();
            debug!(parcel = %id, "pickup target no longer available");
            self.target = None;
            self.blacklist_parcel(id.clone());
            self.revisions.push_back(Revision::TargetParcelUnavailable(id));
        }
    }
}
