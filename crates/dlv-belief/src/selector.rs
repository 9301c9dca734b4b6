//! Parcel scoring and selection.
//!
//! # Scoring
//!
//! For a free, non-blacklisted parcel `p` with reward `r`:
//!
//!   total = dist(me → p)  +  dist(p → nearest delivery)
//!   score = r − total − carried × total        (decaying rewards)
//!   score = r                                  (static rewards)
//!
//! `dist(me → p)` treats every observed agent as an obstacle.  The delivery
//! leg leaves the teammate out of the mask, since the teammate can step aside
//! or take part in a handover.  When the delivery leg is only possible thanks
//! to that exclusion the candidate is flagged `needs_teammate`.
//!
//! Only candidates with `score > 0` are kept.  Equal scores resolve to the
//! parcel perceived first (insertion order of the belief's parcel list).

use dlv_core::{AgentConfig, ParcelId, Tile};
use dlv_map::GridMap;

use crate::{BeliefStore, Blacklist, Parcel};

/// One scored parcel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub parcel:            ParcelId,
    pub tile:              Tile,
    pub score:             i64,
    pub agent_distance:    u32,
    pub delivery_distance: u32,
    pub delivery:          Tile,
    pub needs_teammate:    bool,
}

/// Result of [`ParcelSelector::select_best`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub best: Option<Candidate>,
}

impl Selection {
    pub fn parcel(&self) -> Option<&ParcelId> {
        self.best.as_ref().map(|c| &c.parcel)
    }

    pub fn needs_teammate(&self) -> bool {
        self.best.as_ref().is_some_and(|c| c.needs_teammate)
    }
}

/// How the parcels already carried can reach a delivery tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryChoice {
    /// Reachable with every observed agent treated as an obstacle.
    Solo { distance: u32, delivery: Tile },
    /// Reachable only if the teammate's tile is crossed.
    NeedsTeammate { distance: u32, delivery: Tile },
    Unreachable,
}

/// Stateless scorer parameterised by the agent's carry cap and reward model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParcelSelector {
    pub max_carried: usize,
    pub decay:       bool,
}

impl Default for ParcelSelector {
    fn default() -> Self {
        Self::from_config(&AgentConfig::default())
    }
}

impl ParcelSelector {
    pub fn from_config(config: &AgentConfig) -> Self {
        Self { max_carried: config.max_carried_parcels, decay: config.parcels_decay }
    }

    /// Best candidate given the belief's own carried count and blacklist.
    pub fn select_best(&self, belief: &BeliefStore, map: &GridMap) -> Selection {
        self.select_best_with(belief, map, belief.carried(), belief.blacklist())
    }

    /// Best candidate with an explicit carried count and blacklist.
    pub fn select_best_with(
        &self,
        belief: &BeliefStore,
        map: &GridMap,
        carried: usize,
        blacklist: &Blacklist,
    ) -> Selection {
        if carried > self.max_carried {
            return Selection::default();
        }
        let mut best: Option<Candidate> = None;
        for parcel in belief.parcels() {
            if blacklist.contains(&parcel.id) {
                continue;
            }
            let Some(candidate) = self.evaluate(parcel, belief, map, carried) else { continue };
            if candidate.score <= 0 {
                continue;
            }
            if best.as_ref().is_none_or(|b| candidate.score > b.score) {
                best = Some(candidate);
            }
        }
        Selection { best }
    }

    /// Score one parcel.  `None` when it is carried or either leg is
    /// unreachable.  The score may be non-positive.
    pub fn evaluate(
        &self,
        parcel: &Parcel,
        belief: &BeliefStore,
        map: &GridMap,
        carried: usize,
    ) -> Option<Candidate> {
        if !parcel.is_free() {
            return None;
        }
        let tile = parcel.tile();
        let everyone = belief.occupancy();
        let agent_distance = map.path_between(belief.my_tile(), tile, &everyone)?.distance();

        let (delivery_distance, delivery) =
            map.nearest_delivery(tile, &belief.occupancy_without_teammate())?;
        let needs_teammate =
            belief.teammate().is_some() && map.nearest_delivery(tile, &everyone).is_none();

        Some(Candidate {
            parcel: parcel.id.clone(),
            tile,
            score: self.score(parcel.reward, agent_distance + delivery_distance, carried),
            agent_distance,
            delivery_distance,
            delivery,
            needs_teammate,
        })
    }

    /// Raw score formula; see the module docs.
    pub fn score(&self, reward: u32, total: u32, carried: usize) -> i64 {
        if !self.decay {
            return reward as i64;
        }
        let total = total as i64;
        reward as i64 - total - carried as i64 * total
    }

    /// Where the parcels already on board should go.
    pub fn delivery_choice(&self, belief: &BeliefStore, map: &GridMap) -> DeliveryChoice {
        let from = belief.my_tile();
        if let Some((distance, delivery)) = map.nearest_delivery(from, &belief.occupancy()) {
            return DeliveryChoice::Solo { distance, delivery };
        }
        if belief.teammate().is_none() {
            return DeliveryChoice::Unreachable;
        }
        match map.nearest_delivery(from, &belief.occupancy_without_teammate()) {
            Some((distance, delivery)) => DeliveryChoice::NeedsTeammate { distance, delivery },
            None => DeliveryChoice::Unreachable,
        }
    }
}
