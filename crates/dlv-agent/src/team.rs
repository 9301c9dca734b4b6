//! Coordination protocol: handling teammate messages and resolving
//! contention over a parcel both agents could take.

use tracing::{debug, info, warn};

use dlv_belief::Candidate;
use dlv_core::DesireTag;
use dlv_intent::Predicate;
use dlv_map::UNREACHABLE;

use crate::{AgentContext, Primitive, Reply, TeamMessage};

impl AgentContext {
    /// Apply one teammate message and produce the reply (`Reply::None` for
    /// notifications).
    pub(crate) async fn handle_message(&mut self, message: TeamMessage) -> Reply {
        match message {
            TeamMessage::SharePosition(position) => {
                self.belief.set_teammate_position(position);
                Reply::None
            }
            TeamMessage::ShareParcels(parcels) => {
                self.belief.merge_parcels(parcels, self.map.as_ref());
                Reply::None
            }
            TeamMessage::ShareAgents(agents) => {
                self.belief.merge_agents(agents);
                Reply::None
            }
            TeamMessage::ShareDesire(desire) => {
                debug!(%desire, "teammate desire");
                self.belief.set_teammate_desire(desire);
                Reply::None
            }
            TeamMessage::AddInTeammateBlacklist(parcel) => {
                debug!(%parcel, "teammate claimed parcel");
                self.blacklist(parcel);
                Reply::None
            }
            TeamMessage::AskAvailability(stoppable) => Reply::Ack(self.offer_availability(stoppable.as_deref())),
            TeamMessage::AskPosition => Reply::Position(self.belief.my_tile()),
            TeamMessage::ExecuteAction(primitive) => Reply::Ack(self.execute_for_teammate(primitive).await),
            TeamMessage::ReleaseAvailability => {
                if self.stay_idle {
                    info!("released by teammate");
                }
                self.stay_idle = false;
                Reply::None
            }
        }
    }

    /// Go on standby if idle, or if the running intention's desire is in
    /// `stoppable` (it is stopped).
    fn offer_availability(&mut self, stoppable: Option<&[DesireTag]>) -> bool {
        match self.head_desire() {
            None => {
                info!("standing by for teammate");
                self.stay_idle = true;
                true
            }
            Some((head, desire)) if stoppable.is_some_and(|s| s.contains(&desire)) => {
                info!(intention = %head, %desire, "stopping intention to stand by for teammate");
                self.arena.stop(head);
                self.stay_idle = true;
                true
            }
            Some((_, desire)) => {
                debug!(%desire, "busy, refusing availability");
                false
            }
        }
    }

    async fn execute_for_teammate(&mut self, primitive: Primitive) -> bool {
        if !self.stay_idle {
            warn!(?primitive, "execute_action while not on standby, refused");
            return false;
        }
        match primitive {
            Primitive::Move(direction) => self.act_move(direction).await,
            Primitive::PickUp => self.act_pick_up().await > 0,
            Primitive::PutDown => self.act_put_down().await,
        }
    }

    /// Decide who takes `candidate` and return this agent's next goal.
    ///
    /// A busy teammate (desire other than exploration, or unknown) cannot
    /// compete: claim the parcel.  An exploring teammate competes on path
    /// length from its reported tile; the strictly closer agent wins, equal
    /// distances go to the smaller agent id.  The winner tells the teammate
    /// to blacklist the parcel; the loser blacklists it itself and explores.
    pub(crate) async fn contend(&mut self, candidate: &Candidate) -> Predicate {
        let pickup = Predicate::go_pick_up(candidate.tile, &candidate.parcel);
        let mate_desire = self.belief.teammate().and_then(|t| t.desire);
        if mate_desire != Some(DesireTag::Explore) {
            self.say(TeamMessage::AddInTeammateBlacklist(candidate.parcel.clone())).await;
            return pickup;
        }

        let mate_tile = match self.ask_teammate_tile().await {
            Ok(tile) => tile,
            Err(e) => {
                warn!(error = %e, "teammate position unknown, claiming parcel");
                self.say(TeamMessage::AddInTeammateBlacklist(candidate.parcel.clone())).await;
                return pickup;
            }
        };

        let Some(map) = self.map.as_ref() else { return Predicate::explore() };
        let occupied = self.belief.occupancy_without_teammate();
        let mine = map.distance(self.belief.my_tile(), candidate.tile, &occupied);
        let theirs = map.distance(mate_tile, candidate.tile, &occupied);
        let tie_won = match (self.belief.my_id(), self.teammate()) {
            (Some(me), Some(mate)) => me < mate,
            _ => true,
        };
        let won = theirs == UNREACHABLE
            || (mine != UNREACHABLE && (mine < theirs || (mine == theirs && tie_won)));

        debug!(parcel = %candidate.parcel, mine, theirs, won, "contention");
        if won {
            self.say(TeamMessage::AddInTeammateBlacklist(candidate.parcel.clone())).await;
            pickup
        } else {
            self.blacklist(candidate.parcel.clone());
            Predicate::explore()
        }
    }
}
