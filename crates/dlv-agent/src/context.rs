//! `AgentContext` — everything a plan may touch, passed to plans explicitly.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info, warn};

use dlv_belief::{BeliefStore, Revision};
use dlv_core::{AgentConfig, AgentId, AgentRng, DesireTag, Direction, ParcelId, Tile};
use dlv_intent::{IntentError, IntentResult, IntentionArena, IntentionHost, IntentionId, IntentionQueue};
use dlv_map::GridMap;

use crate::{ActionPort, CoordinationPort, PerceptionEvent, PortError, PortResult, Reply, Solver, TeamMessage};

/// The coordination port plus the one peer it talks to.
#[derive(Clone)]
pub struct Team {
    pub port: Arc<dyn CoordinationPort>,
    pub mate: AgentId,
}

/// Mutable state of one agent.
///
/// Owned by [`Agent`](crate::Agent) and lent to plans as `&mut` for the
/// duration of each call.
pub struct AgentContext {
    pub(crate) config:    AgentConfig,
    pub(crate) belief:    BeliefStore,
    pub(crate) map:       Option<GridMap>,
    pub(crate) arena:     IntentionArena,
    pub(crate) queue:     IntentionQueue,
    pub(crate) rng:       AgentRng,
    pub(crate) actions:   Arc<dyn ActionPort>,
    pub(crate) team:      Option<Team>,
    pub(crate) solver:    Option<Arc<dyn Solver>>,
    pub(crate) inbox:     mpsc::UnboundedReceiver<PerceptionEvent>,
    /// Committed to the teammate: derive nothing until released.
    pub(crate) stay_idle: bool,
    /// Last successful own move, for the random walk's no-backtrack rule.
    pub(crate) last_move: Option<Direction>,
}

impl IntentionHost for AgentContext {
    fn intentions(&mut self) -> &mut IntentionArena {
        &mut self.arena
    }

    fn rng(&mut self) -> &mut AgentRng {
        &mut self.rng
    }

    fn shuffle_plans(&self) -> bool {
        self.config.shuffle_plans
    }
}

impl AgentContext {
    pub fn belief(&self) -> &BeliefStore {
        &self.belief
    }

    pub fn map(&self) -> Option<&GridMap> {
        self.map.as_ref()
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn is_standing_by(&self) -> bool {
        self.stay_idle
    }

    pub(crate) fn teammate(&self) -> Option<&AgentId> {
        self.team.as_ref().map(|t| &t.mate)
    }

    /// Desire of the running (head) intention.
    pub(crate) fn head_desire(&self) -> Option<(IntentionId, DesireTag)> {
        let head = self.queue.head()?;
        self.arena.get(head).map(|it| (head, it.predicate.tag))
    }

    pub(crate) fn require_map(&self) -> IntentResult<&GridMap> {
        self.map.as_ref().ok_or_else(|| IntentError::Unreachable("map not received yet".into()))
    }

    // ── Safe points ───────────────────────────────────────────────────────

    /// Apply queued perception, act on revision signals, then report whether
    /// `me` may continue.  Plans call this before every discrete action.
    pub(crate) async fn checkpoint(&mut self, me: IntentionId) -> IntentResult<()> {
        self.drain_inbox().await;
        if self.arena.is_stopped(me) {
            let predicate = self.arena.get(me).map(|it| it.predicate.to_string()).unwrap_or_default();
            return Err(IntentError::Stopped(predicate));
        }
        Ok(())
    }

    /// Handle every event already queued, then the revision signals they
    /// raised.
    pub(crate) async fn drain_inbox(&mut self) {
        while let Ok(event) = self.inbox.try_recv() {
            self.handle_event(event).await;
        }
        self.apply_revisions();
    }

    /// Block until one event arrives and handle it.
    pub(crate) async fn wait_event(&mut self) -> bool {
        match self.inbox.recv().await {
            Some(event) => {
                self.handle_event(event).await;
                self.apply_revisions();
                true
            }
            None => false,
        }
    }

    /// Sleep for `duration` while still serving perception and messages.
    /// `false` if the inbox closed.
    pub(crate) async fn pause(&mut self, duration: Duration) -> bool {
        let deadline = Instant::now() + duration;
        loop {
            tokio::select! {
                event = self.inbox.recv() => match event {
                    Some(event) => {
                        self.handle_event(event).await;
                        self.apply_revisions();
                    }
                    None => return false,
                },
                _ = sleep_until(deadline) => return true,
            }
        }
    }

    fn apply_revisions(&mut self) {
        for revision in self.belief.drain_revisions() {
            let Some((head, desire)) = self.head_desire() else { continue };
            match revision {
                Revision::FreeParcelsFound if desire == DesireTag::Explore => {
                    info!(intention = %head, "free parcels in view, stopping exploration");
                    self.arena.stop(head);
                }
                Revision::TargetParcelUnavailable(parcel) if desire == DesireTag::GoPickUp => {
                    let targets_it = self
                        .arena
                        .get(head)
                        .and_then(|it| it.predicate.id_at(2).ok())
                        .is_some_and(|id| id == parcel.as_str());
                    if targets_it {
                        info!(intention = %head, %parcel, "pickup target gone, stopping pickup");
                        self.arena.stop(head);
                    }
                }
                _ => {}
            }
        }
    }

    pub(crate) async fn handle_event(&mut self, event: PerceptionEvent) {
        match event {
            PerceptionEvent::SelfState { id, name, position, score } => {
                self.belief.update_self(id, name, position, score);
                self.say(TeamMessage::SharePosition(position)).await;
            }
            PerceptionEvent::Map { width, height, tiles } => match GridMap::build(width, height, &tiles) {
                Ok(map) => {
                    info!(width, height, deliveries = map.deliveries().len(), "map received");
                    self.map = Some(map);
                }
                Err(e) => warn!(error = %e, "rejected map description"),
            },
            PerceptionEvent::Parcels(parcels) => {
                let shared = (!parcels.is_empty()).then(|| parcels.clone());
                self.belief.replace_parcels(parcels, self.map.as_ref());
                if let Some(parcels) = shared {
                    self.say(TeamMessage::ShareParcels(parcels)).await;
                }
            }
            PerceptionEvent::Agents(agents) => {
                let shared = (!agents.is_empty()).then(|| agents.clone());
                self.belief.replace_agents(agents);
                if let Some(agents) = shared {
                    self.say(TeamMessage::ShareAgents(agents)).await;
                }
            }
            PerceptionEvent::Message { from, message, reply } => {
                if self.teammate() != Some(&from) {
                    debug!(%from, kind = message.kind(), "ignoring message from non-teammate");
                    return;
                }
                debug!(%from, kind = message.kind(), "message received");
                let answer = self.handle_message(message).await;
                if let Some(reply) = reply {
                    // The asker may have given up; nothing to do then.
                    let _ = reply.send(answer);
                }
            }
        }
    }

    // ── Actions ───────────────────────────────────────────────────────────

    /// One move; on success the believed own tile advances.
    pub(crate) async fn act_move(&mut self, direction: Direction) -> bool {
        let from = self.belief.my_tile();
        let ok = self.actions.move_to(direction).await;
        if ok {
            self.belief.moved_to(from.step(direction));
            self.last_move = Some(direction);
        }
        debug!(%from, %direction, ok, "move");
        ok
    }

    /// Pick up; returns how many parcels came on board.
    pub(crate) async fn act_pick_up(&mut self) -> usize {
        let picked = self.actions.pick_up().await.len();
        self.belief.picked_up(picked);
        debug!(at = %self.belief.my_tile(), picked, carried = self.belief.carried(), "pick up");
        picked
    }

    pub(crate) async fn act_put_down(&mut self) -> bool {
        let ok = self.actions.put_down().await;
        if ok {
            self.belief.put_down();
        }
        debug!(at = %self.belief.my_tile(), ok, "put down");
        ok
    }

    pub(crate) fn blacklist(&mut self, parcel: ParcelId) {
        self.belief.blacklist_parcel(parcel);
    }

    // ── Teammate channel ──────────────────────────────────────────────────

    /// Fire-and-forget to the teammate.  A no-op without one.
    pub(crate) async fn say(&mut self, message: TeamMessage) {
        let Some(team) = self.team.clone() else { return };
        let kind = message.kind();
        if let Err(e) = team.port.say(&team.mate, message).await {
            warn!(to = %team.mate, kind, error = %e, "say failed");
        }
    }

    /// Request/reply with the teammate.
    ///
    /// Perception and incoming messages keep being served while waiting, so
    /// two agents asking each other at once do not deadlock.  Without a
    /// configured `ask_timeout_ms` the wait is unbounded.
    pub(crate) async fn ask(&mut self, message: TeamMessage) -> PortResult<Reply> {
        let team = self.team.clone().ok_or(PortError::NoTeammate)?;
        let kind = message.kind();
        debug!(to = %team.mate, kind, "ask");

        let deadline = self.config.ask_timeout_ms.map(|ms| Instant::now() + Duration::from_millis(ms));
        let request = team.port.ask(&team.mate, message);
        tokio::pin!(request);
        loop {
            tokio::select! {
                reply = &mut request => {
                    debug!(to = %team.mate, kind, ?reply, "answer");
                    return reply;
                }
                Some(event) = self.inbox.recv() => {
                    self.handle_event(event).await;
                }
                _ = expires(deadline) => {
                    warn!(to = %team.mate, kind, "ask timed out");
                    return Err(PortError::Timeout);
                }
            }
        }
    }

    /// `ask` for a yes/no answer; anything but `Ack(true)` counts as no.
    pub(crate) async fn ask_yes(&mut self, message: TeamMessage) -> bool {
        matches!(self.ask(message).await, Ok(Reply::Ack(true)))
    }

    /// Ask the teammate where it stands and remember the answer.
    pub(crate) async fn ask_teammate_tile(&mut self) -> PortResult<Tile> {
        match self.ask(TeamMessage::AskPosition).await? {
            Reply::Position(tile) => {
                self.belief.teammate_moved_to(tile);
                Ok(tile)
            }
            other => {
                let mate = self.teammate().cloned().ok_or(PortError::NoTeammate)?;
                warn!(%mate, reply = ?other, "unexpected answer to ask_position");
                Err(PortError::Disconnected(mate))
            }
        }
    }
}

async fn expires(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
