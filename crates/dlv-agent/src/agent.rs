//! The decision loop.
//!
//! # One tick
//!
//! ```text
//! 1. perceive  apply queued perception and teammate messages; revision
//!              signals may stop the head intention
//! 2. act       on standby: wait for the teammate, queued or not
//!              queue non-empty: achieve the head, drop it whatever the
//!              outcome, then recover from a failure:
//!                NoPlanSatisfied(explore)      wait, then random_walk
//!                NoPlanSatisfied(random_walk)  wait
//!                NoPlanSatisfied(other)        explore
//!                any other error               random_walk
//!              queue empty:
//!                no map yet                    wait for perception
//!                otherwise                     derive the next desire
//! 3. yield
//! ```

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use dlv_belief::{BeliefStore, DeliveryChoice};
use dlv_core::{AgentConfig, AgentId, AgentRng, DesireTag};
use dlv_intent::{achieve, IntentError, IntentionArena, IntentionQueue, Outcome, PlanLibrary, Predicate};
use dlv_map::GridMap;

use crate::context::Team;
use crate::plans::standard_library;
use crate::{
    ActionPort, AgentContext, AgentError, AgentResult, CoordinationPort, PerceptionHandle, Solver, TeamMessage,
};

// ── Builder ───────────────────────────────────────────────────────────────────

/// Fluent builder for [`Agent`].
///
/// ```rust,ignore
/// let (mut agent, perception) = AgentBuilder::new("a1", Arc::new(client))
///     .config(config)
///     .team(Arc::new(link), "a2")
///     .build()?;
/// transport.attach(perception);
/// agent.run().await?;
/// ```
pub struct AgentBuilder {
    name:    AgentId,
    config:  AgentConfig,
    actions: Arc<dyn ActionPort>,
    team:    Option<Team>,
    solver:  Option<Arc<dyn Solver>>,
}

impl AgentBuilder {
    /// `name` salts the RNG and names the perception handle; the server id
    /// arrives later with the first self event.
    pub fn new(name: impl Into<AgentId>, actions: Arc<dyn ActionPort>) -> Self {
        Self {
            name: name.into(),
            config: AgentConfig::default(),
            actions,
            team: None,
            solver: None,
        }
    }

    pub fn config(mut self, config: AgentConfig) -> Self {
        self.config = config;
        self
    }

    /// Pair with `teammate` over `port`.
    pub fn team(mut self, port: Arc<dyn CoordinationPort>, teammate: impl Into<AgentId>) -> Self {
        self.team = Some(Team { port, mate: teammate.into() });
        self
    }

    /// Route `go_to` through `solver` first.
    pub fn solver(mut self, solver: Arc<dyn Solver>) -> Self {
        self.solver = Some(solver);
        self
    }

    /// Validate the configuration and return the agent with the handle its
    /// perception must be pushed into.
    pub fn build(self) -> AgentResult<(Agent, PerceptionHandle)> {
        self.config.validate()?;
        let library = standard_library(self.solver.is_some())?;

        let (tx, inbox) = mpsc::unbounded_channel();
        let mut belief = BeliefStore::new(&self.config);
        if let Some(team) = &self.team {
            belief.set_teammate(team.mate.clone());
        }

        let ctx = AgentContext {
            rng: AgentRng::new(self.config.seed, self.name.as_str()),
            config: self.config,
            belief,
            map: None,
            arena: IntentionArena::new(),
            queue: IntentionQueue::new(),
            actions: self.actions,
            team: self.team,
            solver: self.solver,
            inbox,
            stay_idle: false,
            last_move: None,
        };
        let handle = PerceptionHandle::new(self.name.clone(), tx);
        Ok((Agent { name: self.name, ctx, library }, handle))
    }
}

// ── Agent ─────────────────────────────────────────────────────────────────────

/// One autonomous delivery agent.
pub struct Agent {
    name:    AgentId,
    pub(crate) ctx: AgentContext,
    library: PlanLibrary<AgentContext>,
}

impl Agent {
    pub fn name(&self) -> &AgentId {
        &self.name
    }

    pub fn belief(&self) -> &BeliefStore {
        self.ctx.belief()
    }

    pub fn map(&self) -> Option<&GridMap> {
        self.ctx.map()
    }

    /// `true` while committed to the teammate.
    pub fn is_standing_by(&self) -> bool {
        self.ctx.is_standing_by()
    }

    /// Predicates currently queued, head first.
    pub fn queued(&self) -> Vec<Predicate> {
        self.ctx
            .queue
            .iter()
            .filter_map(|id| self.ctx.arena.get(id))
            .map(|it| it.predicate.clone())
            .collect()
    }

    /// Queue a goal by hand.  `false` if an equal one is already queued.
    pub fn push(&mut self, predicate: Predicate) -> bool {
        self.ctx.queue.push(&mut self.ctx.arena, predicate).is_some()
    }

    /// Run until every perception handle is dropped.
    pub async fn run(&mut self) -> AgentResult<()> {
        info!(agent = %self.name, "decision loop started");
        loop {
            self.step().await?;
        }
    }

    /// One iteration of the decision loop.
    pub async fn step(&mut self) -> AgentResult<()> {
        self.ctx.drain_inbox().await;

        if self.ctx.stay_idle {
            // The teammate drives this body until it releases it.
            let poll = Duration::from_millis(self.ctx.config.idle_poll_ms);
            if !self.ctx.pause(poll).await {
                return Err(AgentError::PerceptionClosed);
            }
            if self.ctx.stay_idle {
                debug!(agent = %self.name, "standing by for teammate");
            }
        } else if let Some(head) = self.ctx.queue.head() {
            let desire = self.ctx.arena.get(head).map(|it| it.predicate.tag);
            let result = achieve(&mut self.ctx, &self.library, head).await;
            self.ctx.queue.finish_head(&mut self.ctx.arena);
            if let Err(e) = result {
                self.recover(desire, e).await?;
            }
        } else if self.ctx.map.is_none() {
            if !self.ctx.wait_event().await {
                return Err(AgentError::PerceptionClosed);
            }
        } else {
            self.derive_next().await;
        }

        tokio::task::yield_now().await;
        Ok(())
    }

    async fn recover(&mut self, desire: Option<DesireTag>, error: IntentError) -> AgentResult<()> {
        let stuck = Duration::from_millis(self.ctx.config.stuck_wait_ms);
        match (&error, desire) {
            (IntentError::Stopped(_), _) => {
                debug!(agent = %self.name, %error, "intention stopped");
            }
            (IntentError::NoPlanSatisfied(_), Some(DesireTag::Explore)) => {
                warn!(agent = %self.name, %error, "cannot explore, waiting before a random walk");
                if !self.ctx.pause(stuck).await {
                    return Err(AgentError::PerceptionClosed);
                }
                self.push(Predicate::random_walk());
            }
            (IntentError::NoPlanSatisfied(_), Some(DesireTag::RandomWalk)) => {
                warn!(agent = %self.name, %error, "boxed in, waiting");
                if !self.ctx.pause(stuck).await {
                    return Err(AgentError::PerceptionClosed);
                }
            }
            (IntentError::NoPlanSatisfied(_), _) => {
                warn!(agent = %self.name, %error, "falling back to exploration");
                self.push(Predicate::explore());
            }
            _ => {
                warn!(agent = %self.name, %error, "loop error, recovering with a random walk");
                self.push(Predicate::random_walk());
            }
        }
        Ok(())
    }

    /// Derive the next desire from the current beliefs, queue it, and tell
    /// the teammate.  `None` without a map, or when the agent went on
    /// standby while contending for a parcel.
    ///
    /// Priority: deliver when carrying more than the threshold (or carrying
    /// anything with nothing worth picking up), else pick up the best
    /// candidate, else explore.
    pub async fn derive_next(&mut self) -> Option<Predicate> {
        let ctx = &mut self.ctx;
        let map = ctx.map.as_ref()?;
        let selector = *ctx.belief.selector();
        let carried = ctx.belief.carried();
        let selection = selector.select_best(&ctx.belief, map);

        let predicate = if carried > ctx.config.delivery_threshold || (carried > 0 && selection.best.is_none()) {
            match selector.delivery_choice(&ctx.belief, map) {
                DeliveryChoice::Solo { .. } => Predicate::go_deliver(),
                DeliveryChoice::NeedsTeammate { .. } => Predicate::go_deliver_joint(),
                DeliveryChoice::Unreachable => Predicate::explore(),
            }
        } else if let Some(candidate) = selection.best {
            if ctx.team.is_some() {
                ctx.contend(&candidate).await
            } else {
                Predicate::go_pick_up(candidate.tile, &candidate.parcel)
            }
        } else {
            Predicate::explore()
        };

        // Contention serves the inbox, so the teammate may have claimed us.
        if self.ctx.stay_idle {
            debug!(agent = %self.name, %predicate, "on standby, not queueing");
            return None;
        }
        info!(agent = %self.name, %predicate, carried, "next desire");
        self.push(predicate.clone());
        self.ctx.say(TeamMessage::ShareDesire(predicate.tag)).await;
        Some(predicate)
    }

    /// Achieve the head intention without any recovery; for driving the agent
    /// step by step.
    pub async fn achieve_head(&mut self) -> Option<Result<Outcome, IntentError>> {
        let head = self.ctx.queue.head()?;
        let result = achieve(&mut self.ctx, &self.library, head).await;
        self.ctx.queue.finish_head(&mut self.ctx.arena);
        Some(result)
    }
}
