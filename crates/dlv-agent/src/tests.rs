//! Unit tests for dlv-agent.
//!
//! The game server is replaced by an in-memory [`World`](fixtures::World):
//! every action is applied to a shared grid and each attached agent is then
//! sent fresh sensing, the way the real server pushes events.

#[cfg(test)]
mod fixtures {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use async_trait::async_trait;

    use dlv_belief::{AgentObservation, Candidate, Parcel};
    use dlv_core::{AgentConfig, AgentId, Direction, ParcelId, Tile};
    use dlv_map::{GridMap, TileSpec};

    use crate::{
        ActionPort, Agent, AgentBuilder, CoordinationPort, PerceptionHandle, PickedParcel, PortError,
        PortResult, Reply, Solver, SolverProblem, TeamMessage,
    };

    /// Fast timings so standby and stuck waits do not slow the suite.
    pub fn fast() -> AgentConfig {
        AgentConfig { idle_poll_ms: 10, stuck_wait_ms: 10, ..AgentConfig::default() }
    }

    /// `w × h` spawnable grid with the listed delivery tiles.
    pub fn open_specs(w: i32, h: i32, deliveries: &[(i32, i32)]) -> Vec<TileSpec> {
        let mut specs = Vec::new();
        for x in 0..w {
            for y in 0..h {
                if deliveries.contains(&(x, y)) {
                    specs.push(TileSpec::delivery(x, y));
                } else {
                    specs.push(TileSpec::spawnable(x, y));
                }
            }
        }
        specs
    }

    struct WorldParcel {
        id:      ParcelId,
        tile:    Tile,
        reward:  u32,
        carrier: Option<AgentId>,
    }

    struct WorldState {
        width:    u32,
        height:   u32,
        specs:    Vec<TileSpec>,
        map:      GridMap,
        agents:   Vec<(AgentId, Tile)>,
        parcels:  Vec<WorldParcel>,
        score:    u32,
        moves:    usize,
        /// Parcel handed to "thief" right after the first successful move.
        steal:    Option<ParcelId>,
        watchers: Vec<PerceptionHandle>,
    }

    impl WorldState {
        fn position(&self, id: &AgentId) -> Option<Tile> {
            self.agents.iter().find(|(a, _)| a == id).map(|&(_, t)| t)
        }

        fn broadcast(&self) {
            for handle in &self.watchers {
                let me = handle.agent();
                if let Some(tile) = self.position(me) {
                    let _ = handle.on_self(me.clone(), me.as_str(), tile.x as f64, tile.y as f64, self.score as f64);
                }
                let parcels = self
                    .parcels
                    .iter()
                    .map(|p| {
                        let parcel = Parcel::new(p.id.clone(), p.tile.x as f64, p.tile.y as f64, p.reward);
                        match &p.carrier {
                            Some(c) => parcel.carried(c.clone()),
                            None => parcel,
                        }
                    })
                    .collect();
                let _ = handle.on_parcels_sensed(parcels);
                let agents = self
                    .agents
                    .iter()
                    .filter(|(id, _)| id != me)
                    .map(|(id, t)| AgentObservation::new(id.clone(), t.x as f64, t.y as f64))
                    .collect();
                let _ = handle.on_agents_sensed(agents);
            }
        }
    }

    /// Shared in-memory game.
    #[derive(Clone)]
    pub struct World(Arc<Mutex<WorldState>>);

    impl World {
        pub fn open(w: i32, h: i32, deliveries: &[(i32, i32)]) -> Self {
            let specs = open_specs(w, h, deliveries);
            let map = GridMap::build(w as u32, h as u32, &specs).unwrap();
            World(Arc::new(Mutex::new(WorldState {
                width: w as u32,
                height: h as u32,
                specs,
                map,
                agents: Vec::new(),
                parcels: Vec::new(),
                score: 0,
                moves: 0,
                steal: None,
                watchers: Vec::new(),
            })))
        }

        pub fn add_agent(&self, id: &str, x: i32, y: i32) {
            self.0.lock().unwrap().agents.push((id.into(), Tile::new(x, y)));
        }

        pub fn add_parcel(&self, id: &str, x: i32, y: i32, reward: u32) {
            self.0.lock().unwrap().parcels.push(WorldParcel {
                id: id.into(),
                tile: Tile::new(x, y),
                reward,
                carrier: None,
            });
        }

        pub fn steal_on_first_move(&self, id: &str) {
            self.0.lock().unwrap().steal = Some(id.into());
        }

        /// Start pushing perception into `handle`, optionally with the map,
        /// and send everyone a fresh round of sensing.
        pub fn attach(&self, handle: PerceptionHandle, with_map: bool) {
            let mut state = self.0.lock().unwrap();
            if with_map {
                handle.on_map(state.width, state.height, state.specs.clone()).unwrap();
            }
            state.watchers.push(handle);
            state.broadcast();
        }

        /// Push a fresh round of sensing to every attached agent.
        pub fn sense(&self) {
            self.0.lock().unwrap().broadcast();
        }

        pub fn body(&self, id: &str) -> Arc<dyn ActionPort> {
            Arc::new(Body { world: self.clone(), id: id.into() })
        }

        pub fn score(&self) -> u32 {
            self.0.lock().unwrap().score
        }

        pub fn moves(&self) -> usize {
            self.0.lock().unwrap().moves
        }

        pub fn position(&self, id: &str) -> Tile {
            self.0.lock().unwrap().position(&id.into()).unwrap()
        }
    }

    /// One agent's actions in the [`World`].
    struct Body {
        world: World,
        id:    AgentId,
    }

    #[async_trait]
    impl ActionPort for Body {
        async fn move_to(&self, direction: Direction) -> bool {
            let mut state = self.world.0.lock().unwrap();
            let Some(from) = state.position(&self.id) else { return false };
            let to = from.step(direction);
            let free = state.agents.iter().all(|(_, t)| *t != to);
            if !state.map.is_traversable(to) || !free {
                return false;
            }
            for (id, tile) in state.agents.iter_mut() {
                if *id == self.id {
                    *tile = to;
                }
            }
            for parcel in state.parcels.iter_mut() {
                if parcel.carrier.as_ref() == Some(&self.id) {
                    parcel.tile = to;
                }
            }
            state.moves += 1;
            if state.moves == 1 {
                if let Some(stolen) = state.steal.take() {
                    for parcel in state.parcels.iter_mut().filter(|p| p.id == stolen) {
                        parcel.carrier = Some("thief".into());
                    }
                }
            }
            state.broadcast();
            true
        }

        async fn pick_up(&self) -> Vec<PickedParcel> {
            let mut state = self.world.0.lock().unwrap();
            let Some(here) = state.position(&self.id) else { return Vec::new() };
            let mut picked = Vec::new();
            for parcel in state.parcels.iter_mut() {
                if parcel.tile == here && parcel.carrier.is_none() {
                    parcel.carrier = Some(self.id.clone());
                    picked.push(PickedParcel { id: parcel.id.clone(), reward: parcel.reward });
                }
            }
            state.broadcast();
            picked
        }

        async fn put_down(&self) -> bool {
            let mut state = self.world.0.lock().unwrap();
            let Some(here) = state.position(&self.id) else { return false };
            let carried = state.parcels.iter().any(|p| p.carrier.as_ref() == Some(&self.id));
            if state.map.is_delivery(here) {
                let earned: u32 = state
                    .parcels
                    .iter()
                    .filter(|p| p.carrier.as_ref() == Some(&self.id))
                    .map(|p| p.reward)
                    .sum();
                state.score += earned;
                let id = self.id.clone();
                state.parcels.retain(|p| p.carrier.as_ref() != Some(&id));
            } else {
                for parcel in state.parcels.iter_mut() {
                    if parcel.carrier.as_ref() == Some(&self.id) {
                        parcel.carrier = None;
                        parcel.tile = here;
                    }
                }
            }
            state.broadcast();
            carried
        }
    }

    /// Teammate channel that records everything and answers `ask_position`
    /// with a fixed tile.
    pub struct RecordingPort {
        pub said:       Mutex<Vec<TeamMessage>>,
        pub asked:      Mutex<Vec<TeamMessage>>,
        pub mate:       Tile,
        refuse_actions: bool,
    }

    impl RecordingPort {
        pub fn at(x: i32, y: i32) -> Arc<Self> {
            Arc::new(Self {
                said:           Mutex::new(Vec::new()),
                asked:          Mutex::new(Vec::new()),
                mate:           Tile::new(x, y),
                refuse_actions: false,
            })
        }

        /// Like [`at`](Self::at), but every `execute_action` is declined.
        pub fn refusing_actions(x: i32, y: i32) -> Arc<Self> {
            Arc::new(Self {
                said:           Mutex::new(Vec::new()),
                asked:          Mutex::new(Vec::new()),
                mate:           Tile::new(x, y),
                refuse_actions: true,
            })
        }

        pub fn claimed(&self) -> Vec<ParcelId> {
            self.said
                .lock()
                .unwrap()
                .iter()
                .filter_map(|m| match m {
                    TeamMessage::AddInTeammateBlacklist(id) => Some(id.clone()),
                    _ => None,
                })
                .collect()
        }
    }

    #[async_trait]
    impl CoordinationPort for RecordingPort {
        async fn ask(&self, _to: &AgentId, message: TeamMessage) -> PortResult<Reply> {
            let reply = match message {
                TeamMessage::AskPosition => Reply::Position(self.mate),
                TeamMessage::ExecuteAction(_) if self.refuse_actions => Reply::Ack(false),
                _ => Reply::Ack(true),
            };
            self.asked.lock().unwrap().push(message);
            Ok(reply)
        }

        async fn say(&self, _to: &AgentId, message: TeamMessage) -> PortResult<()> {
            self.said.lock().unwrap().push(message);
            Ok(())
        }
    }

    /// Teammate channel whose partner asks for availability while it is
    /// still answering `ask_position`.
    pub struct CrossingPort {
        pub inbox: Mutex<Option<PerceptionHandle>>,
        pub mate:  Tile,
    }

    impl CrossingPort {
        pub fn at(x: i32, y: i32) -> Arc<Self> {
            Arc::new(Self { inbox: Mutex::new(None), mate: Tile::new(x, y) })
        }
    }

    #[async_trait]
    impl CoordinationPort for CrossingPort {
        async fn ask(&self, to: &AgentId, message: TeamMessage) -> PortResult<Reply> {
            if message == TeamMessage::AskPosition {
                let handle = self.inbox.lock().unwrap().take();
                if let Some(handle) = handle {
                    handle.on_message(to.clone(), TeamMessage::AskAvailability(None), None)?;
                    // Answer late enough for the asker to serve its inbox.
                    tokio::time::sleep(Duration::from_millis(20)).await;
                }
                return Ok(Reply::Position(self.mate));
            }
            Ok(Reply::Ack(true))
        }

        async fn say(&self, _to: &AgentId, _message: TeamMessage) -> PortResult<()> {
            Ok(())
        }
    }

    /// Solver answering with the BFS route, counting its calls.
    #[derive(Default)]
    pub struct CountingSolver {
        pub calls: AtomicUsize,
    }

    impl CountingSolver {
        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Solver for CountingSolver {
        async fn solve(&self, problem: &SolverProblem<'_>) -> PortResult<Vec<Direction>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            problem
                .map
                .path_between(problem.from, problem.to, problem.occupied)
                .map(|route| route.directions)
                .ok_or_else(|| PortError::Solver("no path".into()))
        }
    }

    /// Solo agent `name` in `world`, attached with the map and with its
    /// initial perception applied.
    pub async fn solo(world: &World, name: &str) -> Agent {
        let (mut agent, handle) = AgentBuilder::new(name, world.body(name)).config(fast()).build().unwrap();
        world.attach(handle, true);
        agent.ctx.drain_inbox().await;
        agent
    }

    /// Agent `name` teamed with `mate` over `port`.
    pub async fn teamed(
        world: &World,
        name: &str,
        mate: &str,
        port: Arc<dyn CoordinationPort>,
    ) -> (Agent, PerceptionHandle) {
        let (mut agent, handle) = AgentBuilder::new(name, world.body(name))
            .config(fast())
            .team(port, mate)
            .build()
            .unwrap();
        world.attach(handle.clone(), true);
        agent.ctx.drain_inbox().await;
        (agent, handle)
    }

    pub fn best(agent: &Agent) -> Candidate {
        let belief = agent.belief();
        let selector = *belief.selector();
        selector.select_best(belief, agent.map().unwrap()).best.unwrap()
    }
}

// ── Protocol and builder ──────────────────────────────────────────────────────

#[cfg(test)]
mod protocol {
    use dlv_core::{AgentConfig, Direction};

    use super::fixtures::World;
    use crate::{AgentBuilder, AgentError, Primitive, TeamMessage};

    #[test]
    fn message_kinds_and_request_flags() {
        assert_eq!(TeamMessage::AskPosition.kind(), "ask_position");
        assert_eq!(TeamMessage::AddInTeammateBlacklist("p1".into()).kind(), "add_in_teammate_blacklist");
        assert!(TeamMessage::ExecuteAction(Primitive::Move(Direction::Up)).is_request());
        assert!(TeamMessage::AskAvailability(None).is_request());
        assert!(!TeamMessage::ReleaseAvailability.is_request());
        assert!(!TeamMessage::ShareDesire(dlv_core::DesireTag::Explore).is_request());
    }

    #[test]
    fn builder_rejects_invalid_config() {
        let world = World::open(3, 3, &[(0, 0)]);
        let config = AgentConfig { idle_poll_ms: 0, ..AgentConfig::default() };
        let result = AgentBuilder::new("a", world.body("a")).config(config).build();
        assert!(matches!(result, Err(AgentError::Config(_))));
    }
}

// ── Decision loop ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod decision {
    use std::time::Duration;

    use dlv_core::{DesireTag, Tile};
    use dlv_intent::{IntentError, Outcome, Predicate};

    use super::fixtures::{solo, World};

    fn five_by_five(reward: u32) -> World {
        let world = World::open(5, 5, &[(2, 2)]);
        world.add_agent("a", 0, 0);
        world.add_parcel("p1", 4, 4, reward);
        world
    }

    #[tokio::test]
    async fn unprofitable_parcel_leads_to_exploration() {
        let world = five_by_five(10);
        let mut agent = solo(&world, "a").await;
        let next = agent.derive_next().await.unwrap();
        assert_eq!(next.tag, DesireTag::Explore);
        assert_eq!(agent.queued(), vec![Predicate::explore()]);
    }

    #[tokio::test]
    async fn profitable_parcel_is_picked_up() {
        let world = five_by_five(20);
        let mut agent = solo(&world, "a").await;
        let next = agent.derive_next().await.unwrap();
        assert_eq!(next, Predicate::go_pick_up(Tile::new(4, 4), &"p1".into()));
        assert_eq!(next.to_string(), "go_pick_up 4 4 p1");
    }

    #[tokio::test]
    async fn full_load_is_delivered_before_picking_more() {
        let world = five_by_five(20);
        let mut agent = solo(&world, "a").await;
        agent.ctx.belief.set_carried(6);
        let next = agent.derive_next().await.unwrap();
        assert_eq!(next.tag, DesireTag::GoDeliver);
    }

    #[tokio::test]
    async fn nothing_is_derived_without_a_map() {
        let world = five_by_five(20);
        let (mut agent, _handle) =
            crate::AgentBuilder::new("a", world.body("a")).config(super::fixtures::fast()).build().unwrap();
        assert!(agent.derive_next().await.is_none());
        assert!(agent.queued().is_empty());
    }

    #[tokio::test]
    async fn picks_up_and_delivers() {
        let world = five_by_five(20);
        let mut agent = solo(&world, "a").await;
        tokio::time::timeout(Duration::from_secs(5), async {
            while world.score() == 0 {
                agent.step().await.unwrap();
            }
        })
        .await
        .expect("delivery did not complete");
        assert_eq!(world.score(), 20);
        assert_eq!(world.position("a"), Tile::new(2, 2));
        assert_eq!(agent.belief().carried(), 0);
    }

    #[tokio::test]
    async fn free_parcels_stop_exploration_before_any_move() {
        let world = World::open(5, 5, &[(4, 4)]);
        world.add_agent("a", 0, 0);
        let mut agent = solo(&world, "a").await;
        assert_eq!(agent.derive_next().await.unwrap().tag, DesireTag::Explore);

        world.add_parcel("p1", 1, 0, 30);
        world.sense();
        let result = agent.achieve_head().await.unwrap();
        assert!(matches!(result, Err(IntentError::Stopped(_))));
        assert_eq!(world.moves(), 0);
        assert!(agent.queued().is_empty());
    }

    #[tokio::test]
    async fn stolen_target_stops_pickup_and_is_blacklisted() {
        let world = World::open(5, 1, &[(0, 0)]);
        world.add_agent("a", 0, 0);
        world.add_parcel("p1", 4, 0, 30);
        world.steal_on_first_move("p1");
        let mut agent = solo(&world, "a").await;
        assert_eq!(agent.derive_next().await.unwrap().tag, DesireTag::GoPickUp);

        let result = agent.achieve_head().await.unwrap();
        assert!(matches!(result, Err(IntentError::Stopped(_))));
        assert_eq!(world.position("a"), Tile::new(1, 0));
        assert!(agent.belief().blacklist().contains(&"p1".into()));
        assert!(agent.belief().target().is_none());
    }

    #[tokio::test]
    async fn random_walk_backtracks_only_when_boxed_in() {
        let world = World::open(3, 1, &[(0, 0)]);
        world.add_agent("a", 2, 0);
        let mut agent = solo(&world, "a").await;
        agent.ctx.last_move = Some(dlv_core::Direction::Right);
        assert!(agent.push(Predicate::random_walk()));

        let result = agent.achieve_head().await.unwrap();
        assert_eq!(result, Ok(Outcome::Reached(Tile::new(1, 0))));
        assert_eq!(world.position("a"), Tile::new(1, 0));
    }

    #[tokio::test]
    async fn failed_exploration_falls_back_to_random_walk() {
        // A single delivery tile: nowhere to explore, nowhere to walk.
        let world = World::open(1, 1, &[(0, 0)]);
        world.add_agent("a", 0, 0);
        let mut agent = solo(&world, "a").await;

        agent.step().await.unwrap();
        assert_eq!(agent.queued(), vec![Predicate::explore()]);
        agent.step().await.unwrap();
        assert_eq!(agent.queued(), vec![Predicate::random_walk()]);
        agent.step().await.unwrap();
        assert!(agent.queued().is_empty());
    }

    #[tokio::test]
    async fn duplicate_goals_are_not_queued() {
        let world = World::open(3, 1, &[(0, 0)]);
        world.add_agent("a", 2, 0);
        let mut agent = solo(&world, "a").await;
        assert!(agent.push(Predicate::explore()));
        assert!(!agent.push(Predicate::explore()));
        assert_eq!(agent.queued().len(), 1);
    }
}

// ── Plans ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod plans {
    use std::sync::Arc;

    use dlv_core::Tile;
    use dlv_intent::{IntentError, Outcome, Predicate};

    use super::fixtures::{fast, CountingSolver, World};
    use crate::plans::standard_library;
    use crate::AgentBuilder;

    #[test]
    fn library_orders_solver_first() {
        let with = standard_library(true).unwrap();
        assert_eq!(with.plan_names(dlv_core::DesireTag::GoTo), vec!["solver_go_to", "bfs_go_to"]);
        let without = standard_library(false).unwrap();
        assert_eq!(without.plan_names(dlv_core::DesireTag::GoTo), vec!["bfs_go_to"]);
        assert_eq!(
            without.plan_names(dlv_core::DesireTag::GoDeliverJoint),
            vec!["joint_deliver", "solo_deliver"]
        );
    }

    #[tokio::test]
    async fn solver_route_is_followed() {
        let world = World::open(4, 4, &[(0, 0)]);
        world.add_agent("a", 0, 0);
        let solver = Arc::new(CountingSolver::default());
        let (mut agent, handle) = AgentBuilder::new("a", world.body("a"))
            .config(fast())
            .solver(solver.clone())
            .build()
            .unwrap();
        world.attach(handle, true);
        agent.ctx.drain_inbox().await;

        assert!(agent.push(Predicate::go_to(Tile::new(3, 2))));
        let result = agent.achieve_head().await.unwrap();
        assert_eq!(result, Ok(Outcome::Reached(Tile::new(3, 2))));
        assert_eq!(solver.calls(), 1);
        assert_eq!(world.moves(), 5);
    }

    #[tokio::test]
    async fn walled_off_target_is_unreachable() {
        let world = World::open(3, 1, &[(0, 0)]);
        world.add_agent("a", 0, 0);
        world.add_agent("x", 1, 0);
        let mut agent = super::fixtures::solo(&world, "a").await;
        assert!(agent.push(Predicate::go_to(Tile::new(2, 0))));
        let result = agent.achieve_head().await.unwrap();
        assert!(matches!(result, Err(IntentError::NoPlanSatisfied(_))));
        assert_eq!(world.moves(), 0);
    }

    #[tokio::test]
    async fn vanished_target_is_dropped_on_the_next_sensing() {
        let world = World::open(3, 1, &[(0, 0)]);
        world.add_agent("a", 0, 0);
        let mut agent = super::fixtures::solo(&world, "a").await;
        assert!(agent.push(Predicate::go_pick_up(Tile::new(2, 0), &"ghost".into())));
        let result = agent.achieve_head().await.unwrap();
        assert!(matches!(result, Err(IntentError::Stopped(_))));
        assert_eq!(world.position("a"), Tile::new(1, 0));
        assert!(agent.belief().blacklist().contains(&"ghost".into()));
    }

    #[tokio::test]
    async fn delivering_nothing_is_a_no_op() {
        let world = World::open(3, 1, &[(0, 0)]);
        world.add_agent("a", 2, 0);
        let mut agent = super::fixtures::solo(&world, "a").await;
        assert!(agent.push(Predicate::go_deliver()));
        assert_eq!(agent.achieve_head().await.unwrap(), Ok(Outcome::Delivered(0)));
        assert_eq!(world.moves(), 0);
    }

    #[tokio::test]
    async fn joint_delivery_with_nothing_on_board_fails() {
        let world = World::open(3, 1, &[(0, 0)]);
        world.add_agent("a", 2, 0);
        let mut agent = super::fixtures::solo(&world, "a").await;
        assert!(agent.push(Predicate::go_deliver_joint()));
        assert_eq!(
            agent.achieve_head().await.unwrap(),
            Err(IntentError::NoPlanSatisfied("go_deliver_joint".into()))
        );
        assert_eq!(world.moves(), 0);
    }
}

// ── Team messages ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod messages {
    use dlv_core::{DesireTag, Direction, Position, Tile};
    use dlv_intent::Predicate;

    use super::fixtures::{teamed, RecordingPort, World};
    use crate::{Primitive, Reply, TeamMessage};

    fn corridor() -> World {
        let world = World::open(5, 1, &[(0, 0)]);
        world.add_agent("a", 1, 0);
        world.add_agent("b", 4, 0);
        world
    }

    #[tokio::test]
    async fn idle_agent_stands_by_until_released() {
        let world = corridor();
        let (mut agent, _h) = teamed(&world, "a", "b", RecordingPort::at(4, 0)).await;

        let reply = agent.ctx.handle_message(TeamMessage::AskAvailability(None)).await;
        assert_eq!(reply, Reply::Ack(true));
        assert!(agent.is_standing_by());

        agent.step().await.unwrap();
        assert!(agent.queued().is_empty());

        agent.ctx.handle_message(TeamMessage::ReleaseAvailability).await;
        assert!(!agent.is_standing_by());
        agent.step().await.unwrap();
        assert_eq!(agent.queued().len(), 1);
    }

    #[tokio::test]
    async fn stoppable_intention_is_stopped_for_the_teammate() {
        let world = corridor();
        let (mut agent, _h) = teamed(&world, "a", "b", RecordingPort::at(4, 0)).await;
        agent.push(Predicate::explore());
        let head = agent.ctx.queue.head().unwrap();

        let reply = agent
            .ctx
            .handle_message(TeamMessage::AskAvailability(Some(vec![DesireTag::Explore, DesireTag::GoPickUp])))
            .await;
        assert_eq!(reply, Reply::Ack(true));
        assert!(agent.ctx.arena.is_stopped(head));
        assert!(agent.is_standing_by());
    }

    #[tokio::test]
    async fn busy_agent_refuses_availability() {
        let world = corridor();
        let (mut agent, _h) = teamed(&world, "a", "b", RecordingPort::at(4, 0)).await;
        agent.push(Predicate::go_deliver());

        let reply = agent.ctx.handle_message(TeamMessage::AskAvailability(Some(vec![DesireTag::Explore]))).await;
        assert_eq!(reply, Reply::Ack(false));
        let reply = agent.ctx.handle_message(TeamMessage::AskAvailability(None)).await;
        assert_eq!(reply, Reply::Ack(false));
        assert!(!agent.is_standing_by());
    }

    #[tokio::test]
    async fn actions_run_only_on_standby() {
        let world = corridor();
        let (mut agent, _h) = teamed(&world, "a", "b", RecordingPort::at(4, 0)).await;
        let step = TeamMessage::ExecuteAction(Primitive::Move(Direction::Right));

        assert_eq!(agent.ctx.handle_message(step.clone()).await, Reply::Ack(false));
        assert_eq!(world.position("a"), Tile::new(1, 0));

        agent.ctx.handle_message(TeamMessage::AskAvailability(None)).await;
        assert_eq!(agent.ctx.handle_message(step).await, Reply::Ack(true));
        assert_eq!(world.position("a"), Tile::new(2, 0));
        assert_eq!(agent.belief().my_tile(), Tile::new(2, 0));
    }

    #[tokio::test]
    async fn shared_state_updates_beliefs() {
        let world = corridor();
        let (mut agent, _h) = teamed(&world, "a", "b", RecordingPort::at(4, 0)).await;

        agent.ctx.handle_message(TeamMessage::SharePosition(Position::new(3.0, 0.0))).await;
        agent.ctx.handle_message(TeamMessage::ShareDesire(DesireTag::Explore)).await;
        agent
            .ctx
            .handle_message(TeamMessage::ShareParcels(vec![dlv_belief::Parcel::new("far", 3.0, 0.0, 9)]))
            .await;
        agent.ctx.handle_message(TeamMessage::AddInTeammateBlacklist("far".into())).await;

        let mate = agent.belief().teammate().unwrap();
        assert_eq!(mate.position, Some(Tile::new(3, 0)));
        assert_eq!(mate.desire, Some(DesireTag::Explore));
        assert!(agent.belief().parcel(&"far".into()).is_some());
        assert!(agent.belief().blacklist().contains(&"far".into()));
        assert_eq!(agent.ctx.handle_message(TeamMessage::AskPosition).await, Reply::Position(Tile::new(1, 0)));
    }

    #[tokio::test]
    async fn strangers_are_ignored() {
        let world = corridor();
        let (mut agent, handle) = teamed(&world, "a", "b", RecordingPort::at(4, 0)).await;
        let rx = handle.request("zz", TeamMessage::AskAvailability(None)).unwrap();
        agent.ctx.drain_inbox().await;
        assert!(rx.await.is_err());
        assert!(!agent.is_standing_by());
    }

    #[tokio::test]
    async fn perception_is_shared_with_the_teammate() {
        let world = corridor();
        let port = RecordingPort::at(4, 0);
        let (_agent, _h) = teamed(&world, "a", "b", port.clone()).await;
        let said = port.said.lock().unwrap();
        assert!(said.iter().any(|m| matches!(m, TeamMessage::SharePosition(_))));
        assert!(said.iter().any(|m| matches!(m, TeamMessage::ShareAgents(a) if a.len() == 1)));
    }
}

// ── Contention ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod contention {
    use dlv_core::{DesireTag, ParcelId, Tile};
    use dlv_intent::Predicate;

    use super::fixtures::{best, teamed, CrossingPort, RecordingPort, World};
    use crate::TeamMessage;

    /// `me` at (0,0), teammate `b` at (4,0), delivery at (0,0), parcel `p1`
    /// at `(px, 0)`.
    fn corridor(me: &str, px: i32) -> World {
        let world = World::open(5, 1, &[(0, 0)]);
        world.add_agent(me, 0, 0);
        world.add_agent("b", 4, 0);
        world.add_parcel("p1", px, 0, 30);
        world
    }

    #[tokio::test]
    async fn busy_teammate_is_not_asked() {
        let world = corridor("a", 3);
        let port = RecordingPort::at(4, 0);
        let (mut agent, _h) = teamed(&world, "a", "b", port.clone()).await;
        agent.ctx.handle_message(TeamMessage::ShareDesire(DesireTag::GoDeliver)).await;

        let next = agent.ctx.contend(&best(&agent)).await;
        assert_eq!(next, Predicate::go_pick_up(Tile::new(3, 0), &"p1".into()));
        assert_eq!(port.claimed(), vec![ParcelId::from("p1")]);
        assert!(port.asked.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn closer_agent_claims_the_parcel() {
        let world = corridor("a", 1);
        let port = RecordingPort::at(4, 0);
        let (mut agent, _h) = teamed(&world, "a", "b", port.clone()).await;
        agent.ctx.handle_message(TeamMessage::ShareDesire(DesireTag::Explore)).await;

        let next = agent.ctx.contend(&best(&agent)).await;
        assert_eq!(next.tag, DesireTag::GoPickUp);
        assert_eq!(port.claimed(), vec![ParcelId::from("p1")]);
        assert_eq!(*port.asked.lock().unwrap(), vec![TeamMessage::AskPosition]);
    }

    #[tokio::test]
    async fn farther_agent_backs_off() {
        let world = corridor("a", 3);
        let port = RecordingPort::at(4, 0);
        let (mut agent, _h) = teamed(&world, "a", "b", port.clone()).await;
        agent.ctx.handle_message(TeamMessage::ShareDesire(DesireTag::Explore)).await;

        let next = agent.ctx.contend(&best(&agent)).await;
        assert_eq!(next, Predicate::explore());
        assert!(port.claimed().is_empty());
        assert!(agent.belief().blacklist().contains(&"p1".into()));
    }

    #[tokio::test]
    async fn ties_go_to_the_smaller_id() {
        let world = corridor("a", 2);
        let port = RecordingPort::at(4, 0);
        let (mut agent, _h) = teamed(&world, "a", "b", port).await;
        agent.ctx.handle_message(TeamMessage::ShareDesire(DesireTag::Explore)).await;
        assert_eq!(agent.ctx.contend(&best(&agent)).await.tag, DesireTag::GoPickUp);

        let world = corridor("c", 2);
        let port = RecordingPort::at(4, 0);
        let (mut agent, _h) = teamed(&world, "c", "b", port).await;
        agent.ctx.handle_message(TeamMessage::ShareDesire(DesireTag::Explore)).await;
        assert_eq!(agent.ctx.contend(&best(&agent)).await.tag, DesireTag::Explore);
    }

    #[tokio::test]
    async fn standby_granted_mid_contention_queues_nothing() {
        let world = corridor("a", 2);
        let port = CrossingPort::at(4, 0);
        let (mut agent, handle) = teamed(&world, "a", "b", port.clone()).await;
        *port.inbox.lock().unwrap() = Some(handle);
        agent.ctx.handle_message(TeamMessage::ShareDesire(DesireTag::Explore)).await;

        assert_eq!(agent.derive_next().await, None);
        assert!(agent.is_standing_by());
        assert!(agent.queued().is_empty());

        agent.step().await.unwrap();
        assert_eq!(world.position("a"), Tile::new(0, 0));
        assert_eq!(world.moves(), 0);
    }

    #[tokio::test]
    async fn queued_goal_waits_while_standing_by() {
        let world = corridor("a", 2);
        let (mut agent, _h) = teamed(&world, "a", "b", RecordingPort::at(4, 0)).await;
        agent.ctx.handle_message(TeamMessage::AskAvailability(None)).await;
        agent.push(Predicate::go_pick_up(Tile::new(2, 0), &"p1".into()));

        agent.step().await.unwrap();
        assert_eq!(world.moves(), 0);
        assert_eq!(agent.queued().len(), 1);

        agent.ctx.handle_message(TeamMessage::ReleaseAvailability).await;
        agent.step().await.unwrap();
        assert_eq!(world.position("a"), Tile::new(2, 0));
        assert_eq!(agent.belief().carried(), 1);
    }
}

// ── Two agents over the local hub ─────────────────────────────────────────────

#[cfg(test)]
mod team {
    use std::sync::Arc;
    use std::time::Duration;

    use dlv_core::{AgentConfig, Tile};

    use dlv_intent::{IntentError, Predicate};

    use super::fixtures::{fast, teamed, RecordingPort, World};
    use crate::{AgentBuilder, CoordinationPort, LocalHub, PortError, TeamMessage};

    #[tokio::test]
    async fn unknown_peer_is_reported() {
        let hub = LocalHub::new();
        let link = hub.link("a");
        let err = link.say(&"zz".into(), TeamMessage::ReleaseAvailability).await.unwrap_err();
        assert_eq!(err, PortError::UnknownPeer("zz".into()));
    }

    #[tokio::test]
    async fn unanswered_ask_times_out() {
        let world = World::open(3, 1, &[(0, 0)]);
        let hub = LocalHub::new();
        let config = AgentConfig { ask_timeout_ms: Some(50), ..fast() };
        let (mut a, pa) = AgentBuilder::new("a", world.body("a"))
            .config(config)
            .team(Arc::new(hub.link("a")), "b")
            .build()
            .unwrap();
        // Registered but never run.
        let (_b, pb) = AgentBuilder::new("b", world.body("b")).config(fast()).build().unwrap();
        hub.register(pa);
        hub.register(pb);

        let result = a.ctx.ask(TeamMessage::AskPosition).await;
        assert_eq!(result, Err(PortError::Timeout));
    }

    #[tokio::test]
    async fn teammate_carries_parcels_through_a_corridor() {
        // a ─ · ─ b ─ · ─ D : b blocks the only way to the delivery tile.
        let world = World::open(5, 1, &[(4, 0)]);
        world.add_agent("a", 0, 0);
        world.add_agent("b", 2, 0);
        world.add_parcel("p1", 0, 0, 30);

        let hub = LocalHub::new();
        let (mut a, pa) = AgentBuilder::new("a", world.body("a"))
            .config(fast())
            .team(Arc::new(hub.link("a")), "b")
            .build()
            .unwrap();
        let (mut b, pb) = AgentBuilder::new("b", world.body("b"))
            .config(fast())
            .team(Arc::new(hub.link("b")), "a")
            .build()
            .unwrap();
        hub.register(pa.clone());
        hub.register(pb.clone());
        world.attach(pa, true);
        // Without a map b never derives goals of its own.
        world.attach(pb, false);

        let mate = tokio::spawn(async move {
            let _ = b.run().await;
        });
        tokio::time::timeout(Duration::from_secs(5), async {
            while world.score() == 0 {
                a.step().await.unwrap();
            }
        })
        .await
        .expect("joint delivery did not complete");
        mate.abort();

        assert_eq!(world.score(), 30);
        assert_eq!(world.position("a"), Tile::new(0, 0));
        assert_eq!(world.position("b"), Tile::new(4, 0));
        assert_eq!(a.belief().carried(), 0);
        assert!(!a.is_standing_by());
    }

    #[tokio::test]
    async fn refused_handover_takes_the_parcels_back() {
        // a ─ · ─ b ─ · ─ D : b agrees to help but declines every action.
        let world = World::open(5, 1, &[(4, 0)]);
        world.add_agent("a", 0, 0);
        world.add_agent("b", 2, 0);
        world.add_parcel("p1", 0, 0, 30);
        let port = RecordingPort::refusing_actions(2, 0);
        let (mut a, _h) = teamed(&world, "a", "b", port.clone()).await;
        assert_eq!(a.ctx.act_pick_up().await, 1);

        assert!(a.push(Predicate::go_deliver_joint()));
        let result = a.achieve_head().await.unwrap();

        // Solo delivery is then tried for real and blocked by b.
        assert_eq!(result, Err(IntentError::NoPlanSatisfied("go_deliver_joint".into())));
        assert_eq!(a.belief().carried(), 1);
        assert_eq!(world.position("a"), Tile::new(1, 0));
        assert_eq!(world.score(), 0);
        assert!(port.said.lock().unwrap().contains(&TeamMessage::ReleaseAvailability));
    }
}

// ── Telemetry ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod telemetry {
    use crate::init_tracing;

    #[test]
    fn second_install_fails() {
        let _ = init_tracing();
        assert!(init_tracing().is_err());
    }
}
