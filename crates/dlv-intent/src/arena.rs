//! Handle-indexed storage for live intentions.

use std::fmt;

use rustc_hash::FxHashMap;

use crate::Predicate;

/// Opaque intention handle.  Never reused within one arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IntentionId(pub u32);

impl fmt::Display for IntentionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle of one intention.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum IntentionState {
    #[default]
    Created,
    Started,
    Succeeded,
    Failed,
    Stopped,
}

impl IntentionState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Stopped)
    }
}

#[derive(Debug, Clone)]
pub struct Intention {
    pub predicate:    Predicate,
    pub state:        IntentionState,
    pub stopped:      bool,
    pub parent:       Option<IntentionId>,
    pub children:     Vec<IntentionId>,
    /// Name of the plan currently executing for this intention.
    pub current_plan: Option<&'static str>,
}

/// All live intentions of one agent, top-level and nested.
#[derive(Debug, Default)]
pub struct IntentionArena {
    next:  u32,
    slots: FxHashMap<IntentionId, Intention>,
}

impl IntentionArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new intention in state `Created`.
    ///
    /// A child of a stopped parent starts out stopped.
    pub fn create(&mut self, predicate: Predicate, parent: Option<IntentionId>) -> IntentionId {
        let id = IntentionId(self.next);
        self.next += 1;
        let mut stopped = false;
        if let Some(p) = parent.and_then(|p| self.slots.get_mut(&p)) {
            p.children.push(id);
            stopped = p.stopped;
        }
        self.slots.insert(
            id,
            Intention {
                predicate,
                state: IntentionState::Created,
                stopped,
                parent,
                children: Vec::new(),
                current_plan: None,
            },
        );
        id
    }

    pub fn get(&self, id: IntentionId) -> Option<&Intention> {
        self.slots.get(&id)
    }

    pub fn get_mut(&mut self, id: IntentionId) -> Option<&mut Intention> {
        self.slots.get_mut(&id)
    }

    pub fn contains(&self, id: IntentionId) -> bool {
        self.slots.contains_key(&id)
    }

    /// Mark `id` and every descendant stopped.  Running plans notice at their
    /// next poll.
    pub fn stop(&mut self, id: IntentionId) {
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if let Some(it) = self.slots.get_mut(&next) {
                it.stopped = true;
                stack.extend(it.children.iter().copied());
            }
        }
    }

    /// A removed intention counts as stopped.
    pub fn is_stopped(&self, id: IntentionId) -> bool {
        self.slots.get(&id).is_none_or(|it| it.stopped)
    }

    pub fn set_state(&mut self, id: IntentionId, state: IntentionState) {
        if let Some(it) = self.slots.get_mut(&id) {
            it.state = state;
            if state.is_terminal() {
                it.current_plan = None;
            }
        }
    }

    pub fn set_current_plan(&mut self, id: IntentionId, plan: Option<&'static str>) {
        if let Some(it) = self.slots.get_mut(&id) {
            it.current_plan = plan;
        }
    }

    /// Drop `id` and its descendants, detaching it from its parent.
    pub fn remove(&mut self, id: IntentionId) {
        let parent = self.slots.get(&id).and_then(|it| it.parent);
        if let Some(p) = parent.and_then(|p| self.slots.get_mut(&p)) {
            p.children.retain(|c| *c != id);
        }
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if let Some(it) = self.slots.remove(&next) {
                stack.extend(it.children);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
