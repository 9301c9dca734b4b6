//! FIFO of top-level intentions.

use std::collections::VecDeque;

use crate::{IntentionArena, IntentionId, Predicate};

/// Queue of top-level intentions awaiting (or undergoing) `achieve`.
///
/// The head is the running intention; it stays queued until the decision
/// loop removes it after `achieve` returns.
#[derive(Debug, Default)]
pub struct IntentionQueue {
    entries: VecDeque<IntentionId>,
}

impl IntentionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create and enqueue an intention for `predicate` unless an equal
    /// predicate is already queued.  Returns the new id, or `None` for a
    /// duplicate.
    pub fn push(&mut self, arena: &mut IntentionArena, predicate: Predicate) -> Option<IntentionId> {
        if self.contains_predicate(arena, &predicate) {
            return None;
        }
        let id = arena.create(predicate, None);
        self.entries.push_back(id);
        Some(id)
    }

    pub fn contains_predicate(&self, arena: &IntentionArena, predicate: &Predicate) -> bool {
        self.entries
            .iter()
            .filter_map(|id| arena.get(*id))
            .any(|it| &it.predicate == predicate)
    }

    pub fn head(&self) -> Option<IntentionId> {
        self.entries.front().copied()
    }

    /// Dequeue the head and drop it from the arena.
    pub fn finish_head(&mut self, arena: &mut IntentionArena) -> Option<IntentionId> {
        let id = self.entries.pop_front()?;
        arena.remove(id);
        Some(id)
    }

    /// Stop every queued intention.
    pub fn stop_all(&self, arena: &mut IntentionArena) {
        for id in &self.entries {
            arena.stop(*id);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = IntentionId> + '_ {
        self.entries.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
