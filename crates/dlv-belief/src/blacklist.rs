//! Bounded FIFO of parcel ids excluded from selection.

use std::collections::VecDeque;

use dlv_core::ParcelId;

/// Parcels the agent must not target: abandoned, stolen, or ceded to the
/// teammate.
///
/// When full, adding an id evicts the oldest entry.  Re-adding an id that is
/// already present changes nothing (it keeps its original age).
#[derive(Debug, Clone)]
pub struct Blacklist {
    capacity: usize,
    entries:  VecDeque<ParcelId>,
}

impl Blacklist {
    pub fn new(capacity: usize) -> Self {
        Self { capacity: capacity.max(1), entries: VecDeque::with_capacity(capacity) }
    }

    /// Add `id`; returns the evicted id, if any.
    pub fn push(&mut self, id: ParcelId) -> Option<ParcelId> {
        if self.contains(&id) {
            return None;
        }
        self.entries.push_back(id);
        if self.entries.len() > self.capacity {
            self.entries.pop_front()
        } else {
            None
        }
    }

    pub fn contains(&self, id: &ParcelId) -> bool {
        self.entries.contains(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &ParcelId> {
        self.entries.iter()
    }
}
