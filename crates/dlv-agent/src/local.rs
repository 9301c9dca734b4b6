//! In-process coordination transport.
//!
//! Every agent registers its [`PerceptionHandle`] with a shared [`LocalHub`];
//! a [`LocalLink`] then delivers messages straight into the addressee's
//! perception queue.  Order per sender is the queue's order.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rustc_hash::FxHashMap;

use dlv_core::AgentId;

use crate::{CoordinationPort, PerceptionHandle, PortError, PortResult, Reply, TeamMessage};

/// Registry of the agents reachable in this process.
#[derive(Debug, Clone, Default)]
pub struct LocalHub {
    peers: Arc<Mutex<FxHashMap<AgentId, PerceptionHandle>>>,
}

impl LocalHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `handle`'s agent reachable under its build name.  Replaces a
    /// previous registration of the same name.
    pub fn register(&self, handle: PerceptionHandle) {
        if let Ok(mut peers) = self.peers.lock() {
            peers.insert(handle.agent().clone(), handle);
        }
    }

    /// A port that sends as `me`.
    pub fn link(&self, me: impl Into<AgentId>) -> LocalLink {
        LocalLink { me: me.into(), hub: self.clone() }
    }

    fn lookup(&self, to: &AgentId) -> PortResult<PerceptionHandle> {
        let peers = self.peers.lock().map_err(|_| PortError::Disconnected(to.clone()))?;
        peers.get(to).cloned().ok_or_else(|| PortError::UnknownPeer(to.clone()))
    }
}

/// One agent's end of a [`LocalHub`].
#[derive(Debug, Clone)]
pub struct LocalLink {
    me:  AgentId,
    hub: LocalHub,
}

#[async_trait]
impl CoordinationPort for LocalLink {
    async fn ask(&self, to: &AgentId, message: TeamMessage) -> PortResult<Reply> {
        let rx = self.hub.lookup(to)?.request(self.me.clone(), message)?;
        rx.await.map_err(|_| PortError::Disconnected(to.clone()))
    }

    async fn say(&self, to: &AgentId, message: TeamMessage) -> PortResult<()> {
        self.hub.lookup(to)?.on_message(self.me.clone(), message, None)
    }
}
