//! Agent configuration.

use crate::{CoreError, CoreResult};

/// Tunables of one delivery agent.
///
/// Typically loaded from a TOML/JSON file by the embedding application (with
/// the `serde` feature) and handed to the agent builder.  Every field has a
/// default; see [`AgentConfig::default`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AgentConfig {
    /// The parcel selector refuses new pickups while the agent carries more
    /// than this many parcels.  Default: 5.
    pub max_carried_parcels: usize,

    /// The decision loop forces a delivery goal while the agent carries more
    /// than this many parcels.  Default: 5.
    pub delivery_threshold: usize,

    /// Capacity of the FIFO parcel blacklist.  Default: 20.
    pub blacklist_capacity: usize,

    /// `true`: parcel rewards decay while travelling, so the score subtracts
    /// the travel length.  `false`: the score is the raw reward.
    pub parcels_decay: bool,

    /// Shuffle the candidate plans of an intention before trying them.
    pub shuffle_plans: bool,

    /// Exploration heads for the most central delivery tile instead of a
    /// random one.
    pub explore_toward_center: bool,

    /// Upper bound on a teammate `ask` round trip.  `None` waits forever.
    pub ask_timeout_ms: Option<u64>,

    /// Period of the standby log line while the agent is committed to its
    /// teammate.  Default: 500 ms.
    pub idle_poll_ms: u64,

    /// Back-off after the agent found itself boxed in.  Default: 1000 ms.
    pub stuck_wait_ms: u64,

    /// Master RNG seed.  The same seed replays the same random choices.
    pub seed: u64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_carried_parcels:   5,
            delivery_threshold:    5,
            blacklist_capacity:    20,
            parcels_decay:         true,
            shuffle_plans:         false,
            explore_toward_center: false,
            ask_timeout_ms:        None,
            idle_poll_ms:          500,
            stuck_wait_ms:         1_000,
            seed:                  0,
        }
    }
}

impl AgentConfig {
    /// Reject configurations the agent cannot run with.
    pub fn validate(&self) -> CoreResult<()> {
        if self.blacklist_capacity == 0 {
            return Err(CoreError::Config("blacklist_capacity must be at least 1".into()));
        }
        if self.idle_poll_ms == 0 {
            return Err(CoreError::Config("idle_poll_ms must be positive".into()));
        }
        if self.ask_timeout_ms == Some(0) {
            return Err(CoreError::Config("ask_timeout_ms must be positive when set".into()));
        }
        Ok(())
    }
}
