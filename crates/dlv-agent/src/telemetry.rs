//! Structured logging setup.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::{AgentError, AgentResult};

/// Install a global `fmt` subscriber filtered by `RUST_LOG` (default `info`).
///
/// Fails if a global subscriber is already set.
pub fn init_tracing() -> AgentResult<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .try_init()
        .map_err(|e| AgentError::Telemetry(e.to_string()))
}
