use thiserror::Error;

use dlv_core::{AgentId, CoreError};
use dlv_intent::IntentError;

/// Failures of the external collaborators (teammate channel, solver).
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PortError {
    #[error("no teammate configured")]
    NoTeammate,

    #[error("peer `{0}` is not registered")]
    UnknownPeer(AgentId),

    #[error("channel to `{0}` closed")]
    Disconnected(AgentId),

    #[error("request timed out")]
    Timeout,

    #[error("solver failed: {0}")]
    Solver(String),
}

pub type PortResult<T> = Result<T, PortError>;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("agent configuration error: {0}")]
    Config(#[from] CoreError),

    #[error("plan library error: {0}")]
    Intent(#[from] IntentError),

    #[error("port error: {0}")]
    Port(#[from] PortError),

    #[error("every perception handle was dropped")]
    PerceptionClosed,

    #[error("tracing setup failed: {0}")]
    Telemetry(String),
}

pub type AgentResult<T> = Result<T, AgentError>;
