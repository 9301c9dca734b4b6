use dlv_core::DesireTag;
use thiserror::Error;

use crate::IntentionId;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum IntentError {
    #[error("invalid parameters for `{predicate}`: {reason}")]
    InvalidParameters { predicate: String, reason: String },

    #[error("intention `{0}` was stopped")]
    Stopped(String),

    #[error("no plan satisfied the intention `{0}`")]
    NoPlanSatisfied(String),

    #[error("action failed: {0}")]
    ActionFailed(String),

    #[error("no path to {0}")]
    Unreachable(String),

    #[error("coordination failed: {0}")]
    Coordination(String),

    #[error("unknown intention {0}")]
    UnknownIntention(IntentionId),

    #[error("plan `{plan}` is not applicable to `{desire}`")]
    NotApplicable { plan: &'static str, desire: DesireTag },
}

impl IntentError {
    /// `true` for cooperative cancellation, which callers treat as a normal
    /// way for an intention to end.
    pub fn is_stopped(&self) -> bool {
        matches!(self, IntentError::Stopped(_))
    }
}

pub type IntentResult<T> = Result<T, IntentError>;
