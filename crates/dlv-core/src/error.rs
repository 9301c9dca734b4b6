//! Framework error type.
//!
//! Sub-crates define their own error enums and convert `CoreError` into them
//! via `From` impls where a core failure can surface.

use thiserror::Error;

use crate::Position;

/// The top-level error type for `dlv-core`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CoreError {
    /// A coordinate that must name a whole tile was fractional or not finite.
    #[error("invalid parameters: position {0} is not on an integer tile")]
    NonIntegerPosition(Position),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Shorthand result type for `dlv-core`.
pub type CoreResult<T> = Result<T, CoreError>;
