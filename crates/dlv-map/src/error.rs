//! Map-subsystem error type.

use thiserror::Error;

/// Errors produced while building a [`GridMap`](crate::GridMap).
///
/// Routing never fails with an error: an unreachable target is a normal
/// `None` / [`UNREACHABLE`](crate::UNREACHABLE) result.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MapError {
    #[error("tile ({x}, {y}) lies outside the {width}x{height} grid")]
    OutOfBounds { x: i32, y: i32, width: u32, height: u32 },
}

pub type MapResult<T> = Result<T, MapError>;
