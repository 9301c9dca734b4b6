//! Desire predicates: a tag plus its ordered arguments.

use std::fmt;

use dlv_core::{DesireTag, ParcelId, Position, Tile};

use crate::{IntentError, IntentResult};

/// One predicate argument.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Arg {
    Num(f64),
    Id(String),
}

impl fmt::Display for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Num(n) if n.fract() == 0.0 && n.is_finite() => write!(f, "{}", *n as i64),
            Arg::Num(n) => write!(f, "{n}"),
            Arg::Id(s) => f.write_str(s),
        }
    }
}

/// `(desire, args...)`, e.g. `go_pick_up 4 4 p1`.
///
/// Two intentions with equal predicates are the same goal; the queue keeps at
/// most one of them.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Predicate {
    pub tag:  DesireTag,
    pub args: Vec<Arg>,
}

impl Predicate {
    pub fn new(tag: DesireTag) -> Self {
        Self { tag, args: Vec::new() }
    }

    /// Builder-style: append `x y`.
    pub fn with_tile(mut self, tile: Tile) -> Self {
        self.args.push(Arg::Num(tile.x as f64));
        self.args.push(Arg::Num(tile.y as f64));
        self
    }

    /// Builder-style: append raw, possibly fractional, coordinates.
    pub fn with_position(mut self, pos: Position) -> Self {
        self.args.push(Arg::Num(pos.x));
        self.args.push(Arg::Num(pos.y));
        self
    }

    /// Builder-style: append an identifier.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.args.push(Arg::Id(id.into()));
        self
    }

    // ── Common shapes ─────────────────────────────────────────────────────

    pub fn go_to(tile: Tile) -> Self {
        Self::new(DesireTag::GoTo).with_tile(tile)
    }

    pub fn go_pick_up(tile: Tile, parcel: &ParcelId) -> Self {
        Self::new(DesireTag::GoPickUp).with_tile(tile).with_id(parcel.as_str())
    }

    pub fn go_deliver() -> Self {
        Self::new(DesireTag::GoDeliver)
    }

    pub fn go_deliver_joint() -> Self {
        Self::new(DesireTag::GoDeliverJoint)
    }

    pub fn explore() -> Self {
        Self::new(DesireTag::Explore)
    }

    pub fn random_walk() -> Self {
        Self::new(DesireTag::RandomWalk)
    }

    // ── Argument access ───────────────────────────────────────────────────

    /// The tile formed by arguments `i` and `i + 1`.
    ///
    /// Fails with [`IntentError::InvalidParameters`] if either is missing, is
    /// not a number, or is not a whole tile coordinate.
    pub fn tile_at(&self, i: usize) -> IntentResult<Tile> {
        let x = self.num_at(i)?;
        let y = self.num_at(i + 1)?;
        Tile::try_from_position(Position::new(x, y)).map_err(|e| self.invalid(e.to_string()))
    }

    /// The identifier at argument `i`.
    pub fn id_at(&self, i: usize) -> IntentResult<&str> {
        match self.args.get(i) {
            Some(Arg::Id(s)) => Ok(s),
            Some(other) => Err(self.invalid(format!("argument {i} ({other}) is not an identifier"))),
            None => Err(self.invalid(format!("missing argument {i}"))),
        }
    }

    fn num_at(&self, i: usize) -> IntentResult<f64> {
        match self.args.get(i) {
            Some(Arg::Num(n)) => Ok(*n),
            Some(other) => Err(self.invalid(format!("argument {i} ({other}) is not a number"))),
            None => Err(self.invalid(format!("missing argument {i}"))),
        }
    }

    fn invalid(&self, reason: String) -> IntentError {
        IntentError::InvalidParameters { predicate: self.to_string(), reason }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag.as_str())?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}
