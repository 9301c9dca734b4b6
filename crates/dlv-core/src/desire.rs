//! Desire tags — the names of the goals an agent can pursue.
//!
//! Tags are shared vocabulary: the intention engine dispatches on them, the
//! belief store remembers the teammate's current one, and the team protocol
//! sends them over the wire.

use std::fmt;

/// A named goal.  Arguments travel separately in a predicate.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DesireTag {
    /// Walk to `(x, y)`.
    GoTo,
    /// Walk to `(x, y)` and pick up parcel `id`.
    GoPickUp,
    /// Carry everything to the nearest delivery tile alone.
    GoDeliver,
    /// Deliver with the teammate's help (handover).
    GoDeliverJoint,
    /// Wander towards a default destination to discover parcels.
    Explore,
    /// Take one random step; the recovery goal.
    RandomWalk,
}

impl DesireTag {
    pub const ALL: [DesireTag; 6] = [
        DesireTag::GoTo,
        DesireTag::GoPickUp,
        DesireTag::GoDeliver,
        DesireTag::GoDeliverJoint,
        DesireTag::Explore,
        DesireTag::RandomWalk,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DesireTag::GoTo           => "go_to",
            DesireTag::GoPickUp       => "go_pick_up",
            DesireTag::GoDeliver      => "go_deliver",
            DesireTag::GoDeliverJoint => "go_deliver_joint",
            DesireTag::Explore        => "explore",
            DesireTag::RandomWalk     => "random_walk",
        }
    }
}

impl fmt::Display for DesireTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
