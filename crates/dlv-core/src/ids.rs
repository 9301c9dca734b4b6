//! Strongly typed identifier wrappers.
//!
//! The game server hands out opaque string ids for agents and parcels.  Both
//! are wrapped so an `AgentId` can never be passed where a `ParcelId` is
//! expected.  The ids are `Ord + Hash` so they work as map keys and sort
//! deterministically (used for contention tie-breaks).

use std::fmt;

/// Generate a typed ID wrapper around an owned string.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident;) => {
        $(#[$attr])*
        #[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Default)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[cfg_attr(feature = "serde", serde(transparent))]
        $vis struct $name(pub String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                $name(id.into())
            }

            #[inline]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                $name(id.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                $name(id)
            }
        }
    };
}

typed_id! {
    /// Server-assigned id of an agent (ourselves, the teammate, or a rival).
    pub struct AgentId;
}

typed_id! {
    /// Server-assigned id of a parcel.  Stable while the parcel is visible.
    pub struct ParcelId;
}
