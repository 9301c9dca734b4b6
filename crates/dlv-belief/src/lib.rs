//! `dlv-belief` — what the agent currently believes about the world.
//!
//! # Crate layout
//!
//! | Module          | Contents                                                 |
//! |-----------------|----------------------------------------------------------|
//! | [`observation`] | `Parcel`, `AgentObservation`                              |
//! | [`blacklist`]   | `Blacklist` — bounded FIFO of excluded parcel ids         |
//! | [`store`]       | `BeliefStore`, `SelfState`, `TeammateView`, `Revision`    |
//! | [`selector`]    | `ParcelSelector`, `Candidate`, `Selection`, `DeliveryChoice` |
//!
//! # Design notes
//!
//! Perception is *replaced*, not merged: every sensing event swaps the whole
//! parcel (or agent) list.  A parcel that drops out of view is forgotten even
//! if it still lies on the map.  Lists shared by the teammate are the one
//! exception; they are upserted on top of the local view.
//!
//! Replacing beliefs may queue [`Revision`] signals.  The store never acts on
//! them; the decision loop drains them at its next safe point.

pub mod blacklist;
pub mod observation;
pub mod selector;
pub mod store;


pub use blacklist::Blacklist;
pub use observation::{AgentObservation, Parcel};
pub use selector::{Candidate, DeliveryChoice, ParcelSelector, Selection};
pub use store::{BeliefStore, PickupTarget, Revision, SelfState, TeammateView};
