//! `dlv-intent` — goals, the plans that resolve them, and the loop that
//! tries plans until one succeeds.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                       |
//! |---------------|----------------------------------------------------------------|
//! | [`predicate`] | `Arg`, `Predicate` — desire tag plus ordered arguments          |
//! | [`arena`]     | `IntentionId`, `IntentionState`, `Intention`, `IntentionArena`  |
//! | [`queue`]     | `IntentionQueue` — FIFO of top-level intentions, deduplicated   |
//! | [`plan`]      | `Plan` trait, `PlanLibrary`, `PlanLibraryBuilder`               |
//! | [`engine`]    | `IntentionHost` trait, `achieve`, `sub_intention`, `Outcome`    |
//! | [`error`]     | `IntentError`, `IntentResult`                                   |
//!
//! # Ownership model
//!
//! Intentions never point back at their owner.  Every intention lives in the
//! host's [`IntentionArena`] and is addressed by [`IntentionId`]; plans are
//! stateless and receive the host (`&mut H`) and the library explicitly on
//! every call.  Stopping an intention marks it and all of its descendants in
//! the arena; plans poll [`IntentionArena::is_stopped`] between discrete
//! steps.

pub mod arena;
pub mod engine;
pub mod error;
pub mod plan;
pub mod predicate;
pub mod queue;


pub use arena::{Intention, IntentionArena, IntentionId, IntentionState};
pub use engine::{achieve, sub_intention, IntentionHost, Outcome};
pub use error::{IntentError, IntentResult};
pub use plan::{Plan, PlanLibrary, PlanLibraryBuilder};
pub use predicate::{Arg, Predicate};
pub use queue::IntentionQueue;
