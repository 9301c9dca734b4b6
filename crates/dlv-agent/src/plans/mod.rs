//! The concrete plan library.
//!
//! | Desire             | Plans, in order                                  |
//! |--------------------|--------------------------------------------------|
//! | `go_to`            | `solver_go_to` (only with a solver), `bfs_go_to` |
//! | `go_pick_up`       | `pick_up`                                        |
//! | `go_deliver`       | `solo_deliver`, `joint_deliver`                  |
//! | `go_deliver_joint` | `joint_deliver`, `solo_deliver`                  |
//! | `explore`          | `explore`, `random_walk`                         |
//! | `random_walk`      | `random_walk`                                    |

mod deliver;
mod explore;
mod go_to;
mod joint;
mod pick_up;

use std::sync::Arc;

use dlv_core::DesireTag;
use dlv_intent::{IntentResult, PlanLibrary};

use crate::AgentContext;

pub use deliver::SoloDeliver;
pub use explore::{Explore, RandomWalk};
pub use go_to::{BfsGoTo, SolverGoTo};
pub use joint::JointDeliver;
pub use pick_up::PickUp;

/// Compose the library.  `with_solver` puts [`SolverGoTo`] in front of
/// [`BfsGoTo`].
pub fn standard_library(with_solver: bool) -> IntentResult<PlanLibrary<AgentContext>> {
    let mut builder = PlanLibrary::builder();
    if with_solver {
        builder = builder.route(DesireTag::GoTo, Arc::new(SolverGoTo));
    }
    builder
        .route(DesireTag::GoTo, Arc::new(BfsGoTo))
        .route(DesireTag::GoPickUp, Arc::new(PickUp))
        .route(DesireTag::GoDeliver, Arc::new(SoloDeliver))
        .route(DesireTag::GoDeliver, Arc::new(JointDeliver))
        .route(DesireTag::GoDeliverJoint, Arc::new(JointDeliver))
        .route(DesireTag::GoDeliverJoint, Arc::new(SoloDeliver))
        .route(DesireTag::Explore, Arc::new(Explore))
        .route(DesireTag::Explore, Arc::new(RandomWalk))
        .route(DesireTag::RandomWalk, Arc::new(RandomWalk))
        .build()
}
