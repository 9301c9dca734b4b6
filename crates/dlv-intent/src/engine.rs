//! The achieve loop.
//!
//! # Lifecycle
//!
//! ```text
//! Created ──achieve──▶ Started ──plan ok──────────────▶ Succeeded
//!                         │     ──plan err──▶ next plan
//!                         │     ──all failed─────────▶ Failed  (NoPlanSatisfied)
//!                         └──── stop flag seen ──────▶ Stopped (Stopped)
//! ```
//!
//! The stop flag is checked before every plan attempt and again after the
//! last one; a plan that succeeds after its intention was stopped still ends
//! in `Stopped`.

use std::future::Future;
use std::pin::Pin;

use tracing::{debug, info, warn};

use dlv_core::{AgentRng, Tile};

use crate::{IntentError, IntentResult, IntentionArena, IntentionId, IntentionState, PlanLibrary, Predicate};

/// What a plan hands back on success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Done,
    /// `achieve` was called on an intention that had already started.
    AlreadyStarted,
    Reached(Tile),
    PickedUp(usize),
    Delivered(usize),
}

/// The agent side of the engine: whatever owns the intention arena.
pub trait IntentionHost: Send {
    fn intentions(&mut self) -> &mut IntentionArena;

    fn rng(&mut self) -> &mut AgentRng;

    /// Shuffle candidate plans before each `achieve`.  Default: registration
    /// order.
    fn shuffle_plans(&self) -> bool {
        false
    }
}

/// Try the plans routed to the intention's desire until one succeeds.
///
/// Idempotent: a second call on a started intention returns
/// [`Outcome::AlreadyStarted`] without running anything.
pub async fn achieve<H: IntentionHost>(
    host:    &mut H,
    library: &PlanLibrary<H>,
    id:      IntentionId,
) -> IntentResult<Outcome> {
    let predicate = {
        let intention = host.intentions().get_mut(id).ok_or(IntentError::UnknownIntention(id))?;
        if intention.state != IntentionState::Created {
            return Ok(Outcome::AlreadyStarted);
        }
        intention.state = IntentionState::Started;
        intention.predicate.clone()
    };

    let mut plans = library.plans_for(predicate.tag).to_vec();
    if host.shuffle_plans() {
        host.rng().shuffle(&mut plans);
    }

    for plan in plans {
        if host.intentions().is_stopped(id) {
            return Err(stopped(host, id, &predicate));
        }
        if !plan.is_applicable_to(predicate.tag) {
            continue;
        }
        host.intentions().set_current_plan(id, Some(plan.name()));
        info!(intention = %id, %predicate, plan = plan.name(), "achieving intention");

        match plan.execute(host, library, id, &predicate).await {
            Ok(outcome) => {
                if host.intentions().is_stopped(id) {
                    return Err(stopped(host, id, &predicate));
                }
                host.intentions().set_state(id, IntentionState::Succeeded);
                info!(intention = %id, %predicate, plan = plan.name(), ?outcome, "intention succeeded");
                return Ok(outcome);
            }
            Err(err) if err.is_stopped() => {
                debug!(intention = %id, %predicate, plan = plan.name(), "plan stopped");
            }
            Err(err) => {
                warn!(intention = %id, %predicate, plan = plan.name(), error = %err, "plan failed");
            }
        }
    }

    if host.intentions().is_stopped(id) {
        return Err(stopped(host, id, &predicate));
    }
    host.intentions().set_state(id, IntentionState::Failed);
    Err(IntentError::NoPlanSatisfied(predicate.to_string()))
}

/// Create a child of `parent`, achieve it, then drop it from the arena.
///
/// The child's failure is returned to the calling plan.  Boxed so plans and
/// `achieve` can recurse through each other.
pub fn sub_intention<'a, H: IntentionHost>(
    host:      &'a mut H,
    library:   &'a PlanLibrary<H>,
    parent:    IntentionId,
    predicate: Predicate,
) -> Pin<Box<dyn Future<Output = IntentResult<Outcome>> + Send + 'a>> {
    Box::pin(async move {
        if host.intentions().is_stopped(parent) {
            return Err(IntentError::Stopped(predicate.to_string()));
        }
        let child = host.intentions().create(predicate, Some(parent));
        let result = achieve(host, library, child).await;
        host.intentions().remove(child);
        result
    })
}

fn stopped<H: IntentionHost>(host: &mut H, id: IntentionId, predicate: &Predicate) -> IntentError {
    host.intentions().set_state(id, IntentionState::Stopped);
    info!(intention = %id, %predicate, "intention stopped");
    IntentError::Stopped(predicate.to_string())
}
