//! The `Plan` trait and the plan library.

use std::sync::Arc;

use async_trait::async_trait;
use rustc_hash::FxHashMap;

use dlv_core::DesireTag;

use crate::{IntentError, IntentResult, IntentionHost, IntentionId, Outcome, Predicate};

/// A stateless strategy for one or more desires.
///
/// `execute` receives everything it may touch explicitly: the host (beliefs,
/// ports, intention arena), the library (for nested goals through
/// [`sub_intention`](crate::sub_intention)), its own intention handle (to poll
/// for cancellation and to parent sub-intentions) and the predicate.
///
/// Plans must poll `host.intentions().is_stopped(me)` between discrete
/// actions and return [`IntentError::Stopped`] when set.  An action already
/// issued is always awaited to completion first.
#[async_trait]
pub trait Plan<H: IntentionHost>: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    fn is_applicable_to(&self, desire: DesireTag) -> bool;

    async fn execute(
        &self,
        host:      &mut H,
        library:   &PlanLibrary<H>,
        me:        IntentionId,
        predicate: &Predicate,
    ) -> IntentResult<Outcome>;
}

/// Desire tag → plans to try, in order.  Fixed once built.
pub struct PlanLibrary<H> {
    routes: FxHashMap<DesireTag, Vec<Arc<dyn Plan<H>>>>,
}

impl<H: IntentionHost> PlanLibrary<H> {
    pub fn builder() -> PlanLibraryBuilder<H> {
        PlanLibraryBuilder { routes: FxHashMap::default() }
    }

    /// Candidate plans for `desire` in registration order.  Empty if none.
    pub fn plans_for(&self, desire: DesireTag) -> &[Arc<dyn Plan<H>>] {
        self.routes.get(&desire).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn plan_names(&self, desire: DesireTag) -> Vec<&'static str> {
        self.plans_for(desire).iter().map(|p| p.name()).collect()
    }
}

/// Fluent builder for [`PlanLibrary`].
///
/// ```rust,ignore
/// let library = PlanLibrary::builder()
///     .route(DesireTag::GoTo, Arc::new(BfsGoTo))
///     .route(DesireTag::Explore, Arc::new(Explore))
///     .route(DesireTag::Explore, Arc::new(RandomWalk))
///     .build()?;
/// ```
pub struct PlanLibraryBuilder<H> {
    routes: FxHashMap<DesireTag, Vec<Arc<dyn Plan<H>>>>,
}

impl<H: IntentionHost> PlanLibraryBuilder<H> {
    /// Append `plan` to the candidates for `desire`.
    pub fn route(mut self, desire: DesireTag, plan: Arc<dyn Plan<H>>) -> Self {
        self.routes.entry(desire).or_default().push(plan);
        self
    }

    /// Freeze the library.  Fails if a plan was routed to a desire it does not
    /// declare itself applicable to.
    pub fn build(self) -> IntentResult<PlanLibrary<H>> {
        for (desire, plans) in &self.routes {
            if let Some(p) = plans.iter().find(|p| !p.is_applicable_to(*desire)) {
                return Err(IntentError::NotApplicable { plan: p.name(), desire: *desire });
            }
        }
        Ok(PlanLibrary { routes: self.routes })
    }
}
