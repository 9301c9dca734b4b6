use async_trait::async_trait;
use tracing::info;

use dlv_core::DesireTag;
use dlv_intent::{sub_intention, IntentError, IntentResult, IntentionId, Outcome, Plan, PlanLibrary, Predicate};

use crate::AgentContext;

/// Carry everything on board to the nearest delivery tile reachable with
/// every observed agent, teammate included, treated as an obstacle.
pub struct SoloDeliver;

#[async_trait]
impl Plan<AgentContext> for SoloDeliver {
    fn name(&self) -> &'static str {
        "solo_deliver"
    }

    fn is_applicable_to(&self, desire: DesireTag) -> bool {
        matches!(desire, DesireTag::GoDeliver | DesireTag::GoDeliverJoint)
    }

    async fn execute(
        &self,
        ctx:        &mut AgentContext,
        library:    &PlanLibrary<AgentContext>,
        me:         IntentionId,
        predicate:  &Predicate,
    ) -> IntentResult<Outcome> {
        let carried = ctx.belief.carried();
        if carried == 0 {
            // Under a joint desire the parcels went to the teammate or were
            // left behind by a failed handover; neither is a delivery.
            if predicate.tag == DesireTag::GoDeliverJoint {
                return Err(IntentError::ActionFailed("nothing on board to deliver".into()));
            }
            return Ok(Outcome::Delivered(0));
        }
        let here = ctx.belief.my_tile();
        let (_, delivery) = ctx
            .require_map()?
            .nearest_delivery(here, &ctx.belief.occupancy())
            .ok_or_else(|| IntentError::Unreachable(format!("any delivery tile from {here}")))?;

        sub_intention(ctx, library, me, Predicate::go_to(delivery)).await?;
        ctx.checkpoint(me).await?;
        if !ctx.act_put_down().await {
            return Err(IntentError::ActionFailed(format!("put down at {delivery}")));
        }
        info!(%delivery, parcels = carried, "delivered");
        Ok(Outcome::Delivered(carried))
    }
}
