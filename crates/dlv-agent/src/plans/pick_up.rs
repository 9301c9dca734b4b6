use async_trait::async_trait;

use dlv_belief::PickupTarget;
use dlv_core::{DesireTag, ParcelId, Tile};
use dlv_intent::{sub_intention, IntentError, IntentResult, IntentionId, Outcome, Plan, PlanLibrary, Predicate};

use crate::AgentContext;

/// `go_pick_up x y id`: walk to the parcel and pick it up.
///
/// While running, the parcel is the belief's watched target.  Any failure
/// other than a stop blacklists the parcel so it is not chosen again at once.
pub struct PickUp;

#[async_trait]
impl Plan<AgentContext> for PickUp {
    fn name(&self) -> &'static str {
        "pick_up"
    }

    fn is_applicable_to(&self, desire: DesireTag) -> bool {
        desire == DesireTag::GoPickUp
    }

    async fn execute(
        &self,
        ctx:       &mut AgentContext,
        library:   &PlanLibrary<AgentContext>,
        me:        IntentionId,
        predicate: &Predicate,
    ) -> IntentResult<Outcome> {
        let tile = predicate.tile_at(0)?;
        let parcel = ParcelId::new(predicate.id_at(2)?);

        ctx.belief.set_target(Some(PickupTarget { parcel: parcel.clone(), tile }));
        let result = fetch(ctx, library, me, tile).await;
        ctx.belief.set_target(None);

        match result {
            Ok(picked) if picked > 0 => Ok(Outcome::PickedUp(picked)),
            Ok(_) => {
                ctx.blacklist(parcel);
                Err(IntentError::ActionFailed(format!("nothing to pick up at {tile}")))
            }
            Err(e) if e.is_stopped() => Err(e),
            Err(e) => {
                ctx.blacklist(parcel);
                Err(e)
            }
        }
    }
}

async fn fetch(
    ctx:     &mut AgentContext,
    library: &PlanLibrary<AgentContext>,
    me:      IntentionId,
    tile:    Tile,
) -> IntentResult<usize> {
    sub_intention(ctx, library, me, Predicate::go_to(tile)).await?;
    ctx.checkpoint(me).await?;
    Ok(ctx.act_pick_up().await)
}
