//! Joint delivery through the teammate.
//!
//! Used when the teammate stands on the only way to a delivery tile.  With
//! the teammate on standby:
//!
//! ```text
//!   me ─▶ … ─▶ drop │ mate │ … ─▶ delivery
//!
//! 1. walk to `drop`, the route tile just before the teammate, and put down
//! 2. step off `drop` (back along the route, else any free neighbour)
//! 3. teammate, one execute_action at a time: move onto `drop`, pick up,
//!    follow the rest of the route, put down
//! ```
//!
//! Availability is released whatever the outcome.  If the teammate never
//! picked the parcels up, they are taken back from `drop` so the fallback
//! plan still has something to deliver.

use async_trait::async_trait;
use tracing::{info, warn};

use dlv_core::{DesireTag, Tile};
use dlv_intent::{sub_intention, IntentError, IntentResult, IntentionId, Outcome, Plan, PlanLibrary, Predicate};

use crate::{AgentContext, Primitive, TeamMessage};

/// Desires the teammate may abandon to help.
const STOPPABLE: [DesireTag; 2] = [DesireTag::Explore, DesireTag::GoPickUp];

pub struct JointDeliver;

#[async_trait]
impl Plan<AgentContext> for JointDeliver {
    fn name(&self) -> &'static str {
        "joint_deliver"
    }

    fn is_applicable_to(&self, desire: DesireTag) -> bool {
        matches!(desire, DesireTag::GoDeliver | DesireTag::GoDeliverJoint)
    }

    async fn execute(
        &self,
        ctx:        &mut AgentContext,
        library:    &PlanLibrary<AgentContext>,
        me:         IntentionId,
        _predicate: &Predicate,
    ) -> IntentResult<Outcome> {
        if ctx.teammate().is_none() {
            return Err(IntentError::Coordination("no teammate".into()));
        }
        let carried = ctx.belief.carried();
        if carried == 0 {
            return Ok(Outcome::Delivered(0));
        }
        ctx.checkpoint(me).await?;

        let available = ctx.ask_yes(TeamMessage::AskAvailability(Some(STOPPABLE.to_vec()))).await;
        let result = if available {
            handover(ctx, library, me, carried).await
        } else {
            Err(IntentError::Coordination("teammate not available".into()))
        };
        ctx.say(TeamMessage::ReleaseAvailability).await;
        result
    }
}

async fn handover(
    ctx:     &mut AgentContext,
    library: &PlanLibrary<AgentContext>,
    me:      IntentionId,
    carried: usize,
) -> IntentResult<Outcome> {
    let mate_tile = ctx
        .ask_teammate_tile()
        .await
        .map_err(|e| IntentError::Coordination(e.to_string()))?;

    let here = ctx.belief.my_tile();
    let route = {
        let map = ctx.require_map()?;
        let occupied = ctx.belief.occupancy_without_teammate();
        map.nearest_delivery(here, &occupied)
            .and_then(|(_, delivery)| map.path_between(here, delivery, &occupied))
            .ok_or_else(|| IntentError::Unreachable(format!("any delivery tile from {here}")))?
    };
    let delivery = route.replay(here);

    let Some(k) = route.position_of(mate_tile) else {
        // The teammate is not in the way after all.
        sub_intention(ctx, library, me, Predicate::go_to(delivery)).await?;
        ctx.checkpoint(me).await?;
        if !ctx.act_put_down().await {
            return Err(IntentError::ActionFailed(format!("put down at {delivery}")));
        }
        return Ok(Outcome::Delivered(carried));
    };

    let drop = if k == 0 { here } else { route.tiles[k - 1] };
    if drop != here {
        sub_intention(ctx, library, me, Predicate::go_to(drop)).await?;
    }
    ctx.checkpoint(me).await?;
    if !ctx.act_put_down().await {
        return Err(IntentError::ActionFailed(format!("put down at {drop}")));
    }
    info!(%drop, teammate = %mate_tile, %delivery, "handing parcels over");

    let behind = match k {
        0 => None,
        1 => Some(here),
        _ => Some(route.tiles[k - 2]),
    };
    if let Err(e) = pass_over(ctx, me, drop, mate_tile, behind).await {
        reclaim(ctx, library, me, drop).await;
        return Err(e);
    }

    let mut at = drop;
    for &step in &route.directions[k..] {
        remote(ctx, me, Primitive::Move(step)).await?;
        at = at.step(step);
        ctx.belief.teammate_moved_to(at);
    }
    remote(ctx, me, Primitive::PutDown).await?;

    info!(%delivery, parcels = carried, "delivered through teammate");
    Ok(Outcome::Delivered(carried))
}

/// Clear `drop` and have the teammate step onto it and pick up.
async fn pass_over(
    ctx:    &mut AgentContext,
    me:     IntentionId,
    drop:   Tile,
    mate:   Tile,
    behind: Option<Tile>,
) -> IntentResult<()> {
    step_aside(ctx, me, drop, mate, behind).await?;
    let onto = mate
        .direction_to(drop)
        .ok_or_else(|| IntentError::Coordination(format!("teammate at {mate} is not next to {drop}")))?;
    remote(ctx, me, Primitive::Move(onto)).await?;
    ctx.belief.teammate_moved_to(drop);
    remote(ctx, me, Primitive::PickUp).await
}

/// Walk back onto `drop` and pick the parcels up again.  Best effort: the
/// handover error is what gets reported.
async fn reclaim(ctx: &mut AgentContext, library: &PlanLibrary<AgentContext>, me: IntentionId, drop: Tile) {
    if ctx.belief.my_tile() != drop {
        if let Err(e) = sub_intention(ctx, library, me, Predicate::go_to(drop)).await {
            warn!(%drop, error = %e, "cannot get back to the dropped parcels");
            return;
        }
    }
    let picked = ctx.act_pick_up().await;
    info!(%drop, picked, "handover failed, parcels taken back");
}

/// Leave `drop` free for the teammate.
async fn step_aside(
    ctx:    &mut AgentContext,
    me:     IntentionId,
    drop:   Tile,
    mate:   Tile,
    behind: Option<Tile>,
) -> IntentResult<()> {
    let mut options: Vec<Tile> = behind.into_iter().collect();
    if let Some(map) = ctx.map.as_ref() {
        let occupied = ctx.belief.occupancy();
        options.extend(
            map.traversable_neighbours(drop)
                .map(|(_, t)| t)
                .filter(|&t| t != mate && Some(t) != behind && !occupied.contains(t)),
        );
    }
    for tile in options {
        let Some(direction) = drop.direction_to(tile) else { continue };
        ctx.checkpoint(me).await?;
        if ctx.act_move(direction).await {
            return Ok(());
        }
    }
    Err(IntentError::ActionFailed(format!("no free tile to leave {drop}")))
}

/// Have the teammate run one primitive.
async fn remote(ctx: &mut AgentContext, me: IntentionId, primitive: Primitive) -> IntentResult<()> {
    ctx.checkpoint(me).await?;
    if ctx.ask_yes(TeamMessage::ExecuteAction(primitive)).await {
        Ok(())
    } else {
        Err(IntentError::Coordination(format!("teammate could not execute {primitive:?}")))
    }
}
