use async_trait::async_trait;

use dlv_core::{DesireTag, Direction};
use dlv_intent::{sub_intention, IntentError, IntentResult, IntentionId, Outcome, Plan, PlanLibrary, Predicate};

use crate::AgentContext;

/// Head for a delivery tile: a random one, or the most central one when
/// `explore_toward_center` is set.  Parcels found on the way stop the
/// exploration through the free-parcels revision.
pub struct Explore;

#[async_trait]
impl Plan<AgentContext> for Explore {
    fn name(&self) -> &'static str {
        "explore"
    }

    fn is_applicable_to(&self, desire: DesireTag) -> bool {
        desire == DesireTag::Explore
    }

    async fn execute(
        &self,
        ctx:        &mut AgentContext,
        library:    &PlanLibrary<AgentContext>,
        me:         IntentionId,
        _predicate: &Predicate,
    ) -> IntentResult<Outcome> {
        let map = ctx
            .map
            .as_ref()
            .ok_or_else(|| IntentError::Unreachable("map not received yet".into()))?;
        let target = if ctx.config.explore_toward_center {
            map.central_delivery()
        } else {
            map.random_delivery(&mut ctx.rng)
        }
        .ok_or_else(|| IntentError::Unreachable("map has no delivery tiles".into()))?;

        let here = ctx.belief.my_tile();
        if here == target {
            return Err(IntentError::ActionFailed(format!("already at {target}")));
        }
        sub_intention(ctx, library, me, Predicate::go_to(target)).await
    }
}

/// One random step: a shuffled try of the three directions that do not
/// backtrack, then the backward one.  Fails only if all four are refused.
pub struct RandomWalk;

#[async_trait]
impl Plan<AgentContext> for RandomWalk {
    fn name(&self) -> &'static str {
        "random_walk"
    }

    fn is_applicable_to(&self, desire: DesireTag) -> bool {
        matches!(desire, DesireTag::RandomWalk | DesireTag::Explore)
    }

    async fn execute(
        &self,
        ctx:        &mut AgentContext,
        _library:   &PlanLibrary<AgentContext>,
        me:         IntentionId,
        _predicate: &Predicate,
    ) -> IntentResult<Outcome> {
        let here = ctx.belief.my_tile();
        let back = ctx.last_move.unwrap_or(Direction::Right).opposite();
        let mut order: Vec<Direction> = Direction::ALL.into_iter().filter(|&d| d != back).collect();
        ctx.rng.shuffle(&mut order);
        order.push(back);

        for direction in order {
            let blocked = ctx.map.as_ref().is_some_and(|m| !m.is_traversable(here.step(direction)));
            if blocked {
                continue;
            }
            ctx.checkpoint(me).await?;
            if ctx.act_move(direction).await {
                return Ok(Outcome::Reached(ctx.belief.my_tile()));
            }
        }
        Err(IntentError::ActionFailed(format!("boxed in at {here}")))
    }
}
