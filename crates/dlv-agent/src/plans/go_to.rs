use async_trait::async_trait;

use dlv_core::DesireTag;
use dlv_intent::{IntentError, IntentResult, IntentionId, Outcome, Plan, PlanLibrary, Predicate};

use crate::{AgentContext, SolverProblem};

/// Walk to `(x, y)`, recomputing the shortest path before every step so
/// agents that moved into the way are avoided.
pub struct BfsGoTo;

#[async_trait]
impl Plan<AgentContext> for BfsGoTo {
    fn name(&self) -> &'static str {
        "bfs_go_to"
    }

    fn is_applicable_to(&self, desire: DesireTag) -> bool {
        desire == DesireTag::GoTo
    }

    async fn execute(
        &self,
        ctx:       &mut AgentContext,
        _library:  &PlanLibrary<AgentContext>,
        me:        IntentionId,
        predicate: &Predicate,
    ) -> IntentResult<Outcome> {
        let target = predicate.tile_at(0)?;
        loop {
            ctx.checkpoint(me).await?;
            let here = ctx.belief.my_tile();
            if here == target {
                return Ok(Outcome::Reached(target));
            }
            let step = ctx
                .require_map()?
                .path_between(here, target, &ctx.belief.occupancy())
                .and_then(|route| route.directions.first().copied())
                .ok_or_else(|| IntentError::Unreachable(format!("{target} from {here}")))?;
            if !ctx.act_move(step).await {
                return Err(IntentError::ActionFailed(format!("move {step} from {here}")));
            }
        }
    }
}

/// Walk to `(x, y)` along a move sequence computed by the external solver.
pub struct SolverGoTo;

#[async_trait]
impl Plan<AgentContext> for SolverGoTo {
    fn name(&self) -> &'static str {
        "solver_go_to"
    }

    fn is_applicable_to(&self, desire: DesireTag) -> bool {
        desire == DesireTag::GoTo
    }

    async fn execute(
        &self,
        ctx:       &mut AgentContext,
        _library:  &PlanLibrary<AgentContext>,
        me:        IntentionId,
        predicate: &Predicate,
    ) -> IntentResult<Outcome> {
        let target = predicate.tile_at(0)?;
        let solver = ctx
            .solver
            .clone()
            .ok_or_else(|| IntentError::Unreachable("no solver configured".into()))?;

        ctx.checkpoint(me).await?;
        let from = ctx.belief.my_tile();
        let occupied = ctx.belief.occupancy();
        let moves = {
            let problem = SolverProblem { map: ctx.require_map()?, from, to: target, occupied: &occupied };
            solver.solve(&problem).await
        }
        .map_err(|e| IntentError::Unreachable(format!("{target} from {from}: {e}")))?;

        for step in moves {
            ctx.checkpoint(me).await?;
            let here = ctx.belief.my_tile();
            if !ctx.act_move(step).await {
                return Err(IntentError::ActionFailed(format!("move {step} from {here}")));
            }
        }
        let here = ctx.belief.my_tile();
        if here != target {
            return Err(IntentError::ActionFailed(format!("solver plan ended at {here}, not {target}")));
        }
        Ok(Outcome::Reached(target))
    }
}
