use super::{Conflict, Constraints, Solution};
use crate::algorithm::LowLevelSearch;
use crate::env::{ConstraintTable, Environment};
use crate::error::MapfResult;
use crate::stat::Stats;

use std::cmp::Ordering;
use tracing::debug;

/// A node of the constraint tree.
#[derive(Clone, Debug)]
pub(crate) struct HighLevelOpenNode {
    // Creation order; ties on cost go to the older node.
    pub(crate) id: usize,
    pub(crate) constraints: ConstraintTable,
    pub(crate) solution: Solution,
    pub(crate) cost: usize, // Total cost for all paths under current constraints
    pub(crate) conflict: Option<Conflict>,
}

impl PartialEq for HighLevelOpenNode {
    fn eq(&self, other: &Self) -> bool {
        self.cost == other.cost && self.id == other.id
    }
}

impl Eq for HighLevelOpenNode {}

impl Ord for HighLevelOpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cost
            .cmp(&other.cost)
            .then_with(|| self.id.cmp(&other.id))
    }
}

impl PartialOrd for HighLevelOpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl HighLevelOpenNode {
    /// Root node: every agent planned without constraints.
    pub(crate) fn new<S: LowLevelSearch + ?Sized>(
        env: &Environment,
        search: &S,
        stats: &mut Stats,
    ) -> MapfResult<Option<Self>> {
        let constraints = ConstraintTable::new();
        let Some(solution) = env.compute_solution(&constraints, search, stats)? else {
            return Ok(None);
        };

        let start = HighLevelOpenNode {
            id: 0,
            cost: env.solution_cost(&solution),
            conflict: env.first_conflict(&solution),
            constraints,
            solution,
        };
        debug!("High level start node {start:?}");
        Ok(Some(start))
    }

    /// Child node with `delta` added to `agent`'s constraints. Only that
    /// agent is replanned; `None` if it has no path any more.
    pub(crate) fn update_constraint<S: LowLevelSearch + ?Sized>(
        &self,
        id: usize,
        agent: &str,
        delta: &Constraints,
        env: &Environment,
        search: &S,
        stats: &mut Stats,
    ) -> MapfResult<Option<HighLevelOpenNode>> {
        let mut new_constraints = self.constraints.clone();
        let agent_constraints = new_constraints.entry(agent.to_string()).or_default();
        agent_constraints.extend(delta);

        let Some(new_path) = env.compute_agent_path(agent, agent_constraints, search, stats)? else {
            debug!("agent {agent:?} has no path after adding {delta:?}");
            return Ok(None);
        };
        debug!("Update agent {agent:?} with path {new_path:?}");

        let mut new_solution = self.solution.clone();
        new_solution.insert(agent, new_path);

        Ok(Some(HighLevelOpenNode {
            id,
            cost: env.solution_cost(&new_solution),
            conflict: env.first_conflict(&new_solution),
            constraints: new_constraints,
            solution: new_solution,
        }))
    }
}
