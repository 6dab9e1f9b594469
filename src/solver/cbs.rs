use super::Solver;
use crate::algorithm::{AStar, LowLevelSearch};
use crate::common::{HighLevelOpenNode, Solution};
use crate::env::Environment;
use crate::error::MapfResult;
use crate::stat::Stats;

use std::collections::BTreeSet;
use std::time::Instant;
use tracing::{debug, info, instrument};

/// Conflict-Based Search over an [`Environment`].
pub struct CBS<'a, S: LowLevelSearch = AStar> {
    env: &'a Environment,
    search: S,
    max_high_level_nodes: Option<usize>,
    stats: Stats,
}

impl<'a> CBS<'a, AStar> {
    pub fn new(env: &'a Environment) -> Self {
        CBS::with_search(env, AStar)
    }
}

impl<'a, S: LowLevelSearch> CBS<'a, S> {
    pub fn with_search(env: &'a Environment, search: S) -> Self {
        CBS {
            env,
            search,
            max_high_level_nodes: None,
            stats: Stats::default(),
        }
    }

    /// Give up once this many constraint tree nodes have been expanded.
    pub fn with_max_high_level_nodes(mut self, limit: Option<usize>) -> Self {
        self.max_high_level_nodes = limit;
        self
    }
}

impl<S: LowLevelSearch> Solver for CBS<'_, S> {
    #[instrument(skip_all, name = "cbs", level = "debug")]
    fn solve(&mut self) -> MapfResult<Option<Solution>> {
        let total_solve_start_time = Instant::now();
        self.stats = Stats::default();

        let Some(root) = HighLevelOpenNode::new(self.env, &self.search, &mut self.stats)? else {
            info!("cbs root node has no solution");
            return Ok(None);
        };

        let mut open = BTreeSet::new();
        let mut next_id = root.id + 1;
        open.insert(root);

        while let Some(current_node) = open.pop_first() {
            let Some(conflict) = &current_node.conflict else {
                // No conflicts, return solution.
                self.stats.time_us = total_solve_start_time.elapsed().as_micros() as usize;
                self.stats.costs = current_node.cost;
                self.stats.makespan = current_node.solution.makespan();
                self.stats.print();
                return Ok(Some(current_node.solution));
            };

            if self
                .max_high_level_nodes
                .is_some_and(|limit| self.stats.high_level_expand_nodes >= limit)
            {
                info!(
                    "cbs gives up after {} high level nodes",
                    self.stats.high_level_expand_nodes
                );
                return Ok(None);
            }
            self.stats.high_level_expand_nodes += 1;
            debug!("conflict: {conflict:?}");

            for (agent, delta) in self.env.constraints_from_conflict(conflict) {
                if let Some(child) = current_node.update_constraint(
                    next_id,
                    &agent,
                    &delta,
                    self.env,
                    &self.search,
                    &mut self.stats,
                )? {
                    open.insert(child);
                }
                next_id += 1;
            }
        }

        info!("cbs solve fails");
        Ok(None)
    }

    fn stats(&self) -> &Stats {
        &self.stats
    }
}
