mod astar;

pub use astar::AStar;

use std::collections::HashMap;

use crate::common::{Path, State};
use crate::env::AgentView;
use crate::stat::Stats;

/// Single-agent search over the constrained space-time grid.
///
/// Implementations may only use the neighbors, heuristic and goal test of the
/// [`AgentView`]. `None` means no path exists under the view's constraints.
pub trait LowLevelSearch {
    fn search(&self, view: &AgentView<'_>, stats: &mut Stats) -> Option<Path>;
}

type Trace = HashMap<State, State>;

fn construct_path(trace: &Trace, mut current: State) -> Path {
    let mut path = vec![current];
    while let Some(&prev) = trace.get(&current) {
        path.push(prev);
        current = prev;
    }
    path.reverse();
    path
}
