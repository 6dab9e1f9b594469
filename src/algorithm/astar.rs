use super::{construct_path, LowLevelSearch, Trace};
use crate::common::{Location, LowLevelOpenNode, Path, State};
use crate::env::AgentView;
use crate::stat::Stats;

use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::{debug, instrument, trace};

/// Space-time A* with unit move and wait costs.
#[derive(Debug, Clone, Copy, Default)]
pub struct AStar;

impl LowLevelSearch for AStar {
    #[instrument(skip_all, name = "a_star", fields(agent = %view.agent().name, start = %view.agent().start, goal = %view.agent().goal), level = "debug")]
    fn search(&self, view: &AgentView<'_>, stats: &mut Stats) -> Option<Path> {
        let constraints = view.constraints();
        debug!("constraints: {constraints:?}");

        // Past the last constrained step nothing depends on time any more, so
        // states are closed on a clamped time step. This keeps the search
        // finite when the goal is unreachable.
        let time_limit = constraints.latest_time().map_or(0, |time| time + 1);
        let closed_key = |state: &State| -> (Location, usize) {
            (state.location, state.time.min(time_limit))
        };

        let mut open_list = BTreeSet::new();
        let mut closed_list = HashSet::new();
        let mut g_cost_map = HashMap::new();
        let mut trace: Trace = HashMap::new();
        let mut order = 0;

        let start = view.start();
        g_cost_map.insert(closed_key(&start), 0);
        open_list.insert(LowLevelOpenNode {
            state: start,
            f_open_cost: view.heuristic(&start),
            g_cost: 0,
            order,
        });

        while let Some(current) = open_list.pop_first() {
            // Stale entry superseded by a cheaper one.
            if !closed_list.insert(closed_key(&current.state)) {
                continue;
            }
            trace!("expand node: {current:?}");

            // Update stats.
            stats.low_level_expand_nodes += 1;

            // An agent stays at its goal once done, so the goal only counts if
            // no later vertex constraint would push it off again.
            if view.is_goal(&current.state)
                && !constraints.forbids_vertex_from(current.state.time, current.state.location)
            {
                return Some(construct_path(&trace, current.state));
            }

            // Assuming uniform cost.
            let tentative_g_cost = current.g_cost + 1;

            for neighbor in view.neighbors(&current.state) {
                let key = closed_key(&neighbor);
                if closed_list.contains(&key) {
                    continue;
                }

                let old_g_cost = *g_cost_map.get(&key).unwrap_or(&usize::MAX);
                if tentative_g_cost < old_g_cost {
                    g_cost_map.insert(key, tentative_g_cost);
                    trace.insert(neighbor, current.state);

                    order += 1;
                    open_list.insert(LowLevelOpenNode {
                        state: neighbor,
                        f_open_cost: tentative_g_cost + view.heuristic(&neighbor),
                        g_cost: tentative_g_cost,
                        order,
                    });
                }
            }
        }

        debug!("cannot find solution");
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{Agent, Constraints, EdgeConstraint, VertexConstraint};
    use crate::env::Environment;
    use crate::map::Map;

    // Helper function to setup tracing
    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("debug")
            .with_test_writer()
            .try_init();
    }

    // 3x3 grid with the centre blocked.
    // . . .
    // . @ .
    // . . .
    fn ring_env(start: (i32, i32), goal: (i32, i32)) -> Environment {
        let map = Map::new(3, 3, vec![Location::new(1, 1)]).unwrap();
        let agent = Agent {
            name: "agent0".to_string(),
            start: Location::new(start.0, start.1),
            goal: Location::new(goal.0, goal.1),
        };
        Environment::new(map, vec![agent]).unwrap()
    }

    fn search(env: &Environment, constraints: &Constraints) -> Option<Path> {
        let view = env.agent_view("agent0", constraints).unwrap();
        AStar.search(&view, &mut Stats::default())
    }

    fn assert_well_formed(env: &Environment, path: &Path) {
        let agent = env.agent("agent0").unwrap();
        assert_eq!(path.first(), Some(&agent.start_state()));
        assert_eq!(path.last().map(|s| s.location), Some(agent.goal));
        for (time, state) in path.iter().enumerate() {
            assert_eq!(state.time, time);
        }
    }

    // Ideal Path
    // [(2, 2), (1, 2), (0, 2), (0, 1), (0, 0)]
    // or
    // [(2, 2), (2, 1), (2, 0), (1, 0), (0, 0)]
    #[test]
    fn test_a_star_no_constraint() {
        init_tracing();
        let env = ring_env((2, 2), (0, 0));
        let path = search(&env, &Constraints::new()).unwrap();
        debug!("{path:?}");
        assert_eq!(path.len(), 5);
        assert_well_formed(&env, &path);
    }

    #[test]
    fn test_a_star_start_is_goal() {
        init_tracing();
        let env = ring_env((2, 2), (2, 2));
        let path = search(&env, &Constraints::new()).unwrap();
        assert_eq!(path, vec![State::new(0, Location::new(2, 2))]);
    }

    #[test]
    fn test_a_star_in_path_vertex_constraint_alternative_path() {
        init_tracing();
        let env = ring_env((2, 2), (0, 0));
        let mut constraints = Constraints::new();
        constraints.add_vertex(VertexConstraint::new(2, Location::new(0, 2)));
        let path = search(&env, &constraints).unwrap();
        debug!("{path:?}");
        assert_eq!(path.len(), 5);
        assert!(!path.contains(&State::new(2, Location::new(0, 2))));
        assert_well_formed(&env, &path);
    }

    #[test]
    fn test_a_star_in_path_vertex_constraint() {
        init_tracing();
        let env = ring_env((2, 2), (0, 0));
        let mut constraints = Constraints::new();
        constraints.add_vertex(VertexConstraint::new(2, Location::new(0, 2)));
        constraints.add_vertex(VertexConstraint::new(2, Location::new(2, 0)));
        let path = search(&env, &constraints).unwrap();
        debug!("{path:?}");
        assert_eq!(path.len(), 6);
        assert_well_formed(&env, &path);
    }

    #[test]
    fn test_a_star_goal_constraint_delays_arrival() {
        init_tracing();
        let env = ring_env((2, 2), (0, 0));
        let mut constraints = Constraints::new();
        constraints.add_vertex(VertexConstraint::new(6, Location::new(0, 0)));
        let path = search(&env, &constraints).unwrap();
        debug!("{path:?}");
        // Must not be at the goal at time 6, so it arrives at time 7 at the earliest.
        assert_eq!(path.len(), 8);
        assert!(!path.contains(&State::new(6, Location::new(0, 0))));
        assert_well_formed(&env, &path);
    }

    #[test]
    fn test_a_star_edge_constraint_alternative_path() {
        init_tracing();
        let env = ring_env((2, 2), (0, 0));
        let mut constraints = Constraints::new();
        constraints.add_edge(EdgeConstraint::new(
            1,
            Location::new(1, 2),
            Location::new(0, 2),
        ));
        let path = search(&env, &constraints).unwrap();
        debug!("{path:?}");
        assert_eq!(path.len(), 5);
        assert_well_formed(&env, &path);
    }

    #[test]
    fn test_a_star_edge_constraint() {
        init_tracing();
        let env = ring_env((2, 2), (0, 0));
        let mut constraints = Constraints::new();
        constraints.add_edge(EdgeConstraint::new(
            1,
            Location::new(1, 2),
            Location::new(0, 2),
        ));
        constraints.add_edge(EdgeConstraint::new(
            1,
            Location::new(2, 1),
            Location::new(2, 0),
        ));
        let path = search(&env, &constraints).unwrap();
        debug!("{path:?}");
        assert_eq!(path.len(), 6);
        assert_well_formed(&env, &path);
    }

    #[test]
    fn test_a_star_unreachable_goal() {
        init_tracing();
        // . @ .
        let map = Map::new(3, 1, vec![Location::new(1, 0)]).unwrap();
        let agent = Agent {
            name: "agent0".to_string(),
            start: Location::new(0, 0),
            goal: Location::new(2, 0),
        };
        let env = Environment::new(map, vec![agent]).unwrap();
        let mut constraints = Constraints::new();
        constraints.add_vertex(VertexConstraint::new(3, Location::new(0, 0)));

        let mut stats = Stats::default();
        let view = env.agent_view("agent0", &constraints).unwrap();
        assert!(AStar.search(&view, &mut stats).is_none());
        assert!(stats.low_level_expand_nodes > 0);
    }

    #[test]
    fn test_a_star_start_blocked_forever() {
        init_tracing();
        // Every successor of the start is forbidden at time 1.
        let env = ring_env((0, 0), (2, 2));
        let mut constraints = Constraints::new();
        constraints.add_vertex(VertexConstraint::new(1, Location::new(0, 0)));
        constraints.add_vertex(VertexConstraint::new(1, Location::new(1, 0)));
        constraints.add_vertex(VertexConstraint::new(1, Location::new(0, 1)));
        assert!(search(&env, &constraints).is_none());
    }
}
