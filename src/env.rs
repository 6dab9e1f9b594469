//! The grid environment: agent registry plus the queries a constrained
//! single-agent search and the high-level conflict search are built on.

use std::collections::HashMap;

use indexmap::IndexMap;
use tracing::debug;

use crate::algorithm::LowLevelSearch;
use crate::common::{
    Agent, Conflict, Constraints, EdgeConstraint, Location, Path, Solution, State,
    VertexConstraint,
};
use crate::error::{MapfError, MapfResult};
use crate::map::Map;
use crate::stat::Stats;

/// Successor offsets in emission order: wait, up, down, left, right.
/// Up decreases `y`, down increases it.
const MOVES: [(i32, i32); 5] = [(0, 0), (0, -1), (0, 1), (-1, 0), (1, 0)];

/// Per-agent constraint sets, keyed by agent name.
pub type ConstraintTable = HashMap<String, Constraints>;

#[derive(Debug, Clone)]
pub struct Environment {
    map: Map,
    agents: IndexMap<String, Agent>,
}

impl Environment {
    /// Registers `agents` on `map`, in the given order.
    ///
    /// Rejects duplicate names, starts or goals outside the grid or on an
    /// obstacle, and two agents sharing a start or a goal.
    pub fn new(map: Map, agents: Vec<Agent>) -> MapfResult<Self> {
        let mut registry: IndexMap<String, Agent> = IndexMap::with_capacity(agents.len());
        let mut starts: HashMap<Location, String> = HashMap::new();
        let mut goals: HashMap<Location, String> = HashMap::new();

        for agent in agents {
            if registry.contains_key(&agent.name) {
                return Err(MapfError::DuplicateAgent(agent.name));
            }

            for (which, location) in [("start", agent.start), ("goal", agent.goal)] {
                if !map.in_bounds(location) {
                    return Err(MapfError::OutOfBounds {
                        agent: agent.name,
                        which,
                        location,
                        width: map.width,
                        height: map.height,
                    });
                }
                if map.is_obstacle(location) {
                    return Err(MapfError::BlockedLocation {
                        agent: agent.name,
                        which,
                        location,
                    });
                }
            }

            if let Some(first) = starts.insert(agent.start, agent.name.clone()) {
                return Err(MapfError::DuplicateStart {
                    first,
                    second: agent.name,
                    location: agent.start,
                });
            }
            if let Some(first) = goals.insert(agent.goal, agent.name.clone()) {
                return Err(MapfError::DuplicateGoal {
                    first,
                    second: agent.name,
                    location: agent.goal,
                });
            }

            registry.insert(agent.name.clone(), agent);
        }

        Ok(Environment {
            map,
            agents: registry,
        })
    }

    pub fn map(&self) -> &Map {
        &self.map
    }

    /// Registered agents in registry order.
    pub fn agents(&self) -> impl Iterator<Item = &Agent> {
        self.agents.values()
    }

    pub fn agent(&self, name: &str) -> MapfResult<&Agent> {
        self.agents
            .get(name)
            .ok_or_else(|| MapfError::UnknownAgent(name.to_string()))
    }

    /// Search context for one agent under `constraints`.
    pub fn agent_view<'a>(
        &'a self,
        name: &str,
        constraints: &'a Constraints,
    ) -> MapfResult<AgentView<'a>> {
        Ok(AgentView {
            env: self,
            agent: self.agent(name)?,
            constraints,
        })
    }

    /// In bounds, not an obstacle, and not forbidden by a vertex constraint.
    pub fn is_state_valid(&self, state: &State, constraints: &Constraints) -> bool {
        self.map.is_passable(state.location)
            && !constraints.forbids_vertex(state.time, state.location)
    }

    pub fn is_edge_allowed(&self, from: &State, to: &State, constraints: &Constraints) -> bool {
        !constraints.forbids_edge(from.time, from.location, to.location)
    }

    /// Valid successors of `state` at `state.time + 1`, in the order wait,
    /// up, down, left, right. Waiting is never subject to edge constraints.
    pub fn neighbors(&self, state: &State, constraints: &Constraints) -> Vec<State> {
        let mut neighbors = Vec::with_capacity(MOVES.len());
        for (dx, dy) in MOVES {
            let next = State::new(state.time + 1, state.location.offset(dx, dy));
            if !self.is_state_valid(&next, constraints) {
                continue;
            }
            let is_wait = dx == 0 && dy == 0;
            if is_wait || self.is_edge_allowed(state, &next, constraints) {
                neighbors.push(next);
            }
        }
        neighbors
    }

    /// Manhattan distance from `state` to the goal of `agent`.
    pub fn heuristic(&self, state: &State, agent: &str) -> MapfResult<usize> {
        Ok(state.location.manhattan_distance(&self.agent(agent)?.goal))
    }

    pub fn is_goal(&self, state: &State, agent: &str) -> MapfResult<bool> {
        Ok(state.equal_except_time(&self.agent(agent)?.goal_state()))
    }

    /// Earliest conflict of `solution`.
    ///
    /// Time steps are scanned in increasing order up to the longest path; an
    /// agent whose path has ended is held at its last state. At each time step
    /// every pair is checked for a vertex conflict before any pair is checked
    /// for an edge conflict. Pairs are visited as `(i, j)`, `i < j`, over the
    /// solution's agent order, so the result is reproducible for equal input.
    pub fn first_conflict(&self, solution: &Solution) -> Option<Conflict> {
        let agents: Vec<(&String, &Path)> = solution
            .paths
            .iter()
            .filter(|(_, path)| !path.is_empty())
            .collect();
        let max_time = agents.iter().map(|(_, path)| path.len()).max().unwrap_or(0);
        let pairs = agent_pairs(agents.len());

        for time in 0..max_time {
            for &(i, j) in &pairs {
                let (name_1, path_1) = agents[i];
                let (name_2, path_2) = agents[j];
                let location = location_at(path_1, time);
                if location == location_at(path_2, time) {
                    let conflict = Conflict::Vertex {
                        time,
                        location,
                        agent_1: name_1.clone(),
                        agent_2: name_2.clone(),
                    };
                    debug!("first conflict: {conflict:?}");
                    return Some(conflict);
                }
            }

            for &(i, j) in &pairs {
                let (name_1, path_1) = agents[i];
                let (name_2, path_2) = agents[j];
                let (from_1, to_1) = (location_at(path_1, time), location_at(path_1, time + 1));
                let (from_2, to_2) = (location_at(path_2, time), location_at(path_2, time + 1));
                if from_1 == to_2 && to_1 == from_2 {
                    let conflict = Conflict::Edge {
                        time,
                        from: from_1,
                        to: to_1,
                        agent_1: name_1.clone(),
                        agent_2: name_2.clone(),
                    };
                    debug!("first conflict: {conflict:?}");
                    return Some(conflict);
                }
            }
        }

        None
    }

    /// Constraints that rule out `conflict`, one entry per involved agent.
    ///
    /// A vertex conflict forbids the cell to both agents; an edge conflict
    /// forbids each agent its own direction of the swap.
    pub fn constraints_from_conflict(&self, conflict: &Conflict) -> IndexMap<String, Constraints> {
        let mut constraint_dict = IndexMap::with_capacity(2);
        match conflict {
            Conflict::Vertex {
                time,
                location,
                agent_1,
                agent_2,
            } => {
                let mut constraints = Constraints::new();
                constraints.add_vertex(VertexConstraint::new(*time, *location));
                constraint_dict.insert(agent_1.clone(), constraints.clone());
                constraint_dict.insert(agent_2.clone(), constraints);
            }
            Conflict::Edge {
                time,
                from,
                to,
                agent_1,
                agent_2,
            } => {
                let mut constraints_1 = Constraints::new();
                constraints_1.add_edge(EdgeConstraint::new(*time, *from, *to));
                let mut constraints_2 = Constraints::new();
                constraints_2.add_edge(EdgeConstraint::new(*time, *to, *from));
                constraint_dict.insert(agent_1.clone(), constraints_1);
                constraint_dict.insert(agent_2.clone(), constraints_2);
            }
        }
        constraint_dict
    }

    /// Plans every agent in registry order under its own constraint set.
    ///
    /// Agents missing from `constraints` are planned unconstrained. Returns
    /// `Ok(None)` as soon as one agent has no path.
    pub fn compute_solution<S: LowLevelSearch + ?Sized>(
        &self,
        constraints: &ConstraintTable,
        search: &S,
        stats: &mut Stats,
    ) -> MapfResult<Option<Solution>> {
        if let Some(unknown) = constraints.keys().find(|name| !self.agents.contains_key(*name)) {
            return Err(MapfError::UnknownAgent(unknown.clone()));
        }

        let empty = Constraints::new();
        let mut solution = Solution::new();
        for name in self.agents.keys() {
            let agent_constraints = constraints.get(name).unwrap_or(&empty);
            match self.compute_agent_path(name, agent_constraints, search, stats)? {
                Some(path) => {
                    solution.insert(name.clone(), path);
                }
                None => {
                    debug!("agent {name:?} has no path under {agent_constraints:?}");
                    return Ok(None);
                }
            }
        }
        Ok(Some(solution))
    }

    /// Plans a single agent under `constraints`.
    pub fn compute_agent_path<S: LowLevelSearch + ?Sized>(
        &self,
        name: &str,
        constraints: &Constraints,
        search: &S,
        stats: &mut Stats,
    ) -> MapfResult<Option<Path>> {
        let view = self.agent_view(name, constraints)?;
        Ok(search.search(&view, stats))
    }

    /// Sum of path lengths in states.
    pub fn solution_cost(&self, solution: &Solution) -> usize {
        solution.cost()
    }

    /// Checks that `solution` covers every agent with a well-formed path from
    /// its start to its goal and is free of conflicts.
    pub fn verify_solution(&self, solution: &Solution) -> bool {
        if solution.len() != self.agents.len() {
            debug!(
                "solution has {} paths for {} agents",
                solution.len(),
                self.agents.len()
            );
            return false;
        }

        for agent in self.agents.values() {
            let Some(path) = solution.get(&agent.name) else {
                debug!("agent {:?} has no path", agent.name);
                return false;
            };
            let (Some(first), Some(last)) = (path.first(), path.last()) else {
                debug!("agent {:?} has an empty path", agent.name);
                return false;
            };
            if *first != agent.start_state() || last.location != agent.goal {
                debug!("agent {:?} does not go from start to goal", agent.name);
                return false;
            }
            for (time, state) in path.iter().enumerate() {
                if state.time != time || !self.map.is_passable(state.location) {
                    debug!("agent {:?} has invalid state {state:?}", agent.name);
                    return false;
                }
            }
            for step in path.windows(2) {
                if step[0].location.manhattan_distance(&step[1].location) > 1 {
                    debug!("agent {:?} jumps {:?} -> {:?}", agent.name, step[0], step[1]);
                    return false;
                }
            }
        }

        self.first_conflict(solution).is_none()
    }
}

/// One agent's registry entry together with the constraint set in effect
/// while that agent is searched.
#[derive(Debug, Clone, Copy)]
pub struct AgentView<'a> {
    env: &'a Environment,
    agent: &'a Agent,
    constraints: &'a Constraints,
}

impl<'a> AgentView<'a> {
    pub fn agent(&self) -> &'a Agent {
        self.agent
    }

    pub fn constraints(&self) -> &'a Constraints {
        self.constraints
    }

    pub fn start(&self) -> State {
        self.agent.start_state()
    }

    pub fn neighbors(&self, state: &State) -> Vec<State> {
        self.env.neighbors(state, self.constraints)
    }

    pub fn heuristic(&self, state: &State) -> usize {
        state.location.manhattan_distance(&self.agent.goal)
    }

    pub fn is_goal(&self, state: &State) -> bool {
        state.equal_except_time(&self.agent.goal_state())
    }
}

/// All index pairs `(i, j)` with `i < j < n`, in lexicographic order.
pub(crate) fn agent_pairs(n: usize) -> Vec<(usize, usize)> {
    (0..n)
        .flat_map(|i| (i + 1..n).map(move |j| (i, j)))
        .collect()
}

// Agents that have finished stay at their last state. `path` is non-empty.
fn location_at(path: &Path, time: usize) -> Location {
    path[time.min(path.len() - 1)].location
}
