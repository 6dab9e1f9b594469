use indexmap::IndexMap;
use rand::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{self, BufReader, Write};
use std::path::Path as FsPath;
use tracing::info;

use crate::common::{Agent, Location, Solution};
use crate::env::Environment;
use crate::error::{MapfError, MapfResult};
use crate::map::Map;
use crate::stat::Stats;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapYaml {
    pub dimensions: [i32; 2],
    #[serde(default)]
    pub obstacles: Vec<[i32; 2]>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentYaml {
    pub name: String,
    pub start: [i32; 2],
    pub goal: [i32; 2],
}

impl From<&AgentYaml> for Agent {
    fn from(agent: &AgentYaml) -> Self {
        Agent {
            name: agent.name.clone(),
            start: agent.start.into(),
            goal: agent.goal.into(),
        }
    }
}

impl From<&Agent> for AgentYaml {
    fn from(agent: &Agent) -> Self {
        AgentYaml {
            name: agent.name.clone(),
            start: [agent.start.x, agent.start.y],
            goal: [agent.goal.x, agent.goal.y],
        }
    }
}

/// Problem instance: a grid with obstacles and a list of agents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub map: MapYaml,
    #[serde(default)]
    pub agents: Vec<AgentYaml>,
}

impl Scenario {
    pub fn load_from_file(path: &str) -> MapfResult<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        Ok(serde_yaml::from_reader(reader)?)
    }

    pub fn from_yaml_str(yaml: &str) -> MapfResult<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn build_map(&self) -> MapfResult<Map> {
        let [width, height] = self.map.dimensions;
        Map::new(
            width,
            height,
            self.map.obstacles.iter().map(|&obstacle| Location::from(obstacle)),
        )
    }

    pub fn agents(&self) -> Vec<Agent> {
        self.agents.iter().map(Agent::from).collect()
    }

    /// Validates the scenario and registers its agents. `map` replaces the
    /// inline map when given.
    pub fn into_environment(self, map: Option<Map>) -> MapfResult<Environment> {
        let map = match map {
            Some(map) => map,
            None => self.build_map()?,
        };
        Environment::new(map, self.agents())
    }

    /// `num_agents` agents with distinct random starts and distinct random
    /// goals on free cells of `map`, named `agent0`, `agent1`, ...
    pub fn generate_agents_randomly<R: Rng + ?Sized>(
        map: &Map,
        num_agents: usize,
        rng: &mut R,
    ) -> MapfResult<Vec<Agent>> {
        let free_cells = map.free_cells();
        if free_cells.len() < num_agents {
            return Err(MapfError::NotEnoughFreeCells {
                requested: num_agents,
                available: free_cells.len(),
            });
        }

        let starts: Vec<Location> = free_cells.choose_multiple(rng, num_agents).copied().collect();
        let goals: Vec<Location> = free_cells.choose_multiple(rng, num_agents).copied().collect();

        let agents: Vec<Agent> = starts
            .into_iter()
            .zip(goals)
            .enumerate()
            .map(|(id, (start, goal))| Agent {
                name: format!("agent{id}"),
                start,
                goal,
            })
            .collect();

        info!("Generate scen: {agents:?}");
        Ok(agents)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistics {
    pub cost: usize,
    pub makespan: usize,
    pub runtime_us: usize,
    pub high_level_expanded: usize,
    pub low_level_expanded: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub x: i32,
    pub y: i32,
    pub t: usize,
}

/// Solver output: statistics plus one timed schedule per agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolutionReport {
    pub statistics: Statistics,
    pub schedule: IndexMap<String, Vec<ScheduleEntry>>,
}

impl SolutionReport {
    pub fn new(solution: &Solution, stats: &Stats) -> Self {
        let schedule = solution
            .paths
            .iter()
            .map(|(name, path)| {
                let entries = path
                    .iter()
                    .map(|state| ScheduleEntry {
                        x: state.location.x,
                        y: state.location.y,
                        t: state.time,
                    })
                    .collect();
                (name.clone(), entries)
            })
            .collect();

        SolutionReport {
            statistics: Statistics {
                cost: solution.cost(),
                makespan: solution.makespan(),
                runtime_us: stats.time_us,
                high_level_expanded: stats.high_level_expand_nodes,
                low_level_expanded: stats.low_level_expand_nodes,
            },
            schedule,
        }
    }

    /// Writes JSON for a `.json` path, YAML otherwise.
    pub fn write_to_file(&self, path: &str) -> MapfResult<()> {
        if let Some(parent) = FsPath::new(path).parent() {
            fs::create_dir_all(parent)?;
        }
        let file = File::create(path)?;
        let mut writer = io::BufWriter::new(file);
        let is_json = FsPath::new(path)
            .extension()
            .is_some_and(|extension| extension == "json");
        if is_json {
            serde_json::to_writer_pretty(&mut writer, self)?;
        } else {
            writer.write_all(serde_yaml::to_string(self)?.as_bytes())?;
        }
        writer.flush()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::State;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    const SCENARIO: &str = "
map:
  dimensions: [5, 5]
  obstacles:
    - [2, 2]
agents:
  - name: agent0
    start: [0, 0]
    goal: [4, 0]
  - name: agent1
    start: [4, 0]
    goal: [0, 0]
";

    #[test]
    fn test_read_scenario() {
        let scenario = Scenario::from_yaml_str(SCENARIO).unwrap();
        assert_eq!(scenario.map.dimensions, [5, 5]);
        assert_eq!(scenario.agents.len(), 2);

        let env = scenario.into_environment(None).unwrap();
        let names: Vec<&str> = env.agents().map(|agent| agent.name.as_str()).collect();
        assert_eq!(names, vec!["agent0", "agent1"]);
        assert!(!env.map().is_passable(Location::new(2, 2)));
        assert_eq!(env.agent("agent1").unwrap().goal, Location::new(0, 0));
    }

    #[test]
    fn test_scenario_rejects_agent_on_obstacle() {
        let yaml = SCENARIO.replace("goal: [4, 0]", "goal: [2, 2]");
        let scenario = Scenario::from_yaml_str(&yaml).unwrap();
        assert!(matches!(
            scenario.into_environment(None),
            Err(MapfError::BlockedLocation { .. })
        ));
    }

    #[test]
    fn test_scenario_rejects_duplicate_names() {
        let yaml = SCENARIO.replace("name: agent1", "name: agent0");
        let scenario = Scenario::from_yaml_str(&yaml).unwrap();
        assert!(matches!(
            scenario.into_environment(None),
            Err(MapfError::DuplicateAgent(name)) if name == "agent0"
        ));
    }

    #[test]
    fn test_generate_agents_randomly() {
        let map = Map::new(4, 4, vec![Location::new(1, 1), Location::new(2, 2)]).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        let agents = Scenario::generate_agents_randomly(&map, 5, &mut rng).unwrap();

        assert_eq!(agents.len(), 5);
        let starts: HashSet<Location> = agents.iter().map(|agent| agent.start).collect();
        let goals: HashSet<Location> = agents.iter().map(|agent| agent.goal).collect();
        assert_eq!(starts.len(), 5);
        assert_eq!(goals.len(), 5);
        assert!(agents
            .iter()
            .all(|agent| map.is_passable(agent.start) && map.is_passable(agent.goal)));

        // Same seed, same agents.
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(
            Scenario::generate_agents_randomly(&map, 5, &mut rng).unwrap(),
            agents
        );

        // Valid input for an environment.
        assert!(Environment::new(map.clone(), agents).is_ok());

        assert!(matches!(
            Scenario::generate_agents_randomly(&map, 15, &mut rng),
            Err(MapfError::NotEnoughFreeCells {
                requested: 15,
                available: 14
            })
        ));
    }

    #[test]
    fn test_solution_report() {
        let mut solution = Solution::new();
        solution.insert(
            "agent0",
            vec![
                State::new(0, Location::new(0, 0)),
                State::new(1, Location::new(1, 0)),
            ],
        );
        let stats = Stats {
            high_level_expand_nodes: 3,
            ..Stats::default()
        };

        let report = SolutionReport::new(&solution, &stats);
        assert_eq!(report.statistics.cost, 2);
        assert_eq!(report.statistics.makespan, 1);
        assert_eq!(report.statistics.high_level_expanded, 3);
        assert_eq!(
            report.schedule["agent0"][1],
            ScheduleEntry { x: 1, y: 0, t: 1 }
        );

        let path = std::env::temp_dir().join("grid_cbs_test_solution_report.json");
        let path = path.to_str().unwrap();
        report.write_to_file(path).unwrap();
        let written: SolutionReport =
            serde_json::from_reader(File::open(path).unwrap()).unwrap();
        assert_eq!(written, report);
    }
}
