use grid_cbs::config::{Cli, Config};
use grid_cbs::map::Map;
use grid_cbs::scenario::{AgentYaml, Scenario, SolutionReport};
use grid_cbs::solver::{Solver, CBS};

use anyhow::Context;
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let cli = Cli::parse();
    let config = Config::new(&cli);
    config.validate()?;

    let mut scenario = Scenario::load_from_file(&config.scenario_path)
        .with_context(|| format!("error with scenario file: {}", config.scenario_path))?;
    let map = match &config.map_path {
        Some(map_path) => {
            Map::from_file(map_path).with_context(|| format!("error with map file: {map_path}"))?
        }
        None => scenario.build_map()?,
    };

    if let Some(num_agents) = config.random_agents {
        let mut rng = StdRng::seed_from_u64(config.seed);
        scenario.agents = Scenario::generate_agents_randomly(&map, num_agents, &mut rng)?
            .iter()
            .map(AgentYaml::from)
            .collect();
    }

    let env = scenario
        .into_environment(Some(map))
        .context("invalid scenario")?;

    let mut cbs_solver = CBS::new(&env).with_max_high_level_nodes(config.max_high_level_nodes);
    match cbs_solver.solve()? {
        Some(solution) => {
            if !env.verify_solution(&solution) {
                error!("cbs solution fails verification");
            }
            SolutionReport::new(&solution, cbs_solver.stats())
                .write_to_file(&config.output_path)
                .with_context(|| format!("error writing output: {}", config.output_path))?;
            info!("solution written to {}", config.output_path);
        }
        None => error!("cbs solve fails"),
    }

    Ok(())
}
