use anyhow::anyhow;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "Grid CBS",
    about = "Conflict-Based Search for multiple agents on a grid.",
    version = "0.1"
)]
pub struct Cli {
    #[arg(
        long,
        help = "Path to the YAML scenario file",
        default_value = "scenario/test.yaml"
    )]
    pub scenario_path: String,

    #[arg(
        long,
        help = "Path to a MovingAI map file, replacing the scenario's map"
    )]
    pub map_path: Option<String>,

    #[arg(
        long,
        help = "Path to the output file (.yaml, .yml or .json)",
        default_value = "result/solution.yaml"
    )]
    pub output_path: String,

    #[arg(
        long,
        help = "Generate this many random agents instead of the scenario's agents"
    )]
    pub random_agents: Option<usize>,

    #[arg(
        long,
        help = "Seed for the random number generator",
        default_value_t = 0
    )]
    pub seed: u64,

    #[arg(long, help = "Give up after expanding this many high level nodes")]
    pub max_high_level_nodes: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub scenario_path: String,
    pub map_path: Option<String>,
    pub output_path: String,
    pub random_agents: Option<usize>,
    pub seed: u64,
    pub max_high_level_nodes: Option<usize>,
}

impl Config {
    pub fn new(cli: &Cli) -> Self {
        Self {
            scenario_path: cli.scenario_path.clone(),
            map_path: cli.map_path.clone(),
            output_path: cli.output_path.clone(),
            random_agents: cli.random_agents,
            seed: cli.seed,
            max_high_level_nodes: cli.max_high_level_nodes,
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let extension = std::path::Path::new(&self.output_path)
            .extension()
            .and_then(|extension| extension.to_str());
        if !matches!(extension, Some("yaml" | "yml" | "json")) {
            return Err(anyhow!(
                "Output path must end in .yaml, .yml or .json, got {}",
                self.output_path
            ));
        }

        if self.random_agents == Some(0) {
            return Err(anyhow!("Number of random agents must be positive"));
        }

        if self.max_high_level_nodes == Some(0) {
            return Err(anyhow!("High level node limit must be positive"));
        }

        Ok(())
    }
}
