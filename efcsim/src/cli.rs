use clap::Parser;
use efcsim_core::{NodeId, SimConfig};
use std::path::PathBuf;

/// Simulate an IoT → Edge → Fog → Cloud data pipeline and report its
/// latency, energy, bandwidth and data reduction.
#[derive(Debug, Parser)]
#[command(name = "efcsim", version, about)]
pub struct Cli {
    /// Configuration file (`key = value` properties). Defaults are used
    /// if it does not exist.
    #[arg(short, long, default_value = "resources/config.properties")]
    pub config: PathBuf,

    /// Number of ticks to simulate, overrides `simulation.time`.
    #[arg(long)]
    pub ticks: Option<u64>,

    /// Seed of the random source, overrides `simulation.seed`.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Print the report as JSON.
    #[arg(long)]
    pub json: bool,

    /// Also print the statistics of every node.
    #[arg(long)]
    pub nodes: bool,

    /// Also print the statistics of one node (`iot-3`, `edge-0`, `fog-1`,
    /// `cloud-0`). May be repeated.
    #[arg(long, value_name = "ID")]
    pub node: Vec<NodeId>,

    /// Hide the progress bar.
    #[arg(short, long)]
    pub quiet: bool,

    /// Increase logging verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Apply the command line overrides on top of the loaded configuration.
    pub fn apply(&self, config: &mut SimConfig) {
        if let Some(ticks) = self.ticks {
            config.simulation.time = ticks;
        }
        if let Some(seed) = self.seed {
            config.simulation.seed = Some(seed);
        }
    }
}
