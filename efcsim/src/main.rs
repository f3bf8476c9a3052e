mod cli;

use anyhow::{Context as _, Result, anyhow};
use clap::Parser as _;
use efcsim_core::{NodeId, PipelineStats, SimConfig, Simulation};
use indicatif::ProgressBar;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// The text and JSON forms of the statistics of node `id`.
fn select(stats: &PipelineStats, id: NodeId) -> Result<(String, serde_json::Value)> {
    if let Some(device) = stats.device(id) {
        return Ok((device.to_string(), serde_json::to_value(device)?));
    }
    let node = stats
        .node(id)
        .ok_or_else(|| anyhow!("No node `{id}' in the pipeline"))?;
    Ok((node.to_string(), serde_json::to_value(node)?))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = SimConfig::load(&cli.config)
        .with_context(|| format!("Failed to load `{}'", cli.config.display()))?;
    cli.apply(&mut config);
    tracing::debug!(?config, "configuration loaded");

    let mut simulation = Simulation::new(config).context("Failed to prepare the simulation")?;

    let progress = if cli.quiet || cli.json {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(simulation.total_ticks())
    };
    while !simulation.is_finished() {
        simulation
            .step()
            .with_context(|| format!("Simulation failed at tick {}", simulation.tick()))?;
        progress.inc(1);
    }
    progress.finish_and_clear();

    let report = simulation.report();
    let stats = simulation.stats();
    let selected = cli
        .node
        .iter()
        .map(|id| select(&stats, *id))
        .collect::<Result<Vec<_>>>()?;

    if cli.json {
        let mut output = serde_json::Map::new();
        output.insert("report".to_owned(), serde_json::to_value(&report)?);
        if cli.nodes {
            output.insert("nodes".to_owned(), serde_json::to_value(&stats)?);
        }
        if !selected.is_empty() {
            let values = selected.into_iter().map(|(_, value)| value).collect();
            output.insert("selected".to_owned(), serde_json::Value::Array(values));
        }
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{report}");
        if cli.nodes {
            println!();
            print!("{stats}");
        }
        if !selected.is_empty() {
            println!();
            for (text, _) in &selected {
                println!("{text}");
            }
        }
    }

    Ok(())
}
