// navslam_sim/src/main.rs

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use navslam_sim::cli::Cli;
use navslam_sim::prelude::*;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("navslam_sim=info,navslam_core=info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = load_scenario(cli.scenario.as_deref()).context("Failed to load scenario")?;
    cli.apply_overrides(&mut config);
    config.validate().context("Invalid scenario after command-line overrides")?;

    if cli.print_config {
        print!(
            "{}",
            toml::to_string_pretty(&config).context("Failed to serialize scenario")?
        );
        return Ok(());
    }

    let mut simulation = Simulation::new(config).context("Failed to build simulation")?;
    let summary = simulation.run();
    println!("{summary}");
    Ok(())
}
