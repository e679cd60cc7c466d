//! Blockade experiment runner
//!
//! Runs the configured sweep and writes one row per
//! (network, threshold, seed size, budget).

use std::fs::File;
use std::io::BufWriter;

use blockade_experiment::{Experiment, ExperimentConfig, RowWriter};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "blockade=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ExperimentConfig::parse();
    let output = config.output.clone();
    let format = config.format;

    let experiment = match Experiment::new(config) {
        Ok(experiment) => experiment,
        Err(e) => {
            tracing::error!("invalid configuration: {e}");
            return Err(e.into());
        }
    };

    tracing::info!(
        networks = experiment.config().networks.len(),
        jobs = experiment.config().jobs(),
        output = %output.display(),
        "Starting sweep"
    );

    let file = BufWriter::new(File::create(&output)?);
    let mut writer = RowWriter::new(file, format)?;
    match experiment.run(&mut writer).await {
        Ok(rows) => tracing::info!(rows, "Sweep complete"),
        Err(e) => {
            tracing::error!("sweep failed: {e}");
            return Err(e.into());
        }
    }
    writer.finish()?;

    Ok(())
}
