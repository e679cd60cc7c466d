//! Blocking Experiments
//!
//! Sweeps networks, seed sizes, thresholds and budgets, comparing three
//! strategies against two-contagion threshold diffusion: no blocking, CBH
//! blocking and degree blocking. Results are averaged over random seed sets
//! drawn from each network's k-core and written as CSV or JSON lines.
//!
//! # Example
//!
//! ```no_run
//! use blockade_experiment::{Experiment, ExperimentConfig, RowWriter};
//! use clap::Parser;
//!
//! # async fn demo() -> blockade_experiment::Result<()> {
//! let config = ExperimentConfig::parse();
//! let format = config.format;
//! let experiment = Experiment::new(config)?;
//!
//! let mut writer = RowWriter::new(std::io::stdout().lock(), format)?;
//! experiment.run(&mut writer).await?;
//! writer.finish()?;
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod experiment;
mod output;
mod sampler;

pub use config::{budget_for, ExperimentConfig, OutputFormat, DEFAULT_BUDGETS, DEFAULT_RNG_SEEDS};
pub use error::{ExperimentError, Result};
pub use experiment::{Experiment, Trial, TrialOutcome};
pub use output::{ExperimentRow, RowWriter, STRATEGIES};
pub use sampler::SeedSampler;
