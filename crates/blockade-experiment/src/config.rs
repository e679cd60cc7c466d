//! Experiment configuration.
//!
//! Every setting is a command-line flag with an environment variable
//! fallback, then a built-in default matching the published sweep.

use std::num::NonZeroUsize;
use std::path::PathBuf;

use blockade_diffusion::Threshold;

use crate::error::{ExperimentError, Result};

/// RNG seeds of the published sweep, one per network.
pub const DEFAULT_RNG_SEEDS: [u64; 3] = [6893, 20591, 20653];

/// Budget fractions of the published sweep: 0.5% then 1% through 12%.
pub const DEFAULT_BUDGETS: [f64; 13] = [
    0.005, 0.01, 0.02, 0.03, 0.04, 0.05, 0.06, 0.07, 0.08, 0.09, 0.10, 0.11, 0.12,
];

/// Row encoding for the results file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Comma separated with a header line
    #[default]
    Csv,
    /// One JSON object per line
    Json,
}

/// Sweep over networks, seed sizes, samples, thresholds and budgets.
#[derive(clap::Parser, Debug, Clone)]
#[command(
    name = "blockade",
    version,
    about = "Compare blocking strategies against two-contagion threshold diffusion"
)]
pub struct ExperimentConfig {
    /// Directory holding `<name>.edges` and optional `<name>.nodes` files.
    #[arg(long, env = "BLOCKADE_NETWORK_DIR", default_value = "./networks")]
    pub network_dir: PathBuf,

    /// Network names to run, in order.
    #[arg(long, env = "BLOCKADE_NETWORKS", value_delimiter = ',', required = true)]
    pub networks: Vec<String>,

    /// RNG seed per network; reused cyclically when shorter than the network list.
    #[arg(
        long,
        env = "BLOCKADE_RNG_SEEDS",
        value_delimiter = ',',
        default_values_t = DEFAULT_RNG_SEEDS
    )]
    pub rng_seeds: Vec<u64>,

    /// Activation thresholds shared by both contagions.
    #[arg(
        long,
        env = "BLOCKADE_THRESHOLDS",
        value_delimiter = ',',
        default_values_t = [2u32, 3, 4]
    )]
    pub thresholds: Vec<u32>,

    /// Total blocking budgets as fractions of the node count.
    #[arg(
        long,
        env = "BLOCKADE_BUDGETS",
        value_delimiter = ',',
        default_values_t = DEFAULT_BUDGETS
    )]
    pub budgets: Vec<f64>,

    /// Numbers of seed nodes to draw.
    #[arg(
        long,
        env = "BLOCKADE_SEED_SIZES",
        value_delimiter = ',',
        default_values_t = [10usize, 20]
    )]
    pub seed_sizes: Vec<usize>,

    /// Seed sets drawn per seed size; results are averaged over them.
    #[arg(long, env = "BLOCKADE_SAMPLES", default_value_t = 10)]
    pub samples: usize,

    /// Seeds are drawn from the k-core with this k.
    #[arg(long, env = "BLOCKADE_CORE", default_value_t = 20)]
    pub core: usize,

    /// Results file.
    #[arg(long, env = "BLOCKADE_OUTPUT", default_value = "./results.csv")]
    pub output: PathBuf,

    /// Results encoding.
    #[arg(long, env = "BLOCKADE_FORMAT", value_enum, default_value_t = OutputFormat::Csv)]
    pub format: OutputFormat,

    /// Trials run concurrently (default: available parallelism).
    #[arg(long, env = "BLOCKADE_JOBS")]
    pub jobs: Option<usize>,
}

impl ExperimentConfig {
    /// Reject settings the sweep cannot run with. Nothing is clamped.
    pub fn validate(&self) -> Result<()> {
        if self.networks.is_empty() {
            return Err(ExperimentError::invalid("networks", "no networks given"));
        }
        if self.rng_seeds.is_empty() {
            return Err(ExperimentError::invalid("rng_seeds", "no seeds given"));
        }
        if self.thresholds.is_empty() {
            return Err(ExperimentError::invalid("thresholds", "no thresholds given"));
        }
        for &threshold in &self.thresholds {
            Threshold::new(threshold)?;
        }
        if self.budgets.is_empty() {
            return Err(ExperimentError::invalid("budgets", "no budgets given"));
        }
        if let Some(bad) = self.budgets.iter().find(|f| !(0.0..=1.0).contains(*f)) {
            return Err(ExperimentError::invalid(
                "budgets",
                format!("fraction {bad} outside [0, 1]"),
            ));
        }
        if self.seed_sizes.is_empty() {
            return Err(ExperimentError::invalid("seed_sizes", "no seed sizes given"));
        }
        if self.seed_sizes.contains(&0) {
            return Err(ExperimentError::invalid("seed_sizes", "seed size must be at least 1"));
        }
        if self.samples == 0 {
            return Err(ExperimentError::invalid("samples", "must be at least 1"));
        }
        if self.jobs == Some(0) {
            return Err(ExperimentError::invalid("jobs", "must be at least 1"));
        }
        Ok(())
    }

    /// RNG seed for the network at `position` in the network list.
    pub fn rng_seed(&self, position: usize) -> u64 {
        self.rng_seeds[position % self.rng_seeds.len()]
    }

    /// Validated thresholds, in configured order.
    pub fn thresholds(&self) -> Result<Vec<Threshold>> {
        self.thresholds
            .iter()
            .map(|&t| Threshold::new(t).map_err(ExperimentError::from))
            .collect()
    }

    /// Concurrent trial limit.
    pub fn jobs(&self) -> usize {
        self.jobs
            .unwrap_or_else(|| std::thread::available_parallelism().map_or(1, NonZeroUsize::get))
    }
}

/// Node budget for a fraction of the network, rounded down.
pub fn budget_for(fraction: f64, node_count: usize) -> usize {
    (fraction * node_count as f64).floor() as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn parse(args: &[&str]) -> ExperimentConfig {
        let mut argv = vec!["blockade"];
        argv.extend_from_slice(args);
        ExperimentConfig::try_parse_from(argv).unwrap()
    }

    #[test]
    fn defaults_match_published_sweep() {
        let config = parse(&["--networks", "astroph"]);
        assert_eq!(config.networks, vec!["astroph".to_string()]);
        assert_eq!(config.thresholds, vec![2, 3, 4]);
        assert_eq!(config.seed_sizes, vec![10, 20]);
        assert_eq!(config.budgets.len(), 13);
        assert_eq!(config.samples, 10);
        assert_eq!(config.core, 20);
        assert_eq!(config.format, OutputFormat::Csv);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn comma_lists_parse() {
        let config = parse(&[
            "--networks",
            "a,b",
            "--thresholds",
            "1,5",
            "--budgets",
            "0.1,0.25",
            "--format",
            "json",
        ]);
        assert_eq!(config.networks, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(config.thresholds, vec![1, 5]);
        assert_eq!(config.budgets, vec![0.1, 0.25]);
        assert_eq!(config.format, OutputFormat::Json);
    }

    #[test]
    fn rng_seeds_cycle() {
        let config = parse(&["--networks", "a,b,c,d", "--rng-seeds", "1,2"]);
        assert_eq!(
            (0..4).map(|i| config.rng_seed(i)).collect::<Vec<_>>(),
            vec![1, 2, 1, 2]
        );
    }

    #[test]
    fn zero_threshold_rejected() {
        let config = parse(&["--networks", "a", "--thresholds", "2,0"]);
        assert!(matches!(config.validate(), Err(ExperimentError::Config(_))));
    }

    #[test]
    fn budget_fraction_out_of_range_rejected() {
        let config = parse(&["--networks", "a", "--budgets", "0.5,1.5"]);
        assert!(matches!(
            config.validate(),
            Err(ExperimentError::InvalidSetting { field: "budgets", .. })
        ));
    }

    #[test]
    fn zero_samples_and_seed_sizes_rejected() {
        let config = parse(&["--networks", "a", "--samples", "0"]);
        assert!(matches!(
            config.validate(),
            Err(ExperimentError::InvalidSetting { field: "samples", .. })
        ));

        let config = parse(&["--networks", "a", "--seed-sizes", "0"]);
        assert!(matches!(
            config.validate(),
            Err(ExperimentError::InvalidSetting { field: "seed_sizes", .. })
        ));
    }

    #[test]
    fn budgets_round_down() {
        assert_eq!(budget_for(0.005, 1000), 5);
        assert_eq!(budget_for(0.01, 150), 1);
        assert_eq!(budget_for(0.12, 10), 1);
        assert_eq!(budget_for(0.0, 10), 0);
        assert_eq!(budget_for(1.0, 10), 10);
    }
}
