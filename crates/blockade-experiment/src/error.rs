//! Error types for the experiment harness.

use blockade_diffusion::ConfigError;
use blockade_topology::TopologyError;
use thiserror::Error;

/// Result type for harness operations.
pub type Result<T> = std::result::Result<T, ExperimentError>;

/// Errors that stop an experiment sweep.
#[derive(Debug, Error)]
pub enum ExperimentError {
    /// Network file missing or malformed
    #[error("Topology error: {0}")]
    Topology(#[from] TopologyError),

    /// Seeds, blocks or budgets rejected by the engine
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A harness setting out of range
    #[error("Invalid setting {field}: {reason}")]
    InvalidSetting { field: &'static str, reason: String },

    /// Not enough well-connected nodes to draw seeds from
    #[error("{network}: {k}-core has {available} nodes, seed size {seed_size} needs more")]
    CoreTooSmall {
        network: String,
        k: usize,
        available: usize,
        seed_size: usize,
    },

    /// Seed role distribution could not be built
    #[error("Sampler error: {0}")]
    Sampler(#[from] rand::distributions::WeightedError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A trial task panicked or was cancelled
    #[error("Trial task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl ExperimentError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidSetting {
            field,
            reason: reason.into(),
        }
    }
}
