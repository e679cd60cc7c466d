//! Error types for blockade-diffusion.

use blockade_topology::NodeId;
use thiserror::Error;

/// Result type for diffusion operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Malformed run configuration.
///
/// Raised before any state is touched. Every variant names the offending
/// field; nothing is clamped or coerced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Threshold below 1.
    #[error("threshold must be at least 1, got {0}")]
    ThresholdTooLow(u32),

    /// A node sits in two seed sets.
    #[error("node {node} appears in both {first} and {second}")]
    SeedOverlap {
        first: &'static str,
        second: &'static str,
        node: NodeId,
    },

    /// A seed appears in a block set.
    #[error("{field} contains node {node} which is a seed")]
    BlockedSeed { field: &'static str, node: NodeId },

    /// A seed or block references a node the network does not have.
    #[error("{field} contains node {node} which is not in the network")]
    UnknownNode { field: &'static str, node: NodeId },

    /// A blocking budget larger than the network.
    #[error("{field} budget {budget} exceeds node count {nodes}")]
    BudgetTooLarge {
        field: &'static str,
        budget: usize,
        nodes: usize,
    },
}
