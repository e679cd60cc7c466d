//! Error types for blockade-topology.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for topology operations.
pub type Result<T> = std::result::Result<T, TopologyError>;

/// Errors that can occur while building a network from its input files.
///
/// Loading is all-or-nothing: when any of these is returned, no partial
/// network is handed back.
#[derive(Debug, Error)]
pub enum TopologyError {
    /// A line of the edge list could not be parsed.
    #[error("malformed edge list at line {line}: {reason}")]
    InputFormat { line: usize, reason: String },

    /// The companion node file did not hold a node id.
    #[error("malformed node file {}: {reason}", path.display())]
    NodeFile { path: PathBuf, reason: String },

    /// An input file could not be read.
    #[error("IO error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
