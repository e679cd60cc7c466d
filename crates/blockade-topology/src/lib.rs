//! Blockade Network Topology
//!
//! Immutable, undirected, unweighted network substrate shared by every
//! diffusion run.
//!
//! # Arena Layout
//!
//! Nodes are identified externally by [`NodeId`] (the integer ids found in
//! edge-list files) and internally by a dense `usize` index assigned in
//! insertion order. Adjacency is stored per index, which gives:
//!
//! - O(1) degree lookup
//! - O(1) access to a node's neighbor slice
//! - per-run state tables that are plain `Vec`s indexed the same way
//!
//! The topology is loaded once and never mutated by a run. Runs keep their
//! own state, so one `Network` can be shared (behind an `Arc`) by any number
//! of concurrent trials.
//!
//! # Seed Candidates
//!
//! [`k_core`] restricts seed candidates to well-connected nodes: the maximal
//! subgraph in which every node keeps at least `k` neighbors.

mod error;
mod kcore;
mod loader;
mod network;
mod node;

pub use error::{Result, TopologyError};
pub use kcore::k_core;
pub use loader::{load_edge_list, load_network, parse_edge_list, read_extra_node};
pub use network::{nodes_by_degree, Network};
pub use node::NodeId;
