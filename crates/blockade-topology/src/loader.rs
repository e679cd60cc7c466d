//! Edge-list input.
//!
//! Format: one `u v` pair of integer node ids per line, whitespace
//! separated. Blank lines and lines starting with `#` or `%` are skipped;
//! columns after the second (weights, timestamps) are ignored.
//!
//! A network named `name` lives in `<dir>/name.edges`. An optional
//! `<dir>/name.nodes` companion holds one extra isolated node id on its
//! first line.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::{Network, NodeId, Result, TopologyError};

/// Parse an edge list held in memory.
pub fn parse_edge_list(input: &str) -> Result<Network> {
    let mut network = Network::new();

    for (offset, raw) in input.lines().enumerate() {
        let line = offset + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('%') {
            continue;
        }

        let mut fields = trimmed.split_whitespace();
        let (u, v) = match (fields.next(), fields.next()) {
            (Some(u), Some(v)) => (u, v),
            _ => {
                return Err(TopologyError::InputFormat {
                    line,
                    reason: "expected two node ids".to_string(),
                })
            }
        };

        network.add_edge(parse_node_id(u, line)?, parse_node_id(v, line)?);
    }

    Ok(network)
}

fn parse_node_id(field: &str, line: usize) -> Result<NodeId> {
    field
        .parse::<u64>()
        .map(NodeId)
        .map_err(|_| TopologyError::InputFormat {
            line,
            reason: format!("invalid node id `{}`", field),
        })
}

fn read_bytes(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|source| TopologyError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Load an edge-list file.
///
/// Bytes that are not valid UTF-8 are a format error on the line holding them.
pub fn load_edge_list(path: &Path) -> Result<Network> {
    let input = String::from_utf8(read_bytes(path)?).map_err(|err| {
        let valid = &err.as_bytes()[..err.utf8_error().valid_up_to()];
        TopologyError::InputFormat {
            line: valid.iter().filter(|&&b| b == b'\n').count() + 1,
            reason: "invalid UTF-8".to_string(),
        }
    })?;
    parse_edge_list(&input)
}

/// Read the single node id from a companion node file.
pub fn read_extra_node(path: &Path) -> Result<NodeId> {
    let input = String::from_utf8(read_bytes(path)?).map_err(|_| TopologyError::NodeFile {
        path: path.to_path_buf(),
        reason: "invalid UTF-8".to_string(),
    })?;

    let first = input.lines().next().map(str::trim).unwrap_or_default();
    first.parse::<u64>().map(NodeId).map_err(|_| TopologyError::NodeFile {
        path: path.to_path_buf(),
        reason: format!("expected a node id, found `{}`", first),
    })
}

/// Load `<dir>/<name>.edges`, plus the isolated node from `<dir>/<name>.nodes`
/// when that file exists.
pub fn load_network(dir: &Path, name: &str) -> Result<Network> {
    let edges_path = dir.join(format!("{}.edges", name));
    let mut network = load_edge_list(&edges_path)?;

    let nodes_path = dir.join(format!("{}.nodes", name));
    if nodes_path.exists() {
        let extra = read_extra_node(&nodes_path)?;
        network.add_node(extra);
        debug!(network = name, node = %extra, "added isolated node");
    }

    debug!(
        network = name,
        nodes = network.node_count(),
        edges = network.edge_count(),
        "loaded network"
    );
    Ok(network)
}
