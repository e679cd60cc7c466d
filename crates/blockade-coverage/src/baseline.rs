//! Degree baseline: block the best-connected eligible nodes.

use std::collections::BTreeSet;

use blockade_diffusion::{ConfigError, Result};
use blockade_topology::{nodes_by_degree, Network, NodeId};
use tracing::debug;

/// The `budget` highest-degree nodes not in `excluded`.
///
/// Ties go to the lower id. Fewer nodes come back when the eligible set is
/// smaller than the budget.
///
/// # Errors
///
/// [`ConfigError::BudgetTooLarge`] if `budget` exceeds the node count.
pub fn degree_block_set(
    network: &Network,
    budget: usize,
    excluded: &BTreeSet<NodeId>,
) -> Result<Vec<NodeId>> {
    if budget > network.node_count() {
        return Err(ConfigError::BudgetTooLarge {
            field: "budget",
            budget,
            nodes: network.node_count(),
        });
    }

    let chosen: Vec<NodeId> = nodes_by_degree(network)
        .into_iter()
        .filter(|node| !excluded.contains(node))
        .take(budget)
        .collect();

    if chosen.len() < budget {
        debug!(budget, chosen = chosen.len(), "degree baseline ran out of nodes");
    }
    Ok(chosen)
}
