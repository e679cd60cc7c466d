//! k-core extraction by iterative peeling.
//!
//! A node survives in the k-core iff it keeps at least `k` neighbors after
//! every node with fewer than `k` surviving neighbors has been removed.
//! Peeling visits each edge at most twice.

use std::collections::{BTreeSet, VecDeque};

use crate::{Network, NodeId};

/// Nodes of the maximal subgraph in which every node has degree >= `k`.
///
/// `k = 0` returns every node. The result may be empty.
pub fn k_core(network: &Network, k: usize) -> BTreeSet<NodeId> {
    let n = network.node_count();
    let mut degree: Vec<usize> = (0..n).map(|idx| network.degree_at(idx)).collect();
    let mut removed = vec![false; n];

    let mut queue: VecDeque<usize> = VecDeque::new();
    for idx in 0..n {
        if degree[idx] < k {
            removed[idx] = true;
            queue.push_back(idx);
        }
    }

    while let Some(idx) = queue.pop_front() {
        for &neighbor in network.neighbor_indices(idx) {
            if removed[neighbor] {
                continue;
            }
            degree[neighbor] -= 1;
            if degree[neighbor] < k {
                removed[neighbor] = true;
                queue.push_back(neighbor);
            }
        }
    }

    (0..n)
        .filter(|&idx| !removed[idx])
        .map(|idx| network.id_of(idx))
        .collect()
}
