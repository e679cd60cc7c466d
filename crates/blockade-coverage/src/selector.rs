//! Greedy coverage selection against a static infection snapshot.
//!
//! # At-Risk Nodes
//!
//! For contagion `c`, a node is at risk if the snapshot has it infected by
//! `c`, or if it borders the infection (uninfected, with at least one
//! `c`-infected neighbor). Ineligible nodes (the seeds) are never at risk:
//! they cannot be saved.
//!
//! # Coverage
//!
//! Blocking `v` covers the at-risk nodes among `{v} ∪ N(v)`. The selector
//! repeatedly takes the eligible node with the largest number of not yet
//! covered at-risk nodes, lowest id first on ties, until the budget is spent
//! or no candidate adds anything.
//!
//! # Lazy Evaluation
//!
//! Marginal coverage only shrinks as picks accumulate, so a stale heap key
//! is an upper bound on the true gain. Popping the top, refreshing it, and
//! accepting it only when the refreshed gain equals its key yields the same
//! picks as rescanning every candidate each time.

use std::cmp::Reverse;
use std::collections::{BTreeSet, BinaryHeap};
use std::ops::Deref;

use blockade_diffusion::{ConfigError, Contagion, Result, SimulationResult};
use blockade_topology::{Network, NodeId};
use tracing::debug;

/// Nodes chosen for immunization against one contagion, in pick order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    contagion: Contagion,
    budget: usize,
    nodes: Vec<NodeId>,
    covered: usize,
}

impl Selection {
    /// The contagion these nodes are blocked for.
    pub fn contagion(&self) -> Contagion {
        self.contagion
    }

    /// The budget the selection was made under.
    pub fn budget(&self) -> usize {
        self.budget
    }

    /// At-risk nodes covered by the picks.
    pub fn covered(&self) -> usize {
        self.covered
    }

    /// Whether candidates ran out before the budget did.
    pub fn is_short(&self) -> bool {
        self.nodes.len() < self.budget
    }

    /// Chosen nodes in pick order.
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// Take the chosen nodes.
    pub fn into_nodes(self) -> Vec<NodeId> {
        self.nodes
    }
}

impl Deref for Selection {
    type Target = [NodeId];

    fn deref(&self) -> &[NodeId] {
        &self.nodes
    }
}

pub(crate) fn budget_field(contagion: Contagion) -> &'static str {
    match contagion {
        Contagion::First => "budget_first",
        Contagion::Second => "budget_second",
    }
}

/// Per-index at-risk and ineligible flags for one contagion.
struct CoverageModel<'a> {
    network: &'a Network,
    at_risk: Vec<bool>,
    ineligible: Vec<bool>,
    covered: Vec<bool>,
}

impl<'a> CoverageModel<'a> {
    fn new(
        network: &'a Network,
        infected: &BTreeSet<NodeId>,
        ineligible: &BTreeSet<NodeId>,
    ) -> Self {
        let n = network.node_count();
        let mut excluded = vec![false; n];
        for &node in ineligible {
            if let Some(idx) = network.index_of(node) {
                excluded[idx] = true;
            }
        }

        // Infected nodes plus all their neighbors is exactly infected ∪ boundary
        let mut at_risk = vec![false; n];
        for &node in infected {
            let Some(idx) = network.index_of(node) else {
                continue;
            };
            at_risk[idx] = !excluded[idx];
            for &neighbor in network.neighbor_indices(idx) {
                if !excluded[neighbor] {
                    at_risk[neighbor] = true;
                }
            }
        }

        Self {
            network,
            at_risk,
            ineligible: excluded,
            covered: vec![false; n],
        }
    }

    fn is_open(&self, idx: usize) -> bool {
        self.at_risk[idx] && !self.covered[idx]
    }

    fn gain(&self, idx: usize) -> usize {
        usize::from(self.is_open(idx))
            + self
                .network
                .neighbor_indices(idx)
                .iter()
                .filter(|&&n| self.is_open(n))
                .count()
    }

    fn cover(&mut self, idx: usize) -> usize {
        let mut newly = 0;
        let neighbors = self.network.neighbor_indices(idx);
        for target in std::iter::once(idx).chain(neighbors.iter().copied()) {
            if self.is_open(target) {
                self.covered[target] = true;
                newly += 1;
            }
        }
        newly
    }
}

/// Greedily choose up to `budget` nodes to block against `contagion`.
///
/// `snapshot` is the outcome of an unblocked run; `ineligible` holds the
/// nodes that may not be chosen (normally every seed, whatever it carries).
/// A short selection is a normal outcome, not an error.
///
/// # Errors
///
/// [`ConfigError::BudgetTooLarge`] if `budget` exceeds the node count.
pub fn select(
    snapshot: &SimulationResult,
    budget: usize,
    network: &Network,
    ineligible: &BTreeSet<NodeId>,
    contagion: Contagion,
) -> Result<Selection> {
    if budget > network.node_count() {
        return Err(ConfigError::BudgetTooLarge {
            field: budget_field(contagion),
            budget,
            nodes: network.node_count(),
        });
    }

    let mut model = CoverageModel::new(network, snapshot.infected(contagion), ineligible);

    let mut heap: BinaryHeap<(usize, Reverse<NodeId>, usize)> = (0..network.node_count())
        .filter(|&idx| !model.ineligible[idx])
        .filter_map(|idx| {
            let gain = model.gain(idx);
            (gain > 0).then(|| (gain, Reverse(network.id_of(idx)), idx))
        })
        .collect();

    let mut nodes = Vec::with_capacity(budget.min(heap.len()));
    let mut covered = 0;

    while nodes.len() < budget {
        let Some((key, Reverse(id), idx)) = heap.pop() else {
            break;
        };
        let fresh = model.gain(idx);
        if fresh == 0 {
            continue;
        }
        if fresh < key {
            heap.push((fresh, Reverse(id), idx));
            continue;
        }
        covered += model.cover(idx);
        nodes.push(id);
    }

    let selection = Selection {
        contagion,
        budget,
        nodes,
        covered,
    };
    if selection.is_short() {
        debug!(
            %contagion,
            budget,
            chosen = selection.len(),
            "coverage candidates exhausted before budget"
        );
    }
    Ok(selection)
}
