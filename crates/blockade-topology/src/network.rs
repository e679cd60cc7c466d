//! Undirected adjacency arena.
//!
//! Every node gets a dense index on first sight. Adjacency lists hold
//! indices, not ids, so state tables built on top of a `Network` are plain
//! vectors of the same length as [`Network::node_count`].

use std::cmp::Reverse;
use std::collections::HashMap;

use crate::NodeId;

/// An immutable-once-loaded undirected, unweighted graph.
#[derive(Debug, Clone, Default)]
pub struct Network {
    /// Index -> external id, in insertion order
    ids: Vec<NodeId>,
    /// External id -> index
    index: HashMap<NodeId, usize>,
    /// Neighbor indices per node index
    adjacency: Vec<Vec<usize>>,
    /// Number of distinct undirected edges
    edges: usize,
}

impl Network {
    /// Create an empty network.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a network holding the given isolated nodes.
    pub fn with_nodes<I>(nodes: I) -> Self
    where
        I: IntoIterator<Item = NodeId>,
    {
        let mut network = Self::new();
        for node in nodes {
            network.add_node(node);
        }
        network
    }

    /// Build a network from an edge iterator.
    pub fn from_edges<I>(edges: I) -> Self
    where
        I: IntoIterator<Item = (NodeId, NodeId)>,
    {
        let mut network = Self::new();
        for (u, v) in edges {
            network.add_edge(u, v);
        }
        network
    }

    /// Add a node if it is not present yet. Returns its dense index.
    pub fn add_node(&mut self, id: NodeId) -> usize {
        if let Some(&existing) = self.index.get(&id) {
            return existing;
        }
        let idx = self.ids.len();
        self.ids.push(id);
        self.index.insert(id, idx);
        self.adjacency.push(Vec::new());
        idx
    }

    /// Add an undirected edge, registering both endpoints.
    ///
    /// Self-loops register the node but add no edge; a repeated edge is
    /// stored once. Returns true if a new edge was added.
    pub fn add_edge(&mut self, u: NodeId, v: NodeId) -> bool {
        let a = self.add_node(u);
        let b = self.add_node(v);
        if a == b {
            return false;
        }

        // Scan the shorter list for the duplicate check
        let (short, other) = if self.adjacency[a].len() <= self.adjacency[b].len() {
            (a, b)
        } else {
            (b, a)
        };
        if self.adjacency[short].contains(&other) {
            return false;
        }

        self.adjacency[a].push(b);
        self.adjacency[b].push(a);
        self.edges += 1;
        true
    }

    /// Whether the node is part of the network.
    pub fn contains(&self, id: NodeId) -> bool {
        self.index.contains_key(&id)
    }

    /// Dense index of a node.
    pub fn index_of(&self, id: NodeId) -> Option<usize> {
        self.index.get(&id).copied()
    }

    /// External id at a dense index.
    ///
    /// # Panics
    ///
    /// Panics if `index >= node_count()`.
    pub fn id_of(&self, index: usize) -> NodeId {
        self.ids[index]
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.ids.len()
    }

    /// Number of distinct undirected edges.
    pub fn edge_count(&self) -> usize {
        self.edges
    }

    /// Degree of a node, or `None` if it is unknown.
    pub fn degree(&self, id: NodeId) -> Option<usize> {
        self.index_of(id).map(|idx| self.adjacency[idx].len())
    }

    /// Degree at a dense index.
    #[inline]
    pub fn degree_at(&self, index: usize) -> usize {
        self.adjacency[index].len()
    }

    /// Neighbors of a node. Unknown nodes have none.
    pub fn neighbors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let slice: &[usize] = match self.index_of(id) {
            Some(idx) => &self.adjacency[idx],
            None => &[],
        };
        slice.iter().map(move |&n| self.ids[n])
    }

    /// Neighbor indices at a dense index.
    #[inline]
    pub fn neighbor_indices(&self, index: usize) -> &[usize] {
        &self.adjacency[index]
    }

    /// All node ids in insertion (dense index) order.
    pub fn nodes(&self) -> &[NodeId] {
        &self.ids
    }
}

/// All nodes sorted by descending degree, ties broken by lowest id.
pub fn nodes_by_degree(network: &Network) -> Vec<NodeId> {
    let mut ranked: Vec<(usize, NodeId)> = (0..network.node_count())
        .map(|idx| (network.degree_at(idx), network.id_of(idx)))
        .collect();
    ranked.sort_unstable_by_key(|&(degree, id)| (Reverse(degree), id));
    ranked.into_iter().map(|(_, id)| id).collect()
}
