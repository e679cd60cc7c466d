//! Synchronous two-contagion threshold diffusion.
//!
//! # Rounds
//!
//! In round `r`, every node that neither carries nor is blocked for
//! contagion `c` counts its neighbors carrying `c`. Nodes meeting the
//! threshold are scheduled, and all scheduled flips (for both contagions)
//! are applied together at the start of round `r + 1`. Evaluation order
//! within a round therefore has no effect on the outcome.
//!
//! # Frontier
//!
//! A node's `c`-count only changes when one of its neighbors acquires `c`,
//! and the threshold is at least 1, so round `r + 1` only needs to examine
//! neighbors of the nodes that flipped to `c` in round `r`. The first
//! round examines neighbors of the seeds.
//!
//! # Termination
//!
//! Both infected sets only grow and are bounded by the node count, so the
//! run reaches a fixed point after at most `2 * node_count` productive
//! rounds.

use std::collections::BTreeSet;

use blockade_topology::{Network, NodeId};
use tracing::{debug, trace};

use crate::error::Result;
use crate::seeds::{BlockSet, SeedPartition};
use crate::state::{Contagion, NodeState, StateCounts, StateTable};
use crate::threshold::{meets_threshold, Threshold};

/// Outcome of a diffusion run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationResult {
    infected_first: BTreeSet<NodeId>,
    infected_second: BTreeSet<NodeId>,
    counts: StateCounts,
    rounds: usize,
}

impl SimulationResult {
    /// Nodes carrying the contagion at the fixed point (doubly infected included).
    pub fn infected(&self, contagion: Contagion) -> &BTreeSet<NodeId> {
        match contagion {
            Contagion::First => &self.infected_first,
            Contagion::Second => &self.infected_second,
        }
    }

    /// Node count per final state.
    pub fn counts(&self) -> StateCounts {
        self.counts
    }

    /// Number of rounds in which at least one node flipped.
    pub fn rounds(&self) -> usize {
        self.rounds
    }

    /// Final state of a node. Unknown nodes read as unaffected.
    pub fn state_of(&self, node: NodeId) -> NodeState {
        let mut state = NodeState::Unaffected;
        for contagion in Contagion::ALL {
            if self.infected(contagion).contains(&node) {
                state = state.with(contagion);
            }
        }
        state
    }
}

/// A diffusion run that can be advanced one round at a time.
#[derive(Debug)]
pub struct Diffusion<'a> {
    network: &'a Network,
    threshold: Threshold,
    table: StateTable,
    /// Nodes that acquired each contagion in the last applied round
    frontier: [Vec<usize>; 2],
    /// Per-node visit stamp used to deduplicate candidates
    visited: Vec<u64>,
    stamp: u64,
    rounds: usize,
    settled: bool,
}

impl<'a> Diffusion<'a> {
    /// Validate the configuration and seed a fresh state table.
    pub fn new(
        network: &'a Network,
        threshold: Threshold,
        seeds: &SeedPartition,
        blocks: &BlockSet,
    ) -> Result<Self> {
        seeds.validate(network)?;
        blocks.validate(network, seeds)?;

        let mut table = StateTable::new(network.node_count());
        let mut frontier = [Vec::new(), Vec::new()];

        for contagion in Contagion::ALL {
            for &node in blocks.get(contagion) {
                if let Some(idx) = network.index_of(node) {
                    table.block(idx, contagion);
                }
            }
        }

        for (slot, contagion) in Contagion::ALL.into_iter().enumerate() {
            for node in seeds.carrying(contagion) {
                if let Some(idx) = network.index_of(node) {
                    if table.infect(idx, contagion) {
                        frontier[slot].push(idx);
                    }
                }
            }
        }

        Ok(Self {
            network,
            threshold,
            table,
            frontier,
            visited: vec![0; network.node_count()],
            stamp: 0,
            rounds: 0,
            settled: false,
        })
    }

    /// Execute one synchronous round. Returns the number of flips applied.
    ///
    /// A round with no flips marks the run settled; further calls return 0.
    pub fn step(&mut self) -> usize {
        if self.settled {
            return 0;
        }

        let mut scheduled: [Vec<usize>; 2] = [Vec::new(), Vec::new()];

        for (slot, contagion) in Contagion::ALL.into_iter().enumerate() {
            self.stamp += 1;
            for &source in &self.frontier[slot] {
                for &candidate in self.network.neighbor_indices(source) {
                    if self.visited[candidate] == self.stamp {
                        continue;
                    }
                    self.visited[candidate] = self.stamp;

                    if self.table.has(candidate, contagion)
                        || self.table.is_blocked(candidate, contagion)
                    {
                        continue;
                    }

                    let active = self
                        .network
                        .neighbor_indices(candidate)
                        .iter()
                        .filter(|&&n| self.table.has(n, contagion))
                        .count();
                    if meets_threshold(active, self.threshold) {
                        scheduled[slot].push(candidate);
                    }
                }
            }
        }

        let mut flips = 0;
        for (slot, contagion) in Contagion::ALL.into_iter().enumerate() {
            for &idx in &scheduled[slot] {
                if self.table.infect(idx, contagion) {
                    flips += 1;
                }
            }
        }

        if flips == 0 {
            self.settled = true;
        } else {
            self.rounds += 1;
            trace!(
                round = self.rounds,
                first = scheduled[0].len(),
                second = scheduled[1].len(),
                "diffusion round"
            );
        }
        self.frontier = scheduled;
        flips
    }

    /// Whether the last round produced no change.
    pub fn is_settled(&self) -> bool {
        self.settled
    }

    /// Productive rounds executed so far.
    pub fn rounds(&self) -> usize {
        self.rounds
    }

    /// Current per-node state.
    pub fn states(&self) -> &StateTable {
        &self.table
    }

    /// Advance to the fixed point and collect the outcome.
    pub fn run(mut self) -> SimulationResult {
        while !self.settled {
            self.step();
        }

        let collect = |contagion: Contagion| -> BTreeSet<NodeId> {
            self.table
                .infected_indices(contagion)
                .map(|idx| self.network.id_of(idx))
                .collect()
        };
        let infected_first = collect(Contagion::First);
        let infected_second = collect(Contagion::Second);
        let counts = self.table.counts();

        debug!(
            threshold = self.threshold.value(),
            rounds = self.rounds,
            counts = ?counts.as_array(),
            "diffusion settled"
        );

        SimulationResult {
            infected_first,
            infected_second,
            counts,
            rounds: self.rounds,
        }
    }
}

/// Run the diffusion process to its fixed point.
///
/// Pass `&BlockSet::default()` for an unblocked run.
pub fn simulate(
    network: &Network,
    threshold: Threshold,
    seeds: &SeedPartition,
    blocks: &BlockSet,
) -> Result<SimulationResult> {
    Ok(Diffusion::new(network, threshold, seeds, blocks)?.run())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ConfigError, SeedRole};
    use proptest::prelude::*;

    fn ids(raw: &[u64]) -> Vec<NodeId> {
        raw.iter().copied().map(NodeId).collect()
    }

    fn set(raw: &[u64]) -> BTreeSet<NodeId> {
        raw.iter().copied().map(NodeId).collect()
    }

    fn path(n: u64) -> Network {
        Network::from_edges((1..n).map(|i| (NodeId(i), NodeId(i + 1))))
    }

    fn star(leaves: u64) -> Network {
        Network::from_edges((1..=leaves).map(|i| (NodeId(0), NodeId(i))))
    }

    fn t(value: u32) -> Threshold {
        Threshold::new(value).unwrap()
    }

    #[test]
    fn chain_single_contagion_infects_everything() {
        let network = path(5);
        let seeds = SeedPartition::new(ids(&[1]), ids(&[]), ids(&[]));
        let result = simulate(&network, t(1), &seeds, &BlockSet::default()).unwrap();

        assert_eq!(result.counts().as_array(), [0, 5, 0, 0]);
        assert_eq!(result.infected(Contagion::First), &set(&[1, 2, 3, 4, 5]));
        assert!(result.infected(Contagion::Second).is_empty());
        assert_eq!(result.rounds(), 4);
    }

    #[test]
    fn unmet_threshold_leaves_star_leaves_alone() {
        let network = star(4);
        let seeds = SeedPartition::new(ids(&[0]), ids(&[]), ids(&[]));
        let result = simulate(&network, t(2), &seeds, &BlockSet::default()).unwrap();

        assert_eq!(result.counts().as_array(), [4, 1, 0, 0]);
        assert_eq!(result.rounds(), 0);
    }

    #[test]
    fn collision_in_the_middle_is_doubly_infected() {
        let network = path(5);
        let seeds = SeedPartition::new(ids(&[1]), ids(&[5]), ids(&[]));
        let mut diffusion = Diffusion::new(&network, t(1), &seeds, &BlockSet::default()).unwrap();

        // Both fronts reach node 3 in the same round
        diffusion.step();
        diffusion.step();
        let state = |node: u64| {
            diffusion
                .states()
                .state(network.index_of(NodeId(node)).unwrap())
        };
        assert_eq!(state(1), NodeState::First);
        assert_eq!(state(2), NodeState::First);
        assert_eq!(state(3), NodeState::Both);
        assert_eq!(state(4), NodeState::Second);
        assert_eq!(state(5), NodeState::Second);

        // Acquisition is independent per contagion, so each front keeps going
        let result = diffusion.run();
        assert_eq!(result.counts().as_array(), [0, 0, 0, 5]);
        assert_eq!(result.rounds(), 4);
    }

    #[test]
    fn collision_with_mutual_blocking_splits_the_path() {
        // Blocking the far side of each contagion isolates the meeting node
        let network = path(5);
        let seeds = SeedPartition::new(ids(&[1]), ids(&[5]), ids(&[]));
        let blocks = BlockSet::new(ids(&[4]), ids(&[2]));
        let result = simulate(&network, t(1), &seeds, &blocks).unwrap();

        assert_eq!(result.state_of(NodeId(1)), NodeState::First);
        assert_eq!(result.state_of(NodeId(2)), NodeState::First);
        assert_eq!(result.state_of(NodeId(3)), NodeState::Both);
        assert_eq!(result.state_of(NodeId(4)), NodeState::Second);
        assert_eq!(result.state_of(NodeId(5)), NodeState::Second);
        assert_eq!(result.counts().as_array(), [0, 2, 2, 1]);
    }

    #[test]
    fn blocked_node_still_relays_the_other_contagion() {
        // 1 - 2 - 3, node 2 blocked for C1 only
        let network = path(3);
        let seeds = SeedPartition::new(ids(&[]), ids(&[]), ids(&[1]));
        let blocks = BlockSet::new(ids(&[2]), ids(&[]));
        let result = simulate(&network, t(1), &seeds, &blocks).unwrap();

        assert_eq!(result.state_of(NodeId(2)), NodeState::Second);
        assert_eq!(result.state_of(NodeId(3)), NodeState::Second);
        assert_eq!(result.infected(Contagion::First), &set(&[1]));
    }

    #[test]
    fn doubly_infected_neighbors_count_for_both() {
        // Node 0 needs two neighbors per contagion: 1 (both) + 2 (C1) + 3 (C2)
        let network = star(3);
        let seeds = SeedPartition::new(ids(&[2]), ids(&[3]), ids(&[1]));
        let result = simulate(&network, t(2), &seeds, &BlockSet::default()).unwrap();

        assert_eq!(result.state_of(NodeId(0)), NodeState::Both);
    }

    #[test]
    fn updates_are_synchronous() {
        // Square 1-2-3-4 with seeds on 1 and 3, threshold 2: nodes 2 and 4 flip
        // together in round one; nothing is left afterwards.
        let network = Network::from_edges([
            (NodeId(1), NodeId(2)),
            (NodeId(2), NodeId(3)),
            (NodeId(3), NodeId(4)),
            (NodeId(4), NodeId(1)),
        ]);
        let seeds = SeedPartition::new(ids(&[1, 3]), ids(&[]), ids(&[]));
        let mut diffusion = Diffusion::new(&network, t(2), &seeds, &BlockSet::default()).unwrap();

        assert_eq!(diffusion.step(), 2);
        assert!(!diffusion.is_settled());
        assert_eq!(diffusion.step(), 0);
        assert!(diffusion.is_settled());
        assert_eq!(diffusion.step(), 0);
        assert_eq!(diffusion.rounds(), 1);
        assert_eq!(diffusion.states().counts().as_array(), [0, 4, 0, 0]);
    }

    #[test]
    fn threshold_counts_only_previous_round() {
        // Path 1-2-3 plus 3-4, 2-4; threshold 2 from seed {1, 3}:
        // 2 flips in round one (neighbors 1, 3), 4 needs 2 and 3 -> round two.
        let network = Network::from_edges([
            (NodeId(1), NodeId(2)),
            (NodeId(2), NodeId(3)),
            (NodeId(3), NodeId(4)),
            (NodeId(2), NodeId(4)),
            (NodeId(4), NodeId(5)),
        ]);
        let seeds = SeedPartition::new(ids(&[1, 3]), ids(&[]), ids(&[]));
        let mut diffusion = Diffusion::new(&network, t(2), &seeds, &BlockSet::default()).unwrap();

        assert_eq!(diffusion.step(), 1);
        assert!(diffusion.states().has(network.index_of(NodeId(2)).unwrap(), Contagion::First));
        assert!(!diffusion.states().has(network.index_of(NodeId(4)).unwrap(), Contagion::First));
        assert_eq!(diffusion.step(), 1);

        let result = diffusion.run();
        assert_eq!(result.infected(Contagion::First), &set(&[1, 2, 3, 4]));
        assert_eq!(result.rounds(), 2);
    }

    #[test]
    fn empty_seeds_change_nothing() {
        let network = path(4);
        let result =
            simulate(&network, t(1), &SeedPartition::default(), &BlockSet::default()).unwrap();
        assert_eq!(result.counts().as_array(), [4, 0, 0, 0]);
    }

    #[test]
    fn malformed_inputs_fail_fast() {
        let network = path(3);
        let overlapping = SeedPartition::new(ids(&[1]), ids(&[1]), ids(&[]));
        assert!(matches!(
            simulate(&network, t(1), &overlapping, &BlockSet::default()),
            Err(ConfigError::SeedOverlap { .. })
        ));

        let seeds = SeedPartition::new(ids(&[1]), ids(&[]), ids(&[]));
        let blocks = BlockSet::new(ids(&[1]), ids(&[]));
        assert!(matches!(
            simulate(&network, t(1), &seeds, &blocks),
            Err(ConfigError::BlockedSeed { .. })
        ));
    }

    #[test]
    fn seed_of_the_other_contagion_cannot_be_blocked() {
        let network = path(5);
        let seeds = SeedPartition::new(ids(&[1]), ids(&[5]), ids(&[]));
        let blocks = BlockSet::new(ids(&[5]), ids(&[]));
        assert_eq!(
            simulate(&network, t(1), &seeds, &blocks),
            Err(ConfigError::BlockedSeed {
                field: "blocked_first",
                node: NodeId(5),
            })
        );
    }

    /// Random graph with random disjoint seeds and blocks on non-seeds.
    fn scenario() -> impl Strategy<Value = (Network, SeedPartition, BlockSet, u32)> {
        (2u64..30)
            .prop_flat_map(|n| {
                (
                    Just(n),
                    proptest::collection::vec((0..n, 0..n), 0..80),
                    proptest::collection::vec(0u8..8, n as usize),
                    proptest::collection::vec(0u8..6, n as usize),
                    1u32..4,
                )
            })
            .prop_map(|(n, edges, roles, block_bits, threshold)| {
                let mut network = Network::with_nodes((0..n).map(NodeId));
                for (a, b) in edges {
                    network.add_edge(NodeId(a), NodeId(b));
                }

                let mut seeds = SeedPartition::default();
                let mut blocks = BlockSet::default();
                for node in 0..n {
                    let id = NodeId(node);
                    match roles[node as usize] {
                        1 => seeds.insert(id, SeedRole::First),
                        2 => seeds.insert(id, SeedRole::Second),
                        3 => seeds.insert(id, SeedRole::Both),
                        _ => {}
                    }
                    if seeds.role_of(id).is_some() {
                        continue;
                    }
                    let bits = block_bits[node as usize];
                    if bits & 1 != 0 {
                        blocks.first.insert(id);
                    }
                    if bits & 2 != 0 {
                        blocks.second.insert(id);
                    }
                }
                (network, seeds, blocks, threshold)
            })
    }

    proptest! {
        #[test]
        fn counts_partition_the_node_set((network, seeds, blocks, threshold) in scenario()) {
            let result = simulate(&network, t(threshold), &seeds, &blocks).unwrap();
            prop_assert_eq!(result.counts().total(), network.node_count());
        }

        #[test]
        fn blocking_never_grows_infection((network, seeds, blocks, threshold) in scenario()) {
            let open = simulate(&network, t(threshold), &seeds, &BlockSet::default()).unwrap();
            let blocked = simulate(&network, t(threshold), &seeds, &blocks).unwrap();
            for contagion in Contagion::ALL {
                prop_assert!(blocked.infected(contagion).is_subset(open.infected(contagion)));
            }
        }

        #[test]
        fn fixed_point_is_idempotent((network, seeds, _blocks, threshold) in scenario()) {
            let open = BlockSet::default();
            let result = simulate(&network, t(threshold), &seeds, &open).unwrap();
            let reseeded = SeedPartition::from_infected(
                result.infected(Contagion::First),
                result.infected(Contagion::Second),
            );
            let again = simulate(&network, t(threshold), &reseeded, &open).unwrap();

            prop_assert_eq!(again.infected(Contagion::First), result.infected(Contagion::First));
            prop_assert_eq!(again.infected(Contagion::Second), result.infected(Contagion::Second));
            prop_assert_eq!(again.rounds(), 0);
        }

        #[test]
        fn runs_are_deterministic((network, seeds, blocks, threshold) in scenario()) {
            let a = simulate(&network, t(threshold), &seeds, &blocks).unwrap();
            let b = simulate(&network, t(threshold), &seeds, &blocks).unwrap();
            prop_assert_eq!(a, b);
        }

        #[test]
        fn blocked_nodes_never_acquire_their_contagion(
            (network, seeds, blocks, threshold) in scenario(),
        ) {
            let result = simulate(&network, t(threshold), &seeds, &blocks).unwrap();
            for contagion in Contagion::ALL {
                prop_assert!(result.infected(contagion).is_disjoint(blocks.get(contagion)));
            }
        }

        #[test]
        fn frontier_matches_full_rescan((network, seeds, blocks, threshold) in scenario()) {
            let result = simulate(&network, t(threshold), &seeds, &blocks).unwrap();

            // No uninfected, unblocked node may still meet the threshold
            for contagion in Contagion::ALL {
                let infected = result.infected(contagion);
                for &node in network.nodes() {
                    if infected.contains(&node) || blocks.get(contagion).contains(&node) {
                        continue;
                    }
                    let active = network.neighbors(node).filter(|n| infected.contains(n)).count();
                    prop_assert!(!meets_threshold(active, t(threshold)));
                }
            }
        }
    }
}
