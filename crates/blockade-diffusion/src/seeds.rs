//! Seed partitions and block sets.
//!
//! Seeds are split three ways: nodes that start with only the first
//! contagion, only the second, or both. Block sets protect nodes against one
//! contagion each.
//!
//! # Validity
//!
//! - the three seed sets are pairwise disjoint
//! - block sets never intersect the seeds, whichever contagion a seed carries
//! - every referenced node exists in the network
//!
//! Violations are reported before a run starts, naming the offending field.

use std::collections::BTreeSet;

use blockade_topology::{Network, NodeId};

use crate::error::{ConfigError, Result};
use crate::state::Contagion;

/// Which contagion(s) a seed starts with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeedRole {
    /// Starts with the first contagion only
    First,
    /// Starts with the second contagion only
    Second,
    /// Starts with both contagions
    Both,
}

impl SeedRole {
    /// Roles in categorical-sampling order.
    pub const ALL: [Self; 3] = [Self::First, Self::Second, Self::Both];
}

/// Three pairwise-disjoint seed sets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedPartition {
    pub only_first: BTreeSet<NodeId>,
    pub only_second: BTreeSet<NodeId>,
    pub both: BTreeSet<NodeId>,
}

impl SeedPartition {
    /// Create from the three sets. Disjointness is checked by [`validate`](Self::validate).
    pub fn new<A, B, C>(only_first: A, only_second: B, both: C) -> Self
    where
        A: IntoIterator<Item = NodeId>,
        B: IntoIterator<Item = NodeId>,
        C: IntoIterator<Item = NodeId>,
    {
        Self {
            only_first: only_first.into_iter().collect(),
            only_second: only_second.into_iter().collect(),
            both: both.into_iter().collect(),
        }
    }

    /// Rebuild a partition from per-contagion infected sets.
    ///
    /// Feeding a finished run's infected sets back in this way reproduces
    /// the same fixed point.
    pub fn from_infected(first: &BTreeSet<NodeId>, second: &BTreeSet<NodeId>) -> Self {
        Self {
            only_first: first.difference(second).copied().collect(),
            only_second: second.difference(first).copied().collect(),
            both: first.intersection(second).copied().collect(),
        }
    }

    /// Place a node into the set for its role.
    pub fn insert(&mut self, node: NodeId, role: SeedRole) {
        match role {
            SeedRole::First => self.only_first.insert(node),
            SeedRole::Second => self.only_second.insert(node),
            SeedRole::Both => self.both.insert(node),
        };
    }

    /// Role of a seeded node.
    ///
    /// On an invalid partition the first matching set wins.
    pub fn role_of(&self, node: NodeId) -> Option<SeedRole> {
        if self.only_first.contains(&node) {
            Some(SeedRole::First)
        } else if self.only_second.contains(&node) {
            Some(SeedRole::Second)
        } else if self.both.contains(&node) {
            Some(SeedRole::Both)
        } else {
            None
        }
    }

    /// Seeds that start with the contagion (its own set plus `both`).
    pub fn carrying(&self, contagion: Contagion) -> impl Iterator<Item = NodeId> + '_ {
        let own = match contagion {
            Contagion::First => &self.only_first,
            Contagion::Second => &self.only_second,
        };
        own.iter().chain(self.both.iter()).copied()
    }

    /// Every seeded node.
    pub fn all(&self) -> BTreeSet<NodeId> {
        self.only_first
            .iter()
            .chain(&self.only_second)
            .chain(&self.both)
            .copied()
            .collect()
    }

    /// Total number of seeds.
    pub fn len(&self) -> usize {
        self.only_first.len() + self.only_second.len() + self.both.len()
    }

    /// Whether there are no seeds at all.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check disjointness and membership.
    pub fn validate(&self, network: &Network) -> Result<()> {
        let named = [
            ("seeds_first", &self.only_first),
            ("seeds_second", &self.only_second),
            ("seeds_both", &self.both),
        ];

        for (field, set) in named {
            if let Some(&node) = set.iter().find(|n| !network.contains(**n)) {
                return Err(ConfigError::UnknownNode { field, node });
            }
        }

        for (i, (first, a)) in named.iter().enumerate() {
            for (second, b) in &named[i + 1..] {
                if let Some(&node) = a.intersection(b).next() {
                    return Err(ConfigError::SeedOverlap {
                        first: *first,
                        second: *second,
                        node,
                    });
                }
            }
        }

        Ok(())
    }
}

/// Nodes protected against each contagion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockSet {
    pub first: BTreeSet<NodeId>,
    pub second: BTreeSet<NodeId>,
}

impl BlockSet {
    /// Create from per-contagion node lists.
    pub fn new<A, B>(first: A, second: B) -> Self
    where
        A: IntoIterator<Item = NodeId>,
        B: IntoIterator<Item = NodeId>,
    {
        Self {
            first: first.into_iter().collect(),
            second: second.into_iter().collect(),
        }
    }

    /// Nodes blocked for the contagion.
    pub fn get(&self, contagion: Contagion) -> &BTreeSet<NodeId> {
        match contagion {
            Contagion::First => &self.first,
            Contagion::Second => &self.second,
        }
    }

    /// Whether nothing is blocked.
    pub fn is_empty(&self) -> bool {
        self.first.is_empty() && self.second.is_empty()
    }

    /// Check membership and that no seed is blocked.
    pub fn validate(&self, network: &Network, seeds: &SeedPartition) -> Result<()> {
        for contagion in Contagion::ALL {
            let field = match contagion {
                Contagion::First => "blocked_first",
                Contagion::Second => "blocked_second",
            };
            for &node in self.get(contagion) {
                if !network.contains(node) {
                    return Err(ConfigError::UnknownNode { field, node });
                }
                if seeds.role_of(node).is_some() {
                    return Err(ConfigError::BlockedSeed { field, node });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn network(n: u64) -> Network {
        Network::with_nodes((0..n).map(NodeId))
    }

    fn ids(raw: &[u64]) -> Vec<NodeId> {
        raw.iter().copied().map(NodeId).collect()
    }

    #[test]
    fn disjoint_partition_validates() {
        let seeds = SeedPartition::new(ids(&[0]), ids(&[1]), ids(&[2]));
        assert!(seeds.validate(&network(3)).is_ok());
        assert_eq!(seeds.len(), 3);
        assert_eq!(seeds.carrying(Contagion::First).collect::<Vec<_>>(), ids(&[0, 2]));
        assert_eq!(seeds.carrying(Contagion::Second).collect::<Vec<_>>(), ids(&[1, 2]));
    }

    #[test]
    fn overlap_names_both_fields() {
        let seeds = SeedPartition::new(ids(&[0, 1]), ids(&[2]), ids(&[1]));
        assert_eq!(
            seeds.validate(&network(3)),
            Err(ConfigError::SeedOverlap {
                first: "seeds_first",
                second: "seeds_both",
                node: NodeId(1),
            })
        );
    }

    #[test]
    fn unknown_seed_rejected() {
        let seeds = SeedPartition::new(ids(&[]), ids(&[9]), ids(&[]));
        assert_eq!(
            seeds.validate(&network(3)),
            Err(ConfigError::UnknownNode {
                field: "seeds_second",
                node: NodeId(9),
            })
        );
    }

    #[test]
    fn blocking_a_seed_of_the_same_contagion_fails() {
        let seeds = SeedPartition::new(ids(&[0]), ids(&[1]), ids(&[2]));
        let blocks = BlockSet::new(ids(&[2]), ids(&[]));
        assert_eq!(
            blocks.validate(&network(4), &seeds),
            Err(ConfigError::BlockedSeed {
                field: "blocked_first",
                node: NodeId(2),
            })
        );
    }

    #[test]
    fn blocking_a_seed_of_the_other_contagion_fails() {
        let seeds = SeedPartition::new(ids(&[0]), ids(&[1]), ids(&[]));
        assert_eq!(
            BlockSet::new(ids(&[1]), ids(&[])).validate(&network(2), &seeds),
            Err(ConfigError::BlockedSeed {
                field: "blocked_first",
                node: NodeId(1),
            })
        );
        assert_eq!(
            BlockSet::new(ids(&[]), ids(&[0])).validate(&network(2), &seeds),
            Err(ConfigError::BlockedSeed {
                field: "blocked_second",
                node: NodeId(0),
            })
        );
    }

    #[test]
    fn blocking_non_seeds_validates() {
        let seeds = SeedPartition::new(ids(&[0]), ids(&[1]), ids(&[2]));
        let blocks = BlockSet::new(ids(&[3]), ids(&[3, 4]));
        assert!(blocks.validate(&network(5), &seeds).is_ok());
    }

    #[test]
    fn unknown_block_rejected() {
        let blocks = BlockSet::new(ids(&[]), ids(&[7]));
        assert_eq!(
            blocks.validate(&network(2), &SeedPartition::default()),
            Err(ConfigError::UnknownNode {
                field: "blocked_second",
                node: NodeId(7),
            })
        );
    }

    #[test]
    fn from_infected_splits_by_overlap() {
        let first: BTreeSet<_> = ids(&[1, 2, 3]).into_iter().collect();
        let second: BTreeSet<_> = ids(&[3, 4]).into_iter().collect();
        let seeds = SeedPartition::from_infected(&first, &second);

        assert_eq!(seeds, SeedPartition::new(ids(&[1, 2]), ids(&[4]), ids(&[3])));
        assert_eq!(seeds.role_of(NodeId(3)), Some(SeedRole::Both));
        assert_eq!(seeds.role_of(NodeId(9)), None);
    }

    #[test]
    fn insert_by_role() {
        let mut seeds = SeedPartition::default();
        seeds.insert(NodeId(5), SeedRole::Second);
        seeds.insert(NodeId(6), SeedRole::Both);
        assert_eq!(seeds.all().into_iter().collect::<Vec<_>>(), ids(&[5, 6]));
        assert!(!seeds.is_empty());
    }
}
