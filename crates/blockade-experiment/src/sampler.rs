//! Random seed sets drawn from a candidate pool.
//!
//! Candidates are kept in ascending id order so a given RNG seed always
//! yields the same draws. Each drawn node gets one of the three roles with
//! equal probability.

use std::collections::BTreeSet;

use blockade_diffusion::{SeedPartition, SeedRole};
use blockade_topology::NodeId;
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::seq::index;
use rand::SeedableRng;

use crate::error::{ExperimentError, Result};

/// Draws seed partitions from a fixed candidate pool.
#[derive(Debug, Clone)]
pub struct SeedSampler {
    candidates: Vec<NodeId>,
    roles: WeightedIndex<u32>,
    rng: StdRng,
}

impl SeedSampler {
    /// Sampler over `candidates`, reproducible from `seed`.
    pub fn new(candidates: &BTreeSet<NodeId>, seed: u64) -> Result<Self> {
        Ok(Self {
            candidates: candidates.iter().copied().collect(),
            roles: WeightedIndex::new([1u32, 1, 1])?,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    /// Size of the candidate pool.
    pub fn pool_size(&self) -> usize {
        self.candidates.len()
    }

    /// Draw `seed_size` distinct candidates and assign each a role.
    pub fn sample(&mut self, seed_size: usize) -> Result<SeedPartition> {
        if seed_size > self.candidates.len() {
            return Err(ExperimentError::invalid(
                "seed_sizes",
                format!(
                    "seed size {seed_size} exceeds the {} candidate nodes",
                    self.candidates.len()
                ),
            ));
        }

        let mut seeds = SeedPartition::default();
        for position in index::sample(&mut self.rng, self.candidates.len(), seed_size) {
            let role = SeedRole::ALL[self.roles.sample(&mut self.rng)];
            seeds.insert(self.candidates[position], role);
        }
        Ok(seeds)
    }
}
