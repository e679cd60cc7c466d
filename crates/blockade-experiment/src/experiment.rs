//! The experiment sweep.
//!
//! For every network the harness draws `samples` seed sets per seed size
//! from the network's k-core. Each seed set is evaluated at every
//! (threshold, budget) pair by three strategies:
//!
//! 1. no blocking
//! 2. CBH blocking, budget split by each contagion's unblocked spread
//! 3. degree blocking, same split
//!
//! Neither strategy may block a seed of either contagion.
//!
//! Trials are independent and run on the blocking pool. Per-state counts
//! are summed per (threshold, budget) and divided by the sample count, so
//! the output does not depend on the order trials finish in.

use std::collections::BTreeSet;
use std::io::Write;
use std::sync::Arc;

use blockade_coverage::{degree_block_set, select, split_budget, BudgetSplit, Selection};
use blockade_diffusion::{
    simulate, BlockSet, Contagion, SeedPartition, SimulationResult, StateCounts, Threshold,
};
use blockade_topology::{k_core, load_network, Network, NodeId};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::config::{budget_for, ExperimentConfig};
use crate::error::{ExperimentError, Result};
use crate::output::{ExperimentRow, RowWriter};
use crate::sampler::SeedSampler;

/// One seed set evaluated at one threshold and total budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trial {
    pub threshold: Threshold,
    pub budget: usize,
}

/// Final per-state counts of the three strategies for one trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrialOutcome {
    pub split: BudgetSplit,
    pub no_block: StateCounts,
    pub cbh: StateCounts,
    pub degree: StateCounts,
}

impl TrialOutcome {
    fn strategies(&self) -> [StateCounts; 3] {
        [self.no_block, self.cbh, self.degree]
    }
}

impl Trial {
    /// Run all three strategies against `seeds`.
    pub fn run(&self, network: &Network, seeds: &SeedPartition) -> Result<TrialOutcome> {
        let baseline = simulate(network, self.threshold, seeds, &BlockSet::default())?;
        let split = split_budget(self.budget, &baseline.counts());
        let all_seeds = seeds.all();

        let cbh_blocks = BlockSet::new(
            self.cbh_pick(&baseline, split, network, &all_seeds, Contagion::First)?
                .into_nodes(),
            self.cbh_pick(&baseline, split, network, &all_seeds, Contagion::Second)?
                .into_nodes(),
        );
        let cbh = simulate(network, self.threshold, seeds, &cbh_blocks)?;

        let degree_blocks = BlockSet::new(
            self.degree_pick(network, split.first, &all_seeds)?,
            self.degree_pick(network, split.second, &all_seeds)?,
        );
        let degree = simulate(network, self.threshold, seeds, &degree_blocks)?;

        debug!(
            threshold = self.threshold.value(),
            budget = self.budget,
            budget_first = split.first,
            budget_second = split.second,
            unblocked = baseline.counts().infected_any(),
            cbh = cbh.counts().infected_any(),
            degree = degree.counts().infected_any(),
            "trial finished"
        );

        Ok(TrialOutcome {
            split,
            no_block: baseline.counts(),
            cbh: cbh.counts(),
            degree: degree.counts(),
        })
    }

    fn cbh_pick(
        &self,
        baseline: &SimulationResult,
        split: BudgetSplit,
        network: &Network,
        ineligible: &BTreeSet<NodeId>,
        contagion: Contagion,
    ) -> Result<Selection> {
        let selection = select(baseline, split.get(contagion), network, ineligible, contagion)?;
        if selection.is_short() {
            warn!(
                %contagion,
                budget = selection.budget(),
                chosen = selection.len(),
                "CBH selection under-filled"
            );
        }
        Ok(selection)
    }

    fn degree_pick(
        &self,
        network: &Network,
        budget: usize,
        excluded: &BTreeSet<NodeId>,
    ) -> Result<Vec<NodeId>> {
        let chosen = degree_block_set(network, budget, excluded)?;
        if chosen.len() < budget {
            warn!(budget, chosen = chosen.len(), "degree selection under-filled");
        }
        Ok(chosen)
    }
}

/// Per-state sums of one strategy across samples.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Totals([[usize; 4]; 3]);

impl Totals {
    fn add(&mut self, outcome: &TrialOutcome) {
        for (sums, counts) in self.0.iter_mut().zip(outcome.strategies()) {
            for (sum, count) in sums.iter_mut().zip(counts.as_array()) {
                *sum += count;
            }
        }
    }

    fn averages(&self, samples: usize) -> [[f64; 4]; 3] {
        self.0
            .map(|sums| sums.map(|sum| sum as f64 / samples as f64))
    }
}

/// A configured sweep.
#[derive(Debug, Clone)]
pub struct Experiment {
    config: ExperimentConfig,
    thresholds: Vec<Threshold>,
}

impl Experiment {
    /// Validate the configuration and prepare the sweep.
    pub fn new(config: ExperimentConfig) -> Result<Self> {
        config.validate()?;
        let thresholds = config.thresholds()?;
        Ok(Self { config, thresholds })
    }

    pub fn config(&self) -> &ExperimentConfig {
        &self.config
    }

    /// Run every configured network, writing each network's rows as soon
    /// as they are complete. Returns the number of rows written.
    pub async fn run<W: Write>(&self, writer: &mut RowWriter<W>) -> Result<usize> {
        let mut written = 0;
        for (position, name) in self.config.networks.iter().enumerate() {
            let network = self.load(name).await?;
            let rows = self
                .run_network(name, network, self.config.rng_seed(position))
                .await?;
            for row in &rows {
                writer.write_row(row)?;
            }
            written += rows.len();
        }
        Ok(written)
    }

    async fn load(&self, name: &str) -> Result<Arc<Network>> {
        let dir = self.config.network_dir.clone();
        let owned = name.to_string();
        let network = tokio::task::spawn_blocking(move || load_network(&dir, &owned)).await??;
        info!(
            network = name,
            nodes = network.node_count(),
            edges = network.edge_count(),
            "network loaded"
        );
        Ok(Arc::new(network))
    }

    /// Full sweep over one already loaded network.
    ///
    /// Rows come back ordered by seed size, then threshold, then budget, in
    /// configured order.
    pub async fn run_network(
        &self,
        name: &str,
        network: Arc<Network>,
        rng_seed: u64,
    ) -> Result<Vec<ExperimentRow>> {
        // One RNG per network, consumed across seed sizes and samples
        let core = k_core(&network, self.config.core);
        let mut sampler = SeedSampler::new(&core, rng_seed)?;
        let available = sampler.pool_size();
        for &seed_size in &self.config.seed_sizes {
            if seed_size > available {
                return Err(ExperimentError::CoreTooSmall {
                    network: name.to_string(),
                    k: self.config.core,
                    available,
                    seed_size,
                });
            }
        }
        debug!(network = name, k = self.config.core, candidates = available, "seed pool ready");

        let budgets: Vec<usize> = self
            .config
            .budgets
            .iter()
            .map(|&fraction| budget_for(fraction, network.node_count()))
            .collect();

        let mut rows = Vec::new();

        for &seed_size in &self.config.seed_sizes {
            let mut totals = vec![Totals::default(); self.thresholds.len() * budgets.len()];

            for sample in 0..self.config.samples {
                let seeds = Arc::new(sampler.sample(seed_size)?);
                debug!(network = name, seed_size, sample, "seed set drawn");
                self.run_sample(&network, &seeds, &budgets, &mut totals)
                    .await?;
            }

            for (t, threshold) in self.thresholds.iter().enumerate() {
                for (b, &budget) in budgets.iter().enumerate() {
                    let row = ExperimentRow {
                        network_name: name.to_string(),
                        threshold: threshold.value(),
                        seed_size,
                        budget_total: budget,
                        averages: totals[t * budgets.len() + b].averages(self.config.samples),
                    };
                    info!(
                        network = name,
                        threshold = row.threshold,
                        seed_size,
                        budget,
                        no_block = row.averages[0][1] + row.averages[0][2] + row.averages[0][3],
                        cbh = row.averages[1][1] + row.averages[1][2] + row.averages[1][3],
                        degree = row.averages[2][1] + row.averages[2][2] + row.averages[2][3],
                        "row complete"
                    );
                    rows.push(row);
                }
            }
        }

        Ok(rows)
    }

    /// Evaluate one seed set at every (threshold, budget) pair, at most
    /// `jobs` trials at a time, adding outcomes into `totals`.
    async fn run_sample(
        &self,
        network: &Arc<Network>,
        seeds: &Arc<SeedPartition>,
        budgets: &[usize],
        totals: &mut [Totals],
    ) -> Result<()> {
        let jobs = self.config.jobs();
        let mut tasks = JoinSet::new();

        for (t, &threshold) in self.thresholds.iter().enumerate() {
            for (b, &budget) in budgets.iter().enumerate() {
                if tasks.len() >= jobs {
                    if let Some(joined) = tasks.join_next().await {
                        let (slot, outcome): (usize, Result<TrialOutcome>) = joined?;
                        totals[slot].add(&outcome?);
                    }
                }

                let trial = Trial { threshold, budget };
                let slot = t * budgets.len() + b;
                let network = Arc::clone(network);
                let seeds = Arc::clone(seeds);
                tasks.spawn_blocking(move || (slot, trial.run(&network, &seeds)));
            }
        }

        while let Some(joined) = tasks.join_next().await {
            let (slot, outcome) = joined?;
            totals[slot].add(&outcome?);
        }
        Ok(())
    }
}
