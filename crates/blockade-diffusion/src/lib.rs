//! Two-Contagion Threshold Diffusion
//!
//! Two contagions spread over the same network. Each follows the threshold
//! model: a node adopts contagion `c` once at least `threshold` of its
//! neighbors carry `c`. The contagions are tracked independently, so a node
//! can carry one, the other, or both.
//!
//! # States
//!
//! | state | meaning |
//! |-------|---------|
//! | 0 | unaffected |
//! | 1 | first contagion only |
//! | 2 | second contagion only |
//! | 3 | both |
//!
//! # Blocking
//!
//! A node blocked for `c` never adopts `c`, whatever its neighbors do. It is
//! not removed from the network: it still relays the other contagion and
//! still counts toward its neighbors' tallies for it.
//!
//! # Determinism
//!
//! Rounds are synchronous. Flips scheduled in round `r` take effect together
//! at the start of round `r + 1`, so the outcome is a pure function of
//! (network, threshold, seeds, blocks).
//!
//! Every run allocates its own [`StateTable`]; the [`Network`] is only read.
//!
//! [`Network`]: blockade_topology::Network

mod engine;
mod error;
mod seeds;
mod state;
mod threshold;

pub use engine::{simulate, Diffusion, SimulationResult};
pub use error::{ConfigError, Result};
pub use seeds::{BlockSet, SeedPartition, SeedRole};
pub use state::{Contagion, NodeState, StateCounts, StateTable};
pub use threshold::{meets_threshold, Threshold};
