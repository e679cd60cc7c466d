//! Choosing Nodes to Immunize
//!
//! Given a snapshot of how far two contagions spread without intervention,
//! pick per-contagion block sets under a node budget.
//!
//! - [`select`]: the coverage heuristic (CBH). Greedy maximum coverage over
//!   the at-risk nodes of one contagion.
//! - [`degree_block_set`]: the degree baseline. Highest-degree eligible nodes.
//! - [`split_budget`]: divide a total budget between the contagions in
//!   proportion to their spread.
//!
//! Selections are deterministic: ties always go to the lowest node id.

mod baseline;
mod budget;
mod selector;

pub use baseline::degree_block_set;
pub use budget::{split_budget, BudgetSplit};
pub use selector::{select, Selection};
