//! Per-run node state.
//!
//! A node's state is a two-bit set: bit 0 for the first contagion, bit 1
//! for the second. That gives the four externally visible states
//! 0 (unaffected), 1 (first only), 2 (second only) and 3 (both).
//!
//! A [`StateTable`] is allocated fresh for every run and indexed by the
//! network's dense node index. It is never shared or reused, so nothing
//! one trial does can leak into another.

use std::fmt;

/// One of the two independently tracked contagions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Contagion {
    First,
    Second,
}

impl Contagion {
    /// Both contagions, in state-bit order.
    pub const ALL: [Self; 2] = [Self::First, Self::Second];

    /// The state bit this contagion occupies.
    #[inline]
    pub const fn bit(self) -> u8 {
        match self {
            Self::First => 0b01,
            Self::Second => 0b10,
        }
    }

    /// The other contagion.
    pub const fn other(self) -> Self {
        match self {
            Self::First => Self::Second,
            Self::Second => Self::First,
        }
    }
}

impl fmt::Display for Contagion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::First => f.write_str("C1"),
            Self::Second => f.write_str("C2"),
        }
    }
}

/// Infection state of a single node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(u8)]
pub enum NodeState {
    #[default]
    Unaffected = 0,
    First = 1,
    Second = 2,
    Both = 3,
}

impl NodeState {
    /// All states in numeric order.
    pub const ALL: [Self; 4] = [Self::Unaffected, Self::First, Self::Second, Self::Both];

    /// State from its two-bit encoding. Only the low two bits are used.
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0 => Self::Unaffected,
            1 => Self::First,
            2 => Self::Second,
            _ => Self::Both,
        }
    }

    /// Two-bit encoding, equal to the numeric state.
    #[inline]
    pub const fn bits(self) -> u8 {
        self as u8
    }

    /// Numeric state as an index into per-state tables.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Whether the node carries the contagion.
    #[inline]
    pub const fn has(self, contagion: Contagion) -> bool {
        self.bits() & contagion.bit() != 0
    }

    /// This state plus the contagion.
    pub const fn with(self, contagion: Contagion) -> Self {
        Self::from_bits(self.bits() | contagion.bit())
    }
}

/// Node count per state.
///
/// Over a whole run the four buckets partition the node set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StateCounts([usize; 4]);

impl StateCounts {
    /// Build from raw per-state counts, indexed by numeric state.
    pub const fn from_array(counts: [usize; 4]) -> Self {
        Self(counts)
    }

    /// Count for a state.
    #[inline]
    pub const fn get(&self, state: NodeState) -> usize {
        self.0[state.index()]
    }

    /// Raw counts indexed by numeric state.
    pub const fn as_array(&self) -> [usize; 4] {
        self.0
    }

    /// Sum over all four buckets.
    pub fn total(&self) -> usize {
        self.0.iter().sum()
    }

    /// Nodes carrying a contagion, single or double.
    pub const fn infected(&self, contagion: Contagion) -> usize {
        match contagion {
            Contagion::First => self.0[1] + self.0[3],
            Contagion::Second => self.0[2] + self.0[3],
        }
    }

    /// Nodes carrying at least one contagion.
    pub const fn infected_any(&self) -> usize {
        self.0[1] + self.0[2] + self.0[3]
    }
}

/// Mutable state of one run: per-node infection bits and blocked bits.
#[derive(Debug, Clone)]
pub struct StateTable {
    states: Vec<NodeState>,
    blocked: Vec<u8>,
}

impl StateTable {
    /// A table with every node unaffected and unblocked.
    pub fn new(node_count: usize) -> Self {
        Self {
            states: vec![NodeState::Unaffected; node_count],
            blocked: vec![0; node_count],
        }
    }

    /// Number of nodes tracked.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Whether the table tracks no nodes.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// State of the node at `index`.
    #[inline]
    pub fn state(&self, index: usize) -> NodeState {
        self.states[index]
    }

    /// Whether the node at `index` carries the contagion.
    #[inline]
    pub fn has(&self, index: usize, contagion: Contagion) -> bool {
        self.states[index].has(contagion)
    }

    /// Whether the node at `index` is protected against the contagion.
    #[inline]
    pub fn is_blocked(&self, index: usize, contagion: Contagion) -> bool {
        self.blocked[index] & contagion.bit() != 0
    }

    /// Protect the node at `index` against the contagion.
    pub fn block(&mut self, index: usize, contagion: Contagion) {
        self.blocked[index] |= contagion.bit();
    }

    /// Infect the node at `index`.
    ///
    /// Returns true if the state changed. Blocked nodes never change.
    pub fn infect(&mut self, index: usize, contagion: Contagion) -> bool {
        if self.is_blocked(index, contagion) || self.has(index, contagion) {
            return false;
        }
        self.states[index] = self.states[index].with(contagion);
        true
    }

    /// Per-state node counts.
    pub fn counts(&self) -> StateCounts {
        let mut counts = [0usize; 4];
        for state in &self.states {
            counts[state.index()] += 1;
        }
        StateCounts(counts)
    }

    /// Dense indices carrying the contagion.
    pub fn infected_indices(&self, contagion: Contagion) -> impl Iterator<Item = usize> + '_ {
        self.states
            .iter()
            .enumerate()
            .filter(move |(_, state)| state.has(contagion))
            .map(|(idx, _)| idx)
    }
}
