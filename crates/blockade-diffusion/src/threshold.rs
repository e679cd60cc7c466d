//! Activation threshold shared by both contagions.
//!
//! A node flips to contagion `c` once at least `threshold` of its neighbors
//! are infected by `c`. Doubly infected neighbors count for both.

use crate::error::{ConfigError, Result};

/// Minimum number of same-contagion neighbors required to flip a node.
///
/// Always at least 1: a node with no infected neighbors never flips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Threshold(u32);

impl Threshold {
    /// Validate a raw threshold.
    ///
    /// # Examples
    ///
    /// ```
    /// use blockade_diffusion::Threshold;
    ///
    /// assert_eq!(Threshold::new(2).unwrap().value(), 2);
    /// assert!(Threshold::new(0).is_err());
    /// ```
    pub const fn new(value: u32) -> Result<Self> {
        if value == 0 {
            return Err(ConfigError::ThresholdTooLow(value));
        }
        Ok(Self(value))
    }

    /// The raw threshold.
    #[inline]
    pub const fn value(&self) -> u32 {
        self.0
    }
}

impl TryFrom<u32> for Threshold {
    type Error = ConfigError;

    fn try_from(value: u32) -> Result<Self> {
        Self::new(value)
    }
}

/// Check if an active-neighbor count meets the threshold.
#[inline]
pub const fn meets_threshold(active_neighbors: usize, threshold: Threshold) -> bool {
    active_neighbors >= threshold.0 as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(value: u32) -> Threshold {
        Threshold::new(value).unwrap()
    }

    #[test]
    fn zero_threshold_rejected() {
        assert_eq!(Threshold::new(0), Err(ConfigError::ThresholdTooLow(0)));
        assert!(Threshold::try_from(0).is_err());
    }

    #[test]
    fn positive_thresholds_accepted() {
        for value in [1, 2, 3, 4, 100] {
            assert_eq!(t(value).value(), value);
        }
    }

    #[test]
    fn meets_threshold_checks() {
        assert!(meets_threshold(1, t(1)));
        assert!(!meets_threshold(0, t(1)));
        assert!(meets_threshold(3, t(2)));
        assert!(!meets_threshold(1, t(2)));
    }
}
