//! Splitting a total blocking budget between the two contagions.

use blockade_diffusion::{Contagion, StateCounts};

/// Per-contagion share of a blocking budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BudgetSplit {
    pub first: usize,
    pub second: usize,
}

impl BudgetSplit {
    /// Share assigned to the contagion.
    pub fn get(&self, contagion: Contagion) -> usize {
        match contagion {
            Contagion::First => self.first,
            Contagion::Second => self.second,
        }
    }

    /// Sum of both shares.
    pub fn total(&self) -> usize {
        self.first + self.second
    }
}

/// Split `total` in proportion to how far each contagion spread.
///
/// Each contagion's share is its infected count over the number of nodes
/// carrying any contagion. The larger share is rounded up and the other gets
/// the remainder. Equal shares split evenly, the second contagion taking any
/// odd unit. With nothing infected the split is even as well.
///
/// ```
/// use blockade_coverage::split_budget;
/// use blockade_diffusion::StateCounts;
///
/// // 6 nodes with C1 only, 2 with C2 only, 2 with both
/// let split = split_budget(5, &StateCounts::from_array([0, 6, 2, 2]));
/// assert_eq!((split.first, split.second), (4, 1));
/// ```
pub fn split_budget(total: usize, counts: &StateCounts) -> BudgetSplit {
    let infected = counts.infected_any();
    let first = counts.infected(Contagion::First);
    let second = counts.infected(Contagion::Second);

    if infected == 0 || first == second {
        let first = total / 2;
        return BudgetSplit {
            first,
            second: total - first,
        };
    }

    // ceil(count / infected * total) in exact integer arithmetic
    let larger = first.max(second);
    let larger_share = (larger * total).div_ceil(infected).min(total);
    let rest = total - larger_share;

    if first > second {
        BudgetSplit {
            first: larger_share,
            second: rest,
        }
    } else {
        BudgetSplit {
            first: rest,
            second: larger_share,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn counts(raw: [usize; 4]) -> StateCounts {
        StateCounts::from_array(raw)
    }

    #[test]
    fn larger_share_rounds_up() {
        // C1 carries 7 of 10, C2 carries 3: 0.7 * 5 = 3.5 -> 4
        let split = split_budget(5, &counts([4, 7, 3, 0]));
        assert_eq!(split, BudgetSplit { first: 4, second: 1 });
    }

    #[test]
    fn second_can_take_the_larger_share() {
        let split = split_budget(10, &counts([0, 1, 3, 0]));
        assert_eq!(split, BudgetSplit { first: 2, second: 8 });
        assert_eq!(split.get(Contagion::Second), 8);
    }

    #[test]
    fn equal_shares_split_evenly() {
        assert_eq!(split_budget(4, &counts([0, 3, 3, 0])), BudgetSplit { first: 2, second: 2 });
        assert_eq!(split_budget(5, &counts([0, 3, 3, 0])), BudgetSplit { first: 2, second: 3 });
    }

    #[test]
    fn nothing_infected_splits_evenly() {
        assert_eq!(split_budget(7, &counts([10, 0, 0, 0])), BudgetSplit { first: 3, second: 4 });
    }

    #[test]
    fn double_infections_count_for_both() {
        // Every infected node carries both: equal shares
        assert_eq!(split_budget(6, &counts([2, 0, 0, 5])), BudgetSplit { first: 3, second: 3 });
        // C1 share 1.0 takes everything
        assert_eq!(split_budget(6, &counts([0, 1, 0, 5])), BudgetSplit { first: 6, second: 0 });
    }

    #[test]
    fn zero_budget() {
        assert_eq!(split_budget(0, &counts([0, 9, 1, 0])).total(), 0);
    }

    proptest! {
        #[test]
        fn split_always_sums_to_total(
            total in 0usize..500,
            raw in proptest::array::uniform4(0usize..200),
        ) {
            let counts = counts(raw);
            let split = split_budget(total, &counts);
            prop_assert_eq!(split.total(), total);

            let first = counts.infected(Contagion::First);
            let second = counts.infected(Contagion::Second);
            if first > second {
                prop_assert!(split.first >= split.second);
            } else if second > first {
                prop_assert!(split.second >= split.first);
            }
        }
    }
}
