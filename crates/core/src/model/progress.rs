use std::iter::Sum;
use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};

/// Completed and total leaf counts for a node of the curriculum tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
}

impl Progress {
    #[must_use]
    pub fn new(completed: usize, total: usize) -> Self {
        Self { completed, total }
    }

    /// Progress of a single completion unit.
    #[must_use]
    pub fn leaf(checked: bool) -> Self {
        Self {
            completed: usize::from(checked),
            total: 1,
        }
    }

    /// Completion percentage in `0.0..=100.0`; zero when there is nothing to
    /// complete.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.completed as f64 / self.total as f64 * 100.0
    }

    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn rounded_percentage(&self) -> u32 {
        self.percentage().round() as u32
    }

    /// True when every leaf is checked. An empty node is never complete.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.completed == self.total
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.total.saturating_sub(self.completed)
    }
}

impl Add for Progress {
    type Output = Progress;

    fn add(self, rhs: Self) -> Self::Output {
        Progress {
            completed: self.completed + rhs.completed,
            total: self.total + rhs.total,
        }
    }
}

impl AddAssign for Progress {
    fn add_assign(&mut self, rhs: Self) {
        self.completed += rhs.completed;
        self.total += rhs.total;
    }
}

impl Sum for Progress {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Progress::default(), Add::add)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_progress_is_zero_percent_and_incomplete() {
        let p = Progress::default();
        assert_eq!(p.percentage(), 0.0);
        assert!(!p.is_complete());
    }

    #[test]
    fn one_of_three_rounds_to_33() {
        let p = Progress::new(1, 3);
        assert_eq!(p.rounded_percentage(), 33);
        assert_eq!(p.remaining(), 2);
    }

    #[test]
    fn two_of_three_rounds_up() {
        assert_eq!(Progress::new(2, 3).rounded_percentage(), 67);
    }

    #[test]
    fn sums_component_wise() {
        let total: Progress = [Progress::leaf(true), Progress::leaf(false), Progress::new(2, 2)]
            .into_iter()
            .sum();
        assert_eq!(total, Progress::new(3, 4));
        assert!(!total.is_complete());
        assert!(Progress::new(4, 4).is_complete());
    }
}
