//! Per-layer reuse-distance histogram.
//!
//! ```text
//!   exact[0] exact[1] ... exact[capacity-1] | overflow | cold
//!   └──────── d < capacity ───────────────┘  d >= cap   never seen
//! ```
//!
//! Every recorded outcome lands in exactly one slot, so `total()` always
//! equals the number of `record` calls since the last `clear`.

use crate::profiler::tracker::ReuseOutcome;

/// Frequency table of reuse distances.
///
/// # Example
///
/// ```
/// use edgecache::profiler::{ReuseHistogram, ReuseOutcome};
///
/// let mut hist = ReuseHistogram::new(2);
/// hist.record(ReuseOutcome::Cold);
/// hist.record(ReuseOutcome::Distance(1));
/// hist.record(ReuseOutcome::Distance(2));
///
/// assert_eq!(hist.count(1), 1);
/// assert_eq!(hist.count(2), 0);
/// assert_eq!(hist.overflow(), 1);
/// assert_eq!(hist.cold(), 1);
/// assert_eq!(hist.total(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReuseHistogram {
    exact: Vec<u64>,
    overflow: u64,
    cold: u64,
}

impl ReuseHistogram {
    /// Creates a histogram with exact slots for distances `0..capacity`.
    pub fn new(capacity: usize) -> Self {
        Self {
            exact: vec![0; capacity],
            overflow: 0,
            cold: 0,
        }
    }

    /// Number of exact-distance slots.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.exact.len()
    }

    pub fn record(&mut self, outcome: ReuseOutcome) {
        match outcome {
            ReuseOutcome::Cold => self.cold += 1,
            ReuseOutcome::Distance(d) => match self.exact.get_mut(d) {
                Some(slot) => *slot += 1,
                None => self.overflow += 1,
            },
        }
    }

    /// Count at exact distance `distance`; zero beyond the exact range.
    #[inline]
    pub fn count(&self, distance: usize) -> u64 {
        self.exact.get(distance).copied().unwrap_or(0)
    }

    #[inline]
    pub fn overflow(&self) -> u64 {
        self.overflow
    }

    #[inline]
    pub fn cold(&self) -> u64 {
        self.cold
    }

    pub fn total(&self) -> u64 {
        self.exact.iter().sum::<u64>() + self.overflow + self.cold
    }

    /// Non-zero exact slots as `(distance, count)`.
    pub fn iter(&self) -> impl Iterator<Item = (usize, u64)> + '_ {
        self.exact
            .iter()
            .enumerate()
            .filter(|&(_, &count)| count > 0)
            .map(|(d, &count)| (d, count))
    }

    /// Resizes the exact range.
    ///
    /// Growing adds empty slots; shrinking folds the dropped slots into
    /// overflow so the total is unchanged.
    pub fn set_capacity(&mut self, capacity: usize) {
        if capacity < self.exact.len() {
            let folded: u64 = self.exact.drain(capacity..).sum();
            self.overflow += folded;
        } else {
            self.exact.resize(capacity, 0);
        }
    }

    /// Zeroes every slot, keeping the capacity.
    pub fn clear(&mut self) {
        self.exact.iter_mut().for_each(|slot| *slot = 0);
        self.overflow = 0;
        self.cold = 0;
    }
}
