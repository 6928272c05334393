//! Online reuse-distance tracking.
//!
//! For every presented key the tracker answers: how many *distinct* keys
//! were accessed since this key was last seen? That count is the smallest
//! LRU capacity that would have turned the access into a hit, minus one.
//!
//! ```text
//!   trace:    X  Y  Z  Y  X
//!   outcome:  C  C  C  1  2      (C = cold, never seen)
//! ```

use std::hash::Hash;
use std::marker::PhantomData;

use crate::ds::{RecencyIndex, SplayRecencyIndex};

/// Result of presenting one key to a tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReuseOutcome {
    /// The key was never seen by this tracker.
    Cold,
    /// Number of distinct keys accessed strictly more recently than the
    /// previous access to this key.
    Distance(usize),
}

/// Converts a key stream into reuse distances.
///
/// `logical_clock` advances by exactly one per [`record`](Self::record)
/// call and is independent of wall-clock time, so a fixed trace always
/// produces the same outcomes.
///
/// # Example
///
/// ```
/// use edgecache::profiler::{ReuseDistanceTracker, ReuseOutcome};
///
/// let mut tracker = ReuseDistanceTracker::new();
/// assert_eq!(tracker.record("x"), ReuseOutcome::Cold);
/// assert_eq!(tracker.record("y"), ReuseOutcome::Cold);
/// assert_eq!(tracker.record("x"), ReuseOutcome::Distance(1));
/// assert_eq!(tracker.logical_clock(), 3);
/// ```
#[derive(Debug)]
pub struct ReuseDistanceTracker<K, I = SplayRecencyIndex<K>> {
    index: I,
    logical_clock: u64,
    _key: PhantomData<K>,
}

impl<K> ReuseDistanceTracker<K>
where
    K: Eq + Hash,
{
    /// Creates a tracker backed by a splay-tree index.
    pub fn new() -> Self {
        Self::with_index(SplayRecencyIndex::new())
    }
}

impl<K> Default for ReuseDistanceTracker<K>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, I> ReuseDistanceTracker<K, I>
where
    I: RecencyIndex<K>,
{
    /// Creates a tracker over a caller-supplied index implementation.
    pub fn with_index(index: I) -> Self {
        Self {
            index,
            logical_clock: 0,
            _key: PhantomData,
        }
    }

    /// Presents `key` and returns its reuse distance.
    pub fn record(&mut self, key: K) -> ReuseOutcome {
        self.logical_clock += 1;
        let outcome = match self.index.rank(&key) {
            Some(rank) => ReuseOutcome::Distance(rank),
            None => ReuseOutcome::Cold,
        };
        self.index.insert_most_recent(key);
        outcome
    }

    #[inline]
    pub fn logical_clock(&self) -> u64 {
        self.logical_clock
    }

    /// Number of distinct keys seen since construction or the last clear.
    #[inline]
    pub fn live_keys(&self) -> usize {
        self.index.len()
    }

    /// Forgets every key and rewinds the clock.
    pub fn clear(&mut self) {
        self.index.clear();
        self.logical_clock = 0;
    }
}
