//! Boundary advisor for the two tunable layers.
//!
//! Every `adjust_interval` requests per tunable layer, the advisor compares
//! the marginal latency benefit of moving one capacity unit between layer 1
//! and layer 2 using each layer's reuse-distance histogram at its current
//! capacity:
//!
//! ```text
//!   a1 = Lo - L1        a2 = Lo - L2
//!
//!   delta1 = a2 * H2[C2]  -  a1 * H1[C1 + 1]     (grow layer 1)
//!   delta2 = a1 * H1[C1]  -  a2 * H2[C2 + 1]     (grow layer 2)
//!
//!   delta1 < 0 && delta2 < 0  → InvariantError
//!   delta1 > 0 && delta2 > 0  → InvariantError
//!   delta1 < 0                → ShiftToFirst
//!   delta2 > 0                → ShiftToSecond
//!   otherwise                 → NoShift
//! ```
//!
//! Layers beyond the second are never part of the computation.

use tracing::debug;

use crate::error::{ConfigError, InvariantError};
use crate::profiler::histogram::ReuseHistogram;

/// Number of layers whose boundary the advisor moves.
pub const TUNABLE_LAYERS: usize = 2;

/// Per-tier latency constants.
///
/// `origin` is the cost of a request that misses every layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatencyProfile {
    l1: u64,
    l2: u64,
    origin: u64,
}

impl LatencyProfile {
    /// Rejects anything but `origin >= l2 >= l1`.
    ///
    /// # Example
    ///
    /// ```
    /// use edgecache::profiler::LatencyProfile;
    ///
    /// assert!(LatencyProfile::new(1, 10, 100).is_ok());
    /// assert!(LatencyProfile::new(10, 1, 100).is_err());
    /// ```
    pub fn new(l1: u64, l2: u64, origin: u64) -> Result<Self, ConfigError> {
        if !(l1 <= l2 && l2 <= origin) {
            return Err(ConfigError::new(format!(
                "latencies must satisfy origin >= l2 >= l1, got l1={} l2={} origin={}",
                l1, l2, origin
            )));
        }
        Ok(Self { l1, l2, origin })
    }

    #[inline]
    pub fn l1(&self) -> u64 {
        self.l1
    }

    #[inline]
    pub fn l2(&self) -> u64 {
        self.l2
    }

    #[inline]
    pub fn origin(&self) -> u64 {
        self.origin
    }
}

impl Default for LatencyProfile {
    fn default() -> Self {
        Self {
            l1: 1,
            l2: 10,
            origin: 100,
        }
    }
}

/// Outcome of one boundary evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryDecision {
    /// Grow layer 1 by one unit, shrink layer 2 by one.
    ShiftToFirst,
    /// Grow layer 2 by one unit, shrink layer 1 by one.
    ShiftToSecond,
    NoShift,
}

impl BoundaryDecision {
    /// Applies the decision to a layer-size table.
    ///
    /// Returns `false` and leaves `sizes` untouched for `NoShift`, when the
    /// donor layer is already empty, or when `sizes` has fewer than two
    /// entries. Total capacity is always conserved.
    pub fn apply(self, sizes: &mut [usize]) -> bool {
        let (grow, shrink) = match self {
            BoundaryDecision::ShiftToFirst => (0, 1),
            BoundaryDecision::ShiftToSecond => (1, 0),
            BoundaryDecision::NoShift => return false,
        };
        if sizes.len() < TUNABLE_LAYERS || sizes[shrink] == 0 {
            return false;
        }
        sizes[shrink] -= 1;
        sizes[grow] += 1;
        true
    }
}

/// Result of a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advice {
    /// Not every tunable layer has advanced by `adjust_interval` yet.
    NoOpYet,
    Evaluated(BoundaryDecision),
}

/// Decides when and how to move the boundary between layers 1 and 2.
#[derive(Debug, Clone)]
pub struct BoundaryAdvisor {
    latencies: LatencyProfile,
    adjust_interval: u64,
    ticks: [u64; TUNABLE_LAYERS],
    last_adjust: [u64; TUNABLE_LAYERS],
    evaluations: u64,
}

impl BoundaryAdvisor {
    /// Creates an advisor; `adjust_interval` must be positive.
    pub fn new(latencies: LatencyProfile, adjust_interval: u64) -> Result<Self, ConfigError> {
        if adjust_interval == 0 {
            return Err(ConfigError::new("adjust_interval must be > 0"));
        }
        Ok(Self {
            latencies,
            adjust_interval,
            ticks: [0; TUNABLE_LAYERS],
            last_adjust: [0; TUNABLE_LAYERS],
            evaluations: 0,
        })
    }

    #[inline]
    pub fn latencies(&self) -> LatencyProfile {
        self.latencies
    }

    #[inline]
    pub fn adjust_interval(&self) -> u64 {
        self.adjust_interval
    }

    /// Number of evaluations run since construction or the last reset.
    #[inline]
    pub fn evaluations(&self) -> u64 {
        self.evaluations
    }

    /// Ticks seen on tunable layer `layer_id` (1-based).
    pub fn ticks(&self, layer_id: usize) -> Option<u64> {
        layer_id
            .checked_sub(1)
            .and_then(|i| self.ticks.get(i))
            .copied()
    }

    /// Records one request on `layer_id` and evaluates once every tunable
    /// layer has advanced by at least `adjust_interval` ticks.
    ///
    /// Ticks on layers other than 1 and 2 are ignored. Whatever the
    /// evaluation outcome, including an error, the cadence restarts from the
    /// current tick counts.
    pub fn on_tick(
        &mut self,
        layer_id: usize,
        histograms: [&ReuseHistogram; TUNABLE_LAYERS],
        sizes: [usize; TUNABLE_LAYERS],
    ) -> Result<Advice, InvariantError> {
        let Some(slot) = layer_id.checked_sub(1).filter(|&i| i < TUNABLE_LAYERS) else {
            return Ok(Advice::NoOpYet);
        };
        self.ticks[slot] += 1;

        let due = self
            .ticks
            .iter()
            .zip(self.last_adjust.iter())
            .all(|(&now, &last)| now - last >= self.adjust_interval);
        if !due {
            return Ok(Advice::NoOpYet);
        }

        self.last_adjust = self.ticks;
        self.evaluations += 1;
        self.evaluate(histograms, sizes).map(Advice::Evaluated)
    }

    /// Computes `(delta1, delta2)` for capacities `sizes`.
    pub fn marginal_deltas(
        &self,
        histograms: [&ReuseHistogram; TUNABLE_LAYERS],
        sizes: [usize; TUNABLE_LAYERS],
    ) -> (i128, i128) {
        let [h1, h2] = histograms;
        let [c1, c2] = sizes;
        let a1 = i128::from(self.latencies.origin - self.latencies.l1);
        let a2 = i128::from(self.latencies.origin - self.latencies.l2);
        let at = |h: &ReuseHistogram, d: usize| i128::from(h.count(d));

        let delta1 = a2 * at(h2, c2) - a1 * at(h1, c1 + 1);
        let delta2 = a1 * at(h1, c1) - a2 * at(h2, c2 + 1);
        (delta1, delta2)
    }

    /// Runs one evaluation without touching the cadence.
    pub fn evaluate(
        &self,
        histograms: [&ReuseHistogram; TUNABLE_LAYERS],
        sizes: [usize; TUNABLE_LAYERS],
    ) -> Result<BoundaryDecision, InvariantError> {
        let (delta1, delta2) = self.marginal_deltas(histograms, sizes);

        if delta1 < 0 && delta2 < 0 {
            return Err(InvariantError::new(format!(
                "delta1 ({}) and delta2 ({}) both negative at capacities {:?}",
                delta1, delta2, sizes
            )));
        }
        if delta1 > 0 && delta2 > 0 {
            return Err(InvariantError::new(format!(
                "delta1 ({}) and delta2 ({}) both positive at capacities {:?}",
                delta1, delta2, sizes
            )));
        }

        let decision = if delta1 < 0 {
            BoundaryDecision::ShiftToFirst
        } else if delta2 > 0 {
            BoundaryDecision::ShiftToSecond
        } else {
            BoundaryDecision::NoShift
        };
        debug!(%delta1, %delta2, ?sizes, ?decision, "boundary evaluated");
        Ok(decision)
    }

    /// Restarts the cadence and tick counters.
    pub fn reset(&mut self) {
        self.ticks = [0; TUNABLE_LAYERS];
        self.last_adjust = [0; TUNABLE_LAYERS];
        self.evaluations = 0;
    }
}
