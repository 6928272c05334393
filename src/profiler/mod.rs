//! Online reuse-distance profiling and boundary advice.
//!
//! ## Architecture
//!
//! ```text
//!   CacheProfiler::add_request(req, layer_id)
//!        │
//!        ▼
//!   ┌────────────────────────┐   ReuseOutcome   ┌──────────────────┐
//!   │ ReuseDistanceTracker   │ ───────────────► │ ReuseHistogram   │
//!   │ (one per layer)        │                  │ (one per layer)  │
//!   └────────────────────────┘                  └────────┬─────────┘
//!                                                        │ H1, H2
//!                                                        ▼
//!                                             ┌──────────────────────┐
//!                                             │ BoundaryAdvisor      │──► Advice
//!                                             │ (layers 1 and 2)     │
//!                                             └──────────────────────┘
//! ```
//!
//! The profiler never touches engines. It only returns advice; the
//! [`CacheServer`](crate::server::CacheServer) applies shifts to its size
//! table and mirrors the new sizes back with
//! [`set_new_boundaries`](CacheProfiler::set_new_boundaries).

pub mod advisor;
pub mod histogram;
pub mod tracker;

pub use advisor::{Advice, BoundaryAdvisor, BoundaryDecision, LatencyProfile, TUNABLE_LAYERS};
pub use histogram::ReuseHistogram;
pub use tracker::{ReuseDistanceTracker, ReuseOutcome};

use crate::error::{ConfigError, SimError};
use crate::key::{CacheKey, CacheRequest, KeyKind};

/// Extra exact slots beyond the total cache size, so `H[C + 1]` is always
/// addressable for any layer capacity `C <= total`.
///
/// Histograms span the whole server, not one layer: their overflow slot
/// counts distances past `total + SPAN_SLACK`, not past the layer's own
/// capacity. A reuse at distance 2 in a 2-unit layer lands in exact slot 2.
const SPAN_SLACK: usize = 2;

/// Profiler construction parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfilerConfig {
    /// Total capacity across all layers; sets the histogram span.
    pub max_cache_size: usize,
    pub key_kind: KeyKind,
    /// Current capacity of each layer, layer 1 first.
    pub layer_sizes: Vec<usize>,
    /// Requests per tunable layer between evaluations.
    pub adjust_interval: u64,
    pub latencies: LatencyProfile,
}

impl Default for ProfilerConfig {
    fn default() -> Self {
        Self {
            max_cache_size: 0,
            key_kind: KeyKind::default(),
            layer_sizes: vec![0; TUNABLE_LAYERS],
            adjust_interval: 10_000,
            latencies: LatencyProfile::default(),
        }
    }
}

/// Per-layer reuse-distance profiler feeding a [`BoundaryAdvisor`].
///
/// # Example
///
/// ```
/// use edgecache::key::{CacheRequest, KeyKind};
/// use edgecache::profiler::{Advice, CacheProfiler, ProfilerConfig};
///
/// let mut profiler = CacheProfiler::new(ProfilerConfig {
///     max_cache_size: 4,
///     key_kind: KeyKind::Int64,
///     layer_sizes: vec![2, 2],
///     adjust_interval: 100,
///     ..ProfilerConfig::default()
/// })
/// .unwrap();
///
/// let advice = profiler.add_request(&CacheRequest::new(7u64), 1).unwrap();
/// assert_eq!(advice, Advice::NoOpYet);
/// assert_eq!(profiler.logical_clock(1), Some(1));
/// ```
#[derive(Debug)]
pub struct CacheProfiler {
    key_kind: KeyKind,
    max_cache_size: usize,
    layer_sizes: Vec<usize>,
    trackers: Vec<ReuseDistanceTracker<CacheKey>>,
    histograms: Vec<ReuseHistogram>,
    advisor: BoundaryAdvisor,
}

impl CacheProfiler {
    pub fn new(config: ProfilerConfig) -> Result<Self, ConfigError> {
        let ProfilerConfig {
            max_cache_size,
            key_kind,
            layer_sizes,
            adjust_interval,
            latencies,
        } = config;

        if layer_sizes.len() < TUNABLE_LAYERS {
            return Err(ConfigError::new(format!(
                "profiler needs at least {} layers, got {}",
                TUNABLE_LAYERS,
                layer_sizes.len()
            )));
        }
        let declared: usize = layer_sizes.iter().sum();
        if declared > max_cache_size {
            return Err(ConfigError::new(format!(
                "layer sizes sum to {} but max_cache_size is {}",
                declared, max_cache_size
            )));
        }
        let advisor = BoundaryAdvisor::new(latencies, adjust_interval)?;

        let layers = layer_sizes.len();
        Ok(Self {
            key_kind,
            max_cache_size,
            layer_sizes,
            trackers: (0..layers).map(|_| ReuseDistanceTracker::new()).collect(),
            histograms: (0..layers)
                .map(|_| ReuseHistogram::new(max_cache_size + SPAN_SLACK))
                .collect(),
            advisor,
        })
    }

    fn slot(&self, layer_id: usize) -> Result<usize, ConfigError> {
        layer_id
            .checked_sub(1)
            .filter(|&i| i < self.layer_sizes.len())
            .ok_or_else(|| {
                ConfigError::new(format!(
                    "layer {} out of range 1..={}",
                    layer_id,
                    self.layer_sizes.len()
                ))
            })
    }

    /// Profiles `request` on `layer_id` (1-based) and ticks the advisor.
    ///
    /// Fails with [`SimError::Config`] for an unknown layer or a key of the
    /// wrong kind (nothing is recorded), and with [`SimError::Invariant`]
    /// when an evaluation rejects the histograms (the request is recorded).
    pub fn add_request(&mut self, request: &CacheRequest, layer_id: usize) -> Result<Advice, SimError> {
        let slot = self.slot(layer_id)?;
        if request.kind() != self.key_kind {
            return Err(ConfigError::new(format!(
                "profiler tracks {} keys, got a {} key",
                self.key_kind,
                request.kind()
            ))
            .into());
        }

        let outcome = self.trackers[slot].record(request.key().clone());
        self.histograms[slot].record(outcome);

        let advice = self.advisor.on_tick(
            layer_id,
            [&self.histograms[0], &self.histograms[1]],
            [self.layer_sizes[0], self.layer_sizes[1]],
        )?;
        Ok(advice)
    }

    /// Mirrors the server's layer-size table.
    pub fn set_new_boundaries(&mut self, layer_sizes: &[usize]) -> Result<(), ConfigError> {
        if layer_sizes.len() != self.layer_sizes.len() {
            return Err(ConfigError::new(format!(
                "expected {} layer sizes, got {}",
                self.layer_sizes.len(),
                layer_sizes.len()
            )));
        }
        self.layer_sizes.copy_from_slice(layer_sizes);
        Ok(())
    }

    /// Re-spans every histogram for a new total cache size.
    pub fn set_max_cache_size(&mut self, max_cache_size: usize) {
        self.max_cache_size = max_cache_size;
        for hist in &mut self.histograms {
            hist.set_capacity(max_cache_size + SPAN_SLACK);
        }
    }

    /// Forgets all keys and zeroes all histograms. Capacities, latencies and
    /// the adjust interval are kept.
    pub fn clear(&mut self) {
        for tracker in &mut self.trackers {
            tracker.clear();
        }
        for hist in &mut self.histograms {
            hist.clear();
        }
        self.advisor.reset();
    }

    /// Reuse histogram of `layer_id`, spanning `max_cache_size + 2` slots.
    ///
    /// `overflow()` here means beyond the whole span; distances past the
    /// layer's own size are still exact counts.
    pub fn histogram(&self, layer_id: usize) -> Option<&ReuseHistogram> {
        let slot = self.slot(layer_id).ok()?;
        self.histograms.get(slot)
    }

    pub fn logical_clock(&self, layer_id: usize) -> Option<u64> {
        let slot = self.slot(layer_id).ok()?;
        self.trackers.get(slot).map(|t| t.logical_clock())
    }

    /// Distinct keys currently tracked on `layer_id`.
    pub fn live_keys(&self, layer_id: usize) -> Option<usize> {
        let slot = self.slot(layer_id).ok()?;
        self.trackers.get(slot).map(|t| t.live_keys())
    }

    #[inline]
    pub fn layer_sizes(&self) -> &[usize] {
        &self.layer_sizes
    }

    #[inline]
    pub fn max_cache_size(&self) -> usize {
        self.max_cache_size
    }

    #[inline]
    pub fn key_kind(&self) -> KeyKind {
        self.key_kind
    }

    #[inline]
    pub fn advisor(&self) -> &BoundaryAdvisor {
        &self.advisor
    }
}
