//! The cache node: owned layer engines, their size table, and counters.
//!
//! ## Request path
//!
//! ```text
//!   add_request(req, layer_id)
//!        │  layer_id in 1..=num_layers?  ── no ──► ConfigError (no engine touched)
//!        ▼
//!   layers[layer_id - 1].add_element(req) ──► hit?
//!        │
//!        ├──► ServerStats::record
//!        └──► StatsSink::record (if attached)
//! ```
//!
//! ## Profiling path (dynamic servers only)
//!
//! ```text
//!   profile_request(req, layer_id)
//!        │
//!        ▼
//!   CacheProfiler::add_request ──► Advice::Evaluated(decision)
//!        │                                │
//!        │                                ▼
//!        │                    decision.apply(layer_size) ──► set_new_boundaries
//!        ▼
//!   Advice returned to the driver
//! ```
//!
//! Shrinks are lazy: engines get a lower `size` and evict toward it on later
//! insertions.
//!
//! ## Shares
//!
//! Besides the integer size table the server keeps each layer's fractional
//! share of the total. `set_size` recomputes sizes from the shares, so a
//! shrink followed by a grow restores the split instead of compounding
//! rounding losses. A boundary shift re-divides the combined share of
//! layers 1 and 2 in proportion to their new sizes; other layers keep theirs.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::{ConfigError, SimError, UnsupportedError};
use crate::key::{CacheRequest, KeyKind};
use crate::profiler::{Advice, BoundaryDecision, CacheProfiler, ProfilerConfig};
use crate::server::config::layer_sizes_from_boundaries;
use crate::server::stats::ServerStats;
use crate::traits::{CacheLayer, StatsSink};

/// A simulated edge cache node.
///
/// Built with [`ServerBuilder`](crate::server::ServerBuilder).
///
/// # Example
///
/// ```
/// use edgecache::key::CacheRequest;
/// use edgecache::server::ServerBuilder;
///
/// let mut server = ServerBuilder::new(1, 4).build().unwrap();
/// let req = CacheRequest::new(42u64);
///
/// assert_eq!(server.add_request(&req, 1), Ok(false));
/// assert_eq!(server.add_request(&req, 1), Ok(true));
/// assert!(server.add_request(&req, 3).is_err());
///
/// assert_eq!(server.stats().num_req, 2);
/// assert_eq!(server.stats().num_hit, 1);
/// ```
pub struct CacheServer {
    server_id: u64,
    server_name: String,
    key_kind: KeyKind,
    cache_size: usize,
    layer_size: Vec<usize>,
    shares: Vec<f64>,
    layers: Vec<Box<dyn CacheLayer>>,
    stats: ServerStats,
    sink: Option<Arc<dyn StatsSink>>,
    profiler: Option<CacheProfiler>,
}

impl fmt::Debug for CacheServer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheServer")
            .field("server_id", &self.server_id)
            .field("server_name", &self.server_name)
            .field("key_kind", &self.key_kind)
            .field("cache_size", &self.cache_size)
            .field("layer_size", &self.layer_size)
            .field("shares", &self.shares)
            .field("layers", &self.layers)
            .field("dynamic", &self.profiler.is_some())
            .finish_non_exhaustive()
    }
}

/// Everything a builder hands over to create a server.
pub(crate) struct ServerParts {
    pub(crate) server_id: u64,
    pub(crate) server_name: String,
    pub(crate) key_kind: KeyKind,
    pub(crate) layer_size: Vec<usize>,
    /// Fractional split, one entry per layer, summing to 1.0.
    pub(crate) shares: Vec<f64>,
    pub(crate) layers: Vec<Box<dyn CacheLayer>>,
    pub(crate) sink: Option<Arc<dyn StatsSink>>,
    pub(crate) profiler: Option<ProfilerConfig>,
}

impl CacheServer {
    pub(crate) fn assemble(parts: ServerParts) -> Result<Self, ConfigError> {
        let ServerParts {
            server_id,
            server_name,
            key_kind,
            layer_size,
            shares,
            layers,
            sink,
            profiler,
        } = parts;
        let profiler = profiler.map(CacheProfiler::new).transpose()?;
        let server = Self {
            server_id,
            server_name,
            key_kind,
            cache_size: layer_size.iter().sum(),
            stats: ServerStats::new(server_id, layers.len()),
            layer_size,
            shares,
            layers,
            sink,
            profiler,
        };
        info!(
            server_id = server.server_id,
            name = %server.server_name,
            cache_size = server.cache_size,
            layer_sizes = ?server.layer_size,
            dynamic = server.is_dynamic(),
            "cache server constructed"
        );
        Ok(server)
    }

    fn slot(&self, layer_id: usize) -> Result<usize, ConfigError> {
        layer_id
            .checked_sub(1)
            .filter(|&i| i < self.layers.len())
            .ok_or_else(|| {
                ConfigError::new(format!(
                    "server {} has no layer {} (layers 1..={})",
                    self.server_id,
                    layer_id,
                    self.layers.len()
                ))
            })
    }

    /// Serves `request` from `layer_id` (1-based) and returns whether it hit.
    ///
    /// An unknown layer or a key of the wrong kind is rejected before any
    /// engine or counter is touched.
    pub fn add_request(&mut self, request: &CacheRequest, layer_id: usize) -> Result<bool, ConfigError> {
        let slot = self.slot(layer_id)?;
        if request.kind() != self.key_kind {
            return Err(ConfigError::new(format!(
                "server {} serves {} keys, got a {} key",
                self.server_id,
                self.key_kind,
                request.kind()
            )));
        }

        let hit = self.layers[slot].add_element(request);
        self.stats.record(layer_id, hit);
        if let Some(sink) = &self.sink {
            sink.record(layer_id, hit);
        }
        Ok(hit)
    }

    /// Feeds `request` to the reuse-distance profiler and applies any shift
    /// the advisor decides on.
    ///
    /// Fails with a config error on a static server. A rejected evaluation
    /// is counted in [`ServerStats::rejected_evaluations`] and returned as
    /// [`SimError::Invariant`]; layer sizes are left as they were.
    pub fn profile_request(&mut self, request: &CacheRequest, layer_id: usize) -> Result<Advice, SimError> {
        let Some(profiler) = self.profiler.as_mut() else {
            return Err(ConfigError::new(format!(
                "server {} does not have dynamic boundaries enabled",
                self.server_id
            ))
            .into());
        };

        let advice = match profiler.add_request(request, layer_id) {
            Ok(advice) => advice,
            Err(SimError::Invariant(err)) => {
                self.stats.rejected_evaluations += 1;
                warn!(server_id = self.server_id, error = %err, "boundary evaluation rejected");
                return Err(err.into());
            },
            Err(err) => return Err(err),
        };

        if let Advice::Evaluated(decision) = advice {
            self.apply_decision(decision)?;
        }
        Ok(advice)
    }

    fn apply_decision(&mut self, decision: BoundaryDecision) -> Result<(), ConfigError> {
        if decision == BoundaryDecision::NoShift {
            return Ok(());
        }
        let mut sizes = self.layer_size.clone();
        if !decision.apply(&mut sizes) {
            warn!(
                server_id = self.server_id,
                ?decision,
                layer_sizes = ?self.layer_size,
                "boundary shift skipped, donor layer is empty"
            );
            return Ok(());
        }
        self.apply_sizes(&sizes)?;
        self.rebalance_tunable_shares();
        self.stats.boundary_shifts += 1;
        debug!(
            server_id = self.server_id,
            ?decision,
            layer_sizes = ?self.layer_size,
            "boundary shifted"
        );
        Ok(())
    }

    /// Splits the combined share of layers 1 and 2 by their current sizes.
    fn rebalance_tunable_shares(&mut self) {
        let (first, second) = (self.layer_size[0], self.layer_size[1]);
        let pair = first + second;
        if pair == 0 {
            return;
        }
        let combined = self.shares[0] + self.shares[1];
        self.shares[0] = combined * first as f64 / pair as f64;
        self.shares[1] = combined - self.shares[0];
    }

    /// Installs a new per-layer size table with the same total.
    ///
    /// Engines get their new limit immediately but shrink lazily. On a
    /// non-empty server the shares follow the new table.
    pub fn set_new_boundaries(&mut self, layer_sizes: &[usize]) -> Result<(), ConfigError> {
        if layer_sizes.len() != self.layers.len() {
            return Err(ConfigError::new(format!(
                "expected {} layer sizes, got {}",
                self.layers.len(),
                layer_sizes.len()
            )));
        }
        let total: usize = layer_sizes.iter().sum();
        if total != self.cache_size {
            return Err(ConfigError::new(format!(
                "layer sizes sum to {} but the cache size is {}",
                total, self.cache_size
            )));
        }
        self.apply_sizes(layer_sizes)?;
        if total > 0 {
            self.shares = layer_sizes
                .iter()
                .map(|&size| size as f64 / total as f64)
                .collect();
        }
        Ok(())
    }

    /// Re-targets the total cache size, keeping each layer's share.
    ///
    /// Sizes are recomputed from the shares with
    /// [`layer_sizes_from_boundaries`], so the remainder lands on the last
    /// layer and the sizes sum to `new_total`.
    pub fn set_size(&mut self, new_total: usize) -> Result<(), ConfigError> {
        let sizes = layer_sizes_from_boundaries(new_total, &self.shares)?;
        self.cache_size = new_total;
        if let Some(profiler) = self.profiler.as_mut() {
            profiler.set_max_cache_size(new_total);
        }
        self.apply_sizes(&sizes)?;
        info!(
            server_id = self.server_id,
            cache_size = new_total,
            layer_sizes = ?self.layer_size,
            "cache size re-targeted"
        );
        Ok(())
    }

    fn apply_sizes(&mut self, layer_sizes: &[usize]) -> Result<(), ConfigError> {
        if let Some(profiler) = self.profiler.as_mut() {
            profiler.set_new_boundaries(layer_sizes)?;
        }
        for (layer, &size) in self.layers.iter_mut().zip(layer_sizes) {
            layer.set_size(size);
        }
        self.layer_size.copy_from_slice(layer_sizes);
        Ok(())
    }

    pub fn set_l1_cache(&mut self, engine: Box<dyn CacheLayer>) -> Result<(), ConfigError> {
        self.set_ln_cache(1, engine)
    }

    pub fn set_l2_cache(&mut self, engine: Box<dyn CacheLayer>) -> Result<(), ConfigError> {
        self.set_ln_cache(2, engine)
    }

    /// Replaces the engine of layer `n` (1-based); the old engine is dropped.
    ///
    /// The replacement must declare exactly the recorded size for that layer
    /// and use the server's key kind.
    pub fn set_ln_cache(&mut self, n: usize, engine: Box<dyn CacheLayer>) -> Result<(), ConfigError> {
        let slot = self.slot(n)?;
        if engine.size() != self.layer_size[slot] {
            return Err(ConfigError::new(format!(
                "layer {} is sized {} but the replacement engine holds {}",
                n,
                self.layer_size[slot],
                engine.size()
            )));
        }
        if engine.key_kind() != self.key_kind {
            return Err(ConfigError::new(format!(
                "layer {} serves {} keys but the replacement engine uses {}",
                n,
                self.key_kind,
                engine.key_kind()
            )));
        }
        debug!(server_id = self.server_id, layer = n, engine = engine.name(), "layer engine replaced");
        self.layers[slot] = engine;
        Ok(())
    }

    /// Operational self-check.
    pub fn verify(&self) -> Result<(), UnsupportedError> {
        Err(UnsupportedError::new("server verification"))
    }

    #[inline]
    pub fn server_id(&self) -> u64 {
        self.server_id
    }

    #[inline]
    pub fn server_name(&self) -> &str {
        &self.server_name
    }

    #[inline]
    pub fn key_kind(&self) -> KeyKind {
        self.key_kind
    }

    #[inline]
    pub fn cache_size(&self) -> usize {
        self.cache_size
    }

    /// Target size of each layer, layer 1 first.
    #[inline]
    pub fn layer_sizes(&self) -> &[usize] {
        &self.layer_size
    }

    /// Fraction of the total held by each layer, layer 1 first.
    #[inline]
    pub fn layer_shares(&self) -> &[f64] {
        &self.shares
    }

    #[inline]
    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }

    #[inline]
    pub fn is_dynamic(&self) -> bool {
        self.profiler.is_some()
    }

    #[inline]
    pub fn stats(&self) -> &ServerStats {
        &self.stats
    }

    #[inline]
    pub fn profiler(&self) -> Option<&CacheProfiler> {
        self.profiler.as_ref()
    }

    /// Engine of layer `layer_id` (1-based).
    pub fn layer(&self, layer_id: usize) -> Option<&dyn CacheLayer> {
        let slot = layer_id.checked_sub(1)?;
        self.layers.get(slot).map(|layer| layer.as_ref())
    }
}
