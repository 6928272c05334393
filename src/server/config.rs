//! Server configuration.
//!
//! Two construction paths, both through [`ServerBuilder`]:
//!
//! | Terminal                | Layer engines                | Sizes from                 |
//! |-------------------------|------------------------------|----------------------------|
//! | `build()`               | built from `algorithm`       | `total_size * boundaries`  |
//! | `build_with_layers(..)` | adopted from the caller      | each engine's `size()`     |
//!
//! ## Defaults
//!
//! | Setting              | Default               |
//! |----------------------|-----------------------|
//! | `name`               | `"server-<id>"`       |
//! | `boundaries`         | `[0.5, 0.5]`          |
//! | `algorithm`          | LRU                   |
//! | `key_kind`           | int64                 |
//! | `block_size`         | none                  |
//! | `latencies`          | L1=1, L2=10, Lo=100   |
//! | `adjust_interval`    | 10 000                |
//! | `dynamic_boundaries` | off                   |

use std::fmt;
use std::sync::Arc;

use crate::builder::{EvictionAlgorithm, LayerBuilder};
use crate::error::ConfigError;
use crate::key::KeyKind;
use crate::profiler::{LatencyProfile, ProfilerConfig, TUNABLE_LAYERS};
use crate::server::node::{CacheServer, ServerParts};
use crate::traits::{CacheLayer, StatsSink};

const BOUNDARY_TOLERANCE: f64 = 1e-6;
/// Absorbs float error in cumulative fractions such as `0.3 + 0.5`.
const EDGE_SLACK: f64 = 1e-9;

/// Builder for [`CacheServer`].
///
/// # Example
///
/// ```
/// use edgecache::builder::EvictionAlgorithm;
/// use edgecache::key::KeyKind;
/// use edgecache::server::ServerBuilder;
///
/// let server = ServerBuilder::new(3, 1000)
///     .name("edge-fra-3")
///     .boundaries(&[0.2, 0.8])
///     .algorithm(EvictionAlgorithm::Lru)
///     .key_kind(KeyKind::Text)
///     .dynamic_boundaries(true)
///     .adjust_interval(5_000)
///     .build()
///     .unwrap();
///
/// assert_eq!(server.layer_sizes(), &[200, 800]);
/// assert!(server.is_dynamic());
/// ```
#[derive(Clone)]
pub struct ServerBuilder {
    server_id: u64,
    name: String,
    total_size: usize,
    boundaries: Vec<f64>,
    algorithm: EvictionAlgorithm,
    key_kind: KeyKind,
    block_size: Option<u64>,
    latencies: LatencyProfile,
    adjust_interval: u64,
    dynamic: bool,
    sink: Option<Arc<dyn StatsSink>>,
}

impl fmt::Debug for ServerBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerBuilder")
            .field("server_id", &self.server_id)
            .field("name", &self.name)
            .field("total_size", &self.total_size)
            .field("boundaries", &self.boundaries)
            .field("algorithm", &self.algorithm)
            .field("key_kind", &self.key_kind)
            .field("dynamic", &self.dynamic)
            .finish_non_exhaustive()
    }
}

impl ServerBuilder {
    pub fn new(server_id: u64, total_size: usize) -> Self {
        Self {
            server_id,
            name: format!("server-{}", server_id),
            total_size,
            boundaries: vec![0.5, 0.5],
            algorithm: EvictionAlgorithm::default(),
            key_kind: KeyKind::default(),
            block_size: None,
            latencies: LatencyProfile::default(),
            adjust_interval: 10_000,
            dynamic: false,
            sink: None,
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Fraction of the total assigned to each layer, layer 1 first.
    pub fn boundaries(mut self, boundaries: &[f64]) -> Self {
        self.boundaries = boundaries.to_vec();
        self
    }

    pub fn algorithm(mut self, algorithm: EvictionAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn key_kind(mut self, key_kind: KeyKind) -> Self {
        self.key_kind = key_kind;
        self
    }

    pub fn block_size(mut self, block_size: u64) -> Self {
        self.block_size = Some(block_size);
        self
    }

    pub fn latencies(mut self, latencies: LatencyProfile) -> Self {
        self.latencies = latencies;
        self
    }

    pub fn adjust_interval(mut self, adjust_interval: u64) -> Self {
        self.adjust_interval = adjust_interval;
        self
    }

    /// Enables the reuse-distance profiler and boundary shifting.
    pub fn dynamic_boundaries(mut self, enabled: bool) -> Self {
        self.dynamic = enabled;
        self
    }

    /// Aggregate collector notified of every request outcome.
    pub fn stats_sink(mut self, sink: Arc<dyn StatsSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Builds a server whose layers are fresh `algorithm` engines sized by
    /// `boundaries` over `total_size`.
    pub fn build(self) -> Result<CacheServer, ConfigError> {
        if self.dynamic && self.boundaries.len() < TUNABLE_LAYERS {
            return Err(ConfigError::new(format!(
                "dynamic boundaries need at least {} layers, got {} boundaries",
                TUNABLE_LAYERS,
                self.boundaries.len()
            )));
        }
        let sizes = layer_sizes_from_boundaries(self.total_size, &self.boundaries)?;
        let layers = sizes
            .iter()
            .map(|&size| {
                LayerBuilder::new(size, self.key_kind)
                    .block_size(self.block_size)
                    .build(self.algorithm)
            })
            .collect();
        let shares = self.boundaries.clone();
        self.assemble(layers, sizes, shares)
    }

    /// Builds a server that takes ownership of `layers`, layer 1 first.
    ///
    /// The total size and per-layer sizes come from the engines; the
    /// builder's `total_size`, `boundaries`, `algorithm`, and `key_kind` are
    /// ignored. All engines must share one key kind.
    pub fn build_with_layers(
        mut self,
        layers: Vec<Box<dyn CacheLayer>>,
    ) -> Result<CacheServer, ConfigError> {
        let Some(first) = layers.first() else {
            return Err(ConfigError::new("a server needs at least one layer"));
        };
        let key_kind = first.key_kind();
        if let Some((i, odd)) = layers
            .iter()
            .enumerate()
            .find(|(_, layer)| layer.key_kind() != key_kind)
        {
            return Err(ConfigError::new(format!(
                "layer {} uses {} keys but layer 1 uses {}",
                i + 1,
                odd.key_kind(),
                key_kind
            )));
        }
        if self.dynamic && layers.len() < TUNABLE_LAYERS {
            return Err(ConfigError::new(format!(
                "dynamic boundaries need at least {} layers, got {}",
                TUNABLE_LAYERS,
                layers.len()
            )));
        }

        let sizes: Vec<usize> = layers.iter().map(|layer| layer.size()).collect();
        self.key_kind = key_kind;
        self.total_size = sizes.iter().sum();
        let shares = if self.total_size == 0 {
            vec![1.0 / sizes.len() as f64; sizes.len()]
        } else {
            sizes
                .iter()
                .map(|&size| size as f64 / self.total_size as f64)
                .collect()
        };
        self.assemble(layers, sizes, shares)
    }

    fn assemble(
        self,
        layers: Vec<Box<dyn CacheLayer>>,
        sizes: Vec<usize>,
        shares: Vec<f64>,
    ) -> Result<CacheServer, ConfigError> {
        let profiler = if self.dynamic {
            Some(ProfilerConfig {
                max_cache_size: self.total_size,
                key_kind: self.key_kind,
                layer_sizes: sizes.clone(),
                adjust_interval: self.adjust_interval,
                latencies: self.latencies,
            })
        } else {
            None
        };
        CacheServer::assemble(ServerParts {
            server_id: self.server_id,
            server_name: self.name,
            key_kind: self.key_kind,
            layer_size: sizes,
            shares,
            layers,
            sink: self.sink,
            profiler,
        })
    }
}

/// Splits `total` by cumulative `boundaries`.
///
/// Each layer gets `floor(total * cumulative_i) - floor(total * cumulative_{i-1})`
/// with the last cumulative pinned to `total`, so sizes always sum to `total`.
///
/// # Example
///
/// ```
/// use edgecache::server::layer_sizes_from_boundaries;
///
/// assert_eq!(layer_sizes_from_boundaries(100, &[0.3, 0.7]).unwrap(), vec![30, 70]);
/// assert_eq!(layer_sizes_from_boundaries(10, &[1.0 / 3.0; 3]).unwrap(), vec![3, 3, 4]);
/// assert!(layer_sizes_from_boundaries(10, &[0.5, 0.6]).is_err());
/// ```
pub fn layer_sizes_from_boundaries(total: usize, boundaries: &[f64]) -> Result<Vec<usize>, ConfigError> {
    if boundaries.is_empty() {
        return Err(ConfigError::new("boundaries must name at least one layer"));
    }
    if let Some(bad) = boundaries.iter().find(|b| !b.is_finite() || **b < 0.0) {
        return Err(ConfigError::new(format!(
            "boundaries must be finite and non-negative, got {}",
            bad
        )));
    }
    let sum: f64 = boundaries.iter().sum();
    if (sum - 1.0).abs() > BOUNDARY_TOLERANCE {
        return Err(ConfigError::new(format!(
            "boundaries must sum to 1.0, got {}",
            sum
        )));
    }

    let last = boundaries.len() - 1;
    let mut sizes = Vec::with_capacity(boundaries.len());
    let mut cumulative = 0.0;
    let mut assigned = 0usize;
    for (i, b) in boundaries.iter().enumerate() {
        cumulative += b;
        let edge = if i == last {
            total
        } else {
            ((total as f64 * cumulative + EDGE_SLACK).floor() as usize).clamp(assigned, total)
        };
        sizes.push(edge - assigned);
        assigned = edge;
    }
    Ok(sizes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{FifoLayer, LruLayer};

    #[test]
    fn boundaries_validation() {
        assert!(layer_sizes_from_boundaries(10, &[]).is_err());
        assert!(layer_sizes_from_boundaries(10, &[-0.5, 1.5]).is_err());
        assert!(layer_sizes_from_boundaries(10, &[f64::NAN, 1.0]).is_err());
        assert!(layer_sizes_from_boundaries(10, &[0.4, 0.4]).is_err());
        assert_eq!(layer_sizes_from_boundaries(0, &[0.5, 0.5]).unwrap(), vec![0, 0]);
        assert_eq!(layer_sizes_from_boundaries(7, &[1.0]).unwrap(), vec![7]);
    }

    #[test]
    fn sizes_always_sum_to_total() {
        for total in [0usize, 1, 7, 99, 1000, 12_345] {
            for boundaries in [
                vec![0.5, 0.5],
                vec![0.1, 0.2, 0.7],
                vec![0.25; 4],
                vec![0.0, 1.0, 0.0],
            ] {
                let sizes = layer_sizes_from_boundaries(total, &boundaries).unwrap();
                assert_eq!(sizes.iter().sum::<usize>(), total);
                assert_eq!(sizes.len(), boundaries.len());
            }
        }
    }

    #[test]
    fn dynamic_requires_two_layers() {
        let err = ServerBuilder::new(1, 10)
            .boundaries(&[1.0])
            .dynamic_boundaries(true)
            .build()
            .unwrap_err();
        assert!(err.message().contains("at least 2"));

        let err = ServerBuilder::new(1, 0)
            .dynamic_boundaries(true)
            .build_with_layers(vec![Box::new(LruLayer::new(5, KeyKind::Int64))])
            .unwrap_err();
        assert!(err.message().contains("at least 2"));
    }

    #[test]
    fn adopted_layers_define_sizes() {
        let server = ServerBuilder::new(4, 0)
            .build_with_layers(vec![
                Box::new(LruLayer::new(3, KeyKind::Text)),
                Box::new(FifoLayer::new(9, KeyKind::Text)),
            ])
            .unwrap();
        assert_eq!(server.cache_size(), 12);
        assert_eq!(server.layer_sizes(), &[3, 9]);
        assert_eq!(server.key_kind(), KeyKind::Text);
    }

    #[test]
    fn adopted_layers_must_share_key_kind() {
        let err = ServerBuilder::new(4, 0)
            .build_with_layers(vec![
                Box::new(LruLayer::new(3, KeyKind::Text)),
                Box::new(LruLayer::new(3, KeyKind::Int64)),
            ])
            .unwrap_err();
        assert!(err.message().contains("layer 2"));

        assert!(ServerBuilder::new(4, 0).build_with_layers(Vec::new()).is_err());
    }

    #[test]
    fn builder_debug_names_fields() {
        let dbg = format!("{:?}", ServerBuilder::new(9, 50).name("edge-9"));
        assert!(dbg.contains("edge-9"));
        assert!(dbg.contains("total_size: 50"));
    }
}
