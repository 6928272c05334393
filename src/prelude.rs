pub use crate::builder::{EvictionAlgorithm, LayerBuilder};
pub use crate::ds::{LinearRecencyIndex, RecencyIndex, SplayRecencyIndex};
pub use crate::error::{ConfigError, InvariantError, SimError, UnsupportedError};
pub use crate::key::{CacheKey, CacheRequest, KeyKind};
pub use crate::policy::{FifoLayer, LruLayer};
pub use crate::profiler::{
    Advice, BoundaryAdvisor, BoundaryDecision, CacheProfiler, LatencyProfile, ProfilerConfig,
    ReuseDistanceTracker, ReuseHistogram, ReuseOutcome,
};
pub use crate::server::{CacheServer, FleetStats, ServerBuilder, ServerStats};
pub use crate::traits::{CacheLayer, StatsSink};
