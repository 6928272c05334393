//! Cache node assembly, request routing, and statistics.

pub mod config;
pub mod node;
pub mod stats;

pub use config::{layer_sizes_from_boundaries, ServerBuilder};
pub use node::CacheServer;
pub use stats::{FleetStats, LayerCounters, ServerStats};
