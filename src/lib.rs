//! edgecache: a multi-layer edge cache node simulator with online
//! reuse-distance profiling and dynamic layer boundaries.
//!
//! A [`CacheServer`](server::CacheServer) owns one eviction engine per layer
//! and serves requests the driver has already routed to a layer. A dynamic
//! server also profiles every request through a
//! [`CacheProfiler`](profiler::CacheProfiler) and moves capacity between
//! layers 1 and 2 when the observed reuse distances favour it.

pub mod builder;
pub mod ds;
pub mod error;
pub mod key;
pub mod policy;
pub mod prelude;
pub mod profiler;
pub mod server;
pub mod traits;
