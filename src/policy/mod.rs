//! Built-in eviction engines for cache layers.
//!
//! Both engines keep resident keys in an [`IntrusiveList`](crate::ds::IntrusiveList)
//! with an `FxHashMap` from key to list node, and share the lazy-shrink
//! admission path in [`queue`].

pub mod fifo;
pub mod lru;
mod queue;

pub use fifo::FifoLayer;
pub use lru::LruLayer;
