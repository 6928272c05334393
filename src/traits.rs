//! # Collaborator Traits
//!
//! The server is assembled from two pluggable collaborators:
//!
//! ```text
//!   ┌───────────────────────────────────────────┐
//!   │              CacheServer                  │
//!   │                                           │
//!   │  layers: Vec<Box<dyn CacheLayer>>  ───────┼──► CacheLayer (one per tier)
//!   │  sink:   Option<Arc<dyn StatsSink>> ──────┼──► StatsSink  (shared, fleet-wide)
//!   └───────────────────────────────────────────┘
//! ```
//!
//! | Trait        | Receiver | Purpose                                       |
//! |--------------|----------|-----------------------------------------------|
//! | `CacheLayer` | `&mut`   | Eviction engine answering hit/miss per insert |
//! | `StatsSink`  | `&self`  | Aggregate hit/miss collector across servers   |
//!
//! ## Lazy resizing
//!
//! `CacheLayer::set_size` only lowers or raises the *enforced limit*. An
//! engine must not evict synchronously when the limit drops; subsequent
//! insertions evict down toward the new limit. This keeps boundary shifts
//! and `set_size` off the request hot path.
//!
//! ## Ownership
//!
//! A server owns its engines exclusively (`Box<dyn CacheLayer>`); dropping
//! the server drops every engine. Stats sinks are shared (`Arc`) because one
//! collector typically observes a whole fleet.

use std::fmt::Debug;

use crate::key::{CacheRequest, KeyKind};

/// Eviction engine backing one cache layer.
///
/// # Example
///
/// ```
/// use edgecache::key::{CacheRequest, KeyKind};
/// use edgecache::policy::lru::LruLayer;
/// use edgecache::traits::CacheLayer;
///
/// fn replay<L: CacheLayer + ?Sized>(layer: &mut L, keys: &[u64]) -> usize {
///     keys.iter()
///         .filter(|&&k| layer.add_element(&CacheRequest::new(k)))
///         .count()
/// }
///
/// let mut layer = LruLayer::new(2, KeyKind::Int64);
/// assert_eq!(replay(&mut layer, &[1, 2, 1, 3, 2]), 1);
/// ```
pub trait CacheLayer: Debug + Send {
    /// Inserts `request`, returning `true` on a hit.
    ///
    /// On a miss the request is admitted; if the engine is over its limit it
    /// evicts incrementally toward it.
    fn add_element(&mut self, request: &CacheRequest) -> bool;

    /// Returns the enforced capacity limit.
    fn size(&self) -> usize;

    /// Changes the enforced limit without evicting.
    fn set_size(&mut self, size: usize);

    /// Returns the number of resident entries.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the key kind this engine was built for.
    fn key_kind(&self) -> KeyKind;

    /// Short policy name, used in logs.
    fn name(&self) -> &'static str;
}

/// Aggregate statistics collaborator.
///
/// Layer ids are 1-based, matching [`CacheServer::add_request`](crate::server::CacheServer::add_request).
pub trait StatsSink: Send + Sync {
    fn record(&self, layer_id: usize, hit: bool);
}
