//! Least-recently-used cache layer.
//!
//! A hit moves the key to the front of the recency list; a miss admits it at
//! the front and evicts from the back while the layer is over its limit.
//!
//! ```text
//!   add_element(k):
//!     k resident?  ──yes──►  move_to_front(k)          → hit
//!          │
//!          no
//!          ▼
//!     push_front(k); evict tail (≤ 2) while len > size → miss
//! ```

use crate::key::{CacheKey, CacheRequest, KeyKind};
use crate::policy::queue::QueueCore;
use crate::traits::CacheLayer;

/// LRU eviction engine.
///
/// # Example
///
/// ```
/// use edgecache::key::{CacheRequest, KeyKind};
/// use edgecache::policy::lru::LruLayer;
/// use edgecache::traits::CacheLayer;
///
/// let mut layer = LruLayer::new(2, KeyKind::Int64);
/// assert!(!layer.add_element(&CacheRequest::new(1u64)));
/// assert!(!layer.add_element(&CacheRequest::new(2u64)));
/// assert!(layer.add_element(&CacheRequest::new(1u64)));
///
/// // 2 is least recently used and goes first
/// layer.add_element(&CacheRequest::new(3u64));
/// assert!(!layer.contains(&2u64.into()));
/// ```
#[derive(Debug)]
pub struct LruLayer {
    core: QueueCore,
}

impl LruLayer {
    pub fn new(size: usize, key_kind: KeyKind) -> Self {
        Self::with_block_size(size, key_kind, None)
    }

    /// Creates a layer that records the trace's block size.
    pub fn with_block_size(size: usize, key_kind: KeyKind, block_size: Option<u64>) -> Self {
        Self {
            core: QueueCore::new(size, key_kind, block_size),
        }
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.core.contains(key)
    }

    pub fn block_size(&self) -> Option<u64> {
        self.core.block_size()
    }

    /// Resident keys from most to least recently used.
    pub fn keys(&self) -> impl Iterator<Item = &CacheKey> {
        self.core.keys()
    }

    pub fn clear(&mut self) {
        self.core.clear();
    }
}

impl CacheLayer for LruLayer {
    fn add_element(&mut self, request: &CacheRequest) -> bool {
        match self.core.lookup(request.key()) {
            Some(id) => {
                self.core.promote(id);
                true
            },
            None => {
                self.core.admit(request.key());
                false
            },
        }
    }

    fn size(&self) -> usize {
        self.core.size()
    }

    fn set_size(&mut self, size: usize) {
        self.core.set_size(size);
    }

    fn len(&self) -> usize {
        self.core.len()
    }

    fn key_kind(&self) -> KeyKind {
        self.core.key_kind()
    }

    fn name(&self) -> &'static str {
        "lru"
    }
}
