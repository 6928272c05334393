//! First-in, first-out cache layer.
//!
//! Hits leave the admission order untouched, so the oldest admitted key is
//! always evicted first regardless of how often it is requested.

use crate::key::{CacheKey, CacheRequest, KeyKind};
use crate::policy::queue::QueueCore;
use crate::traits::CacheLayer;

/// FIFO eviction engine.
#[derive(Debug)]
pub struct FifoLayer {
    core: QueueCore,
}

impl FifoLayer {
    pub fn new(size: usize, key_kind: KeyKind) -> Self {
        Self::with_block_size(size, key_kind, None)
    }

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

    /// Resident keys from newest to oldest admission.
    pub fn keys(&self) -> impl Iterator<Item = &CacheKey> {
        self.core.keys()
    }
}

impl CacheLayer for FifoLayer {
    fn add_element(&mut self, request: &CacheRequest) -> bool {
        if self.core.lookup(request.key()).is_some() {
            return true;
        }
        self.core.admit(request.key());
        false
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
        "fifo"
    }
}
