//! Shared admission/eviction core for list-ordered engines.

use rustc_hash::FxHashMap;

use crate::ds::{IntrusiveList, SlotId};
use crate::key::{CacheKey, KeyKind};

/// Upper bound on evictions per admission. Two lets an engine whose limit
/// was lowered shrink by one entry per miss instead of all at once.
pub(crate) const MAX_EVICTIONS_PER_ADMIT: usize = 2;

#[derive(Debug)]
pub(crate) struct QueueCore {
    order: IntrusiveList<CacheKey>,
    index: FxHashMap<CacheKey, SlotId>,
    size: usize,
    key_kind: KeyKind,
    block_size: Option<u64>,
}

impl QueueCore {
    pub(crate) fn new(size: usize, key_kind: KeyKind, block_size: Option<u64>) -> Self {
        Self {
            order: IntrusiveList::with_capacity(size),
            index: FxHashMap::with_capacity_and_hasher(size, Default::default()),
            size,
            key_kind,
            block_size,
        }
    }

    /// Returns the node for `key` if resident.
    #[inline]
    pub(crate) fn lookup(&self, key: &CacheKey) -> Option<SlotId> {
        self.index.get(key).copied()
    }

    #[inline]
    pub(crate) fn promote(&mut self, id: SlotId) {
        self.order.move_to_front(id);
    }

    /// Admits `key` at the front, then evicts from the back while over limit.
    pub(crate) fn admit(&mut self, key: &CacheKey) {
        if self.size == 0 {
            self.evict_toward_limit();
            return;
        }
        let id = self.order.push_front(key.clone());
        self.index.insert(key.clone(), id);
        self.evict_toward_limit();
    }

    fn evict_toward_limit(&mut self) {
        let mut evicted = 0;
        while self.order.len() > self.size && evicted < MAX_EVICTIONS_PER_ADMIT {
            match self.order.pop_back() {
                Some(victim) => {
                    self.index.remove(&victim);
                    evicted += 1;
                },
                None => break,
            }
        }
    }

    #[inline]
    pub(crate) fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub(crate) fn set_size(&mut self, size: usize) {
        self.size = size;
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.index.len()
    }

    #[inline]
    pub(crate) fn key_kind(&self) -> KeyKind {
        self.key_kind
    }

    #[inline]
    pub(crate) fn block_size(&self) -> Option<u64> {
        self.block_size
    }

    pub(crate) fn contains(&self, key: &CacheKey) -> bool {
        self.index.contains_key(key)
    }

    /// Resident keys, most recently admitted (or promoted) first.
    pub(crate) fn keys(&self) -> impl Iterator<Item = &CacheKey> {
        self.order.iter()
    }

    pub(crate) fn clear(&mut self) {
        self.order.clear();
        self.index.clear();
    }
}
