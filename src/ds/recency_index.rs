//! Order-statistics indexes over keys ranked by recency.
//!
//! Rank 0 is the most recently inserted key; the rank of a key is the number
//! of distinct keys inserted after it. The reuse-distance tracker only needs
//! three operations, captured by [`RecencyIndex`]:
//!
//! - `insert_most_recent(key)`: place `key` at rank 0, pushing the rest down
//! - `remove(key)`: drop `key`, closing the gap
//! - `rank(key)`: count of keys more recent than `key`
//!
//! ## Implementations
//!
//! | Type                    | insert | remove       | rank         |
//! |-------------------------|--------|--------------|--------------|
//! | [`SplayRecencyIndex`]   | O(1)   | O(log n) am. | O(log n) am. |
//! | [`LinearRecencyIndex`]  | O(1)   | O(n)         | O(n)         |
//!
//! `SplayRecencyIndex` keeps one node per live key, ordered by a private
//! access stamp, with subtree sizes for rank queries:
//!
//! ```text
//!              [s=9 | size 5]          rank(key@s=4) after splaying it up:
//!              /                         = size(right subtree)
//!       [s=7 | 4]                        = number of stamps > 4
//!       /      \
//!   [s=4 | 2]  [s=8 | 1]
//!     /
//!  [s=1 | 1]
//! ```
//!
//! A fresh insert always carries the largest stamp, so it becomes the new
//! root with the old tree as its left child. Nothing shifts structurally;
//! every other key's rank grows by one implicitly.

use std::collections::VecDeque;
use std::hash::Hash;

use rustc_hash::FxHashMap;

use crate::ds::slot_arena::{SlotArena, SlotId};

/// Recency-ordered set of distinct keys with rank queries.
pub trait RecencyIndex<K> {
    /// Inserts `key` at rank 0. If `key` is already present it is moved.
    fn insert_most_recent(&mut self, key: K);

    /// Removes `key`; returns `false` if it was not present.
    fn remove(&mut self, key: &K) -> bool;

    /// Returns the number of keys more recent than `key`, or `None` if absent.
    fn rank(&mut self, key: &K) -> Option<usize>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes every key.
    fn clear(&mut self);
}

// ---------------------------------------------------------------------------
// SplayRecencyIndex
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct SplayNode {
    stamp: u64,
    size: usize,
    parent: Option<SlotId>,
    left: Option<SlotId>,
    right: Option<SlotId>,
}

/// Self-adjusting splay tree over access stamps.
///
/// Nodes are stored in a [`SlotArena`] and linked by [`SlotId`], and a key →
/// node map gives direct access to a key's node for splaying.
///
/// # Example
///
/// ```
/// use edgecache::ds::{RecencyIndex, SplayRecencyIndex};
///
/// let mut index = SplayRecencyIndex::new();
/// index.insert_most_recent("x");
/// index.insert_most_recent("y");
/// index.insert_most_recent("z");
///
/// assert_eq!(index.rank(&"z"), Some(0));
/// assert_eq!(index.rank(&"x"), Some(2));
///
/// index.remove(&"y");
/// assert_eq!(index.rank(&"x"), Some(1));
/// ```
#[derive(Debug)]
pub struct SplayRecencyIndex<K> {
    nodes: SlotArena<SplayNode>,
    lookup: FxHashMap<K, SlotId>,
    root: Option<SlotId>,
    next_stamp: u64,
}

impl<K> SplayRecencyIndex<K>
where
    K: Eq + Hash,
{
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an index with room for `capacity` keys.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: SlotArena::with_capacity(capacity),
            lookup: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            root: None,
            next_stamp: 0,
        }
    }

    #[inline]
    fn size_of(&self, id: Option<SlotId>) -> usize {
        id.map_or(0, |id| self.nodes[id].size)
    }

    #[inline]
    fn update_size(&mut self, id: SlotId) {
        let (left, right) = (self.nodes[id].left, self.nodes[id].right);
        self.nodes[id].size = 1 + self.size_of(left) + self.size_of(right);
    }

    #[inline]
    fn is_left_child(&self, id: SlotId, parent: SlotId) -> bool {
        self.nodes[parent].left == Some(id)
    }

    /// Rotates `x` above its parent, keeping in-order stamps and sizes.
    fn rotate(&mut self, x: SlotId) {
        let Some(p) = self.nodes[x].parent else {
            return;
        };
        let grand = self.nodes[p].parent;

        if self.is_left_child(x, p) {
            let moved = self.nodes[x].right;
            self.nodes[p].left = moved;
            if let Some(m) = moved {
                self.nodes[m].parent = Some(p);
            }
            self.nodes[x].right = Some(p);
        } else {
            let moved = self.nodes[x].left;
            self.nodes[p].right = moved;
            if let Some(m) = moved {
                self.nodes[m].parent = Some(p);
            }
            self.nodes[x].left = Some(p);
        }
        self.nodes[p].parent = Some(x);
        self.nodes[x].parent = grand;

        match grand {
            Some(g) if self.nodes[g].left == Some(p) => self.nodes[g].left = Some(x),
            Some(g) => self.nodes[g].right = Some(x),
            None => self.root = Some(x),
        }

        self.update_size(p);
        self.update_size(x);
    }

    /// Splays `x` to the root of the tree it belongs to.
    fn splay(&mut self, x: SlotId) {
        while let Some(p) = self.nodes[x].parent {
            match self.nodes[p].parent {
                None => self.rotate(x),
                Some(g) => {
                    let zig_zig = self.is_left_child(x, p) == self.is_left_child(p, g);
                    if zig_zig {
                        self.rotate(p);
                        self.rotate(x);
                    } else {
                        self.rotate(x);
                        self.rotate(x);
                    }
                },
            }
        }
        self.root = Some(x);
    }

    fn rightmost(&self, mut id: SlotId) -> SlotId {
        while let Some(right) = self.nodes[id].right {
            id = right;
        }
        id
    }

    fn unlink(&mut self, id: SlotId) {
        self.splay(id);
        let left = self.nodes[id].left;
        let right = self.nodes[id].right;
        self.nodes.remove(id);

        if let Some(r) = right {
            self.nodes[r].parent = None;
        }
        match left {
            None => self.root = right,
            Some(l) => {
                self.nodes[l].parent = None;
                self.root = Some(l);
                let max = self.rightmost(l);
                self.splay(max);
                self.nodes[max].right = right;
                if let Some(r) = right {
                    self.nodes[r].parent = Some(max);
                }
                self.update_size(max);
            },
        }
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        fn walk<K>(index: &SplayRecencyIndex<K>, id: SlotId, lo: Option<u64>, hi: Option<u64>) -> usize {
            let node = &index.nodes[id];
            if let Some(lo) = lo {
                assert!(node.stamp > lo);
            }
            if let Some(hi) = hi {
                assert!(node.stamp < hi);
            }
            let mut size = 1;
            if let Some(l) = node.left {
                assert_eq!(index.nodes[l].parent, Some(id));
                size += walk(index, l, lo, Some(node.stamp));
            }
            if let Some(r) = node.right {
                assert_eq!(index.nodes[r].parent, Some(id));
                size += walk(index, r, Some(node.stamp), hi);
            }
            assert_eq!(node.size, size);
            size
        }

        match self.root {
            None => assert_eq!(self.nodes.len(), 0),
            Some(root) => {
                assert_eq!(self.nodes[root].parent, None);
                assert_eq!(walk(self, root, None, None), self.nodes.len());
            },
        }
        assert_eq!(self.lookup.len(), self.nodes.len());
    }
}

impl<K> RecencyIndex<K> for SplayRecencyIndex<K>
where
    K: Eq + Hash,
{
    fn insert_most_recent(&mut self, key: K) {
        if let Some(old) = self.lookup.remove(&key) {
            self.unlink(old);
        }
        let stamp = self.next_stamp;
        self.next_stamp += 1;

        let left = self.root;
        let id = self.nodes.insert(SplayNode {
            stamp,
            size: 1 + self.size_of(left),
            parent: None,
            left,
            right: None,
        });
        if let Some(l) = left {
            self.nodes[l].parent = Some(id);
        }
        self.root = Some(id);
        self.lookup.insert(key, id);
    }

    fn remove(&mut self, key: &K) -> bool {
        match self.lookup.remove(key) {
            Some(id) => {
                self.unlink(id);
                true
            },
            None => false,
        }
    }

    fn rank(&mut self, key: &K) -> Option<usize> {
        let id = *self.lookup.get(key)?;
        self.splay(id);
        Some(self.size_of(self.nodes[id].right))
    }

    fn len(&self) -> usize {
        self.lookup.len()
    }

    fn clear(&mut self) {
        self.nodes.clear();
        self.lookup.clear();
        self.root = None;
        self.next_stamp = 0;
    }
}

impl<K> Default for SplayRecencyIndex<K>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// LinearRecencyIndex
// ---------------------------------------------------------------------------

/// Reference index with linear rank computation.
///
/// Useful as an oracle in tests and as a baseline in benchmarks. Not
/// intended for production traces.
#[derive(Debug, Default)]
pub struct LinearRecencyIndex<K> {
    order: VecDeque<K>,
}

impl<K: Eq> LinearRecencyIndex<K> {
    pub fn new() -> Self {
        Self {
            order: VecDeque::new(),
        }
    }

    fn position(&self, key: &K) -> Option<usize> {
        self.order.iter().position(|k| k == key)
    }
}

impl<K: Eq> RecencyIndex<K> for LinearRecencyIndex<K> {
    fn insert_most_recent(&mut self, key: K) {
        if let Some(pos) = self.position(&key) {
            self.order.remove(pos);
        }
        self.order.push_front(key);
    }

    fn remove(&mut self, key: &K) -> bool {
        match self.position(key) {
            Some(pos) => self.order.remove(pos).is_some(),
            None => false,
        }
    }

    fn rank(&mut self, key: &K) -> Option<usize> {
        self.position(key)
    }

    fn len(&self) -> usize {
        self.order.len()
    }

    fn clear(&mut self) {
        self.order.clear();
    }
}
