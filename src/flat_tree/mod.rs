// Copyright (c) 2024-present, grid-index
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! A 1-D key axis partitioned into contiguous value-carrying segments.
//!
//! The tree "paints" half-open ranges `[a, b)` with values; adjacent
//! segments with equal values coalesce into one. Leaves live in a slab
//! arena and form a doubly-linked chain between two sentinels (`min` and
//! `max`). An optional balanced summary tree, built on demand, serves
//! O(log n) point lookups; it is invalidated by structural mutation.

use std::fmt::Debug;
use std::ops::{Add, Sub};

/// Slab index marking "no link".
const NIL: usize = usize::MAX;

/// Key bounds for the flat segment tree.
pub trait FstKey:
    Copy + Ord + Debug + Default + Add<Output = Self> + Sub<Output = Self>
{
}

impl<T> FstKey for T where T: Copy + Ord + Debug + Default + Add<Output = T> + Sub<Output = T> {}

#[derive(Clone, Debug)]
struct Leaf<K, V> {
    key: K,
    value: V,
    prev: usize,
    next: usize,
}

#[derive(Clone, Copy, Debug)]
enum Child {
    Leaf(usize),
    NonLeaf(usize),
}

#[derive(Clone, Debug)]
struct NonLeaf<K> {
    /// Low key of the span (inclusive)
    low: K,

    /// High key of the span (exclusive)
    high: K,

    left: Child,
    right: Option<Child>,
}

/// One segment as returned by the search operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SegmentSpan<K, V> {
    /// First key of the segment (inclusive)
    pub start: K,

    /// End key of the segment (exclusive)
    pub end: K,

    /// The segment's value
    pub value: V,
}

/// A painted 1-D segmentation of the key axis `[min, max)`.
///
/// # Example
///
/// ```
/// use grid_index::FlatSegmentTree;
///
/// let mut db = FlatSegmentTree::new(0, 100, -1);
/// db.insert_segment(10, 20, 5);
/// db.build_tree();
///
/// let hit = db.search_tree(15).expect("painted");
/// assert_eq!((5, 10, 20), (hit.value, hit.start, hit.end));
/// ```
#[derive(Clone, Debug)]
pub struct FlatSegmentTree<K, V> {
    leaves: Vec<Leaf<K, V>>,
    free: Vec<usize>,

    /// Left sentinel slab slot (key = min)
    left: usize,

    /// Right sentinel slab slot (key = max); its value is never consulted
    right: usize,

    init: V,
    valid_tree: bool,
    nonleaves: Vec<NonLeaf<K>>,
    root: Option<usize>,
}

impl<K: FstKey, V: Clone + PartialEq + Debug> FlatSegmentTree<K, V> {
    /// Creates a tree whose entire span `[min, max)` carries `init`.
    #[must_use]
    pub fn new(min: K, max: K, init: V) -> Self {
        debug_assert!(min < max, "degenerate key span");

        let leaves = vec![
            Leaf {
                key: min,
                value: init.clone(),
                prev: NIL,
                next: 1,
            },
            Leaf {
                key: max,
                value: init.clone(),
                prev: 0,
                next: NIL,
            },
        ];

        Self {
            leaves,
            free: Vec::new(),
            left: 0,
            right: 1,
            init,
            valid_tree: false,
            nonleaves: Vec::new(),
            root: None,
        }
    }

    /// Lower bound of the key span (inclusive).
    #[must_use]
    pub fn min_key(&self) -> K {
        self.leaves[self.left].key
    }

    /// Upper bound of the key span (exclusive).
    #[must_use]
    pub fn max_key(&self) -> K {
        self.leaves[self.right].key
    }

    /// The base value segments revert to.
    #[must_use]
    pub fn init_value(&self) -> &V {
        &self.init
    }

    /// Whether the summary tree reflects the current leaf chain.
    #[must_use]
    pub fn is_tree_valid(&self) -> bool {
        self.valid_tree
    }

    /// Number of leaves in the chain, sentinels included.
    #[must_use]
    pub fn leaf_count(&self) -> usize {
        self.iter().count()
    }

    /// Paints `[a, b)` with `value`.
    ///
    /// The range is clamped to `[min, max)`; an inverted or non-overlapping
    /// range is a no-op. Neighbouring segments with equal values coalesce.
    /// Invalidates the summary tree.
    pub fn insert_segment(&mut self, a: K, b: K, value: V) {
        let min = self.min_key();
        let max = self.max_key();

        if b < min || a > max {
            return;
        }

        let a = a.max(min);
        let b = b.min(max);

        if a >= b {
            return;
        }

        let start_pos = self.insertion_pos(a, self.left);
        let end_pos = self.insertion_pos(b, start_pos);

        let new_start;
        let mut old_value;

        if self.leaves[start_pos].key == a {
            let prev = self.leaves[start_pos].prev;

            if start_pos != self.left && self.leaves[prev].value == value {
                // Extend the previous segment over the reused boundary.
                old_value = self.leaves[start_pos].value.clone();
                new_start = prev;
            } else {
                old_value = self.leaves[start_pos].value.clone();
                self.leaves[start_pos].value = value.clone();
                new_start = start_pos;
            }
        } else {
            let prev = self.leaves[start_pos].prev;

            if self.leaves[prev].value == value {
                old_value = self.leaves[prev].value.clone();
                new_start = prev;
            } else {
                old_value = self.leaves[prev].value.clone();
                let node = self.alloc(a, value.clone());
                self.link(prev, node);
                self.link(node, start_pos);
                new_start = node;
            }
        }

        // Detach every leaf strictly between the new start and the end
        // position, tracking the value in effect just before the end.
        let mut cur = self.leaves[new_start].next;

        while cur != end_pos {
            old_value = self.leaves[cur].value.clone();
            let next = self.leaves[cur].next;
            self.free_leaf(cur);
            cur = next;
        }

        if self.leaves[end_pos].key == b {
            if end_pos != self.right && self.leaves[end_pos].value == value {
                // The painted run continues into the next segment.
                let after = self.leaves[end_pos].next;
                self.free_leaf(end_pos);
                self.link(new_start, after);
            } else {
                self.link(new_start, end_pos);
            }
        } else if old_value == value {
            self.link(new_start, end_pos);
        } else {
            let node = self.alloc(b, old_value);
            self.link(new_start, node);
            self.link(node, end_pos);
        }

        self.valid_tree = false;
    }

    /// Excises `[a, b)` from the key axis, shifting all segments after it
    /// to the left and appending an `init`-valued segment of the same
    /// length at the right end.
    ///
    /// Both keys must lie within `[min, max]`; anything else is a no-op.
    pub fn shift_segment_left(&mut self, a: K, b: K) {
        if a >= b {
            return;
        }

        let min = self.min_key();
        let max = self.max_key();

        if a < min || b < min || a > max || b > max {
            return;
        }

        let node_pos = if a == min {
            self.left
        } else {
            // Skip the left sentinel; its key never moves.
            self.insertion_pos(a, self.leaves[self.left].next)
        };

        let size = b - a;

        if node_pos == self.right {
            // The hole begins after the last segment boundary.
            if max <= b {
                self.append_new_segment(a);
            } else {
                self.append_new_segment(max - size);
            }
            return;
        }

        if b < self.leaves[node_pos].key {
            // The hole overlaps no boundary; only the keys after it move.
            self.shift_keys_left(node_pos, size);
            self.append_new_segment(max - size);
            self.valid_tree = false;
            return;
        }

        // Snap the first boundary inside the hole to its start, merge every
        // following boundary that falls inside, then shift the rest.
        self.leaves[node_pos].key = a;
        let start_pos = node_pos;
        let mut last_value = self.leaves[start_pos].value.clone();
        let mut cur = self.leaves[node_pos].next;

        while cur != self.right && self.leaves[cur].key <= b {
            last_value = self.leaves[cur].value.clone();
            let next = self.leaves[cur].next;
            self.free_leaf(cur);
            cur = next;
        }

        self.leaves[start_pos].value = last_value;
        self.link(start_pos, cur);

        let prev = self.leaves[start_pos].prev;

        if prev != NIL && self.leaves[prev].value == self.leaves[start_pos].value {
            // Two consecutive segments with identical value; drop the
            // redundant boundary.
            self.link(prev, cur);
            self.free_leaf(start_pos);
        }

        self.shift_keys_left(cur, size);
        self.valid_tree = false;

        self.append_new_segment(max - size);
    }

    /// Shifts all segments at or after `pos` to the right by `size`.
    ///
    /// Segments pushed past `max` are dropped. When `pos == min` and the
    /// leftmost segment carries a non-`init` value, a new boundary at
    /// `pos + size` preserves that value and the vacated range becomes
    /// `init`. `skip_start_node` omits a leaf lying exactly at `pos` from
    /// the shift.
    pub fn shift_segment_right(&mut self, pos: K, size: K, skip_start_node: bool) {
        if size <= K::default() {
            return;
        }

        let min = self.min_key();
        let max = self.max_key();

        if pos < min || max <= pos {
            return;
        }

        if pos == min {
            let first = self.leaves[self.left].next;
            self.shift_keys_right(first, size);

            if self.leaves[self.left].value != self.init {
                let moved = self.leaves[self.left].value.clone();
                self.leaves[self.left].value = self.init.clone();

                if pos + size < max {
                    let node = self.alloc(pos + size, moved);
                    let after = self.leaves[self.left].next;
                    self.link(self.left, node);
                    self.link(node, after);
                }
            }

            self.valid_tree = false;
            return;
        }

        let mut cur = self.insertion_pos(pos, self.leaves[self.left].next);

        if skip_start_node && self.leaves[cur].key == pos {
            cur = self.leaves[cur].next;
        }

        if cur == NIL {
            return;
        }

        self.shift_keys_right(cur, size);
        self.valid_tree = false;
    }

    /// O(n) linear-scan lookup of the segment containing `key`.
    ///
    /// Returns `None` for keys outside `[min, max)`.
    #[must_use]
    pub fn search(&self, key: K) -> Option<SegmentSpan<K, V>> {
        if key < self.min_key() || self.max_key() <= key {
            return None;
        }

        let pos = self.insertion_pos(key, self.left);
        let leaf = &self.leaves[pos];

        if leaf.key == key {
            return Some(SegmentSpan {
                start: leaf.key,
                end: self.leaves[leaf.next].key,
                value: leaf.value.clone(),
            });
        }

        if leaf.prev != NIL && self.leaves[leaf.prev].key < key {
            let prev = &self.leaves[leaf.prev];

            return Some(SegmentSpan {
                start: prev.key,
                end: leaf.key,
                value: prev.value.clone(),
            });
        }

        None
    }

    /// O(log n) lookup via the summary tree.
    ///
    /// Returns `None` for keys outside `[min, max)` and whenever the tree
    /// has not been built or has been invalidated since.
    #[must_use]
    pub fn search_tree(&self, key: K) -> Option<SegmentSpan<K, V>> {
        if !self.valid_tree {
            return None;
        }

        let root = self.root?;

        if key < self.min_key() || self.max_key() <= key {
            return None;
        }

        // Descend through the last non-leaf layer.
        let mut cur = root;

        loop {
            let node = &self.nonleaves[cur];

            match node.left {
                Child::Leaf(_) => break,
                Child::NonLeaf(left) => {
                    let child = &self.nonleaves[left];

                    if child.low <= key && key < child.high {
                        cur = left;
                        continue;
                    }
                }
            }

            match node.right {
                Some(Child::NonLeaf(right)) => {
                    let child = &self.nonleaves[right];

                    if child.low <= key && key < child.high {
                        cur = right;
                        continue;
                    }

                    return None;
                }
                _ => return None,
            }
        }

        let node = &self.nonleaves[cur];

        let Child::Leaf(left_leaf) = node.left else {
            return None;
        };

        let key1 = self.leaves[left_leaf].key;

        let hit = match node.right {
            Some(Child::Leaf(right_leaf)) => {
                let key2 = self.leaves[right_leaf].key;

                if key1 <= key && key < key2 {
                    left_leaf
                } else if key2 <= key && key < node.high {
                    right_leaf
                } else {
                    return None;
                }
            }
            _ => {
                if key1 <= key && key < node.high {
                    left_leaf
                } else {
                    return None;
                }
            }
        };

        let leaf = &self.leaves[hit];
        let end = if leaf.next == NIL {
            self.max_key()
        } else {
            self.leaves[leaf.next].key
        };

        Some(SegmentSpan {
            start: leaf.key,
            end,
            value: leaf.value.clone(),
        })
    }

    /// Builds the balanced summary tree over the leaf chain.
    pub fn build_tree(&mut self) {
        self.nonleaves.clear();

        // First layer: pair up the leaves.
        let chain: Vec<usize> = self.chain_indices();
        let mut level: Vec<usize> = Vec::with_capacity(chain.len().div_ceil(2));

        for pair in chain.chunks(2) {
            let left_leaf = pair[0];
            let low = self.leaves[left_leaf].key;

            let (right, high) = match pair.get(1) {
                Some(&right_leaf) => {
                    let next = self.leaves[right_leaf].next;
                    let high = if next == NIL {
                        self.leaves[right_leaf].key
                    } else {
                        self.leaves[next].key
                    };

                    (Some(Child::Leaf(right_leaf)), high)
                }
                None => {
                    let next = self.leaves[left_leaf].next;
                    let high = if next == NIL {
                        self.leaves[left_leaf].key
                    } else {
                        self.leaves[next].key
                    };

                    (None, high)
                }
            };

            self.nonleaves.push(NonLeaf {
                low,
                high,
                left: Child::Leaf(left_leaf),
                right,
            });
            level.push(self.nonleaves.len() - 1);
        }

        // Upper layers: pair up the non-leaf summaries.
        while level.len() > 1 {
            let mut upper = Vec::with_capacity(level.len().div_ceil(2));

            for pair in level.chunks(2) {
                let left = pair[0];
                let low = self.nonleaves[left].low;

                let (right, high) = match pair.get(1) {
                    Some(&right_idx) => (
                        Some(Child::NonLeaf(right_idx)),
                        self.nonleaves[right_idx].high,
                    ),
                    None => (None, self.nonleaves[left].high),
                };

                self.nonleaves.push(NonLeaf {
                    low,
                    high,
                    left: Child::NonLeaf(left),
                    right,
                });
                upper.push(self.nonleaves.len() - 1);
            }

            level = upper;
        }

        self.root = level.first().copied();
        self.valid_tree = true;

        log::trace!(
            "summary tree rebuilt ({} non-leaf nodes)",
            self.nonleaves.len(),
        );
    }

    /// Iterates over the leaves as `(key, value)` pairs, left to right,
    /// right sentinel included (its value is meaningless).
    #[must_use]
    pub fn iter(&self) -> LeafIter<'_, K, V> {
        LeafIter {
            tree: self,
            cur: self.left,
        }
    }

    /// Iterates over the leaves right to left.
    #[must_use]
    pub fn riter(&self) -> RevLeafIter<'_, K, V> {
        RevLeafIter {
            tree: self,
            cur: self.right,
        }
    }

    fn chain_indices(&self) -> Vec<usize> {
        let mut indices = Vec::new();
        let mut cur = self.left;

        while cur != NIL {
            indices.push(cur);
            cur = self.leaves[cur].next;
        }

        indices
    }

    /// First leaf at or after `key`, scanning forward from `start`.
    fn insertion_pos(&self, key: K, start: usize) -> usize {
        let mut cur = start;

        while cur != NIL {
            if key <= self.leaves[cur].key {
                return cur;
            }

            cur = self.leaves[cur].next;
        }

        NIL
    }

    fn alloc(&mut self, key: K, value: V) -> usize {
        let leaf = Leaf {
            key,
            value,
            prev: NIL,
            next: NIL,
        };

        if let Some(idx) = self.free.pop() {
            self.leaves[idx] = leaf;
            idx
        } else {
            self.leaves.push(leaf);
            self.leaves.len() - 1
        }
    }

    fn free_leaf(&mut self, idx: usize) {
        debug_assert!(idx != self.left && idx != self.right);
        self.leaves[idx].prev = NIL;
        self.leaves[idx].next = NIL;
        self.free.push(idx);
    }

    fn link(&mut self, a: usize, b: usize) {
        self.leaves[a].next = b;
        self.leaves[b].prev = a;
    }

    /// Subtracts `size` from every key in `[from, right sentinel)`.
    fn shift_keys_left(&mut self, from: usize, size: K) {
        let mut cur = from;

        while cur != self.right {
            self.leaves[cur].key = self.leaves[cur].key - size;
            cur = self.leaves[cur].next;
        }
    }

    /// Adds `size` to every key in `[from, right sentinel)`, evicting any
    /// leaf pushed to or past the sentinel key.
    fn shift_keys_right(&mut self, from: usize, size: K) {
        let end_key = self.leaves[self.right].key;
        let mut cur = from;

        while cur != self.right {
            self.leaves[cur].key = self.leaves[cur].key + size;

            if self.leaves[cur].key < end_key {
                cur = self.leaves[cur].next;
                continue;
            }

            // This leaf and everything after it has been pushed out.
            let last = self.leaves[cur].prev;

            while cur != self.right {
                let next = self.leaves[cur].next;
                self.free_leaf(cur);
                cur = next;
            }

            self.link(last, self.right);
            return;
        }
    }

    /// Appends a segment of value `init` starting at `start_key`, right
    /// before the sentinel.
    fn append_new_segment(&mut self, start_key: K) {
        let last = self.leaves[self.right].prev;

        if self.leaves[last].key == start_key {
            self.leaves[last].value = self.init.clone();
            return;
        }

        debug_assert!(self.leaves[last].key < start_key);

        if self.leaves[last].value == self.init {
            // The existing tail segment already carries the value.
            return;
        }

        let node = self.alloc(start_key, self.init.clone());
        self.link(last, node);
        self.link(node, self.right);
        self.valid_tree = false;
    }
}

impl<K: FstKey, V: Clone + PartialEq + Debug> PartialEq for FlatSegmentTree<K, V> {
    /// Compares the leaf chains; the right sentinel's value is ignored.
    fn eq(&self, other: &Self) -> bool {
        let mut a = self.iter().peekable();
        let mut b = other.iter().peekable();

        loop {
            match (a.next(), b.next()) {
                (None, None) => return true,
                (Some((ka, va)), Some((kb, vb))) => {
                    if ka != kb {
                        return false;
                    }

                    // The last pair is the right sentinel; only its key counts.
                    let last = a.peek().is_none() && b.peek().is_none();

                    if !last && va != vb {
                        return false;
                    }
                }
                _ => return false,
            }
        }
    }
}

/// Forward leaf iterator; see [`FlatSegmentTree::iter`].
pub struct LeafIter<'a, K, V> {
    tree: &'a FlatSegmentTree<K, V>,
    cur: usize,
}

impl<'a, K: Copy, V> Iterator for LeafIter<'a, K, V> {
    type Item = (K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.cur == NIL {
            return None;
        }

        let leaf = &self.tree.leaves[self.cur];
        self.cur = leaf.next;
        Some((leaf.key, &leaf.value))
    }
}

/// Reverse leaf iterator; see [`FlatSegmentTree::riter`].
pub struct RevLeafIter<'a, K, V> {
    tree: &'a FlatSegmentTree<K, V>,
    cur: usize,
}

impl<'a, K: Copy, V> Iterator for RevLeafIter<'a, K, V> {
    type Item = (K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.cur == NIL {
            return None;
        }

        let leaf = &self.tree.leaves[self.cur];
        self.cur = leaf.prev;
        Some((leaf.key, &leaf.value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    fn keys_and_values<K: FstKey, V: Clone + PartialEq + Debug>(
        db: &FlatSegmentTree<K, V>,
    ) -> (Vec<K>, Vec<V>) {
        let keys: Vec<K> = db.iter().map(|(k, _)| k).collect();
        let mut values: Vec<V> = db.iter().map(|(_, v)| v.clone()).collect();
        values.pop(); // right sentinel value is meaningless
        (keys, values)
    }

    #[test]
    fn fst_whole_span_has_init_value() {
        let db: FlatSegmentTree<i64, i32> = FlatSegmentTree::new(0, 100, -1);

        let hit = db.search(50).expect("inside span");
        assert_eq!(
            SegmentSpan {
                start: 0,
                end: 100,
                value: -1,
            },
            hit,
        );

        assert!(db.search(100).is_none());
        assert!(db.search(-1).is_none());
    }

    #[test]
    fn fst_paint_and_merge() {
        let mut db = FlatSegmentTree::new(0, 100, false);

        db.insert_segment(10, 20, true);
        db.insert_segment(20, 30, true);

        let (keys, values) = keys_and_values(&db);
        assert_eq!(vec![0, 10, 30, 100], keys);
        assert_eq!(vec![false, true, false], values);
    }

    #[test]
    fn fst_paint_overwrites_covered_boundaries() {
        let mut db = FlatSegmentTree::new(0, 100, 0);

        db.insert_segment(10, 20, 1);
        db.insert_segment(30, 40, 2);
        db.insert_segment(5, 50, 3);

        let (keys, values) = keys_and_values(&db);
        assert_eq!(vec![0, 5, 50, 100], keys);
        assert_eq!(vec![0, 3, 0], values);
    }

    #[test]
    fn fst_paint_clamps_to_span() {
        let mut db = FlatSegmentTree::new(0, 10, 0);

        db.insert_segment(-5, 5, 9);
        db.insert_segment(8, 100, 9);
        db.insert_segment(30, 40, 7); // fully outside: no-op

        let (keys, values) = keys_and_values(&db);
        assert_eq!(vec![0, 5, 8, 10], keys);
        assert_eq!(vec![9, 0, 9], values);
    }

    #[test]
    fn fst_search_tree_requires_build() {
        let mut db = FlatSegmentTree::new(0, 100, 0);
        db.insert_segment(10, 20, 1);

        assert!(!db.is_tree_valid());
        assert!(db.search_tree(15).is_none());

        db.build_tree();
        assert!(db.is_tree_valid());

        let hit = db.search_tree(15).expect("painted");
        assert_eq!((1, 10, 20), (hit.value, hit.start, hit.end));

        // A mutation invalidates the built tree.
        db.insert_segment(50, 60, 2);
        assert!(!db.is_tree_valid());
        assert!(db.search_tree(15).is_none());
    }

    #[test]
    fn fst_search_tree_matches_linear_search() {
        let mut db = FlatSegmentTree::new(0, 1000, 0u32);

        for i in 0..20 {
            db.insert_segment(i * 37, i * 37 + 20, i as u32 + 1);
        }

        db.build_tree();

        for key in 0..1000 {
            assert_eq!(db.search(key), db.search_tree(key), "key {key}");
        }
    }

    #[test]
    fn fst_equality_ignores_tree_state() {
        let mut a = FlatSegmentTree::new(0, 100, 0);
        let mut b = FlatSegmentTree::new(0, 100, 0);

        a.insert_segment(10, 20, 1);
        b.insert_segment(10, 20, 1);
        b.build_tree();

        assert_eq!(a, b);

        b.insert_segment(20, 30, 2);
        assert_ne!(a, b);
    }

    #[test]
    fn fst_clone_is_deep() {
        let mut db = FlatSegmentTree::new(0, 100, 0);
        db.insert_segment(10, 20, 1);

        let copy = db.clone();
        db.insert_segment(40, 50, 2);

        assert_ne!(copy, db);
        assert!(copy.search(45).is_some_and(|s| s.value == 0));
    }

    #[test]
    fn fst_reverse_iteration() {
        let mut db = FlatSegmentTree::new(0, 100, 0);
        db.insert_segment(10, 20, 1);

        let keys: Vec<i32> = db.riter().map(|(k, _)| k).collect();
        assert_eq!(vec![100, 20, 10, 0], keys);
    }
}
