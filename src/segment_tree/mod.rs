// Copyright (c) 2024-present, grid-index
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! A static stabbing-query tree over 1-D intervals.
//!
//! Intervals are inserted into a list, then `build_tree` constructs a
//! binary tree over the deduplicated endpoints; each node records the
//! intervals that fully span it. A stab query walks one root-to-leaf path
//! and collects every recorded interval along the way.

use std::fmt::Debug;

/// An inserted interval: `[low, high)` carrying a value.
#[derive(Clone, Debug, PartialEq)]
struct Interval<K, V> {
    low: K,
    high: K,
    value: V,
}

#[derive(Clone, Debug)]
struct TreeNode<K> {
    /// Low key of the span (inclusive)
    low: K,

    /// High key of the span (exclusive)
    high: K,

    left: Option<usize>,
    right: Option<usize>,

    /// Ids of intervals that fully contain `[low, high)`
    ids: Vec<usize>,
}

#[derive(Clone, Debug)]
struct BuiltTree<K> {
    nodes: Vec<TreeNode<K>>,
    root: usize,

    /// Sorted unique endpoint keys at build time
    keys: Vec<K>,
}

/// A stabbing-query tree over arbitrary, possibly overlapping intervals.
///
/// # Example
///
/// ```
/// use grid_index::SegmentTree;
///
/// let mut db = SegmentTree::new();
/// db.insert(0, 10, "a")?;
/// db.insert(5, 20, "b")?;
/// db.build_tree();
///
/// let mut hits: Vec<&str> = db.search(7).map(|s| *s.value).collect();
/// hits.sort_unstable();
/// assert_eq!(vec!["a", "b"], hits);
/// # Ok::<(), grid_index::Error>(())
/// ```
#[derive(Clone, Debug, Default)]
pub struct SegmentTree<K, V> {
    /// Interval slab; `None` marks erased entries so ids stay stable
    segments: Vec<Option<Interval<K, V>>>,
    active: usize,
    tree: Option<BuiltTree<K>>,
}

/// One stabbed interval as yielded by [`SegmentTree::search`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Stab<'a, K, V> {
    /// Low key of the stabbed interval (inclusive)
    pub low: K,

    /// High key of the stabbed interval (exclusive)
    pub high: K,

    /// The interval's value
    pub value: &'a V,
}

impl<K, V> SegmentTree<K, V>
where
    K: Copy + Ord + Debug,
    V: Clone + PartialEq,
{
    /// Creates an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self {
            segments: Vec::new(),
            active: 0,
            tree: None,
        }
    }

    /// Number of active intervals.
    #[must_use]
    pub fn size(&self) -> usize {
        self.active
    }

    /// Whether no intervals are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.active == 0
    }

    /// Whether the built tree reflects the current interval list.
    #[must_use]
    pub fn is_tree_valid(&self) -> bool {
        self.tree.is_some()
    }

    /// Records the interval `[low, high)`; invalidates the tree.
    ///
    /// # Errors
    ///
    /// `InvalidArg` if `low >= high`.
    pub fn insert(&mut self, low: K, high: K, value: V) -> crate::Result<()> {
        if low >= high {
            return Err(crate::Error::InvalidArg("inverted or empty interval"));
        }

        self.segments.push(Some(Interval { low, high, value }));
        self.active += 1;
        self.tree = None;
        Ok(())
    }

    /// Drops all intervals for which the predicate returns `true`;
    /// invalidates the tree. Returns the number of dropped intervals.
    pub fn erase_if(&mut self, mut pred: impl FnMut(K, K, &V) -> bool) -> usize {
        let mut dropped = 0;

        for slot in &mut self.segments {
            let matches = slot
                .as_ref()
                .is_some_and(|seg| pred(seg.low, seg.high, &seg.value));

            if matches {
                *slot = None;
                dropped += 1;
            }
        }

        if dropped > 0 {
            self.active -= dropped;
            self.tree = None;
        }

        dropped
    }

    /// Drops all intervals and the built tree.
    pub fn clear(&mut self) {
        self.segments.clear();
        self.active = 0;
        self.tree = None;
    }

    /// The sorted unique endpoint keys of the active intervals.
    #[must_use]
    pub fn boundary_keys(&self) -> Vec<K> {
        let mut keys: Vec<K> = self
            .segments
            .iter()
            .flatten()
            .flat_map(|seg| [seg.low, seg.high])
            .collect();

        keys.sort_unstable();
        keys.dedup();
        keys
    }

    /// Builds the stabbing tree over the current interval list.
    pub fn build_tree(&mut self) {
        let keys = self.boundary_keys();

        if keys.len() < 2 {
            // No intervals; an empty built tree still counts as valid.
            self.tree = Some(BuiltTree {
                nodes: Vec::new(),
                root: 0,
                keys,
            });
            return;
        }

        let mut nodes: Vec<TreeNode<K>> = Vec::with_capacity(keys.len() * 2);

        // Leaf layer: one node per consecutive endpoint pair.
        let mut level: Vec<usize> = Vec::with_capacity(keys.len() - 1);

        for pair in keys.windows(2) {
            nodes.push(TreeNode {
                low: pair[0],
                high: pair[1],
                left: None,
                right: None,
                ids: Vec::new(),
            });
            level.push(nodes.len() - 1);
        }

        // Upper layers, built pairwise like the flat segment tree.
        while level.len() > 1 {
            let mut upper = Vec::with_capacity(level.len().div_ceil(2));

            for pair in level.chunks(2) {
                let left = pair[0];
                let low = nodes[left].low;

                let (right, high) = match pair.get(1) {
                    Some(&right) => (Some(right), nodes[right].high),
                    None => (None, nodes[left].high),
                };

                nodes.push(TreeNode {
                    low,
                    high,
                    left: Some(left),
                    right,
                    ids: Vec::new(),
                });
                upper.push(nodes.len() - 1);
            }

            level = upper;
        }

        let root = match level.first() {
            Some(&root) => root,
            None => return,
        };

        let mut tree = BuiltTree { nodes, root, keys };

        // Descend each interval from the root, marking the maximal nodes
        // its range fully covers.
        for (id, slot) in self.segments.iter().enumerate() {
            if let Some(seg) = slot {
                mark_interval(&mut tree.nodes, tree.root, id, seg.low, seg.high);
            }
        }

        self.tree = Some(tree);
    }

    /// Stab query: all intervals containing `key`.
    ///
    /// The result is empty when the tree is not valid or `key` lies outside
    /// the endpoint span. Hits come in tree-traversal order (root first);
    /// callers must not rely on any particular order.
    #[must_use]
    pub fn search(&self, key: K) -> SearchResults<'_, K, V> {
        let mut ids = Vec::new();

        if let Some(tree) = &self.tree {
            let in_span = tree
                .keys
                .first()
                .zip(tree.keys.last())
                .is_some_and(|(&lo, &hi)| lo <= key && key < hi);

            if in_span && !tree.nodes.is_empty() {
                let mut cur = Some(tree.root);

                while let Some(idx) = cur {
                    let node = &tree.nodes[idx];
                    ids.extend_from_slice(&node.ids);

                    cur = [node.left, node.right]
                        .into_iter()
                        .flatten()
                        .find(|&child| {
                            let child = &tree.nodes[child];
                            child.low <= key && key < child.high
                        });
                }
            }
        }

        SearchResults {
            tree: self,
            ids: ids.into_iter(),
        }
    }
}

impl<K, V> PartialEq for SegmentTree<K, V>
where
    K: Copy + Ord + Debug,
    V: Clone + PartialEq,
{
    /// Compares the multisets of active intervals; tree state is ignored.
    fn eq(&self, other: &Self) -> bool {
        if self.active != other.active {
            return false;
        }

        let mine: Vec<&Interval<K, V>> = self.segments.iter().flatten().collect();
        let mut theirs: Vec<Option<&Interval<K, V>>> =
            other.segments.iter().flatten().map(Some).collect();

        for seg in mine {
            let Some(slot) = theirs
                .iter_mut()
                .find(|slot| slot.is_some_and(|candidate| candidate == seg))
            else {
                return false;
            };

            *slot = None;
        }

        true
    }
}

fn mark_interval<K: Copy + Ord>(
    nodes: &mut Vec<TreeNode<K>>,
    idx: usize,
    id: usize,
    low: K,
    high: K,
) {
    let node = &nodes[idx];

    if low <= node.low && node.high <= high {
        nodes[idx].ids.push(id);
        return;
    }

    let (left, right) = (node.left, node.right);

    if let Some(left) = left {
        if overlaps(&nodes[left], low, high) {
            mark_interval(nodes, left, id, low, high);
        }
    }

    if let Some(right) = right {
        if overlaps(&nodes[right], low, high) {
            mark_interval(nodes, right, id, low, high);
        }
    }
}

fn overlaps<K: Copy + Ord>(node: &TreeNode<K>, low: K, high: K) -> bool {
    node.low < high && low < node.high
}

/// Lazy view over the hits of one stab query.
pub struct SearchResults<'a, K, V> {
    tree: &'a SegmentTree<K, V>,
    ids: std::vec::IntoIter<usize>,
}

impl<'a, K: Copy, V> Iterator for SearchResults<'a, K, V> {
    type Item = Stab<'a, K, V>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let id = self.ids.next()?;

            if let Some(Some(seg)) = self.tree.segments.get(id) {
                return Some(Stab {
                    low: seg.low,
                    high: seg.high,
                    value: &seg.value,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    fn sorted_hits(db: &SegmentTree<i64, char>, key: i64) -> Vec<char> {
        let mut hits: Vec<char> = db.search(key).map(|s| *s.value).collect();
        hits.sort_unstable();
        hits
    }

    #[test]
    fn segment_tree_insert_validates_interval() {
        let mut db: SegmentTree<i64, char> = SegmentTree::new();

        assert!(db.insert(2, 1, 'x').is_err());
        assert!(db.insert(2, 2, 'x').is_err());
        assert_eq!(0, db.size());

        db.insert(1, 2, 'x').expect("valid interval");
        assert_eq!(1, db.size());
    }

    #[test]
    fn segment_tree_search_needs_valid_tree() {
        let mut db = SegmentTree::new();
        db.insert(0, 10, 'a').expect("valid");

        assert!(!db.is_tree_valid());
        assert_eq!(0, db.search(5).count());

        db.build_tree();
        assert!(db.is_tree_valid());
        assert_eq!(vec!['a'], sorted_hits(&db, 5));

        db.insert(5, 15, 'b').expect("valid");
        assert!(!db.is_tree_valid());
        assert_eq!(0, db.search(5).count());
    }

    #[test]
    fn segment_tree_stab_boundaries() {
        let mut db = SegmentTree::new();
        db.insert(0, 10, 'a').expect("valid");
        db.insert(10, 20, 'b').expect("valid");
        db.build_tree();

        assert_eq!(vec!['a'], sorted_hits(&db, 0));
        assert_eq!(vec!['a'], sorted_hits(&db, 9));
        // The high endpoint is exclusive.
        assert_eq!(vec!['b'], sorted_hits(&db, 10));
        assert_eq!(0, db.search(20).count());
        assert_eq!(0, db.search(-1).count());
    }

    #[test]
    fn segment_tree_boundary_keys() {
        let mut db = SegmentTree::new();
        db.insert(5, 12, 'a').expect("valid");
        db.insert(0, 5, 'b').expect("valid");
        db.insert(5, 30, 'c').expect("valid");

        assert_eq!(vec![0, 5, 12, 30], db.boundary_keys());
    }

    #[test]
    fn segment_tree_erase_if() {
        let mut db = SegmentTree::new();
        db.insert(0, 10, 'a').expect("valid");
        db.insert(5, 15, 'b').expect("valid");
        db.insert(8, 20, 'c').expect("valid");
        db.build_tree();

        let dropped = db.erase_if(|low, _, _| low >= 5);
        assert_eq!(2, dropped);
        assert_eq!(1, db.size());
        assert!(!db.is_tree_valid());

        db.build_tree();
        assert_eq!(vec!['a'], sorted_hits(&db, 9));
    }

    #[test]
    fn segment_tree_equality_is_set_based() {
        let mut db1 = SegmentTree::new();
        let mut db2 = SegmentTree::new();

        db1.insert(0, 10, 'a').expect("valid");
        db1.insert(5, 15, 'b').expect("valid");

        db2.insert(5, 15, 'b').expect("valid");
        db2.insert(0, 10, 'a').expect("valid");
        db2.build_tree();

        assert_eq!(db1, db2);

        db2.erase_if(|_, _, &v| v == 'b');
        assert_ne!(db1, db2);
    }

    #[test]
    fn segment_tree_clone_carries_built_tree() {
        let mut db = SegmentTree::new();
        db.insert(0, 10, 'a').expect("valid");
        db.build_tree();

        let copy = db.clone();
        assert!(copy.is_tree_valid());
        assert_eq!(vec!['a'], sorted_hits(&copy, 3));
    }
}
