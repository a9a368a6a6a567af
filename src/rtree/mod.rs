// Copyright (c) 2024-present, grid-index
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! A dynamic k-D rectangle index following the R\*-tree design.
//!
//! Nodes live in a slab arena; directories hold child indices and parents
//! are back-indices, so the cyclic parent/child structure needs no shared
//! ownership. Insertion uses least-enlargement descent with forced
//! reinsertion on overflow (when enabled by the traits), then a
//! margin-minimising split. Deletion collects underflowed directories and
//! reinserts their orphans. A bulk loader packs trees bottom-up with the
//! STR algorithm.

mod bulk;
mod export;
mod extent;
mod integrity;
mod node;
mod search;

pub use bulk::BulkLoader;
pub use export::ExportFormat;
pub use extent::{
    intersection, linear_intersection, overlap_area, square_distance, Coord, Extent, PointN,
};
pub use integrity::IntegrityCheckProps;
pub use node::NodeType;
pub use search::{EntryPos, SearchEntry, SearchMode, SearchResults};

use crate::{Error, Result};
use node::{Children, NodeIndex, NodeKind, NodeRecord};
use std::marker::PhantomData;

/// Compile-time parameters of an R-tree.
///
/// The defaults mirror a production-sized tree; tests shrink them to force
/// splits early.
pub trait RTreeTraits {
    /// Minimum children per directory (`2 <= m <= M / 2`)
    const MIN_NODE_SIZE: usize = 40;

    /// Maximum children per directory
    const MAX_NODE_SIZE: usize = 100;

    /// Hard cap on the tree depth
    const MAX_TREE_DEPTH: usize = 100;

    /// Whether overflow is first treated by forced reinsertion
    const ENABLE_FORCED_REINSERTION: bool = true;

    /// How many children a forced reinsertion detaches (`p < M`)
    const REINSERTION_SIZE: usize = 30;
}

/// The default R-tree parameter set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DefaultRTreeTraits;

impl RTreeTraits for DefaultRTreeTraits {}

/// Node metadata handed to [`RTree::walk`] visitors.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeProperties<K, const D: usize> {
    /// Classification of the visited node
    pub node_type: NodeType,

    /// Depth of the node (root = 0)
    pub depth: usize,

    /// The node's extent
    pub extent: Extent<K, D>,
}

/// A dynamic `D`-dimensional rectangle index.
///
/// # Example
///
/// ```
/// use grid_index::rtree::{RTree, SearchMode};
///
/// let mut tree: RTree<i64, String> = RTree::new();
/// tree.insert(([0, 0], [2, 2]).into(), "a".to_string());
/// tree.insert(([3, 3], [5, 5]).into(), "b".to_string());
///
/// let hits: Vec<&String> = tree
///     .search([1, 1].into(), SearchMode::Overlap)
///     .map(|e| e.value)
///     .collect();
/// assert_eq!(vec![&"a".to_string()], hits);
/// ```
#[derive(Debug)]
pub struct RTree<K, V, const D: usize = 2, T = DefaultRTreeTraits> {
    nodes: Vec<Option<NodeRecord<K, V, D>>>,
    free: Vec<NodeIndex>,
    root: NodeIndex,
    len: usize,
    _traits: PhantomData<T>,
}

impl<K: Coord, V, const D: usize, T: RTreeTraits> RTree<K, V, D, T> {
    /// Creates an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![Some(NodeRecord {
                extent: Extent::default(),
                parent: None,
                kind: NodeKind::Leaf(Children::new()),
            })],
            free: Vec::new(),
            root: 0,
            len: 0,
            _traits: PhantomData,
        }
    }

    /// Number of stored values.
    #[must_use]
    pub fn size(&self) -> usize {
        self.len
    }

    /// Whether no values are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// MBR of the whole tree; the default extent when empty.
    #[must_use]
    pub fn extent(&self) -> Extent<K, D> {
        self.node(self.root).extent
    }

    /// Drops all values.
    pub fn clear(&mut self) {
        *self = Self::new();
    }

    /// Inserts `value` with the given extent.
    pub fn insert(&mut self, extent: Extent<K, D>, value: V) {
        let mut reinserted = Vec::new();
        self.insert_value(extent, value, &mut reinserted);
    }

    /// Inserts `value` at a point (a degenerate extent).
    pub fn insert_point(&mut self, point: PointN<K, D>, value: V) {
        self.insert(Extent::from_point(point), value);
    }

    /// Lazy search for values matching a point query.
    #[must_use]
    pub fn search(&self, point: PointN<K, D>, mode: SearchMode) -> SearchResults<'_, K, V, D, T> {
        self.search_extent(Extent::from_point(point), mode)
    }

    /// Lazy search for values matching an extent query.
    ///
    /// `Overlap` yields every value whose extent intersects the query;
    /// `Match` yields only values whose extent equals it exactly.
    #[must_use]
    pub fn search_extent(
        &self,
        query: Extent<K, D>,
        mode: SearchMode,
    ) -> SearchResults<'_, K, V, D, T> {
        SearchResults::new(self, query, mode)
    }

    /// Mutable visitation of every value matching the query.
    pub fn for_each_match_mut(
        &mut self,
        query: Extent<K, D>,
        mode: SearchMode,
        mut f: impl FnMut(&mut V),
    ) {
        let hits: Vec<NodeIndex> = self
            .search_extent(query, mode)
            .map(|entry| entry.pos.node)
            .collect();

        for idx in hits {
            if let NodeKind::Value(value) = &mut self.node_mut(idx).kind {
                f(value);
            }
        }
    }

    /// Erases the value a search entry points at.
    ///
    /// Underflowed directories on the way up are dissolved and their
    /// contents reinserted; a root left with a single directory child is
    /// collapsed.
    ///
    /// # Errors
    ///
    /// `NotFound` if the handle is stale (the tree was mutated since the
    /// search, or the entry was erased already).
    pub fn erase(&mut self, entry: EntryPos) -> Result<V> {
        let idx = entry.node;

        let parent = match self.nodes.get(idx) {
            Some(Some(record)) if !record.is_directory() => {
                record.parent.ok_or(Error::NotFound)?
            }
            _ => return Err(Error::NotFound),
        };

        self.remove_child(parent, idx);

        let value = match self.nodes[idx].take() {
            Some(NodeRecord {
                kind: NodeKind::Value(value),
                ..
            }) => value,
            _ => return Err(Error::NotFound),
        };

        self.free.push(idx);
        self.len -= 1;

        // Walk up, dissolving directories that fell under the minimum.
        let mut orphans: Vec<NodeIndex> = Vec::new();
        let mut cur = parent;

        while cur != self.root {
            let child_count = self.children(cur).len();

            if child_count >= T::MIN_NODE_SIZE {
                break;
            }

            let parent_of_cur = self
                .node(cur)
                .parent
                .expect("non-root directories have a parent");

            log::debug!(
                "dissolving underflowed directory ({child_count} < {})",
                T::MIN_NODE_SIZE,
            );

            self.remove_child(parent_of_cur, cur);

            let children = std::mem::take(
                self.node_mut(cur)
                    .kind
                    .children_mut()
                    .expect("directory node"),
            );

            for &child in &children {
                self.node_mut(child).parent = None;
            }

            orphans.extend(children);
            self.nodes[cur] = None;
            self.free.push(cur);

            cur = parent_of_cur;
        }

        self.repair_extents_upwards(cur);
        self.collapse_root();

        let mut reinserted = Vec::new();

        for orphan in orphans {
            self.reinsert_node(orphan, &mut reinserted);
        }

        Ok(value)
    }

    /// Starts a bulk loader for this tree type.
    #[must_use]
    pub fn bulk_loader() -> BulkLoader<K, V, D, T> {
        BulkLoader::new()
    }

    /// DFS over all nodes, root first.
    pub fn walk(&self, mut visitor: impl FnMut(&NodeProperties<K, D>)) {
        let mut stack: Vec<(NodeIndex, usize)> = vec![(self.root, 0)];

        while let Some((idx, depth)) = stack.pop() {
            let record = self.node(idx);

            visitor(&NodeProperties {
                node_type: record.kind.node_type(),
                depth,
                extent: record.extent,
            });

            if let Some(children) = record.kind.children() {
                for &child in children.iter().rev() {
                    stack.push((child, depth + 1));
                }
            }
        }
    }

    // --- insertion ---

    fn insert_value(&mut self, extent: Extent<K, D>, value: V, reinserted: &mut Vec<usize>) {
        let idx = self.alloc(NodeRecord {
            extent,
            parent: None,
            kind: NodeKind::Value(value),
        });

        self.len += 1;
        self.attach_value_node(idx, reinserted);
    }

    /// Hangs an existing value-node record into the tree.
    fn attach_value_node(&mut self, idx: NodeIndex, reinserted: &mut Vec<usize>) {
        let extent = self.node(idx).extent;
        let leaf = self.choose_leaf(&extent);

        self.node_mut(idx).parent = Some(leaf);
        self.children_mut(leaf).push(idx);
        self.repair_extents_upwards(leaf);

        if self.children(leaf).len() > T::MAX_NODE_SIZE {
            self.handle_overflow(leaf, reinserted);
        }
    }

    /// Least-enlargement descent to the leaf directory the extent belongs
    /// into. Among leaf directories the R\* overlap-enlargement criterion
    /// decides.
    fn choose_leaf(&self, extent: &Extent<K, D>) -> NodeIndex {
        let mut cur = self.root;
        let mut depth = 0;

        loop {
            if depth > T::MAX_TREE_DEPTH {
                log::warn!("insertion descent exceeded the maximum tree depth");
                return cur;
            }

            let record = self.node(cur);

            let children = match &record.kind {
                NodeKind::Leaf(_) => return cur,
                NodeKind::Dir(children) => children,
                NodeKind::Value(_) => unreachable!("descent never reaches value nodes"),
            };

            let at_leaf_parents = children
                .first()
                .map_or(false, |&c| matches!(self.node(c).kind, NodeKind::Leaf(_)));

            cur = if at_leaf_parents {
                self.pick_min_overlap_cost(children, extent)
            } else {
                self.pick_min_enlargement(children, extent)
            };

            depth += 1;
        }
    }

    fn pick_min_enlargement(&self, children: &Children, extent: &Extent<K, D>) -> NodeIndex {
        let mut best = children[0];
        let mut best_cost = f64::INFINITY;
        let mut best_area = f64::INFINITY;

        for &child in children {
            let bb = self.node(child).extent;
            let area = bb.area();
            let cost = bb.union(extent).area() - area;

            if cost < best_cost || (cost == best_cost && area < best_area) {
                best = child;
                best_cost = cost;
                best_area = area;
            }
        }

        best
    }

    /// R\* leaf-level criterion: smallest increase of overlap with the
    /// sibling directories, enlargement and area breaking ties.
    fn pick_min_overlap_cost(&self, children: &Children, extent: &Extent<K, D>) -> NodeIndex {
        let mut best = children[0];
        let mut best_key = (f64::INFINITY, f64::INFINITY, f64::INFINITY);

        for &child in children {
            let bb = self.node(child).extent;
            let enlarged = bb.union(extent);

            let mut overlap_cost = 0.0;

            for &other in children {
                if other == child {
                    continue;
                }

                let other_bb = &self.node(other).extent;
                overlap_cost += overlap_area(&enlarged, other_bb) - overlap_area(&bb, other_bb);
            }

            let area = bb.area();
            let key = (overlap_cost, enlarged.area() - area, area);

            if key < best_key {
                best = child;
                best_key = key;
            }
        }

        best
    }

    // --- overflow treatment ---

    fn handle_overflow(&mut self, idx: NodeIndex, reinserted: &mut Vec<usize>) {
        let depth = self.depth_of(idx);
        let count = self.children(idx).len();

        let can_reinsert = T::ENABLE_FORCED_REINSERTION
            && idx != self.root
            && !reinserted.contains(&depth)
            && T::REINSERTION_SIZE > 0
            && T::REINSERTION_SIZE < count
            && count - T::REINSERTION_SIZE >= T::MIN_NODE_SIZE;

        if can_reinsert {
            reinserted.push(depth);
            self.forced_reinsert(idx, reinserted);
        } else {
            self.split_node(idx, reinserted);
        }
    }

    /// R\* forced reinsertion: detach the children farthest from the
    /// directory's centre and insert them afresh.
    fn forced_reinsert(&mut self, idx: NodeIndex, reinserted: &mut Vec<usize>) {
        let center = self.node(idx).extent.center();

        let mut by_distance: Vec<NodeIndex> = self.children(idx).to_vec();

        by_distance.sort_by(|&a, &b| {
            let da = square_distance(&self.node(a).extent.center(), &center);
            let db = square_distance(&self.node(b).extent.center(), &center);
            db.partial_cmp(&da).unwrap_or(std::cmp::Ordering::Equal)
        });

        let detached: Vec<NodeIndex> = by_distance.drain(..T::REINSERTION_SIZE).collect();

        log::debug!(
            "forced reinsertion of {} children at depth {}",
            detached.len(),
            self.depth_of(idx),
        );

        *self.children_mut(idx) = by_distance.into_iter().collect();

        for &child in &detached {
            self.node_mut(child).parent = None;
        }

        self.repair_extents_upwards(idx);

        for child in detached {
            self.reinsert_node(child, reinserted);
        }
    }

    /// Reinserts a detached node: values hang back into a leaf directory,
    /// directories re-enter at their height.
    fn reinsert_node(&mut self, idx: NodeIndex, reinserted: &mut Vec<usize>) {
        if self.node(idx).is_directory() {
            self.insert_subtree(idx, reinserted);
        } else {
            self.attach_value_node(idx, reinserted);
        }
    }

    /// Attaches a whole subtree so that its value nodes end up at the
    /// tree-wide value depth.
    fn insert_subtree(&mut self, subtree: NodeIndex, reinserted: &mut Vec<usize>) {
        let height = self.subtree_height(subtree);
        let root_height = self.subtree_height(self.root);

        if root_height <= height {
            // The tree shrank below the subtree; dismantle it into values.
            let values = self.dismantle_subtree(subtree);

            for value_node in values {
                self.attach_value_node(value_node, reinserted);
            }

            return;
        }

        let extent = self.node(subtree).extent;
        let mut cur = self.root;
        let mut cur_height = root_height;

        while cur_height > height + 1 {
            let children = match self.node(cur).kind.children() {
                Some(children) if !children.is_empty() => children,
                _ => break,
            };

            cur = self.pick_min_enlargement(children, &extent);
            cur_height -= 1;
        }

        self.node_mut(subtree).parent = Some(cur);
        self.children_mut(cur).push(subtree);
        self.repair_extents_upwards(cur);

        if self.children(cur).len() > T::MAX_NODE_SIZE {
            self.handle_overflow(cur, reinserted);
        }
    }

    /// Frees every directory record of a subtree and returns its detached
    /// value nodes.
    fn dismantle_subtree(&mut self, subtree: NodeIndex) -> Vec<NodeIndex> {
        let mut values = Vec::new();
        let mut stack = vec![subtree];

        while let Some(idx) = stack.pop() {
            if self.node(idx).is_directory() {
                let children = std::mem::take(
                    self.node_mut(idx)
                        .kind
                        .children_mut()
                        .expect("directory node"),
                );

                stack.extend(children);
                self.nodes[idx] = None;
                self.free.push(idx);
            } else {
                self.node_mut(idx).parent = None;
                values.push(idx);
            }
        }

        values
    }

    /// R\* split: margin-minimising axis, then the distribution with the
    /// least overlap (area breaking ties).
    fn split_node(&mut self, idx: NodeIndex, reinserted: &mut Vec<usize>) {
        let m = T::MIN_NODE_SIZE.max(1);
        let children: Vec<NodeIndex> = self.children(idx).to_vec();
        let n = children.len();

        debug_assert!(n >= 2 * m, "split requires at least 2m children");

        log::debug!("splitting node with {n} children at depth {}", self.depth_of(idx));

        // Axis choice: smallest margin-value sum over all distributions.
        let mut best_axis = 0;
        let mut best_margin_sum = f64::INFINITY;

        for dim in 0..D {
            let mut margin_sum = 0.0;

            for sort_by_end in [false, true] {
                let sorted = self.sorted_by_axis(&children, dim, sort_by_end);

                for k in m..=(n - m) {
                    let bb1 = self.extent_over(&sorted[..k]);
                    let bb2 = self.extent_over(&sorted[k..]);
                    margin_sum += bb1.margin() + bb2.margin();
                }
            }

            if margin_sum < best_margin_sum {
                best_margin_sum = margin_sum;
                best_axis = dim;
            }
        }

        // Distribution choice on that axis.
        let mut best_groups: Option<(Vec<NodeIndex>, Vec<NodeIndex>)> = None;
        let mut best_key = (f64::INFINITY, f64::INFINITY);

        for sort_by_end in [false, true] {
            let sorted = self.sorted_by_axis(&children, best_axis, sort_by_end);

            for k in m..=(n - m) {
                let bb1 = self.extent_over(&sorted[..k]);
                let bb2 = self.extent_over(&sorted[k..]);

                let key = (overlap_area(&bb1, &bb2), bb1.area() + bb2.area());

                if key < best_key {
                    best_key = key;
                    best_groups = Some((sorted[..k].to_vec(), sorted[k..].to_vec()));
                }
            }
        }

        let Some((group1, group2)) = best_groups else {
            return;
        };

        let is_leaf = matches!(self.node(idx).kind, NodeKind::Leaf(_));
        let bb1 = self.extent_over(&group1);
        let bb2 = self.extent_over(&group2);

        let sibling_kind = if is_leaf {
            NodeKind::Leaf(group2.iter().copied().collect())
        } else {
            NodeKind::Dir(group2.iter().copied().collect())
        };

        let sibling = self.alloc(NodeRecord {
            extent: bb2,
            parent: self.node(idx).parent,
            kind: sibling_kind,
        });

        for &child in &group2 {
            self.node_mut(child).parent = Some(sibling);
        }

        *self.children_mut(idx) = group1.into_iter().collect();
        self.node_mut(idx).extent = bb1;

        if idx == self.root {
            let new_root = self.alloc(NodeRecord {
                extent: bb1.union(&bb2),
                parent: None,
                kind: NodeKind::Dir([idx, sibling].into_iter().collect()),
            });

            self.node_mut(idx).parent = Some(new_root);
            self.node_mut(sibling).parent = Some(new_root);
            self.root = new_root;
            return;
        }

        let parent = self
            .node(idx)
            .parent
            .expect("non-root nodes have a parent");

        self.children_mut(parent).push(sibling);
        self.repair_extents_upwards(parent);

        if self.children(parent).len() > T::MAX_NODE_SIZE {
            self.handle_overflow(parent, reinserted);
        }
    }

    // --- shared plumbing ---

    pub(super) fn node(&self, idx: NodeIndex) -> &NodeRecord<K, V, D> {
        self.nodes[idx].as_ref().expect("live node")
    }

    fn node_mut(&mut self, idx: NodeIndex) -> &mut NodeRecord<K, V, D> {
        self.nodes[idx].as_mut().expect("live node")
    }

    pub(super) fn root_index(&self) -> NodeIndex {
        self.root
    }

    pub(super) fn node_at(&self, idx: NodeIndex) -> Option<&NodeRecord<K, V, D>> {
        self.nodes.get(idx).and_then(Option::as_ref)
    }

    fn children(&self, idx: NodeIndex) -> &Children {
        self.node(idx).kind.children().expect("directory node")
    }

    fn children_mut(&mut self, idx: NodeIndex) -> &mut Children {
        self.node_mut(idx)
            .kind
            .children_mut()
            .expect("directory node")
    }

    fn alloc(&mut self, record: NodeRecord<K, V, D>) -> NodeIndex {
        if let Some(idx) = self.free.pop() {
            self.nodes[idx] = Some(record);
            idx
        } else {
            self.nodes.push(Some(record));
            self.nodes.len() - 1
        }
    }

    fn remove_child(&mut self, parent: NodeIndex, child: NodeIndex) {
        self.children_mut(parent).retain(|c| *c != child);
    }

    fn depth_of(&self, mut idx: NodeIndex) -> usize {
        let mut depth = 0;

        while let Some(parent) = self.node(idx).parent {
            idx = parent;
            depth += 1;
        }

        depth
    }

    /// Height of a subtree: value nodes are 0, leaf directories 1.
    fn subtree_height(&self, mut idx: NodeIndex) -> usize {
        let mut height = 0;

        loop {
            match self.node(idx).kind.children() {
                None => return height,
                Some(children) => {
                    height += 1;

                    match children.first() {
                        Some(&child) => idx = child,
                        None => return height,
                    }
                }
            }
        }
    }

    fn extent_over(&self, children: &[NodeIndex]) -> Extent<K, D> {
        let mut iter = children.iter();

        let Some(&first) = iter.next() else {
            return Extent::default();
        };

        let mut bb = self.node(first).extent;

        for &child in iter {
            bb.extend_to(&self.node(child).extent);
        }

        bb
    }

    fn sorted_by_axis(
        &self,
        children: &[NodeIndex],
        dim: usize,
        by_end: bool,
    ) -> Vec<NodeIndex> {
        let mut sorted = children.to_vec();

        sorted.sort_by(|&a, &b| {
            let ea = &self.node(a).extent;
            let eb = &self.node(b).extent;

            let (ka, kb) = if by_end {
                (ea.end.d[dim].to_f64(), eb.end.d[dim].to_f64())
            } else {
                (ea.start.d[dim].to_f64(), eb.start.d[dim].to_f64())
            };

            ka.partial_cmp(&kb).unwrap_or(std::cmp::Ordering::Equal)
        });

        sorted
    }

    /// Recomputes the extent of `idx` and every ancestor from their
    /// children.
    fn repair_extents_upwards(&mut self, idx: NodeIndex) {
        let mut cur = Some(idx);

        while let Some(node) = cur {
            let extent = match self.node(node).kind.children() {
                Some(children) if !children.is_empty() => {
                    let snapshot: Vec<NodeIndex> = children.to_vec();
                    self.extent_over(&snapshot)
                }
                _ => Extent::default(),
            };

            self.node_mut(node).extent = extent;
            cur = self.node(node).parent;
        }
    }

    /// While the root is a non-leaf directory with a single child, promote
    /// that child.
    fn collapse_root(&mut self) {
        loop {
            let only_child = match &self.node(self.root).kind {
                NodeKind::Dir(children) if children.len() == 1 => children[0],
                _ => return,
            };

            log::debug!("collapsing single-child root");

            self.nodes[self.root] = None;
            self.free.push(self.root);
            self.root = only_child;
            self.node_mut(only_child).parent = None;
        }
    }

    // used by bulk loading
    pub(super) fn from_arena(
        nodes: Vec<Option<NodeRecord<K, V, D>>>,
        root: NodeIndex,
        len: usize,
    ) -> Self {
        Self {
            nodes,
            free: Vec::new(),
            root,
            len,
            _traits: PhantomData,
        }
    }
}

impl<K: Coord, V, const D: usize, T: RTreeTraits> Default for RTree<K, V, D, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Coord, V: Clone, const D: usize, T: RTreeTraits> Clone for RTree<K, V, D, T> {
    fn clone(&self) -> Self {
        Self {
            nodes: self.nodes.clone(),
            free: self.free.clone(),
            root: self.root,
            len: self.len,
            _traits: PhantomData,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    /// Small node sizes force splits and collapses early.
    pub(crate) struct TinyTraits;

    impl RTreeTraits for TinyTraits {
        const MIN_NODE_SIZE: usize = 2;
        const MAX_NODE_SIZE: usize = 5;
        const MAX_TREE_DEPTH: usize = 100;
        const ENABLE_FORCED_REINSERTION: bool = false;
        const REINSERTION_SIZE: usize = 2;
    }

    type Tree = RTree<i16, String, 2, TinyTraits>;

    #[test]
    fn rtree_empty_tree() {
        let tree = Tree::new();

        assert!(tree.is_empty());
        assert_eq!(0, tree.size());
        assert_eq!(Extent::default(), tree.extent());
        assert_eq!(0, tree.search([0, 0].into(), SearchMode::Overlap).count());
    }

    #[test]
    fn rtree_insert_updates_extent() {
        let mut tree = Tree::new();

        tree.insert(([0, 0], [2, 2]).into(), "test".into());
        assert_eq!(1, tree.size());
        assert_eq!(Extent::new([0, 0], [2, 2]), tree.extent());

        tree.insert(([3, 3], [5, 5]).into(), "test again".into());
        assert_eq!(2, tree.size());
        assert_eq!(Extent::new([0, 0], [5, 5]), tree.extent());

        tree.insert(([-2, 1], [3, 6]).into(), "more test".into());
        assert_eq!(3, tree.size());
        assert_eq!(Extent::new([-2, 0], [5, 6]), tree.extent());

        tree.check_integrity(IntegrityCheckProps::default())
            .expect("valid tree");
    }

    #[test]
    fn rtree_split_keeps_all_values_searchable() {
        let mut tree = Tree::new();

        for i in 0..20i16 {
            tree.insert(
                ([i * 2, i * 2], [i * 2 + 1, i * 2 + 1]).into(),
                format!("v{i}"),
            );
        }

        assert_eq!(20, tree.size());
        tree.check_integrity(IntegrityCheckProps::default())
            .expect("valid tree");

        for i in 0..20i16 {
            let hits: Vec<&String> = tree
                .search([i * 2, i * 2].into(), SearchMode::Overlap)
                .map(|e| e.value)
                .collect();

            assert!(hits.contains(&&format!("v{i}")), "value v{i} lost");
        }
    }

    #[test]
    fn rtree_mutable_visitation() {
        let mut tree = Tree::new();
        tree.insert(([0, 0], [1, 1]).into(), "old".into());

        tree.for_each_match_mut(
            ([0, 0], [1, 1]).into(),
            SearchMode::Match,
            |value| {
                *value = "new".into();
            },
        );

        let hits: Vec<&String> = tree
            .search([0, 0].into(), SearchMode::Overlap)
            .map(|e| e.value)
            .collect();
        assert_eq!(vec![&"new".to_string()], hits);
    }
}
