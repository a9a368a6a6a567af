// Copyright (c) 2024-present, grid-index
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use super::extent::{Coord, Extent};
use super::node::{NodeIndex, NodeKind};
use super::{RTree, RTreeTraits};

/// Search predicate selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchMode {
    /// Every value whose extent intersects the query
    Overlap,

    /// Only values whose extent equals the query exactly
    Match,
}

/// A stable, copyable handle to one stored value.
///
/// Handles are harvested from search entries and stay meaningful until the
/// tree is mutated; [`RTree::erase`] reports a stale handle as `NotFound`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EntryPos {
    pub(super) node: NodeIndex,
}

/// One search hit.
#[derive(Debug)]
pub struct SearchEntry<'a, K, V, const D: usize> {
    /// The matched value
    pub value: &'a V,

    /// Extent the value was stored with
    pub extent: &'a Extent<K, D>,

    /// Depth of the value node (root = 0)
    pub depth: usize,

    /// Handle usable with [`RTree::erase`]
    pub pos: EntryPos,
}

/// Lazy depth-first search over the tree.
///
/// Subtrees whose extent cannot satisfy the predicate are skipped. The
/// iterator borrows the tree; harvest [`EntryPos`] handles to erase hits
/// afterwards.
pub struct SearchResults<'a, K, V, const D: usize, T> {
    tree: &'a RTree<K, V, D, T>,
    query: Extent<K, D>,
    mode: SearchMode,
    stack: Vec<(NodeIndex, usize)>,
}

impl<'a, K: Coord, V, const D: usize, T: RTreeTraits> SearchResults<'a, K, V, D, T> {
    pub(super) fn new(tree: &'a RTree<K, V, D, T>, query: Extent<K, D>, mode: SearchMode) -> Self {
        Self {
            tree,
            query,
            mode,
            stack: vec![(tree.root_index(), 0)],
        }
    }
}

impl<'a, K: Coord, V, const D: usize, T: RTreeTraits> Iterator for SearchResults<'a, K, V, D, T> {
    type Item = SearchEntry<'a, K, V, D>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((idx, depth)) = self.stack.pop() {
            let Some(record) = self.tree.node_at(idx) else {
                continue;
            };

            match &record.kind {
                NodeKind::Value(value) => {
                    let hit = match self.mode {
                        SearchMode::Overlap => record.extent.intersects(&self.query),
                        SearchMode::Match => record.extent == self.query,
                    };

                    if hit {
                        return Some(SearchEntry {
                            value,
                            extent: &record.extent,
                            depth,
                            pos: EntryPos { node: idx },
                        });
                    }
                }
                NodeKind::Leaf(children) | NodeKind::Dir(children) => {
                    let descend = match self.mode {
                        SearchMode::Overlap => record.extent.intersects(&self.query),
                        SearchMode::Match => record.extent.contains_extent(&self.query),
                    };

                    if descend {
                        for &child in children.iter().rev() {
                            self.stack.push((child, depth + 1));
                        }
                    }
                }
            }
        }

        None
    }
}
