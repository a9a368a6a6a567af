// Copyright (c) 2024-present, grid-index
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use super::extent::{Coord, Extent, PointN};
use super::node::{NodeIndex, NodeKind, NodeRecord};
use super::{DefaultRTreeTraits, RTree, RTreeTraits};
use std::marker::PhantomData;

/// Bottom-up bulk loader using the Sort-Tile-Recursive packing.
///
/// Accumulate `(extent, value)` pairs, then [`pack`](Self::pack) into a
/// tree. Packing is deterministic: entries are tiled by sorting their
/// centres dimension by dimension.
pub struct BulkLoader<K, V, const D: usize = 2, T = DefaultRTreeTraits> {
    entries: Vec<(Extent<K, D>, V)>,
    _traits: PhantomData<T>,
}

impl<K: Coord, V, const D: usize, T: RTreeTraits> BulkLoader<K, V, D, T> {
    /// Creates an empty loader.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            _traits: PhantomData,
        }
    }

    /// Number of accumulated entries.
    #[must_use]
    pub fn size(&self) -> usize {
        self.entries.len()
    }

    /// Queues one `(extent, value)` pair.
    pub fn insert(&mut self, extent: Extent<K, D>, value: V) {
        self.entries.push((extent, value));
    }

    /// Queues one point value.
    pub fn insert_point(&mut self, point: PointN<K, D>, value: V) {
        self.insert(Extent::from_point(point), value);
    }

    /// Packs the accumulated entries into a tree.
    #[must_use]
    pub fn pack(self) -> RTree<K, V, D, T> {
        let len = self.entries.len();

        if len == 0 {
            return RTree::new();
        }

        let mut nodes: Vec<Option<NodeRecord<K, V, D>>> = Vec::with_capacity(len * 2);

        let mut level: Vec<NodeIndex> = Vec::with_capacity(len);

        for (extent, value) in self.entries {
            nodes.push(Some(NodeRecord {
                extent,
                parent: None,
                kind: NodeKind::Value(value),
            }));
            level.push(nodes.len() - 1);
        }

        let mut packing_values = true;

        loop {
            if level.len() <= T::MAX_NODE_SIZE {
                let root = pack_directory(&mut nodes, level, packing_values);
                return RTree::from_arena(nodes, root, len);
            }

            log::trace!(
                "bulk load: tiling {} nodes into directories of <= {}",
                level.len(),
                T::MAX_NODE_SIZE,
            );

            let groups = str_tile::<K, V, D>(&nodes, level, 0, T::MAX_NODE_SIZE);

            level = groups
                .into_iter()
                .map(|group| pack_directory(&mut nodes, group, packing_values))
                .collect();

            packing_values = false;
        }
    }
}

impl<K: Coord, V, const D: usize, T: RTreeTraits> Default for BulkLoader<K, V, D, T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Creates a directory over `children`, fixing their parent links.
fn pack_directory<K: Coord, V, const D: usize>(
    nodes: &mut Vec<Option<NodeRecord<K, V, D>>>,
    children: Vec<NodeIndex>,
    of_values: bool,
) -> NodeIndex {
    let mut extent: Option<Extent<K, D>> = None;

    for &child in &children {
        if let Some(Some(record)) = nodes.get(child) {
            match &mut extent {
                Some(extent) => extent.extend_to(&record.extent),
                None => extent = Some(record.extent),
            }
        }
    }

    let kind = if of_values {
        NodeKind::Leaf(children.iter().copied().collect())
    } else {
        NodeKind::Dir(children.iter().copied().collect())
    };

    nodes.push(Some(NodeRecord {
        extent: extent.unwrap_or_default(),
        parent: None,
        kind,
    }));

    let idx = nodes.len() - 1;

    for child in children {
        if let Some(Some(record)) = nodes.get_mut(child) {
            record.parent = Some(idx);
        }
    }

    idx
}

/// Sort-Tile-Recursive partitioning of `items` into groups of at most
/// `max` nodes, slicing dimension by dimension.
fn str_tile<K: Coord, V, const D: usize>(
    nodes: &[Option<NodeRecord<K, V, D>>],
    mut items: Vec<NodeIndex>,
    dim: usize,
    max: usize,
) -> Vec<Vec<NodeIndex>> {
    sort_by_center::<K, V, D>(nodes, &mut items, dim);

    if dim + 1 >= D || items.len() <= max {
        return balanced_chunks(items, max);
    }

    let groups_needed = items.len().div_ceil(max);
    let remaining_dims = D - dim;
    let slice_count = nth_root_ceil(groups_needed, remaining_dims).max(1);
    let slab_size = items.len().div_ceil(slice_count).max(1);

    let mut out = Vec::with_capacity(groups_needed);

    for slab in items.chunks(slab_size) {
        out.extend(str_tile::<K, V, D>(nodes, slab.to_vec(), dim + 1, max));
    }

    out
}

fn sort_by_center<K: Coord, V, const D: usize>(
    nodes: &[Option<NodeRecord<K, V, D>>],
    items: &mut [NodeIndex],
    dim: usize,
) {
    items.sort_by(|&a, &b| {
        let ca = nodes[a].as_ref().map_or(0.0, |r| r.extent.center()[dim]);
        let cb = nodes[b].as_ref().map_or(0.0, |r| r.extent.center()[dim]);
        ca.partial_cmp(&cb).unwrap_or(std::cmp::Ordering::Equal)
    });
}

/// Splits `items` into `ceil(len / max)` groups of near-equal size, so no
/// group falls under half the maximum.
fn balanced_chunks(items: Vec<NodeIndex>, max: usize) -> Vec<Vec<NodeIndex>> {
    let len = items.len();

    if len == 0 {
        return Vec::new();
    }

    let group_count = len.div_ceil(max);
    let base = len / group_count;
    let extra = len % group_count;

    let mut out = Vec::with_capacity(group_count);
    let mut iter = items.into_iter();

    for group in 0..group_count {
        let size = if group < extra { base + 1 } else { base };
        out.push(iter.by_ref().take(size).collect());
    }

    out
}

/// Smallest integer `s` with `s^n >= value`.
fn nth_root_ceil(value: usize, n: usize) -> usize {
    let root = (value as f64).powf(1.0 / n as f64).ceil() as usize;

    // Float rounding can land one off in either direction.
    let mut root = root.max(1);

    while root.pow(n as u32) < value {
        root += 1;
    }

    while root > 1 && (root - 1).pow(n as u32) >= value {
        root -= 1;
    }

    root
}
