// Copyright (c) 2024-present, grid-index
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! A dynamic 2-D point index with window search and structural deletion.
//!
//! Every node partitions the plane into four quadrants around its point;
//! the quadrant convention is `dx >= 0` → east half, `dy >= 0` → north
//! half, so "north" is towards larger `y`. Deletion replaces the removed
//! node following Samet's replacement algorithm: a candidate from a
//! diagonally-opposite quadrant moves up, and the subtrees whose anchors
//! fall into the hatched region between the two points are reinserted.

use crate::{Error, Result};
use smallvec::SmallVec;
use std::fmt::Debug;
use std::ops::{Add, Sub};

/// Key bounds for the point quad tree.
pub trait QuadKey: Copy + Ord + Debug + Add<Output = Self> + Sub<Output = Self> {}

impl<T> QuadKey for T where T: Copy + Ord + Debug + Add<Output = T> + Sub<Output = T> {}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Quadrant {
    NorthEast = 0,
    NorthWest = 1,
    SouthEast = 2,
    SouthWest = 3,
}

impl Quadrant {
    fn opposite(self) -> Self {
        match self {
            Self::NorthEast => Self::SouthWest,
            Self::NorthWest => Self::SouthEast,
            Self::SouthEast => Self::NorthWest,
            Self::SouthWest => Self::NorthEast,
        }
    }
}

#[derive(Clone, Copy, Debug)]
enum Direction {
    East,
    North,
    South,
    West,
}

#[derive(Clone, Debug)]
struct QuadNode<K, V> {
    x: K,
    y: K,
    value: V,
    parent: Option<usize>,

    /// Children indexed by [`Quadrant`]
    children: [Option<usize>; 4],
}

/// Candidate tracking during replacement search.
struct Candidate<K> {
    quad: Option<Quadrant>,
    dist: K,
    node: usize,
}

/// One stored point as yielded by the region search.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PointEntry<'a, K, V> {
    /// The point's x coordinate
    pub x: K,

    /// The point's y coordinate
    pub y: K,

    /// The value stored at the point
    pub value: &'a V,
}

/// A dynamic 2-D point index.
///
/// # Example
///
/// ```
/// use grid_index::PointQuadTree;
///
/// let mut db = PointQuadTree::new();
/// db.insert(25, 32, "a");
/// db.insert(5, 45, "b");
///
/// assert_eq!(&"a", db.find(25, 32)?);
/// assert_eq!(1, db.search_region(0, 0, 10, 50).len());
/// # Ok::<(), grid_index::Error>(())
/// ```
#[derive(Clone, Debug, Default)]
pub struct PointQuadTree<K, V> {
    nodes: Vec<Option<QuadNode<K, V>>>,
    free: Vec<usize>,
    root: Option<usize>,
    len: usize,

    /// Smallest and largest x ever inserted; never shrunk by removal
    xrange: Option<(K, K)>,

    /// Smallest and largest y ever inserted; never shrunk by removal
    yrange: Option<(K, K)>,
}

impl<K: QuadKey, V: Clone + PartialEq + Debug> PointQuadTree<K, V> {
    /// Creates an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            free: Vec::new(),
            root: None,
            len: 0,
            xrange: None,
            yrange: None,
        }
    }

    /// Number of stored points.
    #[must_use]
    pub fn size(&self) -> usize {
        self.len
    }

    /// Whether no points are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The smallest and largest x coordinate ever inserted.
    #[must_use]
    pub fn x_range(&self) -> Option<(K, K)> {
        self.xrange
    }

    /// The smallest and largest y coordinate ever inserted.
    #[must_use]
    pub fn y_range(&self) -> Option<(K, K)> {
        self.yrange
    }

    /// Stores `value` at `(x, y)`; an existing point at the same
    /// coordinates has its value replaced.
    pub fn insert(&mut self, x: K, y: K, value: V) {
        self.extend_ranges(x, y);

        let Some(mut cur) = self.root else {
            let idx = self.alloc(x, y, value, None);
            self.root = Some(idx);
            self.len = 1;
            return;
        };

        loop {
            let node = self.node(cur);

            if node.x == x && node.y == y {
                self.node_mut(cur).value = value;
                return;
            }

            let quad = quadrant_of(node.x, node.y, x, y);

            match node.children[quad as usize] {
                Some(child) => cur = child,
                None => {
                    let idx = self.alloc(x, y, value, Some(cur));
                    self.node_mut(cur).children[quad as usize] = Some(idx);
                    self.len += 1;
                    return;
                }
            }
        }
    }

    /// Looks up the value stored at `(x, y)`.
    ///
    /// # Errors
    ///
    /// `NotFound` if no point exists at these coordinates.
    pub fn find(&self, x: K, y: K) -> Result<&V> {
        self.find_node(x, y)
            .map(|idx| &self.node(idx).value)
            .ok_or(Error::NotFound)
    }

    /// Removes the point at `(x, y)`; a miss is a no-op.
    ///
    /// Non-leaf nodes are replaced following Samet's algorithm, preserving
    /// every other stored point.
    pub fn remove(&mut self, x: K, y: K) {
        let Some(delete_node) = self.find_node(x, y) else {
            return;
        };

        if self.node(delete_node).children.iter().all(Option::is_none) {
            // Leaf: just detach it.
            if self.root == Some(delete_node) {
                self.root = None;
            } else {
                self.detach_from_parent(delete_node);
            }

            self.free_node(delete_node);
            self.len -= 1;
            return;
        }

        let repl_node = self
            .find_replacement_node(x, y, delete_node)
            .expect("a non-leaf node has at least one replacement candidate");

        let (repl_x, repl_y) = {
            let repl = self.node(repl_node);
            (repl.x, repl.y)
        };

        let repl_quad = quadrant_of(x, y, repl_x, repl_y);

        let xrange = ordered(x, repl_x);
        let yrange = ordered(y, repl_y);
        let mut insert_list: SmallVec<[usize; 8]> = SmallVec::new();

        // Call the quadrant holding the replacement "quadrant I": first
        // adjust the two quadrants adjacent to it, then walk the chain
        // towards the replacement adjusting the cross quadrants.
        let (adj_a, dir_a, adj_b, dir_b, walk) = match repl_quad {
            Quadrant::NorthEast => (
                Quadrant::NorthWest,
                Direction::South,
                Quadrant::SouthEast,
                Direction::West,
                Quadrant::SouthWest,
            ),
            Quadrant::NorthWest => (
                Quadrant::NorthEast,
                Direction::South,
                Quadrant::SouthWest,
                Direction::East,
                Quadrant::SouthEast,
            ),
            Quadrant::SouthEast => (
                Quadrant::NorthEast,
                Direction::West,
                Quadrant::SouthWest,
                Direction::North,
                Quadrant::NorthWest,
            ),
            Quadrant::SouthWest => (
                Quadrant::NorthWest,
                Direction::East,
                Quadrant::SouthEast,
                Direction::North,
                Quadrant::NorthEast,
            ),
        };

        let child_a = self.node(delete_node).children[adj_a as usize];
        self.adjust_quad(xrange, yrange, child_a, dir_a, &mut insert_list);

        let child_b = self.node(delete_node).children[adj_b as usize];
        self.adjust_quad(xrange, yrange, child_b, dir_b, &mut insert_list);

        let chain = self.node(delete_node).children[repl_quad as usize];
        self.walk_replacement_chain(xrange, yrange, chain, walk, &mut insert_list);

        // Reinsert the replacement's two cross subtrees into the matching
        // quadrants of the node being vacated.
        let cross = match repl_quad {
            Quadrant::NorthEast | Quadrant::SouthWest => {
                [Quadrant::NorthWest, Quadrant::SouthEast]
            }
            Quadrant::NorthWest | Quadrant::SouthEast => {
                [Quadrant::NorthEast, Quadrant::SouthWest]
            }
        };

        for quad in cross {
            let subtree = self.node_mut(repl_node).children[quad as usize].take();

            if let Some(subtree) = subtree {
                self.node_mut(subtree).parent = None;
                self.reinsert_tree_into_quad(delete_node, quad, subtree);
            }
        }

        // Hoist the replacement's remaining same-quadrant child into the
        // slot its parent used to hold it in; the chain between the vacated
        // node and the replacement stays in place.
        let repl_parent = self
            .node(repl_node)
            .parent
            .expect("the replacement is a strict descendant");
        let parent_slot = self
            .node(repl_parent)
            .children
            .iter()
            .position(|&c| c == Some(repl_node))
            .expect("parent links to the replacement");

        let hoisted = self.node_mut(repl_node).children[repl_quad as usize].take();
        self.node_mut(repl_parent).children[parent_slot] = hoisted;

        if let Some(hoisted) = hoisted {
            self.node_mut(hoisted).parent = Some(repl_parent);
        }

        // Move the replacement's point into the vacated node.
        let repl_value = self
            .nodes[repl_node]
            .take()
            .expect("replacement node is live")
            .value;
        self.free.push(repl_node);

        {
            let node = self.node_mut(delete_node);
            node.x = repl_x;
            node.y = repl_y;
            node.value = repl_value;
        }

        self.len -= 1;

        // Reinsert the subtrees cut out of the hatched region.
        for subtree in insert_list {
            self.reinsert_tree(delete_node, subtree);
        }
    }

    /// All values whose points fall inside the axis-aligned rectangle
    /// spanned by the two corners (inclusive).
    #[must_use]
    pub fn search_region(&self, x1: K, y1: K, x2: K, y2: K) -> Vec<&V> {
        self.search_region_iter(x1, y1, x2, y2)
            .map(|entry| entry.value)
            .collect()
    }

    /// Lazy variant of [`Self::search_region`], yielding the stored points.
    #[must_use]
    pub fn search_region_iter(&self, x1: K, y1: K, x2: K, y2: K) -> RegionIter<'_, K, V> {
        let (x1, x2) = ordered(x1, x2);
        let (y1, y2) = ordered(y1, y2);

        RegionIter {
            tree: self,
            rect: (x1, y1, x2, y2),
            stack: self.root.into_iter().collect(),
        }
    }

    /// Read-only access to the tree structure, starting at the root.
    #[must_use]
    pub fn node_access(&self) -> NodeAccess<'_, K, V> {
        NodeAccess {
            tree: self,
            idx: self.root,
        }
    }

    /// Drops every stored point. The observed coordinate ranges reset.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.free.clear();
        self.root = None;
        self.len = 0;
        self.xrange = None;
        self.yrange = None;
    }

    /// Exchanges contents with `other` in O(1).
    pub fn swap(&mut self, other: &mut Self) {
        std::mem::swap(self, other);
    }

    /// Verifies quadrant placement and parent round-trips.
    ///
    /// # Errors
    ///
    /// `Integrity` describing the first violation found.
    pub fn check_integrity(&self) -> Result<()> {
        let mut count = 0;

        if let Some(root) = self.root {
            if self.node(root).parent.is_some() {
                return Err(Error::Integrity("root has a parent link".into()));
            }

            self.check_subtree(root, &mut count)?;
        }

        if count != self.len {
            return Err(Error::Integrity(format!(
                "reachable node count {count} does not match size {}",
                self.len,
            )));
        }

        Ok(())
    }

    fn check_subtree(&self, idx: usize, count: &mut usize) -> Result<()> {
        *count += 1;
        let node = self.node(idx);

        for (slot, child) in node.children.iter().enumerate() {
            let Some(child) = *child else {
                continue;
            };

            let child_node = self.node(child);
            let quad = quadrant_of(node.x, node.y, child_node.x, child_node.y);

            if quad as usize != slot {
                return Err(Error::Integrity(format!(
                    "child at ({:?}, {:?}) stored in wrong quadrant of ({:?}, {:?})",
                    child_node.x, child_node.y, node.x, node.y,
                )));
            }

            if child_node.parent != Some(idx) {
                return Err(Error::Integrity(format!(
                    "parent link of ({:?}, {:?}) does not round-trip",
                    child_node.x, child_node.y,
                )));
            }

            self.check_subtree(child, count)?;
        }

        Ok(())
    }

    fn node(&self, idx: usize) -> &QuadNode<K, V> {
        self.nodes[idx].as_ref().expect("live node")
    }

    fn node_mut(&mut self, idx: usize) -> &mut QuadNode<K, V> {
        self.nodes[idx].as_mut().expect("live node")
    }

    fn alloc(&mut self, x: K, y: K, value: V, parent: Option<usize>) -> usize {
        let node = QuadNode {
            x,
            y,
            value,
            parent,
            children: [None; 4],
        };

        if let Some(idx) = self.free.pop() {
            self.nodes[idx] = Some(node);
            idx
        } else {
            self.nodes.push(Some(node));
            self.nodes.len() - 1
        }
    }

    fn free_node(&mut self, idx: usize) {
        self.nodes[idx] = None;
        self.free.push(idx);
    }

    fn extend_ranges(&mut self, x: K, y: K) {
        self.xrange = Some(match self.xrange {
            Some((lo, hi)) => (lo.min(x), hi.max(x)),
            None => (x, x),
        });

        self.yrange = Some(match self.yrange {
            Some((lo, hi)) => (lo.min(y), hi.max(y)),
            None => (y, y),
        });
    }

    fn find_node(&self, x: K, y: K) -> Option<usize> {
        let mut cur = self.root?;

        loop {
            let node = self.node(cur);

            if node.x == x && node.y == y {
                return Some(cur);
            }

            let quad = quadrant_of(node.x, node.y, x, y);
            cur = node.children[quad as usize]?;
        }
    }

    fn detach_from_parent(&mut self, idx: usize) {
        let Some(parent) = self.node(idx).parent else {
            return;
        };

        for slot in &mut self.node_mut(parent).children {
            if *slot == Some(idx) {
                *slot = None;
            }
        }
    }

    fn find_replacement_node(&self, x: K, y: K, delete_node: usize) -> Option<usize> {
        let mut dx_node: Option<Candidate<K>> = None;
        let mut dy_node: Option<Candidate<K>> = None;
        let mut min_city_block: Option<Candidate<K>> = None;

        for quad in [
            Quadrant::NorthEast,
            Quadrant::NorthWest,
            Quadrant::SouthWest,
            Quadrant::SouthEast,
        ] {
            self.find_candidate_in_quad(
                x,
                y,
                &mut dx_node,
                &mut dy_node,
                &mut min_city_block,
                delete_node,
                quad,
            );
        }

        // Criterion 1: one candidate is closest on both axes, in a
        // diagonally-opposite quadrant.
        if let (Some(dx), Some(dy)) = (&dx_node, &dy_node) {
            if dx.node == dy.node
                && matches!(
                    dx.quad,
                    Some(Quadrant::NorthWest) | Some(Quadrant::SouthEast),
                )
            {
                return Some(dx.node);
            }
        }

        // Criterion 2: smallest city-block distance wins.
        min_city_block.map(|candidate| candidate.node)
    }

    #[allow(clippy::too_many_arguments)]
    fn find_candidate_in_quad(
        &self,
        x: K,
        y: K,
        dx_node: &mut Option<Candidate<K>>,
        dy_node: &mut Option<Candidate<K>>,
        min_city_block: &mut Option<Candidate<K>>,
        delete_node: usize,
        quad: Quadrant,
    ) {
        let Some(mut repl) = self.node(delete_node).children[quad as usize] else {
            return;
        };

        // The deepest opposite-corner descendant is this quadrant's
        // candidate.
        let opposite = quad.opposite();

        while let Some(next) = self.node(repl).children[opposite as usize] {
            repl = next;
        }

        let node = self.node(repl);
        let dx = abs_diff(node.x, x);
        let dy = abs_diff(node.y, y);

        if dx_node.as_ref().map_or(true, |best| best.dist > dx) {
            *dx_node = Some(Candidate {
                quad: Some(quad),
                dist: dx,
                node: repl,
            });
        }

        if dy_node.as_ref().map_or(true, |best| best.dist > dy) {
            *dy_node = Some(Candidate {
                quad: Some(quad),
                dist: dy,
                node: repl,
            });
        }

        if min_city_block
            .as_ref()
            .map_or(true, |best| best.dist > dx + dy)
        {
            *min_city_block = Some(Candidate {
                quad: None,
                dist: dx + dy,
                node: repl,
            });
        }
    }

    /// Detaches and queues every subtree root whose anchor falls into the
    /// hatched region, recursing direction-aware through the rest.
    fn adjust_quad(
        &mut self,
        xrange: (K, K),
        yrange: (K, K),
        quad_root: Option<usize>,
        dir: Direction,
        insert_list: &mut SmallVec<[usize; 8]>,
    ) {
        let Some(idx) = quad_root else {
            return;
        };

        let (node_x, node_y) = {
            let node = self.node(idx);
            (node.x, node.y)
        };

        if (xrange.0 <= node_x && node_x <= xrange.1)
            || (yrange.0 <= node_y && node_y <= yrange.1)
        {
            self.detach_from_parent(idx);
            self.node_mut(idx).parent = None;
            insert_list.push(idx);
            return;
        }

        let next = match dir {
            Direction::East => [Quadrant::NorthEast, Quadrant::SouthEast],
            Direction::North => [Quadrant::NorthEast, Quadrant::NorthWest],
            Direction::South => [Quadrant::SouthEast, Quadrant::SouthWest],
            Direction::West => [Quadrant::NorthWest, Quadrant::SouthWest],
        };

        for quad in next {
            let child = self.node(idx).children[quad as usize];
            self.adjust_quad(xrange, yrange, child, dir, insert_list);
        }
    }

    /// Walks the chain from the vacated node towards the replacement,
    /// adjusting the two cross quadrants at every step.
    fn walk_replacement_chain(
        &mut self,
        xrange: (K, K),
        yrange: (K, K),
        chain: Option<usize>,
        walk: Quadrant,
        insert_list: &mut SmallVec<[usize; 8]>,
    ) {
        let (adj_a, dir_a, adj_b, dir_b) = match walk {
            Quadrant::NorthEast => (
                Quadrant::SouthEast,
                Direction::East,
                Quadrant::NorthWest,
                Direction::North,
            ),
            Quadrant::NorthWest => (
                Quadrant::NorthEast,
                Direction::North,
                Quadrant::SouthWest,
                Direction::West,
            ),
            Quadrant::SouthEast => (
                Quadrant::NorthEast,
                Direction::East,
                Quadrant::SouthWest,
                Direction::South,
            ),
            Quadrant::SouthWest => (
                Quadrant::NorthWest,
                Direction::West,
                Quadrant::SouthEast,
                Direction::South,
            ),
        };

        let mut cur = chain;

        while let Some(idx) = cur {
            let child_a = self.node(idx).children[adj_a as usize];
            self.adjust_quad(xrange, yrange, child_a, dir_a, insert_list);

            let child_b = self.node(idx).children[adj_b as usize];
            self.adjust_quad(xrange, yrange, child_b, dir_b, insert_list);

            cur = self.node(idx).children[walk as usize];
        }
    }

    /// Node-by-node reinsertion of a detached subtree under `dest`.
    fn reinsert_tree(&mut self, dest: usize, subtree: usize) {
        for quad in 0..4 {
            if let Some(child) = self.node_mut(subtree).children[quad].take() {
                self.reinsert_tree(dest, child);
            }
        }

        self.node_mut(subtree).parent = None;
        self.insert_existing(dest, subtree);
    }

    /// Reinserts a subtree into a specific quadrant slot of `dest`,
    /// falling back to node-by-node insertion when the slot is taken.
    fn reinsert_tree_into_quad(&mut self, dest: usize, quad: Quadrant, subtree: usize) {
        match self.node(dest).children[quad as usize] {
            Some(existing) => self.reinsert_tree(existing, subtree),
            None => {
                self.node_mut(dest).children[quad as usize] = Some(subtree);
                self.node_mut(subtree).parent = Some(dest);
            }
        }
    }

    /// Descends from `dest` and hangs the existing node into the vacant
    /// quadrant its point belongs to.
    fn insert_existing(&mut self, dest: usize, idx: usize) {
        let (x, y) = {
            let node = self.node(idx);
            (node.x, node.y)
        };

        let mut cur = dest;

        loop {
            let node = self.node(cur);

            if node.x == x && node.y == y {
                // Reinsertion never sees duplicate coordinates.
                debug_assert!(false, "duplicate point during reinsertion");
                log::warn!("dropping duplicate point during quad tree reinsertion");
                self.free_node(idx);
                self.len -= 1;
                return;
            }

            let quad = quadrant_of(node.x, node.y, x, y);

            match node.children[quad as usize] {
                Some(child) => cur = child,
                None => {
                    self.node_mut(cur).children[quad as usize] = Some(idx);
                    self.node_mut(idx).parent = Some(cur);
                    return;
                }
            }
        }
    }

    fn collect_entries(&self) -> Vec<(K, K, &V)> {
        let mut entries = Vec::with_capacity(self.len);
        let mut stack: Vec<usize> = self.root.into_iter().collect();

        while let Some(idx) = stack.pop() {
            let node = self.node(idx);
            entries.push((node.x, node.y, &node.value));
            stack.extend(node.children.iter().flatten());
        }

        entries.sort_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));
        entries
    }
}

impl<K: QuadKey, V: Clone + PartialEq + Debug> PartialEq for PointQuadTree<K, V> {
    /// Compares the sets of stored `(x, y, value)` triples; tree shape is
    /// ignored.
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.collect_entries() == other.collect_entries()
    }
}

/// Quadrant of `(x, y)` relative to `(node_x, node_y)`.
///
/// Ties go east (`dx == 0`) and north (`dy == 0`).
fn quadrant_of<K: Ord>(node_x: K, node_y: K, x: K, y: K) -> Quadrant {
    let east = x >= node_x;
    let north = y >= node_y;

    match (east, north) {
        (true, true) => Quadrant::NorthEast,
        (false, true) => Quadrant::NorthWest,
        (true, false) => Quadrant::SouthEast,
        (false, false) => Quadrant::SouthWest,
    }
}

fn ordered<K: Ord>(a: K, b: K) -> (K, K) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

fn abs_diff<K: Ord + Sub<Output = K>>(a: K, b: K) -> K {
    if a > b {
        a - b
    } else {
        b - a
    }
}

/// Position of a node relative to the query rectangle; used to prune the
/// window-search recursion to the quadrants that can overlap the query.
enum Region {
    Center,
    East,
    North,
    NorthEast,
    NorthWest,
    South,
    SouthEast,
    SouthWest,
    West,
}

fn region_of<K: Ord>(x: K, y: K, rect: (K, K, K, K)) -> Region {
    let (x1, y1, x2, y2) = rect;

    let col = if x < x1 {
        -1
    } else if x > x2 {
        1
    } else {
        0
    };

    let row = if y < y1 {
        -1
    } else if y > y2 {
        1
    } else {
        0
    };

    match (col, row) {
        (0, 0) => Region::Center,
        (1, 0) => Region::East,
        (-1, 0) => Region::West,
        (0, 1) => Region::North,
        (0, _) => Region::South,
        (1, 1) => Region::NorthEast,
        (-1, 1) => Region::NorthWest,
        (1, _) => Region::SouthEast,
        _ => Region::SouthWest,
    }
}

/// Lazy window-search iterator; see [`PointQuadTree::search_region_iter`].
pub struct RegionIter<'a, K, V> {
    tree: &'a PointQuadTree<K, V>,
    rect: (K, K, K, K),
    stack: Vec<usize>,
}

impl<'a, K: QuadKey, V: Clone + PartialEq + Debug> Iterator for RegionIter<'a, K, V> {
    type Item = PointEntry<'a, K, V>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(idx) = self.stack.pop() {
            let node = self.tree.node(idx);
            let children = &node.children;

            let push = |stack: &mut Vec<usize>, quads: &[Quadrant]| {
                for &quad in quads {
                    if let Some(child) = children[quad as usize] {
                        stack.push(child);
                    }
                }
            };

            use Quadrant::{NorthEast, NorthWest, SouthEast, SouthWest};

            match region_of(node.x, node.y, self.rect) {
                Region::Center => {
                    push(
                        &mut self.stack,
                        &[NorthEast, NorthWest, SouthEast, SouthWest],
                    );

                    return Some(PointEntry {
                        x: node.x,
                        y: node.y,
                        value: &node.value,
                    });
                }
                Region::East => push(&mut self.stack, &[NorthWest, SouthWest]),
                Region::North => push(&mut self.stack, &[SouthEast, SouthWest]),
                Region::NorthEast => push(&mut self.stack, &[SouthWest]),
                Region::NorthWest => push(&mut self.stack, &[SouthEast]),
                Region::South => push(&mut self.stack, &[NorthEast, NorthWest]),
                Region::SouthEast => push(&mut self.stack, &[NorthWest]),
                Region::SouthWest => push(&mut self.stack, &[NorthEast]),
                Region::West => push(&mut self.stack, &[NorthEast, SouthEast]),
            }
        }

        None
    }
}

/// Read-only view into the quad tree's node structure.
#[derive(Clone, Copy)]
pub struct NodeAccess<'a, K, V> {
    tree: &'a PointQuadTree<K, V>,
    idx: Option<usize>,
}

impl<'a, K: QuadKey, V: Clone + PartialEq + Debug> NodeAccess<'a, K, V> {
    /// Whether this view points at a node.
    #[must_use]
    pub fn is_some(&self) -> bool {
        self.idx.is_some()
    }

    /// The node's x coordinate.
    #[must_use]
    pub fn x(&self) -> Option<K> {
        self.idx.map(|idx| self.tree.node(idx).x)
    }

    /// The node's y coordinate.
    #[must_use]
    pub fn y(&self) -> Option<K> {
        self.idx.map(|idx| self.tree.node(idx).y)
    }

    /// The node's value.
    #[must_use]
    pub fn value(&self) -> Option<&'a V> {
        self.idx.map(|idx| &self.tree.node(idx).value)
    }

    /// Descends into the north-east child.
    #[must_use]
    pub fn northeast(&self) -> Self {
        self.child(Quadrant::NorthEast)
    }

    /// Descends into the north-west child.
    #[must_use]
    pub fn northwest(&self) -> Self {
        self.child(Quadrant::NorthWest)
    }

    /// Descends into the south-east child.
    #[must_use]
    pub fn southeast(&self) -> Self {
        self.child(Quadrant::SouthEast)
    }

    /// Descends into the south-west child.
    #[must_use]
    pub fn southwest(&self) -> Self {
        self.child(Quadrant::SouthWest)
    }

    fn child(&self, quad: Quadrant) -> Self {
        Self {
            tree: self.tree,
            idx: self
                .idx
                .and_then(|idx| self.tree.node(idx).children[quad as usize]),
        }
    }
}
