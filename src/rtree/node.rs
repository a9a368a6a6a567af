// Copyright (c) 2024-present, grid-index
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use super::extent::Extent;
use smallvec::SmallVec;

pub(super) type NodeIndex = usize;

/// Inline capacity of a directory's child list; directories beyond this
/// spill to the heap.
pub(super) type Children = SmallVec<[NodeIndex; 8]>;

/// Public classification of a node, as reported by walk and export.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeType {
    /// A leaf carrying one `(extent, value)` pair
    Value,

    /// A directory whose children are value nodes
    LeafDirectory,

    /// A directory whose children are other directories
    Directory,
}

#[derive(Clone, Debug)]
pub(super) enum NodeKind<V> {
    Value(V),

    /// Directory of value nodes
    Leaf(Children),

    /// Directory of directories
    Dir(Children),
}

impl<V> NodeKind<V> {
    pub fn node_type(&self) -> NodeType {
        match self {
            Self::Value(_) => NodeType::Value,
            Self::Leaf(_) => NodeType::LeafDirectory,
            Self::Dir(_) => NodeType::Directory,
        }
    }

    pub fn children(&self) -> Option<&Children> {
        match self {
            Self::Value(_) => None,
            Self::Leaf(children) | Self::Dir(children) => Some(children),
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Children> {
        match self {
            Self::Value(_) => None,
            Self::Leaf(children) | Self::Dir(children) => Some(children),
        }
    }
}

#[derive(Clone, Debug)]
pub(super) struct NodeRecord<K, V, const D: usize> {
    pub extent: Extent<K, D>,
    pub parent: Option<NodeIndex>,
    pub kind: NodeKind<V>,
}

impl<K, V, const D: usize> NodeRecord<K, V, D> {
    pub fn is_directory(&self) -> bool {
        !matches!(self.kind, NodeKind::Value(_))
    }
}
