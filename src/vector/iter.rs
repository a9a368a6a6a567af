// Copyright (c) 2024-present, grid-index
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use super::BlockSlot;
use crate::element::{ElementBlock, ElementType, NoUserElement};

/// Read view of one block of a multi-type vector.
#[derive(Clone, Copy, Debug)]
pub struct BlockRef<'a, U = NoUserElement> {
    /// Logical position of the block's first element
    pub position: usize,

    /// Number of elements in the block
    pub size: usize,

    /// The block's type tag (`Empty` for empty blocks)
    pub element_type: ElementType,

    /// Backing storage; `None` for empty blocks
    pub data: Option<&'a ElementBlock<U>>,
}

/// Double-ended iterator over the blocks of a multi-type vector.
pub struct BlockIter<'a, U = NoUserElement> {
    pub(super) inner: std::slice::Iter<'a, BlockSlot<U>>,
}

impl<'a, U> Iterator for BlockIter<'a, U> {
    type Item = BlockRef<'a, U>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(BlockSlot::as_ref)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<U> DoubleEndedIterator for BlockIter<'_, U> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(BlockSlot::as_ref)
    }
}

impl<U> ExactSizeIterator for BlockIter<'_, U> {}

impl<U> BlockSlot<U> {
    pub(super) fn as_ref(&self) -> BlockRef<'_, U> {
        BlockRef {
            position: self.position,
            size: self.size,
            element_type: self
                .data
                .as_ref()
                .map_or(ElementType::Empty, ElementBlock::element_type),
            data: self.data.as_ref(),
        }
    }
}

/// Cursor referring to a block and an offset inside it.
///
/// Positions accelerate sequential access: every positional operation has a
/// `*_with_hint` variant that starts its lookup at the hinted block instead
/// of binary-searching the whole block list.
///
/// A position becomes stale as soon as its vector is mutated; the
/// `*_with_hint` operations detect hints that no longer cover the requested
/// position and silently fall back to a full lookup. A position obtained
/// from one vector must not be used against another.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Position {
    pub(super) block: usize,
    pub(super) offset: usize,
}

impl Position {
    /// Index of the block this cursor points into.
    #[must_use]
    pub fn block(&self) -> usize {
        self.block
    }

    /// Element offset inside the block.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }
}
