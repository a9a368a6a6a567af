// Copyright (c) 2024-present, grid-index
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! An ordered sequence of logical positions partitioned into typed blocks.
//!
//! Every position is either empty or holds one element of a single type;
//! runs of equally-typed positions share one [`ElementBlock`]. All mutations
//! re-establish the block invariants:
//!
//! 1. block positions partition `[0, len)` contiguously,
//! 2. the block sizes sum up to `len`,
//! 3. no two adjacent blocks share a type tag (they are merged),
//! 4. no two empty blocks are adjacent (they are collapsed).

mod iter;

pub use iter::{BlockIter, BlockRef, Position};

use crate::binary_search::partition_point;
use crate::element::{Element, ElementBlock, ElementType, NoUserElement, TypedValue, UserElement};
use crate::{Error, Result};

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct BlockSlot<U> {
    position: usize,
    size: usize,

    /// `None` marks an empty block (no storage is held)
    data: Option<ElementBlock<U>>,
}

impl<U> BlockSlot<U> {
    fn empty(position: usize, size: usize) -> Self {
        Self {
            position,
            size,
            data: None,
        }
    }

    fn filled(position: usize, data: ElementBlock<U>) -> Self
    where
        U: UserElement,
    {
        Self {
            position,
            size: data.len(),
            data: Some(data),
        }
    }

    fn element_type(&self) -> ElementType
    where
        U: UserElement,
    {
        self.data
            .as_ref()
            .map_or(ElementType::Empty, ElementBlock::element_type)
    }
}

/// A vector of logical positions, each empty or holding one typed element,
/// stored as contiguous single-type blocks.
///
/// `U` is the user-defined element type registered for this vector; it
/// defaults to [`NoUserElement`] for vectors that only carry the built-in
/// types.
///
/// # Example
///
/// ```
/// use grid_index::MultiTypeVector;
///
/// let mut db: MultiTypeVector = MultiTypeVector::new(5);
/// db.set(0, 1.5)?;
/// db.set(1, "header")?;
///
/// assert_eq!(1.5, db.get::<f64>(0)?);
/// assert!(db.is_empty_at(4)?);
/// # Ok::<(), grid_index::Error>(())
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct MultiTypeVector<U = NoUserElement> {
    blocks: Vec<BlockSlot<U>>,
    len: usize,
}

impl<U: UserElement> MultiTypeVector<U> {
    /// Creates a vector of `n` empty positions.
    #[must_use]
    pub fn new(n: usize) -> Self {
        let blocks = if n > 0 {
            vec![BlockSlot::empty(0, n)]
        } else {
            Vec::new()
        };

        Self { blocks, len: n }
    }

    /// Creates a vector of `n` positions all holding `value`.
    #[must_use]
    pub fn with_value(n: usize, value: impl Into<Element<U>>) -> Self
    where
        U: Clone,
    {
        if n == 0 {
            return Self::new(0);
        }

        let data = block_of_repeated(value.into(), n);

        Self {
            blocks: vec![BlockSlot::filled(0, data)],
            len: n,
        }
    }

    /// Logical length of the vector.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the vector has length zero.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of blocks the vector is currently partitioned into.
    #[must_use]
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Whether the position holds no element.
    ///
    /// # Errors
    ///
    /// `OutOfBounds` if `pos` exceeds the vector.
    pub fn is_empty_at(&self, pos: usize) -> Result<bool> {
        let (idx, _) = self.locate(pos)?;
        Ok(self.blocks[idx].data.is_none())
    }

    /// The type tag of the element at `pos` (`Empty` for empty positions).
    ///
    /// # Errors
    ///
    /// `OutOfBounds` if `pos` exceeds the vector.
    pub fn element_type(&self, pos: usize) -> Result<ElementType> {
        let (idx, _) = self.locate(pos)?;
        Ok(self.blocks[idx].element_type())
    }

    /// Reads the built-in element at `pos`.
    ///
    /// # Errors
    ///
    /// `OutOfBounds` if `pos` exceeds the vector, `TypeMismatch` if the
    /// position holds an element of another type (or none).
    pub fn get<T: TypedValue<U>>(&self, pos: usize) -> Result<T> {
        let (idx, offset) = self.locate(pos)?;
        self.extract(idx, offset)
    }

    /// Reads the built-in element at `pos`, starting the lookup at `hint`.
    ///
    /// # Errors
    ///
    /// See [`Self::get`].
    pub fn get_with_hint<T: TypedValue<U>>(&self, hint: Position, pos: usize) -> Result<T> {
        let (idx, offset) = self.locate_with_hint(hint, pos)?;
        self.extract(idx, offset)
    }

    /// Borrows the string element at `pos`.
    ///
    /// # Errors
    ///
    /// See [`Self::get`].
    pub fn get_str(&self, pos: usize) -> Result<&str> {
        let (idx, offset) = self.locate(pos)?;
        let slot = &self.blocks[idx];

        slot.data
            .as_ref()
            .and_then(|data| data.str_at(offset))
            .ok_or(Error::TypeMismatch {
                expected: ElementType::String,
                actual: slot.element_type(),
            })
    }

    /// Borrows the user element at `pos`.
    ///
    /// # Errors
    ///
    /// See [`Self::get`].
    pub fn get_user(&self, pos: usize) -> Result<&U> {
        let (idx, offset) = self.locate(pos)?;
        let slot = &self.blocks[idx];

        slot.data
            .as_ref()
            .and_then(|data| data.user_at(offset))
            .ok_or(Error::TypeMismatch {
                expected: ElementType::User,
                actual: slot.element_type(),
            })
    }

    /// Writes one element, splitting and merging blocks as needed.
    ///
    /// # Errors
    ///
    /// `OutOfBounds` if `pos` exceeds the vector.
    pub fn set(&mut self, pos: usize, value: impl Into<Element<U>>) -> Result<()> {
        let (idx, offset) = self.locate(pos)?;
        self.set_at(idx, offset, pos, value.into())
    }

    /// Writes one element, starting the lookup at `hint`.
    ///
    /// Returns a fresh position referring to the written element.
    ///
    /// # Errors
    ///
    /// See [`Self::set`].
    pub fn set_with_hint(
        &mut self,
        hint: Position,
        pos: usize,
        value: impl Into<Element<U>>,
    ) -> Result<Position> {
        let (idx, offset) = self.locate_with_hint(hint, pos)?;
        self.set_at(idx, offset, pos, value.into())?;
        self.position(pos)
    }

    fn set_at(&mut self, idx: usize, offset: usize, pos: usize, element: Element<U>) -> Result<()> {
        let slot = &mut self.blocks[idx];

        if let Some(data) = &mut slot.data {
            if data.element_type() == element.element_type() {
                // Same type: overwrite in place, no structural change.
                return data.set(offset, element);
            }
        }

        log::trace!(
            "block split at position {pos} ({:?} <- {:?})",
            slot.element_type(),
            element.element_type(),
        );

        let start = self.ensure_boundary(pos);
        let end = self.ensure_boundary(pos + 1);
        debug_assert_eq!(start + 1, end);

        let slot = &mut self.blocks[start];
        if let Some(data) = &mut slot.data {
            data.overwrite(0, data.len());
        }
        *slot = BlockSlot::filled(pos, ElementBlock::from_element(element));

        self.normalize();
        Ok(())
    }

    /// Bulk write of a run of elements starting at `pos`.
    ///
    /// The run may span block boundaries; blocks are split and merged
    /// accordingly. Heterogeneous runs are decomposed into one block per
    /// maximal equally-typed sub-run.
    ///
    /// # Errors
    ///
    /// `OutOfBounds` if the run does not fit within the vector.
    pub fn set_range<I, E>(&mut self, pos: usize, values: I) -> Result<()>
    where
        I: IntoIterator<Item = E>,
        E: Into<Element<U>>,
    {
        let values: Vec<Element<U>> = values.into_iter().map(Into::into).collect();

        if values.is_empty() {
            return Ok(());
        }

        let count = values.len();

        if pos + count > self.len {
            return Err(Error::OutOfBounds {
                pos: pos + count,
                size: self.len,
            });
        }

        let start = self.ensure_boundary(pos);
        let end = self.ensure_boundary(pos + count);

        for slot in &mut self.blocks[start..end] {
            if let Some(data) = &mut slot.data {
                data.overwrite(0, data.len());
            }
        }

        let replacement = slots_from_elements(pos, values);
        self.blocks.splice(start..end, replacement);

        self.normalize();
        Ok(())
    }

    /// Same as [`Self::set_range`], starting the lookup at `hint`.
    ///
    /// # Errors
    ///
    /// See [`Self::set_range`].
    pub fn set_range_with_hint<I, E>(
        &mut self,
        _hint: Position,
        pos: usize,
        values: I,
    ) -> Result<Position>
    where
        I: IntoIterator<Item = E>,
        E: Into<Element<U>>,
    {
        self.set_range(pos, values)?;
        self.position(pos)
    }

    /// Overwrites the inclusive range `[a, b]` with empty positions.
    ///
    /// # Errors
    ///
    /// `InvalidArg` if `a > b`, `OutOfBounds` if `b` exceeds the vector.
    pub fn set_empty(&mut self, a: usize, b: usize) -> Result<()> {
        if a > b {
            return Err(Error::InvalidArg("inverted range"));
        }

        if b >= self.len {
            return Err(Error::OutOfBounds {
                pos: b,
                size: self.len,
            });
        }

        let start = self.ensure_boundary(a);
        let end = self.ensure_boundary(b + 1);

        for slot in &mut self.blocks[start..end] {
            if let Some(data) = &mut slot.data {
                data.overwrite(0, data.len());
            }
        }

        self.blocks
            .splice(start..end, [BlockSlot::empty(a, b - a + 1)]);

        self.normalize();
        Ok(())
    }

    /// Inserts a run of elements at `pos`, extending the vector.
    ///
    /// # Errors
    ///
    /// `OutOfBounds` if `pos > len`.
    pub fn insert<I, E>(&mut self, pos: usize, values: I) -> Result<()>
    where
        I: IntoIterator<Item = E>,
        E: Into<Element<U>>,
    {
        if pos > self.len {
            return Err(Error::OutOfBounds {
                pos,
                size: self.len,
            });
        }

        let values: Vec<Element<U>> = values.into_iter().map(Into::into).collect();

        if values.is_empty() {
            return Ok(());
        }

        let count = values.len();
        let at = self.ensure_boundary(pos);

        let new_slots = slots_from_elements(pos, values);
        self.blocks.splice(at..at, new_slots);

        self.len += count;
        self.normalize();
        Ok(())
    }

    /// Inserts `count` empty positions at `pos`, extending the vector.
    ///
    /// # Errors
    ///
    /// `OutOfBounds` if `pos > len`.
    pub fn insert_empty(&mut self, pos: usize, count: usize) -> Result<()> {
        if pos > self.len {
            return Err(Error::OutOfBounds {
                pos,
                size: self.len,
            });
        }

        if count == 0 {
            return Ok(());
        }

        let at = self.ensure_boundary(pos);
        self.blocks.splice(at..at, [BlockSlot::empty(pos, count)]);

        self.len += count;
        self.normalize();
        Ok(())
    }

    /// Removes the inclusive range `[a, b]`, shrinking the vector.
    ///
    /// Managed elements in the range are released via their overwrite hook.
    ///
    /// # Errors
    ///
    /// `InvalidArg` if `a > b`, `OutOfBounds` if `b` exceeds the vector.
    pub fn erase(&mut self, a: usize, b: usize) -> Result<()> {
        if a > b {
            return Err(Error::InvalidArg("inverted range"));
        }

        if b >= self.len {
            return Err(Error::OutOfBounds {
                pos: b,
                size: self.len,
            });
        }

        let start = self.ensure_boundary(a);
        let end = self.ensure_boundary(b + 1);

        for slot in &mut self.blocks[start..end] {
            if let Some(data) = &mut slot.data {
                data.overwrite(0, data.len());
            }
        }

        self.blocks.drain(start..end);
        self.len -= b - a + 1;

        self.normalize();
        Ok(())
    }

    /// Extends the vector with empty positions, or truncates it.
    pub fn resize(&mut self, n: usize) {
        use std::cmp::Ordering::{Equal, Greater, Less};

        match n.cmp(&self.len) {
            Equal => {}
            Greater => {
                // Appending at the tail cannot fail.
                let _ = self.insert_empty(self.len, n - self.len);
            }
            Less if n == 0 => self.clear(),
            Less => {
                let _ = self.erase(n, self.len - 1);
            }
        }
    }

    /// Drops all blocks and resets the length to zero.
    pub fn clear(&mut self) {
        for slot in &mut self.blocks {
            if let Some(data) = &mut slot.data {
                data.overwrite(0, data.len());
            }
        }

        self.blocks.clear();
        self.len = 0;
    }

    /// Appends one element at the tail.
    pub fn push_back(&mut self, value: impl Into<Element<U>>) {
        let pos = self.len;
        let data = ElementBlock::from_element(value.into());

        self.blocks.push(BlockSlot::filled(pos, data));
        self.len += 1;
        self.normalize();
    }

    /// Appends one empty position at the tail.
    pub fn push_back_empty(&mut self) {
        let pos = self.len;

        self.blocks.push(BlockSlot::empty(pos, 1));
        self.len += 1;
        self.normalize();
    }

    /// Takes the user element at `pos` out of the vector, leaving the
    /// position empty. The managed-overwrite hook is *not* run; the caller
    /// owns the resource now.
    ///
    /// # Errors
    ///
    /// `OutOfBounds` if `pos` exceeds the vector, `TypeMismatch` if the
    /// position does not hold a user element.
    pub fn release(&mut self, pos: usize) -> Result<U> {
        let (idx, _) = self.locate(pos)?;

        if self.blocks[idx].element_type() != ElementType::User {
            return Err(Error::TypeMismatch {
                expected: ElementType::User,
                actual: self.blocks[idx].element_type(),
            });
        }

        let start = self.ensure_boundary(pos);
        let end = self.ensure_boundary(pos + 1);
        debug_assert_eq!(start + 1, end);

        let slot = &mut self.blocks[start];
        let taken = match &mut slot.data {
            Some(data) => data.take_user(0)?,
            None => {
                return Err(Error::TypeMismatch {
                    expected: ElementType::User,
                    actual: ElementType::Empty,
                });
            }
        };

        *slot = BlockSlot::empty(pos, 1);

        self.normalize();
        Ok(taken)
    }

    /// Takes all user elements in the inclusive range `[a, b]` out of the
    /// vector, leaving the range empty. The managed-overwrite hook is
    /// *not* run.
    ///
    /// # Errors
    ///
    /// `InvalidArg` if `a > b`, `OutOfBounds` if `b` exceeds the vector,
    /// `TypeMismatch` if any position in the range does not hold a user
    /// element.
    pub fn release_range(&mut self, a: usize, b: usize) -> Result<Vec<U>> {
        if a > b {
            return Err(Error::InvalidArg("inverted range"));
        }

        if b >= self.len {
            return Err(Error::OutOfBounds {
                pos: b,
                size: self.len,
            });
        }

        // Validate before mutating anything.
        for pos in a..=b {
            let (idx, _) = self.locate(pos)?;

            if self.blocks[idx].element_type() != ElementType::User {
                return Err(Error::TypeMismatch {
                    expected: ElementType::User,
                    actual: self.blocks[idx].element_type(),
                });
            }
        }

        let start = self.ensure_boundary(a);
        let end = self.ensure_boundary(b + 1);

        let mut taken = Vec::with_capacity(b - a + 1);

        for slot in &mut self.blocks[start..end] {
            if let Some(ElementBlock::User(data)) = &mut slot.data {
                taken.append(data);
            }
            slot.data = None;
        }

        self.blocks
            .splice(start..end, [BlockSlot::empty(a, b - a + 1)]);

        self.normalize();
        Ok(taken)
    }

    /// Moves the elements in `[a, b]` of `self` into `dst` starting at
    /// `dst_pos`. The source range becomes empty; the destination's prior
    /// elements in that range are overwritten (managed hooks run on them).
    /// Neither vector changes length.
    ///
    /// Self-transfer is unrepresentable: `self` and `dst` are two distinct
    /// `&mut` borrows.
    ///
    /// # Errors
    ///
    /// `InvalidArg` if `a > b`, `OutOfBounds` if either range does not fit.
    pub fn transfer(&mut self, a: usize, b: usize, dst: &mut Self, dst_pos: usize) -> Result<()> {
        if a > b {
            return Err(Error::InvalidArg("inverted range"));
        }

        if b >= self.len {
            return Err(Error::OutOfBounds {
                pos: b,
                size: self.len,
            });
        }

        let count = b - a + 1;

        if dst_pos + count > dst.len {
            return Err(Error::OutOfBounds {
                pos: dst_pos + count,
                size: dst.len,
            });
        }

        let start = self.ensure_boundary(a);
        let end = self.ensure_boundary(b + 1);

        // Move the source blocks out; the source range becomes empty.
        // No hooks run: the elements live on in the destination.
        let moved: Vec<BlockSlot<U>> = self
            .blocks
            .splice(start..end, [BlockSlot::empty(a, count)])
            .collect();

        let dst_start = dst.ensure_boundary(dst_pos);
        let dst_end = dst.ensure_boundary(dst_pos + count);

        for slot in &mut dst.blocks[dst_start..dst_end] {
            if let Some(data) = &mut slot.data {
                data.overwrite(0, data.len());
            }
        }

        dst.blocks.splice(dst_start..dst_end, moved);

        self.normalize();
        dst.normalize();
        Ok(())
    }

    /// Exchanges the elements in `[a, b]` of `self` with the equally-sized
    /// range of `other` starting at `other_pos`.
    ///
    /// # Errors
    ///
    /// `InvalidArg` if `a > b`, `OutOfBounds` if either range does not fit.
    pub fn swap(&mut self, a: usize, b: usize, other: &mut Self, other_pos: usize) -> Result<()> {
        if a > b {
            return Err(Error::InvalidArg("inverted range"));
        }

        if b >= self.len {
            return Err(Error::OutOfBounds {
                pos: b,
                size: self.len,
            });
        }

        let count = b - a + 1;

        if other_pos + count > other.len {
            return Err(Error::OutOfBounds {
                pos: other_pos + count,
                size: other.len,
            });
        }

        let start = self.ensure_boundary(a);
        let end = self.ensure_boundary(b + 1);
        let mine: Vec<BlockSlot<U>> = self.blocks.drain(start..end).collect();

        let other_start = other.ensure_boundary(other_pos);
        let other_end = other.ensure_boundary(other_pos + count);
        let theirs: Vec<BlockSlot<U>> = other
            .blocks
            .splice(other_start..other_end, mine)
            .collect();

        self.blocks.splice(start..start, theirs);

        self.normalize();
        other.normalize();
        Ok(())
    }

    /// Returns a cursor referring to the block and offset at `pos`.
    ///
    /// # Errors
    ///
    /// `OutOfBounds` if `pos` exceeds the vector.
    pub fn position(&self, pos: usize) -> Result<Position> {
        let (block, offset) = self.locate(pos)?;
        Ok(Position { block, offset })
    }

    /// Returns a cursor for `pos`, starting the lookup at `hint`.
    ///
    /// Amortised O(1) when `pos` is at or after the hinted block.
    ///
    /// # Errors
    ///
    /// `OutOfBounds` if `pos` exceeds the vector.
    pub fn position_with_hint(&self, hint: Position, pos: usize) -> Result<Position> {
        let (block, offset) = self.locate_with_hint(hint, pos)?;
        Ok(Position { block, offset })
    }

    /// Dereferences a cursor into a block view.
    #[must_use]
    pub fn block_at(&self, position: Position) -> Option<BlockRef<'_, U>> {
        self.blocks.get(position.block).map(BlockSlot::as_ref)
    }

    /// Iterates over the vector's blocks in position order.
    #[must_use]
    pub fn iter_blocks(&self) -> BlockIter<'_, U> {
        BlockIter {
            inner: self.blocks.iter(),
        }
    }

    /// Deep copy that works for move-only user element types by failing
    /// gracefully.
    ///
    /// # Errors
    ///
    /// `Capability` if the user element type is move-only and the vector
    /// holds user elements.
    pub fn try_clone(&self) -> Result<Self> {
        let mut blocks = Vec::with_capacity(self.blocks.len());

        for slot in &self.blocks {
            let data = match &slot.data {
                Some(data) => Some(data.try_clone()?),
                None => None,
            };

            blocks.push(BlockSlot {
                position: slot.position,
                size: slot.size,
                data,
            });
        }

        Ok(Self {
            blocks,
            len: self.len,
        })
    }

    /// Verifies the block invariants, reporting the first violation.
    ///
    /// # Errors
    ///
    /// `Integrity` describing the violated invariant.
    pub fn check_integrity(&self) -> Result<()> {
        let mut expected_position = 0;
        let mut prev_type: Option<ElementType> = None;

        for (idx, slot) in self.blocks.iter().enumerate() {
            if slot.position != expected_position {
                return Err(Error::Integrity(format!(
                    "block {idx} starts at {} (expected {expected_position})",
                    slot.position,
                )));
            }

            if slot.size == 0 {
                return Err(Error::Integrity(format!("block {idx} has zero size")));
            }

            if let Some(data) = &slot.data {
                if data.len() != slot.size {
                    return Err(Error::Integrity(format!(
                        "block {idx} size {} does not match its storage length {}",
                        slot.size,
                        data.len(),
                    )));
                }
            }

            let block_type = slot.element_type();

            if prev_type == Some(block_type) {
                return Err(Error::Integrity(format!(
                    "blocks {} and {idx} are adjacent and share type {block_type:?}",
                    idx - 1,
                )));
            }

            prev_type = Some(block_type);
            expected_position += slot.size;
        }

        if expected_position != self.len {
            return Err(Error::Integrity(format!(
                "block sizes sum to {expected_position}, vector length is {}",
                self.len,
            )));
        }

        Ok(())
    }

    fn extract<T: TypedValue<U>>(&self, idx: usize, offset: usize) -> Result<T> {
        let slot = &self.blocks[idx];

        slot.data
            .as_ref()
            .and_then(|data| T::extract(data, offset))
            .ok_or(Error::TypeMismatch {
                expected: T::TYPE,
                actual: slot.element_type(),
            })
    }

    fn locate(&self, pos: usize) -> Result<(usize, usize)> {
        if pos >= self.len {
            return Err(Error::OutOfBounds {
                pos,
                size: self.len,
            });
        }

        let idx = partition_point(&self.blocks, |slot| slot.position + slot.size <= pos);
        debug_assert!(idx < self.blocks.len());

        Ok((idx, pos - self.blocks[idx].position))
    }

    fn locate_with_hint(&self, hint: Position, pos: usize) -> Result<(usize, usize)> {
        if pos >= self.len {
            return Err(Error::OutOfBounds {
                pos,
                size: self.len,
            });
        }

        let mut idx = hint.block;

        if idx >= self.blocks.len() || self.blocks[idx].position > pos {
            // Stale or unrelated hint: fall back to a full lookup.
            return self.locate(pos);
        }

        while self.blocks[idx].position + self.blocks[idx].size <= pos {
            idx += 1;
        }

        Ok((idx, pos - self.blocks[idx].position))
    }

    /// Ensures a block boundary exists at `pos` and returns the index of
    /// the block starting there (`block_count` when `pos == len`).
    fn ensure_boundary(&mut self, pos: usize) -> usize {
        if pos == self.len {
            return self.blocks.len();
        }

        let idx = partition_point(&self.blocks, |slot| slot.position + slot.size <= pos);
        let slot = &mut self.blocks[idx];
        let offset = pos - slot.position;

        if offset == 0 {
            return idx;
        }

        let tail_size = slot.size - offset;
        let tail_data = slot.data.as_mut().map(|data| data.split_off(offset));

        slot.size = offset;

        let tail = BlockSlot {
            position: pos,
            size: tail_size,
            data: tail_data,
        };

        self.blocks.insert(idx + 1, tail);
        idx + 1
    }

    /// Re-establishes the block invariants: removes zero-sized blocks,
    /// merges equally-typed and empty neighbours, recomputes positions.
    fn normalize(&mut self) {
        let old = std::mem::take(&mut self.blocks);
        let mut merged: Vec<BlockSlot<U>> = Vec::with_capacity(old.len());

        for mut slot in old {
            if slot.size == 0 {
                continue;
            }

            let slot_type = slot.data.as_ref().map(ElementBlock::element_type);

            if let Some(last) = merged.last_mut() {
                let last_type = last.data.as_ref().map(ElementBlock::element_type);

                if last_type == slot_type {
                    last.size += slot.size;

                    if let (Some(dst), Some(src)) = (last.data.as_mut(), slot.data.take()) {
                        debug_assert_eq!(dst.element_type(), src.element_type());
                        let _ = dst.append(src);
                    }

                    continue;
                }
            }

            merged.push(slot);
        }

        let mut position = 0;

        for slot in &mut merged {
            slot.position = position;
            position += slot.size;
        }

        debug_assert_eq!(position, self.len);
        self.blocks = merged;
    }
}

fn block_of_repeated<U: UserElement + Clone>(element: Element<U>, n: usize) -> ElementBlock<U> {
    match element {
        Element::Numeric(v) => ElementBlock::Numeric(vec![v; n]),
        Element::Integer(v) => ElementBlock::Integer(vec![v; n]),
        Element::Boolean(v) => ElementBlock::Boolean(vec![v; n]),
        Element::String(v) => ElementBlock::String(vec![v; n]),
        Element::User(v) => ElementBlock::User(vec![v; n]),
    }
}

/// Decomposes a run of elements into one block slot per maximal
/// equally-typed sub-run.
fn slots_from_elements<U: UserElement>(
    start_pos: usize,
    values: Vec<Element<U>>,
) -> Vec<BlockSlot<U>> {
    let mut slots: Vec<BlockSlot<U>> = Vec::new();
    let mut position = start_pos;

    for value in values {
        if let Some(last) = slots.last_mut() {
            let last_type = last
                .data
                .as_ref()
                .map_or(ElementType::Empty, ElementBlock::element_type);

            if last_type == value.element_type() {
                if let Some(data) = &mut last.data {
                    let _ = data.push(value);
                    last.size += 1;
                    position += 1;
                    continue;
                }
            }
        }

        slots.push(BlockSlot::filled(
            position,
            ElementBlock::from_element(value),
        ));
        position += 1;
    }

    slots
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    type Vector = MultiTypeVector;

    #[test]
    fn vector_new_is_all_empty() {
        let db = Vector::new(4);

        assert_eq!(4, db.len());
        assert_eq!(1, db.block_count());
        assert!(db.is_empty_at(0).expect("in range"));
        assert!(db.is_empty_at(3).expect("in range"));
        db.check_integrity().expect("invariants hold");
    }

    #[test]
    fn vector_set_splits_middle_block() {
        let mut db = Vector::new(5);
        db.set(2, 1.5).expect("in range");

        // empty(2) | numeric(1) | empty(2)
        assert_eq!(3, db.block_count());
        assert_eq!(1.5, db.get::<f64>(2).expect("numeric"));
        assert!(db.is_empty_at(1).expect("in range"));
        assert!(db.is_empty_at(3).expect("in range"));
        db.check_integrity().expect("invariants hold");
    }

    #[test]
    fn vector_adjacent_same_type_blocks_merge() {
        let mut db = Vector::new(4);
        db.set(1, 1i64).expect("in range");
        db.set(2, 2i64).expect("in range");

        // empty(1) | integer(2) | empty(1)
        assert_eq!(3, db.block_count());
        assert_eq!(1, db.get::<i64>(1).expect("integer"));
        assert_eq!(2, db.get::<i64>(2).expect("integer"));
        db.check_integrity().expect("invariants hold");
    }

    #[test]
    fn vector_set_same_type_in_place() {
        let mut db = Vector::with_value(3, 0.0);
        assert_eq!(1, db.block_count());

        db.set(1, 9.5).expect("in range");
        assert_eq!(1, db.block_count());
        assert_eq!(9.5, db.get::<f64>(1).expect("numeric"));
    }

    #[test]
    fn vector_get_type_mismatch() {
        let mut db = Vector::new(2);
        db.set(0, "text").expect("in range");

        let err = db.get::<f64>(0).expect_err("wrong type");
        assert_eq!(
            Error::TypeMismatch {
                expected: ElementType::Numeric,
                actual: ElementType::String,
            },
            err,
        );

        let err = db.get::<f64>(1).expect_err("empty position");
        assert_eq!(
            Error::TypeMismatch {
                expected: ElementType::Numeric,
                actual: ElementType::Empty,
            },
            err,
        );
    }

    #[test]
    fn vector_set_round_trip_is_noop() {
        let mut db = Vector::new(4);
        db.set(1, 42i64).expect("in range");

        let before = db.clone();
        let value = db.get::<i64>(1).expect("integer");
        db.set(1, value).expect("in range");

        assert_eq!(before, db);
    }

    #[test]
    fn vector_set_range_spanning_blocks() {
        let mut db = Vector::new(6);
        db.set(0, 1.0).expect("in range");
        db.set(5, true).expect("in range");

        db.set_range(1, ["a", "b", "c"]).expect("fits");

        assert_eq!(1.0, db.get::<f64>(0).expect("numeric"));
        assert_eq!("b", db.get_str(2).expect("string"));
        assert!(db.is_empty_at(4).expect("in range"));
        assert!(db.get::<bool>(5).expect("boolean"));
        db.check_integrity().expect("invariants hold");
    }

    #[test]
    fn vector_set_range_out_of_bounds_is_untouched() {
        let mut db = Vector::new(3);
        db.set(0, 1.0).expect("in range");

        let before = db.clone();
        let err = db.set_range(2, [1.0, 2.0]).expect_err("does not fit");

        assert!(matches!(err, Error::OutOfBounds { .. }));
        assert_eq!(before, db);
    }

    #[test]
    fn vector_insert_grows() {
        let mut db = Vector::new(3);
        db.set(1, 5i64).expect("in range");

        db.insert(1, [1.0, 2.0]).expect("in range");

        assert_eq!(5, db.len());
        assert!(db.is_empty_at(0).expect("in range"));
        assert_eq!(1.0, db.get::<f64>(1).expect("numeric"));
        assert_eq!(2.0, db.get::<f64>(2).expect("numeric"));
        assert_eq!(5, db.get::<i64>(3).expect("integer"));
        db.check_integrity().expect("invariants hold");
    }

    #[test]
    fn vector_erase_merges_neighbours() {
        let mut db = Vector::new(6);
        db.set(0, 1.0).expect("in range");
        db.set(1, 2.0).expect("in range");
        db.set(2, "x").expect("in range");
        db.set(3, 3.0).expect("in range");

        db.erase(2, 2).expect("in range");

        assert_eq!(5, db.len());
        // numeric(3) | empty(2)
        assert_eq!(2, db.block_count());
        assert_eq!(3.0, db.get::<f64>(2).expect("numeric"));
        db.check_integrity().expect("invariants hold");
    }

    #[test]
    fn vector_set_empty_collapses() {
        let mut db = Vector::new(5);
        db.set_range(0, [1.0, 2.0, 3.0, 4.0, 5.0]).expect("fits");

        db.set_empty(1, 3).expect("in range");

        assert_eq!(3, db.block_count());
        assert!(db.is_empty_at(2).expect("in range"));
        assert_eq!(5.0, db.get::<f64>(4).expect("numeric"));
        db.check_integrity().expect("invariants hold");
    }

    #[test]
    fn vector_resize_and_push() {
        let mut db = Vector::new(0);
        assert!(db.is_empty());

        db.push_back(1.0);
        db.push_back(2.0);
        db.push_back_empty();
        assert_eq!(3, db.len());
        assert_eq!(2, db.block_count());

        db.resize(5);
        assert_eq!(5, db.len());
        assert_eq!(2, db.block_count());

        db.resize(1);
        assert_eq!(1, db.len());
        assert_eq!(1.0, db.get::<f64>(0).expect("numeric"));
        db.check_integrity().expect("invariants hold");
    }

    #[test]
    fn vector_position_hints() {
        let mut db = Vector::new(10);
        db.set_range(0, [1.0, 2.0, 3.0]).expect("fits");
        db.set(5, "x").expect("in range");

        let hint = db.position(0).expect("in range");
        assert_eq!(0, hint.block());

        let at_five = db.position_with_hint(hint, 5).expect("in range");
        let block = db.block_at(at_five).expect("valid");
        assert_eq!(ElementType::String, block.element_type);

        // A hint past the target position falls back to a full lookup.
        let back = db.position_with_hint(at_five, 1).expect("in range");
        assert_eq!(0, back.block());
        assert_eq!(1, back.offset());
    }

    #[test]
    fn vector_block_iteration() {
        let mut db = Vector::new(6);
        db.set_range(0, [1.0, 2.0]).expect("fits");
        db.set(4, true).expect("in range");

        let kinds: Vec<(ElementType, usize)> = db
            .iter_blocks()
            .map(|b| (b.element_type, b.size))
            .collect();

        assert_eq!(
            vec![
                (ElementType::Numeric, 2),
                (ElementType::Empty, 2),
                (ElementType::Boolean, 1),
                (ElementType::Empty, 1),
            ],
            kinds,
        );

        let reversed: Vec<usize> = db.iter_blocks().rev().map(|b| b.position).collect();
        assert_eq!(vec![5, 4, 2, 0], reversed);
    }

    #[test]
    fn vector_swap_ranges() {
        let mut db1 = Vector::new(4);
        let mut db2 = Vector::new(4);
        db1.set_range(0, [1.0, 2.0, 3.0, 4.0]).expect("fits");
        db2.set_range(0, ["a", "b", "c", "d"]).expect("fits");

        db1.swap(1, 2, &mut db2, 1).expect("fits");

        assert_eq!("b", db1.get_str(1).expect("string"));
        assert_eq!("c", db1.get_str(2).expect("string"));
        assert_eq!(2.0, db2.get::<f64>(1).expect("numeric"));
        assert_eq!(3.0, db2.get::<f64>(2).expect("numeric"));
        assert_eq!(4, db1.len());
        assert_eq!(4, db2.len());
        db1.check_integrity().expect("invariants hold");
        db2.check_integrity().expect("invariants hold");
    }
}
