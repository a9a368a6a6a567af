// Copyright (c) 2024-present, grid-index
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use super::{Element, ElementType, UserElement};
use crate::{Error, Result};

macro_rules! dispatch {
    ($self:expr, $data:ident => $body:expr) => {
        match $self {
            Self::Numeric($data) => $body,
            Self::Integer($data) => $body,
            Self::Boolean($data) => $body,
            Self::String($data) => $body,
            Self::User($data) => $body,
        }
    };
}

/// A homogeneous run of elements of a single type.
///
/// Blocks are the storage unit of the multi-type vector: every non-empty
/// region of a vector is backed by exactly one block. Empty regions hold no
/// block at all, so there is no `Empty` variant here.
#[derive(Clone, Debug, PartialEq)]
pub enum ElementBlock<U = super::NoUserElement> {
    /// Floats
    Numeric(Vec<f64>),

    /// Signed integers
    Integer(Vec<i64>),

    /// Booleans
    Boolean(Vec<bool>),

    /// Owned strings
    String(Vec<String>),

    /// User-defined elements
    User(Vec<U>),
}

impl<U> ElementBlock<U> {
    /// Creates a single-element block holding `element`.
    #[must_use]
    pub fn from_element(element: Element<U>) -> Self {
        match element {
            Element::Numeric(v) => Self::Numeric(vec![v]),
            Element::Integer(v) => Self::Integer(vec![v]),
            Element::Boolean(v) => Self::Boolean(vec![v]),
            Element::String(v) => Self::String(vec![v]),
            Element::User(v) => Self::User(vec![v]),
        }
    }

    /// Returns the block's type tag.
    #[must_use]
    pub fn element_type(&self) -> ElementType {
        match self {
            Self::Numeric(_) => ElementType::Numeric,
            Self::Integer(_) => ElementType::Integer,
            Self::Boolean(_) => ElementType::Boolean,
            Self::String(_) => ElementType::String,
            Self::User(_) => ElementType::User,
        }
    }

    /// Number of elements in the block.
    #[must_use]
    pub fn len(&self) -> usize {
        dispatch!(self, data => data.len())
    }

    /// Whether the block holds no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Splits the block at `at`, returning the tail half.
    #[must_use]
    pub fn split_off(&mut self, at: usize) -> Self {
        match self {
            Self::Numeric(data) => Self::Numeric(data.split_off(at)),
            Self::Integer(data) => Self::Integer(data.split_off(at)),
            Self::Boolean(data) => Self::Boolean(data.split_off(at)),
            Self::String(data) => Self::String(data.split_off(at)),
            Self::User(data) => Self::User(data.split_off(at)),
        }
    }

    /// Borrows the user element at `i`.
    #[must_use]
    pub fn user_at(&self, i: usize) -> Option<&U> {
        match self {
            Self::User(data) => data.get(i),
            _ => None,
        }
    }

    /// Borrows the string element at `i`.
    #[must_use]
    pub fn str_at(&self, i: usize) -> Option<&str> {
        match self {
            Self::String(data) => data.get(i).map(String::as_str),
            _ => None,
        }
    }

    /// Appends one element at the tail.
    ///
    /// # Errors
    ///
    /// `TypeMismatch` if `element` is of a different type than the block.
    pub fn push(&mut self, element: Element<U>) -> Result<()> {
        match (&mut *self, element) {
            (Self::Numeric(data), Element::Numeric(v)) => data.push(v),
            (Self::Integer(data), Element::Integer(v)) => data.push(v),
            (Self::Boolean(data), Element::Boolean(v)) => data.push(v),
            (Self::String(data), Element::String(v)) => data.push(v),
            (Self::User(data), Element::User(v)) => data.push(v),
            (block, element) => {
                return Err(Error::TypeMismatch {
                    expected: block.element_type(),
                    actual: element.element_type(),
                });
            }
        }

        Ok(())
    }

    /// Prepends one element at the head.
    ///
    /// # Errors
    ///
    /// `TypeMismatch` if `element` is of a different type than the block.
    pub fn push_front(&mut self, element: Element<U>) -> Result<()> {
        self.insert_from(0, Self::from_element(element))
    }

    /// Moves all elements of `other` onto the tail of `self`.
    ///
    /// # Errors
    ///
    /// `TypeMismatch` if the blocks are of different types.
    pub fn append(&mut self, other: Self) -> Result<()> {
        self.insert_from(self.len(), other)
    }

    /// Splices all elements of `other` into `self` at `at`.
    ///
    /// # Errors
    ///
    /// `TypeMismatch` if the blocks are of different types, `OutOfBounds`
    /// if `at` exceeds the block.
    pub fn insert_from(&mut self, at: usize, other: Self) -> Result<()> {
        if at > self.len() {
            return Err(Error::OutOfBounds {
                pos: at,
                size: self.len(),
            });
        }

        match (&mut *self, other) {
            (Self::Numeric(data), Self::Numeric(src)) => {
                data.splice(at..at, src);
            }
            (Self::Integer(data), Self::Integer(src)) => {
                data.splice(at..at, src);
            }
            (Self::Boolean(data), Self::Boolean(src)) => {
                data.splice(at..at, src);
            }
            (Self::String(data), Self::String(src)) => {
                data.splice(at..at, src);
            }
            (Self::User(data), Self::User(src)) => {
                data.splice(at..at, src);
            }
            (block, other) => {
                return Err(Error::TypeMismatch {
                    expected: block.element_type(),
                    actual: other.element_type(),
                });
            }
        }

        Ok(())
    }

    /// Reads the element at `i` as an owned value.
    ///
    /// Returns `None` when out of bounds.
    #[must_use]
    pub fn element_at(&self, i: usize) -> Option<Element<U>>
    where
        U: Clone,
    {
        match self {
            Self::Numeric(data) => data.get(i).map(|v| Element::Numeric(*v)),
            Self::Integer(data) => data.get(i).map(|v| Element::Integer(*v)),
            Self::Boolean(data) => data.get(i).map(|v| Element::Boolean(*v)),
            Self::String(data) => data.get(i).map(|v| Element::String(v.clone())),
            Self::User(data) => data.get(i).map(|v| Element::User(v.clone())),
        }
    }
}

impl<U: UserElement> ElementBlock<U> {
    /// Allocates a block of the given type with `n` default elements.
    ///
    /// # Errors
    ///
    /// `InvalidArg` for [`ElementType::Empty`]; empty regions are
    /// represented at the vector layer without storage.
    pub fn new(element_type: ElementType, n: usize) -> Result<Self> {
        match element_type {
            ElementType::Empty => Err(Error::InvalidArg(
                "cannot allocate storage for the empty type",
            )),
            ElementType::Numeric => Ok(Self::Numeric(vec![0.0; n])),
            ElementType::Integer => Ok(Self::Integer(vec![0; n])),
            ElementType::Boolean => Ok(Self::Boolean(vec![false; n])),
            ElementType::String => Ok(Self::String(vec![String::new(); n])),
            ElementType::User => {
                let mut data = Vec::with_capacity(n);
                data.resize_with(n, U::default);
                Ok(Self::User(data))
            }
        }
    }

    /// Deep copy.
    ///
    /// # Errors
    ///
    /// `Capability` if the user element type is move-only.
    pub fn try_clone(&self) -> Result<Self> {
        self.clone_range(0, self.len())
    }

    /// Deep copy of the sub-range `[begin, begin + len)`.
    ///
    /// # Errors
    ///
    /// `OutOfBounds` if the range exceeds the block, `Capability` if the
    /// user element type is move-only.
    pub fn clone_range(&self, begin: usize, len: usize) -> Result<Self> {
        let end = begin + len;

        if end > self.len() {
            return Err(Error::OutOfBounds {
                pos: end,
                size: self.len(),
            });
        }

        match self {
            Self::Numeric(data) => Ok(Self::Numeric(data[begin..end].to_vec())),
            Self::Integer(data) => Ok(Self::Integer(data[begin..end].to_vec())),
            Self::Boolean(data) => Ok(Self::Boolean(data[begin..end].to_vec())),
            Self::String(data) => Ok(Self::String(data[begin..end].to_vec())),
            Self::User(data) => {
                let mut copy = Vec::with_capacity(len);

                for item in &data[begin..end] {
                    match item.try_clone() {
                        Some(cloned) => copy.push(cloned),
                        None => {
                            return Err(Error::Capability(
                                "user element type is move-only and cannot be cloned",
                            ));
                        }
                    }
                }

                Ok(Self::User(copy))
            }
        }
    }

    /// Grows (default-extending) or shrinks the block to `n` elements.
    ///
    /// Shrinking runs the managed-overwrite hook on the dropped tail.
    pub fn resize(&mut self, n: usize) {
        if n < self.len() {
            self.overwrite(n, self.len() - n);
        }

        match self {
            Self::Numeric(data) => data.resize(n, 0.0),
            Self::Integer(data) => data.resize(n, 0),
            Self::Boolean(data) => data.resize(n, false),
            Self::String(data) => data.resize_with(n, String::new),
            Self::User(data) => data.resize_with(n, U::default),
        }
    }

    /// Overwrites the element at `i`.
    ///
    /// Runs the managed-overwrite hook on the previous element first.
    ///
    /// # Errors
    ///
    /// `TypeMismatch` if `element` is of a different type than the block,
    /// `OutOfBounds` if `i` exceeds the block.
    pub fn set(&mut self, i: usize, element: Element<U>) -> Result<()> {
        if i >= self.len() {
            return Err(Error::OutOfBounds {
                pos: i,
                size: self.len(),
            });
        }

        self.overwrite(i, 1);

        match (&mut *self, element) {
            (Self::Numeric(data), Element::Numeric(v)) => data[i] = v,
            (Self::Integer(data), Element::Integer(v)) => data[i] = v,
            (Self::Boolean(data), Element::Boolean(v)) => data[i] = v,
            (Self::String(data), Element::String(v)) => data[i] = v,
            (Self::User(data), Element::User(v)) => data[i] = v,
            (block, element) => {
                return Err(Error::TypeMismatch {
                    expected: block.element_type(),
                    actual: element.element_type(),
                });
            }
        }

        Ok(())
    }

    /// Removes the elements in `[begin, begin + len)`.
    ///
    /// Runs the managed-overwrite hook on them first.
    pub fn erase(&mut self, begin: usize, len: usize) {
        self.overwrite(begin, len);

        let end = (begin + len).min(self.len());
        dispatch!(self, data => {
            data.drain(begin..end);
        });
    }

    /// Managed-destructor hook for the live elements in
    /// `[begin, begin + len)`; a no-op for plain blocks.
    pub fn overwrite(&mut self, begin: usize, len: usize) {
        if !U::MANAGED {
            return;
        }

        if let Self::User(data) = self {
            let end = (begin + len).min(data.len());

            for item in &mut data[begin..end] {
                item.on_overwrite();
            }
        }
    }

    /// Takes the user element at `i` out of the block, leaving a default
    /// one in its place. Does *not* run the managed-overwrite hook.
    ///
    /// # Errors
    ///
    /// `TypeMismatch` if the block is not a user block, `OutOfBounds` if
    /// `i` exceeds the block.
    pub fn take_user(&mut self, i: usize) -> Result<U> {
        let size = self.len();

        match self {
            Self::User(data) => data
                .get_mut(i)
                .map(std::mem::take)
                .ok_or(Error::OutOfBounds { pos: i, size }),
            _ => Err(Error::TypeMismatch {
                expected: ElementType::User,
                actual: self.element_type(),
            }),
        }
    }

    /// Appends clones of `src[begin, begin + len)` onto the tail.
    ///
    /// # Errors
    ///
    /// `TypeMismatch` for mixed block types, `Capability` for move-only
    /// user elements, `OutOfBounds` for an invalid source range.
    pub fn append_from(&mut self, src: &Self, begin: usize, len: usize) -> Result<()> {
        let copy = src.clone_range(begin, len)?;
        self.append(copy)
    }

    /// Replaces the whole block content with clones of
    /// `src[begin, begin + len)`.
    ///
    /// # Errors
    ///
    /// See [`Self::append_from`].
    pub fn assign_from(&mut self, src: &Self, begin: usize, len: usize) -> Result<()> {
        let copy = src.clone_range(begin, len)?;
        self.overwrite(0, self.len());
        *self = copy;
        Ok(())
    }

    /// Inserts clones of `src[begin, begin + len)` at the head.
    ///
    /// # Errors
    ///
    /// See [`Self::append_from`].
    pub fn prepend_from(&mut self, src: &Self, begin: usize, len: usize) -> Result<()> {
        let copy = src.clone_range(begin, len)?;
        self.insert_from(0, copy)
    }
}
