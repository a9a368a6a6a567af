// Copyright (c) 2024-present, grid-index
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! Typed element storage: the tagged value union and the homogeneous
//! block type that backs the multi-type vector.

mod block;

pub use block::ElementBlock;

/// Type tag carried by every block and element
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum ElementType {
    /// No value is stored
    Empty,

    /// 64-bit float
    Numeric,

    /// 64-bit signed integer
    Integer,

    /// Boolean
    Boolean,

    /// Owned string
    String,

    /// User-defined element type (see [`UserElement`])
    User,
}

/// Registration point for a user-defined element type.
///
/// A vector carries at most one user element type, supplied as its `U`
/// parameter. Implementations decide whether their elements are copyable
/// (`try_clone`) and whether they own resources that must be released
/// before container surgery overwrites them (`MANAGED` + `on_overwrite`).
pub trait UserElement: Default + PartialEq + std::fmt::Debug {
    /// Whether elements own external resources that must be released
    /// before they are overwritten or dropped by container surgery.
    const MANAGED: bool = false;

    /// Clones the element, or `None` for move-only types.
    ///
    /// Returning `None` makes block-level cloning fail with a capability
    /// error instead of silently duplicating a unique resource.
    fn try_clone(&self) -> Option<Self>;

    /// Hook invoked on each live element right before container surgery
    /// overwrites or drops it. Only called when `MANAGED` is `true`.
    ///
    /// `release`-style operations skip this hook, because the caller takes
    /// the resource with them.
    fn on_overwrite(&mut self) {}
}

/// Placeholder user element for vectors that only carry built-in types.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NoUserElement;

impl UserElement for NoUserElement {
    fn try_clone(&self) -> Option<Self> {
        Some(Self)
    }
}

/// An owned element value
///
/// `Empty` is intentionally not part of this union; emptiness is a property
/// of a vector region (`set_empty`, `insert_empty`), not a storable value.
#[derive(Clone, Debug, PartialEq)]
pub enum Element<U = NoUserElement> {
    /// 64-bit float
    Numeric(f64),

    /// 64-bit signed integer
    Integer(i64),

    /// Boolean
    Boolean(bool),

    /// Owned string
    String(String),

    /// User-defined element
    User(U),
}

impl<U> Element<U> {
    /// Returns the type tag of this value.
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

    /// Wraps a user-defined element.
    #[must_use]
    pub fn user(value: U) -> Self {
        Self::User(value)
    }
}

impl<U> From<f64> for Element<U> {
    fn from(value: f64) -> Self {
        Self::Numeric(value)
    }
}

impl<U> From<i64> for Element<U> {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl<U> From<i32> for Element<U> {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl<U> From<bool> for Element<U> {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl<U> From<String> for Element<U> {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl<U> From<&str> for Element<U> {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

/// Typed extraction of a built-in element value out of a block.
///
/// Implemented for `f64`, `i64`, `bool` and `String`; user elements are
/// accessed by reference (`get_user`) or taken out (`release`) instead,
/// because they may be move-only.
pub trait TypedValue<U>: Sized {
    /// Tag the implementing type corresponds to
    const TYPE: ElementType;

    /// Reads the value at `i`, or `None` if the block is of another type.
    fn extract(block: &ElementBlock<U>, i: usize) -> Option<Self>;
}

impl<U> TypedValue<U> for f64 {
    const TYPE: ElementType = ElementType::Numeric;

    fn extract(block: &ElementBlock<U>, i: usize) -> Option<Self> {
        match block {
            ElementBlock::Numeric(data) => data.get(i).copied(),
            _ => None,
        }
    }
}

impl<U> TypedValue<U> for i64 {
    const TYPE: ElementType = ElementType::Integer;

    fn extract(block: &ElementBlock<U>, i: usize) -> Option<Self> {
        match block {
            ElementBlock::Integer(data) => data.get(i).copied(),
            _ => None,
        }
    }
}

impl<U> TypedValue<U> for bool {
    const TYPE: ElementType = ElementType::Boolean;

    fn extract(block: &ElementBlock<U>, i: usize) -> Option<Self> {
        match block {
            ElementBlock::Boolean(data) => data.get(i).copied(),
            _ => None,
        }
    }
}

impl<U> TypedValue<U> for String {
    const TYPE: ElementType = ElementType::String;

    fn extract(block: &ElementBlock<U>, i: usize) -> Option<Self> {
        match block {
            ElementBlock::String(data) => data.get(i).cloned(),
            _ => None,
        }
    }
}
