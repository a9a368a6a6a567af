// Copyright (c) 2024-present, grid-index
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use crate::element::ElementType;

/// Represents errors that can occur in any of the index containers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Index or position outside the container's size
    OutOfBounds {
        /// Offending position
        pos: usize,

        /// Container size at the time of the call
        size: usize,
    },

    /// A typed read or write hit a block of a different element type
    TypeMismatch {
        /// Type the caller asked for
        expected: ElementType,

        /// Type actually stored at that position
        actual: ElementType,
    },

    /// Invalid argument (inverted interval, empty range, ...)
    InvalidArg(&'static str),

    /// Point, key or extent lookup has no match
    NotFound,

    /// Tree search was attempted before `build_tree`, or after an
    /// invalidating mutation
    InvalidTree,

    /// A structural invariant was violated (reported by integrity checks)
    Integrity(String),

    /// Operation unsupported by the stored value type
    /// (e.g. cloning a move-only block)
    Capability(&'static str),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OutOfBounds { pos, size } => {
                write!(f, "position {pos} out of bounds (size={size})")
            }
            Self::TypeMismatch { expected, actual } => {
                write!(f, "type mismatch (expected={expected:?}, actual={actual:?})")
            }
            Self::InvalidArg(msg) => write!(f, "invalid argument: {msg}"),
            Self::NotFound => write!(f, "not found"),
            Self::InvalidTree => write!(f, "tree is not in a valid state"),
            Self::Integrity(report) => write!(f, "integrity violation: {report}"),
            Self::Capability(msg) => write!(f, "unsupported by value type: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

/// Container result
pub type Result<T> = std::result::Result<T, Error>;
