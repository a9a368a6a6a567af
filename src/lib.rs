// Copyright (c) 2024-present, grid-index
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! Multi-dimensional indexing data structures for grid-like engines.
//!
//! This crate collects the containers a spreadsheet- or database-style
//! engine needs to index rows, columns, ranges and 2-D objects:
//!
//! - [`MultiTypeVector`] — a sequence of logical positions partitioned into
//!   typed blocks, with position hints for fast sequential mutation
//! - [`MixedTypeMatrix`] — a dense- or sparse-backed 2-D matrix of
//!   mixed-type cells
//! - [`FlatSegmentTree`] — a painted 1-D segmentation with an on-demand
//!   balanced lookup tree
//! - [`SegmentTree`] — a static stabbing-query tree over intervals
//! - [`PointQuadTree`] — a dynamic 2-D point index with window search
//! - [`rtree::RTree`] — a dynamic k-D rectangle index following the
//!   R\*-tree design, with an STR bulk loader
//!
//! The containers are independent; pick the one that fits. All of them are
//! single-threaded: share a container across threads only while nobody
//! writes to it.
//!
//! # Example
//!
//! ```
//! use grid_index::FlatSegmentTree;
//!
//! // Paint per-row heights: rows 0..100 default to 20 units.
//! let mut heights = FlatSegmentTree::new(0, 100, 20u32);
//! heights.insert_segment(10, 20, 35);
//! heights.insert_segment(20, 24, 35); // merges with the previous segment
//!
//! heights.build_tree();
//!
//! let row = heights.search_tree(15).expect("inside the span");
//! assert_eq!((35, 10, 24), (row.value, row.start, row.end));
//!
//! // Delete rows 12..14 from the axis; everything shifts left.
//! heights.shift_segment_left(12, 14);
//! assert_eq!(22, heights.search(15).expect("inside the span").end);
//! ```

#![forbid(unsafe_code)]
#![deny(clippy::all, clippy::cargo)]
#![deny(clippy::unwrap_used)]
#![warn(missing_docs)]
#![warn(clippy::pedantic, clippy::nursery)]
#![warn(clippy::expect_used)]
#![allow(clippy::missing_const_for_fn)]
#![warn(clippy::multiple_crate_versions)]
#![allow(clippy::option_if_let_else)]

mod binary_search;
mod error;

pub mod element;
pub mod flat_tree;
pub mod matrix;
pub mod quad_tree;
pub mod rtree;
pub mod segment_tree;
pub mod vector;

pub use element::{Element, ElementBlock, ElementType, NoUserElement, TypedValue, UserElement};
pub use error::{Error, Result};
pub use flat_tree::{FlatSegmentTree, SegmentSpan};
pub use matrix::{Density, MatrixCellRef, MatrixElement, MixedTypeMatrix};
pub use quad_tree::{PointEntry, PointQuadTree};
pub use rtree::RTree;
pub use segment_tree::{SegmentTree, Stab};
pub use vector::{BlockIter, BlockRef, MultiTypeVector, Position};
