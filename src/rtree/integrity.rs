// Copyright (c) 2024-present, grid-index
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use super::extent::Coord;
use super::node::{NodeIndex, NodeKind};
use super::{Error, RTree, RTreeTraits, Result};

/// Options for [`RTree::check_integrity`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IntegrityCheckProps {
    /// When `true`, the first violation raises immediately; otherwise all
    /// violations are collected into one aggregate report.
    pub throw_on_first_error: bool,
}

impl<K: Coord, V, const D: usize, T: RTreeTraits> RTree<K, V, D, T> {
    /// Slow verification of the structural invariants: parent round-trips,
    /// exact directory MBRs, child-count bounds, uniform value depth and a
    /// value count matching `size()`.
    ///
    /// # Errors
    ///
    /// `Integrity` with either the first violation or the aggregate report,
    /// depending on `props`.
    pub fn check_integrity(&self, props: IntegrityCheckProps) -> Result<()> {
        let mut violations: Vec<String> = Vec::new();
        let mut value_count = 0usize;
        let mut value_depth: Option<usize> = None;

        let root = self.root_index();

        if let Some(record) = self.node_at(root) {
            if record.parent.is_some() {
                let msg = "root carries a parent link".to_string();

                if props.throw_on_first_error {
                    return Err(Error::Integrity(msg));
                }

                violations.push(msg);
            }
        } else {
            return Err(Error::Integrity("root node is not live".into()));
        }

        let mut stack: Vec<(NodeIndex, usize)> = vec![(root, 0)];

        while let Some((idx, depth)) = stack.pop() {
            let Some(record) = self.node_at(idx) else {
                let msg = format!("dangling child index {idx}");

                if props.throw_on_first_error {
                    return Err(Error::Integrity(msg));
                }

                violations.push(msg);
                continue;
            };

            if depth > T::MAX_TREE_DEPTH {
                let msg = format!("node at depth {depth} exceeds the maximum tree depth");

                if props.throw_on_first_error {
                    return Err(Error::Integrity(msg));
                }

                violations.push(msg);
            }

            match &record.kind {
                NodeKind::Value(_) => {
                    value_count += 1;

                    match value_depth {
                        None => value_depth = Some(depth),
                        Some(expected) if expected != depth => {
                            let msg = format!(
                                "value node at depth {depth}, expected depth {expected}",
                            );

                            if props.throw_on_first_error {
                                return Err(Error::Integrity(msg));
                            }

                            violations.push(msg);
                        }
                        Some(_) => {}
                    }
                }
                NodeKind::Leaf(children) | NodeKind::Dir(children) => {
                    let count = children.len();

                    let count_ok = if idx == root {
                        count <= T::MAX_NODE_SIZE
                    } else {
                        (T::MIN_NODE_SIZE..=T::MAX_NODE_SIZE).contains(&count)
                    };

                    if !count_ok {
                        let msg = format!(
                            "directory with {count} children violates the {}..={} bound",
                            T::MIN_NODE_SIZE,
                            T::MAX_NODE_SIZE,
                        );

                        if props.throw_on_first_error {
                            return Err(Error::Integrity(msg));
                        }

                        violations.push(msg);
                    }

                    let expect_values = matches!(record.kind, NodeKind::Leaf(_));

                    for &child in children {
                        let Some(child_record) = self.node_at(child) else {
                            let msg = format!("dangling child index {child}");

                            if props.throw_on_first_error {
                                return Err(Error::Integrity(msg));
                            }

                            violations.push(msg);
                            continue;
                        };

                        if child_record.parent != Some(idx) {
                            let msg = format!(
                                "parent link of node {child} does not round-trip",
                            );

                            if props.throw_on_first_error {
                                return Err(Error::Integrity(msg));
                            }

                            violations.push(msg);
                        }

                        let child_is_value = !child_record.is_directory();

                        if child_is_value != expect_values {
                            let msg = format!(
                                "directory {idx} mixes value and directory children",
                            );

                            if props.throw_on_first_error {
                                return Err(Error::Integrity(msg));
                            }

                            violations.push(msg);
                        }

                        stack.push((child, depth + 1));
                    }

                    if !children.is_empty() {
                        let snapshot: Vec<NodeIndex> = children.to_vec();
                        let expected = self.extent_over_for_check(&snapshot);

                        if expected != record.extent {
                            let msg = format!(
                                "directory extent {} is not the union of its children ({expected})",
                                record.extent,
                            );

                            if props.throw_on_first_error {
                                return Err(Error::Integrity(msg));
                            }

                            violations.push(msg);
                        }
                    }
                }
            }
        }

        if value_count != self.size() {
            let msg = format!(
                "reachable value count {value_count} does not match size {}",
                self.size(),
            );

            if props.throw_on_first_error {
                return Err(Error::Integrity(msg));
            }

            violations.push(msg);
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(Error::Integrity(violations.join("; ")))
        }
    }

    fn extent_over_for_check(&self, children: &[NodeIndex]) -> super::Extent<K, D> {
        let mut iter = children.iter().filter_map(|&c| self.node_at(c));

        let Some(first) = iter.next() else {
            return super::Extent::default();
        };

        let mut bb = first.extent;

        for record in iter {
            bb.extend_to(&record.extent);
        }

        bb
    }
}
