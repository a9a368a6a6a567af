// Copyright (c) 2024-present, grid-index
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use super::extent::Coord;
use super::node::{NodeIndex, NodeKind, NodeType};
use super::{Error, RTree, RTreeTraits, Result};

/// Output format of [`RTree::export_tree`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportFormat {
    /// Wavefront OBJ polygon list, one quad per node, stacked by depth;
    /// 2-D trees only
    ExtentAsObj,

    /// SVG document with one rectangle per node, coloured by depth;
    /// 2-D trees only
    ExtentAsSvg,

    /// Line-oriented dump of depth, node type, extent and value
    FormattedNodeProperties,
}

/// Fill colours cycled by depth in the SVG export.
const DEPTH_COLORS: [&str; 6] = [
    "#2563eb", "#16a34a", "#d97706", "#dc2626", "#7c3aed", "#0891b2",
];

impl<K: Coord, V: std::fmt::Debug, const D: usize, T: RTreeTraits> RTree<K, V, D, T> {
    /// Produces a textual dump of the tree in the requested format.
    ///
    /// # Errors
    ///
    /// `InvalidArg` for the geometric formats on trees with `D != 2`.
    pub fn export_tree(&self, format: ExportFormat) -> Result<String> {
        match format {
            ExportFormat::FormattedNodeProperties => Ok(self.export_formatted()),
            ExportFormat::ExtentAsObj => {
                if D != 2 {
                    return Err(Error::InvalidArg(
                        "OBJ export supports two-dimensional trees only",
                    ));
                }

                Ok(self.export_obj())
            }
            ExportFormat::ExtentAsSvg => {
                if D != 2 {
                    return Err(Error::InvalidArg(
                        "SVG export supports two-dimensional trees only",
                    ));
                }

                Ok(self.export_svg())
            }
        }
    }

    fn export_formatted(&self) -> String {
        let mut out = String::new();
        let mut stack: Vec<(NodeIndex, usize)> = vec![(self.root_index(), 0)];

        while let Some((idx, depth)) = stack.pop() {
            let Some(record) = self.node_at(idx) else {
                continue;
            };

            let type_name = match record.kind.node_type() {
                NodeType::Value => "value",
                NodeType::LeafDirectory => "directory-leaf",
                NodeType::Directory => "directory-nonleaf",
            };

            out.push_str(&format!(
                "depth: {depth}; type: {type_name}; extent: {}",
                record.extent,
            ));

            if let NodeKind::Value(value) = &record.kind {
                out.push_str(&format!("; value: {value:?}"));
            }

            out.push('\n');

            if let Some(children) = record.kind.children() {
                for &child in children.iter().rev() {
                    stack.push((child, depth + 1));
                }
            }
        }

        out
    }

    fn export_obj(&self) -> String {
        let mut out = String::new();
        let mut vertex = 1usize;
        let mut stack: Vec<(NodeIndex, usize)> = vec![(self.root_index(), 0)];

        while let Some((idx, depth)) = stack.pop() {
            let Some(record) = self.node_at(idx) else {
                continue;
            };

            let e = &record.extent;
            let (x1, y1) = (e.start.d[0].to_f64(), e.start.d[1].to_f64());
            let (x2, y2) = (e.end.d[0].to_f64(), e.end.d[1].to_f64());
            let z = depth as f64;

            out.push_str(&format!("v {x1} {y1} {z}\n"));
            out.push_str(&format!("v {x2} {y1} {z}\n"));
            out.push_str(&format!("v {x2} {y2} {z}\n"));
            out.push_str(&format!("v {x1} {y2} {z}\n"));
            out.push_str(&format!(
                "f {} {} {} {}\n",
                vertex,
                vertex + 1,
                vertex + 2,
                vertex + 3,
            ));
            vertex += 4;

            if let Some(children) = record.kind.children() {
                for &child in children.iter().rev() {
                    stack.push((child, depth + 1));
                }
            }
        }

        out
    }

    fn export_svg(&self) -> String {
        let root_extent = self.extent();
        let min_x = root_extent.start.d[0].to_f64();
        let min_y = root_extent.start.d[1].to_f64();
        let width = (root_extent.end.d[0].to_f64() - min_x).max(1.0);
        let height = (root_extent.end.d[1].to_f64() - min_y).max(1.0);

        let mut out = format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" \
             viewBox=\"{min_x} {min_y} {width} {height}\">\n",
        );

        let mut stack: Vec<(NodeIndex, usize)> = vec![(self.root_index(), 0)];

        while let Some((idx, depth)) = stack.pop() {
            let Some(record) = self.node_at(idx) else {
                continue;
            };

            let e = &record.extent;
            let x = e.start.d[0].to_f64();
            let y = e.start.d[1].to_f64();
            let w = e.end.d[0].to_f64() - x;
            let h = e.end.d[1].to_f64() - y;
            let color = DEPTH_COLORS[depth % DEPTH_COLORS.len()];

            out.push_str(&format!(
                "  <rect x=\"{x}\" y=\"{y}\" width=\"{w}\" height=\"{h}\" \
                 fill=\"{color}\" fill-opacity=\"0.2\" stroke=\"black\" \
                 stroke-width=\"0.5\"/>\n",
            ));

            if let Some(children) = record.kind.children() {
                for &child in children.iter().rev() {
                    stack.push((child, depth + 1));
                }
            }
        }

        out.push_str("</svg>\n");
        out
    }
}
