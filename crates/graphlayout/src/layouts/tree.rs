//! Tree drawings
//!
//! `TreeLayout` draws every arborescence of a forest top-down, parents
//! centered over their children. `RadialTreeLayout` puts the root at the
//! center and every level on a circle, giving each subtree an angular
//! wedge proportional to its number of leaves.

use petgraph::graph::NodeIndex;
use petgraph::Direction;
use std::f64::consts::TAU;
use tracing::{debug, span, Level};

use super::{checked, normalize};
use crate::core::{topology, GraphAttributes, LayoutFailure, LayoutModule, LayoutOptions, Point, PreconditionViolatedCode};

/// Children in insertion order
fn children(attrs: &GraphAttributes, v: NodeIndex) -> Vec<NodeIndex> {
    let mut out: Vec<NodeIndex> = attrs.graph().neighbors_directed(v, Direction::Outgoing).collect();
    out.sort_unstable();
    out
}

/// Breadth-first order from `roots` with each node's depth
fn bfs_order(attrs: &GraphAttributes, roots: &[NodeIndex]) -> Vec<(NodeIndex, usize)> {
    let mut order: Vec<(NodeIndex, usize)> = roots.iter().map(|&r| (r, 0)).collect();
    let mut i = 0;
    while i < order.len() {
        let (v, depth) = order[i];
        order.extend(children(attrs, v).into_iter().map(|c| (c, depth + 1)));
        i += 1;
    }
    order
}

#[derive(Debug, Clone)]
pub struct TreeLayout {
    options: LayoutOptions,
}

impl TreeLayout {
    pub fn new(options: LayoutOptions) -> Result<Self, LayoutFailure> {
        Ok(Self {
            options: checked(options)?,
        })
    }
}

impl LayoutModule for TreeLayout {
    fn call(&mut self, attributes: &mut GraphAttributes) -> Result<(), LayoutFailure> {
        let layout_span = span!(Level::DEBUG, "tree_layout", nodes = attributes.node_count());
        let _enter = layout_span.enter();

        if attributes.is_empty() {
            return Ok(());
        }
        let roots = topology::arborescence_roots(attributes).ok_or(PreconditionViolatedCode::Forest)?;
        attributes.clear_bends();

        let spacing = self.options.node_spacing;
        let order = bfs_order(attributes, &roots);
        let n = attributes.node_count();

        // Subtree widths, leaves first.
        let mut width = vec![0.0f64; n];
        for &(v, _) in order.iter().rev() {
            let kids = children(attributes, v);
            let kids_width = kids.iter().map(|c| width[c.index()]).sum::<f64>()
                + spacing * kids.len().saturating_sub(1) as f64;
            width[v.index()] = attributes.node(v).width.max(kids_width);
        }

        let max_depth = order.iter().map(|&(_, d)| d).max().unwrap_or(0);
        let mut level_height = vec![0.0f64; max_depth + 1];
        for &(v, d) in &order {
            level_height[d] = level_height[d].max(attributes.node(v).height);
        }
        let mut level_y = Vec::with_capacity(level_height.len());
        let mut y = 0.0;
        for (d, h) in level_height.iter().enumerate() {
            if d > 0 {
                y += (level_height[d - 1] + h) / 2.0 + self.options.level_spacing;
            }
            level_y.push(y);
        }

        // Left edge of each subtree's slot, roots side by side.
        let mut left = vec![0.0f64; n];
        let mut cursor = 0.0;
        for root in &roots {
            left[root.index()] = cursor;
            cursor += width[root.index()] + spacing;
        }
        for &(v, depth) in &order {
            let kids = children(attributes, v);
            let kids_width = kids.iter().map(|c| width[c.index()]).sum::<f64>()
                + spacing * kids.len().saturating_sub(1) as f64;
            let mut x = left[v.index()] + (width[v.index()] - kids_width) / 2.0;
            for c in &kids {
                left[c.index()] = x;
                x += width[c.index()] + spacing;
            }
            let center = left[v.index()] + width[v.index()] / 2.0;
            attributes.set_position(v, Point::new(center, level_y[depth]));
        }

        normalize(attributes);
        debug!(roots = roots.len(), depth = max_depth, "Tree layout finished");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "tree"
    }
}

#[derive(Debug, Clone)]
pub struct RadialTreeLayout {
    options: LayoutOptions,
}

impl RadialTreeLayout {
    pub fn new(options: LayoutOptions) -> Result<Self, LayoutFailure> {
        Ok(Self {
            options: checked(options)?,
        })
    }
}

impl LayoutModule for RadialTreeLayout {
    fn call(&mut self, attributes: &mut GraphAttributes) -> Result<(), LayoutFailure> {
        let layout_span = span!(Level::DEBUG, "radial_tree_layout", nodes = attributes.node_count());
        let _enter = layout_span.enter();

        if attributes.is_empty() {
            return Ok(());
        }
        let root = topology::arborescence_root(attributes).ok_or(PreconditionViolatedCode::Tree)?;
        attributes.clear_bends();

        let order = bfs_order(attributes, &[root]);
        let n = attributes.node_count();
        let mut leaves = vec![0usize; n];
        for &(v, _) in order.iter().rev() {
            let kids = children(attributes, v);
            leaves[v.index()] = if kids.is_empty() {
                1
            } else {
                kids.iter().map(|c| leaves[c.index()]).sum()
            };
        }

        let largest = attributes
            .nodes()
            .map(|v| attributes.node(v).radius())
            .fold(0.0, f64::max);
        let ring = self.options.level_spacing + 2.0 * largest;

        // Angular wedge (start, span) per node.
        let mut wedge = vec![(0.0f64, TAU); n];
        for &(v, depth) in &order {
            let (start, span) = wedge[v.index()];
            let angle = start + span / 2.0;
            let r = depth as f64 * ring;
            attributes.set_position(v, Point::new(r * angle.cos(), r * angle.sin()));

            let total = leaves[v.index()] as f64;
            let mut next = start;
            for c in children(attributes, v) {
                let share = span * leaves[c.index()] as f64 / total;
                wedge[c.index()] = (next, share);
                next += share;
            }
        }

        normalize(attributes);
        debug!(leaves = leaves[root.index()], "Radial tree layout finished");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "radial-tree"
    }
}
