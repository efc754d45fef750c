//! Circular drawings

use std::f64::consts::TAU;
use tracing::{debug, span, Level};

use super::{checked, for_each_component, normalize};
use crate::core::{topology, GraphAttributes, LayoutFailure, LayoutModule, LayoutOptions, Point, PreconditionViolatedCode};

/// Breadth-first order over undirected adjacency, with BFS parents
fn bfs_tree(adj: &[Vec<usize>], root: usize) -> (Vec<usize>, Vec<Option<usize>>) {
    let mut parent = vec![None; adj.len()];
    let mut seen = vec![false; adj.len()];
    let mut order = vec![root];
    seen[root] = true;
    let mut i = 0;
    while i < order.len() {
        let v = order[i];
        for &w in &adj[v] {
            if !seen[w] {
                seen[w] = true;
                parent[w] = Some(v);
                order.push(w);
            }
        }
        i += 1;
    }
    (order, parent)
}

/// Every connected component on its own circle
#[derive(Debug, Clone, Default)]
pub struct CircularLayout {
    options: LayoutOptions,
}

impl CircularLayout {
    pub fn new(options: LayoutOptions) -> Result<Self, LayoutFailure> {
        Ok(Self {
            options: checked(options)?,
        })
    }
}

impl LayoutModule for CircularLayout {
    fn call(&mut self, attributes: &mut GraphAttributes) -> Result<(), LayoutFailure> {
        let layout_span = span!(Level::DEBUG, "circular_layout", nodes = attributes.node_count());
        let _enter = layout_span.enter();

        attributes.clear_bends();
        if attributes.is_empty() {
            return Ok(());
        }
        let spacing = self.options.node_spacing;
        for_each_component(attributes, spacing, |component| {
            let adj = topology::undirected_adjacency(component);
            let (order, _) = bfs_tree(&adj, 0);
            let nodes: Vec<_> = component.nodes().collect();
            let circumference: f64 = nodes
                .iter()
                .map(|&v| 2.0 * component.node(v).radius() + spacing)
                .sum();
            let radius = if order.len() > 1 { circumference / TAU } else { 0.0 };

            let mut angle = 0.0;
            for &v in &order {
                let node = nodes[v];
                let share = (2.0 * component.node(node).radius() + spacing) / circumference * TAU;
                let mid = angle + share / 2.0;
                component.set_position(node, Point::new(radius * mid.cos(), radius * mid.sin()));
                angle += share;
            }
            Ok(())
        })?;
        debug!("Circular layout finished");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "circular"
    }
}

/// Balloon drawing of a BFS spanning tree: every subtree sits on a circle
/// around its parent
#[derive(Debug, Clone)]
pub struct BalloonLayout {
    options: LayoutOptions,
}

impl BalloonLayout {
    pub fn new(options: LayoutOptions) -> Result<Self, LayoutFailure> {
        Ok(Self {
            options: checked(options)?,
        })
    }
}

impl LayoutModule for BalloonLayout {
    fn call(&mut self, attributes: &mut GraphAttributes) -> Result<(), LayoutFailure> {
        let layout_span = span!(Level::DEBUG, "balloon_layout", nodes = attributes.node_count());
        let _enter = layout_span.enter();

        if attributes.is_empty() {
            return Ok(());
        }
        if !topology::is_connected(attributes) {
            return Err(PreconditionViolatedCode::Connected.into());
        }
        attributes.clear_bends();

        let spacing = self.options.node_spacing;
        let nodes: Vec<_> = attributes.nodes().collect();
        let adj = topology::undirected_adjacency(attributes);
        let (order, parent) = bfs_tree(&adj, 0);
        let mut kids = vec![Vec::new(); nodes.len()];
        for &v in &order {
            if let Some(p) = parent[v] {
                kids[p].push(v);
            }
        }

        // Balloon radius of each subtree and the ring radius of its children.
        let mut extent = vec![0.0f64; nodes.len()];
        let mut ring = vec![0.0f64; nodes.len()];
        for &v in order.iter().rev() {
            let own = attributes.node(nodes[v]).radius();
            if kids[v].is_empty() {
                extent[v] = own;
                continue;
            }
            let largest = kids[v].iter().map(|&c| extent[c]).fold(0.0, f64::max);
            let around: f64 = kids[v].iter().map(|&c| 2.0 * extent[c] + spacing).sum();
            ring[v] = (around / TAU * 1.2).max(own + largest + spacing);
            extent[v] = ring[v] + largest;
        }

        let mut position = vec![Point::zero(); nodes.len()];
        for &v in &order {
            if kids[v].is_empty() {
                continue;
            }
            let around: f64 = kids[v].iter().map(|&c| 2.0 * extent[c] + spacing).sum();
            let mut angle = 0.0;
            for &c in &kids[v] {
                let share = (2.0 * extent[c] + spacing) / around * TAU;
                let mid = angle + share / 2.0;
                position[c] = position[v] + Point::new(mid.cos(), mid.sin()) * ring[v];
                angle += share;
            }
        }

        for (&node, p) in nodes.iter().zip(position) {
            attributes.set_position(node, p);
        }
        normalize(attributes);
        debug!(extent = extent[0], "Balloon layout finished");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "balloon"
    }
}
