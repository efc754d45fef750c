//! Barycentric (Tutte) embedding
//!
//! Each component gets an outer polygon made of the longest cycle found by a
//! depth-first search followed by the component's leaves. Polygon nodes are
//! pinned to a circle and every other node moves to the barycenter of its
//! neighbours.

use petgraph::graph::NodeIndex;
use std::f64::consts::TAU;
use tracing::{debug, span, Level};

use super::{checked, pack_components, Deadline};
use crate::core::{topology, GraphAttributes, LayoutFailure, LayoutModule, LayoutOptions, Point};

#[derive(Debug, Clone)]
pub struct TutteLayout {
    options: LayoutOptions,
}

impl TutteLayout {
    pub fn new(options: LayoutOptions) -> Result<Self, LayoutFailure> {
        Ok(Self {
            options: checked(options)?,
        })
    }
}

/// Longest cycle closed by a DFS back edge, as local node indices
fn outer_cycle(adj: &[Vec<usize>]) -> Option<Vec<usize>> {
    let n = adj.len();
    let mut depth = vec![usize::MAX; n];
    let mut parent = vec![usize::MAX; n];
    let mut best: Option<(usize, usize)> = None;
    let mut stack = vec![(0usize, 0usize)];
    depth[0] = 0;

    while let Some((v, next)) = stack.pop() {
        let Some(&w) = adj[v].get(next) else {
            continue;
        };
        stack.push((v, next + 1));
        if depth[w] == usize::MAX {
            depth[w] = depth[v] + 1;
            parent[w] = v;
            stack.push((w, 0));
        } else if w != parent[v] && depth[w] < depth[v] {
            let len = depth[v] - depth[w] + 1;
            if best.map_or(true, |(bv, bw)| len > depth[bv] - depth[bw] + 1) {
                best = Some((v, w));
            }
        }
    }

    let (mut v, top) = best?;
    let mut cycle = vec![v];
    while v != top {
        v = parent[v];
        cycle.push(v);
    }
    Some(cycle)
}

impl TutteLayout {
    fn layout_component(
        &self,
        attrs: &mut GraphAttributes,
        nodes: &[NodeIndex],
        deadline: &Deadline,
    ) -> Result<(), LayoutFailure> {
        let (sub, _) = attrs.induced(nodes);
        let adj = topology::undirected_adjacency(&sub);
        let n = adj.len();
        let radius = self.options.ideal_edge_length * (n as f64).sqrt().max(1.0);

        let mut fixed = outer_cycle(&adj).unwrap_or_default();
        // Leaves would otherwise collapse onto their only neighbour.
        let leaves: Vec<usize> = (0..n)
            .filter(|&v| adj[v].len() <= 1 && !fixed.contains(&v))
            .collect();
        fixed.extend(leaves);

        let mut positions = vec![Point::zero(); n];
        let mut pinned = vec![false; n];
        if n == 1 {
            pinned[0] = true;
        } else {
            for (i, &v) in fixed.iter().enumerate() {
                let angle = TAU * i as f64 / fixed.len() as f64;
                positions[v] = Point::new(radius * angle.cos(), radius * angle.sin());
                pinned[v] = true;
            }
        }

        for _ in 0..self.options.iterations {
            deadline.check()?;
            let mut shift = 0.0f64;
            for v in 0..n {
                if pinned[v] || adj[v].is_empty() {
                    continue;
                }
                let sum = adj[v].iter().fold(Point::zero(), |acc, &w| acc + positions[w]);
                let next = sum * (1.0 / adj[v].len() as f64);
                shift = shift.max(next.distance(positions[v]));
                positions[v] = next;
            }
            if shift < 1e-6 {
                break;
            }
        }

        for (&node, p) in nodes.iter().zip(positions) {
            attrs.set_position(node, p);
        }
        Ok(())
    }
}

impl LayoutModule for TutteLayout {
    fn call(&mut self, attributes: &mut GraphAttributes) -> Result<(), LayoutFailure> {
        let layout_span = span!(Level::DEBUG, "tutte_layout", nodes = attributes.node_count());
        let _enter = layout_span.enter();

        attributes.clear_bends();
        let deadline = Deadline::new(self.options.time_limit());
        let components = topology::components(attributes);
        for component in &components {
            self.layout_component(attributes, component, &deadline)?;
        }
        pack_components(attributes, &components, self.options.node_spacing);
        debug!(components = components.len(), "Tutte layout finished");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "tutte"
    }
}
