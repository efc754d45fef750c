//! Layout engines
//!
//! Each engine implements [`LayoutModule`](crate::core::LayoutModule) and is
//! parameterized by [`LayoutOptions`](crate::core::LayoutOptions). Engines
//! check the structural preconditions of the layout family they implement
//! and report violations through the failure taxonomy.

mod circular;
mod energy;
mod layered;
mod meta;
mod planar;
mod stress;
mod tree;
mod tutte;

pub use circular::{BalloonLayout, CircularLayout};
pub use energy::{EnergyLayout, EnergyVariant};
pub use layered::{LayeredLayout, LayeredStyle};
pub use meta::{ComponentSplitterLayout, PreprocessorLayout, ScalingLayout};
pub use planar::{PlanarGridLayout, PlanarVariant};
pub use stress::{StressLayout, StressVariant};
pub use tree::{RadialTreeLayout, TreeLayout};
pub use tutte::TutteLayout;

use petgraph::graph::{EdgeIndex, NodeIndex};
use std::f64::consts::PI;
use std::time::{Duration, Instant};

use crate::core::{topology, AlgorithmFailureCode, GraphAttributes, LayoutFailure, LayoutOptions, Point};

/// Enforces an optional time limit on iterative engines
pub(crate) struct Deadline {
    start: Option<Instant>,
    limit: Option<Duration>,
}

impl Deadline {
    pub(crate) fn new(limit: Option<Duration>) -> Self {
        // Instant is only touched when a limit is configured.
        Self {
            start: limit.map(|_| Instant::now()),
            limit,
        }
    }

    pub(crate) fn check(&self) -> Result<(), LayoutFailure> {
        match (self.start, self.limit) {
            (Some(start), Some(limit)) if start.elapsed() > limit => {
                Err(AlgorithmFailureCode::TimelimitExceeded.into())
            }
            _ => Ok(()),
        }
    }
}

/// Deterministic starting positions on a golden-angle spiral
///
/// Distinct nodes never share a position; `seed` rotates the spiral.
pub(crate) fn spiral_positions(count: usize, spacing: f64, seed: u64) -> Vec<Point> {
    let golden = PI * (3.0 - 5f64.sqrt());
    let phase = (seed % 360) as f64 * PI / 180.0;
    (0..count)
        .map(|i| {
            let r = spacing * (i as f64 + 0.5).sqrt();
            let angle = phase + i as f64 * golden;
            Point::new(r * angle.cos(), r * angle.sin())
        })
        .collect()
}

/// Translate the drawing so that the top-left node corner sits at the origin
pub(crate) fn normalize(attrs: &mut GraphAttributes) {
    let mut min_x = f64::INFINITY;
    let mut min_y = f64::INFINITY;
    for n in attrs.nodes() {
        let node = attrs.node(n);
        min_x = min_x.min(node.x - node.width / 2.0);
        min_y = min_y.min(node.y - node.height / 2.0);
    }
    if min_x.is_finite() && min_y.is_finite() {
        attrs.translate(Point::new(-min_x, -min_y));
    }
}

/// Extent of a set of nodes including their sizes: (min corner, max corner)
fn extent(attrs: &GraphAttributes, nodes: &[NodeIndex]) -> Option<(Point, Point)> {
    let mut min = Point::new(f64::INFINITY, f64::INFINITY);
    let mut max = Point::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
    for &n in nodes {
        let node = attrs.node(n);
        min.x = min.x.min(node.x - node.width / 2.0);
        min.y = min.y.min(node.y - node.height / 2.0);
        max.x = max.x.max(node.x + node.width / 2.0);
        max.y = max.y.max(node.y + node.height / 2.0);
    }
    min.is_finite().then_some((min, max))
}

/// Arrange already laid out components in rows
///
/// Each component keeps its internal drawing and is translated as a whole,
/// bends of edges inside it included.
pub(crate) fn pack_components(attrs: &mut GraphAttributes, components: &[Vec<NodeIndex>], spacing: f64) {
    if components.len() < 2 {
        normalize(attrs);
        return;
    }

    let boxes: Vec<_> = components
        .iter()
        .map(|c| extent(attrs, c).unwrap_or((Point::zero(), Point::zero())))
        .collect();
    let area: f64 = boxes
        .iter()
        .map(|(min, max)| (max.x - min.x + spacing) * (max.y - min.y + spacing))
        .sum();
    let widest = boxes
        .iter()
        .map(|(min, max)| max.x - min.x)
        .fold(0.0, f64::max);
    let row_width = area.sqrt().max(widest);

    let mut component_of = vec![usize::MAX; attrs.node_count()];
    for (i, comp) in components.iter().enumerate() {
        for n in comp {
            component_of[n.index()] = i;
        }
    }

    let mut offsets = Vec::with_capacity(components.len());
    let (mut x, mut y, mut row_height) = (0.0, 0.0, 0.0f64);
    for (min, max) in &boxes {
        let (w, h) = (max.x - min.x, max.y - min.y);
        if x > 0.0 && x + w > row_width {
            x = 0.0;
            y += row_height + spacing;
            row_height = 0.0;
        }
        offsets.push(Point::new(x - min.x, y - min.y));
        x += w + spacing;
        row_height = row_height.max(h);
    }

    for n in attrs.nodes().collect::<Vec<_>>() {
        let offset = offsets[component_of[n.index()]];
        let p = attrs.position(n);
        attrs.set_position(n, p + offset);
    }
    for e in attrs.edges().collect::<Vec<_>>() {
        let (s, _) = attrs.endpoints(e);
        let offset = offsets[component_of[s.index()]];
        let bends = attrs.bends(e).iter().map(|&b| b + offset).collect();
        attrs.set_bends(e, bends);
    }
}

/// Run `draw` on every connected component separately, then pack them
///
/// A connected graph is drawn in place and only normalized.
pub(crate) fn for_each_component<F>(attrs: &mut GraphAttributes, spacing: f64, mut draw: F) -> Result<(), LayoutFailure>
where
    F: FnMut(&mut GraphAttributes) -> Result<(), LayoutFailure>,
{
    let components = topology::components(attrs);
    if components.len() < 2 {
        draw(attrs)?;
        normalize(attrs);
        return Ok(());
    }

    // Nothing is written back until every component has been drawn.
    let mut drawn = Vec::with_capacity(components.len());
    for component in &components {
        let (mut sub, edges) = attrs.induced(component);
        draw(&mut sub)?;
        drawn.push((sub, edges));
    }
    for (component, (sub, edges)) in components.iter().zip(drawn) {
        for (i, &n) in component.iter().enumerate() {
            attrs.set_position(n, sub.position(NodeIndex::new(i)));
        }
        for (j, &e) in edges.iter().enumerate() {
            attrs.set_bends(e, sub.bends(EdgeIndex::new(j)).to_vec());
        }
    }
    pack_components(attrs, &components, spacing);
    Ok(())
}

/// Validate options and map a rejection to an illegal-parameter failure
pub(crate) fn checked(options: LayoutOptions) -> Result<LayoutOptions, LayoutFailure> {
    options
        .validate()
        .map_err(|_| LayoutFailure::Algorithm(AlgorithmFailureCode::IllegalParameter))?;
    Ok(options)
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::core::GraphAttributes;

    /// Build a graph from node ids and directed edges
    pub fn graph(nodes: &[&str], edges: &[(&str, &str)]) -> GraphAttributes {
        let mut g = GraphAttributes::new();
        for n in nodes {
            g.add_node(*n).unwrap();
        }
        for (s, t) in edges {
            g.connect(s, t).unwrap();
        }
        g
    }

    /// Path a -> b -> c -> ...
    pub fn path(len: usize) -> GraphAttributes {
        let ids: Vec<String> = (0..len).map(|i| format!("n{i}")).collect();
        let mut g = GraphAttributes::new();
        for id in &ids {
            g.add_node(id.as_str()).unwrap();
        }
        for w in ids.windows(2) {
            g.connect(&w[0], &w[1]).unwrap();
        }
        g
    }

    pub fn all_finite(g: &GraphAttributes) -> bool {
        g.nodes().all(|n| g.position(n).is_finite())
            && g.edges().all(|e| g.bends(e).iter().all(|b| b.is_finite()))
    }

    /// True if no two node centers coincide
    pub fn distinct_positions(g: &GraphAttributes) -> bool {
        let nodes: Vec<_> = g.nodes().collect();
        nodes.iter().enumerate().all(|(i, &a)| {
            nodes[i + 1..]
                .iter()
                .all(|&b| g.position(a).distance(g.position(b)) > 1e-6)
        })
    }
}
