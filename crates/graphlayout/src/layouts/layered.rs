//! Layered (hierarchical) drawings
//!
//! The pipeline follows the classic Sugiyama framework:
//!
//! 1. **Cycle breaking**: edges closing a directed cycle in a DFS are drawn
//!    reversed.
//! 2. **Layering**: longest-path layering from the sources, unless the
//!    caller supplies its own layer assignment.
//! 3. **Normalization**: edges spanning several layers get a chain of dummy
//!    vertices, one per crossed layer.
//! 4. **Crossing reduction**: alternating barycenter sweeps, keeping the
//!    ordering with the fewest crossings.
//! 5. **Coordinate assignment**: vertices are pulled toward their
//!    neighbours while keeping the minimum separation within a layer.
//!
//! Dummy positions become edge bends. Orthogonal routing replaces them with
//! axis-parallel corners.

use petgraph::graph::{EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::cmp::Ordering;
use std::collections::VecDeque;
use tracing::{debug, span, trace, Level};

use super::{checked, for_each_component, Deadline};
use crate::core::{
    topology, GraphAttributes, LayoutFailure, LayoutModule, LayoutOptions, Point,
    PreconditionViolatedCode,
};

/// Barycenter sweeps (down and up) during crossing reduction
const SWEEPS: usize = 8;
/// Coordinate refinement rounds
const REFINEMENTS: usize = 6;

/// Layered family member
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayeredStyle {
    /// Polyline edges through dummy vertices
    Sugiyama,
    /// Orthogonal edges; the graph must be acyclic
    Visibility,
    /// Straight-line edges; acyclic with a single source
    Dominance,
    /// Orthogonal edges
    Planarization,
    /// Orthogonal edges with every coordinate on a grid
    PlanarizationGrid,
}

/// How edges are drawn once vertices have coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Routing {
    Straight,
    Polyline,
    Orthogonal,
}

/// Drawing parameters shared with the grid layouts
#[derive(Debug, Clone, Copy)]
pub(crate) struct Drawing {
    pub routing: Routing,
    /// Snap coordinates to multiples of this unit
    pub grid: Option<f64>,
}

impl LayeredStyle {
    fn drawing(self, options: &LayoutOptions) -> Drawing {
        let grid_unit = options.node_spacing.min(options.level_spacing);
        match self {
            LayeredStyle::Sugiyama => Drawing {
                routing: Routing::Polyline,
                grid: None,
            },
            LayeredStyle::Visibility | LayeredStyle::Planarization => Drawing {
                routing: Routing::Orthogonal,
                grid: None,
            },
            LayeredStyle::Dominance => Drawing {
                routing: Routing::Straight,
                grid: None,
            },
            LayeredStyle::PlanarizationGrid => Drawing {
                routing: Routing::Orthogonal,
                grid: Some(grid_unit),
            },
        }
    }

    fn module_name(self) -> &'static str {
        match self {
            LayeredStyle::Sugiyama => "sugiyama",
            LayeredStyle::Visibility => "visibility",
            LayeredStyle::Dominance => "dominance",
            LayeredStyle::Planarization => "planarization",
            LayeredStyle::PlanarizationGrid => "planarization-grid",
        }
    }
}

/// Layered layout
#[derive(Debug, Clone)]
pub struct LayeredLayout {
    style: LayeredStyle,
    options: LayoutOptions,
}

impl LayeredLayout {
    pub fn new(style: LayeredStyle, options: LayoutOptions) -> Result<Self, LayoutFailure> {
        Ok(Self {
            style,
            options: checked(options)?,
        })
    }

    pub fn style(&self) -> LayeredStyle {
        self.style
    }

    fn check_preconditions(&self, attrs: &GraphAttributes) -> Result<(), LayoutFailure> {
        match self.style {
            LayeredStyle::Visibility if !topology::is_acyclic(attrs) => {
                Err(PreconditionViolatedCode::AcyclicHierarchies.into())
            }
            LayeredStyle::Dominance => {
                if !topology::is_acyclic(attrs) {
                    return Err(PreconditionViolatedCode::AcyclicHierarchies.into());
                }
                if topology::sources(attrs).len() != 1 {
                    return Err(PreconditionViolatedCode::SingleSource.into());
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

impl LayoutModule for LayeredLayout {
    fn call(&mut self, attributes: &mut GraphAttributes) -> Result<(), LayoutFailure> {
        let layout_span = span!(
            Level::DEBUG,
            "layered_layout",
            style = self.style.module_name(),
            nodes = attributes.node_count(),
            edges = attributes.edge_count()
        );
        let _enter = layout_span.enter();

        if attributes.is_empty() {
            return Ok(());
        }
        self.check_preconditions(attributes)?;
        attributes.clear_bends();

        let deadline = Deadline::new(self.options.time_limit());
        let drawing = self.style.drawing(&self.options);
        let options = &self.options;
        for_each_component(attributes, options.node_spacing, |component| {
            draw_hierarchy(component, None, drawing, options, &deadline)
        })
    }

    fn name(&self) -> &'static str {
        self.style.module_name()
    }
}

/// Edges oriented downward: (edge, upper node, lower node, reversed)
fn orient_acyclic(attrs: &GraphAttributes) -> Vec<(EdgeIndex, usize, usize, bool)> {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        New,
        Active,
        Done,
    }

    let graph = attrs.graph();
    let n = attrs.node_count();
    let mut mark = vec![Mark::New; n];
    let mut back_edges = vec![false; attrs.edge_count()];

    for root in 0..n {
        if mark[root] != Mark::New {
            continue;
        }
        mark[root] = Mark::Active;
        let mut stack = vec![(root, graph
            .edges_directed(NodeIndex::new(root), Direction::Outgoing)
            .map(|e| (e.id(), e.target().index()))
            .collect::<Vec<_>>())];
        while let Some((v, pending)) = stack.last_mut() {
            let v = *v;
            match pending.pop() {
                Some((e, w)) => match mark[w] {
                    Mark::Active => back_edges[e.index()] = true,
                    Mark::Done => {}
                    Mark::New => {
                        mark[w] = Mark::Active;
                        let next = graph
                            .edges_directed(NodeIndex::new(w), Direction::Outgoing)
                            .map(|e| (e.id(), e.target().index()))
                            .collect();
                        stack.push((w, next));
                    }
                },
                None => {
                    mark[v] = Mark::Done;
                    stack.pop();
                }
            }
        }
    }

    attrs
        .edges()
        .filter_map(|e| {
            let (s, t) = attrs.endpoints(e);
            if s == t {
                return None;
            }
            Some(if back_edges[e.index()] {
                (e, t.index(), s.index(), true)
            } else {
                (e, s.index(), t.index(), false)
            })
        })
        .collect()
}

/// Longest-path layering of an acyclic orientation
fn longest_path_layers(n: usize, edges: &[(EdgeIndex, usize, usize, bool)]) -> Vec<usize> {
    let mut out = vec![Vec::new(); n];
    let mut indegree = vec![0usize; n];
    for &(_, u, v, _) in edges {
        out[u].push(v);
        indegree[v] += 1;
    }
    let mut layer = vec![0usize; n];
    let mut queue: VecDeque<usize> = (0..n).filter(|&v| indegree[v] == 0).collect();
    while let Some(u) = queue.pop_front() {
        for &v in &out[u] {
            layer[v] = layer[v].max(layer[u] + 1);
            indegree[v] -= 1;
            if indegree[v] == 0 {
                queue.push_back(v);
            }
        }
    }
    layer
}

/// A proper layering with dummy vertices
///
/// Vertices `0..n` are the graph's nodes, the rest are dummies.
struct Hierarchy {
    layers: Vec<Vec<usize>>,
    layer_of: Vec<usize>,
    above: Vec<Vec<usize>>,
    below: Vec<Vec<usize>>,
    width: Vec<f64>,
    /// Per routed edge: dummies from upper to lower end, and whether the
    /// edge points upward
    chains: Vec<(EdgeIndex, Vec<usize>, bool)>,
    /// Edges between nodes of the same layer
    flat: Vec<EdgeIndex>,
    real: usize,
}

impl Hierarchy {
    fn build(attrs: &GraphAttributes, layering: Option<Vec<usize>>) -> Self {
        let n = attrs.node_count();
        let mut flat = Vec::new();
        let (layer_of, oriented) = match layering {
            Some(layers) => {
                // Orient by the supplied layers; edges inside a layer stay flat.
                let mut oriented = Vec::new();
                for e in attrs.edges() {
                    let (s, t) = attrs.endpoints(e);
                    let (ls, lt) = (layers[s.index()], layers[t.index()]);
                    match ls.cmp(&lt) {
                        Ordering::Less => oriented.push((e, s.index(), t.index(), false)),
                        Ordering::Greater => oriented.push((e, t.index(), s.index(), true)),
                        Ordering::Equal if s != t => flat.push(e),
                        Ordering::Equal => {}
                    }
                }
                (layers, oriented)
            }
            None => {
                let oriented = orient_acyclic(attrs);
                (longest_path_layers(n, &oriented), oriented)
            }
        };

        let depth = layer_of.iter().copied().max().map_or(0, |d| d + 1);
        let mut h = Hierarchy {
            layers: vec![Vec::new(); depth],
            layer_of: layer_of.clone(),
            above: vec![Vec::new(); n],
            below: vec![Vec::new(); n],
            width: attrs.nodes().map(|v| attrs.node(v).width).collect(),
            chains: Vec::with_capacity(oriented.len()),
            flat,
            real: n,
        };
        for v in 0..n {
            h.layers[layer_of[v]].push(v);
        }

        for (e, upper, lower, reversed) in oriented {
            let mut dummies = Vec::new();
            let mut prev = upper;
            for layer in (layer_of[upper] + 1)..layer_of[lower] {
                let d = h.layer_of.len();
                h.layer_of.push(layer);
                h.above.push(Vec::new());
                h.below.push(Vec::new());
                h.width.push(0.0);
                h.layers[layer].push(d);
                h.link(prev, d);
                dummies.push(d);
                prev = d;
            }
            h.link(prev, lower);
            h.chains.push((e, dummies, reversed));
        }
        h
    }

    fn link(&mut self, upper: usize, lower: usize) {
        self.below[upper].push(lower);
        self.above[lower].push(upper);
    }

    fn is_dummy(&self, v: usize) -> bool {
        v >= self.real
    }

    /// Edge crossings between layer `l` and `l + 1`
    fn crossings_below(&self, l: usize, order: &[usize]) -> usize {
        let mut segments = Vec::new();
        for &u in &self.layers[l] {
            for &v in &self.below[u] {
                segments.push((order[u], order[v]));
            }
        }
        segments.sort_unstable();
        let mut count = 0;
        for (i, a) in segments.iter().enumerate() {
            count += segments[i + 1..]
                .iter()
                .filter(|b| b.0 > a.0 && b.1 < a.1)
                .count();
        }
        count
    }

    fn total_crossings(&self, order: &[usize]) -> usize {
        (0..self.layers.len().saturating_sub(1))
            .map(|l| self.crossings_below(l, order))
            .sum()
    }

    /// Position of every vertex inside its layer
    fn order_index(&self) -> Vec<usize> {
        let mut order = vec![0; self.layer_of.len()];
        for layer in &self.layers {
            for (i, &v) in layer.iter().enumerate() {
                order[v] = i;
            }
        }
        order
    }

    fn sort_layer(&mut self, l: usize, downward: bool) {
        let order = self.order_index();
        let neighbours = if downward { &self.above } else { &self.below };
        let mut keyed: Vec<(f64, usize)> = self.layers[l]
            .iter()
            .map(|&v| {
                let adjacent = &neighbours[v];
                let key = if adjacent.is_empty() {
                    order[v] as f64
                } else {
                    adjacent.iter().map(|&w| order[w] as f64).sum::<f64>() / adjacent.len() as f64
                };
                (key, v)
            })
            .collect();
        keyed.sort_by(|a, b| a.0.total_cmp(&b.0));
        self.layers[l] = keyed.into_iter().map(|(_, v)| v).collect();
    }

    fn reduce_crossings(&mut self, deadline: &Deadline) -> Result<usize, LayoutFailure> {
        let mut best = self.layers.clone();
        let mut best_crossings = self.total_crossings(&self.order_index());
        for sweep in 0..SWEEPS {
            if best_crossings == 0 {
                break;
            }
            deadline.check()?;
            if sweep % 2 == 0 {
                for l in 1..self.layers.len() {
                    self.sort_layer(l, true);
                }
            } else {
                for l in (0..self.layers.len().saturating_sub(1)).rev() {
                    self.sort_layer(l, false);
                }
            }
            let crossings = self.total_crossings(&self.order_index());
            trace!(sweep, crossings, "Barycenter sweep");
            if crossings < best_crossings {
                best_crossings = crossings;
                best = self.layers.clone();
            }
        }
        self.layers = best;
        Ok(best_crossings)
    }

    fn separation(&self, a: usize, b: usize, spacing: f64) -> f64 {
        let gap = if self.is_dummy(a) || self.is_dummy(b) {
            spacing / 2.0
        } else {
            spacing
        };
        (self.width[a] + self.width[b]) / 2.0 + gap
    }

    /// Horizontal coordinates respecting in-layer order and separation
    fn assign_x(&self, spacing: f64, deadline: &Deadline) -> Result<Vec<f64>, LayoutFailure> {
        let mut x = vec![0.0; self.layer_of.len()];
        for layer in &self.layers {
            for pair in layer.windows(2) {
                x[pair[1]] = x[pair[0]] + self.separation(pair[0], pair[1], spacing);
            }
        }

        for round in 0..REFINEMENTS {
            deadline.check()?;
            let indices: Vec<usize> = if round % 2 == 0 {
                (0..self.layers.len()).collect()
            } else {
                (0..self.layers.len()).rev().collect()
            };
            for l in indices {
                let layer = &self.layers[l];
                if layer.is_empty() {
                    continue;
                }
                let desired: Vec<f64> = layer
                    .iter()
                    .map(|&v| {
                        let adjacent: Vec<usize> =
                            self.above[v].iter().chain(&self.below[v]).copied().collect();
                        if adjacent.is_empty() {
                            x[v]
                        } else {
                            adjacent.iter().map(|&w| x[w]).sum::<f64>() / adjacent.len() as f64
                        }
                    })
                    .collect();

                let mut placed = desired.clone();
                for i in 1..layer.len() {
                    let min = placed[i - 1] + self.separation(layer[i - 1], layer[i], spacing);
                    placed[i] = placed[i].max(min);
                }
                let drift = desired
                    .iter()
                    .zip(&placed)
                    .map(|(d, p)| d - p)
                    .sum::<f64>()
                    / layer.len() as f64;
                for (&v, p) in layer.iter().zip(placed) {
                    x[v] = p + drift;
                }
            }
        }
        Ok(x)
    }
}

fn snap(value: f64, grid: Option<f64>) -> f64 {
    match grid {
        Some(unit) => (value / unit).round() * unit,
        None => value,
    }
}

/// Axis-parallel corners of a route through `points`
fn orthogonal_corners(points: &[Point]) -> Vec<Point> {
    let mut corners = Vec::new();
    for pair in points.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if (a.x - b.x).abs() > 1e-9 && (a.y - b.y).abs() > 1e-9 {
            let mid = (a.y + b.y) / 2.0;
            corners.push(Point::new(a.x, mid));
            corners.push(Point::new(b.x, mid));
        }
    }
    corners
}

/// Lay out `attrs` as a layered drawing
///
/// `layering`, when given, assigns every node its layer; edges between
/// nodes of the same layer are drawn straight.
pub(crate) fn draw_hierarchy(
    attrs: &mut GraphAttributes,
    layering: Option<Vec<usize>>,
    drawing: Drawing,
    options: &LayoutOptions,
    deadline: &Deadline,
) -> Result<(), LayoutFailure> {
    let mut hierarchy = Hierarchy::build(attrs, layering);
    let crossings = hierarchy.reduce_crossings(deadline)?;
    let x = hierarchy.assign_x(options.node_spacing, deadline)?;

    let mut level_y = Vec::with_capacity(hierarchy.layers.len());
    let mut y = 0.0;
    let mut previous_half = 0.0;
    for layer in &hierarchy.layers {
        let half = layer
            .iter()
            .filter(|&&v| !hierarchy.is_dummy(v))
            .map(|&v| attrs.node(NodeIndex::new(v)).height / 2.0)
            .fold(0.0, f64::max);
        if !level_y.is_empty() {
            y += previous_half + options.level_spacing + half;
        }
        level_y.push(y);
        previous_half = half;
    }

    let point = |v: usize| {
        Point::new(
            snap(x[v], drawing.grid),
            snap(level_y[hierarchy.layer_of[v]], drawing.grid),
        )
    };

    for v in 0..hierarchy.real {
        attrs.set_position(NodeIndex::new(v), point(v));
    }

    for (edge, dummies, reversed) in &hierarchy.chains {
        let mut route: Vec<Point> = dummies.iter().map(|&d| point(d)).collect();
        if *reversed {
            route.reverse();
        }
        let bends = match drawing.routing {
            Routing::Straight => Vec::new(),
            Routing::Polyline => route,
            Routing::Orthogonal => {
                let (s, t) = attrs.endpoints(*edge);
                let mut full = Vec::with_capacity(route.len() + 2);
                full.push(attrs.position(s));
                full.extend(route);
                full.push(attrs.position(t));
                orthogonal_corners(&full)
            }
        };
        attrs.set_bends(*edge, bends);
    }

    // Flat edges arc over the layer instead of running through its nodes.
    let lift = options.level_spacing / 2.0;
    for &edge in &hierarchy.flat {
        let (s, t) = attrs.endpoints(edge);
        let (a, b) = (attrs.position(s), attrs.position(t));
        let top = a.y.min(b.y) - attrs.node(s).height.max(attrs.node(t).height) / 2.0 - lift;
        let bends = match drawing.routing {
            Routing::Straight => Vec::new(),
            Routing::Polyline => vec![Point::new((a.x + b.x) / 2.0, top)],
            Routing::Orthogonal => vec![Point::new(a.x, top), Point::new(b.x, top)],
        };
        attrs.set_bends(edge, bends);
    }

    debug!(
        layers = hierarchy.layers.len(),
        dummies = hierarchy.layer_of.len() - hierarchy.real,
        crossings,
        "Hierarchy drawn"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::AlgorithmFailureCode;
    use crate::layouts::testing::*;

    fn layout(style: LayeredStyle) -> LayeredLayout {
        LayeredLayout::new(style, LayoutOptions::default()).unwrap()
    }

    fn y(g: &GraphAttributes, i: usize) -> f64 {
        g.position(NodeIndex::new(i)).y
    }

    #[test]
    fn test_edges_point_downward_in_dag() {
        let mut g = graph(
            &["a", "b", "c", "d"],
            &[("a", "b"), ("a", "c"), ("b", "d"), ("c", "d")],
        );
        layout(LayeredStyle::Sugiyama).call(&mut g).unwrap();
        for e in g.edges() {
            let (s, t) = g.endpoints(e);
            assert!(g.position(s).y < g.position(t).y);
        }
    }

    #[test]
    fn test_long_edge_gets_bend_per_crossed_layer() {
        let mut g = graph(&["a", "b", "c", "d"], &[("a", "b"), ("b", "c"), ("c", "d"), ("a", "d")]);
        layout(LayeredStyle::Sugiyama).call(&mut g).unwrap();
        let long = g.graph().find_edge(NodeIndex::new(0), NodeIndex::new(3)).unwrap();
        assert_eq!(g.bends(long).len(), 2);
        assert!(y(&g, 0) < g.bends(long)[0].y);
        assert!(g.bends(long)[1].y < y(&g, 3));
    }

    #[test]
    fn test_cycle_is_broken() {
        let mut g = graph(&["a", "b", "c"], &[("a", "b"), ("b", "c"), ("c", "a")]);
        layout(LayeredStyle::Sugiyama).call(&mut g).unwrap();
        assert!(all_finite(&g));
        assert!(distinct_positions(&g));
    }

    #[test]
    fn test_orient_acyclic_reverses_back_edge() {
        let g = graph(&["a", "b"], &[("a", "b"), ("b", "a")]);
        let oriented = orient_acyclic(&g);
        assert_eq!(oriented.len(), 2);
        assert!(oriented.iter().all(|&(_, u, v, _)| (u, v) == (0, 1)));
        assert_eq!(oriented.iter().filter(|o| o.3).count(), 1);
    }

    #[test]
    fn test_barycenter_removes_avoidable_crossing() {
        // a->d and b->c drawn in index order cross once.
        let g = graph(&["a", "b", "c", "d"], &[("a", "d"), ("b", "c")]);
        let mut h = Hierarchy::build(&g, Some(vec![0, 0, 1, 1]));
        let deadline = Deadline::new(None);
        assert_eq!(h.reduce_crossings(&deadline).unwrap(), 0);
    }

    #[test]
    fn test_visibility_rejects_cycle() {
        let mut g = graph(&["a", "b"], &[("a", "b"), ("b", "a")]);
        let err = layout(LayeredStyle::Visibility).call(&mut g).unwrap_err();
        assert_eq!(err, LayoutFailure::Precondition(PreconditionViolatedCode::AcyclicHierarchies));
    }

    #[test]
    fn test_dominance_requires_single_source() {
        let mut g = graph(&["a", "b", "c"], &[("a", "c"), ("b", "c")]);
        let err = layout(LayeredStyle::Dominance).call(&mut g).unwrap_err();
        assert_eq!(err, LayoutFailure::Precondition(PreconditionViolatedCode::SingleSource));
    }

    #[test]
    fn test_dominance_draws_straight_edges() {
        let mut g = graph(&["a", "b", "c"], &[("a", "b"), ("b", "c"), ("a", "c")]);
        layout(LayeredStyle::Dominance).call(&mut g).unwrap();
        assert!(g.edges().all(|e| g.bends(e).is_empty()));
    }

    #[test]
    fn test_orthogonal_routes_are_axis_parallel() {
        let mut g = graph(
            &["a", "b", "c", "d"],
            &[("a", "b"), ("a", "c"), ("a", "d"), ("b", "d")],
        );
        layout(LayeredStyle::Planarization).call(&mut g).unwrap();
        for e in g.edges().collect::<Vec<_>>() {
            let (s, t) = g.endpoints(e);
            let mut route = vec![g.position(s)];
            route.extend_from_slice(g.bends(e));
            route.push(g.position(t));
            for pair in route.windows(2) {
                let (a, b) = (pair[0], pair[1]);
                assert!((a.x - b.x).abs() < 1e-9 || (a.y - b.y).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_grid_variant_snaps_coordinates() {
        let mut g = graph(&["a", "b", "c"], &[("a", "b"), ("a", "c")]);
        let options = LayoutOptions::default();
        let unit = options.node_spacing.min(options.level_spacing);
        LayeredLayout::new(LayeredStyle::PlanarizationGrid, options)
            .unwrap()
            .call(&mut g)
            .unwrap();
        // Normalization shifts the whole drawing; offsets stay on the grid.
        let origin = g.position(NodeIndex::new(0));
        for n in g.nodes() {
            let offset = g.position(n) - origin;
            assert!((offset.x / unit - (offset.x / unit).round()).abs() < 1e-9);
            assert!((offset.y / unit - (offset.y / unit).round()).abs() < 1e-9);
        }
        assert!(distinct_positions(&g));
    }

    #[test]
    fn test_time_limit_is_honoured() {
        let options = LayoutOptions {
            time_limit_ms: Some(0),
            ..Default::default()
        };
        let mut g = graph(&["a", "b", "c", "d"], &[("a", "d"), ("b", "c"), ("a", "c"), ("b", "d")]);
        let result = LayeredLayout::new(LayeredStyle::Sugiyama, options)
            .unwrap()
            .call(&mut g);
        assert_eq!(
            result,
            Err(LayoutFailure::Algorithm(AlgorithmFailureCode::TimelimitExceeded))
        );
    }
}
