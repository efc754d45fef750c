//! Graph attributes: topology plus per-node and per-edge geometry
//!
//! Layout modules read the topology and write node positions and edge bends
//! in place. The structure is owned by the caller; the adapter only keeps a
//! weak back-reference to it.

use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use thiserror::Error;
use tracing::trace;

use super::{BoundingBox, Point};

/// Default node width and height when a document does not specify them
pub const DEFAULT_NODE_SIZE: f64 = 20.0;

/// Errors raised while building graph attributes
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("Duplicate node id: {id}")]
    DuplicateNode { id: String },

    #[error("Edge references unknown node: {id}")]
    UnknownNode { id: String },

    #[error("Invalid graph document: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },
}

/// Geometry of a single node; `x`/`y` are the node center
#[derive(Debug, Clone, PartialEq)]
pub struct NodeAttributes {
    pub id: String,
    pub label: Option<String>,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl NodeAttributes {
    /// Create a node with default size at the origin
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: None,
            x: 0.0,
            y: 0.0,
            width: DEFAULT_NODE_SIZE,
            height: DEFAULT_NODE_SIZE,
        }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Half of the node diagonal, used as a clearance radius
    pub fn radius(&self) -> f64 {
        self.width.hypot(self.height) / 2.0
    }
}

/// Geometry of a single edge
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EdgeAttributes {
    /// Intermediate points between source and target
    pub bends: Vec<Point>,
}

/// Mutable graph geometry and topology
#[derive(Debug, Clone, Default)]
pub struct GraphAttributes {
    graph: DiGraph<NodeAttributes, EdgeAttributes>,
    index: HashMap<String, NodeIndex>,
}

impl GraphAttributes {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node with default geometry
    pub fn add_node(&mut self, id: impl Into<String>) -> Result<NodeIndex, DocumentError> {
        self.insert_node(NodeAttributes::new(id))
    }

    /// Add a fully specified node
    pub fn insert_node(&mut self, node: NodeAttributes) -> Result<NodeIndex, DocumentError> {
        if self.index.contains_key(&node.id) {
            return Err(DocumentError::DuplicateNode { id: node.id });
        }
        let id = node.id.clone();
        let idx = self.graph.add_node(node);
        self.index.insert(id, idx);
        trace!(node = idx.index(), "Added node");
        Ok(idx)
    }

    /// Add a directed edge between two existing nodes
    pub fn add_edge(&mut self, source: NodeIndex, target: NodeIndex) -> EdgeIndex {
        self.graph.add_edge(source, target, EdgeAttributes::default())
    }

    /// Add a directed edge between two nodes given by id
    pub fn connect(&mut self, source: &str, target: &str) -> Result<EdgeIndex, DocumentError> {
        let s = self.require(source)?;
        let t = self.require(target)?;
        Ok(self.add_edge(s, t))
    }

    fn require(&self, id: &str) -> Result<NodeIndex, DocumentError> {
        self.node_index(id).ok_or_else(|| DocumentError::UnknownNode { id: id.to_string() })
    }

    /// Look up a node by id
    pub fn node_index(&self, id: &str) -> Option<NodeIndex> {
        self.index.get(id).copied()
    }

    /// The underlying petgraph graph
    pub fn graph(&self) -> &DiGraph<NodeAttributes, EdgeAttributes> {
        &self.graph
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn node(&self, idx: NodeIndex) -> &NodeAttributes {
        &self.graph[idx]
    }

    pub fn node_mut(&mut self, idx: NodeIndex) -> &mut NodeAttributes {
        &mut self.graph[idx]
    }

    pub fn nodes(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.node_indices()
    }

    pub fn edges(&self) -> impl Iterator<Item = EdgeIndex> + '_ {
        self.graph.edge_indices()
    }

    /// Source and target of an edge
    pub fn endpoints(&self, edge: EdgeIndex) -> (NodeIndex, NodeIndex) {
        // Edge indices handed out by this graph are always valid: edges are never removed.
        self.graph
            .edge_endpoints(edge)
            .unwrap_or((NodeIndex::end(), NodeIndex::end()))
    }

    pub fn position(&self, idx: NodeIndex) -> Point {
        self.graph[idx].position()
    }

    pub fn set_position(&mut self, idx: NodeIndex, p: Point) {
        let node = &mut self.graph[idx];
        node.x = p.x;
        node.y = p.y;
    }

    pub fn bends(&self, edge: EdgeIndex) -> &[Point] {
        &self.graph[edge].bends
    }

    pub fn set_bends(&mut self, edge: EdgeIndex, bends: Vec<Point>) {
        self.graph[edge].bends = bends;
    }

    /// Remove all edge bends
    pub fn clear_bends(&mut self) {
        for edge in self.graph.edge_weights_mut() {
            edge.bends.clear();
        }
    }

    /// Bounding box of all node centers
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(self.graph.node_weights().map(NodeAttributes::position))
    }

    /// Shift every node and bend by `offset`
    pub fn translate(&mut self, offset: Point) {
        for node in self.graph.node_weights_mut() {
            node.x += offset.x;
            node.y += offset.y;
        }
        for edge in self.graph.edge_weights_mut() {
            for bend in &mut edge.bends {
                *bend = *bend + offset;
            }
        }
    }

    /// Copy of the subgraph induced by `nodes`
    ///
    /// Node `i` of the result corresponds to `nodes[i]`, edge `j` to the
    /// returned `edges[j]`. Edge bends are dropped.
    pub fn induced(&self, nodes: &[NodeIndex]) -> (GraphAttributes, Vec<EdgeIndex>) {
        let mut sub = GraphAttributes::new();
        let mut mapping = HashMap::with_capacity(nodes.len());
        for &n in nodes {
            let idx = sub.graph.add_node(self.graph[n].clone());
            sub.index.insert(self.graph[n].id.clone(), idx);
            mapping.insert(n, idx);
        }
        let mut edges = Vec::new();
        for edge in self.graph.edge_references() {
            if let (Some(&s), Some(&t)) = (mapping.get(&edge.source()), mapping.get(&edge.target())) {
                sub.add_edge(s, t);
                edges.push(edge.id());
            }
        }
        (sub, edges)
    }

    /// Copy with the same nodes but without self-loops and parallel edges
    ///
    /// Anti-parallel edges count as parallel: at most one edge survives per
    /// unordered node pair, the first one in edge order. Edge `j` of the
    /// result corresponds to the returned `edges[j]`.
    pub fn simplified(&self) -> (GraphAttributes, Vec<EdgeIndex>) {
        let mut simple = GraphAttributes {
            graph: DiGraph::with_capacity(self.node_count(), self.edge_count()),
            index: self.index.clone(),
        };
        for node in self.graph.node_weights() {
            simple.graph.add_node(node.clone());
        }
        let mut seen = HashSet::new();
        let mut edges = Vec::new();
        for edge in self.graph.edge_references() {
            let (s, t) = (edge.source(), edge.target());
            if s == t {
                continue;
            }
            let key = if s < t { (s, t) } else { (t, s) };
            if seen.insert(key) {
                simple.add_edge(s, t);
                edges.push(edge.id());
            }
        }
        (simple, edges)
    }

    /// Build attributes from a serializable document
    pub fn from_document(doc: &GraphDocument) -> Result<Self, DocumentError> {
        let mut attrs = GraphAttributes::new();
        for node in &doc.nodes {
            attrs.insert_node(NodeAttributes {
                id: node.id.clone(),
                label: node.label.clone(),
                x: node.x.unwrap_or(0.0),
                y: node.y.unwrap_or(0.0),
                width: node.width.unwrap_or(DEFAULT_NODE_SIZE),
                height: node.height.unwrap_or(DEFAULT_NODE_SIZE),
            })?;
        }
        for edge in &doc.edges {
            let idx = attrs.connect(&edge.source, &edge.target)?;
            attrs.set_bends(idx, edge.bends.clone());
        }
        Ok(attrs)
    }

    /// Snapshot into a serializable document
    pub fn to_document(&self) -> GraphDocument {
        let nodes = self
            .graph
            .node_weights()
            .map(|n| NodeDocument {
                id: n.id.clone(),
                label: n.label.clone(),
                x: Some(n.x),
                y: Some(n.y),
                width: Some(n.width),
                height: Some(n.height),
            })
            .collect();
        let edges = self
            .graph
            .edge_references()
            .map(|e| EdgeDocument {
                source: self.graph[e.source()].id.clone(),
                target: self.graph[e.target()].id.clone(),
                bends: e.weight().bends.clone(),
            })
            .collect();
        GraphDocument { nodes, edges }
    }
}

/// JSON representation of a graph and its geometry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphDocument {
    #[serde(default)]
    pub nodes: Vec<NodeDocument>,
    #[serde(default)]
    pub edges: Vec<EdgeDocument>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDocument {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeDocument {
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bends: Vec<Point>,
}

impl GraphDocument {
    /// Parse a document from JSON text
    pub fn from_json(input: &str) -> Result<Self, DocumentError> {
        Ok(serde_json::from_str(input)?)
    }

    /// Serialize as pretty-printed JSON
    pub fn to_json(&self) -> Result<String, DocumentError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> GraphAttributes {
        let mut g = GraphAttributes::new();
        for id in ["a", "b", "c"] {
            g.add_node(id).unwrap();
        }
        g.connect("a", "b").unwrap();
        g.connect("b", "c").unwrap();
        g.connect("c", "a").unwrap();
        g
    }

    #[test]
    fn test_duplicate_node_rejected() {
        let mut g = GraphAttributes::new();
        g.add_node("a").unwrap();
        let err = g.add_node("a").unwrap_err();
        assert!(err.to_string().contains("Duplicate node id: a"));
    }

    #[test]
    fn test_connect_unknown_node() {
        let mut g = GraphAttributes::new();
        g.add_node("a").unwrap();
        let err = g.connect("a", "zzz").unwrap_err();
        assert!(matches!(err, DocumentError::UnknownNode { ref id } if id == "zzz"));
    }

    #[test]
    fn test_simplified_drops_loops_and_parallels() {
        let mut g = triangle();
        let a = g.node_index("a").unwrap();
        let b = g.node_index("b").unwrap();
        g.add_edge(a, a);
        g.add_edge(b, a);
        g.add_edge(a, b);
        assert_eq!(g.edge_count(), 6);

        let (simple, edges) = g.simplified();
        assert_eq!(simple.node_count(), 3);
        assert_eq!(simple.edge_count(), 3);
        assert_eq!(edges.len(), 3);
        assert_eq!(simple.node_index("c"), g.node_index("c"));
    }

    #[test]
    fn test_induced_subgraph() {
        let g = triangle();
        let a = g.node_index("a").unwrap();
        let b = g.node_index("b").unwrap();
        let (sub, edges) = g.induced(&[b, a]);
        assert_eq!(sub.node_count(), 2);
        assert_eq!(sub.edge_count(), 1);
        assert_eq!(g.endpoints(edges[0]), (a, b));
        assert_eq!(sub.node(NodeIndex::new(0)).id, "b");
    }

    #[test]
    fn test_translate_moves_nodes_and_bends() {
        let mut g = triangle();
        let e = g.edges().next().unwrap();
        g.set_bends(e, vec![Point::new(1.0, 1.0)]);
        g.translate(Point::new(10.0, -5.0));
        assert_eq!(g.position(NodeIndex::new(0)), Point::new(10.0, -5.0));
        assert_eq!(g.bends(e), &[Point::new(11.0, -4.0)]);
    }

    #[test]
    fn test_document_json() {
        let json = r#"{
            "nodes": [{"id": "a", "width": 40}, {"id": "b", "label": "B"}],
            "edges": [{"source": "a", "target": "b"}]
        }"#;
        let doc = GraphDocument::from_json(json).unwrap();
        let g = GraphAttributes::from_document(&doc).unwrap();
        assert_eq!(g.node_count(), 2);
        assert_eq!(g.edge_count(), 1);
        let a = g.node_index("a").unwrap();
        assert_eq!(g.node(a).width, 40.0);
        assert_eq!(g.node(a).height, DEFAULT_NODE_SIZE);

        let back = g.to_document();
        assert_eq!(back.nodes[1].label.as_deref(), Some("B"));
        assert_eq!(back.edges[0].source, "a");
        assert!(back.to_json().unwrap().contains("\"target\": \"b\""));
    }

    #[test]
    fn test_document_unknown_edge_endpoint() {
        let json = r#"{"nodes": [{"id": "a"}], "edges": [{"source": "a", "target": "b"}]}"#;
        let doc = GraphDocument::from_json(json).unwrap();
        assert!(GraphAttributes::from_document(&doc).is_err());
    }

    #[test]
    fn test_document_invalid_json() {
        let err = GraphDocument::from_json("{ nope").unwrap_err();
        assert!(err.to_string().starts_with("Invalid graph document"));
    }
}
