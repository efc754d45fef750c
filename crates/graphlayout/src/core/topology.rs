//! Structural queries used by layout modules to check their preconditions

use petgraph::algo::is_cyclic_directed;
use petgraph::graph::NodeIndex;
use petgraph::unionfind::UnionFind;
use petgraph::Direction;
use std::collections::{BTreeMap, VecDeque};

use super::GraphAttributes;

/// Connected components (ignoring edge direction), each in node order
///
/// Components are ordered by their smallest node index.
pub fn components(attrs: &GraphAttributes) -> Vec<Vec<NodeIndex>> {
    let graph = attrs.graph();
    let mut uf = UnionFind::new(graph.node_count());
    for edge in attrs.edges() {
        let (s, t) = attrs.endpoints(edge);
        uf.union(s.index(), t.index());
    }
    let mut groups: BTreeMap<usize, Vec<NodeIndex>> = BTreeMap::new();
    let mut first_of: Vec<Option<usize>> = vec![None; graph.node_count()];
    for n in graph.node_indices() {
        let root = uf.find(n.index());
        let key = *first_of[root].get_or_insert(n.index());
        groups.entry(key).or_default().push(n);
    }
    groups.into_values().collect()
}

pub fn is_connected(attrs: &GraphAttributes) -> bool {
    components(attrs).len() <= 1
}

pub fn has_self_loop(attrs: &GraphAttributes) -> bool {
    attrs.edges().any(|e| {
        let (s, t) = attrs.endpoints(e);
        s == t
    })
}

/// True if the directed graph has no cycle (self-loops count as cycles)
pub fn is_acyclic(attrs: &GraphAttributes) -> bool {
    !is_cyclic_directed(attrs.graph())
}

/// Nodes without incoming edges, in node order
pub fn sources(attrs: &GraphAttributes) -> Vec<NodeIndex> {
    let graph = attrs.graph();
    graph
        .node_indices()
        .filter(|&n| graph.neighbors_directed(n, Direction::Incoming).next().is_none())
        .collect()
}

/// Roots of the graph if it is a forest of arborescences
///
/// Every node has at most one parent, edges point from parent to child and
/// there is no cycle.
pub fn arborescence_roots(attrs: &GraphAttributes) -> Option<Vec<NodeIndex>> {
    let graph = attrs.graph();
    let single_parent = graph
        .node_indices()
        .all(|n| graph.edges_directed(n, Direction::Incoming).count() <= 1);
    if !single_parent || !is_acyclic(attrs) {
        return None;
    }
    Some(sources(attrs))
}

/// Root of the graph if it is a single arborescence
pub fn arborescence_root(attrs: &GraphAttributes) -> Option<NodeIndex> {
    match arborescence_roots(attrs)?.as_slice() {
        [root] => Some(*root),
        _ => None,
    }
}

/// Undirected adjacency lists without self-loops or duplicates
pub fn undirected_adjacency(attrs: &GraphAttributes) -> Vec<Vec<usize>> {
    let mut adj = vec![Vec::new(); attrs.node_count()];
    for edge in attrs.edges() {
        let (s, t) = attrs.endpoints(edge);
        if s == t {
            continue;
        }
        adj[s.index()].push(t.index());
        adj[t.index()].push(s.index());
    }
    for list in &mut adj {
        list.sort_unstable();
        list.dedup();
    }
    adj
}

/// Hop distances from `source`; `None` for unreachable nodes
pub fn bfs_distances(adj: &[Vec<usize>], source: usize) -> Vec<Option<usize>> {
    let mut dist = vec![None; adj.len()];
    let mut queue = VecDeque::new();
    dist[source] = Some(0);
    queue.push_back(source);
    while let Some(v) = queue.pop_front() {
        let d = dist[v].unwrap_or(0);
        for &w in &adj[v] {
            if dist[w].is_none() {
                dist[w] = Some(d + 1);
                queue.push_back(w);
            }
        }
    }
    dist
}

/// Number of distinct unordered node pairs joined by an edge
pub fn simple_edge_count(attrs: &GraphAttributes) -> usize {
    undirected_adjacency(attrs).iter().map(Vec::len).sum::<usize>() / 2
}
