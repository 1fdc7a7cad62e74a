//! The candidate → user → hashtag affiliation graph.
//!
//! - [`AffiliationGraph`] - Label-indexed directed graph over petgraph
//! - [`AffiliationGraphBuilder`] - Folds per-candidate tallies into one graph
//! - [`GeoLayout`] - Deterministic banded coordinates per node tier
//! - [`export`] / [`import`] - GraphML or pretty-printed JSON node-link files
//!
//! # Usage
//!
//! ```ignore
//! let mut builder = AffiliationGraphBuilder::new();
//! builder.append("Trump", &tallies);
//!
//! let mut graph = builder.into_graph();
//! GeoLayout::default().assign(&mut graph);
//! export(&graph, "affinity_graph.graphml")?;
//! ```

mod builder;
mod document;
mod graphml;
mod layout;
mod node;

pub use builder::AffiliationGraphBuilder;
pub use document::{export, export_to_writer, from_reader, import, GraphFormat};
pub use graphml::{read_graphml, write_graphml};
pub use layout::{GeoLayout, LayoutBand};
pub use node::{GeoPosition, GraphEdge, GraphNode, NodeKind, NodeType};

use std::collections::HashMap;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::Serialize;

use crate::crawl::UserTally;
use crate::error::AppError;

/// Directed graph of candidates, users and hashtags, keyed by node label.
///
/// Nodes enumerate in insertion order. At most one edge exists per ordered
/// pair of nodes.
#[derive(Debug, Clone, Default)]
pub struct AffiliationGraph {
    graph: DiGraph<GraphNode, GraphEdge>,
    node_index: HashMap<String, NodeIndex>,
}

impl AffiliationGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node unless one with the same label exists.
    ///
    /// Returns the index of the new or existing node. An existing node keeps
    /// its original attributes.
    pub fn ensure_node(&mut self, node: GraphNode) -> NodeIndex {
        if let Some(&idx) = self.node_index.get(&node.label) {
            return idx;
        }
        let label = node.label.clone();
        let idx = self.graph.add_node(node);
        self.node_index.insert(label, idx);
        idx
    }

    /// Adds an edge between two labelled nodes. Existing edges are untouched.
    pub fn ensure_edge(&mut self, from: &str, to: &str, edge: GraphEdge) -> Result<(), AppError> {
        let (a, b) = (self.index_of(from)?, self.index_of(to)?);
        self.ensure_edge_between(a, b, edge);
        Ok(())
    }

    /// Sets the weight of the edge between two labelled nodes, adding the
    /// edge if missing. An existing weight is overwritten.
    pub fn set_edge_weight(&mut self, from: &str, to: &str, weight: u32) -> Result<(), AppError> {
        let (a, b) = (self.index_of(from)?, self.index_of(to)?);
        self.set_weight_between(a, b, weight);
        Ok(())
    }

    pub(crate) fn ensure_edge_between(&mut self, a: NodeIndex, b: NodeIndex, edge: GraphEdge) {
        if self.graph.find_edge(a, b).is_none() {
            self.graph.add_edge(a, b, edge);
        }
    }

    pub(crate) fn set_weight_between(&mut self, a: NodeIndex, b: NodeIndex, weight: u32) {
        self.graph.update_edge(a, b, GraphEdge::weighted(weight));
    }

    fn index_of(&self, label: &str) -> Result<NodeIndex, AppError> {
        self.node_index
            .get(label)
            .copied()
            .ok_or_else(|| AppError::NodeNotFound(label.to_string()))
    }

    /// Looks up a node by label.
    pub fn node(&self, label: &str) -> Option<&GraphNode> {
        self.node_index.get(label).map(|&idx| &self.graph[idx])
    }

    pub fn contains_node(&self, label: &str) -> bool {
        self.node_index.contains_key(label)
    }

    /// Looks up the edge between two labelled nodes.
    pub fn edge(&self, from: &str, to: &str) -> Option<&GraphEdge> {
        let a = *self.node_index.get(from)?;
        let b = *self.node_index.get(to)?;
        self.graph
            .find_edge(a, b)
            .and_then(|e| self.graph.edge_weight(e))
    }

    /// Nodes in enumeration (insertion) order.
    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.graph.raw_nodes().iter().map(|n| &n.weight)
    }

    /// Mutable nodes in enumeration order. Labels must not be changed.
    pub(crate) fn nodes_mut(&mut self) -> impl Iterator<Item = &mut GraphNode> {
        self.graph.node_weights_mut()
    }

    /// Edges as `(source, target, edge)` in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = (&GraphNode, &GraphNode, &GraphEdge)> {
        self.graph.edge_references().map(move |e| {
            (
                &self.graph[e.source()],
                &self.graph[e.target()],
                e.weight(),
            )
        })
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Number of nodes of one type.
    pub fn count_of(&self, node_type: NodeType) -> usize {
        self.nodes().filter(|n| n.node_type() == node_type).count()
    }

    /// Node and edge counts per tier.
    pub fn stats(&self) -> GraphStats {
        GraphStats {
            candidates: self.count_of(NodeType::Candidate),
            users: self.count_of(NodeType::User),
            hashtags: self.count_of(NodeType::Hashtag),
            edges: self.edge_count(),
        }
    }

    /// Rebuilds each user's hashtag usage from their weighted edges.
    ///
    /// Users are listed in enumeration order, hashtags in edge order.
    pub fn user_tallies(&self) -> Vec<UserTally> {
        self.graph
            .node_indices()
            .filter(|&idx| self.graph[idx].node_type() == NodeType::User)
            .map(|idx| {
                let mut outgoing: Vec<_> = self
                    .graph
                    .edges_directed(idx, Direction::Outgoing)
                    .collect();
                // petgraph walks adjacency lists newest first
                outgoing.sort_by_key(|e| e.id());

                let mut tally = UserTally::new(self.graph[idx].name());
                for e in outgoing {
                    let target = &self.graph[e.target()];
                    let weight = e.weight().weight;
                    if let (NodeType::Hashtag, Some(weight)) = (target.node_type(), weight) {
                        tally.hashtags.insert(target.name().to_string(), weight);
                    }
                }
                tally
            })
            .collect()
    }
}

/// Graphs are equal when they hold the same nodes in the same order and the
/// same set of edges.
impl PartialEq for AffiliationGraph {
    fn eq(&self, other: &Self) -> bool {
        fn edge_set(g: &AffiliationGraph) -> Vec<(&str, &str, Option<u32>)> {
            let mut edges: Vec<_> = g
                .edges()
                .map(|(s, t, e)| (s.label.as_str(), t.label.as_str(), e.weight))
                .collect();
            edges.sort();
            edges
        }

        self.nodes().eq(other.nodes()) && edge_set(self) == edge_set(other)
    }
}

/// Node and edge counts of an affiliation graph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GraphStats {
    pub candidates: usize,
    pub users: usize,
    pub hashtags: usize,
    pub edges: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> AffiliationGraph {
        let mut g = AffiliationGraph::new();
        g.ensure_node(GraphNode::candidate("Trump"));
        g.ensure_node(GraphNode::user("alice", "Trump"));
        g.ensure_node(GraphNode::hashtag("vote"));
        g.ensure_edge("Trump", "@alice", GraphEdge::unweighted())
            .unwrap();
        g.set_edge_weight("@alice", "#vote", 3).unwrap();
        g
    }

    #[test]
    fn test_ensure_node_dedupes_by_label() {
        let mut g = sample();
        let first = g.node("@alice").cloned().unwrap();

        g.ensure_node(GraphNode::user("alice", "Cruz"));
        assert_eq!(g.node_count(), 3);
        assert_eq!(g.node("@alice"), Some(&first));
    }

    #[test]
    fn test_ensure_edge_is_idempotent() {
        let mut g = sample();
        g.ensure_edge("Trump", "@alice", GraphEdge::weighted(9))
            .unwrap();

        assert_eq!(g.edge_count(), 2);
        assert_eq!(g.edge("Trump", "@alice"), Some(&GraphEdge::unweighted()));
    }

    #[test]
    fn test_set_edge_weight_overwrites() {
        let mut g = sample();
        g.set_edge_weight("@alice", "#vote", 5).unwrap();

        assert_eq!(g.edge_count(), 2);
        assert_eq!(g.edge("@alice", "#vote"), Some(&GraphEdge::weighted(5)));
    }

    #[test]
    fn test_edge_to_missing_node() {
        let mut g = sample();
        let result = g.ensure_edge("Trump", "@nobody", GraphEdge::unweighted());
        assert!(matches!(result, Err(AppError::NodeNotFound(label)) if label == "@nobody"));
    }

    #[test]
    fn test_stats() {
        let stats = sample().stats();
        assert_eq!(
            stats,
            GraphStats {
                candidates: 1,
                users: 1,
                hashtags: 1,
                edges: 2,
            }
        );
    }

    #[test]
    fn test_user_tallies() {
        let mut g = sample();
        g.ensure_node(GraphNode::hashtag("maga"));
        g.set_edge_weight("@alice", "#maga", 1).unwrap();

        let tallies = g.user_tallies();
        assert_eq!(
            tallies,
            vec![UserTally::from_counts("alice", [("vote", 3), ("maga", 1)])]
        );
    }

    #[test]
    fn test_equality_ignores_edge_order() {
        let a = sample();

        let mut b = AffiliationGraph::new();
        b.ensure_node(GraphNode::candidate("Trump"));
        b.ensure_node(GraphNode::user("alice", "Trump"));
        b.ensure_node(GraphNode::hashtag("vote"));
        b.set_edge_weight("@alice", "#vote", 3).unwrap();
        b.ensure_edge("Trump", "@alice", GraphEdge::unweighted())
            .unwrap();

        assert_eq!(a, b);

        b.set_edge_weight("@alice", "#vote", 4).unwrap();
        assert_ne!(a, b);
    }
}
