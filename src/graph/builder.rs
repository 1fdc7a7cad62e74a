//! Folds per-candidate tallies into one affiliation graph.

use super::{AffiliationGraph, GraphEdge, GraphNode};
use crate::crawl::UserTally;

/// Owns the affiliation graph of one run and accumulates candidates into it.
#[derive(Debug, Default)]
pub struct AffiliationGraphBuilder {
    graph: AffiliationGraph,
}

impl AffiliationGraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one candidate's supporters and their hashtag usage.
    ///
    /// Nodes and candidate→user edges are created once and never duplicated.
    /// User→hashtag weights are overwritten with the latest count rather than
    /// summed, so a (user, hashtag) pair appended twice keeps the last count.
    pub fn append(&mut self, candidate: &str, tallies: &[UserTally]) {
        let graph = &mut self.graph;
        let candidate_idx = graph.ensure_node(GraphNode::candidate(candidate));

        for tally in tallies {
            let user_idx = graph.ensure_node(GraphNode::user(&tally.screen_name, candidate));
            graph.ensure_edge_between(candidate_idx, user_idx, GraphEdge::unweighted());

            for (hashtag, &count) in &tally.hashtags {
                let hashtag_idx = graph.ensure_node(GraphNode::hashtag(hashtag));
                graph.set_weight_between(user_idx, hashtag_idx, count);
            }
        }

        tracing::debug!(
            candidate = %candidate,
            users = tallies.len(),
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "Appended candidate to graph"
        );
    }

    /// Returns the graph built so far.
    pub fn graph(&self) -> &AffiliationGraph {
        &self.graph
    }

    /// Consumes the builder and returns the finished graph.
    pub fn into_graph(self) -> AffiliationGraph {
        self.graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::NodeType;

    fn tallies() -> Vec<UserTally> {
        vec![
            UserTally::from_counts("alice", [("vote", 2), ("maga", 1)]),
            UserTally::new("bob"),
        ]
    }

    #[test]
    fn test_append_builds_three_tiers() {
        let mut builder = AffiliationGraphBuilder::new();
        builder.append("Trump", &tallies());
        let g = builder.graph();

        let labels: Vec<&str> = g.nodes().map(|n| n.label.as_str()).collect();
        assert_eq!(labels, vec!["Trump", "@alice", "#vote", "#maga", "@bob"]);

        assert_eq!(g.node("@bob").unwrap().candidate_name(), Some("Trump"));
        assert_eq!(g.edge("Trump", "@alice"), Some(&GraphEdge::unweighted()));
        assert_eq!(g.edge("Trump", "@bob"), Some(&GraphEdge::unweighted()));
        assert_eq!(g.edge("@alice", "#vote"), Some(&GraphEdge::weighted(2)));
        assert_eq!(g.edge("@alice", "#maga"), Some(&GraphEdge::weighted(1)));
        assert_eq!(g.edge_count(), 4);
    }

    #[test]
    fn test_append_shares_hashtags_across_candidates() {
        let mut builder = AffiliationGraphBuilder::new();
        builder.append("Trump", &[UserTally::from_counts("alice", [("vote", 1)])]);
        builder.append("Cruz", &[UserTally::from_counts("bob", [("vote", 4)])]);
        let g = builder.into_graph();

        assert_eq!(g.count_of(NodeType::Candidate), 2);
        assert_eq!(g.count_of(NodeType::Hashtag), 1);
        assert_eq!(g.edge("@bob", "#vote"), Some(&GraphEdge::weighted(4)));
    }

    #[test]
    fn test_append_empty_tally_is_idempotent() {
        let mut builder = AffiliationGraphBuilder::new();
        builder.append("Trump", &tallies());
        let before = builder.graph().clone();

        builder.append("Trump", &[UserTally::new("alice")]);
        builder.append("Trump", &[UserTally::new("alice")]);

        assert_eq!(builder.graph(), &before);
        assert_eq!(builder.graph().node_count(), before.node_count());
    }

    #[test]
    fn test_append_overwrites_weights() {
        let mut builder = AffiliationGraphBuilder::new();
        builder.append("Trump", &[UserTally::from_counts("alice", [("vote", 2)])]);
        builder.append("Trump", &[UserTally::from_counts("alice", [("vote", 5)])]);

        let g = builder.graph();
        assert_eq!(g.edge("@alice", "#vote"), Some(&GraphEdge::weighted(5)));
        assert_eq!(g.edge_count(), 2);
    }

    #[test]
    fn test_user_keeps_first_candidate() {
        let mut builder = AffiliationGraphBuilder::new();
        builder.append("Trump", &[UserTally::new("alice")]);
        builder.append("Cruz", &[UserTally::new("alice")]);

        let g = builder.graph();
        assert_eq!(g.node("@alice").unwrap().candidate_name(), Some("Trump"));
        assert!(g.edge("Cruz", "@alice").is_some());
    }
}
