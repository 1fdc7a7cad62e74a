//! Node and edge payloads of the affiliation graph.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The three tiers of the affiliation graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    Candidate,
    User,
    Hashtag,
}

impl NodeType {
    /// All node types, top tier first.
    pub const ALL: [NodeType; 3] = [NodeType::Candidate, NodeType::User, NodeType::Hashtag];

    /// Label prefix distinguishing this tier.
    pub fn prefix(self) -> &'static str {
        match self {
            NodeType::Candidate => "",
            NodeType::User => "@",
            NodeType::Hashtag => "#",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NodeType::Candidate => "candidate",
            NodeType::User => "user",
            NodeType::Hashtag => "hashtag",
        }
    }

    /// Parses the lowercase name produced by [`as_str`](Self::as_str).
    pub fn parse(name: &str) -> Option<NodeType> {
        Self::ALL.into_iter().find(|t| t.as_str() == name)
    }

    /// Builds the node label for an underlying name.
    pub fn label(self, name: &str) -> String {
        format!("{}{}", self.prefix(), name)
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind-specific node data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// A public figure whose hashtags seeded the crawl.
    Candidate,
    /// A supporter, owned by the candidate whose search found them.
    User { candidate: String },
    /// A hashtag posted by at least one supporter.
    Hashtag,
}

impl NodeKind {
    pub fn node_type(&self) -> NodeType {
        match self {
            NodeKind::Candidate => NodeType::Candidate,
            NodeKind::User { .. } => NodeType::User,
            NodeKind::Hashtag => NodeType::Hashtag,
        }
    }
}

/// A point in the geo layout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPosition {
    pub latitude: f64,
    pub longitude: f64,
}

/// A node in the affiliation graph.
///
/// The label (kind prefix + name) is the node's identity.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphNode {
    /// Unique label, e.g. `Trump`, `@alice` or `#vote`.
    pub label: String,
    /// Kind-specific data.
    pub kind: NodeKind,
    /// Layout coordinates, set by [`GeoLayout::assign`](super::GeoLayout::assign).
    pub position: Option<GeoPosition>,
}

impl GraphNode {
    /// Creates a candidate node labelled with the bare name.
    pub fn candidate(name: &str) -> Self {
        Self::new(NodeType::Candidate.label(name), NodeKind::Candidate)
    }

    /// Creates a user node labelled `@screen_name`.
    pub fn user(screen_name: &str, candidate: &str) -> Self {
        Self::new(
            NodeType::User.label(screen_name),
            NodeKind::User {
                candidate: candidate.to_string(),
            },
        )
    }

    /// Creates a hashtag node labelled `#text`.
    pub fn hashtag(text: &str) -> Self {
        Self::new(NodeType::Hashtag.label(text), NodeKind::Hashtag)
    }

    fn new(label: String, kind: NodeKind) -> Self {
        Self {
            label,
            kind,
            position: None,
        }
    }

    pub fn node_type(&self) -> NodeType {
        self.kind.node_type()
    }

    /// The label without its kind prefix.
    pub fn name(&self) -> &str {
        let prefix = self.node_type().prefix();
        self.label.strip_prefix(prefix).unwrap_or(&self.label)
    }

    /// Owning candidate, for user nodes.
    pub fn candidate_name(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::User { candidate } => Some(candidate.as_str()),
            _ => None,
        }
    }
}

/// A directed edge. Candidate→user edges carry no weight; user→hashtag
/// edges are weighted by the user's hashtag count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GraphEdge {
    pub weight: Option<u32>,
}

impl GraphEdge {
    pub fn unweighted() -> Self {
        Self { weight: None }
    }

    pub fn weighted(weight: u32) -> Self {
        Self {
            weight: Some(weight),
        }
    }
}
