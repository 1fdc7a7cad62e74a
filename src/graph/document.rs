//! Exporting and re-reading the graph.
//!
//! Two formats are supported, picked by file extension (see [`GraphFormat`]):
//! GraphML for `.graphml` files, read directly by Gephi, and a pretty-printed
//! UTF-8 JSON node-link document for everything else:
//!
//! ```json
//! {
//!   "directed": true,
//!   "nodes": [
//!     { "id": "Trump", "kind": "candidate", "latitude": 44.0, "longitude": -92.5 },
//!     { "id": "@alice", "kind": "user", "candidate": "Trump", "latitude": 34.0, "longitude": -92.5 }
//!   ],
//!   "edges": [
//!     { "source": "Trump", "target": "@alice" }
//!   ]
//! }
//! ```

use std::collections::HashSet;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::graphml::{read_graphml, write_graphml};
use super::{AffiliationGraph, GeoPosition, GraphEdge, GraphNode, NodeKind, NodeType};
use crate::error::AppError;

/// On-disk graph format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphFormat {
    Json,
    GraphMl,
}

impl GraphFormat {
    /// GraphML for a `.graphml` extension (any case), JSON otherwise.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("graphml") => GraphFormat::GraphMl,
            _ => GraphFormat::Json,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub(super) struct GraphDocument {
    pub(super) directed: bool,
    pub(super) nodes: Vec<NodeRecord>,
    pub(super) edges: Vec<EdgeRecord>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub(super) struct NodeRecord {
    pub(super) id: String,
    #[serde(default)]
    pub(super) kind: Option<NodeType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(super) candidate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(super) latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(super) longitude: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(super) struct EdgeRecord {
    pub(super) source: String,
    pub(super) target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(super) weight: Option<u32>,
}

impl From<&GraphNode> for NodeRecord {
    fn from(node: &GraphNode) -> Self {
        Self {
            id: node.label.clone(),
            kind: Some(node.node_type()),
            candidate: node.candidate_name().map(str::to_string),
            latitude: node.position.map(|p| p.latitude),
            longitude: node.position.map(|p| p.longitude),
        }
    }
}

impl TryFrom<NodeRecord> for GraphNode {
    type Error = AppError;

    fn try_from(record: NodeRecord) -> Result<Self, Self::Error> {
        let kind = match (record.kind, record.candidate) {
            (None, _) => return Err(invalid(format!("node '{}' has no kind", record.id))),
            (Some(NodeType::Candidate), None) => NodeKind::Candidate,
            (Some(NodeType::User), Some(candidate)) => NodeKind::User { candidate },
            (Some(NodeType::Hashtag), None) => NodeKind::Hashtag,
            (Some(NodeType::User), None) => {
                return Err(invalid(format!("user node '{}' has no candidate", record.id)))
            }
            (Some(kind), Some(_)) => {
                return Err(invalid(format!(
                    "{} node '{}' cannot have a candidate",
                    kind, record.id
                )))
            }
        };

        let position = match (record.latitude, record.longitude) {
            (Some(latitude), Some(longitude)) => Some(GeoPosition {
                latitude,
                longitude,
            }),
            (None, None) => None,
            _ => {
                return Err(invalid(format!(
                    "node '{}' has only one of latitude/longitude",
                    record.id
                )))
            }
        };

        Ok(GraphNode {
            label: record.id,
            kind,
            position,
        })
    }
}

pub(super) fn invalid(message: String) -> AppError {
    AppError::InvalidDocument(message)
}

fn to_document(graph: &AffiliationGraph) -> GraphDocument {
    GraphDocument {
        directed: true,
        nodes: graph.nodes().map(NodeRecord::from).collect(),
        edges: graph
            .edges()
            .map(|(source, target, edge)| EdgeRecord {
                source: source.label.clone(),
                target: target.label.clone(),
                weight: edge.weight,
            })
            .collect(),
    }
}

pub(super) fn from_document(document: GraphDocument) -> Result<AffiliationGraph, AppError> {
    let mut graph = AffiliationGraph::new();
    let mut labels = HashSet::new();

    for record in document.nodes {
        if !labels.insert(record.id.clone()) {
            return Err(invalid(format!("duplicate node '{}'", record.id)));
        }
        graph.ensure_node(GraphNode::try_from(record)?);
    }

    for node in graph.nodes() {
        if let Some(candidate) = node.candidate_name() {
            let owner = graph.node(candidate).map(GraphNode::node_type);
            if owner != Some(NodeType::Candidate) {
                return Err(invalid(format!(
                    "user '{}' references unknown candidate '{}'",
                    node.label, candidate
                )));
            }
        }
    }

    for edge in document.edges {
        if graph.edge(&edge.source, &edge.target).is_some() {
            return Err(invalid(format!(
                "duplicate edge '{}' -> '{}'",
                edge.source, edge.target
            )));
        }
        let payload = GraphEdge {
            weight: edge.weight,
        };
        graph.ensure_edge(&edge.source, &edge.target, payload)?;
    }

    Ok(graph)
}

/// Writes the graph to `path`, as GraphML or JSON depending on the extension.
pub fn export(graph: &AffiliationGraph, path: impl AsRef<Path>) -> Result<(), AppError> {
    let path = path.as_ref();
    let format = GraphFormat::from_path(path);
    let file = std::fs::File::create(path)?;
    let mut writer = BufWriter::new(file);
    match format {
        GraphFormat::Json => export_to_writer(graph, &mut writer)?,
        GraphFormat::GraphMl => write_graphml(graph, &mut writer)?,
    }
    writer.flush()?;

    tracing::info!(
        path = %path.display(),
        ?format,
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "Exported graph"
    );
    Ok(())
}

/// Writes the graph as a JSON document to any writer.
pub fn export_to_writer<W: Write>(graph: &AffiliationGraph, mut writer: W) -> Result<(), AppError> {
    serde_json::to_writer_pretty(&mut writer, &to_document(graph))?;
    writer.write_all(b"\n")?;
    Ok(())
}

/// Reads a graph previously written by [`export`].
pub fn import(path: impl AsRef<Path>) -> Result<AffiliationGraph, AppError> {
    let path = path.as_ref();
    let reader = BufReader::new(std::fs::File::open(path)?);
    match GraphFormat::from_path(path) {
        GraphFormat::Json => from_reader(reader),
        GraphFormat::GraphMl => read_graphml(reader),
    }
}

/// Reads a JSON graph document from any reader.
///
/// # Errors
///
/// Returns [`AppError::InvalidDocument`] if nodes are duplicated, a user has
/// no valid owning candidate, or coordinates are incomplete, and
/// [`AppError::NodeNotFound`] if an edge references a missing node.
pub fn from_reader<R: Read>(reader: R) -> Result<AffiliationGraph, AppError> {
    let document: GraphDocument = serde_json::from_reader(reader)?;
    from_document(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawl::UserTally;
    use crate::graph::{AffiliationGraphBuilder, GeoLayout, LayoutBand};

    fn laid_out() -> AffiliationGraph {
        let mut builder = AffiliationGraphBuilder::new();
        builder.append(
            "Trump",
            &[UserTally::from_counts("alice", [("vote", 2), ("maga", 1)])],
        );
        builder.append("Cruz", &[UserTally::new("bob")]);
        let mut graph = builder.into_graph();
        GeoLayout::default().assign(&mut graph);
        graph
    }

    fn to_string(graph: &AffiliationGraph) -> String {
        let mut buf = Vec::new();
        export_to_writer(graph, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_round_trip() {
        let graph = laid_out();
        let json = to_string(&graph);
        let restored = from_reader(json.as_bytes()).unwrap();
        assert_eq!(restored, graph);
    }

    #[test]
    fn test_round_trip_without_layout() {
        let mut builder = AffiliationGraphBuilder::new();
        builder.append("Trump", &[UserTally::from_counts("alice", [("vote", 1)])]);
        let graph = builder.into_graph();

        let restored = from_reader(to_string(&graph).as_bytes()).unwrap();
        assert_eq!(restored, graph);
        assert!(restored.nodes().all(|n| n.position.is_none()));
    }

    #[test]
    fn test_document_shape() {
        let json = to_string(&laid_out());
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["directed"], true);
        assert_eq!(value["nodes"][0]["id"], "Trump");
        assert_eq!(value["nodes"][0]["kind"], "candidate");
        assert!(value["nodes"][0].get("candidate").is_none());
        assert_eq!(value["nodes"][1]["candidate"], "Trump");
        assert_eq!(value["nodes"][1]["latitude"], 34.0);

        let edges = value["edges"].as_array().unwrap();
        assert!(edges[0].get("weight").is_none());
        assert_eq!(edges[1]["weight"], 2);

        // pretty-printed
        assert!(json.contains("\n  \"nodes\""));
    }

    #[test]
    fn test_rejects_user_without_candidate() {
        let json = r#"{
            "directed": true,
            "nodes": [{ "id": "@alice", "kind": "user" }],
            "edges": []
        }"#;
        assert!(matches!(
            from_reader(json.as_bytes()),
            Err(AppError::InvalidDocument(_))
        ));
    }

    #[test]
    fn test_rejects_unknown_owner() {
        let json = r#"{
            "directed": true,
            "nodes": [{ "id": "@alice", "kind": "user", "candidate": "Nobody" }],
            "edges": []
        }"#;
        assert!(matches!(
            from_reader(json.as_bytes()),
            Err(AppError::InvalidDocument(_))
        ));
    }

    #[test]
    fn test_rejects_dangling_edge() {
        let json = r#"{
            "directed": true,
            "nodes": [{ "id": "Trump", "kind": "candidate" }],
            "edges": [{ "source": "Trump", "target": "@ghost" }]
        }"#;
        assert!(matches!(
            from_reader(json.as_bytes()),
            Err(AppError::NodeNotFound(_))
        ));
    }

    #[test]
    fn test_export_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.json");
        let graph = laid_out();

        export(&graph, &path).unwrap();
        assert_eq!(import(&path).unwrap(), graph);
    }

    fn finely_spaced() -> AffiliationGraph {
        let tallies: Vec<UserTally> = (0..400)
            .map(|i| UserTally::from_counts(format!("u{}", i), [("vote", 1)]))
            .collect();
        let mut builder = AffiliationGraphBuilder::new();
        builder.append("Trump", &tallies);
        let mut graph = builder.into_graph();

        let layout = GeoLayout {
            center: -92.43,
            user: LayoutBand {
                latitude: 34.1,
                spacing: 0.07,
            },
            ..GeoLayout::default()
        };
        layout.assign(&mut graph);
        graph
    }

    #[test]
    fn test_round_trip_keeps_exact_coordinates() {
        let graph = finely_spaced();
        let restored = from_reader(to_string(&graph).as_bytes()).unwrap();

        for (a, b) in graph.nodes().zip(restored.nodes()) {
            assert_eq!(a.position, b.position, "{}", a.label);
        }
        assert_eq!(restored, graph);
    }

    #[test]
    fn test_graphml_keeps_exact_coordinates() {
        let graph = finely_spaced();
        let mut buf = Vec::new();
        write_graphml(&graph, &mut buf).unwrap();
        assert_eq!(read_graphml(buf.as_slice()).unwrap(), graph);
    }

    #[test]
    fn test_rejects_node_without_kind() {
        let json = r#"{ "directed": true, "nodes": [{ "id": "Trump" }], "edges": [] }"#;
        assert!(matches!(
            from_reader(json.as_bytes()),
            Err(AppError::InvalidDocument(_))
        ));
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(GraphFormat::from_path(Path::new("g.graphml")), GraphFormat::GraphMl);
        assert_eq!(GraphFormat::from_path(Path::new("G.GraphML")), GraphFormat::GraphMl);
        assert_eq!(GraphFormat::from_path(Path::new("g.json")), GraphFormat::Json);
        assert_eq!(GraphFormat::from_path(Path::new("graph")), GraphFormat::Json);
    }

    #[test]
    fn test_export_graphml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("affinity_graph.graphml");
        let graph = laid_out();

        export(&graph, &path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("<?xml"));
        assert_eq!(import(&path).unwrap(), graph);
    }
}
