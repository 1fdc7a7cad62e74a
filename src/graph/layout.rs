//! Deterministic geo layout for the affiliation graph.
//!
//! Each node tier occupies its own horizontal band at a fixed latitude.
//! Within a band nodes are spaced evenly along the longitude axis, centered
//! on a shared reference longitude, in graph enumeration order.

use serde::{Deserialize, Serialize};

use super::{AffiliationGraph, GeoPosition, NodeType};

/// Latitude and node spacing for one tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutBand {
    pub latitude: f64,
    pub spacing: f64,
}

/// Layout constants. Defaults place candidates at 44°N, users at 34°N and
/// hashtags at 20°N around 92.5°W.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeoLayout {
    /// Reference longitude every band is centered on.
    pub center: f64,
    pub candidate: LayoutBand,
    pub user: LayoutBand,
    pub hashtag: LayoutBand,
}

impl Default for GeoLayout {
    fn default() -> Self {
        Self {
            center: -92.5,
            candidate: LayoutBand {
                latitude: 44.0,
                spacing: 5.0,
            },
            user: LayoutBand {
                latitude: 34.0,
                spacing: 2.0,
            },
            hashtag: LayoutBand {
                latitude: 20.0,
                spacing: 2.0,
            },
        }
    }
}

impl GeoLayout {
    /// Band for a node tier.
    pub fn band(&self, node_type: NodeType) -> LayoutBand {
        match node_type {
            NodeType::Candidate => self.candidate,
            NodeType::User => self.user,
            NodeType::Hashtag => self.hashtag,
        }
    }

    /// Distance from the center to the first node of a band holding `count` nodes.
    pub fn offset(count: usize, spacing: f64) -> f64 {
        (count as f64 / 2.0) * spacing
    }

    /// Assigns coordinates to every node, overwriting earlier ones.
    pub fn assign(&self, graph: &mut AffiliationGraph) {
        let mut next_longitude = NodeType::ALL.map(|t| {
            let count = graph.count_of(t);
            self.center - Self::offset(count, self.band(t).spacing)
        });

        for node in graph.nodes_mut() {
            let node_type = node.node_type();
            let band = self.band(node_type);
            let slot = &mut next_longitude[band_slot(node_type)];

            node.position = Some(GeoPosition {
                latitude: band.latitude,
                longitude: *slot,
            });
            *slot += band.spacing;
        }

        tracing::debug!(
            candidates = graph.count_of(NodeType::Candidate),
            users = graph.count_of(NodeType::User),
            hashtags = graph.count_of(NodeType::Hashtag),
            "Assigned geo layout"
        );
    }
}

fn band_slot(node_type: NodeType) -> usize {
    match node_type {
        NodeType::Candidate => 0,
        NodeType::User => 1,
        NodeType::Hashtag => 2,
    }
}
