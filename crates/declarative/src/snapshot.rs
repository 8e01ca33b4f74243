//! Recorded graph state - what an external engine last applied

use crate::error::Result;
use crate::graph::Graph;
use crate::types::{Node, NodeId};
use serde::{Deserialize, Serialize};

/// Format version written into every snapshot
pub const SNAPSHOT_VERSION: u32 = 1;

/// The declared graph as it was last applied
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u32,
    #[serde(default)]
    pub resources: Vec<Node>,
}

impl Snapshot {
    /// Record a graph, keeping declaration order
    pub fn from_graph(graph: &Graph) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            resources: graph.nodes().to_vec(),
        }
    }

    /// Rebuild the recorded graph
    pub fn to_graph(&self) -> Result<Graph> {
        Graph::new(self.resources.clone())
    }

    pub fn get(&self, id: &NodeId) -> Option<&Node> {
        self.resources.iter().find(|n| &n.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            resources: Vec::new(),
        }
    }
}
