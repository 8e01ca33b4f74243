//! Error types for resource graphs

use crate::types::NodeId;
use thiserror::Error;

/// Errors raised while building or resolving a resource graph
///
/// All of these are detected by a pure validation pass, before anything
/// touches the outside world. None are recoverable without editing the
/// declarations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The reference graph contains a cycle
    #[error("dependency cycle: {}", format_cycle(.nodes))]
    Cycle { nodes: Vec<NodeId> },

    /// A node references an identifier that is not in the graph
    #[error("{from} references {missing}, which is not declared")]
    DanglingReference { from: NodeId, missing: NodeId },

    /// Two declarations share one identifier
    #[error("{0} is declared more than once")]
    DuplicateNode(NodeId),

    /// A target filter matched nothing
    #[error("target '{0}' does not match any resource")]
    UnknownTarget(String),

    /// An identifier is not of the form kind.name
    #[error("invalid resource identifier '{0}': expected <kind>.<name>")]
    InvalidId(String),
}

fn format_cycle(nodes: &[NodeId]) -> String {
    let mut parts: Vec<String> = nodes.iter().map(ToString::to_string).collect();
    if let Some(first) = nodes.first() {
        parts.push(first.to_string());
    }
    parts.join(" -> ")
}

/// Result type for graph operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_display_closes_loop() {
        let err = Error::Cycle {
            nodes: vec![NodeId::new("subnet", "a"), NodeId::new("route_table", "b")],
        };
        assert_eq!(
            err.to_string(),
            "dependency cycle: subnet.a -> route_table.b -> subnet.a"
        );
    }

    #[test]
    fn test_dangling_display_names_both_ends() {
        let err = Error::DanglingReference {
            from: NodeId::new("instance", "web"),
            missing: NodeId::new("subnet", "gone"),
        };
        let msg = err.to_string();
        assert!(msg.contains("instance.web"));
        assert!(msg.contains("subnet.gone"));
    }
}
