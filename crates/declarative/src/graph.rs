//! Resource graph - declared nodes indexed by identifier

use crate::error::{Error, Result};
use crate::types::{Node, NodeId};
use std::collections::HashMap;

/// A set of declared nodes, kept in declaration order.
///
/// Building a graph only checks identifier uniqueness. Reference checks
/// and ordering happen in [`crate::resolver`].
#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: Vec<Node>,
    index: HashMap<NodeId, usize>,
}

impl Graph {
    /// Build a graph, failing on duplicate identifiers
    pub fn new(nodes: Vec<Node>) -> Result<Self> {
        let mut index = HashMap::with_capacity(nodes.len());
        for (i, node) in nodes.iter().enumerate() {
            if index.insert(node.id.clone(), i).is_some() {
                return Err(Error::DuplicateNode(node.id.clone()));
            }
        }
        Ok(Self { nodes, index })
    }

    /// Nodes in declaration order
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn get(&self, id: &NodeId) -> Option<&Node> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.index.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Declaration position of a node
    pub fn position(&self, id: &NodeId) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Nodes of one kind, in declaration order
    pub fn nodes_of_kind<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a Node> + 'a {
        self.nodes.iter().filter(move |n| n.resource_type() == kind)
    }

    /// Nodes that reference `id`, in declaration order
    pub fn dependents(&self, id: &NodeId) -> Vec<&NodeId> {
        self.nodes
            .iter()
            .filter(|n| n.dependencies().contains(&id))
            .map(|n| &n.id)
            .collect()
    }

    /// Fail with [`Error::DanglingReference`] on the first edge, in
    /// declaration order, whose target is not declared.
    pub fn check_references(&self) -> Result<()> {
        self.edge_indices().map(|_| ())
    }

    /// Outgoing edges as node positions, parallel to [`Self::nodes`]
    pub(crate) fn edge_indices(&self) -> Result<Vec<Vec<usize>>> {
        self.nodes
            .iter()
            .map(|node| {
                node.dependencies()
                    .into_iter()
                    .map(|dep| {
                        self.position(dep).ok_or_else(|| Error::DanglingReference {
                            from: node.id.clone(),
                            missing: dep.clone(),
                        })
                    })
                    .collect()
            })
            .collect()
    }
}
