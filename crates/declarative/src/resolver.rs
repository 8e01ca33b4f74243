//! Dependency resolver - creation and destruction order for a graph
//!
//! Depth-first topological sort with three visit marks. Roots are taken in
//! declaration order and each node's dependencies in the order
//! [`Node::dependencies`](crate::types::Node::dependencies) yields them, so
//! the same input always produces the same order. The traversal keeps its
//! own stack, so chain length is bounded by memory rather than by the
//! thread's call stack.

use crate::error::{Error, Result};
use crate::graph::Graph;
use crate::types::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

/// A resolved application order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    creation: Vec<NodeId>,
}

impl Order {
    /// Every node appears after all nodes it references
    pub fn creation(&self) -> &[NodeId] {
        &self.creation
    }

    /// Reverse of the creation order
    pub fn destruction(&self) -> Vec<NodeId> {
        self.creation.iter().rev().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.creation.len()
    }

    pub fn is_empty(&self) -> bool {
        self.creation.is_empty()
    }
}

/// Resolve the creation order of a graph
///
/// Fails with [`Error::DanglingReference`] before any traversal, then with
/// [`Error::Cycle`] on the first cycle met.
pub fn resolve(graph: &Graph) -> Result<Order> {
    let edges = graph.edge_indices()?;
    let order = sort(&edges).map_err(|cycle| Error::Cycle {
        nodes: cycle
            .into_iter()
            .map(|i| graph.nodes()[i].id.clone())
            .collect(),
    })?;

    Ok(Order {
        creation: order
            .into_iter()
            .map(|i| graph.nodes()[i].id.clone())
            .collect(),
    })
}

/// Topological sort over positional edges. On a cycle, returns the
/// positions on the cycle starting from the node first re-entered.
pub(crate) fn sort(edges: &[Vec<usize>]) -> std::result::Result<Vec<usize>, Vec<usize>> {
    let mut marks = vec![Mark::Unvisited; edges.len()];
    let mut order = Vec::with_capacity(edges.len());
    // Current path, each entry with the index of its next edge to follow
    let mut path: Vec<(usize, usize)> = Vec::new();

    for root in 0..edges.len() {
        if marks[root] != Mark::Unvisited {
            continue;
        }
        marks[root] = Mark::InProgress;
        path.push((root, 0));

        while let Some((idx, next)) = path.last_mut() {
            let idx = *idx;
            let Some(&dep) = edges[idx].get(*next) else {
                path.pop();
                marks[idx] = Mark::Done;
                order.push(idx);
                continue;
            };
            *next += 1;

            match marks[dep] {
                Mark::Done => {}
                Mark::InProgress => {
                    // In-progress nodes are exactly the ones on the current path
                    let start = path.iter().position(|&(i, _)| i == dep).unwrap_or(0);
                    return Err(path[start..].iter().map(|&(i, _)| i).collect());
                }
                Mark::Unvisited => {
                    marks[dep] = Mark::InProgress;
                    path.push((dep, 0));
                }
            }
        }
    }
    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Node, Reference, Value};

    fn resolve_nodes(nodes: Vec<Node>) -> Result<Order> {
        resolve(&Graph::new(nodes)?)
    }

    fn node(id: &str, refs: &[&str]) -> Node {
        let mut n = Node::new(NodeId::parse(id).unwrap());
        for (i, r) in refs.iter().enumerate() {
            n = n.with_attribute(
                format!("ref_{i}"),
                Value::Reference(Reference::parse(&format!("{r}.id")).unwrap()),
            );
        }
        n
    }

    fn ids(order: &[NodeId]) -> Vec<String> {
        order.iter().map(ToString::to_string).collect()
    }

    fn assert_topological(nodes: &[Node], order: &Order) {
        let pos = |id: &NodeId| order.creation().iter().position(|o| o == id).unwrap();
        for n in nodes {
            for dep in n.dependencies() {
                assert!(pos(dep) < pos(&n.id), "{dep} must precede {}", n.id);
            }
        }
    }

    #[test]
    fn test_chain_creation_and_destruction() {
        // C depends on B depends on A, declared out of order
        let nodes = vec![
            node("t.c", &["t.b"]),
            node("t.a", &[]),
            node("t.b", &["t.a"]),
        ];
        let order = resolve_nodes(nodes).unwrap();
        assert_eq!(ids(order.creation()), vec!["t.a", "t.b", "t.c"]);
        assert_eq!(ids(&order.destruction()), vec!["t.c", "t.b", "t.a"]);
    }

    #[test]
    fn test_network_graph_is_topological() {
        let nodes = vec![
            node("instance.web", &["subnet.public", "security_group.web", "iam_instance_profile.ssm"]),
            node("iam_instance_profile.ssm", &["iam_role.ssm"]),
            node("iam_role.ssm", &[]),
            node("security_group.web", &["vpc.main"]),
            node("route_table.public", &["vpc.main", "internet_gateway.main", "subnet.public"]),
            node("subnet.public", &["vpc.main"]),
            node("internet_gateway.main", &["vpc.main"]),
            node("vpc.main", &[]),
        ];
        let order = resolve_nodes(nodes.clone()).unwrap();
        assert_eq!(order.len(), nodes.len());
        assert_topological(&nodes, &order);
    }

    #[test]
    fn test_deterministic() {
        let nodes = vec![
            node("s.b", &["v.main"]),
            node("s.a", &["v.main"]),
            node("v.main", &[]),
            node("r.solo", &[]),
        ];
        let first = resolve_nodes(nodes.clone()).unwrap();
        let second = resolve_nodes(nodes).unwrap();
        assert_eq!(first, second);
        // Declaration order breaks ties between independent nodes
        assert_eq!(ids(first.creation()), vec!["v.main", "s.b", "s.a", "r.solo"]);
    }

    #[test]
    fn test_cycle_reports_participants() {
        let nodes = vec![
            node("v.main", &[]),
            node("s.a", &["v.main", "r.b"]),
            node("r.b", &["s.a"]),
        ];
        match resolve_nodes(nodes) {
            Err(Error::Cycle { nodes }) => {
                assert_eq!(ids(&nodes), vec!["s.a", "r.b"]);
            }
            other => panic!("Expected cycle, got {other:?}"),
        }
    }

    #[test]
    fn test_self_reference_is_cycle() {
        let err = resolve_nodes(vec![node("s.loop", &["s.loop"])]).unwrap_err();
        assert_eq!(
            err,
            Error::Cycle {
                nodes: vec![NodeId::new("s", "loop")]
            }
        );
    }

    #[test]
    fn test_dangling_reference_before_cycle() {
        let nodes = vec![
            node("a.x", &["a.y"]),
            node("a.y", &["a.x", "a.missing"]),
        ];
        let err = resolve_nodes(nodes).unwrap_err();
        assert_eq!(
            err,
            Error::DanglingReference {
                from: NodeId::new("a", "y"),
                missing: NodeId::new("a", "missing"),
            }
        );
    }

    #[test]
    fn test_long_chain() {
        // Each node depends on the one declared before it
        let len = 200_000;
        let nodes: Vec<Node> = (0..len)
            .map(|i| {
                if i == 0 {
                    node("c.n0", &[])
                } else {
                    node(&format!("c.n{i}"), &[&format!("c.n{}", i - 1)])
                }
            })
            .collect();
        let order = resolve_nodes(nodes).unwrap();
        assert_eq!(order.len(), len);
        assert_eq!(order.creation()[0], NodeId::new("c", "n0"));
        assert_eq!(order.creation()[len - 1], NodeId::new("c", format!("n{}", len - 1)));

        // Declared in reverse, the walk from the first root is the whole chain
        let reversed: Vec<Node> = (0..len)
            .rev()
            .map(|i| {
                if i == 0 {
                    node("c.n0", &[])
                } else {
                    node(&format!("c.n{i}"), &[&format!("c.n{}", i - 1)])
                }
            })
            .collect();
        let order = resolve_nodes(reversed).unwrap();
        assert_eq!(order.creation()[0], NodeId::new("c", "n0"));
    }

    #[test]
    fn test_long_cycle() {
        let len = 100_000;
        let nodes: Vec<Node> = (0..len)
            .map(|i| node(&format!("c.n{i}"), &[&format!("c.n{}", (i + 1) % len)]))
            .collect();
        match resolve_nodes(nodes) {
            Err(Error::Cycle { nodes }) => assert_eq!(nodes.len(), len),
            other => panic!("Expected cycle, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_graph() {
        let order = resolve_nodes(Vec::new()).unwrap();
        assert!(order.is_empty());
        assert!(order.destruction().is_empty());
    }
}
