//! Execution planner - groups a resolved order into parallel waves

use crate::error::{Error, Result};
use crate::graph::Graph;
use crate::resolver;
use crate::types::{Node, NodeId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Which way a plan walks the graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Create,
    Destroy,
}

/// An execution plan with resources grouped by dependency depth
///
/// Every node in a wave depends only on nodes in earlier waves (create) or
/// is depended on only by nodes in earlier waves (destroy), so the nodes of
/// one wave can be applied in parallel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionPlan {
    pub direction: Direction,
    pub waves: Vec<Vec<NodeId>>,
}

impl ExecutionPlan {
    /// Plan creation of every node in the graph
    pub fn create(graph: &Graph) -> Result<Self> {
        let order = resolver::resolve(graph)?;
        let edges = graph.edge_indices()?;

        let mut depth = vec![0usize; graph.len()];
        let mut waves: Vec<Vec<NodeId>> = Vec::new();
        for id in order.creation() {
            let Some(i) = graph.position(id) else {
                continue;
            };
            depth[i] = edges[i].iter().map(|&d| depth[d] + 1).max().unwrap_or(0);
            if waves.len() <= depth[i] {
                waves.resize_with(depth[i] + 1, Vec::new);
            }
            waves[depth[i]].push(id.clone());
        }

        Ok(Self {
            direction: Direction::Create,
            waves,
        })
    }

    /// Plan destruction of every node in the graph
    pub fn destroy(graph: &Graph) -> Result<Self> {
        let create = Self::create(graph)?;
        let waves = create
            .waves
            .into_iter()
            .rev()
            .map(|wave| wave.into_iter().rev().collect())
            .collect();
        Ok(Self {
            direction: Direction::Destroy,
            waves,
        })
    }

    /// Restrict the plan to targets and what they need.
    ///
    /// Target format: "kind" or "kind.name". A create plan keeps the
    /// transitive dependencies of every match; a destroy plan keeps the
    /// transitive dependents. A target that matches nothing is an error.
    pub fn filter_by_targets(self, graph: &Graph, targets: &[String]) -> Result<Self> {
        if targets.is_empty() {
            return Ok(self);
        }

        let selected = select_targets(graph, targets, self.direction)?;
        Ok(self.filter(|id| selected.contains(id)))
    }

    /// Keep only nodes matching a predicate, dropping emptied waves
    pub fn filter<F>(self, predicate: F) -> Self
    where
        F: Fn(&NodeId) -> bool,
    {
        Self {
            direction: self.direction,
            waves: self
                .waves
                .into_iter()
                .map(|wave| wave.into_iter().filter(|id| predicate(id)).collect::<Vec<_>>())
                .filter(|wave| !wave.is_empty())
                .collect(),
        }
    }

    /// All nodes in plan order
    pub fn order(&self) -> Vec<&NodeId> {
        self.waves.iter().flatten().collect()
    }

    /// Total number of resources in the plan
    pub fn total_resources(&self) -> usize {
        self.waves.iter().map(Vec::len).sum()
    }

    /// Check if plan is empty
    pub fn is_empty(&self) -> bool {
        self.waves.is_empty()
    }

    /// Size of the widest wave
    pub fn max_parallelism(&self) -> usize {
        self.waves.iter().map(Vec::len).max().unwrap_or(0)
    }
}

/// Parse a target string like "kind.name" into (kind, name)
fn parse_target(target: &str) -> (Option<String>, Option<String>) {
    let parts: Vec<&str> = target.split('.').collect();
    match parts.len() {
        1 => (Some(parts[0].to_string()), None),
        2 => (Some(parts[0].to_string()), Some(parts[1].to_string())),
        _ => (None, Some(target.to_string())),
    }
}

/// Check if a node matches the filter criteria
fn matches_filter(node: &Node, kind: Option<&str>, name: Option<&str>) -> bool {
    if let Some(k) = kind {
        // Allow plural aliases ("subnets", "security_groups")
        let matches_kind = node.resource_type() == k || k.strip_suffix('s') == Some(node.resource_type());
        if !matches_kind {
            return false;
        }
    }

    if let Some(n) = name
        && node.id.name() != n
    {
        return false;
    }

    true
}

/// Nodes matching the targets, closed over dependencies or dependents
fn select_targets(graph: &Graph, targets: &[String], direction: Direction) -> Result<HashSet<NodeId>> {
    let mut selected = HashSet::new();
    let mut queue: Vec<NodeId> = Vec::new();

    for target in targets {
        let (kind, name) = parse_target(target);
        let matched: Vec<&Node> = graph
            .nodes()
            .iter()
            .filter(|n| matches_filter(n, kind.as_deref(), name.as_deref()))
            .collect();
        if matched.is_empty() {
            return Err(Error::UnknownTarget(target.clone()));
        }
        queue.extend(matched.into_iter().map(|n| n.id.clone()));
    }

    while let Some(id) = queue.pop() {
        if !selected.insert(id.clone()) {
            continue;
        }
        let next: Vec<&NodeId> = match direction {
            Direction::Create => graph.get(&id).map(Node::dependencies).unwrap_or_default(),
            Direction::Destroy => graph.dependents(&id),
        };
        queue.extend(next.into_iter().filter(|n| !selected.contains(*n)).cloned());
    }

    Ok(selected)
}

/// Connected components of the undirected reference graph.
///
/// Components are independent subgraphs that share no edges, e.g. the IAM
/// branch and the network branch of a declaration. Both the components and
/// their members follow declaration order.
pub fn components(graph: &Graph) -> Result<Vec<Vec<NodeId>>> {
    let edges = graph.edge_indices()?;
    let mut parent: Vec<usize> = (0..graph.len()).collect();

    fn find(parent: &mut [usize], mut i: usize) -> usize {
        while parent[i] != i {
            parent[i] = parent[parent[i]];
            i = parent[i];
        }
        i
    }

    for (i, deps) in edges.iter().enumerate() {
        for &d in deps {
            let (a, b) = (find(&mut parent, i), find(&mut parent, d));
            if a != b {
                // Keep the earliest declared node as the root
                parent[a.max(b)] = a.min(b);
            }
        }
    }

    let mut groups: Vec<(usize, Vec<NodeId>)> = Vec::new();
    for (i, node) in graph.nodes().iter().enumerate() {
        let root = find(&mut parent, i);
        match groups.iter_mut().find(|(r, _)| *r == root) {
            Some((_, members)) => members.push(node.id.clone()),
            None => groups.push((root, vec![node.id.clone()])),
        }
    }

    Ok(groups.into_iter().map(|(_, members)| members).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Reference, Value};

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

    fn sample() -> Graph {
        Graph::new(vec![
            node("vpc.main", &[]),
            node("subnet.a", &["vpc.main"]),
            node("subnet.b", &["vpc.main"]),
            node("security_group.web", &["vpc.main"]),
            node("iam_role.ssm", &[]),
            node("iam_instance_profile.ssm", &["iam_role.ssm"]),
            node(
                "instance.web",
                &["subnet.a", "security_group.web", "iam_instance_profile.ssm"],
            ),
        ])
        .unwrap()
    }

    fn names(wave: &[NodeId]) -> Vec<String> {
        wave.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_create_waves() {
        let plan = ExecutionPlan::create(&sample()).unwrap();
        assert_eq!(plan.waves.len(), 3);
        assert_eq!(names(&plan.waves[0]), vec!["vpc.main", "iam_role.ssm"]);
        assert_eq!(
            names(&plan.waves[1]),
            vec![
                "subnet.a",
                "subnet.b",
                "security_group.web",
                "iam_instance_profile.ssm"
            ]
        );
        assert_eq!(names(&plan.waves[2]), vec!["instance.web"]);
        assert_eq!(plan.total_resources(), 7);
        assert_eq!(plan.max_parallelism(), 4);
    }

    #[test]
    fn test_destroy_waves_reverse_create() {
        let graph = sample();
        let create = ExecutionPlan::create(&graph).unwrap();
        let destroy = ExecutionPlan::destroy(&graph).unwrap();
        assert_eq!(destroy.direction, Direction::Destroy);

        let forward: Vec<&NodeId> = create.order();
        let mut backward: Vec<&NodeId> = destroy.order();
        backward.reverse();
        assert_eq!(forward, backward);
        assert_eq!(names(&destroy.waves[0]), vec!["instance.web"]);
    }

    #[test]
    fn test_create_target_pulls_dependencies() {
        let graph = sample();
        let plan = ExecutionPlan::create(&graph)
            .unwrap()
            .filter_by_targets(&graph, &["iam_instance_profile".to_string()])
            .unwrap();
        assert_eq!(
            plan.order().iter().map(ToString::to_string).collect::<Vec<_>>(),
            vec!["iam_role.ssm", "iam_instance_profile.ssm"]
        );
    }

    #[test]
    fn test_destroy_target_pulls_dependents() {
        let graph = sample();
        let plan = ExecutionPlan::destroy(&graph)
            .unwrap()
            .filter_by_targets(&graph, &["subnet.a".to_string()])
            .unwrap();
        assert_eq!(
            plan.order().iter().map(ToString::to_string).collect::<Vec<_>>(),
            vec!["instance.web", "subnet.a"]
        );
    }

    #[test]
    fn test_plural_target_alias() {
        let graph = sample();
        let plan = ExecutionPlan::create(&graph)
            .unwrap()
            .filter_by_targets(&graph, &["subnets".to_string()])
            .unwrap();
        assert_eq!(plan.total_resources(), 3);
    }

    #[test]
    fn test_unknown_target() {
        let graph = sample();
        let err = ExecutionPlan::create(&graph)
            .unwrap()
            .filter_by_targets(&graph, &["vpc_endpoint".to_string()])
            .unwrap_err();
        assert_eq!(err, Error::UnknownTarget("vpc_endpoint".to_string()));
    }

    #[test]
    fn test_parse_target() {
        assert_eq!(parse_target("subnet"), (Some("subnet".to_string()), None));
        assert_eq!(
            parse_target("subnet.public"),
            (Some("subnet".to_string()), Some("public".to_string()))
        );
        assert_eq!(parse_target("a.b.c"), (None, Some("a.b.c".to_string())));
    }

    #[test]
    fn test_components_split_iam_and_network() {
        let graph = Graph::new(vec![
            node("vpc.main", &[]),
            node("iam_role.ssm", &[]),
            node("subnet.a", &["vpc.main"]),
            node("iam_instance_profile.ssm", &["iam_role.ssm"]),
        ])
        .unwrap();

        let comps = components(&graph).unwrap();
        assert_eq!(comps.len(), 2);
        assert_eq!(names(&comps[0]), vec!["vpc.main", "subnet.a"]);
        assert_eq!(
            names(&comps[1]),
            vec!["iam_role.ssm", "iam_instance_profile.ssm"]
        );

        // The instance joins both branches into one component
        assert_eq!(components(&sample()).unwrap().len(), 1);
    }
}
