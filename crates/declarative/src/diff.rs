//! Diff computation between a recorded snapshot and a desired graph

use crate::error::Result;
use crate::graph::Graph;
use crate::policy::ReplacementClassifier;
use crate::resolver;
use crate::snapshot::Snapshot;
use crate::types::{NodeId, Value};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::fmt;

/// What has to happen to one resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Create,
    Update,
    /// Destroy, then create again
    Replace,
    Delete,
}

impl Action {
    /// One-glyph marker used in listings
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Create => "+",
            Self::Update => "~",
            Self::Replace => "-/+",
            Self::Delete => "-",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Replace => "replace",
            Self::Delete => "delete",
        };
        f.write_str(s)
    }
}

/// One attribute that differs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeChange {
    pub name: String,
    pub before: Option<Value>,
    pub after: Option<Value>,
    pub forces_replacement: bool,
}

/// A diff between the recorded and desired state of a resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceDiff {
    /// Unique identifier of the resource
    pub resource_id: NodeId,
    /// Type of the resource
    pub resource_type: String,
    pub action: Action,
    /// Attribute-level changes (empty for creates and deletes)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub changes: Vec<AttributeChange>,
    /// Referenced nodes that are being replaced, changing their identifiers
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub replaced_dependencies: Vec<NodeId>,
}

impl ResourceDiff {
    fn new(resource_id: NodeId, action: Action) -> Self {
        Self {
            resource_type: resource_id.kind().to_string(),
            resource_id,
            action,
            changes: Vec::new(),
            replaced_dependencies: Vec::new(),
        }
    }
}

/// Compute diffs between a snapshot and the desired graph
///
/// Returns only resources that change. Creates, updates and replacements
/// come first, in creation order of the desired graph. Deletions follow, in
/// destruction order of the recorded graph.
///
/// A resource is replaced when a replacement-forcing attribute changes, or
/// when such an attribute references a resource that is itself replaced.
/// A plain attribute referencing a replaced resource only forces an update.
pub fn compute_diffs<C>(prior: &Snapshot, desired: &Graph, classifier: &C) -> Result<Vec<ResourceDiff>>
where
    C: ReplacementClassifier + ?Sized,
{
    let order = resolver::resolve(desired)?;
    let prior_graph = prior.to_graph()?;
    let mut replaced: HashSet<NodeId> = HashSet::new();
    let mut diffs = Vec::new();

    for id in order.creation() {
        let Some(node) = desired.get(id) else {
            continue;
        };
        let Some(before) = prior_graph.get(id) else {
            diffs.push(ResourceDiff::new(id.clone(), Action::Create));
            continue;
        };

        let kind = node.resource_type();
        let mut diff = ResourceDiff::new(id.clone(), Action::Update);
        let mut forced = false;

        let names: BTreeSet<&String> = before.attributes.keys().chain(node.attributes.keys()).collect();
        for name in names {
            let (old, new) = (before.attributes.get(name), node.attributes.get(name));
            if old == new {
                continue;
            }
            let forces = classifier.forces_replacement(kind, name);
            forced |= forces;
            diff.changes.push(AttributeChange {
                name: name.clone(),
                before: old.cloned(),
                after: new.cloned(),
                forces_replacement: forces,
            });
        }

        for (name, value) in &node.attributes {
            for reference in value.references() {
                if !replaced.contains(&reference.target) {
                    continue;
                }
                if !diff.replaced_dependencies.contains(&reference.target) {
                    diff.replaced_dependencies.push(reference.target.clone());
                }
                forced |= classifier.forces_replacement(kind, name);
            }
        }

        if forced {
            diff.action = Action::Replace;
            replaced.insert(id.clone());
        } else if diff.changes.is_empty() && diff.replaced_dependencies.is_empty() {
            continue;
        }
        diffs.push(diff);
    }

    let prior_order = resolver::resolve(&prior_graph)?;
    for id in prior_order.destruction() {
        if !desired.contains(&id) {
            diffs.push(ResourceDiff::new(id, Action::Delete));
        }
    }

    Ok(diffs)
}

/// Diff summary statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffSummary {
    /// Number of resources to create
    pub additions: usize,
    /// Number of resources to update in place
    pub modifications: usize,
    /// Number of resources to destroy and re-create
    pub replacements: usize,
    /// Number of resources to delete
    pub removals: usize,
}

impl DiffSummary {
    /// Create a summary from a list of diffs
    pub fn from_diffs(diffs: &[ResourceDiff]) -> Self {
        let mut summary = Self::default();
        for diff in diffs {
            match diff.action {
                Action::Create => summary.additions += 1,
                Action::Update => summary.modifications += 1,
                Action::Replace => summary.replacements += 1,
                Action::Delete => summary.removals += 1,
            }
        }
        summary
    }

    /// Total number of changes
    pub fn total(&self) -> usize {
        self.additions + self.modifications + self.replacements + self.removals
    }

    /// Check if there are any changes
    pub fn has_changes(&self) -> bool {
        self.total() > 0
    }
}

/// Group diffs by resource type, types in the order they first appear
pub fn group_by_type(diffs: &[ResourceDiff]) -> Vec<(&str, Vec<&ResourceDiff>)> {
    let mut groups: Vec<(&str, Vec<&ResourceDiff>)> = Vec::new();
    for diff in diffs {
        match groups.iter_mut().find(|(t, _)| *t == diff.resource_type) {
            Some((_, group)) => group.push(diff),
            None => groups.push((diff.resource_type.as_str(), vec![diff])),
        }
    }
    groups
}
