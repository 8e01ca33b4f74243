//! Resource kinds and their declaration rules
//!
//! Every declarable AWS resource is modeled as a [`ResourceKind`] with:
//! - Attribute specs (type, required, forces replacement)
//! - Exported attributes other resources may reference
//! - Kind-specific invariants checked against the whole graph

use crate::error::{Result, ValidationError};
use declarative::{Graph, Node, NodeId, ReplacementClassifier, Value};
use netblock::Ipv4Block;

pub mod iam;
pub mod instance;
pub mod internet_gateway;
pub mod route_table;
pub mod security_group;
pub mod subnet;
pub mod vpc;
pub mod vpc_endpoint;

/// Expected shape of an attribute value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrType {
    /// A string, possibly built from references
    String,
    Bool,
    Integer,
    /// An IPv4 CIDR block, literal or referenced
    Block,
    Map,
    List,
    /// A single reference to a node of the given kind
    Ref(&'static str),
    /// A list of references to nodes of the given kind
    RefList(&'static str),
}

/// Declaration rules for one attribute
#[derive(Debug, Clone, Copy)]
pub struct AttributeSpec {
    pub name: &'static str,
    pub ty: AttrType,
    pub required: bool,
    pub forces_replacement: bool,
}

impl AttributeSpec {
    pub const fn optional(name: &'static str, ty: AttrType) -> Self {
        Self {
            name,
            ty,
            required: false,
            forces_replacement: false,
        }
    }

    pub const fn required(name: &'static str, ty: AttrType) -> Self {
        Self {
            name,
            ty,
            required: true,
            forces_replacement: false,
        }
    }

    /// Changing this attribute destroys and re-creates the resource
    pub const fn replaces(mut self) -> Self {
        self.forces_replacement = true;
        self
    }
}

/// Core trait for all declarable resource kinds
pub trait ResourceKind: Send + Sync {
    /// Kind name as written in declarations (e.g. "subnet")
    fn name(&self) -> &'static str;

    /// Human-readable description
    fn description(&self) -> &'static str;

    /// Accepted attributes
    fn attributes(&self) -> &'static [AttributeSpec];

    /// Attributes only known once the resource exists (e.g. "id", "arn")
    fn exports(&self) -> &'static [&'static str];

    /// Kind-specific invariants. Runs after the graph resolved, so every
    /// reference points at a declared node.
    fn validate(&self, _node: &Node, _graph: &Graph) -> Result<()> {
        Ok(())
    }

    fn spec(&self, attribute: &str) -> Option<&'static AttributeSpec> {
        self.attributes().iter().find(|a| a.name == attribute)
    }

    fn forces_replacement(&self, attribute: &str) -> bool {
        self.spec(attribute).is_some_and(|a| a.forces_replacement)
    }

    /// Whether other resources may reference `attribute` of this kind
    fn is_referenceable(&self, attribute: &str) -> bool {
        self.exports().contains(&attribute) || self.spec(attribute).is_some()
    }
}

static KINDS: &[&dyn ResourceKind] = &[
    &vpc::Vpc,
    &subnet::Subnet,
    &internet_gateway::InternetGateway,
    &route_table::RouteTable,
    &security_group::SecurityGroup,
    &iam::IamRole,
    &iam::IamInstanceProfile,
    &instance::Instance,
    &vpc_endpoint::VpcEndpoint,
];

/// All known kinds
pub fn kinds() -> &'static [&'static dyn ResourceKind] {
    KINDS
}

/// Look up a kind by name
pub fn kind(name: &str) -> Option<&'static dyn ResourceKind> {
    KINDS.iter().copied().find(|k| k.name() == name)
}

/// Replacement policy backed by the kind registry
pub struct KindPolicy;

impl ReplacementClassifier for KindPolicy {
    fn forces_replacement(&self, resource_type: &str, attribute: &str) -> bool {
        kind(resource_type).is_some_and(|k| k.forces_replacement(attribute))
    }
}

// ============================================================================
// Structural checks
// ============================================================================

/// Check a node against its kind's attribute specs and check every
/// reference it makes against the referenced kind's exports.
///
/// References to undeclared nodes are left to the resolver.
pub fn check_structure(node: &Node, graph: &Graph) -> Result<()> {
    let id = &node.id;
    let kind = kind(id.kind()).ok_or_else(|| ValidationError::UnknownKind {
        kind: id.kind().to_string(),
        name: id.name().to_string(),
    })?;

    for (name, value) in &node.attributes {
        let spec = kind
            .spec(name)
            .ok_or_else(|| ValidationError::UnknownAttribute {
                id: id.clone(),
                attribute: name.clone(),
            })?;
        check_type(id, spec, value)?;
    }

    for spec in kind.attributes().iter().filter(|a| a.required) {
        if node.attribute(spec.name).is_none() {
            return Err(ValidationError::MissingAttribute {
                id: id.clone(),
                attribute: spec.name.to_string(),
            });
        }
    }

    for reference in node.attributes.values().flat_map(Value::references) {
        let target_kind = kind_of(id, &reference.target)?;
        if let Some(attr) = &reference.attribute {
            let declared = graph
                .get(&reference.target)
                .is_some_and(|t| t.attribute(attr).is_some());
            if !declared && !target_kind.is_referenceable(attr) {
                return Err(ValidationError::UnexportedAttribute {
                    from: id.clone(),
                    target: reference.target.clone(),
                    attribute: attr.clone(),
                });
            }
        }
    }

    Ok(())
}

fn kind_of(from: &NodeId, target: &NodeId) -> Result<&'static dyn ResourceKind> {
    kind(target.kind()).ok_or_else(|| ValidationError::InvalidReference {
        id: from.clone(),
        expression: target.to_string(),
        reason: format!("unknown resource kind '{}'", target.kind()),
    })
}

fn check_type(id: &NodeId, spec: &AttributeSpec, value: &Value) -> Result<()> {
    let ok = match (spec.ty, value) {
        (AttrType::String, Value::String(_) | Value::Template { .. } | Value::Reference(_)) => true,
        (AttrType::Bool, Value::Bool(_)) => true,
        (AttrType::Integer, Value::Integer(_)) => true,
        (AttrType::Block, Value::String(_) | Value::Reference(_)) => true,
        (AttrType::Map, Value::Map(_)) => true,
        (AttrType::List, Value::List(_)) => true,
        (AttrType::Ref(kind), Value::Reference(r)) => {
            return check_ref_kind(id, spec.name, kind, &r.target);
        }
        (AttrType::RefList(kind), Value::List(items)) => {
            for item in items {
                match item {
                    Value::Reference(r) => check_ref_kind(id, spec.name, kind, &r.target)?,
                    other => {
                        return Err(ValidationError::wrong_type(
                            id,
                            spec.name,
                            "a list of references",
                            format!("an item of type {}", other.type_name()),
                        ));
                    }
                }
            }
            true
        }
        _ => false,
    };

    if ok {
        Ok(())
    } else {
        Err(ValidationError::wrong_type(
            id,
            spec.name,
            expected_name(spec.ty),
            value.type_name(),
        ))
    }
}

fn check_ref_kind(id: &NodeId, attribute: &str, expected: &'static str, target: &NodeId) -> Result<()> {
    if target.kind() == expected {
        Ok(())
    } else {
        Err(ValidationError::WrongReferenceKind {
            id: id.clone(),
            attribute: attribute.to_string(),
            expected,
            found: target.clone(),
        })
    }
}

fn expected_name(ty: AttrType) -> &'static str {
    match ty {
        AttrType::String => "a string",
        AttrType::Bool => "a boolean",
        AttrType::Integer => "an integer",
        AttrType::Block => "a CIDR block",
        AttrType::Map => "a table",
        AttrType::List => "a list",
        AttrType::Ref(_) => "a reference",
        AttrType::RefList(_) => "a list of references",
    }
}

// ============================================================================
// Graph helpers for kind invariants
// ============================================================================

/// Target of a single-reference attribute
pub fn reference_target<'a>(node: &'a Node, attribute: &str) -> Option<&'a NodeId> {
    node.attribute(attribute)
        .and_then(Value::as_reference)
        .map(|r| &r.target)
}

/// Targets of a reference-list attribute, in order
pub fn reference_targets<'a>(node: &'a Node, attribute: &str) -> Vec<&'a NodeId> {
    node.attribute(attribute)
        .and_then(Value::as_list)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_reference)
                .map(|r| &r.target)
                .collect()
        })
        .unwrap_or_default()
}

/// Follow references until a literal value is reached.
///
/// Returns `None` when the chain ends at an attribute that is only known
/// after apply.
pub fn literal<'a>(graph: &'a Graph, value: &'a Value) -> Option<&'a Value> {
    let mut current = value;
    // Bounded so a cyclic chain of attribute references cannot loop
    for _ in 0..=graph.len() {
        match current {
            Value::Reference(r) => {
                let attr = r.attribute.as_deref()?;
                current = graph.get(&r.target)?.attribute(attr)?;
            }
            Value::Template { .. } => return None,
            other => return Some(other),
        }
    }
    None
}

/// Parse a block-typed attribute.
///
/// `Ok(None)` when the attribute is absent or not known before apply.
pub fn block_attribute(graph: &Graph, node: &Node, attribute: &str) -> Result<Option<Ipv4Block>> {
    let Some(value) = node.attribute(attribute) else {
        return Ok(None);
    };
    parse_block(graph, &node.id, attribute, value)
}

/// Parse a value as a block, resolving references to literal attributes
pub fn parse_block(graph: &Graph, id: &NodeId, attribute: &str, value: &Value) -> Result<Option<Ipv4Block>> {
    match literal(graph, value) {
        Some(Value::String(s)) => Ipv4Block::parse(s)
            .map(Some)
            .map_err(|source| ValidationError::InvalidRange {
                id: id.clone(),
                attribute: attribute.to_string(),
                source,
            }),
        Some(other) => Err(ValidationError::wrong_type(
            id,
            attribute,
            "a CIDR block",
            other.type_name(),
        )),
        None => Ok(None),
    }
}

/// The VPC a network-scoped node belongs to
pub fn vpc_of(graph: &Graph, id: &NodeId) -> Option<NodeId> {
    let node = graph.get(id)?;
    match id.kind() {
        "vpc" => Some(id.clone()),
        "instance" => vpc_of(graph, reference_target(node, "subnet_id")?),
        _ => reference_target(node, "vpc_id").cloned(),
    }
}

/// Fail with [`ValidationError::NetworkMismatch`] unless every member
/// belongs to `expected`
pub fn ensure_same_vpc(graph: &Graph, id: &NodeId, expected: &NodeId, members: &[&NodeId]) -> Result<()> {
    for member in members {
        if let Some(found) = vpc_of(graph, member)
            && &found != expected
        {
            return Err(ValidationError::NetworkMismatch {
                id: id.clone(),
                target: (*member).clone(),
                expected: expected.clone(),
                found,
            });
        }
    }
    Ok(())
}

/// Read an optional string attribute that must be literal
pub fn string_attribute<'a>(graph: &'a Graph, node: &'a Node, attribute: &str) -> Option<&'a str> {
    node.attribute(attribute)
        .and_then(|v| literal(graph, v))
        .and_then(Value::as_str)
}

#[cfg(test)]
pub(crate) mod testing {
    //! Shared fixtures for kind tests

    use declarative::{Graph, Node, NodeId, Reference, Value};

    pub fn s(v: &str) -> Value {
        Value::String(v.to_string())
    }

    pub fn r(v: &str) -> Value {
        Value::Reference(Reference::parse(v).unwrap())
    }

    pub fn refs(vs: &[&str]) -> Value {
        Value::List(vs.iter().map(|v| r(v)).collect())
    }

    pub fn node(id: &str, attrs: Vec<(&str, Value)>) -> Node {
        attrs
            .into_iter()
            .fold(Node::new(NodeId::parse(id).unwrap()), |n, (k, v)| {
                n.with_attribute(k, v)
            })
    }

    /// A VPC with two subnets, a security group, and a second VPC
    pub fn network() -> Vec<Node> {
        vec![
            node("vpc.main", vec![("cidr_block", s("10.0.0.0/16"))]),
            node("vpc.other", vec![("cidr_block", s("10.1.0.0/16"))]),
            node(
                "subnet.a",
                vec![("vpc_id", r("vpc.main.id")), ("cidr_block", s("10.0.1.0/24"))],
            ),
            node(
                "subnet.b",
                vec![("vpc_id", r("vpc.main.id")), ("cidr_block", s("10.0.2.0/24"))],
            ),
            node(
                "subnet.elsewhere",
                vec![("vpc_id", r("vpc.other.id")), ("cidr_block", s("10.1.1.0/24"))],
            ),
            node("security_group.web", vec![("vpc_id", r("vpc.main.id"))]),
            node("security_group.foreign", vec![("vpc_id", r("vpc.other.id"))]),
        ]
    }

    pub fn graph_with(extra: Vec<Node>) -> Graph {
        let mut nodes = network();
        nodes.extend(extra);
        Graph::new(nodes).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;

    #[test]
    fn test_registry() {
        assert_eq!(kinds().len(), 9);
        assert!(kind("vpc_endpoint").is_some());
        assert!(kind("aws_vpc").is_none());

        let names: std::collections::HashSet<_> = kinds().iter().map(|k| k.name()).collect();
        assert_eq!(names.len(), kinds().len(), "kind names must be unique");
    }

    #[test]
    fn test_kind_policy() {
        assert!(KindPolicy.forces_replacement("subnet", "cidr_block"));
        assert!(!KindPolicy.forces_replacement("subnet", "map_public_ip_on_launch"));
        assert!(!KindPolicy.forces_replacement("nonexistent", "cidr_block"));
    }

    #[test]
    fn test_replacement_sets() {
        let expected: &[(&str, &[&str])] = &[
            ("vpc", &["cidr_block", "instance_tenancy"]),
            ("subnet", &["vpc_id", "cidr_block", "availability_zone"]),
            ("internet_gateway", &[]),
            ("route_table", &["vpc_id"]),
            ("security_group", &["vpc_id", "name", "description"]),
            ("iam_role", &["name"]),
            ("iam_instance_profile", &["name"]),
            ("instance", &["ami", "subnet_id", "associate_public_ip_address", "user_data"]),
            ("vpc_endpoint", &["vpc_id", "service_name", "vpc_endpoint_type"]),
        ];
        assert_eq!(expected.len(), kinds().len());

        for (name, forcing) in expected {
            let kind = kind(name).unwrap();
            let actual: Vec<&str> = kind
                .attributes()
                .iter()
                .filter(|a| a.forces_replacement)
                .map(|a| a.name)
                .collect();
            assert_eq!(&actual, forcing, "{name}");
        }
    }

    #[test]
    fn test_unknown_kind() {
        let graph = graph_with(vec![]);
        let n = node("nat_gateway.main", vec![]);
        assert!(matches!(
            check_structure(&n, &graph),
            Err(ValidationError::UnknownKind { .. })
        ));
    }

    #[test]
    fn test_unknown_and_missing_attributes() {
        let graph = graph_with(vec![]);

        let n = node("vpc.x", vec![("cidr_block", s("10.0.0.0/16")), ("colour", s("red"))]);
        assert!(matches!(
            check_structure(&n, &graph),
            Err(ValidationError::UnknownAttribute { attribute, .. }) if attribute == "colour"
        ));

        let n = node("subnet.x", vec![("vpc_id", r("vpc.main.id"))]);
        assert!(matches!(
            check_structure(&n, &graph),
            Err(ValidationError::MissingAttribute { attribute, .. }) if attribute == "cidr_block"
        ));
    }

    #[test]
    fn test_wrong_types() {
        let graph = graph_with(vec![]);

        let n = node(
            "vpc.x",
            vec![("cidr_block", s("10.0.0.0/16")), ("enable_dns_support", s("yes"))],
        );
        assert!(matches!(
            check_structure(&n, &graph),
            Err(ValidationError::WrongType { .. })
        ));

        let n = node(
            "subnet.x",
            vec![("vpc_id", r("subnet.a.id")), ("cidr_block", s("10.0.9.0/24"))],
        );
        assert!(matches!(
            check_structure(&n, &graph),
            Err(ValidationError::WrongReferenceKind { expected: "vpc", .. })
        ));
    }

    #[test]
    fn test_reference_attribute_must_be_exported_or_declared() {
        let graph = graph_with(vec![]);

        // Exported
        let n = node("subnet.x", vec![("vpc_id", r("vpc.main.id")), ("cidr_block", s("10.0.9.0/24"))]);
        assert!(check_structure(&n, &graph).is_ok());

        // Declared literal attribute
        let n = node(
            "subnet.x",
            vec![("vpc_id", r("vpc.main.id")), ("cidr_block", r("vpc.main.cidr_block"))],
        );
        assert!(check_structure(&n, &graph).is_ok());

        // Neither
        let n = node("subnet.x", vec![("vpc_id", r("vpc.main.owner")), ("cidr_block", s("10.0.9.0/24"))]);
        assert!(matches!(
            check_structure(&n, &graph),
            Err(ValidationError::UnexportedAttribute { attribute, .. }) if attribute == "owner"
        ));
    }

    #[test]
    fn test_literal_follows_references() {
        let graph = graph_with(vec![]);
        assert_eq!(literal(&graph, &r("vpc.main.cidr_block")), Some(&s("10.0.0.0/16")));
        assert_eq!(literal(&graph, &r("vpc.main.id")), None);
        assert_eq!(literal(&graph, &s("x")), Some(&s("x")));
    }

    #[test]
    fn test_vpc_of() {
        let graph = graph_with(vec![node(
            "instance.web",
            vec![("subnet_id", r("subnet.a.id"))],
        )]);
        let main = NodeId::new("vpc", "main");
        assert_eq!(vpc_of(&graph, &NodeId::new("subnet", "a")), Some(main.clone()));
        assert_eq!(vpc_of(&graph, &NodeId::new("instance", "web")), Some(main.clone()));
        assert_eq!(vpc_of(&graph, &main), Some(main));
        assert_eq!(vpc_of(&graph, &NodeId::new("subnet", "nope")), None);
    }
}
