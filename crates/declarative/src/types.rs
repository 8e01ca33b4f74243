//! Core types for declarative resource graphs

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Identifier of a declared resource: its kind plus its local name.
///
/// Rendered as `kind.name`, e.g. `subnet.public`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NodeId {
    kind: String,
    name: String,
}

impl NodeId {
    pub fn new(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            name: name.into(),
        }
    }

    /// Parse `kind.name`
    pub fn parse(s: &str) -> Result<Self> {
        match s.split_once('.') {
            Some((kind, name)) if is_ident(kind) && is_ident(name) => Ok(Self::new(kind, name)),
            _ => Err(Error::InvalidId(s.to_string())),
        }
    }

    /// Resource kind (e.g. "vpc", "subnet")
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Local name within the kind
    pub fn name(&self) -> &str {
        &self.name
    }
}

fn is_ident(s: &str) -> bool {
    !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.kind, self.name)
    }
}

impl FromStr for NodeId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for NodeId {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<NodeId> for String {
    fn from(id: NodeId) -> Self {
        id.to_string()
    }
}

/// A reference edge: a node, and optionally one of its attributes
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Reference {
    pub target: NodeId,
    pub attribute: Option<String>,
}

impl Reference {
    pub fn new(target: NodeId, attribute: Option<String>) -> Self {
        Self { target, attribute }
    }

    /// Parse `kind.name` or `kind.name.attribute`
    pub fn parse(s: &str) -> Result<Self> {
        let mut parts = s.splitn(3, '.');
        let (Some(kind), Some(name)) = (parts.next(), parts.next()) else {
            return Err(Error::InvalidId(s.to_string()));
        };
        let target = NodeId::parse(&format!("{kind}.{name}")).map_err(|_| Error::InvalidId(s.to_string()))?;
        let attribute = match parts.next() {
            Some(attr) if is_ident(attr) => Some(attr.to_string()),
            Some(_) => return Err(Error::InvalidId(s.to_string())),
            None => None,
        };
        Ok(Self { target, attribute })
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.attribute {
            Some(attr) => write!(f, "${{{}.{}}}", self.target, attr),
            None => write!(f, "${{{}}}", self.target),
        }
    }
}

/// An attribute value: a literal, or something that points at other nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Value {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
    /// The whole value is one reference
    Reference(Reference),
    /// A string with references embedded in it
    Template {
        text: String,
        references: Vec<Reference>,
    },
}

impl Value {
    /// All references in this value, depth first, in order of appearance
    pub fn references(&self) -> Vec<&Reference> {
        let mut out = Vec::new();
        self.collect_references(&mut out);
        out
    }

    fn collect_references<'a>(&'a self, out: &mut Vec<&'a Reference>) {
        match self {
            Self::Reference(r) => out.push(r),
            Self::Template { references, .. } => out.extend(references.iter()),
            Self::List(items) => items.iter().for_each(|v| v.collect_references(out)),
            Self::Map(map) => map.values().for_each(|v| v.collect_references(out)),
            Self::String(_) | Self::Integer(_) | Self::Float(_) | Self::Bool(_) => {}
        }
    }

    /// Whether the value is known without applying anything
    pub fn is_literal(&self) -> bool {
        self.references().is_empty()
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_reference(&self) -> Option<&Reference> {
        match self {
            Self::Reference(r) => Some(r),
            _ => None,
        }
    }

    /// Short type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::Bool(_) => "bool",
            Self::List(_) => "list",
            Self::Map(_) => "map",
            Self::Reference(_) => "reference",
            Self::Template { .. } => "template",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => write!(f, "\"{s}\""),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::List(items) => {
                let parts: Vec<String> = items.iter().map(ToString::to_string).collect();
                write!(f, "[{}]", parts.join(", "))
            }
            Self::Map(map) => {
                let parts: Vec<String> = map.iter().map(|(k, v)| format!("{k} = {v}")).collect();
                write!(f, "{{ {} }}", parts.join(", "))
            }
            Self::Reference(r) => write!(f, "{r}"),
            Self::Template { text, .. } => write!(f, "\"{text}\""),
        }
    }
}

/// A declared resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    #[serde(default)]
    pub attributes: BTreeMap<String, Value>,
    /// Explicit ordering edges that no attribute expresses
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<NodeId>,
}

impl Node {
    pub fn new(id: NodeId) -> Self {
        Self {
            id,
            attributes: BTreeMap::new(),
            depends_on: Vec::new(),
        }
    }

    /// Builder-style attribute setter
    pub fn with_attribute(mut self, name: impl Into<String>, value: Value) -> Self {
        self.attributes.insert(name.into(), value);
        self
    }

    /// Builder-style explicit dependency
    pub fn with_dependency(mut self, id: NodeId) -> Self {
        self.depends_on.push(id);
        self
    }

    /// Resource type tag
    pub fn resource_type(&self) -> &str {
        self.id.kind()
    }

    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// Outgoing edges, deduplicated, explicit ones first, then attribute
    /// references in attribute-name order.
    pub fn dependencies(&self) -> Vec<&NodeId> {
        let mut deps: Vec<&NodeId> = Vec::new();
        let from_attrs = self
            .attributes
            .values()
            .flat_map(Value::references)
            .map(|r| &r.target);
        for id in self.depends_on.iter().chain(from_attrs) {
            if !deps.contains(&id) {
                deps.push(id);
            }
        }
        deps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference(s: &str) -> Value {
        Value::Reference(Reference::parse(s).unwrap())
    }

    #[test]
    fn test_node_id_parse() {
        let id = NodeId::parse("subnet.public").unwrap();
        assert_eq!(id.kind(), "subnet");
        assert_eq!(id.name(), "public");
        assert_eq!(id.to_string(), "subnet.public");

        assert!(NodeId::parse("subnet").is_err());
        assert!(NodeId::parse(".public").is_err());
        assert!(NodeId::parse("subnet.pub lic").is_err());
    }

    #[test]
    fn test_reference_parse() {
        let r = Reference::parse("vpc.main.id").unwrap();
        assert_eq!(r.target, NodeId::new("vpc", "main"));
        assert_eq!(r.attribute.as_deref(), Some("id"));
        assert_eq!(r.to_string(), "${vpc.main.id}");

        let bare = Reference::parse("vpc.main").unwrap();
        assert_eq!(bare.attribute, None);

        assert!(Reference::parse("vpc").is_err());
        assert!(Reference::parse("vpc.main.").is_err());
    }

    #[test]
    fn test_dependencies_dedup_and_order() {
        let node = Node::new(NodeId::new("instance", "web"))
            .with_attribute("subnet_id", reference("subnet.public.id"))
            .with_attribute(
                "vpc_security_group_ids",
                Value::List(vec![
                    reference("security_group.web.id"),
                    reference("security_group.web.arn"),
                ]),
            )
            .with_attribute("ami", Value::String("ami-123".into()))
            .with_dependency(NodeId::new("iam_role", "ssm"));

        let deps: Vec<String> = node.dependencies().iter().map(ToString::to_string).collect();
        assert_eq!(
            deps,
            vec!["iam_role.ssm", "subnet.public", "security_group.web"]
        );
    }

    #[test]
    fn test_template_references() {
        let value = Value::Map(BTreeMap::from([(
            "Name".to_string(),
            Value::Template {
                text: "${vpc.main.id}-rt".into(),
                references: vec![Reference::parse("vpc.main.id").unwrap()],
            },
        )]));
        assert_eq!(value.references().len(), 1);
        assert!(!value.is_literal());
        assert!(Value::Integer(3).is_literal());
    }

    #[test]
    fn test_value_serde_tagged() {
        let value = reference("subnet.a.id");
        let json = serde_json::to_string(&value).unwrap();
        let back: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(back, value);

        let id_json = serde_json::to_string(&NodeId::new("vpc", "main")).unwrap();
        assert_eq!(id_json, "\"vpc.main\"");
    }
}
