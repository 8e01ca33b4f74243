//! Declaration loader - TOML tables to a resource graph
//!
//! String attributes may embed `${...}` expressions:
//! - `${var.NAME}` substitutes a resolved variable
//! - `${kind.name.attr}` references an attribute of another resource
//! - `${kind.name}` references the resource itself
//!
//! A string that is exactly one expression takes the type of what it
//! names, so `enabled = "${var.enable_endpoints}"` is a boolean. Strings
//! that mix text and resource references become templates.
//!
//! Two attributes are handled here rather than by the resource kind:
//! `enabled` (false drops the resource) and `depends_on` (explicit edges).

use crate::error::{Result, ValidationError};
use crate::resource;
use crate::schema::Declaration;
use crate::variables::Variables;
use declarative::{Graph, Node, NodeId, Reference, Value};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

static EXPRESSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{\s*([^}]+?)\s*\}").expect("expression pattern is valid"));

const ENABLED: &str = "enabled";
const DEPENDS_ON: &str = "depends_on";

/// A declared output with its expressions resolved
#[derive(Debug, Clone, PartialEq)]
pub struct Output {
    pub name: String,
    pub value: Value,
    pub description: String,
}

/// Everything a declaration file produces
#[derive(Debug, Clone)]
pub struct Loaded {
    pub graph: Graph,
    pub outputs: Vec<Output>,
    pub variables: Variables,
    /// Resources declared with `enabled = false`, in file order
    pub disabled: Vec<NodeId>,
}

/// Where an expression appears, for error reporting
#[derive(Clone, Copy)]
enum Owner<'a> {
    Resource(&'a NodeId),
    Output(&'a str),
}

impl Owner<'_> {
    fn invalid(self, message: String) -> ValidationError {
        match self {
            Self::Resource(id) => ValidationError::invalid(id, message),
            Self::Output(name) => ValidationError::InvalidOutput {
                name: name.to_string(),
                message,
            },
        }
    }

    fn invalid_reference(self, expression: &str, reason: impl Into<String>) -> ValidationError {
        match self {
            Self::Resource(id) => ValidationError::InvalidReference {
                id: id.clone(),
                expression: expression.to_string(),
                reason: reason.into(),
            },
            Self::Output(name) => ValidationError::InvalidOutput {
                name: name.to_string(),
                message: format!("invalid reference '{expression}': {}", reason.into()),
            },
        }
    }
}

/// Build the resource graph from a parsed declaration
pub fn load(decl: &Declaration, variables: Variables) -> Result<Loaded> {
    let mut nodes = Vec::new();
    let mut disabled = Vec::new();

    for (kind, name, table) in decl.resource_entries()? {
        if resource::kind(kind).is_none() {
            return Err(ValidationError::UnknownKind {
                kind: kind.to_string(),
                name: name.to_string(),
            });
        }
        let id = NodeId::parse(&format!("{kind}.{name}"))?;
        let owner = Owner::Resource(&id);

        let mut node = Node::new(id.clone());
        let mut enabled = true;
        for (attr, raw) in table {
            let value = convert(owner, raw, &variables)?;
            match attr.as_str() {
                ENABLED => {
                    enabled = value.as_bool().ok_or_else(|| {
                        ValidationError::wrong_type(&id, ENABLED, "a boolean", value.type_name())
                    })?;
                }
                DEPENDS_ON => node.depends_on = explicit_dependencies(&id, &value)?,
                _ => {
                    node.attributes.insert(attr.clone(), value);
                }
            }
        }

        if enabled {
            nodes.push(node);
        } else {
            log::debug!("Skipping disabled resource {}", id);
            disabled.push(id);
        }
    }

    let graph = Graph::new(nodes)?;

    let mut outputs = Vec::new();
    for (name, decl) in &decl.outputs {
        outputs.push(Output {
            name: name.clone(),
            value: convert(Owner::Output(name), &decl.value, &variables)?,
            description: decl.description.clone(),
        });
    }

    log::debug!(
        "Loaded {} resources ({} disabled), {} outputs",
        graph.len(),
        disabled.len(),
        outputs.len()
    );

    Ok(Loaded {
        graph,
        outputs,
        variables,
        disabled,
    })
}

/// Load with variables from the command line and the environment
pub fn load_with_overrides(decl: &Declaration, overrides: &[(String, String)]) -> Result<Loaded> {
    let variables = Variables::from_env(&decl.variables, overrides)?;
    load(decl, variables)
}

fn explicit_dependencies(id: &NodeId, value: &Value) -> Result<Vec<NodeId>> {
    let Some(items) = value.as_list() else {
        return Err(ValidationError::wrong_type(id, DEPENDS_ON, "a list", value.type_name()));
    };

    items
        .iter()
        .map(|item| match item {
            Value::String(s) => NodeId::parse(s).map_err(|e| {
                ValidationError::InvalidReference {
                    id: id.clone(),
                    expression: s.clone(),
                    reason: e.to_string(),
                }
            }),
            Value::Reference(r) if r.attribute.is_none() => Ok(r.target.clone()),
            other => Err(ValidationError::InvalidReference {
                id: id.clone(),
                expression: other.to_string(),
                reason: "depends_on entries name a resource as kind.name".to_string(),
            }),
        })
        .collect()
}

fn convert(owner: Owner<'_>, raw: &toml::Value, vars: &Variables) -> Result<Value> {
    let value = match raw {
        toml::Value::String(s) => interpolate(owner, s, vars)?,
        toml::Value::Integer(i) => Value::Integer(*i),
        toml::Value::Float(f) if f.is_finite() => Value::Float(*f),
        toml::Value::Float(f) => return Err(owner.invalid(format!("{f} is not a finite number"))),
        toml::Value::Boolean(b) => Value::Bool(*b),
        toml::Value::Datetime(d) => Value::String(d.to_string()),
        toml::Value::Array(items) => Value::List(
            items
                .iter()
                .map(|item| convert(owner, item, vars))
                .collect::<Result<_>>()?,
        ),
        toml::Value::Table(table) => Value::Map(
            table
                .iter()
                .map(|(k, v)| Ok((k.clone(), convert(owner, v, vars)?)))
                .collect::<Result<BTreeMap<_, _>>>()?,
        ),
    };
    Ok(value)
}

/// What one `${...}` expression names
enum Expression<'a> {
    Variable(&'a Value),
    Resource(Reference),
}

fn parse_expression<'v>(owner: Owner<'_>, expr: &str, vars: &'v Variables) -> Result<Expression<'v>> {
    if let Some(name) = expr.strip_prefix("var.") {
        return vars
            .get(name)
            .map(Expression::Variable)
            .ok_or_else(|| ValidationError::UnknownVariable(name.to_string()));
    }
    Reference::parse(expr)
        .map(Expression::Resource)
        .map_err(|e| owner.invalid_reference(expr, e.to_string()))
}

fn interpolate(owner: Owner<'_>, s: &str, vars: &Variables) -> Result<Value> {
    let captures: Vec<_> = EXPRESSION.captures_iter(s).collect();
    if captures.is_empty() {
        return Ok(Value::String(s.to_string()));
    }

    // A lone expression keeps the type of what it names
    if let [only] = captures.as_slice()
        && only.get(0).is_some_and(|m| m.as_str() == s)
    {
        let expr = &only[1];
        return Ok(match parse_expression(owner, expr, vars)? {
            Expression::Variable(value) => value.clone(),
            Expression::Resource(reference) => Value::Reference(reference),
        });
    }

    let mut text = String::with_capacity(s.len());
    let mut references = Vec::new();
    let mut last = 0;
    for caps in &captures {
        let Some(whole) = caps.get(0) else { continue };
        text.push_str(&s[last..whole.start()]);
        last = whole.end();

        let expr = &caps[1];
        match parse_expression(owner, expr, vars)? {
            Expression::Variable(value) => text.push_str(&embed(owner, expr, value)?),
            Expression::Resource(reference) => {
                text.push_str(&reference.to_string());
                if !references.contains(&reference) {
                    references.push(reference);
                }
            }
        }
    }
    text.push_str(&s[last..]);

    if references.is_empty() {
        Ok(Value::String(text))
    } else {
        Ok(Value::Template { text, references })
    }
}

/// Render a variable inside a larger string
fn embed(owner: Owner<'_>, expr: &str, value: &Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Integer(_) | Value::Float(_) | Value::Bool(_) => Ok(value.to_string()),
        other => Err(owner.invalid_reference(
            expr,
            format!("a {} cannot be embedded in a string", other.type_name()),
        )),
    }
}
