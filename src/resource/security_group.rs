//! Security group resource
//!
//! Ingress and egress rules are inline tables with `protocol`,
//! `from_port`, `to_port`, `cidr_blocks` and an optional `description`.
//! Protocol `-1` (or `all`) means every protocol and makes ports optional.
//! For `icmp` the two port fields carry the ICMP type and code.

use super::{AttrType, AttributeSpec, ResourceKind, parse_block};
use crate::error::{Result, ValidationError};
use declarative::{Graph, Node, NodeId, Value};
use std::collections::BTreeMap;
use std::ops::RangeInclusive;

/// Stateful firewall attached to instances and endpoints
pub struct SecurityGroup;

const ATTRIBUTES: &[AttributeSpec] = &[
    AttributeSpec::required("vpc_id", AttrType::Ref("vpc")).replaces(),
    AttributeSpec::optional("name", AttrType::String).replaces(),
    AttributeSpec::optional("description", AttrType::String).replaces(),
    AttributeSpec::optional("ingress", AttrType::List),
    AttributeSpec::optional("egress", AttrType::List),
    AttributeSpec::optional("tags", AttrType::Map),
];

const RULE_KEYS: &[&str] = &["protocol", "from_port", "to_port", "cidr_blocks", "description"];

const PORTS: RangeInclusive<i64> = 0..=65535;

/// ICMP type (from_port) and code (to_port); -1 means all
const ICMP: RangeInclusive<i64> = -1..=255;

/// Ports on an all-protocols rule, which the provider ignores
const ANY_PORTS: RangeInclusive<i64> = -1..=65535;

impl ResourceKind for SecurityGroup {
    fn name(&self) -> &'static str {
        "security_group"
    }

    fn description(&self) -> &'static str {
        "Ingress and egress rules scoped to a VPC"
    }

    fn attributes(&self) -> &'static [AttributeSpec] {
        ATTRIBUTES
    }

    fn exports(&self) -> &'static [&'static str] {
        &["id", "arn", "name"]
    }

    fn validate(&self, node: &Node, graph: &Graph) -> Result<()> {
        for direction in ["ingress", "egress"] {
            let rules = node.attribute(direction).and_then(Value::as_list).unwrap_or_default();
            for rule in rules {
                check_rule(graph, &node.id, direction, rule)?;
            }
        }
        Ok(())
    }
}

fn check_rule(graph: &Graph, id: &NodeId, direction: &str, rule: &Value) -> Result<()> {
    let Some(entry) = rule.as_map() else {
        return Err(ValidationError::wrong_type(id, direction, "a list of tables", rule.type_name()));
    };

    if let Some(key) = entry.keys().find(|k| !RULE_KEYS.contains(&k.as_str())) {
        return Err(ValidationError::invalid(id, format!("{direction} rule has unknown key '{key}'")));
    }

    let protocol = match entry.get("protocol") {
        Some(Value::String(p)) => p.as_str(),
        Some(other) => {
            return Err(ValidationError::wrong_type(
                id,
                &format!("{direction}.protocol"),
                "a string",
                other.type_name(),
            ));
        }
        None => return Err(ValidationError::invalid(id, format!("{direction} rule is missing protocol"))),
    };

    let ports = Ports { id, direction, entry };
    match protocol {
        "-1" | "all" => {
            ports.optional("from_port", &ANY_PORTS)?;
            ports.optional("to_port", &ANY_PORTS)?;
        }
        "icmp" => {
            ports.required("from_port", &ICMP)?;
            ports.required("to_port", &ICMP)?;
        }
        "tcp" | "udp" => {
            let from = ports.required("from_port", &PORTS)?;
            let to = ports.required("to_port", &PORTS)?;
            if from > to {
                return Err(ValidationError::invalid(
                    id,
                    format!("{direction} rule from_port {from} is greater than to_port {to}"),
                ));
            }
        }
        other => {
            return Err(ValidationError::invalid(
                id,
                format!("{direction} rule has unsupported protocol '{other}' (expected tcp, udp, icmp or -1)"),
            ));
        }
    }

    if let Some(blocks) = entry.get("cidr_blocks") {
        let Some(blocks) = blocks.as_list() else {
            return Err(ValidationError::wrong_type(
                id,
                &format!("{direction}.cidr_blocks"),
                "a list",
                blocks.type_name(),
            ));
        };
        for block in blocks {
            parse_block(graph, id, &format!("{direction}.cidr_blocks"), block)?;
        }
    }

    Ok(())
}

/// Port fields of one rule
struct Ports<'a> {
    id: &'a NodeId,
    direction: &'a str,
    entry: &'a BTreeMap<String, Value>,
}

impl Ports<'_> {
    fn required(&self, name: &str, range: &RangeInclusive<i64>) -> Result<i64> {
        match self.optional(name, range)? {
            Some(port) => Ok(port),
            None => Err(ValidationError::invalid(
                self.id,
                format!("{} rule is missing {name}", self.direction),
            )),
        }
    }

    fn optional(&self, name: &str, range: &RangeInclusive<i64>) -> Result<Option<i64>> {
        match self.entry.get(name) {
            Some(Value::Integer(p)) if range.contains(p) => Ok(Some(*p)),
            Some(Value::Integer(p)) => Err(ValidationError::invalid(
                self.id,
                format!(
                    "{}.{name} {p} is outside {}..={}",
                    self.direction,
                    range.start(),
                    range.end()
                ),
            )),
            Some(other) => Err(ValidationError::wrong_type(
                self.id,
                &format!("{}.{name}", self.direction),
                "an integer",
                other.type_name(),
            )),
            None => Ok(None),
        }
    }
}
