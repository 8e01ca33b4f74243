//! EC2 instance resource

use super::{
    AttrType, AttributeSpec, ResourceKind, ensure_same_vpc, reference_target, reference_targets,
    string_attribute, vpc_of,
};
use crate::error::{Result, ValidationError};
use declarative::{Graph, Node, NodeId, Value};

/// A compute node placed in one subnet
pub struct Instance;

const ATTRIBUTES: &[AttributeSpec] = &[
    AttributeSpec::required("ami", AttrType::String).replaces(),
    AttributeSpec::required("instance_type", AttrType::String),
    AttributeSpec::required("subnet_id", AttrType::Ref("subnet")).replaces(),
    AttributeSpec::required("vpc_security_group_ids", AttrType::RefList("security_group")),
    AttributeSpec::optional("iam_instance_profile", AttrType::Ref("iam_instance_profile")),
    AttributeSpec::optional("associate_public_ip_address", AttrType::Bool).replaces(),
    AttributeSpec::optional("user_data", AttrType::String).replaces(),
    AttributeSpec::optional("root_block_device", AttrType::Map),
    AttributeSpec::optional("tags", AttrType::Map),
];

const VOLUME_TYPES: &[&str] = &["standard", "gp2", "gp3", "io1", "io2", "st1", "sc1"];

impl ResourceKind for Instance {
    fn name(&self) -> &'static str {
        "instance"
    }

    fn description(&self) -> &'static str {
        "EC2 instance in a subnet with security groups"
    }

    fn attributes(&self) -> &'static [AttributeSpec] {
        ATTRIBUTES
    }

    fn exports(&self) -> &'static [&'static str] {
        &["id", "arn", "public_ip", "private_ip", "public_dns", "private_dns"]
    }

    fn validate(&self, node: &Node, graph: &Graph) -> Result<()> {
        let id = &node.id;

        if let Some(ami) = string_attribute(graph, node, "ami")
            && !ami.starts_with("ami-")
        {
            return Err(ValidationError::invalid(id, format!("ami '{ami}' is not an image id")));
        }

        let groups = reference_targets(node, "vpc_security_group_ids");
        if groups.is_empty() {
            return Err(ValidationError::invalid(id, "at least one security group is required"));
        }

        if let Some(vpc) = reference_target(node, "subnet_id").and_then(|s| vpc_of(graph, s)) {
            ensure_same_vpc(graph, id, &vpc, &groups)?;
        }

        if let Some(device) = node.attribute("root_block_device").and_then(Value::as_map) {
            check_root_device(id, device)?;
        }
        Ok(())
    }
}

fn check_root_device(id: &NodeId, device: &std::collections::BTreeMap<String, Value>) -> Result<()> {
    for (key, value) in device {
        let attribute = format!("root_block_device.{key}");
        match (key.as_str(), value) {
            ("volume_size", Value::Integer(size)) if *size > 0 => {}
            ("volume_size", Value::Integer(size)) => {
                return Err(ValidationError::invalid(id, format!("volume_size must be positive, got {size}")));
            }
            ("volume_type", Value::String(t)) if VOLUME_TYPES.contains(&t.as_str()) => {}
            ("volume_type", Value::String(t)) => {
                return Err(ValidationError::invalid(id, format!("unknown volume_type '{t}'")));
            }
            ("encrypted" | "delete_on_termination", Value::Bool(_)) => {}
            ("volume_size", other) => {
                return Err(ValidationError::wrong_type(id, &attribute, "an integer", other.type_name()));
            }
            ("volume_type", other) => {
                return Err(ValidationError::wrong_type(id, &attribute, "a string", other.type_name()));
            }
            ("encrypted" | "delete_on_termination", other) => {
                return Err(ValidationError::wrong_type(id, &attribute, "a boolean", other.type_name()));
            }
            _ => {
                return Err(ValidationError::UnknownAttribute {
                    id: id.clone(),
                    attribute,
                });
            }
        }
    }
    Ok(())
}
