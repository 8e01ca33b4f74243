//! VPC resource

use super::{AttrType, AttributeSpec, ResourceKind, block_attribute};
use crate::error::{Result, ValidationError};
use declarative::{Graph, Node};

/// An isolated virtual network
pub struct Vpc;

const ATTRIBUTES: &[AttributeSpec] = &[
    AttributeSpec::required("cidr_block", AttrType::Block).replaces(),
    AttributeSpec::optional("enable_dns_support", AttrType::Bool),
    AttributeSpec::optional("enable_dns_hostnames", AttrType::Bool),
    AttributeSpec::optional("instance_tenancy", AttrType::String).replaces(),
    AttributeSpec::optional("tags", AttrType::Map),
];

impl ResourceKind for Vpc {
    fn name(&self) -> &'static str {
        "vpc"
    }

    fn description(&self) -> &'static str {
        "Virtual private network with an IPv4 address block"
    }

    fn attributes(&self) -> &'static [AttributeSpec] {
        ATTRIBUTES
    }

    fn exports(&self) -> &'static [&'static str] {
        &["id", "arn", "default_security_group_id", "main_route_table_id"]
    }

    fn validate(&self, node: &Node, graph: &Graph) -> Result<()> {
        block_attribute(graph, node, "cidr_block")?;

        if let Some(tenancy) = super::string_attribute(graph, node, "instance_tenancy")
            && !matches!(tenancy, "default" | "dedicated")
        {
            return Err(ValidationError::invalid(
                &node.id,
                format!("instance_tenancy must be 'default' or 'dedicated', got '{tenancy}'"),
            ));
        }
        Ok(())
    }
}
