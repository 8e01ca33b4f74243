//! Subnet resource

use super::{AttrType, AttributeSpec, ResourceKind, block_attribute, reference_target};
use crate::error::{Result, ValidationError};
use declarative::{Graph, Node};

/// An address range carved out of a VPC
pub struct Subnet;

const ATTRIBUTES: &[AttributeSpec] = &[
    AttributeSpec::required("vpc_id", AttrType::Ref("vpc")).replaces(),
    AttributeSpec::required("cidr_block", AttrType::Block).replaces(),
    AttributeSpec::optional("availability_zone", AttrType::String).replaces(),
    AttributeSpec::optional("map_public_ip_on_launch", AttrType::Bool),
    AttributeSpec::optional("tags", AttrType::Map),
];

impl ResourceKind for Subnet {
    fn name(&self) -> &'static str {
        "subnet"
    }

    fn description(&self) -> &'static str {
        "Address range within a VPC"
    }

    fn attributes(&self) -> &'static [AttributeSpec] {
        ATTRIBUTES
    }

    fn exports(&self) -> &'static [&'static str] {
        &["id", "arn"]
    }

    fn validate(&self, node: &Node, graph: &Graph) -> Result<()> {
        let Some(block) = block_attribute(graph, node, "cidr_block")? else {
            return Ok(());
        };
        let Some(vpc) = reference_target(node, "vpc_id").and_then(|id| graph.get(id)) else {
            return Ok(());
        };
        let Some(parent) = block_attribute(graph, vpc, "cidr_block")? else {
            return Ok(());
        };

        block
            .ensure_within(&parent)
            .map_err(|source| ValidationError::InvalidRange {
                id: node.id.clone(),
                attribute: "cidr_block".to_string(),
                source,
            })
    }
}
