//! VPC endpoint resource

use super::{
    AttrType, AttributeSpec, ResourceKind, ensure_same_vpc, reference_target, reference_targets,
    string_attribute,
};
use crate::error::{Result, ValidationError};
use declarative::{Graph, Node};

/// Private entry point to a provider service
pub struct VpcEndpoint;

const ATTRIBUTES: &[AttributeSpec] = &[
    AttributeSpec::required("vpc_id", AttrType::Ref("vpc")).replaces(),
    AttributeSpec::required("service_name", AttrType::String).replaces(),
    AttributeSpec::optional("vpc_endpoint_type", AttrType::String).replaces(),
    AttributeSpec::optional("subnet_ids", AttrType::RefList("subnet")),
    AttributeSpec::optional("security_group_ids", AttrType::RefList("security_group")),
    AttributeSpec::optional("private_dns_enabled", AttrType::Bool),
    AttributeSpec::optional("tags", AttrType::Map),
];

/// The only endpoint type accepted, and the one assumed when none is declared
pub const DEFAULT_ENDPOINT_TYPE: &str = "Interface";

impl ResourceKind for VpcEndpoint {
    fn name(&self) -> &'static str {
        "vpc_endpoint"
    }

    fn description(&self) -> &'static str {
        "Interface endpoint for a provider service"
    }

    fn attributes(&self) -> &'static [AttributeSpec] {
        ATTRIBUTES
    }

    fn exports(&self) -> &'static [&'static str] {
        &["id", "arn", "dns_entry", "network_interface_ids"]
    }

    fn validate(&self, node: &Node, graph: &Graph) -> Result<()> {
        let id = &node.id;

        if string_attribute(graph, node, "service_name").is_some_and(|s| s.trim().is_empty()) {
            return Err(ValidationError::invalid(id, "service_name must not be empty"));
        }

        let subnets = reference_targets(node, "subnet_ids");
        let groups = reference_targets(node, "security_group_ids");

        let endpoint_type = string_attribute(graph, node, "vpc_endpoint_type").unwrap_or(DEFAULT_ENDPOINT_TYPE);
        if endpoint_type != DEFAULT_ENDPOINT_TYPE {
            return Err(ValidationError::invalid(
                id,
                format!("vpc_endpoint_type must be '{DEFAULT_ENDPOINT_TYPE}', got '{endpoint_type}'"),
            ));
        }
        if subnets.is_empty() {
            return Err(ValidationError::invalid(id, "endpoint needs at least one subnet"));
        }
        if groups.is_empty() {
            return Err(ValidationError::invalid(id, "endpoint needs at least one security group"));
        }

        if let Some(vpc) = reference_target(node, "vpc_id") {
            ensure_same_vpc(graph, id, vpc, &subnets)?;
            ensure_same_vpc(graph, id, vpc, &groups)?;
        }
        Ok(())
    }
}
