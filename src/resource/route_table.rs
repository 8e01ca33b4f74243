//! Route table resource
//!
//! Routes are inline tables:
//!
//! ```toml
//! [resources.route_table.public]
//! vpc_id = "${vpc.main.id}"
//! subnet_ids = ["${subnet.public.id}"]
//! routes = [
//!     { destination_cidr_block = "0.0.0.0/0", gateway_id = "${internet_gateway.main.id}" },
//! ]
//! ```

use super::{
    AttrType, AttributeSpec, ResourceKind, block_attribute, ensure_same_vpc, parse_block,
    reference_target, reference_targets,
};
use crate::error::{Result, ValidationError};
use declarative::{Graph, Node, NodeId, Value};
use netblock::Ipv4Block;

/// Routing rules associated with a set of subnets
pub struct RouteTable;

const ATTRIBUTES: &[AttributeSpec] = &[
    AttributeSpec::required("vpc_id", AttrType::Ref("vpc")).replaces(),
    AttributeSpec::optional("subnet_ids", AttrType::RefList("subnet")),
    AttributeSpec::optional("routes", AttrType::List),
    AttributeSpec::optional("tags", AttrType::Map),
];

/// Keys accepted in a route entry
const ROUTE_KEYS: &[&str] = &["destination_cidr_block", "gateway_id"];

impl ResourceKind for RouteTable {
    fn name(&self) -> &'static str {
        "route_table"
    }

    fn description(&self) -> &'static str {
        "Routes for the subnets associated with it"
    }

    fn attributes(&self) -> &'static [AttributeSpec] {
        ATTRIBUTES
    }

    fn exports(&self) -> &'static [&'static str] {
        &["id"]
    }

    fn validate(&self, node: &Node, graph: &Graph) -> Result<()> {
        let id = &node.id;
        let vpc = reference_target(node, "vpc_id");

        let subnets = reference_targets(node, "subnet_ids");
        for (i, subnet) in subnets.iter().enumerate() {
            if subnets[..i].contains(subnet) {
                return Err(ValidationError::invalid(
                    id,
                    format!("subnet_ids associates {subnet} more than once"),
                ));
            }
        }
        if let Some(vpc) = vpc {
            ensure_same_vpc(graph, id, vpc, &subnets)?;
        }

        let mut blocks = Vec::new();
        for subnet in &subnets {
            if let Some(block) = graph
                .get(subnet)
                .map(|n| block_attribute(graph, n, "cidr_block"))
                .transpose()?
                .flatten()
            {
                blocks.push(block);
            }
        }
        netblock::ensure_disjoint(&blocks).map_err(|source| ValidationError::InvalidRange {
            id: id.clone(),
            attribute: "subnet_ids".to_string(),
            source,
        })?;

        let routes = node.attribute("routes").and_then(Value::as_list).unwrap_or_default();
        let mut destinations: Vec<Ipv4Block> = Vec::new();
        for route in routes {
            let destination = check_route(graph, id, vpc, route)?;
            if let Some(destination) = destination {
                if destinations.contains(&destination) {
                    return Err(ValidationError::invalid(
                        id,
                        format!("duplicate route for {destination}"),
                    ));
                }
                destinations.push(destination);
            }
        }

        Ok(())
    }
}

/// Check one route entry, returning its destination when known
fn check_route(graph: &Graph, id: &NodeId, vpc: Option<&NodeId>, route: &Value) -> Result<Option<Ipv4Block>> {
    let Some(entry) = route.as_map() else {
        return Err(ValidationError::wrong_type(id, "routes", "a list of tables", route.type_name()));
    };

    if let Some(key) = entry.keys().find(|k| !ROUTE_KEYS.contains(&k.as_str())) {
        return Err(ValidationError::invalid(id, format!("route has unknown key '{key}'")));
    }

    let destination = match entry.get("destination_cidr_block") {
        Some(value) => parse_block(graph, id, "routes.destination_cidr_block", value)?,
        None => {
            return Err(ValidationError::invalid(id, "route is missing destination_cidr_block"));
        }
    };

    let Some(target) = entry.get("gateway_id") else {
        return Err(ValidationError::invalid(id, "route is missing gateway_id"));
    };
    let Some(reference) = target.as_reference() else {
        return Err(ValidationError::wrong_type(id, "routes.gateway_id", "a reference", target.type_name()));
    };
    if reference.target.kind() != "internet_gateway" {
        return Err(ValidationError::WrongReferenceKind {
            id: id.clone(),
            attribute: "routes.gateway_id".to_string(),
            expected: "internet_gateway",
            found: reference.target.clone(),
        });
    }
    if let Some(vpc) = vpc {
        ensure_same_vpc(graph, id, vpc, &[&reference.target])?;
    }

    Ok(destination)
}
