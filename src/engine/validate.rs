//! Whole-graph validation
//!
//! Runs in four passes, stopping at the first error:
//! 1. Structure of every node against its kind (attributes, types, references)
//! 2. Dependency resolution (dangling references, cycles)
//! 3. Kind invariants, in creation order
//! 4. Cross-resource address checks and output references

use super::loader::{Loaded, Output};
use crate::error::{Result, ValidationError};
use crate::resource::{self, block_attribute, vpc_of};
use declarative::{Graph, NodeId, Order};
use std::collections::BTreeMap;

/// Validate a loaded declaration, returning its creation order
pub fn validate(loaded: &Loaded) -> Result<Order> {
    let graph = &loaded.graph;

    for node in graph.nodes() {
        resource::check_structure(node, graph)?;
    }

    let order = declarative::resolve(graph).map_err(|e| explain_disabled(e, &loaded.disabled))?;
    log::debug!("Resolved creation order for {} resources", order.len());

    for id in order.creation() {
        let Some(node) = graph.get(id) else { continue };
        if let Some(kind) = resource::kind(id.kind()) {
            kind.validate(node, graph)?;
        }
    }

    check_subnets_disjoint(graph)?;
    check_outputs(&loaded.outputs, graph)?;

    Ok(order)
}

/// A reference to a disabled resource is reported as such rather than as
/// a plain dangling reference
fn explain_disabled(err: declarative::Error, disabled: &[NodeId]) -> ValidationError {
    match err {
        declarative::Error::DanglingReference { from, missing } if disabled.contains(&missing) => {
            ValidationError::invalid(&from, format!("references {missing}, which is disabled"))
        }
        other => other.into(),
    }
}

/// Subnets of one VPC must not share addresses
fn check_subnets_disjoint(graph: &Graph) -> Result<()> {
    let mut by_vpc: BTreeMap<NodeId, Vec<(&NodeId, netblock::Ipv4Block)>> = BTreeMap::new();
    for subnet in graph.nodes_of_kind("subnet") {
        let (Some(vpc), Some(block)) = (
            vpc_of(graph, &subnet.id),
            block_attribute(graph, subnet, "cidr_block")?,
        ) else {
            continue;
        };
        by_vpc.entry(vpc).or_default().push((&subnet.id, block));
    }

    for subnets in by_vpc.values() {
        for (i, (id, block)) in subnets.iter().enumerate() {
            if let Some((other, _)) = subnets[..i].iter().find(|(_, b)| b.overlaps(block)) {
                return Err(ValidationError::invalid(
                    id,
                    format!("cidr_block {block} overlaps {other}"),
                ));
            }
        }
    }
    Ok(())
}

fn check_outputs(outputs: &[Output], graph: &Graph) -> Result<()> {
    for output in outputs {
        for reference in output.value.references() {
            let Some(target) = graph.get(&reference.target) else {
                return Err(ValidationError::InvalidOutput {
                    name: output.name.clone(),
                    message: format!("{} is not declared", reference.target),
                });
            };
            if let Some(attr) = &reference.attribute {
                let exported = resource::kind(target.resource_type())
                    .is_some_and(|k| k.is_referenceable(attr));
                if !exported && target.attribute(attr).is_none() {
                    return Err(ValidationError::InvalidOutput {
                        name: output.name.clone(),
                        message: format!("{} does not export attribute '{attr}'", reference.target),
                    });
                }
            }
        }
    }
    Ok(())
}
