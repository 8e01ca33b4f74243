//! Internet gateway resource

use super::{AttrType, AttributeSpec, ResourceKind};

/// Route target giving a VPC public connectivity
pub struct InternetGateway;

const ATTRIBUTES: &[AttributeSpec] = &[
    AttributeSpec::required("vpc_id", AttrType::Ref("vpc")),
    AttributeSpec::optional("tags", AttrType::Map),
];

impl ResourceKind for InternetGateway {
    fn name(&self) -> &'static str {
        "internet_gateway"
    }

    fn description(&self) -> &'static str {
        "Gateway attaching a VPC to the internet"
    }

    fn attributes(&self) -> &'static [AttributeSpec] {
        ATTRIBUTES
    }

    fn exports(&self) -> &'static [&'static str] {
        &["id", "arn"]
    }
}
