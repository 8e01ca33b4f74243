//! IAM role and instance profile resources

use super::{AttrType, AttributeSpec, ResourceKind, literal, string_attribute};
use crate::error::{Result, ValidationError};
use declarative::{Graph, Node, Value};

/// Role assumed by a service principal
pub struct IamRole;

/// Binds a role to instances
pub struct IamInstanceProfile;

const ROLE_ATTRIBUTES: &[AttributeSpec] = &[
    AttributeSpec::optional("name", AttrType::String).replaces(),
    AttributeSpec::required("assume_role_service", AttrType::String),
    AttributeSpec::optional("managed_policy_arns", AttrType::List),
    AttributeSpec::optional("description", AttrType::String),
    AttributeSpec::optional("max_session_duration", AttrType::Integer),
    AttributeSpec::optional("tags", AttrType::Map),
];

/// Accepted session lengths, in seconds
const SESSION_DURATION: std::ops::RangeInclusive<i64> = 3600..=43200;

const PROFILE_ATTRIBUTES: &[AttributeSpec] = &[
    AttributeSpec::optional("name", AttrType::String).replaces(),
    AttributeSpec::required("role", AttrType::Ref("iam_role")),
    AttributeSpec::optional("tags", AttrType::Map),
];

impl ResourceKind for IamRole {
    fn name(&self) -> &'static str {
        "iam_role"
    }

    fn description(&self) -> &'static str {
        "IAM role with a service trust policy"
    }

    fn attributes(&self) -> &'static [AttributeSpec] {
        ROLE_ATTRIBUTES
    }

    fn exports(&self) -> &'static [&'static str] {
        &["id", "arn", "name", "unique_id"]
    }

    fn validate(&self, node: &Node, graph: &Graph) -> Result<()> {
        if string_attribute(graph, node, "assume_role_service").is_some_and(|s| s.trim().is_empty()) {
            return Err(ValidationError::invalid(&node.id, "assume_role_service must not be empty"));
        }

        if let Some(seconds) = node.attribute("max_session_duration").and_then(Value::as_integer)
            && !SESSION_DURATION.contains(&seconds)
        {
            return Err(ValidationError::invalid(
                &node.id,
                format!(
                    "max_session_duration {seconds} is outside {}..={}",
                    SESSION_DURATION.start(),
                    SESSION_DURATION.end()
                ),
            ));
        }

        let arns = node
            .attribute("managed_policy_arns")
            .and_then(Value::as_list)
            .unwrap_or_default();
        for arn in arns {
            match literal(graph, arn) {
                Some(Value::String(s)) if s.starts_with("arn:") => {}
                Some(other) => {
                    return Err(ValidationError::invalid(
                        &node.id,
                        format!("managed_policy_arns entry {other} is not an ARN"),
                    ));
                }
                None => {}
            }
        }
        Ok(())
    }
}

impl ResourceKind for IamInstanceProfile {
    fn name(&self) -> &'static str {
        "iam_instance_profile"
    }

    fn description(&self) -> &'static str {
        "Instance profile wrapping exactly one IAM role"
    }

    fn attributes(&self) -> &'static [AttributeSpec] {
        PROFILE_ATTRIBUTES
    }

    fn exports(&self) -> &'static [&'static str] {
        &["id", "arn", "name"]
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use super::super::check_structure;
    use super::*;

    fn role(attrs: Vec<(&str, Value)>) -> (Node, Graph) {
        let n = node("iam_role.ssm", attrs);
        let graph = graph_with(vec![n.clone()]);
        (n, graph)
    }

    #[test]
    fn test_valid_role() {
        let (n, graph) = role(vec![
            ("assume_role_service", s("ec2.amazonaws.com")),
            (
                "managed_policy_arns",
                Value::List(vec![s("arn:aws:iam::aws:policy/AmazonSSMManagedInstanceCore")]),
            ),
        ]);
        assert!(IamRole.validate(&n, &graph).is_ok());
    }

    #[test]
    fn test_empty_service() {
        let (n, graph) = role(vec![("assume_role_service", s("  "))]);
        assert!(IamRole.validate(&n, &graph).is_err());
    }

    #[test]
    fn test_session_duration_bounds() {
        let with = |seconds: Value| {
            role(vec![
                ("assume_role_service", s("ec2.amazonaws.com")),
                ("max_session_duration", seconds),
            ])
        };

        let (n, graph) = with(Value::Integer(7200));
        assert!(check_structure(&n, &graph).is_ok());
        assert!(IamRole.validate(&n, &graph).is_ok());

        let (n, graph) = with(Value::Integer(60));
        assert!(IamRole.validate(&n, &graph).is_err());

        let (n, graph) = with(s("3600"));
        assert!(matches!(
            check_structure(&n, &graph),
            Err(ValidationError::WrongType { .. })
        ));
    }

    #[test]
    fn test_policy_must_be_arn() {
        let (n, graph) = role(vec![
            ("assume_role_service", s("ec2.amazonaws.com")),
            ("managed_policy_arns", Value::List(vec![s("AmazonSSMManagedInstanceCore")])),
        ]);
        assert!(IamRole.validate(&n, &graph).is_err());
    }

    #[test]
    fn test_profile_needs_a_role_reference() {
        let (_, graph) = role(vec![("assume_role_service", s("ec2.amazonaws.com"))]);

        let profile = node("iam_instance_profile.ssm", vec![("role", r("iam_role.ssm.name"))]);
        assert!(check_structure(&profile, &graph).is_ok());

        let profile = node("iam_instance_profile.ssm", vec![("role", s("ssm-role"))]);
        assert!(check_structure(&profile, &graph).is_err());

        let profile = node("iam_instance_profile.ssm", vec![("role", r("vpc.main.id"))]);
        assert!(matches!(
            check_structure(&profile, &graph),
            Err(ValidationError::WrongReferenceKind { .. })
        ));

        let profile = node("iam_instance_profile.ssm", vec![]);
        assert!(matches!(
            check_structure(&profile, &graph),
            Err(ValidationError::MissingAttribute { .. })
        ));
    }
}
