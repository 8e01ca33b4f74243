//! Declaration errors
//!
//! Everything that can be wrong with a declaration file once it parses as
//! TOML. Each variant names the resource (or variable/output) and the
//! attribute at fault.

use declarative::NodeId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("resources.{path} must be a table")]
    Malformed { path: String },

    #[error("unknown resource kind '{kind}' (declared as {kind}.{name})")]
    UnknownKind { kind: String, name: String },

    #[error("{id}: unknown attribute '{attribute}'")]
    UnknownAttribute { id: NodeId, attribute: String },

    #[error("{id}: missing required attribute '{attribute}'")]
    MissingAttribute { id: NodeId, attribute: String },

    #[error("{id}: attribute '{attribute}' must be {expected}, found {found}")]
    WrongType {
        id: NodeId,
        attribute: String,
        expected: &'static str,
        found: String,
    },

    #[error("{id}: attribute '{attribute}' must reference a {expected}, found {found}")]
    WrongReferenceKind {
        id: NodeId,
        attribute: String,
        expected: &'static str,
        found: NodeId,
    },

    #[error("{id}: invalid reference '{expression}': {reason}")]
    InvalidReference {
        id: NodeId,
        expression: String,
        reason: String,
    },

    #[error("{from}: {target} does not export attribute '{attribute}'")]
    UnexportedAttribute {
        from: NodeId,
        target: NodeId,
        attribute: String,
    },

    #[error("{id}: attribute '{attribute}': {source}")]
    InvalidRange {
        id: NodeId,
        attribute: String,
        #[source]
        source: netblock::Error,
    },

    #[error("{id}: {target} belongs to {found}, expected {expected}")]
    NetworkMismatch {
        id: NodeId,
        target: NodeId,
        expected: NodeId,
        found: NodeId,
    },

    #[error("{id}: {message}")]
    Invalid { id: NodeId, message: String },

    #[error("variable '{0}' is not declared")]
    UnknownVariable(String),

    #[error("variable '{0}' has no default and no value was supplied")]
    MissingVariable(String),

    #[error("variable '{name}': {message}")]
    InvalidVariable { name: String, message: String },

    #[error("output '{name}': {message}")]
    InvalidOutput { name: String, message: String },

    #[error(transparent)]
    Graph(#[from] declarative::Error),
}

impl ValidationError {
    pub fn invalid(id: &NodeId, message: impl Into<String>) -> Self {
        Self::Invalid {
            id: id.clone(),
            message: message.into(),
        }
    }

    pub fn wrong_type(id: &NodeId, attribute: &str, expected: &'static str, found: impl Into<String>) -> Self {
        Self::WrongType {
            id: id.clone(),
            attribute: attribute.to_string(),
            expected,
            found: found.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ValidationError>;
