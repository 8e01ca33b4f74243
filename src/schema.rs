//! Declaration file schema
//!
//! A declaration file is TOML with three top-level tables:
//!
//! ```toml
//! [variables.instance_type]
//! type = "string"
//! default = "t3.micro"
//!
//! [resources.vpc.main]
//! cidr_block = "10.0.0.0/16"
//!
//! [resources.subnet.public]
//! vpc_id = "${vpc.main.id}"
//! cidr_block = "10.0.1.0/24"
//!
//! [outputs.vpc_id]
//! value = "${vpc.main.id}"
//! ```
//!
//! Resources keep their declaration order, which is what breaks ties in the
//! dependency order.

use crate::error::ValidationError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use indexmap::IndexMap;
use std::fmt;
use std::fs;
use std::path::Path;

/// Top-level declaration file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Declaration {
    /// Input variables, in file order
    #[serde(default)]
    pub variables: IndexMap<String, VariableDecl>,

    /// Resources keyed by kind, then by local name
    #[serde(default)]
    pub resources: toml::Table,

    /// Named values exposed once the graph is applied, in file order
    #[serde(default)]
    pub outputs: IndexMap<String, OutputDecl>,
}

impl Declaration {
    /// Load a declaration file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read declaration file: {}", path.display()))?;
        let decl = Self::parse(&content)
            .with_context(|| format!("Failed to parse declaration file: {}", path.display()))?;
        log::debug!(
            "Loaded {} resources from {}",
            decl.resource_count(),
            path.display()
        );
        Ok(decl)
    }

    /// Parse declaration text
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Resource declarations as (kind, name, attributes), in file order
    pub fn resource_entries(&self) -> std::result::Result<Vec<(&str, &str, &toml::Table)>, ValidationError> {
        let mut entries = Vec::new();
        for (kind, names) in &self.resources {
            let names = names
                .as_table()
                .ok_or_else(|| ValidationError::Malformed { path: kind.clone() })?;
            for (name, attrs) in names {
                let attrs = attrs.as_table().ok_or_else(|| ValidationError::Malformed {
                    path: format!("{kind}.{name}"),
                })?;
                entries.push((kind.as_str(), name.as_str(), attrs));
            }
        }
        Ok(entries)
    }

    /// Total number of declared resources
    pub fn resource_count(&self) -> usize {
        self.resources
            .values()
            .filter_map(toml::Value::as_table)
            .map(toml::Table::len)
            .sum()
    }
}

// ============================================================================
// Variables
// ============================================================================

/// A typed input variable
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VariableDecl {
    #[serde(rename = "type", default)]
    pub var_type: VariableType,

    /// Used when no value is supplied at load time
    #[serde(default)]
    pub default: Option<toml::Value>,

    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableType {
    #[default]
    String,
    Number,
    Bool,
    List,
}

impl fmt::Display for VariableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Bool => "bool",
            Self::List => "list",
        };
        f.write_str(s)
    }
}

// ============================================================================
// Outputs
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputDecl {
    pub value: toml::Value,

    #[serde(default)]
    pub description: String,
}

// ============================================================================
// Tests
// ============================================================================
