//! Input variables - declared types, defaults and supplied overrides
//!
//! Precedence, highest first:
//! 1. `--var NAME=VALUE` on the command line
//! 2. `INFRAGRAPH_VAR_NAME` environment variable
//! 3. `default` in the declaration

use crate::error::{Result, ValidationError};
use crate::schema::{VariableDecl, VariableType};
use declarative::Value;
use indexmap::IndexMap;

/// Prefix for environment-supplied variable values
pub const ENV_VAR_PREFIX: &str = "INFRAGRAPH_VAR_";

/// Resolved variable values, in declaration order
#[derive(Debug, Clone, Default)]
pub struct Variables {
    values: IndexMap<String, Value>,
}

impl Variables {
    /// Resolve every declared variable
    ///
    /// `overrides` are raw `NAME=VALUE` pairs; `env` looks up environment
    /// values by variable name.
    pub fn resolve<F>(
        decls: &IndexMap<String, VariableDecl>,
        overrides: &[(String, String)],
        env: F,
    ) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        for (name, _) in overrides {
            if !decls.contains_key(name) {
                return Err(ValidationError::UnknownVariable(name.clone()));
            }
        }

        let mut values = IndexMap::new();
        for (name, decl) in decls {
            let supplied = overrides
                .iter()
                .rev()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v.clone())
                .or_else(|| env(name));

            let value = match (supplied, &decl.default) {
                (Some(raw), _) => {
                    log::debug!("Variable {} supplied at load time", name);
                    parse_raw(decl.var_type, &raw).map_err(|message| {
                        ValidationError::InvalidVariable {
                            name: name.clone(),
                            message,
                        }
                    })?
                }
                (None, Some(default)) => {
                    convert_default(decl.var_type, default).map_err(|message| {
                        ValidationError::InvalidVariable {
                            name: name.clone(),
                            message,
                        }
                    })?
                }
                (None, None) => return Err(ValidationError::MissingVariable(name.clone())),
            };
            values.insert(name.clone(), value);
        }

        Ok(Self { values })
    }

    /// Resolve using the process environment
    pub fn from_env(decls: &IndexMap<String, VariableDecl>, overrides: &[(String, String)]) -> Result<Self> {
        Self::resolve(decls, overrides, |name| {
            std::env::var(format!("{ENV_VAR_PREFIX}{name}")).ok()
        })
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }
}

/// Split a `NAME=VALUE` override
pub fn parse_override(s: &str) -> std::result::Result<(String, String), String> {
    match s.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected NAME=VALUE, got '{s}'")),
    }
}

/// Parse a raw string value according to the declared type
fn parse_raw(var_type: VariableType, raw: &str) -> std::result::Result<Value, String> {
    match var_type {
        VariableType::String => Ok(Value::String(raw.to_string())),
        VariableType::Number => {
            let raw = raw.trim();
            if let Ok(i) = raw.parse::<i64>() {
                return Ok(Value::Integer(i));
            }
            match raw.parse::<f64>() {
                Ok(f) if f.is_finite() => Ok(Value::Float(f)),
                _ => Err(format!("'{raw}' is not a finite number")),
            }
        }
        VariableType::Bool => match raw.trim() {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            other => Err(format!("'{other}' is not true or false")),
        },
        VariableType::List => Ok(Value::List(
            raw.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| Value::String(s.to_string()))
                .collect(),
        )),
    }
}

/// Check a declared default against the declared type
fn convert_default(var_type: VariableType, default: &toml::Value) -> std::result::Result<Value, String> {
    let value = match (var_type, default) {
        (VariableType::String, toml::Value::String(s)) => Value::String(s.clone()),
        (VariableType::Number, toml::Value::Integer(i)) => Value::Integer(*i),
        (VariableType::Number, toml::Value::Float(f)) if f.is_finite() => Value::Float(*f),
        (VariableType::Bool, toml::Value::Boolean(b)) => Value::Bool(*b),
        (VariableType::List, toml::Value::Array(items)) => Value::List(
            items
                .iter()
                .map(|item| match item {
                    toml::Value::String(s) => Ok(Value::String(s.clone())),
                    toml::Value::Integer(i) => Ok(Value::Integer(*i)),
                    toml::Value::Boolean(b) => Ok(Value::Bool(*b)),
                    other => Err(format!("unsupported list item {other}")),
                })
                .collect::<std::result::Result<_, _>>()?,
        ),
        (t, other) => return Err(format!("default {other} is not a {t}")),
    };
    Ok(value)
}
