//! Runtime configuration read from environment variables.

use std::str::FromStr;

use thiserror::Error;

pub mod vars {
    pub const MONGO_URI: &str = "MONGO_URI";
    pub const DB_NAME: &str = "ARBOLITOS_DB";
    pub const TOP_PARENTS: &str = "ARBOLITOS_TOP_PARENTS";
    pub const CHILD_POLICY: &str = "ARBOLITOS_CHILD_POLICY";
    pub const MAX_NAME_LEN: &str = "ARBOLITOS_MAX_NAME_LEN";
}

pub const DEFAULT_MONGO_URI: &str = "mongodb://localhost:27017/arbolitos";
pub const DEFAULT_DB_NAME: &str = "arbolitos";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("valor inválido para {var}: {message}")]
    InvalidValue { var: String, message: String },
}

/// What removing a clone does to the clones taken from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChildPolicy {
    /// Refuse to delete a clone that has clones of its own.
    #[default]
    Reject,
    /// Move the clone's children up to the clone's own parent.
    Reparent,
}

impl FromStr for ChildPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "reject" => Ok(ChildPolicy::Reject),
            "reparent" => Ok(ChildPolicy::Reparent),
            other => Err(format!("se esperaba 'reject' o 'reparent', no '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropagationConfig {
    /// How many source plants the statistics ranking returns.
    pub top_parents: usize,
    pub child_policy: ChildPolicy,
    pub max_name_len: usize,
}

impl Default for PropagationConfig {
    fn default() -> Self {
        Self {
            top_parents: 5,
            child_policy: ChildPolicy::Reject,
            max_name_len: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub mongo_uri: String,
    pub db_name: String,
    pub propagation: PropagationConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Builds the configuration from any variable source; unset variables fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = PropagationConfig::default();
        let propagation = PropagationConfig {
            top_parents: parse_or(&lookup, vars::TOP_PARENTS, defaults.top_parents)?,
            child_policy: parse_or(&lookup, vars::CHILD_POLICY, defaults.child_policy)?,
            max_name_len: parse_or(&lookup, vars::MAX_NAME_LEN, defaults.max_name_len)?,
        };
        if propagation.max_name_len == 0 {
            return Err(ConfigError::InvalidValue {
                var: vars::MAX_NAME_LEN.to_string(),
                message: "debe ser mayor que cero".to_string(),
            });
        }

        Ok(Self {
            mongo_uri: lookup(vars::MONGO_URI).unwrap_or_else(|| DEFAULT_MONGO_URI.to_string()),
            db_name: lookup(vars::DB_NAME).unwrap_or_else(|| DEFAULT_DB_NAME.to_string()),
            propagation,
        })
    }
}

fn parse_or<F, T>(lookup: &F, var: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: ToString,
{
    match lookup(var) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            var: var.to_string(),
            message: e.to_string(),
        }),
    }
}
