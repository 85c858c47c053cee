use crate::error::{ErrorClass, ErrorOrigin, InternalError};
use convert_case::{Case, Casing};
use serde::Deserialize;
use thiserror::Error as ThisError;

///
/// MappingConfig
///
/// Mapping-context settings. Loaded from TOML or built in code; every field
/// has a default so an empty document is valid.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct MappingConfig {
    /// How default column and table names are derived from property names.
    pub naming_strategy: NamingStrategy,

    /// Reject property references that do not resolve against the entity
    /// instead of passing them through as literal column names.
    pub strict_property_resolution: bool,

    /// Quote every derived identifier, preserving property-name case.
    pub force_quote: bool,
}

impl MappingConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        toml::from_str(source).map_err(|err| ConfigError::Parse(err.to_string()))
    }

    #[must_use]
    pub const fn with_naming_strategy(mut self, naming_strategy: NamingStrategy) -> Self {
        self.naming_strategy = naming_strategy;
        self
    }

    #[must_use]
    pub const fn strict(mut self) -> Self {
        self.strict_property_resolution = true;
        self
    }

    #[must_use]
    pub const fn force_quote(mut self) -> Self {
        self.force_quote = true;
        self
    }
}

///
/// NamingStrategy
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum NamingStrategy {
    /// Property name as-is; unquoted identifiers fold it to lower case.
    #[default]
    Lowercase,
    /// `firstName` becomes `first_name`.
    SnakeCase,
}

impl NamingStrategy {
    /// Derive the default column (or table) name for a declared name.
    #[must_use]
    pub fn column_name(self, name: &str) -> String {
        match self {
            Self::Lowercase => name.to_string(),
            Self::SnakeCase => name.to_case(Case::Snake),
        }
    }
}

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("invalid mapping config: {0}")]
    Parse(String),
}

impl From<ConfigError> for InternalError {
    fn from(err: ConfigError) -> Self {
        Self::new(ErrorClass::InvalidArgument, ErrorOrigin::Config, err.to_string())
    }
}
