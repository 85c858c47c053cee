use crate::{
    cql::CqlIdentifier,
    error::{ErrorOrigin, InternalError},
};
use std::{
    fmt,
    hash::{Hash, Hasher},
};

///
/// ColumnName
///
/// Reference to a column as written by a caller.
///
/// A literal preserves case and is suitable to reference properties by their
/// declared name. An identifier follows CQL identifier rules (quoting and
/// case-sensitivity). Equality and hashing derive solely from `to_cql()`.
///

#[derive(Clone, Debug)]
pub enum ColumnName {
    Literal(String),
    Identifier(CqlIdentifier),
}

impl ColumnName {
    /// Case-preserving column reference.
    pub fn from_literal(name: impl Into<String>) -> Result<Self, InternalError> {
        let name = name.into();

        if name.trim().is_empty() {
            return Err(InternalError::invalid_argument(
                ErrorOrigin::Identifier,
                "column name must not be empty",
            ));
        }

        Ok(Self::Literal(name))
    }

    /// Quoting-aware column reference.
    #[must_use]
    pub const fn from_identifier(identifier: CqlIdentifier) -> Self {
        Self::Identifier(identifier)
    }

    /// The literal name, when constructed from a string.
    #[must_use]
    pub fn column_name(&self) -> Option<&str> {
        match self {
            Self::Literal(name) => Some(name),
            Self::Identifier(_) => None,
        }
    }

    /// The identifier, when constructed from one.
    #[must_use]
    pub const fn cql_identifier(&self) -> Option<&CqlIdentifier> {
        match self {
            Self::Literal(_) => None,
            Self::Identifier(identifier) => Some(identifier),
        }
    }

    /// Render the column reference as it must appear in a statement.
    #[must_use]
    pub fn to_cql(&self) -> String {
        match self {
            Self::Literal(name) => name.clone(),
            Self::Identifier(identifier) => identifier.to_cql(),
        }
    }
}

impl PartialEq for ColumnName {
    fn eq(&self, other: &Self) -> bool {
        self.to_cql() == other.to_cql()
    }
}

impl Eq for ColumnName {}

impl Hash for ColumnName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.to_cql().hash(state);
    }
}

impl fmt::Display for ColumnName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_cql())
    }
}

impl From<CqlIdentifier> for ColumnName {
    fn from(identifier: CqlIdentifier) -> Self {
        Self::Identifier(identifier)
    }
}
