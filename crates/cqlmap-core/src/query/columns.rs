use crate::{
    cql::{ColumnName, CqlIdentifier},
    error::InternalError,
    value::Value,
};
use std::fmt;

///
/// Selector
/// One projected expression of a SELECT.
///

#[derive(Clone, Debug, PartialEq)]
pub enum Selector {
    Column {
        name: ColumnName,
        alias: Option<CqlIdentifier>,
    },
    Function {
        expression: String,
        parameters: Vec<SelectorParam>,
        alias: Option<CqlIdentifier>,
    },
}

impl Selector {
    /// Plain column selector.
    pub fn column(name: impl Into<String>) -> Result<Self, InternalError> {
        Ok(Self::Column {
            name: ColumnName::from_literal(name)?,
            alias: None,
        })
    }

    #[must_use]
    pub const fn of(name: ColumnName) -> Self {
        Self::Column { name, alias: None }
    }

    /// Function call selector such as `ttl(name)` or `writetime(name)`.
    #[must_use]
    pub fn function(expression: impl Into<String>, parameters: Vec<SelectorParam>) -> Self {
        Self::Function {
            expression: expression.into(),
            parameters,
            alias: None,
        }
    }

    #[must_use]
    pub fn alias(self, alias: CqlIdentifier) -> Self {
        match self {
            Self::Column { name, .. } => Self::Column {
                name,
                alias: Some(alias),
            },
            Self::Function {
                expression,
                parameters,
                ..
            } => Self::Function {
                expression,
                parameters,
                alias: Some(alias),
            },
        }
    }

    /// Column reference of a plain column selector.
    #[must_use]
    pub const fn column_name(&self) -> Option<&ColumnName> {
        match self {
            Self::Column { name, .. } => Some(name),
            Self::Function { .. } => None,
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let alias = match self {
            Self::Column { name, alias } => {
                write!(f, "{name}")?;
                alias
            }
            Self::Function {
                expression,
                parameters,
                alias,
            } => {
                let params = parameters
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(",");
                write!(f, "{expression}({params})")?;
                alias
            }
        };

        match alias {
            Some(alias) => write!(f, " AS {alias}"),
            None => Ok(()),
        }
    }
}

///
/// SelectorParam
/// Function argument: a nested selector or a literal value.
///

#[derive(Clone, Debug, PartialEq)]
pub enum SelectorParam {
    Selector(Selector),
    Literal(Value),
}

impl fmt::Display for SelectorParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Selector(selector) => write!(f, "{selector}"),
            Self::Literal(value) => write!(f, "{value}"),
        }
    }
}

///
/// Columns
///
/// Ordered column selection. Empty means "every mapped column".
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Columns {
    selectors: Vec<Selector>,
}

impl Columns {
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            selectors: Vec::new(),
        }
    }

    /// Select plain columns by property name or column literal.
    pub fn from_names<I, S>(names: I) -> Result<Self, InternalError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        names
            .into_iter()
            .try_fold(Self::empty(), |columns, name| columns.include(name))
    }

    pub fn include(self, name: impl Into<String>) -> Result<Self, InternalError> {
        Ok(self.select(Selector::column(name)?))
    }

    /// Add a selector; a plain column already selected is replaced.
    #[must_use]
    pub fn select(mut self, selector: Selector) -> Self {
        let existing = selector.column_name().and_then(|name| {
            self.selectors
                .iter()
                .position(|s| s.column_name() == Some(name))
        });

        match existing {
            Some(index) => self.selectors[index] = selector,
            None => self.selectors.push(selector),
        }

        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Selector> {
        self.selectors.iter()
    }
}

impl<'a> IntoIterator for &'a Columns {
    type Item = &'a Selector;
    type IntoIter = std::slice::Iter<'a, Selector>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
