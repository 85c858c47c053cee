use crate::{cql::ColumnName, error::InternalError, value::Value};
use derive_more::Deref;
use std::fmt;

///
/// Operator
/// Comparison operators supported by the store.
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Operator {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
    Like,
    Contains,
    ContainsKey,
    IsNotNull,
    IsNull,
}

impl Operator {
    /// True for operators that take no operand.
    #[must_use]
    pub const fn is_unary(self) -> bool {
        matches!(self, Self::IsNotNull | Self::IsNull)
    }

    #[must_use]
    pub const fn as_cql(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "!=",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Lt => "<",
            Self::Lte => "<=",
            Self::In => "IN",
            Self::Like => "LIKE",
            Self::Contains => "CONTAINS",
            Self::ContainsKey => "CONTAINS KEY",
            Self::IsNotNull => "IS NOT NULL",
            Self::IsNull => "IS NULL",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_cql())
    }
}

///
/// Predicate
/// Operator plus optional operand.
///

#[derive(Clone, Debug, PartialEq)]
pub struct Predicate {
    pub op: Operator,
    pub value: Option<Value>,
}

impl Predicate {
    #[must_use]
    pub const fn new(op: Operator, value: Option<Value>) -> Self {
        Self { op, value }
    }
}

///
/// Criteria
/// One restriction on one column.
///

#[derive(Clone, Debug, PartialEq)]
pub struct Criteria {
    pub column: ColumnName,
    pub predicate: Predicate,
}

impl Criteria {
    #[must_use]
    pub const fn new(column: ColumnName, predicate: Predicate) -> Self {
        Self { column, predicate }
    }

    /// Start a criteria on a property name or column literal.
    pub fn on(name: impl Into<String>) -> Result<CriteriaBuilder, InternalError> {
        Ok(CriteriaBuilder {
            column: ColumnName::from_literal(name)?,
        })
    }

    #[must_use]
    pub const fn op(&self) -> Operator {
        self.predicate.op
    }

    #[must_use]
    pub const fn value(&self) -> Option<&Value> {
        self.predicate.value.as_ref()
    }
}

///
/// CriteriaBuilder
///

#[derive(Clone, Debug)]
pub struct CriteriaBuilder {
    column: ColumnName,
}

impl CriteriaBuilder {
    fn with(self, op: Operator, value: Option<Value>) -> Criteria {
        Criteria::new(self.column, Predicate::new(op, value))
    }

    #[must_use]
    pub fn is(self, value: impl Into<Value>) -> Criteria {
        self.with(Operator::Eq, Some(value.into()))
    }

    #[must_use]
    pub fn ne(self, value: impl Into<Value>) -> Criteria {
        self.with(Operator::Ne, Some(value.into()))
    }

    #[must_use]
    pub fn gt(self, value: impl Into<Value>) -> Criteria {
        self.with(Operator::Gt, Some(value.into()))
    }

    #[must_use]
    pub fn gte(self, value: impl Into<Value>) -> Criteria {
        self.with(Operator::Gte, Some(value.into()))
    }

    #[must_use]
    pub fn lt(self, value: impl Into<Value>) -> Criteria {
        self.with(Operator::Lt, Some(value.into()))
    }

    #[must_use]
    pub fn lte(self, value: impl Into<Value>) -> Criteria {
        self.with(Operator::Lte, Some(value.into()))
    }

    #[must_use]
    pub fn in_values(self, values: impl IntoIterator<Item = impl Into<Value>>) -> Criteria {
        let values = values.into_iter().map(Into::into).collect::<Vec<_>>();
        self.with(Operator::In, Some(Value::List(values)))
    }

    #[must_use]
    pub fn like(self, pattern: impl Into<String>) -> Criteria {
        self.with(Operator::Like, Some(Value::Text(pattern.into())))
    }

    #[must_use]
    pub fn contains(self, value: impl Into<Value>) -> Criteria {
        self.with(Operator::Contains, Some(value.into()))
    }

    #[must_use]
    pub fn contains_key(self, key: impl Into<Value>) -> Criteria {
        self.with(Operator::ContainsKey, Some(key.into()))
    }

    #[must_use]
    pub fn is_not_null(self) -> Criteria {
        self.with(Operator::IsNotNull, None)
    }

    #[must_use]
    pub fn is_null(self) -> Criteria {
        self.with(Operator::IsNull, None)
    }
}

///
/// Filter
/// Ordered conjunction of criteria.
///

#[derive(Clone, Debug, Default, Deref, PartialEq)]
pub struct Filter(Vec<Criteria>);

impl Filter {
    #[must_use]
    pub const fn empty() -> Self {
        Self(Vec::new())
    }

    #[must_use]
    pub fn and(mut self, criteria: Criteria) -> Self {
        self.0.push(criteria);
        self
    }

    pub fn push(&mut self, criteria: Criteria) {
        self.0.push(criteria);
    }
}

impl FromIterator<Criteria> for Filter {
    fn from_iter<I: IntoIterator<Item = Criteria>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<Vec<Criteria>> for Filter {
    fn from(criteria: Vec<Criteria>) -> Self {
        Self(criteria)
    }
}

impl IntoIterator for Filter {
    type Item = Criteria;
    type IntoIter = std::vec::IntoIter<Criteria>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Filter {
    type Item = &'a Criteria;
    type IntoIter = std::slice::Iter<'a, Criteria>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
