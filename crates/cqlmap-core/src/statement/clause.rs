use crate::{
    cql::ColumnName,
    error::{ErrorOrigin, InternalError},
    query::{Criteria, Operator},
    value::Value,
};
use std::fmt;

///
/// Clause
/// One rendered WHERE relation over a mapped column.
///

#[derive(Clone, Debug, PartialEq)]
pub struct Clause {
    pub column: ColumnName,
    pub op: Operator,
    pub value: Option<Value>,
}

impl Clause {
    #[must_use]
    pub fn eq(column: ColumnName, value: Value) -> Self {
        Self {
            column,
            op: Operator::Eq,
            value: Some(value),
        }
    }

    /// Turn mapped criteria into a renderable relation.
    pub(crate) fn from_criteria(criteria: Criteria) -> Result<Self, InternalError> {
        let Criteria { column, predicate } = criteria;

        if predicate.op == Operator::IsNull {
            return Err(InternalError::unsupported(
                ErrorOrigin::Statement,
                format!("'{column} IS NULL' is not supported by the store"),
            ));
        }

        let value = match (predicate.op.is_unary(), predicate.value) {
            (true, _) => None,
            (false, Some(Value::Null)) => {
                return Err(InternalError::invalid_argument(
                    ErrorOrigin::Statement,
                    format!("operator {} on '{column}' requires a non-null value", predicate.op),
                ));
            }
            (false, Some(value)) => Some(value),
            (false, None) => {
                return Err(InternalError::invalid_argument(
                    ErrorOrigin::Statement,
                    format!("operator {} on '{column}' requires a value", predicate.op),
                ));
            }
        };

        Ok(Self {
            column,
            op: predicate.op,
            value,
        })
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let column = &self.column;

        match (self.op, &self.value) {
            (Operator::IsNotNull | Operator::IsNull, _) => write!(f, "{column} {}", self.op),
            (Operator::In, Some(value)) => {
                let elements = value
                    .elements()
                    .map_or_else(|| value.to_string(), render_elements);
                write!(f, "{column} IN ({elements})")
            }
            (Operator::Like | Operator::Contains | Operator::ContainsKey, Some(value)) => {
                write!(f, "{column} {} {value}", self.op)
            }
            (op, Some(value)) => write!(f, "{column}{op}{value}"),
            (op, None) => write!(f, "{column}{op}?"),
        }
    }
}

fn render_elements(values: &[Value]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}
