//! Boundary to the driver: statements go out, rows come back.

use crate::{error::InternalError, statement::Statement, value::Value};
use std::fmt;

///
/// Row
/// One result row: column name to store-encoded value, in select order.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Row {
    columns: Vec<(String, Value)>,
}

impl Row {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            columns: Vec::new(),
        }
    }

    #[must_use]
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.columns.push((column.into(), value.into()));
        self
    }

    /// Value of a column by its unquoted store name.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// First column value; aggregate results carry exactly one.
    #[must_use]
    pub fn first_value(&self) -> Option<&Value> {
        self.columns.first().map(|(_, value)| value)
    }

    #[must_use]
    pub fn columns(&self) -> &[(String, Value)] {
        &self.columns
    }
}

impl FromIterator<(String, Value)> for Row {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            columns: iter.into_iter().collect(),
        }
    }
}

///
/// ResultSet
///
/// Single-pass cursor over the rows of one executed statement.
/// Rows are pulled lazily; dropping the result set abandons the cursor.
///

pub struct ResultSet {
    rows: Box<dyn Iterator<Item = Result<Row, InternalError>> + Send>,
    was_applied: bool,
}

impl ResultSet {
    /// Cursor over a driver-provided row source.
    #[must_use]
    pub fn new(
        rows: impl Iterator<Item = Result<Row, InternalError>> + Send + 'static,
        was_applied: bool,
    ) -> Self {
        Self {
            rows: Box::new(rows),
            was_applied,
        }
    }

    #[must_use]
    pub fn from_rows(rows: Vec<Row>) -> Self {
        Self::new(rows.into_iter().map(Ok), true)
    }

    #[must_use]
    pub fn empty() -> Self {
        Self::from_rows(Vec::new())
    }

    /// Row-less result of a write, reporting whether it was applied.
    #[must_use]
    pub fn applied(was_applied: bool) -> Self {
        Self::new(std::iter::empty(), was_applied)
    }

    #[must_use]
    pub const fn was_applied(&self) -> bool {
        self.was_applied
    }

    /// Next row, if any.
    pub fn one(&mut self) -> Result<Option<Row>, InternalError> {
        self.rows.next().transpose()
    }

    /// Drain the remaining rows.
    pub fn all(self) -> Result<Vec<Row>, InternalError> {
        self.rows.collect()
    }
}

impl Iterator for ResultSet {
    type Item = Result<Row, InternalError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.rows.next()
    }
}

impl fmt::Debug for ResultSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultSet")
            .field("was_applied", &self.was_applied)
            .finish_non_exhaustive()
    }
}

///
/// CqlSession
///
/// Executes statements against the store. Implemented by driver adapters
/// and by in-memory sessions in tests.
///

pub trait CqlSession: Send + Sync {
    fn execute(&self, statement: &Statement) -> Result<ResultSet, InternalError>;
}

impl<S: CqlSession + ?Sized> CqlSession for std::sync::Arc<S> {
    fn execute(&self, statement: &Statement) -> Result<ResultSet, InternalError> {
        (**self).execute(statement)
    }
}
