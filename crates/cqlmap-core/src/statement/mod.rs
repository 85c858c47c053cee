//! Executable statements and the factory that builds them from queries and
//! entity objects.

mod clause;
mod factory;
mod identity;
mod options;


pub use clause::Clause;
pub use factory::StatementFactory;
pub use identity::{Identity, MapId};
pub use options::{Consistency, MAX_TTL, WriteOptions};

use crate::{
    cql::{ColumnName, CqlIdentifier},
    query::{Order, Selector},
    value::Value,
};
use std::fmt::{self, Write as _};

///
/// Statement
/// A statement ready for the session.
///

#[derive(Clone, Debug, PartialEq)]
pub enum Statement {
    Select(Select),
    Insert(Insert),
    Update(UpdateStatement),
    Delete(Delete),
    Truncate(Truncate),
    Simple(SimpleStatement),
    Batch(Batch),
}

impl Statement {
    /// Render the statement as CQL text.
    #[must_use]
    pub fn to_cql(&self) -> String {
        self.to_string()
    }

    /// Values bound to `?` markers; only simple statements carry any.
    #[must_use]
    pub fn bound_values(&self) -> &[Value] {
        match self {
            Self::Simple(simple) => &simple.values,
            _ => &[],
        }
    }

    /// Consistency requested by the statement's write options.
    #[must_use]
    pub const fn consistency(&self) -> Option<Consistency> {
        match self {
            Self::Insert(insert) => insert.options.consistency,
            Self::Update(update) => update.options.consistency,
            Self::Batch(batch) => batch.consistency,
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_select(&self) -> Option<&Select> {
        match self {
            Self::Select(select) => Some(select),
            _ => None,
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Select(s) => write!(f, "{s}"),
            Self::Insert(s) => write!(f, "{s}"),
            Self::Update(s) => write!(f, "{s}"),
            Self::Delete(s) => write!(f, "{s}"),
            Self::Truncate(s) => write!(f, "{s}"),
            Self::Simple(s) => write!(f, "{s}"),
            Self::Batch(s) => write!(f, "{s}"),
        }
    }
}

///
/// Selection
///

#[derive(Clone, Debug, PartialEq)]
pub enum Selection {
    All,
    Count,
    Columns(Vec<Selector>),
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("*"),
            Self::Count => f.write_str("count(*)"),
            Self::Columns(selectors) => f.write_str(&join(selectors)),
        }
    }
}

///
/// Select
///

#[derive(Clone, Debug, PartialEq)]
pub struct Select {
    pub table: CqlIdentifier,
    pub selection: Selection,
    pub clauses: Vec<Clause>,
    pub order_by: Vec<Order>,
    pub limit: Option<u32>,
    pub allow_filtering: bool,
}

impl Select {
    #[must_use]
    pub const fn new(table: CqlIdentifier, selection: Selection) -> Self {
        Self {
            table,
            selection,
            clauses: Vec::new(),
            order_by: Vec::new(),
            limit: None,
            allow_filtering: false,
        }
    }
}

impl fmt::Display for Select {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut cql = format!("SELECT {} FROM {}", self.selection, self.table);
        push_where(&mut cql, &self.clauses);

        if !self.order_by.is_empty() {
            let orders = self
                .order_by
                .iter()
                .map(|order| format!("{} {}", order.property, order.direction))
                .collect::<Vec<_>>()
                .join(",");
            let _ = write!(cql, " ORDER BY {orders}");
        }
        if let Some(limit) = self.limit {
            let _ = write!(cql, " LIMIT {limit}");
        }
        if self.allow_filtering {
            cql.push_str(" ALLOW FILTERING");
        }

        write!(f, "{cql};")
    }
}

///
/// Insert
///

#[derive(Clone, Debug, PartialEq)]
pub struct Insert {
    pub table: CqlIdentifier,
    pub values: Vec<(CqlIdentifier, Value)>,
    pub options: WriteOptions,
}

impl fmt::Display for Insert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let columns = join(self.values.iter().map(|(column, _)| column));
        let values = join(self.values.iter().map(|(_, value)| value));

        let mut cql = format!("INSERT INTO {} ({columns}) VALUES ({values})", self.table);
        if self.options.if_not_exists {
            cql.push_str(" IF NOT EXISTS");
        }
        self.options.write_using(&mut cql);

        write!(f, "{cql};")
    }
}

///
/// UpdateStatement
///

#[derive(Clone, Debug, PartialEq)]
pub struct UpdateStatement {
    pub table: CqlIdentifier,
    pub assignments: Vec<(ColumnName, Value)>,
    pub clauses: Vec<Clause>,
    pub options: WriteOptions,
}

impl fmt::Display for UpdateStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let assignments = self
            .assignments
            .iter()
            .map(|(column, value)| format!("{column}={value}"))
            .collect::<Vec<_>>()
            .join(",");

        let mut cql = format!("UPDATE {}", self.table);
        self.options.write_using(&mut cql);
        let _ = write!(cql, " SET {assignments}");
        push_where(&mut cql, &self.clauses);

        write!(f, "{cql};")
    }
}

///
/// Delete
/// Whole-row delete when `columns` is empty.
///

#[derive(Clone, Debug, PartialEq)]
pub struct Delete {
    pub table: CqlIdentifier,
    pub columns: Vec<ColumnName>,
    pub clauses: Vec<Clause>,
}

impl fmt::Display for Delete {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut cql = String::from("DELETE");
        if !self.columns.is_empty() {
            let _ = write!(cql, " {}", join(&self.columns));
        }
        let _ = write!(cql, " FROM {}", self.table);
        push_where(&mut cql, &self.clauses);

        write!(f, "{cql};")
    }
}

///
/// Truncate
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Truncate {
    pub table: CqlIdentifier,
}

impl fmt::Display for Truncate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TRUNCATE {};", self.table)
    }
}

///
/// SimpleStatement
/// CQL text with `?` markers and the values bound to them, in order.
///

#[derive(Clone, Debug, PartialEq)]
pub struct SimpleStatement {
    pub cql: String,
    pub values: Vec<Value>,
}

impl fmt::Display for SimpleStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.cql)
    }
}

///
/// BatchKind
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum BatchKind {
    #[default]
    Logged,
    Unlogged,
}

///
/// Batch
/// Writes applied together; only inserts, updates and deletes are members.
///

#[derive(Clone, Debug, PartialEq)]
pub struct Batch {
    pub kind: BatchKind,
    pub statements: Vec<Statement>,
    /// Batch-wide write timestamp in microseconds.
    pub timestamp: Option<i64>,
    pub consistency: Option<Consistency>,
}

impl fmt::Display for Batch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self.kind {
            BatchKind::Logged => "BEGIN BATCH",
            BatchKind::Unlogged => "BEGIN UNLOGGED BATCH",
        })?;
        if let Some(timestamp) = self.timestamp {
            write!(f, " USING TIMESTAMP {timestamp}")?;
        }
        for statement in &self.statements {
            write!(f, " {statement}")?;
        }

        f.write_str(" APPLY BATCH;")
    }
}

fn push_where(cql: &mut String, clauses: &[Clause]) {
    if clauses.is_empty() {
        return;
    }

    let relations = clauses
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" AND ");
    let _ = write!(cql, " WHERE {relations}");
}

fn join<T: fmt::Display>(items: impl IntoIterator<Item = T>) -> String {
    items
        .into_iter()
        .map(|item| item.to_string())
        .collect::<Vec<_>>()
        .join(",")
}
