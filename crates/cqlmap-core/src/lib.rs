//! Core mapping runtime for cqlmap: entity models, CQL identifiers, value
//! conversion, statement construction, the template and repository query
//! derivation, plus the ergonomics exported via the `prelude`.
#![warn(unreachable_pub)]

// public exports are one module level down
pub mod config;
pub mod cql;
pub mod error;
pub mod mapping;
pub mod model;
pub mod query;
pub mod repository;
pub mod session;
pub mod statement;
pub mod template;
pub mod value;

// test
#[cfg(test)]
pub(crate) mod test_fixtures;

///
/// Prelude
///
/// Prelude contains only mapping vocabulary.
/// No sessions, executions or converters are re-exported here.
///

pub mod prelude {
    pub use crate::{
        cql::{ColumnName, CqlIdentifier},
        model::{DataKind, EntityDef, PropertyModel},
        query::{Columns, Criteria, Filter, Query, Sort},
        statement::{Identity, MapId},
        value::{ObjectValue, Value},
    };
}
