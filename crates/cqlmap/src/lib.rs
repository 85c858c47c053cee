//! ## Crate layout
//! - `core`: mapping runtime (entity models, identifiers, conversion,
//!   statements, template and repository query derivation).
//! - `error`: public error type with a stable kind + origin taxonomy.
//!
//! The `prelude` module mirrors the surface used by repository code.

pub use cqlmap_core as core;

pub mod error;

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use error::Error;

///
/// Prelude
/// Mapping vocabulary plus the template and repository entry points.
///

pub mod prelude {
    pub use crate::{
        Error,
        core::{
            config::{MappingConfig, NamingStrategy},
            model::MappingContext,
            prelude::*,
            repository::{Argument, Parameters, QueryMethod, QueryResult, RepositoryQuery, ReturnShape},
            session::{CqlSession, ResultSet, Row},
            statement::{Consistency, WriteOptions},
            template::{BatchOperations, CqlOperations as _, CqlTemplate},
        },
    };
}
