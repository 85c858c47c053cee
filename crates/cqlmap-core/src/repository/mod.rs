//! Repository query methods: name derivation, annotated CQL, argument
//! binding and result shaping.

pub mod creator;
pub mod execution;
pub mod method;
pub mod parameters;
pub mod part_tree;
pub mod query;
pub mod string_query;

#[cfg(test)]
mod tests;

pub use creator::QueryCreator;
pub use execution::{QueryExecution, QueryResult, ResultProcessor};
pub use method::{ProjectionModel, QueryMethod, ReturnShape, ReturnedType};
pub use parameters::{Argument, Parameter, ParameterAccessor, ParameterKind, Parameters};
pub use part_tree::{OrPart, Part, PartTree, PartType, Subject, SubjectKind};
pub use query::{PartTreeQuery, RepositoryQuery};
pub use string_query::{Binding, StringBasedQuery};
