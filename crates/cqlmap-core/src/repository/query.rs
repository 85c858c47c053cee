use crate::{
    error::{ErrorOrigin, InternalError},
    model::{EntityModel, MappingContext},
    repository::{
        creator::QueryCreator,
        execution::{
            CollectionExecution, CountExecution, DeleteExecution, ExistsExecution, QueryExecution,
            QueryResult, ResultProcessingExecution, ResultProcessor, ResultSetExecution,
            SingleEntityExecution, StreamExecution,
        },
        method::{QueryMethod, ReturnShape, ReturnedType},
        parameters::{Argument, ParameterAccessor},
        part_tree::{PartTree, SubjectKind},
        string_query::StringBasedQuery,
    },
    statement::Statement,
    template::CqlOperations,
};
use std::sync::Arc;
use tracing::debug;

///
/// PartTreeQuery
///
/// Query method derived from its name. The tree is parsed once at
/// registration and shared read-only across invocations.
///

#[derive(Clone, Debug)]
pub struct PartTreeQuery {
    method: Arc<QueryMethod>,
    tree: Arc<PartTree>,
}

impl PartTreeQuery {
    /// Parse and validate the method name against its entity.
    pub fn new(method: QueryMethod, ctx: &MappingContext) -> Result<Self, InternalError> {
        let entity = ctx
            .required_persistent_entity(method.entity())
            .map_err(|err| InternalError::query_creation(method.name(), err))?;
        let tree = PartTree::parse(method.name(), entity, ctx)?;

        if tree.is_all_ignore_case() || tree.parts().any(|part| part.ignore_case) {
            return Err(InternalError::derivation(
                method.name(),
                "IgnoreCase is not supported by the store",
            ));
        }

        Ok(Self {
            method: Arc::new(method),
            tree: Arc::new(tree),
        })
    }

    #[must_use]
    pub fn tree(&self) -> &PartTree {
        &self.tree
    }

    #[must_use]
    pub fn method(&self) -> &QueryMethod {
        &self.method
    }

    /// Build the statement for one invocation.
    pub fn create_query(
        &self,
        accessor: &ParameterAccessor<'_>,
        operations: &dyn CqlOperations,
        entity: &EntityModel,
    ) -> Result<Statement, InternalError> {
        self.build(accessor, operations, entity)
            .map_err(|err| InternalError::query_creation(self.method.name(), err))
    }

    fn build(
        &self,
        accessor: &ParameterAccessor<'_>,
        operations: &dyn CqlOperations,
        entity: &EntityModel,
    ) -> Result<Statement, InternalError> {
        let mut query =
            QueryCreator::new(&self.tree, *accessor, operations.converter()).create_query()?;
        if self.method.is_allow_filtering() {
            query = query.with_allow_filtering();
        }

        let factory = operations.statement_factory();
        match self.tree.subject().kind {
            SubjectKind::Select => factory.select(&query, entity),
            SubjectKind::Count => factory.count(&query, entity),
            SubjectKind::Exists => factory.select(&query.limit(1), entity),
            SubjectKind::Delete => factory.delete(&query, entity),
        }
    }

    fn execution(&self) -> Box<dyn QueryExecution> {
        match self.tree.subject().kind {
            SubjectKind::Count => Box::new(CountExecution),
            SubjectKind::Exists => Box::new(ExistsExecution),
            SubjectKind::Delete => Box::new(DeleteExecution),
            SubjectKind::Select => shaped_execution(&self.method),
        }
    }
}

///
/// RepositoryQuery
/// A query method, either derived from its name or annotated with CQL.
///

#[derive(Clone, Debug)]
pub enum RepositoryQuery {
    Derived(PartTreeQuery),
    Annotated {
        method: Arc<QueryMethod>,
        query: Arc<StringBasedQuery>,
    },
}

impl RepositoryQuery {
    /// Register a query method; derived methods are validated here.
    pub fn new(method: QueryMethod, ctx: &MappingContext) -> Result<Self, InternalError> {
        match method.annotated_query() {
            Some(cql) => {
                let query = StringBasedQuery::new(cql)
                    .map_err(|err| InternalError::query_creation(method.name(), err))?;

                Ok(Self::Annotated {
                    method: Arc::new(method),
                    query: Arc::new(query),
                })
            }
            None => Ok(Self::Derived(PartTreeQuery::new(method, ctx)?)),
        }
    }

    #[must_use]
    pub fn method(&self) -> &QueryMethod {
        match self {
            Self::Derived(query) => query.method(),
            Self::Annotated { method, .. } => method,
        }
    }

    /// Part tree of a derived query.
    #[must_use]
    pub fn tree(&self) -> Option<&PartTree> {
        match self {
            Self::Derived(query) => Some(query.tree()),
            Self::Annotated { .. } => None,
        }
    }

    pub fn create_query(
        &self,
        accessor: &ParameterAccessor<'_>,
        operations: &dyn CqlOperations,
    ) -> Result<Statement, InternalError> {
        let method = self.method();
        let entity = operations
            .mapping_context()
            .required_persistent_entity(method.entity())
            .map_err(|err| InternalError::query_creation(method.name(), err))?;

        match self {
            Self::Derived(query) => query.create_query(accessor, operations, entity),
            Self::Annotated { query, .. } => query
                .bind(method, accessor, operations.converter())
                .map_err(|err| InternalError::query_creation(method.name(), err)),
        }
    }

    /// Bind arguments, build the statement and run the matching execution.
    pub fn execute<'a>(
        &self,
        arguments: &[Argument],
        operations: &'a dyn CqlOperations,
    ) -> Result<QueryResult<'a>, InternalError> {
        let method = self.method();
        let parameters = method.declared_parameters();

        if arguments.len() != parameters.len() {
            return Err(InternalError::query_creation(
                method.name(),
                InternalError::invalid_argument(
                    ErrorOrigin::Execution,
                    format!(
                        "expected {} arguments, got {}",
                        parameters.len(),
                        arguments.len()
                    ),
                ),
            ));
        }

        let accessor = ParameterAccessor::new(parameters, arguments);
        let statement = self.create_query(&accessor, operations)?;
        let entity = operations
            .mapping_context()
            .required_persistent_entity(method.entity())?;

        debug!(method = method.name(), cql = %statement, "executing query method");

        let execution = match self {
            Self::Derived(query) => query.execution(),
            Self::Annotated { method, .. } => shaped_execution(method),
        };

        execution.execute(&statement, operations, entity)
    }
}

// Execution for the declared return shape, projecting when required.
fn shaped_execution(method: &QueryMethod) -> Box<dyn QueryExecution> {
    let base: Box<dyn QueryExecution> = match method.shape() {
        ReturnShape::Single => Box::new(SingleEntityExecution),
        ReturnShape::Collection => Box::new(CollectionExecution),
        ReturnShape::Stream => Box::new(StreamExecution),
        ReturnShape::ResultSet => return Box::new(ResultSetExecution),
        ReturnShape::Count => return Box::new(CountExecution),
        ReturnShape::Exists => return Box::new(ExistsExecution),
    };

    match method.returned_type() {
        ReturnedType::Entity => base,
        returned => Box::new(ResultProcessingExecution::new(
            base,
            ResultProcessor::new(returned.clone()),
        )),
    }
}
