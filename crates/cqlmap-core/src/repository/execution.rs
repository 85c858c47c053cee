use crate::{
    error::InternalError,
    model::EntityModel,
    repository::method::{ProjectionModel, ReturnedType},
    session::ResultSet,
    statement::Statement,
    template::{CqlOperations, EntityStream, read_count},
    value::{ObjectValue, Value},
};
use std::fmt;

///
/// QueryResult
/// Shaped outcome of one query method invocation.
///

pub enum QueryResult<'a> {
    Entity(Option<Value>),
    Entities(Vec<Value>),
    Stream(EntityStream<'a>),
    ResultSet(ResultSet),
    Count(u64),
    Exists(bool),
    Applied(bool),
}

impl QueryResult<'_> {
    #[must_use]
    pub fn into_entities(self) -> Option<Vec<Value>> {
        match self {
            Self::Entities(values) => Some(values),
            _ => None,
        }
    }

    #[must_use]
    pub fn into_entity(self) -> Option<Value> {
        match self {
            Self::Entity(value) => value,
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_count(&self) -> Option<u64> {
        match self {
            Self::Count(count) => Some(*count),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_exists(&self) -> Option<bool> {
        match self {
            Self::Exists(exists) => Some(*exists),
            _ => None,
        }
    }
}

impl fmt::Debug for QueryResult<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Entity(value) => f.debug_tuple("Entity").field(value).finish(),
            Self::Entities(values) => f.debug_tuple("Entities").field(values).finish(),
            Self::Stream(_) => f.write_str("Stream"),
            Self::ResultSet(rows) => f.debug_tuple("ResultSet").field(rows).finish(),
            Self::Count(count) => f.debug_tuple("Count").field(count).finish(),
            Self::Exists(exists) => f.debug_tuple("Exists").field(exists).finish(),
            Self::Applied(applied) => f.debug_tuple("Applied").field(applied).finish(),
        }
    }
}

///
/// QueryExecution
///
/// Runs a built statement and shapes the result for the method's declared
/// return type.
///

pub trait QueryExecution: Send + Sync {
    fn execute<'a>(
        &self,
        statement: &Statement,
        operations: &'a dyn CqlOperations,
        entity: &'a EntityModel,
    ) -> Result<QueryResult<'a>, InternalError>;
}

///
/// CollectionExecution
///

#[derive(Clone, Copy, Debug, Default)]
pub struct CollectionExecution;

impl QueryExecution for CollectionExecution {
    fn execute<'a>(
        &self,
        statement: &Statement,
        operations: &'a dyn CqlOperations,
        entity: &'a EntityModel,
    ) -> Result<QueryResult<'a>, InternalError> {
        Ok(QueryResult::Entities(
            operations.select_statement(statement, entity)?,
        ))
    }
}

///
/// SingleEntityExecution
/// First matching entity, or none.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct SingleEntityExecution;

impl QueryExecution for SingleEntityExecution {
    fn execute<'a>(
        &self,
        statement: &Statement,
        operations: &'a dyn CqlOperations,
        entity: &'a EntityModel,
    ) -> Result<QueryResult<'a>, InternalError> {
        let first = operations
            .stream_statement(statement, entity)?
            .next()
            .transpose()?;

        Ok(QueryResult::Entity(first))
    }
}

///
/// StreamExecution
///

#[derive(Clone, Copy, Debug, Default)]
pub struct StreamExecution;

impl QueryExecution for StreamExecution {
    fn execute<'a>(
        &self,
        statement: &Statement,
        operations: &'a dyn CqlOperations,
        entity: &'a EntityModel,
    ) -> Result<QueryResult<'a>, InternalError> {
        Ok(QueryResult::Stream(
            operations.stream_statement(statement, entity)?,
        ))
    }
}

///
/// ResultSetExecution
/// Raw rows, no entity conversion.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct ResultSetExecution;

impl QueryExecution for ResultSetExecution {
    fn execute<'a>(
        &self,
        statement: &Statement,
        operations: &'a dyn CqlOperations,
        _entity: &'a EntityModel,
    ) -> Result<QueryResult<'a>, InternalError> {
        Ok(QueryResult::ResultSet(operations.execute(statement)?))
    }
}

///
/// CountExecution
///

#[derive(Clone, Copy, Debug, Default)]
pub struct CountExecution;

impl QueryExecution for CountExecution {
    fn execute<'a>(
        &self,
        statement: &Statement,
        operations: &'a dyn CqlOperations,
        _entity: &'a EntityModel,
    ) -> Result<QueryResult<'a>, InternalError> {
        Ok(QueryResult::Count(read_count(operations.execute(statement)?)?))
    }
}

///
/// ExistsExecution
/// True when the statement yields at least one row.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct ExistsExecution;

impl QueryExecution for ExistsExecution {
    fn execute<'a>(
        &self,
        statement: &Statement,
        operations: &'a dyn CqlOperations,
        _entity: &'a EntityModel,
    ) -> Result<QueryResult<'a>, InternalError> {
        Ok(QueryResult::Exists(
            operations.execute(statement)?.one()?.is_some(),
        ))
    }
}

///
/// DeleteExecution
///

#[derive(Clone, Copy, Debug, Default)]
pub struct DeleteExecution;

impl QueryExecution for DeleteExecution {
    fn execute<'a>(
        &self,
        statement: &Statement,
        operations: &'a dyn CqlOperations,
        _entity: &'a EntityModel,
    ) -> Result<QueryResult<'a>, InternalError> {
        Ok(QueryResult::Applied(operations.execute(statement)?.was_applied()))
    }
}

///
/// ResultProcessor
///
/// Projects entity objects into the method's returned type. Scalars and
/// objects already of the target type pass through unchanged.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ResultProcessor {
    returned: ReturnedType,
}

impl ResultProcessor {
    #[must_use]
    pub const fn new(returned: ReturnedType) -> Self {
        Self { returned }
    }

    pub fn process(&self, value: Value) -> Result<Value, InternalError> {
        match &self.returned {
            ReturnedType::Entity | ReturnedType::Scalar(_) => Ok(value),
            ReturnedType::Projection(projection) => Ok(project(value, projection)),
        }
    }
}

fn project(value: Value, projection: &ProjectionModel) -> Value {
    let Value::Object(object) = value else {
        return value;
    };
    if object.type_name() == projection.type_name {
        return Value::Object(object);
    }

    let projected = projection.properties.iter().fold(
        ObjectValue::new(projection.type_name.clone()),
        |dto, property| {
            let value = object.get(property).cloned().unwrap_or(Value::Null);
            dto.with(property.clone(), value)
        },
    );

    Value::Object(projected)
}

///
/// ResultProcessingExecution
/// Decorates another execution and projects what it returns.
///

pub struct ResultProcessingExecution {
    inner: Box<dyn QueryExecution>,
    processor: ResultProcessor,
}

impl ResultProcessingExecution {
    #[must_use]
    pub fn new(inner: Box<dyn QueryExecution>, processor: ResultProcessor) -> Self {
        Self { inner, processor }
    }
}

impl QueryExecution for ResultProcessingExecution {
    fn execute<'a>(
        &self,
        statement: &Statement,
        operations: &'a dyn CqlOperations,
        entity: &'a EntityModel,
    ) -> Result<QueryResult<'a>, InternalError> {
        let result = self.inner.execute(statement, operations, entity)?;

        Ok(match result {
            QueryResult::Entity(value) => {
                QueryResult::Entity(value.map(|v| self.processor.process(v)).transpose()?)
            }
            QueryResult::Entities(values) => QueryResult::Entities(
                values
                    .into_iter()
                    .map(|v| self.processor.process(v))
                    .collect::<Result<_, _>>()?,
            ),
            QueryResult::Stream(stream) => {
                let processor = self.processor.clone();
                QueryResult::Stream(stream.map_values(move |v| processor.process(v)))
            }
            other => other,
        })
    }
}
