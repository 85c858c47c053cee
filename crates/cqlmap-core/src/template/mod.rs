//! Entity-level operations wired around a session.

mod batch;


pub use batch::BatchOperations;

use crate::{
    error::{ErrorClass, ErrorOrigin, InternalError},
    mapping::{Converter, CustomConversions, MappingConverter, QueryMapper},
    model::{EntityModel, MappingContext},
    query::Query,
    session::{CqlSession, ResultSet},
    statement::{Identity, Statement, StatementFactory, WriteOptions},
    value::Value,
};
use std::{fmt, sync::Arc};
use tracing::debug;

///
/// EntityStream
///
/// Lazy, single-pass stream of entity objects read from a row cursor.
/// Dropping the stream abandons the cursor.
///

pub struct EntityStream<'a> {
    inner: Box<dyn Iterator<Item = Result<Value, InternalError>> + 'a>,
}

impl<'a> EntityStream<'a> {
    #[must_use]
    pub fn new(rows: ResultSet, converter: &'a dyn Converter, entity: &'a EntityModel) -> Self {
        Self {
            inner: Box::new(rows.map(move |row| converter.read(entity, &row?))),
        }
    }

    /// Apply a fallible mapping to every element, lazily.
    #[must_use]
    pub fn map_values<F>(self, f: F) -> Self
    where
        F: Fn(Value) -> Result<Value, InternalError> + 'a,
    {
        Self {
            inner: Box::new(self.inner.map(move |value| value.and_then(&f))),
        }
    }
}

impl Iterator for EntityStream<'_> {
    type Item = Result<Value, InternalError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

impl fmt::Debug for EntityStream<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityStream").finish_non_exhaustive()
    }
}

///
/// CqlOperations
///
/// Statement-level operations the repository executions run against.
///

pub trait CqlOperations {
    fn converter(&self) -> &dyn Converter;

    fn statement_factory(&self) -> &StatementFactory;

    fn execute(&self, statement: &Statement) -> Result<ResultSet, InternalError>;

    /// Execute a SELECT and read every row as an entity.
    fn select_statement(
        &self,
        statement: &Statement,
        entity: &EntityModel,
    ) -> Result<Vec<Value>, InternalError> {
        self.stream_statement(statement, entity)?.collect()
    }

    fn stream_statement<'a>(
        &'a self,
        statement: &Statement,
        entity: &'a EntityModel,
    ) -> Result<EntityStream<'a>, InternalError> {
        let rows = self.execute(statement)?;

        Ok(EntityStream::new(rows, self.converter(), entity))
    }

    fn mapping_context(&self) -> &MappingContext {
        self.converter().mapping_context()
    }
}

///
/// CqlTemplate
///
/// Default operations implementation: converter, mapping context and
/// statement factory around one session.
///

pub struct CqlTemplate<S> {
    session: S,
    converter: Arc<MappingConverter>,
    factory: StatementFactory,
}

impl<S: CqlSession> CqlTemplate<S> {
    #[must_use]
    pub fn new(session: S, context: Arc<MappingContext>) -> Self {
        Self::with_conversions(session, context, CustomConversions::new())
    }

    /// Template whose converter applies `conversions` before the defaults.
    #[must_use]
    pub fn with_conversions(
        session: S,
        context: Arc<MappingContext>,
        conversions: CustomConversions,
    ) -> Self {
        let converter = Arc::new(MappingConverter::new(context).with_conversions(conversions));
        let factory = StatementFactory::new(QueryMapper::new(
            Arc::clone(&converter) as Arc<dyn Converter>
        ));

        Self {
            session,
            converter,
            factory,
        }
    }

    #[must_use]
    pub const fn session(&self) -> &S {
        &self.session
    }

    pub(crate) fn entity(&self, type_name: &str) -> Result<&EntityModel, InternalError> {
        self.converter.mapping_context().required_persistent_entity(type_name)
    }

    pub(crate) fn entity_of<'a>(&'a self, object: &Value) -> Result<&'a EntityModel, InternalError> {
        match object {
            Value::Object(object) => self.entity(object.type_name()),
            other => Err(InternalError::invalid_argument(
                ErrorOrigin::Execution,
                format!("expected an entity object, found {}", other.to_cql_literal()),
            )),
        }
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    pub fn select(&self, query: &Query, type_name: &str) -> Result<Vec<Value>, InternalError> {
        let entity = self.entity(type_name)?;
        let statement = self.factory.select(query, entity)?;

        self.select_statement(&statement, entity)
    }

    /// First matching entity, if any.
    pub fn select_one(&self, query: &Query, type_name: &str) -> Result<Option<Value>, InternalError> {
        let entity = self.entity(type_name)?;
        let statement = self.factory.select(query, entity)?;

        self.stream_statement(&statement, entity)?.next().transpose()
    }

    pub fn stream(&self, query: &Query, type_name: &str) -> Result<EntityStream<'_>, InternalError> {
        let entity = self.entity(type_name)?;
        let statement = self.factory.select(query, entity)?;

        self.stream_statement(&statement, entity)
    }

    pub fn select_by_id(
        &self,
        id: &Identity,
        type_name: &str,
    ) -> Result<Option<Value>, InternalError> {
        let entity = self.entity(type_name)?;
        let statement = self.factory.select_by_id(id, entity)?;

        self.stream_statement(&statement, entity)?.next().transpose()
    }

    pub fn exists(&self, id: &Identity, type_name: &str) -> Result<bool, InternalError> {
        let entity = self.entity(type_name)?;
        let statement = self.factory.exists_by_id(id, entity)?;

        Ok(self.execute(&statement)?.one()?.is_some())
    }

    pub fn count(&self, query: &Query, type_name: &str) -> Result<u64, InternalError> {
        let entity = self.entity(type_name)?;
        let statement = self.factory.count(query, entity)?;

        read_count(self.execute(&statement)?)
    }

    // ------------------------------------------------------------------
    // Writes
    // ------------------------------------------------------------------

    /// Insert the object and return it.
    pub fn insert(&self, object: &Value) -> Result<Value, InternalError> {
        let statement = self.factory.insert(object, self.entity_of(object)?)?;
        self.execute(&statement)?;

        Ok(object.clone())
    }

    /// Insert with write options. A conditional insert that the store
    /// did not apply returns `None`.
    pub fn insert_with_options(
        &self,
        object: &Value,
        options: &WriteOptions,
    ) -> Result<Option<Value>, InternalError> {
        let statement = self
            .factory
            .insert_with_options(object, self.entity_of(object)?, options)?;
        let applied = self.execute(&statement)?.was_applied();

        Ok((applied || !options.if_not_exists).then(|| object.clone()))
    }

    /// Update the object by its identity and return it.
    pub fn update(&self, object: &Value) -> Result<Value, InternalError> {
        self.update_with_options(object, &WriteOptions::default())
    }

    pub fn update_with_options(
        &self,
        object: &Value,
        options: &WriteOptions,
    ) -> Result<Value, InternalError> {
        let statement = self
            .factory
            .update_entity_with_options(object, self.entity_of(object)?, options)?;
        self.execute(&statement)?;

        Ok(object.clone())
    }

    pub fn delete(&self, object: &Value) -> Result<bool, InternalError> {
        let statement = self.factory.delete_entity(object, self.entity_of(object)?)?;

        Ok(self.execute(&statement)?.was_applied())
    }

    pub fn delete_by_id(&self, id: &Identity, type_name: &str) -> Result<bool, InternalError> {
        let statement = self.factory.delete_by_id(id, self.entity(type_name)?)?;

        Ok(self.execute(&statement)?.was_applied())
    }

    /// Start a batch of writes executed as one statement.
    #[must_use]
    pub const fn batch_ops(&self) -> BatchOperations<'_, S> {
        BatchOperations::new(self)
    }

    pub fn truncate(&self, type_name: &str) -> Result<(), InternalError> {
        let statement = self.factory.truncate(self.entity(type_name)?);
        self.execute(&statement)?;

        Ok(())
    }
}

impl<S: CqlSession> CqlOperations for CqlTemplate<S> {
    fn converter(&self) -> &dyn Converter {
        self.converter.as_ref()
    }

    fn statement_factory(&self) -> &StatementFactory {
        &self.factory
    }

    fn execute(&self, statement: &Statement) -> Result<ResultSet, InternalError> {
        debug!(cql = %statement, "executing statement");

        self.session.execute(statement)
    }
}

/// Read a `count(*)` result.
pub(crate) fn read_count(mut rows: ResultSet) -> Result<u64, InternalError> {
    let count = rows
        .one()?
        .and_then(|row| row.first_value().and_then(Value::as_i64))
        .unwrap_or(0);

    u64::try_from(count).map_err(|_| {
        InternalError::new(
            ErrorClass::Internal,
            ErrorOrigin::Execution,
            format!("negative count {count}"),
        )
    })
}
