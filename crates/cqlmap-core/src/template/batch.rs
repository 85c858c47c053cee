use crate::{
    error::InternalError,
    session::CqlSession,
    statement::{BatchKind, Consistency, Statement, WriteOptions},
    template::{CqlOperations, CqlTemplate},
    value::Value,
};

///
/// BatchOperations
///
/// Collects entity writes into one batch statement. Each call validates
/// and converts its entities immediately; `execute` consumes the builder,
/// so a batch runs at most once.
///

pub struct BatchOperations<'a, S> {
    template: &'a CqlTemplate<S>,
    kind: BatchKind,
    statements: Vec<Statement>,
    timestamp: Option<i64>,
    consistency: Option<Consistency>,
}

impl<'a, S: CqlSession> BatchOperations<'a, S> {
    pub(crate) const fn new(template: &'a CqlTemplate<S>) -> Self {
        Self {
            template,
            kind: BatchKind::Logged,
            statements: Vec::new(),
            timestamp: None,
            consistency: None,
        }
    }

    pub fn insert<'v>(self, objects: impl IntoIterator<Item = &'v Value>) -> Result<Self, InternalError> {
        self.insert_with_options(objects, &WriteOptions::default())
    }

    pub fn insert_with_options<'v>(
        mut self,
        objects: impl IntoIterator<Item = &'v Value>,
        options: &WriteOptions,
    ) -> Result<Self, InternalError> {
        for object in objects {
            let entity = self.template.entity_of(object)?;
            let statement = self
                .template
                .statement_factory()
                .insert_with_options(object, entity, options)?;
            self.statements.push(statement);
        }

        Ok(self)
    }

    pub fn update<'v>(self, objects: impl IntoIterator<Item = &'v Value>) -> Result<Self, InternalError> {
        self.update_with_options(objects, &WriteOptions::default())
    }

    pub fn update_with_options<'v>(
        mut self,
        objects: impl IntoIterator<Item = &'v Value>,
        options: &WriteOptions,
    ) -> Result<Self, InternalError> {
        for object in objects {
            let entity = self.template.entity_of(object)?;
            let statement = self
                .template
                .statement_factory()
                .update_entity_with_options(object, entity, options)?;
            self.statements.push(statement);
        }

        Ok(self)
    }

    pub fn delete<'v>(mut self, objects: impl IntoIterator<Item = &'v Value>) -> Result<Self, InternalError> {
        for object in objects {
            let entity = self.template.entity_of(object)?;
            let statement = self.template.statement_factory().delete_entity(object, entity)?;
            self.statements.push(statement);
        }

        Ok(self)
    }

    /// Batch-wide write timestamp in microseconds.
    #[must_use]
    pub const fn with_timestamp(mut self, micros: i64) -> Self {
        self.timestamp = Some(micros);
        self
    }

    #[must_use]
    pub const fn with_consistency(mut self, level: Consistency) -> Self {
        self.consistency = Some(level);
        self
    }

    #[must_use]
    pub const fn unlogged(mut self) -> Self {
        self.kind = BatchKind::Unlogged;
        self
    }

    /// Statements collected so far.
    #[must_use]
    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    /// Run the batch; returns whether the store applied it.
    pub fn execute(self) -> Result<bool, InternalError> {
        let statement = self.template.statement_factory().batch(
            self.kind,
            self.statements,
            self.timestamp,
            self.consistency,
        )?;

        Ok(self.template.execute(&statement)?.was_applied())
    }
}
