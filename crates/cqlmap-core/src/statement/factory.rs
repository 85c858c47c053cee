use crate::{
    cql::{ColumnName, CqlIdentifier},
    error::{ErrorOrigin, InternalError},
    mapping::{PropertyPath, QueryMapper, TypeHint},
    model::{EntityModel, IdentityShape},
    query::{Filter, Operator, Query, Selector},
    statement::{
        Batch, BatchKind, Clause, Consistency, Delete, Insert, Select, Selection, Statement, Truncate,
        UpdateStatement, WriteOptions,
        identity::{Identity, key_values},
    },
    value::{ObjectValue, Value},
};
use std::collections::HashSet;
use tracing::debug;

///
/// StatementFactory
///
/// Builds statements from logical queries, entity objects and identities.
/// All property references go through the query mapper.
///

#[derive(Clone)]
pub struct StatementFactory {
    mapper: QueryMapper,
}

impl StatementFactory {
    #[must_use]
    pub const fn new(mapper: QueryMapper) -> Self {
        Self { mapper }
    }

    #[must_use]
    pub const fn mapper(&self) -> &QueryMapper {
        &self.mapper
    }

    // ------------------------------------------------------------------
    // Query-based
    // ------------------------------------------------------------------

    /// SELECT with mapped selectors, filter, sort and limit.
    pub fn select(&self, query: &Query, entity: &EntityModel) -> Result<Statement, InternalError> {
        let selectors = self.mapper.map_selectors(query.selection(), entity)?;

        let mut select = Select::new(entity.table_name().clone(), Selection::Columns(selectors));
        select.clauses = self.clauses(query.filter(), entity)?;
        select.order_by = self.mapper.map_sort(query.ordering(), entity)?.to_vec();
        select.limit = query.max_results();
        select.allow_filtering = query.is_allow_filtering();

        Ok(built(Statement::Select(select)))
    }

    /// `SELECT count(*)` with the mapped filter.
    pub fn count(&self, query: &Query, entity: &EntityModel) -> Result<Statement, InternalError> {
        let mut select = Select::new(entity.table_name().clone(), Selection::Count);
        select.clauses = self.clauses(query.filter(), entity)?;
        select.limit = query.max_results();
        select.allow_filtering = query.is_allow_filtering();

        Ok(built(Statement::Select(select)))
    }

    /// DELETE rows (or only the selected columns) matching the filter.
    pub fn delete(&self, query: &Query, entity: &EntityModel) -> Result<Statement, InternalError> {
        let columns = if query.selection().is_empty() {
            Vec::new()
        } else {
            self.mapper.map_column_names(query.selection(), entity)?
        };

        Ok(built(Statement::Delete(Delete {
            table: entity.table_name().clone(),
            columns,
            clauses: self.clauses(query.filter(), entity)?,
        })))
    }

    /// Partial UPDATE: the selected columns take their values from
    /// `object`; rows are picked by the filter. An empty selection updates
    /// every non-key column.
    pub fn update(
        &self,
        query: &Query,
        object: &Value,
        entity: &EntityModel,
    ) -> Result<Statement, InternalError> {
        let Value::Object(object) = object else {
            return Err(InternalError::invalid_argument(
                ErrorOrigin::Statement,
                "update values must be an entity object",
            ));
        };

        let mut assignments = Vec::new();
        for (column, path) in self.mapper.column_paths(query.selection(), entity)? {
            let Some(path) = path else {
                return Err(InternalError::invalid_argument(
                    ErrorOrigin::Statement,
                    format!(
                        "column '{column}' is not a property of '{}'",
                        entity.type_name()
                    ),
                ));
            };
            let property = path.leaf();
            if query.selection().is_empty() && property.is_identity() {
                continue;
            }

            let encoded = self
                .mapper
                .converter()
                .convert_to_column_value(path_value(object, &path), &TypeHint::of_property(property))?;
            assignments.push((column, encoded));
        }

        Ok(built(Statement::Update(UpdateStatement {
            table: entity.table_name().clone(),
            assignments,
            clauses: self.clauses(query.filter(), entity)?,
            options: WriteOptions::default(),
        })))
    }

    // ------------------------------------------------------------------
    // Entity-based
    // ------------------------------------------------------------------

    /// INSERT every non-null column of the object.
    pub fn insert(&self, object: &Value, entity: &EntityModel) -> Result<Statement, InternalError> {
        self.insert_with_options(object, entity, &WriteOptions::default())
    }

    /// INSERT with a `USING` clause and an optional `IF NOT EXISTS`.
    pub fn insert_with_options(
        &self,
        object: &Value,
        entity: &EntityModel,
        options: &WriteOptions,
    ) -> Result<Statement, InternalError> {
        options.validate()?;

        let values = self
            .mapper
            .converter()
            .write(object, entity)?
            .into_iter()
            .filter(|(_, value)| !value.is_null())
            .collect();

        Ok(built(Statement::Insert(Insert {
            table: entity.table_name().clone(),
            values,
            options: *options,
        })))
    }

    /// UPDATE every non-key column, keyed by the object's identity.
    pub fn update_entity(
        &self,
        object: &Value,
        entity: &EntityModel,
    ) -> Result<Statement, InternalError> {
        self.update_entity_with_options(object, entity, &WriteOptions::default())
    }

    /// Entity UPDATE with a `USING` clause. Updates cannot be made
    /// conditional on absence.
    pub fn update_entity_with_options(
        &self,
        object: &Value,
        entity: &EntityModel,
        options: &WriteOptions,
    ) -> Result<Statement, InternalError> {
        options.validate()?;
        if options.if_not_exists {
            return Err(InternalError::invalid_argument(
                ErrorOrigin::Statement,
                "IF NOT EXISTS applies to inserts only",
            ));
        }

        let key_columns = key_columns(entity);
        let mut assignments = Vec::new();
        let mut clauses = Vec::new();

        for (column, value) in self.mapper.converter().write(object, entity)? {
            if key_columns.contains(&column) {
                if value.is_null() {
                    return Err(InternalError::invalid_argument(
                        ErrorOrigin::Statement,
                        "identity value must not be null",
                    ));
                }
                clauses.push(Clause::eq(ColumnName::from_identifier(column), value));
            } else {
                assignments.push((ColumnName::from_identifier(column), value));
            }
        }

        if clauses.is_empty() {
            return Err(InternalError::invalid_argument(
                ErrorOrigin::Statement,
                format!("type '{}' declares no identity", entity.type_name()),
            ));
        }

        Ok(built(Statement::Update(UpdateStatement {
            table: entity.table_name().clone(),
            assignments,
            clauses,
            options: *options,
        })))
    }

    /// DELETE the row identified by the object's identity.
    pub fn delete_entity(
        &self,
        object: &Value,
        entity: &EntityModel,
    ) -> Result<Statement, InternalError> {
        let Value::Object(object) = object else {
            return Err(InternalError::invalid_argument(
                ErrorOrigin::Statement,
                "delete requires an entity object",
            ));
        };

        self.delete_by_id(&Identity::of(object, entity)?, entity)
    }

    // ------------------------------------------------------------------
    // Identity-based
    // ------------------------------------------------------------------

    pub fn select_by_id(&self, id: &Identity, entity: &EntityModel) -> Result<Statement, InternalError> {
        let mut select = Select::new(
            entity.table_name().clone(),
            Selection::Columns(self.mapper.columns(entity)?),
        );
        select.clauses = self.identity_clauses(id, entity)?;

        Ok(built(Statement::Select(select)))
    }

    /// Select the key columns of at most one row.
    pub fn exists_by_id(&self, id: &Identity, entity: &EntityModel) -> Result<Statement, InternalError> {
        let clauses = self.identity_clauses(id, entity)?;
        let selectors = clauses
            .iter()
            .map(|clause| Selector::of(clause.column.clone()))
            .collect();

        let mut select = Select::new(entity.table_name().clone(), Selection::Columns(selectors));
        select.clauses = clauses;
        select.limit = Some(1);

        Ok(built(Statement::Select(select)))
    }

    pub fn delete_by_id(&self, id: &Identity, entity: &EntityModel) -> Result<Statement, InternalError> {
        Ok(built(Statement::Delete(Delete {
            table: entity.table_name().clone(),
            columns: Vec::new(),
            clauses: self.identity_clauses(id, entity)?,
        })))
    }

    /// `IN` over a single-column key. Composite keys are rejected.
    pub fn select_by_ids(&self, ids: &[Value], entity: &EntityModel) -> Result<Statement, InternalError> {
        let IdentityShape::Single(property) = entity.identity_shape() else {
            return Err(InternalError::invalid_argument(
                ErrorOrigin::Statement,
                format!(
                    "select by ids requires a single-column key; '{}' has a composite or no key",
                    entity.type_name()
                ),
            ));
        };

        let hint = TypeHint::of_property(property);
        let values = ids
            .iter()
            .map(|id| {
                if id.is_null() {
                    return Err(InternalError::invalid_argument(
                        ErrorOrigin::Statement,
                        "identity value must not be null",
                    ));
                }
                self.mapper.converter().convert_to_column_value(id, &hint)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut select = Select::new(
            entity.table_name().clone(),
            Selection::Columns(self.mapper.columns(entity)?),
        );
        select.clauses = vec![Clause {
            column: ColumnName::from_identifier(property.column_name()?.clone()),
            op: Operator::In,
            value: Some(Value::List(values)),
        }];

        Ok(built(Statement::Select(select)))
    }

    /// Wrap writes into one batch. Reads, truncates and nested batches
    /// are rejected.
    pub fn batch(
        &self,
        kind: BatchKind,
        statements: Vec<Statement>,
        timestamp: Option<i64>,
        consistency: Option<Consistency>,
    ) -> Result<Statement, InternalError> {
        if statements.is_empty() {
            return Err(InternalError::invalid_argument(
                ErrorOrigin::Statement,
                "batch must contain at least one statement",
            ));
        }
        if let Some(statement) = statements.iter().find(|statement| {
            !matches!(
                statement,
                Statement::Insert(_) | Statement::Update(_) | Statement::Delete(_)
            )
        }) {
            return Err(InternalError::unsupported(
                ErrorOrigin::Statement,
                format!("statement not allowed in a batch: {statement}"),
            ));
        }

        Ok(built(Statement::Batch(Batch {
            kind,
            statements,
            timestamp,
            consistency,
        })))
    }

    #[must_use]
    pub fn truncate(&self, entity: &EntityModel) -> Statement {
        built(Statement::Truncate(Truncate {
            table: entity.table_name().clone(),
        }))
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    fn clauses(&self, filter: &Filter, entity: &EntityModel) -> Result<Vec<Clause>, InternalError> {
        self.mapper
            .map_filter(filter, entity)?
            .into_iter()
            .map(Clause::from_criteria)
            .collect()
    }

    fn identity_clauses(&self, id: &Identity, entity: &EntityModel) -> Result<Vec<Clause>, InternalError> {
        let converter = self.mapper.converter();

        key_values(id, entity, converter.mapping_context())?
            .into_iter()
            .map(|(property, value)| {
                let encoded =
                    converter.convert_to_column_value(&value, &TypeHint::of_property(property))?;

                Ok(Clause::eq(
                    ColumnName::from_identifier(property.column_name()?.clone()),
                    encoded,
                ))
            })
            .collect()
    }
}

fn key_columns(entity: &EntityModel) -> HashSet<CqlIdentifier> {
    entity
        .properties()
        .iter()
        .filter(|property| property.is_identity())
        .flat_map(|property| property.column_names().iter().cloned())
        .collect()
}

// Walk the object along the path; missing hops read as null.
fn path_value<'v>(object: &'v ObjectValue, path: &PropertyPath<'_>) -> &'v Value {
    let Some((leaf, hops)) = path.segments().split_last() else {
        return &Value::Null;
    };

    let mut current = object;
    for segment in hops {
        match current.get(segment.property.name()) {
            Some(Value::Object(nested)) => current = nested,
            _ => return &Value::Null,
        }
    }

    current.get(leaf.property.name()).unwrap_or(&Value::Null)
}

fn built(statement: Statement) -> Statement {
    debug!(cql = %statement, "statement built");
    statement
}
