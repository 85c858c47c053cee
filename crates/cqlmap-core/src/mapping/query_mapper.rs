use crate::{
    cql::ColumnName,
    error::{ErrorClass, ErrorOrigin, InternalError},
    mapping::{
        convert::{Converter, TypeHint},
        field::Field,
        path::PropertyPath,
    },
    model::{DataKind, EntityModel, MappingContext, PropertyModel},
    query::{Columns, Criteria, Filter, Operator, Order, Predicate, Selector, SelectorParam, Sort},
    value::Value,
};
use std::{collections::HashSet, sync::Arc};
use tracing::warn;

///
/// QueryMapper
///
/// Translates logical queries expressed over property names into physical
/// columns and store-encoded values.
///

#[derive(Clone)]
pub struct QueryMapper {
    converter: Arc<dyn Converter>,
}

impl QueryMapper {
    #[must_use]
    pub fn new(converter: Arc<dyn Converter>) -> Self {
        Self { converter }
    }

    #[must_use]
    pub fn converter(&self) -> &dyn Converter {
        self.converter.as_ref()
    }

    #[must_use]
    pub fn mapping_context(&self) -> &MappingContext {
        self.converter.mapping_context()
    }

    // ------------------------------------------------------------------
    // Filter
    // ------------------------------------------------------------------

    /// Map every criteria to its column and encode its operand.
    pub fn map_filter(&self, filter: &Filter, entity: &EntityModel) -> Result<Filter, InternalError> {
        let mut mapped = Filter::empty();

        for criteria in filter {
            let field = self.field(&criteria.column, entity)?;

            if let Some(property) = field.property()
                && property.is_composite_key()
                && criteria.op() == Operator::Eq
                && let Some(Value::Object(key)) = criteria.value()
            {
                for (column, value) in self.expand_composite(&field, property, key.fields())? {
                    mapped.push(Criteria::new(
                        column,
                        Predicate::new(Operator::Eq, Some(value)),
                    ));
                }
                continue;
            }

            let column = self.mapped_column(&criteria.column, &field)?;
            let value = criteria
                .value()
                .map(|value| self.convert_operand(criteria.op(), value, field.property()))
                .transpose()?;

            mapped.push(Criteria::new(column, Predicate::new(criteria.op(), value)));
        }

        Ok(mapped)
    }

    // One equality per sub-property of a composite key object.
    fn expand_composite(
        &self,
        field: &Field<'_>,
        property: &PropertyModel,
        key: &[(String, Value)],
    ) -> Result<Vec<(ColumnName, Value)>, InternalError> {
        let key_entity = self
            .mapping_context()
            .embedded_entity(property)
            .ok_or_else(|| {
                InternalError::invalid_argument(
                    ErrorOrigin::Mapping,
                    format!("key type of property '{}' is not mapped", property.name()),
                )
            })?;

        key_entity
            .properties()
            .iter()
            .map(|sub| {
                let nested = field.with(format!("{}.{}", field.name(), sub.name()));
                let column = nested.mapped_key()?;
                let value = key
                    .iter()
                    .find(|(name, _)| name == sub.name())
                    .map_or(&Value::Null, |(_, value)| value);
                let encoded = self
                    .converter
                    .convert_to_column_value(value, &TypeHint::of_property(sub))?;

                Ok((column, encoded))
            })
            .collect()
    }

    fn convert_operand(
        &self,
        op: Operator,
        value: &Value,
        property: Option<&PropertyModel>,
    ) -> Result<Value, InternalError> {
        let declared = property.map(PropertyModel::kind);

        match op {
            Operator::In => {
                // element-wise against the property's own kind
                let hint = declared.map_or(TypeHint::Unknown, |kind| TypeHint::Kind(kind.clone()));
                let elements = value.elements().map_or_else(
                    || vec![value.clone()],
                    <[Value]>::to_vec,
                );

                Ok(Value::List(
                    elements
                        .iter()
                        .map(|element| self.converter.convert_to_column_value(element, &hint))
                        .collect::<Result<_, _>>()?,
                ))
            }
            Operator::Contains => {
                let hint = declared
                    .and_then(DataKind::element)
                    .map_or_else(|| TypeHint::of_value(value), |kind| TypeHint::Kind(kind.clone()));
                self.converter.convert_to_column_value(value, &hint)
            }
            Operator::ContainsKey => {
                let hint = declared
                    .and_then(DataKind::map_key)
                    .map_or_else(|| TypeHint::of_value(value), |kind| TypeHint::Kind(kind.clone()));
                self.converter.convert_to_column_value(value, &hint)
            }
            Operator::Like => Ok(value.clone()),
            _ => {
                let hint = declared.map_or_else(|| TypeHint::of_value(value), |kind| TypeHint::Kind(kind.clone()));
                self.converter.convert_to_column_value(value, &hint)
            }
        }
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    /// Every column of the entity, composite keys expanded.
    pub fn columns(&self, entity: &EntityModel) -> Result<Vec<Selector>, InternalError> {
        Ok(entity
            .properties()
            .iter()
            .flat_map(PropertyModel::column_names)
            .map(|column| Selector::of(ColumnName::from_identifier(column.clone())))
            .collect())
    }

    /// Map explicit selectors; an empty selection means every column.
    pub fn map_selectors(
        &self,
        columns: &Columns,
        entity: &EntityModel,
    ) -> Result<Vec<Selector>, InternalError> {
        if columns.is_empty() {
            return self.columns(entity);
        }

        let mut selectors = Vec::new();
        for selector in columns {
            self.map_selector(selector, entity, &mut selectors)?;
        }

        Ok(selectors)
    }

    fn map_selector(
        &self,
        selector: &Selector,
        entity: &EntityModel,
        out: &mut Vec<Selector>,
    ) -> Result<(), InternalError> {
        match selector {
            Selector::Column { name, alias } => {
                let field = self.field(name, entity)?;

                if let Some(property) = field.property()
                    && property.is_composite_key()
                {
                    out.extend(
                        property
                            .column_names()
                            .iter()
                            .map(|column| Selector::of(ColumnName::from_identifier(column.clone()))),
                    );
                    return Ok(());
                }

                out.push(Selector::Column {
                    name: self.mapped_column(name, &field)?,
                    alias: alias.clone(),
                });
            }
            Selector::Function {
                expression,
                parameters,
                alias,
            } => {
                let mut mapped = Vec::with_capacity(parameters.len());
                for parameter in parameters {
                    match parameter {
                        SelectorParam::Selector(nested) => {
                            let mut nested_out = Vec::new();
                            self.map_selector(nested, entity, &mut nested_out)?;
                            mapped.extend(nested_out.into_iter().map(SelectorParam::Selector));
                        }
                        SelectorParam::Literal(value) => {
                            mapped.push(SelectorParam::Literal(value.clone()));
                        }
                    }
                }

                out.push(Selector::Function {
                    expression: expression.clone(),
                    parameters: mapped,
                    alias: alias.clone(),
                });
            }
        }

        Ok(())
    }

    /// Plain column selectors mapped to columns, one per underlying
    /// property. An empty selection yields every simple property's column.
    pub fn map_column_names(
        &self,
        columns: &Columns,
        entity: &EntityModel,
    ) -> Result<Vec<ColumnName>, InternalError> {
        if columns.is_empty() {
            return entity
                .properties()
                .iter()
                .filter(|property| !property.is_composite_key())
                .map(|property| Ok(ColumnName::from_identifier(property.column_name()?.clone())))
                .collect();
        }

        let mut seen = HashSet::new();
        let mut names = Vec::new();

        for name in columns.iter().filter_map(Selector::column_name) {
            let field = self.field(name, entity)?;

            if let Some(property) = field.property()
                && !seen.insert(property.name())
            {
                continue;
            }

            let column = self.mapped_column(name, &field)?;
            if !names.contains(&column) {
                names.push(column);
            }
        }

        Ok(names)
    }

    /// Column/path pairs for a selection, used to pick values out of an
    /// object for partial updates. Nested names resolve through embedded
    /// types; an empty selection yields every simple property.
    pub(crate) fn column_paths<'a>(
        &'a self,
        columns: &Columns,
        entity: &'a EntityModel,
    ) -> Result<Vec<(ColumnName, Option<PropertyPath<'a>>)>, InternalError> {
        if columns.is_empty() {
            return entity
                .properties()
                .iter()
                .filter(|property| !property.is_composite_key())
                .map(|property| {
                    Ok((
                        ColumnName::from_identifier(property.column_name()?.clone()),
                        Some(PropertyPath::of(entity, property)),
                    ))
                })
                .collect();
        }

        let mut seen = HashSet::new();
        let mut pairs = Vec::new();

        for name in columns.iter().filter_map(Selector::column_name) {
            let field = self.field(name, entity)?;
            let path = field.path().cloned();

            if let Some(path) = &path
                && !seen.insert(path.to_dot_path())
            {
                continue;
            }

            pairs.push((self.mapped_column(name, &field)?, path));
        }

        Ok(pairs)
    }

    // ------------------------------------------------------------------
    // Sort
    // ------------------------------------------------------------------

    /// Map sort keys to columns; unresolved keys pass through unchanged.
    pub fn map_sort(&self, sort: &Sort, entity: &EntityModel) -> Result<Sort, InternalError> {
        let mut mapped = Sort::unsorted();

        for order in sort {
            let field = Field::new(order.property.as_str(), Some(entity), self.mapping_context());

            let property = match field.property() {
                Some(property) => property.column_name()?.to_cql(),
                None => {
                    self.check_strict(&field, entity)?;
                    order.property.clone()
                }
            };

            mapped = mapped.and(Order::new(property, order.direction));
        }

        Ok(mapped)
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    // Field for a column reference; identifiers resolve by their text.
    fn field<'a>(
        &'a self,
        column: &ColumnName,
        entity: &'a EntityModel,
    ) -> Result<Field<'a>, InternalError> {
        let name = match column {
            ColumnName::Literal(name) => name.clone(),
            ColumnName::Identifier(identifier) => identifier.as_str().to_string(),
        };
        let field = Field::new(name, Some(entity), self.mapping_context());

        if field.property().is_none() {
            self.check_strict(&field, entity)?;
        }

        Ok(field)
    }

    // Resolved fields map to their column; others keep the caller's column.
    fn mapped_column(&self, column: &ColumnName, field: &Field<'_>) -> Result<ColumnName, InternalError> {
        if field.property().is_some() {
            field.mapped_key()
        } else {
            Ok(column.clone())
        }
    }

    fn check_strict(&self, field: &Field<'_>, entity: &EntityModel) -> Result<(), InternalError> {
        if !self.mapping_context().config().strict_property_resolution {
            return Ok(());
        }

        warn!(
            entity = entity.type_name(),
            name = field.name(),
            "rejecting unresolved property reference"
        );

        Err(InternalError::new(
            ErrorClass::PropertyResolution,
            ErrorOrigin::Mapping,
            format!(
                "no property '{}' found for type '{}'",
                field.name(),
                entity.type_name()
            ),
        ))
    }
}
