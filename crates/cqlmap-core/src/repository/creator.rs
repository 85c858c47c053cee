use crate::{
    cql::ColumnName,
    error::{ErrorOrigin, InternalError},
    mapping::{Converter, TypeHint},
    model::DataKind,
    query::{Criteria, Filter, Operator, Predicate, Query},
    repository::{
        parameters::ParameterAccessor,
        part_tree::{Part, PartTree, PartType},
    },
    value::Value,
};

///
/// QueryCreator
///
/// Builds a logical query from a part tree and one invocation's arguments.
/// Criteria reference property paths; the query mapper resolves them to
/// columns later.
///

pub struct QueryCreator<'a> {
    tree: &'a PartTree,
    accessor: ParameterAccessor<'a>,
    converter: &'a dyn Converter,
}

impl<'a> QueryCreator<'a> {
    #[must_use]
    pub const fn new(
        tree: &'a PartTree,
        accessor: ParameterAccessor<'a>,
        converter: &'a dyn Converter,
    ) -> Self {
        Self {
            tree,
            accessor,
            converter,
        }
    }

    pub fn create_query(&self) -> Result<Query, InternalError> {
        let parts: &[Part] = match self.tree.branches() {
            [] => &[],
            [branch] => &branch.parts,
            _ => {
                return Err(InternalError::derivation(
                    self.tree.method(),
                    "Or predicates are not supported; the store only evaluates conjunctions",
                ));
            }
        };

        let mut filter = Filter::empty();
        let mut next = 0;
        for part in parts {
            self.append(part, &mut next, &mut filter)?;
        }

        let mut query = Query::query(filter);

        let sort = match self.accessor.sort() {
            Some(dynamic) => self.tree.sort().clone().merge(dynamic),
            None => self.tree.sort().clone(),
        };
        if !sort.is_empty() {
            query = query.sort(sort);
        }
        if let Some(limit) = self.tree.max_results() {
            query = query.limit(limit);
        }

        Ok(query)
    }

    fn append(&self, part: &Part, next: &mut usize, filter: &mut Filter) -> Result<(), InternalError> {
        let column = ColumnName::from_literal(part.property.clone())?;
        let mut push = |op: Operator, value: Option<Value>| {
            filter.push(Criteria::new(column.clone(), Predicate::new(op, value)));
        };

        match part.part_type {
            PartType::SimpleProperty => push(Operator::Eq, Some(self.bind(part, next)?)),
            PartType::NegatingSimpleProperty => push(Operator::Ne, Some(self.bind(part, next)?)),
            PartType::GreaterThan | PartType::After => push(Operator::Gt, Some(self.bind(part, next)?)),
            PartType::GreaterThanEqual => push(Operator::Gte, Some(self.bind(part, next)?)),
            PartType::LessThan | PartType::Before => push(Operator::Lt, Some(self.bind(part, next)?)),
            PartType::LessThanEqual => push(Operator::Lte, Some(self.bind(part, next)?)),
            PartType::Between => {
                let from = self.bind(part, next)?;
                let to = self.bind(part, next)?;
                push(Operator::Gt, Some(from));
                push(Operator::Lt, Some(to));
            }
            PartType::In => push(Operator::In, Some(self.bind(part, next)?)),
            PartType::Like => push(Operator::Like, Some(self.bind(part, next)?)),
            PartType::StartingWith => {
                let pattern = format!("{}%", self.bind_text(part, next)?);
                push(Operator::Like, Some(Value::Text(pattern)));
            }
            PartType::EndingWith => {
                let pattern = format!("%{}", self.bind_text(part, next)?);
                push(Operator::Like, Some(Value::Text(pattern)));
            }
            PartType::Containing if part.kind.is_collection() => {
                push(Operator::Contains, Some(self.bind(part, next)?));
            }
            PartType::Containing if part.kind.is_text() => {
                let pattern = format!("%{}%", self.bind_text(part, next)?);
                push(Operator::Like, Some(Value::Text(pattern)));
            }
            PartType::True => push(Operator::Eq, Some(Value::Bool(true))),
            PartType::False => push(Operator::Eq, Some(Value::Bool(false))),
            PartType::IsNotNull => push(Operator::IsNotNull, None),
            PartType::IsNull => push(Operator::IsNull, None),
            PartType::Containing
            | PartType::NotContaining
            | PartType::NotIn
            | PartType::NotLike => {
                return Err(InternalError::unsupported(
                    ErrorOrigin::Derivation,
                    format!(
                        "keyword {:?} on property '{}' is not supported",
                        part.part_type, part.property
                    ),
                ));
            }
        }

        Ok(())
    }

    // Next bindable argument, with structured values encoded as UDTs when
    // the parameter or the property is UDT-typed.
    fn bind(&self, part: &Part, next: &mut usize) -> Result<Value, InternalError> {
        let index = *next;
        *next += 1;

        let value = self.accessor.bindable_value(index)?;
        let declared = self
            .accessor
            .parameters()
            .bindable_at(index)
            .and_then(|parameter| parameter.declared_kind());

        let udt = declared
            .and_then(udt_kind)
            .or_else(|| udt_kind(&part.kind));

        match (value, udt) {
            (Value::Object(_), Some(udt)) => self
                .converter
                .convert_to_column_value(value, &TypeHint::Kind(udt)),
            (Value::List(_) | Value::Set(_), Some(udt)) => self
                .converter
                .convert_to_column_value(value, &TypeHint::Kind(DataKind::list(udt))),
            _ => Ok(value.clone()),
        }
    }

    fn bind_text(&self, part: &Part, next: &mut usize) -> Result<String, InternalError> {
        let value = self.bind(part, next)?;

        value.as_text().map(str::to_string).ok_or_else(|| {
            InternalError::conversion(format!(
                "'{}' requires a text argument, found {value}",
                part.source
            ))
        })
    }
}

// UDT kind at `kind` or at its element.
fn udt_kind(kind: &DataKind) -> Option<DataKind> {
    match kind {
        DataKind::Udt(_) => Some(kind.clone()),
        _ => kind.element().filter(|element| element.udt_type().is_some()).cloned(),
    }
}
