use crate::{
    error::{ErrorOrigin, InternalError},
    mapping::{Converter, TypeHint},
    repository::{method::QueryMethod, parameters::ParameterAccessor},
    statement::{SimpleStatement, Statement},
};

///
/// Binding
/// Placeholder found in annotated CQL.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Binding {
    /// `?0`, `?1`, ... or a bare `?` (numbered in order of appearance).
    Index(usize),
    /// `:name`
    Named(String),
}

///
/// StringBasedQuery
///
/// Annotated CQL with `?N` and `:name` placeholders. Placeholders are
/// parsed once; each invocation emits a simple statement with `?` markers
/// and the converted values in marker order.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StringBasedQuery {
    cql: String,
    bindings: Vec<Binding>,
}

impl StringBasedQuery {
    pub fn new(cql: &str) -> Result<Self, InternalError> {
        if cql.trim().is_empty() {
            return Err(InternalError::invalid_argument(
                ErrorOrigin::Derivation,
                "annotated query must not be empty",
            ));
        }

        let (cql, bindings) = parse_placeholders(cql)?;

        Ok(Self { cql, bindings })
    }

    /// CQL text with every placeholder rewritten to `?`.
    #[must_use]
    pub fn cql(&self) -> &str {
        &self.cql
    }

    #[must_use]
    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    /// Bind invocation arguments. Unknown names and out-of-range indexes
    /// fail as query-creation errors for `method`.
    pub fn bind(
        &self,
        method: &QueryMethod,
        accessor: &ParameterAccessor<'_>,
        converter: &dyn Converter,
    ) -> Result<Statement, InternalError> {
        let parameters = accessor.parameters();
        let mut values = Vec::with_capacity(self.bindings.len());

        for binding in &self.bindings {
            let index = match binding {
                Binding::Index(index) => *index,
                Binding::Named(name) => parameters.bindable_index_of(name).ok_or_else(|| {
                    InternalError::derivation(
                        method.name(),
                        format!("cannot resolve named parameter ':{name}'"),
                    )
                })?,
            };

            let value = accessor
                .bindable_value(index)
                .map_err(|err| InternalError::query_creation(method.name(), err))?;
            let hint = parameters
                .bindable_at(index)
                .and_then(|parameter| parameter.declared_kind())
                .map_or(TypeHint::Unknown, |kind| TypeHint::Kind(kind.clone()));

            values.push(converter.convert_to_column_value(value, &hint)?);
        }

        Ok(Statement::Simple(SimpleStatement {
            cql: self.cql.clone(),
            values,
        }))
    }
}

// Rewrite placeholders outside string literals and collect their bindings.
fn parse_placeholders(source: &str) -> Result<(String, Vec<Binding>), InternalError> {
    let chars: Vec<char> = source.chars().collect();
    let mut cql = String::with_capacity(source.len());
    let mut bindings = Vec::new();
    let mut bare = 0;
    let mut in_literal = false;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c == '\'' {
            in_literal = !in_literal;
            cql.push(c);
            i += 1;
            continue;
        }
        if in_literal {
            cql.push(c);
            i += 1;
            continue;
        }

        match c {
            '?' => {
                let digits: String = chars[i + 1..]
                    .iter()
                    .take_while(|c| c.is_ascii_digit())
                    .collect();

                if digits.is_empty() {
                    bindings.push(Binding::Index(bare));
                    bare += 1;
                } else {
                    let index = digits.parse::<usize>().map_err(|_| {
                        InternalError::invalid_argument(
                            ErrorOrigin::Derivation,
                            format!("invalid parameter index '?{digits}'"),
                        )
                    })?;
                    bindings.push(Binding::Index(index));
                }
                cql.push('?');
                i += 1 + digits.len();
            }
            ':' if chars
                .get(i + 1)
                .is_some_and(|next| next.is_ascii_alphabetic() || *next == '_') =>
            {
                let name: String = chars[i + 1..]
                    .iter()
                    .take_while(|c| c.is_ascii_alphanumeric() || **c == '_')
                    .collect();

                i += 1 + name.len();
                bindings.push(Binding::Named(name));
                cql.push('?');
            }
            _ => {
                cql.push(c);
                i += 1;
            }
        }
    }

    Ok((cql, bindings))
}
