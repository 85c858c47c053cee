use crate::{
    error::{ErrorOrigin, InternalError},
    model::DataKind,
    query::Sort,
    value::Value,
};

///
/// ParameterKind
/// Role of a declared method parameter.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ParameterKind {
    /// Bound into the query; carries the declared type.
    Bindable(DataKind),
    /// Dynamic sort applied after the static `OrderBy`.
    Sort,
}

///
/// Parameter
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Parameter {
    pub index: usize,
    pub name: Option<String>,
    pub kind: ParameterKind,
}

impl Parameter {
    #[must_use]
    pub const fn is_bindable(&self) -> bool {
        matches!(self.kind, ParameterKind::Bindable(_))
    }

    #[must_use]
    pub const fn declared_kind(&self) -> Option<&DataKind> {
        match &self.kind {
            ParameterKind::Bindable(kind) => Some(kind),
            ParameterKind::Sort => None,
        }
    }
}

///
/// Parameters
///
/// Declared parameters of a query method, in declaration order.
/// Bindable parameters are numbered separately from special ones.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Parameters {
    params: Vec<Parameter>,
}

impl Parameters {
    #[must_use]
    pub const fn new() -> Self {
        Self { params: Vec::new() }
    }

    /// Declare an unnamed bindable parameter.
    #[must_use]
    pub fn value(self, kind: DataKind) -> Self {
        self.push(None, ParameterKind::Bindable(kind))
    }

    /// Declare a named bindable parameter (referenced as `:name`).
    #[must_use]
    pub fn named(self, name: impl Into<String>, kind: DataKind) -> Self {
        self.push(Some(name.into()), ParameterKind::Bindable(kind))
    }

    /// Declare a dynamic sort parameter.
    #[must_use]
    pub fn sort(self) -> Self {
        self.push(None, ParameterKind::Sort)
    }

    fn push(mut self, name: Option<String>, kind: ParameterKind) -> Self {
        let index = self.params.len();
        self.params.push(Parameter { index, name, kind });
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.params.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Parameter> {
        self.params.iter()
    }

    /// Bindable parameters only, in order.
    pub fn bindable(&self) -> impl Iterator<Item = &Parameter> {
        self.params.iter().filter(|p| p.is_bindable())
    }

    /// Bindable parameter at a bindable index.
    #[must_use]
    pub fn bindable_at(&self, index: usize) -> Option<&Parameter> {
        self.bindable().nth(index)
    }

    /// Bindable index of a named parameter.
    #[must_use]
    pub fn bindable_index_of(&self, name: &str) -> Option<usize> {
        self.bindable()
            .position(|p| p.name.as_deref() == Some(name))
    }

    #[must_use]
    pub fn has_sort(&self) -> bool {
        self.params.iter().any(|p| p.kind == ParameterKind::Sort)
    }
}

///
/// Argument
/// One invocation argument, positionally matching a declared parameter.
///

#[derive(Clone, Debug, PartialEq)]
pub enum Argument {
    Value(Value),
    Sort(Sort),
}

impl Argument {
    #[must_use]
    pub fn value(value: impl Into<Value>) -> Self {
        Self::Value(value.into())
    }
}

impl From<Value> for Argument {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<Sort> for Argument {
    fn from(sort: Sort) -> Self {
        Self::Sort(sort)
    }
}

///
/// ParameterAccessor
///
/// Read access to invocation arguments through the declared parameters.
/// Per invocation; never mutates the method metadata.
///

#[derive(Clone, Copy, Debug)]
pub struct ParameterAccessor<'a> {
    parameters: &'a Parameters,
    arguments: &'a [Argument],
}

impl<'a> ParameterAccessor<'a> {
    #[must_use]
    pub const fn new(parameters: &'a Parameters, arguments: &'a [Argument]) -> Self {
        Self {
            parameters,
            arguments,
        }
    }

    #[must_use]
    pub const fn parameters(&self) -> &'a Parameters {
        self.parameters
    }

    /// Value of the bindable parameter at `index` (bindable numbering).
    pub fn bindable_value(&self, index: usize) -> Result<&'a Value, InternalError> {
        let parameter = self.parameters.bindable_at(index).ok_or_else(|| {
            InternalError::invalid_argument(
                ErrorOrigin::Derivation,
                format!(
                    "parameter index {index} out of bounds; method declares {} bindable parameters",
                    self.parameters.bindable().count()
                ),
            )
        })?;

        match self.arguments.get(parameter.index) {
            Some(Argument::Value(value)) => Ok(value),
            Some(Argument::Sort(_)) => Err(InternalError::invalid_argument(
                ErrorOrigin::Derivation,
                format!("argument {} must be a value, found a sort", parameter.index),
            )),
            None => Err(InternalError::invalid_argument(
                ErrorOrigin::Derivation,
                format!(
                    "argument index {} out of bounds; {} arguments given",
                    parameter.index,
                    self.arguments.len()
                ),
            )),
        }
    }

    /// Dynamic sort argument, if one is declared and given.
    #[must_use]
    pub fn sort(&self) -> Option<&'a Sort> {
        self.parameters
            .iter()
            .filter(|p| p.kind == ParameterKind::Sort)
            .find_map(|p| match self.arguments.get(p.index) {
                Some(Argument::Sort(sort)) => Some(sort),
                _ => None,
            })
    }
}
