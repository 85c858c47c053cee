use crate::{model::DataKind, repository::parameters::Parameters};

///
/// ReturnShape
/// Result cardinality a query method declares.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ReturnShape {
    Single,
    #[default]
    Collection,
    Stream,
    ResultSet,
    Count,
    Exists,
}

///
/// ProjectionModel
/// Declared projection (DTO) type: a name and the properties it exposes.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProjectionModel {
    pub type_name: String,
    pub properties: Vec<String>,
}

impl ProjectionModel {
    #[must_use]
    pub fn new<I, S>(type_name: impl Into<String>, properties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            type_name: type_name.into(),
            properties: properties.into_iter().map(Into::into).collect(),
        }
    }
}

///
/// ReturnedType
/// Element type a query method returns.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub enum ReturnedType {
    /// The domain entity itself.
    #[default]
    Entity,
    Projection(ProjectionModel),
    Scalar(DataKind),
}

///
/// QueryMethod
///
/// Metadata of one repository query method: name, domain type, declared
/// parameters and result shape, plus the CQL text for annotated queries.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct QueryMethod {
    name: String,
    entity: String,
    parameters: Parameters,
    shape: ReturnShape,
    returned: ReturnedType,
    annotated: Option<String>,
    allow_filtering: bool,
}

impl QueryMethod {
    #[must_use]
    pub fn new(name: impl Into<String>, entity: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entity: entity.into(),
            parameters: Parameters::new(),
            shape: ReturnShape::default(),
            returned: ReturnedType::default(),
            annotated: None,
            allow_filtering: false,
        }
    }

    #[must_use]
    pub fn parameters(mut self, parameters: Parameters) -> Self {
        self.parameters = parameters;
        self
    }

    #[must_use]
    pub const fn returns(mut self, shape: ReturnShape) -> Self {
        self.shape = shape;
        self
    }

    #[must_use]
    pub fn projecting(mut self, projection: ProjectionModel) -> Self {
        self.returned = ReturnedType::Projection(projection);
        self
    }

    #[must_use]
    pub fn returning(mut self, returned: ReturnedType) -> Self {
        self.returned = returned;
        self
    }

    /// Attach CQL text; the method then runs as a string-based query.
    #[must_use]
    pub fn query(mut self, cql: impl Into<String>) -> Self {
        self.annotated = Some(cql.into());
        self
    }

    #[must_use]
    pub const fn allow_filtering(mut self) -> Self {
        self.allow_filtering = true;
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Mapped type name of the domain entity.
    #[must_use]
    pub fn entity(&self) -> &str {
        &self.entity
    }

    #[must_use]
    pub const fn declared_parameters(&self) -> &Parameters {
        &self.parameters
    }

    #[must_use]
    pub const fn shape(&self) -> ReturnShape {
        self.shape
    }

    #[must_use]
    pub const fn returned_type(&self) -> &ReturnedType {
        &self.returned
    }

    #[must_use]
    pub fn annotated_query(&self) -> Option<&str> {
        self.annotated.as_deref()
    }

    #[must_use]
    pub const fn is_allow_filtering(&self) -> bool {
        self.allow_filtering
    }
}
