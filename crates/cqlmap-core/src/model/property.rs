use crate::{
    cql::CqlIdentifier,
    error::{ErrorOrigin, InternalError},
    model::DataKind,
};

///
/// KeyRole
/// Role of a primary-key column inside its table.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum KeyRole {
    Partition,
    Clustering,
}

///
/// PropertyModel
///
/// Runtime metadata for one persistent property.
///
/// A simple property maps to exactly one column. A composite-key property
/// (an embedded primary-key type) maps to the ordered columns of the key
/// type's properties; those are filled in when the mapping context is built.
///

#[derive(Clone, Debug)]
pub struct PropertyModel {
    name: String,
    kind: DataKind,
    explicit_column: Option<ExplicitColumn>,
    columns: Vec<CqlIdentifier>,
    identity: bool,
    key_role: Option<KeyRole>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
enum ExplicitColumn {
    CqlId(String),
    Quoted(String),
}

impl PropertyModel {
    #[must_use]
    pub fn new(name: impl Into<String>, kind: DataKind) -> Self {
        Self {
            name: name.into(),
            kind,
            explicit_column: None,
            columns: Vec::new(),
            identity: false,
            key_role: None,
        }
    }

    // ------------------------------------------------------------------
    // Declaration
    // ------------------------------------------------------------------

    /// Override the column name (store identifier rules apply).
    #[must_use]
    pub fn column(mut self, column: impl Into<String>) -> Self {
        self.explicit_column = Some(ExplicitColumn::CqlId(column.into()));
        self
    }

    /// Override the column name with a case-sensitive quoted identifier.
    #[must_use]
    pub fn quoted_column(mut self, column: impl Into<String>) -> Self {
        self.explicit_column = Some(ExplicitColumn::Quoted(column.into()));
        self
    }

    /// Mark the property as the entity identity (`@Id`-style single key, or
    /// the composite key when its kind is `Embedded`).
    #[must_use]
    pub const fn id(mut self) -> Self {
        self.identity = true;
        self
    }

    #[must_use]
    pub const fn partition_key(mut self) -> Self {
        self.key_role = Some(KeyRole::Partition);
        self
    }

    #[must_use]
    pub const fn clustering_key(mut self) -> Self {
        self.key_role = Some(KeyRole::Clustering);
        self
    }

    // Resolve the declared column; called once by the context builder.
    pub(crate) fn resolve_column(
        &self,
        default_name: String,
        force_quote: bool,
    ) -> Result<CqlIdentifier, InternalError> {
        match &self.explicit_column {
            Some(ExplicitColumn::CqlId(name)) => CqlIdentifier::cql_id(name),
            Some(ExplicitColumn::Quoted(name)) => CqlIdentifier::quoted(name),
            None if force_quote => CqlIdentifier::quoted(default_name),
            None => CqlIdentifier::cql_id(default_name),
        }
    }

    pub(crate) fn set_columns(&mut self, columns: Vec<CqlIdentifier>) {
        self.columns = columns;
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn kind(&self) -> &DataKind {
        &self.kind
    }

    /// True when this property is (part of) the entity identity.
    #[must_use]
    pub const fn is_identity(&self) -> bool {
        self.identity || self.key_role.is_some()
    }

    /// True for an embedded primary-key type property.
    #[must_use]
    pub const fn is_composite_key(&self) -> bool {
        self.identity && matches!(self.kind, DataKind::Embedded(_))
    }

    #[must_use]
    pub const fn is_collection(&self) -> bool {
        self.kind.is_collection()
    }

    #[must_use]
    pub const fn key_role(&self) -> Option<KeyRole> {
        self.key_role
    }

    /// All columns this property maps to, in declaration order.
    #[must_use]
    pub fn column_names(&self) -> &[CqlIdentifier] {
        &self.columns
    }

    /// The single column of a simple property.
    ///
    /// Composite-key properties span several columns and have no single
    /// column name.
    pub fn column_name(&self) -> Result<&CqlIdentifier, InternalError> {
        if self.is_composite_key() {
            return Err(InternalError::invalid_argument(
                ErrorOrigin::Mapping,
                format!(
                    "composite primary key property '{}' has no single column name",
                    self.name
                ),
            ));
        }

        self.columns.first().ok_or_else(|| {
            InternalError::invalid_argument(
                ErrorOrigin::Model,
                format!("property '{}' has no resolved column", self.name),
            )
        })
    }
}

impl PartialEq for PropertyModel {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.kind == other.kind && self.columns == other.columns
    }
}

impl Eq for PropertyModel {}
