use crate::{
    cql::CqlIdentifier,
    model::{DataKind, property::PropertyModel},
};

///
/// EntityRole
/// What a registered type is persisted as.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EntityRole {
    /// A table-backed entity.
    Table,
    /// An embedded primary-key type whose properties are key columns.
    PrimaryKeyClass,
    /// A type stored as a user-defined type value.
    UserType,
}

///
/// EntityDef
///
/// Explicit registration of one mapped type. Turned into an [`EntityModel`]
/// when the mapping context is built, which is where default names are
/// derived and composite-key columns are expanded.
///

#[derive(Clone, Debug)]
pub struct EntityDef {
    pub(crate) type_name: String,
    pub(crate) role: EntityRole,
    pub(crate) name: Option<DeclaredName>,
    pub(crate) properties: Vec<PropertyModel>,
}

#[derive(Clone, Debug)]
pub(crate) enum DeclaredName {
    CqlId(String),
    Quoted(String),
}

impl EntityDef {
    /// Register a table-backed entity.
    #[must_use]
    pub fn table(type_name: impl Into<String>) -> Self {
        Self::new(type_name, EntityRole::Table)
    }

    /// Register an embedded primary-key type.
    #[must_use]
    pub fn key_class(type_name: impl Into<String>) -> Self {
        Self::new(type_name, EntityRole::PrimaryKeyClass)
    }

    /// Register a type stored as a user-defined type.
    #[must_use]
    pub fn user_type(type_name: impl Into<String>) -> Self {
        Self::new(type_name, EntityRole::UserType)
    }

    fn new(type_name: impl Into<String>, role: EntityRole) -> Self {
        Self {
            type_name: type_name.into(),
            role,
            name: None,
            properties: Vec::new(),
        }
    }

    /// Override the table (or user type) name.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(DeclaredName::CqlId(name.into()));
        self
    }

    /// Override the table (or user type) name with a quoted identifier.
    #[must_use]
    pub fn quoted_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(DeclaredName::Quoted(name.into()));
        self
    }

    #[must_use]
    pub fn property(mut self, property: PropertyModel) -> Self {
        self.properties.push(property);
        self
    }

    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }
}

///
/// IdentityShape
/// How an entity's identity is declared.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum IdentityShape<'a> {
    /// No identity declared (key classes and user types).
    None,
    /// One property mapping to one column.
    Single(&'a PropertyModel),
    /// One embedded primary-key type property spanning several columns.
    Composite(&'a PropertyModel),
    /// Several key columns declared directly on the entity.
    MapId(Vec<&'a PropertyModel>),
}

///
/// EntityModel
///
/// Resolved runtime model for one mapped type: name, ordered properties with
/// resolved columns, and identity shape.
///

#[derive(Clone, Debug)]
pub struct EntityModel {
    type_name: String,
    role: EntityRole,
    name: CqlIdentifier,
    properties: Vec<PropertyModel>,
}

impl EntityModel {
    pub(crate) const fn new(
        type_name: String,
        role: EntityRole,
        name: CqlIdentifier,
        properties: Vec<PropertyModel>,
    ) -> Self {
        Self {
            type_name,
            role,
            name,
            properties,
        }
    }

    /// Mapped type name used for registry lookups and diagnostics.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    #[must_use]
    pub const fn role(&self) -> EntityRole {
        self.role
    }

    /// Table name (or user type name for `EntityRole::UserType`).
    #[must_use]
    pub const fn table_name(&self) -> &CqlIdentifier {
        &self.name
    }

    /// Ordered properties (authoritative for column order).
    #[must_use]
    pub fn properties(&self) -> &[PropertyModel] {
        &self.properties
    }

    /// Look up a property by its declared name.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&PropertyModel> {
        self.properties.iter().find(|p| p.name() == name)
    }

    #[must_use]
    pub fn identity_shape(&self) -> IdentityShape<'_> {
        if let Some(composite) = self.properties.iter().find(|p| p.is_composite_key()) {
            return IdentityShape::Composite(composite);
        }

        let keys: Vec<&PropertyModel> =
            self.properties.iter().filter(|p| p.is_identity()).collect();

        match keys.as_slice() {
            [] => IdentityShape::None,
            [single] => IdentityShape::Single(single),
            _ => IdentityShape::MapId(keys),
        }
    }

    /// True when the identity spans more than one column.
    #[must_use]
    pub fn has_composite_identity(&self) -> bool {
        matches!(
            self.identity_shape(),
            IdentityShape::Composite(_) | IdentityShape::MapId(_)
        )
    }

    // Install expanded columns for embedded properties, keyed by position.
    pub(crate) fn set_embedded_columns(&mut self, expanded: Vec<(usize, Vec<CqlIdentifier>)>) {
        for (index, columns) in expanded {
            if let Some(property) = self.properties.get_mut(index) {
                debug_assert!(matches!(property.kind(), DataKind::Embedded(_)));
                property.set_columns(columns);
            }
        }
    }
}
