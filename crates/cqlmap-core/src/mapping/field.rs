use crate::{
    cql::ColumnName,
    error::InternalError,
    mapping::path::PropertyPath,
    model::{EntityModel, MappingContext, PropertyModel},
};
use tracing::trace;

///
/// Field
///
/// A property reference used inside a query, resolved against entity
/// metadata when an entity is available. Created per mapping call.
///

#[derive(Clone, Debug)]
pub enum Field<'a> {
    /// No entity metadata; the name is used verbatim.
    Unresolved { name: String },

    /// Entity-backed reference. `path` is `None` when the name did not
    /// resolve, in which case `property` may still carry a property
    /// inherited through [`Field::with`].
    MetadataBacked {
        name: String,
        entity: &'a EntityModel,
        ctx: &'a MappingContext,
        path: Option<PropertyPath<'a>>,
        property: Option<&'a PropertyModel>,
    },
}

impl<'a> Field<'a> {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        entity: Option<&'a EntityModel>,
        ctx: &'a MappingContext,
    ) -> Self {
        let name = name.into();

        match entity {
            Some(entity) => Self::backed(name, entity, ctx, None),
            None => Self::Unresolved { name },
        }
    }

    fn backed(
        name: String,
        entity: &'a EntityModel,
        ctx: &'a MappingContext,
        inherited: Option<&'a PropertyModel>,
    ) -> Self {
        let path = match PropertyPath::resolve(&name, entity, ctx) {
            Ok(path) => Some(path),
            Err(err) => {
                trace!(
                    entity = entity.type_name(),
                    name = %name,
                    reason = %err,
                    "property path unresolved; using literal column name"
                );
                None
            }
        };
        let property = path.as_ref().map(PropertyPath::leaf).or(inherited);

        Self::MetadataBacked {
            name,
            entity,
            ctx,
            path,
            property,
        }
    }

    /// The name as written by the caller.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Unresolved { name } | Self::MetadataBacked { name, .. } => name,
        }
    }

    /// Leaf property, when the reference is metadata-backed and resolved.
    #[must_use]
    pub const fn property(&self) -> Option<&'a PropertyModel> {
        match self {
            Self::Unresolved { .. } => None,
            Self::MetadataBacked { property, .. } => *property,
        }
    }

    #[must_use]
    pub const fn path(&self) -> Option<&PropertyPath<'a>> {
        match self {
            Self::MetadataBacked {
                path: Some(path), ..
            } => Some(path),
            _ => None,
        }
    }

    /// True when the name resolved to a declared property path.
    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        self.path().is_some()
    }

    /// Column the reference maps to.
    ///
    /// A resolved path yields its leaf column identifier; anything else,
    /// including a property inherited through [`Field::with`], passes the
    /// caller's name through as a literal.
    pub fn mapped_key(&self) -> Result<ColumnName, InternalError> {
        match self.path() {
            Some(path) => Ok(ColumnName::from_identifier(path.leaf().column_name()?.clone())),
            None => ColumnName::from_literal(self.name()),
        }
    }

    /// Rebind to another name, keeping the current property when the new
    /// name does not resolve.
    #[must_use]
    pub fn with(&self, name: impl Into<String>) -> Self {
        let name = name.into();

        match self {
            Self::Unresolved { .. } => Self::Unresolved { name },
            Self::MetadataBacked {
                entity,
                ctx,
                property,
                ..
            } => Self::backed(name, *entity, *ctx, *property),
        }
    }
}
