use crate::{
    config::MappingConfig,
    cql::CqlIdentifier,
    error::{ErrorOrigin, InternalError},
    model::{
        DataKind,
        entity::{DeclaredName, EntityDef, EntityModel, EntityRole},
        property::PropertyModel,
        udt::{UserTypeResolver, UserTypeSchema},
    },
};
use std::{collections::HashMap, fmt, sync::Arc};
use tracing::debug;

// Embedded types nested deeper than this are treated as a cycle.
const MAX_EMBEDDING_DEPTH: usize = 8;

///
/// MappingContext
///
/// Registry of resolved entity models keyed by mapped type name, plus the
/// configuration and user-type resolver shared by every mapping call.
/// Immutable once built; share it through `Arc`.
///

pub struct MappingContext {
    config: MappingConfig,
    entities: HashMap<String, EntityModel>,
    user_types: Option<Arc<dyn UserTypeResolver>>,
}

impl MappingContext {
    #[must_use]
    pub fn builder() -> MappingContextBuilder {
        MappingContextBuilder::default()
    }

    #[must_use]
    pub const fn config(&self) -> &MappingConfig {
        &self.config
    }

    #[must_use]
    pub fn persistent_entity(&self, type_name: &str) -> Option<&EntityModel> {
        self.entities.get(type_name)
    }

    pub fn required_persistent_entity(&self, type_name: &str) -> Result<&EntityModel, InternalError> {
        self.persistent_entity(type_name)
            .ok_or_else(|| InternalError::unmapped_type(type_name))
    }

    /// Entity model behind an embedded or composite-key property.
    #[must_use]
    pub fn embedded_entity(&self, property: &PropertyModel) -> Option<&EntityModel> {
        property
            .kind()
            .embedded_type()
            .and_then(|type_name| self.persistent_entity(type_name))
    }

    /// Resolve a user type schema by store name.
    ///
    /// The configured resolver is consulted first; a registered user-type
    /// entity with the same name is used when the resolver has no answer.
    pub fn resolve_user_type(&self, name: &CqlIdentifier) -> Result<UserTypeSchema, InternalError> {
        if let Some(schema) = self
            .user_types
            .as_ref()
            .and_then(|resolver| resolver.resolve_type(name))
        {
            return Ok(schema);
        }

        self.entities
            .values()
            .find(|entity| entity.role() == EntityRole::UserType && entity.table_name() == name)
            .map(schema_from_entity)
            .transpose()?
            .ok_or_else(|| {
                InternalError::invalid_argument(
                    ErrorOrigin::Mapping,
                    format!("user type '{name}' not found"),
                )
            })
    }

    /// Resolve the user type schema for a mapped type stored as a UDT.
    pub fn user_type_for(&self, type_name: &str) -> Result<UserTypeSchema, InternalError> {
        let entity = self.required_persistent_entity(type_name)?;

        self.resolve_user_type(entity.table_name())
    }

    pub fn entities(&self) -> impl Iterator<Item = &EntityModel> {
        self.entities.values()
    }
}

impl fmt::Debug for MappingContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MappingContext")
            .field("config", &self.config)
            .field("entities", &self.entities.keys().collect::<Vec<_>>())
            .field("user_types", &self.user_types.is_some())
            .finish()
    }
}

fn schema_from_entity(entity: &EntityModel) -> Result<UserTypeSchema, InternalError> {
    entity
        .properties()
        .iter()
        .try_fold(UserTypeSchema::new(entity.table_name().clone()), |schema, property| {
            Ok(schema.field(property.column_name()?.clone(), property.kind().clone()))
        })
}

///
/// MappingContextBuilder
///

#[derive(Default)]
pub struct MappingContextBuilder {
    config: MappingConfig,
    defs: Vec<EntityDef>,
    user_types: Option<Arc<dyn UserTypeResolver>>,
}

impl MappingContextBuilder {
    #[must_use]
    pub fn config(mut self, config: MappingConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn register(mut self, def: EntityDef) -> Self {
        self.defs.push(def);
        self
    }

    #[must_use]
    pub fn user_type_resolver(mut self, resolver: Arc<dyn UserTypeResolver>) -> Self {
        self.user_types = Some(resolver);
        self
    }

    /// Resolve names and columns for every registered type.
    pub fn build(self) -> Result<MappingContext, InternalError> {
        let Self {
            config,
            defs,
            user_types,
        } = self;

        let mut entities = HashMap::with_capacity(defs.len());
        for def in defs {
            let model = resolve_entity(def, &config)?;
            let type_name = model.type_name().to_string();

            if entities.insert(type_name.clone(), model).is_some() {
                return Err(InternalError::invalid_argument(
                    ErrorOrigin::Model,
                    format!("type '{type_name}' registered more than once"),
                ));
            }
        }

        // expand embedded properties into the columns of their nested type
        let names: Vec<String> = entities.keys().cloned().collect();
        for type_name in names {
            let expanded = expand_embedded(&entities, &type_name, 0)?;
            if let Some(entity) = entities.get_mut(&type_name) {
                entity.set_embedded_columns(expanded);
            }
        }

        debug!(entities = entities.len(), "mapping context built");

        Ok(MappingContext {
            config,
            entities,
            user_types,
        })
    }
}

fn resolve_entity(def: EntityDef, config: &MappingConfig) -> Result<EntityModel, InternalError> {
    let EntityDef {
        type_name,
        role,
        name,
        mut properties,
    } = def;

    let table = match name {
        Some(DeclaredName::CqlId(name)) => CqlIdentifier::cql_id(name)?,
        Some(DeclaredName::Quoted(name)) => CqlIdentifier::quoted(name)?,
        None => derive_identifier(config, &type_name)?,
    };

    for property in &mut properties {
        if matches!(property.kind(), DataKind::Embedded(_)) {
            continue;
        }

        let default_name = config.naming_strategy.column_name(property.name());
        let column = property.resolve_column(default_name, config.force_quote)?;
        property.set_columns(vec![column]);
    }

    Ok(EntityModel::new(type_name, role, table, properties))
}

fn derive_identifier(config: &MappingConfig, name: &str) -> Result<CqlIdentifier, InternalError> {
    let derived = config.naming_strategy.column_name(name);

    if config.force_quote {
        CqlIdentifier::quoted(derived)
    } else {
        CqlIdentifier::cql_id(derived)
    }
}

// Columns for each embedded property of `type_name`, by property position.
fn expand_embedded(
    entities: &HashMap<String, EntityModel>,
    type_name: &str,
    depth: usize,
) -> Result<Vec<(usize, Vec<CqlIdentifier>)>, InternalError> {
    if depth > MAX_EMBEDDING_DEPTH {
        return Err(InternalError::invalid_argument(
            ErrorOrigin::Model,
            format!("embedded type '{type_name}' nests too deeply or recursively"),
        ));
    }

    let entity = entities
        .get(type_name)
        .ok_or_else(|| InternalError::unmapped_type(type_name))?;

    let mut expanded = Vec::new();
    for (index, property) in entity.properties().iter().enumerate() {
        let Some(nested) = property.kind().embedded_type() else {
            continue;
        };

        let nested_entity = entities
            .get(nested)
            .ok_or_else(|| InternalError::unmapped_type(nested))?;
        let nested_expanded = expand_embedded(entities, nested, depth + 1)?;

        let mut columns = Vec::new();
        for (nested_index, nested_property) in nested_entity.properties().iter().enumerate() {
            match nested_expanded.iter().find(|(i, _)| *i == nested_index) {
                Some((_, deeper)) => columns.extend(deeper.iter().cloned()),
                None => columns.extend(nested_property.column_names().iter().cloned()),
            }
        }

        expanded.push((index, columns));
    }

    Ok(expanded)
}
