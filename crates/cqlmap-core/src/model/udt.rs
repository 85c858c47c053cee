use crate::{cql::CqlIdentifier, model::DataKind};
use std::collections::HashMap;

///
/// UserTypeSchema
///
/// Store-side definition of a user-defined type: its name and ordered
/// fields. Field order is the order values are encoded in.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UserTypeSchema {
    name: CqlIdentifier,
    fields: Vec<(CqlIdentifier, DataKind)>,
}

impl UserTypeSchema {
    #[must_use]
    pub const fn new(name: CqlIdentifier) -> Self {
        Self {
            name,
            fields: Vec::new(),
        }
    }

    #[must_use]
    pub fn field(mut self, name: CqlIdentifier, kind: DataKind) -> Self {
        self.fields.push((name, kind));
        self
    }

    #[must_use]
    pub const fn name(&self) -> &CqlIdentifier {
        &self.name
    }

    #[must_use]
    pub fn fields(&self) -> &[(CqlIdentifier, DataKind)] {
        &self.fields
    }

    #[must_use]
    pub fn field_kind(&self, name: &CqlIdentifier) -> Option<&DataKind> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, kind)| kind)
    }
}

///
/// UserTypeResolver
///
/// Looks up user type definitions by name, typically from the keyspace
/// metadata of a live session.
///

pub trait UserTypeResolver: Send + Sync {
    fn resolve_type(&self, name: &CqlIdentifier) -> Option<UserTypeSchema>;
}

///
/// SimpleUserTypeResolver
/// In-memory resolver over explicitly registered schemas.
///

#[derive(Clone, Debug, Default)]
pub struct SimpleUserTypeResolver {
    types: HashMap<CqlIdentifier, UserTypeSchema>,
}

impl SimpleUserTypeResolver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, schema: UserTypeSchema) -> Self {
        self.types.insert(schema.name().clone(), schema);
        self
    }
}

impl UserTypeResolver for SimpleUserTypeResolver {
    fn resolve_type(&self, name: &CqlIdentifier) -> Option<UserTypeSchema> {
        self.types.get(name).cloned()
    }
}
