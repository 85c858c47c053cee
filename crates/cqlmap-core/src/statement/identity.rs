use crate::{
    error::{ErrorOrigin, InternalError},
    model::{EntityModel, IdentityShape, MappingContext, PropertyModel},
    value::{ObjectValue, Value},
};

///
/// MapId
///
/// Identity given as key-property name to value. Input order is irrelevant;
/// values are aligned to the declared key properties.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct MapId(Vec<(String, Value)>);

impl MapId {
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Set a key value, replacing an earlier one with the same name.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        let name = name.into();
        let value = value.into();

        match self.0.iter_mut().find(|(key, _)| *key == name) {
            Some(slot) => slot.1 = value,
            None => self.0.push((name, value)),
        }

        self
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(key, _)| key.as_str())
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

///
/// Identity
///
/// Identity argument for by-id operations, with its shape explicit:
/// a single-column key, a composite key object, or a key map.
///

#[derive(Clone, Debug, PartialEq)]
pub enum Identity {
    Scalar(Value),
    Composite(ObjectValue),
    MapId(MapId),
}

impl Identity {
    #[must_use]
    pub fn scalar(value: impl Into<Value>) -> Self {
        Self::Scalar(value.into())
    }

    /// Extract the identity of an entity object.
    pub fn of(object: &ObjectValue, entity: &EntityModel) -> Result<Self, InternalError> {
        match entity.identity_shape() {
            IdentityShape::None => Err(no_identity(entity)),
            IdentityShape::Single(property) => Ok(Self::Scalar(
                object.get(property.name()).cloned().unwrap_or(Value::Null),
            )),
            IdentityShape::Composite(property) => match object.get(property.name()) {
                Some(Value::Object(key)) => Ok(Self::Composite(key.clone())),
                _ => Err(null_identity()),
            },
            IdentityShape::MapId(properties) => Ok(Self::MapId(properties.iter().fold(
                MapId::new(),
                |id, property| {
                    id.with(
                        property.name(),
                        object.get(property.name()).cloned().unwrap_or(Value::Null),
                    )
                },
            ))),
        }
    }
}

impl From<MapId> for Identity {
    fn from(id: MapId) -> Self {
        Self::MapId(id)
    }
}

impl From<ObjectValue> for Identity {
    fn from(key: ObjectValue) -> Self {
        Self::Composite(key)
    }
}

impl From<Value> for Identity {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(key) => Self::Composite(key),
            other => Self::Scalar(other),
        }
    }
}

/// Destructure an identity into one value per key property, in declared
/// key order. Every component must be present and non-null.
pub(crate) fn key_values<'a>(
    id: &Identity,
    entity: &'a EntityModel,
    ctx: &'a MappingContext,
) -> Result<Vec<(&'a PropertyModel, Value)>, InternalError> {
    let key_properties: Vec<&'a PropertyModel> = match entity.identity_shape() {
        IdentityShape::None => return Err(no_identity(entity)),
        IdentityShape::Single(property) => {
            return match id {
                Identity::Scalar(value) => Ok(vec![(property, non_null(value)?)]),
                Identity::MapId(map) => {
                    check_keys(map, &[property], entity)?;
                    Ok(vec![(property, required(map.get(property.name()), property)?)])
                }
                Identity::Composite(_) => Err(shape_mismatch(entity, "a single-column key")),
            };
        }
        IdentityShape::Composite(property) => ctx
            .embedded_entity(property)
            .ok_or_else(|| InternalError::unmapped_type(property.kind().embedded_type().unwrap_or_default()))?
            .properties()
            .iter()
            .collect(),
        IdentityShape::MapId(properties) => properties,
    };

    match id {
        Identity::Scalar(_) => Err(shape_mismatch(entity, "a composite key")),
        Identity::Composite(key) => key_properties
            .into_iter()
            .map(|property| Ok((property, required(key.get(property.name()), property)?)))
            .collect(),
        Identity::MapId(map) => {
            check_keys(map, &key_properties, entity)?;

            key_properties
                .into_iter()
                .map(|property| Ok((property, required(map.get(property.name()), property)?)))
                .collect()
        }
    }
}

fn check_keys(map: &MapId, properties: &[&PropertyModel], entity: &EntityModel) -> Result<(), InternalError> {
    if let Some(unknown) = map
        .keys()
        .find(|key| !properties.iter().any(|property| property.name() == *key))
    {
        return Err(InternalError::invalid_argument(
            ErrorOrigin::Statement,
            format!(
                "'{unknown}' is not an identity property of '{}'",
                entity.type_name()
            ),
        ));
    }

    Ok(())
}

fn required(value: Option<&Value>, property: &PropertyModel) -> Result<Value, InternalError> {
    match value {
        Some(value) => non_null(value),
        None => Err(InternalError::invalid_argument(
            ErrorOrigin::Statement,
            format!("identity value for '{}' is missing", property.name()),
        )),
    }
}

fn non_null(value: &Value) -> Result<Value, InternalError> {
    if value.is_null() {
        return Err(null_identity());
    }

    Ok(value.clone())
}

fn null_identity() -> InternalError {
    InternalError::invalid_argument(ErrorOrigin::Statement, "identity value must not be null")
}

fn no_identity(entity: &EntityModel) -> InternalError {
    InternalError::invalid_argument(
        ErrorOrigin::Statement,
        format!("type '{}' declares no identity", entity.type_name()),
    )
}

fn shape_mismatch(entity: &EntityModel, expected: &str) -> InternalError {
    InternalError::invalid_argument(
        ErrorOrigin::Statement,
        format!("identity of '{}' must be {expected}", entity.type_name()),
    )
}
