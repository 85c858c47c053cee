use crate::{
    cql::CqlIdentifier,
    error::InternalError,
    mapping::conversions::CustomConversions,
    model::{DataKind, EntityModel, EntityRole, MappingContext, PropertyModel},
    session::Row,
    value::{ObjectValue, UdtValue, Value},
};
use num_bigint::BigInt;
use std::sync::Arc;

///
/// TypeHint
///
/// Declared type guiding value conversion. `Unknown` converts by the
/// runtime shape of the value alone.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TypeHint {
    Kind(DataKind),
    Unknown,
}

impl TypeHint {
    #[must_use]
    pub fn of_property(property: &PropertyModel) -> Self {
        Self::Kind(property.kind().clone())
    }

    /// Hint from the runtime kind of `value`.
    #[must_use]
    pub fn of_value(value: &Value) -> Self {
        match DataKind::of_value(value) {
            DataKind::Unknown => Self::Unknown,
            kind => Self::Kind(kind),
        }
    }

    #[must_use]
    pub const fn kind(&self) -> Option<&DataKind> {
        match self {
            Self::Kind(kind) => Some(kind),
            Self::Unknown => None,
        }
    }

    // Hint for members of a collection value.
    fn element(&self) -> Self {
        self.kind()
            .and_then(DataKind::element)
            .map_or(Self::Unknown, |kind| Self::Kind(kind.clone()))
    }

    fn map_key(&self) -> Self {
        self.kind()
            .and_then(DataKind::map_key)
            .map_or(Self::Unknown, |kind| Self::Kind(kind.clone()))
    }

    fn tuple_element(&self, index: usize) -> Self {
        match self.kind() {
            Some(DataKind::Tuple(kinds)) => kinds
                .get(index)
                .map_or(Self::Unknown, |kind| Self::Kind(kind.clone())),
            _ => Self::Unknown,
        }
    }
}

///
/// Converter
///
/// Translates between domain values and store-encoded column values, and
/// between entity objects and rows.
///

pub trait Converter: Send + Sync {
    fn mapping_context(&self) -> &MappingContext;

    /// Encode a domain value for use in a statement.
    fn convert_to_column_value(&self, value: &Value, hint: &TypeHint) -> Result<Value, InternalError>;

    /// Decode a store value into its domain representation.
    fn read_value(&self, value: &Value, hint: &TypeHint) -> Result<Value, InternalError>;

    /// Materialize an entity object from a row.
    fn read(&self, entity: &EntityModel, row: &Row) -> Result<Value, InternalError>;

    /// Flatten an entity object into ordered encoded column values.
    fn write(
        &self,
        object: &Value,
        entity: &EntityModel,
    ) -> Result<Vec<(CqlIdentifier, Value)>, InternalError>;
}

///
/// MappingConverter
/// Default converter backed by the mapping context.
///

#[derive(Clone, Debug)]
pub struct MappingConverter {
    context: Arc<MappingContext>,
    conversions: CustomConversions,
}

impl MappingConverter {
    #[must_use]
    pub fn new(context: Arc<MappingContext>) -> Self {
        Self {
            context,
            conversions: CustomConversions::new(),
        }
    }

    /// Use `conversions` ahead of the default conversion rules.
    #[must_use]
    pub fn with_conversions(mut self, conversions: CustomConversions) -> Self {
        self.conversions = conversions;
        self
    }

    #[must_use]
    pub fn context(&self) -> Arc<MappingContext> {
        Arc::clone(&self.context)
    }

    #[must_use]
    pub const fn conversions(&self) -> &CustomConversions {
        &self.conversions
    }

    // Registered write conversion for a declared custom kind or an object
    // of a registered type; `None` falls through to the default rules.
    fn write_custom(&self, value: &Value, hint: &TypeHint) -> Result<Option<Value>, InternalError> {
        let type_name = match (value, hint.kind()) {
            (Value::Null, _) => return Ok(None),
            (_, Some(DataKind::Custom(type_name))) => type_name.as_str(),
            (Value::Object(object), _) => object.type_name(),
            _ => return Ok(None),
        };
        let Some(convert) = self.conversions.writer(type_name) else {
            return Ok(None);
        };

        let stored = convert(value)?;
        if stored.is_domain_only() {
            return Err(InternalError::conversion(format!(
                "write conversion for '{type_name}' must produce a store value, found {}",
                stored.to_cql_literal()
            )));
        }

        Ok(Some(stored))
    }

    fn encode_object(&self, object: &ObjectValue, hint: &TypeHint) -> Result<Value, InternalError> {
        let type_name = match hint.kind() {
            Some(DataKind::Udt(type_name)) => type_name.as_str(),
            Some(DataKind::Unknown) | None => object.type_name(),
            Some(DataKind::Custom(type_name)) => {
                return Err(InternalError::conversion(format!(
                    "no write conversion registered for '{type_name}'"
                )));
            }
            Some(kind) => {
                return Err(InternalError::conversion(format!(
                    "cannot convert object of type '{}' to {kind:?}",
                    object.type_name()
                )));
            }
        };

        let entity = self.context.required_persistent_entity(type_name)?;
        if entity.role() != EntityRole::UserType {
            return Err(InternalError::conversion(format!(
                "type '{type_name}' is not mapped as a user type"
            )));
        }

        self.encode_udt(object, entity)
    }

    fn encode_udt(&self, object: &ObjectValue, entity: &EntityModel) -> Result<Value, InternalError> {
        let schema = self.context.resolve_user_type(entity.table_name())?;

        for property in entity.properties() {
            let column = property.column_name()?;
            if schema.field_kind(column).is_none() && object.get(property.name()).is_some() {
                return Err(InternalError::conversion(format!(
                    "user type '{}' has no field '{column}'",
                    schema.name()
                )));
            }
        }

        let mut udt = UdtValue::new(schema.name().to_cql());
        for (field, kind) in schema.fields() {
            let property = entity
                .properties()
                .iter()
                .find(|p| p.column_names().first() == Some(field));

            let value = match property.and_then(|p| object.get(p.name())) {
                Some(value) => self.convert_to_column_value(value, &TypeHint::Kind(kind.clone()))?,
                None => Value::Null,
            };
            udt = udt.with(field.to_cql(), value);
        }

        Ok(Value::Udt(udt))
    }

    fn decode_udt(&self, udt: &UdtValue, type_name: &str) -> Result<Value, InternalError> {
        let entity = self.context.required_persistent_entity(type_name)?;

        let mut object = ObjectValue::new(entity.type_name());
        for property in entity.properties() {
            let column = property.column_name()?.to_cql();
            if let Some(value) = udt.get(&column) {
                object.set(
                    property.name(),
                    self.read_value(value, &TypeHint::of_property(property))?,
                );
            }
        }

        Ok(Value::Object(object))
    }

    fn read_embedded(&self, property: &PropertyModel, row: &Row) -> Result<Value, InternalError> {
        let nested = self.context.embedded_entity(property).ok_or_else(|| {
            InternalError::conversion(format!(
                "embedded type of property '{}' is not mapped",
                property.name()
            ))
        })?;

        self.read(nested, row)
    }

    fn write_into(
        &self,
        object: &ObjectValue,
        entity: &EntityModel,
        out: &mut Vec<(CqlIdentifier, Value)>,
    ) -> Result<(), InternalError> {
        for property in entity.properties() {
            let value = object.get(property.name()).unwrap_or(&Value::Null);

            if let Some(nested) = self.context.embedded_entity(property) {
                match value {
                    Value::Object(inner) => self.write_into(inner, nested, out)?,
                    Value::Null => out.extend(
                        property
                            .column_names()
                            .iter()
                            .map(|column| (column.clone(), Value::Null)),
                    ),
                    other => {
                        return Err(InternalError::conversion(format!(
                            "embedded property '{}' expects an object, found {}",
                            property.name(),
                            other.to_cql_literal()
                        )));
                    }
                }
                continue;
            }

            let encoded = self.convert_to_column_value(value, &TypeHint::of_property(property))?;
            out.push((property.column_name()?.clone(), encoded));
        }

        Ok(())
    }
}

impl Converter for MappingConverter {
    fn mapping_context(&self) -> &MappingContext {
        &self.context
    }

    fn convert_to_column_value(&self, value: &Value, hint: &TypeHint) -> Result<Value, InternalError> {
        if let Some(stored) = self.write_custom(value, hint)? {
            return Ok(stored);
        }

        let kind = hint.kind();

        let converted = match value {
            Value::Null => Value::Null,
            Value::Enum(name) => Value::Text(name.clone()),
            Value::Object(object) => self.encode_object(object, hint)?,
            Value::List(values) => {
                let element = hint.element();
                Value::List(
                    values
                        .iter()
                        .map(|v| self.convert_to_column_value(v, &element))
                        .collect::<Result<_, _>>()?,
                )
            }
            Value::Set(values) => {
                let element = hint.element();
                Value::set(
                    values
                        .iter()
                        .map(|v| self.convert_to_column_value(v, &element))
                        .collect::<Result<Vec<_>, _>>()?,
                )
            }
            Value::Map(entries) => {
                let (key_hint, value_hint) = (hint.map_key(), hint.element());
                Value::Map(
                    entries
                        .iter()
                        .map(|(k, v)| {
                            Ok((
                                self.convert_to_column_value(k, &key_hint)?,
                                self.convert_to_column_value(v, &value_hint)?,
                            ))
                        })
                        .collect::<Result<_, InternalError>>()?,
                )
            }
            Value::Tuple(values) => Value::Tuple(
                values
                    .iter()
                    .enumerate()
                    .map(|(i, v)| self.convert_to_column_value(v, &hint.tuple_element(i)))
                    .collect::<Result<_, _>>()?,
            ),
            Value::Int(v) => match kind {
                Some(DataKind::BigInt) => Value::BigInt(i64::from(*v)),
                Some(DataKind::Varint) => Value::Varint(BigInt::from(*v)),
                Some(DataKind::Double) => Value::Double(f64::from(*v)),
                Some(DataKind::Timestamp) => Value::Timestamp(i64::from(*v)),
                _ => value.clone(),
            },
            Value::BigInt(v) => match kind {
                Some(DataKind::Int) => Value::Int(i32::try_from(*v).map_err(|_| {
                    InternalError::conversion(format!("value {v} out of range for int column"))
                })?),
                Some(DataKind::Varint) => Value::Varint(BigInt::from(*v)),
                Some(DataKind::Timestamp) => Value::Timestamp(*v),
                _ => value.clone(),
            },
            Value::Float(v) => match kind {
                Some(DataKind::Double) => Value::Double(f64::from(*v)),
                _ => value.clone(),
            },
            _ => value.clone(),
        };

        Ok(converted)
    }

    fn read_value(&self, value: &Value, hint: &TypeHint) -> Result<Value, InternalError> {
        if !value.is_null()
            && let Some(DataKind::Custom(type_name)) = hint.kind()
            && let Some(convert) = self.conversions.reader(type_name)
        {
            return convert(value);
        }

        let kind = hint.kind();

        let read = match (value, kind) {
            (Value::Null, _) => Value::Null,
            (Value::Text(name), Some(DataKind::Enum)) => Value::Enum(name.clone()),
            (Value::Udt(udt), Some(DataKind::Udt(type_name))) => self.decode_udt(udt, type_name)?,
            (Value::BigInt(v), Some(DataKind::Int)) => match i32::try_from(*v) {
                Ok(v) => Value::Int(v),
                Err(_) => value.clone(),
            },
            (Value::List(values), _) => {
                let element = hint.element();
                Value::List(
                    values
                        .iter()
                        .map(|v| self.read_value(v, &element))
                        .collect::<Result<_, _>>()?,
                )
            }
            (Value::Set(values), _) => {
                let element = hint.element();
                Value::set(
                    values
                        .iter()
                        .map(|v| self.read_value(v, &element))
                        .collect::<Result<Vec<_>, _>>()?,
                )
            }
            (Value::Map(entries), _) => {
                let (key_hint, value_hint) = (hint.map_key(), hint.element());
                Value::Map(
                    entries
                        .iter()
                        .map(|(k, v)| Ok((self.read_value(k, &key_hint)?, self.read_value(v, &value_hint)?)))
                        .collect::<Result<_, InternalError>>()?,
                )
            }
            (Value::Tuple(values), _) => Value::Tuple(
                values
                    .iter()
                    .enumerate()
                    .map(|(i, v)| self.read_value(v, &hint.tuple_element(i)))
                    .collect::<Result<_, _>>()?,
            ),
            _ => value.clone(),
        };

        Ok(read)
    }

    fn read(&self, entity: &EntityModel, row: &Row) -> Result<Value, InternalError> {
        let mut object = ObjectValue::new(entity.type_name());

        for property in entity.properties() {
            if property.kind().embedded_type().is_some() {
                object.set(property.name(), self.read_embedded(property, row)?);
                continue;
            }

            let column = property.column_name()?;
            if let Some(value) = row.get(column.as_str()) {
                object.set(
                    property.name(),
                    self.read_value(value, &TypeHint::of_property(property))?,
                );
            }
        }

        Ok(Value::Object(object))
    }

    fn write(
        &self,
        object: &Value,
        entity: &EntityModel,
    ) -> Result<Vec<(CqlIdentifier, Value)>, InternalError> {
        let Value::Object(object) = object else {
            return Err(InternalError::conversion(format!(
                "cannot write {} as entity '{}'",
                object.to_cql_literal(),
                entity.type_name()
            )));
        };

        let mut out = Vec::with_capacity(entity.properties().len());
        self.write_into(object, entity, &mut out)?;

        Ok(out)
    }
}
