use crate::value::Value;

///
/// DataKind
///
/// Declared type of a persistent property, aligned with `Value` variants.
/// `Udt` and `Embedded` name another registered type.
///

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum DataKind {
    // Scalars
    Bool,
    Int,
    BigInt,
    Varint,
    Float,
    Double,
    Text,
    Blob,
    Uuid,
    Date,
    Timestamp,
    /// Enum stored by variant name.
    Enum,

    // Collections
    List(Box<Self>),
    Set(Box<Self>),
    Map {
        key: Box<Self>,
        value: Box<Self>,
    },
    Tuple(Vec<Self>),

    /// Structured value stored as a user-defined type; names the mapped type.
    Udt(String),

    /// Embedded type whose properties are flattened into the owning table
    /// (composite primary key classes); names the mapped type.
    Embedded(String),

    /// Domain type stored through a registered custom conversion; names
    /// the domain type.
    Custom(String),

    /// No declared type information.
    Unknown,
}

impl DataKind {
    #[must_use]
    pub fn list(element: Self) -> Self {
        Self::List(Box::new(element))
    }

    #[must_use]
    pub fn set(element: Self) -> Self {
        Self::Set(Box::new(element))
    }

    #[must_use]
    pub fn map(key: Self, value: Self) -> Self {
        Self::Map {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    #[must_use]
    pub fn udt(type_name: impl Into<String>) -> Self {
        Self::Udt(type_name.into())
    }

    #[must_use]
    pub fn embedded(type_name: impl Into<String>) -> Self {
        Self::Embedded(type_name.into())
    }

    #[must_use]
    pub fn custom(type_name: impl Into<String>) -> Self {
        Self::Custom(type_name.into())
    }

    /// True for list, set and map kinds.
    #[must_use]
    pub const fn is_collection(&self) -> bool {
        matches!(self, Self::List(_) | Self::Set(_) | Self::Map { .. })
    }

    /// Element kind for list and set kinds; value kind for maps.
    #[must_use]
    pub fn element(&self) -> Option<&Self> {
        match self {
            Self::List(element) | Self::Set(element) => Some(element),
            Self::Map { value, .. } => Some(value),
            _ => None,
        }
    }

    /// Key kind for map kinds.
    #[must_use]
    pub fn map_key(&self) -> Option<&Self> {
        match self {
            Self::Map { key, .. } => Some(key),
            _ => None,
        }
    }

    /// Name of the embedded type a property path may traverse into.
    #[must_use]
    pub fn embedded_type(&self) -> Option<&str> {
        match self {
            Self::Embedded(name) => Some(name),
            _ => None,
        }
    }

    /// Name of the mapped type stored as a user-defined type.
    #[must_use]
    pub fn udt_type(&self) -> Option<&str> {
        match self {
            Self::Udt(name) => Some(name),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_text(&self) -> bool {
        matches!(self, Self::Text)
    }

    /// Best-effort kind of a runtime value, used when no property declares one.
    #[must_use]
    pub fn of_value(value: &Value) -> Self {
        match value {
            Value::Null => Self::Unknown,
            Value::Bool(_) => Self::Bool,
            Value::Int(_) => Self::Int,
            Value::BigInt(_) => Self::BigInt,
            Value::Varint(_) => Self::Varint,
            Value::Float(_) => Self::Float,
            Value::Double(_) => Self::Double,
            Value::Text(_) => Self::Text,
            Value::Blob(_) => Self::Blob,
            Value::Uuid(_) => Self::Uuid,
            Value::Date(_) => Self::Date,
            Value::Timestamp(_) => Self::Timestamp,
            Value::Enum(_) => Self::Enum,
            Value::List(values) => Self::list(first_kind(values)),
            Value::Set(values) => Self::set(first_kind(values)),
            Value::Map(entries) => entries.first().map_or_else(
                || Self::map(Self::Unknown, Self::Unknown),
                |(key, value)| Self::map(Self::of_value(key), Self::of_value(value)),
            ),
            Value::Tuple(values) => Self::Tuple(values.iter().map(Self::of_value).collect()),
            Value::Object(object) => Self::Udt(object.type_name().to_string()),
            Value::Udt(udt) => Self::Udt(udt.type_name().to_string()),
        }
    }
}

fn first_kind(values: &[Value]) -> DataKind {
    values.first().map_or(DataKind::Unknown, DataKind::of_value)
}
