mod compare;
mod render;


use num_bigint::BigInt;
use std::cmp::Ordering;
use time::Date;
use uuid::Uuid;

pub use compare::canonical_cmp;

///
/// Value
///
/// Dynamic value flowing between domain objects and the store.
///
/// `Object` and `Enum` are domain-side shapes; the converter encodes them to
/// `Udt` and `Text` before they reach a statement. Every other variant is a
/// store-native value.
///

#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i32),
    BigInt(i64),
    Varint(BigInt),
    Float(f32),
    Double(f64),
    Text(String),
    Blob(Vec<u8>),
    Uuid(Uuid),
    Date(Date),
    /// Milliseconds since the Unix epoch.
    Timestamp(i64),
    /// Enum variant name.
    Enum(String),
    /// Ordered list; duplicates allowed.
    List(Vec<Self>),
    /// Canonically ordered, duplicate-free set. Build through [`Value::set`].
    Set(Vec<Self>),
    Map(Vec<(Self, Self)>),
    Object(ObjectValue),
    Udt(UdtValue),
    Tuple(Vec<Self>),
}

impl Value {
    /// Build a set value; members are sorted canonically and deduplicated.
    #[must_use]
    pub fn set(values: impl IntoIterator<Item = Self>) -> Self {
        let mut values: Vec<Self> = values.into_iter().collect();
        values.sort_by(canonical_cmp);
        values.dedup_by(|a, b| canonical_cmp(a, b) == Ordering::Equal);

        Self::Set(values)
    }

    #[must_use]
    pub fn list(values: impl IntoIterator<Item = Self>) -> Self {
        Self::List(values.into_iter().collect())
    }

    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// True for list, set and map values.
    #[must_use]
    pub const fn is_collection(&self) -> bool {
        matches!(self, Self::List(_) | Self::Set(_) | Self::Map(_))
    }

    /// True for values that can only exist on the domain side.
    #[must_use]
    pub const fn is_domain_only(&self) -> bool {
        matches!(self, Self::Object(_) | Self::Enum(_))
    }

    /// Elements of a list, set or tuple value.
    #[must_use]
    pub fn elements(&self) -> Option<&[Self]> {
        match self {
            Self::List(values) | Self::Set(values) | Self::Tuple(values) => Some(values),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_object(&self) -> Option<&ObjectValue> {
        match self {
            Self::Object(object) => Some(object),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) | Self::Enum(text) => Some(text),
            _ => None,
        }
    }

    /// Integral view used by count and limit results.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(i64::from(*v)),
            Self::BigInt(v) | Self::Timestamp(v) => Some(*v),
            Self::Varint(v) => i64::try_from(v).ok(),
            _ => None,
        }
    }

    /// Render the value as an inline CQL literal.
    #[must_use]
    pub fn to_cql_literal(&self) -> String {
        self.to_string()
    }
}

///
/// ObjectValue
///
/// Domain-side structured value: a named type with ordered fields addressed
/// by property name.
///

#[derive(Clone, Debug, PartialEq)]
pub struct ObjectValue {
    type_name: String,
    fields: Vec<(String, Value)>,
}

impl ObjectValue {
    #[must_use]
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: Vec::new(),
        }
    }

    /// Set a field, replacing an existing one with the same name.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();

        match self.fields.iter_mut().find(|(field, _)| *field == name) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((name, value)),
        }
    }

    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }

    #[must_use]
    pub fn fields(&self) -> &[(String, Value)] {
        &self.fields
    }

    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Object(self)
    }
}

///
/// UdtValue
///
/// Store-native user-defined type value. Field names are column identifiers
/// rendered as declared by the user type schema.
///

#[derive(Clone, Debug, PartialEq)]
pub struct UdtValue {
    type_name: String,
    fields: Vec<(String, Value)>,
}

impl UdtValue {
    #[must_use]
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: Vec::new(),
        }
    }

    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.push((field.into(), value.into()));
        self
    }

    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value)
    }

    #[must_use]
    pub fn fields(&self) -> &[(String, Value)] {
        &self.fields
    }
}

// ----------------------------------------------------------------------
// Conversions
// ----------------------------------------------------------------------

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Int(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::BigInt(value)
    }
}

impl From<BigInt> for Value {
    fn from(value: BigInt) -> Self {
        Self::Varint(value)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Self::Float(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Double(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Self::Blob(value)
    }
}

impl From<Uuid> for Value {
    fn from(value: Uuid) -> Self {
        Self::Uuid(value)
    }
}

impl From<Date> for Value {
    fn from(value: Date) -> Self {
        Self::Date(value)
    }
}

impl From<ObjectValue> for Value {
    fn from(value: ObjectValue) -> Self {
        Self::Object(value)
    }
}

impl From<UdtValue> for Value {
    fn from(value: UdtValue) -> Self {
        Self::Udt(value)
    }
}

impl From<Vec<Self>> for Value {
    fn from(values: Vec<Self>) -> Self {
        Self::List(values)
    }
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}
