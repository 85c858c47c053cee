use crate::{error::InternalError, value::Value};
use std::{collections::BTreeMap, fmt, sync::Arc};

/// Conversion callback for one direction.
pub type ConversionFn = Arc<dyn Fn(&Value) -> Result<Value, InternalError> + Send + Sync>;

///
/// CustomConversions
///
/// User conversions between a domain type and its stored form, keyed by
/// domain type name. A write conversion must produce a store-native value;
/// a read conversion turns that value back into the domain shape. Either
/// direction may be registered alone, in which case the other direction
/// uses the default conversion.
///

#[derive(Clone, Default)]
pub struct CustomConversions {
    writers: BTreeMap<String, ConversionFn>,
    readers: BTreeMap<String, ConversionFn>,
}

impl CustomConversions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the domain-to-store conversion for `type_name`.
    #[must_use]
    pub fn writing<F>(mut self, type_name: impl Into<String>, convert: F) -> Self
    where
        F: Fn(&Value) -> Result<Value, InternalError> + Send + Sync + 'static,
    {
        self.writers.insert(type_name.into(), Arc::new(convert));
        self
    }

    /// Register the store-to-domain conversion for `type_name`.
    #[must_use]
    pub fn reading<F>(mut self, type_name: impl Into<String>, convert: F) -> Self
    where
        F: Fn(&Value) -> Result<Value, InternalError> + Send + Sync + 'static,
    {
        self.readers.insert(type_name.into(), Arc::new(convert));
        self
    }

    #[must_use]
    pub fn has_write_conversion(&self, type_name: &str) -> bool {
        self.writers.contains_key(type_name)
    }

    #[must_use]
    pub fn has_read_conversion(&self, type_name: &str) -> bool {
        self.readers.contains_key(type_name)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.writers.is_empty() && self.readers.is_empty()
    }

    pub(crate) fn writer(&self, type_name: &str) -> Option<&ConversionFn> {
        self.writers.get(type_name)
    }

    pub(crate) fn reader(&self, type_name: &str) -> Option<&ConversionFn> {
        self.readers.get(type_name)
    }
}

impl fmt::Debug for CustomConversions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomConversions")
            .field("writers", &self.writers.keys().collect::<Vec<_>>())
            .field("readers", &self.readers.keys().collect::<Vec<_>>())
            .finish()
    }
}
