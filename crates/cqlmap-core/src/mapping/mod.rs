//! Property-path resolution, value conversion and query mapping.

pub mod conversions;
pub mod convert;
pub mod field;
pub mod path;
pub mod query_mapper;

#[cfg(test)]
mod tests;

pub use conversions::{ConversionFn, CustomConversions};
pub use convert::{Converter, MappingConverter, TypeHint};
pub use field::Field;
pub use path::{PropertyPath, PropertyReferenceError};
pub use query_mapper::QueryMapper;
