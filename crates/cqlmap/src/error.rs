use cqlmap_core::{
    config::ConfigError,
    error::{ErrorClass, ErrorOrigin as CoreErrorOrigin, InternalError},
};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

///
/// Error
/// Public error type with a stable kind + origin taxonomy.
///

#[derive(Debug, Deserialize, Serialize, ThisError)]
#[error("{message}")]
pub struct Error {
    pub kind: ErrorKind,
    pub origin: ErrorOrigin,
    pub message: String,
}

impl Error {
    pub fn new(kind: ErrorKind, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            kind,
            origin,
            message: message.into(),
        }
    }
}

impl From<InternalError> for Error {
    fn from(err: InternalError) -> Self {
        let kind = match err.class {
            ErrorClass::InvalidArgument => ErrorKind::Query(QueryErrorKind::Invalid),
            ErrorClass::Unsupported => ErrorKind::Query(QueryErrorKind::Unsupported),
            ErrorClass::QueryCreation => ErrorKind::Query(QueryErrorKind::Creation {
                method: err.query_method().unwrap_or_default().to_string(),
            }),
            ErrorClass::PropertyResolution => ErrorKind::Mapping(MappingErrorKind::PropertyResolution),
            ErrorClass::NotFound => ErrorKind::Mapping(MappingErrorKind::NotFound),
            ErrorClass::Conversion => ErrorKind::Mapping(MappingErrorKind::Conversion),
            ErrorClass::Internal => ErrorKind::Internal,
        };

        Self::new(kind, err.origin.into(), err.message)
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        InternalError::from(err).into()
    }
}

///
/// ErrorKind
/// Public error taxonomy for callers.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum ErrorKind {
    Mapping(MappingErrorKind),
    Query(QueryErrorKind),

    /// The caller cannot remediate this.
    Internal,
}

///
/// MappingErrorKind
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum MappingErrorKind {
    /// Type is not mapped, or a required mapping is missing.
    NotFound,

    /// A property path did not resolve under strict resolution.
    PropertyResolution,

    /// A value could not be encoded to, or decoded from, its column type.
    Conversion,
}

///
/// QueryErrorKind
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum QueryErrorKind {
    /// Arguments or identities are malformed.
    Invalid,

    /// Valid request the store cannot express.
    Unsupported,

    /// A query method could not be turned into a statement.
    Creation { method: String },
}

///
/// ErrorOrigin
/// Public origin taxonomy for callers.
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
pub enum ErrorOrigin {
    Identifier,
    Model,
    Mapping,
    Derivation,
    Statement,
    Execution,
    Session,
    Config,
}

impl From<CoreErrorOrigin> for ErrorOrigin {
    fn from(origin: CoreErrorOrigin) -> Self {
        match origin {
            CoreErrorOrigin::Identifier => Self::Identifier,
            CoreErrorOrigin::Model => Self::Model,
            CoreErrorOrigin::Mapping => Self::Mapping,
            CoreErrorOrigin::Derivation => Self::Derivation,
            CoreErrorOrigin::Statement => Self::Statement,
            CoreErrorOrigin::Execution => Self::Execution,
            CoreErrorOrigin::Session => Self::Session,
            CoreErrorOrigin::Config => Self::Config,
        }
    }
}
