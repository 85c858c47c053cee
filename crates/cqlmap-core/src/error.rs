use std::fmt;
use thiserror::Error as ThisError;

///
/// InternalError
///
/// Structured runtime error with a stable internal classification.
/// Not a stable API; intended for internal use and may change without notice.
///

#[derive(Debug, ThisError)]
#[error("{message}")]
pub struct InternalError {
    pub class: ErrorClass,
    pub origin: ErrorOrigin,
    pub message: String,

    /// Optional structured error detail.
    pub detail: Option<ErrorDetail>,
}

impl InternalError {
    pub fn new(class: ErrorClass, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            class,
            origin,
            message: message.into(),
            detail: None,
        }
    }

    /// Construct an invalid-argument error for a specific origin.
    pub(crate) fn invalid_argument(origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self::new(ErrorClass::InvalidArgument, origin, message)
    }

    /// Construct an unsupported-feature error for a specific origin.
    pub(crate) fn unsupported(origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Unsupported, origin, message)
    }

    /// Construct a mapping-origin conversion error.
    pub(crate) fn conversion(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Conversion, ErrorOrigin::Mapping, message)
    }

    /// Construct a model-origin not-found error for an unmapped type.
    pub(crate) fn unmapped_type(type_name: &str) -> Self {
        Self::new(
            ErrorClass::NotFound,
            ErrorOrigin::Model,
            format!("no persistent entity registered for type '{type_name}'"),
        )
    }

    /// Construct a derivation-origin query-creation error without a cause.
    pub(crate) fn derivation(method: impl Into<String>, message: impl Into<String>) -> Self {
        let method = method.into();
        let message = message.into();

        Self {
            class: ErrorClass::QueryCreation,
            origin: ErrorOrigin::Derivation,
            message: format!("could not create query for method '{method}': {message}"),
            detail: Some(ErrorDetail::QueryCreation {
                method,
                cause: None,
            }),
        }
    }

    /// Wrap a failure raised while building a statement for a query method.
    ///
    /// Errors that already carry query-creation detail are returned unchanged
    /// so the innermost method stays attached.
    #[must_use]
    pub fn query_creation(method: impl Into<String>, cause: Self) -> Self {
        if cause.is_query_creation() {
            return cause;
        }

        let method = method.into();

        Self {
            class: ErrorClass::QueryCreation,
            origin: ErrorOrigin::Derivation,
            message: format!("could not create query for method '{method}': {cause}"),
            detail: Some(ErrorDetail::QueryCreation {
                method,
                cause: Some(Box::new(cause)),
            }),
        }
    }

    #[must_use]
    pub const fn is_query_creation(&self) -> bool {
        matches!(self.class, ErrorClass::QueryCreation)
    }

    /// Name of the query method this error was raised for, if any.
    #[must_use]
    pub fn query_method(&self) -> Option<&str> {
        match &self.detail {
            Some(ErrorDetail::QueryCreation { method, .. }) => Some(method),
            None => None,
        }
    }

    /// Class of the wrapped cause for query-creation errors, else own class.
    #[must_use]
    pub fn root_class(&self) -> ErrorClass {
        match &self.detail {
            Some(ErrorDetail::QueryCreation {
                cause: Some(cause), ..
            }) => cause.root_class(),
            _ => self.class,
        }
    }

    #[must_use]
    pub fn display_with_class(&self) -> String {
        format!("{}:{}: {}", self.origin, self.class, self.message)
    }
}

///
/// ErrorDetail
///
/// Structured, class-specific error detail carried by [`InternalError`].
///

#[derive(Debug, ThisError)]
pub enum ErrorDetail {
    #[error("query method '{method}'")]
    QueryCreation {
        method: String,
        cause: Option<Box<InternalError>>,
    },
}

///
/// ErrorClass
/// Internal error taxonomy for runtime classification.
/// Not a stable API; may change without notice.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    InvalidArgument,
    PropertyResolution,
    QueryCreation,
    Unsupported,
    NotFound,
    Conversion,
    Internal,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::InvalidArgument => "invalid_argument",
            Self::PropertyResolution => "property_resolution",
            Self::QueryCreation => "query_creation",
            Self::Unsupported => "unsupported",
            Self::NotFound => "not_found",
            Self::Conversion => "conversion",
            Self::Internal => "internal",
        };
        write!(f, "{label}")
    }
}

///
/// ErrorOrigin
/// Internal origin taxonomy for runtime classification.
/// Not a stable API; may change without notice.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
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

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Identifier => "identifier",
            Self::Model => "model",
            Self::Mapping => "mapping",
            Self::Derivation => "derivation",
            Self::Statement => "statement",
            Self::Execution => "execution",
            Self::Session => "session",
            Self::Config => "config",
        };
        write!(f, "{label}")
    }
}
