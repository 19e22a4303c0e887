use crate::query::cursor::CursorError;
use crate::schema::types::SchemaError;
use std::fmt;

/// Unified error type for the entire crate.
///
/// This error type centralizes all possible errors that can occur in
/// the compiler and the query engine, providing a consistent interface
/// for error handling and propagation.
///
/// Each variant represents a specific category of errors, with
/// associated context to help with debugging and error reporting.
#[derive(Debug)]
pub enum DataGraphError {
    /// Errors raised while compiling a schema document
    Schema(SchemaError),

    /// Errors related to compiler or query configuration
    Config(String),

    /// Errors raised by pipeline stages rejecting a value
    Validation(String),

    /// Errors related to pagination cursor decoding
    Cursor(CursorError),

    /// Errors related to serialization/deserialization
    Serialization(String),

    /// Other errors that don't fit into the above categories
    Other(String),
}

impl fmt::Display for DataGraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Schema(err) => write!(f, "Schema error: {}", err),
            Self::Config(msg) => write!(f, "Configuration error: {}", msg),
            Self::Validation(msg) => write!(f, "Validation error: {}", msg),
            Self::Cursor(err) => write!(f, "Cursor error: {}", err),
            Self::Serialization(msg) => write!(f, "Serialization error: {}", msg),
            Self::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for DataGraphError {}

/// Conversion from SchemaError to DataGraphError
impl From<SchemaError> for DataGraphError {
    fn from(error: SchemaError) -> Self {
        DataGraphError::Schema(error)
    }
}

/// Conversion from CursorError to DataGraphError
impl From<CursorError> for DataGraphError {
    fn from(error: CursorError) -> Self {
        DataGraphError::Cursor(error)
    }
}

/// Conversion from serde_json::Error to DataGraphError
impl From<serde_json::Error> for DataGraphError {
    fn from(error: serde_json::Error) -> Self {
        DataGraphError::Serialization(error.to_string())
    }
}

/// Result type alias for operations that can result in a DataGraphError
pub type DataGraphResult<T> = Result<T, DataGraphError>;
