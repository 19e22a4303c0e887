use std::fmt;

#[derive(Debug, Clone)]
pub enum SchemaError {
    Parse(String),
    NotFound(String),
    InvalidField(String),
    InvalidDirective(String),
    InvalidIndex(String),
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SchemaError::Parse(msg) => write!(f, "Parse error: {}", msg),
            SchemaError::NotFound(msg) => write!(f, "Schema not found: {}", msg),
            SchemaError::InvalidField(msg) => write!(f, "Invalid field: {}", msg),
            SchemaError::InvalidDirective(msg) => write!(f, "Invalid directive: {}", msg),
            SchemaError::InvalidIndex(msg) => write!(f, "Invalid index: {}", msg),
        }
    }
}

impl std::error::Error for SchemaError {}
