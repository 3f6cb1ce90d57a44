use crate::types::ColumnType;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TypeMappingError {
    #[error("Expected {expected} value, got {found}")]
    TypeMismatch {
        expected: ColumnType,
        found: String,
    },
    #[error("Value {value} is out of range for {column_type}")]
    OutOfRange {
        column_type: ColumnType,
        value: String,
    },
    #[error("Invalid {column_type} value '{value}': {message}")]
    Parse {
        column_type: ColumnType,
        value: String,
        message: String,
    },
    #[error("Expected a JSON object, got {0}")]
    NotAnObject(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
