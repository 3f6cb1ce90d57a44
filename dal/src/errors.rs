use filter::FilterError;
use thiserror::Error;
use type_mapping::TypeMappingError;

#[derive(Error, Debug)]
pub enum DalError {
    #[error("Database error on {table} during {operation}: {source}")]
    Database {
        table: String,
        operation: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    #[error("Validation error on {entity}: {message}")]
    Validation { entity: String, message: String },

    #[error("Unknown field '{field}' on {entity}")]
    UnknownField { entity: String, field: String },

    #[error("Field '{field}' on {entity} is immutable")]
    ImmutableField { entity: String, field: String },

    #[error("Invalid value for field '{field}': {source}")]
    InvalidValue {
        field: String,
        #[source]
        source: TypeMappingError,
    },

    #[error("Filter error: {0}")]
    Filter(#[from] FilterError),

    #[error("Type mapping error: {0}")]
    TypeMapping(#[from] TypeMappingError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Operation requires an active transaction")]
    NotInTransaction,

    #[error("Transaction is no longer active")]
    TransactionInactive,
}

impl DalError {
    pub fn database_operation(table: &str, operation: &str, source: sqlx::Error) -> Self {
        Self::Database {
            table: table.to_string(),
            operation: operation.to_string(),
            source,
        }
    }

    pub fn not_found(entity: &str, id: impl ToString) -> Self {
        Self::NotFound {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }

    pub fn validation(entity: &str, message: impl Into<String>) -> Self {
        Self::Validation {
            entity: entity.to_string(),
            message: message.into(),
        }
    }

    pub fn unknown_field(entity: &str, field: &str) -> Self {
        Self::UnknownField {
            entity: entity.to_string(),
            field: field.to_string(),
        }
    }

    pub fn immutable_field(entity: &str, field: &str) -> Self {
        Self::ImmutableField {
            entity: entity.to_string(),
            field: field.to_string(),
        }
    }

    pub fn invalid_value(field: &str, source: TypeMappingError) -> Self {
        Self::InvalidValue {
            field: field.to_string(),
            source,
        }
    }

    /// Attach table and operation context to raw driver errors
    pub fn in_operation(self, table: &str, operation: &str) -> Self {
        match self {
            Self::Sqlx(source) => Self::database_operation(table, operation, source),
            other => other,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Errors caused by the caller's input rather than the database
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. }
                | Self::UnknownField { .. }
                | Self::ImmutableField { .. }
                | Self::InvalidValue { .. }
                | Self::Filter(_)
                | Self::TypeMapping(_)
        )
    }
}
