use crate::operator::Operator;
use crate::validation::ValidationError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FilterError {
    #[error("Operator {operator} expects {expected} value(s), got {actual}")]
    InvalidArity {
        operator: Operator,
        expected: String,
        actual: usize,
    },
    #[error("Operator {operator} is not supported for {value_type} values")]
    UnsupportedOperator {
        operator: Operator,
        value_type: &'static str,
    },
    #[error("Operator {operator} does not accept null values")]
    NullValue { operator: Operator },
    #[error("Filter value {0} is not a finite number")]
    NonFiniteNumber(f64),
    #[error("Unknown operator: {0}")]
    UnknownOperator(String),
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(#[from] ValidationError),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
