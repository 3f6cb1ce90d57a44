//! Type mapping definitions
//!
//! This module provides the PostgreSQL column types understood by the DAL
//! and the runtime values bound to them.

use crate::errors::TypeMappingError;
use chrono::{DateTime, NaiveDate, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Storage type of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    Uuid,
    Text,
    SmallInt,
    Integer,
    BigInt,
    Double,
    Boolean,
    Timestamp,
    Date,
    Json,
    TextArray,
}

impl ColumnType {
    /// PostgreSQL type name, as used in casts and DDL
    pub fn sql_type(&self) -> &'static str {
        match self {
            ColumnType::Uuid => "UUID",
            ColumnType::Text => "TEXT",
            ColumnType::SmallInt => "SMALLINT",
            ColumnType::Integer => "INTEGER",
            ColumnType::BigInt => "BIGINT",
            ColumnType::Double => "DOUBLE PRECISION",
            ColumnType::Boolean => "BOOLEAN",
            ColumnType::Timestamp => "TIMESTAMPTZ",
            ColumnType::Date => "DATE",
            ColumnType::Json => "JSONB",
            ColumnType::TextArray => "TEXT[]",
        }
    }

    /// Element type for array columns
    pub fn element_type(&self) -> Option<ColumnType> {
        match self {
            ColumnType::TextArray => Some(ColumnType::Text),
            _ => None,
        }
    }

    pub fn is_array(&self) -> bool {
        self.element_type().is_some()
    }

    /// Map a Rust type spelling (`Option<..>` included) to a column type
    pub fn from_rust_type(rust_type: &str) -> Option<ColumnType> {
        crate::sql::rust_type_to_column_type(rust_type)
    }
}

impl std::fmt::Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.sql_type())
    }
}

/// A value converted to the storage type of its column
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Uuid(Uuid),
    Text(String),
    SmallInt(i16),
    Integer(i32),
    BigInt(i64),
    Double(f64),
    Boolean(bool),
    Timestamp(DateTime<Utc>),
    Date(NaiveDate),
    Json(Value),
    TextArray(Vec<String>),
    /// Typed null, so the driver binds the right parameter type
    Null(ColumnType),
}

impl SqlValue {
    pub fn column_type(&self) -> ColumnType {
        match self {
            SqlValue::Uuid(_) => ColumnType::Uuid,
            SqlValue::Text(_) => ColumnType::Text,
            SqlValue::SmallInt(_) => ColumnType::SmallInt,
            SqlValue::Integer(_) => ColumnType::Integer,
            SqlValue::BigInt(_) => ColumnType::BigInt,
            SqlValue::Double(_) => ColumnType::Double,
            SqlValue::Boolean(_) => ColumnType::Boolean,
            SqlValue::Timestamp(_) => ColumnType::Timestamp,
            SqlValue::Date(_) => ColumnType::Date,
            SqlValue::Json(_) => ColumnType::Json,
            SqlValue::TextArray(_) => ColumnType::TextArray,
            SqlValue::Null(column_type) => *column_type,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null(_))
    }

    /// Convert a JSON value to the given column type.
    ///
    /// The conversion is strict: numbers must fit the column, strings are
    /// only parsed for UUID, timestamp and date columns. Timestamps are
    /// truncated to microseconds to match PostgreSQL precision.
    pub fn from_json(value: &Value, column_type: ColumnType) -> Result<Self, TypeMappingError> {
        if value.is_null() {
            return Ok(SqlValue::Null(column_type));
        }

        let mismatch = || TypeMappingError::TypeMismatch {
            expected: column_type,
            found: json_kind(value).to_string(),
        };

        match column_type {
            ColumnType::Uuid => {
                let raw = value.as_str().ok_or_else(mismatch)?;
                Uuid::parse_str(raw)
                    .map(SqlValue::Uuid)
                    .map_err(|e| parse_error(column_type, raw, e))
            }
            ColumnType::Text => value
                .as_str()
                .map(|s| SqlValue::Text(s.to_string()))
                .ok_or_else(mismatch),
            ColumnType::SmallInt => {
                let n = integer(value, column_type)?;
                i16::try_from(n)
                    .map(SqlValue::SmallInt)
                    .map_err(|_| out_of_range(column_type, value))
            }
            ColumnType::Integer => {
                let n = integer(value, column_type)?;
                i32::try_from(n)
                    .map(SqlValue::Integer)
                    .map_err(|_| out_of_range(column_type, value))
            }
            ColumnType::BigInt => integer(value, column_type).map(SqlValue::BigInt),
            ColumnType::Double => value.as_f64().map(SqlValue::Double).ok_or_else(mismatch),
            ColumnType::Boolean => value.as_bool().map(SqlValue::Boolean).ok_or_else(mismatch),
            ColumnType::Timestamp => {
                let raw = value.as_str().ok_or_else(mismatch)?;
                DateTime::parse_from_rfc3339(raw)
                    .map(|dt| SqlValue::Timestamp(dt.with_timezone(&Utc).trunc_subsecs(6)))
                    .map_err(|e| parse_error(column_type, raw, e))
            }
            ColumnType::Date => {
                let raw = value.as_str().ok_or_else(mismatch)?;
                NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                    .map(SqlValue::Date)
                    .map_err(|e| parse_error(column_type, raw, e))
            }
            ColumnType::Json => Ok(SqlValue::Json(value.clone())),
            ColumnType::TextArray => {
                let items = value.as_array().ok_or_else(mismatch)?;
                items
                    .iter()
                    .map(|item| item.as_str().map(str::to_string).ok_or_else(mismatch))
                    .collect::<Result<Vec<_>, _>>()
                    .map(SqlValue::TextArray)
            }
        }
    }

    /// Convert back to the JSON representation serde uses for the Rust type
    pub fn to_json(&self) -> Value {
        match self {
            SqlValue::Uuid(v) => Value::String(v.to_string()),
            SqlValue::Text(v) => Value::String(v.clone()),
            SqlValue::SmallInt(v) => Value::from(*v),
            SqlValue::Integer(v) => Value::from(*v),
            SqlValue::BigInt(v) => Value::from(*v),
            SqlValue::Double(v) => serde_json::Number::from_f64(*v)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            SqlValue::Boolean(v) => Value::Bool(*v),
            SqlValue::Timestamp(v) => Value::String(v.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            SqlValue::Date(v) => Value::String(v.format("%Y-%m-%d").to_string()),
            SqlValue::Json(v) => v.clone(),
            SqlValue::TextArray(v) => {
                Value::Array(v.iter().cloned().map(Value::String).collect())
            }
            SqlValue::Null(_) => Value::Null,
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn integer(value: &Value, column_type: ColumnType) -> Result<i64, TypeMappingError> {
    match value {
        Value::Number(n) => n.as_i64().ok_or_else(|| out_of_range(column_type, value)),
        other => Err(TypeMappingError::TypeMismatch {
            expected: column_type,
            found: json_kind(other).to_string(),
        }),
    }
}

fn out_of_range(column_type: ColumnType, value: &Value) -> TypeMappingError {
    TypeMappingError::OutOfRange {
        column_type,
        value: value.to_string(),
    }
}

fn parse_error(column_type: ColumnType, raw: &str, e: impl std::fmt::Display) -> TypeMappingError {
    TypeMappingError::Parse {
        column_type,
        value: raw.to_string(),
        message: e.to_string(),
    }
}

/// Convert basic Rust types to SqlValue
impl From<String> for SqlValue {
    fn from(val: String) -> Self {
        SqlValue::Text(val)
    }
}

impl From<&str> for SqlValue {
    fn from(val: &str) -> Self {
        SqlValue::Text(val.to_string())
    }
}

impl From<i16> for SqlValue {
    fn from(val: i16) -> Self {
        SqlValue::SmallInt(val)
    }
}

impl From<i32> for SqlValue {
    fn from(val: i32) -> Self {
        SqlValue::Integer(val)
    }
}

impl From<i64> for SqlValue {
    fn from(val: i64) -> Self {
        SqlValue::BigInt(val)
    }
}

impl From<f64> for SqlValue {
    fn from(val: f64) -> Self {
        SqlValue::Double(val)
    }
}

impl From<bool> for SqlValue {
    fn from(val: bool) -> Self {
        SqlValue::Boolean(val)
    }
}

impl From<Uuid> for SqlValue {
    fn from(val: Uuid) -> Self {
        SqlValue::Uuid(val)
    }
}

impl From<DateTime<Utc>> for SqlValue {
    fn from(val: DateTime<Utc>) -> Self {
        SqlValue::Timestamp(val)
    }
}

impl From<NaiveDate> for SqlValue {
    fn from(val: NaiveDate) -> Self {
        SqlValue::Date(val)
    }
}

impl From<Vec<String>> for SqlValue {
    fn from(val: Vec<String>) -> Self {
        SqlValue::TextArray(val)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_null_is_typed() {
        let value = SqlValue::from_json(&Value::Null, ColumnType::Timestamp).unwrap();
        assert_eq!(value, SqlValue::Null(ColumnType::Timestamp));
        assert_eq!(value.column_type(), ColumnType::Timestamp);
        assert_eq!(value.to_json(), Value::Null);
    }

    #[test]
    fn test_integer_range_checks() {
        assert_eq!(
            SqlValue::from_json(&json!(32767), ColumnType::SmallInt).unwrap(),
            SqlValue::SmallInt(32767)
        );
        assert!(matches!(
            SqlValue::from_json(&json!(32768), ColumnType::SmallInt),
            Err(TypeMappingError::OutOfRange { .. })
        ));
        assert!(matches!(
            SqlValue::from_json(&json!(3_000_000_000i64), ColumnType::Integer),
            Err(TypeMappingError::OutOfRange { .. })
        ));
        assert!(matches!(
            SqlValue::from_json(&json!(1.5), ColumnType::BigInt),
            Err(TypeMappingError::OutOfRange { .. })
        ));
        assert!(matches!(
            SqlValue::from_json(&json!("7"), ColumnType::Integer),
            Err(TypeMappingError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_text_does_not_accept_numbers() {
        assert!(SqlValue::from_json(&json!(5), ColumnType::Text).is_err());
        assert_eq!(
            SqlValue::from_json(&json!("5"), ColumnType::Text).unwrap(),
            SqlValue::Text("5".to_string())
        );
    }

    #[test]
    fn test_timestamp_truncated_to_micros() {
        let value =
            SqlValue::from_json(&json!("2024-03-01T10:20:30.123456789Z"), ColumnType::Timestamp)
                .unwrap();
        assert_eq!(value.to_json(), json!("2024-03-01T10:20:30.123456Z"));

        let offset =
            SqlValue::from_json(&json!("2024-03-01T12:00:00+02:00"), ColumnType::Timestamp)
                .unwrap();
        assert_eq!(offset.to_json(), json!("2024-03-01T10:00:00Z"));
    }

    #[test]
    fn test_uuid_date_and_arrays() {
        let id = Uuid::new_v4();
        assert_eq!(
            SqlValue::from_json(&json!(id.to_string()), ColumnType::Uuid).unwrap(),
            SqlValue::Uuid(id)
        );
        assert!(matches!(
            SqlValue::from_json(&json!("not-a-uuid"), ColumnType::Uuid),
            Err(TypeMappingError::Parse { .. })
        ));

        let date = SqlValue::from_json(&json!("2024-02-29"), ColumnType::Date).unwrap();
        assert_eq!(date.to_json(), json!("2024-02-29"));

        let tags = SqlValue::from_json(&json!(["a", "b"]), ColumnType::TextArray).unwrap();
        assert_eq!(tags, SqlValue::TextArray(vec!["a".into(), "b".into()]));
        assert!(SqlValue::from_json(&json!(["a", 1]), ColumnType::TextArray).is_err());
    }

    #[test]
    fn test_sql_type_names() {
        assert_eq!(ColumnType::Timestamp.sql_type(), "TIMESTAMPTZ");
        assert_eq!(ColumnType::Json.sql_type(), "JSONB");
        assert_eq!(ColumnType::TextArray.element_type(), Some(ColumnType::Text));
        assert_eq!(ColumnType::Text.element_type(), None);
    }
}
