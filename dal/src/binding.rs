//! Binding typed values to statements.

use crate::connection::PgQuery;
use chrono::{DateTime, NaiveDate, Utc};
use type_mapping::{ColumnType, SqlValue};
use uuid::Uuid;

// Nulls are bound as `None` of the column's Rust type.
macro_rules! bind_sql_value {
    ($query:expr, $value:expr) => {
        match $value {
            SqlValue::Uuid(v) => $query.bind(v),
            SqlValue::Text(v) => $query.bind(v),
            SqlValue::SmallInt(v) => $query.bind(v),
            SqlValue::Integer(v) => $query.bind(v),
            SqlValue::BigInt(v) => $query.bind(v),
            SqlValue::Double(v) => $query.bind(v),
            SqlValue::Boolean(v) => $query.bind(v),
            SqlValue::Timestamp(v) => $query.bind(v),
            SqlValue::Date(v) => $query.bind(v),
            SqlValue::Json(v) => $query.bind(sqlx::types::Json(v)),
            SqlValue::TextArray(v) => $query.bind(v),
            SqlValue::Null(column_type) => match column_type {
                ColumnType::Uuid => $query.bind(Option::<Uuid>::None),
                ColumnType::Text => $query.bind(Option::<String>::None),
                ColumnType::SmallInt => $query.bind(Option::<i16>::None),
                ColumnType::Integer => $query.bind(Option::<i32>::None),
                ColumnType::BigInt => $query.bind(Option::<i64>::None),
                ColumnType::Double => $query.bind(Option::<f64>::None),
                ColumnType::Boolean => $query.bind(Option::<bool>::None),
                ColumnType::Timestamp => $query.bind(Option::<DateTime<Utc>>::None),
                ColumnType::Date => $query.bind(Option::<NaiveDate>::None),
                ColumnType::Json => $query.bind(Option::<sqlx::types::Json<serde_json::Value>>::None),
                ColumnType::TextArray => $query.bind(Option::<Vec<String>>::None),
            },
        }
    };
}

/// Bind one value
pub fn bind_value(query: PgQuery<'_>, value: SqlValue) -> PgQuery<'_> {
    bind_sql_value!(query, value)
}

/// Bind values in placeholder order
pub fn bind_values<I>(mut query: PgQuery<'_>, values: I) -> PgQuery<'_>
where
    I: IntoIterator<Item = SqlValue>,
{
    for value in values {
        query = bind_value(query, value);
    }
    query
}
