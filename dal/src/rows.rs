//! Converting between serialized entities, typed values and result rows.

use crate::entity::{Column, SubTable};
use crate::errors::DalError;
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::{Map, Value};
use sqlx::postgres::PgRow;
use sqlx::Row;
use type_mapping::{ColumnType, SqlValue};
use uuid::Uuid;

/// Read one column as a typed value
pub fn decode_column(row: &PgRow, column: &Column) -> Result<SqlValue, sqlx::Error> {
    let name = column.name;
    let value = match column.column_type {
        ColumnType::Uuid => row.try_get::<Option<Uuid>, _>(name)?.map(SqlValue::Uuid),
        ColumnType::Text => row.try_get::<Option<String>, _>(name)?.map(SqlValue::Text),
        ColumnType::SmallInt => row.try_get::<Option<i16>, _>(name)?.map(SqlValue::SmallInt),
        ColumnType::Integer => row.try_get::<Option<i32>, _>(name)?.map(SqlValue::Integer),
        ColumnType::BigInt => row.try_get::<Option<i64>, _>(name)?.map(SqlValue::BigInt),
        ColumnType::Double => row.try_get::<Option<f64>, _>(name)?.map(SqlValue::Double),
        ColumnType::Boolean => row.try_get::<Option<bool>, _>(name)?.map(SqlValue::Boolean),
        ColumnType::Timestamp => row
            .try_get::<Option<DateTime<Utc>>, _>(name)?
            .map(SqlValue::Timestamp),
        ColumnType::Date => row.try_get::<Option<NaiveDate>, _>(name)?.map(SqlValue::Date),
        ColumnType::Json => row.try_get::<Option<Value>, _>(name)?.map(SqlValue::Json),
        ColumnType::TextArray => row
            .try_get::<Option<Vec<String>>, _>(name)?
            .map(SqlValue::TextArray),
    };
    Ok(value.unwrap_or(SqlValue::Null(column.column_type)))
}

/// Read the given columns into a JSON object keyed by column name
pub fn decode_row(row: &PgRow, columns: &[Column]) -> Result<Map<String, Value>, sqlx::Error> {
    let mut map = Map::with_capacity(columns.len());
    for column in columns {
        map.insert(column.name.to_string(), decode_column(row, column)?.to_json());
    }
    Ok(map)
}

/// JSON object of encoded values, matching what [`decode_row`] reads back
pub fn encoded_to_map(columns: &[Column], values: &[SqlValue]) -> Map<String, Value> {
    columns
        .iter()
        .zip(values)
        .map(|(column, value)| (column.name.to_string(), value.to_json()))
        .collect()
}

/// JSON list of encoded sub-table rows
pub fn encoded_sub_rows_to_json(sub_table: &SubTable, rows: &[Vec<SqlValue>]) -> Value {
    Value::Array(
        rows.iter()
            .map(|row| Value::Object(encoded_to_map(sub_table.columns, row)))
            .collect(),
    )
}

/// Convert the given fields of a serialized entity to typed values.
///
/// Missing fields count as null; null in a non-nullable column is a
/// validation error.
pub fn encode_row(
    entity: &str,
    map: &Map<String, Value>,
    columns: &[Column],
) -> Result<Vec<SqlValue>, DalError> {
    columns
        .iter()
        .map(|column| encode_field(entity, map, column))
        .collect()
}

fn encode_field(entity: &str, map: &Map<String, Value>, column: &Column) -> Result<SqlValue, DalError> {
    let raw = map.get(column.name).unwrap_or(&Value::Null);
    let value = SqlValue::from_json(raw, column.column_type)
        .map_err(|e| DalError::invalid_value(column.name, e))?;
    if value.is_null() && !column.nullable {
        return Err(DalError::validation(
            entity,
            format!("column '{}' cannot be null", column.name),
        ));
    }
    Ok(value)
}

/// Convert a list field into one typed row per element, in list order
pub fn encode_sub_rows(
    entity: &str,
    map: &Map<String, Value>,
    sub_table: &SubTable,
) -> Result<Vec<Vec<SqlValue>>, DalError> {
    let items = match map.get(sub_table.field) {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(items)) => items,
        Some(_) => {
            return Err(DalError::validation(
                entity,
                format!("field '{}' must be a list", sub_table.field),
            ))
        }
    };

    items
        .iter()
        .map(|item| match item {
            Value::Object(fields) => encode_row(entity, fields, sub_table.columns),
            _ => Err(DalError::validation(
                entity,
                format!("items of '{}' must be objects", sub_table.field),
            )),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const COLUMNS: &[Column] = &[
        Column::new("name", ColumnType::Text),
        Column::new("note", ColumnType::Text).nullable(),
        Column::new("quantity", ColumnType::Integer),
    ];

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_encode_row() {
        let map = object(json!({"name": "Lamp", "quantity": 3}));
        let values = encode_row("Product", &map, COLUMNS).unwrap();
        assert_eq!(
            values,
            vec![
                SqlValue::Text("Lamp".to_string()),
                SqlValue::Null(ColumnType::Text),
                SqlValue::Integer(3),
            ]
        );
    }

    #[test]
    fn test_encode_row_rejects_null_in_required_column() {
        let map = object(json!({"name": null, "quantity": 3}));
        assert!(matches!(
            encode_row("Product", &map, COLUMNS),
            Err(DalError::Validation { .. })
        ));
    }

    #[test]
    fn test_encode_row_reports_field_on_type_error() {
        let map = object(json!({"name": "Lamp", "quantity": "three"}));
        match encode_row("Product", &map, COLUMNS) {
            Err(DalError::InvalidValue { field, .. }) => assert_eq!(field, "quantity"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_encoded_values_are_stored_precision() {
        const EVENT_COLUMNS: &[Column] = &[
            Column::new("name", ColumnType::Text),
            Column::new("starts_at", ColumnType::Timestamp),
        ];
        let map = object(json!({
            "name": "launch",
            "starts_at": "2024-05-01T10:00:00.123456789Z"
        }));

        let values = encode_row("Event", &map, EVENT_COLUMNS).unwrap();
        let stored = encoded_to_map(EVENT_COLUMNS, &values);
        assert_eq!(stored["name"], "launch");
        assert_eq!(stored["starts_at"], "2024-05-01T10:00:00.123456Z");

        let sub_table = SubTable::new("events", "events", EVENT_COLUMNS);
        assert_eq!(
            encoded_sub_rows_to_json(&sub_table, &[values]),
            json!([{"name": "launch", "starts_at": "2024-05-01T10:00:00.123456Z"}])
        );
    }

    #[test]
    fn test_encode_sub_rows() {
        const LINE_COLUMNS: &[Column] = &[Column::new("sku", ColumnType::Text)];
        let sub_table = SubTable::new("lines", "order_lines", LINE_COLUMNS);

        let map = object(json!({"lines": [{"sku": "a"}, {"sku": "b"}]}));
        let rows = encode_sub_rows("Order", &map, &sub_table).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1], vec![SqlValue::Text("b".to_string())]);

        let empty = object(json!({"lines": null}));
        assert!(encode_sub_rows("Order", &empty, &sub_table).unwrap().is_empty());

        let invalid = object(json!({"lines": "a"}));
        assert!(encode_sub_rows("Order", &invalid, &sub_table).is_err());
    }
}
