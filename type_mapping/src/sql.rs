//! SQL type conversion utilities
//!
//! This module maps Rust type spellings, as written by code generators or
//! entity metadata, to column types.

use crate::types::ColumnType;

/// Map Rust type names to column types, `None` for unsupported types
pub fn rust_type_to_column_type(rust_type: &str) -> Option<ColumnType> {
    // Normalize type string by removing all whitespace for consistent matching
    let normalized = rust_type.replace(' ', "");
    let inner = normalized
        .strip_prefix("Option<")
        .and_then(|rest| rest.strip_suffix('>'))
        .unwrap_or(&normalized);

    match inner {
        "Uuid" | "uuid::Uuid" => Some(ColumnType::Uuid),
        "String" | "&str" => Some(ColumnType::Text),
        "i8" | "i16" => Some(ColumnType::SmallInt),
        "u8" | "u16" | "i32" => Some(ColumnType::Integer),
        "u32" | "i64" => Some(ColumnType::BigInt),
        "f32" | "f64" => Some(ColumnType::Double),
        "bool" => Some(ColumnType::Boolean),
        "DateTime<Utc>" | "chrono::DateTime<chrono::Utc>" | "chrono::DateTime<Utc>" => {
            Some(ColumnType::Timestamp)
        }
        "NaiveDate" | "chrono::NaiveDate" => Some(ColumnType::Date),
        "Value" | "serde_json::Value" => Some(ColumnType::Json),
        "Vec<String>" => Some(ColumnType::TextArray),
        _ => None,
    }
}

/// Check if a Rust type is Optional (nullable in SQL)
pub fn is_optional_type(rust_type: &str) -> bool {
    rust_type.trim().starts_with("Option")
}
