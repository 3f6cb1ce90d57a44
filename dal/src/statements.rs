//! SQL statement builders
//!
//! Pure functions producing the statement text the DAL executes. Every
//! identifier is validated and quoted; values are always placeholders.

use crate::entity::{DELETED_AT_COLUMN, ID_COLUMN, PARENT_ID_COLUMN, POSITION_COLUMN, UPDATED_AT_COLUMN};
use filter::{quote_identifier, FilterError};

/// PostgreSQL limit on bind parameters per statement
pub const MAX_BIND_PARAMS: usize = 65_535;

/// Rows per multi-row INSERT that stay below [`MAX_BIND_PARAMS`]
pub fn rows_per_chunk(columns_per_row: usize) -> usize {
    (MAX_BIND_PARAMS / columns_per_row.max(1)).max(1)
}

fn quote_all(names: &[&str]) -> Result<String, FilterError> {
    Ok(names
        .iter()
        .map(|name| quote_identifier(name))
        .collect::<Result<Vec<_>, _>>()?
        .join(", "))
}

/// `INSERT INTO "t" ("a", "b") VALUES ($1, $2), ($3, $4)`
pub fn insert_rows(table: &str, columns: &[&str], rows: usize) -> Result<String, FilterError> {
    let table = quote_identifier(table)?;
    let column_list = quote_all(columns)?;

    let mut index = 1;
    let values = (0..rows.max(1))
        .map(|_| {
            let placeholders = columns
                .iter()
                .map(|_| {
                    let placeholder = format!("${}", index);
                    index += 1;
                    placeholder
                })
                .collect::<Vec<_>>()
                .join(", ");
            format!("({})", placeholders)
        })
        .collect::<Vec<_>>()
        .join(", ");

    Ok(format!(
        "INSERT INTO {} ({}) VALUES {}",
        table, column_list, values
    ))
}

/// `SELECT .. FROM "t"` with an optional condition, the soft-delete filter,
/// ordering and pagination appended
pub fn select(
    table: &str,
    columns: &[&str],
    condition: Option<&str>,
    include_deleted: bool,
    order_clause: &str,
    limit_clause: &str,
) -> Result<String, FilterError> {
    let mut sql = format!(
        "SELECT {} FROM {}",
        quote_all(columns)?,
        quote_identifier(table)?
    );
    push_where(&mut sql, condition, include_deleted)?;
    if !order_clause.is_empty() {
        sql.push(' ');
        sql.push_str(order_clause);
    }
    if !limit_clause.is_empty() {
        sql.push(' ');
        sql.push_str(limit_clause);
    }
    Ok(sql)
}

/// Select rows whose id is in the array bound to `$1`
pub fn select_by_ids(table: &str, columns: &[&str], include_deleted: bool) -> Result<String, FilterError> {
    let condition = format!("{} = ANY($1)", quote_identifier(ID_COLUMN)?);
    select(table, columns, Some(&condition), include_deleted, "", "")
}

/// `SELECT COUNT(*) AS total FROM "t" ..`
pub fn count(table: &str, condition: Option<&str>, include_deleted: bool) -> Result<String, FilterError> {
    let mut sql = format!("SELECT COUNT(*) AS total FROM {}", quote_identifier(table)?);
    push_where(&mut sql, condition, include_deleted)?;
    Ok(sql)
}

fn push_where(sql: &mut String, condition: Option<&str>, include_deleted: bool) -> Result<(), FilterError> {
    let mut parts = Vec::new();
    if !include_deleted {
        parts.push(format!("{} IS NULL", quote_identifier(DELETED_AT_COLUMN)?));
    }
    if let Some(condition) = condition {
        parts.push(if include_deleted {
            condition.to_string()
        } else {
            format!("({})", condition)
        });
    }
    if !parts.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&parts.join(" AND "));
    }
    Ok(())
}

/// `UPDATE "t" SET "a" = $1, "b" = $2 WHERE "id" = $3 AND "deleted_at" IS NULL`
pub fn update_by_id(table: &str, columns: &[&str]) -> Result<String, FilterError> {
    let assignments = columns
        .iter()
        .enumerate()
        .map(|(i, column)| Ok(format!("{} = ${}", quote_identifier(column)?, i + 1)))
        .collect::<Result<Vec<_>, FilterError>>()?
        .join(", ");

    Ok(format!(
        "UPDATE {} SET {} WHERE {} = ${} AND {} IS NULL",
        quote_identifier(table)?,
        assignments,
        quote_identifier(ID_COLUMN)?,
        columns.len() + 1,
        quote_identifier(DELETED_AT_COLUMN)?
    ))
}

/// Soft delete: `$1` is the deletion time, `$2` the id array
pub fn soft_delete(table: &str) -> Result<String, FilterError> {
    let id = quote_identifier(ID_COLUMN)?;
    let deleted_at = quote_identifier(DELETED_AT_COLUMN)?;
    Ok(format!(
        "UPDATE {} SET {} = $1, {} = $1 WHERE {} = ANY($2) AND {} IS NULL RETURNING {}",
        quote_identifier(table)?,
        deleted_at,
        quote_identifier(UPDATED_AT_COLUMN)?,
        id,
        deleted_at,
        id
    ))
}

/// Hard delete by id bound to `$1`
pub fn delete_by_id(table: &str) -> Result<String, FilterError> {
    Ok(format!(
        "DELETE FROM {} WHERE {} = $1",
        quote_identifier(table)?,
        quote_identifier(ID_COLUMN)?
    ))
}

/// Child rows of the parents in the array bound to `$1`, in position order
pub fn select_sub_rows(table: &str, columns: &[&str]) -> Result<String, FilterError> {
    let parent_id = quote_identifier(PARENT_ID_COLUMN)?;
    let position = quote_identifier(POSITION_COLUMN)?;
    let mut all = vec![PARENT_ID_COLUMN, POSITION_COLUMN];
    all.extend_from_slice(columns);

    Ok(format!(
        "SELECT {} FROM {} WHERE {} = ANY($1) ORDER BY {}, {}",
        quote_all(&all)?,
        quote_identifier(table)?,
        parent_id,
        parent_id,
        position
    ))
}

/// Remove child rows of the parents in the array bound to `$1`
pub fn delete_sub_rows(table: &str) -> Result<String, FilterError> {
    Ok(format!(
        "DELETE FROM {} WHERE {} = ANY($1)",
        quote_identifier(table)?,
        quote_identifier(PARENT_ID_COLUMN)?
    ))
}

/// Column list for inserting child rows
pub fn sub_row_columns(columns: &[&'static str]) -> Vec<&'static str> {
    let mut all = vec![PARENT_ID_COLUMN, POSITION_COLUMN];
    all.extend_from_slice(columns);
    all
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_rows() {
        assert_eq!(
            insert_rows("products", &["id", "name"], 2).unwrap(),
            "INSERT INTO \"products\" (\"id\", \"name\") VALUES ($1, $2), ($3, $4)"
        );
    }

    #[test]
    fn test_chunking_stays_below_limit() {
        assert_eq!(rows_per_chunk(5), 13_107);
        assert!(rows_per_chunk(7) * 7 <= MAX_BIND_PARAMS);
        assert_eq!(rows_per_chunk(0), MAX_BIND_PARAMS);
        assert_eq!(rows_per_chunk(100_000), 1);
    }

    #[test]
    fn test_select_hides_deleted_rows() {
        assert_eq!(
            select("products", &["id"], None, false, "", "").unwrap(),
            "SELECT \"id\" FROM \"products\" WHERE \"deleted_at\" IS NULL"
        );
        assert_eq!(
            select(
                "products",
                &["id", "name"],
                Some("\"name\" = $1 OR \"name\" = $2"),
                false,
                "ORDER BY \"created_at\" DESC",
                "LIMIT 5"
            )
            .unwrap(),
            "SELECT \"id\", \"name\" FROM \"products\" WHERE \"deleted_at\" IS NULL AND (\"name\" = $1 OR \"name\" = $2) ORDER BY \"created_at\" DESC LIMIT 5"
        );
        assert_eq!(
            select("products", &["id"], None, true, "", "").unwrap(),
            "SELECT \"id\" FROM \"products\""
        );
    }

    #[test]
    fn test_select_by_ids_and_count() {
        assert_eq!(
            select_by_ids("products", &["id"], false).unwrap(),
            "SELECT \"id\" FROM \"products\" WHERE \"deleted_at\" IS NULL AND (\"id\" = ANY($1))"
        );
        assert_eq!(
            count("products", Some("\"price\" > $1"), true).unwrap(),
            "SELECT COUNT(*) AS total FROM \"products\" WHERE \"price\" > $1"
        );
    }

    #[test]
    fn test_update_and_delete() {
        assert_eq!(
            update_by_id("products", &["name", "updated_at"]).unwrap(),
            "UPDATE \"products\" SET \"name\" = $1, \"updated_at\" = $2 WHERE \"id\" = $3 AND \"deleted_at\" IS NULL"
        );
        assert_eq!(
            soft_delete("products").unwrap(),
            "UPDATE \"products\" SET \"deleted_at\" = $1, \"updated_at\" = $1 WHERE \"id\" = ANY($2) AND \"deleted_at\" IS NULL RETURNING \"id\""
        );
        assert_eq!(
            delete_by_id("products").unwrap(),
            "DELETE FROM \"products\" WHERE \"id\" = $1"
        );
    }

    #[test]
    fn test_sub_rows() {
        assert_eq!(
            select_sub_rows("order_lines", &["sku"]).unwrap(),
            "SELECT \"parent_id\", \"position\", \"sku\" FROM \"order_lines\" WHERE \"parent_id\" = ANY($1) ORDER BY \"parent_id\", \"position\""
        );
        assert_eq!(
            delete_sub_rows("order_lines").unwrap(),
            "DELETE FROM \"order_lines\" WHERE \"parent_id\" = ANY($1)"
        );
        assert_eq!(
            sub_row_columns(&["sku"]),
            vec!["parent_id", "position", "sku"]
        );
    }

    #[test]
    fn test_invalid_table_rejected() {
        assert!(insert_rows("products; DROP", &["id"], 1).is_err());
        assert!(update_by_id("products", &["bad-name"]).is_err());
    }
}
