//! Entity metadata
//!
//! Entities describe their storage through static [`Column`] and
//! [`SubTable`] lists and embed a flattened [`Meta`] with the columns the
//! DAL manages itself.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use type_mapping::ColumnType;
use uuid::Uuid;

pub const ID_COLUMN: &str = "id";
pub const CREATED_AT_COLUMN: &str = "created_at";
pub const UPDATED_AT_COLUMN: &str = "updated_at";
pub const DELETED_AT_COLUMN: &str = "deleted_at";
pub const PARENT_ID_COLUMN: &str = "parent_id";
pub const POSITION_COLUMN: &str = "position";

/// Columns every entity table carries, managed by the DAL
pub const META_COLUMNS: [Column; 4] = [
    Column::new(ID_COLUMN, ColumnType::Uuid).immutable(),
    Column::new(CREATED_AT_COLUMN, ColumnType::Timestamp).immutable(),
    Column::new(UPDATED_AT_COLUMN, ColumnType::Timestamp).immutable(),
    Column::new(DELETED_AT_COLUMN, ColumnType::Timestamp)
        .immutable()
        .nullable(),
];

/// Identity and lifecycle timestamps, embedded with `#[serde(flatten)]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meta {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Default for Meta {
    fn default() -> Self {
        Self::new()
    }
}

impl Meta {
    /// Unsaved metadata: nil id, timestamps assigned on insert
    pub fn new() -> Self {
        Self {
            id: Uuid::nil(),
            created_at: DateTime::<Utc>::UNIX_EPOCH,
            updated_at: DateTime::<Utc>::UNIX_EPOCH,
            deleted_at: None,
        }
    }

    pub fn with_id(id: Uuid) -> Self {
        Self { id, ..Self::new() }
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// A stored column of an entity or sub-table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub column_type: ColumnType,
    pub mutable: bool,
    pub nullable: bool,
}

impl Column {
    /// Mutable, non-nullable column
    pub const fn new(name: &'static str, column_type: ColumnType) -> Self {
        Self {
            name,
            column_type,
            mutable: true,
            nullable: false,
        }
    }

    pub const fn immutable(mut self) -> Self {
        self.mutable = false;
        self
    }

    pub const fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }
}

/// A list field stored as rows of a child table keyed by `parent_id`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubTable {
    pub field: &'static str,
    pub table: &'static str,
    pub columns: &'static [Column],
    pub mutable: bool,
}

impl SubTable {
    pub const fn new(field: &'static str, table: &'static str, columns: &'static [Column]) -> Self {
        Self {
            field,
            table,
            columns,
            mutable: true,
        }
    }

    pub const fn immutable(mut self) -> Self {
        self.mutable = false;
        self
    }

    pub fn column_names(&self) -> Vec<&'static str> {
        self.columns.iter().map(|c| c.name).collect()
    }
}

/// A persistable entity.
///
/// ```
/// use dal::{Column, Entity, Meta, SubTable};
/// use serde::{Deserialize, Serialize};
/// use type_mapping::ColumnType;
///
/// #[derive(Debug, Clone, Serialize, Deserialize)]
/// struct Line {
///     sku: String,
///     quantity: i32,
/// }
///
/// #[derive(Debug, Clone, Serialize, Deserialize)]
/// struct PurchaseOrder {
///     #[serde(flatten)]
///     meta: Meta,
///     customer: String,
///     lines: Vec<Line>,
/// }
///
/// const LINE_COLUMNS: &[Column] = &[
///     Column::new("sku", ColumnType::Text),
///     Column::new("quantity", ColumnType::Integer),
/// ];
///
/// impl Entity for PurchaseOrder {
///     fn entity_name() -> &'static str {
///         "PurchaseOrder"
///     }
///     fn columns() -> &'static [Column] {
///         const { &[Column::new("customer", ColumnType::Text)] }
///     }
///     fn sub_tables() -> &'static [SubTable] {
///         const { &[SubTable::new("lines", "purchase_order_lines", LINE_COLUMNS)] }
///     }
///     fn meta(&self) -> &Meta {
///         &self.meta
///     }
///     fn meta_mut(&mut self) -> &mut Meta {
///         &mut self.meta
///     }
/// }
///
/// assert_eq!(PurchaseOrder::table_name(), "purchase_orders");
/// ```
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + Unpin + 'static {
    fn entity_name() -> &'static str;

    /// Defaults to the snake case plural of the entity name
    fn table_name() -> String {
        naming::table_name(Self::entity_name())
    }

    /// Stored columns, excluding the meta columns
    fn columns() -> &'static [Column];

    fn sub_tables() -> &'static [SubTable] {
        &[]
    }

    fn meta(&self) -> &Meta;

    fn meta_mut(&mut self) -> &mut Meta;

    fn id(&self) -> Uuid {
        self.meta().id
    }
}

/// Meta columns followed by the entity's own columns
pub fn all_columns<E: Entity>() -> Vec<Column> {
    META_COLUMNS
        .iter()
        .chain(E::columns().iter())
        .copied()
        .collect()
}

pub fn find_column<E: Entity>(name: &str) -> Option<Column> {
    META_COLUMNS
        .iter()
        .chain(E::columns().iter())
        .find(|column| column.name == name)
        .copied()
}

pub fn find_sub_table<E: Entity>(field: &str) -> Option<SubTable> {
    E::sub_tables().iter().find(|sub| sub.field == field).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meta_columns_are_managed() {
        assert!(META_COLUMNS.iter().all(|c| !c.mutable));
        assert!(META_COLUMNS[3].nullable);
        assert!(!META_COLUMNS[0].nullable);
    }

    #[test]
    fn test_meta_serializes_flat_fields() {
        let meta = Meta::with_id(Uuid::nil());
        let value = serde_json::to_value(&meta).unwrap();
        assert_eq!(value["id"], "00000000-0000-0000-0000-000000000000");
        assert!(value["deleted_at"].is_null());
        assert!(!meta.is_deleted());
    }

    #[test]
    fn test_column_builders() {
        let column = Column::new("note", ColumnType::Text).nullable();
        assert!(column.mutable);
        assert!(column.nullable);
        assert!(!Column::new("sku", ColumnType::Text).immutable().mutable);
    }
}
