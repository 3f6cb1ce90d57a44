//! DAL - generic data access for PostgreSQL
//!
//! Typed CRUD over arbitrary entities described by static column metadata,
//! with change detection on update, soft deletes, sub-table lists and
//! filter-to-SQL translation through the `filter` crate.

/// Log a SQL statement before it runs when `debug-logging` is enabled
#[cfg(feature = "debug-logging")]
macro_rules! sql_log {
    ($operation:expr, $sql:expr) => {
        tracing::debug!(operation = $operation, sql = %$sql, "Executing SQL")
    };
}

#[cfg(not(feature = "debug-logging"))]
macro_rules! sql_log {
    ($operation:expr, $sql:expr) => {};
}

pub mod binding;
pub mod changes;
pub mod connection;
pub mod entity;
pub mod entity_dal;
pub mod errors;
pub mod prelude;
pub mod rows;
pub mod statements;
pub mod traits;

pub use changes::{ChangeSet, UpdateField};
pub use connection::{ConnectionProvider, PgQuery};
pub use entity::{Column, Entity, Meta, SubTable, META_COLUMNS};
pub use entity_dal::{EntityDal, UpdateRequest};
pub use errors::DalError;
pub use traits::Dal;

pub use filter::{QueryBuilder, QueryFilter, SortOrder};
pub use type_mapping::{ColumnType, SqlValue};

pub use sqlx;
