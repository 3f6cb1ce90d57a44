//! Column types and SQL values shared by the filter and DAL crates.
//!
//! [`ColumnType`] describes how a column is stored in PostgreSQL and
//! [`SqlValue`] carries a value already converted to that storage type, so
//! it can be bound to a statement without guessing.

pub mod errors;
pub mod serialize;
pub mod sql;
pub mod types;

pub use errors::TypeMappingError;
pub use serialize::to_column_map;
pub use sql::{is_optional_type, rust_type_to_column_type};
pub use types::{ColumnType, SqlValue};
