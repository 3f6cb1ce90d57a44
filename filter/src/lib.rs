//! Typed filter conditions and SQL WHERE clause generation.
//!
//! Consumers describe predicates either as typed [`Condition`]s attached to
//! columns (usually through an [`EntityFilter`] struct) or directly as a
//! [`QueryFilter`] tree. [`SqlGenerator`] turns the tree into a
//! parameterized PostgreSQL fragment.

pub mod builder;
pub mod condition;
pub mod errors;
pub mod operator;
pub mod ordering;
pub mod query;
pub mod set;
pub mod sql_generation;
pub mod validation;
pub mod value;

pub use builder::QueryBuilder;
pub use condition::Condition;
pub use errors::FilterError;
pub use operator::{Arity, Operator};
pub use ordering::SortOrder;
pub use query::{LogicalOperator, QueryCondition, QueryFilter};
pub use set::{EntityFilter, FilterSet};
pub use sql_generation::{QueryParam, SqlGenerator};
pub use validation::{quote_identifier, validate_identifier, ValidatedIdentifier, ValidationError};
pub use value::FilterValue;
