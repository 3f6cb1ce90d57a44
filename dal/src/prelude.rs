//! Convenience re-exports for common DAL usage

pub use crate::connection::ConnectionProvider;
pub use crate::entity::{Column, Entity, Meta, SubTable};
pub use crate::entity_dal::{EntityDal, UpdateRequest};
pub use crate::errors::DalError;
pub use crate::traits::Dal;

// Filtering
pub use filter::{Condition, EntityFilter, FilterSet, Operator, QueryBuilder, QueryFilter, SortOrder};

pub use type_mapping::ColumnType;

pub use uuid::Uuid;
