//! Query filter tree
//!
//! Untyped predicates over columns, combined with AND / OR / NOT.

use crate::operator::Operator;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

/// Single condition in WHERE clause
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryCondition {
    pub field: String,
    pub operator: Operator,
    #[serde(default)]
    pub values: Vec<Value>,
}

/// Logical operators for combining conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogicalOperator {
    And,
    Or,
}

/// Query filter that can be nested
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryFilter {
    Condition(QueryCondition),
    Group {
        operator: LogicalOperator,
        filters: Vec<QueryFilter>,
    },
    Not(Box<QueryFilter>),
}

impl QueryFilter {
    /// Create a simple condition
    pub fn condition(field: &str, operator: Operator, values: Vec<Value>) -> Self {
        Self::Condition(QueryCondition {
            field: field.to_string(),
            operator,
            values,
        })
    }

    /// Create AND group
    pub fn and(filters: Vec<QueryFilter>) -> Self {
        Self::Group {
            operator: LogicalOperator::And,
            filters,
        }
    }

    /// Create OR group
    pub fn or(filters: Vec<QueryFilter>) -> Self {
        Self::Group {
            operator: LogicalOperator::Or,
            filters,
        }
    }

    /// Negate a filter
    #[allow(clippy::should_implement_trait)]
    pub fn not(filter: QueryFilter) -> Self {
        Self::Not(Box::new(filter))
    }

    /// Equal condition; a null value matches NULL columns
    pub fn eq(field: &str, value: Value) -> Self {
        Self::condition(field, Operator::Equal, vec![value])
    }

    /// Not equal condition; a null value matches non-NULL columns
    pub fn ne(field: &str, value: Value) -> Self {
        Self::condition(field, Operator::NotEqual, vec![value])
    }

    pub fn gt(field: &str, value: Value) -> Self {
        Self::condition(field, Operator::GreaterThan, vec![value])
    }

    pub fn gte(field: &str, value: Value) -> Self {
        Self::condition(field, Operator::GreaterThanOrEqual, vec![value])
    }

    pub fn lt(field: &str, value: Value) -> Self {
        Self::condition(field, Operator::LessThan, vec![value])
    }

    pub fn lte(field: &str, value: Value) -> Self {
        Self::condition(field, Operator::LessThanOrEqual, vec![value])
    }

    /// LIKE condition
    pub fn like(field: &str, pattern: &str) -> Self {
        Self::condition(
            field,
            Operator::Like,
            vec![Value::String(pattern.to_string())],
        )
    }

    /// ILIKE condition (case insensitive)
    pub fn ilike(field: &str, pattern: &str) -> Self {
        Self::condition(
            field,
            Operator::ILike,
            vec![Value::String(pattern.to_string())],
        )
    }

    /// IN condition
    pub fn in_values(field: &str, values: Vec<Value>) -> Self {
        Self::condition(field, Operator::In, values)
    }

    /// NOT IN condition
    pub fn not_in_values(field: &str, values: Vec<Value>) -> Self {
        Self::condition(field, Operator::NotIn, values)
    }

    /// BETWEEN condition (inclusive)
    pub fn between(field: &str, low: Value, high: Value) -> Self {
        Self::condition(field, Operator::Between, vec![low, high])
    }

    /// IS NULL condition
    pub fn is_null(field: &str) -> Self {
        Self::condition(field, Operator::IsNull, Vec::new())
    }

    /// IS NOT NULL condition
    pub fn is_not_null(field: &str) -> Self {
        Self::condition(field, Operator::IsNotNull, Vec::new())
    }

    /// Array column shares at least one element with `values`
    pub fn has_any(field: &str, values: Vec<Value>) -> Self {
        Self::condition(field, Operator::HasAny, values)
    }

    /// Array column contains every element of `values`
    pub fn has_all(field: &str, values: Vec<Value>) -> Self {
        Self::condition(field, Operator::HasAll, values)
    }

    /// Every column name referenced anywhere in the tree
    pub fn fields(&self) -> BTreeSet<String> {
        let mut fields = BTreeSet::new();
        self.collect_fields(&mut fields);
        fields
    }

    pub(crate) fn collect_fields(&self, fields: &mut BTreeSet<String>) {
        match self {
            QueryFilter::Condition(condition) => {
                fields.insert(condition.field.clone());
            }
            QueryFilter::Group { filters, .. } => {
                for filter in filters {
                    filter.collect_fields(fields);
                }
            }
            QueryFilter::Not(inner) => inner.collect_fields(fields),
        }
    }
}
