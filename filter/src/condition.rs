//! Typed filter conditions.

use crate::errors::FilterError;
use crate::operator::Operator;
use crate::query::QueryFilter;
use crate::value::FilterValue;
use serde::{Deserialize, Serialize};

/// A typed predicate: one operator and its values.
///
/// Serialized as `{"op": "GREATER_THAN", "values": [10]}`, which is the
/// shape filter structs accept from request bodies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition<T> {
    pub op: Operator,
    #[serde(default = "Vec::new")]
    pub values: Vec<T>,
}

impl<T> Condition<T> {
    pub fn new(op: Operator, values: Vec<T>) -> Self {
        Self { op, values }
    }

    pub fn equal(value: T) -> Self {
        Self::new(Operator::Equal, vec![value])
    }

    pub fn not_equal(value: T) -> Self {
        Self::new(Operator::NotEqual, vec![value])
    }

    pub fn greater_than(value: T) -> Self {
        Self::new(Operator::GreaterThan, vec![value])
    }

    pub fn greater_than_or_equal(value: T) -> Self {
        Self::new(Operator::GreaterThanOrEqual, vec![value])
    }

    pub fn less_than(value: T) -> Self {
        Self::new(Operator::LessThan, vec![value])
    }

    pub fn less_than_or_equal(value: T) -> Self {
        Self::new(Operator::LessThanOrEqual, vec![value])
    }

    pub fn like(pattern: T) -> Self {
        Self::new(Operator::Like, vec![pattern])
    }

    pub fn ilike(pattern: T) -> Self {
        Self::new(Operator::ILike, vec![pattern])
    }

    pub fn in_values(values: Vec<T>) -> Self {
        Self::new(Operator::In, values)
    }

    pub fn not_in(values: Vec<T>) -> Self {
        Self::new(Operator::NotIn, values)
    }

    pub fn between(low: T, high: T) -> Self {
        Self::new(Operator::Between, vec![low, high])
    }

    pub fn is_null() -> Self {
        Self::new(Operator::IsNull, Vec::new())
    }

    pub fn is_not_null() -> Self {
        Self::new(Operator::IsNotNull, Vec::new())
    }

    pub fn has_any(values: Vec<T>) -> Self {
        Self::new(Operator::HasAny, values)
    }

    pub fn has_all(values: Vec<T>) -> Self {
        Self::new(Operator::HasAll, values)
    }
}

impl<T: FilterValue> Condition<T> {
    /// Check arity and that `T` supports the operator
    pub fn validate(&self) -> Result<(), FilterError> {
        self.op.check_arity(self.values.len())?;

        let supported = (!self.op.requires_ordering() || T::SUPPORTS_ORDERING)
            && (!self.op.requires_pattern() || T::SUPPORTS_PATTERN);
        if !supported {
            return Err(FilterError::UnsupportedOperator {
                operator: self.op,
                value_type: T::type_name(),
            });
        }
        Ok(())
    }

    /// Attach the condition to `column`
    pub fn to_query_filter(&self, column: &str) -> Result<QueryFilter, FilterError> {
        self.validate()?;
        let values = self
            .values
            .iter()
            .map(FilterValue::to_filter_json)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(QueryFilter::condition(column, self.op, values))
    }
}
