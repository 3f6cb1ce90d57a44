//! Collecting typed conditions into a filter tree.

use crate::condition::Condition;
use crate::errors::FilterError;
use crate::query::{LogicalOperator, QueryFilter};
use crate::value::FilterValue;

/// Per-entity filter struct, one optional [`Condition`] per column.
///
/// ```
/// use filter::{Condition, EntityFilter, FilterError, FilterSet, QueryFilter};
///
/// #[derive(Default)]
/// struct ProductFilter {
///     name: Option<Condition<String>>,
///     price: Option<Condition<f64>>,
/// }
///
/// impl EntityFilter for ProductFilter {
///     fn to_query_filter(&self) -> Result<Option<QueryFilter>, FilterError> {
///         Ok(FilterSet::and()
///             .condition("name", self.name.as_ref())?
///             .condition("price", self.price.as_ref())?
///             .build())
///     }
/// }
///
/// let filter = ProductFilter {
///     price: Some(Condition::less_than(20.0)),
///     ..Default::default()
/// };
/// assert!(filter.to_query_filter().unwrap().is_some());
/// assert!(ProductFilter::default().to_query_filter().unwrap().is_none());
/// ```
pub trait EntityFilter {
    /// `None` when no condition is set
    fn to_query_filter(&self) -> Result<Option<QueryFilter>, FilterError>;
}

/// Builder for a group of filters under one logical operator
#[derive(Debug, Clone)]
pub struct FilterSet {
    operator: LogicalOperator,
    filters: Vec<QueryFilter>,
}

impl FilterSet {
    pub fn new(operator: LogicalOperator) -> Self {
        Self {
            operator,
            filters: Vec::new(),
        }
    }

    pub fn and() -> Self {
        Self::new(LogicalOperator::And)
    }

    pub fn or() -> Self {
        Self::new(LogicalOperator::Or)
    }

    /// Add `condition` on `column` when present
    pub fn condition<T: FilterValue>(
        mut self,
        column: &str,
        condition: Option<&Condition<T>>,
    ) -> Result<Self, FilterError> {
        if let Some(condition) = condition {
            self.filters.push(condition.to_query_filter(column)?);
        }
        Ok(self)
    }

    /// Add an untyped filter
    pub fn filter(mut self, filter: QueryFilter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Add a nested set; empty sets are skipped
    pub fn nested(mut self, set: FilterSet) -> Self {
        if let Some(filter) = set.build() {
            self.filters.push(filter);
        }
        self
    }

    /// Add the filter produced by another entity filter, if any
    pub fn entity<F: EntityFilter + ?Sized>(mut self, filter: &F) -> Result<Self, FilterError> {
        if let Some(filter) = filter.to_query_filter()? {
            self.filters.push(filter);
        }
        Ok(self)
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// `None` when empty, the single filter unwrapped, otherwise a group
    pub fn build(mut self) -> Option<QueryFilter> {
        match self.filters.len() {
            0 => None,
            1 => self.filters.pop(),
            _ => Some(QueryFilter::Group {
                operator: self.operator,
                filters: self.filters,
            }),
        }
    }
}

impl Default for FilterSet {
    fn default() -> Self {
        Self::and()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_set_builds_nothing() {
        let set = FilterSet::and()
            .condition::<String>("name", None)
            .unwrap();
        assert!(set.is_empty());
        assert!(set.build().is_none());
    }

    #[test]
    fn test_single_filter_unwrapped() {
        let filter = FilterSet::or()
            .condition("status", Some(&Condition::equal("active")))
            .unwrap()
            .build();
        assert_eq!(filter, Some(QueryFilter::eq("status", json!("active"))));
    }

    #[test]
    fn test_nested_groups() {
        let inner = FilterSet::or()
            .filter(QueryFilter::eq("status", json!("active")))
            .filter(QueryFilter::eq("status", json!("pending")));
        let filter = FilterSet::and()
            .condition("price", Some(&Condition::greater_than(10.0)))
            .unwrap()
            .nested(inner)
            .nested(FilterSet::or())
            .build();

        assert_eq!(
            filter,
            Some(QueryFilter::and(vec![
                QueryFilter::gt("price", json!(10.0)),
                QueryFilter::or(vec![
                    QueryFilter::eq("status", json!("active")),
                    QueryFilter::eq("status", json!("pending")),
                ]),
            ]))
        );
    }

    #[test]
    fn test_invalid_condition_propagates() {
        let result = FilterSet::and().condition("active", Some(&Condition::like(true)));
        assert!(result.is_err());
    }
}
