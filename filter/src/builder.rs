//! Query builder utilities
//!
//! This module collects filters, ordering and pagination for a list query.

use crate::errors::FilterError;
use crate::ordering::SortOrder;
use crate::query::QueryFilter;
use crate::set::EntityFilter;
use crate::sql_generation::{QueryParam, SqlGenerator};
use std::collections::BTreeSet;

/// Query builder for constructing list and count queries
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    pub(crate) conditions: Vec<QueryFilter>,
    pub(crate) order_by: Vec<(String, SortOrder)>,
    pub(crate) limit: Option<i64>,
    pub(crate) offset: Option<i64>,
    pub(crate) include_deleted: bool,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a filter condition
    pub fn filter(mut self, filter: QueryFilter) -> Self {
        self.conditions.push(filter);
        self
    }

    /// Add multiple filters (combined with AND)
    pub fn filters(mut self, filters: Vec<QueryFilter>) -> Self {
        self.conditions.extend(filters);
        self
    }

    /// Add the conditions of an entity filter struct, if any are set
    pub fn entity_filter<F: EntityFilter + ?Sized>(mut self, filter: &F) -> Result<Self, FilterError> {
        if let Some(filter) = filter.to_query_filter()? {
            self.conditions.push(filter);
        }
        Ok(self)
    }

    /// Add ordering
    pub fn order_by(mut self, field: &str, order: SortOrder) -> Self {
        self.order_by.push((field.to_string(), order));
        self
    }

    /// Add limit
    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Add offset
    pub fn offset(mut self, offset: i64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Also return soft-deleted rows
    pub fn include_deleted(mut self, include: bool) -> Self {
        self.include_deleted = include;
        self
    }

    pub fn conditions(&self) -> &[QueryFilter] {
        &self.conditions
    }

    pub fn ordering(&self) -> &[(String, SortOrder)] {
        &self.order_by
    }

    pub fn get_limit(&self) -> Option<i64> {
        self.limit
    }

    pub fn get_offset(&self) -> Option<i64> {
        self.offset
    }

    pub fn includes_deleted(&self) -> bool {
        self.include_deleted
    }

    /// Column names used by filters and ordering
    pub fn referenced_fields(&self) -> BTreeSet<String> {
        let mut fields = BTreeSet::new();
        for condition in &self.conditions {
            condition.collect_fields(&mut fields);
        }
        for (field, _) in &self.order_by {
            fields.insert(field.clone());
        }
        fields
    }

    /// Build WHERE clause
    pub fn build_where_clause(&self, start: usize) -> Result<(String, Vec<QueryParam>), FilterError> {
        SqlGenerator::build_where_clause(&self.conditions, start)
    }

    /// Build ORDER BY clause
    pub fn build_order_clause(&self) -> Result<String, FilterError> {
        SqlGenerator::build_order_clause(&self.order_by)
    }

    /// Build LIMIT/OFFSET clause
    pub fn build_limit_clause(&self) -> String {
        SqlGenerator::build_limit_clause(self.limit, self.offset)
    }

    /// Build complete query parts (WHERE, ORDER BY, LIMIT, params)
    pub fn build(&self) -> Result<(String, String, String, Vec<QueryParam>), FilterError> {
        let (where_clause, params) = self.build_where_clause(1)?;
        let order_clause = self.build_order_clause()?;
        let limit_clause = self.build_limit_clause();

        Ok((where_clause, order_clause, limit_clause, params))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::Condition;
    use crate::set::FilterSet;
    use serde_json::json;

    struct OrderFilter {
        status: Option<Condition<String>>,
        total: Option<Condition<f64>>,
    }

    impl EntityFilter for OrderFilter {
        fn to_query_filter(&self) -> Result<Option<QueryFilter>, FilterError> {
            Ok(FilterSet::and()
                .condition("status", self.status.as_ref())?
                .condition("total", self.total.as_ref())?
                .build())
        }
    }

    #[test]
    fn test_complete_query() {
        let query = QueryBuilder::new()
            .filter(QueryFilter::eq("status", json!("paid")))
            .filter(QueryFilter::gt("total", json!(100)))
            .order_by("created_at", SortOrder::Desc)
            .limit(10)
            .offset(20);

        let (where_clause, order_clause, limit_clause, params) = query.build().unwrap();

        assert_eq!(where_clause, "WHERE \"status\" = $1 AND \"total\" > $2");
        assert_eq!(order_clause, "ORDER BY \"created_at\" DESC");
        assert_eq!(limit_clause, "LIMIT 10 OFFSET 20");
        assert_eq!(params.len(), 2);
        assert!(!query.includes_deleted());
    }

    #[test]
    fn test_entity_filter() {
        let filter = OrderFilter {
            status: Some(Condition::in_values(vec![
                "paid".to_string(),
                "shipped".to_string(),
            ])),
            total: Some(Condition::between(10.0, 50.0)),
        };

        let query = QueryBuilder::new().entity_filter(&filter).unwrap();
        let (where_clause, params) = query.build_where_clause(1).unwrap();

        assert_eq!(
            where_clause,
            "WHERE (\"status\" IN ($1, $2) AND \"total\" BETWEEN $3 AND $4)"
        );
        assert_eq!(params.len(), 4);

        let empty = OrderFilter {
            status: None,
            total: None,
        };
        assert!(QueryBuilder::new()
            .entity_filter(&empty)
            .unwrap()
            .conditions()
            .is_empty());
    }

    #[test]
    fn test_referenced_fields() {
        let query = QueryBuilder::new()
            .filter(QueryFilter::or(vec![
                QueryFilter::eq("a", json!(1)),
                QueryFilter::is_null("b"),
            ]))
            .order_by("c", SortOrder::Asc)
            .include_deleted(true);

        let fields: Vec<String> = query.referenced_fields().into_iter().collect();
        assert_eq!(fields, vec!["a", "b", "c"]);
        assert!(query.includes_deleted());
    }
}
