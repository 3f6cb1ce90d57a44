//! SQL generation for filter trees
//!
//! Produces PostgreSQL fragments with `$n` placeholders. Identifiers are
//! validated and double-quoted; values never appear in the SQL text.

use crate::errors::FilterError;
use crate::operator::Operator;
use crate::ordering::SortOrder;
use crate::query::{LogicalOperator, QueryCondition, QueryFilter};
use crate::validation::quote_identifier;
use serde_json::Value;

/// A bound parameter together with the column it is compared against, so
/// callers can convert the value to the column's storage type.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryParam {
    pub field: String,
    pub value: Value,
}

/// Stateful generator numbering placeholders from a chosen start index.
#[derive(Debug, Clone)]
pub struct SqlGenerator {
    next_index: usize,
    params: Vec<QueryParam>,
}

impl Default for SqlGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl SqlGenerator {
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    /// Number the first placeholder `$start`, for statements that already
    /// bind `start - 1` parameters before the WHERE clause.
    pub fn starting_at(start: usize) -> Self {
        Self {
            next_index: start.max(1),
            params: Vec::new(),
        }
    }

    /// Index the next placeholder will use
    pub fn next_index(&self) -> usize {
        self.next_index
    }

    pub fn params(&self) -> &[QueryParam] {
        &self.params
    }

    pub fn into_params(self) -> Vec<QueryParam> {
        self.params
    }

    /// Render `filters` joined with AND; `None` when there are none
    pub fn conditions_sql(&mut self, filters: &[QueryFilter]) -> Result<Option<String>, FilterError> {
        if filters.is_empty() {
            return Ok(None);
        }
        let parts = filters
            .iter()
            .map(|filter| self.filter_sql(filter))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Some(parts.join(" AND ")))
    }

    /// Render a single filter tree
    pub fn filter_sql(&mut self, filter: &QueryFilter) -> Result<String, FilterError> {
        match filter {
            QueryFilter::Condition(condition) => self.condition_sql(condition),
            QueryFilter::Group { operator, filters } => {
                if filters.is_empty() {
                    return Ok(match operator {
                        LogicalOperator::And => "TRUE".to_string(),
                        LogicalOperator::Or => "FALSE".to_string(),
                    });
                }

                let operator_str = match operator {
                    LogicalOperator::And => " AND ",
                    LogicalOperator::Or => " OR ",
                };

                let group_conditions = filters
                    .iter()
                    .map(|f| self.filter_sql(f))
                    .collect::<Result<Vec<_>, _>>()?
                    .join(operator_str);

                Ok(format!("({})", group_conditions))
            }
            QueryFilter::Not(inner) => Ok(format!("NOT ({})", self.filter_sql(inner)?)),
        }
    }

    /// `field <symbol> $n` with a single non-null value
    fn comparison_sql(
        &mut self,
        field: &str,
        condition: &QueryCondition,
        symbol: &str,
    ) -> Result<String, FilterError> {
        let value = &condition.values[0];
        if value.is_null() {
            return Err(FilterError::NullValue {
                operator: condition.operator,
            });
        }
        let param = self.push_param(&condition.field, value);
        Ok(format!("{} {} {}", field, symbol, param))
    }

    fn condition_sql(&mut self, condition: &QueryCondition) -> Result<String, FilterError> {
        let field = quote_identifier(&condition.field)?;
        let operator = condition.operator;
        let values = &condition.values;

        // List operators tolerate an empty list and collapse to a constant
        match operator {
            Operator::In | Operator::HasAny if values.is_empty() => return Ok("FALSE".to_string()),
            Operator::NotIn | Operator::HasAll if values.is_empty() => {
                return Ok("TRUE".to_string())
            }
            _ => operator.check_arity(values.len())?,
        }

        let sql = match operator {
            Operator::Equal if values[0].is_null() => format!("{} IS NULL", field),
            Operator::NotEqual if values[0].is_null() => format!("{} IS NOT NULL", field),
            Operator::Equal => self.comparison_sql(&field, condition, "=")?,
            Operator::NotEqual => self.comparison_sql(&field, condition, "!=")?,
            Operator::GreaterThan => self.comparison_sql(&field, condition, ">")?,
            Operator::GreaterThanOrEqual => self.comparison_sql(&field, condition, ">=")?,
            Operator::LessThan => self.comparison_sql(&field, condition, "<")?,
            Operator::LessThanOrEqual => self.comparison_sql(&field, condition, "<=")?,
            Operator::Like => self.comparison_sql(&field, condition, "LIKE")?,
            Operator::ILike => self.comparison_sql(&field, condition, "ILIKE")?,
            Operator::Between => {
                if values.iter().any(Value::is_null) {
                    return Err(FilterError::NullValue { operator });
                }
                let low = self.push_param(&condition.field, &values[0]);
                let high = self.push_param(&condition.field, &values[1]);
                format!("{} BETWEEN {} AND {}", field, low, high)
            }
            Operator::In | Operator::NotIn => {
                let placeholders = self.push_params(&condition.field, values);
                let keyword = if operator == Operator::In { "IN" } else { "NOT IN" };
                format!("{} {} ({})", field, keyword, placeholders.join(", "))
            }
            Operator::HasAny | Operator::HasAll => {
                let placeholders = self.push_params(&condition.field, values);
                let symbol = if operator == Operator::HasAny { "&&" } else { "@>" };
                format!("{} {} ARRAY[{}]", field, symbol, placeholders.join(", "))
            }
            Operator::IsNull => format!("{} IS NULL", field),
            Operator::IsNotNull => format!("{} IS NOT NULL", field),
        };

        Ok(sql)
    }

    fn push_param(&mut self, field: &str, value: &Value) -> String {
        let placeholder = format!("${}", self.next_index);
        self.next_index += 1;
        self.params.push(QueryParam {
            field: field.to_string(),
            value: value.clone(),
        });
        placeholder
    }

    fn push_params(&mut self, field: &str, values: &[Value]) -> Vec<String> {
        values
            .iter()
            .map(|value| self.push_param(field, value))
            .collect()
    }

    /// Build WHERE clause from conditions, numbering placeholders from `start`
    pub fn build_where_clause(
        conditions: &[QueryFilter],
        start: usize,
    ) -> Result<(String, Vec<QueryParam>), FilterError> {
        let mut generator = Self::starting_at(start);
        let clause = match generator.conditions_sql(conditions)? {
            Some(sql) => format!("WHERE {}", sql),
            None => String::new(),
        };
        Ok((clause, generator.into_params()))
    }

    /// Build ORDER BY clause
    pub fn build_order_clause(order_by: &[(String, SortOrder)]) -> Result<String, FilterError> {
        if order_by.is_empty() {
            return Ok(String::new());
        }

        let order_items = order_by
            .iter()
            .map(|(field, order)| Ok(format!("{} {}", quote_identifier(field)?, order.to_sql())))
            .collect::<Result<Vec<String>, FilterError>>()?;

        Ok(format!("ORDER BY {}", order_items.join(", ")))
    }

    /// Build LIMIT/OFFSET clause
    pub fn build_limit_clause(limit: Option<i64>, offset: Option<i64>) -> String {
        let mut clauses = Vec::new();

        if let Some(limit) = limit {
            clauses.push(format!("LIMIT {}", limit.max(0)));
        }

        if let Some(offset) = offset {
            clauses.push(format!("OFFSET {}", offset.max(0)));
        }

        clauses.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn render(filter: QueryFilter) -> (String, Vec<Value>) {
        let mut generator = SqlGenerator::new();
        let sql = generator.filter_sql(&filter).unwrap();
        let values = generator.into_params().into_iter().map(|p| p.value).collect();
        (sql, values)
    }

    #[test]
    fn test_comparison_operators() {
        assert_eq!(
            render(QueryFilter::eq("name", json!("Lamp"))),
            ("\"name\" = $1".to_string(), vec![json!("Lamp")])
        );
        assert_eq!(
            render(QueryFilter::ne("status", json!("draft"))).0,
            "\"status\" != $1"
        );
        assert_eq!(
            render(QueryFilter::gte("price", json!(10))).0,
            "\"price\" >= $1"
        );
        assert_eq!(
            render(QueryFilter::ilike("name", "%lamp%")).0,
            "\"name\" ILIKE $1"
        );
        for (op, symbol) in [
            (Operator::GreaterThan, ">"),
            (Operator::LessThan, "<"),
            (Operator::LessThanOrEqual, "<="),
            (Operator::Like, "LIKE"),
        ] {
            let filter = QueryFilter::condition("price", op, vec![json!(1)]);
            assert_eq!(render(filter).0, format!("\"price\" {} $1", symbol));
        }
    }

    #[test]
    fn test_null_equality() {
        assert_eq!(
            render(QueryFilter::eq("parent_id", Value::Null)),
            ("\"parent_id\" IS NULL".to_string(), vec![])
        );
        assert_eq!(
            render(QueryFilter::ne("parent_id", Value::Null)).0,
            "\"parent_id\" IS NOT NULL"
        );

        let mut generator = SqlGenerator::new();
        assert!(matches!(
            generator.filter_sql(&QueryFilter::gt("price", Value::Null)),
            Err(FilterError::NullValue { .. })
        ));
    }

    #[test]
    fn test_list_operators() {
        assert_eq!(
            render(QueryFilter::in_values("id", vec![json!(1), json!(2)])),
            ("\"id\" IN ($1, $2)".to_string(), vec![json!(1), json!(2)])
        );
        assert_eq!(
            render(QueryFilter::not_in_values("id", vec![json!(3)])).0,
            "\"id\" NOT IN ($1)"
        );
        assert_eq!(
            render(QueryFilter::has_any("tags", vec![json!("a"), json!("b")])).0,
            "\"tags\" && ARRAY[$1, $2]"
        );
        assert_eq!(
            render(QueryFilter::has_all("tags", vec![json!("a")])).0,
            "\"tags\" @> ARRAY[$1]"
        );
    }

    #[test]
    fn test_empty_lists_collapse() {
        assert_eq!(render(QueryFilter::in_values("id", vec![])).0, "FALSE");
        assert_eq!(render(QueryFilter::not_in_values("id", vec![])).0, "TRUE");
        assert_eq!(render(QueryFilter::has_any("tags", vec![])).0, "FALSE");
        assert_eq!(render(QueryFilter::has_all("tags", vec![])).0, "TRUE");
    }

    #[test]
    fn test_empty_groups() {
        assert_eq!(render(QueryFilter::and(vec![])).0, "TRUE");
        assert_eq!(render(QueryFilter::or(vec![])).0, "FALSE");
    }

    #[test]
    fn test_between_and_null_checks() {
        assert_eq!(
            render(QueryFilter::between("price", json!(1), json!(5))),
            (
                "\"price\" BETWEEN $1 AND $2".to_string(),
                vec![json!(1), json!(5)]
            )
        );
        assert_eq!(
            render(QueryFilter::is_not_null("deleted_at")).0,
            "\"deleted_at\" IS NOT NULL"
        );
    }

    #[test]
    fn test_nested_groups_and_not() {
        let filter = QueryFilter::and(vec![
            QueryFilter::eq("status", json!("active")),
            QueryFilter::or(vec![
                QueryFilter::lt("price", json!(10)),
                QueryFilter::not(QueryFilter::like("name", "%sale%")),
            ]),
        ]);

        let (sql, values) = render(filter);
        assert_eq!(
            sql,
            "(\"status\" = $1 AND (\"price\" < $2 OR NOT (\"name\" LIKE $3)))"
        );
        assert_eq!(values, vec![json!("active"), json!(10), json!("%sale%")]);
    }

    #[test]
    fn test_start_index_and_field_tracking() {
        let (clause, params) = SqlGenerator::build_where_clause(
            &[
                QueryFilter::eq("name", json!("x")),
                QueryFilter::gt("price", json!(2)),
            ],
            3,
        )
        .unwrap();

        assert_eq!(clause, "WHERE \"name\" = $3 AND \"price\" > $4");
        assert_eq!(params[0].field, "name");
        assert_eq!(params[1].field, "price");

        let (empty, params) = SqlGenerator::build_where_clause(&[], 1).unwrap();
        assert!(empty.is_empty());
        assert!(params.is_empty());
    }

    #[test]
    fn test_injection_in_field_name_rejected() {
        let mut generator = SqlGenerator::new();
        let result = generator.filter_sql(&QueryFilter::eq("name; DROP TABLE users", json!(1)));
        assert!(matches!(result, Err(FilterError::InvalidIdentifier(_))));
    }

    #[test]
    fn test_arity_checked_for_untyped_filters() {
        let mut generator = SqlGenerator::new();
        let filter = QueryFilter::condition("price", Operator::Between, vec![json!(1)]);
        assert!(matches!(
            generator.filter_sql(&filter),
            Err(FilterError::InvalidArity { .. })
        ));
    }

    #[test]
    fn test_order_and_limit() {
        assert_eq!(
            SqlGenerator::build_order_clause(&[
                ("created_at".to_string(), SortOrder::Desc),
                ("name".to_string(), SortOrder::Asc),
            ])
            .unwrap(),
            "ORDER BY \"created_at\" DESC, \"name\" ASC"
        );
        assert!(SqlGenerator::build_order_clause(&[("bad name".to_string(), SortOrder::Asc)]).is_err());
        assert_eq!(
            SqlGenerator::build_limit_clause(Some(10), Some(20)),
            "LIMIT 10 OFFSET 20"
        );
        assert_eq!(SqlGenerator::build_limit_clause(None, None), "");
    }
}
