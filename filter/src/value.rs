//! Value types usable in typed filter conditions.

use crate::errors::FilterError;
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde_json::Value;
use uuid::Uuid;

/// A Rust type that can appear as a filter value.
///
/// The associated constants declare which operator families make sense for
/// the type; [`crate::Condition::to_query_filter`] rejects the others.
pub trait FilterValue {
    /// Supports `>`, `>=`, `<`, `<=` and `BETWEEN`
    const SUPPORTS_ORDERING: bool;
    /// Supports `LIKE` and `ILIKE`
    const SUPPORTS_PATTERN: bool;

    fn type_name() -> &'static str;

    /// JSON form of the value; fails for values with no JSON representation
    fn to_filter_json(&self) -> Result<Value, FilterError>;
}

impl FilterValue for String {
    const SUPPORTS_ORDERING: bool = true;
    const SUPPORTS_PATTERN: bool = true;

    fn type_name() -> &'static str {
        "string"
    }

    fn to_filter_json(&self) -> Result<Value, FilterError> {
        Ok(Value::String(self.clone()))
    }
}

impl FilterValue for &str {
    const SUPPORTS_ORDERING: bool = true;
    const SUPPORTS_PATTERN: bool = true;

    fn type_name() -> &'static str {
        "string"
    }

    fn to_filter_json(&self) -> Result<Value, FilterError> {
        Ok(Value::String((*self).to_string()))
    }
}

macro_rules! impl_numeric_filter_value {
    ($($ty:ty => $name:literal),* $(,)?) => {
        $(
            impl FilterValue for $ty {
                const SUPPORTS_ORDERING: bool = true;
                const SUPPORTS_PATTERN: bool = false;

                fn type_name() -> &'static str {
                    $name
                }

                fn to_filter_json(&self) -> Result<Value, FilterError> {
                    Ok(Value::from(*self))
                }
            }
        )*
    };
}

impl_numeric_filter_value!(i16 => "i16", i32 => "i32", i64 => "i64");

impl FilterValue for f64 {
    const SUPPORTS_ORDERING: bool = true;
    const SUPPORTS_PATTERN: bool = false;

    fn type_name() -> &'static str {
        "f64"
    }

    fn to_filter_json(&self) -> Result<Value, FilterError> {
        serde_json::Number::from_f64(*self)
            .map(Value::Number)
            .ok_or(FilterError::NonFiniteNumber(*self))
    }
}

impl FilterValue for bool {
    const SUPPORTS_ORDERING: bool = false;
    const SUPPORTS_PATTERN: bool = false;

    fn type_name() -> &'static str {
        "bool"
    }

    fn to_filter_json(&self) -> Result<Value, FilterError> {
        Ok(Value::Bool(*self))
    }
}

impl FilterValue for Uuid {
    const SUPPORTS_ORDERING: bool = false;
    const SUPPORTS_PATTERN: bool = false;

    fn type_name() -> &'static str {
        "uuid"
    }

    fn to_filter_json(&self) -> Result<Value, FilterError> {
        Ok(Value::String(self.to_string()))
    }
}

impl FilterValue for DateTime<Utc> {
    const SUPPORTS_ORDERING: bool = true;
    const SUPPORTS_PATTERN: bool = false;

    fn type_name() -> &'static str {
        "timestamp"
    }

    fn to_filter_json(&self) -> Result<Value, FilterError> {
        Ok(Value::String(self.to_rfc3339_opts(SecondsFormat::AutoSi, true)))
    }
}

impl FilterValue for NaiveDate {
    const SUPPORTS_ORDERING: bool = true;
    const SUPPORTS_PATTERN: bool = false;

    fn type_name() -> &'static str {
        "date"
    }

    fn to_filter_json(&self) -> Result<Value, FilterError> {
        Ok(Value::String(self.format("%Y-%m-%d").to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_json_representation() {
        assert_eq!("abc".to_filter_json().unwrap(), json!("abc"));
        assert_eq!(7i16.to_filter_json().unwrap(), json!(7));
        assert_eq!(2.5f64.to_filter_json().unwrap(), json!(2.5));
        assert_eq!(
            NaiveDate::from_ymd_opt(2024, 1, 31)
                .unwrap()
                .to_filter_json()
                .unwrap(),
            json!("2024-01-31")
        );
        let ts = Utc.with_ymd_and_hms(2024, 1, 31, 8, 0, 0).unwrap();
        assert_eq!(ts.to_filter_json().unwrap(), json!("2024-01-31T08:00:00Z"));
    }

    #[test]
    fn test_non_finite_floats_rejected() {
        assert!(matches!(
            f64::NAN.to_filter_json(),
            Err(FilterError::NonFiniteNumber(_))
        ));
        assert!(f64::INFINITY.to_filter_json().is_err());
        assert!(f64::NEG_INFINITY.to_filter_json().is_err());
    }

    #[test]
    fn test_operator_families() {
        assert!(<String as FilterValue>::SUPPORTS_PATTERN);
        assert!(!<bool as FilterValue>::SUPPORTS_ORDERING);
        assert!(!<Uuid as FilterValue>::SUPPORTS_PATTERN);
        assert!(<DateTime<Utc> as FilterValue>::SUPPORTS_ORDERING);
    }
}
