//! Filter operators and their arity rules.

use crate::errors::FilterError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Query condition operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Operator {
    Equal,              // =
    NotEqual,           // !=
    GreaterThan,        // >
    GreaterThanOrEqual, // >=
    LessThan,           // <
    LessThanOrEqual,    // <=
    Like,               // LIKE
    #[serde(rename = "ILIKE")]
    ILike,              // ILIKE (case insensitive)
    In,                 // IN
    NotIn,              // NOT IN
    Between,            // BETWEEN .. AND ..
    IsNull,             // IS NULL
    IsNotNull,          // IS NOT NULL
    HasAny,             // && (array overlap)
    HasAll,             // @> (array contains)
}

/// Number of values an operator takes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    None,
    One,
    Two,
    AtLeastOne,
}

impl Arity {
    pub fn accepts(&self, count: usize) -> bool {
        match self {
            Arity::None => count == 0,
            Arity::One => count == 1,
            Arity::Two => count == 2,
            Arity::AtLeastOne => count >= 1,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::None => write!(f, "no"),
            Arity::One => write!(f, "exactly one"),
            Arity::Two => write!(f, "exactly two"),
            Arity::AtLeastOne => write!(f, "at least one"),
        }
    }
}

impl Operator {
    pub const ALL: [Operator; 15] = [
        Operator::Equal,
        Operator::NotEqual,
        Operator::GreaterThan,
        Operator::GreaterThanOrEqual,
        Operator::LessThan,
        Operator::LessThanOrEqual,
        Operator::Like,
        Operator::ILike,
        Operator::In,
        Operator::NotIn,
        Operator::Between,
        Operator::IsNull,
        Operator::IsNotNull,
        Operator::HasAny,
        Operator::HasAll,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Operator::Equal => "EQUAL",
            Operator::NotEqual => "NOT_EQUAL",
            Operator::GreaterThan => "GREATER_THAN",
            Operator::GreaterThanOrEqual => "GREATER_THAN_OR_EQUAL",
            Operator::LessThan => "LESS_THAN",
            Operator::LessThanOrEqual => "LESS_THAN_OR_EQUAL",
            Operator::Like => "LIKE",
            Operator::ILike => "ILIKE",
            Operator::In => "IN",
            Operator::NotIn => "NOT_IN",
            Operator::Between => "BETWEEN",
            Operator::IsNull => "IS_NULL",
            Operator::IsNotNull => "IS_NOT_NULL",
            Operator::HasAny => "HAS_ANY",
            Operator::HasAll => "HAS_ALL",
        }
    }

    pub fn arity(&self) -> Arity {
        match self {
            Operator::IsNull | Operator::IsNotNull => Arity::None,
            Operator::Between => Arity::Two,
            Operator::In | Operator::NotIn | Operator::HasAny | Operator::HasAll => {
                Arity::AtLeastOne
            }
            _ => Arity::One,
        }
    }

    /// `>`, `>=`, `<`, `<=` and `BETWEEN` need an ordered value type
    pub fn requires_ordering(&self) -> bool {
        matches!(
            self,
            Operator::GreaterThan
                | Operator::GreaterThanOrEqual
                | Operator::LessThan
                | Operator::LessThanOrEqual
                | Operator::Between
        )
    }

    /// `LIKE` and `ILIKE` need a textual value type
    pub fn requires_pattern(&self) -> bool {
        matches!(self, Operator::Like | Operator::ILike)
    }

    /// Fail unless `count` values fit this operator
    pub fn check_arity(&self, count: usize) -> Result<(), FilterError> {
        let arity = self.arity();
        if arity.accepts(count) {
            Ok(())
        } else {
            Err(FilterError::InvalidArity {
                operator: *self,
                expected: arity.to_string(),
                actual: count,
            })
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Operator {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Operator::ALL
            .into_iter()
            .find(|op| op.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| FilterError::UnknownOperator(s.to_string()))
    }
}
