//! Percentage relations
//!
//! Five stateless operations over two operands, dispatched from one tagged query.
//! Keeping a history of past queries is left to the caller.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{ensure_finite, require_finite, CalcError, Result};

/// Direction for a percentage change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeDirection {
    #[default]
    Increase,
    Decrease,
}

impl ChangeDirection {
    fn past_tense(self) -> &'static str {
        match self {
            ChangeDirection::Increase => "increased",
            ChangeDirection::Decrease => "decreased",
        }
    }
}

/// Which relation to compute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum PercentageOperation {
    /// a% of b
    Of,
    /// a is what percent of b
    IsWhatPercentOf,
    /// Distance from a to b relative to a, as a percent
    PercentDifference,
    /// a grown or shrunk by b%
    PercentChange {
        #[serde(default)]
        direction: ChangeDirection,
    },
    /// a expressed as a percent of b
    ValueAsPercentOf,
}

impl PercentageOperation {
    pub fn name(self) -> &'static str {
        match self {
            PercentageOperation::Of => "percent of",
            PercentageOperation::IsWhatPercentOf => "is what percent of",
            PercentageOperation::PercentDifference => "percent difference",
            PercentageOperation::PercentChange { .. } => "percent change",
            PercentageOperation::ValueAsPercentOf => "value as percent of",
        }
    }
}

/// An operation and its two operands
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PercentageQuery {
    #[serde(flatten)]
    pub operation: PercentageOperation,
    pub a: f64,
    pub b: f64,
}

/// Result value with the operands echoed back for display
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PercentageResult {
    #[serde(flatten)]
    pub query: PercentageQuery,
    pub value: f64,
}

/// (a / b) * 100, shared so both ratio relations agree bit for bit
fn ratio_percent(a: f64, b: f64, operation: &'static str) -> Result<f64> {
    if b == 0.0 {
        return Err(CalcError::DivisionByZero { operation });
    }
    Ok((a / b) * 100.0)
}

impl PercentageQuery {
    pub fn new(operation: PercentageOperation, a: f64, b: f64) -> Self {
        Self { operation, a, b }
    }

    pub fn of(percent: f64, value: f64) -> Self {
        Self::new(PercentageOperation::Of, percent, value)
    }

    pub fn is_what_percent_of(part: f64, whole: f64) -> Self {
        Self::new(PercentageOperation::IsWhatPercentOf, part, whole)
    }

    pub fn percent_difference(from: f64, to: f64) -> Self {
        Self::new(PercentageOperation::PercentDifference, from, to)
    }

    pub fn percent_change(value: f64, percent: f64, direction: ChangeDirection) -> Self {
        Self::new(PercentageOperation::PercentChange { direction }, value, percent)
    }

    pub fn value_as_percent_of(value: f64, whole: f64) -> Self {
        Self::new(PercentageOperation::ValueAsPercentOf, value, whole)
    }

    /// Compute the relation
    pub fn evaluate(&self) -> Result<PercentageResult> {
        let a = require_finite(self.a, "a")?;
        let b = require_finite(self.b, "b")?;

        let value = match self.operation {
            PercentageOperation::Of => a * b / 100.0,
            PercentageOperation::IsWhatPercentOf => ratio_percent(a, b, "is what percent of")?,
            PercentageOperation::PercentDifference => {
                if a == 0.0 {
                    return Err(CalcError::DivisionByZero {
                        operation: "percent difference",
                    });
                }
                (((b - a) / a) * 100.0).abs()
            }
            PercentageOperation::PercentChange { direction } => match direction {
                ChangeDirection::Increase => a * (1.0 + b / 100.0),
                ChangeDirection::Decrease => a * (1.0 - b / 100.0),
            },
            PercentageOperation::ValueAsPercentOf => ratio_percent(a, b, "value as percent of")?,
        };

        Ok(PercentageResult {
            query: *self,
            value: ensure_finite(value, self.operation.name())?,
        })
    }
}

impl fmt::Display for PercentageResult {
    /// One-line description with the result to two decimals
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let PercentageQuery { operation, a, b } = self.query;
        let value = self.value;
        match operation {
            PercentageOperation::Of => write!(f, "{}% of {} = {:.2}", a, b, value),
            PercentageOperation::IsWhatPercentOf => write!(f, "{} is {:.2}% of {}", a, value, b),
            PercentageOperation::PercentDifference => {
                write!(f, "Difference between {} and {} is {:.2}%", a, b, value)
            }
            PercentageOperation::PercentChange { direction } => {
                write!(f, "{} {} by {}% = {:.2}", a, direction.past_tense(), b, value)
            }
            PercentageOperation::ValueAsPercentOf => {
                write!(f, "{} as a % of {} = {:.2}%", a, b, value)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn eval(query: PercentageQuery) -> f64 {
        query.evaluate().unwrap().value
    }

    #[test]
    fn test_formulas() {
        assert_relative_eq!(eval(PercentageQuery::of(20.0, 150.0)), 30.0);
        assert_relative_eq!(eval(PercentageQuery::is_what_percent_of(50.0, 200.0)), 25.0);
        assert_relative_eq!(eval(PercentageQuery::percent_difference(50.0, 75.0)), 50.0);
        assert_relative_eq!(eval(PercentageQuery::percent_difference(75.0, 50.0)), 100.0 / 3.0);
        assert_relative_eq!(
            eval(PercentageQuery::percent_change(200.0, 15.0, ChangeDirection::Increase)),
            230.0
        );
        assert_relative_eq!(
            eval(PercentageQuery::percent_change(200.0, 15.0, ChangeDirection::Decrease)),
            170.0
        );
        assert_relative_eq!(eval(PercentageQuery::value_as_percent_of(30.0, 120.0)), 25.0);
    }

    #[test]
    fn test_zero_denominators() {
        for x in [0.0, 1.0, -42.5] {
            assert_eq!(
                PercentageQuery::value_as_percent_of(x, 0.0).evaluate(),
                Err(CalcError::DivisionByZero {
                    operation: "value as percent of"
                })
            );
        }
        assert!(matches!(
            PercentageQuery::is_what_percent_of(5.0, 0.0).evaluate(),
            Err(CalcError::DivisionByZero { .. })
        ));
        assert!(matches!(
            PercentageQuery::percent_difference(0.0, 5.0).evaluate(),
            Err(CalcError::DivisionByZero { .. })
        ));

        // Of and PercentChange never divide
        assert_eq!(eval(PercentageQuery::of(0.0, 0.0)), 0.0);
        assert_eq!(
            eval(PercentageQuery::percent_change(0.0, 0.0, ChangeDirection::Decrease)),
            0.0
        );
    }

    #[test]
    fn test_overflow_and_non_finite_operands() {
        assert!(matches!(
            PercentageQuery::of(f64::MAX, f64::MAX).evaluate(),
            Err(CalcError::NumericOverflow { .. })
        ));
        assert!(matches!(
            PercentageQuery::of(f64::NAN, 1.0).evaluate(),
            Err(CalcError::InvalidInput { field: "a", .. })
        ));
    }

    #[test]
    fn test_repeat_evaluations_are_identical() {
        let queries = [
            PercentageQuery::of(17.3, 912.4),
            PercentageQuery::is_what_percent_of(1.0, 3.0),
            PercentageQuery::percent_difference(7.0, 11.0),
            PercentageQuery::percent_change(99.9, 12.5, ChangeDirection::Decrease),
            PercentageQuery::value_as_percent_of(2.0, 7.0),
        ];

        for query in queries {
            let first = eval(query);
            let second = eval(query);
            assert_eq!(first.to_bits(), second.to_bits());
        }
    }

    #[test]
    fn test_result_echoes_operands_and_describes() {
        let result = PercentageQuery::is_what_percent_of(50.0, 200.0).evaluate().unwrap();
        assert_eq!(result.query.a, 50.0);
        assert_eq!(result.query.b, 200.0);
        assert_eq!(result.to_string(), "50 is 25.00% of 200");

        let change = PercentageQuery::percent_change(80.0, 10.0, ChangeDirection::Decrease)
            .evaluate()
            .unwrap();
        assert_eq!(change.to_string(), "80 decreased by 10% = 72.00");
    }

    #[test]
    fn test_query_json_shape() {
        let json = r#"{"operation":"percent_change","direction":"decrease","a":100.0,"b":25.0}"#;
        let query: PercentageQuery = serde_json::from_str(json).unwrap();
        assert_eq!(query, PercentageQuery::percent_change(100.0, 25.0, ChangeDirection::Decrease));

        let query: PercentageQuery =
            serde_json::from_str(r#"{"operation":"of","a":10,"b":50}"#).unwrap();
        assert_eq!(eval(query), 5.0);
    }

    proptest! {
        #[test]
        fn prop_ratio_relations_agree(a in -1.0e6f64..1.0e6, b in -1.0e6f64..1.0e6) {
            prop_assume!(b != 0.0);
            let lhs = eval(PercentageQuery::is_what_percent_of(a, b));
            let rhs = eval(PercentageQuery::value_as_percent_of(a, b));
            prop_assert_eq!(lhs.to_bits(), rhs.to_bits());
        }

        #[test]
        fn prop_increase_then_decrease_brackets_value(a in 0.0f64..1.0e6, pct in 0.0f64..100.0) {
            let up = eval(PercentageQuery::percent_change(a, pct, ChangeDirection::Increase));
            let down = eval(PercentageQuery::percent_change(a, pct, ChangeDirection::Decrease));
            prop_assert!(down <= a && a <= up);
        }
    }
}
