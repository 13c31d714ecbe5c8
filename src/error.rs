//! Error taxonomy shared by all calculation engines

use thiserror::Error;

/// Failure returned by a calculation instead of a disguised NaN/Infinity result
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalcError {
    /// An input is outside the domain the engine accepts
    #[error("invalid input for {field}: {reason}")]
    InvalidInput {
        field: &'static str,
        reason: String,
    },

    /// A percentage relation was asked to divide by a zero operand
    #[error("division by zero in {operation}")]
    DivisionByZero { operation: &'static str },

    /// An intermediate or final value is not representable as a finite f64
    #[error("numeric overflow while computing {context}")]
    NumericOverflow { context: &'static str },
}

pub type Result<T> = std::result::Result<T, CalcError>;

impl CalcError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        CalcError::InvalidInput {
            field,
            reason: reason.into(),
        }
    }
}

/// Reject NaN/Infinity outputs as `NumericOverflow`
pub fn ensure_finite(value: f64, context: &'static str) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(CalcError::NumericOverflow { context })
    }
}

/// Reject NaN/Infinity inputs as `InvalidInput`
pub fn require_finite(value: f64, field: &'static str) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(CalcError::invalid(field, format!("must be a finite number, got {}", value)))
    }
}
