//! Mortgage: a monthly amortized loan on a purchase price net of a down payment

use serde::{Deserialize, Serialize};

use super::engine::{AmortizationEngine, LoanTerms, PaymentFrequency};
use super::schedule::{AmortizationPeriod, AmortizationResult};
use crate::error::{require_finite, CalcError, Result};

/// Mortgage inputs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MortgageTerms {
    /// Purchase price / loan amount before the down payment
    pub price: f64,

    #[serde(default)]
    pub down_payment: f64,

    pub annual_rate_percent: f64,

    pub term_years: u32,
}

impl MortgageTerms {
    /// Amount actually borrowed
    pub fn financed_principal(&self) -> Result<f64> {
        require_finite(self.price, "price")?;
        require_finite(self.down_payment, "down_payment")?;

        if self.down_payment < 0.0 {
            return Err(CalcError::invalid("down_payment", "must not be negative"));
        }
        let principal = self.price - self.down_payment;
        if principal <= 0.0 {
            return Err(CalcError::invalid(
                "down_payment",
                "must be smaller than the price",
            ));
        }
        Ok(principal)
    }

    pub fn loan_terms(&self) -> Result<LoanTerms> {
        Ok(LoanTerms::new(
            self.financed_principal()?,
            self.annual_rate_percent,
            self.term_years,
            PaymentFrequency::Monthly,
        ))
    }
}

/// Mortgage calculation output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MortgageResult {
    pub down_payment: f64,
    pub financed_principal: f64,
    pub amortization: AmortizationResult,
}

impl MortgageResult {
    /// (principal, total interest) split of everything paid over the term
    pub fn payment_breakdown(&self) -> PaymentBreakdown {
        PaymentBreakdown {
            principal: self.financed_principal,
            interest: self.amortization.total_interest,
        }
    }

    /// One row per year (rows 1, 13, 25, ...) for balance-over-time charts
    pub fn yearly_balances(&self) -> Vec<&AmortizationPeriod> {
        self.amortization.schedule.iter().step_by(12).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaymentBreakdown {
    pub principal: f64,
    pub interest: f64,
}

/// Amortize a mortgage monthly
pub fn compute_mortgage(terms: &MortgageTerms) -> Result<MortgageResult> {
    let loan = terms.loan_terms()?;
    let financed_principal = loan.principal;
    let amortization = AmortizationEngine::new(loan).compute_schedule()?;

    Ok(MortgageResult {
        down_payment: terms.down_payment,
        financed_principal,
        amortization,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn terms(price: f64, down_payment: f64) -> MortgageTerms {
        MortgageTerms {
            price,
            down_payment,
            annual_rate_percent: 5.0,
            term_years: 30,
        }
    }

    #[test]
    fn test_down_payment_reduces_principal() {
        let result = compute_mortgage(&terms(125_000.0, 25_000.0)).unwrap();

        assert_eq!(result.financed_principal, 100_000.0);
        assert_abs_diff_eq!(result.amortization.periodic_payment, 536.82, epsilon = 0.005);
        assert_eq!(result.amortization.periods_per_year, 12);
    }

    #[test]
    fn test_breakdown_and_yearly_rows() {
        let result = compute_mortgage(&terms(100_000.0, 0.0)).unwrap();
        let breakdown = result.payment_breakdown();

        assert_eq!(breakdown.principal, 100_000.0);
        assert_abs_diff_eq!(
            breakdown.principal + breakdown.interest,
            result.amortization.total_paid,
            epsilon = 1e-6
        );

        let yearly = result.yearly_balances();
        assert_eq!(yearly.len(), 30);
        assert_eq!(yearly[0].period, 1);
        assert_eq!(yearly[1].period, 13);
    }

    #[test]
    fn test_invalid_down_payment() {
        assert!(matches!(
            compute_mortgage(&terms(100_000.0, 100_000.0)),
            Err(CalcError::InvalidInput { field: "down_payment", .. })
        ));
        assert!(matches!(
            compute_mortgage(&terms(100_000.0, -1.0)),
            Err(CalcError::InvalidInput { field: "down_payment", .. })
        ));
    }
}
