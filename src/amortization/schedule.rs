//! Schedule output structures for amortized loans

use serde::{Deserialize, Serialize};

/// A single row of the amortization schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationPeriod {
    /// Period index (1-indexed, contiguous)
    pub period: u32,

    /// Scheduled payment for the period
    pub payment: f64,

    /// Portion of the payment that retires principal
    pub principal: f64,

    /// Portion of the payment that covers accrued interest
    pub interest: f64,

    /// Interest paid from period 1 through this period
    pub cumulative_interest: f64,

    /// Outstanding balance after this period's payment (never negative)
    pub balance: f64,
}

/// Complete amortization result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationResult {
    /// Amount borrowed
    pub principal: f64,

    /// Level payment due every period
    pub periodic_payment: f64,

    /// Payments per year (12 or 52)
    pub periods_per_year: u32,

    /// payment * N
    pub total_paid: f64,

    /// total_paid - principal
    pub total_interest: f64,

    /// Every period 1..=N, never truncated
    pub schedule: Vec<AmortizationPeriod>,
}

impl AmortizationResult {
    /// Number of periods in the schedule
    pub fn total_periods(&self) -> u32 {
        self.schedule.len() as u32
    }

    /// Balance after the final payment
    pub fn final_balance(&self) -> f64 {
        self.schedule.last().map(|r| r.balance).unwrap_or(self.principal)
    }

    /// Get summary statistics
    pub fn summary(&self) -> AmortizationSummary {
        let principal_repaid: f64 = self.schedule.iter().map(|r| r.principal).sum();
        let interest_accrued: f64 = self.schedule.iter().map(|r| r.interest).sum();

        AmortizationSummary {
            total_periods: self.total_periods(),
            periodic_payment: self.periodic_payment,
            total_paid: self.total_paid,
            total_interest: self.total_interest,
            principal_repaid,
            interest_accrued,
            final_balance: self.final_balance(),
        }
    }
}

/// Summary statistics for a schedule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationSummary {
    pub total_periods: u32,
    pub periodic_payment: f64,
    pub total_paid: f64,
    pub total_interest: f64,
    pub principal_repaid: f64,
    pub interest_accrued: f64,
    pub final_balance: f64,
}
