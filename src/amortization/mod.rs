//! Loan and mortgage amortization

mod engine;
mod schedule;
mod mortgage;

pub use engine::{
    compute_schedule, periodic_payment, AmortizationEngine, LoanTerms, PaymentFrequency,
};
pub use schedule::{AmortizationPeriod, AmortizationResult, AmortizationSummary};
pub use mortgage::{compute_mortgage, MortgageResult, MortgageTerms, PaymentBreakdown};
