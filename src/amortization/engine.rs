//! Fixed-rate, fixed-term loan amortization

use serde::{Deserialize, Serialize};

use super::schedule::{AmortizationPeriod, AmortizationResult};
use crate::error::{ensure_finite, require_finite, CalcError, Result};

/// How often payments are made
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentFrequency {
    #[default]
    Monthly,
    Weekly,
}

impl PaymentFrequency {
    pub fn periods_per_year(self) -> u32 {
        match self {
            PaymentFrequency::Monthly => 12,
            PaymentFrequency::Weekly => 52,
        }
    }

    /// Label for a single period ("Month" / "Week")
    pub fn period_label(self) -> &'static str {
        match self {
            PaymentFrequency::Monthly => "Month",
            PaymentFrequency::Weekly => "Week",
        }
    }
}

/// Loan inputs for a single calculation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanTerms {
    /// Amount borrowed
    pub principal: f64,

    /// Nominal annual rate in percent (5.0 = 5%)
    pub annual_rate_percent: f64,

    /// Loan term in whole years
    pub term_years: u32,

    #[serde(default)]
    pub frequency: PaymentFrequency,
}

impl LoanTerms {
    pub fn new(
        principal: f64,
        annual_rate_percent: f64,
        term_years: u32,
        frequency: PaymentFrequency,
    ) -> Self {
        Self {
            principal,
            annual_rate_percent,
            term_years,
            frequency,
        }
    }

    /// Check the loan is inside the engine's domain
    pub fn validate(&self) -> Result<()> {
        require_finite(self.principal, "principal")?;
        require_finite(self.annual_rate_percent, "annual_rate_percent")?;

        if self.principal <= 0.0 {
            return Err(CalcError::invalid("principal", "must be greater than zero"));
        }
        if self.term_years == 0 {
            return Err(CalcError::invalid("term_years", "must be at least one year"));
        }
        if self.annual_rate_percent < 0.0 {
            return Err(CalcError::invalid("annual_rate_percent", "must not be negative"));
        }
        Ok(())
    }

    /// Rate applied each period: (annual / 100) / periods per year
    pub fn periodic_rate(&self) -> f64 {
        (self.annual_rate_percent / 100.0) / self.frequency.periods_per_year() as f64
    }

    /// Total number of payments N
    pub fn total_periods(&self) -> Result<u32> {
        self.term_years
            .checked_mul(self.frequency.periods_per_year())
            .ok_or(CalcError::NumericOverflow { context: "total periods" })
    }
}

/// Level payment that retires `principal` over `periods` at `rate` per period.
///
/// Falls back to straight-line repayment when the rate is zero, where the
/// annuity formula would divide by zero. `(1 + r)^N - 1` is formed with
/// `ln_1p`/`exp_m1` so tiny positive rates keep their precision.
pub fn periodic_payment(principal: f64, rate: f64, periods: u32) -> Result<f64> {
    if periods == 0 {
        return Err(CalcError::invalid("periods", "must be at least one"));
    }

    if rate == 0.0 {
        return ensure_finite(principal / periods as f64, "periodic payment");
    }

    let growth_m1 = ensure_finite((periods as f64 * rate.ln_1p()).exp_m1(), "compound factor")?;
    let payment = principal * rate * (growth_m1 + 1.0) / growth_m1;
    ensure_finite(payment, "periodic payment")
}

/// Amortization engine
pub struct AmortizationEngine {
    terms: LoanTerms,
}

impl AmortizationEngine {
    pub fn new(terms: LoanTerms) -> Self {
        Self { terms }
    }

    pub fn terms(&self) -> &LoanTerms {
        &self.terms
    }

    /// Compute the payment and the full, untruncated schedule
    pub fn compute_schedule(&self) -> Result<AmortizationResult> {
        self.terms.validate()?;

        let rate = self.terms.periodic_rate();
        let periods = self.terms.total_periods()?;
        let payment = periodic_payment(self.terms.principal, rate, periods)?;

        let mut balance = self.terms.principal;
        let mut cumulative_interest = 0.0;
        let mut schedule = Vec::with_capacity(periods as usize);

        for period in 1..=periods {
            let interest = balance * rate;
            let principal_paid = payment - interest;
            balance = (balance - principal_paid).max(0.0);
            cumulative_interest += interest;

            schedule.push(AmortizationPeriod {
                period,
                payment,
                principal: principal_paid,
                interest,
                cumulative_interest: ensure_finite(cumulative_interest, "cumulative interest")?,
                balance,
            });
        }

        let total_paid = ensure_finite(payment * periods as f64, "total paid")?;

        Ok(AmortizationResult {
            principal: self.terms.principal,
            periodic_payment: payment,
            periods_per_year: self.terms.frequency.periods_per_year(),
            total_paid,
            total_interest: total_paid - self.terms.principal,
            schedule,
        })
    }
}

/// Convenience wrapper around [`AmortizationEngine`]
pub fn compute_schedule(
    principal: f64,
    annual_rate_percent: f64,
    term_years: u32,
    frequency: PaymentFrequency,
) -> Result<AmortizationResult> {
    AmortizationEngine::new(LoanTerms::new(principal, annual_rate_percent, term_years, frequency))
        .compute_schedule()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use proptest::prelude::*;

    #[test]
    fn test_thirty_year_monthly_mortgage() {
        let result = compute_schedule(100_000.0, 5.0, 30, PaymentFrequency::Monthly).unwrap();

        assert_abs_diff_eq!(result.periodic_payment, 536.82, epsilon = 0.005);
        assert_eq!(result.total_periods(), 360);
        assert_abs_diff_eq!(result.final_balance(), 0.0, epsilon = 1e-6);
        assert_relative_eq!(result.total_paid, result.periodic_payment * 360.0);
        assert_relative_eq!(result.total_interest, result.total_paid - 100_000.0);
    }

    #[test]
    fn test_first_period_split() {
        let result = compute_schedule(100_000.0, 5.0, 30, PaymentFrequency::Monthly).unwrap();
        let first = &result.schedule[0];

        // 100000 * 0.05 / 12
        assert_relative_eq!(first.interest, 416.666_666_666_666_7, epsilon = 1e-9);
        assert_relative_eq!(first.principal + first.interest, first.payment, epsilon = 1e-9);
        assert_relative_eq!(first.balance, 100_000.0 - first.principal, epsilon = 1e-9);
        assert_relative_eq!(first.cumulative_interest, first.interest);
    }

    #[test]
    fn test_weekly_frequency() {
        let result = compute_schedule(20_000.0, 6.0, 5, PaymentFrequency::Weekly).unwrap();

        assert_eq!(result.periods_per_year, 52);
        assert_eq!(result.total_periods(), 260);
        assert_abs_diff_eq!(result.final_balance(), 0.0, epsilon = 1e-6);
        assert!(result.periodic_payment < 20_000.0 / 260.0 * 1.2);
    }

    #[test]
    fn test_zero_rate_is_straight_line() {
        let result = compute_schedule(12_000.0, 0.0, 1, PaymentFrequency::Monthly).unwrap();

        assert_eq!(result.periodic_payment, 12_000.0 / 12.0);
        assert_eq!(result.total_interest, 0.0);
        assert!(result.schedule.iter().all(|r| r.interest == 0.0));
        assert_abs_diff_eq!(result.final_balance(), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_schedule_is_never_truncated() {
        let result = compute_schedule(250_000.0, 4.0, 30, PaymentFrequency::Weekly).unwrap();
        assert_eq!(result.schedule.len(), 1560);

        let periods: Vec<u32> = result.schedule.iter().map(|r| r.period).collect();
        assert_eq!(periods, (1..=1560).collect::<Vec<_>>());
    }

    #[test]
    fn test_invalid_inputs() {
        let cases = [
            (0.0, 5.0, 30, "principal"),
            (-1.0, 5.0, 30, "principal"),
            (100.0, -0.5, 30, "annual_rate_percent"),
            (100.0, 5.0, 0, "term_years"),
            (f64::NAN, 5.0, 30, "principal"),
        ];

        for (principal, rate, years, expected_field) in cases {
            let err =
                compute_schedule(principal, rate, years, PaymentFrequency::Monthly).unwrap_err();
            match err {
                CalcError::InvalidInput { field, .. } => assert_eq!(field, expected_field),
                other => panic!("expected InvalidInput, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_overflow_is_reported() {
        let err = compute_schedule(1_000.0, 1.0e6, 400, PaymentFrequency::Weekly).unwrap_err();
        assert!(matches!(err, CalcError::NumericOverflow { .. }));
    }

    #[test]
    fn test_tiny_positive_rates_match_straight_line() {
        for rate in [1e-14, 1e-10] {
            let result = compute_schedule(100_000.0, rate, 30, PaymentFrequency::Monthly).unwrap();
            let summary = result.summary();

            assert_relative_eq!(result.periodic_payment, 100_000.0 / 360.0, max_relative = 1e-9);
            assert_relative_eq!(summary.principal_repaid, 100_000.0, max_relative = 1e-9);
            assert_abs_diff_eq!(summary.final_balance, 0.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_repeat_calls_are_identical() {
        let a = compute_schedule(75_000.0, 3.25, 15, PaymentFrequency::Monthly).unwrap();
        let b = compute_schedule(75_000.0, 3.25, 15, PaymentFrequency::Monthly).unwrap();
        assert_eq!(a.schedule, b.schedule);
        assert_eq!(a.periodic_payment.to_bits(), b.periodic_payment.to_bits());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]

        #[test]
        fn prop_principal_is_fully_repaid(
            principal in 1_000.0f64..2_000_000.0,
            rate in prop_oneof![1e-12f64..1e-6, 1e-6f64..20.0],
            years in 1u32..40,
            weekly in any::<bool>(),
        ) {
            let frequency =
                if weekly { PaymentFrequency::Weekly } else { PaymentFrequency::Monthly };
            let result = compute_schedule(principal, rate, years, frequency).unwrap();
            let summary = result.summary();

            prop_assert!((summary.principal_repaid - principal).abs() <= principal * 1e-8);
            prop_assert!(summary.final_balance.abs() <= principal * 1e-8);

            let mut previous = principal;
            for row in &result.schedule {
                let split_error = (row.principal + row.interest - row.payment).abs();
                prop_assert!(split_error <= 1e-9 * row.payment);
                prop_assert!(row.balance <= previous);
                prop_assert!(row.balance >= 0.0);
                previous = row.balance;
            }
        }
    }
}
