//! Deterministic year-by-year investment growth

use serde::{Deserialize, Serialize};

use crate::error::{ensure_finite, require_finite, CalcError, Result};

/// Contributions are made monthly regardless of the yearly output granularity
pub const CONTRIBUTIONS_PER_YEAR: f64 = 12.0;

/// Investment inputs shared by the deterministic and stochastic projections
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthInputs {
    /// Balance at year 0
    pub initial: f64,

    /// Amount contributed every month
    #[serde(default)]
    pub monthly_contribution: f64,

    /// Annual return in percent (7.0 = 7%), may be negative
    pub annual_return_percent: f64,

    /// Projection length in years
    pub years: u32,
}

impl GrowthInputs {
    pub fn new(
        initial: f64,
        monthly_contribution: f64,
        annual_return_percent: f64,
        years: u32,
    ) -> Self {
        Self {
            initial,
            monthly_contribution,
            annual_return_percent,
            years,
        }
    }

    pub fn validate(&self) -> Result<()> {
        require_finite(self.initial, "initial")?;
        require_finite(self.monthly_contribution, "monthly_contribution")?;
        require_finite(self.annual_return_percent, "annual_return_percent")?;

        if self.initial < 0.0 {
            return Err(CalcError::invalid("initial", "must not be negative"));
        }
        if self.monthly_contribution < 0.0 {
            return Err(CalcError::invalid("monthly_contribution", "must not be negative"));
        }
        Ok(())
    }

    pub fn yearly_contribution(&self) -> f64 {
        self.monthly_contribution * CONTRIBUTIONS_PER_YEAR
    }
}

/// Balance and cumulative contributions at the end of a year
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GrowthPoint {
    /// Year index, 0 is the initial state
    pub year: u32,
    pub balance: f64,
    pub contributions: f64,
}

/// Apply one year of contributions and growth.
///
/// Contributions arrive through the year, so on average half of them earn
/// the full year's return.
pub fn compound_year(balance: f64, yearly_contribution: f64, return_percent: f64) -> f64 {
    let yearly_return = (balance + yearly_contribution / 2.0) * (return_percent / 100.0);
    balance + yearly_contribution + yearly_return
}

/// Walk a path of per-year returns, producing `returns.len() + 1` points
pub(crate) fn project_path<I>(inputs: &GrowthInputs, returns: I) -> Result<Vec<GrowthPoint>>
where
    I: IntoIterator<Item = f64>,
{
    let yearly_contribution = inputs.yearly_contribution();
    let mut balance = inputs.initial;
    let mut contributions = inputs.initial;
    let mut points = Vec::with_capacity(inputs.years as usize + 1);

    points.push(GrowthPoint {
        year: 0,
        balance,
        contributions,
    });

    for (year, return_percent) in (1..=inputs.years).zip(returns) {
        balance = ensure_finite(
            compound_year(balance, yearly_contribution, return_percent),
            "projected balance",
        )?;
        contributions = ensure_finite(contributions + yearly_contribution, "contributions")?;

        points.push(GrowthPoint {
            year,
            balance,
            contributions,
        });
    }

    Ok(points)
}

/// Deterministic projection result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrowthProjection {
    pub points: Vec<GrowthPoint>,
}

impl GrowthProjection {
    fn terminal(&self) -> GrowthPoint {
        // points always holds at least year 0
        self.points[self.points.len() - 1]
    }

    pub fn final_balance(&self) -> f64 {
        self.terminal().balance
    }

    pub fn total_contributed(&self) -> f64 {
        self.terminal().contributions
    }

    /// Final balance less everything contributed; negative only under negative returns
    pub fn total_earnings(&self) -> f64 {
        let last = self.terminal();
        last.balance - last.contributions
    }

    /// Cumulative contributions by year
    pub fn contribution_curve(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.contributions).collect()
    }
}

/// Deterministic compound growth projector
pub struct GrowthProjector {
    inputs: GrowthInputs,
}

impl GrowthProjector {
    pub fn new(inputs: GrowthInputs) -> Self {
        Self { inputs }
    }

    pub fn inputs(&self) -> &GrowthInputs {
        &self.inputs
    }

    /// Project `years + 1` points at the fixed annual return
    pub fn project(&self) -> Result<GrowthProjection> {
        self.inputs.validate()?;
        let rate = self.inputs.annual_return_percent;
        let points = project_path(&self.inputs, std::iter::repeat(rate))?;
        Ok(GrowthProjection { points })
    }
}

/// Convenience wrapper around [`GrowthProjector`]
pub fn project_deterministic(
    initial: f64,
    monthly_contribution: f64,
    annual_return_percent: f64,
    years: u32,
) -> Result<GrowthProjection> {
    let inputs = GrowthInputs::new(initial, monthly_contribution, annual_return_percent, years);
    GrowthProjector::new(inputs).project()
}
