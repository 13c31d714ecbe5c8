//! Monte Carlo growth paths with uniform per-year return noise
//!
//! Every (run, year) pair draws its own uniform sample, so a path reflects
//! year-to-year variance rather than a single offset for the whole horizon.
//! The noise is uniform within the volatility band, not normal.

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::projector::{project_path, GrowthInputs, GrowthPoint, GrowthProjector};
use crate::error::{require_finite, CalcError, Result};

/// Inputs for a Monte Carlo projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloInputs {
    pub initial: f64,

    #[serde(default)]
    pub monthly_contribution: f64,

    /// Centre of the return band, percent
    pub expected_return_percent: f64,

    /// Half-width of the return band, percentage points
    pub volatility_percent: f64,

    pub years: u32,

    pub run_count: usize,
}

impl MonteCarloInputs {
    pub fn validate(&self) -> Result<()> {
        self.growth_inputs().validate()?;
        require_finite(self.volatility_percent, "volatility_percent")?;

        if self.volatility_percent < 0.0 {
            return Err(CalcError::invalid("volatility_percent", "must not be negative"));
        }
        if self.run_count == 0 {
            return Err(CalcError::invalid("run_count", "must be at least one"));
        }
        Ok(())
    }

    /// The same inputs with the return fixed at its expected value
    pub fn growth_inputs(&self) -> GrowthInputs {
        GrowthInputs::new(
            self.initial,
            self.monthly_contribution,
            self.expected_return_percent,
            self.years,
        )
    }
}

/// Return for one (run, year) given a uniform draw in [0, 1)
pub fn sample_return(expected_return_percent: f64, volatility_percent: f64, uniform: f64) -> f64 {
    expected_return_percent + (uniform - 0.5) * 2.0 * volatility_percent
}

/// Independent paths sharing one year axis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationBundle {
    /// Year indices 0..=years shared by every run
    pub years: Vec<u32>,

    /// Cumulative contributions by year; contributions are never randomized
    pub contributions: Vec<f64>,

    /// One path per run, each `years.len()` points long
    pub runs: Vec<Vec<GrowthPoint>>,
}

impl SimulationBundle {
    pub fn run_count(&self) -> usize {
        self.runs.len()
    }

    /// Balance of every run at `year`, or None past the horizon of any run
    pub fn balances_at(&self, year: u32) -> Option<Vec<f64>> {
        let idx = year as usize;
        if idx >= self.years.len() {
            return None;
        }
        self.runs
            .iter()
            .map(|run| run.get(idx).map(|p| p.balance))
            .collect()
    }

    pub fn final_balances(&self) -> Vec<f64> {
        self.runs
            .iter()
            .filter_map(|run| run.last().map(|p| p.balance))
            .collect()
    }

    /// Percentile (0-100) of final balances, interpolating between order statistics
    pub fn percentile(&self, p: f64) -> Option<f64> {
        let mut values = self.final_balances();
        if values.is_empty() || !(0.0..=100.0).contains(&p) {
            return None;
        }
        Some(percentile(&mut values, p))
    }
}

fn percentile(values: &mut [f64], p: f64) -> f64 {
    values.sort_by(|a, b| a.total_cmp(b));

    let n = values.len();
    if n == 1 {
        return values[0];
    }

    let rank = (p / 100.0) * (n as f64 - 1.0);
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;

    if lower == upper {
        values[lower]
    } else {
        let weight = rank - lower as f64;
        values[lower] + (values[upper] - values[lower]) * weight
    }
}

/// Monte Carlo simulator
pub struct MonteCarloSimulator {
    inputs: MonteCarloInputs,
}

impl MonteCarloSimulator {
    pub fn new(inputs: MonteCarloInputs) -> Self {
        Self { inputs }
    }

    pub fn inputs(&self) -> &MonteCarloInputs {
        &self.inputs
    }

    /// Run all paths drawing from the supplied generator, run by run
    pub fn simulate<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<SimulationBundle> {
        self.inputs.validate()?;

        let runs = (0..self.inputs.run_count)
            .map(|_| self.run_path(&mut *rng))
            .collect::<Result<Vec<_>>>()?;

        self.bundle(runs)
    }

    /// Sequential simulation with one derived generator per run
    pub fn simulate_seeded(&self, seed: u64) -> Result<SimulationBundle> {
        self.inputs.validate()?;

        let runs = self
            .run_seeds(seed)
            .into_iter()
            .map(|run_seed| self.run_path(&mut StdRng::seed_from_u64(run_seed)))
            .collect::<Result<Vec<_>>>()?;

        self.bundle(runs)
    }

    /// Parallel simulation; returns exactly what `simulate_seeded(seed)` returns
    pub fn simulate_par(&self, seed: u64) -> Result<SimulationBundle> {
        self.inputs.validate()?;

        let runs = self
            .run_seeds(seed)
            .into_par_iter()
            .map(|run_seed| self.run_path(&mut StdRng::seed_from_u64(run_seed)))
            .collect::<Result<Vec<_>>>()?;

        self.bundle(runs)
    }

    fn run_seeds(&self, seed: u64) -> Vec<u64> {
        let mut master = StdRng::seed_from_u64(seed);
        (0..self.inputs.run_count).map(|_| master.next_u64()).collect()
    }

    fn run_path<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Vec<GrowthPoint>> {
        let expected = self.inputs.expected_return_percent;
        let volatility = self.inputs.volatility_percent;

        let returns: Vec<f64> = (0..self.inputs.years)
            .map(|_| sample_return(expected, volatility, rng.random::<f64>()))
            .collect();

        project_path(&self.inputs.growth_inputs(), returns)
    }

    fn bundle(&self, runs: Vec<Vec<GrowthPoint>>) -> Result<SimulationBundle> {
        let reference = GrowthProjector::new(self.inputs.growth_inputs()).project()?;

        Ok(SimulationBundle {
            years: reference.points.iter().map(|p| p.year).collect(),
            contributions: reference.contribution_curve(),
            runs,
        })
    }
}
