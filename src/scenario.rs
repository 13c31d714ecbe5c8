//! Scenario runner for batches of calculation requests
//!
//! Loads the instrument catalog once, then evaluates any number of tagged
//! requests (in parallel for batches) without re-reading configuration.

use log::{debug, info, warn};
use rand::Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::amortization::{
    compute_mortgage, AmortizationEngine, AmortizationResult, LoanTerms, MortgageResult,
    MortgageTerms,
};
use crate::config::RunnerConfig;
use crate::error::{CalcError, Result};
use crate::growth::{
    resolve_volatility, GrowthInputs, GrowthProjection, GrowthProjector, InstrumentCatalog,
    MonteCarloInputs, MonteCarloSimulator, SimulationBundle,
};
use crate::percentage::{PercentageQuery, PercentageResult};
use crate::vat::{calculate_vat, VatBreakdown, VatMode};

/// Monte Carlo request; return and volatility may come from an instrument preset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloRequest {
    pub initial: f64,

    #[serde(default)]
    pub monthly_contribution: f64,

    /// Overrides the instrument's average return when both are given
    #[serde(default)]
    pub expected_return_percent: Option<f64>,

    /// Overrides the instrument's volatility when both are given
    #[serde(default)]
    pub volatility_percent: Option<f64>,

    #[serde(default)]
    pub instrument: Option<String>,

    pub years: u32,

    /// Falls back to the runner's configured run count
    #[serde(default)]
    pub run_count: Option<usize>,

    /// Falls back to the runner's seed, then to fresh entropy
    #[serde(default)]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VatRequest {
    pub mode: VatMode,
    pub amount: f64,
    pub rate_percent: f64,
}

/// A single calculation to perform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CalculationRequest {
    Loan(LoanTerms),
    Mortgage(MortgageTerms),
    Growth(GrowthInputs),
    MonteCarlo(MonteCarloRequest),
    Percentage(PercentageQuery),
    Vat(VatRequest),
}

impl CalculationRequest {
    pub fn kind(&self) -> &'static str {
        match self {
            CalculationRequest::Loan(_) => "loan",
            CalculationRequest::Mortgage(_) => "mortgage",
            CalculationRequest::Growth(_) => "growth",
            CalculationRequest::MonteCarlo(_) => "monte_carlo",
            CalculationRequest::Percentage(_) => "percentage",
            CalculationRequest::Vat(_) => "vat",
        }
    }
}

/// Deterministic projection plus its headline figures
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrowthReport {
    pub final_balance: f64,
    pub total_contributed: f64,
    pub total_earnings: f64,
    pub projection: GrowthProjection,
}

impl From<GrowthProjection> for GrowthReport {
    fn from(projection: GrowthProjection) -> Self {
        Self {
            final_balance: projection.final_balance(),
            total_contributed: projection.total_contributed(),
            total_earnings: projection.total_earnings(),
            projection,
        }
    }
}

/// Monte Carlo bundle with the parameters that produced it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonteCarloReport {
    pub seed: u64,
    pub instrument: Option<String>,
    pub expected_return_percent: f64,
    pub volatility_percent: f64,
    pub p10_final_balance: Option<f64>,
    pub median_final_balance: Option<f64>,
    pub p90_final_balance: Option<f64>,
    pub bundle: SimulationBundle,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CalculationResponse {
    Loan(AmortizationResult),
    Mortgage(MortgageResult),
    Growth(GrowthReport),
    MonteCarlo(MonteCarloReport),
    Percentage(PercentageResult),
    Vat(VatBreakdown),
}

/// Outcome of one request in a batch, keyed by its position in the input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculationOutcome {
    pub index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<CalculationResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CalculationOutcome {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Pre-configured runner for calculation requests
#[derive(Debug, Clone)]
pub struct ScenarioRunner {
    config: RunnerConfig,
    catalog: InstrumentCatalog,
}

impl ScenarioRunner {
    /// Create runner with default config and built-in instruments
    pub fn new() -> Self {
        Self {
            config: RunnerConfig::default(),
            catalog: InstrumentCatalog::builtin(),
        }
    }

    /// Create runner from config, loading the instrument CSV if one is configured
    pub fn from_config(
        config: RunnerConfig,
    ) -> std::result::Result<Self, Box<dyn std::error::Error>> {
        let catalog = match &config.instruments_path {
            Some(path) => InstrumentCatalog::from_csv_path(path)?,
            None => InstrumentCatalog::builtin(),
        };
        info!("Scenario runner ready with {} instruments", catalog.len());
        Ok(Self { config, catalog })
    }

    /// Create runner with a pre-built catalog
    pub fn with_catalog(config: RunnerConfig, catalog: InstrumentCatalog) -> Self {
        Self { config, catalog }
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    pub fn catalog(&self) -> &InstrumentCatalog {
        &self.catalog
    }

    /// Evaluate a single request
    pub fn run(&self, request: &CalculationRequest) -> Result<CalculationResponse> {
        debug!("Running {} request", request.kind());

        match request {
            CalculationRequest::Loan(terms) => {
                let result = AmortizationEngine::new(terms.clone()).compute_schedule()?;
                Ok(CalculationResponse::Loan(result))
            }
            CalculationRequest::Mortgage(terms) => {
                Ok(CalculationResponse::Mortgage(compute_mortgage(terms)?))
            }
            CalculationRequest::Growth(inputs) => {
                let projection = GrowthProjector::new(inputs.clone()).project()?;
                Ok(CalculationResponse::Growth(projection.into()))
            }
            CalculationRequest::MonteCarlo(request) => {
                Ok(CalculationResponse::MonteCarlo(self.run_monte_carlo(request)?))
            }
            CalculationRequest::Percentage(query) => {
                Ok(CalculationResponse::Percentage(query.evaluate()?))
            }
            CalculationRequest::Vat(request) => Ok(CalculationResponse::Vat(calculate_vat(
                request.mode,
                request.amount,
                request.rate_percent,
            )?)),
        }
    }

    /// Resolve instrument presets and defaults into simulator inputs
    pub fn resolve_monte_carlo(&self, request: &MonteCarloRequest) -> Result<MonteCarloInputs> {
        let instrument = match &request.instrument {
            Some(symbol) => Some(self.catalog.find(symbol).ok_or_else(|| {
                CalcError::invalid("instrument", format!("unknown instrument {}", symbol))
            })?),
            None => None,
        };

        let expected_return_percent = request
            .expected_return_percent
            .or(instrument.map(|i| i.avg_return))
            .ok_or_else(|| {
                CalcError::invalid(
                    "expected_return_percent",
                    "required when no instrument is selected",
                )
            })?;

        let volatility_percent = request
            .volatility_percent
            .unwrap_or_else(|| resolve_volatility(expected_return_percent, instrument));

        Ok(MonteCarloInputs {
            initial: request.initial,
            monthly_contribution: request.monthly_contribution,
            expected_return_percent,
            volatility_percent,
            years: request.years,
            run_count: request.run_count.unwrap_or(self.config.monte_carlo_runs),
        })
    }

    fn run_monte_carlo(&self, request: &MonteCarloRequest) -> Result<MonteCarloReport> {
        let inputs = self.resolve_monte_carlo(request)?;
        let seed = request
            .seed
            .or(self.config.seed)
            .unwrap_or_else(|| rand::rng().random());

        let simulator = MonteCarloSimulator::new(inputs);
        let bundle = simulator.simulate_par(seed)?;
        let inputs = simulator.inputs();

        Ok(MonteCarloReport {
            seed,
            instrument: request.instrument.clone(),
            expected_return_percent: inputs.expected_return_percent,
            volatility_percent: inputs.volatility_percent,
            p10_final_balance: bundle.percentile(10.0),
            median_final_balance: bundle.percentile(50.0),
            p90_final_balance: bundle.percentile(90.0),
            bundle,
        })
    }

    /// Evaluate many requests in parallel, preserving input order
    pub fn run_batch(&self, requests: &[CalculationRequest]) -> Vec<CalculationOutcome> {
        info!("Running batch of {} requests", requests.len());

        let outcomes: Vec<CalculationOutcome> = requests
            .par_iter()
            .enumerate()
            .map(|(index, request)| match self.run(request) {
                Ok(response) => CalculationOutcome {
                    index,
                    response: Some(response),
                    error: None,
                },
                Err(e) => {
                    warn!("Request {} ({}) failed: {}", index, request.kind(), e);
                    CalculationOutcome {
                        index,
                        response: None,
                        error: Some(e.to_string()),
                    }
                }
            })
            .collect();

        let failed = outcomes.iter().filter(|o| !o.is_ok()).count();
        info!("Batch complete: {} ok, {} failed", outcomes.len() - failed, failed);
        outcomes
    }
}

impl Default for ScenarioRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amortization::PaymentFrequency;
    use crate::percentage::ChangeDirection;
    use approx::assert_abs_diff_eq;

    fn mc_request(instrument: Option<&str>, expected: Option<f64>) -> MonteCarloRequest {
        MonteCarloRequest {
            initial: 10_000.0,
            monthly_contribution: 500.0,
            expected_return_percent: expected,
            volatility_percent: None,
            instrument: instrument.map(str::to_string),
            years: 20,
            run_count: None,
            seed: Some(7),
        }
    }

    #[test]
    fn test_instrument_supplies_return_and_volatility() {
        let runner = ScenarioRunner::new();

        let inputs = runner.resolve_monte_carlo(&mc_request(Some("EEM"), None)).unwrap();
        assert_eq!(inputs.expected_return_percent, 9.5);
        assert_eq!(inputs.volatility_percent, 22.0);
        assert_eq!(inputs.run_count, 5);

        let inputs = runner.resolve_monte_carlo(&mc_request(None, Some(8.0))).unwrap();
        assert_eq!(inputs.volatility_percent, 4.0);

        assert!(matches!(
            runner.resolve_monte_carlo(&mc_request(Some("NOPE"), None)),
            Err(CalcError::InvalidInput { field: "instrument", .. })
        ));
        assert!(matches!(
            runner.resolve_monte_carlo(&mc_request(None, None)),
            Err(CalcError::InvalidInput { field: "expected_return_percent", .. })
        ));
    }

    #[test]
    fn test_seeded_monte_carlo_is_reproducible() {
        let runner = ScenarioRunner::new();
        let request = CalculationRequest::MonteCarlo(mc_request(Some("SPY"), None));

        let (a, b) = match (runner.run(&request).unwrap(), runner.run(&request).unwrap()) {
            (CalculationResponse::MonteCarlo(a), CalculationResponse::MonteCarlo(b)) => (a, b),
            other => panic!("unexpected responses: {:?}", other),
        };
        assert_eq!(a.seed, 7);
        assert_eq!(a.bundle, b.bundle);
        assert_eq!(a.bundle.run_count(), 5);
        assert!(a.p10_final_balance <= a.p90_final_balance);
    }

    #[test]
    fn test_batch_preserves_order_and_reports_errors() {
        let runner = ScenarioRunner::new();
        let requests = vec![
            CalculationRequest::Loan(LoanTerms::new(100_000.0, 5.0, 30, PaymentFrequency::Monthly)),
            CalculationRequest::Percentage(PercentageQuery::value_as_percent_of(3.0, 0.0)),
            CalculationRequest::Growth(GrowthInputs::new(10_000.0, 500.0, 7.0, 1)),
            CalculationRequest::Percentage(PercentageQuery::percent_change(
                100.0,
                10.0,
                ChangeDirection::Increase,
            )),
        ];

        let outcomes = runner.run_batch(&requests);
        assert_eq!(outcomes.len(), 4);
        assert_eq!(outcomes.iter().map(|o| o.index).collect::<Vec<_>>(), vec![0, 1, 2, 3]);

        match &outcomes[0].response {
            Some(CalculationResponse::Loan(loan)) => {
                assert_abs_diff_eq!(loan.periodic_payment, 536.82, epsilon = 0.005)
            }
            other => panic!("unexpected: {:?}", other),
        }
        assert_eq!(
            outcomes[1].error.as_deref(),
            Some("division by zero in value as percent of")
        );
        match &outcomes[2].response {
            Some(CalculationResponse::Growth(report)) => {
                assert_abs_diff_eq!(report.final_balance, 16_910.0, epsilon = 1e-9)
            }
            other => panic!("unexpected: {:?}", other),
        }
        assert!(outcomes[3].is_ok());
    }

    #[test]
    fn test_request_json() {
        let json = r#"[
            {"type": "loan", "principal": 100000, "annual_rate_percent": 5, "term_years": 30, "frequency": "weekly"},
            {"type": "mortgage", "price": 300000, "down_payment": 60000, "annual_rate_percent": 6.5, "term_years": 25},
            {"type": "monte_carlo", "initial": 1000, "instrument": "QQQ", "years": 10, "run_count": 3, "seed": 1},
            {"type": "percentage", "operation": "percent_difference", "a": 50, "b": 75},
            {"type": "vat", "mode": "remove", "amount": 120, "rate_percent": 20}
        ]"#;
        let requests: Vec<CalculationRequest> = serde_json::from_str(json).unwrap();

        assert_eq!(requests.len(), 5);
        match &requests[0] {
            CalculationRequest::Loan(terms) => {
                assert_eq!(terms.frequency, PaymentFrequency::Weekly)
            }
            other => panic!("unexpected: {:?}", other),
        }

        let outcomes = ScenarioRunner::new().run_batch(&requests);
        assert!(outcomes.iter().all(|o| o.is_ok()));

        let serialized = serde_json::to_value(&outcomes).unwrap();
        assert_eq!(serialized[3]["response"]["type"], "percentage");
        assert_eq!(serialized[3]["response"]["value"], 50.0);
    }
}
