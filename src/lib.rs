//! Financial calculation engine
//!
//! This library provides:
//! - Loan and mortgage amortization schedules (monthly or weekly payments)
//! - Deterministic compound growth projection with monthly contributions
//! - Monte Carlo growth paths with uniform per-year return noise
//! - Percentage relations and flat-rate VAT
//! - A batch runner for tagged calculation requests
//!
//! Engines take plain numeric inputs and return structured values or a
//! [`CalcError`]; they never log and never produce NaN/Infinity as a result.

pub mod error;
pub mod amortization;
pub mod growth;
pub mod percentage;
pub mod vat;
pub mod config;
pub mod scenario;

// Re-export commonly used types
pub use error::{CalcError, Result};
pub use amortization::{
    AmortizationEngine, AmortizationPeriod, AmortizationResult, LoanTerms, PaymentFrequency,
};
pub use growth::{GrowthPoint, GrowthProjector, MonteCarloSimulator, SimulationBundle};
pub use percentage::{ChangeDirection, PercentageOperation, PercentageQuery, PercentageResult};
pub use config::RunnerConfig;
pub use scenario::{CalculationRequest, CalculationResponse, ScenarioRunner};
