//! Runner configuration
//!
//! Defaults match the calculator widgets (5 Monte Carlo paths, 500 schedule
//! rows shown). Environment overrides:
//!   FINCALC_MC_RUNS, FINCALC_DISPLAY_ROWS, FINCALC_SEED, FINCALC_INSTRUMENTS

use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{CalcError, Result};

pub const DEFAULT_MONTE_CARLO_RUNS: usize = 5;
pub const DEFAULT_DISPLAY_ROW_LIMIT: usize = 500;

/// Configuration shared by the CLI and batch runner
#[derive(Debug, Clone, PartialEq)]
pub struct RunnerConfig {
    /// Paths generated when a request does not give its own run count
    pub monte_carlo_runs: usize,

    /// Rows shown by presentation code; engines always return everything
    pub display_row_limit: usize,

    /// Master seed for Monte Carlo; None draws fresh entropy per call
    pub seed: Option<u64>,

    /// Instrument catalog CSV; None uses the built-in presets
    pub instruments_path: Option<PathBuf>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            monte_carlo_runs: DEFAULT_MONTE_CARLO_RUNS,
            display_row_limit: DEFAULT_DISPLAY_ROW_LIMIT,
            seed: None,
            instruments_path: None,
        }
    }
}

fn parse_var<T: FromStr>(field: &'static str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| CalcError::invalid(field, format!("cannot parse {:?}", raw)))
}

impl RunnerConfig {
    /// Defaults overlaid with FINCALC_* environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overlaid with values from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup("FINCALC_MC_RUNS") {
            config.monte_carlo_runs = parse_var("FINCALC_MC_RUNS", &raw)?;
            if config.monte_carlo_runs == 0 {
                return Err(CalcError::invalid("FINCALC_MC_RUNS", "must be at least one"));
            }
        }
        if let Some(raw) = lookup("FINCALC_DISPLAY_ROWS") {
            config.display_row_limit = parse_var("FINCALC_DISPLAY_ROWS", &raw)?;
        }
        if let Some(raw) = lookup("FINCALC_SEED") {
            config.seed = Some(parse_var("FINCALC_SEED", &raw)?);
        }
        if let Some(raw) = lookup("FINCALC_INSTRUMENTS") {
            if !raw.trim().is_empty() {
                config.instruments_path = Some(PathBuf::from(raw.trim()));
            }
        }

        Ok(config)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}
