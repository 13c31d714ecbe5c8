//! Instrument presets supplying expected return and volatility

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::path::Path;

use super::loader;

/// A tradable fund with its assumed long-run return and volatility
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instrument {
    pub symbol: String,
    pub name: String,
    /// Expected annual return in percent
    pub avg_return: f64,
    /// Volatility band in percentage points
    pub volatility: f64,
}

impl Instrument {
    pub fn new(symbol: &str, name: &str, avg_return: f64, volatility: f64) -> Self {
        Self {
            symbol: symbol.to_string(),
            name: name.to_string(),
            avg_return,
            volatility,
        }
    }
}

/// Lookup table of instruments by symbol
#[derive(Debug, Clone)]
pub struct InstrumentCatalog {
    instruments: Vec<Instrument>,
}

impl InstrumentCatalog {
    pub fn new(instruments: Vec<Instrument>) -> Self {
        Self { instruments }
    }

    /// Built-in fund presets
    pub fn builtin() -> Self {
        Self {
            instruments: vec![
                Instrument::new("SPY", "S&P 500 ETF", 10.5, 15.0),
                Instrument::new("QQQ", "Nasdaq 100 ETF", 12.5, 20.0),
                Instrument::new("VTI", "Total Stock Market ETF", 10.2, 14.0),
                Instrument::new("AGG", "US Aggregate Bond ETF", 4.5, 5.0),
                Instrument::new("VGK", "European Stock ETF", 8.5, 16.0),
                Instrument::new("EEM", "Emerging Markets ETF", 9.5, 22.0),
            ],
        }
    }

    /// Load the catalog from the default CSV location (data/instruments.csv)
    pub fn from_csv() -> Result<Self, Box<dyn Error>> {
        Self::from_csv_path(Path::new(loader::DEFAULT_INSTRUMENTS_PATH))
    }

    /// Load the catalog from a specific CSV file
    pub fn from_csv_path(path: &Path) -> Result<Self, Box<dyn Error>> {
        Ok(Self {
            instruments: loader::load_instruments(path)?,
        })
    }

    /// Case-insensitive symbol lookup
    pub fn find(&self, symbol: &str) -> Option<&Instrument> {
        self.instruments
            .iter()
            .find(|i| i.symbol.eq_ignore_ascii_case(symbol))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Instrument> {
        self.instruments.iter()
    }

    pub fn len(&self) -> usize {
        self.instruments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }
}

impl Default for InstrumentCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Volatility for a projection: the instrument's own figure, otherwise half the
/// magnitude of the expected return
pub fn resolve_volatility(expected_return_percent: f64, instrument: Option<&Instrument>) -> f64 {
    match instrument {
        Some(instrument) => instrument.volatility,
        None => expected_return_percent.abs() * 0.5,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_lookup() {
        let catalog = InstrumentCatalog::builtin();
        assert_eq!(catalog.len(), 6);

        let qqq = catalog.find("qqq").unwrap();
        assert_eq!(qqq.avg_return, 12.5);
        assert_eq!(qqq.volatility, 20.0);
        assert!(catalog.find("XYZ").is_none());
    }

    #[test]
    fn test_resolve_volatility() {
        let catalog = InstrumentCatalog::builtin();
        assert_eq!(resolve_volatility(7.0, None), 3.5);
        assert_eq!(resolve_volatility(-6.0, None), 3.0);
        assert_eq!(resolve_volatility(7.0, catalog.find("AGG")), 5.0);
    }
}
