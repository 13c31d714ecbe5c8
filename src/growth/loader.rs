//! CSV-based instrument loader
//!
//! Loads fund presets from data/instruments.csv

use log::{debug, info};
use std::error::Error;
use std::fs::File;
use std::path::Path;

use super::instruments::Instrument;

/// Default path to the instrument catalog
pub const DEFAULT_INSTRUMENTS_PATH: &str = "data/instruments.csv";

/// Raw CSV row matching instruments.csv columns
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    symbol: String,
    name: String,
    avg_return: f64,
    volatility: f64,
}

impl CsvRow {
    fn to_instrument(self) -> Result<Instrument, Box<dyn Error>> {
        let symbol = self.symbol.trim();
        if symbol.is_empty() {
            return Err("Instrument row with empty symbol".into());
        }
        if !self.avg_return.is_finite() {
            return Err(format!("Non-finite avg_return for {}", symbol).into());
        }
        if !self.volatility.is_finite() || self.volatility < 0.0 {
            return Err(format!("Invalid volatility for {}: {}", symbol, self.volatility).into());
        }

        Ok(Instrument::new(symbol, self.name.trim(), self.avg_return, self.volatility))
    }
}

/// Load instruments from a CSV file
pub fn load_instruments(path: &Path) -> Result<Vec<Instrument>, Box<dyn Error>> {
    let file = File::open(path)?;
    let instruments = load_instruments_from_reader(file)?;
    info!("Loaded {} instruments from {}", instruments.len(), path.display());
    Ok(instruments)
}

/// Load instruments from any reader (for testing or embedded data)
pub fn load_instruments_from_reader<R: std::io::Read>(
    reader: R,
) -> Result<Vec<Instrument>, Box<dyn Error>> {
    let mut reader = csv::Reader::from_reader(reader);
    let mut instruments = Vec::new();

    for result in reader.deserialize() {
        let row: CsvRow = result?;
        let instrument = row.to_instrument()?;
        debug!(
            "Instrument {} ({}): {}% / {}%",
            instrument.symbol, instrument.name, instrument.avg_return, instrument.volatility
        );
        instruments.push(instrument);
    }

    Ok(instruments)
}
