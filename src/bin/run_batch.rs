//! Run a batch of calculation requests from JSON
//!
//! Reads a JSON array of tagged requests (file path or `-` for stdin) and writes
//! a JSON report with one outcome per request, in input order.
//! Runner config comes from FINCALC_* environment variables.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Parser;
use serde::Serialize;
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::time::Instant;

use fincalc::scenario::{CalculationOutcome, CalculationRequest, ScenarioRunner};
use fincalc::RunnerConfig;

#[derive(Parser)]
#[command(name = "run_batch", about = "Evaluate a JSON batch of calculation requests")]
struct Args {
    /// Request file, or `-` for stdin
    input: String,

    /// Write the report here instead of stdout
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Master Monte Carlo seed (overrides FINCALC_SEED)
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long)]
    pretty: bool,
}

#[derive(Serialize)]
struct BatchReport {
    generated_at: DateTime<Utc>,
    request_count: usize,
    error_count: usize,
    execution_time_ms: u64,
    outcomes: Vec<CalculationOutcome>,
}

fn read_input(input: &str) -> Result<String> {
    let mut raw = String::new();
    if input == "-" {
        io::stdin().read_to_string(&mut raw).context("Failed to read stdin")?;
    } else {
        File::open(input)
            .with_context(|| format!("Failed to open {}", input))?
            .read_to_string(&mut raw)
            .with_context(|| format!("Failed to read {}", input))?;
    }
    Ok(raw)
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    let start = Instant::now();

    let mut config = RunnerConfig::from_env().context("Invalid FINCALC_* environment")?;
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }
    let runner = ScenarioRunner::from_config(config)
        .map_err(|e| anyhow::anyhow!("{}", e))
        .context("Failed to load instrument catalog")?;

    let raw = read_input(&args.input)?;
    let requests: Vec<CalculationRequest> =
        serde_json::from_str(&raw).context("Invalid request JSON")?;

    let outcomes = runner.run_batch(&requests);
    let report = BatchReport {
        generated_at: Utc::now(),
        request_count: requests.len(),
        error_count: outcomes.iter().filter(|o| !o.is_ok()).count(),
        execution_time_ms: start.elapsed().as_millis() as u64,
        outcomes,
    };

    let json = if args.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };

    match args.output {
        Some(path) => {
            let mut file = File::create(&path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            writeln!(file, "{}", json)?;
            eprintln!(
                "{} requests ({} failed) written to {}",
                report.request_count,
                report.error_count,
                path.display()
            );
        }
        None => println!("{}", json),
    }

    Ok(())
}
