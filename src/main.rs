//! fincalc CLI
//!
//! Command-line interface for loan, mortgage, investment, percentage and VAT calculations

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::{Path, PathBuf};

use fincalc::amortization::{
    compute_mortgage, AmortizationEngine, AmortizationPeriod, LoanTerms, MortgageTerms,
    PaymentFrequency,
};
use fincalc::growth::{GrowthInputs, GrowthPoint, GrowthProjector, SimulationBundle};
use fincalc::percentage::{ChangeDirection, PercentageQuery};
use fincalc::scenario::{MonteCarloRequest, ScenarioRunner};
use fincalc::vat::{calculate_vat, VatMode};
use fincalc::{CalculationRequest, CalculationResponse, RunnerConfig};

#[derive(Parser)]
#[command(name = "fincalc", version, about = "Loan, investment and percentage calculators")]
struct Cli {
    /// Maximum schedule rows printed (overrides FINCALC_DISPLAY_ROWS)
    #[arg(long, global = true)]
    rows: Option<usize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Amortize a fixed-rate loan
    Loan {
        #[arg(long, default_value_t = 100_000.0)]
        principal: f64,
        /// Annual rate in percent
        #[arg(long, default_value_t = 5.0)]
        rate: f64,
        #[arg(long, default_value_t = 30)]
        years: u32,
        #[arg(long, value_enum, default_value_t = Frequency::Monthly)]
        frequency: Frequency,
        /// Write the full schedule to a CSV file
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Amortize a monthly mortgage net of a down payment
    Mortgage {
        #[arg(long)]
        price: f64,
        #[arg(long, default_value_t = 0.0)]
        down_payment: f64,
        #[arg(long)]
        rate: f64,
        #[arg(long)]
        years: u32,
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Project investment growth, optionally with Monte Carlo paths
    Invest {
        #[arg(long, default_value_t = 10_000.0)]
        initial: f64,
        #[arg(long, default_value_t = 500.0)]
        monthly: f64,
        /// Annual return in percent (defaults to the instrument's average, else 7)
        #[arg(long)]
        rate: Option<f64>,
        #[arg(long, default_value_t = 30)]
        years: u32,
        /// Instrument preset symbol (see `fincalc instruments`)
        #[arg(long)]
        instrument: Option<String>,
        #[arg(long)]
        monte_carlo: bool,
        /// Volatility in percentage points (defaults to instrument or half the return)
        #[arg(long)]
        volatility: Option<f64>,
        #[arg(long)]
        runs: Option<usize>,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Percentage relations
    Percent {
        #[arg(value_enum)]
        operation: PercentOp,
        a: f64,
        b: f64,
        /// Apply `change` as a decrease instead of an increase
        #[arg(long)]
        decrease: bool,
    },
    /// Add or remove flat-rate VAT
    Vat {
        #[arg(value_enum)]
        mode: VatModeArg,
        amount: f64,
        #[arg(long, default_value_t = 20.0)]
        rate: f64,
    },
    /// List instrument presets
    Instruments,
}

#[derive(Clone, Copy, ValueEnum)]
enum Frequency {
    Monthly,
    Weekly,
}

impl From<Frequency> for PaymentFrequency {
    fn from(f: Frequency) -> Self {
        match f {
            Frequency::Monthly => PaymentFrequency::Monthly,
            Frequency::Weekly => PaymentFrequency::Weekly,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum PercentOp {
    /// a% of b
    Of,
    /// a is what % of b
    WhatPercent,
    /// |b - a| relative to a
    Difference,
    /// a increased (or decreased) by b%
    Change,
    /// a as a % of b
    AsPercent,
}

#[derive(Clone, Copy, ValueEnum)]
enum VatModeArg {
    Add,
    Remove,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let mut config = RunnerConfig::from_env().context("Invalid FINCALC_* environment")?;
    if let Some(rows) = cli.rows {
        config.display_row_limit = rows;
    }

    match cli.command {
        Command::Loan { principal, rate, years, frequency, csv } => {
            let terms = LoanTerms::new(principal, rate, years, frequency.into());
            let result = AmortizationEngine::new(terms).compute_schedule()?;

            println!(
                "Loan: ${:.2} at {}% for {} years, {} payments/year",
                principal, rate, years, result.periods_per_year
            );
            println!("  Payment:        ${:.2}", result.periodic_payment);
            println!("  Total Paid:     ${:.2}", result.total_paid);
            println!("  Total Interest: ${:.2}", result.total_interest);
            println!();
            let label = PaymentFrequency::from(frequency).period_label();
            print_schedule(&result.schedule, label, config.display_row_limit);

            if let Some(path) = csv {
                write_csv(&path, &result.schedule)?;
            }
        }
        Command::Mortgage { price, down_payment, rate, years, csv } => {
            let terms = MortgageTerms {
                price,
                down_payment,
                annual_rate_percent: rate,
                term_years: years,
            };
            let result = compute_mortgage(&terms)?;
            let breakdown = result.payment_breakdown();

            println!("Mortgage: ${:.2} less ${:.2} down", price, down_payment);
            println!("  Financed:        ${:.2}", result.financed_principal);
            println!("  Monthly Payment: ${:.2}", result.amortization.periodic_payment);
            println!("  Total Paid:      ${:.2}", result.amortization.total_paid);
            println!(
                "  Principal/Interest: ${:.2} / ${:.2}",
                breakdown.principal, breakdown.interest
            );
            println!("\nBalance by year:");
            for (year, row) in result.yearly_balances().iter().enumerate() {
                println!("  Year {:>3}: ${:>14.2}", year + 1, row.balance);
            }
            println!();
            print_schedule(&result.amortization.schedule, "Month", config.display_row_limit);

            if let Some(path) = csv {
                write_csv(&path, &result.amortization.schedule)?;
            }
        }
        Command::Invest {
            initial,
            monthly,
            rate,
            years,
            instrument,
            monte_carlo,
            volatility,
            runs,
            seed,
            csv,
        } => {
            let runner = ScenarioRunner::from_config(config)
                .map_err(|e| anyhow::anyhow!("{}", e))
                .context("Failed to load instrument catalog")?;

            let preset = match &instrument {
                Some(symbol) => Some(
                    runner
                        .catalog()
                        .find(symbol)
                        .with_context(|| format!("Unknown instrument {}", symbol))?,
                ),
                None => None,
            };
            let annual_return = rate.or(preset.map(|i| i.avg_return)).unwrap_or(7.0);

            let inputs = GrowthInputs::new(initial, monthly, annual_return, years);
            let projection = GrowthProjector::new(inputs).project()?;

            println!(
                "Investment: ${:.0} + ${:.0}/month at {}% for {} years",
                initial, monthly, annual_return, years
            );
            println!("  Final Balance:     ${:.0}", projection.final_balance());
            println!("  Total Contributed: ${:.0}", projection.total_contributed());
            println!("  Total Earnings:    ${:.0}", projection.total_earnings());
            println!();
            print_growth(&projection.points);

            if monte_carlo {
                let request = CalculationRequest::MonteCarlo(MonteCarloRequest {
                    initial,
                    monthly_contribution: monthly,
                    expected_return_percent: Some(annual_return),
                    volatility_percent: volatility,
                    instrument,
                    years,
                    run_count: runs,
                    seed,
                });
                if let CalculationResponse::MonteCarlo(mc) = runner.run(&request)? {
                    println!(
                        "\nMonte Carlo: {} runs, {}% +/- {}% (seed {})",
                        mc.bundle.run_count(),
                        mc.expected_return_percent,
                        mc.volatility_percent,
                        mc.seed
                    );
                    print_bundle(&mc.bundle);
                    if let (Some(p10), Some(p50), Some(p90)) =
                        (mc.p10_final_balance, mc.median_final_balance, mc.p90_final_balance)
                    {
                        println!(
                            "  Final balance P10/P50/P90: ${:.0} / ${:.0} / ${:.0}",
                            p10, p50, p90
                        );
                    }
                }
            }

            if let Some(path) = csv {
                write_csv(&path, &projection.points)?;
            }
        }
        Command::Percent { operation, a, b, decrease } => {
            let query = match operation {
                PercentOp::Of => PercentageQuery::of(a, b),
                PercentOp::WhatPercent => PercentageQuery::is_what_percent_of(a, b),
                PercentOp::Difference => PercentageQuery::percent_difference(a, b),
                PercentOp::Change => {
                    let direction = if decrease {
                        ChangeDirection::Decrease
                    } else {
                        ChangeDirection::Increase
                    };
                    PercentageQuery::percent_change(a, b, direction)
                }
                PercentOp::AsPercent => PercentageQuery::value_as_percent_of(a, b),
            };
            println!("{}", query.evaluate()?);
        }
        Command::Vat { mode, amount, rate } => {
            let mode = match mode {
                VatModeArg::Add => VatMode::Add,
                VatModeArg::Remove => VatMode::Remove,
            };
            let breakdown = calculate_vat(mode, amount, rate)?;
            println!("Net:   {:.2}", breakdown.net);
            println!("VAT:   {:.2} ({}%)", breakdown.vat, breakdown.rate_percent);
            println!("Gross: {:.2}", breakdown.gross);
        }
        Command::Instruments => {
            let runner = ScenarioRunner::from_config(config)
                .map_err(|e| anyhow::anyhow!("{}", e))
                .context("Failed to load instrument catalog")?;
            println!(
                "{:<6} {:<28} {:>8} {:>10}",
                "Symbol", "Name", "Return%", "Volatility"
            );
            for i in runner.catalog().iter() {
                println!(
                    "{:<6} {:<28} {:>8.1} {:>10.1}",
                    i.symbol, i.name, i.avg_return, i.volatility
                );
            }
        }
    }

    Ok(())
}

fn print_schedule(schedule: &[AmortizationPeriod], label: &str, limit: usize) {
    println!(
        "{:>6} {:>12} {:>12} {:>12} {:>14}",
        label, "Payment", "Principal", "Interest", "Balance"
    );
    println!("{}", "-".repeat(60));
    for row in schedule.iter().take(limit) {
        println!(
            "{:>6} {:>12.2} {:>12.2} {:>12.2} {:>14.2}",
            row.period, row.payment, row.principal, row.interest, row.balance
        );
    }
    if schedule.len() > limit {
        println!("... ({} more rows)", schedule.len() - limit);
    }
}

fn print_growth(points: &[GrowthPoint]) {
    println!("{:>5} {:>16} {:>16}", "Year", "Balance", "Contributions");
    println!("{}", "-".repeat(39));
    for p in points {
        println!("{:>5} {:>16.0} {:>16.0}", p.year, p.balance, p.contributions);
    }
}

fn print_bundle(bundle: &SimulationBundle) {
    let header: Vec<String> = (1..=bundle.run_count())
        .map(|i| format!("{:>12}", format!("Sim {}", i)))
        .collect();
    println!("{:>5} {}", "Year", header.join(" "));
    for &year in &bundle.years {
        if let Some(balances) = bundle.balances_at(year) {
            let cells: Vec<String> = balances.iter().map(|b| format!("{:>12.0}", b)).collect();
            println!("{:>5} {}", year, cells.join(" "));
        }
    }
}

fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Unable to create {}", path.display()))?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    println!("\nFull results written to: {}", path.display());
    Ok(())
}
