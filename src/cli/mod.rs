//! Command-line parsing for the loan dashboard.
//!
//! The goal of this module is to keep **argument parsing** separate from
//! page rendering and the aggregation code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{DashboardConfig, GOOD_LOAN};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "loans", version, about = "Financial Insights Dashboard: loan performance & trends")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Launch the interactive two-page dashboard.
    Tui(TuiArgs),
    /// Print the overview page: headline metrics, trends, and loan performance.
    Overview(OverviewArgs),
    /// Print the financial analysis page for one loan condition.
    Financial(FinancialArgs),
    /// Write a synthetic loan dataset in the dashboard's input format.
    Sample(SampleArgs),
}

/// Where the cleaned loan dataset lives.
#[derive(Debug, Args, Clone)]
pub struct DataArgs {
    /// Cleaned loan CSV.
    #[arg(short = 'f', long = "data", env = "LOANS_DATA", default_value = DashboardConfig::DEFAULT_DATA_PATH)]
    pub data: PathBuf,
}

#[derive(Debug, Args, Clone)]
pub struct TuiArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Loan condition selected initially on the financial analysis page.
    #[arg(short = 'c', long, default_value = GOOD_LOAN)]
    pub condition: String,

    /// Histogram bins for the loan amount distribution.
    #[arg(long, default_value_t = DashboardConfig::DEFAULT_HISTOGRAM_BINS)]
    pub bins: usize,
}

#[derive(Debug, Args, Clone)]
pub struct OverviewArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Also draw ASCII charts for each view.
    #[arg(long)]
    pub plot: bool,

    /// Emit the page as JSON instead of text.
    #[arg(long, conflicts_with = "plot")]
    pub json: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 72)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 16)]
    pub height: usize,
}

#[derive(Debug, Args, Clone)]
pub struct FinancialArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Loan condition to analyse (e.g. "Good Loan", "Bad Loan").
    #[arg(short = 'c', long, default_value = GOOD_LOAN)]
    pub condition: String,

    /// Histogram bins for the loan amount distribution.
    #[arg(long, default_value_t = DashboardConfig::DEFAULT_HISTOGRAM_BINS)]
    pub bins: usize,

    /// Emit the page as JSON instead of text.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args, Clone)]
pub struct SampleArgs {
    /// Output CSV path.
    #[arg(short = 'o', long, default_value = DashboardConfig::DEFAULT_DATA_PATH)]
    pub out: PathBuf,

    /// Number of loans to generate.
    #[arg(short = 'n', long, default_value_t = 5000)]
    pub count: usize,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// First issue month (YYYY-MM).
    #[arg(long, default_value = "2013-01", value_parser = parse_month)]
    pub start: chrono::NaiveDate,

    /// Number of issue months.
    #[arg(long, default_value_t = 36)]
    pub months: u32,
}

/// `YYYY-MM` → first day of that month.
fn parse_month(s: &str) -> Result<chrono::NaiveDate, String> {
    chrono::NaiveDate::parse_from_str(&format!("{}-01", s.trim()), "%Y-%m-%d")
        .map_err(|e| format!("expected YYYY-MM, got '{s}': {e}"))
}
