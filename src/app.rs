//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and sets up logging
//! - parses CLI arguments
//! - renders the requested page (text, JSON, or the interactive TUI)
//! - writes synthetic datasets

use std::fs::File;
use std::sync::Mutex;

use clap::Parser;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use crate::cli::{Command, FinancialArgs, OverviewArgs, SampleArgs, TuiArgs};
use crate::data::SampleConfig;
use crate::domain::DashboardConfig;
use crate::error::{AggregationError, AppError};

use pipeline::FinancialPage;

pub mod pipeline;

/// Env var holding the `tracing` filter directive (e.g. `debug`).
pub const LOG_ENV: &str = "LOANS_LOG";
/// Log file used while the TUI owns the terminal.
const TUI_LOG_FILE: &str = "loans.log";

/// Entry point for the `loans` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();

    // We want `loans` and `loans -c "Bad Loan"` to behave like `loans tui ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Tui(args) => handle_tui(args),
        Command::Overview(args) => handle_overview(args),
        Command::Financial(args) => handle_financial(args),
        Command::Sample(args) => handle_sample(args),
    }
}

fn handle_tui(args: TuiArgs) -> Result<(), AppError> {
    init_logging(LogTarget::File)?;
    crate::tui::run(dashboard_config_from_tui(&args))
}

fn handle_overview(args: OverviewArgs) -> Result<(), AppError> {
    init_logging(LogTarget::Stderr)?;
    let page = pipeline::render_overview(&args.data.data)?;

    if args.json {
        println!("{}", to_json(&page)?);
        return Ok(());
    }

    println!("{}", crate::report::format_overview(&page));

    if args.plot {
        println!("Number of Loans Over Time");
        println!(
            "{}",
            crate::plot::render_date_series(&page.loans_over_time, |n| *n as f64, args.width, args.height)
        );
        println!("Total Loans Amount Issued Over Time");
        println!(
            "{}",
            crate::plot::render_date_series(&page.amount_over_time, |v| *v, args.width, args.height)
        );

        let weekday_rows: Vec<(String, f64)> = page
            .loans_by_weekday
            .iter()
            .map(|(d, n)| (d.to_string(), *n as f64))
            .collect();
        println!("Distribution of Loans by Day of The Week");
        println!("{}", crate::plot::render_bar_chart(&weekday_rows, args.width));

        let grade_rows: Vec<(String, f64)> = page
            .loans_by_grade
            .iter()
            .map(|(g, n)| (g.clone(), *n as f64))
            .collect();
        println!("Distribution of Loans by Grade");
        println!("{}", crate::plot::render_bar_chart(&grade_rows, args.width));
    }

    Ok(())
}

fn handle_financial(args: FinancialArgs) -> Result<(), AppError> {
    init_logging(LogTarget::Stderr)?;
    let page = pipeline::render_financial(&args.data.data, &args.condition)?;

    if args.json {
        println!("{}", to_json(&page)?);
    } else {
        require_selection(&page)?;
        println!("{}", crate::report::format_financial(&page, args.bins));
    }
    Ok(())
}

/// The text report has nothing to show without at least one selected loan.
fn require_selection(page: &FinancialPage) -> Result<(), AggregationError> {
    if page.selected_loans == 0 {
        warn!(condition = %page.condition, available = ?page.conditions, "no loans for condition");
        return Err(AggregationError::empty("the amount distribution of the selected condition"));
    }
    Ok(())
}

fn handle_sample(args: SampleArgs) -> Result<(), AppError> {
    init_logging(LogTarget::Stderr)?;
    let config = SampleConfig {
        count: args.count,
        seed: args.seed,
        start: args.start,
        months: args.months,
    };
    let n = crate::data::write_sample_file(&args.out, &config)?;
    println!("Wrote {n} loans to {}", args.out.display());
    Ok(())
}

pub fn dashboard_config_from_tui(args: &TuiArgs) -> DashboardConfig {
    DashboardConfig {
        data_path: args.data.data.clone(),
        condition: args.condition.clone(),
        histogram_bins: args.bins.max(1),
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, AppError> {
    serde_json::to_string_pretty(value).map_err(|e| AppError::new(4, format!("Failed to encode JSON: {e}")))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LogTarget {
    Stderr,
    /// Only when `LOANS_LOG` is set; otherwise logging stays off.
    File,
}

fn init_logging(target: LogTarget) -> Result<(), AppError> {
    let directive = std::env::var(LOG_ENV).ok();

    match target {
        LogTarget::Stderr => {
            let filter = EnvFilter::try_new(directive.as_deref().unwrap_or("warn"))
                .map_err(|e| AppError::new(2, format!("Invalid {LOG_ENV} filter: {e}")))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .try_init()
                .ok();
        }
        LogTarget::File => {
            let Some(directive) = directive else {
                return Ok(());
            };
            let filter = EnvFilter::try_new(&directive)
                .map_err(|e| AppError::new(2, format!("Invalid {LOG_ENV} filter: {e}")))?;
            let file = File::create(TUI_LOG_FILE)
                .map_err(|e| AppError::new(4, format!("Failed to create log file '{TUI_LOG_FILE}': {e}")))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .try_init()
                .ok();
        }
    }
    Ok(())
}

/// Rewrite argv so `loans` defaults to `loans tui`.
///
/// Rules:
/// - `loans`                      -> `loans tui`
/// - `loans -c "Bad Loan" ...`    -> `loans tui -c "Bad Loan" ...`
/// - `loans --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "tui" | "overview" | "financial" | "sample");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_opens_tui() {
        assert_eq!(rewrite_args(args(&["loans"])), args(&["loans", "tui"]));
    }

    #[test]
    fn leading_flag_is_a_tui_flag() {
        assert_eq!(
            rewrite_args(args(&["loans", "-c", "Bad Loan"])),
            args(&["loans", "tui", "-c", "Bad Loan"])
        );
    }

    #[test]
    fn subcommands_and_help_pass_through() {
        assert_eq!(rewrite_args(args(&["loans", "overview"])), args(&["loans", "overview"]));
        assert_eq!(rewrite_args(args(&["loans", "--help"])), args(&["loans", "--help"]));
    }

    #[test]
    fn empty_selection_fails_with_empty_data_exit_code() {
        let page = FinancialPage::from_store(&crate::domain::LoanStore::default(), "Charged Off");
        let err: AppError = require_selection(&page).unwrap_err().into();
        assert_eq!(err.exit_code(), 3);
        assert!(err.to_string().contains("selected condition"));
    }

    #[test]
    fn nonempty_selection_is_accepted() {
        let record = crate::domain::LoanRecord {
            issue_date: chrono::NaiveDate::from_ymd_opt(2015, 1, 1).unwrap(),
            issue_weekday: crate::domain::IssueWeekday::Thursday,
            loan_amount: 1000.0,
            interest_rate: 10.0,
            loan_condition: crate::domain::GOOD_LOAN.to_string(),
            grade: "A".to_string(),
            purpose: "Car".to_string(),
            term: "36 months".to_string(),
        };
        let store = crate::domain::LoanStore::new(vec![record]);
        assert!(require_selection(&FinancialPage::from_store(&store, crate::domain::GOOD_LOAN)).is_ok());
    }

    #[test]
    fn tui_config_clamps_bins() {
        let cli = crate::cli::Cli::parse_from(["loans", "tui", "--data", "x.csv", "--bins", "0"]);
        let Command::Tui(tui) = cli.command else {
            panic!("expected tui");
        };
        let config = dashboard_config_from_tui(&tui);
        assert_eq!(config.histogram_bins, 1);
        assert_eq!(config.data_path, std::path::PathBuf::from("x.csv"));
    }
}
