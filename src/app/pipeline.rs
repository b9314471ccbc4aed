//! Shared "page render" logic used by both CLI and TUI front-ends.
//!
//! One render = load the store fresh from disk, then compute every view the
//! page shows. Nothing is cached between renders, so each call sees the
//! backing file as it is right now.
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use std::path::Path;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{info, warn};

use crate::aggregate::metrics::serialize_metric;
use crate::aggregate::{self, SummaryMetrics};
use crate::domain::{DerivedView, GroupColumn, IssueWeekday, LoanStore};
use crate::error::{AggregationError, LoadError};
use crate::io::load_loan_store;
use crate::select::{distinct_conditions, filter_by_condition};

/// Everything the overview ("Home") page shows.
#[derive(Debug, Clone, Serialize)]
pub struct OverviewPage {
    pub metrics: SummaryMetrics,
    pub loans_over_time: DerivedView<NaiveDate, usize>,
    pub amount_over_time: DerivedView<NaiveDate, f64>,
    pub loans_by_weekday: DerivedView<IssueWeekday, usize>,
    pub loans_by_condition: DerivedView<String, usize>,
    #[serde(serialize_with = "serialize_metric")]
    pub condition_shares: Result<DerivedView<String, f64>, AggregationError>,
    pub loans_by_grade: DerivedView<String, usize>,
    #[serde(serialize_with = "serialize_metric")]
    pub mean_amount_by_grade: Result<DerivedView<String, f64>, AggregationError>,
}

/// Everything the Financial Analysis page shows for one loan condition.
#[derive(Debug, Clone, Serialize)]
pub struct FinancialPage {
    pub condition: String,
    /// Conditions the selector can offer, ascending.
    pub conditions: Vec<String>,
    pub selected_loans: usize,
    pub amount_by_term: DerivedView<String, Vec<f64>>,
    pub amount_by_purpose_and_term: DerivedView<(String, String), Vec<f64>>,
}

impl OverviewPage {
    pub fn from_store(store: &LoanStore) -> Self {
        let loans_by_condition = aggregate::count_by_condition(store);
        let condition_shares = aggregate::condition_shares(&loans_by_condition);

        let metrics = SummaryMetrics::compute(store);
        if let Err(err) = &metrics.mean_loan_amount {
            warn!(%err, "overview metrics degraded");
        }

        Self {
            metrics,
            loans_over_time: aggregate::count_by_date(store),
            amount_over_time: aggregate::sum_by_date(store),
            loans_by_weekday: aggregate::count_by_weekday(store),
            loans_by_condition,
            condition_shares,
            loans_by_grade: aggregate::count_by_grade(store),
            mean_amount_by_grade: aggregate::mean_amount_by_grade(store),
        }
    }
}

impl FinancialPage {
    pub fn from_store(store: &LoanStore, condition: &str) -> Self {
        let selected = filter_by_condition(store, condition);
        if selected.is_empty() {
            warn!(condition, "no loans for selected condition");
        }

        Self {
            condition: condition.to_string(),
            conditions: distinct_conditions(store),
            selected_loans: selected.len(),
            amount_by_term: aggregate::distribution_by_amount(&selected, GroupColumn::Term),
            amount_by_purpose_and_term: aggregate::distribution_by_amount_within(
                &selected,
                GroupColumn::Purpose,
                GroupColumn::Term,
            ),
        }
    }
}

/// Render the overview page from the backing file.
pub fn render_overview(data_path: &Path) -> Result<OverviewPage, LoadError> {
    let store = load_loan_store(data_path)?;
    info!(records = store.len(), "rendering overview");
    Ok(OverviewPage::from_store(&store))
}

/// Render the Financial Analysis page from the backing file.
pub fn render_financial(data_path: &Path, condition: &str) -> Result<FinancialPage, LoadError> {
    let store = load_loan_store(data_path)?;
    info!(records = store.len(), condition, "rendering financial analysis");
    Ok(FinancialPage::from_store(&store, condition))
}
