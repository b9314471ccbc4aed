//! Scalar summary metrics over the whole store.

use serde::Serialize;

use crate::domain::LoanStore;
use crate::error::AggregationError;

/// Number of loans.
pub fn total_count(store: &LoanStore) -> usize {
    store.len()
}

/// Sum of `loan_amount`; `0.0` for an empty store.
pub fn total_amount(store: &LoanStore) -> f64 {
    store.iter().map(|r| r.loan_amount).sum()
}

/// Mean `interest_rate` in percent.
pub fn mean_interest_rate(store: &LoanStore) -> Result<f64, AggregationError> {
    mean(store.iter().map(|r| r.interest_rate), "average interest rate")
}

/// Mean `loan_amount`.
pub fn mean_loan_amount(store: &LoanStore) -> Result<f64, AggregationError> {
    mean(store.iter().map(|r| r.loan_amount), "average loan amount")
}

fn mean(values: impl Iterator<Item = f64>, metric: &'static str) -> Result<f64, AggregationError> {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 {
        return Err(AggregationError::empty(metric));
    }
    Ok(sum / n as f64)
}

/// The four headline metrics of the overview page.
///
/// Mean metrics keep their own `Result` so an empty store degrades to a
/// "no data" cell instead of failing the page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryMetrics {
    pub total_loans: usize,
    pub total_amount: f64,
    #[serde(serialize_with = "serialize_metric")]
    pub mean_interest_rate: Result<f64, AggregationError>,
    #[serde(serialize_with = "serialize_metric")]
    pub mean_loan_amount: Result<f64, AggregationError>,
}

impl SummaryMetrics {
    pub fn compute(store: &LoanStore) -> Self {
        Self {
            total_loans: total_count(store),
            total_amount: total_amount(store),
            mean_interest_rate: mean_interest_rate(store),
            mean_loan_amount: mean_loan_amount(store),
        }
    }
}

/// `null` for a metric with no data.
pub(crate) fn serialize_metric<S, T>(value: &Result<T, AggregationError>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
    T: Serialize,
{
    match value {
        Ok(v) => serializer.serialize_some(v),
        Err(_) => serializer.serialize_none(),
    }
}
