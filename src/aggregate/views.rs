//! Grouped aggregations feeding the dashboard charts.
//!
//! Every function is a single pass over the (possibly filtered) store and
//! returns a `DerivedView`. An empty store gives an empty view for counts
//! and sums; only mean/ratio views can fail, with `AggregationError::Empty`.
//!
//! Values are never rounded here. Display formatting belongs to `report`.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::debug;

use crate::domain::{DerivedView, GroupColumn, IssueWeekday, LoanStore, count_keys};
use crate::error::AggregationError;

/// Number of loans issued per date, ascending by date.
pub fn count_by_date(store: &LoanStore) -> DerivedView<NaiveDate, usize> {
    count_keys(store.iter().map(|r| r.issue_date))
}

/// Total `loan_amount` issued per date, ascending by date.
pub fn sum_by_date(store: &LoanStore) -> DerivedView<NaiveDate, f64> {
    let mut sums: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for r in store {
        *sums.entry(r.issue_date).or_insert(0.0) += r.loan_amount;
    }
    sums.into()
}

/// Number of loans per issue weekday.
///
/// Always exactly seven entries, Monday→Sunday, with zero for weekdays that
/// have no loans.
pub fn count_by_weekday(store: &LoanStore) -> DerivedView<IssueWeekday, usize> {
    let mut counts = [0usize; 7];
    for r in store {
        counts[r.issue_weekday as usize] += 1;
    }
    DerivedView::from_ordered(IssueWeekday::ALL.into_iter().zip(counts).collect())
}

/// Number of loans per `loan_condition`, ascending by label.
pub fn count_by_condition(store: &LoanStore) -> DerivedView<String, usize> {
    count_keys(store.iter().map(|r| r.loan_condition.clone()))
}

/// Each condition's share of the total count (fractions in `0..=1`).
///
/// Shares of a non-empty view sum to 1.
pub fn condition_shares(counts: &DerivedView<String, usize>) -> Result<DerivedView<String, f64>, AggregationError> {
    let total = counts.total();
    if total == 0 {
        return Err(AggregationError::empty("loan condition shares"));
    }
    Ok(counts.clone().map_measures(|_, n| n as f64 / total as f64))
}

/// Number of loans per `grade`, ascending by grade label.
pub fn count_by_grade(store: &LoanStore) -> DerivedView<String, usize> {
    count_keys(store.iter().map(|r| r.grade.clone()))
}

/// Mean `loan_amount` per `grade`, ascending by grade label.
///
/// Only grades that occur get an entry, so no group is ever empty; the only
/// failure is an empty store.
pub fn mean_amount_by_grade(store: &LoanStore) -> Result<DerivedView<String, f64>, AggregationError> {
    if store.is_empty() {
        return Err(AggregationError::empty("average loan amount by grade"));
    }
    let mut acc: BTreeMap<String, (f64, usize)> = BTreeMap::new();
    for r in store {
        let e = acc.entry(r.grade.clone()).or_insert((0.0, 0));
        e.0 += r.loan_amount;
        e.1 += 1;
    }
    Ok(DerivedView::from(acc).map_measures(|_, (sum, n)| sum / n as f64))
}

/// Raw `loan_amount` values per `group` label, ascending by label.
///
/// Values keep store order within each group. No binning or summarizing is
/// done here; histogram and box-plot renderers work from the raw values.
pub fn distribution_by_amount(store: &LoanStore, group: GroupColumn) -> DerivedView<String, Vec<f64>> {
    let mut groups: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for r in store {
        groups.entry(group.key_of(r)).or_default().push(r.loan_amount);
    }
    debug!(?group, groups = groups.len(), "amount distribution");
    groups.into()
}

/// Raw `loan_amount` values per `(outer, inner)` label pair.
///
/// Ascending by outer label, then inner label. Used for charts that split a
/// category axis by a second category (amount by purpose, coloured by term).
pub fn distribution_by_amount_within(
    store: &LoanStore,
    outer: GroupColumn,
    inner: GroupColumn,
) -> DerivedView<(String, String), Vec<f64>> {
    let mut groups: BTreeMap<(String, String), Vec<f64>> = BTreeMap::new();
    for r in store {
        groups
            .entry((outer.key_of(r), inner.key_of(r)))
            .or_default()
            .push(r.loan_amount);
    }
    groups.into()
}
