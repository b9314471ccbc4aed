//! View selection: narrowing the store to the user's chosen loan condition.
//!
//! The Financial Analysis dropdown only ever offers conditions present in the
//! data, so an unknown condition is not an error: it selects nothing.

use std::collections::BTreeSet;

use tracing::debug;

use crate::domain::LoanStore;

/// Records whose `loan_condition` equals `condition` exactly, in store order.
pub fn filter_by_condition(store: &LoanStore, condition: &str) -> LoanStore {
    let selected: LoanStore = store
        .iter()
        .filter(|r| r.loan_condition == condition)
        .cloned()
        .collect();
    debug!(condition, selected = selected.len(), total = store.len(), "filtered by condition");
    selected
}

/// Distinct condition labels present in the store, ascending.
///
/// These are the options a condition selector should offer.
pub fn distinct_conditions(store: &LoanStore) -> Vec<String> {
    store
        .iter()
        .map(|r| r.loan_condition.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Step through `options` from `current`, wrapping at both ends.
///
/// If `current` is not among the options, the first option is returned.
pub fn cycle_condition<'a>(options: &'a [String], current: &str, forward: bool) -> Option<&'a str> {
    let n = options.len();
    if n == 0 {
        return None;
    }
    let next = match options.iter().position(|c| c == current) {
        Some(i) if forward => (i + 1) % n,
        Some(i) => (i + n - 1) % n,
        None => 0,
    };
    Some(options[next].as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::strategy::arb_store;
    use proptest::prelude::*;
    use crate::domain::{BAD_LOAN, GOOD_LOAN, IssueWeekday, LoanRecord};
    use chrono::NaiveDate;

    fn loan(amount: f64, condition: &str) -> LoanRecord {
        LoanRecord {
            issue_date: NaiveDate::from_ymd_opt(2015, 1, 1).unwrap(),
            issue_weekday: IssueWeekday::Thursday,
            loan_amount: amount,
            interest_rate: 10.0,
            loan_condition: condition.to_string(),
            grade: "A".to_string(),
            purpose: "Car".to_string(),
            term: "36 months".to_string(),
        }
    }

    fn scenario_store() -> LoanStore {
        LoanStore::new(vec![
            loan(100.0, GOOD_LOAN),
            loan(200.0, BAD_LOAN),
            loan(50.0, GOOD_LOAN),
        ])
    }

    #[test]
    fn filter_selects_matching_records() {
        let good = filter_by_condition(&scenario_store(), GOOD_LOAN);
        assert_eq!(good.len(), 2);
        let sum: f64 = good.iter().map(|r| r.loan_amount).sum();
        assert!((sum - 150.0).abs() < 1e-12);
        assert_eq!(good.records()[0].loan_amount, 100.0);
        assert_eq!(good.records()[1].loan_amount, 50.0);
    }

    #[test]
    fn unknown_condition_selects_nothing() {
        assert!(filter_by_condition(&scenario_store(), "Charged Off").is_empty());
        assert!(filter_by_condition(&LoanStore::default(), GOOD_LOAN).is_empty());
    }

    #[test]
    fn filters_over_all_conditions_partition_the_store() {
        let store = LoanStore::new(vec![
            loan(1.0, GOOD_LOAN),
            loan(2.0, BAD_LOAN),
            loan(3.0, "Current"),
            loan(4.0, GOOD_LOAN),
            loan(5.0, "Current"),
        ]);

        let mut seen: Vec<f64> = distinct_conditions(&store)
            .iter()
            .flat_map(|c| filter_by_condition(&store, c).records().to_vec())
            .map(|r| r.loan_amount)
            .collect();
        seen.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(seen, vec![1.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn distinct_conditions_are_sorted() {
        assert_eq!(distinct_conditions(&scenario_store()), vec![BAD_LOAN, GOOD_LOAN]);
    }

    #[test]
    fn cycle_wraps_both_ways() {
        let opts = vec![BAD_LOAN.to_string(), GOOD_LOAN.to_string()];
        assert_eq!(cycle_condition(&opts, GOOD_LOAN, true), Some(BAD_LOAN));
        assert_eq!(cycle_condition(&opts, BAD_LOAN, false), Some(GOOD_LOAN));
        assert_eq!(cycle_condition(&opts, "other", true), Some(BAD_LOAN));
        assert_eq!(cycle_condition(&[], GOOD_LOAN, true), None);
    }

    proptest! {
        #[test]
        fn filters_over_distinct_conditions_partition_any_store(store in arb_store(200)) {
            let conditions = distinct_conditions(&store);
            let mut total = 0;
            for c in &conditions {
                let selected = filter_by_condition(&store, c);
                let expected: Vec<LoanRecord> =
                    store.iter().filter(|r| r.loan_condition == *c).cloned().collect();
                prop_assert_eq!(selected.records(), expected.as_slice());
                total += selected.len();
            }
            prop_assert_eq!(total, store.len());
            prop_assert!(store.iter().all(|r| conditions.contains(&r.loan_condition)));
        }
    }
}
