//! Random loan stores for property tests.

use chrono::{Days, NaiveDate};
use proptest::prelude::*;

use super::{BAD_LOAN, GOOD_LOAN, IssueWeekday, LoanRecord, LoanStore};

fn arb_weekday() -> impl Strategy<Value = IssueWeekday> {
    prop::sample::select(IssueWeekday::ALL.to_vec())
}

fn arb_condition() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(GOOD_LOAN.to_string()),
        Just(BAD_LOAN.to_string()),
        Just("Current".to_string()),
    ]
}

/// Issue dates within a few years, so generated stores share dates often.
fn arb_issue_date() -> impl Strategy<Value = NaiveDate> {
    (0u64..1200).prop_map(|offset| {
        let start = NaiveDate::from_ymd_opt(2012, 1, 1).unwrap();
        start + Days::new(offset)
    })
}

pub(crate) fn arb_loan() -> impl Strategy<Value = LoanRecord> {
    (
        arb_issue_date(),
        arb_weekday(),
        500u32..35_000,
        500u32..2_600,
        arb_condition(),
        "[A-G]",
        prop::sample::select(vec!["Car", "Credit Card", "Debt Consolidation"]),
        prop::sample::select(vec!["36 months", "60 months"]),
    )
        .prop_map(|(issue_date, issue_weekday, amount, rate_bp, loan_condition, grade, purpose, term)| {
            LoanRecord {
                issue_date,
                issue_weekday,
                loan_amount: amount as f64,
                interest_rate: rate_bp as f64 / 100.0,
                loan_condition,
                grade,
                purpose: purpose.to_string(),
                term: term.to_string(),
            }
        })
}

/// Stores of 0 to `max_len - 1` records.
pub(crate) fn arb_store(max_len: usize) -> impl Strategy<Value = LoanStore> {
    prop::collection::vec(arb_loan(), 0..max_len).prop_map(LoanStore::new)
}
