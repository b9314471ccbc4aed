//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - held in memory for the duration of one page render
//! - handed to any presentation layer (terminal, JSON)

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Condition labels the dashboard knows about.
pub const GOOD_LOAN: &str = "Good Loan";
pub const BAD_LOAN: &str = "Bad Loan";

/// Day of the week a loan was issued.
///
/// The canonical chart order is Monday→Sunday and is fixed domain knowledge,
/// so it lives here as a constant rather than being derived from data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum IssueWeekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl IssueWeekday {
    pub const ALL: [IssueWeekday; 7] = [
        IssueWeekday::Monday,
        IssueWeekday::Tuesday,
        IssueWeekday::Wednesday,
        IssueWeekday::Thursday,
        IssueWeekday::Friday,
        IssueWeekday::Saturday,
        IssueWeekday::Sunday,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            IssueWeekday::Monday => "Monday",
            IssueWeekday::Tuesday => "Tuesday",
            IssueWeekday::Wednesday => "Wednesday",
            IssueWeekday::Thursday => "Thursday",
            IssueWeekday::Friday => "Friday",
            IssueWeekday::Saturday => "Saturday",
            IssueWeekday::Sunday => "Sunday",
        }
    }

    pub fn short_name(self) -> &'static str {
        &self.display_name()[..3]
    }

    pub fn of_date(date: NaiveDate) -> Self {
        date.weekday().into()
    }
}

impl From<chrono::Weekday> for IssueWeekday {
    fn from(day: chrono::Weekday) -> Self {
        match day {
            chrono::Weekday::Mon => IssueWeekday::Monday,
            chrono::Weekday::Tue => IssueWeekday::Tuesday,
            chrono::Weekday::Wed => IssueWeekday::Wednesday,
            chrono::Weekday::Thu => IssueWeekday::Thursday,
            chrono::Weekday::Fri => IssueWeekday::Friday,
            chrono::Weekday::Sat => IssueWeekday::Saturday,
            chrono::Weekday::Sun => IssueWeekday::Sunday,
        }
    }
}

impl fmt::Display for IssueWeekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for IssueWeekday {
    type Err = String;

    /// Accepts full or three-letter English names, any case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        IssueWeekday::ALL
            .into_iter()
            .find(|d| {
                needle.eq_ignore_ascii_case(d.display_name()) || needle.eq_ignore_ascii_case(d.short_name())
            })
            .ok_or_else(|| format!("Unknown weekday '{needle}'."))
    }
}

/// One loan, as read from the cleaned dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanRecord {
    pub issue_date: NaiveDate,
    pub issue_weekday: IssueWeekday,
    pub loan_amount: f64,
    /// Annual rate in percent (e.g. `13.5` for 13.5%).
    pub interest_rate: f64,
    pub loan_condition: String,
    pub grade: String,
    /// Title-cased, spaces instead of underscores.
    pub purpose: String,
    pub term: String,
}

/// Immutable, ordered collection of loan records for one render.
///
/// There are no mutating accessors: filtering produces a new store.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LoanStore {
    records: Vec<LoanRecord>,
}

impl LoanStore {
    pub fn new(records: Vec<LoanRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[LoanRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LoanRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<'a> IntoIterator for &'a LoanStore {
    type Item = &'a LoanRecord;
    type IntoIter = std::slice::Iter<'a, LoanRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl FromIterator<LoanRecord> for LoanStore {
    fn from_iter<I: IntoIterator<Item = LoanRecord>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Categorical column used to split amount distributions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupColumn {
    Term,
    Purpose,
}

impl GroupColumn {
    /// Group label of `record` under this column.
    pub fn key_of(self, record: &LoanRecord) -> String {
        match self {
            GroupColumn::Term => record.term.clone(),
            GroupColumn::Purpose => record.purpose.clone(),
        }
    }
}

/// Resolved settings for one dashboard run.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    pub data_path: PathBuf,
    /// Selected `loan_condition` for the Financial Analysis page.
    pub condition: String,
    pub histogram_bins: usize,
}

impl DashboardConfig {
    pub const DEFAULT_DATA_PATH: &'static str = "data_input/loan_clean.csv";
    pub const DEFAULT_HISTOGRAM_BINS: usize = 30;
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(Self::DEFAULT_DATA_PATH),
            condition: GOOD_LOAN.to_string(),
            histogram_bins: Self::DEFAULT_HISTOGRAM_BINS,
        }
    }
}
