//! Synthetic loan dataset generation.
//!
//! Produces a CSV in the same shape as the cleaned dataset the dashboard
//! reads, so the tool can be tried without the real data. Output is fully
//! determined by the settings (including the seed).

use std::fs::File;
use std::io::Write;
use std::path::Path;

use chrono::{Datelike, Months, NaiveDate};
use rand::distributions::WeightedIndex;
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::{LogNormal, Normal};
use serde::Serialize;
use tracing::info;

use crate::domain::{BAD_LOAN, GOOD_LOAN, IssueWeekday};
use crate::error::SampleError;

const GRADES: [&str; 7] = ["A", "B", "C", "D", "E", "F", "G"];
const GRADE_WEIGHTS: [u32; 7] = [20, 29, 26, 15, 7, 2, 1];
/// Typical annual rate (percent) per grade.
const GRADE_BASE_RATE: [f64; 7] = [7.2, 10.8, 13.6, 16.5, 19.4, 22.8, 25.2];
const GRADE_BAD_PROB: [f64; 7] = [0.03, 0.06, 0.09, 0.12, 0.16, 0.20, 0.25];

/// Raw purposes as they appear before normalization.
const PURPOSES: [(&str, u32); 11] = [
    ("debt_consolidation", 60),
    ("credit_card", 20),
    ("home_improvement", 6),
    ("other", 5),
    ("major_purchase", 2),
    ("small_business", 2),
    ("car", 1),
    ("medical", 1),
    ("moving", 1),
    ("vacation", 1),
    ("house", 1),
];

const TERM_36: &str = "36 months";
const TERM_60: &str = "60 months";

const AMOUNT_MIN: f64 = 500.0;
const AMOUNT_MAX: f64 = 35_000.0;
const AMOUNT_STEP: f64 = 25.0;

/// Settings for one generated dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleConfig {
    pub count: usize,
    pub seed: u64,
    /// First issue month (any day; normalized to the 1st).
    pub start: NaiveDate,
    /// Number of consecutive issue months.
    pub months: u32,
}

/// One CSV row. Field names are the dataset's column names.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampleRow {
    pub issue_date: NaiveDate,
    pub issue_weekday: &'static str,
    pub loan_amount: f64,
    pub interest_rate: f64,
    pub loan_condition: &'static str,
    pub grade: &'static str,
    pub purpose: &'static str,
    pub term: &'static str,
}

pub fn generate_sample(config: &SampleConfig) -> Result<Vec<SampleRow>, SampleError> {
    if config.count == 0 {
        return Err(SampleError::InvalidSettings("sample count must be > 0".to_string()));
    }
    if config.months == 0 {
        return Err(SampleError::InvalidSettings("month span must be > 0".to_string()));
    }

    let start = config.start.with_day(1).unwrap_or(config.start);
    let issue_months: Vec<NaiveDate> = (0..config.months)
        .map(|i| {
            start
                .checked_add_months(Months::new(i))
                .ok_or_else(|| SampleError::InvalidSettings(format!("month span overflows the calendar at +{i}")))
        })
        .collect::<Result<_, _>>()?;

    let mut rng = StdRng::seed_from_u64(config.seed);
    let invalid = |e: String| SampleError::InvalidSettings(e);

    // Later months issue more loans.
    let month_dist = WeightedIndex::new((1..=config.months).map(|w| w as f64)).map_err(|e| invalid(e.to_string()))?;
    let grade_dist = WeightedIndex::new(GRADE_WEIGHTS).map_err(|e| invalid(e.to_string()))?;
    let purpose_dist = WeightedIndex::new(PURPOSES.map(|(_, w)| w)).map_err(|e| invalid(e.to_string()))?;
    let amount_dist = LogNormal::<f64>::new(9.2, 0.6).map_err(|e| invalid(e.to_string()))?;
    let rate_noise = Normal::<f64>::new(0.0, 1.1).map_err(|e| invalid(e.to_string()))?;

    let mut rows = Vec::with_capacity(config.count);
    for _ in 0..config.count {
        let issue_date = issue_months[month_dist.sample(&mut rng)];
        let g = grade_dist.sample(&mut rng);

        let amount = amount_dist.sample(&mut rng).clamp(AMOUNT_MIN, AMOUNT_MAX);
        let loan_amount = (amount / AMOUNT_STEP).round() * AMOUNT_STEP;

        let rate = (GRADE_BASE_RATE[g] + rate_noise.sample(&mut rng)).max(5.0);
        let interest_rate = (rate * 100.0).round() / 100.0;

        let p_long = 0.15 + 0.08 * g as f64;
        let term = if rng.r#gen::<f64>() < p_long { TERM_60 } else { TERM_36 };

        let loan_condition = if rng.r#gen::<f64>() < GRADE_BAD_PROB[g] {
            BAD_LOAN
        } else {
            GOOD_LOAN
        };

        rows.push(SampleRow {
            issue_date,
            issue_weekday: IssueWeekday::of_date(issue_date).display_name(),
            loan_amount,
            interest_rate,
            loan_condition,
            grade: GRADES[g],
            purpose: PURPOSES[purpose_dist.sample(&mut rng)].0,
            term,
        });
    }

    Ok(rows)
}

/// Write rows as CSV (header included).
pub fn write_sample_csv<W: Write>(rows: &[SampleRow], writer: W) -> Result<(), SampleError> {
    let mut wtr = csv::Writer::from_writer(writer);
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Generate a dataset and write it to `path`. Returns the row count.
pub fn write_sample_file(path: &Path, config: &SampleConfig) -> Result<usize, SampleError> {
    let rows = generate_sample(config)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| SampleError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let file = File::create(path).map_err(|source| SampleError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    write_sample_csv(&rows, file)?;
    info!(path = %path.display(), rows = rows.len(), seed = config.seed, "wrote synthetic loan dataset");
    Ok(rows.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::read_loan_store;

    fn config(count: usize, seed: u64) -> SampleConfig {
        SampleConfig {
            count,
            seed,
            start: NaiveDate::from_ymd_opt(2014, 1, 15).unwrap(),
            months: 24,
        }
    }

    #[test]
    fn same_seed_same_rows() {
        assert_eq!(generate_sample(&config(200, 7)).unwrap(), generate_sample(&config(200, 7)).unwrap());
        assert_ne!(generate_sample(&config(200, 7)).unwrap(), generate_sample(&config(200, 8)).unwrap());
    }

    #[test]
    fn rows_respect_domain_ranges() {
        let first = NaiveDate::from_ymd_opt(2014, 1, 1).unwrap();
        let last = NaiveDate::from_ymd_opt(2015, 12, 1).unwrap();

        for row in generate_sample(&config(500, 1)).unwrap() {
            assert_eq!(row.issue_date.day(), 1);
            assert!(row.issue_date >= first && row.issue_date <= last);
            assert_eq!(row.issue_weekday, IssueWeekday::of_date(row.issue_date).display_name());
            assert!((AMOUNT_MIN..=AMOUNT_MAX).contains(&row.loan_amount));
            assert_eq!(row.loan_amount % AMOUNT_STEP, 0.0);
            assert!(row.interest_rate >= 5.0);
            assert!(row.term == TERM_36 || row.term == TERM_60);
            assert!(row.loan_condition == GOOD_LOAN || row.loan_condition == BAD_LOAN);
        }
    }

    #[test]
    fn written_csv_loads_back() {
        let rows = generate_sample(&config(50, 3)).unwrap();
        let mut buf = Vec::new();
        write_sample_csv(&rows, &mut buf).unwrap();

        let store = read_loan_store(buf.as_slice()).unwrap();
        assert_eq!(store.len(), 50);
        for (rec, row) in store.iter().zip(&rows) {
            assert_eq!(rec.issue_date, row.issue_date);
            assert_eq!(rec.loan_amount, row.loan_amount);
            assert!(!rec.purpose.contains('_'));
        }
    }

    #[test]
    fn zero_count_or_months_is_rejected() {
        assert!(matches!(generate_sample(&config(0, 1)), Err(SampleError::InvalidSettings(_))));
        let mut cfg = config(10, 1);
        cfg.months = 0;
        assert!(matches!(generate_sample(&cfg), Err(SampleError::InvalidSettings(_))));
    }

    #[test]
    fn writes_file_creating_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data_input").join("loan_clean.csv");
        let n = write_sample_file(&path, &config(10, 2)).unwrap();
        assert_eq!(n, 10);
        assert!(path.exists());
    }
}
