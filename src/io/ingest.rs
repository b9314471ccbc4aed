//! CSV ingest for the cleaned loan dataset.
//!
//! Turns the backing CSV into a `LoanStore`. The dataset is expected to be
//! pre-cleaned, so the loader is strict: a missing column or a bad value in
//! any row fails the whole load with a `LoadError` naming the line and column.
//!
//! The only transformation applied is `purpose` normalization
//! (`debt_consolidation` → `Debt Consolidation`).

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use csv::StringRecord;
use tracing::debug;

use crate::domain::{IssueWeekday, LoanRecord, LoanStore};
use crate::error::LoadError;

const COL_ISSUE_DATE: &str = "issue_date";
const COL_ISSUE_WEEKDAY: &str = "issue_weekday";
const COL_LOAN_AMOUNT: &str = "loan_amount";
const COL_INTEREST_RATE: &str = "interest_rate";
const COL_LOAN_CONDITION: &str = "loan_condition";
const COL_GRADE: &str = "grade";
const COL_PURPOSE: &str = "purpose";
const COL_TERM: &str = "term";

pub const REQUIRED_COLUMNS: [&str; 8] = [
    COL_ISSUE_DATE,
    COL_ISSUE_WEEKDAY,
    COL_LOAN_AMOUNT,
    COL_INTEREST_RATE,
    COL_LOAN_CONDITION,
    COL_GRADE,
    COL_PURPOSE,
    COL_TERM,
];

/// Resolved column positions for the required schema.
struct Columns {
    issue_date: usize,
    issue_weekday: usize,
    loan_amount: usize,
    interest_rate: usize,
    loan_condition: usize,
    grade: usize,
    purpose: usize,
    term: usize,
}

/// Load the full store from a CSV file.
///
/// Reads the file every time it is called; there is no caching.
///
/// The dataset is expected to be pre-cleaned, so every required column must
/// hold a value on every row, not only the date, amount and condition. A blank
/// `interest_rate`, `grade` or `term` fails the load with
/// [`LoadError::InvalidRow`] instead of being skipped; only `purpose` may be
/// empty.
pub fn load_loan_store(path: &Path) -> Result<LoanStore, LoadError> {
    let file = File::open(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            LoadError::NotFound(path.to_path_buf())
        } else {
            LoadError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    let store = read_loan_store(file)?;
    debug!(path = %path.display(), records = store.len(), "loaded loan store");
    Ok(store)
}

/// Parse a store from any CSV reader.
pub fn read_loan_store<R: Read>(reader: R) -> Result<LoanStore, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    let columns = resolve_columns(&build_header_map(&headers))?;

    let mut records = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        // +2: header is line 1 and CSV lines are 1-based.
        let line = idx + 2;
        let record = result?;
        records.push(parse_row(&record, &columns, line)?);
    }

    Ok(LoanStore::new(records))
}

/// `debt_consolidation` → `Debt Consolidation`.
///
/// Underscores become spaces, then every word gets an uppercase first letter
/// and lowercase remainder. A "word" starts after any non-alphabetic
/// character, so `credit_card/other` → `Credit Card/Other`.
pub fn normalize_purpose(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut at_word_start = true;
    for c in raw.replace('_', " ").chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports often prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn resolve_columns(header_map: &HashMap<String, usize>) -> Result<Columns, LoadError> {
    let find = |name: &'static str| header_map.get(name).copied().ok_or(LoadError::MissingColumn(name));

    Ok(Columns {
        issue_date: find(COL_ISSUE_DATE)?,
        issue_weekday: find(COL_ISSUE_WEEKDAY)?,
        loan_amount: find(COL_LOAN_AMOUNT)?,
        interest_rate: find(COL_INTEREST_RATE)?,
        loan_condition: find(COL_LOAN_CONDITION)?,
        grade: find(COL_GRADE)?,
        purpose: find(COL_PURPOSE)?,
        term: find(COL_TERM)?,
    })
}

fn parse_row(record: &StringRecord, columns: &Columns, line: usize) -> Result<LoanRecord, LoadError> {
    let invalid = |column: &'static str, message: String| LoadError::InvalidRow { line, column, message };

    let issue_date = parse_date(get_required(record, columns.issue_date, COL_ISSUE_DATE, line)?)
        .map_err(|e| invalid(COL_ISSUE_DATE, e))?;

    let issue_weekday = get_required(record, columns.issue_weekday, COL_ISSUE_WEEKDAY, line)?
        .parse::<IssueWeekday>()
        .map_err(|e| invalid(COL_ISSUE_WEEKDAY, e))?;

    let loan_amount = parse_f64(get_required(record, columns.loan_amount, COL_LOAN_AMOUNT, line)?)
        .map_err(|e| invalid(COL_LOAN_AMOUNT, e))?;
    if loan_amount < 0.0 {
        return Err(invalid(COL_LOAN_AMOUNT, format!("Negative amount {loan_amount}.")));
    }

    let interest_rate = parse_f64(get_required(record, columns.interest_rate, COL_INTEREST_RATE, line)?)
        .map_err(|e| invalid(COL_INTEREST_RATE, e))?;

    let loan_condition = get_required(record, columns.loan_condition, COL_LOAN_CONDITION, line)?.to_string();
    let grade = get_required(record, columns.grade, COL_GRADE, line)?.to_string();
    let term = get_required(record, columns.term, COL_TERM, line)?.to_string();
    let purpose = normalize_purpose(record.get(columns.purpose).unwrap_or(""));

    Ok(LoanRecord {
        issue_date,
        issue_weekday,
        loan_amount,
        interest_rate,
        loan_condition,
        grade,
        purpose,
        term,
    })
}

fn get_required<'a>(
    record: &'a StringRecord,
    idx: usize,
    column: &'static str,
    line: usize,
) -> Result<&'a str, LoadError> {
    record
        .get(idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| LoadError::InvalidRow {
            line,
            column,
            message: "Missing value.".to_string(),
        })
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    // pandas writes datetimes as `2015-12-01 00:00:00`; keep only the date part.
    let s = s.split_whitespace().next().unwrap_or(s);

    const FMTS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%d-%m-%Y"];
    for fmt in FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }
    Err(format!(
        "Invalid date '{s}'. Expected one of: YYYY-MM-DD, YYYY/MM/DD, DD/MM/YYYY, DD-MM-YYYY."
    ))
}

fn parse_f64(s: &str) -> Result<f64, String> {
    let v = s
        .parse::<f64>()
        .map_err(|_| format!("Not a number: '{s}'."))?;
    if v.is_finite() {
        Ok(v)
    } else {
        Err(format!("Non-finite number: '{s}'."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const HEADER: &str = "issue_date,issue_weekday,loan_amount,interest_rate,loan_condition,grade,purpose,term\n";

    #[test]
    fn purpose_is_title_cased_without_underscores() {
        assert_eq!(normalize_purpose("debt_consolidation"), "Debt Consolidation");
        assert_eq!(normalize_purpose("CREDIT_CARD"), "Credit Card");
        assert_eq!(normalize_purpose("home_improvement"), "Home Improvement");
        assert_eq!(normalize_purpose("car"), "Car");
        assert_eq!(normalize_purpose(""), "");
    }

    #[test]
    fn reads_rows_in_file_order() {
        let csv = format!(
            "{HEADER}2015-12-01,Tuesday,1000,13.5,Good Loan,B,debt_consolidation,36 months\n\
             2015-11-02 00:00:00,monday,250.5,7.25,Bad Loan,A,credit_card,60 months\n"
        );
        let store = read_loan_store(csv.as_bytes()).unwrap();
        assert_eq!(store.len(), 2);

        let first = &store.records()[0];
        assert_eq!(first.issue_date, NaiveDate::from_ymd_opt(2015, 12, 1).unwrap());
        assert_eq!(first.issue_weekday, IssueWeekday::Tuesday);
        assert_eq!(first.purpose, "Debt Consolidation");
        assert_eq!(first.term, "36 months");

        let second = &store.records()[1];
        assert_eq!(second.issue_date, NaiveDate::from_ymd_opt(2015, 11, 2).unwrap());
        assert_eq!(second.loan_condition, "Bad Loan");
        assert!((second.loan_amount - 250.5).abs() < 1e-12);
    }

    #[test]
    fn header_names_are_case_insensitive_and_bom_tolerant() {
        let csv = "\u{feff}Issue_Date,ISSUE_WEEKDAY,loan_amount,interest_rate,loan_condition,grade,purpose,term,extra\n\
                   2015-12-01,Tuesday,1000,13.5,Good Loan,B,car,36 months,ignored\n";
        let store = read_loan_store(csv.as_bytes()).unwrap();
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn header_only_file_is_an_empty_store() {
        let store = read_loan_store(HEADER.as_bytes()).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn missing_column_is_a_load_error() {
        let csv = "issue_date,issue_weekday,loan_amount,interest_rate,grade,purpose,term\n";
        let err = read_loan_store(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::MissingColumn("loan_condition")));
    }

    #[test]
    fn missing_required_value_names_line_and_column() {
        let csv = format!(
            "{HEADER}2015-12-01,Tuesday,1000,13.5,Good Loan,B,car,36 months\n\
             2015-12-01,Tuesday,,13.5,Good Loan,B,car,36 months\n"
        );
        let err = read_loan_store(csv.as_bytes()).unwrap_err();
        match err {
            LoadError::InvalidRow { line, column, .. } => {
                assert_eq!(line, 3);
                assert_eq!(column, "loan_amount");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn blank_rate_grade_or_term_fail_but_blank_purpose_loads() {
        for (row, column) in [
            ("2015-12-01,Tuesday,1000,,Good Loan,B,car,36 months", "interest_rate"),
            ("2015-12-01,Tuesday,1000,13.5,Good Loan,,car,36 months", "grade"),
            ("2015-12-01,Tuesday,1000,13.5,Good Loan,B,car,", "term"),
        ] {
            let csv = format!("{HEADER}{row}\n");
            match read_loan_store(csv.as_bytes()) {
                Err(LoadError::InvalidRow { line, column: c, .. }) => {
                    assert_eq!(line, 2);
                    assert_eq!(c, column);
                }
                other => panic!("expected invalid {column}, got {other:?}"),
            }
        }

        let csv = format!("{HEADER}2015-12-01,Tuesday,1000,13.5,Good Loan,B,,36 months\n");
        let store = read_loan_store(csv.as_bytes()).unwrap();
        assert_eq!(store.records()[0].purpose, "");
    }

    #[test]
    fn negative_amount_and_bad_date_are_rejected() {
        let csv = format!("{HEADER}2015-12-01,Tuesday,-5,13.5,Good Loan,B,car,36 months\n");
        assert!(matches!(
            read_loan_store(csv.as_bytes()),
            Err(LoadError::InvalidRow { column: "loan_amount", .. })
        ));

        let csv = format!("{HEADER}Dec 2015,Tuesday,5,13.5,Good Loan,B,car,36 months\n");
        assert!(matches!(
            read_loan_store(csv.as_bytes()),
            Err(LoadError::InvalidRow { column: "issue_date", .. })
        ));
    }

    #[test]
    fn ragged_row_is_malformed() {
        let csv = format!("{HEADER}2015-12-01,Tuesday,1000\n");
        assert!(matches!(read_loan_store(csv.as_bytes()), Err(LoadError::Csv(_))));
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.csv");
        assert!(matches!(load_loan_store(&path), Err(LoadError::NotFound(_))));
    }

    #[test]
    fn loads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{HEADER}2015-12-01,Tuesday,1000,13.5,Good Loan,B,small_business,36 months\n").unwrap();
        let store = load_loan_store(file.path()).unwrap();
        assert_eq!(store.records()[0].purpose, "Small Business");
    }
}
