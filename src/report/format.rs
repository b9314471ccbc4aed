//! Formatted terminal output for the dashboard pages.
//!
//! We keep formatting code in one place so:
//! - the aggregation code stays clean and returns unrounded values
//! - output changes are localized (important for snapshot tests)

use crate::app::pipeline::{FinancialPage, OverviewPage};
use crate::error::AggregationError;
use crate::report::{box_summary, histogram};

/// Shown in place of a metric computed over zero records.
pub const NO_DATA: &str = "no data";

/// `1234567.891` with 0 decimals → `1,234,568`.
pub fn fmt_thousands(v: f64, decimals: usize) -> String {
    let s = format!("{:.*}", decimals, v.abs());
    let (int_part, frac_part) = match s.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (s.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3 + 1);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let mut out = String::new();
    // Avoid "-0" after rounding.
    if v < 0.0 && s.chars().any(|c| c.is_ascii_digit() && c != '0') {
        out.push('-');
    }
    out.push_str(&grouped);
    if let Some(f) = frac_part {
        out.push('.');
        out.push_str(f);
    }
    out
}

pub fn fmt_count(n: usize) -> String {
    fmt_thousands(n as f64, 0)
}

/// `$ 1,234`
pub fn fmt_money(v: f64) -> String {
    format!("$ {}", fmt_thousands(v, 0))
}

/// `13.57%`
pub fn fmt_rate(v: f64) -> String {
    format!("{v:.2}%")
}

/// Share in `0..=1` → `61.5%`
pub fn fmt_share(v: f64) -> String {
    format!("{:.1}%", v * 100.0)
}

/// Format a metric that may have no data.
pub fn fmt_metric<T: Copy>(value: &Result<T, AggregationError>, f: impl Fn(T) -> String) -> String {
    match value {
        Ok(v) => f(*v),
        Err(_) => NO_DATA.to_string(),
    }
}

/// Format the overview page (headline metrics + every view).
pub fn format_overview(page: &OverviewPage) -> String {
    let mut out = String::new();

    out.push_str("=== Financial Insights Dashboard: Loan Performance & Trends ===\n\n");

    let m = &page.metrics;
    out.push_str(&format!("{:<24} {}\n", "Total Loans", fmt_count(m.total_loans)));
    out.push_str(&format!("{:<24} {}\n", "Total Loan Amount", fmt_money(m.total_amount)));
    out.push_str(&format!(
        "{:<24} {}\n",
        "Average Interest Rate",
        fmt_metric(&m.mean_interest_rate, fmt_rate)
    ));
    out.push_str(&format!(
        "{:<24} {}\n",
        "Average Loan Amount",
        fmt_metric(&m.mean_loan_amount, fmt_money)
    ));

    out.push_str("\nNumber of Loans Over Time:\n");
    out.push_str(&format_table(
        &["issue_date", "loans"],
        page.loans_over_time
            .iter()
            .map(|(d, n)| vec![d.to_string(), fmt_count(*n)]),
    ));

    out.push_str("\nTotal Loan Amount Issued Over Time:\n");
    out.push_str(&format_table(
        &["issue_date", "amount"],
        page.amount_over_time
            .iter()
            .map(|(d, v)| vec![d.to_string(), fmt_money(*v)]),
    ));

    out.push_str("\nLoans by Day of The Week:\n");
    out.push_str(&format_table(
        &["issue_weekday", "loans"],
        page.loans_by_weekday
            .iter()
            .map(|(d, n)| vec![d.to_string(), fmt_count(*n)]),
    ));

    out.push_str("\nLoan Performance\n");
    out.push_str("\nLoans by Condition:\n");
    match &page.condition_shares {
        Ok(shares) => out.push_str(&format_table(
            &["loan_condition", "loans", "share"],
            page.loans_by_condition.iter().map(|(c, n)| {
                let share = shares.get(c).copied().map(fmt_share).unwrap_or_default();
                vec![c.clone(), fmt_count(*n), share]
            }),
        )),
        Err(_) => out.push_str(&format!("({NO_DATA})\n")),
    }

    out.push_str("\nLoans by Grade:\n");
    out.push_str(&format_table(
        &["grade", "loans", "avg_amount"],
        page.loans_by_grade.iter().map(|(g, n)| {
            let avg = match &page.mean_amount_by_grade {
                Ok(means) => means.get(g).copied().map(fmt_money).unwrap_or_else(|| NO_DATA.to_string()),
                Err(_) => NO_DATA.to_string(),
            };
            vec![g.clone(), fmt_count(*n), avg]
        }),
    ));

    out
}

/// Format the Financial Analysis page: amount histogram by term and amount
/// box summaries by purpose and term.
pub fn format_financial(page: &FinancialPage, bins: usize) -> String {
    let mut out = String::new();

    out.push_str("=== Financial Analysis ===\n");
    out.push_str(&format!(
        "Loan condition: {} ({} loans) | available: {}\n",
        page.condition,
        fmt_count(page.selected_loans),
        page.conditions.join(", ")
    ));

    out.push_str("\nLoan Amount Distribution by Term:\n");
    let hist = histogram(&page.amount_by_term, bins);
    if hist.bins() == 0 {
        out.push_str(&format!("({NO_DATA})\n"));
    } else {
        let mut headers = vec!["from".to_string(), "to".to_string()];
        headers.extend(hist.groups.iter().map(|(term, _)| term.clone()));
        let header_refs: Vec<&str> = headers.iter().map(String::as_str).collect();

        out.push_str(&format_table(
            &header_refs,
            (0..hist.bins()).map(|i| {
                let mut row = vec![fmt_money(hist.edges[i]), fmt_money(hist.edges[i + 1])];
                row.extend(hist.groups.iter().map(|(_, counts)| fmt_count(counts[i])));
                row
            }),
        ));
    }

    out.push_str("\nLoan Amount Distribution by Purpose:\n");
    if page.amount_by_purpose_and_term.is_empty() {
        out.push_str(&format!("({NO_DATA})\n"));
    } else {
        out.push_str(&format_table(
            &["purpose", "term", "n", "min", "q1", "median", "q3", "max"],
            page.amount_by_purpose_and_term
                .iter()
                .filter_map(|((purpose, term), values)| {
                    let s = box_summary(values)?;
                    Some(vec![
                        purpose.clone(),
                        term.clone(),
                        fmt_count(s.n),
                        fmt_money(s.min),
                        fmt_money(s.q1),
                        fmt_money(s.median),
                        fmt_money(s.q3),
                        fmt_money(s.max),
                    ])
                }),
        ));
    }

    out
}

/// Render rows as a left-aligned first column and right-aligned numbers.
fn format_table(headers: &[&str], rows: impl Iterator<Item = Vec<String>>) -> String {
    let rows: Vec<Vec<String>> = rows.collect();
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let line = |cells: &[String]| -> String {
        cells
            .iter()
            .zip(&widths)
            .enumerate()
            .map(|(i, (cell, &w))| {
                if i == 0 {
                    format!("{cell:<w$}")
                } else {
                    format!("{cell:>w$}")
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
            .trim_end()
            .to_string()
    };

    let header_cells: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    out.push_str(&line(&header_cells));
    out.push('\n');
    let dashes: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    out.push_str(&line(&dashes));
    out.push('\n');
    for row in &rows {
        out.push_str(&line(row));
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BAD_LOAN, GOOD_LOAN, IssueWeekday, LoanRecord, LoanStore};
    use chrono::NaiveDate;

    fn loan(amount: f64, condition: &str, term: &str) -> LoanRecord {
        let issue_date = NaiveDate::from_ymd_opt(2015, 12, 1).unwrap();
        LoanRecord {
            issue_date,
            issue_weekday: IssueWeekday::of_date(issue_date),
            loan_amount: amount,
            interest_rate: 13.456,
            loan_condition: condition.to_string(),
            grade: "B".to_string(),
            purpose: "Debt Consolidation".to_string(),
            term: term.to_string(),
        }
    }

    #[test]
    fn thousands_separators() {
        assert_eq!(fmt_thousands(0.0, 0), "0");
        assert_eq!(fmt_thousands(999.0, 0), "999");
        assert_eq!(fmt_thousands(1234.0, 0), "1,234");
        assert_eq!(fmt_thousands(1234567.891, 0), "1,234,568");
        assert_eq!(fmt_thousands(1234567.891, 2), "1,234,567.89");
        assert_eq!(fmt_thousands(-1234.0, 0), "-1,234");
        assert_eq!(fmt_thousands(-0.2, 0), "0");
    }

    #[test]
    fn metric_formats() {
        assert_eq!(fmt_money(15_000.4), "$ 15,000");
        assert_eq!(fmt_rate(13.456), "13.46%");
        assert_eq!(fmt_share(0.615), "61.5%");
        assert_eq!(fmt_metric(&Err(AggregationError::empty("x")), fmt_rate), NO_DATA);
    }

    #[test]
    fn table_aligns_columns() {
        let txt = format_table(
            &["grade", "loans"],
            vec![vec!["A".to_string(), "1,234".to_string()], vec!["B".to_string(), "5".to_string()]].into_iter(),
        );
        let expected = concat!(
            "grade loans\n",
            "----- -----\n",
            "A     1,234\n",
            "B         5\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn overview_text_contains_metrics_and_shares() {
        let store = LoanStore::new(vec![
            loan(1000.0, GOOD_LOAN, "36 months"),
            loan(3000.0, BAD_LOAN, "60 months"),
        ]);
        let txt = format_overview(&OverviewPage::from_store(&store));
        assert!(txt.contains("Total Loans              2"));
        assert!(txt.contains("$ 4,000"));
        assert!(txt.contains("13.46%"));
        assert!(txt.contains("50.0%"));
        assert!(txt.contains("Tuesday"));
        assert!(txt.contains("grade loans avg_amount\n"));
        assert!(txt.contains("B         2    $ 2,000\n"));
    }

    #[test]
    fn overview_text_of_empty_store_shows_no_data() {
        let txt = format_overview(&OverviewPage::from_store(&LoanStore::default()));
        assert!(txt.contains(&format!("Average Interest Rate    {NO_DATA}")));
        assert!(txt.contains("Monday"));
    }

    #[test]
    fn financial_text_lists_terms_and_purposes() {
        let store = LoanStore::new(vec![
            loan(1000.0, GOOD_LOAN, "36 months"),
            loan(2000.0, GOOD_LOAN, "60 months"),
            loan(9000.0, BAD_LOAN, "60 months"),
        ]);
        let page = FinancialPage::from_store(&store, GOOD_LOAN);
        let txt = format_financial(&page, 4);
        assert!(txt.contains("Loan condition: Good Loan (2 loans)"));
        assert!(txt.contains("36 months"));
        assert!(txt.contains("Debt Consolidation"));
        assert!(!txt.contains("$ 9,000"));
    }

    #[test]
    fn financial_text_without_matches_shows_no_data() {
        let page = FinancialPage::from_store(&LoanStore::default(), GOOD_LOAN);
        let txt = format_financial(&page, 30);
        assert_eq!(txt.matches(NO_DATA).count(), 2);
    }
}
