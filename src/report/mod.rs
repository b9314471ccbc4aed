//! Reporting utilities: chart-side summaries and formatted terminal output.
//!
//! The aggregation layer hands over raw per-group amounts; binning them for
//! a histogram or summarizing them for a box plot is presentation work and
//! lives here, shared by the CLI text output and the TUI.

use serde::Serialize;

use crate::domain::DerivedView;

pub mod format;

pub use format::*;

/// Equal-width histogram over several groups sharing the same bins.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    /// Bin edges, `bins + 1` values (empty when there are no values).
    pub edges: Vec<f64>,
    /// Per-group bin counts, in the source view's group order.
    pub groups: Vec<(String, Vec<usize>)>,
}

impl Histogram {
    pub fn bins(&self) -> usize {
        self.edges.len().saturating_sub(1)
    }

    /// Bin counts summed across groups.
    pub fn stacked(&self) -> Vec<usize> {
        let mut out = vec![0usize; self.bins()];
        for (_, counts) in &self.groups {
            for (acc, c) in out.iter_mut().zip(counts) {
                *acc += c;
            }
        }
        out
    }
}

/// Bin every group's values into `bins` equal-width bins spanning the
/// combined range of all groups. The last bin includes its upper edge.
///
/// No values → no bins. All values equal → a single bin.
pub fn histogram(groups: &DerivedView<String, Vec<f64>>, bins: usize) -> Histogram {
    let (lo, hi) = groups
        .measures()
        .flatten()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));

    if !(lo.is_finite() && hi.is_finite()) {
        return Histogram {
            edges: Vec::new(),
            groups: groups.keys().map(|k| (k.clone(), Vec::new())).collect(),
        };
    }

    let bins = if hi > lo { bins.max(1) } else { 1 };
    let width = (hi - lo) / bins as f64;
    let edges = (0..=bins)
        .map(|i| if i == bins { hi } else { lo + width * i as f64 })
        .collect();

    let groups = groups
        .iter()
        .map(|(label, values)| {
            let mut counts = vec![0usize; bins];
            for &v in values {
                let idx = if width > 0.0 {
                    (((v - lo) / width).floor() as usize).min(bins - 1)
                } else {
                    0
                };
                counts[idx] += 1;
            }
            (label.clone(), counts)
        })
        .collect();

    Histogram { edges, groups }
}

/// Five-number summary for a box plot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoxSummary {
    pub n: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

/// Summarize `values` with linearly interpolated quartiles.
pub fn box_summary(values: &[f64]) -> Option<BoxSummary> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    Some(BoxSummary {
        n: sorted.len(),
        min: sorted[0],
        q1: quantile_sorted(&sorted, 0.25),
        median: quantile_sorted(&sorted, 0.5),
        q3: quantile_sorted(&sorted, 0.75),
        max: sorted[sorted.len() - 1],
    })
}

fn quantile_sorted(sorted: &[f64], p: f64) -> f64 {
    let pos = p * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * frac
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn groups(entries: &[(&str, &[f64])]) -> DerivedView<String, Vec<f64>> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_vec()))
            .collect::<BTreeMap<_, _>>()
            .into()
    }

    #[test]
    fn histogram_shares_bins_across_groups() {
        let view = groups(&[("36 months", &[0.0, 1.0, 2.0, 10.0]), ("60 months", &[5.0, 9.99])]);
        let h = histogram(&view, 10);

        assert_eq!(h.bins(), 10);
        assert_eq!(h.edges[0], 0.0);
        assert_eq!(h.edges[10], 10.0);
        assert_eq!(h.groups[0].1, vec![1, 1, 1, 0, 0, 0, 0, 0, 0, 1]);
        assert_eq!(h.groups[1].1, vec![0, 0, 0, 0, 0, 1, 0, 0, 0, 1]);
        assert_eq!(h.stacked().iter().sum::<usize>(), 6);
    }

    #[test]
    fn histogram_of_constant_values_is_one_bin() {
        let h = histogram(&groups(&[("a", &[7.0, 7.0])]), 30);
        assert_eq!(h.bins(), 1);
        assert_eq!(h.groups[0].1, vec![2]);
    }

    #[test]
    fn histogram_of_nothing_has_no_bins() {
        let h = histogram(&DerivedView::empty(), 30);
        assert_eq!(h.bins(), 0);
        assert!(h.groups.is_empty());
    }

    #[test]
    fn box_summary_interpolates_quartiles() {
        let s = box_summary(&[4.0, 1.0, 3.0, 2.0, 5.0]).unwrap();
        assert_eq!(s.n, 5);
        assert_eq!(s.min, 1.0);
        assert_eq!(s.q1, 2.0);
        assert_eq!(s.median, 3.0);
        assert_eq!(s.q3, 4.0);
        assert_eq!(s.max, 5.0);

        let even = box_summary(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert!((even.median - 2.5).abs() < 1e-12);
        assert!((even.q1 - 1.75).abs() < 1e-12);

        assert!(box_summary(&[]).is_none());
    }
}
