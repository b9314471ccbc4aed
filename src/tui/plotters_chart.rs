//! Plotters-powered time-series chart widget for Ratatui.
//!
//! We render Plotters output into the Ratatui buffer using `plotters-ratatui-backend`.

use chrono::NaiveDate;
use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

use crate::domain::DerivedView;

/// A lightweight, render-only chart description.
///
/// All series and bounds are computed outside the render call so `render()`
/// only draws.
pub struct SeriesChart<'a> {
    /// `(x, y)` points, x = days since CE (see `date_x`).
    pub points: &'a [(f64, f64)],
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
    pub x_label: &'a str,
    pub y_label: &'a str,
    pub fmt_x: fn(f64) -> String,
    pub fmt_y: fn(f64) -> String,
}

impl<'a> SeriesChart<'a> {
    /// Axis bounds for `points`, padded so markers don't sit on the frame.
    pub fn bounds(points: &[(f64, f64)]) -> ([f64; 2], [f64; 2]) {
        let (mut x0, mut x1) = (f64::INFINITY, f64::NEG_INFINITY);
        let (mut y0, mut y1) = (f64::INFINITY, f64::NEG_INFINITY);
        for &(x, y) in points {
            x0 = x0.min(x);
            x1 = x1.max(x);
            y0 = y0.min(y);
            y1 = y1.max(y);
        }

        if !(x0.is_finite() && x1.is_finite()) || x1 <= x0 {
            let mid = if x0.is_finite() { x0 } else { 0.0 };
            x0 = mid - 15.0;
            x1 = mid + 15.0;
        }
        if !(y0.is_finite() && y1.is_finite()) || y1 <= y0 {
            let mid = if y0.is_finite() { y0 } else { 0.0 };
            y0 = mid - 1.0;
            y1 = mid + 1.0;
        }

        let pad = ((y1 - y0).abs() * 0.05).max(1e-12);
        // Counts and amounts are never negative; keep the axis at zero.
        let y_min = if y0 >= 0.0 { (y0 - pad).max(0.0) } else { y0 - pad };
        ([x0, x1], [y_min, y1 + pad])
    }
}

/// X coordinate for a date.
pub fn date_x(date: NaiveDate) -> f64 {
    chrono::Datelike::num_days_from_ce(&date) as f64
}

/// Points of a date-keyed view, x from `date_x`.
pub fn date_series<M>(view: &DerivedView<NaiveDate, M>, value: impl Fn(&M) -> f64) -> Vec<(f64, f64)> {
    view.iter().map(|(d, m)| (date_x(*d), value(m))).collect()
}

pub fn fmt_date_axis(v: f64) -> String {
    NaiveDate::from_num_days_from_ce_opt(v.round() as i32)
        .map(|d| d.format("%Y-%m").to_string())
        .unwrap_or_default()
}

impl<'a> Widget for SeriesChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // When the available area is too small, Plotters may fail to build a chart.
        // In that case, we render a small hint rather than panicking.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let [x0, x1] = self.x_bounds;
        let [y0, y1] = self.y_bounds;
        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite()) || x1 <= x0 || y1 <= y0 {
            return;
        }

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                // Terminal cells are low-res, so keep label areas compact.
                .set_label_area_size(LabelAreaPosition::Left, 10)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_desc(self.x_label)
                .y_desc(self.y_label)
                .x_labels(6)
                .y_labels(5)
                .x_label_formatter(&|v| (self.fmt_x)(*v))
                .y_label_formatter(&|v| (self.fmt_y)(*v))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(WHITE)
                .bold_line_style(WHITE)
                .draw()?;

            let line_color = RGBColor(0, 255, 255); // cyan
            let marker_color = RGBColor(255, 255, 0); // yellow

            chart.draw_series(LineSeries::new(self.points.iter().copied(), &line_color))?;

            // `Circle` radii are mis-scaled by the ratatui backend; a coloured
            // pixel reads as a clean marker.
            chart.draw_series(self.points.iter().map(|&(x, y)| Pixel::new((x, y), marker_color)))?;

            Ok(())
        });

        widget.render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn date_axis_round_trips() {
        let d = NaiveDate::from_ymd_opt(2015, 6, 1).unwrap();
        assert_eq!(fmt_date_axis(date_x(d)), "2015-06");
    }

    #[test]
    fn bounds_pad_and_floor_at_zero() {
        let (x, y) = SeriesChart::bounds(&[(0.0, 0.0), (10.0, 100.0)]);
        assert_eq!(x, [0.0, 10.0]);
        assert_eq!(y[0], 0.0);
        assert!((y[1] - 105.0).abs() < 1e-9);
    }

    #[test]
    fn single_point_gets_nonzero_span() {
        let (x, y) = SeriesChart::bounds(&[(100.0, 5.0)]);
        assert!(x[1] > x[0]);
        assert!(y[1] > y[0]);
    }

    #[test]
    fn date_series_uses_calendar_x() {
        let d = NaiveDate::from_ymd_opt(2015, 1, 1).unwrap();
        let view: DerivedView<NaiveDate, usize> = BTreeMap::from([(d, 3usize)]).into();
        assert_eq!(date_series(&view, |n| *n as f64), vec![(date_x(d), 3.0)]);
    }
}
