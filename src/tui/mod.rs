//! Ratatui-based terminal UI.
//!
//! Two pages: the overview (headline metrics, trends, loan performance) and
//! the financial analysis of one loan condition. Every page switch, condition
//! change, or reload re-reads the dataset and rebuilds the page from scratch.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Clear, Paragraph, Row, Table, Tabs},
};
use tracing::{info, warn};

use crate::app::pipeline::{self, FinancialPage, OverviewPage};
use crate::domain::{DashboardConfig, DerivedView};
use crate::error::{AppError, LoadError};
use crate::report::{NO_DATA, box_summary, fmt_count, fmt_metric, fmt_money, fmt_rate, fmt_share, histogram};

mod plotters_chart;

use plotters_chart::{SeriesChart, date_series, fmt_date_axis};

/// Start the TUI.
pub fn run(config: DashboardConfig) -> Result<(), AppError> {
    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(config);
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(4, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(4, format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Page {
    Overview,
    Financial,
}

impl Page {
    const TITLES: [&'static str; 2] = ["Overview", "Financial Analysis"];

    fn index(self) -> usize {
        match self {
            Page::Overview => 0,
            Page::Financial => 1,
        }
    }

    fn next(self) -> Self {
        match self {
            Page::Overview => Page::Financial,
            Page::Financial => Page::Overview,
        }
    }

    fn sub_tabs(self) -> &'static [&'static str] {
        match self {
            Page::Overview => &["Loans Over Time", "Amount Over Time", "By Weekday"],
            Page::Financial => &["Amount Histogram", "Amount by Purpose"],
        }
    }
}

/// A successfully rendered page.
enum Rendered {
    Overview(OverviewPage),
    Financial(FinancialPage),
}

fn render_page(page: Page, config: &DashboardConfig) -> Result<Rendered, LoadError> {
    match page {
        Page::Overview => pipeline::render_overview(&config.data_path).map(Rendered::Overview),
        Page::Financial => pipeline::render_financial(&config.data_path, &config.condition).map(Rendered::Financial),
    }
}

struct App {
    config: DashboardConfig,
    page: Page,
    sub_tab: [usize; 2],
    /// Conditions seen in the last successful financial render.
    conditions: Vec<String>,
    rendered: Result<Rendered, LoadError>,
    status: String,
}

impl App {
    fn new(config: DashboardConfig) -> Self {
        let mut app = Self {
            rendered: render_page(Page::Overview, &config),
            config,
            page: Page::Overview,
            sub_tab: [0, 0],
            conditions: Vec::new(),
            status: String::new(),
        };
        app.record_render();
        app
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(4, format!("Event poll error: {e}")))? {
                continue;
            }

            match event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns `true` when the user asked to quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Tab | KeyCode::BackTab => {
                self.page = self.page.next();
                self.render();
            }
            KeyCode::Char('t') => {
                let i = self.page.index();
                self.sub_tab[i] = (self.sub_tab[i] + 1) % self.page.sub_tabs().len();
            }
            KeyCode::Left | KeyCode::Right if self.page == Page::Financial => {
                let forward = code == KeyCode::Right;
                let next = crate::select::cycle_condition(&self.conditions, &self.config.condition, forward)
                    .map(str::to_string);
                match next {
                    Some(next) => {
                        self.config.condition = next;
                        self.render();
                    }
                    None => self.status = "No loan conditions to choose from.".to_string(),
                }
            }
            KeyCode::Char('r') => self.render(),
            _ => {}
        }
        false
    }

    /// Re-read the dataset and rebuild the current page.
    fn render(&mut self) {
        self.rendered = render_page(self.page, &self.config);
        self.record_render();
    }

    fn record_render(&mut self) {
        let path = self.config.data_path.display();
        match &self.rendered {
            Ok(rendered) => {
                if let Rendered::Financial(page) = rendered {
                    self.conditions = page.conditions.clone();
                }
                self.status = format!("Loaded {path}");
                info!(page = ?self.page, path = %path, "rendered page");
            }
            Err(err) => {
                warn!(page = ?self.page, error = %err, "render failed");
                self.status = format!("Load failed: {err}");
            }
        }
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        match &self.rendered {
            Ok(Rendered::Overview(page)) => draw_overview(frame, chunks[1], page, self.sub_tab[0]),
            Ok(Rendered::Financial(page)) => {
                draw_financial(frame, chunks[1], page, self.sub_tab[1], self.config.histogram_bins)
            }
            Err(err) => draw_failure(frame, chunks[1], err),
        }
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let tabs = Tabs::new(Page::TITLES)
            .select(self.page.index())
            .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!(" Financial Insights Dashboard · {} ", self.config.data_path.display())),
            );
        frame.render_widget(tabs, area);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = match self.page {
            Page::Overview => "Tab page  t view  r reload  q quit",
            Page::Financial => "Tab page  ←/→ condition  t view  r reload  q quit",
        };
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

fn draw_failure(frame: &mut ratatui::Frame<'_>, area: Rect, err: &LoadError) {
    let text = Text::from(vec![
        Line::from(Span::styled(
            "The dataset could not be loaded.",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(err.to_string()),
        Line::from(""),
        Line::from(Span::styled(
            "Fix the file and press r to reload.",
            Style::default().fg(Color::Gray),
        )),
    ]);
    let p = Paragraph::new(text).block(Block::default().borders(Borders::ALL).title("Error"));
    frame.render_widget(p, area);
}

fn draw_overview(frame: &mut ratatui::Frame<'_>, area: Rect, page: &OverviewPage, tab: usize) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(10), Constraint::Length(12)])
        .split(area);

    draw_metrics(frame, chunks[0], page);

    let trend = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(chunks[1]);
    frame.render_widget(sub_tabs(Page::Overview, tab), trend[0]);
    match tab {
        0 => {
            let points = date_series(&page.loans_over_time, |n| *n as f64);
            draw_date_chart(frame, trend[1], "Number of Loans Over Time", "loans", &points);
        }
        1 => {
            let points = date_series(&page.amount_over_time, |v| *v);
            draw_date_chart(frame, trend[1], "Total Loans Amount Issued Over Time", "amount", &points);
        }
        _ => {
            let bars: Vec<Bar> = page
                .loans_by_weekday
                .iter()
                .map(|(day, n)| count_bar(day.short_name(), *n))
                .collect();
            draw_bars(frame, trend[1], "Distribution of Loans by Day of The Week", bars);
        }
    }

    let perf = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(chunks[2]);
    draw_condition_shares(frame, perf[0], page);

    let grade = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(perf[1]);
    let bars: Vec<Bar> = page
        .loans_by_grade
        .iter()
        .map(|(grade, n)| count_bar(grade, *n))
        .collect();
    draw_bars(frame, grade[0], "Distribution of Loans by Grade", bars);
    let avg = Paragraph::new(grade_average_line(page)).style(Style::default().fg(Color::Gray));
    frame.render_widget(avg, grade[1]);
}

/// One-line "average amount per grade" legend under the grade bars.
fn grade_average_line(page: &OverviewPage) -> String {
    match &page.mean_amount_by_grade {
        Ok(means) if !means.is_empty() => {
            let cells: Vec<String> = means.iter().map(|(g, v)| format!("{g} {}", fmt_money(*v))).collect();
            format!("Avg amount  {}", cells.join("  "))
        }
        _ => format!("Avg amount  {NO_DATA}"),
    }
}

fn draw_metrics(frame: &mut ratatui::Frame<'_>, area: Rect, page: &OverviewPage) {
    let block = Block::default().title("Summary").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let m = &page.metrics;
    let cells = [
        ("Total Loans", fmt_count(m.total_loans)),
        ("Total Amount", fmt_money(m.total_amount)),
        ("Avg Interest Rate", fmt_metric(&m.mean_interest_rate, fmt_rate)),
        ("Avg Loan Amount", fmt_metric(&m.mean_loan_amount, fmt_money)),
    ];
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(inner);
    for ((label, value), col) in cells.into_iter().zip(cols.iter()) {
        let value_style = if value == NO_DATA {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        };
        let text = Text::from(vec![
            Line::from(Span::styled(label, Style::default().fg(Color::Gray))),
            Line::from(Span::styled(value, value_style)),
        ]);
        frame.render_widget(Paragraph::new(text), *col);
    }
}

fn draw_condition_shares(frame: &mut ratatui::Frame<'_>, area: Rect, page: &OverviewPage) {
    let mut lines = Vec::new();
    match &page.condition_shares {
        Ok(shares) => {
            for (condition, share) in shares.iter() {
                let n = page.loans_by_condition.get(condition).copied().unwrap_or(0);
                lines.push(Line::from(vec![
                    Span::styled(format!("{condition:<12}"), Style::default().fg(Color::White)),
                    Span::styled(format!("{:>8}", fmt_share(*share)), Style::default().fg(Color::Cyan)),
                    Span::styled(format!("  ({})", fmt_count(n)), Style::default().fg(Color::Gray)),
                ]));
            }
        }
        Err(_) => lines.push(Line::from(Span::styled(NO_DATA, Style::default().fg(Color::DarkGray)))),
    }
    let p = Paragraph::new(Text::from(lines)).block(Block::default().title("Loan Condition").borders(Borders::ALL));
    frame.render_widget(p, area);
}

fn draw_financial(frame: &mut ratatui::Frame<'_>, area: Rect, page: &FinancialPage, tab: usize, bins: usize) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Length(1), Constraint::Min(0)])
        .split(area);

    let mut selector = vec![Span::styled("Condition: ", Style::default().fg(Color::Gray))];
    for (i, c) in page.conditions.iter().enumerate() {
        if i > 0 {
            selector.push(Span::raw("  "));
        }
        let style = if *c == page.condition {
            Style::default().fg(Color::Black).bg(Color::Cyan)
        } else {
            Style::default().fg(Color::White)
        };
        selector.push(Span::styled(format!(" {c} "), style));
    }
    if !page.conditions.contains(&page.condition) {
        selector.push(Span::styled(
            format!("  ('{}' not in data)", page.condition),
            Style::default().fg(Color::Yellow),
        ));
    }
    selector.push(Span::styled(
        format!("   {} loans", fmt_count(page.selected_loans)),
        Style::default().fg(Color::Gray),
    ));
    let p = Paragraph::new(Line::from(selector)).block(Block::default().borders(Borders::ALL));
    frame.render_widget(p, chunks[0]);

    frame.render_widget(sub_tabs(Page::Financial, tab), chunks[1]);
    if tab == 0 {
        draw_histogram(frame, chunks[2], &page.amount_by_term, bins);
    } else {
        draw_box_table(frame, chunks[2], &page.amount_by_purpose_and_term);
    }
}

/// One bar chart per term, all sharing the same bin edges.
fn draw_histogram(frame: &mut ratatui::Frame<'_>, area: Rect, groups: &DerivedView<String, Vec<f64>>, bins: usize) {
    let hist = histogram(groups, bins);
    if hist.bins() == 0 {
        let p = Paragraph::new(NO_DATA)
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().title("Distribution of Loan Amount").borders(Borders::ALL));
        frame.render_widget(p, area);
        return;
    }

    let lo = hist.edges.first().copied().unwrap_or(0.0);
    let hi = hist.edges.last().copied().unwrap_or(0.0);
    let n = hist.groups.len() as u32;
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Ratio(1, n); hist.groups.len()])
        .split(area);

    let colors = [Color::Cyan, Color::Magenta, Color::Green, Color::Yellow];
    for (i, ((term, counts), rect)) in hist.groups.iter().zip(rows.iter()).enumerate() {
        let inner_width = rect.width.saturating_sub(2) as usize;
        let bar_gap = u16::from(inner_width >= counts.len() * 2);
        let bar_width = (inner_width / counts.len().max(1)).saturating_sub(bar_gap as usize).max(1) as u16;

        let bars: Vec<Bar> = counts
            .iter()
            .map(|c| Bar::default().value(*c as u64).text_value(String::new()))
            .collect();
        let chart = BarChart::default()
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!("{term} · {} .. {}", fmt_money(lo), fmt_money(hi))),
            )
            .bar_width(bar_width)
            .bar_gap(bar_gap)
            .bar_style(Style::default().fg(colors[i % colors.len()]))
            .data(BarGroup::default().bars(&bars));
        frame.render_widget(chart, *rect);
    }
}

fn draw_box_table(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    groups: &DerivedView<(String, String), Vec<f64>>,
) {
    let header = Row::new(vec!["Purpose", "Term", "Loans", "Min", "Q1", "Median", "Q3", "Max"])
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));
    let rows: Vec<Row> = groups
        .iter()
        .filter_map(|((purpose, term), values)| {
            let b = box_summary(values)?;
            Some(Row::new(vec![
                purpose.clone(),
                term.clone(),
                fmt_count(b.n),
                fmt_money(b.min),
                fmt_money(b.q1),
                fmt_money(b.median),
                fmt_money(b.q3),
                fmt_money(b.max),
            ]))
        })
        .collect();

    let block = Block::default().title("Loan Amount by Purpose and Term").borders(Borders::ALL);
    if rows.is_empty() {
        let p = Paragraph::new(NO_DATA).style(Style::default().fg(Color::DarkGray)).block(block);
        frame.render_widget(p, area);
        return;
    }

    let widths = [
        Constraint::Min(18),
        Constraint::Length(10),
        Constraint::Length(7),
        Constraint::Length(10),
        Constraint::Length(10),
        Constraint::Length(10),
        Constraint::Length(10),
        Constraint::Length(10),
    ];
    let table = Table::new(rows, widths).header(header).block(block);
    frame.render_widget(table, area);
}

fn sub_tabs(page: Page, selected: usize) -> Tabs<'static> {
    Tabs::new(page.sub_tabs().iter().copied())
        .select(selected)
        .style(Style::default().fg(Color::Gray))
        .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
}

fn count_bar(label: &str, n: usize) -> Bar<'static> {
    Bar::default()
        .value(n as u64)
        .label(Line::from(label.to_string()))
        .text_value(fmt_count(n))
}

fn draw_bars(frame: &mut ratatui::Frame<'_>, area: Rect, title: &str, bars: Vec<Bar<'_>>) {
    let block = Block::default().title(title.to_string()).borders(Borders::ALL);
    if bars.is_empty() {
        let p = Paragraph::new(NO_DATA).style(Style::default().fg(Color::DarkGray)).block(block);
        frame.render_widget(p, area);
        return;
    }

    let inner_width = area.width.saturating_sub(2) as usize;
    let bar_width = (inner_width / bars.len()).saturating_sub(1).clamp(3, 12) as u16;
    let chart = BarChart::default()
        .block(block)
        .bar_width(bar_width)
        .bar_gap(1)
        .bar_style(Style::default().fg(Color::Cyan))
        .value_style(Style::default().fg(Color::Black).bg(Color::Cyan))
        .data(BarGroup::default().bars(&bars));
    frame.render_widget(chart, area);
}

fn draw_date_chart(frame: &mut ratatui::Frame<'_>, area: Rect, title: &str, y_label: &str, points: &[(f64, f64)]) {
    let block = Block::default().title(title.to_string()).borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    frame.render_widget(Clear, inner);

    if points.is_empty() {
        let msg = Paragraph::new(NO_DATA).style(Style::default().fg(Color::DarkGray));
        frame.render_widget(msg, inner);
        return;
    }

    let (x_bounds, y_bounds) = SeriesChart::bounds(points);
    let widget = SeriesChart {
        points,
        x_bounds,
        y_bounds,
        x_label: "issue date",
        y_label,
        fmt_x: fmt_date_axis,
        fmt_y: fmt_axis_y,
    };
    frame.render_widget(widget, inner);
}

fn fmt_axis_y(v: f64) -> String {
    crate::report::fmt_thousands(v, 0)
}
