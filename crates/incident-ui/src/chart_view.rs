//! Chart views: victim-group breakdown, yearly histogram, and the
//! total-versus-matched scatter with its fitted line.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::Style,
    symbols,
    text::{Line, Span},
    widgets::{Axis, Bar, BarChart, BarGroup, Block, Borders, Chart, Dataset, GraphType, Paragraph},
    Frame,
};

use incident_core::formatting::{format_count, format_number};
use incident_core::models::SummaryTable;
use incident_core::regression::LinearFit;
use incident_data::aggregator::{CategoryBreakdown, YearHistogram};

use crate::themes::Theme;

// ── Breakdown ─────────────────────────────────────────────────────────────────

/// Grouped bar chart: one group per category, one bar per victim group.
pub fn render_breakdown_chart(
    frame: &mut Frame,
    area: Rect,
    breakdown: &[CategoryBreakdown],
    theme: &Theme,
) {
    let [chart_area, legend_area] =
        Layout::vertical([Constraint::Min(5), Constraint::Length(3)]).areas(area);

    let groups: Vec<BarGroup> = breakdown
        .iter()
        .map(|row| {
            let bars: Vec<Bar> = row
                .groups
                .iter()
                .enumerate()
                .map(|(i, (_, count))| {
                    Bar::default()
                        .value(*count)
                        .text_value(String::new())
                        .style(Style::default().fg(theme.series_color(i)))
                })
                .collect();
            BarGroup::default()
                .label(Line::from(row.category.to_string()))
                .bars(&bars)
        })
        .collect();

    let bars_per_group = breakdown.first().map(|b| b.groups.len()).unwrap_or(0);
    let bar_width = fit_bar_width(chart_area.width, breakdown.len(), bars_per_group, 2);

    let mut chart = BarChart::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Incidents by Category and Victim Group "),
        )
        .bar_width(bar_width)
        .bar_gap(0)
        .group_gap(2)
        .label_style(theme.label);
    for group in groups {
        chart = chart.data(group);
    }
    frame.render_widget(chart, chart_area);

    frame.render_widget(
        Paragraph::new(legend_line(breakdown, theme))
            .block(Block::default().borders(Borders::ALL).title(" Victim group ")),
        legend_area,
    );
}

/// Coloured legend entries, one per victim group.
pub fn legend_line<'a>(breakdown: &[CategoryBreakdown], theme: &Theme) -> Line<'a> {
    let mut spans = Vec::new();
    if let Some(first) = breakdown.first() {
        for (i, (group, _)) in first.groups.iter().enumerate() {
            spans.push(Span::styled(
                "■ ",
                Style::default().fg(theme.series_color(i)),
            ));
            spans.push(Span::styled(format!("{}  ", group), theme.label));
        }
    }
    Line::from(spans)
}

/// Widest bar that still fits every group in `width` columns, at least 1.
fn fit_bar_width(width: u16, groups: usize, bars_per_group: usize, group_gap: u16) -> u16 {
    let bars = u16::try_from(groups.saturating_mul(bars_per_group)).unwrap_or(u16::MAX);
    if bars == 0 {
        return 1;
    }
    let inner = width.saturating_sub(2);
    let gaps = group_gap.saturating_mul(u16::try_from(groups.saturating_sub(1)).unwrap_or(u16::MAX));
    (inner.saturating_sub(gaps) / bars).clamp(1, 9)
}

// ── Histogram ─────────────────────────────────────────────────────────────────

/// One bar per calendar year.
pub fn render_histogram(frame: &mut Frame, area: Rect, histogram: &YearHistogram, theme: &Theme) {
    let bars: Vec<Bar> = histogram
        .bins
        .iter()
        .map(|(year, count)| {
            Bar::default()
                .value(*count)
                .label(Line::from(year_label(*year, histogram.bins.len())))
                .text_value(format_count(*count))
                .style(theme.histogram_bar)
        })
        .collect();

    let title = if histogram.undated > 0 {
        format!(" Incidents per Year ({} undated) ", format_count(histogram.undated))
    } else {
        " Incidents per Year ".to_string()
    };

    let bar_width = fit_bar_width(area.width, 1, bars.len().max(1), 0)
        .saturating_sub(1)
        .max(1);

    let chart = BarChart::default()
        .block(Block::default().borders(Borders::ALL).title(title))
        .data(BarGroup::default().bars(&bars))
        .bar_width(bar_width)
        .bar_gap(1)
        .max(histogram.max_count().max(1))
        .label_style(theme.label)
        .value_style(theme.value);
    frame.render_widget(chart, area);
}

/// Four-digit years, or two digits once the range gets crowded.
fn year_label(year: i32, bins: usize) -> String {
    if bins > 12 {
        format!("{:02}", year.rem_euclid(100))
    } else {
        year.to_string()
    }
}

// ── Scatter ───────────────────────────────────────────────────────────────────

/// Per-category `(total, matched)` points with the fitted regression line.
pub fn render_scatter(
    frame: &mut Frame,
    area: Rect,
    summary: &SummaryTable,
    fit: Option<&LinearFit>,
    predicate_target: &str,
    theme: &Theme,
) {
    let points = summary.points();
    let (x_max, y_max) = axis_bounds(&points, fit);
    let line = fit.map(|f| fit_segment(f, x_max)).unwrap_or_default();

    let mut datasets = vec![Dataset::default()
        .name("categories")
        .marker(symbols::Marker::Dot)
        .graph_type(GraphType::Scatter)
        .style(theme.chart_points)
        .data(&points)];
    if let Some(f) = fit {
        datasets.push(
            Dataset::default()
                .name(f.equation())
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(theme.chart_fit_line)
                .data(&line),
        );
    }

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} victims vs. all incidents ", predicate_target)),
        )
        .x_axis(
            Axis::default()
                .title("incidents")
                .style(theme.chart_axis)
                .bounds([0.0, x_max])
                .labels(axis_labels(x_max)),
        )
        .y_axis(
            Axis::default()
                .title("matched")
                .style(theme.chart_axis)
                .bounds([0.0, y_max])
                .labels(axis_labels(y_max)),
        );
    frame.render_widget(chart, area);
}

/// Upper bounds for both axes with 5% headroom, never zero.
fn axis_bounds(points: &[(f64, f64)], fit: Option<&LinearFit>) -> (f64, f64) {
    let x_max = points.iter().map(|p| p.0).fold(0.0_f64, f64::max);
    let mut y_max = points.iter().map(|p| p.1).fold(0.0_f64, f64::max);
    if let Some(f) = fit {
        y_max = y_max.max(f.predict(x_max));
    }
    let pad = |v: f64| if v > 0.0 { v * 1.05 } else { 1.0 };
    (pad(x_max), pad(y_max))
}

/// Fitted line from `x = 0` to `x_max`, clipped at `y = 0`.
fn fit_segment(fit: &LinearFit, x_max: f64) -> Vec<(f64, f64)> {
    const STEPS: usize = 40;
    (0..=STEPS)
        .map(|i| x_max * i as f64 / STEPS as f64)
        .map(|x| (x, fit.predict(x)))
        .filter(|(_, y)| *y >= 0.0)
        .collect()
}

fn axis_labels(max: f64) -> Vec<String> {
    [0.0, max / 2.0, max]
        .iter()
        .map(|v| format_number(*v, 0))
        .collect()
}

// ── Tests ──────────────────────────────────────────────────────────────────────
