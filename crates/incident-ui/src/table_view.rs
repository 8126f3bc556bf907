//! Summary table view.
//!
//! One row per category with total and matched counts, a highlighted totals
//! row, and a footer with the fitted regression line.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use incident_core::formatting;
use incident_core::models::SummaryTable;
use incident_core::regression::LinearFit;

use crate::themes::Theme;

/// Render the summary table and the regression footer into `area`.
pub fn render_summary_view(
    frame: &mut Frame,
    area: Rect,
    summary: &SummaryTable,
    predicate_target: &str,
    fit: Option<&LinearFit>,
    fit_error: Option<&str>,
    theme: &Theme,
) {
    let [table_area, footer_area] =
        Layout::vertical([Constraint::Min(5), Constraint::Length(4)]).areas(area);

    let matched_title = format!("{} victims", predicate_target);
    let header = Row::new(
        ["Category", "Incidents", matched_title.as_str(), "Share"]
            .into_iter()
            .map(|h| Cell::from(h.to_string()).style(theme.table_header)),
    )
    .height(1);

    let mut rows: Vec<Row> = summary
        .rows()
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let style = if i % 2 == 0 {
                theme.table_row
            } else {
                theme.table_row_alt
            };
            Row::new(vec![
                Cell::from(row.category.to_string()),
                Cell::from(formatting::format_count(row.total_count)),
                Cell::from(formatting::format_count(row.matched_count)),
                Cell::from(formatting::format_share(row.matched_share())),
            ])
            .style(style)
        })
        .collect();

    let (total, matched) = summary.totals();
    let share = if total == 0 {
        0.0
    } else {
        matched as f64 / total as f64
    };
    rows.push(
        Row::new(vec![
            Cell::from("TOTAL"),
            Cell::from(formatting::format_count(total)),
            Cell::from(formatting::format_count(matched)),
            Cell::from(formatting::format_share(share)),
        ])
        .style(theme.table_total),
    );

    let widths = [
        Constraint::Length(18),
        Constraint::Length(12),
        Constraint::Length(22),
        Constraint::Length(8),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Incidents by Category "),
        )
        .style(theme.text);
    frame.render_widget(table, table_area);

    frame.render_widget(
        Paragraph::new(fit_lines(fit, fit_error, theme)).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Regression: matched ~ total "),
        ),
        footer_area,
    );
}

/// Footer lines describing the fit, or why there is none.
pub fn fit_lines<'a>(fit: Option<&LinearFit>, fit_error: Option<&str>, theme: &Theme) -> Vec<Line<'a>> {
    match fit {
        Some(fit) => {
            let mut detail = format!("R² = {:.3}   n = {}", fit.r_squared, fit.n);
            if let Some(se) = fit.slope_std_error {
                detail.push_str(&format!("   SE(slope) = {:.4}", se));
            }
            if let Some(t) = fit.slope_t_statistic() {
                detail.push_str(&format!("   t = {:.2}", t));
            }
            vec![
                Line::from(vec![
                    Span::styled("Fit: ", theme.label),
                    Span::styled(fit.equation(), theme.value),
                ]),
                Line::from(Span::styled(detail, theme.dim)),
            ]
        }
        None => vec![Line::from(Span::styled(
            format!("No fit: {}", fit_error.unwrap_or("not computed")),
            theme.warning,
        ))],
    }
}

/// Render a "no data" placeholder.
pub fn render_no_data(frame: &mut Frame, area: Rect, theme: &Theme) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("No incident records found", theme.warning)),
        Line::from(""),
        Line::from(Span::styled(
            "Check --input or --source-url and the column names.",
            theme.dim,
        )),
        Line::from(Span::styled("Press 'q' or Ctrl+C to exit", theme.dim)),
    ];
    frame.render_widget(
        Paragraph::new(ratatui::text::Text::from(text)).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Incident Report "),
        ),
        area,
    );
}

// ── Tests ──────────────────────────────────────────────────────────────────────
