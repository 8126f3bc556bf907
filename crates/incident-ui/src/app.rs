//! Main application state and TUI event loop for the incident report.
//!
//! [`App`] owns the theme and the active view. The report itself is computed
//! once before the loop starts and is only read while rendering.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout},
    text::{Line, Span},
    widgets::Paragraph,
    Frame, Terminal,
};

use incident_data::analysis::ReportResult;

use crate::chart_view;
use crate::components::header::Header;
use crate::components::share_bar::ShareBar;
use crate::table_view;
use crate::themes::Theme;

// ── ReportView ────────────────────────────────────────────────────────────────

/// Which view the TUI is currently rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportView {
    /// Per-category counts with the regression footer.
    Table,
    /// Victim-group bars per category.
    Breakdown,
    /// Incidents per year.
    Histogram,
    /// Total versus matched with the fitted line.
    Scatter,
}

impl ReportView {
    pub const ALL: [ReportView; 4] = [
        ReportView::Table,
        ReportView::Breakdown,
        ReportView::Histogram,
        ReportView::Scatter,
    ];

    /// Parse a `--view` value. Unknown names fall back to the table.
    pub fn from_name(name: &str) -> Self {
        match name {
            "breakdown" => ReportView::Breakdown,
            "histogram" => ReportView::Histogram,
            "scatter" => ReportView::Scatter,
            _ => ReportView::Table,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ReportView::Table => "Summary",
            ReportView::Breakdown => "Breakdown",
            ReportView::Histogram => "Histogram",
            ReportView::Scatter => "Scatter",
        }
    }

    pub fn next(self) -> Self {
        let i = Self::ALL.iter().position(|v| *v == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }

    pub fn previous(self) -> Self {
        let i = Self::ALL.iter().position(|v| *v == self).unwrap_or(0);
        Self::ALL[(i + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

// ── App ───────────────────────────────────────────────────────────────────────

/// Root application state for the report TUI.
pub struct App {
    pub theme: Theme,
    pub view: ReportView,
    /// Name of the predicate column, shown in the header.
    pub predicate_column: String,
    /// Set to `true` to break out of the event loop on the next iteration.
    pub should_quit: bool,
}

impl App {
    pub fn new(theme_name: &str, view: ReportView, predicate_column: String) -> Self {
        Self {
            theme: Theme::from_name(theme_name),
            view,
            predicate_column,
            should_quit: false,
        }
    }

    /// Apply a key press: `q`/`Esc`/`Ctrl+C` quit, `Tab`/arrows cycle views,
    /// `1`–`4` jump to a view.
    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind == KeyEventKind::Release {
            return;
        }
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Tab | KeyCode::Right => self.view = self.view.next(),
            KeyCode::BackTab | KeyCode::Left => self.view = self.view.previous(),
            KeyCode::Char(c @ '1'..='4') => {
                let idx = c as usize - '1' as usize;
                self.view = ReportView::ALL[idx];
            }
            _ => {}
        }
    }

    /// Show `report` until the user quits.
    pub async fn run(mut self, report: &ReportResult) -> io::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let tick_rate = Duration::from_millis(250);

        let result = loop {
            if let Err(e) = terminal.draw(|frame| self.render(frame, report)) {
                break Err(e);
            }

            match event::poll(tick_rate) {
                Ok(true) => match event::read() {
                    Ok(Event::Key(key)) => self.handle_key(key),
                    Ok(_) => {}
                    Err(e) => break Err(e),
                },
                Ok(false) => {}
                Err(e) => break Err(e),
            }

            if self.should_quit {
                break Ok(());
            }
        };

        // Restore terminal state unconditionally.
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    /// Render the current view of `report` into `frame`.
    pub fn render(&self, frame: &mut Frame, report: &ReportResult) {
        let [header_area, bar_area, body_area, help_area] = Layout::vertical([
            Constraint::Length(4),
            Constraint::Length(1),
            Constraint::Min(8),
            Constraint::Length(1),
        ])
        .areas(frame.area());

        let meta = &report.metadata;
        let header = Header::new(
            &meta.source,
            (self.predicate_column.as_str(), meta.predicate_target.as_str()),
            meta.rows_read,
            self.view.title(),
            &self.theme,
        );
        frame.render_widget(Paragraph::new(header.to_lines()), header_area);

        let (total, matched) = report.summary.totals();
        frame.render_widget(
            Paragraph::new(ShareBar::new(matched, total, &self.theme).to_line()),
            bar_area,
        );

        if report.is_empty() {
            table_view::render_no_data(frame, body_area, &self.theme);
        } else {
            match self.view {
                ReportView::Table => table_view::render_summary_view(
                    frame,
                    body_area,
                    &report.summary,
                    &meta.predicate_target,
                    report.fit.as_ref(),
                    report.fit_error.as_deref(),
                    &self.theme,
                ),
                ReportView::Breakdown => {
                    chart_view::render_breakdown_chart(frame, body_area, &report.breakdown, &self.theme)
                }
                ReportView::Histogram => {
                    chart_view::render_histogram(frame, body_area, &report.histogram, &self.theme)
                }
                ReportView::Scatter => chart_view::render_scatter(
                    frame,
                    body_area,
                    &report.summary,
                    report.fit.as_ref(),
                    &meta.predicate_target,
                    &self.theme,
                ),
            }
        }

        frame.render_widget(Paragraph::new(self.help_line()), help_area);
    }

    fn help_line(&self) -> Line<'static> {
        let mut spans = Vec::new();
        for (i, view) in ReportView::ALL.iter().enumerate() {
            let style = if *view == self.view {
                self.theme.value
            } else {
                self.theme.dim
            };
            spans.push(Span::styled(format!(" {} {} ", i + 1, view.title()), style));
        }
        spans.push(Span::styled("  Tab: next  q: quit", self.theme.dim));
        Line::from(spans)
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use incident_core::models::{Category, IncidentRecord};
    use incident_data::analysis::analyze_records;
    use incident_data::reader::{ColumnSpec, LoadOptions, LoadStats};
    use ratatui::backend::TestBackend;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app() -> App {
        App::new("dark", ReportView::Table, "VIC_RACE".to_string())
    }

    fn report(records: Vec<IncidentRecord>) -> ReportResult {
        let options = LoadOptions::new(ColumnSpec::default(), "BLACK");
        analyze_records(records, "shootings.csv", LoadStats::default(), &options)
    }

    fn sample_records() -> Vec<IncidentRecord> {
        vec![
            IncidentRecord::tagged(Category::known("BRONX"), true),
            IncidentRecord::tagged(Category::known("BRONX"), true),
            IncidentRecord::tagged(Category::known("BRONX"), false),
            IncidentRecord::tagged(Category::known("QUEENS"), false),
            IncidentRecord::tagged(Category::known("MANHATTAN"), true),
            IncidentRecord::tagged(Category::known("MANHATTAN"), false),
            IncidentRecord::tagged(Category::known("MANHATTAN"), false),
            IncidentRecord::tagged(Category::known("MANHATTAN"), false),
        ]
    }

    fn screen(app: &App, report: &ReportResult) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 32)).unwrap();
        terminal.draw(|frame| app.render(frame, report)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    // ── ReportView ────────────────────────────────────────────────────────────

    #[test]
    fn test_report_view_from_name() {
        assert_eq!(ReportView::from_name("table"), ReportView::Table);
        assert_eq!(ReportView::from_name("breakdown"), ReportView::Breakdown);
        assert_eq!(ReportView::from_name("histogram"), ReportView::Histogram);
        assert_eq!(ReportView::from_name("scatter"), ReportView::Scatter);
        assert_eq!(ReportView::from_name("bogus"), ReportView::Table);
    }

    #[test]
    fn test_report_view_cycles() {
        let mut view = ReportView::Table;
        for _ in 0..ReportView::ALL.len() {
            view = view.next();
        }
        assert_eq!(view, ReportView::Table);
        assert_eq!(ReportView::Table.previous(), ReportView::Scatter);
    }

    // ── handle_key ────────────────────────────────────────────────────────────

    #[test]
    fn test_handle_key_quit() {
        let mut a = app();
        a.handle_key(key(KeyCode::Char('q')));
        assert!(a.should_quit);

        let mut b = app();
        b.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(b.should_quit);

        let mut c = app();
        c.handle_key(key(KeyCode::Char('c')));
        assert!(!c.should_quit);
    }

    #[test]
    fn test_handle_key_switches_views() {
        let mut a = app();
        a.handle_key(key(KeyCode::Tab));
        assert_eq!(a.view, ReportView::Breakdown);
        a.handle_key(key(KeyCode::Char('4')));
        assert_eq!(a.view, ReportView::Scatter);
        a.handle_key(key(KeyCode::Left));
        assert_eq!(a.view, ReportView::Histogram);
        a.handle_key(key(KeyCode::Char('1')));
        assert_eq!(a.view, ReportView::Table);
    }

    #[test]
    fn test_handle_key_ignores_release() {
        let mut a = app();
        a.handle_key(KeyEvent::new_with_kind(
            KeyCode::Char('q'),
            KeyModifiers::NONE,
            KeyEventKind::Release,
        ));
        assert!(!a.should_quit);
    }

    // ── render ────────────────────────────────────────────────────────────────

    #[test]
    fn test_render_every_view() {
        let report = report(sample_records());
        let mut a = app();
        for view in ReportView::ALL {
            a.view = view;
            let text = screen(&a, &report);
            assert!(text.contains("INCIDENT REPORT"));
            assert!(text.contains(view.title()));
        }
    }

    #[test]
    fn test_render_table_shows_fit() {
        let report = report(sample_records());
        let fit = report.fit.as_ref().expect("three categories fit");
        let text = screen(&app(), &report);
        assert!(text.contains(&fit.equation()));
        assert!(text.contains("VIC_RACE = BLACK"));
    }

    #[test]
    fn test_render_empty_report() {
        let report = report(Vec::new());
        let text = screen(&app(), &report);
        assert!(text.contains("No incident records found"));
    }
}
