use crate::themes::Theme;
use incident_core::formatting::format_count;
use ratatui::text::{Line, Span};

/// Application title shown on every view.
pub const TITLE: &str = "INCIDENT REPORT";

/// Report header rendering four lines:
///
/// 1. Application title and the active view name.
/// 2. A 60-column `=` separator.
/// 3. Source, predicate and row count in `[ source | VIC = BLACK | 1,234 rows ]` format.
/// 4. An empty line.
pub struct Header<'a> {
    /// Path or URL the records were loaded from.
    pub source: &'a str,
    /// Predicate column and target value, e.g. `("VIC_RACE", "BLACK")`.
    pub predicate: (&'a str, &'a str),
    pub rows: usize,
    /// Name of the active view.
    pub view: &'a str,
    pub theme: &'a Theme,
}

impl<'a> Header<'a> {
    pub fn new(
        source: &'a str,
        predicate: (&'a str, &'a str),
        rows: usize,
        view: &'a str,
        theme: &'a Theme,
    ) -> Self {
        Self {
            source,
            predicate,
            rows,
            view,
            theme,
        }
    }

    /// Render the header as exactly four lines.
    pub fn to_lines(&self) -> Vec<Line<'a>> {
        let (column, value) = self.predicate;

        vec![
            Line::from(vec![
                Span::styled(TITLE, self.theme.header),
                Span::styled(" · ", self.theme.dim),
                Span::styled(self.view, self.theme.value),
            ]),
            Line::from(Span::styled("=".repeat(60), self.theme.separator)),
            Line::from(vec![
                Span::styled("[ ", self.theme.label),
                Span::styled(self.source, self.theme.value),
                Span::styled(" | ", self.theme.label),
                Span::styled(format!("{} = {}", column, value), self.theme.value),
                Span::styled(" | ", self.theme.label),
                Span::styled(format!("{} rows", format_count(self.rows as u64)), self.theme.value),
                Span::styled(" ]", self.theme.label),
            ]),
            Line::from(""),
        ]
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
