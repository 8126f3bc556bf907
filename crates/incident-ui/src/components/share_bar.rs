use crate::themes::Theme;
use incident_core::formatting::{format_count, format_share};
use ratatui::text::{Line, Span};

/// Configuration controlling visual appearance of a share bar.
pub struct ShareBarConfig {
    /// Width in terminal columns of the bar portion (excluding label).
    pub width: u16,
    pub filled_char: char,
    pub empty_char: char,
}

impl Default for ShareBarConfig {
    fn default() -> Self {
        Self {
            width: 40,
            filled_char: '\u{2588}', // █  FULL BLOCK
            empty_char: '\u{2591}',  // ░  LIGHT SHADE
        }
    }
}

/// Horizontal bar showing the matched share of all incidents.
///
/// Renders as a coloured fill followed by `" 42.5% (425/1,000)"`.
pub struct ShareBar<'a> {
    pub matched: u64,
    pub total: u64,
    pub theme: &'a Theme,
    pub config: ShareBarConfig,
}

impl<'a> ShareBar<'a> {
    pub fn new(matched: u64, total: u64, theme: &'a Theme) -> Self {
        Self {
            matched,
            total,
            theme,
            config: ShareBarConfig::default(),
        }
    }

    /// Fraction in `[0, 1]`; zero when there are no incidents.
    pub fn share(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.matched as f64 / self.total as f64).min(1.0)
        }
    }

    pub fn to_line(&self) -> Line<'a> {
        let filled = (self.share() * self.config.width as f64).round() as u16;
        let empty = self.config.width.saturating_sub(filled);

        let filled_str: String =
            std::iter::repeat_n(self.config.filled_char, filled as usize).collect();
        let empty_str: String =
            std::iter::repeat_n(self.config.empty_char, empty as usize).collect();

        let label = format!(
            " {} ({}/{})",
            format_share(self.share()),
            format_count(self.matched),
            format_count(self.total),
        );

        Line::from(vec![
            Span::styled(filled_str, self.theme.histogram_bar),
            Span::styled(empty_str, self.theme.dim),
            Span::styled(label, self.theme.label),
        ])
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_share_bar_half_filled() {
        let theme = Theme::dark();
        let bar = ShareBar::new(5, 10, &theme);
        let line = bar.to_line();

        assert_eq!(line.spans[0].content.chars().count(), 20);
        assert_eq!(line.spans[1].content.chars().count(), 20);
        assert_eq!(line.spans[2].content.as_ref(), " 50.0% (5/10)");
    }

    #[test]
    fn test_share_bar_zero_total() {
        let theme = Theme::dark();
        let bar = ShareBar::new(0, 0, &theme);
        assert_eq!(bar.share(), 0.0);
        let line = bar.to_line();
        assert!(line.spans[0].content.is_empty());
        assert_eq!(line.spans[1].content.chars().count(), 40);
    }

    #[test]
    fn test_share_bar_custom_width() {
        let theme = Theme::classic();
        let mut bar = ShareBar::new(1_000, 1_000, &theme);
        bar.config.width = 10;
        let line = bar.to_line();
        assert_eq!(line.spans[0].content.chars().count(), 10);
        assert!(line.spans[2].content.contains("1,000/1,000"));
    }
}
