//! Plain-text rendition of a report for non-interactive output.

use std::fmt::Write;

use incident_core::formatting::{format_count, format_share};
use incident_data::analysis::ReportResult;

/// Render the summary table, regression result and year histogram as text.
pub fn render_text_report(report: &ReportResult, predicate_column: &str) -> String {
    let mut out = String::new();
    let meta = &report.metadata;

    // `fmt::Write` into a `String` cannot fail.
    let _ = writeln!(out, "Incident report: {}", meta.source);
    let _ = writeln!(
        out,
        "Rows read: {}  skipped: {}  files: {}",
        format_count(meta.rows_read as u64),
        format_count(meta.rows_skipped as u64),
        meta.files_read
    );
    let _ = writeln!(out, "Predicate: {} = {}", predicate_column, meta.predicate_target);
    let _ = writeln!(out);

    if report.is_empty() {
        let _ = writeln!(out, "No incident records found.");
        return out;
    }

    let _ = writeln!(
        out,
        "{:<18} {:>12} {:>12} {:>8}",
        "Category", "Incidents", "Matched", "Share"
    );
    let _ = writeln!(out, "{}", "-".repeat(53));
    for row in &report.summary {
        let _ = writeln!(
            out,
            "{:<18} {:>12} {:>12} {:>8}",
            row.category.to_string(),
            format_count(row.total_count),
            format_count(row.matched_count),
            format_share(row.matched_share())
        );
    }
    let (total, matched) = report.summary.totals();
    let share = if total == 0 { 0.0 } else { matched as f64 / total as f64 };
    let _ = writeln!(out, "{}", "-".repeat(53));
    let _ = writeln!(
        out,
        "{:<18} {:>12} {:>12} {:>8}",
        "TOTAL",
        format_count(total),
        format_count(matched),
        format_share(share)
    );
    let _ = writeln!(out);

    match (&report.fit, &report.fit_error) {
        (Some(fit), _) => {
            let _ = writeln!(out, "Regression (matched ~ total): {}", fit.equation());
            let _ = write!(out, "  R² = {:.4}  n = {}", fit.r_squared, fit.n);
            if let Some(se) = fit.slope_std_error {
                let _ = write!(out, "  SE(slope) = {:.4}", se);
            }
            if let Some(se) = fit.intercept_std_error {
                let _ = write!(out, "  SE(intercept) = {:.4}", se);
            }
            let _ = writeln!(out);
        }
        (None, Some(err)) => {
            let _ = writeln!(out, "Regression: no fit ({})", err);
        }
        (None, None) => {
            let _ = writeln!(out, "Regression: no fit");
        }
    }

    if !report.histogram.bins.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Incidents per year:");
        for (year, count) in &report.histogram.bins {
            let _ = writeln!(out, "  {}  {:>10}", year, format_count(*count));
        }
        if report.histogram.undated > 0 {
            let _ = writeln!(
                out,
                "  undated {:>8}",
                format_count(report.histogram.undated)
            );
        }
    }

    out
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use incident_core::models::{Category, IncidentRecord};
    use incident_data::analysis::analyze_records;
    use incident_data::reader::{ColumnSpec, LoadOptions, LoadStats};

    fn options() -> LoadOptions {
        LoadOptions::new(ColumnSpec::default(), "BLACK")
    }

    #[test]
    fn test_text_report_lists_rows_and_fit() {
        let records = vec![
            IncidentRecord::tagged(Category::known("A"), true),
            IncidentRecord::tagged(Category::known("A"), false),
            IncidentRecord::tagged(Category::known("B"), true),
            IncidentRecord::tagged(Category::known("C"), false),
            IncidentRecord::tagged(Category::known("C"), false),
        ];
        let report = analyze_records(records, "memory", LoadStats::default(), &options());
        let text = render_text_report(&report, "VIC_RACE");

        assert!(text.contains("Predicate: VIC_RACE = BLACK"));
        assert!(text.contains("TOTAL"));
        assert!(text.lines().any(|l| l.starts_with('A') && l.contains("50.0%")));
        // Points (2,1), (1,1), (2,0).
        assert!(text.contains("Regression (matched ~ total): y = -0.500x + 1.50"));
    }

    #[test]
    fn test_text_report_empty() {
        let report = analyze_records(Vec::new(), "memory", LoadStats::default(), &options());
        let text = render_text_report(&report, "VIC_RACE");
        assert!(text.contains("No incident records found."));
        assert!(!text.contains("TOTAL"));
    }

    #[test]
    fn test_text_report_single_category_reports_no_fit() {
        let records = vec![IncidentRecord::tagged(Category::known("A"), true)];
        let report = analyze_records(records, "memory", LoadStats::default(), &options());
        let text = render_text_report(&report, "VIC_RACE");
        assert!(text.contains("Regression: no fit (Insufficient data"));
    }
}
