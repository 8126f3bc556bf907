//! Report pipeline.
//!
//! Loads records, builds the summary table and chart inputs, and fits the
//! regression, returning a [`ReportResult`] ready for the UI layer.

use std::path::Path;

use chrono::Utc;
use incident_core::error::Result;
use incident_core::models::{IncidentRecord, SummaryTable};
use incident_core::regression::{fit_linear, LinearFit};
use tracing::{info, warn};

use crate::aggregator::{CategoryBreakdown, IncidentAggregator, YearHistogram};
use crate::reader::{load_incidents, LoadOptions, LoadStats};

// ── Public types ──────────────────────────────────────────────────────────────

/// Metadata produced alongside the report.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ReportMetadata {
    /// ISO-8601 timestamp when this result was generated.
    pub generated_at: String,
    /// Where the records came from (file or directory path).
    pub source: String,
    pub files_read: usize,
    pub rows_read: usize,
    pub rows_skipped: usize,
    /// Target value of the predicate column.
    pub predicate_target: String,
    /// Wall-clock seconds spent loading the CSV files.
    pub load_time_seconds: f64,
}

/// Everything the views need.
#[derive(Debug, Clone)]
pub struct ReportResult {
    pub records: Vec<IncidentRecord>,
    pub summary: SummaryTable,
    pub breakdown: Vec<CategoryBreakdown>,
    pub histogram: YearHistogram,
    /// `None` when the fit could not be computed; see `fit_error`.
    pub fit: Option<LinearFit>,
    pub fit_error: Option<String>,
    pub metadata: ReportMetadata,
}

impl ReportResult {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ── Public functions ──────────────────────────────────────────────────────────

/// Run the full pipeline over the CSV file or directory at `path`.
pub fn analyze_path(path: &Path, options: &LoadOptions) -> Result<ReportResult> {
    let load_start = std::time::Instant::now();
    let (records, stats) = load_incidents(path, options)?;
    let load_time = load_start.elapsed().as_secs_f64();

    info!(
        "Loaded {} incidents from {} in {:.2}s",
        records.len(),
        path.display(),
        load_time
    );

    let mut result = analyze_records(records, &path.display().to_string(), stats, options);
    result.metadata.load_time_seconds = load_time;
    Ok(result)
}

/// Build the report from records that are already in memory.
pub fn analyze_records(
    records: Vec<IncidentRecord>,
    source: &str,
    stats: LoadStats,
    options: &LoadOptions,
) -> ReportResult {
    let summary = IncidentAggregator::aggregate(&records);
    let breakdown = IncidentAggregator::breakdown(&records);
    let histogram = IncidentAggregator::histogram_by_year(&records);

    let (fit, fit_error) = match fit_linear(&summary.points()) {
        Ok(fit) => {
            info!("Fitted {} (R² = {:.3}, n = {})", fit.equation(), fit.r_squared, fit.n);
            (Some(fit), None)
        }
        Err(e) => {
            warn!("Regression skipped: {}", e);
            (None, Some(e.to_string()))
        }
    };

    let metadata = ReportMetadata {
        generated_at: Utc::now().to_rfc3339(),
        source: source.to_string(),
        files_read: stats.files_read,
        rows_read: stats.rows_read,
        rows_skipped: stats.rows_skipped,
        predicate_target: options.predicate.target().to_string(),
        load_time_seconds: 0.0,
    };

    ReportResult {
        records,
        summary,
        breakdown,
        histogram,
        fit,
        fit_error,
        metadata,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
