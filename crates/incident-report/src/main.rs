mod bootstrap;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use incident_core::error::ReportError;
use incident_core::settings::Settings;
use incident_data::analysis::analyze_path;
use incident_data::fetch::{DatasetFetcher, DEFAULT_TIMEOUT_SECS};
use incident_data::reader::{ColumnSpec, LoadOptions};
use incident_ui::app::{App, ReportView};
use incident_ui::text_report::render_text_report;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();
    settings.validate()?;

    bootstrap::ensure_directories()?;
    let log_file = bootstrap::log_destination(&settings);
    bootstrap::setup_logging(&settings.log_level, log_file.as_deref())?;

    tracing::info!("Incident Report v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "Category: {}, Predicate: {} = {}, View: {}, Theme: {}",
        settings.category_column,
        settings.predicate_column,
        settings.predicate_value,
        settings.view,
        settings.theme
    );

    let input = resolve_input(&settings).await?;

    let columns = ColumnSpec {
        category: settings.category_column.clone(),
        predicate: settings.predicate_column.clone(),
        ..ColumnSpec::default()
    };
    let options = LoadOptions::new(columns, &settings.predicate_value);
    let report = analyze_path(&input, &options)?;

    if settings.view == "text" {
        print!("{}", render_text_report(&report, &settings.predicate_column));
        return Ok(());
    }

    let app = App::new(
        &settings.theme,
        ReportView::from_name(&settings.view),
        settings.predicate_column.clone(),
    );

    // The loop exits on 'q' / Ctrl+C inside the TUI.
    app.run(&report)
        .await
        .map_err(|e| ReportError::Terminal(e.to_string()))?;

    Ok(())
}

/// Local CSV file or directory to analyse: `--input` when given, otherwise
/// the (possibly cached) download of `--source-url`.
async fn resolve_input(settings: &Settings) -> Result<PathBuf> {
    if let Some(path) = &settings.input {
        tracing::info!("Reading local input {}", path.display());
        return Ok(path.clone());
    }

    let fetcher = DatasetFetcher::new(
        Settings::cache_dir(),
        Duration::from_secs(DEFAULT_TIMEOUT_SECS),
    )?;
    let path = fetcher.fetch(&settings.source_url, settings.refresh).await?;
    Ok(path)
}
