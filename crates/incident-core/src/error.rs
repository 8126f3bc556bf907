use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the incident report crates.
#[derive(Error, Debug)]
pub enum ReportError {
    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The CSV reader rejected the input.
    #[error("Failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    /// A required column is not present in the CSV header.
    #[error("Missing column: {0}")]
    MissingColumn(String),

    /// The HTTP request for the source dataset failed.
    #[error("Failed to download {url}: {source}")]
    Download {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status.
    #[error("Download of {url} returned HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    /// Too few points to fit a regression line.
    #[error("Insufficient data for regression: {points} point(s)")]
    InsufficientData { points: usize },

    /// Every x value is identical, so the slope is undefined.
    #[error("Degenerate regression input: all x values are equal")]
    DegenerateInput,

    /// Summary rows break the ordering or count invariants of a table.
    #[error("Invalid summary table: {0}")]
    InvalidSummary(String),

    /// No CSV files were found under the given directory.
    #[error("No CSV files found in {0}")]
    NoDataFiles(PathBuf),

    /// An error originating from the terminal / TUI layer.
    #[error("Terminal error: {0}")]
    Terminal(String),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the report crates.
pub type Result<T> = std::result::Result<T, ReportError>;
