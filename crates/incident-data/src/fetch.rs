//! Download of the source CSV into a local cache directory.

use std::path::{Path, PathBuf};
use std::time::Duration;

use incident_core::error::{ReportError, Result};
use tracing::{debug, info};

/// Default HTTP timeout for the dataset download.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Fetches a dataset once and serves later runs from the cache directory.
pub struct DatasetFetcher {
    client: reqwest::Client,
    cache_dir: PathBuf,
}

impl DatasetFetcher {
    /// Create a fetcher writing into `cache_dir`.
    pub fn new(cache_dir: impl Into<PathBuf>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("incident-report/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ReportError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self::with_client(client, cache_dir))
    }

    /// Use a preconfigured client.
    pub fn with_client(client: reqwest::Client, cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            client,
            cache_dir: cache_dir.into(),
        }
    }

    /// Local path a download of `url` is cached at.
    pub fn cache_path_for(&self, url: &str) -> PathBuf {
        self.cache_dir.join(cache_file_name(url))
    }

    /// Return a local copy of `url`, downloading it when no non-empty cached
    /// copy exists or `refresh` is set.
    pub async fn fetch(&self, url: &str, refresh: bool) -> Result<PathBuf> {
        let target = self.cache_path_for(url);

        if !refresh && is_non_empty_file(&target) {
            info!("Using cached dataset {}", target.display());
            return Ok(target);
        }

        info!("Downloading {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| ReportError::Download {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ReportError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|source| ReportError::Download {
            url: url.to_string(),
            source,
        })?;
        debug!("Downloaded {} bytes", body.len());

        std::fs::create_dir_all(&self.cache_dir)?;
        let tmp = target.with_extension("csv.part");
        std::fs::write(&tmp, &body)?;
        std::fs::rename(&tmp, &target)?;

        info!("Saved dataset to {}", target.display());
        Ok(target)
    }
}

/// Derive a stable file name from a URL: path segments and query are folded
/// into `[A-Za-z0-9_-]`, with a `.csv` suffix.
pub fn cache_file_name(url: &str) -> String {
    let without_scheme = url.split_once("://").map(|(_, rest)| rest).unwrap_or(url);

    let mut name: String = without_scheme
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    name.truncate(120);
    let trimmed = name.trim_matches('_');
    let base = if trimmed.is_empty() { "dataset" } else { trimmed };

    if base.to_ascii_lowercase().ends_with("_csv") {
        format!("{}.csv", &base[..base.len() - 4])
    } else {
        format!("{base}.csv")
    }
}

fn is_non_empty_file(path: &Path) -> bool {
    std::fs::metadata(path)
        .map(|m| m.is_file() && m.len() > 0)
        .unwrap_or(false)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
