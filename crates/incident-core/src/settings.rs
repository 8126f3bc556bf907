use clap::{CommandFactory, Parser};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Public NYPD shooting incident export (historic).
pub const DEFAULT_SOURCE_URL: &str =
    "https://data.cityofnewyork.us/api/views/833y-fsy8/rows.csv?accessType=DOWNLOAD";

/// Name of the per-user state directory under `$HOME`.
pub const APP_DIR_NAME: &str = ".incident-report";

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Per-borough incident summary and regression report
#[derive(Parser, Debug, Clone)]
#[command(
    name = "incident-report",
    about = "Per-borough incident summary and regression report",
    version
)]
pub struct Settings {
    /// URL of the source CSV export
    #[arg(long, default_value = DEFAULT_SOURCE_URL)]
    pub source_url: String,

    /// Read a local CSV file (or a directory of CSV files) instead of downloading
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Download again even when a cached copy exists
    #[arg(long)]
    pub refresh: bool,

    /// Column used to group incidents
    #[arg(long, default_value = "BORO")]
    pub category_column: String,

    /// Column tested against the predicate value
    #[arg(long, default_value = "VIC_RACE")]
    pub predicate_column: String,

    /// Value of the predicate column counted as a match
    #[arg(long, default_value = "BLACK")]
    pub predicate_value: String,

    /// Report view
    #[arg(long, default_value = "table", value_parser = ["table", "breakdown", "histogram", "scatter", "text"])]
    pub view: String,

    /// Display theme
    #[arg(long, default_value = "auto", value_parser = ["light", "dark", "classic", "auto"])]
    pub theme: String,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Clear saved configuration
    #[arg(long)]
    pub clear: bool,
}

// ── LastUsedParams ─────────────────────────────────────────────────────────────

/// Persisted last-used parameters saved to `~/.incident-report/last_used.json`.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct LastUsedParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_column: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub predicate_column: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub predicate_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
}

impl LastUsedParams {
    /// Default path of the persisted config file.
    pub fn config_path() -> PathBuf {
        Self::config_path_in(&home_dir())
    }

    /// Config path rooted at `base_dir`.
    pub fn config_path_in(base_dir: &Path) -> PathBuf {
        base_dir.join(APP_DIR_NAME).join("last_used.json")
    }

    /// Load persisted params; `Default` when the file is absent or invalid.
    pub fn load_from(path: &Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        serde_json::from_str(&content).unwrap_or_default()
    }

    /// Write params to `path` via a temp file and rename.
    pub fn save_to(&self, path: &Path) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;

        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &json)?;
        std::fs::rename(&tmp, path)?;

        Ok(())
    }

    /// Delete the config file at `path` if it exists.
    pub fn clear_at(path: &Path) -> Result<(), std::io::Error> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse CLI arguments and merge last-used params for anything not given
    /// explicitly, then persist the result.
    pub fn load_with_last_used() -> Self {
        Self::load_with_last_used_impl(
            std::env::args_os().collect(),
            &LastUsedParams::config_path(),
        )
    }

    /// Same as [`Settings::load_with_last_used`] with explicit args and config path.
    pub fn load_with_last_used_impl(
        args: Vec<std::ffi::OsString>,
        config_path: &Path,
    ) -> Self {
        let matches = Settings::command().get_matches_from(args.clone());
        let mut settings = Settings::parse_from(args);

        if settings.clear {
            let _ = LastUsedParams::clear_at(config_path);
            return settings.apply_debug_flag();
        }

        let last = LastUsedParams::load_from(config_path);

        // clap ids use the field name (underscores).
        let merge = |field: &mut String, id: &str, saved: Option<String>| {
            if !is_arg_explicitly_set(&matches, id) {
                if let Some(v) = saved {
                    *field = v;
                }
            }
        };
        merge(&mut settings.source_url, "source_url", last.source_url);
        merge(&mut settings.category_column, "category_column", last.category_column);
        merge(&mut settings.predicate_column, "predicate_column", last.predicate_column);
        merge(&mut settings.predicate_value, "predicate_value", last.predicate_value);
        merge(&mut settings.view, "view", last.view);
        merge(&mut settings.theme, "theme", last.theme);

        settings = settings.apply_debug_flag();

        let _ = LastUsedParams::from(&settings).save_to(config_path);

        settings
    }

    /// Root of the per-user state directory (`~/.incident-report`).
    pub fn app_dir() -> PathBuf {
        home_dir().join(APP_DIR_NAME)
    }

    /// Directory holding downloaded source files.
    pub fn cache_dir() -> PathBuf {
        Self::app_dir().join("cache")
    }

    /// Reject settings the pipeline cannot run with.
    pub fn validate(&self) -> crate::error::Result<()> {
        for (name, value) in [
            ("category-column", &self.category_column),
            ("predicate-column", &self.predicate_column),
        ] {
            if value.trim().is_empty() {
                return Err(crate::error::ReportError::Config(format!(
                    "--{name} must not be empty"
                )));
            }
        }
        Ok(())
    }

    fn apply_debug_flag(mut self) -> Self {
        if self.debug {
            self.log_level = "DEBUG".to_string();
        }
        self
    }
}

impl From<&Settings> for LastUsedParams {
    fn from(s: &Settings) -> Self {
        LastUsedParams {
            source_url: Some(s.source_url.clone()),
            category_column: Some(s.category_column.clone()),
            predicate_column: Some(s.predicate_column.clone()),
            predicate_value: Some(s.predicate_value.clone()),
            view: Some(s.view.clone()),
            theme: Some(s.theme.clone()),
        }
    }
}

fn home_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

/// `true` when `name` was supplied on the command line (not a default).
fn is_arg_explicitly_set(matches: &clap::ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(clap::parser::ValueSource::CommandLine)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
