use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use incident_core::settings::Settings;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// File name used for the default log inside `~/.incident-report/logs/`.
pub const LOG_FILE_NAME: &str = "incident-report.log";

// ── Directory bootstrap ────────────────────────────────────────────────────────

/// Ensure the `~/.incident-report/` directory hierarchy exists.
///
/// Creates the following directories if absent (including any missing parents):
/// - `~/.incident-report/`
/// - `~/.incident-report/logs/`
/// - `~/.incident-report/cache/`
pub fn ensure_directories() -> anyhow::Result<()> {
    let app_dir = Settings::app_dir();
    std::fs::create_dir_all(&app_dir)?;
    std::fs::create_dir_all(app_dir.join("logs"))?;
    std::fs::create_dir_all(Settings::cache_dir())?;
    Ok(())
}

/// Where log output goes: the explicit `--log-file`, else the default log
/// file for interactive views, else `None` (stderr) for the text view.
pub fn log_destination(settings: &Settings) -> Option<PathBuf> {
    if let Some(path) = &settings.log_file {
        return Some(path.clone());
    }
    if settings.view == "text" {
        None
    } else {
        Some(Settings::app_dir().join("logs").join(LOG_FILE_NAME))
    }
}

// ── Logging bootstrap ──────────────────────────────────────────────────────────

/// Map a `DEBUG|INFO|WARNING|ERROR` level name to an `EnvFilter` directive.
pub fn filter_directive(log_level: &str) -> String {
    let upper = log_level.to_uppercase();
    match upper.as_str() {
        "DEBUG" | "CRITICAL" => "debug".to_string(),
        "INFO" => "info".to_string(),
        "WARNING" | "WARN" => "warn".to_string(),
        "ERROR" => "error".to_string(),
        _ => log_level.to_lowercase(),
    }
}

/// Initialise the global `tracing` subscriber.
///
/// Writes to `log_file` (appending, no ANSI colours) when given, otherwise to
/// stderr. Falls back to `"info"` if the level string is not recognised.
pub fn setup_logging(log_level: &str, log_file: Option<&Path>) -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_new(filter_directive(log_level)).unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    match log_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            registry
                .with(
                    fmt::layer()
                        .with_target(false)
                        .with_ansi(false)
                        .with_writer(Mutex::new(file)),
                )
                .try_init()?;
        }
        None => {
            registry
                .with(
                    fmt::layer()
                        .with_target(false)
                        .with_writer(std::io::stderr),
                )
                .try_init()?;
        }
    }

    Ok(())
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    // Tests that rewrite HOME must not interleave.
    static HOME_LOCK: Mutex<()> = Mutex::new(());

    fn with_home<T>(home: &Path, f: impl FnOnce() -> T) -> T {
        let _guard = HOME_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let original_home = std::env::var_os("HOME");
        std::env::set_var("HOME", home);
        let out = f();
        match original_home {
            Some(v) => std::env::set_var("HOME", v),
            None => std::env::remove_var("HOME"),
        }
        out
    }

    #[test]
    fn test_ensure_directories() {
        let tmp = TempDir::new().expect("tempdir");

        with_home(tmp.path(), ensure_directories).expect("ensure_directories should succeed");

        let app_dir = tmp.path().join(".incident-report");
        assert!(app_dir.is_dir(), ".incident-report dir must exist");
        assert!(app_dir.join("logs").is_dir(), "logs subdir must exist");
        assert!(app_dir.join("cache").is_dir(), "cache subdir must exist");
    }

    #[test]
    fn test_filter_directive() {
        assert_eq!(filter_directive("DEBUG"), "debug");
        assert_eq!(filter_directive("info"), "info");
        assert_eq!(filter_directive("WARNING"), "warn");
        assert_eq!(filter_directive("ERROR"), "error");
        assert_eq!(filter_directive("incident_data=trace"), "incident_data=trace");
    }

    #[test]
    fn test_log_destination() {
        let explicit = Settings::parse_from(["incident-report", "--log-file", "/tmp/x.log"]);
        assert_eq!(log_destination(&explicit), Some(PathBuf::from("/tmp/x.log")));

        let text = Settings::parse_from(["incident-report", "--view", "text"]);
        assert_eq!(log_destination(&text), None);

        let tmp = TempDir::new().expect("tempdir");
        let table = Settings::parse_from(["incident-report", "--view", "table"]);
        let dest = with_home(tmp.path(), || log_destination(&table));
        assert_eq!(
            dest,
            Some(tmp.path().join(".incident-report").join("logs").join(LOG_FILE_NAME))
        );
    }
}
