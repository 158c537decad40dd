//! Diagnostic logging.
//!
//! The TUI owns the terminal, so events go to a file and only when asked for
//! with `--log-file` or `PARLANCE_LOG`.

use std::error::Error;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use directories::ProjectDirs;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV_VAR: &str = "PARLANCE_LOG";
const DEFAULT_FILTER: &str = "warn";
const DEFAULT_LOG_FILE: &str = "parlance.log";

/// Installs the global subscriber if logging was requested. Returns the file
/// being written, if any.
pub fn init_logging(log_file: Option<&Path>) -> Result<Option<PathBuf>, Box<dyn Error>> {
    let env_filter = std::env::var(LOG_ENV_VAR).ok();
    let Some(path) = resolve_log_path(log_file, env_filter.as_deref()) else {
        return Ok(None);
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    let filter = build_filter(env_filter.as_deref());
    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .try_init();
    if installed.is_err() {
        // A subscriber is already installed (tests, embedding); keep it.
        return Ok(None);
    }

    tracing::info!(path = %path.display(), "logging started");
    Ok(Some(path))
}

/// File to log to: the explicit flag wins, then the default location when
/// only the environment filter is set.
fn resolve_log_path(log_file: Option<&Path>, env_filter: Option<&str>) -> Option<PathBuf> {
    if let Some(path) = log_file {
        return Some(path.to_path_buf());
    }
    env_filter.filter(|f| !f.trim().is_empty())?;
    Some(default_log_path())
}

fn default_log_path() -> PathBuf {
    ProjectDirs::from("org", "parlance", "parlance")
        .map(|dirs| dirs.data_local_dir().join(DEFAULT_LOG_FILE))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE))
}

fn build_filter(env_filter: Option<&str>) -> EnvFilter {
    env_filter
        .filter(|f| !f.trim().is_empty())
        .and_then(|f| EnvFilter::try_new(f).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}
