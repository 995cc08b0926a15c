//! Log output setup
//!
//! The terminal belongs to the TUI, so logs go to a file: the path given on the command
//! line, or `wizi.log` in the platform cache directory. Filtering follows `RUST_LOG`,
//! defaulting to `wizi=info`.

use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use directories::ProjectDirs;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "wizi=info";

/// Resolves where logs are written
///
/// Returns `None` when no path was given and the cache directory cannot be determined.
pub fn log_path(explicit: Option<&Path>) -> Option<PathBuf> {
    match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => ProjectDirs::from("", "", "wizi").map(|dirs| dirs.cache_dir().join("wizi.log")),
    }
}

/// Installs the global tracing subscriber writing to the log file
///
/// Returns the path logs go to, or `None` if no location could be determined. A
/// subscriber that is already installed is left in place.
pub fn init_logging(explicit: Option<&Path>) -> io::Result<Option<PathBuf>> {
    let Some(path) = log_path(explicit) else {
        return Ok(None);
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .try_init();

    if installed.is_err() {
        tracing::debug!("tracing subscriber already installed, keeping it");
    }

    tracing::info!(log_file = %path.display(), "logging initialized");
    Ok(Some(path))
}
