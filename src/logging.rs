//! Tracing setup.
//!
//! Filter comes from `FORGE_PROGRESS_LOG` (same syntax as `RUST_LOG`), default `warn`.
//! The TUI owns the terminal, so in TUI mode logs go to a file instead of stderr.

use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "FORGE_PROGRESS_LOG";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Log to stderr. Used by the text and JSON modes.
pub fn init_stderr() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// `<cache_dir>/forge-progress/forge-progress.log`
#[cfg(feature = "tui")]
fn default_log_path() -> Option<PathBuf> {
    dirs::cache_dir().map(|d| d.join("forge-progress").join("forge-progress.log"))
}

/// Log to a file so the alternate screen stays clean. Returns the file path.
#[cfg(feature = "tui")]
pub fn init_file() -> anyhow::Result<PathBuf> {
    use anyhow::Context;

    let path = default_log_path().context("no cache directory on this platform")?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create log dir {}", parent.display()))?;
    }
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("open log file {}", path.display()))?;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .try_init();
    Ok(path)
}
