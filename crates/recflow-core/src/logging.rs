//! Logging init: file under the XDG state dir, or stderr when unavailable.

use anyhow::Result;
use std::fs;
use std::io::{self, Write};
use tracing_subscriber::EnvFilter;

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,recflow_core=debug"))
}

/// Initialize structured logging to `~/.local/state/recflow/recflow.log`.
/// Returns Err when the state dir is unusable so the caller can fall back
/// to `init_stderr_logging`.
pub fn init_logging() -> Result<()> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("recflow")?;
    let log_dir = xdg_dirs.get_state_home();
    fs::create_dir_all(&log_dir)?;
    let log_path = log_dir.join("recflow.log");

    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    // Closures returning a writer implement MakeWriter; fall back to
    // stderr if the handle cannot be cloned.
    let make_writer = move || -> Box<dyn Write + Send> {
        match file.try_clone() {
            Ok(f) => Box::new(f),
            Err(_) => Box::new(io::stderr()),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(make_writer)
        .with_ansi(false)
        .init();

    tracing::info!("recflow logging initialized at {}", log_path.display());
    Ok(())
}

/// Initialize logging to stderr only (no file). Use when `init_logging`
/// fails so the embedding process still gets diagnostics.
pub fn init_stderr_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(io::stderr)
        .with_ansi(false)
        .init();
}
