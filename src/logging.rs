//! Tracing configuration and log routing.
//!
//! The server logs to stdout with a compact formatter and, when a log file
//! can be opened, to that file through a non-blocking writer. The file path
//! comes from [`Config::log_file`]; without one, logs append to
//! `logs/lexiscan.log`. An unwritable log destination is reported and
//! skipped, never fatal.

use crate::config::Config;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

// Keeps the non-blocking writer flushing for the process lifetime.
static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

const DEFAULT_LOG_DIR: &str = "logs";
const DEFAULT_LOG_NAME: &str = "lexiscan.log";

/// Configure tracing subscribers for stdout and optional file logging.
///
/// `RUST_LOG` controls filtering (defaults to `info`).
pub fn init_tracing(config: &Config) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stdout_layer = fmt::layer().with_target(false).compact();

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer);

    match file_writer(config.log_file.as_deref().map(Path::new)) {
        Some(writer) => {
            let file_layer = fmt::layer()
                .with_writer(writer)
                .with_target(true)
                .with_ansi(false)
                .compact();
            registry.with(file_layer).init();
        }
        None => registry.init(),
    }
}

/// Build the non-blocking file writer, or `None` when no log file can be
/// opened.
fn file_writer(configured: Option<&Path>) -> Option<NonBlocking> {
    let file = match configured {
        Some(path) => open_append(path)?,
        None => default_log_file()?,
    };
    let (non_blocking, guard) = tracing_appender::non_blocking(file);
    let _ = LOG_GUARD.set(guard);
    Some(non_blocking)
}

fn open_append(path: &Path) -> Option<File> {
    match File::options().create(true).append(true).open(path) {
        Ok(file) => Some(file),
        Err(err) => {
            eprintln!("Failed to open log file {}: {err}", path.display());
            None
        }
    }
}

fn default_log_file() -> Option<File> {
    if let Err(err) = std::fs::create_dir_all(DEFAULT_LOG_DIR) {
        eprintln!("Failed to create {DEFAULT_LOG_DIR} directory: {err}");
        return None;
    }
    open_append(&PathBuf::from(DEFAULT_LOG_DIR).join(DEFAULT_LOG_NAME))
}
