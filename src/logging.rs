//! Tracing setup: stderr plus a daily-rolling log file.
//!
//! Tray apps are usually started from a desktop session with nowhere visible
//! for stderr to go, so the file is where problems end up being diagnosed.

use std::fs;
use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const LOG_FILE_PREFIX: &str = "todo-indicator.log";

pub fn log_dir() -> Option<PathBuf> {
    dirs::data_local_dir().map(|dir| dir.join("todo-indicator").join("logs"))
}

/// Installs the global subscriber. Level comes from `RUST_LOG`, default `info`.
///
/// The returned guard flushes the file writer on drop and must be kept alive
/// for the life of the program.
pub fn init() -> Option<WorkerGuard> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let (file_layer, guard) = match log_dir().filter(|dir| fs::create_dir_all(dir).is_ok()) {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    if guard.is_none() {
        tracing::warn!("Could not create log directory, logging to stderr only");
    }

    guard
}
