//! Error types shared across the indicator.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while reading or rewriting the todo file.
#[derive(Error, Debug)]
pub enum TodoError {
    /// The todo file could not be opened or read.
    #[error("error opening file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The rewritten todo file could not be persisted.
    #[error("error writing file {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised while resolving settings from the command line and the config file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to parse config file {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },
    #[error("poll interval must be at least {min} ms, got {value} ms")]
    InvalidPollInterval { value: u64, min: u64 },
    #[error("config file not found: {}", .0.display())]
    MissingFile(PathBuf),
    #[error("todo path has no file name: {}", .0.display())]
    NoFileName(PathBuf),
    #[error("could not resolve todo path {}: {source}", path.display())]
    Canonicalize {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised while setting up the file watcher.
#[derive(Error, Debug)]
pub enum WatchError {
    #[error("failed to create watcher: {0}")]
    Init(#[from] notify::Error),
    #[error("todo file has no parent directory: {}", .0.display())]
    MissingParent(PathBuf),
}

/// Errors raised by the platform tray.
#[derive(Error, Debug)]
pub enum TrayError {
    #[error("failed to spawn tray: {0}")]
    Spawn(String),
    #[error("failed to build tray menu: {0}")]
    Menu(String),
    #[error("failed to load tray icon: {0}")]
    Icon(String),
}

/// Top-level error for the indicator.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Todo(#[from] TodoError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Watch(#[from] WatchError),
    #[error(transparent)]
    Tray(#[from] TrayError),
}
