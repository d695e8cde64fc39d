use clap::Parser;
use configparser::ini::Ini;
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::error::ConfigError;

/// Editor used when none is given on the command line or in the config file.
#[cfg(target_os = "linux")]
pub const DEFAULT_EDITOR: &str = "xdg-open";
#[cfg(target_os = "macos")]
pub const DEFAULT_EDITOR: &str = "open";
#[cfg(target_os = "windows")]
pub const DEFAULT_EDITOR: &str = "notepad";
#[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
pub const DEFAULT_EDITOR: &str = "xdg-open";

pub const DEFAULT_POLL_INTERVAL_MS: u64 = 500;

/// Anything shorter turns the poll into a busy loop.
pub const MIN_POLL_INTERVAL_MS: u64 = 50;

const SECTION: &str = "Indicator";

/// Shows your todo.txt file as a system tray menu.
#[derive(Parser, Debug, Clone)]
#[command(name = "todo-indicator")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Your todo.txt file
    #[arg(value_name = "TODO_FILE")]
    pub todo_file: PathBuf,

    /// Your favorite text editor (defaults to the system "open" handler)
    #[arg(short, long, value_name = "CMD")]
    pub editor: Option<String>,

    /// Only show tasks containing this text, e.g. a +project or @context
    #[arg(short, long, value_name = "TEXT")]
    pub filter: Option<String>,

    /// How often to check for file changes, in milliseconds
    #[arg(long, value_name = "MS")]
    pub poll_interval: Option<u64>,

    /// Settings file to use instead of the default location
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Values read from the optional settings file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSettings {
    pub editor: Option<String>,
    pub filter: Option<String>,
    pub poll_interval_ms: Option<u64>,
}

/// Fully resolved runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Absolute, symlink-free path of the todo file.
    pub todo_path: PathBuf,
    pub editor: String,
    pub filter: String,
    pub poll_interval: Duration,
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("todo-indicator").join("config.ini"))
}

/// Reads `[Indicator]` settings from an INI file.
///
/// A missing file yields empty settings. Empty values are treated as unset.
pub fn load_file_settings(path: &Path) -> Result<FileSettings, ConfigError> {
    if !path.exists() {
        tracing::debug!("No settings file at {}", path.display());
        return Ok(FileSettings::default());
    }

    let parse_err = |message: String| ConfigError::Parse {
        path: path.to_path_buf(),
        message,
    };

    let mut config = Ini::new();
    config.load(path).map_err(parse_err)?;

    let non_empty = |key: &str| config.get(SECTION, key).filter(|s| !s.trim().is_empty());

    Ok(FileSettings {
        editor: non_empty("editor"),
        filter: non_empty("filter"),
        poll_interval_ms: config.getuint(SECTION, "pollIntervalMs").map_err(parse_err)?,
    })
}

impl Config {
    /// Merges command-line arguments over the settings file.
    ///
    /// # Errors
    ///
    /// Returns an error if a settings file given with `--config` does not exist,
    /// the settings file is malformed, the poll interval is too short, or the
    /// todo file cannot be resolved (e.g. it does not exist).
    pub fn resolve(cli: Cli) -> Result<Self, ConfigError> {
        let settings = match &cli.config {
            Some(path) if !path.is_file() => {
                return Err(ConfigError::MissingFile(path.clone()));
            }
            Some(path) => load_file_settings(path)?,
            None => match default_config_path() {
                Some(path) => load_file_settings(&path)?,
                None => FileSettings::default(),
            },
        };
        Self::from_parts(cli, settings)
    }

    pub fn from_parts(cli: Cli, settings: FileSettings) -> Result<Self, ConfigError> {
        let poll_ms = cli
            .poll_interval
            .or(settings.poll_interval_ms)
            .unwrap_or(DEFAULT_POLL_INTERVAL_MS);
        if poll_ms < MIN_POLL_INTERVAL_MS {
            return Err(ConfigError::InvalidPollInterval {
                value: poll_ms,
                min: MIN_POLL_INTERVAL_MS,
            });
        }

        if cli.todo_file.file_name().is_none() {
            return Err(ConfigError::NoFileName(cli.todo_file));
        }
        let todo_path =
            fs::canonicalize(&cli.todo_file).map_err(|source| ConfigError::Canonicalize {
                path: cli.todo_file.clone(),
                source,
            })?;

        Ok(Config {
            todo_path,
            editor: cli
                .editor
                .or(settings.editor)
                .unwrap_or_else(|| DEFAULT_EDITOR.to_string()),
            filter: cli.filter.or(settings.filter).unwrap_or_default(),
            poll_interval: Duration::from_millis(poll_ms),
        })
    }
}
