#![cfg_attr(all(windows, not(debug_assertions)), windows_subsystem = "windows")]

use clap::Parser;
use std::process::ExitCode;
use todo_indicator::{
    config::{Cli, Config},
    error::{ConfigError, Error, TodoError},
    logging, tray,
    watcher::{DirtyFlag, TodoWatcher},
};

fn main() -> ExitCode {
    let cli = Cli::parse();
    let _guard = logging::init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match &e {
                Error::Todo(TodoError::Read { path, .. })
                | Error::Config(ConfigError::Canonicalize { path, .. }) => {
                    eprintln!("Error opening file:\n{}", path.display());
                }
                _ => eprintln!("todo-indicator: {e}"),
            }
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Error> {
    let config = Config::resolve(cli)?;
    tracing::info!(
        file = %config.todo_path.display(),
        editor = %config.editor,
        filter = %config.filter,
        poll_ms = config.poll_interval.as_millis() as u64,
        "Starting todo-indicator"
    );

    let dirty = DirtyFlag::new();
    let watcher = TodoWatcher::new(&config.todo_path, dirty.clone())?;

    tray::run(config, dirty, watcher)
}
