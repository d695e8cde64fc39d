//! The indicator's main loop: poll tick, rebuild cycle and menu actions.
//!
//! All file I/O happens on the thread driving [`App`]. The watcher thread only
//! raises the [`DirtyFlag`]; tray backends only forward [`TrayCommand`]s.

use std::path::Path;
use std::process::{Child, Command};
use std::thread;
use std::time::Duration;

use crate::config::Config;
use crate::error::TodoError;
use crate::menu::{build_menu, TodoMenu, TrayCommand};
use crate::todo;
use crate::watcher::{DirtyFlag, TodoWatcher};

/// Seam between the main loop and a concrete tray implementation.
pub trait MenuDisplay {
    /// Replaces the displayed menu.
    fn show(&mut self, menu: &TodoMenu);

    /// Returns the next pending menu command without blocking.
    fn poll_command(&mut self) -> Option<TrayCommand>;

    /// Waits up to `timeout` for a menu command.
    fn wait_command(&mut self, timeout: Duration) -> Option<TrayCommand> {
        if let Some(command) = self.poll_command() {
            return Some(command);
        }
        thread::sleep(timeout);
        self.poll_command()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Exit,
}

pub struct App<D: MenuDisplay> {
    config: Config,
    display: D,
    dirty: DirtyFlag,
    watcher: Option<TodoWatcher>,
    rebuilds: usize,
}

impl<D: MenuDisplay> App<D> {
    pub fn new(
        config: Config,
        display: D,
        dirty: DirtyFlag,
        watcher: Option<TodoWatcher>,
    ) -> Self {
        App {
            config,
            display,
            dirty,
            watcher,
            rebuilds: 0,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    /// Number of rebuilds performed so far.
    pub fn rebuild_count(&self) -> usize {
        self.rebuilds
    }

    /// Reloads the todo file and replaces the menu.
    ///
    /// # Errors
    ///
    /// A [`TodoError`] here means the list can no longer be shown; callers
    /// treat it as fatal.
    pub fn rebuild(&mut self) -> Result<(), TodoError> {
        let items = todo::load_items(&self.config.todo_path, &self.config.filter)?;
        let menu = build_menu(&items);
        self.display.show(&menu);
        self.rebuilds += 1;
        tracing::debug!(
            items = items.len(),
            open = menu.open_tasks,
            "Rebuilt todo menu"
        );
        Ok(())
    }

    /// Poll consumer: rebuilds once if the file changed since the last tick.
    ///
    /// Returns whether a rebuild happened.
    pub fn tick(&mut self) -> Result<bool, TodoError> {
        if !self.dirty.take() {
            return Ok(false);
        }
        tracing::info!("Todo file changed on disk, reloading");
        self.rebuild()?;
        Ok(true)
    }

    /// Runs a single menu command.
    pub fn handle(&mut self, command: TrayCommand) -> Result<LoopControl, TodoError> {
        match command {
            TrayCommand::CheckOff(label) => {
                match todo::check_off(&self.config.todo_path, &label) {
                    Ok(0) => tracing::warn!("No open task matching {:?} found", label),
                    Ok(n) => tracing::info!("Checked off {:?} ({} line(s))", label, n),
                    Err(e) => tracing::error!("Failed to check off {:?}: {}", label, e),
                }
                self.rebuild()?;
            }
            TrayCommand::Edit => {
                match launch_editor(&self.config.editor, &self.config.todo_path) {
                    Ok(child) => {
                        tracing::info!("Opened todo file with {:?}", self.config.editor);
                        reap(child);
                    }
                    Err(e) => {
                        tracing::error!("Failed to launch editor {:?}: {}", self.config.editor, e)
                    }
                }
            }
            TrayCommand::ClearCompleted => {
                match todo::clear_completed(&self.config.todo_path) {
                    Ok(n) => tracing::info!("Cleared {} completed task(s)", n),
                    Err(e) => tracing::error!("Failed to clear completed tasks: {}", e),
                }
                self.rebuild()?;
            }
            TrayCommand::Refresh => {
                tracing::info!("Refresh requested from tray menu");
                self.rebuild()?;
            }
            TrayCommand::Quit => {
                tracing::info!("Quit requested from tray menu");
                self.shutdown();
                return Ok(LoopControl::Exit);
            }
        }
        Ok(LoopControl::Continue)
    }

    /// Handles every pending command, then runs one poll tick.
    pub fn step(&mut self) -> Result<LoopControl, TodoError> {
        while let Some(command) = self.display.poll_command() {
            if self.handle(command)? == LoopControl::Exit {
                return Ok(LoopControl::Exit);
            }
        }
        self.tick()?;
        Ok(LoopControl::Continue)
    }

    /// Drives the app on the current thread until Quit.
    ///
    /// Waiting for menu commands doubles as the poll timer, so clicks are
    /// handled immediately and file changes within one poll interval.
    pub fn run(&mut self) -> Result<(), TodoError> {
        let interval = self.config.poll_interval;
        loop {
            if let Some(command) = self.display.wait_command(interval) {
                if self.handle(command)? == LoopControl::Exit {
                    return Ok(());
                }
            }
            if self.step()? == LoopControl::Exit {
                return Ok(());
            }
        }
    }

    /// Stops the file watcher.
    pub fn shutdown(&mut self) {
        if let Some(mut watcher) = self.watcher.take() {
            watcher.stop();
        }
    }

    pub fn is_watching(&self) -> bool {
        self.watcher.as_ref().is_some_and(TodoWatcher::is_running)
    }
}

/// Starts `editor` on the todo file without waiting for it.
///
/// The editor string may carry arguments (e.g. `"code --wait"`); the file path
/// is appended as the last argument.
pub fn launch_editor(editor: &str, path: &Path) -> std::io::Result<Child> {
    let mut parts = editor.split_whitespace();
    let program = parts.next().ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::InvalidInput, "editor command is empty")
    })?;
    Command::new(program).args(parts).arg(path).spawn()
}

// Waits for the editor on a side thread so it does not linger as a zombie.
fn reap(mut child: Child) {
    thread::spawn(move || match child.wait() {
        Ok(status) if !status.success() => {
            tracing::warn!("Editor exited with {}", status);
        }
        Ok(_) => {}
        Err(e) => tracing::warn!("Failed to wait for editor: {}", e),
    });
}
