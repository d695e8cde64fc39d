// Shared todo.txt fixtures and helpers
// Allow dead code since fixtures are used by different test files compiled separately
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tempfile::TempDir;
use todo_indicator::app::MenuDisplay;
use todo_indicator::config::Config;
use todo_indicator::menu::{TodoMenu, TrayCommand};

/// A typical list: open tasks out of order, two completed, one blank line.
pub const SAMPLE_TODO: &str = "\
Call mom @phone
(A) Pay rent +home
x Water plants +home

buy milk @store
x 2024-01-02 File taxes
";

/// Same list with Windows line endings.
pub const SAMPLE_TODO_CRLF: &str =
    "Call mom @phone\r\n(A) Pay rent +home\r\nx Water plants +home\r\nbuy milk @store\r\n";

/// Writes `content` to `todo.txt` in a fresh temp directory.
///
/// The directory is returned so it outlives the test body.
pub fn todo_file(content: &str) -> (TempDir, PathBuf) {
    todo_file_bytes(content.as_bytes())
}

/// Like [`todo_file`], for content that is not valid UTF-8.
pub fn todo_file_bytes(content: &[u8]) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("todo.txt");
    fs::write(&path, content).unwrap();
    let path = fs::canonicalize(path).unwrap();
    (dir, path)
}

pub fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}

pub fn config_for(path: &Path, filter: &str) -> Config {
    Config {
        todo_path: path.to_path_buf(),
        editor: "true".to_string(),
        filter: filter.to_string(),
        poll_interval: Duration::from_millis(50),
    }
}

/// In-memory tray: records shown menus and replays scripted clicks.
#[derive(Default)]
pub struct FakeDisplay {
    pub shown: Vec<TodoMenu>,
    pub queued: Vec<TrayCommand>,
}

impl FakeDisplay {
    pub fn with_commands(commands: Vec<TrayCommand>) -> Self {
        FakeDisplay {
            shown: Vec::new(),
            queued: commands,
        }
    }

    pub fn last(&self) -> &TodoMenu {
        self.shown.last().expect("no menu shown yet")
    }
}

impl MenuDisplay for FakeDisplay {
    fn show(&mut self, menu: &TodoMenu) {
        self.shown.push(menu.clone());
    }

    fn poll_command(&mut self) -> Option<TrayCommand> {
        if self.queued.is_empty() {
            None
        } else {
            Some(self.queued.remove(0))
        }
    }

    fn wait_command(&mut self, _timeout: Duration) -> Option<TrayCommand> {
        self.poll_command()
    }
}
