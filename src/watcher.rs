//! File watcher that flags the todo list as dirty.
//!
//! The notify backend delivers events on its own thread. That thread never
//! touches the menu or the file: it only raises a [`DirtyFlag`], and the main
//! loop consumes the flag on its next poll tick.
//!
//! The directory containing the todo file is watched rather than the file
//! itself. Sync tools (Dropbox, Syncthing, editors with safe-write) usually
//! replace the file by renaming a new one over it, which a watch on the old
//! inode would never report.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use notify::{
    event::{ModifyKind, RenameMode},
    Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher,
};

use crate::error::WatchError;

/// Process-wide "the file changed since the last rebuild" signal.
#[derive(Clone, Debug, Default)]
pub struct DirtyFlag(Arc<AtomicBool>);

impl DirtyFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raises the flag. Safe to call from any thread.
    pub fn mark(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Clears the flag and returns whether it was set.
    pub fn take(&self) -> bool {
        self.0.swap(false, Ordering::AcqRel)
    }
}

/// Watches the todo file's directory and marks the flag when the file changes.
pub struct TodoWatcher {
    watcher: Option<RecommendedWatcher>,
    dir: PathBuf,
}

impl TodoWatcher {
    /// Starts watching `todo_path`.
    ///
    /// `todo_path` should be absolute and canonical so it compares equal to the
    /// paths reported by the backend.
    pub fn new(todo_path: &Path, flag: DirtyFlag) -> Result<Self, WatchError> {
        let dir = todo_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or_else(|| WatchError::MissingParent(todo_path.to_path_buf()))?
            .to_path_buf();

        let target = todo_path.to_path_buf();
        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if is_relevant(&event, &target) {
                        tracing::trace!(kind = ?event.kind, "Todo file changed");
                        flag.mark();
                    }
                }
                Err(e) => tracing::warn!("File watch error: {}", e),
            },
            Config::default(),
        )?;
        watcher.watch(&dir, RecursiveMode::NonRecursive)?;

        tracing::info!("Watching {} for changes", dir.display());

        Ok(Self {
            watcher: Some(watcher),
            dir,
        })
    }

    /// Stops watching. Further changes to the file are ignored.
    pub fn stop(&mut self) {
        if let Some(mut watcher) = self.watcher.take() {
            if let Err(e) = watcher.unwatch(&self.dir) {
                tracing::debug!("Failed to unwatch {}: {}", self.dir.display(), e);
            }
            tracing::info!("Stopped watching {}", self.dir.display());
        }
    }

    pub fn is_running(&self) -> bool {
        self.watcher.is_some()
    }
}

impl Drop for TodoWatcher {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Decides whether a filesystem event means `target` has new content.
///
/// Writes, creation and being renamed into place count. Reads, removal and
/// being renamed away do not, since there is nothing to load afterwards.
pub fn is_relevant(event: &Event, target: &Path) -> bool {
    let touches = || event.paths.iter().any(|p| p == target);

    match event.kind {
        EventKind::Create(_)
        | EventKind::Modify(ModifyKind::Data(_))
        | EventKind::Modify(ModifyKind::Any)
        | EventKind::Modify(ModifyKind::Name(RenameMode::To))
        | EventKind::Any => touches(),
        // paths are [from, to]
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => {
            event.paths.last().is_some_and(|p| p == target)
        }
        // Backends that cannot tell the rename direction apart.
        EventKind::Modify(ModifyKind::Name(RenameMode::Any)) => touches() && target.exists(),
        _ => false,
    }
}
