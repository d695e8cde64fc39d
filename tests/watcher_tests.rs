// Tests for the dirty flag and file watcher in src/watcher.rs

mod common;

use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use common::fixtures::{todo_file, SAMPLE_TODO};
use notify::event::{
    AccessKind, CreateKind, DataChange, ModifyKind, RemoveKind, RenameMode,
};
use notify::{Event, EventKind};
use todo_indicator::watcher::{is_relevant, DirtyFlag, TodoWatcher};

fn event(kind: EventKind, paths: &[&Path]) -> Event {
    paths
        .iter()
        .fold(Event::new(kind), |event, path| event.add_path(path.to_path_buf()))
}

/// Polls the flag until it is set or the timeout expires.
fn wait_for(flag: &DirtyFlag, timeout: Duration) -> bool {
    let start = Instant::now();
    while start.elapsed() < timeout {
        if flag.is_set() {
            return true;
        }
        thread::sleep(Duration::from_millis(20));
    }
    flag.is_set()
}

// ============================================================================
// DirtyFlag
// ============================================================================

#[test]
fn test_dirty_flag_starts_clear() {
    let flag = DirtyFlag::new();
    assert!(!flag.is_set());
    assert!(!flag.take());
}

#[test]
fn test_dirty_flag_take_clears() {
    let flag = DirtyFlag::new();

    flag.mark();
    assert!(flag.is_set());
    assert!(flag.take());
    assert!(!flag.is_set());
    assert!(!flag.take());
}

#[test]
fn test_dirty_flag_marks_coalesce() {
    let flag = DirtyFlag::new();

    flag.mark();
    flag.mark();
    flag.mark();

    assert!(flag.take());
    assert!(!flag.take());
}

#[test]
fn test_dirty_flag_shared_across_threads() {
    let flag = DirtyFlag::new();
    let producer = flag.clone();

    thread::spawn(move || producer.mark()).join().unwrap();

    assert!(flag.take());
}

// ============================================================================
// Event relevance
// ============================================================================

#[test]
fn test_is_relevant_data_change() {
    let target = PathBuf::from("/tmp/lists/todo.txt");
    let e = event(
        EventKind::Modify(ModifyKind::Data(DataChange::Content)),
        &[&target],
    );
    assert!(is_relevant(&e, &target));
}

#[test]
fn test_is_relevant_other_file_in_directory() {
    let target = PathBuf::from("/tmp/lists/todo.txt");
    let other = PathBuf::from("/tmp/lists/done.txt");
    let e = event(
        EventKind::Modify(ModifyKind::Data(DataChange::Content)),
        &[&other],
    );
    assert!(!is_relevant(&e, &target));
}

#[test]
fn test_is_relevant_create() {
    let target = PathBuf::from("/tmp/lists/todo.txt");
    let e = event(EventKind::Create(CreateKind::File), &[&target]);
    assert!(is_relevant(&e, &target));
}

#[test]
fn test_is_relevant_rename_into_place() {
    let target = PathBuf::from("/tmp/lists/todo.txt");
    let tmp = PathBuf::from("/tmp/lists/.sync-tmp");

    let to = event(EventKind::Modify(ModifyKind::Name(RenameMode::To)), &[&target]);
    let both = event(
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)),
        &[&tmp, &target],
    );

    assert!(is_relevant(&to, &target));
    assert!(is_relevant(&both, &target));
}

#[test]
fn test_is_relevant_rename_away_ignored() {
    let target = PathBuf::from("/tmp/lists/todo.txt");
    let backup = PathBuf::from("/tmp/lists/todo.txt.bak");

    let from = event(
        EventKind::Modify(ModifyKind::Name(RenameMode::From)),
        &[&target],
    );
    let both = event(
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)),
        &[&target, &backup],
    );

    assert!(!is_relevant(&from, &target));
    assert!(!is_relevant(&both, &target));
}

#[test]
fn test_is_relevant_ignores_access_and_remove() {
    let target = PathBuf::from("/tmp/lists/todo.txt");

    let access = event(EventKind::Access(AccessKind::Any), &[&target]);
    let remove = event(EventKind::Remove(RemoveKind::File), &[&target]);

    assert!(!is_relevant(&access, &target));
    assert!(!is_relevant(&remove, &target));
}

// ============================================================================
// TodoWatcher
// ============================================================================

#[test]
fn test_watcher_flags_external_write() {
    let (_dir, path) = todo_file(SAMPLE_TODO);
    let flag = DirtyFlag::new();
    let _watcher = TodoWatcher::new(&path, flag.clone()).unwrap();

    fs::write(&path, "new task\n").unwrap();

    assert!(wait_for(&flag, Duration::from_secs(5)));
}

#[test]
fn test_watcher_flags_replace_by_rename() {
    let (dir, path) = todo_file(SAMPLE_TODO);
    let flag = DirtyFlag::new();
    let _watcher = TodoWatcher::new(&path, flag.clone()).unwrap();

    let staged = dir.path().join(".todo.txt.sync");
    fs::write(&staged, "synced task\n").unwrap();
    // Give the backend a moment so the staging write is not mistaken for the rename.
    thread::sleep(Duration::from_millis(100));
    flag.take();
    fs::rename(&staged, &path).unwrap();

    assert!(wait_for(&flag, Duration::from_secs(5)));
}

#[test]
fn test_watcher_ignores_sibling_files() {
    let (dir, path) = todo_file(SAMPLE_TODO);
    let flag = DirtyFlag::new();
    let _watcher = TodoWatcher::new(&path, flag.clone()).unwrap();

    fs::write(dir.path().join("done.txt"), "x old task\n").unwrap();

    assert!(!wait_for(&flag, Duration::from_millis(500)));
}

#[test]
fn test_watcher_stop() {
    let (_dir, path) = todo_file(SAMPLE_TODO);
    let flag = DirtyFlag::new();
    let mut watcher = TodoWatcher::new(&path, flag.clone()).unwrap();
    assert!(watcher.is_running());

    watcher.stop();
    assert!(!watcher.is_running());

    fs::write(&path, "after stop\n").unwrap();
    assert!(!wait_for(&flag, Duration::from_millis(500)));
}

#[test]
fn test_watcher_requires_parent_directory() {
    let flag = DirtyFlag::new();
    assert!(TodoWatcher::new(Path::new("todo.txt"), flag).is_err());
}
