//! Loading and rewriting of the todo.txt file.
//!
//! The file is the only source of truth: every load reads it from scratch and
//! every mutation rewrites it whole. Rewrites go through a temporary file in the
//! same directory which is then renamed over the original, so readers (and sync
//! tools) never observe a half-written list.
//!
//! The file is handled as bytes. Lines that are not valid UTF-8 are displayed
//! lossily but written back exactly as they were read.

use std::fs;
use std::io::Write;
use std::path::Path;

use crate::error::TodoError;

/// Prefix that marks a task as completed.
pub const COMPLETED_MARKER: &str = "x ";

/// Returns true if the line is a completed task.
pub fn is_completed(line: &str) -> bool {
    line.starts_with(COMPLETED_MARKER)
}

fn is_completed_bytes(line: &[u8]) -> bool {
    line.starts_with(COMPLETED_MARKER.as_bytes())
}

/// Reads the todo file and returns the displayable tasks.
///
/// Blank lines are dropped, lines not containing `filter` are dropped (an empty
/// filter keeps everything), and the rest is ordered by [`sort_items`].
///
/// # Errors
///
/// Returns [`TodoError::Read`] if the file cannot be opened.
pub fn load_items(path: &Path, filter: &str) -> Result<Vec<String>, TodoError> {
    let content = read(path)?;
    let lines = String::from_utf8_lossy(&content)
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect();

    let mut items = filter_items(lines, filter);
    sort_items(&mut items);
    tracing::debug!(count = items.len(), "Loaded todo items");
    Ok(items)
}

/// Keeps only the items containing `filter`, preserving their relative order.
pub fn filter_items(items: Vec<String>, filter: &str) -> Vec<String> {
    if filter.is_empty() {
        return items;
    }
    items
        .into_iter()
        .filter(|item| item.contains(filter))
        .collect()
}

/// Sorts open tasks alphabetically, followed by completed tasks alphabetically.
pub fn sort_items(items: &mut [String]) {
    items.sort_by(|a, b| (is_completed(a), a).cmp(&(is_completed(b), b)));
}

/// Number of tasks that are not completed.
pub fn open_count(items: &[String]) -> usize {
    items.iter().filter(|item| !is_completed(item)).count()
}

/// Marks every open line matching `label` as completed and rewrites the file.
///
/// Lines are compared with surrounding whitespace trimmed. Duplicated tasks are
/// all checked off. Returns the number of lines that changed; the file is left
/// untouched when nothing matched.
pub fn check_off(path: &Path, label: &str) -> Result<usize, TodoError> {
    let content = read(path)?;
    let (updated, changed) = check_off_lines(&content, label);
    if changed > 0 {
        rewrite(path, &updated)?;
    }
    tracing::debug!(changed, label, "Checked off todo item");
    Ok(changed)
}

/// Removes every completed line and rewrites the file.
///
/// Returns the number of lines removed; the file is left untouched when there
/// was nothing to remove.
pub fn clear_completed(path: &Path) -> Result<usize, TodoError> {
    let content = read(path)?;
    let (updated, removed) = clear_completed_lines(&content);
    if removed > 0 {
        rewrite(path, &updated)?;
    }
    tracing::debug!(removed, "Cleared completed todo items");
    Ok(removed)
}

/// In-memory form of [`check_off`]. Line endings are preserved byte for byte.
///
/// A line matches when its trimmed bytes equal the trimmed label, or when its
/// lossy UTF-8 rendering does (labels of non-UTF-8 lines come from the menu in
/// that form).
pub fn check_off_lines(content: &[u8], label: &str) -> (Vec<u8>, usize) {
    let label = label.trim();
    if label.is_empty() {
        return (content.to_vec(), 0);
    }

    let mut updated = Vec::with_capacity(content.len() + COMPLETED_MARKER.len());
    let mut changed = 0;
    for line in content.split_inclusive(|&b| b == b'\n') {
        if !is_completed_bytes(line) && line_matches(line, label) {
            updated.extend_from_slice(COMPLETED_MARKER.as_bytes());
            changed += 1;
        }
        updated.extend_from_slice(line);
    }
    (updated, changed)
}

/// In-memory form of [`clear_completed`]. Kept lines are byte-identical.
pub fn clear_completed_lines(content: &[u8]) -> (Vec<u8>, usize) {
    let mut updated = Vec::with_capacity(content.len());
    let mut removed = 0;
    for line in content.split_inclusive(|&b| b == b'\n') {
        if is_completed_bytes(line) {
            removed += 1;
        } else {
            updated.extend_from_slice(line);
        }
    }
    (updated, removed)
}

fn line_matches(line: &[u8], label: &str) -> bool {
    let trimmed = line.trim_ascii();
    trimmed == label.as_bytes() || String::from_utf8_lossy(trimmed).trim() == label
}

fn read(path: &Path) -> Result<Vec<u8>, TodoError> {
    fs::read(path).map_err(|source| TodoError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn rewrite(path: &Path, content: &[u8]) -> Result<(), TodoError> {
    let write_err = |source: std::io::Error| TodoError::Write {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = tempfile::Builder::new()
        .prefix(".todo-indicator")
        .tempfile_in(dir)
        .map_err(write_err)?;
    tmp.write_all(content).map_err(write_err)?;
    tmp.as_file().sync_all().map_err(write_err)?;

    // Temp files are created 0600; keep whatever mode the user gave the list.
    if let Ok(metadata) = fs::metadata(path) {
        if let Err(e) = fs::set_permissions(tmp.path(), metadata.permissions()) {
            tracing::warn!("Failed to copy permissions to {}: {}", path.display(), e);
        }
    }

    tmp.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}
