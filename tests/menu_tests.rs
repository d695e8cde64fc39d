// Tests for the menu model in src/menu.rs

use todo_indicator::menu::{
    build_menu, escape_mnemonics, MenuAction, MenuEntry, TodoMenu, TrayCommand,
    EMPTY_PLACEHOLDER,
};

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn labels(menu: &TodoMenu) -> Vec<&str> {
    menu.entries.iter().map(MenuEntry::label).collect()
}

// ============================================================================
// build_menu
// ============================================================================

#[test]
fn test_build_menu_layout() {
    let menu = build_menu(&strings(&["call mom", "x pay rent"]));

    assert_eq!(
        labels(&menu),
        vec![
            "call mom",
            "x pay rent",
            "",
            "Edit todo.txt",
            "Clear completed",
            "Refresh",
            "Quit",
        ]
    );
    assert_eq!(menu.entries[2], MenuEntry::Separator);
}

#[test]
fn test_build_menu_completed_items_disabled() {
    let menu = build_menu(&strings(&["open", "x done"]));
    let tasks: Vec<_> = menu.tasks().collect();

    assert_eq!(tasks.len(), 2);
    assert!(tasks[0].is_enabled());
    assert!(!tasks[1].is_enabled());
    assert_eq!(tasks[1].command(), None);
}

#[test]
fn test_build_menu_empty_list_shows_placeholder() {
    let menu = build_menu(&[]);

    assert_eq!(
        menu.entries[0],
        MenuEntry::Placeholder(EMPTY_PLACEHOLDER.to_string())
    );
    assert!(!menu.entries[0].is_enabled());
    assert_eq!(menu.tasks().count(), 0);
    assert_eq!(menu.entries.len(), 1 + 1 + MenuAction::ALL.len());
}

#[test]
fn test_build_menu_open_task_count() {
    let menu = build_menu(&strings(&["a", "b", "x c"]));
    assert_eq!(menu.open_tasks, 2);
}

// ============================================================================
// Commands
// ============================================================================

#[test]
fn test_task_click_checks_off_label() {
    let menu = build_menu(&strings(&["(A) Pay rent +home"]));

    assert_eq!(
        menu.entries[0].command(),
        Some(TrayCommand::CheckOff("(A) Pay rent +home".to_string()))
    );
}

#[test]
fn test_action_commands() {
    let menu = build_menu(&[]);
    let commands: Vec<_> = menu.entries.iter().filter_map(MenuEntry::command).collect();

    assert_eq!(
        commands,
        vec![
            TrayCommand::Edit,
            TrayCommand::ClearCompleted,
            TrayCommand::Refresh,
            TrayCommand::Quit,
        ]
    );
}

#[test]
fn test_separator_and_placeholder_not_clickable() {
    assert_eq!(MenuEntry::Separator.command(), None);
    assert_eq!(MenuEntry::Placeholder("x".into()).command(), None);
}

// ============================================================================
// Tooltip
// ============================================================================

#[test]
fn test_tooltip_pluralization() {
    assert_eq!(build_menu(&[]).tooltip(), "todo.txt: nothing to do");
    assert_eq!(
        build_menu(&strings(&["a", "x b"])).tooltip(),
        "todo.txt: 1 open task"
    );
    assert_eq!(
        build_menu(&strings(&["a", "b", "c"])).tooltip(),
        "todo.txt: 3 open tasks"
    );
}

// ============================================================================
// Mnemonic escaping
// ============================================================================

#[test]
fn test_escape_mnemonics_doubles_underscore() {
    assert_eq!(escape_mnemonics("fix foo_bar +work", '_'), "fix foo__bar +work");
    assert_eq!(escape_mnemonics("__init__", '_'), "____init____");
}

#[test]
fn test_escape_mnemonics_doubles_ampersand() {
    assert_eq!(escape_mnemonics("R&D review", '&'), "R&&D review");
    assert_eq!(escape_mnemonics("a&&b", '&'), "a&&&&b");
}

#[test]
fn test_escape_mnemonics_leaves_other_markers() {
    assert_eq!(escape_mnemonics("foo_bar & baz", '&'), "foo_bar && baz");
    assert_eq!(escape_mnemonics("foo_bar & baz", '_'), "foo__bar & baz");
}

#[test]
fn test_escape_mnemonics_keeps_task_label_unescaped() {
    let menu = build_menu(&strings(&["fix foo_bar +work"]));

    // The model keeps the raw text; only the tray backends escape it.
    assert_eq!(menu.entries[0].label(), "fix foo_bar +work");
    assert_eq!(
        menu.entries[0].command(),
        Some(TrayCommand::CheckOff("fix foo_bar +work".to_string()))
    );
    assert_eq!(
        escape_mnemonics(menu.entries[0].label(), '_'),
        "fix foo__bar +work"
    );
}
