//! Platform-neutral description of the tray menu.
//!
//! The tray backends only know how to draw a [`TodoMenu`]; everything about
//! which entries exist and in what order lives here.

use crate::todo::is_completed;

pub const EMPTY_PLACEHOLDER: &str = "[ No items. Click 'Edit' to add some! ]";

/// Static actions shown below the task list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuAction {
    Edit,
    ClearCompleted,
    Refresh,
    Quit,
}

impl MenuAction {
    /// All actions, in menu order.
    pub const ALL: [MenuAction; 4] = [
        MenuAction::Edit,
        MenuAction::ClearCompleted,
        MenuAction::Refresh,
        MenuAction::Quit,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            MenuAction::Edit => "Edit todo.txt",
            MenuAction::ClearCompleted => "Clear completed",
            MenuAction::Refresh => "Refresh",
            MenuAction::Quit => "Quit",
        }
    }

    pub fn command(&self) -> TrayCommand {
        match self {
            MenuAction::Edit => TrayCommand::Edit,
            MenuAction::ClearCompleted => TrayCommand::ClearCompleted,
            MenuAction::Refresh => TrayCommand::Refresh,
            MenuAction::Quit => TrayCommand::Quit,
        }
    }
}

/// Commands that can be triggered from the tray menu.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TrayCommand {
    CheckOff(String),
    Edit,
    ClearCompleted,
    Refresh,
    Quit,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MenuEntry {
    /// A task line. Completed tasks are shown greyed out and cannot be clicked.
    Task { label: String, completed: bool },
    /// Disabled text shown instead of tasks when the list is empty.
    Placeholder(String),
    Separator,
    Action(MenuAction),
}

impl MenuEntry {
    pub fn label(&self) -> &str {
        match self {
            MenuEntry::Task { label, .. } => label,
            MenuEntry::Placeholder(text) => text,
            MenuEntry::Separator => "",
            MenuEntry::Action(action) => action.label(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        match self {
            MenuEntry::Task { completed, .. } => !completed,
            MenuEntry::Placeholder(_) | MenuEntry::Separator => false,
            MenuEntry::Action(_) => true,
        }
    }

    /// The command a click on this entry produces, if it is clickable.
    pub fn command(&self) -> Option<TrayCommand> {
        match self {
            MenuEntry::Task {
                label,
                completed: false,
            } => Some(TrayCommand::CheckOff(label.clone())),
            MenuEntry::Action(action) => Some(action.command()),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TodoMenu {
    pub entries: Vec<MenuEntry>,
    /// Number of open tasks, used for the tooltip.
    pub open_tasks: usize,
}

impl TodoMenu {
    pub fn tooltip(&self) -> String {
        match self.open_tasks {
            0 => "todo.txt: nothing to do".to_string(),
            1 => "todo.txt: 1 open task".to_string(),
            n => format!("todo.txt: {} open tasks", n),
        }
    }

    pub fn tasks(&self) -> impl Iterator<Item = &MenuEntry> {
        self.entries
            .iter()
            .filter(|entry| matches!(entry, MenuEntry::Task { .. }))
    }
}

/// Doubles every `marker` in `label` so toolkits that treat it as a mnemonic
/// prefix (`_` for dbusmenu, `&` for Win32/muda) display it literally.
pub fn escape_mnemonics(label: &str, marker: char) -> String {
    let mut escaped = String::with_capacity(label.len());
    for c in label.chars() {
        if c == marker {
            escaped.push(marker);
        }
        escaped.push(c);
    }
    escaped
}

/// Builds the menu for an already filtered and sorted list of items.
pub fn build_menu(items: &[String]) -> TodoMenu {
    let mut entries = Vec::with_capacity(items.len() + MenuAction::ALL.len() + 1);

    if items.is_empty() {
        entries.push(MenuEntry::Placeholder(EMPTY_PLACEHOLDER.to_string()));
    } else {
        entries.extend(items.iter().map(|item| MenuEntry::Task {
            label: item.clone(),
            completed: is_completed(item),
        }));
    }

    entries.push(MenuEntry::Separator);
    entries.extend(MenuAction::ALL.iter().copied().map(MenuEntry::Action));

    TodoMenu {
        entries,
        open_tasks: crate::todo::open_count(items),
    }
}
