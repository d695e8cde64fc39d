//! Linux-specific tray implementation using ksni (KDE StatusNotifierItem).
//!
//! ksni runs the D-Bus side on its own thread. Menu clicks are forwarded to
//! the main loop over a channel; the main thread never blocks on D-Bus.

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use ksni::blocking::TrayMethods;
use ksni::menu::*;
use std::time::Duration;

use crate::app::{App, MenuDisplay};
use crate::config::Config;
use crate::error::{Error, TrayError};
use crate::menu::{escape_mnemonics, MenuEntry, TodoMenu, TrayCommand};
use crate::utils::{themed_icon, to_argb};
use crate::watcher::{DirtyFlag, TodoWatcher};

/// Themed icon name, used when the icon theme provides one.
const ICON_NAME: &str = "todo-indicator";

/// dbusmenu hides a single underscore and underlines the next character.
const MNEMONIC_MARKER: char = '_';

/// The ksni tray implementation.
struct TodoTray {
    menu: TodoMenu,
    icon: ksni::Icon,
    command_sender: Sender<TrayCommand>,
}

impl TodoTray {
    fn menu_item(&self, entry: &MenuEntry) -> MenuItem<Self> {
        if let MenuEntry::Separator = entry {
            return MenuItem::Separator;
        }

        let command = entry.command();
        StandardItem {
            label: escape_mnemonics(entry.label(), MNEMONIC_MARKER),
            enabled: entry.is_enabled(),
            activate: Box::new(move |tray: &mut Self| {
                if let Some(command) = &command {
                    let _ = tray.command_sender.send(command.clone());
                }
            }),
            ..Default::default()
        }
        .into()
    }
}

impl ksni::Tray for TodoTray {
    // Make left-click open the menu (same as right-click)
    const MENU_ON_ACTIVATE: bool = true;

    fn id(&self) -> String {
        "todo-txt-indicator".into()
    }

    fn icon_name(&self) -> String {
        ICON_NAME.into()
    }

    fn icon_pixmap(&self) -> Vec<ksni::Icon> {
        vec![self.icon.clone()]
    }

    fn title(&self) -> String {
        "todo.txt".into()
    }

    fn tool_tip(&self) -> ksni::ToolTip {
        ksni::ToolTip {
            icon_name: String::new(),
            icon_pixmap: vec![],
            title: "todo.txt".into(),
            description: self.menu.tooltip(),
        }
    }

    fn menu(&self) -> Vec<MenuItem<Self>> {
        self.menu
            .entries
            .iter()
            .map(|entry| self.menu_item(entry))
            .collect()
    }
}

/// Handle to the tray icon, allowing updates from the main thread.
pub struct Tray {
    handle: ksni::blocking::Handle<TodoTray>,
    command_receiver: Receiver<TrayCommand>,
}

impl Tray {
    /// Creates a new system tray icon with an empty menu.
    ///
    /// This spawns a background task to handle the D-Bus StatusNotifierItem protocol.
    pub fn new() -> Result<Self, TrayError> {
        let (command_sender, command_receiver) = crossbeam_channel::unbounded();

        let image = themed_icon();
        let (width, height) = image.dimensions();
        let icon = ksni::Icon {
            width: width as i32,
            height: height as i32,
            data: to_argb(&image),
        };

        let tray = TodoTray {
            menu: TodoMenu::default(),
            icon,
            command_sender,
        };

        let handle = tray.spawn().map_err(|e| {
            tracing::error!("Failed to spawn ksni tray: {}", e);
            TrayError::Spawn(e.to_string())
        })?;

        tracing::info!("System tray initialized (ksni/StatusNotifierItem)");

        Ok(Tray {
            handle,
            command_receiver,
        })
    }
}

impl MenuDisplay for Tray {
    fn show(&mut self, menu: &TodoMenu) {
        let menu = menu.clone();
        // Signal ksni to refresh the tray
        let _ = self.handle.update(move |tray: &mut TodoTray| tray.menu = menu);
    }

    fn poll_command(&mut self) -> Option<TrayCommand> {
        self.command_receiver.try_recv().ok()
    }

    fn wait_command(&mut self, timeout: Duration) -> Option<TrayCommand> {
        match self.command_receiver.recv_timeout(timeout) {
            Ok(command) => Some(command),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => {
                // Keep polling the file at the normal pace even without a tray.
                std::thread::sleep(timeout);
                None
            }
        }
    }
}

/// Shows the tray and runs the poll loop on the calling thread until Quit.
pub fn run(config: Config, dirty: DirtyFlag, watcher: TodoWatcher) -> Result<(), Error> {
    let tray = Tray::new()?;
    let mut app = App::new(config, tray, dirty, Some(watcher));
    app.rebuild()?;
    app.run()?;
    Ok(())
}
