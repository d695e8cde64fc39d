//! System tray implementation using tray-icon (Windows/macOS).
//!
//! This module is only compiled on non-Linux platforms.
//! Linux uses the ksni-based implementation in tray_linux.rs.
//!
//! tray-icon needs a native event loop on the main thread, so the poll timer
//! is a winit loop woken every poll interval and on every menu click.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Instant;

use tray_icon::{
    menu::{Menu, MenuEvent, MenuId, MenuItem, PredefinedMenuItem},
    Icon, TrayIcon, TrayIconBuilder,
};
use winit::{
    application::ApplicationHandler,
    event::{StartCause, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::WindowId,
};

use crate::app::{App, LoopControl, MenuDisplay};
use crate::config::Config;
use crate::error::{Error, TrayError};
use crate::menu::{escape_mnemonics, MenuEntry, TodoMenu, TrayCommand};
use crate::utils::themed_icon;
use crate::watcher::{DirtyFlag, TodoWatcher};

/// muda treats a single ampersand as an accelerator prefix.
const MNEMONIC_MARKER: char = '&';

pub struct Tray {
    tray_icon: TrayIcon,
    commands: HashMap<MenuId, TrayCommand>,
    pending: VecDeque<MenuEvent>,
}

impl Tray {
    pub fn new() -> Result<Self, TrayError> {
        let icon = Self::load_icon()?;

        let tray_icon = TrayIconBuilder::new()
            .with_tooltip("todo.txt")
            .with_icon(icon)
            .build()
            .map_err(|e| TrayError::Spawn(e.to_string()))?;

        tracing::info!("System tray initialized");

        Ok(Tray {
            tray_icon,
            commands: HashMap::new(),
            pending: VecDeque::new(),
        })
    }

    fn load_icon() -> Result<Icon, TrayError> {
        let image = themed_icon();
        let (width, height) = image.dimensions();
        Icon::from_rgba(image.into_raw(), width, height)
            .map_err(|e| TrayError::Icon(e.to_string()))
    }

    /// Queues a click delivered through the event loop.
    pub fn push_event(&mut self, event: MenuEvent) {
        self.pending.push_back(event);
    }

    fn build_menu(
        &self,
        menu: &TodoMenu,
    ) -> Result<(Menu, HashMap<MenuId, TrayCommand>), TrayError> {
        let native = Menu::new();
        let mut commands = HashMap::new();
        let menu_err = |e: tray_icon::menu::Error| TrayError::Menu(e.to_string());

        for entry in &menu.entries {
            if let MenuEntry::Separator = entry {
                native
                    .append(&PredefinedMenuItem::separator())
                    .map_err(menu_err)?;
                continue;
            }

            let label = escape_mnemonics(entry.label(), MNEMONIC_MARKER);
            let item = MenuItem::new(label, entry.is_enabled(), None);
            if let Some(command) = entry.command() {
                commands.insert(item.id().clone(), command);
            }
            native.append(&item).map_err(menu_err)?;
        }

        Ok((native, commands))
    }
}

impl MenuDisplay for Tray {
    fn show(&mut self, menu: &TodoMenu) {
        match self.build_menu(menu) {
            Ok((native, commands)) => {
                self.tray_icon.set_menu(Some(Box::new(native)));
                self.commands = commands;
            }
            Err(e) => tracing::error!("Failed to rebuild tray menu: {}", e),
        }
        if let Err(e) = self.tray_icon.set_tooltip(Some(menu.tooltip())) {
            tracing::debug!("Failed to set tooltip: {}", e);
        }
    }

    fn poll_command(&mut self) -> Option<TrayCommand> {
        while let Some(event) = self.pending.pop_front() {
            // Clicks on items from a menu that was since replaced are dropped.
            if let Some(command) = self.commands.get(&event.id) {
                return Some(command.clone());
            }
        }
        None
    }
}

struct Indicator {
    config: Option<Config>,
    dirty: DirtyFlag,
    watcher: Option<TodoWatcher>,
    app: Option<App<Tray>>,
    error: Option<Error>,
}

impl Indicator {
    fn start(&mut self) -> Result<(), Error> {
        let (Some(config), Some(watcher)) = (self.config.take(), self.watcher.take()) else {
            return Ok(());
        };
        let tray = Tray::new()?;
        let mut app = App::new(config, tray, self.dirty.clone(), Some(watcher));
        app.rebuild()?;
        self.app = Some(app);
        Ok(())
    }

    fn step(&mut self, event_loop: &ActiveEventLoop) {
        let Some(app) = self.app.as_mut() else {
            return;
        };
        match app.step() {
            Ok(LoopControl::Continue) => {
                let next = Instant::now() + app.config().poll_interval;
                event_loop.set_control_flow(ControlFlow::WaitUntil(next));
            }
            Ok(LoopControl::Exit) => event_loop.exit(),
            Err(e) => self.fail(event_loop, e.into()),
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: Error) {
        if let Some(app) = self.app.as_mut() {
            app.shutdown();
        }
        self.error = Some(error);
        event_loop.exit();
    }
}

impl ApplicationHandler<MenuEvent> for Indicator {
    fn new_events(&mut self, event_loop: &ActiveEventLoop, cause: StartCause) {
        match cause {
            // The tray must be created once the native loop is running (macOS).
            StartCause::Init => {
                if let Err(e) = self.start() {
                    self.fail(event_loop, e);
                    return;
                }
                self.step(event_loop);
            }
            StartCause::ResumeTimeReached { .. } => self.step(event_loop),
            _ => {}
        }
    }

    fn resumed(&mut self, _event_loop: &ActiveEventLoop) {}

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: MenuEvent) {
        if let Some(app) = self.app.as_mut() {
            app.display_mut().push_event(event);
        }
        self.step(event_loop);
    }

    fn window_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        _event: WindowEvent,
    ) {
    }
}

/// Shows the tray and runs the native event loop until Quit.
pub fn run(config: Config, dirty: DirtyFlag, watcher: TodoWatcher) -> Result<(), Error> {
    #[allow(unused_mut)]
    let mut builder = EventLoop::<MenuEvent>::with_user_event();

    #[cfg(target_os = "macos")]
    {
        use winit::platform::macos::{ActivationPolicy, EventLoopBuilderExtMacOS};
        // Tray-only app: no Dock icon.
        builder.with_activation_policy(ActivationPolicy::Accessory);
    }

    let event_loop = builder
        .build()
        .map_err(|e| TrayError::Spawn(e.to_string()))?;

    let proxy = Mutex::new(event_loop.create_proxy());
    MenuEvent::set_event_handler(Some(move |event: MenuEvent| {
        if let Ok(proxy) = proxy.lock() {
            let _ = proxy.send_event(event);
        }
    }));

    let mut indicator = Indicator {
        config: Some(config),
        dirty,
        watcher: Some(watcher),
        app: None,
        error: None,
    };

    event_loop
        .run_app(&mut indicator)
        .map_err(|e| TrayError::Spawn(e.to_string()))?;

    match indicator.error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
