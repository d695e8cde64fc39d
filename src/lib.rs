pub mod app;
pub mod config;
pub mod error;
pub mod logging;
pub mod menu;
pub mod todo;
pub mod utils;
pub mod watcher;

// Platform-specific tray implementations:
// - Linux: ksni (KDE StatusNotifierItem) for native KDE/freedesktop support
// - Windows/macOS: tray-icon crate
#[cfg(target_os = "linux")]
#[path = "tray_linux.rs"]
pub mod tray;

#[cfg(not(target_os = "linux"))]
pub mod tray;
