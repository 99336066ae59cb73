//! Session kernel for the `vilark` terminal fuzzy picker.
//!
//! Five producers (keyboard, signals, loader, redraw timer, IPC) feed three
//! event channels drained by a single [`session::SessionController`].

pub mod config;
pub mod event;
pub mod input;
pub mod ipc;
pub mod loader;
mod lock;
mod logging;
pub mod output;
pub mod process;
pub mod screen;
pub mod search;
pub mod session;
pub mod signals;
mod telemetry;
pub mod terminal_restore;
pub mod ui;

pub(crate) use lock::lock_or_recover;
pub use logging::{
    debug_enabled, init_logging, log_debug, log_info, log_panic, LogConfig, LogLevel,
};
pub use telemetry::init_tracing;

/// Version string shared by the CLI and the log banner.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
