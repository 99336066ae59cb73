//! The session kernel: one consumer multiplexing keyboard, signal and
//! notification channels, with the keyboard pause/resume protocol.

mod controller;
mod state;
mod timer;


pub use controller::{Channels, Flow, SessionController, SessionOptions};
pub use state::{SessionMode, SessionState};
pub use timer::{RedrawTimer, REDRAW_INTERVAL};
