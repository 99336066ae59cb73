//! Keyboard path: tty bytes → decoder → pump thread → keyboard channel.

mod decoder;
mod key;
mod pump;
mod source;

pub use decoder::{ByteSource, KeyDecoder};
pub use key::{hex_bytes, Key, KeyCode, KeyPress, Modifiers, CTRL_W};
pub use pump::{spawn_keyboard_thread, KeyEvent, KeySource};
pub use source::{TtyByteSource, ESCAPE_TIMEOUT};

#[cfg(test)]
mod tests;
