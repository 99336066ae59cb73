use crate::terminal_restore::{restore_terminal, TerminalRestoreGuard};
use crossterm::{
    cursor::MoveTo,
    queue,
    terminal::{Clear, ClearType},
};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};

const FALLBACK_SIZE: (u16, u16) = (80, 24);

/// Terminal operations the session controller performs.
///
/// Only the controller thread holds a `Screen`.
pub trait Screen {
    /// Columns and rows.
    fn size(&self) -> (u16, u16);
    /// Raw mode, plus the alternate screen unless preserving the terminal.
    fn enter(&mut self) -> io::Result<()>;
    /// Undo `enter`; idempotent.
    fn cleanup(&mut self);
    /// Write one complete frame and flush it.
    fn draw(&mut self, frame: &[u8]) -> io::Result<()>;
}

/// The controlling terminal, opened as `/dev/tty`.
pub struct TtyScreen {
    tty: File,
    guard: TerminalRestoreGuard,
    preserve: bool,
}

impl TtyScreen {
    pub fn open_tty() -> io::Result<File> {
        OpenOptions::new().read(true).write(true).open("/dev/tty")
    }

    pub fn new(tty: File, preserve: bool) -> Self {
        let guard = TerminalRestoreGuard::new(&tty);
        Self {
            tty,
            guard,
            preserve,
        }
    }
}

impl Screen for TtyScreen {
    fn size(&self) -> (u16, u16) {
        crossterm::terminal::size().unwrap_or(FALLBACK_SIZE)
    }

    fn enter(&mut self) -> io::Result<()> {
        self.guard.enable_raw_mode()?;
        if !self.preserve {
            self.guard.enter_alt_screen(&mut self.tty)?;
        }
        Ok(())
    }

    fn cleanup(&mut self) {
        if self.preserve {
            let mut buf = Vec::new();
            let _ = queue!(buf, Clear(ClearType::All), MoveTo(0, 0));
            let _ = self.tty.write_all(&buf);
        }
        restore_terminal();
    }

    fn draw(&mut self, frame: &[u8]) -> io::Result<()> {
        self.tty.write_all(frame)?;
        self.tty.flush()
    }
}
